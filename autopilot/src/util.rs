use anyhow::{anyhow, Context, Result};
use seabed_core::Tunables;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Load policy tunables. No path, or a path that does not exist, means the
/// built-in defaults; an existing file must be a complete JSON document.
pub fn load_tunables(path: Option<&Path>) -> Result<Tunables> {
    let Some(path) = path else {
        return Ok(Tunables::default());
    };
    if !path.exists() {
        return Ok(Tunables::default());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading config {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid config {}", path.display()))
}

/// All `*.txt` transcripts directly under `dir`, sorted by file name so a
/// benchmark run is reproducible.
pub fn discover_transcripts(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed reading transcript dir {}", dir.display()))?;
    let mut transcripts = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            transcripts.push(path);
        }
    }
    if transcripts.is_empty() {
        return Err(anyhow!("no *.txt transcripts under {}", dir.display()));
    }
    transcripts.sort();
    Ok(transcripts)
}

pub fn timestamp_suffix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{now}")
}

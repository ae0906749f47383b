//! Batch replay: run every transcript in a directory through the engine in
//! parallel and aggregate the results into CSV rows and a JSON report.

use crate::runner::replay_transcript;
use crate::util::discover_transcripts;
use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use seabed_core::Tunables;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub dir: PathBuf,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
    pub tunables: Tunables,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranscriptRow {
    pub name: String,
    pub turns: u32,
    pub drones: usize,
    pub my_score: i32,
    pub foe_score: i32,
    pub scanned: usize,
    pub saved: usize,
    pub deflections: usize,
    pub fallbacks: usize,
    pub violations: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchReport {
    pub generated_unix_s: u64,
    pub jobs: Option<usize>,
    pub transcript_count: usize,
    pub total_turns: u64,
    pub total_violations: usize,
    pub avg_my_score: f64,
    pub avg_saved: f64,
    pub rows: Vec<TranscriptRow>,
}

pub fn run_bench(config: BenchConfig) -> Result<BenchReport> {
    let transcripts = discover_transcripts(&config.dir)?;
    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("bench --jobs must be >= 1 when provided"));
        }
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let run_one = |path: &PathBuf| -> Result<TranscriptRow> {
        let artifact = replay_transcript(path, config.tunables)
            .with_context(|| format!("bench replay failed for {}", path.display()))?;
        Ok(TranscriptRow {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            turns: artifact.turn_count,
            drones: artifact.drone_count,
            my_score: artifact.final_my_score,
            foe_score: artifact.final_foe_score,
            scanned: artifact.scanned_by_me,
            saved: artifact.saved_by_me,
            deflections: artifact.deflections,
            fallbacks: artifact.fallbacks,
            violations: artifact.violations.len(),
        })
    };

    let results: Vec<Result<TranscriptRow>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| transcripts.par_iter().map(run_one).collect())
    } else {
        transcripts.par_iter().map(run_one).collect()
    };

    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        rows.push(result?);
    }
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    let report = BenchReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        jobs: config.jobs,
        transcript_count: rows.len(),
        total_turns: rows.iter().map(|r| r.turns as u64).sum(),
        total_violations: rows.iter().map(|r| r.violations).sum(),
        avg_my_score: rows.iter().map(|r| r.my_score as f64).sum::<f64>() / rows.len() as f64,
        avg_saved: rows.iter().map(|r| r.saved as f64).sum::<f64>() / rows.len() as f64,
        rows,
    };

    write_rows_csv(&config.out_dir.join("runs.csv"), &report.rows)?;
    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    Ok(report)
}

fn write_rows_csv(path: &Path, rows: &[TranscriptRow]) -> Result<()> {
    let mut csv = String::from(
        "name,turns,drones,my_score,foe_score,scanned,saved,deflections,fallbacks,violations\n",
    );
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            csv_field(&row.name),
            row.turns,
            row.drones,
            row.my_score,
            row.foe_score,
            row.scanned,
            row.saved,
            row.deflections,
            row.fallbacks,
            row.violations
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

/// RFC 4180 quoting for the one free-form CSV column (transcript names come
/// from the filesystem and may carry commas or quotes).
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

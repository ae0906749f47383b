//! Live match loop: frames in on stdin, one command line per drone out on
//! stdout, flushed every turn. Stdout is the wire, so all diagnostics go to
//! the tracing subscriber on stderr. An optional transcript file tees every
//! consumed input line for later replay.

use anyhow::{Context, Result};
use seabed_core::protocol::{parse_init_frame, parse_turn_frame, LineReader};
use seabed_core::{FleetPilot, Tunables, WorldState};
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveSummary {
    pub turns: u32,
    pub commands: u64,
    pub my_score: i32,
    pub foe_score: i32,
}

/// Every input line is copied to `sink` before the parser sees it, so the
/// transcript is byte-faithful even when a frame later fails to parse.
struct TeeLines<I, W> {
    inner: I,
    sink: Option<W>,
}

impl<I, W> Iterator for TeeLines<I, W>
where
    I: Iterator<Item = String>,
    W: Write,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let line = self.inner.next()?;
        if let Some(sink) = &mut self.sink {
            writeln!(sink, "{line}").ok();
        }
        Some(line)
    }
}

/// Drive one match from `input` to `output` until the stream ends. Generic
/// over the streams so tests can run it against buffers.
pub fn run_live<R, W>(
    input: R,
    mut output: W,
    cfg: Tunables,
    transcript: Option<&Path>,
) -> Result<LiveSummary>
where
    R: BufRead,
    W: Write,
{
    let sink = match transcript {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("failed creating {}", parent.display()))?;
                }
            }
            let file = File::create(path)
                .with_context(|| format!("failed creating transcript {}", path.display()))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    let lines = TeeLines {
        inner: input.lines().map_while(std::io::Result::ok),
        sink,
    };
    let mut reader = LineReader::new(lines);

    let init = parse_init_frame(&mut reader).context("bad init frame")?;
    let mut world = WorldState::new(&init);
    let mut pilot = FleetPilot::new(cfg);
    info!(creatures = init.creatures.len(), "match started");

    let mut commands = 0u64;
    while let Some(frame) = parse_turn_frame(&mut reader).context("bad turn frame")? {
        world.apply_turn(&frame).context("inconsistent frame")?;
        let decisions = pilot.decide(&world);
        for decision in &decisions {
            writeln!(output, "{}", decision.command).context("failed writing command")?;
        }
        output.flush().context("failed flushing commands")?;
        commands += decisions.len() as u64;

        let (my_score, foe_score) = world.scores();
        info!(
            turn = world.turn(),
            my_score,
            foe_score,
            commands = decisions.len(),
            "turn complete"
        );
    }

    let (my_score, foe_score) = world.scores();
    Ok(LiveSummary {
        turns: world.turn(),
        commands,
        my_score,
        foe_score,
    })
}

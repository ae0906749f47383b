//! Offline transcript replay: feed a recorded match through a fresh engine,
//! collect per-turn records and check the turn invariants along the way.

use anyhow::{Context, Result};
use seabed_core::constants::{BAND_COUNT, MAP_HEIGHT, MAP_WIDTH};
use seabed_core::hazard::AvoidOutcome;
use seabed_core::pilot::Phase;
use seabed_core::protocol::{parse_init_frame, parse_turn_frame, Command, LineReader};
use seabed_core::{FleetPilot, Tunables, WorldState};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub my_score: i32,
    pub foe_score: i32,
    pub commands: Vec<Command>,
    pub phases: Vec<Phase>,
    pub targets: Vec<Option<i32>>,
    pub lights: usize,
    pub deflections: usize,
    pub fallbacks: usize,
    pub scanned_by_me: usize,
    pub saved_by_me: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplayArtifact {
    pub source: String,
    pub turn_count: u32,
    pub drone_count: usize,
    pub final_my_score: i32,
    pub final_foe_score: i32,
    pub scanned_by_me: usize,
    pub saved_by_me: usize,
    pub deflections: usize,
    pub fallbacks: usize,
    /// Invariant violations found while replaying; empty on a clean run.
    pub violations: Vec<String>,
    pub turns: Vec<TurnRecord>,
}

pub fn replay_transcript(path: &Path, cfg: Tunables) -> Result<ReplayArtifact> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed reading transcript {}", path.display()))?;
    replay_lines(
        &path.display().to_string(),
        text.lines().map(str::to_string),
        cfg,
    )
}

/// Replay any line source. Violations do not abort the replay; they are
/// recorded so a batch run can report every bad transcript at once.
pub fn replay_lines<I>(source: &str, lines: I, cfg: Tunables) -> Result<ReplayArtifact>
where
    I: Iterator<Item = String>,
{
    let mut reader = LineReader::new(lines);
    let init = parse_init_frame(&mut reader)
        .with_context(|| format!("{source}: bad init frame"))?;
    let mut world = WorldState::new(&init);
    let mut pilot = FleetPilot::new(cfg);

    let mut turns = Vec::new();
    let mut violations = Vec::new();
    while let Some(frame) = parse_turn_frame(&mut reader)
        .with_context(|| format!("{source}: bad turn frame"))?
    {
        let turn_hint = world.turn() + 1;
        world
            .apply_turn(&frame)
            .with_context(|| format!("{source}: inconsistent frame at turn {turn_hint}"))?;
        let decisions = pilot.decide(&world);
        let turn = world.turn();

        if decisions.len() != world.my_drones().count() {
            violations.push(format!(
                "turn {turn}: {} commands for {} drones",
                decisions.len(),
                world.my_drones().count()
            ));
        }
        for decision in &decisions {
            if let Command::Move { x, y, .. } = decision.command {
                if !(0..MAP_WIDTH).contains(&x) || !(0..MAP_HEIGHT).contains(&y) {
                    violations.push(format!(
                        "turn {turn}: drone {} command out of bounds ({x}, {y})",
                        decision.drone_id
                    ));
                }
            }
        }
        for creature in world.creatures() {
            if creature.saved_by_me && !creature.scanned_by_me {
                violations.push(format!(
                    "turn {turn}: creature {} saved but not scanned",
                    creature.id
                ));
            }
        }

        let (my_score, foe_score) = world.scores();
        turns.push(TurnRecord {
            turn,
            my_score,
            foe_score,
            lights: decisions.iter().filter(|d| d.command.light()).count(),
            deflections: decisions
                .iter()
                .filter(|d| d.avoidance == AvoidOutcome::Deflected)
                .count(),
            fallbacks: decisions
                .iter()
                .filter(|d| d.avoidance == AvoidOutcome::NoSafeHeading)
                .count(),
            phases: decisions.iter().map(|d| d.phase).collect(),
            targets: decisions.iter().map(|d| d.target).collect(),
            commands: decisions.into_iter().map(|d| d.command).collect(),
            scanned_by_me: world.creatures().filter(|c| c.scanned_by_me).count(),
            saved_by_me: world.creatures().filter(|c| c.saved_by_me).count(),
        });
    }

    let (final_my_score, final_foe_score) = world.scores();
    Ok(ReplayArtifact {
        source: source.to_string(),
        turn_count: world.turn(),
        drone_count: world.my_drones().count(),
        final_my_score,
        final_foe_score,
        scanned_by_me: world.creatures().filter(|c| c.scanned_by_me).count(),
        saved_by_me: world.creatures().filter(|c| c.saved_by_me).count(),
        deflections: turns.iter().map(|t| t.deflections).sum(),
        fallbacks: turns.iter().map(|t| t.fallbacks).sum(),
        violations,
        turns,
    })
}

pub fn write_artifact(path: &Path, artifact: &ReplayArtifact) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    let encoded =
        serde_json::to_vec_pretty(artifact).context("failed to serialize replay artifact")?;
    fs::write(path, encoded).with_context(|| format!("failed writing {}", path.display()))
}

// ── Inspection ──────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize)]
pub struct TranscriptSummary {
    pub source: String,
    pub creature_count: usize,
    pub harvestables: usize,
    pub hazards: usize,
    pub band_counts: [usize; BAND_COUNT],
    pub turn_count: u32,
    pub my_drones: usize,
    pub foe_drones: usize,
    pub final_my_score: i32,
    pub final_foe_score: i32,
    pub saved_by_me: usize,
    pub saved_by_foe: usize,
    pub dead: usize,
}

/// Parse a transcript and summarize the world it describes, without running
/// any decision logic.
pub fn inspect_transcript(path: &Path) -> Result<TranscriptSummary> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed reading transcript {}", path.display()))?;
    let mut reader = LineReader::new(text.lines().map(str::to_string));
    let init = parse_init_frame(&mut reader)
        .with_context(|| format!("{}: bad init frame", path.display()))?;
    let mut world = WorldState::new(&init);

    while let Some(frame) = parse_turn_frame(&mut reader)
        .with_context(|| format!("{}: bad turn frame", path.display()))?
    {
        world
            .apply_turn(&frame)
            .with_context(|| format!("{}: inconsistent frame", path.display()))?;
    }

    let mut band_counts = [0usize; BAND_COUNT];
    for creature in world.creatures() {
        if let Ok(band) = usize::try_from(creature.kind) {
            if band < BAND_COUNT {
                band_counts[band] += 1;
            }
        }
    }

    let (final_my_score, final_foe_score) = world.scores();
    Ok(TranscriptSummary {
        source: path.display().to_string(),
        creature_count: world.creatures().count(),
        harvestables: world.creatures().filter(|c| !c.is_hazard()).count(),
        hazards: world.creatures().filter(|c| c.is_hazard()).count(),
        band_counts,
        turn_count: world.turn(),
        my_drones: world.my_drones().count(),
        foe_drones: world.foe_drones().count(),
        final_my_score,
        final_foe_score,
        saved_by_me: world.creatures().filter(|c| c.saved_by_me).count(),
        saved_by_foe: world.creatures().filter(|c| c.saved_by_foe).count(),
        dead: world.creatures().filter(|c| !c.alive).count(),
    })
}

use anyhow::Result;
use seabed_autopilot::benchmark::{run_bench, BenchConfig};
use seabed_autopilot::live::run_live;
use seabed_autopilot::runner::{inspect_transcript, replay_transcript, write_artifact};
use seabed_core::Tunables;
use std::fs;
use std::io::Cursor;

// One-drone-a-side match: three creatures, two turns, a scan on turn 1 and
// the matching save on turn 2.
const FIXTURE: &str = "\
# fixture match
3
4 0 0
6 0 1
13 -1 -1
# turn 1
0
0
0
0
1
0 2000 500 0 30
1
1 8000 500 0 30
0
0
3
0 4 BR
0 6 BR
0 13 BL
# turn 2
1
0
1
4
0
1
0 2000 1100 0 29
1
1 8000 1100 0 30
0
0
3
0 4 BR
0 6 BR
0 13 BL
";

#[test]
fn replay_produces_a_clean_artifact() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let transcript = tmp.path().join("match.txt");
    fs::write(&transcript, FIXTURE)?;

    let artifact = replay_transcript(&transcript, Tunables::default())?;
    assert_eq!(artifact.turn_count, 2);
    assert_eq!(artifact.drone_count, 1);
    assert_eq!(artifact.final_my_score, 1);
    assert_eq!(artifact.saved_by_me, 1);
    assert!(artifact.violations.is_empty(), "{:?}", artifact.violations);
    for turn in &artifact.turns {
        assert_eq!(turn.commands.len(), 1);
    }

    let json_path = tmp.path().join("artifacts/replay.json");
    write_artifact(&json_path, &artifact)?;
    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path)?)?;
    assert_eq!(parsed["turn_count"], 2);
    assert_eq!(parsed["turns"].as_array().map(Vec::len), Some(2));

    Ok(())
}

#[test]
fn live_loop_emits_one_command_line_per_drone_per_turn() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let capture = tmp.path().join("capture/match.txt");

    let mut output = Vec::new();
    let summary = run_live(
        Cursor::new(FIXTURE),
        &mut output,
        Tunables::default(),
        Some(&capture),
    )?;

    assert_eq!(summary.turns, 2);
    assert_eq!(summary.commands, 2);
    assert_eq!(summary.my_score, 1);

    let emitted = String::from_utf8(output)?;
    let lines: Vec<&str> = emitted.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert!(line.starts_with("MOVE ") || line.starts_with("WAIT "), "{line}");
    }

    // the teed transcript replays to the same commands
    let artifact = replay_transcript(&capture, Tunables::default())?;
    assert_eq!(artifact.turn_count, 2);
    let replayed: Vec<String> = artifact
        .turns
        .iter()
        .flat_map(|t| t.commands.iter().map(ToString::to_string))
        .collect();
    assert_eq!(replayed, lines);

    Ok(())
}

#[test]
fn bench_over_a_directory_writes_csv_and_json() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let dir = tmp.path().join("transcripts");
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("a.txt"), FIXTURE)?;
    fs::write(dir.join("b.txt"), FIXTURE)?;
    let out_dir = tmp.path().join("bench");

    let report = run_bench(BenchConfig {
        dir,
        out_dir: out_dir.clone(),
        jobs: Some(2),
        tunables: Tunables::default(),
    })?;

    assert_eq!(report.transcript_count, 2);
    assert_eq!(report.total_turns, 4);
    assert_eq!(report.total_violations, 0);
    assert_eq!(report.rows[0].name, "a.txt");
    assert!(out_dir.join("summary.json").exists());
    assert!(out_dir.join("runs.csv").exists());

    let csv = fs::read_to_string(out_dir.join("runs.csv"))?;
    assert!(csv.starts_with("name,turns,drones"));
    assert_eq!(csv.lines().count(), 3);

    Ok(())
}

#[test]
fn inspect_summarizes_the_roster_and_outcome() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let transcript = tmp.path().join("match.txt");
    fs::write(&transcript, FIXTURE)?;

    let summary = inspect_transcript(&transcript)?;
    assert_eq!(summary.creature_count, 3);
    assert_eq!(summary.harvestables, 2);
    assert_eq!(summary.hazards, 1);
    assert_eq!(summary.band_counts, [1, 1, 0]);
    assert_eq!(summary.turn_count, 2);
    assert_eq!(summary.my_drones, 1);
    assert_eq!(summary.foe_drones, 1);
    assert_eq!(summary.final_my_score, 1);
    assert_eq!(summary.saved_by_me, 1);
    assert_eq!(summary.dead, 0);

    Ok(())
}

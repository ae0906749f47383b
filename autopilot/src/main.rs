use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use seabed_autopilot::benchmark::{run_bench, BenchConfig};
use seabed_autopilot::live::run_live;
use seabed_autopilot::runner::{inspect_transcript, replay_transcript, write_artifact};
use seabed_autopilot::util::{load_tunables, timestamp_suffix};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "seabed-autopilot")]
#[command(about = "Seabed survey autopilot: live play, transcript replay and benchmarking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a live match over stdin/stdout
    Run {
        /// Tunables JSON; defaults apply when omitted or missing
        #[arg(long)]
        config: Option<PathBuf>,
        /// Tee every consumed input line into a replayable transcript
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
    /// Replay a recorded transcript through a fresh engine
    Replay {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the full per-turn artifact as JSON
        #[arg(long)]
        json_out: Option<PathBuf>,
        /// Fail non-zero if any turn invariant was violated
        #[arg(long, default_value_t = false)]
        check: bool,
    },
    /// Replay every *.txt transcript under a directory in parallel
    Bench {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        jobs: Option<usize>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Summarize a transcript's world as JSON without running the engine
    Inspect {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Run { config, transcript } => {
            let cfg = load_tunables(config.as_deref())?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            run_live(stdin.lock(), stdout.lock(), cfg, transcript.as_deref())?;
        }
        Commands::Replay {
            input,
            config,
            json_out,
            check,
        } => {
            let cfg = load_tunables(config.as_deref())?;
            let artifact = replay_transcript(&input, cfg)?;
            println!("source={}", artifact.source);
            println!("turns={}", artifact.turn_count);
            println!("drones={}", artifact.drone_count);
            println!("my_score={}", artifact.final_my_score);
            println!("foe_score={}", artifact.final_foe_score);
            println!("scanned={}", artifact.scanned_by_me);
            println!("saved={}", artifact.saved_by_me);
            println!("deflections={}", artifact.deflections);
            println!("fallbacks={}", artifact.fallbacks);
            println!("violations={}", artifact.violations.len());
            for violation in &artifact.violations {
                println!("violation={violation}");
            }
            if let Some(path) = json_out {
                write_artifact(&path, &artifact)?;
                println!("json_out={}", path.display());
            }
            if check && !artifact.violations.is_empty() {
                return Err(anyhow!(
                    "{} invariant violation(s) in {}",
                    artifact.violations.len(),
                    artifact.source
                ));
            }
        }
        Commands::Bench {
            dir,
            out_dir,
            jobs,
            config,
        } => {
            let tunables = load_tunables(config.as_deref())?;
            let out_dir =
                out_dir.unwrap_or_else(|| PathBuf::from(format!("benchmarks/{}", timestamp_suffix())));
            let report = run_bench(BenchConfig {
                dir,
                out_dir: out_dir.clone(),
                jobs,
                tunables,
            })?;

            println!("transcripts={}", report.transcript_count);
            println!("total_turns={}", report.total_turns);
            println!("total_violations={}", report.total_violations);
            println!("avg_my_score={:.1}", report.avg_my_score);
            println!("avg_saved={:.1}", report.avg_saved);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("out_dir={}", out_dir.display());
            for row in report.rows.iter().take(10) {
                println!(
                    "  {} turns={} my_score={} saved={} deflections={} fallbacks={} violations={}",
                    row.name, row.turns, row.my_score, row.saved, row.deflections, row.fallbacks,
                    row.violations,
                );
            }
        }
        Commands::Inspect { input } => {
            let summary = inspect_transcript(&input)?;
            let encoded = serde_json::to_vec_pretty(&summary)?;
            println!("{}", String::from_utf8_lossy(&encoded));
        }
    }

    Ok(())
}

//! SkyReplay CLI
//!
//! Replay a recorded drone dataset (or a generated scenario) and report
//! collisions and speed violations.

use anyhow::{bail, Context};
use clap::Parser;
use skyreplay_core::{Dataset, EngineConfig, Session, SessionReport};
use skyreplay_env::{DatasetSource, FileSource, PlaybackClock, TokioClock};
use skyreplay_sim::scenarios::ScenarioId;
use skyreplay_sim::{
    ManualClock, PlaybackExport, PlaybackRunner, RunError, RunSummary, RunnerConfig, ScenarioResult,
    ScenarioRunner,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Frames kept in an export: every n-th tick plus every tick with events
const EXPORT_INTERVAL: u64 = 10;

/// SkyReplay flight-safety playback
#[derive(Parser, Debug)]
#[command(name = "skyreplay")]
#[command(about = "Replay recorded drone flights and flag collisions and speeding", long_about = None)]
struct Args {
    /// Dataset JSON file to replay
    #[arg(short, long, conflicts_with = "scenario")]
    dataset: Option<String>,

    /// Generated scenario to run instead (head_on, crossing, speeding, formation, swarm, all)
    #[arg(short = 'S', long)]
    scenario: Option<String>,

    /// Seed for generated scenarios
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Ticks per second (default: the dataset frame rate)
    #[arg(short, long)]
    tick_rate: Option<f64>,

    /// Stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Engine config JSON file; the flags below override it
    #[arg(short, long)]
    config: Option<String>,

    /// Scale factor applied to raw coordinates
    #[arg(long)]
    scale: Option<f64>,

    /// Collision radius (scaled units)
    #[arg(long)]
    collision_radius: Option<f64>,

    /// Safe maximum speed (scaled units per second)
    #[arg(long)]
    max_speed: Option<f64>,

    /// Keep at most this many events per log
    #[arg(long)]
    log_capacity: Option<usize>,

    /// Pace playback in wall-clock time
    #[arg(long)]
    realtime: bool,

    /// Export frames and report to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)
                .with_context(|| format!("reading engine config {}", path))?,
            None => EngineConfig::default(),
        };
        if let Some(scale) = self.scale {
            config.scale_factor = scale;
        }
        if let Some(radius) = self.collision_radius {
            config.collision_radius = radius;
        }
        if let Some(speed) = self.max_speed {
            config.max_speed = speed;
        }
        if self.log_capacity.is_some() {
            config.log_capacity = self.log_capacity;
        }
        config.validate()?;
        Ok(config)
    }

    fn runner_config(&self) -> RunnerConfig {
        let mut config = RunnerConfig::default();
        if let Some(hz) = self.tick_rate {
            config = config.with_tick_rate(hz);
        }
        if let Some(max) = self.max_ticks {
            config = config.with_max_ticks(max);
        }
        config
    }
}

/// Loads a dataset file and plays it once.
async fn replay_dataset(args: &Args, path: &str) -> anyhow::Result<bool> {
    let source = FileSource::new(path);
    let bytes = source
        .fetch()
        .await
        .with_context(|| format!("fetching dataset {}", source.location()))?;
    let dataset = Dataset::from_slice(&bytes).with_context(|| format!("parsing dataset {}", path))?;
    let mut session = Session::load(&dataset, args.engine_config()?)
        .with_context(|| format!("loading dataset {}", path))?;

    let runner_config = args.runner_config();
    let period = 1.0 / runner_config.tick_rate_for(&session);
    let runner = PlaybackRunner::new(runner_config);
    let mut export = args
        .export
        .as_ref()
        .map(|_| PlaybackExport::new(path, None, EXPORT_INTERVAL));

    let summary = if args.realtime {
        play(&runner, &mut session, &TokioClock::new(), &mut export).await?
    } else {
        play(&runner, &mut session, &ManualClock::new(), &mut export).await?
    };
    info!(
        "Played {} ticks to {:.2}s ({:.2}s on the clock)",
        summary.ticks,
        summary.final_time,
        summary.clock_elapsed.as_secs_f64()
    );

    let report = SessionReport::from_session(&session, period * 1.5);
    write_export(args, export, &report)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(true)
}

async fn play<C: PlaybackClock>(
    runner: &PlaybackRunner,
    session: &mut Session,
    clock: &C,
    export: &mut Option<PlaybackExport>,
) -> Result<RunSummary, RunError> {
    runner.run(session, clock, export).await
}

fn write_export(args: &Args, export: Option<PlaybackExport>, report: &SessionReport) -> anyhow::Result<()> {
    if let (Some(path), Some(mut export)) = (&args.export, export) {
        export.finalize(report.clone());
        export
            .write_to_file(path)
            .with_context(|| format!("writing export {}", path))?;
        info!("Exported {} frames to {}", export.frames.len(), path);
    }
    Ok(())
}

/// Runs one or all generated scenarios. Returns false if any failed.
async fn run_scenarios(args: &Args, name: &str) -> anyhow::Result<bool> {
    let scenarios: Vec<ScenarioId> = if name == "all" {
        ScenarioId::all()
    } else {
        match name.parse() {
            Ok(id) => vec![id],
            Err(e) => bail!("{} (available: head_on, crossing, speeding, formation, swarm, all)", e),
        }
    };
    if args.export.is_some() && scenarios.len() > 1 {
        bail!("--export only supports a single scenario, not 'all'");
    }
    if args.realtime {
        warn!("--realtime is ignored for generated scenarios");
    }

    let runner = ScenarioRunner::new(args.seed)
        .with_engine_config(args.engine_config()?)
        .with_runner_config(args.runner_config());

    let mut results: Vec<ScenarioResult> = Vec::new();
    for scenario in &scenarios {
        let result = match &args.export {
            Some(_) => {
                let mut export = Some(PlaybackExport::new(scenario.name(), Some(args.seed), EXPORT_INTERVAL));
                let result = runner.run_with_sink(*scenario, &mut export).await?;
                write_export(args, export, &result.report)?;
                result
            }
            None => runner.run(*scenario).await?,
        };

        if !args.json {
            if result.passed {
                info!("✓ {} (seed={}) PASSED - {}", scenario.name(), result.seed, scenario.description());
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
        results.push(result);
    }

    let failed = results.iter().filter(|r| !r.passed).count();
    if args.json {
        let summary = serde_json::json!({
            "total": results.len(),
            "passed": results.len() - failed,
            "failed": failed,
            "results": results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "ticks": r.total_ticks,
                    "time_secs": r.final_time_secs,
                    "collisions": r.report.collision_count,
                    "speed_violations": r.report.speed_violation_count,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if failed == 0 {
        info!("✅ All {} scenario runs passed!", results.len());
    } else {
        error!("❌ {}/{} scenario runs failed!", failed, results.len());
    }

    Ok(failed == 0)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match (&args.dataset, &args.scenario) {
        (Some(path), _) => replay_dataset(&args, path).await,
        (None, Some(name)) => run_scenarios(&args, name).await,
        (None, None) => Err(anyhow::anyhow!("either --dataset or --scenario is required")),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

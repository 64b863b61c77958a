//! Playback runner - the cooperative per-frame loop.
//!
//! One iteration per rendered frame: await the clock for one frame period,
//! advance the session, forward the snapshot to a [`FrameSink`]. The loop
//! only yields inside `clock.sleep`, so a tick always runs to completion
//! before anything else touches the session.

use crate::clock::ManualClock;
use crate::scenarios::ScenarioId;

use skyreplay_core::{Dataset, EngineConfig, LoadError, Session, SessionReport, TickSnapshot};
use skyreplay_env::PlaybackClock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a run could not start.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// One tick period does not fit in a `Duration`
    #[error("tick rate {hz} Hz gives an unrepresentable tick period")]
    TickPeriod { hz: f64 },
}

/// Receives every tick's snapshot.
pub trait FrameSink {
    fn on_frame(&mut self, snapshot: &TickSnapshot);
}

/// Discards frames.
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn on_frame(&mut self, _snapshot: &TickSnapshot) {}
}

impl<S: FrameSink> FrameSink for Option<S> {
    fn on_frame(&mut self, snapshot: &TickSnapshot) {
        if let Some(sink) = self {
            sink.on_frame(snapshot);
        }
    }
}

impl FrameSink for Vec<TickSnapshot> {
    fn on_frame(&mut self, snapshot: &TickSnapshot) {
        self.push(snapshot.clone());
    }
}

/// Runner settings.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Ticks per second; `None` ticks once per recorded frame, which is what
    /// the speed estimate (distance × frame rate) assumes
    pub tick_rate_hz: Option<f64>,

    /// Stop after this many ticks even if playback has not ended
    pub max_ticks: Option<u64>,
}

impl RunnerConfig {
    /// Sets the tick rate. Non-positive rates fall back to the frame rate.
    pub fn with_tick_rate(mut self, hz: f64) -> Self {
        self.tick_rate_hz = (hz.is_finite() && hz > 0.0).then_some(hz);
        self
    }

    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Effective ticks per second for `session`.
    pub fn tick_rate_for(&self, session: &Session) -> f64 {
        self.tick_rate_hz.unwrap_or_else(|| session.store().frame_rate())
    }
}

/// Totals of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub final_time: f64,
    pub collisions_emitted: usize,
    pub speed_violations_emitted: usize,
    /// Time spent on the clock (virtual for `ManualClock`)
    pub clock_elapsed: Duration,
}

pub struct PlaybackRunner {
    config: RunnerConfig,
}

impl PlaybackRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Plays `session` from its current cursor until playback ends (or
    /// `max_ticks`), pacing ticks with `clock`.
    pub async fn run<C, S>(
        &self,
        session: &mut Session,
        clock: &C,
        sink: &mut S,
    ) -> Result<RunSummary, RunError>
    where
        C: PlaybackClock,
        S: FrameSink,
    {
        let hz = self.config.tick_rate_for(session);
        let dt = 1.0 / hz;
        let period = Duration::try_from_secs_f64(dt).map_err(|_| RunError::TickPeriod { hz })?;
        let started = clock.now();

        info!(
            "Playing {:.2}s at {:.1} Hz ({})",
            session.max_time() - session.current_time(),
            hz,
            if clock.is_realtime() { "real time" } else { "virtual time" }
        );

        let mut summary = RunSummary::default();
        session.play();

        while session.is_playing() {
            if self.config.max_ticks.is_some_and(|max| summary.ticks >= max) {
                warn!("Tick limit {} reached at {:.2}s", summary.ticks, session.current_time());
                session.pause();
                break;
            }

            clock.sleep(period).await;
            let Some(snapshot) = session.advance(dt) else {
                break;
            };

            summary.ticks += 1;
            summary.collisions_emitted += snapshot.collisions.len();
            summary.speed_violations_emitted += snapshot.speed_violations.len();

            if summary.ticks % 30 == 0 {
                debug!(
                    "  t={:.2}s | drones={} | collisions={} | speed={}",
                    snapshot.time,
                    snapshot.positions.len(),
                    session.collisions().len(),
                    session.speed_warnings().len()
                );
            }

            sink.on_frame(&snapshot);
        }

        summary.final_time = session.current_time();
        summary.clock_elapsed = clock.now().saturating_sub(started);
        Ok(summary)
    }
}

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether the run met the scenario's expectation
    pub passed: bool,

    pub total_ticks: u64,

    /// Final playback time in seconds
    pub final_time_secs: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    pub report: SessionReport,
}

/// Runs generated scenarios on a virtual clock.
pub struct ScenarioRunner {
    seed: u64,
    engine: EngineConfig,
    runner: RunnerConfig,
}

impl ScenarioRunner {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            engine: EngineConfig::default(),
            runner: RunnerConfig::default(),
        }
    }

    pub fn with_engine_config(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_runner_config(mut self, runner: RunnerConfig) -> Self {
        self.runner = runner;
        self
    }

    pub fn dataset(&self, scenario: ScenarioId) -> Dataset {
        scenario.build(self.seed)
    }

    /// Runs a scenario and checks its expectation.
    pub async fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, RunError> {
        self.run_with_sink(scenario, &mut NullSink).await
    }

    pub async fn run_with_sink<S: FrameSink>(
        &self,
        scenario: ScenarioId,
        sink: &mut S,
    ) -> Result<ScenarioResult, RunError> {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let dataset = self.dataset(scenario);
        let mut session = Session::load(&dataset, self.engine.clone())?;
        let clock = ManualClock::new();

        let summary = PlaybackRunner::new(self.runner.clone())
            .run(&mut session, &clock, sink)
            .await?;

        let period = 1.0 / self.runner.tick_rate_for(&session);
        let report = SessionReport::from_session(&session, period * 1.5);
        let failure_reason = scenario.expectation().check(&report).err();

        Ok(ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            total_ticks: summary.ticks,
            final_time_secs: summary.final_time,
            failure_reason,
            report,
        })
    }
}

//! SkyReplay playback driver
//!
//! This crate is the external-facing side of the engine: it owns the time
//! cursor and calls into `skyreplay_core` once per rendered frame.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       PlaybackRunner                         │
//! │   loop { clock.sleep(frame) → session.advance(dt) → sink }   │
//! │       │                         │                  │         │
//! │  ┌────▼─────────┐      ┌────────▼───────┐   ┌──────▼──────┐  │
//! │  │ PlaybackClock│      │    Session     │   │  FrameSink  │  │
//! │  │ Tokio/Manual │      │ (core engine)  │   │  exporter   │  │
//! │  └──────────────┘      └────────▲───────┘   └─────────────┘  │
//! │                                 │                            │
//! │                ┌────────────────┴──────────────┐             │
//! │                │  Dataset: file or FlightOracle │             │
//! │                │  (synthetic scenarios)         │             │
//! │                └───────────────────────────────┘             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use skyreplay_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::HeadOn).await?;
//! assert!(result.passed);
//! ```

mod clock;
mod exporter;
mod oracle;
mod runner;
pub mod scenarios;

pub use clock::ManualClock;
pub use exporter::{DronePosition, ExportEvent, ExportFrame, PlaybackExport};
pub use oracle::{FlightOracle, PlannedFlight};
pub use runner::{
    FrameSink, NullSink, PlaybackRunner, RunError, RunSummary, RunnerConfig, ScenarioResult,
    ScenarioRunner,
};

//! SkyReplay Core - trajectory sampling and flight-safety analysis
//!
//! Replays recorded multi-drone flights and flags unsafe behavior as the
//! playback cursor moves:
//! 1. **Timeline**: validated per-drone waypoint timelines and frame↔seconds conversion
//! 2. **Interpolation**: continuous position between the two bracketing waypoints
//! 3. **Motion**: tick-to-tick speed against a safe maximum
//! 4. **Proximity**: brute-force pairwise separation against a collision radius
//!
//! A [`Session`] owns all of it for one loaded dataset and turns each
//! `tick(time)` into a [`TickSnapshot`] for the presentation layer.

pub mod config;
pub mod dataset;
pub mod event_log;
pub mod report;
pub mod session;
pub mod skyreplay_interp;
pub mod skyreplay_motion;
pub mod skyreplay_proximity;
pub mod skyreplay_timeline;

// Re-export key types for convenience
pub use config::{ConfigError, EngineConfig};
pub use dataset::{Dataset, DatasetError};
pub use event_log::EventLog;
pub use report::{AgentSummary, SessionReport};
pub use session::{LoadError, PlaybackState, Session, TickSnapshot};
pub use skyreplay_interp::{position_at, Interpolator};
pub use skyreplay_motion::{AgentRuntime, MotionAnalyzer, SpeedViolation};
pub use skyreplay_proximity::{collision_episodes, min_separation, CollisionEpisode, CollisionEvent, ProximityDetector};
pub use skyreplay_timeline::{AgentId, AgentTimeline, TimelineStore, Waypoint};

//! Playback session - one loaded dataset and everything derived from it.
//!
//! A `Session` is built at load time and passed by `&mut` to every playback
//! operation; there is no global state. A tick runs in two phases:
//!
//! ```text
//!  tick(time)
//!    │
//!    ├─ for each drone: Interpolator → position? → MotionAnalyzer.observe
//!    │
//!    └─ ProximityDetector.scan_all(all positions of this tick)
//!         │
//!         └─ TickSnapshot { positions, new speed violations, new collisions }
//! ```
//!
//! Every drone is resolved before the proximity scan runs, so the scan never
//! mixes positions from different ticks. `seek` and `reset` need `&mut self`
//! and can only happen between ticks.

use crate::config::{ConfigError, EngineConfig};
use crate::dataset::{Dataset, DatasetError};
use crate::event_log::EventLog;
use crate::skyreplay_interp::Interpolator;
use crate::skyreplay_motion::{MotionAnalyzer, SpeedViolation};
use crate::skyreplay_proximity::{CollisionEvent, ProximityDetector};
use crate::skyreplay_timeline::{AgentId, TimelineStore};

use nalgebra::Vector3;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Cursor distance from `max_time` treated as the end.
const END_SNAP_SECS: f64 = 1e-9;

/// Why a session could not be created.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Playback cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    /// Seconds
    pub current_time: f64,
    pub is_playing: bool,
    /// Fixed at load
    pub max_time: f64,
}

/// Result of one tick, handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickSnapshot {
    pub time: f64,
    /// Scaled positions of the drones resolved this tick
    pub positions: BTreeMap<AgentId, Vector3<f64>>,
    /// Violations emitted by this tick only
    pub speed_violations: Vec<SpeedViolation>,
    /// Collisions emitted by this tick only
    pub collisions: Vec<CollisionEvent>,
}

impl TickSnapshot {
    pub fn has_events(&self) -> bool {
        !self.speed_violations.is_empty() || !self.collisions.is_empty()
    }
}

pub struct Session {
    config: EngineConfig,
    store: TimelineStore,
    interpolator: Interpolator,
    motion: MotionAnalyzer,
    proximity: ProximityDetector,
    playback: PlaybackState,
    collisions: EventLog<CollisionEvent>,
    speed_warnings: EventLog<SpeedViolation>,
    tick_count: u64,
}

impl Session {
    /// Validates `config` and `dataset` and builds a paused session at time 0.
    pub fn load(dataset: &Dataset, config: EngineConfig) -> Result<Self, LoadError> {
        config.validate()?;
        let store = TimelineStore::load(dataset, config.scale_factor)?;

        let interpolator = Interpolator::for_store(&store);
        let motion = MotionAnalyzer::new(store.agent_ids(), config.max_speed, store.frame_rate());
        let proximity = ProximityDetector::new(config.collision_radius);
        let playback = PlaybackState {
            current_time: 0.0,
            is_playing: false,
            max_time: store.max_time(),
        };

        info!(
            "Session ready: {} drones, radius {}, max speed {}",
            store.agent_count(),
            config.collision_radius,
            config.max_speed
        );

        Ok(Self {
            collisions: EventLog::with_capacity(config.log_capacity),
            speed_warnings: EventLog::with_capacity(config.log_capacity),
            config,
            store,
            interpolator,
            motion,
            proximity,
            playback,
            tick_count: 0,
        })
    }

    /// Reads and loads a dataset file.
    pub fn from_path(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self, LoadError> {
        let dataset = Dataset::from_path(path)?;
        Self::load(&dataset, config)
    }

    /// Evaluates every drone at `time` and appends new events to the logs.
    ///
    /// A non-finite `time` leaves the session untouched and yields an empty
    /// snapshot.
    pub fn tick(&mut self, time: f64) -> TickSnapshot {
        if !time.is_finite() {
            return TickSnapshot {
                time: self.playback.current_time,
                ..Default::default()
            };
        }
        self.playback.current_time = time;
        self.tick_count += 1;

        let mut snapshot = TickSnapshot {
            time,
            ..Default::default()
        };

        for timeline in self.store.timelines() {
            let Some(position) = self.interpolator.position_at(timeline, time) else {
                continue;
            };
            let agent = timeline.agent_id();
            snapshot.positions.insert(agent, position);

            if let Some(violation) = self.motion.observe(agent, position, time) {
                snapshot.speed_violations.push(violation);
            }
        }

        snapshot.collisions = self.proximity.scan_all(&snapshot.positions, time);
        for event in &snapshot.collisions {
            debug!("Collision: {}", event);
        }

        self.speed_warnings.extend(snapshot.speed_violations.iter().copied());
        self.collisions.extend(snapshot.collisions.iter().copied());

        snapshot
    }

    /// Moves the cursor forward by `dt` and ticks, while playing.
    ///
    /// The cursor never moves backwards and stops at `max_time`, which also
    /// pauses playback. Returns `None` when paused.
    pub fn advance(&mut self, dt: f64) -> Option<TickSnapshot> {
        if !self.playback.is_playing {
            return None;
        }

        let step = dt.max(0.0);
        let mut next = (self.playback.current_time + step).min(self.playback.max_time);
        // Repeated float steps land a hair short of the end
        if self.playback.max_time - next <= END_SNAP_SECS {
            next = self.playback.max_time;
        }
        if next >= self.playback.max_time {
            self.playback.is_playing = false;
            info!("Playback reached the end at {:.2}s", next);
        }
        Some(self.tick(next))
    }

    /// Moves the cursor to `time`, clamped to `[0, max_time]`. The next tick
    /// observes the new time. NaN is ignored.
    pub fn seek(&mut self, time: f64) {
        if time.is_nan() {
            return;
        }
        self.playback.current_time = time.clamp(0.0, self.playback.max_time.max(0.0));
        if self.config.rebaseline_on_seek {
            self.motion.clear_baselines();
        }
    }

    /// Seeks to a scrub position in `[0, 100]`.
    pub fn seek_normalized(&mut self, percent: f64) {
        if percent.is_nan() {
            return;
        }
        let fraction = percent.clamp(0.0, 100.0) / 100.0;
        self.seek(fraction * self.playback.max_time);
    }

    /// Current cursor as a scrub position in `[0, 100]`.
    pub fn scrub_position(&self) -> f64 {
        if self.playback.max_time <= 0.0 {
            return 0.0;
        }
        (self.playback.current_time / self.playback.max_time * 100.0).clamp(0.0, 100.0)
    }

    /// Back to time 0, paused, with fresh speed baselines. The event logs
    /// are cumulative for the whole session and are kept.
    pub fn reset(&mut self) {
        self.playback.current_time = 0.0;
        self.playback.is_playing = false;
        self.motion.clear_baselines();
    }

    /// Starts playback; from the end it restarts at 0.
    pub fn play(&mut self) {
        if self.playback.current_time >= self.playback.max_time {
            self.seek(0.0);
        }
        self.playback.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.playback.is_playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playback.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing
    }

    pub fn current_time(&self) -> f64 {
        self.playback.current_time
    }

    pub fn max_time(&self) -> f64 {
        self.playback.max_time
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &TimelineStore {
        &self.store
    }

    pub fn motion(&self) -> &MotionAnalyzer {
        &self.motion
    }

    pub fn collisions(&self) -> &EventLog<CollisionEvent> {
        &self.collisions
    }

    pub fn speed_warnings(&self) -> &EventLog<SpeedViolation> {
        &self.speed_warnings
    }

    /// `"Drone {a} and Drone {b} at {time}s"` per logged collision.
    pub fn collision_lines(&self) -> Vec<String> {
        self.collisions.lines()
    }

    /// `"Drone {id} at {time}s ({speed} m/s)"` per logged violation.
    pub fn speed_warning_lines(&self) -> Vec<String> {
        self.speed_warnings.lines()
    }
}

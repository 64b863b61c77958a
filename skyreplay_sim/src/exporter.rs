//! JSON exporter for playback runs.
//!
//! Exports sampled frames plus the final report so a viewer can replay the
//! run without the engine.

use crate::runner::FrameSink;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use skyreplay_core::{SessionReport, TickSnapshot};
use std::fs::File;
use std::io::Write;

/// A single exported frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFrame {
    /// Playback time in seconds
    pub time_sec: f64,

    /// Drones resolved on this tick (scaled units)
    pub drones: Vec<DronePosition>,

    /// Collisions and speed warnings emitted on this tick
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<ExportEvent>,
}

/// Position of a drone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DronePosition {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl DronePosition {
    pub fn new(id: usize, pos: &Vector3<f64>) -> Self {
        Self {
            id,
            x: pos.x,
            y: pos.y,
            z: pos.z,
        }
    }
}

/// Safety event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEvent {
    /// "collision" or "speed"
    pub kind: String,
    pub message: String,
}

/// Complete playback export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackExport {
    /// Dataset path or scenario name
    pub source: String,

    /// Seed used (scenarios only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Last exported time in seconds
    pub duration_sec: f64,

    /// Every n-th tick is kept; ticks with events are always kept
    pub frame_interval: u64,

    pub frames: Vec<ExportFrame>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SessionReport>,

    #[serde(skip)]
    seen_ticks: u64,
}

impl PlaybackExport {
    /// Creates a new export container.
    pub fn new(source: &str, seed: Option<u64>, frame_interval: u64) -> Self {
        Self {
            source: source.to_string(),
            seed,
            duration_sec: 0.0,
            frame_interval: frame_interval.max(1),
            frames: Vec::new(),
            report: None,
            seen_ticks: 0,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: ExportFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Attaches the final report.
    pub fn finalize(&mut self, report: SessionReport) {
        self.report = Some(report);
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

impl FrameSink for PlaybackExport {
    fn on_frame(&mut self, snapshot: &TickSnapshot) {
        let tick = self.seen_ticks;
        self.seen_ticks += 1;

        if tick % self.frame_interval != 0 && !snapshot.has_events() {
            return;
        }

        let drones = snapshot
            .positions
            .iter()
            .map(|(id, pos)| DronePosition::new(*id, pos))
            .collect();

        let events = snapshot
            .collisions
            .iter()
            .map(|c| ExportEvent {
                kind: "collision".to_string(),
                message: c.to_string(),
            })
            .chain(snapshot.speed_violations.iter().map(|v| ExportEvent {
                kind: "speed".to_string(),
                message: v.to_string(),
            }))
            .collect();

        self.add_frame(ExportFrame {
            time_sec: snapshot.time,
            drones,
            events,
        });
    }
}

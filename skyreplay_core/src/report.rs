//! Session report - summary of a playback run for display or export.

use crate::session::Session;
use crate::skyreplay_motion::SpeedViolation;
use crate::skyreplay_proximity::{collision_episodes, CollisionEpisode, CollisionEvent};
use crate::skyreplay_timeline::AgentId;
use serde::{Deserialize, Serialize};

/// Per-drone summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent_id: AgentId,
    pub samples: u64,
    pub peak_speed: f64,
    pub speed_violations: usize,
    pub collisions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub drones: usize,
    pub frame_rate: f64,
    pub max_time: f64,
    pub ticks: u64,
    pub collision_radius: f64,
    pub max_speed: f64,

    /// Retained log entries
    pub collision_count: usize,
    pub speed_violation_count: usize,
    /// Entries dropped by a bounded log
    pub evicted_events: u64,

    pub agents: Vec<AgentSummary>,
    pub episodes: Vec<CollisionEpisode>,

    /// Rendered log lines, oldest first
    pub collisions: Vec<String>,
    pub speed_warnings: Vec<String>,
}

impl SessionReport {
    /// Builds the report. `tick_period` is the largest gap (seconds) still
    /// considered continuous when merging collision records into episodes.
    pub fn from_session(session: &Session, tick_period: f64) -> Self {
        let collisions: Vec<&CollisionEvent> = session.collisions().iter().collect();
        let warnings: Vec<&SpeedViolation> = session.speed_warnings().iter().collect();

        let agents = session
            .motion()
            .runtimes()
            .map(|runtime| AgentSummary {
                agent_id: runtime.agent_id,
                samples: runtime.samples,
                peak_speed: runtime.peak_speed,
                speed_violations: warnings.iter().filter(|w| w.agent_id == runtime.agent_id).count(),
                collisions: collisions
                    .iter()
                    .filter(|c| c.agent_a == runtime.agent_id || c.agent_b == runtime.agent_id)
                    .count(),
            })
            .collect();

        let config = session.config();
        Self {
            drones: session.store().agent_count(),
            frame_rate: session.store().frame_rate(),
            max_time: session.max_time(),
            ticks: session.tick_count(),
            collision_radius: config.collision_radius,
            max_speed: config.max_speed,
            collision_count: collisions.len(),
            speed_violation_count: warnings.len(),
            evicted_events: session.collisions().evicted() + session.speed_warnings().evicted(),
            agents,
            episodes: collision_episodes(collisions.iter().copied(), tick_period),
            collisions: session.collision_lines(),
            speed_warnings: session.speed_warning_lines(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.collision_count == 0 && self.speed_violation_count == 0
    }

    /// Plain-text rendering: a summary box followed by both event lists.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("╔══════════════════════════════════════════════════════════════╗\n");
        out.push_str("║                   SKYREPLAY SAFETY REPORT                    ║\n");
        out.push_str("╠══════════════════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║ Drones:                {:>10}                            ║\n", self.drones));
        out.push_str(&format!("║ Duration:              {:>10.2} s                          ║\n", self.max_time));
        out.push_str(&format!("║ Ticks:                 {:>10}                            ║\n", self.ticks));
        out.push_str(&format!("║ Collisions:            {:>10}                            ║\n", self.collision_count));
        out.push_str(&format!("║ Collision episodes:    {:>10}                            ║\n", self.episodes.len()));
        out.push_str(&format!("║ Speed violations:      {:>10}                            ║\n", self.speed_violation_count));
        if self.evicted_events > 0 {
            out.push_str(&format!("║ Evicted events:        {:>10}                            ║\n", self.evicted_events));
        }
        out.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        if !self.collisions.is_empty() {
            out.push_str("Collisions:\n");
            for line in &self.collisions {
                out.push_str(&format!("  {}\n", line));
            }
        }
        if !self.speed_warnings.is_empty() {
            out.push_str("Speed warnings:\n");
            for line in &self.speed_warnings {
                out.push_str(&format!("  {}\n", line));
            }
        }
        out
    }
}

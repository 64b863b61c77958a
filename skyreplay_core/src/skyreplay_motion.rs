//! Motion Analyzer - tick-to-tick speed checks.
//!
//! Speed is approximated as `distance * frame_rate`: successive observations
//! are assumed to be one frame period apart. Real elapsed time between two
//! calls is not measured.

use crate::skyreplay_timeline::AgentId;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A tick-to-tick displacement implying speed above the safe maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedViolation {
    pub agent_id: AgentId,
    /// Playback time in seconds
    pub time: f64,
    /// Scaled units per second
    pub speed: f64,
}

impl fmt::Display for SpeedViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Drone {} at {:.2}s ({:.2} m/s)",
            self.agent_id, self.time, self.speed
        )
    }
}

/// Per-drone state carried across ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentRuntime {
    pub agent_id: AgentId,
    /// Position from the last tick where interpolation succeeded
    pub last_position: Option<Vector3<f64>>,
    /// Highest speed derived so far
    pub peak_speed: f64,
    /// Number of observations
    pub samples: u64,
}

impl AgentRuntime {
    pub fn new(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct MotionAnalyzer {
    max_speed: f64,
    frame_rate: f64,
    runtimes: BTreeMap<AgentId, AgentRuntime>,
}

impl MotionAnalyzer {
    /// Creates an analyzer with one runtime per drone.
    pub fn new(agents: impl IntoIterator<Item = AgentId>, max_speed: f64, frame_rate: f64) -> Self {
        let runtimes = agents
            .into_iter()
            .map(|id| (id, AgentRuntime::new(id)))
            .collect();
        Self {
            max_speed,
            frame_rate,
            runtimes,
        }
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Records `position` for `agent` and checks the implied speed.
    ///
    /// The first observation only sets the baseline. The baseline is always
    /// moved to `position`, violation or not.
    pub fn observe(&mut self, agent: AgentId, position: Vector3<f64>, time: f64) -> Option<SpeedViolation> {
        let frame_rate = self.frame_rate;
        let runtime = self
            .runtimes
            .entry(agent)
            .or_insert_with(|| AgentRuntime::new(agent));

        runtime.samples += 1;
        let previous = runtime.last_position.replace(position)?;

        let speed = (position - previous).norm() * frame_rate;
        runtime.peak_speed = runtime.peak_speed.max(speed);

        if speed > self.max_speed {
            debug!(
                "Speed violation: drone {} at {:.2}s ({:.2} > {:.2})",
                agent, time, speed, self.max_speed
            );
            Some(SpeedViolation {
                agent_id: agent,
                time,
                speed,
            })
        } else {
            None
        }
    }

    /// Forgets every baseline. Runtimes and peak speeds survive.
    pub fn clear_baselines(&mut self) {
        for runtime in self.runtimes.values_mut() {
            runtime.last_position = None;
        }
    }

    pub fn runtime(&self, agent: AgentId) -> Option<&AgentRuntime> {
        self.runtimes.get(&agent)
    }

    pub fn runtimes(&self) -> impl Iterator<Item = &AgentRuntime> {
        self.runtimes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_sets_baseline() {
        let mut analyzer = MotionAnalyzer::new([0], 5.0, 10.0);

        let far = Vector3::new(1e9, -1e9, 1e9);
        assert_eq!(analyzer.observe(0, far, 0.0), None);
        assert_eq!(analyzer.runtime(0).unwrap().last_position, Some(far));
    }

    #[test]
    fn test_fast_jump_emits_one_violation() {
        let mut analyzer = MotionAnalyzer::new([0], 5.0, 10.0);

        assert_eq!(analyzer.observe(0, Vector3::zeros(), 0.0), None);
        let violation = analyzer
            .observe(0, Vector3::new(100.0, 0.0, 0.0), 0.1)
            .unwrap();

        assert_eq!(violation.agent_id, 0);
        assert_eq!(violation.time, 0.1);
        assert_eq!(violation.speed, 1000.0);
    }

    #[test]
    fn test_speed_at_threshold_is_allowed() {
        // 0.5 units per frame at 10 fps is exactly 5 units/s
        let mut analyzer = MotionAnalyzer::new([3], 5.0, 10.0);

        analyzer.observe(3, Vector3::zeros(), 0.0);
        assert_eq!(analyzer.observe(3, Vector3::new(0.0, 0.5, 0.0), 0.1), None);
        assert_eq!(analyzer.runtime(3).unwrap().peak_speed, 5.0);
    }

    #[test]
    fn test_baseline_moves_even_after_violation() {
        let mut analyzer = MotionAnalyzer::new([0], 5.0, 10.0);

        analyzer.observe(0, Vector3::zeros(), 0.0);
        assert!(analyzer.observe(0, Vector3::new(10.0, 0.0, 0.0), 0.1).is_some());
        // Measured from the new baseline, this step is slow
        assert_eq!(analyzer.observe(0, Vector3::new(10.1, 0.0, 0.0), 0.2), None);
        assert_eq!(analyzer.runtime(0).unwrap().samples, 3);
    }

    #[test]
    fn test_clear_baselines_keeps_runtimes() {
        let mut analyzer = MotionAnalyzer::new([0, 1], 5.0, 10.0);

        analyzer.observe(0, Vector3::zeros(), 0.0);
        analyzer.observe(0, Vector3::new(3.0, 4.0, 0.0), 0.1);
        analyzer.clear_baselines();

        let runtime = analyzer.runtime(0).unwrap();
        assert_eq!(runtime.last_position, None);
        assert_eq!(runtime.peak_speed, 50.0);
        assert_eq!(analyzer.runtimes().count(), 2);

        // Next observation is a fresh baseline again
        assert_eq!(analyzer.observe(0, Vector3::new(500.0, 0.0, 0.0), 0.2), None);
    }

    #[test]
    fn test_violation_display() {
        let v = SpeedViolation {
            agent_id: 2,
            time: 1.0 / 3.0,
            speed: 12.3456,
        };
        assert_eq!(v.to_string(), "Drone 2 at 0.33s (12.35 m/s)");
    }
}

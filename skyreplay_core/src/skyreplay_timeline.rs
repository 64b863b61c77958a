//! Timeline Store - validated per-drone waypoint timelines.
//!
//! A dataset is loaded once and never mutated afterwards: no drone can be
//! added or removed, and every timeline is guaranteed to hold at least one
//! waypoint with strictly increasing frames. The interpolator relies on the
//! latter to never divide by a zero-length frame interval.

use crate::dataset::{Dataset, DatasetError};
use nalgebra::Vector3;
use tracing::info;

/// Drone identifier: the drone's index in the dataset.
pub type AgentId = usize;

/// A single recorded sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub frame: u64,
    /// Raw (unscaled) position
    pub position: Vector3<f64>,
}

/// One drone's ordered waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTimeline {
    agent_id: AgentId,
    waypoints: Vec<Waypoint>,
}

impl AgentTimeline {
    /// Builds a timeline, enforcing non-emptiness and strictly increasing frames.
    pub fn new(agent_id: AgentId, waypoints: Vec<Waypoint>) -> Result<Self, DatasetError> {
        if waypoints.is_empty() {
            return Err(DatasetError::EmptyTimeline { agent: agent_id });
        }
        for (index, pair) in waypoints.windows(2).enumerate() {
            if pair[1].frame <= pair[0].frame {
                return Err(DatasetError::NonIncreasingFrames {
                    agent: agent_id,
                    index: index + 1,
                    previous: pair[0].frame as i64,
                    frame: pair[1].frame as i64,
                });
            }
        }
        Ok(Self { agent_id, waypoints })
    }

    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn first(&self) -> &Waypoint {
        &self.waypoints[0]
    }

    pub fn last(&self) -> &Waypoint {
        &self.waypoints[self.waypoints.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Holds every timeline of one loaded dataset plus the global frame rate.
#[derive(Debug, Clone)]
pub struct TimelineStore {
    frame_rate: f64,
    scale_factor: f64,
    timelines: Vec<AgentTimeline>,
    max_time: f64,
}

impl TimelineStore {
    /// Validates and stores the dataset. No partial load: any malformed
    /// drone rejects the whole document.
    pub fn load(dataset: &Dataset, scale_factor: f64) -> Result<Self, DatasetError> {
        let frame_rate = dataset.framerate.ok_or(DatasetError::MissingFrameRate)?;
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(DatasetError::InvalidFrameRate(frame_rate));
        }
        if dataset.drones.is_empty() {
            return Err(DatasetError::NoAgents);
        }

        let mut timelines = Vec::with_capacity(dataset.drones.len());
        for (agent, drone) in dataset.drones.iter().enumerate() {
            let mut waypoints = Vec::with_capacity(drone.waypoints.len());
            for (index, raw) in drone.waypoints.iter().enumerate() {
                if raw.frame < 0 {
                    return Err(DatasetError::NegativeFrame {
                        agent,
                        index,
                        frame: raw.frame,
                    });
                }
                let position = raw.position.to_vector();
                if !position.iter().all(|c| c.is_finite()) {
                    return Err(DatasetError::NonFiniteCoordinate { agent, index });
                }
                waypoints.push(Waypoint {
                    frame: raw.frame as u64,
                    position,
                });
            }
            timelines.push(AgentTimeline::new(agent, waypoints)?);
        }

        // Playback length follows the first drone, the reference timeline
        let max_time = timelines[0].last().frame as f64 / frame_rate;

        info!(
            "Loaded {} drones at {} fps ({:.2}s of playback)",
            timelines.len(),
            frame_rate,
            max_time
        );

        Ok(Self {
            frame_rate,
            scale_factor,
            timelines,
            max_time,
        })
    }

    /// Samples per second.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Playback duration in seconds.
    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    pub fn frame_to_seconds(&self, frame: u64) -> f64 {
        frame as f64 / self.frame_rate
    }

    /// Floor of `seconds * frame_rate`; may be negative for negative times.
    pub fn seconds_to_frame(&self, seconds: f64) -> i64 {
        (seconds * self.frame_rate).floor() as i64
    }

    pub fn agent_count(&self) -> usize {
        self.timelines.len()
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.timelines.iter().map(|t| t.agent_id())
    }

    pub fn timelines(&self) -> &[AgentTimeline] {
        &self.timelines
    }

    pub fn timeline(&self, agent: AgentId) -> Option<&AgentTimeline> {
        self.timelines.get(agent)
    }

    /// Scaled position of the first waypoint, where a drone sits before its
    /// first interpolated tick.
    pub fn initial_position(&self, agent: AgentId) -> Option<Vector3<f64>> {
        self.timeline(agent)
            .map(|t| t.first().position * self.scale_factor)
    }

    /// Scaled waypoint polyline for drawing the flight path.
    pub fn trajectory(&self, agent: AgentId) -> Option<Vec<Vector3<f64>>> {
        self.timeline(agent).map(|t| {
            t.waypoints()
                .iter()
                .map(|wp| wp.position * self.scale_factor)
                .collect()
        })
    }

    /// Latest time at which any drone still has a waypoint.
    pub fn latest_end_time(&self) -> f64 {
        self.timelines
            .iter()
            .map(|t| self.frame_to_seconds(t.last().frame))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_drones() -> Dataset {
        let mut dataset = Dataset::new(10.0);
        dataset.push_drone([(0, 0.0, 0.0, 0.0), (50, 100.0, 0.0, 0.0)]);
        dataset.push_drone([(5, 0.0, 100.0, 0.0), (80, 0.0, 200.0, 0.0)]);
        dataset
    }

    #[test]
    fn test_load_computes_max_time_from_first_drone() {
        let store = TimelineStore::load(&two_drones(), 0.01).unwrap();
        assert_eq!(store.agent_count(), 2);
        assert_eq!(store.frame_rate(), 10.0);
        assert_eq!(store.max_time(), 5.0);
        assert_eq!(store.latest_end_time(), 8.0);
    }

    #[test]
    fn test_frame_second_conversion() {
        let store = TimelineStore::load(&two_drones(), 1.0).unwrap();
        assert_eq!(store.frame_to_seconds(25), 2.5);
        assert_eq!(store.seconds_to_frame(2.59), 25);
        assert_eq!(store.seconds_to_frame(-0.05), -1);
    }

    #[test]
    fn test_load_rejects_duplicate_frames() {
        let mut dataset = Dataset::new(10.0);
        dataset.push_drone([(0, 0.0, 0.0, 0.0), (10, 1.0, 0.0, 0.0), (10, 2.0, 0.0, 0.0)]);

        let err = TimelineStore::load(&dataset, 1.0).unwrap_err();
        assert!(err.is_malformed());
        assert!(matches!(
            err,
            DatasetError::NonIncreasingFrames { agent: 0, index: 2, previous: 10, frame: 10 }
        ));
    }

    #[test]
    fn test_load_rejects_decreasing_frames_in_later_drone() {
        let mut dataset = two_drones();
        dataset.push_drone([(20, 0.0, 0.0, 0.0), (10, 0.0, 0.0, 0.0)]);

        let err = TimelineStore::load(&dataset, 1.0).unwrap_err();
        assert!(matches!(err, DatasetError::NonIncreasingFrames { agent: 2, .. }));
    }

    #[test]
    fn test_load_rejects_empty_timeline() {
        let mut dataset = two_drones();
        dataset.push_drone(Vec::new());

        let err = TimelineStore::load(&dataset, 1.0).unwrap_err();
        assert!(matches!(err, DatasetError::EmptyTimeline { agent: 2 }));
    }

    #[test]
    fn test_load_rejects_bad_header() {
        let mut dataset = two_drones();
        dataset.framerate = None;
        assert!(matches!(
            TimelineStore::load(&dataset, 1.0),
            Err(DatasetError::MissingFrameRate)
        ));

        dataset.framerate = Some(0.0);
        assert!(matches!(
            TimelineStore::load(&dataset, 1.0),
            Err(DatasetError::InvalidFrameRate(_))
        ));

        assert!(matches!(
            TimelineStore::load(&Dataset::new(30.0), 1.0),
            Err(DatasetError::NoAgents)
        ));
    }

    #[test]
    fn test_load_rejects_negative_frame_and_nan() {
        let mut dataset = Dataset::new(10.0);
        dataset.push_drone([(-1, 0.0, 0.0, 0.0)]);
        assert!(matches!(
            TimelineStore::load(&dataset, 1.0),
            Err(DatasetError::NegativeFrame { agent: 0, index: 0, frame: -1 })
        ));

        let mut dataset = Dataset::new(10.0);
        dataset.push_drone([(0, 0.0, f64::NAN, 0.0)]);
        assert!(matches!(
            TimelineStore::load(&dataset, 1.0),
            Err(DatasetError::NonFiniteCoordinate { agent: 0, index: 0 })
        ));
    }

    #[test]
    fn test_single_waypoint_timeline_is_valid() {
        let mut dataset = Dataset::new(24.0);
        dataset.push_drone([(12, 1.0, 2.0, 3.0)]);

        let store = TimelineStore::load(&dataset, 1.0).unwrap();
        assert_eq!(store.timeline(0).unwrap().len(), 1);
        assert_eq!(store.max_time(), 0.5);
    }

    #[test]
    fn test_trajectory_and_initial_position_are_scaled() {
        let store = TimelineStore::load(&two_drones(), 0.01).unwrap();

        let path = store.trajectory(0).unwrap();
        assert_eq!(path, vec![Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0)]);
        assert_eq!(store.initial_position(1), Some(Vector3::new(0.0, 1.0, 0.0)));
        assert_eq!(store.trajectory(7), None);
    }
}

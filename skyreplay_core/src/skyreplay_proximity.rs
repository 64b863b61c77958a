//! Proximity Detector - exhaustive pairwise separation checks.
//!
//! Every unordered pair of drones with a position this tick is tested, so a
//! scan is O(n²). That is the known scaling ceiling of the engine: any
//! replacement (spatial index, sweep) must still report every pair strictly
//! closer than the threshold exactly once per scan.
//!
//! No debounce is applied. A pair that stays inside the threshold is
//! reported again on every scan; [`collision_episodes`] recovers the
//! continuous intervals from the cumulative log when needed.

use crate::skyreplay_timeline::AgentId;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Two drones closer than the minimum separation at `time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Always the lower id of the pair
    pub agent_a: AgentId,
    pub agent_b: AgentId,
    pub time: f64,
}

impl fmt::Display for CollisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Drone {} and Drone {} at {:.2}s",
            self.agent_a, self.agent_b, self.time
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProximityDetector {
    collision_radius: f64,
}

impl ProximityDetector {
    pub fn new(collision_radius: f64) -> Self {
        Self { collision_radius }
    }

    pub fn collision_radius(&self) -> f64 {
        self.collision_radius
    }

    /// Separation below which a pair collides.
    pub fn threshold(&self) -> f64 {
        2.0 * self.collision_radius
    }

    /// Checks every pair in `positions` and returns one event per pair
    /// strictly closer than [`threshold`](Self::threshold).
    ///
    /// Drones missing from `positions` (not resolved this tick) are skipped.
    /// Events come out ordered by `(agent_a, agent_b)`.
    pub fn scan_all(&self, positions: &BTreeMap<AgentId, Vector3<f64>>, time: f64) -> Vec<CollisionEvent> {
        let threshold = self.threshold();
        let entries: Vec<(AgentId, &Vector3<f64>)> = positions.iter().map(|(id, p)| (*id, p)).collect();

        let mut events = Vec::new();
        for (i, (agent_a, pos_a)) in entries.iter().enumerate() {
            for (agent_b, pos_b) in &entries[i + 1..] {
                if (*pos_a - *pos_b).norm() < threshold {
                    events.push(CollisionEvent {
                        agent_a: *agent_a,
                        agent_b: *agent_b,
                        time,
                    });
                }
            }
        }
        events
    }
}

/// Smallest pairwise distance among `positions`, if at least two are present.
pub fn min_separation(positions: &BTreeMap<AgentId, Vector3<f64>>) -> Option<f64> {
    let points: Vec<&Vector3<f64>> = positions.values().collect();
    let mut best: Option<f64> = None;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let d = (*a - *b).norm();
            best = Some(best.map_or(d, |m| m.min(d)));
        }
    }
    best
}

/// A maximal run of consecutive collision records for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEpisode {
    pub agent_a: AgentId,
    pub agent_b: AgentId,
    pub start: f64,
    pub end: f64,
    /// Number of records merged into this episode
    pub ticks: usize,
}

/// Groups collision records into per-pair episodes.
///
/// Records of the same pair are merged while each follows the previous one
/// by at most `max_gap` seconds (typically one tick period). Records must be
/// in log order; a record earlier than its predecessor (after a seek back)
/// starts a new episode. Output is sorted by pair, then start time.
pub fn collision_episodes<'a, I>(events: I, max_gap: f64) -> Vec<CollisionEpisode>
where
    I: IntoIterator<Item = &'a CollisionEvent>,
{
    let mut open: BTreeMap<(AgentId, AgentId), CollisionEpisode> = BTreeMap::new();
    let mut closed = Vec::new();

    for event in events {
        let key = (event.agent_a, event.agent_b);
        match open.get_mut(&key) {
            Some(ep) if event.time >= ep.end && event.time - ep.end <= max_gap => {
                ep.end = event.time;
                ep.ticks += 1;
            }
            _ => {
                let fresh = CollisionEpisode {
                    agent_a: event.agent_a,
                    agent_b: event.agent_b,
                    start: event.time,
                    end: event.time,
                    ticks: 1,
                };
                if let Some(done) = open.insert(key, fresh) {
                    closed.push(done);
                }
            }
        }
    }

    closed.extend(open.into_values());
    closed.sort_by(|a, b| {
        (a.agent_a, a.agent_b)
            .cmp(&(b.agent_a, b.agent_b))
            .then(a.start.total_cmp(&b.start))
    });
    closed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(points: &[(AgentId, f64, f64, f64)]) -> BTreeMap<AgentId, Vector3<f64>> {
        points
            .iter()
            .map(|&(id, x, y, z)| (id, Vector3::new(x, y, z)))
            .collect()
    }

    #[test]
    fn test_close_pair_collides() {
        let detector = ProximityDetector::new(1.0);
        let events = detector.scan_all(&positions(&[(0, 0.0, 0.0, 0.0), (1, 1.0, 0.0, 0.0)]), 2.5);

        assert_eq!(
            events,
            vec![CollisionEvent {
                agent_a: 0,
                agent_b: 1,
                time: 2.5
            }]
        );
    }

    #[test]
    fn test_distant_pair_does_not_collide() {
        let detector = ProximityDetector::new(1.0);
        let events = detector.scan_all(&positions(&[(0, 0.0, 0.0, 0.0), (1, 3.0, 0.0, 0.0)]), 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_exact_threshold_is_not_a_collision() {
        let detector = ProximityDetector::new(1.0);
        let events = detector.scan_all(&positions(&[(0, 0.0, 0.0, 0.0), (1, 0.0, 2.0, 0.0)]), 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_every_pair_reported_once_with_lower_id_first() {
        let detector = ProximityDetector::new(1.0);
        let events = detector.scan_all(
            &positions(&[
                (7, 0.0, 0.0, 0.5),
                (2, 0.0, 0.0, 0.0),
                (4, 0.5, 0.0, 0.0),
                (9, 100.0, 0.0, 0.0),
            ]),
            1.0,
        );

        let pairs: Vec<(AgentId, AgentId)> = events.iter().map(|e| (e.agent_a, e.agent_b)).collect();
        assert_eq!(pairs, vec![(2, 4), (2, 7), (4, 7)]);
    }

    #[test]
    fn test_repeated_scan_is_not_deduplicated() {
        let detector = ProximityDetector::new(1.0);
        let current = positions(&[(0, 0.0, 0.0, 0.0), (1, 1.0, 0.0, 0.0)]);

        let mut log = Vec::new();
        log.extend(detector.scan_all(&current, 3.0));
        log.extend(detector.scan_all(&current, 3.0));

        assert_eq!(log.len(), 2);
        assert_eq!(log[0], log[1]);
    }

    #[test]
    fn test_min_separation() {
        assert_eq!(min_separation(&positions(&[(0, 0.0, 0.0, 0.0)])), None);
        let sep = min_separation(&positions(&[
            (0, 0.0, 0.0, 0.0),
            (1, 3.0, 4.0, 0.0),
            (2, 10.0, 0.0, 0.0),
        ]));
        assert_eq!(sep, Some(5.0));
    }

    #[test]
    fn test_collision_episodes_merge_consecutive_ticks() {
        let ev = |a, b, time| CollisionEvent {
            agent_a: a,
            agent_b: b,
            time,
        };
        let log = vec![
            ev(0, 1, 1.0),
            ev(1, 2, 1.0),
            ev(0, 1, 1.1),
            ev(0, 1, 1.2),
            ev(0, 1, 3.0),
            ev(0, 1, 3.0),
        ];

        let episodes = collision_episodes(&log, 0.15);
        assert_eq!(episodes.len(), 3);

        assert_eq!((episodes[0].start, episodes[0].end, episodes[0].ticks), (1.0, 1.2, 3));
        // Same-time duplicates stay inside one episode
        assert_eq!((episodes[1].start, episodes[1].end, episodes[1].ticks), (3.0, 3.0, 2));
        assert_eq!((episodes[2].agent_a, episodes[2].agent_b), (1, 2));
    }

    #[test]
    fn test_collision_episodes_split_on_seek_back() {
        let ev = |time| CollisionEvent {
            agent_a: 0,
            agent_b: 1,
            time,
        };
        let log = vec![ev(2.0), ev(2.1), ev(0.5)];

        let episodes = collision_episodes(&log, 0.2);
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].start, 0.5);
        assert_eq!(episodes[1].start, 2.0);
    }

    #[test]
    fn test_collision_display() {
        let event = CollisionEvent {
            agent_a: 0,
            agent_b: 3,
            time: 12.0,
        };
        assert_eq!(event.to_string(), "Drone 0 and Drone 3 at 12.00s");
    }
}

//! Ground truth oracle for synthetic flights.
//!
//! The oracle knows the true constant-velocity path of every drone and
//! samples it into a recorded dataset the way a flight logger would: one
//! waypoint every few frames, with Gaussian jitter on each sample.

use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use skyreplay_core::Dataset;

/// A drone's true flight.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedFlight {
    pub id: usize,

    /// Position at `start_frame` (raw dataset units)
    pub start: Vector3<f64>,

    /// Raw units per second
    pub velocity: Vector3<f64>,

    pub start_frame: u64,
    pub end_frame: u64,
}

impl PlannedFlight {
    /// True position at `frame`.
    pub fn position_at_frame(&self, frame: u64, frame_rate: f64) -> Vector3<f64> {
        let elapsed = frame.saturating_sub(self.start_frame) as f64 / frame_rate;
        self.start + self.velocity * elapsed
    }
}

pub struct FlightOracle {
    /// Master seed (for logging)
    seed: u64,

    /// RNG for jitter and random flights
    rng: ChaCha8Rng,

    frame_rate: f64,

    /// Frames between two recorded waypoints
    waypoint_interval: u64,

    /// Sample jitter standard deviation (raw units)
    jitter_std: f64,

    flights: Vec<PlannedFlight>,
}

impl FlightOracle {
    pub fn new(seed: u64, frame_rate: f64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            frame_rate,
            waypoint_interval: 15,
            jitter_std: 2.0,
            flights: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Sets the sample jitter; 0 records the exact path.
    pub fn set_jitter(&mut self, std_dev: f64) {
        self.jitter_std = std_dev.max(0.0);
    }

    pub fn set_waypoint_interval(&mut self, frames: u64) {
        self.waypoint_interval = frames.max(1);
    }

    /// Adds a flight and returns its drone id.
    pub fn spawn_flight(
        &mut self,
        start: Vector3<f64>,
        velocity: Vector3<f64>,
        start_frame: u64,
        end_frame: u64,
    ) -> usize {
        let id = self.flights.len();
        self.flights.push(PlannedFlight {
            id,
            start,
            velocity,
            start_frame,
            end_frame: end_frame.max(start_frame),
        });
        id
    }

    /// Adds a flight with a random start inside `half_extent` of the origin
    /// (altitude in `[min_alt, min_alt + 2 * half_extent.y]`) and a random
    /// horizontal heading at up to `max_speed`.
    pub fn spawn_random_flight(
        &mut self,
        half_extent: Vector3<f64>,
        min_alt: f64,
        max_speed: f64,
        end_frame: u64,
    ) -> usize {
        let start = Vector3::new(
            self.rng.gen_range(-half_extent.x..=half_extent.x),
            min_alt + self.rng.gen_range(0.0..=2.0 * half_extent.y),
            self.rng.gen_range(-half_extent.z..=half_extent.z),
        );
        let heading = self.rng.gen_range(0.0..std::f64::consts::TAU);
        let speed = self.rng.gen_range(0.0..=max_speed);
        let velocity = Vector3::new(heading.cos() * speed, 0.0, heading.sin() * speed);
        self.spawn_flight(start, velocity, 0, end_frame)
    }

    pub fn flights(&self) -> &[PlannedFlight] {
        &self.flights
    }

    /// Samples every flight into a dataset. The last frame of each flight is
    /// always recorded.
    pub fn record(&mut self) -> Dataset {
        let mut dataset = Dataset::new(self.frame_rate);
        let noise = if self.jitter_std > 0.0 {
            Normal::new(0.0, self.jitter_std).ok()
        } else {
            None
        };

        let flights = self.flights.clone();
        for flight in &flights {
            let mut frames: Vec<u64> = (flight.start_frame..=flight.end_frame)
                .step_by(self.waypoint_interval as usize)
                .collect();
            if frames.last() != Some(&flight.end_frame) {
                frames.push(flight.end_frame);
            }

            let samples: Vec<(i64, f64, f64, f64)> = frames
                .into_iter()
                .map(|frame| {
                    let mut pos = flight.position_at_frame(frame, self.frame_rate);
                    if let Some(normal) = &noise {
                        pos += Vector3::new(
                            normal.sample(&mut self.rng),
                            normal.sample(&mut self.rng),
                            normal.sample(&mut self.rng),
                        );
                    }
                    (frame as i64, pos.x, pos.y, pos.z)
                })
                .collect();
            dataset.push_drone(samples);
        }
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyreplay_core::TimelineStore;

    #[test]
    fn test_oracle_spawn_flight() {
        let mut oracle = FlightOracle::new(42, 30.0);

        let id = oracle.spawn_flight(
            Vector3::new(100.0, 200.0, 50.0),
            Vector3::new(10.0, 0.0, 0.0),
            0,
            300,
        );

        let flight = &oracle.flights()[id];
        assert_eq!(flight.start.x, 100.0);
        // 30 frames at 30 fps is one second at 10 units/s
        assert!((flight.position_at_frame(30, 30.0).x - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_without_jitter_is_exact() {
        let mut oracle = FlightOracle::new(42, 10.0);
        oracle.set_jitter(0.0);
        oracle.set_waypoint_interval(4);
        oracle.spawn_flight(Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0), 0, 10);

        let dataset = oracle.record();
        let frames: Vec<i64> = dataset.drones[0].waypoints.iter().map(|w| w.frame).collect();
        assert_eq!(frames, vec![0, 4, 8, 10]);
        assert_eq!(dataset.drones[0].waypoints[3].position.lng_x, 1.0);
    }

    #[test]
    fn test_recorded_dataset_loads() {
        let mut oracle = FlightOracle::new(7, 30.0);
        for _ in 0..5 {
            oracle.spawn_random_flight(Vector3::new(1000.0, 200.0, 1000.0), 500.0, 300.0, 240);
        }

        let dataset = oracle.record();
        let store = TimelineStore::load(&dataset, 0.01).unwrap();
        assert_eq!(store.agent_count(), 5);
        assert_eq!(store.max_time(), 8.0);
    }

    #[test]
    fn test_oracle_deterministic_noise() {
        let build = || {
            let mut oracle = FlightOracle::new(42, 30.0);
            oracle.spawn_flight(Vector3::zeros(), Vector3::zeros(), 0, 60);
            oracle.record()
        };

        // Same seed = same jitter
        assert_eq!(build(), build());
    }
}

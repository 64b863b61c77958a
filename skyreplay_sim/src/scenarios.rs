//! Synthetic flight scenarios with known safety outcomes.

use crate::oracle::FlightOracle;
use nalgebra::Vector3;
use skyreplay_core::{Dataset, SessionReport};

/// Frame rate of every generated dataset.
pub const SCENARIO_FRAME_RATE: f64 = 30.0;

/// Length of every generated dataset in frames (10 s).
pub const SCENARIO_FRAMES: u64 = 300;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Two drones on the same line flying at each other
    HeadOn,

    /// Two drones crossing the same point seconds apart
    Crossing,

    /// One drone well above the speed limit
    Speeding,

    /// Four drones in parallel lanes
    Formation,

    /// Random fleet, informational only
    Swarm,
}

/// What a scenario run must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Neither collisions nor speed violations
    Clean,
    /// At least one collision and no speed violation
    Collisions,
    /// At least one speed violation and no collision
    SpeedViolations,
    /// Anything goes
    Any,
}

impl Expectation {
    /// Checks a finished run. `Err` carries the failure reason.
    pub fn check(&self, report: &SessionReport) -> Result<(), String> {
        let collisions = report.collision_count;
        let speeding = report.speed_violation_count;
        let ok = match self {
            Expectation::Clean => collisions == 0 && speeding == 0,
            Expectation::Collisions => collisions > 0 && speeding == 0,
            Expectation::SpeedViolations => speeding > 0 && collisions == 0,
            Expectation::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(format!(
                "expected {:?}, got {} collisions and {} speed violations",
                self, collisions, speeding
            ))
        }
    }
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::HeadOn,
            ScenarioId::Crossing,
            ScenarioId::Speeding,
            ScenarioId::Formation,
            ScenarioId::Swarm,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::HeadOn => "head_on",
            ScenarioId::Crossing => "crossing",
            ScenarioId::Speeding => "speeding",
            ScenarioId::Formation => "formation",
            ScenarioId::Swarm => "swarm",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::HeadOn => "2 drones closing at 6 u/s on one line, meeting mid-flight",
            ScenarioId::Crossing => "2 drones over the same point 5s apart, never closer than ~10 u",
            ScenarioId::Speeding => "1 drone at 10 u/s against a 5 u/s limit, 1 slow drone far away",
            ScenarioId::Formation => "4 drones in parallel lanes 5 u apart at 3 u/s",
            ScenarioId::Swarm => "12 drones with random starts and headings",
        }
    }

    pub fn expectation(&self) -> Expectation {
        match self {
            ScenarioId::HeadOn => Expectation::Collisions,
            ScenarioId::Crossing => Expectation::Clean,
            ScenarioId::Speeding => Expectation::SpeedViolations,
            ScenarioId::Formation => Expectation::Clean,
            ScenarioId::Swarm => Expectation::Any,
        }
    }

    /// Generates the scenario's dataset in raw units (default scale 0.01).
    pub fn build(&self, seed: u64) -> Dataset {
        let mut oracle = FlightOracle::new(seed, SCENARIO_FRAME_RATE);
        let end = SCENARIO_FRAMES;

        match self {
            ScenarioId::HeadOn => {
                oracle.spawn_flight(Vector3::new(-1500.0, 1000.0, 0.0), Vector3::new(300.0, 0.0, 0.0), 0, end);
                oracle.spawn_flight(Vector3::new(1500.0, 1000.0, 0.0), Vector3::new(-300.0, 0.0, 0.0), 0, end);
            }
            ScenarioId::Crossing => {
                oracle.spawn_flight(Vector3::new(-1500.0, 1000.0, 0.0), Vector3::new(300.0, 0.0, 0.0), 0, end);
                oracle.spawn_flight(Vector3::new(0.0, 1000.0, -3000.0), Vector3::new(0.0, 0.0, 300.0), 0, end);
            }
            ScenarioId::Speeding => {
                oracle.spawn_flight(Vector3::new(-5000.0, 1500.0, 0.0), Vector3::new(1000.0, 0.0, 0.0), 0, end);
                oracle.spawn_flight(Vector3::new(0.0, 800.0, 4000.0), Vector3::new(0.0, 0.0, 100.0), 0, end);
            }
            ScenarioId::Formation => {
                for lane in 0..4 {
                    let z = lane as f64 * 500.0;
                    oracle.spawn_flight(Vector3::new(-1500.0, 1000.0, z), Vector3::new(300.0, 0.0, 0.0), 0, end);
                }
            }
            ScenarioId::Swarm => {
                for _ in 0..12 {
                    oracle.spawn_random_flight(Vector3::new(2000.0, 500.0, 2000.0), 500.0, 400.0, end);
                }
            }
        }

        oracle.record()
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "head_on" | "headon" => Ok(ScenarioId::HeadOn),
            "crossing" => Ok(ScenarioId::Crossing),
            "speeding" => Ok(ScenarioId::Speeding),
            "formation" => Ok(ScenarioId::Formation),
            "swarm" => Ok(ScenarioId::Swarm),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

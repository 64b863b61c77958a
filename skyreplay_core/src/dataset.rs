//! Recorded flight dataset - the JSON wire format.
//!
//! ```text
//! {
//!   "framerate": 30,
//!   "drones": [
//!     { "waypoints": [ { "frame": 0, "position": { "lng_X": 0, "alt_Y": 120, "lat_Z": 0 } } ] }
//!   ]
//! }
//! ```
//!
//! Axis mapping: `lng_X → x`, `alt_Y → y`, `lat_Z → z`. Values are raw; the
//! engine applies its scale factor on read.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading or validating a dataset.
///
/// Every variant except `Io` and `Parse` is a malformed-content error: the
/// document was readable but violates a timeline invariant.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON for the dataset schema
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// `framerate` is absent
    #[error("Malformed dataset: missing frame rate")]
    MissingFrameRate,

    /// `framerate` is zero, negative or not finite
    #[error("Malformed dataset: invalid frame rate {0}")]
    InvalidFrameRate(f64),

    /// `drones` is empty
    #[error("Malformed dataset: no drones")]
    NoAgents,

    /// A drone has no waypoints
    #[error("Malformed dataset: drone {agent} has no waypoints")]
    EmptyTimeline { agent: usize },

    /// A waypoint frame is below zero
    #[error("Malformed dataset: drone {agent} waypoint {index} has negative frame {frame}")]
    NegativeFrame { agent: usize, index: usize, frame: i64 },

    /// Frames must strictly increase (duplicates included)
    #[error("Malformed dataset: drone {agent} waypoint {index} has frame {frame} after frame {previous}")]
    NonIncreasingFrames {
        agent: usize,
        index: usize,
        previous: i64,
        frame: i64,
    },

    /// A coordinate is NaN or infinite
    #[error("Malformed dataset: drone {agent} waypoint {index} has a non-finite coordinate")]
    NonFiniteCoordinate { agent: usize, index: usize },
}

impl DatasetError {
    /// Returns true for content errors (as opposed to I/O or JSON syntax).
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Parse(_))
    }
}

/// Raw position as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    #[serde(rename = "lng_X")]
    pub lng_x: f64,
    #[serde(rename = "alt_Y")]
    pub alt_y: f64,
    #[serde(rename = "lat_Z")]
    pub lat_z: f64,
}

impl RawPosition {
    pub fn new(lng_x: f64, alt_y: f64, lat_z: f64) -> Self {
        Self { lng_x, alt_y, lat_z }
    }

    /// Maps the file axes onto engine axes (unscaled).
    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.lng_x, self.alt_y, self.lat_z)
    }

    pub fn from_vector(v: &Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWaypoint {
    /// Signed so that negative frames reach validation instead of failing as
    /// an opaque parse error
    pub frame: i64,
    pub position: RawPosition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDrone {
    #[serde(default)]
    pub waypoints: Vec<RawWaypoint>,
}

/// A complete recorded dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framerate: Option<f64>,

    #[serde(default)]
    pub drones: Vec<RawDrone>,
}

impl Dataset {
    /// Creates an empty dataset at the given frame rate.
    pub fn new(framerate: f64) -> Self {
        Self {
            framerate: Some(framerate),
            drones: Vec::new(),
        }
    }

    /// Appends a drone built from `(frame, x, y, z)` samples and returns its id.
    pub fn push_drone<I>(&mut self, samples: I) -> usize
    where
        I: IntoIterator<Item = (i64, f64, f64, f64)>,
    {
        let waypoints = samples
            .into_iter()
            .map(|(frame, x, y, z)| RawWaypoint {
                frame,
                position: RawPosition::new(x, y, z),
            })
            .collect();
        self.drones.push(RawDrone { waypoints });
        self.drones.len() - 1
    }

    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, DatasetError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn to_json_pretty(&self) -> Result<String, DatasetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

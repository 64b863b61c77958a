//! Error types for the SkyReplay environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Dataset does not exist at the given location
    #[error("Dataset not found: {0}")]
    NotFound(String),

    /// Reading the dataset failed
    #[error("I/O error reading {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// The source held no data
    #[error("Dataset is empty: {0}")]
    Empty(String),
}

impl EnvError {
    /// Maps an I/O error for `location`, singling out missing files.
    pub fn io(location: impl Into<String>, source: std::io::Error) -> Self {
        let location = location.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(location)
        } else {
            Self::Io { location, source }
        }
    }
}

//! Dataset source abstraction.

use async_trait::async_trait;
use crate::error::EnvError;

/// Where the recorded dataset comes from.
///
/// The driver fetches once at initialization. A failure is reported to the
/// caller and halts initialization; there are no retries.
///
/// # Implementations
///
/// - **File**: `FileSource` - `tokio::fs`
/// - **Memory**: `MemorySource` - bytes already in hand (generated scenarios, tests)
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Returns the raw document bytes.
    async fn fetch(&self) -> Result<Vec<u8>, EnvError>;

    /// Human-readable location for logs and errors.
    fn location(&self) -> String;
}

/// An in-memory dataset.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl DatasetSource for MemorySource {
    async fn fetch(&self) -> Result<Vec<u8>, EnvError> {
        if self.bytes.is_empty() {
            return Err(EnvError::Empty(self.name.clone()));
        }
        Ok(self.bytes.clone())
    }

    fn location(&self) -> String {
        format!("memory:{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source_roundtrip() {
        let source = MemorySource::new("unit", b"{}".to_vec());
        assert_eq!(source.fetch().await.unwrap(), b"{}".to_vec());
        assert_eq!(source.location(), "memory:unit");
    }

    #[tokio::test]
    async fn test_memory_source_empty_is_error() {
        let source = MemorySource::new("blank", Vec::new());
        assert!(matches!(source.fetch().await, Err(EnvError::Empty(_))));
    }
}

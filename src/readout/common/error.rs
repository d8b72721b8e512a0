use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadoutError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to decode board data: {0}")]
    Decode(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Invalid frame dimensions: width={width}, height={height}, samples={samples}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        samples: usize,
    },

    #[error("Failed to read input: {0}")]
    InputRead(String),

    #[error("Failed to write output: {0}")]
    OutputWrite(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadoutError {
    /// Whether the pipeline may drop the current event and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ReadoutError::Decode(_)
                | ReadoutError::MalformedEvent(_)
                | ReadoutError::InvalidDimensions { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReadoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(ReadoutError::Decode("short array".into()).is_recoverable());
        assert!(ReadoutError::MalformedEvent("no detector".into()).is_recoverable());
        assert!(
            ReadoutError::InvalidDimensions { width: 4, height: 2, samples: 7 }.is_recoverable()
        );
        assert!(!ReadoutError::Configuration("bad mode".into()).is_recoverable());
        assert!(!ReadoutError::OutputWrite("disk full".into()).is_recoverable());
    }

    #[test]
    fn test_dimension_message() {
        let err = ReadoutError::InvalidDimensions { width: 264, height: 256, samples: 10 };
        assert_eq!(
            err.to_string(),
            "Invalid frame dimensions: width=264, height=256, samples=10"
        );
    }
}

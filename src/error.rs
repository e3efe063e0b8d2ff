use uuid::Uuid;

use thiserror::Error;

use crate::domain::DexKind;

/// Main error type for the execution engine
#[derive(Error, Debug)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Validation errors (producer boundary)
    #[error("Validation failed: {0}")]
    Validation(String),

    // Routing errors (quote aggregation)
    #[error("Routing failed: {0}")]
    Routing(String),

    // Execution errors (simulated network fault during submission)
    #[error("Swap execution failed on {source}: {reason}")]
    Execution { source: DexKind, reason: String },

    // Slippage errors (realized output below the caller's minimum)
    #[error("Slippage exceeded: got {got:.6} < min {min:.6}")]
    Slippage { got: f64, min: f64 },

    // Queue errors
    #[error("Duplicate job for order {0}")]
    DuplicateJob(Uuid),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// True for errors the producer caused (bad request, duplicate id)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::DuplicateJob(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slippage_error_message_carries_amounts() {
        let err = EngineError::Slippage {
            got: 49.85,
            min: 99.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("Slippage exceeded"));
        assert!(msg.contains("49.85"));
        assert!(msg.contains("99.0"));
    }

    #[test]
    fn execution_error_names_the_source() {
        let err = EngineError::Execution {
            source: DexKind::Raydium,
            reason: "simulated network error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Swap execution failed on raydium: simulated network error"
        );
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(EngineError::Validation("bad".into()).is_client_error());
        assert!(EngineError::DuplicateJob(Uuid::new_v4()).is_client_error());
        assert!(!EngineError::Routing("down".into()).is_client_error());
    }
}

use thiserror::Error;

/// Domain-specific error for client operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Underlying SDK error with message
    #[error("SDK error: {0}")]
    Sdk(String),
    /// Entity not found
    #[error("not found: {0}")]
    NotFound(String),
    /// Invalid operation
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// Network error
    #[error("network error: {0}")]
    Network(String),
}

impl GameError {
    /// Only transport failures are worth retrying; anything else would fail the same way again
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::Network(_))
    }
}

/// Convert from String errors to GameError
impl From<String> for GameError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();
        if lower.contains("not found") {
            GameError::NotFound(s)
        } else if lower.contains("network") || lower.contains("connection") {
            GameError::Network(s)
        } else {
            GameError::Sdk(s)
        }
    }
}

/// Convert from &str errors to GameError
impl From<&str> for GameError {
    fn from(s: &str) -> Self {
        s.to_string().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_messages() {
        assert!(matches!(GameError::from("Connection reset"), GameError::Network(_)));
        assert!(matches!(GameError::from("row not found"), GameError::NotFound(_)));
        assert!(matches!(GameError::from("bad frame"), GameError::Sdk(_)));
        assert!(GameError::from("network down").is_retryable());
        assert!(!GameError::from("bad frame").is_retryable());
    }
}

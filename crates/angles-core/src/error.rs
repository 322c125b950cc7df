//! Error types for Angles.

use thiserror::Error;

/// Failure of a single call to the generation service.
///
/// The three kinds are kept apart for logging. Callers that talk to users
/// collapse all of them into one message (see `session::GENERATION_FAILED_MESSAGE`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The service answered, but with no text at all.
    #[error("no content returned by the generation service")]
    EmptyResponse,

    /// Text was returned but did not match the declared draft schema.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The call itself failed (network, authentication, non-2xx status).
    #[error("transport error{}: {message}", .status_code.map(|c| format!(" ({c})")).unwrap_or_default())]
    Transport {
        status_code: Option<u16>,
        message: String,
    },
}

impl GenerationError {
    /// Creates a MalformedResponse error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Creates a Transport error
    pub fn transport(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status_code,
            message: message.into(),
        }
    }

    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyResponse => "empty_response",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Transport { .. } => "transport",
        }
    }
}

/// A shared error type for the Angles crates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnglesError {
    /// Caller supplied unusable input (empty transcript, unsupported media)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not allowed in the current session phase
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// IO error (reading transcript or media files)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Prompt template failed to render
    #[error("Template error: {0}")]
    Template(String),

    /// The generation call failed
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
}

impl AnglesError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a generation failure
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    /// Check if this is an invalid state error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }
}

/// A type alias for `Result<T, AnglesError>`.
pub type Result<T> = std::result::Result<T, AnglesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_includes_status() {
        let err = GenerationError::transport(Some(403), "PERMISSION_DENIED: bad key");
        assert_eq!(
            err.to_string(),
            "transport error (403): PERMISSION_DENIED: bad key"
        );

        let err = GenerationError::transport(None, "connection refused");
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn test_generation_error_converts() {
        let err: AnglesError = GenerationError::EmptyResponse.into();
        assert!(err.is_generation());
        assert_eq!(
            err.to_string(),
            "Generation failed: no content returned by the generation service"
        );
    }

    #[test]
    fn test_state_and_input_errors_are_not_generation() {
        let err = AnglesError::invalid_state("a refinement is already in progress");
        assert!(err.is_invalid_state());
        assert!(!err.is_generation());
        assert_eq!(
            err.to_string(),
            "Invalid state: a refinement is already in progress"
        );

        let err = AnglesError::io("failed to read media 'a.png'");
        assert_eq!(err.to_string(), "IO error: failed to read media 'a.png'");
    }
}

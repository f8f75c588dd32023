//! Error types for the CLI application.
//!
//! ## Batch Validation Errors
//!
//! `BatchValidationError<T>` collects per-item failures with context. The
//! `verify` command reports one per rejected hand record.

use kalooki_ai::BotError;
use kalooki_engine::errors::GameError;
use std::fmt;

/// Custom error type for CLI operations.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// The engine refused an action or a bot plan
    Engine(String),

    /// Operation was interrupted (e.g., by user with Ctrl+C)
    Interrupted(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(msg) => write!(f, "Engine error: {}", msg),
            CliError::Interrupted(msg) => write!(f, "Interrupted: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<GameError> for CliError {
    fn from(error: GameError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<BotError> for CliError {
    fn from(error: BotError) -> Self {
        CliError::Engine(error.to_string())
    }
}

/// A failure tied to one item of a batch, e.g. the hand at line 5.
///
/// ```rust
/// use kalooki_cli::BatchValidationError;
///
/// let error = BatchValidationError {
///     item_context: 5,
///     message: "card_12 not in hand".to_string(),
/// };
/// assert_eq!(error.to_string(), "5: card_12 not in hand");
/// ```
#[derive(Debug)]
pub struct BatchValidationError<T> {
    /// Context identifying the item that failed validation
    pub item_context: T,
    pub message: String,
}

impl<T: std::fmt::Display> std::fmt::Display for BatchValidationError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_context, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalooki_engine::seat::Seat;

    #[test]
    fn game_errors_keep_their_reason() {
        let e: CliError = GameError::SeatEliminated(Seat::Top).into();
        assert_eq!(e.to_string(), "Engine error: Seat top has been eliminated");
    }

    #[test]
    fn batch_error_with_string_context() {
        let error = BatchValidationError {
            item_context: "hands.jsonl:3".to_string(),
            message: "record does not parse".to_string(),
        };
        assert_eq!(error.to_string(), "hands.jsonl:3: record does not parse");
    }
}

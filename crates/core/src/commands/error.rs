use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("A required argument is missing")]
    RequiredArgument,
    #[error("{message}")]
    InvalidResult { message: String },
    #[error("No result for input")]
    NoResult,
}

impl ParseError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ParseError::InvalidResult {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{0}")]
    Message(String),
}

#[derive(Debug, Error)]
pub enum InternalError {
    #[error("Internal error: Argument {index} not found in ArgumentSet (command registration bug)")]
    MissingArgument { index: usize },
    #[error("Internal error: Argument {index} has wrong type, expected {expected} but found {found} (command registration bug)")]
    WrongArgumentType {
        index: usize,
        expected: String,
        found: String,
    },
    #[error("Internal error (bug): {message}")]
    Message { message: String },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl CommandError {
    pub fn runtime(message: impl Into<String>) -> Self {
        CommandError::Runtime(RuntimeError::Message(message.into()))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CommandError::Internal(InternalError::Message {
            message: message.into(),
        })
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

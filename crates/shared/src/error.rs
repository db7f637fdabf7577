use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection payload of the submission gateway. The message is surfaced to the
/// user verbatim in the root error slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("hobby index {index} out of range for {len} hobbies")]
    HobbyIndexOutOfRange { index: usize, len: usize },
    #[error("unknown field path '{0}'")]
    UnknownField(String),
    #[error("field '{0}' cannot be edited directly")]
    NotEditable(String),
    #[error("invalid value '{value}' for field '{path}': {reason}")]
    InvalidValue {
        path: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown gender '{0}', expected one of male, female, other")]
pub struct UnknownGender(pub String);

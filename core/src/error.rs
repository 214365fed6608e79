//! Error types for connect

use thiserror::Error;

/// Main error type for state facade operations
#[derive(Error, Debug)]
pub enum StateError {
    // ============ Facade Errors ============
    #[error("Reserved metadata key is read-only: {0}")]
    ReservedKey(String),
    
    #[error("Invalid key {key}: {reason}")]
    InvalidKey { key: String, reason: &'static str },
    
    #[error("Value at {path} is not a container ({kind})")]
    NotAContainer { path: String, kind: &'static str },
    
    #[error("Nothing found at path: {0}")]
    PathNotFound(String),
    
    #[error("Value at {path} is not a state node ({kind})")]
    NotANode { path: String, kind: &'static str },
    
    #[error("Writing at {path} would make the state tree cyclic")]
    CyclicWrite { path: String },
    
    #[error("Value is not callable ({0})")]
    NotCallable(&'static str),
    
    #[error("Store has been dropped")]
    StoreDropped,
    
    // ============ Configuration Errors ============
    #[error("Configuration error: {0}")]
    ConfigError(String),
    
    #[error("Serialization failed: {0}")]
    SerializationError(String),
    
    // ============ User Callable Errors ============
    /// Error raised by a derived entry or stored function, carried verbatim.
    #[error(transparent)]
    Callable(#[from] anyhow::Error),
}

impl StateError {
    /// Recover the error a user callable returned, if that is what this is.
    pub fn into_callable_error(self) -> Option<anyhow::Error> {
        match self {
            StateError::Callable(err) => Some(err),
            _ => None,
        }
    }
    
    pub fn is_callable_error(&self) -> bool {
        matches!(self, StateError::Callable(_))
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::SerializationError(err.to_string())
    }
}

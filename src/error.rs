use thiserror::Error;

use crate::resolve::Scope;

#[derive(Error, Debug)]
pub enum StratusError {
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Not authorized: {0}. Run `stratus login` again.")]
    Authorization(String),

    #[error("No {} found. Aborting.", .0.plural())]
    NoCandidates(Scope),

    #[error("Selection cancelled")]
    SelectionAborted,

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("Request failed: {0}")]
    Http(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl StratusError {
    /// Return a typed exit code for this error category.
    pub fn exit_code(&self) -> i32 {
        match self {
            StratusError::AuthFailed(_) => 2,
            StratusError::Authorization(_) => 4,
            StratusError::NoCandidates(_) => 3,
            StratusError::SelectionAborted => 6,
            StratusError::Keychain(_) => 5,
            StratusError::Http(_) => 1,
            StratusError::Config(_) => 1,
            StratusError::Io(_) => 1,
            StratusError::Other(_) => 1,
        }
    }

    /// Return a string error code identifier.
    pub fn error_code(&self) -> &'static str {
        match self {
            StratusError::AuthFailed(_) => "auth_failed",
            StratusError::Authorization(_) => "authorization",
            StratusError::NoCandidates(_) => "no_candidates",
            StratusError::SelectionAborted => "selection_aborted",
            StratusError::Keychain(_) => "keychain_error",
            StratusError::Http(_) => "http_error",
            StratusError::Config(_) => "invalid_config",
            StratusError::Io(_) => "io_error",
            StratusError::Other(_) => "error",
        }
    }
}

pub type Result<T> = std::result::Result<T, StratusError>;

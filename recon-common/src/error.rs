//! Common error types for the recon tools
//!
//! Fatal errors (`Input`, `Schema`, `Config`, `Authentication`, `Io`) abort a
//! run before any artifact is touched. `Match`, `Action` and `Reconcile` are
//! per-artifact: they end up in the run log and processing moves on.

use thiserror::Error;

/// Common result type for recon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by every tool
#[derive(Error, Debug)]
pub enum Error {
    /// Bad path, missing file, empty input
    #[error("Input error: {0}")]
    Input(String),

    /// Table present but malformed (missing required column)
    #[error("Schema error: {0}")]
    Schema(String),

    /// No mapping for one artifact
    #[error("Match error: {0}")]
    Match(String),

    /// External operation failed for one artifact
    #[error("Action error: {0}")]
    Action(#[from] crate::executor::ActionError),

    /// Move or log write failed after the outcome was recorded
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] crate::reconciler::ReconcileError),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Simulated login rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error stops the whole run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Match(_) | Error::Action(_) | Error::Reconcile(_))
    }
}

impl From<crate::mapping::LoadError> for Error {
    fn from(err: crate::mapping::LoadError) -> Self {
        use crate::mapping::LoadError;
        match err {
            LoadError::Schema { .. } => Error::Schema(err.to_string()),
            _ => Error::Input(err.to_string()),
        }
    }
}

impl From<crate::scanner::ScanError> for Error {
    fn from(err: crate::scanner::ScanError) -> Self {
        Error::Input(err.to_string())
    }
}

impl From<crate::run_log::RunLogError> for Error {
    fn from(err: crate::run_log::RunLogError) -> Self {
        Error::Reconcile(crate::reconciler::ReconcileError::LogWrite(err.to_string()))
    }
}

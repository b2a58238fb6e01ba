//! # Recon Common Library
//!
//! Shared core for the recon tools:
//! - Mapping loader and matcher (spreadsheet/CSV lookup tables)
//! - Action executor contract with dry-run handling
//! - Reconciler (move/rename to success or failure folders)
//! - Run log (audit CSV/text written once per run)
//! - Run context, event bus and the pipeline tying them together
//! - Configuration, logging bootstrap, static catalogs and console progress

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod executor;
pub mod logging;
pub mod mapping;
pub mod matcher;
pub mod pipeline;
pub mod progress;
pub mod reconciler;
pub mod run_log;
pub mod scanner;
pub mod time;

pub use artifact::{Artifact, FileArtifact, Outcome, OutcomeStatus};
pub use context::RunContext;
pub use error::{Error, Result};
pub use mapping::{MappingEntry, MappingLoader, MappingTable};
pub use pipeline::{Pipeline, RunSummary};
pub use run_log::{LogFormat, RunLog};

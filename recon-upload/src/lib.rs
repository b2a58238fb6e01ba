//! # recon-upload
//!
//! Document uploader: files in a staging folder are matched by stem against
//! a `Title, FinalName` mapping, submitted to the upload portal and moved to
//! the uploaded or failed folder.

pub mod catalog;
pub mod config;
pub mod executor;
pub mod portal;
pub mod runner;
pub mod template;

pub use catalog::{DocumentType, TargetField};
pub use executor::DocumentUploader;
pub use portal::{SimulatedPortal, UploadForm, UploadPortal};
pub use runner::{run_upload, UploadJob, UploadReport};

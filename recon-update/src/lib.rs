//! # recon-update
//!
//! Bulk record updates: rows of an `equipment_id` + field sheet are replayed
//! one at a time against a record API, and every outcome lands in
//! `update_log.csv`.

pub mod api;
pub mod config;
pub mod executor;
pub mod fields;
pub mod runner;
pub mod session;
pub mod template;

pub use api::{HttpRecordApi, RecordApi, SimulatedRecordApi};
pub use executor::RecordUpdater;
pub use fields::RecordField;
pub use runner::{load_updates, run_updates, UpdateReport, UpdateSet};
pub use session::{login, Credentials, Session};

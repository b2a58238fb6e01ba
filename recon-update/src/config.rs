//! recon-update bootstrap config (`recon-update.toml`)

use recon_common::config::LoggingConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Every field optional; command-line flags and env win
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateConfig {
    /// Where `update_log.csv` is written
    pub output_dir: Option<PathBuf>,

    /// Record API base URL; unset means the simulated API
    pub endpoint: Option<String>,

    /// HTTP timeout for the record API
    pub timeout_secs: Option<u64>,

    pub username: Option<String>,
    pub customer_id: Option<String>,

    /// Record ids the simulated API answers with 500
    #[serde(default)]
    pub reject_ids: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default HTTP timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

//! Application configuration loaded from environment variables.

use std::path::PathBuf;

/// Built-in webhook address used when `ALUMNI_WEBHOOK_URL` is unset.
const DEFAULT_WEBHOOK_URL: &str = "https://hook.eu1.make.com/8q2vv4mdp7xw5tkcy3fjb6ae";

/// Default data directory, relative to the working directory.
const DEFAULT_DATA_DIR: &str = "alumni_data";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Webhook address that generates the ID card PDF
    pub webhook_url: String,

    /// Remote script endpoint resolving a school's logo and template;
    /// logo/template lookup is skipped when unset
    pub script_url: Option<String>,

    /// Directory holding the embedded database and PDF payloads
    pub data_dir: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `ALUMNI_WEBHOOK_URL`: webhook address (built-in fallback when unset)
    /// - `ALUMNI_SCRIPT_URL`: remote script endpoint for logo/template lookup
    /// - `ALUMNI_DATA_DIR`: base directory for local state (default: `alumni_data`)
    #[must_use]
    pub fn from_env() -> Self {
        // Load .env file
        dotenvy::dotenv().ok();

        let webhook_url = std::env::var("ALUMNI_WEBHOOK_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WEBHOOK_URL.to_owned());

        let script_url = std::env::var("ALUMNI_SCRIPT_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let data_dir = std::env::var("ALUMNI_DATA_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        Self {
            webhook_url,
            script_url,
            data_dir,
        }
    }

    /// Path of the embedded SQLite database file.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("alumni.db")
    }
}

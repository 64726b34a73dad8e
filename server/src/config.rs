//! # Server Configuration
//!
//! Settings are read from a single YAML file. The file is chosen as follows:
//!
//! 1. the path in the `LIBRARY_CONFIG` environment variable
//! 2. `library.yaml` in the working directory, if it exists
//! 3. otherwise built-in defaults
//!
//! ## YAML Format
//!
//! ```yaml
//! database_url: "sqlite:library.db"
//! bind_address: "127.0.0.1:3000"
//! allowed_hosts:
//!   - "library.example.org"
//! log_filter: "info"
//! seed_file: "demos/seed.yaml"
//! session_max_age_days: 14
//! ```
//!
//! Missing keys take their default value.

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::backend::domain::models::session::DEFAULT_SESSION_MAX_AGE_DAYS;
use crate::backend::storage::connection::DEFAULT_DATABASE_URL;

pub const CONFIG_ENV_VAR: &str = "LIBRARY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "library.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// sqlx SQLite URL; the database file is created when missing
    pub database_url: String,
    pub bind_address: String,
    /// Hosts, besides the request's own, that redirect targets may point to
    pub allowed_hosts: Vec<String>,
    /// tracing filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
    /// Optional YAML file of books and students imported at startup
    pub seed_file: Option<PathBuf>,
    /// Days after creation at which a session stops being honoured
    pub session_max_age_days: u32,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: "127.0.0.1:3000".to_string(),
            allowed_hosts: Vec::new(),
            log_filter: "info".to_string(),
            seed_file: None,
            session_max_age_days: DEFAULT_SESSION_MAX_AGE_DAYS,
        }
    }
}

impl LibraryConfig {
    /// Load the configuration from the environment-selected file or defaults
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_file(default_path);
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = Self::from_yaml(&yaml_content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        // an empty document deserializes to unit, not to an empty map
        if yaml_content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml_content)?;
        ensure!(config.session_max_age_days > 0, "session_max_age_days must be positive");
        Ok(config)
    }

    pub fn session_max_age(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.session_max_age_days))
    }
}

//! # Configuration Management Module
//!
//! Station configuration is read from a TOML file. The file is organized in sections:
//!
//! - [`BbsConfig`] - station identity, banner and prompt
//! - [`StorageConfig`] - location of the SQLite message store
//! - [`LoggingConfig`] - log level and log file
//! - [`UtilitiesConfig`] - external station-log / uptime utilities and the info text
//!
//! The session engine never sees this structure directly. [`Config::session_config`]
//! derives the small [`SessionConfig`] view it needs, combining the file with the
//! per-connection values (the calling station and the debug flag) supplied at start-up.
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bbs]
//! callsign = "N0CALL-10"
//! name = "Really Simple BBS"
//! banner_message = "Messages are kept for 30 days."
//! command_prompt = "ENTER COMMAND >"
//!
//! [storage]
//! db_path = "rsbbs.db"
//!
//! [logging]
//! level = "info"
//! file = "rsbbs.log"
//!
//! [utilities]
//! heard_command = ["mheard"]
//! uptime_command = ["uptime"]
//! info_file = "info.txt"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::bbs::collaborators::Collaborators;
use crate::validation::normalize_callsign;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BbsConfig {
    /// Station identity announced in the greeting.
    pub callsign: String,
    pub name: String,
    #[serde(default)]
    pub banner_message: String,
    #[serde(default = "default_command_prompt")]
    pub command_prompt: String,
}

fn default_command_prompt() -> String {
    "ENTER COMMAND >".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UtilitiesConfig {
    /// Program and arguments printing the heard-stations log (`mheard` on Linux AX.25).
    #[serde(default = "default_heard_command")]
    pub heard_command: Vec<String>,
    #[serde(default = "default_uptime_command")]
    pub uptime_command: Vec<String>,
    /// Operator-provided text shown by the `info` command.
    #[serde(default = "default_info_file")]
    pub info_file: String,
}

fn default_heard_command() -> Vec<String> {
    vec!["mheard".to_string()]
}

fn default_uptime_command() -> Vec<String> {
    vec!["uptime".to_string()]
}

fn default_info_file() -> String {
    "info.txt".to_string()
}

impl Default for UtilitiesConfig {
    fn default() -> Self {
        Self {
            heard_command: default_heard_command(),
            uptime_command: default_uptime_command(),
            info_file: default_info_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub bbs: BbsConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub utilities: UtilitiesConfig,
}

/// Everything the session engine needs to know about the station and the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub callsign: String,
    pub bbs_name: String,
    pub banner_message: String,
    pub command_prompt: String,
    /// Callsign of the connected operator, upper-cased.
    pub calling_station: String,
    /// Surface swallowed parse/handler errors to the session.
    pub debug: bool,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path`, first writing the default configuration there if the file does not exist.
    ///
    /// The flag is `true` when the file was created. This runs before logging is set up,
    /// so the caller reports the creation once it can.
    pub async fn load_or_create(path: &str) -> Result<(Self, bool)> {
        let created = !Path::new(path).exists();
        if created {
            Self::create_default(path).await?;
        }
        Ok((Self::load(path).await?, created))
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let content = Config::default().to_toml()?;
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| anyhow!("Failed to create config directory {}: {}", parent.display(), e))?;
            }
        }
        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| anyhow!("Failed to serialize config: {}", e))
    }

    pub fn validate(&self) -> Result<()> {
        if self.bbs.callsign.trim().is_empty() {
            return Err(anyhow!("bbs.callsign must not be empty"));
        }
        if self.storage.db_path.trim().is_empty() {
            return Err(anyhow!("storage.db_path must not be empty"));
        }
        if self.utilities.heard_command.is_empty() {
            return Err(anyhow!("utilities.heard_command must name a program"));
        }
        if self.utilities.uptime_command.is_empty() {
            return Err(anyhow!("utilities.uptime_command must name a program"));
        }
        Ok(())
    }

    /// The per-connection view consumed by the session engine.
    pub fn session_config(&self, calling_station: &str, debug: bool) -> SessionConfig {
        SessionConfig {
            callsign: self.bbs.callsign.clone(),
            bbs_name: self.bbs.name.clone(),
            banner_message: self.bbs.banner_message.clone(),
            command_prompt: self.bbs.command_prompt.clone(),
            calling_station: normalize_callsign(calling_station),
            debug,
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            heard_command: self.utilities.heard_command.clone(),
            uptime_command: self.utilities.uptime_command.clone(),
            info_file: PathBuf::from(&self.utilities.info_file),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bbs: BbsConfig {
                callsign: "N0CALL-10".to_string(),
                name: "Really Simple BBS".to_string(),
                banner_message: "Leave a message for any station. Private messages with 'sp'.".to_string(),
                command_prompt: default_command_prompt(),
            },
            storage: StorageConfig {
                db_path: "rsbbs.db".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("rsbbs.log".to_string()),
            },
            utilities: UtilitiesConfig::default(),
        }
    }
}

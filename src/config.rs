use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    discord_bot_token: String,
    /// Directory for state files (snapshot database, logs). Defaults to current directory.
    data_dir: Option<String>,
    /// Channel whose reactions the bot echoes.
    #[serde(default = "default_votes_channel")]
    votes_channel: String,
}

fn default_votes_channel() -> String {
    "votes".to_string()
}

pub struct Config {
    pub discord_bot_token: String,
    /// Directory for state files (snapshot database, logs).
    pub data_dir: PathBuf,
    /// Channel whose reactions the bot echoes.
    pub votes_channel: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        if file.discord_bot_token.trim().is_empty() {
            return Err(ConfigError::Validation("discord_bot_token is required".into()));
        }
        if file.votes_channel.trim().is_empty() {
            return Err(ConfigError::Validation("votes_channel must not be blank".into()));
        }

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            discord_bot_token: file.discord_bot_token,
            data_dir,
            votes_channel: file.votes_channel,
        })
    }
}

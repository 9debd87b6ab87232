//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for sift
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default model to use
    pub model: Option<String>,
    /// API key (alternative to environment variables)
    pub api_key: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sift")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for SIFT_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("SIFT_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        let dir = path.parent().unwrap();
        fs::create_dir_all(dir)?;

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            model: Some(sift_ai::gemini::DEFAULT_MODEL.to_string()),
            api_key: None,
        };

        default_config.save()?;
        Ok(path)
    }

}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# sift configuration file
# Place at ~/.config/sift/config.toml (Linux/Mac) or %APPDATA%\sift\config.toml (Windows)

# Default model to use
model = "gemini-2.5-flash"

# API key (optional - can also use GEMINI_API_KEY or GOOGLE_API_KEY)
# It's recommended to use environment variables instead for security
# api_key = "..."
"#
}

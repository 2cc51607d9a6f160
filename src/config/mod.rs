use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// External tool settings
    pub tools: ToolsConfig,

    /// Caption retrieval settings
    pub captions: CaptionConfig,

    /// Archival copy settings
    pub archive: ArchiveConfig,

    /// HTTP endpoint settings
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the yt-dlp binary
    pub yt_dlp_path: String,

    /// Path to the whisper binary
    pub whisper_path: String,

    /// Timeout applied to every external tool invocation
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// The one caption language ever requested
    pub language: String,

    /// Timeout for caption downloads and transcript API calls
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Archive directory; defaults to `transcript_output` in the home
    /// directory when unset
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP endpoint
    pub host: String,

    /// Listen port
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tools: ToolsConfig {
                yt_dlp_path: "yt-dlp".to_string(),
                whisper_path: "whisper".to_string(),
                timeout_secs: 600,
            },
            captions: CaptionConfig {
                language: "en".to_string(),
                request_timeout_secs: 10,
            },
            archive: ArchiveConfig { dir: None },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("transcript-harvester").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.captions.language.trim().is_empty() {
            anyhow::bail!("Caption language must be configured");
        }

        if self.tools.timeout_secs == 0 {
            anyhow::bail!("Tool timeout must be greater than zero");
        }

        Ok(())
    }

    /// Resolved archive directory for the side-channel transcript copy
    pub fn archive_dir(&self) -> PathBuf {
        self.archive.dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("transcript_output")
        })
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  yt-dlp: {}", self.tools.yt_dlp_path);
        println!("  whisper: {}", self.tools.whisper_path);
        println!("  Tool Timeout: {}s", self.tools.timeout_secs);
        println!("  Caption Language: {}", self.captions.language);
        println!("  Archive Dir: {}", self.archive_dir().display());
        println!("  Server: {}:{}", self.server.host, self.server.port);
    }
}

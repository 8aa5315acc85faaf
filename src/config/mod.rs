use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::transcript::{RetryPolicy, TranslationSettings};
use crate::utils::DEFAULT_MAX_FILENAME_LENGTH;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transcript and metadata lookup settings
    pub fetch: FetchConfig,

    /// Translation backend settings
    pub translation: TranslationConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per upstream lookup before giving up
    pub retry_attempts: u32,

    /// Delay between attempts, in seconds
    pub retry_delay_secs: f64,

    /// Language requested when none is given on the command line
    pub default_source_lang: String,

    /// Translate into this language when none is given on the command line
    pub default_target_lang: Option<String>,

    /// yt-dlp executable
    pub yt_dlp_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Segments per translation request batch
    pub batch_size: usize,

    /// Pause between batches, in seconds
    pub batch_pause_secs: f64,

    /// Translation endpoint
    pub endpoint: String,

    /// Timeout for a single HTTP request, in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for transcript files and archives (current directory if unset)
    pub output_dir: Option<PathBuf>,

    /// Maximum file name length derived from video titles
    pub max_filename_length: usize,

    /// Show progress bars for multi-video runs
    pub show_progress: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 2,
            retry_delay_secs: 2.0,
            default_source_lang: "en".to_string(),
            default_target_lang: None,
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_pause_secs: 1.0,
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            max_filename_length: DEFAULT_MAX_FILENAME_LENGTH,
            show_progress: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            translation: TranslationConfig::default(),
            app: AppConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path).await
    }

    /// Load configuration from `path`, writing the defaults there if it doesn't exist
    pub async fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs_err::read_to_string(path).context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path).await?;
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("tubescript").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.fetch.retry_attempts == 0 {
            anyhow::bail!("fetch.retry_attempts must be at least 1");
        }

        check_seconds("fetch.retry_delay_secs", self.fetch.retry_delay_secs)?;

        if self.translation.batch_size == 0 {
            anyhow::bail!("translation.batch_size must be at least 1");
        }

        check_seconds("translation.batch_pause_secs", self.translation.batch_pause_secs)?;

        if self.translation.endpoint.trim().is_empty() {
            anyhow::bail!("translation.endpoint must be configured");
        }

        if self.app.max_filename_length == 0 {
            anyhow::bail!("app.max_filename_length must be at least 1");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Retry Attempts: {}", self.fetch.retry_attempts);
        println!("  Retry Delay: {}s", self.fetch.retry_delay_secs);
        println!("  Default Source Language: {}", self.fetch.default_source_lang);
        if let Some(target) = &self.fetch.default_target_lang {
            println!("  Default Target Language: {}", target);
        }
        println!("  yt-dlp: {}", self.fetch.yt_dlp_path);
        println!("  Translation Batch Size: {}", self.translation.batch_size);
        println!("  Translation Pause: {}s", self.translation.batch_pause_secs);
        println!("  Translation Endpoint: {}", self.translation.endpoint);
        match &self.app.output_dir {
            Some(dir) => println!("  Output Directory: {}", dir.display()),
            None => println!("  Output Directory: (current directory)"),
        }
        println!("  Max File Name Length: {}", self.app.max_filename_length);
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.fetch.retry_attempts,
            Duration::from_secs_f64(self.fetch.retry_delay_secs),
        )
    }

    pub fn translation_settings(&self) -> TranslationSettings {
        TranslationSettings {
            batch_size: self.translation.batch_size,
            batch_pause: Duration::from_secs_f64(self.translation.batch_pause_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.translation.request_timeout_secs)
    }
}

/// Seconds must be a non-negative number that fits in a `Duration`
fn check_seconds(key: &str, seconds: f64) -> Result<()> {
    Duration::try_from_secs_f64(seconds)
        .map(|_| ())
        .with_context(|| format!("{} must be a non-negative number of seconds, got {}", key, seconds))
}

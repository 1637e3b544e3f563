use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use wikimedia_client::WikimediaClientConfig;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub wikimedia: WikimediaConfig,
    #[serde(default)]
    pub manifest: ManifestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Wikipedia / Commons 上游配置
#[derive(Debug, Deserialize, Clone)]
pub struct WikimediaConfig {
    #[serde(default = "default_wiki_api_url")]
    pub wiki_api_url: String,
    #[serde(default = "default_commons_api_url")]
    pub commons_api_url: String,
    /// Identifying User-Agent sent with every upstream request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Upstream request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
    /// How many imageinfo batches may be in flight at once (default: 4)
    #[serde(default = "default_max_concurrent_batches")]
    pub max_concurrent_batches: usize,
}

impl Default for WikimediaConfig {
    fn default() -> Self {
        Self {
            wiki_api_url: default_wiki_api_url(),
            commons_api_url: default_commons_api_url(),
            user_agent: default_user_agent(),
            timeout_sec: default_timeout_sec(),
            max_concurrent_batches: default_max_concurrent_batches(),
        }
    }
}

impl WikimediaConfig {
    /// Convert to wikimedia_client::WikimediaClientConfig
    pub fn to_client_config(&self) -> WikimediaClientConfig {
        WikimediaClientConfig {
            wiki_api_url: self.wiki_api_url.clone(),
            commons_api_url: self.commons_api_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout_secs: self.timeout_sec,
            max_concurrent_batches: self.max_concurrent_batches,
        }
    }
}

fn default_wiki_api_url() -> String {
    WikimediaClientConfig::default().wiki_api_url
}

fn default_commons_api_url() -> String {
    WikimediaClientConfig::default().commons_api_url
}

fn default_user_agent() -> String {
    WikimediaClientConfig::default().user_agent
}

fn default_timeout_sec() -> u64 {
    30
}

fn default_max_concurrent_batches() -> usize {
    4
}

/// 清单生成配置
#[derive(Debug, Deserialize, Clone)]
pub struct ManifestConfig {
    /// Base URI that manifest, sequence, canvas and annotation ids hang off
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Render width for canvas images of article manifests (default: 1600)
    #[serde(default = "default_display_width")]
    pub display_width: u32,
    /// Render width for canvas thumbnails (default: 100)
    #[serde(default = "default_thumbnail_width")]
    pub thumbnail_width: u32,
    /// Render width for single file manifests, effectively full size (default: 8000)
    #[serde(default = "default_file_width")]
    pub file_width: u32,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            display_width: default_display_width(),
            thumbnail_width: default_thumbnail_width(),
            file_width: default_file_width(),
        }
    }
}

impl ManifestConfig {
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid manifest.base_url: {}", self.base_url))?;
        if !url.path().ends_with('/') {
            anyhow::bail!("manifest.base_url must end with '/': {}", self.base_url);
        }
        if self.display_width == 0 || self.thumbnail_width == 0 || self.file_width == 0 {
            anyhow::bail!("manifest widths must be greater than zero");
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/iiif/".to_string()
}

fn default_display_width() -> u32 {
    1600
}

fn default_thumbnail_width() -> u32 {
    100
}

fn default_file_width() -> u32 {
    8000
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "data/logs".to_string()
}

impl Config {
    /// Load `config.toml` from the working directory (optional), then `WIKI_IIIF__*` env vars
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("WIKI_IIIF").separator("__"));

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.manifest.validate()?;
        Ok(config)
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.logging.level.to_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "info" => tracing::Level::INFO,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    }
}

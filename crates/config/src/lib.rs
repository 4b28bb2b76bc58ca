//! Configuration for MathMentor.
//!
//! One `AppConfig` is read from `~/.mathmentor/config.toml` at startup,
//! topped up from environment variables, and validated before anything is
//! built from it. A missing file is not an error — defaults apply, which is
//! what makes `mathmentor solve` work right after setting an API key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration, mirroring `config.toml` section for section.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generative provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Which provider backs the pipeline
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model used by all generation stages
    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    /// Model used for knowledge embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature for stage calls
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Cap on generated tokens per stage call (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Override the provider API base URL (proxies, test servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Memory store configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Knowledge index configuration
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_generation_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_embedding_model() -> String {
    "models/embedding-001".into()
}
fn default_temperature() -> f32 {
    0.0
}

// Hand-rolled so the API key never reaches logs or error output.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let api_key = if self.api_key.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("AppConfig")
            .field("api_key", &api_key)
            .field("provider", &self.provider)
            .field("generation_model", &self.generation_model)
            .field("embedding_model", &self.embedding_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_url", &self.api_url)
            .field("memory", &self.memory)
            .field("knowledge", &self.knowledge)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Path of the append-only feedback log
    #[serde(default = "default_memory_path")]
    pub path: PathBuf,
}

fn default_memory_path() -> PathBuf {
    AppConfig::data_dir().join("memory.jsonl")
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: default_memory_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory holding the persisted vector index
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,

    /// The reference document the index is built from
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,

    /// Maximum characters per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// How many chunks a retrieval returns
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_index_dir() -> PathBuf {
    AppConfig::data_dir().join("knowledge")
}
fn default_source_path() -> PathBuf {
    AppConfig::data_dir().join("math_reference.md")
}
fn default_chunk_size() -> usize {
    300
}
fn default_top_k() -> usize {
    2
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
            source_path: default_source_path(),
            chunk_size: default_chunk_size(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    42810
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Read `~/.mathmentor/config.toml`, then apply environment overrides.
    ///
    /// A key already present in the file wins over the environment. The
    /// key variables, in priority order: `MATHMENTOR_API_KEY`,
    /// `GEMINI_API_KEY`, `GOOGLE_API_KEY`. `MATHMENTOR_PROVIDER` and
    /// `MATHMENTOR_MODEL` override their config fields unconditionally.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_dir().join("config.toml"))?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("MATHMENTOR_API_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok())
                .or_else(|| std::env::var("GOOGLE_API_KEY").ok());
        }
        if let Ok(provider) = std::env::var("MATHMENTOR_PROVIDER") {
            config.provider = provider;
        }
        if let Ok(model) = std::env::var("MATHMENTOR_MODEL") {
            config.generation_model = model;
        }

        Ok(config)
    }

    /// Read and validate a config file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;

        Ok(config)
    }

    /// `~/.mathmentor` — the config file lives here.
    pub fn config_dir() -> PathBuf {
        home_dir().join(".mathmentor")
    }

    /// Where stores and documents live by default. Same directory as the
    /// config file; the split exists so it can diverge later without
    /// touching callers.
    pub fn data_dir() -> PathBuf {
        Self::config_dir()
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.knowledge.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "knowledge.chunk_size must be greater than 0".into(),
            ));
        }
        if self.knowledge.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "knowledge.top_k must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// True when an API key was found in the file or the environment.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The TOML scaffold `onboard` writes for a fresh install.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            generation_model: default_generation_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_tokens: None,
            api_url: None,
            memory: MemoryConfig::default(),
            knowledge: KnowledgeConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

fn home_dir() -> PathBuf {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Could not parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

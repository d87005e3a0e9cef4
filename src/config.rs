use std::env;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Ports scanned in order when `SERVER_PORT` is unset.
pub const FALLBACK_PORT_RANGE: RangeInclusive<u16> = 4100..=4199;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Docsum server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Directory receiving the original uploaded documents.
    pub upload_dir: PathBuf,
    /// Directory receiving one aggregate summary artifact per document.
    pub summary_output_dir: PathBuf,
    /// Word budget applied by the chunker.
    pub chunk_max_words: usize,
    /// Backend used to summarize each chunk.
    pub summarization_provider: SummarizationProvider,
    /// Model identifier passed to the provider.
    pub summarization_model: String,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Maximum output length requested per chunk.
    pub summary_max_length: usize,
    /// Minimum output length requested per chunk.
    pub summary_min_length: usize,
    /// Upper bound on a single chunk's summarization, in seconds.
    pub chunk_timeout_secs: u64,
    /// Input window of the summarization model, used for oversize warnings.
    pub model_context_tokens: usize,
    /// Maximum accepted multipart body size in bytes.
    pub max_upload_bytes: usize,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummarizationProvider {
    /// Local Ollama runtime.
    Ollama,
    /// Deterministic lead-sentence summaries; no model required.
    Extractive,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: None,
            upload_dir: PathBuf::from("uploads"),
            summary_output_dir: PathBuf::from("./dataset/summary"),
            chunk_max_words: 500,
            summarization_provider: SummarizationProvider::Ollama,
            summarization_model: "llama3.2".into(),
            ollama_url: "http://127.0.0.1:11434".into(),
            summary_max_length: 150,
            summary_min_length: 50,
            chunk_timeout_secs: 300,
            model_context_tokens: 1024,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup, applying defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let chunk_max_words = parse_or(
            get("CHUNK_MAX_WORDS"),
            "CHUNK_MAX_WORDS",
            defaults.chunk_max_words,
        )?;
        if chunk_max_words == 0 {
            return Err(ConfigError::InvalidValue("CHUNK_MAX_WORDS".into()));
        }

        let summary_max_length = parse_or(
            get("SUMMARY_MAX_LENGTH"),
            "SUMMARY_MAX_LENGTH",
            defaults.summary_max_length,
        )?;
        let summary_min_length = parse_or(
            get("SUMMARY_MIN_LENGTH"),
            "SUMMARY_MIN_LENGTH",
            defaults.summary_min_length,
        )?;
        if summary_min_length > summary_max_length {
            return Err(ConfigError::InvalidValue("SUMMARY_MIN_LENGTH".into()));
        }

        Ok(Self {
            server_port: get("SERVER_PORT")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            summary_output_dir: get("SUMMARY_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.summary_output_dir),
            chunk_max_words,
            summarization_provider: match get("SUMMARIZATION_PROVIDER") {
                Some(value) => value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".into()))?,
                None => defaults.summarization_provider,
            },
            summarization_model: get("SUMMARIZATION_MODEL")
                .unwrap_or(defaults.summarization_model),
            ollama_url: get("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            summary_max_length,
            summary_min_length,
            chunk_timeout_secs: parse_or(
                get("CHUNK_TIMEOUT_SECS"),
                "CHUNK_TIMEOUT_SECS",
                defaults.chunk_timeout_secs,
            )?,
            model_context_tokens: parse_or(
                get("MODEL_CONTEXT_TOKENS"),
                "MODEL_CONTEXT_TOKENS",
                defaults.model_context_tokens,
            )?,
            max_upload_bytes: parse_or(
                get("MAX_UPLOAD_BYTES"),
                "MAX_UPLOAD_BYTES",
                defaults.max_upload_bytes,
            )?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

impl std::str::FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "extractive" | "none" => Ok(Self::Extractive),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        server_port = ?config.server_port,
        provider = ?config.summarization_provider,
        model = %config.summarization_model,
        chunk_max_words = config.chunk_max_words,
        summary_dir = %config.summary_output_dir.display(),
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

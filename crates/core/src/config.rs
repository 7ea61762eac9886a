//! Configuration management for krepo.
//!
//! Configuration is merged from, in increasing precedence:
//! - Built-in defaults
//! - A YAML config file (`KREPO_CONFIG` or `./krepo.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The API credential is read exactly once here, from the environment
//! variable named by `search.apiKeyEnv` (default `GEMINI_API_KEY`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers understood by the search client factory.
pub const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Directory holding document mappings, the statute table and prompt overrides
    pub data_dir: PathBuf,

    /// Search provider ("gemini" or "mock")
    pub provider: String,

    /// Model identifier used for answer synthesis
    pub model: String,

    /// Optional custom endpoint for the search API
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// API key, resolved once at startup
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout for the external call, in seconds
    pub timeout_secs: u64,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,

    /// Maximum tokens in a generated answer
    pub max_output_tokens: u32,

    /// Listen address of the web shell
    pub bind: String,

    /// Knowledge-base key -> index overrides
    pub knowledge_bases: BTreeMap<String, KnowledgeBaseConfig>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Per knowledge-base settings from the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// External index identifier (e.g., "fileSearchStores/...")
    #[serde(rename = "indexId", default)]
    pub index_id: Option<String>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    search: Option<SearchSection>,
    #[serde(rename = "knowledgeBases")]
    knowledge_bases: Option<BTreeMap<String, KnowledgeBaseConfig>>,
    server: Option<ServerSection>,
    data: Option<DataSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SearchSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ServerSection {
    bind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DataSection {
    dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            data_dir: PathBuf::from("data"),
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            endpoint: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            timeout_secs: 60,
            temperature: 0.1,
            max_output_tokens: 8000,
            bind: "127.0.0.1:8501".to_string(),
            knowledge_bases: BTreeMap::new(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file, environment variables and defaults.
    ///
    /// Environment variables:
    /// - `KREPO_CONFIG`: Path to config file
    /// - `KREPO_DATA_DIR`: Data directory
    /// - `KREPO_PROVIDER`: Search provider
    /// - `KREPO_MODEL`: Model identifier
    /// - `KREPO_BIND`: Web shell listen address
    /// - `GEMINI_API_KEY` (or the configured `apiKeyEnv`): API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use krepo_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Model: {}", config.model);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(std::env::var("KREPO_CONFIG").ok().map(PathBuf::from))
    }

    /// Load configuration using an explicit config file path.
    ///
    /// An explicit path that does not exist is an error; the implicit
    /// `./krepo.yaml` is optional.
    pub fn load_from(config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config = config.merge_yaml(&path)?;
                config.config_file = Some(path);
            }
            None => {
                let implicit = PathBuf::from("krepo.yaml");
                if implicit.exists() {
                    config = config.merge_yaml(&implicit)?;
                    config.config_file = Some(implicit);
                }
            }
        }

        // Environment variables override YAML config
        if let Ok(data_dir) = std::env::var("KREPO_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(provider) = std::env::var("KREPO_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("KREPO_MODEL") {
            config.model = model;
        }

        if let Ok(bind) = std::env::var("KREPO_BIND") {
            config.bind = bind;
        }

        config.api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = if contents.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(contents)?
        };

        let mut result = self.clone();

        if let Some(search) = config_file.search {
            if let Some(provider) = search.provider {
                result.provider = provider;
            }
            if let Some(model) = search.model {
                result.model = model;
            }
            if search.endpoint.is_some() {
                result.endpoint = search.endpoint;
            }
            if let Some(env) = search.api_key_env {
                result.api_key_env = env;
            }
            if let Some(timeout) = search.timeout_secs {
                result.timeout_secs = timeout;
            }
            if let Some(temperature) = search.temperature {
                result.temperature = temperature;
            }
            if let Some(max_tokens) = search.max_output_tokens {
                result.max_output_tokens = max_tokens;
            }
        }

        if let Some(kbs) = config_file.knowledge_bases {
            result.knowledge_bases.extend(kbs);
        }

        if let Some(server) = config_file.server {
            if let Some(bind) = server.bind {
                result.bind = bind;
            }
        }

        if let Some(data) = config_file.data {
            if let Some(dir) = data.dir {
                result.data_dir = PathBuf::from(dir);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        bind: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(bind) = bind {
            self.bind = bind;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Path of the document mapping directory.
    pub fn mappings_dir(&self) -> PathBuf {
        self.data_dir.join("mappings")
    }

    /// Path of the statute name -> pcode table.
    pub fn law_mapping_path(&self) -> PathBuf {
        self.data_dir.join("law_pcode_mapping.json")
    }

    /// Path of the optional system prompt override.
    pub fn prompt_override_path(&self) -> PathBuf {
        self.data_dir.join("prompts").join("system.yml")
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "gemini" && self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                self.api_key_env
            )));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model must not be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Config(
                "timeoutSecs must be greater than zero".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "temperature must be within 0.0-2.0, got {}",
                self.temperature
            )));
        }

        Ok(())
    }
}

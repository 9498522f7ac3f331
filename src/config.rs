use crate::error::{StudioError, StudioResult};
use crate::translate::BUILTIN_STRATEGIES;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub translator: TranslatorConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Strategy used by `translate_intent` when no name is given.
    pub default_strategy: String,
    /// Upper bound on a single graph lookup made from inside a strategy.
    pub graph_query_timeout_ms: u64,
    /// Load the starter concept graph on startup.
    pub seed_graph: bool,
}

impl TranslatorConfig {
    pub fn graph_query_timeout(&self) -> Duration {
        Duration::from_millis(self.graph_query_timeout_ms)
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            default_strategy: "context-aware".to_string(),
            graph_query_timeout_ms: 250,
            seed_graph: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load configuration from `studio.toml`, an optional explicit file, and
/// `STUDIO__SECTION__KEY` environment variables, in that order of precedence
/// (later sources win).
pub fn load_config(path: Option<&Path>) -> StudioResult<AppConfig> {
    let mut builder = Config::builder().add_source(File::with_name("studio").required(false));

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("STUDIO").separator("__"));

    let config = builder
        .build()
        .map_err(|err| StudioError::ConfigError(err.to_string()))?;

    let parsed: AppConfig = config
        .try_deserialize()
        .map_err(|err| StudioError::ConfigError(err.to_string()))?;

    validate(&parsed)?;
    Ok(parsed)
}

fn validate(config: &AppConfig) -> StudioResult<()> {
    let strategy = config.translator.default_strategy.as_str();
    if !BUILTIN_STRATEGIES.contains(&strategy) {
        return Err(StudioError::ConfigError(format!(
            "unsupported translator.default_strategy '{}'; expected one of {}",
            strategy,
            BUILTIN_STRATEGIES.join(", ")
        )));
    }
    if config.translator.graph_query_timeout_ms == 0 {
        return Err(StudioError::ConfigError(
            "translator.graph_query_timeout_ms must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

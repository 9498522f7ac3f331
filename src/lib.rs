pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod server;
pub mod store;
pub mod translate;

pub use config::{load_config, AppConfig, LoggingConfig, ServerConfig, TranslatorConfig};
pub use error::{StudioError, StudioResult};
pub use model::*;
pub use parse::{classify_command, classify_intent, extract_parameters, parse_style_command};
pub use store::{GraphStore, InMemoryGraphStore};
pub use translate::{IntentTranslator, TranslationStrategy};

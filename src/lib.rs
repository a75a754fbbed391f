pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{
    engine::MixEngine,
    interleave::{interleave, Interleaver},
    pipeline::MixPipeline,
    registry::PoolRegistry,
    sanitizer::{sanitize, sanitize_text},
};
pub use domain::model::{Pool, PoolId};
pub use utils::error::{MixerError, Result};

pub mod cli;
pub mod toml_config;

use crate::core::export::SUPPORTED_FORMATS;
use crate::core::{ConfigProvider, OutputFilenames, PoolSpec};
use crate::utils::error::{MixerError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, validate_unique_names,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const DEFAULT_PRIMARY: &str = "iphone";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_FORMATS: [&str; 2] = ["txt", "csv"];
pub const SOURCE_EXTENSIONS: [&str; 2] = ["txt", "csv"];

/// 未指定 `--formats` 時使用的輸出格式
pub fn default_formats() -> &'static [String] {
    static FORMATS: OnceLock<Vec<String>> = OnceLock::new();
    FORMATS.get_or_init(|| DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect())
}

/// 解析 `NAME=PATH[,PATH...]`
pub fn parse_pool_spec(raw: &str) -> std::result::Result<PoolSpec, String> {
    let (name, paths) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH[,PATH...], got '{}'", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("pool name is empty in '{}'", raw));
    }

    let sources: Vec<String> = paths
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    if sources.is_empty() {
        return Err(format!("pool '{}' has no source files", name));
    }

    Ok(PoolSpec {
        name: name.to_string(),
        sources,
    })
}

/// Checks shared by every configuration source.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_non_empty_string("primary", config.primary_name())?;
    validate_path("output_path", config.output_path())?;

    if config.pools().is_empty() {
        return Err(MixerError::ConfigValidationError {
            field: "pools".to_string(),
            message: "At least one pool source is required".to_string(),
        });
    }

    for spec in config.pools() {
        validate_non_empty_string("pools.name", &spec.name)?;
        validate_file_extensions("pools.sources", &spec.sources, &SOURCE_EXTENSIONS)?;
    }
    validate_unique_names("pools.name", config.pools().iter().map(|p| p.name.as_str()))?;

    if config.output_formats().is_empty() {
        return Err(MixerError::ConfigValidationError {
            field: "output_formats".to_string(),
            message: "At least one output format is required".to_string(),
        });
    }
    for format in config.output_formats() {
        if !SUPPORTED_FORMATS.contains(&format.trim().to_ascii_lowercase().as_str()) {
            return Err(MixerError::InvalidConfigValueError {
                field: "output_formats".to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    SUPPORTED_FORMATS.join(", ")
                ),
            });
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
pub use args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "ua-mixer")]
    #[command(about = "Mix user agents from several device pools into one balanced list")]
    pub struct CliConfig {
        /// Path to a TOML job file; flags below override it
        #[arg(short, long)]
        pub config: Option<String>,

        /// Pool definition, repeatable: NAME=PATH[,PATH...] (.txt or .csv)
        #[arg(long = "pool", value_parser = parse_pool_spec)]
        pub pools: Vec<PoolSpec>,

        /// Name of the primary pool (case-insensitive)
        #[arg(long)]
        pub primary: Option<String>,

        #[arg(long)]
        pub output_path: Option<String>,

        /// Output formats, comma separated: txt, csv, json [default: txt,csv]
        #[arg(long, value_delimiter = ',')]
        pub formats: Option<Vec<String>>,

        /// Also write a ZIP bundle of every rendered file
        #[arg(long)]
        pub bundle: bool,

        /// Start from the iPhone / Samsung / Motorola pools
        #[arg(long)]
        pub seed_default_pools: bool,

        /// Index of the secondary pool the round-robin starts at [default: 0]
        #[arg(long)]
        pub start_cursor: Option<usize>,

        #[arg(long, help = "Validate and print the plan without mixing")]
        pub dry_run: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, default_value = "compact")]
        pub log_format: String,
    }

    impl ConfigProvider for CliConfig {
        fn pools(&self) -> &[PoolSpec] {
            &self.pools
        }

        fn primary_name(&self) -> &str {
            self.primary.as_deref().unwrap_or(DEFAULT_PRIMARY)
        }

        fn output_path(&self) -> &str {
            self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
        }

        fn output_formats(&self) -> &[String] {
            self.formats.as_deref().unwrap_or_else(|| default_formats())
        }

        fn bundle_enabled(&self) -> bool {
            self.bundle
        }

        fn filenames(&self) -> OutputFilenames {
            OutputFilenames::default()
        }

        fn seed_default_pools(&self) -> bool {
            self.seed_default_pools
        }

        fn start_cursor(&self) -> usize {
            self.start_cursor.unwrap_or(0)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_provider(self)
        }
    }

}

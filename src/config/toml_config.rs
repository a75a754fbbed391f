use crate::config::{validate_provider, DEFAULT_PRIMARY};
use crate::core::{ConfigProvider, OutputFilenames, PoolSpec};
use crate::utils::error::{MixerError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub mixer: MixerSection,
    #[serde(default)]
    pub pools: Vec<PoolSpec>,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MixerSection {
    pub primary: Option<String>,
    pub seed_default_pools: Option<bool>,
    pub start_cursor: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
    pub formats: Vec<String>,
    pub bundle: Option<BundleConfig>,
    pub filenames: Option<FilenameConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilenameConfig {
    pub txt: Option<String>,
    pub csv: Option<String>,
    pub json: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MixerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MixerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${POOL_DIR})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MixerError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// 指令列參數覆蓋檔案設定；`None` 與 `false` 代表沿用檔案內容
    #[allow(clippy::too_many_arguments)]
    pub fn apply_overrides(
        &mut self,
        primary: Option<&str>,
        output_path: Option<&str>,
        formats: Option<&[String]>,
        extra_pools: &[PoolSpec],
        bundle: bool,
        seed_default_pools: bool,
        start_cursor: Option<usize>,
    ) {
        if let Some(primary) = primary {
            self.mixer.primary = Some(primary.to_string());
        }
        if let Some(output_path) = output_path {
            self.export.output_path = output_path.to_string();
        }
        if let Some(formats) = formats {
            self.export.formats = formats.to_vec();
        }
        if let Some(cursor) = start_cursor {
            self.mixer.start_cursor = Some(cursor);
        }
        self.pools.extend(extra_pools.iter().cloned());
        if bundle {
            let filename = self.export.bundle.as_ref().and_then(|b| b.filename.clone());
            self.export.bundle = Some(BundleConfig {
                enabled: true,
                filename,
            });
        }
        if seed_default_pools {
            self.mixer.seed_default_pools = Some(true);
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn pools(&self) -> &[PoolSpec] {
        &self.pools
    }

    fn primary_name(&self) -> &str {
        self.mixer.primary.as_deref().unwrap_or(DEFAULT_PRIMARY)
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.export.formats
    }

    fn bundle_enabled(&self) -> bool {
        self.export.bundle.as_ref().map(|b| b.enabled).unwrap_or(false)
    }

    fn filenames(&self) -> OutputFilenames {
        let names = self.export.filenames.clone().unwrap_or_default();
        OutputFilenames {
            txt: names.txt,
            csv: names.csv,
            json: names.json,
            bundle: self.export.bundle.as_ref().and_then(|b| b.filename.clone()),
        }
    }

    fn seed_default_pools(&self) -> bool {
        self.mixer.seed_default_pools.unwrap_or(false)
    }

    fn start_cursor(&self) -> usize {
        self.mixer.start_cursor.unwrap_or(0)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

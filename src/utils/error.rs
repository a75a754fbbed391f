use crate::domain::model::PoolId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MixerError {
    #[error("Primary pool '{primary}' is missing or has no valid records")]
    EmptyPrimary { primary: String },

    #[error("Pool name already exists: {name}")]
    DuplicateName { name: String },

    #[error("Pool not found: {id}")]
    NotFound { id: PoolId },

    #[error("Invalid pool name: '{name}'")]
    InvalidPoolName { name: String },

    #[error("Unsupported pool source: {path} (expected .txt or .csv)")]
    UnsupportedSource { path: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Registry,
    Mixing,
    Io,
    Configuration,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 對應 CLI 結束碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl MixerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MixerError::DuplicateName { .. }
            | MixerError::NotFound { .. }
            | MixerError::InvalidPoolName { .. } => ErrorCategory::Registry,
            MixerError::EmptyPrimary { .. } => ErrorCategory::Mixing,
            MixerError::IoError(_) | MixerError::UnsupportedSource { .. } => ErrorCategory::Io,
            MixerError::CsvError(_)
            | MixerError::ZipError(_)
            | MixerError::SerializationError(_) => ErrorCategory::Export,
            MixerError::ConfigValidationError { .. }
            | MixerError::InvalidConfigValueError { .. }
            | MixerError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Registry | ErrorCategory::Mixing => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Medium,
            ErrorCategory::Export => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            MixerError::EmptyPrimary { primary } => format!(
                "Add at least one valid user agent to the '{}' pool, or choose another --primary",
                primary
            ),
            MixerError::DuplicateName { .. } => {
                "Pool names are case-insensitive; pick a different name".to_string()
            }
            MixerError::NotFound { .. } => "List the pools and retry with an existing id".to_string(),
            MixerError::InvalidPoolName { .. } => "Enter a non-blank pool name".to_string(),
            MixerError::UnsupportedSource { .. } => {
                "Convert the source to a .txt (one per line) or .csv file".to_string()
            }
            MixerError::IoError(_) => "Check that the file exists and is readable/writable".to_string(),
            MixerError::CsvError(_) => "Check the spreadsheet is valid CSV".to_string(),
            MixerError::ZipError(_) | MixerError::SerializationError(_) => {
                "Retry the export, or disable the failing format".to_string()
            }
            MixerError::ConfigValidationError { field, .. }
            | MixerError::InvalidConfigValueError { field, .. }
            | MixerError::MissingConfigError { field } => {
                format!("Fix the '{}' setting in the CLI flags or TOML file", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MixerError::EmptyPrimary { primary } => {
                format!("At least one {} user agent is required!", primary)
            }
            MixerError::DuplicateName { name } => format!("Pool \"{}\" already exists!", name),
            MixerError::InvalidPoolName { .. } => "Please enter a pool name!".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MixerError>;

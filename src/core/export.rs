use crate::domain::model::{MixOutcome, PoolSummary};
use crate::utils::error::{MixerError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const DEFAULT_TXT_FILENAME: &str = "mixed-user-agents.txt";
pub const DEFAULT_CSV_FILENAME: &str = "mixed-user-agents.csv";
pub const DEFAULT_JSON_FILENAME: &str = "mix-report.json";
pub const DEFAULT_BUNDLE_FILENAME: &str = "mixed-user-agents.zip";

pub const SUPPORTED_FORMATS: [&str; 3] = ["txt", "csv", "json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Txt,
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = MixerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" => Ok(ExportFormat::Txt),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(MixerError::InvalidConfigValueError {
                field: "output_formats".to_string(),
                value: other.to_string(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    SUPPORTED_FORMATS.join(", ")
                ),
            }),
        }
    }
}

/// JSON 報告內容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixReport {
    pub generated_at: DateTime<Utc>,
    pub primary: String,
    pub total_records: usize,
    pub pools: Vec<PoolSummary>,
}

impl MixReport {
    pub fn from_outcome(outcome: &MixOutcome) -> Self {
        Self {
            generated_at: Utc::now(),
            primary: outcome.primary.clone(),
            total_records: outcome.mixed.len(),
            pools: outcome.pools.clone(),
        }
    }
}

pub fn render_text(records: &[String]) -> String {
    records.join("\n")
}

pub fn render_csv(records: &[String]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["user_agent"])?;
    for record in records {
        writer.write_record([record])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| MixerError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn render_json(report: &MixReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// 將已產生的檔案打包成 ZIP
pub fn render_bundle(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, data) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry 內部發放的池識別碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(pub u64);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, deduplicated, insertion-ordered sequence of user agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub name: String,
    pub records: Vec<String>,
}

impl Pool {
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 從來源檔案讀出的原始資料，尚未清洗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSource {
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolRole {
    Primary,
    Secondary,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub name: String,
    pub records: usize,
    pub role: PoolRole,
}

/// transform 階段的產物
#[derive(Debug, Clone)]
pub struct MixOutcome {
    pub primary: String,
    pub pools: Vec<PoolSummary>,
    pub mixed: Vec<String>,
}

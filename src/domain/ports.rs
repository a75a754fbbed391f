use crate::domain::model::{MixOutcome, PoolSource};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 一個池的名稱與其來源檔案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSpec {
    pub name: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputFilenames {
    pub txt: Option<String>,
    pub csv: Option<String>,
    pub json: Option<String>,
    pub bundle: Option<String>,
}

pub trait ConfigProvider: Send + Sync {
    fn pools(&self) -> &[PoolSpec];
    fn primary_name(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn bundle_enabled(&self) -> bool;
    fn filenames(&self) -> OutputFilenames;
    fn seed_default_pools(&self) -> bool;
    fn start_cursor(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<PoolSource>>;
    async fn transform(&self, sources: Vec<PoolSource>) -> Result<MixOutcome>;
    async fn load(&self, outcome: MixOutcome) -> Result<String>;
}

use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct MixEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> MixEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// 依序執行 extract → transform → load，回傳主要輸出檔路徑
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting mix process...");

        let sources = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} pool(s)", sources.len());

        let outcome = self.pipeline.transform(sources).await?;
        tracing::info!(
            "🔀 Interleaved {} records against primary '{}'",
            outcome.mixed.len(),
            outcome.primary
        );

        let output_path = self.pipeline.load(outcome).await?;
        tracing::info!(
            "📁 Output saved to: {} ({:?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}

use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct DigestEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> DigestEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load in order. The first error stops the
    /// run, so nothing is delivered unless every ticket was fetched and
    /// rendered.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Fetching tickets...");
        let raw = self.pipeline.extract().await?;
        tracing::info!("Fetched {} ticket(s)", raw.len());

        let records = self.pipeline.transform(raw).await?;
        tracing::debug!("Parsed {} record(s)", records.len());

        let target = self.pipeline.load(records).await?;
        tracing::info!("Digest delivered to {}", target);

        Ok(target)
    }
}

use crate::domain::model::{Digest, RawTicket, TicketRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where a finished digest goes.
pub trait DigestSink: Send + Sync {
    /// Returns a short description of where the digest ended up.
    fn deliver(&self, digest: &Digest) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawTicket>>;
    async fn transform(&self, tickets: Vec<RawTicket>) -> Result<Vec<TicketRecord>>;
    async fn load(&self, records: Vec<TicketRecord>) -> Result<String>;
}

use crate::domain::model::{OrderBy, SearchFormat, TicketReference, TicketSummary};
use crate::rt::fetch::fetch;
use crate::rt::parser::{parse_references, parse_summaries};
use crate::rt::query::{build_search_url, build_show_url};
use crate::rt::session::Session;
use crate::utils::error::Result;

/// Search and show calls made through one authenticated session, one
/// request at a time.
#[derive(Debug, Clone)]
pub struct RtClient {
    session: Session,
}

impl RtClient {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// References of matching tickets, in RT's order.
    pub async fn search(&self, query: &str, order_by: &OrderBy) -> Result<Vec<TicketReference>> {
        tracing::debug!(
            "Searching {:?} ordered by {} {:?}",
            query,
            order_by.field(),
            order_by.direction()
        );
        let url = build_search_url(self.session.service(), query, order_by, SearchFormat::Ids)?;
        let lines = fetch(&self.session, &url, "executing query").await?;
        let references = parse_references(&lines)?;

        if references.is_empty() {
            tracing::warn!(
                "Search matched no tickets; if that is unexpected, check the RT credentials"
            );
        } else {
            tracing::info!("Search matched {} ticket(s)", references.len());
        }
        Ok(references)
    }

    pub async fn search_summaries(
        &self,
        query: &str,
        order_by: &OrderBy,
    ) -> Result<Vec<TicketSummary>> {
        let url = build_search_url(
            self.session.service(),
            query,
            order_by,
            SearchFormat::Summary,
        )?;
        let lines = fetch(&self.session, &url, "executing query").await?;
        parse_summaries(&lines)
    }

    /// Detail lines of one ticket with the header removed.
    pub async fn show(&self, reference: &TicketReference) -> Result<Vec<String>> {
        let url = build_show_url(self.session.service(), reference)?;
        fetch(&self.session, &url, "showing ticket").await
    }
}

use crate::app::template::MailAssembler;
use crate::config::service::ParserOptions;
use crate::config::DigestSettings;
use crate::core::{DigestSink, Pipeline, RawTicket, TicketRecord};
use crate::domain::model::OrderBy;
use crate::rt::parser::parse_record;
use crate::rt::RtClient;
use crate::utils::error::Result;
use chrono::NaiveDate;

/// Search, show each hit, parse, render, deliver.
pub struct DigestPipeline<S: DigestSink> {
    client: RtClient,
    query: String,
    order_by: OrderBy,
    parser: ParserOptions,
    assembler: MailAssembler,
    sink: S,
    date: NaiveDate,
}

impl<S: DigestSink> DigestPipeline<S> {
    pub fn new(client: RtClient, settings: &DigestSettings, assembler: MailAssembler, sink: S) -> Self {
        Self {
            client,
            query: settings.query.clone(),
            order_by: settings.order_by.clone(),
            parser: settings.parser.clone(),
            assembler,
            sink,
            date: chrono::Local::now().date_naive(),
        }
    }

    /// Date shown in the preamble; defaults to today.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}

#[async_trait::async_trait]
impl<S: DigestSink> Pipeline for DigestPipeline<S> {
    async fn extract(&self) -> Result<Vec<RawTicket>> {
        let references = self.client.search(&self.query, &self.order_by).await?;

        let mut tickets = Vec::with_capacity(references.len());
        for reference in references {
            tracing::debug!("Showing {}", reference);
            let lines = self.client.show(&reference).await?;
            tickets.push(RawTicket { reference, lines });
        }
        Ok(tickets)
    }

    async fn transform(&self, tickets: Vec<RawTicket>) -> Result<Vec<TicketRecord>> {
        tickets
            .iter()
            .map(|ticket| {
                let record = parse_record(&ticket.lines, &self.parser)?;
                tracing::debug!("{}: {} field(s)", ticket.reference, record.len());
                Ok(record)
            })
            .collect()
    }

    async fn load(&self, records: Vec<TicketRecord>) -> Result<String> {
        let digest = self.assembler.assemble(&records, self.date)?;
        self.sink.deliver(&digest).await
    }
}

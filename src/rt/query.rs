use crate::config::service::{ServiceConfig, REFERENCE_PLACEHOLDER};
use crate::domain::model::{OrderBy, SearchFormat, TicketReference};
use crate::utils::error::Result;
use url::Url;

/// Search endpoint URL with `query`, `orderby` and `format` form-encoded.
/// Pure construction; nothing is sent.
pub fn build_search_url(
    service: &ServiceConfig,
    query: &str,
    order_by: &OrderBy,
    format: SearchFormat,
) -> Result<Url> {
    let mut url = Url::parse(&service.search_endpoint())?;
    url.query_pairs_mut()
        .append_pair("query", query)
        .append_pair("orderby", &order_by.to_string())
        .append_pair("format", format.code());
    Ok(url)
}

pub fn build_show_url(service: &ServiceConfig, reference: &TicketReference) -> Result<Url> {
    let raw = service
        .show_endpoint_template()
        .replace(REFERENCE_PLACEHOLDER, &reference.to_string());
    Ok(Url::parse(&raw)?)
}

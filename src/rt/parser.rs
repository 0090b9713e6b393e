//! Turns trimmed RT response lines into records.
//!
//! A detail (`show`) response is one `Name: Value` line per field. A value
//! that spans several lines continues on lines that start with the
//! indentation marker; those are joined onto the field above with single
//! spaces.

use crate::config::service::ParserOptions;
use crate::domain::model::{TicketRecord, TicketReference, TicketSummary};
use crate::utils::error::{DigestError, Result};

/// What RT prints instead of references when a search matches nothing.
pub const NO_MATCHES: &str = "No matching results.";

pub fn parse_record<S: AsRef<str>>(lines: &[S], options: &ParserOptions) -> Result<TicketRecord> {
    let mut record = TicketRecord::new();
    // Name of the field the next continuation line belongs to.
    let mut current: Option<String> = None;

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line == options.indent || line.trim().is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(options.indent.as_str()) {
            let extra = rest.trim();
            if extra.is_empty() {
                continue;
            }
            let key = current
                .as_deref()
                .ok_or_else(|| DigestError::ParseAmbiguity {
                    line_number: index + 1,
                    line: line.to_string(),
                })?;
            record.append(key, extra);
            continue;
        }

        if line.starts_with('#') {
            tracing::warn!("RT: {}", line.trim_start_matches('#').trim());
            continue;
        }

        let (key, value) = split_field(line, options);
        record.insert(key.clone(), value);
        current = Some(key);
    }

    Ok(record)
}

/// Splits a field line on its first `:` into a template-ready name and a
/// trimmed, wrapped value. A line with no `:` becomes a name with an empty value.
pub fn split_field(line: &str, options: &ParserOptions) -> (String, String) {
    let (name, value) = line.split_once(':').unwrap_or((line, ""));
    let name = name.trim();
    let mut value = value.trim().to_string();

    if name.contains("id") {
        value = value.replace(options.reference_prefix.as_str(), "");
    }

    (
        field_key(name, options),
        wrap_text(&value, options.wrap_width),
    )
}

/// `CF-Owner` and `CF.{Owner}` both become `Owner`.
pub fn field_key(name: &str, options: &ParserOptions) -> String {
    if let Some(bare) = name.strip_prefix(options.custom_field_prefix.as_str()) {
        return bare.to_string();
    }
    name.strip_prefix("CF.{")
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(name)
        .to_string()
}

/// Greedy word wrap. Runs of whitespace collapse to one space; a word longer
/// than `width` gets a line of its own rather than being split.
pub fn wrap_text(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len == 0 {
            out.push_str(word);
            line_len = word_len;
        } else if line_len + 1 + word_len <= width {
            out.push(' ');
            out.push_str(word);
            line_len += 1 + word_len;
        } else {
            out.push('\n');
            out.push_str(word);
            line_len = word_len;
        }
    }

    out
}

/// Reads an `ids` search result.
pub fn parse_references<S: AsRef<str>>(lines: &[S]) -> Result<Vec<TicketReference>> {
    search_lines(lines).map(TicketReference::parse).collect()
}

/// Reads a `summary` search result.
pub fn parse_summaries<S: AsRef<str>>(lines: &[S]) -> Result<Vec<TicketSummary>> {
    search_lines(lines).map(TicketSummary::parse).collect()
}

fn search_lines<S: AsRef<str>>(lines: &[S]) -> impl Iterator<Item = &str> {
    lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty() && *line != NO_MATCHES)
}

use crate::utils::error::{DigestError, Result};
use std::fmt;

pub const TICKET_PREFIX: &str = "ticket/";

/// A `ticket/<id>` reference as returned by an `ids` search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketReference {
    id: u64,
}

impl TicketReference {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn parse(line: &str) -> Result<Self> {
        let malformed = || DigestError::MalformedReference {
            line: line.to_string(),
        };
        let id = line
            .trim()
            .strip_prefix(TICKET_PREFIX)
            .ok_or_else(malformed)?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        id.parse().map(Self::new).map_err(|_| malformed())
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for TicketReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", TICKET_PREFIX, self.id)
    }
}

/// One `id: subject` line of a `summary` search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSummary {
    pub id: u64,
    pub subject: String,
}

impl TicketSummary {
    pub fn parse(line: &str) -> Result<Self> {
        let (id, subject) = line
            .split_once(':')
            .ok_or_else(|| DigestError::MalformedReference {
                line: line.to_string(),
            })?;
        let id = id
            .trim()
            .parse()
            .map_err(|_| DigestError::MalformedReference {
                line: line.to_string(),
            })?;
        Ok(Self {
            id,
            subject: subject.trim().to_string(),
        })
    }
}

/// Verbosity of a search response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFormat {
    #[default]
    Ids,
    Summary,
    Long,
}

impl SearchFormat {
    pub fn code(self) -> &'static str {
        match self {
            SearchFormat::Ids => "i",
            SearchFormat::Summary => "s",
            SearchFormat::Long => "l",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A sort key such as `+Starts` or `-Created`.
///
/// The prefix is optional; without one RT sorts ascending. The key is sent
/// back to RT exactly as it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    field: String,
    prefix: Option<SortDirection>,
}

impl OrderBy {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (prefix, field) = match raw.chars().next() {
            Some('+') => (Some(SortDirection::Ascending), &raw[1..]),
            Some('-') => (Some(SortDirection::Descending), &raw[1..]),
            _ => (None, raw),
        };
        if field.is_empty() {
            return Err(DigestError::InvalidConfigValueError {
                field: "order_by".to_string(),
                value: raw.to_string(),
                reason: "Sort key needs a field name".to_string(),
            });
        }
        Ok(Self {
            field: field.to_string(),
            prefix,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> SortDirection {
        self.prefix.unwrap_or(SortDirection::Ascending)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(SortDirection::Ascending) => write!(f, "+{}", self.field),
            Some(SortDirection::Descending) => write!(f, "-{}", self.field),
            None => f.write_str(&self.field),
        }
    }
}

/// Field name to value, kept in order of first appearance.
///
/// Re-inserting an existing key replaces its value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketRecord {
    fields: Vec<(String, String)>,
}

impl TicketRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Appends `extra` to the value of `key`, separated by one space.
    /// Returns false when the key is absent.
    pub fn append(&mut self, key: &str, extra: &str) -> bool {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, value)) => {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(extra);
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TicketRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = TicketRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Detail lines of one ticket, header already trimmed.
#[derive(Debug, Clone)]
pub struct RawTicket {
    pub reference: TicketReference,
    pub lines: Vec<String>,
}

/// The rendered message handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub body: String,
    pub ticket_count: usize,
}

use crate::utils::error::Result;
use crate::utils::validation::{
    validate_contains, validate_non_empty_string, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://support.oit.pdx.edu";
pub const DEFAULT_REST_PATH: &str = "/REST/1.0";
pub const REFERENCE_PLACEHOLDER: &str = "{reference}";

/// Where the RT REST interface lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Login form target and root of the REST path.
    pub base_url: String,
    pub rest_path: String,
    pub search_path: String,
    /// Relative to the REST root; `{reference}` becomes `ticket/<id>`.
    pub show_path: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            rest_path: DEFAULT_REST_PATH.to_string(),
            search_path: "search/ticket".to_string(),
            show_path: format!("{}/show", REFERENCE_PLACEHOLDER),
            timeout_seconds: None,
        }
    }
}

impl ServiceConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn api_root(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.rest_path.trim_matches('/')
        )
    }

    pub fn search_endpoint(&self) -> String {
        format!("{}/{}", self.api_root(), self.search_path.trim_matches('/'))
    }

    pub fn show_endpoint_template(&self) -> String {
        format!("{}/{}", self.api_root(), self.show_path.trim_start_matches('/'))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_url("service.base_url", &self.base_url)?;
        validate_non_empty_string("service.search_path", &self.search_path)?;
        validate_contains("service.show_path", &self.show_path, REFERENCE_PLACEHOLDER)?;
        if let Some(secs) = self.timeout_seconds {
            validate_range("service.timeout_seconds", secs, 1, 3600)?;
        }
        Ok(())
    }
}

/// How detail responses are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Leading text that marks a continuation line.
    pub indent: String,
    pub custom_field_prefix: String,
    pub reference_prefix: String,
    pub wrap_width: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            custom_field_prefix: "CF-".to_string(),
            reference_prefix: crate::domain::model::TICKET_PREFIX.to_string(),
            wrap_width: 72,
        }
    }
}

impl Validate for ParserOptions {
    fn validate(&self) -> Result<()> {
        if self.indent.is_empty() {
            return Err(crate::utils::error::DigestError::InvalidConfigValueError {
                field: "parser.indent".to_string(),
                value: String::new(),
                reason: "Continuation marker cannot be empty".to_string(),
            });
        }
        validate_range("parser.wrap_width", self.wrap_width, 20, 1000)
    }
}

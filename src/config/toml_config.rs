use crate::config::service::{ParserOptions, ServiceConfig};
use crate::utils::error::{DigestError, Result};
use crate::utils::validation::{
    validate_email, validate_non_empty_string, validate_path, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_QUERY: &str = "Created < 'Today 15:00:00' AND Starts > 'Today 15:00:00' AND Queue='change-control' AND (Status = 'new' OR Status = 'open')";
pub const DEFAULT_ORDER_BY: &str = "+Starts";

/// Optional configuration file. Every section and key has a default, so an
/// empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    pub search: SearchConfig,
    pub parser: ParserOptions,
    pub templates: TemplateConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub query: String,
    pub order_by: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            order_by: DEFAULT_ORDER_BY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub dir: String,
    pub ticket: String,
    pub preamble: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: "templates".to_string(),
            ticket: "change-control.txt".to_string(),
            preamble: "change-control-preamble.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Appended to the RT username when no from address is given.
    pub from_domain: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 25,
            from_domain: "pdx.edu".to_string(),
            from: None,
            to: None,
        }
    }
}

impl TomlConfig {
    /// Loads the file and expands `${VAR}` references before parsing.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DigestError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DigestError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            DigestError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        self.service.validate()?;
        self.parser.validate()?;

        validate_non_empty_string("search.query", &self.search.query)?;
        crate::domain::model::OrderBy::parse(&self.search.order_by)?;

        validate_path("templates.dir", &self.templates.dir)?;
        validate_path("templates.ticket", &self.templates.ticket)?;
        validate_path("templates.preamble", &self.templates.preamble)?;

        validate_non_empty_string("mail.smtp_host", &self.mail.smtp_host)?;
        validate_range("mail.smtp_port", self.mail.smtp_port, 1, u16::MAX)?;
        if let Some(from) = &self.mail.from {
            validate_email("mail.from", from)?;
        }
        if let Some(to) = &self.mail.to {
            validate_email("mail.to", to)?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

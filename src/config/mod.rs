pub mod service;
pub mod toml_config;

use crate::domain::model::OrderBy;
use crate::utils::error::Result;
use crate::utils::validation::{validate_email, validate_non_empty_string, Validate};
use service::{ParserOptions, ServiceConfig};
use toml_config::{MailConfig, TemplateConfig, TomlConfig};

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Everything one run needs, resolved from the file and the command line.
/// Built once and only read afterwards.
#[derive(Debug, Clone)]
pub struct DigestSettings {
    pub service: ServiceConfig,
    pub parser: ParserOptions,
    pub query: String,
    pub order_by: OrderBy,
    pub templates: TemplateConfig,
    pub mail: MailConfig,
    pub user: String,
    pub from_address: String,
    /// `None` prints the digest instead of mailing it.
    pub to_address: Option<String>,
    pub silent: bool,
    pub dry_run: bool,
}

impl DigestSettings {
    pub fn from_toml(config: TomlConfig, user: &str) -> Result<Self> {
        config.validate()?;
        validate_non_empty_string("user", user)?;

        let from_address = config
            .mail
            .from
            .clone()
            .unwrap_or_else(|| format!("{}@{}", user, config.mail.from_domain));
        validate_email("mail.from", &from_address)?;

        Ok(Self {
            order_by: OrderBy::parse(&config.search.order_by)?,
            query: config.search.query,
            service: config.service,
            parser: config.parser,
            templates: config.templates,
            to_address: config.mail.to.clone(),
            mail: config.mail,
            user: user.to_string(),
            from_address,
            silent: false,
            dry_run: false,
        })
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "rt-digest")]
#[command(about = "Mail a digest of pending RT change-control tickets")]
pub struct CliConfig {
    /// RT username; the password is read from RT_PASSWORD or prompted for
    #[arg(short, long)]
    pub user: String,

    /// Recipient; without it the digest is printed to stdout
    #[arg(short, long)]
    pub to: Option<String>,

    /// Sender address, defaults to <user>@<mail.from_domain>
    #[arg(short, long)]
    pub from: Option<String>,

    /// RT search expression replacing the configured query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Sort key, e.g. +Starts or -Created
    #[arg(short, long)]
    pub order_by: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, env = "RT_BASE_URL")]
    pub base_url: Option<String>,

    /// Do not echo a mailed digest to stdout
    #[arg(short, long)]
    pub silent: bool,

    /// Print matching ticket ids and subjects, then exit
    #[arg(long)]
    pub list: bool,

    /// Fetch and render but never send
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(base_url) = &self.base_url {
            config.service.base_url = base_url.clone();
        }
        if let Some(query) = &self.query {
            config.search.query = query.clone();
        }
        if let Some(order_by) = &self.order_by {
            config.search.order_by = order_by.clone();
        }
        if let Some(from) = &self.from {
            config.mail.from = Some(from.clone());
        }
        if let Some(to) = &self.to {
            config.mail.to = Some(to.clone());
        }
    }

    pub fn settings(&self) -> Result<DigestSettings> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);

        let mut settings = DigestSettings::from_toml(config, &self.user)?;
        settings.silent = self.silent;
        settings.dry_run = self.dry_run;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_address_defaults_to_user_at_domain() {
        let settings = DigestSettings::from_toml(TomlConfig::default(), "maxp").unwrap();
        assert_eq!(settings.from_address, "maxp@pdx.edu");
        assert_eq!(settings.order_by.to_string(), "+Starts");
        assert!(settings.to_address.is_none());
    }

    #[test]
    fn test_empty_user_is_rejected() {
        assert!(DigestSettings::from_toml(TomlConfig::default(), "  ").is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_overrides_file_values() {
        let cli = CliConfig::parse_from([
            "rt-digest",
            "-u",
            "alice",
            "-t",
            "cab@example.com",
            "-q",
            "Queue = 'network'",
            "-o",
            "-Created",
            "--silent",
        ]);

        let settings = cli.settings().unwrap();
        assert_eq!(settings.user, "alice");
        assert_eq!(settings.to_address.as_deref(), Some("cab@example.com"));
        assert_eq!(settings.query, "Queue = 'network'");
        assert_eq!(settings.order_by.to_string(), "-Created");
        assert!(settings.silent);
        assert!(!settings.dry_run);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_requires_user() {
        assert!(CliConfig::try_parse_from(["rt-digest"]).is_err());
    }
}

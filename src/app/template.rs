use crate::config::toml_config::TemplateConfig;
use crate::domain::model::{Digest, TicketRecord};
use crate::utils::error::{DigestError, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$(?:(?P<escaped>\$)|\{(?P<braced>[_A-Za-z][_A-Za-z0-9]*)\}|(?P<named>[_A-Za-z][_A-Za-z0-9]*))")
            .expect("placeholder pattern is valid")
    })
}

/// Text with `$name` / `${name}` placeholders; `$$` is a literal `$`.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    text: String,
}

impl Template {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(path.display().to_string(), text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placeholder names in order of appearance, duplicates included.
    pub fn placeholders(&self) -> Vec<&str> {
        placeholder_pattern()
            .captures_iter(&self.text)
            .filter_map(|caps| caps.name("braced").or_else(|| caps.name("named")))
            .map(|m| m.as_str())
            .collect()
    }

    /// Substitutes every placeholder literally. A placeholder with no
    /// matching field fails the whole render.
    pub fn render(&self, values: &TicketRecord) -> Result<String> {
        let mut out = String::with_capacity(self.text.len());
        let mut last = 0;

        for caps in placeholder_pattern().captures_iter(&self.text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&self.text[last..whole.start()]);
            last = whole.end();

            if caps.name("escaped").is_some() {
                out.push('$');
                continue;
            }

            let Some(key) = caps.name("braced").or_else(|| caps.name("named")) else {
                continue;
            };
            let value = values
                .get(key.as_str())
                .ok_or_else(|| DigestError::TemplateMismatch {
                    template: self.name.clone(),
                    placeholder: key.as_str().to_string(),
                })?;
            out.push_str(value);
        }

        out.push_str(&self.text[last..]);
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub ticket: Template,
    pub preamble: Template,
}

impl TemplateSet {
    pub fn load(config: &TemplateConfig) -> Result<Self> {
        let dir = Path::new(&config.dir);
        let ticket = Template::from_file(dir.join(&config.ticket))?;
        let preamble = Template::from_file(dir.join(&config.preamble))?;
        if !preamble.placeholders().contains(&"changes") {
            tracing::warn!(
                "Preamble {} has no $changes placeholder; tickets will not appear in the digest",
                preamble.name()
            );
        }
        tracing::debug!(
            "Loaded templates {} and {}",
            ticket.name(),
            preamble.name()
        );
        Ok(Self { ticket, preamble })
    }
}

/// Renders each record with the ticket template, joins them in order and
/// wraps the result in the preamble.
#[derive(Debug, Clone)]
pub struct MailAssembler {
    templates: TemplateSet,
}

impl MailAssembler {
    pub fn new(templates: TemplateSet) -> Self {
        Self { templates }
    }

    pub fn assemble(&self, records: &[TicketRecord], date: NaiveDate) -> Result<Digest> {
        let mut changes = String::new();
        for record in records {
            changes.push_str(&self.templates.ticket.render(record)?);
        }

        let preamble: TicketRecord = [
            ("changes", changes),
            ("date", date.format("%Y-%m-%d").to_string()),
            ("count", records.len().to_string()),
        ]
        .into_iter()
        .collect();

        Ok(Digest {
            body: self.templates.preamble.render(&preamble)?,
            ticket_count: records.len(),
        })
    }
}

use crate::domain::model::Digest;
use crate::domain::ports::DigestSink;
use crate::utils::error::{DigestError, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{Message, SmtpTransport, Transport};
use std::io::Write;

/// Prints the digest instead of mailing it.
#[derive(Debug, Clone, Default)]
pub struct StdoutSink;

impl DigestSink for StdoutSink {
    async fn deliver(&self, digest: &Digest) -> Result<String> {
        write_stdout(&digest.body)?;
        Ok("stdout".to_string())
    }
}

fn write_stdout(body: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(body.as_bytes())?;
    if !body.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Splits a leading `Name: value` block, ended by a blank line, off the
/// rendered text. Text that does not open with such a block has no headers.
fn split_headers(text: &str) -> (Vec<(&str, &str)>, &str) {
    let mut headers = Vec::new();
    let mut rest = text;
    loop {
        let (line, tail) = match rest.split_once('\n') {
            Some((line, tail)) => (line.trim_end_matches('\r'), tail),
            None => return (Vec::new(), text),
        };
        if line.is_empty() {
            if headers.is_empty() {
                return (Vec::new(), text);
            }
            return (headers, tail);
        }
        match line.split_once(':') {
            Some((name, value))
                if !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') =>
            {
                headers.push((name, value.trim()));
            }
            _ => return (Vec::new(), text),
        }
        rest = tail;
    }
}

/// Mails the digest through an SMTP relay. A `Subject:` header at the top
/// of the rendered text becomes the message subject.
#[derive(Debug, Clone)]
pub struct SmtpSink {
    host: String,
    port: u16,
    from: String,
    to: String,
    /// Also print the digest after sending it.
    echo: bool,
}

impl SmtpSink {
    pub fn new(host: impl Into<String>, port: u16, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            from: from.into(),
            to: to.into(),
            echo: false,
        }
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn message(&self, text: &str) -> Result<Message> {
        let (headers, body) = split_headers(text);
        let mut builder = Message::builder()
            .from(parse_mailbox("from", &self.from)?)
            .to(parse_mailbox("to", &self.to)?)
            .header(ContentType::TEXT_PLAIN);

        for (name, value) in headers {
            if name.eq_ignore_ascii_case("subject") {
                builder = builder.subject(value);
            } else {
                tracing::debug!("Ignoring template header {}: {}", name, value);
            }
        }

        builder
            .body(body.to_string())
            .map_err(|e| DigestError::MailError {
                message: format!("Failed to build message: {e}"),
            })
    }
}

fn parse_mailbox(role: &str, raw: &str) -> Result<Mailbox> {
    raw.parse().map_err(|e| DigestError::MailError {
        message: format!("Invalid {role} address {raw:?}: {e}"),
    })
}

impl DigestSink for SmtpSink {
    async fn deliver(&self, digest: &Digest) -> Result<String> {
        let message = self.message(&digest.body)?;
        // The relay is local and unauthenticated, as the digest has always used.
        let transport = SmtpTransport::builder_dangerous(&self.host)
            .port(self.port)
            .build();

        tracing::debug!(
            "Sending digest from {} to {} via {}:{}",
            self.from,
            self.to,
            self.host,
            self.port
        );
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| DigestError::MailError {
                message: format!("SMTP task failed: {e}"),
            })?
            .map_err(|e| DigestError::MailError {
                message: format!("SMTP send failed: {e}"),
            })?;

        tracing::info!("Digest mailed to {}", self.to);
        if self.echo {
            write_stdout(&digest.body)?;
        }
        Ok(format!("{} via {}:{}", self.to, self.host, self.port))
    }
}

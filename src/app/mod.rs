pub mod mailer;
pub mod template;

pub use mailer::{SmtpSink, StdoutSink};
pub use template::{MailAssembler, Template, TemplateSet};

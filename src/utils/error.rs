use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Failed to contact RT while {operation} ({url}): {source}")]
    TransportFailure {
        operation: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("RT answered {status} while {operation} ({url})")]
    UnexpectedStatus {
        operation: String,
        url: String,
        status: u16,
    },

    #[error("Response from {url} has {lines} line(s), expected a status line and a blank separator")]
    TruncatedResponse { url: String, lines: usize },

    #[error("Continuation line {line_number} has no field to extend: {line:?}")]
    ParseAmbiguity { line_number: usize, line: String },

    #[error("Not a ticket reference: {line:?}")]
    MalformedReference { line: String },

    #[error("Template '{template}' expects '{placeholder}' but the record has no such field")]
    TemplateMismatch { template: String, placeholder: String },

    #[error("RT did not accept the session at {url} (status line: {status_line:?})")]
    AuthenticationAmbiguity { url: String, status_line: String },

    #[error("Mail delivery failed: {message}")]
    MailError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration validation error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for '{field}' ({value:?}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Authentication,
    Parse,
    Template,
    Delivery,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl DigestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DigestError::TransportFailure { .. }
            | DigestError::UnexpectedStatus { .. }
            | DigestError::TruncatedResponse { .. } => ErrorCategory::Transport,
            DigestError::AuthenticationAmbiguity { .. } => ErrorCategory::Authentication,
            DigestError::ParseAmbiguity { .. } | DigestError::MalformedReference { .. } => {
                ErrorCategory::Parse
            }
            DigestError::TemplateMismatch { .. } => ErrorCategory::Template,
            DigestError::MailError { .. } => ErrorCategory::Delivery,
            DigestError::ConfigValidationError { .. }
            | DigestError::InvalidConfigValueError { .. }
            | DigestError::UrlError(_) => ErrorCategory::Configuration,
            DigestError::IoError(_) => ErrorCategory::System,
        }
    }

    /// Every error aborts the run; severity only selects the exit status.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Parse | ErrorCategory::Template => ErrorSeverity::High,
            ErrorCategory::Transport
            | ErrorCategory::Authentication
            | ErrorCategory::Delivery
            | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DigestError::TransportFailure { .. } => {
                "Check that the RT host is reachable and the base URL is correct"
            }
            DigestError::UnexpectedStatus { .. } => {
                "Check the REST path and that the RT server is healthy"
            }
            DigestError::TruncatedResponse { .. } => {
                "The URL does not look like an RT REST endpoint; check service.rest_path"
            }
            DigestError::AuthenticationAmbiguity { .. } => {
                "Check the username and password; RT does not reject bad credentials at login"
            }
            DigestError::ParseAmbiguity { .. } | DigestError::MalformedReference { .. } => {
                "RT returned an unexpected response shape; rerun with --verbose to inspect it"
            }
            DigestError::TemplateMismatch { .. } => {
                "Remove the placeholder from the template or make sure RT returns that field"
            }
            DigestError::MailError { .. } => "Check the SMTP relay and the from/to addresses",
            DigestError::ConfigValidationError { .. }
            | DigestError::InvalidConfigValueError { .. }
            | DigestError::UrlError(_) => "Fix the configuration file or command line flags",
            DigestError::IoError(_) => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Transport => format!("Could not talk to RT: {}", self),
            ErrorCategory::Authentication => format!("RT login problem: {}", self),
            ErrorCategory::Parse => format!("Could not read RT response: {}", self),
            ErrorCategory::Template => format!("Could not render digest: {}", self),
            ErrorCategory::Delivery => format!("Could not send digest: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;

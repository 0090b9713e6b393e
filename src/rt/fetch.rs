use crate::rt::session::Session;
use crate::utils::error::{DigestError, Result};
use url::Url;

/// Status line plus blank separator at the top of every RT response.
pub const HEADER_LINES: usize = 2;

/// Drops the status line and blank separator.
///
/// Returns `None` when fewer than two lines are present, so trimming an
/// already trimmed response only succeeds while it still has two lines.
pub fn trim_header<S: AsRef<str>>(lines: &[S]) -> Option<&[S]> {
    lines.get(HEADER_LINES..)
}

/// `RT/<version> <code> <message>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStatus {
    pub version: String,
    pub code: u16,
    pub message: String,
}

impl ResponseStatus {
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.trim().splitn(3, ' ');
        let version = parts.next()?.strip_prefix("RT/")?;
        let code = parts.next()?.parse().ok()?;
        let message = parts.next().unwrap_or_default();
        Some(Self {
            version: version.to_string(),
            code,
            message: message.to_string(),
        })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.code, 401 | 403)
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// A response body split into lines, header removed, blank lines kept.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status_line: String,
    pub lines: Vec<String>,
}

impl RawResponse {
    pub fn from_body(url: &str, body: &str) -> Result<Self> {
        let all: Vec<&str> = body.lines().collect();
        let lines = trim_header(&all).ok_or_else(|| DigestError::TruncatedResponse {
            url: url.to_string(),
            lines: all.len(),
        })?;

        Ok(Self {
            status_line: all[0].to_string(),
            lines: lines.iter().map(|line| line.to_string()).collect(),
        })
    }

    pub fn status(&self) -> Option<ResponseStatus> {
        ResponseStatus::parse(&self.status_line)
    }
}

/// GETs `url` through the session and returns the trimmed lines.
///
/// Network errors, non-2xx HTTP answers and RT error status lines all fail
/// the call. An empty body or a 401/403 status line is reported as
/// [`DigestError::AuthenticationAmbiguity`], since that is how RT reacts to a
/// session whose login silently failed.
pub async fn fetch(session: &Session, url: &Url, operation: &str) -> Result<Vec<String>> {
    tracing::debug!("GET {}", url);

    let transport = |source| DigestError::TransportFailure {
        operation: operation.to_string(),
        url: url.to_string(),
        source,
    };

    let response = session
        .client()
        .get(url.clone())
        .send()
        .await
        .map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(DigestError::UnexpectedStatus {
            operation: operation.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(transport)?;
    if body.trim().is_empty() {
        return Err(DigestError::AuthenticationAmbiguity {
            url: url.to_string(),
            status_line: String::new(),
        });
    }

    let raw = RawResponse::from_body(url.as_str(), &body)?;
    match raw.status() {
        Some(rt_status) if rt_status.is_unauthorized() => {
            return Err(DigestError::AuthenticationAmbiguity {
                url: url.to_string(),
                status_line: raw.status_line,
            });
        }
        Some(rt_status) if !rt_status.is_ok() => {
            return Err(DigestError::UnexpectedStatus {
                operation: operation.to_string(),
                url: url.to_string(),
                status: rt_status.code,
            });
        }
        Some(_) => {}
        None => tracing::warn!(
            "Unrecognised status line from {}: {:?}",
            url,
            raw.status_line
        ),
    }

    tracing::debug!("{} line(s) after header from {}", raw.lines.len(), url);
    Ok(raw.lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::service::ServiceConfig;
    use httpmock::prelude::*;
    use secrecy::SecretString;

    #[test]
    fn test_trim_header_removes_exactly_two_lines() {
        let lines = ["RT/3.8.7 200 Ok", "", "id: ticket/1", "", "Queue: general"];
        assert_eq!(
            trim_header(&lines).unwrap(),
            &["id: ticket/1", "", "Queue: general"]
        );
    }

    #[test]
    fn test_trim_header_on_short_input() {
        let exact = ["RT/3.8.7 200 Ok", ""];
        assert!(trim_header(&exact).unwrap().is_empty());

        let short = ["RT/3.8.7 200 Ok"];
        assert!(trim_header(&short).is_none());

        let empty: [&str; 0] = [];
        assert!(trim_header(&empty).is_none());
    }

    #[test]
    fn test_trim_header_twice() {
        let lines = ["RT/3.8.7 200 Ok", "", "a: 1", "b: 2", "c: 3"];
        let once = trim_header(&lines).unwrap();
        assert_eq!(trim_header(once).unwrap(), &["c: 3"]);

        let small = ["RT/3.8.7 200 Ok", "", "a: 1"];
        assert!(trim_header(trim_header(&small).unwrap()).is_none());
    }

    #[test]
    fn test_response_status_parse() {
        let status = ResponseStatus::parse("RT/3.8.7 200 Ok").unwrap();
        assert_eq!(status.version, "3.8.7");
        assert_eq!(status.code, 200);
        assert_eq!(status.message, "Ok");
        assert!(status.is_ok());

        let denied = ResponseStatus::parse("RT/4.4.3 401 Credentials required").unwrap();
        assert!(denied.is_unauthorized());
        assert_eq!(denied.message, "Credentials required");

        assert!(ResponseStatus::parse("<html>").is_none());
    }

    #[test]
    fn test_raw_response_keeps_blank_lines() {
        let raw = RawResponse::from_body(
            "http://rt/show",
            "RT/3.8.7 200 Ok\n\nid: ticket/5\n\nSubject: x\r\n",
        )
        .unwrap();
        assert_eq!(raw.status_line, "RT/3.8.7 200 Ok");
        assert_eq!(raw.lines, vec!["id: ticket/5", "", "Subject: x"]);
    }

    #[test]
    fn test_raw_response_truncated() {
        let err = RawResponse::from_body("http://rt/show", "RT/3.8.7 200 Ok").unwrap_err();
        assert!(matches!(err, DigestError::TruncatedResponse { lines: 1, .. }));
    }

    async fn session_for(server: &MockServer) -> Session {
        server.mock(|when, then| {
            when.method(POST).path("/");
            then.status(200);
        });
        Session::authenticate(
            "maxp",
            &SecretString::from("pw"),
            &ServiceConfig::with_base_url(server.url("/")),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_trimmed_lines() {
        let server = MockServer::start();
        let session = session_for(&server).await;
        let show = server.mock(|when, then| {
            when.method(GET).path("/REST/1.0/ticket/9/show");
            then.status(200)
                .body("RT/3.8.7 200 Ok\n\nid: ticket/9\nSubject: Reboot\n");
        });

        let url = Url::parse(&server.url("/REST/1.0/ticket/9/show")).unwrap();
        let lines = fetch(&session, &url, "showing ticket").await.unwrap();

        show.assert();
        assert_eq!(lines, vec!["id: ticket/9", "Subject: Reboot"]);
    }

    #[tokio::test]
    async fn test_fetch_unauthorized_status_line() {
        let server = MockServer::start();
        let session = session_for(&server).await;
        server.mock(|when, then| {
            when.method(GET).path("/REST/1.0/search/ticket");
            then.status(200)
                .body("RT/3.8.7 401 Credentials required\n\n");
        });

        let url = Url::parse(&server.url("/REST/1.0/search/ticket")).unwrap();
        let err = fetch(&session, &url, "searching").await.unwrap_err();

        match err {
            DigestError::AuthenticationAmbiguity { status_line, .. } => {
                assert_eq!(status_line, "RT/3.8.7 401 Credentials required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_empty_body_is_authentication_ambiguity() {
        let server = MockServer::start();
        let session = session_for(&server).await;
        server.mock(|when, then| {
            when.method(GET).path("/REST/1.0/search/ticket");
            then.status(200).body("");
        });

        let url = Url::parse(&server.url("/REST/1.0/search/ticket")).unwrap();
        let err = fetch(&session, &url, "searching").await.unwrap_err();
        assert!(matches!(err, DigestError::AuthenticationAmbiguity { .. }));
    }

    #[tokio::test]
    async fn test_fetch_http_error_names_url() {
        let server = MockServer::start();
        let session = session_for(&server).await;
        server.mock(|when, then| {
            when.method(GET).path("/REST/1.0/ticket/3/show");
            then.status(500);
        });

        let url = Url::parse(&server.url("/REST/1.0/ticket/3/show")).unwrap();
        let err = fetch(&session, &url, "showing ticket").await.unwrap_err();

        assert!(matches!(err, DigestError::UnexpectedStatus { status: 500, .. }));
        assert!(err.to_string().contains("/REST/1.0/ticket/3/show"));
    }
}

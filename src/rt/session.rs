use crate::config::service::ServiceConfig;
use crate::utils::error::{DigestError, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

/// An HTTP client holding the cookie RT handed out at login.
///
/// Lives for the whole run and is never invalidated. RT answers a login with
/// bad credentials like a good one, so a `Session` only proves the server was
/// reachable; the first fetch through it is what confirms the credentials.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    service: ServiceConfig,
}

impl Session {
    pub async fn authenticate(
        username: &str,
        password: &SecretString,
        service: &ServiceConfig,
    ) -> Result<Self> {
        let login_url = service.base_url.clone();

        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = service.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| DigestError::TransportFailure {
                operation: "building the HTTP client".to_string(),
                url: login_url.clone(),
                source,
            })?;

        tracing::debug!("Logging in to {} as {}", login_url, username);
        let response = client
            .post(&login_url)
            .form(&[("user", username), ("pass", password.expose_secret())])
            .send()
            .await
            .map_err(|source| DigestError::TransportFailure {
                operation: "logging in".to_string(),
                url: login_url.clone(),
                source,
            })?;

        let status = response.status();
        tracing::debug!("Login response status: {}", status);
        if !status.is_success() {
            return Err(DigestError::UnexpectedStatus {
                operation: "logging in".to_string(),
                url: login_url,
                status: status.as_u16(),
            });
        }

        tracing::info!("Session opened with {}", service.base_url);
        Ok(Self {
            client,
            service: service.clone(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }
}

//! Session-authenticated HTTP access to the vSphere Automation REST API

use std::fmt;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use esxstat_core::EndpointConfig;

use crate::error::{Result, VsphereError};

const SESSION_HEADER: &str = "vmware-api-session-id";

/// Build the API base URL for an endpoint
///
/// A host that already carries a scheme is used as given, otherwise
/// `https://{host}:{port}/` is assumed.
///
/// # Errors
/// Returns an error if the resulting URL does not parse.
pub fn base_url(endpoint: &EndpointConfig) -> Result<Url> {
    let host = endpoint.host.trim();
    if host.starts_with("http://") || host.starts_with("https://") {
        return Ok(Url::parse(host)?);
    }
    Ok(Url::parse(&format!("https://{host}:{}/", endpoint.port))?)
}

/// HTTP client bound to one vSphere session
pub struct RestSession {
    client: Client,
    base_url: Url,
    session_id: Option<String>,
}

// The session id is a bearer credential, keep it out of logs
impl fmt::Debug for RestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestSession")
            .field("base_url", &self.base_url.as_str())
            .field("session_id", &self.session_id.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl RestSession {
    /// Create a session client for an endpoint (does not log in yet)
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(endpoint: &EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!endpoint.verify_ssl)
            .timeout(endpoint.timeout())
            .build()?;
        Ok(Self::with_client(base_url(endpoint)?, client))
    }

    /// Create a session client with a custom `reqwest::Client`
    #[must_use]
    pub fn with_client(base_url: Url, client: Client) -> Self {
        Self {
            client,
            base_url,
            session_id: None,
        }
    }

    /// Whether `login` succeeded and `logout` has not been called
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session_id.is_some()
    }

    /// Build a full URL from a path
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(VsphereError::Url)
    }

    fn require_session(&self) -> Result<&str> {
        self.session_id.as_deref().ok_or(VsphereError::NoSession)
    }

    /// Create a session (`POST /api/session`)
    ///
    /// # Errors
    /// Returns `VsphereError::Auth` for rejected credentials, other variants
    /// for transport or API failures.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let url = self.url("/api/session")?;
        let response = self
            .client
            .post(url)
            .basic_auth(username, Some(password))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        // The token comes back as a bare JSON string
        let session_id: String = response.json().await?;
        self.session_id = Some(session_id);
        debug!("vSphere session created");
        Ok(())
    }

    /// Delete the session (`DELETE /api/session`)
    ///
    /// # Errors
    /// Returns an error if the endpoint rejects the logout.
    pub async fn logout(&mut self) -> Result<()> {
        let Some(session_id) = self.session_id.take() else {
            return Ok(());
        };
        let url = self.url("/api/session")?;
        let response = self
            .client
            .delete(url)
            .header(SESSION_HEADER, session_id)
            .send()
            .await?;
        Self::check_status(response).await?;
        debug!("vSphere session deleted");
        Ok(())
    }

    /// Perform a GET request and deserialize the response
    ///
    /// # Errors
    /// Returns an error if there is no session, the request fails or the
    /// body does not match `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &[]).await
    }

    /// Perform a GET request with query parameters
    ///
    /// # Errors
    /// Returns an error if there is no session, the request fails or the
    /// body does not match `T`.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let session_id = self.require_session()?;
        let mut url = self.url(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let response = self
            .client
            .get(url)
            .header(SESSION_HEADER, session_id)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(VsphereError::Auth(message)),
            StatusCode::NOT_FOUND => Err(VsphereError::NotFound(message)),
            _ => Err(VsphereError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

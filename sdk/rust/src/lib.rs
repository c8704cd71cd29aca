//! Client for the session counter API.
//!
//! Mirrors what the browser UI does: every call carries the session cookie
//! issued by the first response, so one `CounterClient` is one session.

use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use url::Url;

/// Counter as returned by every API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub count: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid API url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {0}")]
    Status(reqwest::StatusCode),
}

pub struct CounterClient {
    client: Client,
    base_url: Url,
}

impl CounterClient {
    /// Create a client with its own cookie store.
    ///
    /// `api_url` is the service root; requests go to `<api_url>/counter`.
    pub fn new(api_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().cookie_store(true).build()?;
        Self::with_client(api_url, client)
    }

    /// Use a caller-built client. It must keep cookies for calls to share a
    /// session.
    pub fn with_client(api_url: &str, client: Client) -> Result<Self, ClientError> {
        let base_url = Url::parse(api_url)?.join("/counter")?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get_count(&self) -> Result<Counter, ClientError> {
        self.call(Method::GET, "").await
    }

    pub async fn increment(&self) -> Result<Counter, ClientError> {
        self.call(Method::PATCH, "up").await
    }

    pub async fn decrement(&self) -> Result<Counter, ClientError> {
        self.call(Method::PATCH, "down").await
    }

    /// Reads go to `<base>/`, writes to `<base>/<path>`.
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(Url::parse(&format!("{}/{}", self.base_url, path))?)
    }

    async fn call(&self, method: Method, path: &str) -> Result<Counter, ClientError> {
        let url = self.endpoint(path)?;

        let response = self.client.request(method, url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        Ok(response.json::<Counter>().await?)
    }
}

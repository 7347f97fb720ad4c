use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Shared HTTP plumbing for the TenderIQ and DMS clients: base URL handling,
/// bearer authentication and uniform error reporting.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Percent-encode a single path segment such as a tender or document id.
pub fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        let mut builder = Client::builder()
            .user_agent(concat!("ceigall-iq/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs));

        if config.accept_invalid_certs {
            tracing::warn!("API client configured to accept invalid certificates (CEIGALL_ACCEPT_INVALID_CERTS=true)");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start an authenticated request. Fails when no token is configured.
    pub(crate) fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    /// Send a request and turn any non-success status into
    /// [`ClientError::Api`], logging the response body.
    pub(crate) async fn send(&self, operation: &str, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("API request to {} failed - Status: {}, Body: {}", operation, status, body);
            return Err(ClientError::Api { operation: operation.to_string(), status: status.as_u16(), body });
        }

        Ok(response)
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        let response = self.send(operation, request).await?;
        Ok(response.json::<T>().await?)
    }

    pub(crate) async fn send_empty(&self, operation: &str, request: RequestBuilder) -> ClientResult<()> {
        self.send(operation, request).await?;
        Ok(())
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, operation: &str, path: &str) -> ClientResult<T> {
        let request = self.request(Method::GET, path)?;
        self.send_json(operation, request).await
    }
}

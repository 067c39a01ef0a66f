//! Per-subsystem API client: base URL, static headers, auth and timeout on
//! top of a shared [`HttpClient`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::OnapError;
use crate::http_client::{HttpAuth, HttpClient, HttpMethod, HttpRequest, HttpResponse};

#[derive(Clone)]
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    auth: HttpAuth,
    headers: BTreeMap<String, String>,
    timeout_ms: u64,
    transaction_header: Option<&'static str>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("headers", &self.headers)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ApiClient {
    /// JSON client rooted at `base_url`.
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let mut headers = BTreeMap::new();
        headers.insert(String::from("accept"), String::from("application/json"));
        headers.insert(String::from("content-type"), String::from("application/json"));
        Self {
            http,
            base_url,
            auth: HttpAuth::None,
            headers,
            timeout_ms: 30_000,
            transaction_header: None,
        }
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Send a fresh UUID under `name` with every request.
    pub fn with_transaction_header(mut self, name: &'static str) -> Self {
        self.transaction_header = Some(name);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Request for `path` carrying this client's headers, auth and timeout.
    pub fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let mut request = HttpRequest::new(method, self.url(path))
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);
        for (name, value) in &self.headers {
            request = request.with_header(name.as_str(), value.as_str());
        }
        if let Some(name) = self.transaction_header {
            request = request.with_header(name, uuid::Uuid::new_v4().to_string());
        }
        request
    }

    /// Execute `request`; any non-2xx status is an error.
    pub async fn send(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> Result<HttpResponse, OnapError> {
        let response = self.execute(operation, request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(OnapError::Status {
                operation,
                status: response.status,
                body: response.body,
            })
        }
    }

    /// Execute `request`, mapping 404 to `None`.
    pub async fn send_optional(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> Result<Option<HttpResponse>, OnapError> {
        let response = self.execute(operation, request).await?;
        if response.is_not_found() {
            return Ok(None);
        }
        if response.is_success() {
            Ok(Some(response))
        } else {
            Err(OnapError::Status {
                operation,
                status: response.status,
                body: response.body,
            })
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<T, OnapError> {
        let response = self
            .send(operation, self.request(HttpMethod::Get, path))
            .await?;
        parse_json(operation, &response.body)
    }

    pub async fn get_json_optional<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<Option<T>, OnapError> {
        match self
            .send_optional(operation, self.request(HttpMethod::Get, path))
            .await?
        {
            Some(response) => parse_json(operation, &response.body).map(Some),
            None => Ok(None),
        }
    }

    /// Send `body` as JSON and return the raw response.
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpResponse, OnapError> {
        let request = self
            .request(method, path)
            .with_body(json_body(operation, body)?);
        self.send(operation, request).await
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> Result<HttpResponse, OnapError> {
        debug!(operation, method = %request.method, url = %request.url, "sending request");
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| OnapError::Api { operation, source })?;
        debug!(operation, status = response.status, "received response");
        Ok(response)
    }
}

pub fn parse_json<T: DeserializeOwned>(operation: &'static str, body: &str) -> Result<T, OnapError> {
    serde_json::from_str(body).map_err(|source| OnapError::Payload { operation, source })
}

pub fn json_body<B: Serialize + ?Sized>(
    operation: &'static str,
    body: &B,
) -> Result<String, OnapError> {
    serde_json::to_string(body).map_err(|source| OnapError::Payload { operation, source })
}

//! HTTP transport used for registry and provider requests.
//!
//! [`HttpTransport`] is the seam between the router and the network. The
//! default [`CurlTransport`] drives a curl handle on a blocking worker.

use crate::error::{Result, RouterError};
use crate::utils::duration_ms;
use async_trait::async_trait;
use curl::easy::{Easy2, Handler, WriteError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// HTTP request methods used by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    /// Returns the method as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound request
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Deadline for the whole transfer
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            ..Default::default()
        }
    }

    /// POST with a JSON body and matching `Content-Type`
    pub fn post_json<T: Serialize + ?Sized>(url: impl Into<String>, body: &T) -> Result<Self> {
        Ok(Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: Some(serde_json::to_vec(body)?),
            timeout: None,
        })
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get a header value by name (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status_code: u32,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Check if this response indicates payment is required (HTTP 402).
    pub fn is_payment_required(&self) -> bool {
        self.status_code == 402
    }

    /// Get a header value by name (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests on behalf of the discovery client and the router.
///
/// Implementations must honour [`HttpRequest::timeout`] when present and
/// report an expired deadline as [`RouterError::Timeout`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

struct ResponseHandler {
    data: Vec<u8>,
    headers: HashMap<String, String>,
}

impl ResponseHandler {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            headers: HashMap::new(),
        }
    }
}

impl Handler for ResponseHandler {
    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, WriteError> {
        self.data.extend_from_slice(data);
        Ok(data.len())
    }

    fn header(&mut self, header: &[u8]) -> bool {
        if let Ok(header_str) = std::str::from_utf8(header) {
            if let Some((key, value)) = header_str.split_once(':') {
                self.headers
                    .insert(key.trim().to_lowercase(), value.trim().to_string());
            }
        }
        true
    }
}

/// Builder for configuring curl-backed HTTP clients.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transfer deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    pub fn headers(mut self, headers: &[(String, String)]) -> Self {
        self.headers.extend_from_slice(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut client = HttpClient::new();

        if let Some(timeout) = self.timeout {
            client.curl.timeout(timeout)?;
        }

        if let Some(ref ua) = self.user_agent {
            client.curl.useragent(ua)?;
        }

        if !self.headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (name, value) in &self.headers {
                list.append(&format!("{name}: {value}"))?;
            }
            client.curl.http_headers(list)?;
        }

        Ok(client)
    }
}

pub struct HttpClient {
    curl: Easy2<ResponseHandler>,
}

impl HttpClient {
    fn new() -> Self {
        Self {
            curl: Easy2::new(ResponseHandler::new()),
        }
    }

    /// Perform a request with the specified method and optional body.
    pub fn request(
        &mut self,
        method: HttpMethod,
        url: &str,
        body: Option<&[u8]>,
    ) -> Result<HttpResponse> {
        self.curl.url(url)?;

        match method {
            HttpMethod::Get => {
                self.curl.get(true)?;
            }
            HttpMethod::Post => {
                self.curl.post(true)?;
                let data = body.unwrap_or_default();
                self.curl.post_field_size(data.len() as u64)?;
                self.curl.post_fields_copy(data)?;
            }
        }

        self.perform()
    }

    fn perform(&mut self) -> Result<HttpResponse> {
        self.curl.perform()?;

        let status_code = self.curl.response_code()?;
        let handler = self.curl.get_mut();

        Ok(HttpResponse {
            status_code,
            headers: std::mem::take(&mut handler.headers),
            body: std::mem::take(&mut handler.data),
        })
    }
}

/// Default transport backed by curl.
///
/// Each request runs on tokio's blocking pool. Curl's own timeout is set to
/// the request deadline, so an abandoned transfer stops at the deadline
/// instead of running on in the background.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    user_agent: Option<String>,
}

impl CurlTransport {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }
}

#[async_trait]
impl HttpTransport for CurlTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = HttpClientBuilder::new().headers(&headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(ref ua) = self.user_agent {
            builder = builder.user_agent(ua);
        }

        let result = tokio::task::spawn_blocking(move || {
            let mut client = builder.build()?;
            client.request(method, &url, body.as_deref())
        })
        .await
        .map_err(|e| RouterError::Http(format!("HTTP worker failed: {e}")))?;

        match result {
            Err(RouterError::Curl(e)) if e.is_operation_timedout() => Err(RouterError::Timeout {
                timeout_ms: timeout.map(duration_ms).unwrap_or_default(),
            }),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
    }

    #[test]
    fn test_post_json_sets_content_type_and_body() {
        let request =
            HttpRequest::post_json("https://r.io/discover", &serde_json::json!({"api": "x"}))
                .unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.get_header("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(br#"{"api":"x"}"#.as_slice()));
    }

    #[test]
    fn test_request_header_lookup_is_case_insensitive() {
        let request = HttpRequest::get("https://p.io").header("X-Payment", "sig");
        assert_eq!(request.get_header("x-payment"), Some("sig"));
        assert_eq!(request.get_header("X-Missing"), None);
    }

    #[test]
    fn test_response_status_helpers() {
        let ok = HttpResponse {
            status_code: 204,
            ..Default::default()
        };
        let paywall = HttpResponse {
            status_code: 402,
            ..Default::default()
        };
        assert!(ok.is_success());
        assert!(!paywall.is_success());
        assert!(paywall.is_payment_required());
    }

    #[test]
    fn test_response_json_and_headers() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        let response = HttpResponse {
            status_code: 200,
            headers,
            body: br#"{"data":{"ok":true}}"#.to_vec(),
        };
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["data"]["ok"], true);
        assert_eq!(
            response.get_header("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_client_builder_builds() {
        let client = HttpClientBuilder::new()
            .timeout(Duration::from_millis(250))
            .user_agent("x402-router-test")
            .headers(&[("X-Custom".to_string(), "value".to_string())])
            .build();
        assert!(client.is_ok());
    }
}

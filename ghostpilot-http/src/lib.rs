//! Stateless request dispatcher for the tweets API.
//!
//! - `get` attaches a body (default `"Test"`) and sends no headers
//! - `post` declares `Content-Type: application/json` and sends the bytes untouched
//! - No retries, no timeout override, no pooled client: each call builds a
//!   fresh transport client and drops it once the response body is read
//! - Optional *raw* request/response logging via `GHOSTPILOT_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```no_run
//! # async fn demo() -> Result<(), ghostpilot_http::DispatchError> {
//! let resp = ghostpilot_http::post(None, Some(br#"{"id":"1"}"#.as_slice().into())).await?;
//! println!("{resp}");
//! let resp = ghostpilot_http::get(None, None).await?;
//! println!("{resp}");
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated) and transport failures, plus
//! raw curl-style lines (target `http.raw`) when `GHOSTPILOT_HTTP_RAW=1`.

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Body, Client, Method, Request, StatusCode, Url};
use std::borrow::Cow;
use std::env;
use std::fmt;
use thiserror::Error;

/// Endpoint used by [`get`] when none is given.
pub const DEFAULT_GET_ENDPOINT: &str = "http://0.0.0.0:8080/tweets/emojis";
/// Endpoint used by [`post`] when none is given.
pub const DEFAULT_POST_ENDPOINT: &str = "http://0.0.0.0:8080/tweets/create";
/// Body used by both operations when none is given.
pub const DEFAULT_PAYLOAD: &str = "Test";

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "GHOSTPILOT_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in headers.iter() {
        let v = val.to_str().unwrap_or("");
        parts.push(format!(
            "-H '{}: {}'",
            name.as_str(),
            v.replace('\'', r"'\''")
        ));
    }
    if let Some(bytes) = body {
        if let Ok(s) = std::str::from_utf8(bytes) {
            let mut s = s.to_string();
            if s.len() > RAW_MAX_BODY {
                truncate_on_char_boundary(&mut s, RAW_MAX_BODY);
                s.push('…');
            }
            parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
        } else {
            parts.push(format!("--data-binary @- # ({} bytes)", bytes.len()));
        }
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("client build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
}

// ==============================
// Defaults
// ==============================

/// The endpoints and body a [`Dispatcher`] falls back to when a call omits them.
///
/// ```
/// use ghostpilot_http::DispatchDefaults;
///
/// let defaults = DispatchDefaults::default();
/// assert_eq!(defaults.get_endpoint, "http://0.0.0.0:8080/tweets/emojis");
/// assert_eq!(defaults.post_endpoint, "http://0.0.0.0:8080/tweets/create");
/// assert_eq!(&defaults.get_payload[..], b"Test");
/// assert_eq!(&defaults.post_payload[..], b"Test");
/// ```
#[derive(Clone, Debug)]
pub struct DispatchDefaults {
    pub get_endpoint: String,
    pub post_endpoint: String,
    pub get_payload: Bytes,
    pub post_payload: Bytes,
}

impl Default for DispatchDefaults {
    fn default() -> Self {
        Self {
            get_endpoint: DEFAULT_GET_ENDPOINT.to_string(),
            post_endpoint: DEFAULT_POST_ENDPOINT.to_string(),
            get_payload: Bytes::from_static(DEFAULT_PAYLOAD.as_bytes()),
            post_payload: Bytes::from_static(DEFAULT_PAYLOAD.as_bytes()),
        }
    }
}

// ==============================
// Response
// ==============================

/// A fully read response, kept raw for the caller to inspect.
#[derive(Clone, Debug)]
pub struct DispatchResponse {
    method: Method,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl DispatchResponse {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Final URL, after any redirects the transport followed.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl fmt::Display for DispatchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Response [{}]>", self.status.as_u16())
    }
}

// ==============================
// Dispatcher
// ==============================

/// Builds and sends single requests. Holds nothing but its defaults.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    defaults: DispatchDefaults,
}

impl Dispatcher {
    pub fn new(defaults: DispatchDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &DispatchDefaults {
        &self.defaults
    }

    /// Build the GET request: no headers, body attached unconditionally.
    ///
    /// ```
    /// use ghostpilot_http::Dispatcher;
    ///
    /// let req = Dispatcher::default().build_get(None, None).unwrap();
    /// assert_eq!(req.method().as_str(), "GET");
    /// assert!(req.headers().is_empty());
    /// assert_eq!(req.body().and_then(|b| b.as_bytes()), Some(&b"Test"[..]));
    /// ```
    pub fn build_get(
        &self,
        endpoint: Option<&str>,
        payload: Option<Bytes>,
    ) -> Result<Request, DispatchError> {
        let endpoint = endpoint.unwrap_or(self.defaults.get_endpoint.as_str());
        let payload = payload.unwrap_or_else(|| self.defaults.get_payload.clone());
        build_request(Method::GET, endpoint, HeaderMap::new(), payload)
    }

    /// Build the POST request: a single JSON content-type header and the body as given.
    pub fn build_post(
        &self,
        endpoint: Option<&str>,
        payload: Option<Bytes>,
    ) -> Result<Request, DispatchError> {
        let endpoint = endpoint.unwrap_or(self.defaults.post_endpoint.as_str());
        let payload = payload.unwrap_or_else(|| self.defaults.post_payload.clone());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        build_request(Method::POST, endpoint, headers, payload)
    }

    pub async fn get(
        &self,
        endpoint: Option<&str>,
        payload: Option<Bytes>,
    ) -> Result<DispatchResponse, DispatchError> {
        let request = self.build_get(endpoint, payload)?;
        send(request).await
    }

    pub async fn post(
        &self,
        endpoint: Option<&str>,
        payload: Option<Bytes>,
    ) -> Result<DispatchResponse, DispatchError> {
        let request = self.build_post(endpoint, payload)?;
        send(request).await
    }
}

/// GET `endpoint` (default [`DEFAULT_GET_ENDPOINT`]) with `payload` (default `"Test"`).
pub async fn get(
    endpoint: Option<&str>,
    payload: Option<Bytes>,
) -> Result<DispatchResponse, DispatchError> {
    Dispatcher::default().get(endpoint, payload).await
}

/// POST `payload` (default `"Test"`) as JSON to `endpoint` (default [`DEFAULT_POST_ENDPOINT`]).
pub async fn post(
    endpoint: Option<&str>,
    payload: Option<Bytes>,
) -> Result<DispatchResponse, DispatchError> {
    Dispatcher::default().post(endpoint, payload).await
}

// ==============================
// Core request implementation
// ==============================

fn build_request(
    method: Method,
    endpoint: &str,
    headers: HeaderMap,
    payload: Bytes,
) -> Result<Request, DispatchError> {
    let url = Url::parse(endpoint).map_err(|e| DispatchError::Url(format!("{endpoint}: {e}")))?;
    let mut request = Request::new(method, url);
    *request.headers_mut() = headers;
    *request.body_mut() = Some(Body::from(payload));
    Ok(request)
}

async fn send(request: Request) -> Result<DispatchResponse, DispatchError> {
    // One client per call; it is dropped with this future.
    let client = Client::builder()
        .build()
        .map_err(|e| DispatchError::Build(e.to_string()))?;

    let method = request.method().clone();
    let url = request.url().clone();
    let body_len = request
        .body()
        .and_then(|b| b.as_bytes())
        .map_or(0, <[u8]>::len);

    // Lightweight request id without extra deps
    let req_id = format!(
        "r{:x}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    );

    tracing::debug!(
        req_id=%req_id,
        method=%method,
        host_path=%host_path(&url),
        headers=request.headers().len(),
        body_len,
        "http.request.start"
    );

    if raw_enabled() {
        let curl = make_curl(
            &method,
            &url,
            request.headers(),
            request.body().and_then(|b| b.as_bytes()),
        );
        tracing::debug!(target: "http.raw", %req_id, %curl, "request");
    }

    // ----- Send -----
    let t0 = std::time::Instant::now();
    let resp = client.execute(request).await.map_err(|err| {
        let message = err.to_string();
        tracing::warn!(req_id=%req_id, message=%message, "http.network_error.send");
        DispatchError::Network(message)
    })?;
    let status = resp.status();
    let headers = resp.headers().clone();
    let final_url = resp.url().clone();
    let body = resp.bytes().await.map_err(|err| {
        let message = err.to_string();
        tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
        DispatchError::Network(message)
    })?;
    let dur_ms = t0.elapsed().as_millis() as u64;

    let req_hdr_id = headers
        .get("x-request-id")
        .or_else(|| headers.get("x-correlation-id"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::debug!(
        req_id=%req_id,
        %status,
        duration_ms=dur_ms,
        body_len=body.len(),
        x_request_id=%req_hdr_id,
        "http.response.headers"
    );

    if raw_enabled() {
        let hdrs: Vec<(String, String)> = headers
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let truncated = body.len() > RAW_MAX_BODY;
        let text = String::from_utf8_lossy(&body[..body.len().min(RAW_MAX_BODY)]);
        tracing::info!(
            target:"http.raw",
            %req_id,
            status=%status,
            duration_ms=dur_ms,
            headers=?hdrs,
            body=%text,
            truncated
        );
    }

    tracing::trace!(
        req_id=%req_id,
        body_snippet=%snip_body(&body),
        "http.response.body_snippet"
    );

    // Non-success statuses are handed back as-is.
    if !status.is_success() {
        tracing::warn!(req_id=%req_id, %status, x_request_id=%req_hdr_id, "http.response.non_success");
    }

    Ok(DispatchResponse {
        method,
        url: final_url,
        status,
        headers,
        body,
    })
}

// ==============================
// Helpers
// ==============================

fn host_path(url: &Url) -> String {
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    format!("{}{}{}", url.host_str().unwrap_or("-"), port, url.path())
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        truncate_on_char_boundary(&mut snip, 500);
        snip.push_str("...");
    }
    snip
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    let mut cut = max.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

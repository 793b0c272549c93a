//! Small JSON-over-HTTP client shared by every upstream integration.
//!
//! - Per-request options: headers, query params, auth, timeout, retries
//! - Retries 429/5xx with exponential backoff and `Retry-After` support
//! - Secret query parameters are redacted before any value hits the logs
//!
//! All four upstream APIs we talk to (generative model, news search, web
//! search, video metadata) authenticate with an API key in a query
//! parameter, so [`Auth`] covers query and header styles only.
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), truthsense_http::HttpError> {
//! let client = truthsense_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", truthsense_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// Status code of an API error, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Authentication strategies supported by the client.
///
/// ```
/// use truthsense_http::Auth;
/// use std::borrow::Cow;
///
/// let auth = Auth::Query { name: "access_key", value: Cow::Borrowed("demo") };
/// match auth {
///     Auth::Query { name, .. } => assert_eq!(name, "access_key"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Custom header auth (e.g. `X-Api-Key: ...`).
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    /// API key passed as a query parameter.
    Query { name: &'a str, value: Cow<'a, str> },
    None,
}

/// Per-request tuning knobs.
///
/// ```
/// use truthsense_http::{Auth, RequestOpts};
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retries: Some(0),
///     auth: Some(Auth::Query { name: "api_key", value: Cow::Borrowed("demo") }),
///     ..Default::default()
/// };
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

/// JSON client anchored to a base URL.
#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use truthsense_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 2);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 2,
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// GET JSON with per-request options.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json::<(), T>(Method::GET, path, None, opts)
            .await
    }

    /// POST JSON with per-request options.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, Some(body), opts)
            .await
    }

    async fn request_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        mut opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        // Fold query-style auth into the query list once so retries reuse it.
        if let Some(Auth::Query { name, value }) = &opts.auth {
            opts.query
                .get_or_insert_with(Vec::new)
                .push((name, value.clone()));
        }

        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let mut attempt = 0usize;

        loop {
            let rb = self.build_request(&method, &url, body, &opts, timeout)?;

            tracing::debug!(
                attempt = attempt + 1,
                max_retries,
                method = %method,
                host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
                query = ?redact_query(opts.query.as_deref().unwrap_or(&[])),
                timeout_ms = timeout.as_millis() as u64,
                has_body = body.is_some(),
                "http.request.start"
            );

            let t0 = std::time::Instant::now();
            let outcome = Self::execute(rb).await;

            let (status, headers, bytes) = match outcome {
                Ok(parts) => parts,
                Err(message) => {
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff_delay(attempt, false, None);
                        tracing::warn!(
                            attempt,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            message = %message,
                            "http.retrying.network"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(attempt, max_retries, message = %message, "http.network_error");
                    return Err(HttpError::Network(message));
                }
            };

            let request_id = headers
                .get("x-request-id")
                .or_else(|| headers.get("x-correlation-id"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();

            tracing::debug!(
                %status,
                duration_ms = t0.elapsed().as_millis() as u64,
                body_len = bytes.len(),
                x_request_id = %request_id,
                "http.response"
            );

            let snippet = snip_body(&bytes);

            if status.is_success() {
                return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                    tracing::warn!(
                        serde_err = %e,
                        body_snippet = %snippet,
                        "http.response.decode_error"
                    );
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            let message = extract_error_message(&bytes);
            let retryable =
                status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

            if retryable && attempt < max_retries {
                attempt += 1;
                let delay = backoff_delay(
                    attempt,
                    status == StatusCode::TOO_MANY_REQUESTS,
                    retry_after_delay_secs(&headers),
                );
                tracing::warn!(
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms = delay.as_millis() as u64,
                    message = %message,
                    body_snippet = %snippet,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                %status,
                message = %message,
                x_request_id = %request_id,
                body_snippet = %snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id,
            });
        }
    }

    fn build_request<B>(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&B>,
        opts: &RequestOpts<'_>,
        timeout: Duration,
    ) -> Result<reqwest::RequestBuilder, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let mut rb = self.inner.request(method.clone(), url.clone()).timeout(timeout);

        if let Some(q) = &opts.query {
            let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }
        if let Some(b) = body {
            rb = rb.json(b);
        }
        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }
        if let Some(Auth::Header { name, value }) = &opts.auth {
            rb = rb.header(name, value);
        }
        Ok(rb)
    }

    async fn execute(
        rb: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, HeaderMap, Vec<u8>), String> {
        let resp = rb.send().await.map_err(|e| e.to_string())?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|e| e.to_string())?;
        Ok((status, headers, bytes.to_vec()))
    }
}

fn backoff_delay(attempt: usize, rate_limited: bool, retry_after_secs: Option<u64>) -> Duration {
    if let Some(secs) = retry_after_secs {
        return Duration::from_secs(secs);
    }
    let exp = Duration::from_millis(200u64.saturating_mul(1 << (attempt - 1)));
    if rate_limited {
        // floor for 429 when no Retry-After is present
        exp.max(Duration::from_millis(1100))
    } else {
        exp
    }
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        // Back off to a char boundary; truncating mid-codepoint panics.
        let mut cut = 500;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

const SECRET_QUERY_KEYS: &[&str] = &[
    "access_token",
    "access_key",
    "authorization",
    "auth",
    "key",
    "api_key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

fn redact_query(query: &[(&str, Cow<'_, str>)]) -> Vec<(String, String)> {
    query
        .iter()
        .map(|(k, v)| {
            let is_secret = SECRET_QUERY_KEYS.contains(&k.to_ascii_lowercase().as_str());
            (
                (*k).to_string(),
                if is_secret {
                    "<redacted>".to_string()
                } else {
                    v.as_ref().to_string()
                },
            )
        })
        .collect()
}

/// Extract a human-readable error message from a JSON error body.
///
/// Understands the Google envelope `{"error":{"message":"..."}}` and the
/// flat `{"message"|"detail"|"error":"..."}` shapes; falls back to a body
/// snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: EnvelopeDetail,
    }
    #[derive(Deserialize)]
    struct EnvelopeDetail {
        message: String,
    }
    #[derive(Deserialize)]
    struct Flat {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<Envelope>(body) {
        return env.error.message;
    }
    if let Ok(flat) = serde_json::from_slice::<Flat>(body) {
        for m in [flat.message, flat.detail, flat.error] {
            if !m.is_empty() {
                return m;
            }
        }
    }
    snip_body(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_secret_query_params() {
        let q: Vec<(&str, Cow<'_, str>)> = vec![
            ("q", Cow::Borrowed("flat earth")),
            ("access_key", Cow::Borrowed("s3cret")),
            ("API_KEY", Cow::Borrowed("s3cret")),
        ];
        let redacted = redact_query(&q);
        assert_eq!(redacted[0].1, "flat earth");
        assert_eq!(redacted[1].1, "<redacted>");
        assert_eq!(redacted[2].1, "<redacted>");
    }

    #[test]
    fn extracts_envelope_and_flat_messages() {
        let env = br#"{"error":{"message":"quota exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(extract_error_message(env), "quota exhausted");

        let flat = br#"{"detail":"missing access key"}"#;
        assert_eq!(extract_error_message(flat), "missing access key");

        let garbage = b"<html>nope</html>";
        assert_eq!(extract_error_message(garbage), "<html>nope</html>");
    }

    #[test]
    fn backoff_grows_and_respects_rate_limit_floor() {
        assert_eq!(backoff_delay(1, false, None), Duration::from_millis(200));
        assert_eq!(backoff_delay(2, false, None), Duration::from_millis(400));
        assert_eq!(backoff_delay(1, true, None), Duration::from_millis(1100));
        assert_eq!(backoff_delay(1, true, Some(3)), Duration::from_secs(3));
    }

    #[test]
    fn long_bodies_are_snipped() {
        let body = "x".repeat(700);
        let snip = snip_body(body.as_bytes());
        assert_eq!(snip.len(), 503);
        assert!(snip.ends_with("..."));
    }

    #[test]
    fn snippet_cut_lands_on_a_char_boundary() {
        // Byte 500 falls inside the first two-byte "é".
        let body = format!("{}ééé", "a".repeat(499));
        let snip = snip_body(body.as_bytes());
        assert_eq!(snip, format!("{}...", "a".repeat(499)));

        // Boundary exactly between codepoints keeps the whole char.
        let body = format!("{}éé", "a".repeat(498));
        let snip = snip_body(body.as_bytes());
        assert_eq!(snip, format!("{}é...", "a".repeat(498)));
    }
}

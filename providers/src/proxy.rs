//! Proxy-fetch contract and the production HTTP implementation.
//!
//! The host application fronts all outbound requests (the editor proxies them
//! server-side), so resolvers speak to a [`ProxyFetch`] trait object instead
//! of an HTTP client. The contract is non-throwing: the implementation must
//! enforce the timeout and map every transport failure to `None`, which keeps
//! the resolvers free of error plumbing.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use std::time::Duration;

use crate::{DEFAULT_TIMEOUT_MS, DESKTOP_USER_AGENT};

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Boxed future returned by [`ProxyFetch::fetch`].
pub type ProxyFut<'a> = Pin<Box<dyn Future<Output = Option<ProxyResponse>> + Send + 'a>>;

/// One proxied request.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub url: String,
    pub method: String,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
    pub timeout_ms: u64,
    /// Content negotiation hint; the body is still returned verbatim.
    pub accept: String,
}

impl ProxyRequest {
    /// A page-style GET with the fixed desktop User-Agent and default timeout.
    pub fn page(url: impl Into<String>) -> Self {
        Self::page_with(url, &FetchOptions::default())
    }

    /// A page-style GET with caller-supplied network knobs.
    pub fn page_with(url: impl Into<String>, options: &FetchOptions) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            body: None,
            headers: vec![("User-Agent".to_string(), options.user_agent.clone())],
            timeout_ms: options.timeout_ms,
            accept: "text/html".to_string(),
        }
    }
}

/// Result of a proxied request. A non-`None` response may still carry a
/// non-200 status; callers decide what that means for them.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: u16,
    /// Header values grouped by name, as the host proxy reports them.
    pub headers: HashMap<String, Vec<String>>,
    pub body: String,
}

impl ProxyResponse {
    #[must_use]
    pub fn ok(&self) -> bool {
        self.status == 200
    }
}

/// Network knobs for resolver-issued requests.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: DESKTOP_USER_AGENT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Contract for the host's forwarding fetch.
///
/// Implementations must enforce `timeout_ms` and return `None` (never panic,
/// never error) on transport failure.
pub trait ProxyFetch: Send + Sync {
    fn fetch(&self, request: ProxyRequest) -> ProxyFut<'_>;
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("failed to build HTTP client: {e}; falling back to defaults");
                reqwest::Client::new()
            })
    })
}

/// Production [`ProxyFetch`] backed by a process-wide `reqwest` client.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpProxy;

impl HttpProxy {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn run(request: ProxyRequest) -> Option<ProxyResponse> {
        let method = match reqwest::Method::from_bytes(request.method.as_bytes()) {
            Ok(method) => method,
            Err(_) => {
                tracing::warn!(method = %request.method, "invalid proxy method");
                return None;
            }
        };

        let mut builder = http_client()
            .request(method, &request.url)
            .timeout(Duration::from_millis(request.timeout_ms))
            .header(reqwest::header::ACCEPT, &request.accept);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "proxy fetch failed");
                return None;
            }
        };

        let status = response.status().as_u16();
        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "proxy body read failed");
                return None;
            }
        };

        Some(ProxyResponse {
            status,
            headers,
            body,
        })
    }
}

impl ProxyFetch for HttpProxy {
    fn fetch(&self, request: ProxyRequest) -> ProxyFut<'_> {
        Box::pin(Self::run(request))
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchOptions, ProxyRequest};
    use crate::{DEFAULT_TIMEOUT_MS, DESKTOP_USER_AGENT};

    #[test]
    fn page_request_carries_fixed_identity() {
        let request = ProxyRequest::page("https://example.com");
        assert_eq!(request.method, "GET");
        assert_eq!(request.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(request.accept, "text/html");
        assert_eq!(
            request.headers,
            vec![("User-Agent".to_string(), DESKTOP_USER_AGENT.to_string())]
        );
    }

    #[test]
    fn page_request_honors_options() {
        let options = FetchOptions {
            user_agent: "test-agent".to_string(),
            timeout_ms: 250,
        };
        let request = ProxyRequest::page_with("https://example.com", &options);
        assert_eq!(request.timeout_ms, 250);
        assert_eq!(request.headers[0].1, "test-agent");
    }
}

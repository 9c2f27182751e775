//! oEmbed provider directory and URL-to-endpoint resolution.
//!
//! The public directory is fetched at most once per registry lifetime,
//! lazily, through the proxy contract. A failed or unparseable fetch leaves
//! the cache empty - every resolution in the meantime misses, and the next
//! call retries the fetch. There is no negative caching and no refresh.
//!
//! Matching is strictly ordered: providers in directory order, endpoints in
//! provider order, schemes in endpoint order; the first scheme whose compiled
//! pattern matches wins. Directory order IS the tie-break, first match over
//! best match.

use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::PROVIDER_DIRECTORY_URL;
use crate::proxy::{FetchOptions, ProxyFetch, ProxyRequest};

/// One endpoint of a provider: URL-pattern globs plus the request template.
///
/// The template may contain a `{format}` placeholder; consumers substitute
/// `json` before building the request.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEndpoint {
    #[serde(default)]
    pub schemes: Vec<String>,
    pub url: String,
    #[serde(default)]
    pub discovery: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEntry {
    pub provider_name: String,
    #[serde(default)]
    pub provider_url: String,
    #[serde(default)]
    pub endpoints: Vec<ProviderEndpoint>,
}

/// Parsed provider directory, preserving the published order.
#[derive(Debug, Clone, Default)]
pub struct ProviderDirectory {
    pub providers: Vec<ProviderEntry>,
}

impl From<Vec<ProviderEntry>> for ProviderDirectory {
    fn from(providers: Vec<ProviderEntry>) -> Self {
        Self { providers }
    }
}

impl ProviderDirectory {
    fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<ProviderEntry>>(body).map(Self::from)
    }
}

/// A resolved provider and the endpoint template to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMatch {
    pub provider_name: String,
    pub endpoint: String,
}

#[derive(Debug, Error)]
enum DirectoryError {
    #[error("provider directory fetch failed")]
    Unavailable,
    #[error("provider directory returned status {0}")]
    Status(u16),
    #[error("provider directory body is not parseable: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Lazily populated provider registry.
///
/// The cache is an explicit per-registry object rather than process-global
/// state, so tests inject a preloaded directory via [`Self::preloaded`].
pub struct ProviderRegistry {
    proxy: Arc<dyn ProxyFetch>,
    options: FetchOptions,
    directory_url: String,
    directory: OnceCell<ProviderDirectory>,
}

impl ProviderRegistry {
    pub fn new(proxy: Arc<dyn ProxyFetch>) -> Self {
        Self::with_directory_url(proxy, PROVIDER_DIRECTORY_URL)
    }

    pub fn with_directory_url(proxy: Arc<dyn ProxyFetch>, directory_url: impl Into<String>) -> Self {
        Self {
            proxy,
            options: FetchOptions::default(),
            directory_url: directory_url.into(),
            directory: OnceCell::new(),
        }
    }

    /// A registry whose cache is already populated; no fetch will ever run.
    #[must_use]
    pub fn preloaded(proxy: Arc<dyn ProxyFetch>, directory: ProviderDirectory) -> Self {
        Self {
            proxy,
            options: FetchOptions::default(),
            directory_url: PROVIDER_DIRECTORY_URL.to_string(),
            directory: OnceCell::new_with(Some(directory)),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve `url` to the first matching provider endpoint.
    ///
    /// Returns `None` when no scheme matches or when the directory is
    /// unavailable; never an error, so this is safe to call speculatively.
    pub async fn resolve(&self, url: &str) -> Option<ProviderMatch> {
        let directory = match self
            .directory
            .get_or_try_init(|| self.fetch_directory())
            .await
        {
            Ok(directory) => directory,
            Err(e) => {
                tracing::warn!(error = %e, "provider resolution unavailable");
                return None;
            }
        };

        for provider in &directory.providers {
            for endpoint in &provider.endpoints {
                for scheme in &endpoint.schemes {
                    let Some(pattern) = scheme_pattern(scheme) else {
                        tracing::debug!(%scheme, "skipping unparseable provider scheme");
                        continue;
                    };
                    if pattern.is_match(url) {
                        tracing::debug!(
                            url,
                            provider = %provider.provider_name,
                            "provider resolved"
                        );
                        return Some(ProviderMatch {
                            provider_name: provider.provider_name.clone(),
                            endpoint: endpoint.url.clone(),
                        });
                    }
                }
            }
        }
        None
    }

    async fn fetch_directory(&self) -> Result<ProviderDirectory, DirectoryError> {
        let request = ProxyRequest::page_with(&self.directory_url, &self.options);
        let response = self
            .proxy
            .fetch(request)
            .await
            .ok_or(DirectoryError::Unavailable)?;
        if !response.ok() {
            return Err(DirectoryError::Status(response.status));
        }
        let directory = ProviderDirectory::parse(&response.body)?;
        tracing::debug!(
            providers = directory.providers.len(),
            "provider directory loaded"
        );
        Ok(directory)
    }
}

/// Compile one directory scheme glob: `*` captures `.*`, everything else is
/// literal.
fn scheme_pattern(scheme: &str) -> Option<Regex> {
    let escaped = regex::escape(scheme).replace("\\*", "(.*)");
    Regex::new(&escaped).ok()
}

#[cfg(test)]
mod tests {
    use super::{ProviderDirectory, ProviderEndpoint, ProviderEntry, ProviderRegistry, scheme_pattern};
    use crate::proxy::{ProxyFetch, ProxyFut, ProxyRequest};
    use std::sync::Arc;

    struct DeadProxy;

    impl ProxyFetch for DeadProxy {
        fn fetch(&self, _request: ProxyRequest) -> ProxyFut<'_> {
            Box::pin(async { None })
        }
    }

    fn entry(name: &str, schemes: &[&str], endpoint: &str) -> ProviderEntry {
        ProviderEntry {
            provider_name: name.to_string(),
            provider_url: String::new(),
            endpoints: vec![ProviderEndpoint {
                schemes: schemes.iter().map(ToString::to_string).collect(),
                url: endpoint.to_string(),
                discovery: false,
            }],
        }
    }

    #[test]
    fn scheme_glob_wildcards_match_and_literals_stay_literal() {
        let pattern = scheme_pattern("https://www.youtube.com/watch*").unwrap();
        assert!(pattern.is_match("https://www.youtube.com/watch?v=abc"));

        // A dot in the scheme must not act as a regex wildcard.
        let pattern = scheme_pattern("https://x.com/*/status/*").unwrap();
        assert!(pattern.is_match("https://x.com/someone/status/123"));
        assert!(!pattern.is_match("https://xycom/someone/status/123"));
    }

    #[tokio::test]
    async fn resolve_is_first_match_in_directory_order() {
        let directory = ProviderDirectory::from(vec![
            entry("First", &["https://shared.example/*"], "https://first.example/oembed"),
            entry("Second", &["https://shared.example/*"], "https://second.example/oembed"),
        ]);
        let registry = ProviderRegistry::preloaded(Arc::new(DeadProxy), directory);

        for _ in 0..3 {
            let matched = registry
                .resolve("https://shared.example/video/1")
                .await
                .unwrap();
            assert_eq!(matched.provider_name, "First");
            assert_eq!(matched.endpoint, "https://first.example/oembed");
        }
    }

    #[tokio::test]
    async fn resolve_misses_without_a_matching_scheme() {
        let directory = ProviderDirectory::from(vec![entry(
            "Only",
            &["https://only.example/*"],
            "https://only.example/oembed",
        )]);
        let registry = ProviderRegistry::preloaded(Arc::new(DeadProxy), directory);
        assert!(registry.resolve("https://other.example/a").await.is_none());
    }

    #[tokio::test]
    async fn unavailable_directory_resolves_to_none_without_panic() {
        let registry = ProviderRegistry::new(Arc::new(DeadProxy));
        assert!(registry.resolve("https://x.com/a/status/1").await.is_none());
        // Still none on a later call; the fetch is retried, not negatively cached.
        assert!(registry.resolve("https://x.com/a/status/1").await.is_none());
    }

    #[test]
    fn directory_parses_published_json_shape() {
        let body = r#"[
            {
                "provider_name": "YouTube",
                "provider_url": "https://www.youtube.com/",
                "endpoints": [
                    {
                        "schemes": ["https://*.youtube.com/watch*"],
                        "url": "https://www.youtube.com/oembed",
                        "discovery": true
                    }
                ]
            }
        ]"#;
        let directory = ProviderDirectory::parse(body).unwrap();
        assert_eq!(directory.providers.len(), 1);
        assert_eq!(directory.providers[0].provider_name, "YouTube");
        assert!(directory.providers[0].endpoints[0].discovery);
    }
}

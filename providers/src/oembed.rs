//! oEmbed endpoint requests and embed-HTML extraction.

use std::sync::Arc;

use serde::Deserialize;
use url::Url;

use crate::proxy::{FetchOptions, ProxyFetch, ProxyRequest};
use crate::registry::{ProviderMatch, ProviderRegistry};

// TODO: source a real Graph API token from host settings once the host
// exposes one; Instagram/Facebook endpoints reject the placeholder.
const ACCESS_TOKEN_PLACEHOLDER: &str = "xxxxx";

/// Subset of the oEmbed response payload this crate consumes.
#[derive(Debug, Deserialize)]
struct OembedPayload {
    html: Option<String>,
    #[allow(dead_code)]
    provider_name: Option<String>,
}

/// Resolves a URL to provider-hosted embed HTML.
pub struct OembedResolver {
    registry: Arc<ProviderRegistry>,
    proxy: Arc<dyn ProxyFetch>,
    options: FetchOptions,
}

impl OembedResolver {
    pub fn new(registry: Arc<ProviderRegistry>, proxy: Arc<dyn ProxyFetch>) -> Self {
        Self {
            registry,
            proxy,
            options: FetchOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Fetch the embeddable HTML fragment for `target`, if any provider
    /// offers one.
    ///
    /// Misses and transport/parse failures all come back as `None`; this is
    /// safe to call speculatively on arbitrary URLs.
    pub async fn embed_html(&self, target: &str) -> Option<String> {
        let matched = self.registry.resolve(target).await?;
        let request_url = match build_request_url(&matched, target) {
            Some(url) => url,
            None => {
                tracing::warn!(
                    provider = %matched.provider_name,
                    endpoint = %matched.endpoint,
                    "unusable oEmbed endpoint template"
                );
                return None;
            }
        };

        let response = self
            .proxy
            .fetch(ProxyRequest::page_with(request_url.as_str(), &self.options))
            .await?;

        match serde_json::from_str::<OembedPayload>(&response.body) {
            Ok(payload) => {
                let html = payload.html.filter(|html| !html.trim().is_empty());
                if html.is_none() {
                    tracing::debug!(url = target, "oEmbed response carried no html");
                }
                html
            }
            Err(e) => {
                tracing::warn!(url = target, error = %e, "oEmbed response is not JSON");
                None
            }
        }
    }
}

/// Build the endpoint request URL: `{format}` substituted, `url` first, then
/// per-provider overrides, with `format=json` forced last so provider
/// configuration cannot override it.
fn build_request_url(matched: &ProviderMatch, target: &str) -> Option<Url> {
    let endpoint = matched.endpoint.replace("{format}", "json");
    let mut url = Url::parse(&endpoint).ok()?;

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "format")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    pairs.push(("url".to_string(), target.to_string()));
    pairs.extend(
        provider_params(&matched.provider_name)
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string())),
    );
    pairs.push(("format".to_string(), "json".to_string()));

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(key, value)| (key.as_str(), value.as_str())));
    Some(url)
}

/// Per-provider request parameter overrides.
///
/// An explicit configuration table, not generic logic: these are the only
/// providers whose endpoints need extra parameters.
fn provider_params(provider_name: &str) -> Vec<(&'static str, &'static str)> {
    match provider_name {
        "Twitter" | "X" => vec![
            ("theme", "dark"),
            ("dnt", "true"),
            ("omit_script", "false"),
        ],
        "Instagram" | "Facebook" => vec![("access_token", ACCESS_TOKEN_PLACEHOLDER)],
        _ => Vec::new(),
    }
}

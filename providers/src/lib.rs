//! Network-facing link resolution for linkcard.
//!
//! # Architecture
//!
//! Everything that touches the network lives in this crate, behind the
//! [`ProxyFetch`] contract - the host application forwards requests
//! server-side and hands back status/headers/body, and every resolver here
//! treats transport failure as "nothing to resolve" rather than an error:
//!
//! - [`proxy`] - the proxy-fetch contract plus the production
//!   `reqwest`-backed implementation
//! - [`registry`] - the oEmbed provider directory: one lazy fetch, ordered
//!   first-match scheme resolution
//! - [`oembed`] - provider endpoint requests and embed-HTML extraction
//! - [`metadata`] - page scraping with ordered per-field fallback chains
//!
//! # Failure semantics
//!
//! Resolution misses (no provider, no embed html, non-200 page) and transport
//! failures (timeout, malformed body) are normal outcomes: logged, then
//! surfaced as `None`. Nothing in this crate panics or returns an error for a
//! URL that simply has nothing to offer, so all entry points are safe to call
//! speculatively on arbitrary URLs.

pub mod metadata;
pub mod oembed;
pub mod proxy;
pub mod registry;

pub use metadata::MetadataResolver;
pub use oembed::OembedResolver;
pub use proxy::{FetchOptions, HttpProxy, ProxyFetch, ProxyFut, ProxyRequest, ProxyResponse};
pub use registry::{ProviderDirectory, ProviderEntry, ProviderEndpoint, ProviderMatch, ProviderRegistry};

/// Public oEmbed provider directory.
pub const PROVIDER_DIRECTORY_URL: &str = "https://oembed.com/providers.json";

/// Fixed desktop User-Agent presented on every proxied fetch.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Per-request timeout applied to every proxied fetch.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

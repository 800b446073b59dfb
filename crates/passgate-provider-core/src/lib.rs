//! Provider adapter contract for the passgate gateway.
//!
//! This crate intentionally does **not** depend on any concrete HTTP client.
//! Adapters shape an `UpstreamHttpRequest` (URL, headers, stream flag); a higher
//! layer performs the IO.

pub mod auth;
pub mod classify;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod headers;
pub mod provider;
pub mod registry;
pub mod request;

pub use auth::{AuthContext, CredentialResolver, HostResolver};
pub use classify::{
    JsonMap, REALTIME_KEYWORDS, STREAMING_ENDPOINT_KEYWORDS, classify_streaming, contains_keyword,
    is_realtime, is_truthy,
};
pub use config::{ProviderConfig, ProviderConfigPatch, ServiceAccountCredential};
pub use dispatch::prepare_passthrough;
pub use errors::{ProviderError, ProviderResult};
pub use headers::{Headers, header_get, header_set};
pub use provider::{
    HttpMethod, PassthroughAdapter, QueryParams, ResolvedTarget, UpstreamHttpRequest,
};
pub use registry::{AdapterRegistry, ProviderId};
pub use request::PassthroughRequest;

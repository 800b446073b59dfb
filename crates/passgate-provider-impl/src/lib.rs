//! Built-in passthrough adapters.
//!
//! Adapters here do not perform network IO for the proxied call itself. They shape
//! `UpstreamHttpRequest`s; the only outbound traffic is token minting in
//! [`ServiceAccountTokenMinter`].

mod auth_extractor;
mod providers;
mod registry;

pub use auth_extractor::{AUTHORIZATION, CONTENT_TYPE, USER_PROJECT};
pub use providers::vertex::{
    DEFAULT_DOMAIN, DEFAULT_SCOPE, DEFAULT_TOKEN_URI, GLOBAL_REGION, LIVE_MODELS,
    ServiceAccountTokenMinter, VertexHostResolver, VertexPassthrough,
};
pub use registry::{builtin_registry, register_builtin_adapters};

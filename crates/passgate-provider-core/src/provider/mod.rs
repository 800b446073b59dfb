use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value as JsonValue;

use crate::classify::JsonMap;
use crate::headers::Headers;
use crate::{ProviderConfig, ProviderError, ProviderResult};

/// Ordered query parameters appended to the resolved URL.
pub type QueryParams = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn parse(method: &str) -> Option<Self> {
        [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ]
        .into_iter()
        .find(|m| method.trim().eq_ignore_ascii_case(m.as_str()))
    }

    /// Methods that normally carry no request body.
    pub fn is_bodyless(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a request goes. `url` always starts with `base_host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub url: String,
    /// Bare scheme + host, used for connection-level concerns (pool keys, SNI).
    pub base_host: String,
}

impl ResolvedTarget {
    /// Joins `base_host` and `path` (a leading `/` is added when missing) and
    /// appends `query` as a form-encoded query string.
    pub fn build(base_host: &str, path: &str, query: Option<&QueryParams>) -> ProviderResult<Self> {
        let base_host = base_host.trim_end_matches('/').to_string();
        let mut url = if path.starts_with('/') {
            format!("{base_host}{path}")
        } else {
            format!("{base_host}/{path}")
        };
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            let encoded = serde_urlencoded::to_string(query)
                .map_err(|err| ProviderError::Other(err.to_string()))?;
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encoded);
        }
        Ok(Self { url, base_host })
    }
}

/// Fully-shaped outbound request. Produced here, sent by a higher layer.
#[derive(Debug, Clone)]
pub struct UpstreamHttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub base_host: String,
    pub headers: Headers,
    pub body: Option<Bytes>,
    pub is_stream: bool,
}

/// Per-provider request shaping.
///
/// Implementations are stateless strategy objects: anything held in `self` is
/// configuration (injected collaborators), never per-request data, so one
/// instance can serve concurrent requests behind an `Arc`.
#[async_trait]
pub trait PassthroughAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Pure and total; used by the transport to pick a response strategy.
    fn is_streaming_request(&self, endpoint: &str, params: &JsonMap) -> bool;

    /// Must not touch credentials.
    fn resolve_url(
        &self,
        api_base: Option<&str>,
        model: &str,
        endpoint: &str,
        query: Option<&QueryParams>,
        config: &ProviderConfig,
    ) -> ProviderResult<ResolvedTarget>;

    /// Returns a new header list with provider auth applied. `headers` is left untouched.
    #[allow(clippy::too_many_arguments)]
    async fn validate_environment(
        &self,
        headers: &Headers,
        model: &str,
        messages: &[JsonValue],
        optional_params: &JsonMap,
        config: &ProviderConfig,
        api_key: Option<&str>,
        api_base: &str,
    ) -> ProviderResult<Headers>;

    fn supported_models(&self) -> &'static [&'static str];

    /// Static API key to use, if the provider accepts one at all.
    fn get_api_key(&self, api_key: Option<&str>) -> Option<String> {
        api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    /// `None` means no normalization is available, not an error.
    fn base_model(&self, _model: &str) -> Option<String> {
        None
    }

    /// Optional request signing (e.g. SigV4-style providers). Identity by default.
    fn sign_request(
        &self,
        headers: Headers,
        body: Option<Bytes>,
        _target: &ResolvedTarget,
    ) -> ProviderResult<(Headers, Option<Bytes>)> {
        Ok((headers, body))
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::debug;

use passgate_provider_core::{
    CredentialResolver, Headers, HostResolver, JsonMap, PassthroughAdapter, ProviderConfig,
    ProviderError, ProviderResult, QueryParams, ResolvedTarget, classify_streaming, is_realtime,
};

use crate::auth_extractor;

mod host;
mod oauth;

pub use host::{DEFAULT_DOMAIN, GLOBAL_REGION, VertexHostResolver};
pub use oauth::{DEFAULT_SCOPE, DEFAULT_TOKEN_URI, ServiceAccountTokenMinter};

const ADAPTER_NAME: &str = "vertex_ai";

/// Models served by the Live (real-time) API.
pub const LIVE_MODELS: [&str; 4] = [
    "gemini-2.0-flash-live-preview",
    "gemini-live-2.5-flash",
    "gemini-live-2.5-flash-preview-native-audio",
    "gemini-2.0-flash-live-001",
];

/// Passthrough adapter for Vertex AI, including the Live API.
///
/// Auth is bearer-only: tokens come from the injected [`CredentialResolver`], and
/// static API keys are never forwarded.
pub struct VertexPassthrough {
    credentials: Arc<dyn CredentialResolver>,
    hosts: Arc<dyn HostResolver>,
}

impl VertexPassthrough {
    pub fn new(credentials: Arc<dyn CredentialResolver>) -> Self {
        Self::with_host_resolver(credentials, Arc::new(VertexHostResolver::new()))
    }

    pub fn with_host_resolver(
        credentials: Arc<dyn CredentialResolver>,
        hosts: Arc<dyn HostResolver>,
    ) -> Self {
        Self { credentials, hosts }
    }
}

#[async_trait]
impl PassthroughAdapter for VertexPassthrough {
    fn name(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn is_streaming_request(&self, endpoint: &str, params: &JsonMap) -> bool {
        classify_streaming(endpoint, params)
    }

    fn resolve_url(
        &self,
        api_base: Option<&str>,
        model: &str,
        endpoint: &str,
        query: Option<&QueryParams>,
        config: &ProviderConfig,
    ) -> ProviderResult<ResolvedTarget> {
        // The Live API is only guaranteed in `global`.
        let region = config.region().unwrap_or(GLOBAL_REGION);
        let explicit_base = api_base.or(config.base_url());
        let base_host = self
            .hosts
            .resolve_host(explicit_base, region)
            .ok_or_else(|| ProviderError::configuration("Vertex AI api base not found"))?;

        let live = is_realtime(endpoint);
        let path = if live {
            let project = config.project_id().ok_or_else(|| {
                ProviderError::configuration("Vertex AI project ID is required for Live API")
            })?;
            live_path(project, region, model)
        } else {
            endpoint.to_string()
        };

        debug!(
            event = "resolve_url",
            provider = ADAPTER_NAME,
            live = live,
            region = %region
        );
        ResolvedTarget::build(&base_host, &path, query)
    }

    async fn validate_environment(
        &self,
        headers: &Headers,
        model: &str,
        _messages: &[JsonValue],
        optional_params: &JsonMap,
        config: &ProviderConfig,
        _api_key: Option<&str>,
        _api_base: &str,
    ) -> ProviderResult<Headers> {
        let auth = self
            .credentials
            .mint_token(config.credential.as_ref(), config.project_id(), ADAPTER_NAME)
            .await?;

        let mut out = headers.clone();
        auth_extractor::set_bearer(&mut out, &auth.access_token);
        auth_extractor::set_content_type_json(&mut out);
        if is_realtime(model) || params_mention_realtime(optional_params) {
            auth_extractor::set_user_project(&mut out, &auth.effective_project_id);
        }
        Ok(out)
    }

    fn supported_models(&self) -> &'static [&'static str] {
        &LIVE_MODELS
    }

    fn get_api_key(&self, _api_key: Option<&str>) -> Option<String> {
        None
    }

    fn base_model(&self, model: &str) -> Option<String> {
        is_realtime(model).then(|| model.to_string())
    }
}

/// The caller's endpoint is replaced wholesale; `model` is interpolated as-is.
fn live_path(project: &str, region: &str, model: &str) -> String {
    format!(
        "/v1beta1/projects/{project}/locations/{region}/publishers/google/models/{model}:streamRawPredict"
    )
}

// Matches keys and values alike, so `{"mode": "live"}` counts too.
fn params_mention_realtime(params: &JsonMap) -> bool {
    if params.is_empty() {
        return false;
    }
    serde_json::to_string(params).is_ok_and(|rendered| is_realtime(&rendered))
}

use bytes::Bytes;
use tracing::info;

use crate::{
    AdapterRegistry, PassthroughRequest, ProviderConfig, ProviderError, ProviderResult,
    UpstreamHttpRequest,
};

/// Shapes one passthrough request: adapter lookup, streaming classification, URL
/// resolution, auth, then optional signing. No network IO happens here apart from
/// whatever the adapter's credential resolver does.
pub async fn prepare_passthrough(
    registry: &AdapterRegistry,
    config: &ProviderConfig,
    req: &PassthroughRequest,
) -> ProviderResult<UpstreamHttpRequest> {
    let adapter = registry
        .get(req.provider)
        .ok_or_else(|| ProviderError::UnknownProvider(req.provider.to_string()))?;

    let is_stream =
        adapter.is_streaming_request(&req.endpoint, &req.body) || req.stream == Some(true);

    let target = adapter.resolve_url(
        req.api_base.as_deref(),
        &req.model,
        &req.endpoint,
        req.query.as_ref(),
        config,
    )?;

    let api_key = adapter.get_api_key(req.api_key.as_deref());
    let headers = adapter
        .validate_environment(
            &req.headers,
            &req.model,
            req.messages(),
            &req.optional_params(),
            config,
            api_key.as_deref(),
            &target.base_host,
        )
        .await?;

    let body = if req.body.is_empty() && req.method.is_bodyless() {
        None
    } else {
        let raw =
            serde_json::to_vec(&req.body).map_err(|err| ProviderError::Other(err.to_string()))?;
        Some(Bytes::from(raw))
    };
    let (headers, body) = adapter.sign_request(headers, body, &target)?;

    info!(
        event = "passthrough_prepared",
        provider = %req.provider,
        adapter = adapter.name(),
        method = %req.method,
        is_stream = is_stream
    );

    Ok(UpstreamHttpRequest {
        method: req.method,
        url: target.url,
        base_host: target.base_host,
        headers,
        body,
        is_stream,
    })
}

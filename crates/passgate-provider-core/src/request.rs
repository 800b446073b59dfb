use serde_json::Value as JsonValue;

use crate::classify::JsonMap;
use crate::headers::Headers;
use crate::{HttpMethod, ProviderId, QueryParams};

/// Generic inbound passthrough request, as the gateway receives it.
#[derive(Debug, Clone)]
pub struct PassthroughRequest {
    pub method: HttpMethod,
    /// Logical endpoint, e.g. `live/stream` or `predict`.
    pub endpoint: String,
    pub model: String,
    pub provider: ProviderId,
    pub body: JsonMap,
    pub stream: Option<bool>,
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    pub query: Option<QueryParams>,
    pub headers: Headers,
}

impl PassthroughRequest {
    pub fn new(
        provider: ProviderId,
        method: HttpMethod,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            model: model.into(),
            provider,
            body: JsonMap::new(),
            stream: None,
            api_base: None,
            api_key: None,
            query: None,
            headers: Headers::new(),
        }
    }

    /// Non-object bodies are ignored.
    pub fn with_body(mut self, body: JsonValue) -> Self {
        if let JsonValue::Object(map) = body {
            self.body = map;
        }
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// `messages` from the body, if present as an array.
    pub fn messages(&self) -> &[JsonValue] {
        self.body
            .get("messages")
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Body fields other than `model` and `messages`.
    pub fn optional_params(&self) -> JsonMap {
        self.body
            .iter()
            .filter(|(key, _)| key.as_str() != "model" && key.as_str() != "messages")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

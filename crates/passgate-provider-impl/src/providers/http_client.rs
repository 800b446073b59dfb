use std::collections::HashMap;
use std::sync::Mutex;

use passgate_provider_core::{ProviderError, ProviderResult};

/// One `wreq::Client` per outbound proxy, so connection pools are reused.
#[derive(Default)]
pub(crate) struct HttpClientCache {
    clients: Mutex<HashMap<Option<String>, wreq::Client>>,
}

impl HttpClientCache {
    pub(crate) fn client(&self, proxy: Option<&str>) -> ProviderResult<wreq::Client> {
        let key = normalize_proxy(proxy);
        let mut guard = self
            .clients
            .lock()
            .map_err(|_| ProviderError::Other("http client cache lock failed".to_string()))?;

        if let Some(client) = guard.get(&key) {
            return Ok(client.clone());
        }

        let client = build_client(key.as_deref())?;
        guard.insert(key, client.clone());
        Ok(client)
    }
}

fn build_client(proxy: Option<&str>) -> ProviderResult<wreq::Client> {
    let builder = match proxy {
        Some(url) => wreq::Client::builder().proxy(wreq::Proxy::all(url).map_err(client_error)?),
        None => wreq::Client::builder(),
    };
    builder.build().map_err(client_error)
}

fn client_error(err: wreq::Error) -> ProviderError {
    ProviderError::Other(format!("http client: {err}"))
}

// Blank and missing proxies share the direct client.
fn normalize_proxy(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cached_keys(cache: &HttpClientCache) -> Vec<Option<String>> {
        let mut keys: Vec<_> = cache.clients.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[tokio::test]
    async fn one_client_per_proxy_key() {
        let cache = HttpClientCache::default();
        cache.client(None).unwrap();
        cache.client(Some("   ")).unwrap();
        cache.client(Some(" http://127.0.0.1:3128 ")).unwrap();
        cache.client(Some("http://127.0.0.1:3128")).unwrap();
        assert_eq!(
            cached_keys(&cache),
            vec![None, Some("http://127.0.0.1:3128".to_string())]
        );
    }
}

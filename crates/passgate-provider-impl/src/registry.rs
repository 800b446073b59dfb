use std::sync::Arc;

use passgate_provider_core::{AdapterRegistry, CredentialResolver, ProviderId};

use crate::providers::vertex::{ServiceAccountTokenMinter, VertexPassthrough};

/// Registers every builtin adapter. Both Vertex ids share one adapter instance.
pub fn register_builtin_adapters(
    registry: &mut AdapterRegistry,
    credentials: Arc<dyn CredentialResolver>,
) {
    let vertex = Arc::new(VertexPassthrough::new(credentials));
    registry.register(ProviderId::VertexAi, vertex.clone());
    registry.register(ProviderId::VertexAiBeta, vertex);
}

/// Registry backed by a fresh [`ServiceAccountTokenMinter`].
pub fn builtin_registry() -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    register_builtin_adapters(&mut registry, Arc::new(ServiceAccountTokenMinter::new()));
    registry
}

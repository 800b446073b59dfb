use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::PassthroughAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    VertexAi,
    VertexAiBeta,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::VertexAi, ProviderId::VertexAiBeta];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::VertexAi => "vertex_ai",
            ProviderId::VertexAiBeta => "vertex_ai_beta",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<ProviderId, Arc<dyn PassthroughAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later registrations for the same id replace earlier ones.
    pub fn register(&mut self, id: ProviderId, adapter: Arc<dyn PassthroughAdapter>) {
        self.adapters.insert(id, adapter);
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn PassthroughAdapter>> {
        self.adapters.get(&id).cloned()
    }
}

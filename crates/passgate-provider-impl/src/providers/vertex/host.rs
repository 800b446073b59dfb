use passgate_provider_core::HostResolver;

pub const DEFAULT_DOMAIN: &str = "googleapis.com";
pub const GLOBAL_REGION: &str = "global";

/// Regional Vertex hosts: `https://{region}-aiplatform.{domain}`, with the bare
/// `https://aiplatform.{domain}` serving the `global` region.
#[derive(Debug, Clone)]
pub struct VertexHostResolver {
    domain: String,
}

impl Default for VertexHostResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexHostResolver {
    pub fn new() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
        }
    }

    /// For sovereign-cloud universes that do not live under `googleapis.com`.
    pub fn with_domain(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        let domain = domain.trim().trim_matches('.');
        if domain.is_empty() {
            return Self::new();
        }
        Self {
            domain: domain.to_string(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl HostResolver for VertexHostResolver {
    fn resolve_host(&self, explicit_base: Option<&str>, region: &str) -> Option<String> {
        if let Some(base) = explicit_base.map(str::trim).filter(|b| !b.is_empty()) {
            return Some(base.trim_end_matches('/').to_string());
        }
        let region = region.trim();
        if !is_valid_region(region) {
            return None;
        }
        let domain = &self.domain;
        if region.eq_ignore_ascii_case(GLOBAL_REGION) {
            Some(format!("https://aiplatform.{domain}"))
        } else {
            Some(format!("https://{region}-aiplatform.{domain}"))
        }
    }
}

// Region ends up in a hostname label.
fn is_valid_region(region: &str) -> bool {
    !region.is_empty()
        && !region.starts_with('-')
        && !region.ends_with('-')
        && region
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

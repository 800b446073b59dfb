use std::fmt;

use async_trait::async_trait;

use crate::{ProviderResult, ServiceAccountCredential};

/// Short-lived auth material for one outbound request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub access_token: String,
    pub effective_project_id: String,
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("access_token", &"<redacted>")
            .field("effective_project_id", &self.effective_project_id)
            .finish()
    }
}

/// Mints bearer tokens from service-account material.
///
/// Shared by every adapter of the same vendor family; adapters receive it by
/// injection rather than owning any token state themselves.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Fails with `ProviderError::Authentication` on missing, invalid or expired material.
    async fn mint_token(
        &self,
        credential: Option<&ServiceAccountCredential>,
        project_id: Option<&str>,
        provider: &str,
    ) -> ProviderResult<AuthContext>;
}

/// Picks the base host for a request.
pub trait HostResolver: Send + Sync {
    fn resolve_host(&self, explicit_base: Option<&str>, region: &str) -> Option<String>;
}

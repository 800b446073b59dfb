use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ProviderError, ProviderResult};

pub const ENV_PROJECT: &str = "VERTEXAI_PROJECT";
pub const ENV_LOCATION: &str = "VERTEXAI_LOCATION";
pub const ENV_CREDENTIALS: &str = "VERTEXAI_CREDENTIALS";
/// Path to a service-account key file, as Google client libraries read it.
pub const ENV_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Per-provider settings handed to every adapter call. Read-only to adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "location")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<ServiceAccountCredential>,
    /// Host override used when the call itself carries no `api_base`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn from_json(raw: &str) -> ProviderResult<Self> {
        serde_json::from_str(raw)
            .map_err(|err| ProviderError::configuration(format!("invalid provider config: {err}")))
    }

    pub fn project_id(&self) -> Option<&str> {
        non_blank(self.project_id.as_deref())
    }

    pub fn region(&self) -> Option<&str> {
        non_blank(self.region.as_deref())
    }

    pub fn base_url(&self) -> Option<&str> {
        non_blank(self.base_url.as_deref())
    }
}

/// Google service-account JSON fields. Extra metadata is kept for round-trips;
/// `access_token`/`expires_at` hold a pre-minted token when one is available.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountCredential {
    #[serde(default)]
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub universe_domain: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_token: String,
    #[serde(default)]
    pub expires_at: i64,
}

impl ServiceAccountCredential {
    pub fn from_json(raw: &str) -> ProviderResult<Self> {
        serde_json::from_str(raw).map_err(|err| {
            ProviderError::configuration(format!("invalid service account credential: {err}"))
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| {
            ProviderError::configuration(format!(
                "failed to read service account file {}: {err}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }
}

// Key material and tokens stay out of logs.
impl fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("has_access_token", &!self.access_token.is_empty())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Optional layer used for merging provider config.
///
/// Merge order is up to the caller; typically file < env.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfigPatch {
    pub project_id: Option<String>,
    pub region: Option<String>,
    /// Service-account JSON, or a path to a key file. Parsed in `into_config`.
    pub credential_json: Option<String>,
    /// Key file used when `credential_json` is unset.
    pub credential_file: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderConfigPatch {
    pub fn from_env_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            project_id: get(ENV_PROJECT),
            region: get(ENV_LOCATION),
            credential_json: get(ENV_CREDENTIALS),
            credential_file: get(ENV_APPLICATION_CREDENTIALS),
            ..Self::default()
        }
    }

    pub fn overlay(&mut self, other: ProviderConfigPatch) {
        if other.project_id.is_some() {
            self.project_id = other.project_id;
        }
        if other.region.is_some() {
            self.region = other.region;
        }
        if other.credential_json.is_some() {
            self.credential_json = other.credential_json;
        }
        if other.credential_file.is_some() {
            self.credential_file = other.credential_file;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
    }

    /// `credential_json` wins over `credential_file`. A `credential_json` value that does not
    /// look like a JSON object is read as a key file path.
    pub fn into_config(self) -> ProviderResult<ProviderConfig> {
        let credential = match (self.credential_json.as_deref(), self.credential_file.as_deref()) {
            (Some(raw), _) if raw.trim_start().starts_with('{') => {
                Some(ServiceAccountCredential::from_json(raw)?)
            }
            (Some(path), _) | (None, Some(path)) => {
                Some(ServiceAccountCredential::from_file(path.trim())?)
            }
            (None, None) => None,
        };
        Ok(ProviderConfig {
            project_id: self.project_id,
            region: self.region,
            credential,
            base_url: self.base_url,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

mod provider_config;

pub use provider_config::{
    ENV_APPLICATION_CREDENTIALS, ENV_CREDENTIALS, ENV_LOCATION, ENV_PROJECT, ProviderConfig,
    ProviderConfigPatch, ServiceAccountCredential,
};

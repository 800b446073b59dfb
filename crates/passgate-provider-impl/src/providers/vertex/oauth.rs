use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use tracing::{debug, warn};

use passgate_provider_core::{
    AuthContext, CredentialResolver, ProviderError, ProviderResult, ServiceAccountCredential,
};

use crate::providers::http_client::HttpClientCache;

pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// Tokens this close to expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;
const ERROR_DETAIL_LIMIT: usize = 256;

#[derive(Debug, serde::Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Debug, serde::Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, serde::Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges a signed service-account assertion for a bearer token.
///
/// Tokens are cached per `client_email` inside the minter instance.
pub struct ServiceAccountTokenMinter {
    token_uri: Option<String>,
    scope: String,
    outbound_proxy: Option<String>,
    clients: HttpClientCache,
    cache: Mutex<HashMap<String, (String, i64)>>,
}

impl Default for ServiceAccountTokenMinter {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceAccountTokenMinter {
    pub fn new() -> Self {
        Self {
            token_uri: None,
            scope: DEFAULT_SCOPE.to_string(),
            outbound_proxy: None,
            clients: HttpClientCache::default(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Overrides the credential's own `token_uri`.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = Some(token_uri.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_outbound_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.outbound_proxy = Some(proxy.into());
        self
    }

    fn token_uri_for<'a>(&'a self, sa: &'a ServiceAccountCredential) -> &'a str {
        self.token_uri
            .as_deref()
            .or(sa.token_uri.as_deref())
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .unwrap_or(DEFAULT_TOKEN_URI)
    }

    fn cached_token(
        &self,
        sa: &ServiceAccountCredential,
        now: i64,
    ) -> ProviderResult<Option<String>> {
        if !sa.access_token.trim().is_empty() && now + EXPIRY_SKEW_SECS < sa.expires_at {
            return Ok(Some(sa.access_token.clone()));
        }
        let guard = self
            .cache
            .lock()
            .map_err(|_| ProviderError::Other("token cache lock failed".to_string()))?;
        Ok(guard
            .get(&sa.client_email)
            .filter(|(_, exp)| now + EXPIRY_SKEW_SECS < *exp)
            .map(|(token, _)| token.clone()))
    }

    async fn exchange(
        &self,
        token_uri: &str,
        assertion: &str,
        now: i64,
    ) -> ProviderResult<(String, i64)> {
        let body = format!(
            "grant_type={}&assertion={}",
            urlencoding::encode(JWT_BEARER_GRANT),
            urlencoding::encode(assertion)
        );
        let client = self.clients.client(self.outbound_proxy.as_deref())?;
        let resp = client
            .post(token_uri)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|err| {
                ProviderError::authentication(format!("oauth token request failed: {err}"))
            })?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            warn!(event = "oauth_token_rejected", status = %status);
            return Err(ProviderError::authentication(format!(
                "oauth token failed: {status} {}",
                rejection_detail(&body)
            )));
        }
        let body = resp
            .bytes()
            .await
            .map_err(|err| ProviderError::authentication(err.to_string()))?;
        let token_resp: OAuthTokenResponse = serde_json::from_slice(&body).map_err(|err| {
            ProviderError::authentication(format!("invalid token response: {err}"))
        })?;
        if token_resp.access_token.trim().is_empty() {
            return Err(ProviderError::authentication(
                "token response carried no access_token",
            ));
        }
        Ok((
            token_resp.access_token,
            now + token_resp.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS),
        ))
    }
}

#[async_trait]
impl CredentialResolver for ServiceAccountTokenMinter {
    async fn mint_token(
        &self,
        credential: Option<&ServiceAccountCredential>,
        project_id: Option<&str>,
        provider: &str,
    ) -> ProviderResult<AuthContext> {
        let sa = credential
            .ok_or_else(|| ProviderError::authentication("missing service account credential"))?;
        let effective_project_id = project_id
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .or_else(|| Some(sa.project_id.trim()).filter(|p| !p.is_empty()))
            .ok_or_else(|| ProviderError::authentication("could not resolve project id"))?
            .to_string();

        let now = unix_now()?;
        if let Some(access_token) = self.cached_token(sa, now)? {
            debug!(
                event = "oauth_token_reused",
                provider = %provider,
                client_email = %sa.client_email
            );
            return Ok(AuthContext {
                access_token,
                effective_project_id,
            });
        }

        let token_uri = self.token_uri_for(sa);
        let assertion = build_assertion(sa, &self.scope, token_uri, now)?;
        debug!(
            event = "oauth_token_mint",
            provider = %provider,
            client_email = %sa.client_email
        );
        let (access_token, expires_at) = self.exchange(token_uri, &assertion, now).await?;

        let mut guard = self
            .cache
            .lock()
            .map_err(|_| ProviderError::Other("token cache lock failed".to_string()))?;
        guard.insert(sa.client_email.clone(), (access_token.clone(), expires_at));
        Ok(AuthContext {
            access_token,
            effective_project_id,
        })
    }
}

/// RS256-signed JWT bearer assertion for the token endpoint.
pub(crate) fn build_assertion(
    sa: &ServiceAccountCredential,
    scope: &str,
    token_uri: &str,
    now: i64,
) -> ProviderResult<String> {
    if sa.client_email.trim().is_empty() {
        return Err(ProviderError::authentication("service account has no client_email"));
    }
    let claims = JwtClaims {
        iss: &sa.client_email,
        scope,
        aud: token_uri,
        exp: now + ASSERTION_LIFETIME_SECS,
        iat: now,
    };
    let mut header = Header::new(Algorithm::RS256);
    if !sa.private_key_id.trim().is_empty() {
        header.kid = Some(sa.private_key_id.clone());
    }
    let key = EncodingKey::from_rsa_pem(sa.private_key.as_bytes())
        .map_err(|err| ProviderError::authentication(format!("invalid private key: {err}")))?;
    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|err| ProviderError::authentication(format!("jwt signing failed: {err}")))
}

/// The OAuth `error` fields when present, else the raw body, capped at
/// `ERROR_DETAIL_LIMIT` chars.
fn rejection_detail(body: &[u8]) -> String {
    let detail = match serde_json::from_slice::<OAuthErrorResponse>(body) {
        Ok(OAuthErrorResponse {
            error,
            error_description: Some(description),
        }) => format!("{error}: {description}"),
        Ok(OAuthErrorResponse { error, .. }) => error,
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    };
    if detail.chars().count() <= ERROR_DETAIL_LIMIT {
        return detail;
    }
    let mut capped: String = detail.chars().take(ERROR_DETAIL_LIMIT).collect();
    capped.push_str("...");
    capped
}

fn unix_now() -> ProviderResult<i64> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| ProviderError::Other(err.to_string()))?
        .as_secs();
    i64::try_from(secs).map_err(|err| ProviderError::Other(err.to_string()))
}

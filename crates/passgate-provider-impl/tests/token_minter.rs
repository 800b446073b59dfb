use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use passgate_provider_core::{CredentialResolver, ServiceAccountCredential};
use passgate_provider_impl::{DEFAULT_SCOPE, ServiceAccountTokenMinter};

const PRIVATE_KEY: &str = include_str!("fixtures/test_sa_key.pem");
const PUBLIC_KEY: &str = include_str!("fixtures/test_sa_pub.pem");
const TOKEN_OK: &str = r#"{"access_token":"ya29.fresh","expires_in":3600}"#;

type Captured = Arc<Mutex<Vec<String>>>;

fn service_account() -> ServiceAccountCredential {
    ServiceAccountCredential {
        project_id: "sa-project".to_string(),
        client_email: "svc@sa-project.iam.gserviceaccount.com".to_string(),
        private_key: PRIVATE_KEY.to_string(),
        private_key_id: "kid-1".to_string(),
        ..ServiceAccountCredential::default()
    }
}

#[derive(Debug, serde::Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
}

/// Minimal HTTP/1.1 server answering every request with `status` + `body`.
/// Returns its `http://host:port` origin.
async fn spawn_token_server(status: &'static str, body: &'static str) -> (String, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let seen = captured.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let request = read_request(&mut stream).await;
            seen.lock().unwrap().push(request);
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });
    (format!("http://{addr}"), captured)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[tokio::test]
async fn mints_once_then_serves_from_cache() {
    let (origin, captured) = spawn_token_server("200 OK", TOKEN_OK).await;
    let minter = ServiceAccountTokenMinter::new().with_token_uri(format!("{origin}/token"));
    let sa = service_account();

    let first = minter
        .mint_token(Some(&sa), Some("configured-project"), "vertex_ai")
        .await
        .unwrap();
    assert_eq!(first.access_token, "ya29.fresh");
    assert_eq!(first.effective_project_id, "configured-project");

    let second = minter.mint_token(Some(&sa), None, "vertex_ai").await.unwrap();
    assert_eq!(second.access_token, "ya29.fresh");
    assert_eq!(second.effective_project_id, "sa-project");

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.starts_with("POST /token"));
    assert!(
        request
            .to_ascii_lowercase()
            .contains("content-type: application/x-www-form-urlencoded")
    );
    assert!(request.contains(
        "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer&assertion="
    ));
}

#[tokio::test]
async fn rejected_exchange_is_an_authentication_error() {
    let (origin, captured) = spawn_token_server(
        "401 Unauthorized",
        r#"{"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#,
    )
    .await;
    let minter = ServiceAccountTokenMinter::new().with_token_uri(format!("{origin}/token"));

    let err = minter
        .mint_token(Some(&service_account()), None, "vertex_ai")
        .await
        .unwrap_err();
    assert!(err.is_authentication());
    assert!(err.to_string().contains("401"));
    assert!(err.to_string().contains("invalid_grant: Invalid JWT Signature."));
    assert_eq!(captured.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_token_response_is_rejected() {
    let (origin, _) = spawn_token_server("200 OK", r#"{"access_token":""}"#).await;
    let minter = ServiceAccountTokenMinter::new().with_token_uri(format!("{origin}/token"));
    let err = minter
        .mint_token(Some(&service_account()), None, "vertex_ai")
        .await
        .unwrap_err();
    assert!(err.is_authentication());
}

#[tokio::test]
async fn missing_credential_is_an_authentication_error() {
    let minter = ServiceAccountTokenMinter::new();
    let err = minter
        .mint_token(None, Some("p1"), "vertex_ai")
        .await
        .unwrap_err();
    assert!(err.is_authentication());
}

#[tokio::test]
async fn unresolvable_project_is_an_authentication_error() {
    let minter = ServiceAccountTokenMinter::new();
    let sa = ServiceAccountCredential {
        project_id: String::new(),
        ..service_account()
    };
    let err = minter.mint_token(Some(&sa), Some("  "), "vertex_ai").await.unwrap_err();
    assert!(err.is_authentication());
}

#[tokio::test]
async fn pre_minted_token_skips_the_token_endpoint() {
    // Nothing listens here; any exchange attempt would fail.
    let minter = ServiceAccountTokenMinter::new().with_token_uri("http://127.0.0.1:9/token");
    let far_future = 32_503_680_000; // year 3000
    let sa = ServiceAccountCredential {
        access_token: "ya29.preminted".to_string(),
        expires_at: far_future,
        ..service_account()
    };
    let auth = minter.mint_token(Some(&sa), None, "vertex_ai").await.unwrap();
    assert_eq!(auth.access_token, "ya29.preminted");
    assert_eq!(auth.effective_project_id, "sa-project");
}

fn assertion_from(request: &str) -> String {
    let encoded = request
        .split("assertion=")
        .nth(1)
        .map(str::trim)
        .unwrap_or_default();
    urlencoding::decode(encoded).unwrap().into_owned()
}

#[tokio::test]
async fn assertion_carries_configured_scope_and_audience() {
    let (origin, captured) = spawn_token_server("200 OK", TOKEN_OK).await;
    let token_uri = format!("{origin}/token");
    let scope = "https://www.googleapis.com/auth/cloud-platform.read-only";
    let minter = ServiceAccountTokenMinter::new()
        .with_token_uri(token_uri.clone())
        .with_scope(scope);

    minter
        .mint_token(Some(&service_account()), None, "vertex_ai")
        .await
        .unwrap();

    let request = captured.lock().unwrap()[0].clone();
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[token_uri.as_str()]);
    let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap();
    let claims = decode::<AssertionClaims>(&assertion_from(&request), &key, &validation)
        .unwrap()
        .claims;
    assert_eq!(claims.scope, scope);
    assert_ne!(claims.scope, DEFAULT_SCOPE);
    assert_eq!(claims.aud, token_uri);
    assert_eq!(claims.iss, "svc@sa-project.iam.gserviceaccount.com");
}

#[tokio::test]
async fn exchange_goes_through_the_outbound_proxy() {
    // The proxy answers on behalf of a host that does not resolve.
    let (proxy, captured) = spawn_token_server("200 OK", TOKEN_OK).await;
    let minter = ServiceAccountTokenMinter::new()
        .with_token_uri("http://oauth.passgate.invalid/token")
        .with_outbound_proxy(proxy);

    let auth = minter
        .mint_token(Some(&service_account()), None, "vertex_ai")
        .await
        .unwrap();
    assert_eq!(auth.access_token, "ya29.fresh");

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("POST http://oauth.passgate.invalid/token "));
}

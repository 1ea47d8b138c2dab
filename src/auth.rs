//! Auth mode resolution. Uploads prefer a service-account bearer token when
//! a key file is configured; anything going wrong on that path degrades to
//! API-key auth instead of failing the run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::AdminConfig;

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone)]
pub enum AuthMode {
    /// `?key=` query parameter on every request.
    ApiKey(String),
    /// `Authorization: Bearer` header minted from a service account.
    Bearer(String),
}

pub async fn resolve(config: &AdminConfig) -> AuthMode {
    let Some(key_path) = credential_path(config) else {
        return AuthMode::ApiKey(config.api_key.clone());
    };
    match mint_bearer_token(&key_path).await {
        Ok(token) => {
            info!("using service account bearer token");
            AuthMode::Bearer(token)
        }
        Err(err) => {
            warn!("service account auth failed, falling back to API key: {err:#}");
            AuthMode::ApiKey(config.api_key.clone())
        }
    }
}

fn credential_path(config: &AdminConfig) -> Option<PathBuf> {
    config
        .service_account_path
        .clone()
        .or_else(|| std::env::var_os("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from))
}

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Serialize)]
struct GrantClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Signs a datastore-scoped JWT assertion with the service account key and
/// exchanges it at the token endpoint.
async fn mint_bearer_token(key_path: &Path) -> anyhow::Result<String> {
    let raw = std::fs::read_to_string(key_path)
        .with_context(|| format!("could not read service account key {}", key_path.display()))?;
    let key: ServiceAccountKey =
        serde_json::from_str(&raw).context("could not parse service account key")?;

    let now = Utc::now().timestamp();
    let claims = GrantClaims {
        iss: key.client_email.clone(),
        scope: DATASTORE_SCOPE.to_owned(),
        aud: key.token_uri.clone(),
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };
    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .context("invalid service account private key")?;
    let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
        .context("could not sign token grant")?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("could not build http client")?;
    let response = http_client
        .post(&key.token_uri)
        .form(&[
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .await
        .context("could not reach the token endpoint")?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("token grant failed with {status}: {body}");
    }
    let token: TokenResponse = response
        .json()
        .await
        .context("could not deserialise token response")?;
    Ok(token.access_token)
}

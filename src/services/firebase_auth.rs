use async_trait::async_trait;
use jsonwebtoken::{
    decode, decode_header,
    jwk::JwkSet,
    Algorithm, DecodingKey, Validation,
};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::Claims;

/// Public keys used to sign Firebase ID tokens.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const DEFAULT_KEYS_TTL: Duration = Duration::from_secs(3600);
const CLOCK_SKEW_SECONDS: u64 = 60;
const MAX_UID_LENGTH: usize = 128;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("token header has no 'kid'")]
    MissingKeyId,
    #[error("unsupported token algorithm {0:?}, expected RS256")]
    UnsupportedAlgorithm(Algorithm),
    #[error("no public key matches kid '{0}'")]
    UnknownKeyId(String),
    #[error("failed to fetch public keys: {0}")]
    KeyFetch(#[from] reqwest::Error),
    #[error("invalid token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid '{0}' claim")]
    InvalidClaim(&'static str),
}

/// Turns a bearer token into verified claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Claims, VerifyError>;
}

struct CachedKeys {
    keys: JwkSet,
    // None for keys that were supplied up front and never refresh
    expires_at: Option<Instant>,
}

impl CachedKeys {
    fn is_fresh(&self) -> bool {
        self.expires_at.map_or(true, |at| Instant::now() < at)
    }

    fn decoding_key(&self, kid: &str) -> Result<DecodingKey, VerifyError> {
        let jwk = self
            .keys
            .find(kid)
            .ok_or_else(|| VerifyError::UnknownKeyId(kid.to_string()))?;
        Ok(DecodingKey::from_jwk(jwk)?)
    }
}

/// Verifies Firebase ID tokens for one project.
///
/// Checks the RS256 signature against Google's published keys, then `exp`,
/// `aud` (the project id), `iss` (`https://securetoken.google.com/<project>`),
/// and that `sub`, `iat` and `auth_time` are sane. Keys are cached until the
/// `Cache-Control: max-age` the key endpoint returns.
pub struct FirebaseTokenVerifier {
    project_id: String,
    http: reqwest::Client,
    jwks_url: String,
    keys: RwLock<Option<CachedKeys>>,
    validation: Validation,
}

impl FirebaseTokenVerifier {
    pub fn new(project_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        Self {
            validation: build_validation(&project_id),
            project_id,
            http: reqwest::Client::new(),
            jwks_url: FIREBASE_JWKS_URL.to_string(),
            keys: RwLock::new(None),
        }
    }

    /// Verifier that only trusts the given keys and never goes to the network.
    pub fn with_keys(project_id: impl Into<String>, keys: JwkSet) -> Self {
        let mut verifier = Self::new(project_id);
        verifier.keys = RwLock::new(Some(CachedKeys {
            keys,
            expires_at: None,
        }));
        verifier
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, VerifyError> {
        {
            let cache = self.keys.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
                return cached.decoding_key(kid);
            }
        }

        let mut cache = self.keys.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
            return cached.decoding_key(kid);
        }

        let fresh = self.fetch_keys().await?;
        let key = fresh.decoding_key(kid);
        *cache = Some(fresh);
        key
    }

    async fn fetch_keys(&self) -> Result<CachedKeys, VerifyError> {
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?;

        let ttl = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_KEYS_TTL);

        let keys: JwkSet = response.json().await?;
        log::info!(
            "🔑 Loaded {} identity provider keys (valid for {}s)",
            keys.keys.len(),
            ttl.as_secs()
        );

        Ok(CachedKeys {
            keys,
            expires_at: Some(Instant::now() + ttl),
        })
    }
}

#[async_trait]
impl TokenVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(VerifyError::MissingKeyId)?;

        let key = self.decoding_key(&kid).await?;
        let payload = decode::<Map<String, Value>>(token, &key, &self.validation)?.claims;

        check_firebase_claims(&payload, chrono::Utc::now().timestamp())?;

        Claims::from_token_payload(payload).ok_or(VerifyError::InvalidClaim("sub"))
    }
}

fn build_validation(project_id: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[project_id]);
    validation.set_issuer(&[format!("https://securetoken.google.com/{}", project_id)]);
    validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
    validation.leeway = CLOCK_SKEW_SECONDS;
    validation
}

// Checks jsonwebtoken's Validation does not cover.
fn check_firebase_claims(payload: &Map<String, Value>, now: i64) -> Result<(), VerifyError> {
    let sub = payload.get("sub").and_then(Value::as_str).unwrap_or_default();
    if sub.is_empty() || sub.len() > MAX_UID_LENGTH {
        return Err(VerifyError::InvalidClaim("sub"));
    }

    let latest = now + CLOCK_SKEW_SECONDS as i64;
    for name in ["iat", "auth_time"] {
        match payload.get(name).and_then(Value::as_i64) {
            Some(at) if at <= latest => {}
            _ => return Err(VerifyError::InvalidClaim(name)),
        }
    }

    Ok(())
}

/// Extracts `max-age` from a `Cache-Control` header value.
fn parse_max_age(cache_control: &str) -> Option<Duration> {
    cache_control
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

use jsonwebtoken::jwk::JwkSet;
use serde::Deserialize;
use std::env;
use thiserror::Error;

const DEFAULT_CREDENTIALS_PATH: &str = "firebase-admin-sdk.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("cannot read {path}: {reason}")]
    File { path: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: Option<String>,
    pub users_collection: String,
    pub firebase_project_id: String,
    /// Local JWK set to trust instead of fetching Google's published keys.
    pub firebase_jwks_file: Option<String>,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
}

// Only the part of a service-account key file we need.
#[derive(Deserialize)]
struct ServiceAccount {
    project_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = match env::var("PORT") {
            Ok(port) => port.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 5000,
        };

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let database_name = env::var("MONGODB_DATABASE").ok().filter(|s| !s.is_empty());
        let users_collection =
            env::var("USERS_COLLECTION").unwrap_or_else(|_| "users".to_string());

        let firebase_project_id = match env::var("FIREBASE_PROJECT_ID") {
            Ok(id) if !id.trim().is_empty() => id,
            _ => {
                let path = env::var("FIREBASE_CREDENTIALS")
                    .unwrap_or_else(|_| DEFAULT_CREDENTIALS_PATH.to_string());
                project_id_from_credentials(&path)?
            }
        };

        let firebase_jwks_file = env::var("FIREBASE_JWKS_FILE").ok().filter(|s| !s.is_empty());

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|origins| parse_origins(&origins))
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            database_url,
            database_name,
            users_collection,
            firebase_project_id,
            firebase_jwks_file,
            cors_allowed_origins,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reads `project_id` from a Firebase service-account JSON file.
pub fn project_id_from_credentials(path: &str) -> Result<String, ConfigError> {
    let file_error = |reason: String| ConfigError::File {
        path: path.to_string(),
        reason,
    };

    let raw = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    let account: ServiceAccount =
        serde_json::from_str(&raw).map_err(|e| file_error(e.to_string()))?;

    if account.project_id.trim().is_empty() {
        return Err(ConfigError::Invalid("project_id"));
    }
    Ok(account.project_id)
}

/// Loads a JWK set from disk, for running against a fixed set of signing keys.
pub fn load_jwk_set(path: &str) -> Result<JwkSet, ConfigError> {
    let file_error = |reason: String| ConfigError::File {
        path: path.to_string(),
        reason,
    };

    let raw = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| file_error(e.to_string()))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://localhost:3000, ,https://app.example.com "),
            vec!["http://localhost:3000", "https://app.example.com"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_project_id_from_credentials() {
        let path = env::temp_dir().join(format!("profile-store-creds-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"type":"service_account","project_id":"demo-project","client_email":"x@demo-project.iam.gserviceaccount.com"}"#,
        )
        .unwrap();

        let project_id = project_id_from_credentials(path.to_str().unwrap()).unwrap();
        assert_eq!(project_id, "demo-project");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_jwk_set() {
        let keys = load_jwk_set(concat!(env!("CARGO_MANIFEST_DIR"), "/src/services/testdata/firebase_test_jwks.json")).unwrap();
        assert!(keys.find("test-key-1").is_some());
    }

    #[test]
    fn test_missing_credentials_file() {
        let err = project_id_from_credentials("/nonexistent/firebase-admin-sdk.json").unwrap_err();
        assert!(matches!(err, ConfigError::File { .. }));
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Verified identity attached to a request by the auth middleware.
///
/// `uid` is the provider's subject identifier. Every other claim the provider
/// put in the token (`iss`, `aud`, `auth_time`, `firebase`, ...) is kept
/// untouched in `provider_fields`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub provider_fields: Map<String, Value>,
}

impl Claims {
    /// Builds claims from a decoded token payload, promoting `sub` to `uid`.
    pub fn from_token_payload(mut payload: Map<String, Value>) -> Option<Self> {
        let uid = payload.get("sub")?.as_str()?.to_string();
        let email = payload.get("email").and_then(Value::as_str).map(str::to_string);
        if email.is_some() {
            payload.remove("email");
        }

        Some(Self {
            uid,
            email,
            provider_fields: payload,
        })
    }
}

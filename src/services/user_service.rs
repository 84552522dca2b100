use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    database::UserStore,
    models::{document_to_json, Claims, UserDocument},
    utils::AppError,
};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StoreUserResponse {
    pub message: String,
}

/// Parses a request body into the flat field map clients are allowed to send.
pub fn parse_profile_fields(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(AppError::InvalidData(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(AppError::InvalidData(e.to_string())),
    }
}

/// Merges `fields` into the caller's profile, creating it on first write.
pub async fn store_user(
    store: &dyn UserStore,
    claims: &Claims,
    fields: Map<String, Value>,
) -> Result<StoreUserResponse, AppError> {
    let email = claims
        .email
        .clone()
        .ok_or_else(|| AppError::MissingField("email".to_string()))?;

    let document = UserDocument::new(claims.uid.clone(), email, fields)
        .into_bson()
        .map_err(|e| AppError::InvalidData(e.to_string()))?;

    store
        .upsert_user(&claims.uid, document)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(StoreUserResponse {
        message: "User data stored successfully.".to_string(),
    })
}

/// Returns the caller's stored profile as JSON.
pub async fn get_user(store: &dyn UserStore, claims: &Claims) -> Result<Value, AppError> {
    let document = store
        .find_user(&claims.uid)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or(AppError::NotFound)?;

    Ok(document_to_json(document))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

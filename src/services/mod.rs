pub mod firebase_auth;
pub mod user_service;

pub use firebase_auth::*;

//! Identity-header authentication.
//!
//! Credential handling (registration, login, token issuance) is terminated by the upstream authentication
//! gateway. What reaches this server is the already-resolved actor, forwarded as three headers:
//!
//! * `fg-user-id` — the authenticated user's id
//! * `fg-user-role` — `FARMER` or `BUYER`
//! * `fg-auth-signature` — base64 HMAC-SHA256 over `"<id>:<role>"` using the shared `FG_AUTH_SECRET`
//!
//! [`AuthenticatedActor`] verifies the signature and hands handlers a plain [`Actor`]. Handlers never see
//! credentials.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use farmgate_engine::db_types::{Actor, Role};
use hmac::{Hmac, Mac};
use log::debug;
use sha2::Sha256;
use thiserror::Error;

use crate::{config::AuthConfig, errors::ServerError};

pub const USER_ID_HEADER: &str = "fg-user-id";
pub const ROLE_HEADER: &str = "fg-user-role";
pub const SIGNATURE_HEADER: &str = "fg-auth-signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Identity headers missing or unreadable.")]
    MissingHeaders,
    #[error("Identity signature is invalid.")]
    InvalidSignature,
    #[error("Identity headers carry an invalid user id: {0}")]
    InvalidUserId(String),
    #[error("Identity headers carry an invalid role: {0}")]
    InvalidRole(String),
}

/// Signs the identity header payload for the given actor. The upstream gateway runs the same computation; tests
/// use this directly.
pub fn sign_identity(secret: &str, user_id: &str, role: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{user_id}:{role}").as_bytes());
    base64::encode(mac.finalize().into_bytes())
}

fn verify_identity(secret: &str, user_id: &str, role: &str, signature: &str) -> Result<(), AuthError> {
    let sig = base64::decode(signature).map_err(|_| AuthError::InvalidSignature)?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{user_id}:{role}").as_bytes());
    mac.verify_slice(&sig).map_err(|_| AuthError::InvalidSignature)
}

/// The verified caller, extracted from the identity headers.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedActor(pub Actor);

impl FromRequest for AuthenticatedActor {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_actor(req))
    }
}

fn extract_actor(req: &HttpRequest) -> Result<AuthenticatedActor, ServerError> {
    let config = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or_else(|| ServerError::InitializeError("Authentication configuration is not loaded".to_string()))?;
    let user_id = header_value(req, USER_ID_HEADER)?;
    let role = header_value(req, ROLE_HEADER)?;
    let signature = header_value(req, SIGNATURE_HEADER)?;
    verify_identity(config.hmac_secret.reveal(), user_id, role, signature).map_err(|e| {
        debug!("💻️ Rejecting request: {e}");
        e
    })?;
    let id = user_id.parse::<i64>().map_err(|_| AuthError::InvalidUserId(user_id.to_string()))?;
    let role = role.parse::<Role>().map_err(|_| AuthError::InvalidRole(role.to_string()))?;
    Ok(AuthenticatedActor(Actor::new(id, role)))
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, AuthError> {
    req.headers().get(name).and_then(|v| v.to_str().ok()).ok_or(AuthError::MissingHeaders)
}

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::auth::Session;
use crate::models::User;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Container for the authenticated user's id stored in request extensions.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Uuid);

/// Claims inside a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user's UUID as a string.
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

/// Keys and lifetime for HS256 session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    secure_cookie: bool,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
            secure_cookie: true,
        }
    }

    /// Whether the session cookie carries `Secure`. On by default.
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    /// `Set-Cookie` value carrying `token` for the session lifetime.
    pub fn cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            token,
            self.ttl.num_seconds().max(0)
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Signs a session token for `user`.
    pub fn issue(&self, user: &User) -> Result<Session, jsonwebtoken::errors::Error> {
        let expires_at = Utc::now() + self.ttl;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp: expires_at.timestamp().max(0) as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        Ok(Session {
            user_id: user.id,
            token,
            expires_at,
        })
    }

    /// Checks the signature and expiry of `token` and returns the user id.
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| debug!("Rejected session token: {}", e))
            .ok()?
            .claims;
        Uuid::parse_str(&claims.sub).ok()
    }
}

/// Middleware requiring a valid session token.
///
/// The token is read from `Authorization: Bearer` or the session cookie.
/// On success the request is forwarded with a [`CurrentUser`] extension;
/// otherwise a `401` is returned.
pub async fn require_session(
    State(keys): State<SessionKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id = session_token(req.headers())
        .and_then(|token| keys.verify(token))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(CurrentUser(user_id));

    Ok(next.run(req).await)
}

fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

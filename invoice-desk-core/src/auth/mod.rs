//! Identity subsystem: credential sign-in and session tokens.

pub mod credentials;
pub mod session;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::SignInError;
use crate::validation::RawForm;

pub use credentials::{validate_credentials, CredentialsProvider, PgUserDirectory, UserDirectory};
pub use session::{require_session, Claims, CurrentUser, SessionKeys, SESSION_COOKIE};

/// An established session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    /// Signed token to hand back to the client
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Verifies a credential payload using a named strategy.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Signs in with `strategy` (for example `"credentials"`).
    ///
    /// Recognized failures come back as [`SignInError::Auth`]; anything
    /// else is [`SignInError::Unexpected`].
    async fn sign_in(&self, strategy: &str, payload: &RawForm) -> Result<Session, SignInError>;
}

use std::sync::OnceLock;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::{IdentityProvider, Session, SessionKeys};
use crate::error::{AuthError, AuthErrorKind, SignInError};
use crate::models::{Credentials, User};
use crate::validation::RawForm;

/// Strategy name handled by [`CredentialsProvider`].
pub const CREDENTIALS_STRATEGY: &str = "credentials";

pub const MIN_PASSWORD_LEN: usize = 6;

// Verified against when the account does not exist, so unknown emails cost
// the same bcrypt work as a wrong password.
const DUMMY_PASSWORD: &str = "not-a-real-password";

/// Lookup of sign-in accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;
}

/// [`UserDirectory`] over the `users` table.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or replaces an account. `password_hash` must be a bcrypt hash.
    pub async fn upsert(&self, name: &str, email: &str, password_hash: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name, password = EXCLUDED.password
            RETURNING id, name, email, password
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

/// Email/password sign-in against a [`UserDirectory`] with bcrypt hashes.
pub struct CredentialsProvider<D> {
    users: D,
    keys: SessionKeys,
    hash_cost: u32,
    dummy_hash: OnceLock<String>,
}

impl<D: UserDirectory> CredentialsProvider<D> {
    pub fn new(users: D, keys: SessionKeys) -> Self {
        Self {
            users,
            keys,
            hash_cost: bcrypt::DEFAULT_COST,
            dummy_hash: OnceLock::new(),
        }
    }

    /// bcrypt cost of the stored hashes, used for the unknown-account check.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn burn_verify(&self, password: &str) {
        let hash = self.dummy_hash.get_or_init(|| {
            bcrypt::hash(DUMMY_PASSWORD, self.hash_cost).unwrap_or_else(|e| {
                warn!("Could not build placeholder hash: {}", e);
                String::new()
            })
        });
        let _ = bcrypt::verify(password, hash);
    }
}

#[async_trait]
impl<D: UserDirectory> IdentityProvider for CredentialsProvider<D> {
    async fn sign_in(&self, strategy: &str, payload: &RawForm) -> Result<Session, SignInError> {
        if strategy != CREDENTIALS_STRATEGY {
            return Err(AuthError::new(
                AuthErrorKind::InvalidProvider,
                format!("unknown sign-in strategy {:?}", strategy),
            )
            .into());
        }

        let credentials = parse_credentials(payload).ok_or_else(|| {
            AuthError::new(AuthErrorKind::CredentialsSignin, "malformed credentials")
        })?;

        // Directory failures are not authentication failures.
        let Some(user) = self.users.find_by_email(&credentials.email).await? else {
            self.burn_verify(&credentials.password);
            return Err(AuthError::new(AuthErrorKind::CredentialsSignin, "unknown account").into());
        };

        let matches = bcrypt::verify(&credentials.password, &user.password).map_err(|e| {
            AuthError::new(AuthErrorKind::CallbackRouteError, format!("password check failed: {}", e))
        })?;
        if !matches {
            warn!("Password mismatch for {}", user.email);
            return Err(AuthError::new(AuthErrorKind::CredentialsSignin, "password mismatch").into());
        }

        let session = self.keys.issue(&user).map_err(|e| {
            AuthError::new(AuthErrorKind::Configuration, format!("could not sign session: {}", e))
        })?;

        info!("User {} signed in", user.id);
        Ok(session)
    }
}

fn parse_credentials(payload: &RawForm) -> Option<Credentials> {
    let email = payload.get("email").and_then(Value::as_str)?;
    let password = payload.get("password").and_then(Value::as_str)?;
    validate_credentials(email, password)
}

/// Applies the sign-in rules to an email/password pair: a well-formed
/// email and a password of at least [`MIN_PASSWORD_LEN`] characters.
///
/// Accounts created outside the sign-in flow must pass the same check, or
/// they can never sign in.
pub fn validate_credentials(email: &str, password: &str) -> Option<Credentials> {
    let email = email.trim();
    if !looks_like_email(email) || password.chars().count() < MIN_PASSWORD_LEN {
        return None;
    }

    Some(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !s.chars().any(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    struct StaticDirectory(Vec<User>);

    #[async_trait]
    impl UserDirectory for StaticDirectory {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
            Ok(self.0.iter().find(|u| u.email == email).cloned())
        }
    }

    struct BrokenDirectory;

    #[async_trait]
    impl UserDirectory for BrokenDirectory {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, anyhow::Error> {
            Err(anyhow::anyhow!("pool timed out"))
        }
    }

    fn provider() -> CredentialsProvider<StaticDirectory> {
        let user = User {
            id: Uuid::new_v4(),
            name: "User".to_string(),
            email: "user@nextmail.com".to_string(),
            password: bcrypt::hash("123456", 4).unwrap(),
        };
        CredentialsProvider::new(StaticDirectory(vec![user]), SessionKeys::new("secret", 1))
            .with_hash_cost(4)
    }

    fn payload(email: &str, password: &str) -> RawForm {
        json!({ "email": email, "password": password })
            .as_object()
            .cloned()
            .unwrap()
    }

    fn kind(err: SignInError) -> AuthErrorKind {
        match err {
            SignInError::Auth(e) => e.kind,
            SignInError::Unexpected(e) => panic!("expected auth error, got {}", e),
        }
    }

    #[tokio::test]
    async fn test_valid_credentials_sign_in() {
        let session = provider()
            .sign_in(CREDENTIALS_STRATEGY, &payload("user@nextmail.com", "123456"))
            .await
            .expect("sign-in should succeed");
        assert!(!session.token.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_is_credentials_signin() {
        let err = provider()
            .sign_in(CREDENTIALS_STRATEGY, &payload("user@nextmail.com", "654321"))
            .await
            .unwrap_err();
        assert_eq!(kind(err), AuthErrorKind::CredentialsSignin);
    }

    #[tokio::test]
    async fn test_unknown_user_and_malformed_input_are_credentials_signin() {
        let p = provider();
        for form in [
            payload("nobody@nextmail.com", "123456"),
            payload("not-an-email", "123456"),
            payload("user@nextmail.com", "123"),
            RawForm::new(),
        ] {
            let err = p.sign_in(CREDENTIALS_STRATEGY, &form).await.unwrap_err();
            assert_eq!(kind(err), AuthErrorKind::CredentialsSignin);
        }
    }

    #[tokio::test]
    async fn test_unknown_account_still_runs_bcrypt() {
        let p = provider();
        assert!(p.dummy_hash.get().is_none());

        let err = p
            .sign_in(CREDENTIALS_STRATEGY, &payload("nobody@nextmail.com", "123456"))
            .await
            .unwrap_err();
        assert_eq!(kind(err), AuthErrorKind::CredentialsSignin);

        let hash = p.dummy_hash.get().expect("placeholder hash built");
        assert!(hash.starts_with("$2"));
        assert!(!bcrypt::verify("123456", hash).unwrap());
    }

    #[tokio::test]
    async fn test_known_account_skips_placeholder_hash() {
        let p = provider();
        p.sign_in(CREDENTIALS_STRATEGY, &payload("user@nextmail.com", "123456"))
            .await
            .unwrap();
        assert!(p.dummy_hash.get().is_none());
    }

    #[test]
    fn test_validate_credentials() {
        let creds = validate_credentials(" user@nextmail.com ", "123456").unwrap();
        assert_eq!(creds.email, "user@nextmail.com");
        assert!(validate_credentials("user@nextmail.com", "12345").is_none());
        assert!(validate_credentials("user", "123456").is_none());
    }

    #[tokio::test]
    async fn test_corrupt_hash_is_callback_error() {
        let user = User {
            id: Uuid::new_v4(),
            name: "User".to_string(),
            email: "user@nextmail.com".to_string(),
            password: "not-a-bcrypt-hash".to_string(),
        };
        let p = CredentialsProvider::new(StaticDirectory(vec![user]), SessionKeys::new("secret", 1));
        let err = p
            .sign_in(CREDENTIALS_STRATEGY, &payload("user@nextmail.com", "123456"))
            .await
            .unwrap_err();
        assert_eq!(kind(err), AuthErrorKind::CallbackRouteError);
    }

    #[tokio::test]
    async fn test_unknown_strategy_is_invalid_provider() {
        let err = provider()
            .sign_in("github", &payload("user@nextmail.com", "123456"))
            .await
            .unwrap_err();
        assert_eq!(kind(err), AuthErrorKind::InvalidProvider);
    }

    #[tokio::test]
    async fn test_directory_failure_is_unexpected() {
        let p = CredentialsProvider::new(BrokenDirectory, SessionKeys::new("secret", 1));
        let err = p
            .sign_in(CREDENTIALS_STRATEGY, &payload("user@nextmail.com", "123456"))
            .await
            .unwrap_err();
        assert!(matches!(err, SignInError::Unexpected(_)));
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("user@nextmail.com"));
        assert!(!looks_like_email("user@nextmail"));
        assert!(!looks_like_email("@nextmail.com"));
        assert!(!looks_like_email("a b@nextmail.com"));
        assert!(!looks_like_email("a@b@c.com"));
    }
}

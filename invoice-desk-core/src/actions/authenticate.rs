use tracing::warn;

use crate::auth::credentials::CREDENTIALS_STRATEGY;
use crate::auth::{IdentityProvider, Session};
use crate::effects::DASHBOARD_PATH;
use crate::error::{AuthErrorKind, SignInError};
use crate::validation::RawForm;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials.";
pub const SIGN_IN_FAILED_MESSAGE: &str = "Something went wrong.";

/// Result of a sign-in attempt that did not hit an unexpected failure.
#[derive(Debug, Clone)]
pub enum SignInOutcome {
    SignedIn {
        session: Session,
        redirect_to: &'static str,
    },
    Rejected(&'static str),
}

/// Signs in with the credentials strategy.
///
/// Recognized authentication failures become a form message. Any other
/// failure is returned as `Err` for the caller's error boundary.
pub async fn authenticate(
    identity: &dyn IdentityProvider,
    form: &RawForm,
) -> Result<SignInOutcome, anyhow::Error> {
    match identity.sign_in(CREDENTIALS_STRATEGY, form).await {
        Ok(session) => Ok(SignInOutcome::SignedIn {
            session,
            redirect_to: DASHBOARD_PATH,
        }),
        Err(SignInError::Auth(err)) => {
            warn!("Sign-in rejected: {}", err);
            Ok(SignInOutcome::Rejected(rejection_message(err.kind)))
        }
        Err(SignInError::Unexpected(err)) => Err(err),
    }
}

fn rejection_message(kind: AuthErrorKind) -> &'static str {
    match kind {
        AuthErrorKind::CredentialsSignin => INVALID_CREDENTIALS_MESSAGE,
        _ => SIGN_IN_FAILED_MESSAGE,
    }
}

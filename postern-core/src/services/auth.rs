//! Authentication boundary.
//!
//! Credentials pass through to an external identity provider; this gateway
//! only rate-limits the attempts, checks the shapes that are avoidable
//! locally, and forwards an opaque CAPTCHA token when the caller has one.
//! Credential verdicts, session issuance, and verification emails all
//! belong to the provider.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AuthError, Error};
use crate::password::{PasswordScore, score_password};
use crate::services::rate_limit::RateLimiter;
use crate::store::KeyValueStore;
use crate::validation::{validate_email, validate_password};

/// Rate-limit identifier shared by sign-up attempts.
pub const SIGN_UP_IDENTIFIER: &str = "signup";

/// Rate-limit identifier shared by sign-in attempts.
pub const SIGN_IN_IDENTIFIER: &str = "signin";

/// Email/password credentials, passed through uninspected beyond shape
/// validation.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// External identity provider (the hosted auth backend).
///
/// `sign_in` returns the provider's opaque session token; this crate never
/// looks inside it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        credentials: &Credentials,
        captcha_token: Option<&str>,
    ) -> Result<(), AuthError>;

    async fn sign_in(
        &self,
        credentials: &Credentials,
        captcha_token: Option<&str>,
    ) -> Result<String, AuthError>;
}

/// Rate-limited, validated pass-through to an [`IdentityProvider`].
pub struct AuthGateway<S: KeyValueStore, P: IdentityProvider> {
    limiter: Arc<RateLimiter<S>>,
    provider: Arc<P>,
}

impl<S: KeyValueStore, P: IdentityProvider> AuthGateway<S, P> {
    pub fn new(limiter: Arc<RateLimiter<S>>, provider: Arc<P>) -> Self {
        Self { limiter, provider }
    }

    /// Create an account with the provider.
    ///
    /// Validates the email and password shape before delegating; the
    /// strength score is advisory only and never gates here.
    pub async fn sign_up(
        &self,
        credentials: &Credentials,
        captcha_token: Option<&str>,
    ) -> Result<(), Error> {
        if !self.limiter.attempt(SIGN_UP_IDENTIFIER) {
            return Err(Error::RateLimited);
        }

        validate_email(&credentials.email)?;
        validate_password(&credentials.password)?;

        self.provider.sign_up(credentials, captcha_token).await?;
        tracing::info!("Sign-up forwarded to identity provider");
        Ok(())
    }

    /// Sign in with the provider, returning its opaque session token.
    pub async fn sign_in(
        &self,
        credentials: &Credentials,
        captcha_token: Option<&str>,
    ) -> Result<String, Error> {
        if !self.limiter.attempt(SIGN_IN_IDENTIFIER) {
            return Err(Error::RateLimited);
        }

        validate_email(&credentials.email)?;

        let session = self.provider.sign_in(credentials, captcha_token).await?;
        Ok(session)
    }

    /// Advisory pre-submission strength feedback for the sign-up form.
    pub fn password_feedback(&self, password: &str) -> PasswordScore {
        score_password(password)
    }
}

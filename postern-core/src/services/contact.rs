//! Contact-form submission boundary.
//!
//! Gates a raw form behind the rate limiter and field validation, then
//! hands the sanitized `{name, email, subject, message}` payload to an
//! external relay. Mail formatting and delivery (including the
//! fixed-recipient and confirmation emails) live behind [`ContactRelay`]
//! and are not this crate's concern.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, RelayError};
use crate::sanitize::sanitize_html;
use crate::services::rate_limit::RateLimiter;
use crate::store::KeyValueStore;
use crate::validation::{validate_email, validate_text_field};

/// Identifier under which all contact submissions share one rate budget.
pub const CONTACT_RATE_IDENTIFIER: &str = "form-submission";

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_SUBJECT_LEN: usize = 200;
pub const MAX_MESSAGE_LEN: usize = 5000;

/// Raw, untrusted form input.
#[derive(Debug, Clone)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// The sanitized wire payload handed to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// External mail-relay function.
///
/// The relay owns everything past the payload: transport, formatting, the
/// notification and confirmation emails. Failures surface as message
/// strings for user-facing feedback.
#[async_trait]
pub trait ContactRelay: Send + Sync {
    async fn deliver(&self, message: &ContactMessage) -> Result<(), RelayError>;
}

/// Validates, sanitizes, and relays contact submissions.
pub struct ContactService<S: KeyValueStore, R: ContactRelay> {
    limiter: Arc<RateLimiter<S>>,
    relay: Arc<R>,
}

impl<S: KeyValueStore, R: ContactRelay> ContactService<S, R> {
    pub fn new(limiter: Arc<RateLimiter<S>>, relay: Arc<R>) -> Self {
        Self { limiter, relay }
    }

    /// Submit a contact form.
    ///
    /// The rate limiter runs first and records the attempt, so invalid
    /// submissions still consume budget. Fields are sanitized exactly once,
    /// here, before anything leaves the process.
    pub async fn submit(&self, form: &ContactForm) -> Result<(), Error> {
        if !self.limiter.attempt(CONTACT_RATE_IDENTIFIER) {
            return Err(Error::RateLimited);
        }

        validate_text_field("name", &form.name, MAX_NAME_LEN)?;
        validate_email(&form.email)?;
        validate_text_field("subject", &form.subject, MAX_SUBJECT_LEN)?;
        validate_text_field("message", &form.message, MAX_MESSAGE_LEN)?;

        let message = ContactMessage {
            name: sanitize_html(&form.name),
            email: sanitize_html(&form.email),
            subject: sanitize_html(&form.subject),
            message: sanitize_html(&form.message),
        };

        self.relay.deliver(&message).await?;
        tracing::info!(subject = %message.subject, "Contact message relayed");
        Ok(())
    }
}

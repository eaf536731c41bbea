//! Session CSRF token issuance.
//!
//! One random token per session, persisted to the session store and
//! attached to every outbound mutating request in a dedicated header. The
//! token is never rotated while it remains valid; it is regenerated only
//! when absent or malformed.

use std::sync::{Arc, Mutex};

use rand::{TryRngCore, rngs::OsRng};
use subtle::ConstantTimeEq;

use crate::store::KeyValueStore;

/// Header mutating requests carry the token in.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Store key the token is persisted under.
pub const TOKEN_STORAGE_KEY: &str = "postern.csrf_token";

const TOKEN_BYTES: usize = 16;
const TOKEN_HEX_LEN: usize = TOKEN_BYTES * 2;

/// Issues and verifies the session's CSRF token.
///
/// If the store cannot hold the token, issuance degrades to an in-memory
/// token that stays stable for this instance's lifetime; the caller never
/// sees the failure.
pub struct CsrfTokenService<S: KeyValueStore> {
    store: Arc<S>,
    cached: Mutex<Option<String>>,
}

impl<S: KeyValueStore> CsrfTokenService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cached: Mutex::new(None),
        }
    }

    /// Return the session's token, minting one if none exists.
    ///
    /// Idempotent: repeated calls in one session return the identical
    /// string. A stored value that is not 32 hex characters is treated as
    /// absent and replaced.
    pub fn ensure_token(&self) -> String {
        let mut cached = self.cached.lock().expect("csrf token mutex poisoned");

        if let Some(token) = cached.as_ref() {
            return token.clone();
        }

        if let Ok(Some(stored)) = self.store.get(TOKEN_STORAGE_KEY) {
            if is_well_formed(&stored) {
                *cached = Some(stored.clone());
                return stored;
            }
        }

        let token = generate_token();
        if let Err(e) = self.store.set(TOKEN_STORAGE_KEY, &token) {
            tracing::debug!(
                error = %e,
                "CSRF token not persisted; token is valid for this instance only"
            );
        }
        *cached = Some(token.clone());
        token
    }

    /// The header name/value pair to attach to a mutating request.
    pub fn header(&self) -> (&'static str, String) {
        (CSRF_HEADER, self.ensure_token())
    }

    /// Constant-time comparison of a presented token against the session's.
    pub fn verify(&self, presented: &str) -> bool {
        let expected = self.ensure_token();
        expected.len() == presented.len()
            && bool::from(expected.as_bytes().ct_eq(presented.as_bytes()))
    }

    /// Whether a request method needs the token. Only pure reads are
    /// exempt.
    pub fn requires_token(method: &str) -> bool {
        !matches!(
            method.to_ascii_uppercase().as_str(),
            "GET" | "HEAD" | "OPTIONS"
        )
    }
}

/// Generate a 16-byte random token, hex-encoded.
///
/// # Panics
///
/// Panics if the OS random number generator fails. This indicates a
/// critical system failure from which recovery is not possible for
/// security-sensitive operations.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");
    hex::encode(bytes)
}

fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_HEX_LEN && token.chars().all(|c| c.is_ascii_hexdigit())
}

//! # Postern
//!
//! Postern is a form-security toolkit for session-scoped web frontends. It
//! bundles the defensive plumbing a public-facing site needs around its
//! forms (sliding-window rate limiting, automation heuristics, password
//! strength feedback, input sanitization, CSRF token issuance, visit
//! tracking, and a content-security-policy declaration) behind injected
//! storage, clock, and environment capabilities so every piece is
//! deterministic under test and swappable in production.
//!
//! The external collaborators (the mail relay behind the contact form, the
//! hosted identity provider behind the auth forms, the CAPTCHA widget) stay
//! external: Postern gates and shapes what reaches them and passes their
//! results through.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use postern::{MemoryStore, Postern};
//!
//! let postern = Postern::new(Arc::new(MemoryStore::new()));
//!
//! // One token per session, attached to mutating requests
//! let token = postern.csrf_token();
//! assert_eq!(token.len(), 32);
//!
//! // Shared attempt budget for the auth forms
//! assert!(postern.auth_limiter().attempt("signin"));
//! ```
use std::sync::Arc;

use chrono::Duration;

/// Re-export core types from postern_core
///
/// These types are commonly used when working with the Postern API.
pub use postern_core::clock::{Clock, ManualClock, SystemClock};
pub use postern_core::csp::{CSP_HEADER, CspPolicy, CspViolation, report_violation};
pub use postern_core::environment::{EnvironmentInfo, StaticEnvironment};
pub use postern_core::error::{AuthError, Error, RelayError, StorageError, ValidationError};
pub use postern_core::password::{PasswordScore, StrengthTier, score_password};
pub use postern_core::sanitize::sanitize_html;
pub use postern_core::services::auth::{
    AuthGateway, Credentials, IdentityProvider, SIGN_IN_IDENTIFIER, SIGN_UP_IDENTIFIER,
};
pub use postern_core::services::bot::{BotDetectionConfig, BotDetector, BotSignals};
pub use postern_core::services::contact::{
    CONTACT_RATE_IDENTIFIER, ContactForm, ContactMessage, ContactRelay, ContactService,
};
pub use postern_core::services::csrf::{CSRF_HEADER, CsrfTokenService};
pub use postern_core::services::rate_limit::{RateLimitConfig, RateLimiter};
pub use postern_core::services::visit::{DeviceInfo, VisitSummary, VisitTracker};
pub use postern_core::store::{KeyValueStore, MemoryStore};
pub use postern_core::validation::{validate_email, validate_password, validate_text_field};

/// Configuration for a [`Postern`] instance.
///
/// Defaults match the hosting site's historical limits: 5 auth attempts per
/// minute, 3 contact submissions per 5 minutes, the stock automation
/// heuristics, and a same-origin-only security policy.
pub struct PosternConfig {
    /// Limit shared by the sign-in and sign-up forms.
    pub auth_rate_limit: RateLimitConfig,
    /// Limit for contact-form submissions.
    pub contact_rate_limit: RateLimitConfig,
    /// Automation-heuristic tuning.
    pub bot_detection: BotDetectionConfig,
    /// Origins allowed by the security policy beyond `'self'`.
    pub allowed_origins: Vec<String>,
}

impl Default for PosternConfig {
    fn default() -> Self {
        Self {
            auth_rate_limit: RateLimitConfig::new(5, Duration::seconds(60))
                .with_storage_key("postern.auth_attempts"),
            contact_rate_limit: RateLimitConfig::new(3, Duration::minutes(5))
                .with_storage_key("postern.contact_attempts"),
            bot_detection: BotDetectionConfig::default(),
            allowed_origins: Vec::new(),
        }
    }
}

impl PosternConfig {
    /// Allow an origin in the security policy.
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origins.push(origin.into());
        self
    }
}

/// The main coordinator that wires storage, time, and configuration into
/// the form-security services.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use postern::{MemoryStore, Postern, PosternConfig, StaticEnvironment};
///
/// let config = PosternConfig::default().allow_origin("https://api.example.com");
/// let postern = Postern::with_config(Arc::new(MemoryStore::new()), config);
///
/// let summary = postern.record_visit();
/// assert_eq!(summary.visit_count, 1);
///
/// let env = StaticEnvironment::interactive("Mozilla/5.0");
/// let _suspicious = postern.detect_bot(&env);
/// ```
pub struct Postern<S: KeyValueStore> {
    store: Arc<S>,
    auth_limiter: Arc<RateLimiter<S>>,
    contact_limiter: Arc<RateLimiter<S>>,
    csrf: CsrfTokenService<S>,
    bot_detector: BotDetector,
    visits: VisitTracker<S>,
    csp: CspPolicy,
}

impl<S: KeyValueStore> Postern<S> {
    /// Create an instance with default configuration and the wall clock.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, PosternConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: PosternConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    /// Create an instance over an explicit clock (tests, replays).
    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>, config: PosternConfig) -> Self {
        let auth_limiter = Arc::new(RateLimiter::new(
            config.auth_rate_limit,
            store.clone(),
            clock.clone(),
        ));
        let contact_limiter = Arc::new(RateLimiter::new(
            config.contact_rate_limit,
            store.clone(),
            clock.clone(),
        ));
        let csrf = CsrfTokenService::new(store.clone());
        let bot_detector = BotDetector::new(config.bot_detection, clock.clone());
        let visits = VisitTracker::new(store.clone(), clock);
        let csp = CspPolicy::new(config.allowed_origins);

        Self {
            store,
            auth_limiter,
            contact_limiter,
            csrf,
            bot_detector,
            visits,
            csp,
        }
    }

    pub fn store(&self) -> Arc<S> {
        self.store.clone()
    }

    /// The rate limiter shared by the auth forms.
    pub fn auth_limiter(&self) -> &RateLimiter<S> {
        &self.auth_limiter
    }

    /// The rate limiter for contact submissions.
    pub fn contact_limiter(&self) -> &RateLimiter<S> {
        &self.contact_limiter
    }

    pub fn csrf(&self) -> &CsrfTokenService<S> {
        &self.csrf
    }

    /// The session's CSRF token (minted on first use).
    pub fn csrf_token(&self) -> String {
        self.csrf.ensure_token()
    }

    pub fn bot_detector(&self) -> &BotDetector {
        &self.bot_detector
    }

    /// Advisory automation verdict for an environment snapshot.
    pub fn detect_bot(&self, env: &dyn EnvironmentInfo) -> bool {
        self.bot_detector.detect(env)
    }

    pub fn visits(&self) -> &VisitTracker<S> {
        &self.visits
    }

    /// Record a visit in the session store.
    pub fn record_visit(&self) -> VisitSummary {
        self.visits.record_visit()
    }

    pub fn csp(&self) -> &CspPolicy {
        &self.csp
    }

    /// The `Content-Security-Policy` header pair for the hosting pages.
    pub fn csp_header(&self) -> (&'static str, String) {
        self.csp.header()
    }

    /// Advisory strength feedback for a candidate password.
    pub fn password_feedback(&self, password: &str) -> PasswordScore {
        score_password(password)
    }

    /// A contact service sharing this instance's contact limiter.
    pub fn contact_service<R: ContactRelay>(&self, relay: Arc<R>) -> ContactService<S, R> {
        ContactService::new(self.contact_limiter.clone(), relay)
    }

    /// An auth gateway sharing this instance's auth limiter.
    pub fn auth_gateway<P: IdentityProvider>(&self, provider: Arc<P>) -> AuthGateway<S, P> {
        AuthGateway::new(self.auth_limiter.clone(), provider)
    }
}

//! Service layer for the form-security toolkit
//!
//! This module contains the stateful services: each one owns its
//! configuration and reaches storage and time only through the injected
//! capability traits.

pub mod auth;
pub mod bot;
pub mod contact;
pub mod csrf;
pub mod rate_limit;
pub mod visit;

pub use auth::{AuthGateway, Credentials, IdentityProvider};
pub use bot::{BotDetectionConfig, BotDetector, BotSignals};
pub use contact::{ContactForm, ContactMessage, ContactRelay, ContactService};
pub use csrf::CsrfTokenService;
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use visit::{DeviceInfo, VisitSummary, VisitTracker};

//! Core functionality for the postern project
//!
//! This module contains the form-security building blocks: the sliding
//! window rate limiter, the automation heuristics, password strength
//! scoring, input sanitization, CSRF token issuance, visit tracking, and
//! the contact/auth boundaries that gate hand-offs to external
//! collaborators.
//!
//! Every service reads time through [`clock::Clock`], environment signals
//! through [`environment::EnvironmentInfo`], and storage through
//! [`store::KeyValueStore`], so backends are swappable and tests are
//! deterministic.
//!
//! The crate is designed to be composed by the `postern` facade and is not
//! usually consumed directly by application code.

pub mod clock;
pub mod csp;
pub mod environment;
pub mod error;
pub mod password;
pub mod sanitize;
pub mod services;
pub mod store;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use environment::{EnvironmentInfo, StaticEnvironment};
pub use error::Error;
pub use password::{PasswordScore, StrengthTier, score_password};
pub use sanitize::sanitize_html;
pub use store::{KeyValueStore, MemoryStore};

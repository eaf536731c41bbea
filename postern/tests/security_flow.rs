//! End-to-end flows through the facade: the wiring between the limiters,
//! the sanitizer, and the external collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use postern::{
    AuthError, ContactForm, ContactMessage, ContactRelay, Credentials, IdentityProvider,
    ManualClock, MemoryStore, Postern, PosternConfig, RelayError, StaticEnvironment,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

struct RecordingRelay {
    delivered: Mutex<Vec<ContactMessage>>,
}

impl RecordingRelay {
    fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ContactRelay for RecordingRelay {
    async fn deliver(&self, message: &ContactMessage) -> Result<(), RelayError> {
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RejectingProvider;

#[async_trait]
impl IdentityProvider for RejectingProvider {
    async fn sign_up(
        &self,
        _credentials: &Credentials,
        _captcha_token: Option<&str>,
    ) -> Result<(), AuthError> {
        Ok(())
    }

    async fn sign_in(
        &self,
        _credentials: &Credentials,
        _captcha_token: Option<&str>,
    ) -> Result<String, AuthError> {
        Err(AuthError::InvalidCredentials)
    }
}

fn postern_with_clock() -> (Postern<MemoryStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let postern = Postern::with_clock(
        Arc::new(MemoryStore::new()),
        clock.clone(),
        PosternConfig::default(),
    );
    (postern, clock)
}

fn contact_form() -> ContactForm {
    ContactForm {
        name: "Vernon".to_string(),
        email: "vernon@example.com".to_string(),
        subject: "Opening hours".to_string(),
        message: "Is the trophy building open on Sundays?".to_string(),
    }
}

#[tokio::test]
async fn contact_flow_delivers_sanitized_payload() {
    let (postern, _clock) = postern_with_clock();
    let relay = Arc::new(RecordingRelay::new());
    let contact = postern.contact_service(relay.clone());

    let form = ContactForm {
        name: "<Vernon>".to_string(),
        ..contact_form()
    };
    contact.submit(&form).await.unwrap();

    let delivered = relay.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].name, "&lt;Vernon&gt;");
    assert_eq!(delivered[0].email, "vernon@example.com");
}

#[tokio::test]
async fn contact_flow_enforces_default_limit_and_recovers() {
    init_tracing();
    let (postern, clock) = postern_with_clock();
    let relay = Arc::new(RecordingRelay::new());
    let contact = postern.contact_service(relay.clone());

    for _ in 0..3 {
        contact.submit(&contact_form()).await.unwrap();
    }
    let err = contact.submit(&contact_form()).await.unwrap_err();
    assert!(err.is_rate_limited());
    assert_eq!(relay.delivered.lock().unwrap().len(), 3);

    clock.advance(Duration::minutes(5) + Duration::seconds(1));
    contact.submit(&contact_form()).await.unwrap();
}

#[tokio::test]
async fn auth_flow_rate_limits_sign_in_independently_of_contact() {
    let (postern, _clock) = postern_with_clock();
    let relay = Arc::new(RecordingRelay::new());
    let contact = postern.contact_service(relay);
    let gateway = postern.auth_gateway(Arc::new(RejectingProvider));

    let credentials = Credentials {
        email: "fan@example.com".to_string(),
        password: "bluesuede1!".to_string(),
    };

    for _ in 0..5 {
        let err = gateway.sign_in(&credentials, None).await.unwrap_err();
        assert!(err.is_auth_error());
    }
    let err = gateway.sign_in(&credentials, None).await.unwrap_err();
    assert!(err.is_rate_limited());

    // The contact budget is untouched
    contact.submit(&contact_form()).await.unwrap();
}

#[tokio::test]
async fn csrf_token_is_stable_across_facade_reconstruction() {
    let store = Arc::new(MemoryStore::new());

    let first = Postern::new(store.clone()).csrf_token();
    let second = Postern::new(store).csrf_token();

    assert_eq!(first, second);
    assert_eq!(first.len(), 32);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn visit_tracking_and_rate_state_survive_reload() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let postern = Postern::with_clock(store.clone(), clock.clone(), PosternConfig::default());
    assert_eq!(postern.record_visit().visit_count, 1);
    assert!(postern.auth_limiter().attempt("signin"));

    // Same session, fresh page: state comes back from the store
    let reloaded = Postern::with_clock(store, clock, PosternConfig::default());
    assert_eq!(reloaded.record_visit().visit_count, 2);
    assert_eq!(reloaded.auth_limiter().remaining("signin"), 4);
}

#[test]
fn quota_exhausted_store_degrades_but_keeps_verdicts() {
    init_tracing();
    let store = Arc::new(MemoryStore::with_quota(0));
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let postern = Postern::with_clock(store, clock, PosternConfig::default());

    // Every service still works, in memory only
    let token = postern.csrf_token();
    assert_eq!(token, postern.csrf_token());
    assert_eq!(postern.record_visit().visit_count, 1);

    for _ in 0..5 {
        assert!(postern.auth_limiter().attempt("signin"));
    }
    assert!(!postern.auth_limiter().attempt("signin"));
}

#[test]
fn bot_heuristics_and_csp_compose_through_the_facade() {
    let config = PosternConfig {
        bot_detection: postern::BotDetectionConfig {
            timing_probe: false,
            ..Default::default()
        },
        ..Default::default()
    }
    .allow_origin("https://api.example.com");

    let postern = Postern::with_config(Arc::new(MemoryStore::new()), config);

    let human = StaticEnvironment::interactive("Mozilla/5.0 (X11; Linux x86_64) Firefox/121.0");
    assert!(!postern.detect_bot(&human));

    let automated = StaticEnvironment::interactive("Mozilla/5.0").with_automation_flag(true);
    assert!(postern.detect_bot(&automated));

    let (name, value) = postern.csp_header();
    assert_eq!(name, "Content-Security-Policy");
    assert!(value.contains("connect-src 'self' https://api.example.com"));
}

#[test]
fn password_feedback_matches_documented_tiers() {
    let (postern, _clock) = postern_with_clock();

    assert_eq!(postern.password_feedback("").score, 0);
    assert!(postern.password_feedback("aaaaaaaa").score < 3);
    assert!(postern.password_feedback("Tr0ub4dor&3extra!").score >= 4);
}

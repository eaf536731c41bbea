//! Content-Security-Policy declaration and violation reporting
//!
//! This module only declares policy and logs violation reports; enforcement
//! belongs to the user agent. The policy is a fixed allow-list of origins
//! expanded into the standard header value.

use serde::Deserialize;

/// Header name the policy value is served under.
pub const CSP_HEADER: &str = "Content-Security-Policy";

/// A declarative security policy built from an origin allow-list.
///
/// `default-src` is always `'self'`; the allowed origins are appended to the
/// directives that fetch remote content. Inline styles stay allowed because
/// the hosting pages rely on them.
#[derive(Debug, Clone)]
pub struct CspPolicy {
    allowed_origins: Vec<String>,
}

impl CspPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    /// Policy that allows only same-origin content.
    pub fn self_only() -> Self {
        Self {
            allowed_origins: Vec::new(),
        }
    }

    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origins.push(origin.into());
        self
    }

    /// The full `Content-Security-Policy` header value.
    pub fn header_value(&self) -> String {
        let origins = self.allowed_origins.join(" ");
        let remote = if origins.is_empty() {
            "'self'".to_string()
        } else {
            format!("'self' {origins}")
        };

        format!(
            "default-src 'self'; script-src {remote}; connect-src {remote}; \
             img-src {remote} data:; style-src 'self' 'unsafe-inline'; \
             frame-src {remote}"
        )
    }

    /// The header name/value pair.
    pub fn header(&self) -> (&'static str, String) {
        (CSP_HEADER, self.header_value())
    }
}

/// The relevant fields of a browser `csp-report` document.
#[derive(Debug, Clone, Deserialize)]
pub struct CspViolation {
    #[serde(rename = "document-uri", default)]
    pub document_uri: String,
    #[serde(rename = "violated-directive", default)]
    pub violated_directive: String,
    #[serde(rename = "blocked-uri", default)]
    pub blocked_uri: String,
}

#[derive(Debug, Deserialize)]
struct CspReportDocument {
    #[serde(rename = "csp-report")]
    report: CspViolation,
}

/// Log a violation report.
///
/// Accepts the JSON document the browser posts (`{"csp-report": {...}}`).
/// Reports are only logged; unparseable input is logged at debug level and
/// otherwise ignored.
pub fn report_violation(report_json: &str) -> Option<CspViolation> {
    match serde_json::from_str::<CspReportDocument>(report_json) {
        Ok(document) => {
            tracing::warn!(
                document_uri = %document.report.document_uri,
                violated_directive = %document.report.violated_directive,
                blocked_uri = %document.report.blocked_uri,
                "Content security policy violation reported"
            );
            Some(document.report)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Discarding unparseable CSP violation report");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_only_policy() {
        let policy = CspPolicy::self_only();
        let value = policy.header_value();
        assert!(value.starts_with("default-src 'self';"));
        assert!(value.contains("script-src 'self';"));
        assert!(value.contains("style-src 'self' 'unsafe-inline'"));
    }

    #[test]
    fn test_allowed_origins_appear_in_fetch_directives() {
        let policy = CspPolicy::self_only()
            .allow_origin("https://api.example.com")
            .allow_origin("https://cdn.example.com");
        let value = policy.header_value();

        assert!(value.contains("script-src 'self' https://api.example.com https://cdn.example.com"));
        assert!(value.contains("connect-src 'self' https://api.example.com https://cdn.example.com"));
    }

    #[test]
    fn test_header_pair() {
        let (name, value) = CspPolicy::self_only().header();
        assert_eq!(name, "Content-Security-Policy");
        assert!(!value.is_empty());
    }

    #[test]
    fn test_report_violation_parses_browser_document() {
        let report = r#"{
            "csp-report": {
                "document-uri": "https://example.com/",
                "violated-directive": "script-src",
                "blocked-uri": "https://evil.example.net/x.js"
            }
        }"#;

        let violation = report_violation(report).unwrap();
        assert_eq!(violation.violated_directive, "script-src");
        assert_eq!(violation.blocked_uri, "https://evil.example.net/x.js");
    }

    #[test]
    fn test_report_violation_swallows_garbage() {
        assert!(report_violation("not json").is_none());
        assert!(report_violation("{}").is_none());
        assert!(report_violation("").is_none());
    }

    #[test]
    fn test_report_violation_defaults_missing_fields() {
        let violation = report_violation(r#"{"csp-report": {}}"#).unwrap();
        assert_eq!(violation.document_uri, "");
    }
}

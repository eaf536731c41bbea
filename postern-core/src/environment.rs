//! Client environment signals
//!
//! The bot heuristic reads ambient facts about the client through
//! [`EnvironmentInfo`] instead of touching globals. Every accessor returns an
//! `Option`: `None` means the signal could not be read, and consumers must
//! treat an unreadable signal as not-detected rather than propagate a
//! failure.
//!
//! Server-side callers typically populate a [`StaticEnvironment`] from
//! request metadata (user agent header, client hints); embedded/webview
//! callers can implement the trait directly over their host APIs.

/// Ambient facts about the client environment.
pub trait EnvironmentInfo: Send + Sync {
    /// Whether the environment declares itself automated (e.g. a webdriver
    /// flag). `None` if the flag cannot be read.
    fn automation_flag(&self) -> Option<bool>;

    /// The environment's identification string.
    fn user_agent(&self) -> Option<String>;

    /// Number of plugins/extensions the environment enumerates.
    fn plugin_count(&self) -> Option<usize>;

    /// Number of preferred languages the environment enumerates.
    fn language_count(&self) -> Option<usize>;
}

/// A caller-populated snapshot of the client environment.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    automation_flag: Option<bool>,
    user_agent: Option<String>,
    plugin_count: Option<usize>,
    language_count: Option<usize>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot that looks like an ordinary interactive browser.
    pub fn interactive(user_agent: impl Into<String>) -> Self {
        Self {
            automation_flag: Some(false),
            user_agent: Some(user_agent.into()),
            plugin_count: Some(3),
            language_count: Some(1),
        }
    }

    pub fn with_automation_flag(mut self, flagged: bool) -> Self {
        self.automation_flag = Some(flagged);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_plugin_count(mut self, count: usize) -> Self {
        self.plugin_count = Some(count);
        self
    }

    pub fn with_language_count(mut self, count: usize) -> Self {
        self.language_count = Some(count);
        self
    }
}

impl EnvironmentInfo for StaticEnvironment {
    fn automation_flag(&self) -> Option<bool> {
        self.automation_flag
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    fn plugin_count(&self) -> Option<usize> {
        self.plugin_count
    }

    fn language_count(&self) -> Option<usize> {
        self.language_count
    }
}

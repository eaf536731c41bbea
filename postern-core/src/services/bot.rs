//! Best-effort automation heuristics.
//!
//! Combines several independent environment signals into a single advisory
//! verdict. False positives and negatives are expected; the verdict must
//! only ever feed cosmetic decisions (a different welcome message, an extra
//! logging tag), never gate a security-critical action on its own.

use std::hint::black_box;
use std::sync::Arc;

use chrono::Duration;

use crate::clock::Clock;
use crate::environment::EnvironmentInfo;

/// Identification-string fragments of common automation tools.
pub const DEFAULT_UA_BLOCKLIST: &[&str] = &[
    "bot", "crawler", "spider", "headless", "phantom", "selenium", "puppeteer",
];

/// Configuration for a [`BotDetector`].
#[derive(Debug, Clone)]
pub struct BotDetectionConfig {
    /// Lowercase substrings matched against the environment's
    /// identification string.
    pub user_agent_blocklist: Vec<String>,
    /// A probe finishing faster than this is flagged. Hardware-dependent
    /// heuristic constant; tune per deployment.
    pub timing_threshold: Duration,
    /// Iterations of CPU-bound work the probe runs. Sized to finish well
    /// under 100ms so the synchronous probe never visibly blocks.
    pub probe_work: u64,
    /// Disable to skip the probe entirely (its signal becomes `false`).
    pub timing_probe: bool,
}

impl Default for BotDetectionConfig {
    fn default() -> Self {
        Self {
            user_agent_blocklist: DEFAULT_UA_BLOCKLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timing_threshold: Duration::milliseconds(50),
            probe_work: 400_000,
            timing_probe: true,
        }
    }
}

/// The independent signals behind a verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BotSignals {
    /// The environment declares itself automated.
    pub automation_flag: bool,
    /// The identification string names a known automation tool.
    pub user_agent_match: bool,
    /// The environment enumerates no plugins.
    pub missing_plugins: bool,
    /// The environment enumerates no preferred languages.
    pub missing_languages: bool,
    /// The CPU probe finished anomalously fast.
    pub fast_probe: bool,
}

impl BotSignals {
    /// Any single positive signal marks the environment as possibly
    /// automated.
    pub fn is_suspicious(&self) -> bool {
        self.automation_flag
            || self.user_agent_match
            || self.missing_plugins
            || self.missing_languages
            || self.fast_probe
    }
}

/// Evaluates the automation heuristics against an environment snapshot.
pub struct BotDetector {
    config: BotDetectionConfig,
    clock: Arc<dyn Clock>,
}

impl BotDetector {
    pub fn new(config: BotDetectionConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &BotDetectionConfig {
        &self.config
    }

    /// Advisory verdict: `true` if any signal fires.
    pub fn detect(&self, env: &dyn EnvironmentInfo) -> bool {
        self.signals(env).is_suspicious()
    }

    /// Evaluate every signal. Each sub-check is defensive: a signal that
    /// cannot be read evaluates to not-detected instead of failing the
    /// whole check.
    pub fn signals(&self, env: &dyn EnvironmentInfo) -> BotSignals {
        let automation_flag = env.automation_flag().unwrap_or(false);

        let user_agent_match = env
            .user_agent()
            .map(|ua| {
                let ua = ua.to_lowercase();
                self.config
                    .user_agent_blocklist
                    .iter()
                    .any(|fragment| ua.contains(fragment.as_str()))
            })
            .unwrap_or(false);

        let missing_plugins = env.plugin_count().map(|n| n == 0).unwrap_or(false);
        let missing_languages = env.language_count().map(|n| n == 0).unwrap_or(false);

        let fast_probe = if self.config.timing_probe {
            self.run_probe()
        } else {
            false
        };

        BotSignals {
            automation_flag,
            user_agent_match,
            missing_plugins,
            missing_languages,
            fast_probe,
        }
    }

    /// Run a fixed amount of CPU-bound work and flag anomalously fast
    /// completion. Bounded and synchronous; returns before the verdict.
    fn run_probe(&self) -> bool {
        let start = self.clock.now();

        let mut acc = 0f64;
        for i in 0..self.config.probe_work {
            acc += black_box((i as f64).sqrt());
        }
        black_box(acc);

        let elapsed = self.clock.now() - start;
        elapsed < self.config.timing_threshold
    }
}

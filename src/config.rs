use std::time::Duration;

/// Runtime tunables for the engine's background activities.
///
/// Values resolve from the environment (via `.env` or process env) with code
/// defaults, the same way a host would configure any other deploy knob:
///
/// - `CHATLOOM_AUTOSAVE_SECS`: seconds between best-effort auto-saves
/// - `CHATLOOM_FRAME_MS`: milliseconds per animation frame slice
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowConfig {
    /// Interval between auto-save attempts.
    pub autosave_interval: Duration,
    /// Time slice for frame-based scheduled tasks (scroll animation).
    pub frame_interval: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(30),
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl FlowConfig {
    /// Resolves configuration from the environment, falling back to defaults
    /// for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            autosave_interval: env_duration_secs("CHATLOOM_AUTOSAVE_SECS")
                .unwrap_or(defaults.autosave_interval),
            frame_interval: env_duration_millis("CHATLOOM_FRAME_MS")
                .unwrap_or(defaults.frame_interval),
        }
    }

    #[must_use]
    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }

    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }
}

fn env_duration_secs(key: &str) -> Option<Duration> {
    std::env::var(key).ok()?.parse().ok().map(Duration::from_secs)
}

fn env_duration_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()?
        .parse()
        .ok()
        .map(Duration::from_millis)
}

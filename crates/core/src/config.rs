use std::time::Duration;

use crate::constants::{
    DEFAULT_BANNER_TEXT, DEFAULT_CONTROL_COOLDOWN_MS, DEFAULT_FADE_MS, DEFAULT_FEED_POLL_ATTEMPTS,
    DEFAULT_FEED_POLL_INTERVAL_MS,
};
use crate::ApplyMode;

/// Pipeline configuration, passed in at construction. No environment
/// variables are consulted anywhere in the workspace.
#[derive(Debug, Clone)]
pub struct ModeratorConfig {
    pub mode: ApplyMode,
    pub banner_text: String,
    /// Fade duration before `ApplyMode::Remove` detaches the element.
    pub fade: Duration,
    /// Cooldown before a failed manual report resets to retryable.
    pub control_cooldown: Duration,
    pub feed_poll: FeedPollConfig,
}

impl Default for ModeratorConfig {
    fn default() -> Self {
        Self {
            mode: ApplyMode::Collapse,
            banner_text: DEFAULT_BANNER_TEXT.to_owned(),
            fade: Duration::from_millis(DEFAULT_FADE_MS),
            control_cooldown: Duration::from_millis(DEFAULT_CONTROL_COOLDOWN_MS),
            feed_poll: FeedPollConfig::default(),
        }
    }
}

/// Startup polling for a feed that has not rendered yet.
#[derive(Debug, Clone)]
pub struct FeedPollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for FeedPollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_FEED_POLL_ATTEMPTS,
            interval: Duration::from_millis(DEFAULT_FEED_POLL_INTERVAL_MS),
        }
    }
}

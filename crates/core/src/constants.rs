//! Shared constants for quietfeed.
//!
//! Centralizes defaults that would otherwise be duplicated across crates.

/// Banner text shown in place of a collapsed post.
pub const DEFAULT_BANNER_TEXT: &str =
    "This post was flagged as potentially political by the community";

/// Fade duration before a removal detaches the element, in milliseconds.
pub const DEFAULT_FADE_MS: u64 = 300;

/// How long the manual report control shows its failure indicator before
/// re-enabling retry, in milliseconds.
pub const DEFAULT_CONTROL_COOLDOWN_MS: u64 = 2000;

/// Startup feed polling: attempts before giving up for this navigation.
pub const DEFAULT_FEED_POLL_ATTEMPTS: u32 = 20;

/// Startup feed polling: interval between attempts, in milliseconds.
pub const DEFAULT_FEED_POLL_INTERVAL_MS: u64 = 1000;

/// Capacity of a host document's broadcast event channel. Scans are
/// idempotent, so a lagged receiver just rescans; the capacity only
/// bounds memory during mutation storms.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

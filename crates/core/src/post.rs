use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Permalink paths look like `/user/status/1234567890`; the numeric token
/// is the stable post identity.
static STATUS_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/status/(\d+)").expect("status permalink regex"));

/// Opaque token identifying a feed post, extracted from its permalink.
///
/// Stable across re-renders of the same post, so it is the only identity
/// the pipeline ever caches; element handles are re-derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract a `PostId` from a permalink href.
    ///
    /// Returns `None` for hrefs without a `/status/{digits}` segment.
    /// Many rendered containers are non-post chrome, so this is the
    /// expected miss, not an error.
    #[must_use]
    pub fn from_permalink(href: &str) -> Option<Self> {
        STATUS_SEGMENT
            .captures(href)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_owned()))
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_permalink_plain() {
        let id = PostId::from_permalink("/someuser/status/1234567890");
        assert_eq!(id, Some(PostId::from("1234567890")));
    }

    #[test]
    fn test_from_permalink_with_suffix() {
        let id = PostId::from_permalink("/someuser/status/42/photo/1");
        assert_eq!(id, Some(PostId::from("42")));
    }

    #[test]
    fn test_from_permalink_absolute_url() {
        let id = PostId::from_permalink("https://example.com/u/status/987");
        assert_eq!(id, Some(PostId::from("987")));
    }

    #[test]
    fn test_from_permalink_miss() {
        assert_eq!(PostId::from_permalink("/someuser/likes"), None);
        assert_eq!(PostId::from_permalink("/status/abc"), None);
        assert_eq!(PostId::from_permalink(""), None);
    }

    #[test]
    fn test_serde_transparent() {
        let id = PostId::from("77");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"77\"");
        let back: PostId = serde_json::from_str("\"77\"").unwrap();
        assert_eq!(back, id);
    }
}

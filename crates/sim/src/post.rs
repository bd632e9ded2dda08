use quietfeed_core::{ControlState, Marker};

/// Region types a rendered post is composed of.
///
/// Everything except the author line is hidden by a collapse, matching
/// what host feeds render inside a post container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    UserName,
    BodyText,
    Photo,
    Video,
    Card,
    SocialContext,
    QuotedPost,
    NestedPost,
}

impl RegionKind {
    /// Whether a collapse hides this region.
    #[must_use]
    pub fn hidden_by_collapse(self) -> bool {
        !matches!(self, Self::UserName)
    }

    /// The region set of an ordinary text post with a photo.
    #[must_use]
    pub fn standard() -> Vec<Self> {
        vec![Self::UserName, Self::BodyText, Self::Photo, Self::SocialContext]
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SimRegion {
    pub key: u64,
    pub kind: RegionKind,
    pub hidden: bool,
}

/// Presentation state captured before a collapse, restored verbatim on
/// reveal.
#[derive(Debug, Clone)]
pub(crate) struct PostSnapshot {
    pub regions: Vec<SimRegion>,
    pub banner: Option<String>,
}

#[derive(Debug)]
pub(crate) struct SimPost {
    pub permalink: String,
    pub regions: Vec<SimRegion>,
    pub banner: Option<String>,
    pub marker: Option<Marker>,
    pub control: Option<ControlState>,
    pub faded: bool,
    pub detached: bool,
    pub snapshot: Option<PostSnapshot>,
}

impl SimPost {
    pub fn new(permalink: &str, kinds: &[RegionKind], next_key: &mut u64) -> Self {
        let regions = kinds
            .iter()
            .map(|&kind| {
                let key = *next_key;
                *next_key += 1;
                SimRegion { key, kind, hidden: false }
            })
            .collect();
        Self {
            permalink: permalink.to_owned(),
            regions,
            banner: None,
            marker: None,
            control: None,
            faded: false,
            detached: false,
            snapshot: None,
        }
    }
}

//! Simulated feed for quietfeed
//!
//! An in-memory document that stands in for a host page: ordered post
//! containers with typed regions, non-post chrome, and a broadcast event
//! stream fed by mutation helpers. The pipeline runs against it through
//! the same [`FeedAdapter`](quietfeed_core::FeedAdapter) seam a real
//! host adapter would implement.

mod feed;
mod post;

pub use feed::{SimFeed, SimNode};
pub use post::RegionKind;

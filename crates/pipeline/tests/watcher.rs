//! Event-driven behavior: mutations, scroll, navigation, and user
//! interactions routed through the running watcher.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{build, fast_config, stored_ids, wait_until, Script};
use quietfeed_core::{ControlState, FeedPollConfig, PostId};
use quietfeed_sim::RegionKind;
use quietfeed_storage::COLLAPSED_IDS_KEY;

/// Spawn the watcher and wait until it has subscribed to the feed.
async fn start(harness: &common::Harness) -> tokio::task::JoinHandle<()> {
    let moderator = Arc::clone(&harness.moderator);
    let handle = tokio::spawn(async move { moderator.run().await });
    let feed = Arc::clone(&harness.feed);
    wait_until(move || feed.receiver_count() > 0).await;
    handle
}

#[tokio::test]
async fn test_initial_scan_processes_seeded_posts() {
    let harness = build(fast_config()).await;
    harness.feed.seed_post("/u/status/1", &RegionKind::standard());
    harness.service.script("1", Script::Verdict(true));

    let run = start(&harness).await;
    let feed = Arc::clone(&harness.feed);
    wait_until(move || feed.banner_of(&PostId::from("1")).is_some()).await;
    run.abort();
}

#[tokio::test]
async fn test_mutation_with_post_triggers_scan() {
    let harness = build(fast_config()).await;
    harness.feed.seed_post("/u/status/1", &RegionKind::standard());
    harness.service.script("2", Script::Verdict(true));

    let run = start(&harness).await;

    // New post streams in, wrapped in chrome the way hosts render cells.
    harness.feed.push_wrapped_post("/u/status/2", &RegionKind::standard());

    let feed = Arc::clone(&harness.feed);
    wait_until(move || feed.banner_of(&PostId::from("2")).is_some()).await;
    run.abort();
}

#[tokio::test]
async fn test_chrome_only_mutation_does_not_scan() {
    let harness = build(fast_config()).await;
    harness.feed.seed_post("/u/status/1", &RegionKind::standard());

    let run = start(&harness).await;
    let feed = Arc::clone(&harness.feed);
    wait_until(move || feed.control_of(&PostId::from("1")).is_some()).await;
    let lookups_after_startup = harness.service.total_lookups();

    harness.feed.push_chrome("who-to-follow");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(harness.service.total_lookups(), lookups_after_startup);
    run.abort();
}

#[tokio::test]
async fn test_scroll_triggers_scan() {
    let harness = build(fast_config()).await;
    let run = start(&harness).await;

    // Rendered without any mutation event, as virtual scrollers do.
    harness.feed.seed_post("/u/status/3", &RegionKind::standard());
    harness.service.script("3", Script::Verdict(true));
    harness.feed.scroll();

    let feed = Arc::clone(&harness.feed);
    wait_until(move || feed.banner_of(&PostId::from("3")).is_some()).await;
    run.abort();
}

#[tokio::test]
async fn test_attribute_mutation_triggers_scan() {
    let harness = build(fast_config()).await;
    let run = start(&harness).await;

    harness.feed.seed_post("/u/status/4", &RegionKind::standard());
    harness.service.script("4", Script::Verdict(true));
    harness.feed.touch_attributes();

    let feed = Arc::clone(&harness.feed);
    wait_until(move || feed.banner_of(&PostId::from("4")).is_some()).await;
    run.abort();
}

#[tokio::test]
async fn test_navigation_reinitializes_and_rescans() {
    let harness = build(fast_config()).await;
    harness.feed.seed_post("/u/status/1", &RegionKind::standard());
    harness.service.script("1", Script::Verdict(true));
    harness.service.script("2", Script::Verdict(true));

    let run = start(&harness).await;
    let feed = Arc::clone(&harness.feed);
    wait_until(move || feed.banner_of(&PostId::from("1")).is_some()).await;

    // SPA navigation: old subtree gone, new content rendered with no
    // child-list event for it.
    harness.feed.navigate();
    harness.feed.seed_post("/u/status/2", &RegionKind::standard());

    let feed = Arc::clone(&harness.feed);
    wait_until(move || feed.banner_of(&PostId::from("2")).is_some()).await;
    run.abort();
}

#[tokio::test]
async fn test_startup_gives_up_then_mutation_recovers() {
    let mut config = fast_config();
    config.feed_poll = FeedPollConfig { max_attempts: 2, interval: Duration::from_millis(5) };
    let harness = build(config).await;
    harness.service.script("6", Script::Verdict(true));

    // Empty feed; startup polling exhausts its attempts.
    let run = start(&harness).await;
    tokio::time::sleep(Duration::from_millis(40)).await;

    // A late-arriving post still gets processed via the mutation path.
    harness.feed.push_post("/u/status/6", &RegionKind::standard());
    let feed = Arc::clone(&harness.feed);
    wait_until(move || feed.banner_of(&PostId::from("6")).is_some()).await;
    run.abort();
}

#[tokio::test]
async fn test_reveal_event_restores_post() {
    let harness = build(fast_config()).await;
    harness.feed.seed_post("/u/status/1", &RegionKind::standard());
    harness.service.script("1", Script::Verdict(true));

    let run = start(&harness).await;
    let feed = Arc::clone(&harness.feed);
    let id = PostId::from("1");
    wait_until(move || feed.banner_of(&PostId::from("1")).is_some()).await;

    harness.feed.click_reveal(&id);

    let feed = Arc::clone(&harness.feed);
    wait_until(move || feed.banner_of(&PostId::from("1")).is_none()).await;
    // Durable decision untouched by the reveal.
    assert_eq!(stored_ids(&harness.store, COLLAPSED_IDS_KEY).await, vec!["1"]);
    run.abort();
}

#[tokio::test]
async fn test_report_event_submits_and_collapses() {
    let harness = build(fast_config()).await;
    harness.feed.seed_post("/u/status/2", &RegionKind::standard());
    harness.service.script("2", Script::Verdict(false));

    let run = start(&harness).await;
    let feed = Arc::clone(&harness.feed);
    let id = PostId::from("2");
    wait_until(move || feed.control_of(&PostId::from("2")) == Some(ControlState::Idle)).await;

    harness.feed.click_report(&id);

    let feed = Arc::clone(&harness.feed);
    wait_until(move || feed.banner_of(&PostId::from("2")).is_some()).await;
    assert_eq!(harness.service.report_count("2"), 1);
    assert_eq!(stored_ids(&harness.store, COLLAPSED_IDS_KEY).await, vec!["2"]);
    run.abort();
}

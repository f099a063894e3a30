//! Twitter importer pagination and watermark behavior against scripted pages.

use std::time::Duration;

use community_jobs::testing::{status, statuses, twitter_page, MemoryStore, ScriptedTwitter};
use community_jobs::twitter::{import_tweets, to_record, TwitterImportOptions};
use community_jobs::JobError;

fn options(catch_up: bool) -> TwitterImportOptions {
    TwitterImportOptions {
        page_pause: Duration::ZERO,
        backoff_padding: Duration::ZERO,
        ..TwitterImportOptions::new("neo4j", catch_up)
    }
}

#[tokio::test]
async fn full_page_then_partial_page_means_two_merges() {
    let source = ScriptedTwitter::new(vec![
        twitter_page(statuses(1, 100), None),
        twitter_page(statuses(101, 37), None),
    ]);
    let store = MemoryStore::new();

    let stats = import_tweets(&source, &store, &options(true)).await.unwrap();

    assert_eq!(store.tweet_merges(), vec![100, 37]);
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.pages_merged, 2);
    assert_eq!(stats.tweets, 137);
    assert_eq!(store.tweet_count(), 137);
}

#[tokio::test]
async fn catch_up_rereads_the_watermark_before_every_request() {
    let source = ScriptedTwitter::new(vec![
        twitter_page(statuses(1_000, 100), None),
        twitter_page(vec![], None),
    ]);
    let store = MemoryStore::new().with_tweet(to_record(&status(500, "graphfan", &[])));

    import_tweets(&source, &store, &options(true)).await.unwrap();

    let calls = source.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].since_id, Some(500));
    assert_eq!(calls[1].since_id, Some(1_099));
    assert!(calls.iter().all(|c| c.max_id.is_none()));
}

#[tokio::test]
async fn empty_first_page_merges_nothing() {
    let source = ScriptedTwitter::new(vec![twitter_page(vec![], None)]);
    let store = MemoryStore::new();

    let stats = import_tweets(&source, &store, &options(true)).await.unwrap();

    assert_eq!(stats.requests, 1);
    assert!(store.tweet_merges().is_empty());
}

#[tokio::test]
async fn history_mode_walks_back_through_next_results() {
    let source = ScriptedTwitter::new(vec![
        twitter_page(statuses(900, 100), Some(899)),
        twitter_page(statuses(700, 100), None),
        twitter_page(statuses(500, 100), None),
    ]);
    let store = MemoryStore::new().with_tweet(to_record(&status(5_000, "graphfan", &[])));

    let stats = import_tweets(&source, &store, &options(false)).await.unwrap();

    let calls = source.calls();
    assert_eq!(stats.requests, 2);
    assert_eq!(calls[0].max_id, None);
    assert_eq!(calls[1].max_id, Some(899));
    assert!(calls.iter().all(|c| c.since_id.is_none()));
}

#[tokio::test]
async fn backoff_hint_does_not_stop_pagination() {
    let mut first = twitter_page(statuses(1, 100), None);
    first.backoff = Some(0);
    let source = ScriptedTwitter::new(vec![first, twitter_page(statuses(101, 3), None)]);
    let store = MemoryStore::new();

    let stats = import_tweets(&source, &store, &options(true)).await.unwrap();

    assert_eq!(stats.pages_merged, 2);
}

#[tokio::test]
async fn page_limit_caps_requests() {
    let source = ScriptedTwitter::new((0..5).map(|i| twitter_page(statuses(i * 10, 10), None)).collect());
    let store = MemoryStore::new();
    let opts = TwitterImportOptions {
        max_pages: 3,
        count: 10,
        ..options(true)
    };

    let stats = import_tweets(&source, &store, &opts).await.unwrap();

    assert_eq!(stats.requests, 3);
    assert_eq!(store.tweet_merges(), vec![10, 10, 10]);
}

#[tokio::test]
async fn short_expanded_urls_become_short_links() {
    let source = ScriptedTwitter::new(vec![twitter_page(
        vec![status(1, "graphfan", &["https://bit.ly/abc", "https://example.com/articles/graphs"])],
        None,
    )]);
    let store = MemoryStore::new();

    import_tweets(&source, &store, &options(true)).await.unwrap();

    assert!(store.link("https://bit.ly/abc").unwrap().short);
    assert!(!store.link("https://example.com/articles/graphs").unwrap().short);
}

#[tokio::test]
async fn failed_request_stops_the_run_and_keeps_earlier_pages() {
    let source = ScriptedTwitter::new(vec![twitter_page(statuses(1, 100), None)])
        .then_fail(JobError::Upstream("Twitter API error 503".to_string()));
    let store = MemoryStore::new();

    let err = import_tweets(&source, &store, &options(true)).await.unwrap_err();

    assert!(matches!(err, JobError::Upstream(_)));
    assert_eq!(store.tweet_merges(), vec![100]);
    assert_eq!(source.calls().len(), 2);
    assert_eq!(store.tweet_count(), 100);
}

//! The three link passes over an in-memory graph.

use community_jobs::links::{clean_links, hydrate_links, unshorten_links, NO_TITLE};
use community_jobs::testing::{FakeWeb, MemoryStore};
use community_jobs::FetchFailure;

#[tokio::test]
async fn clean_strips_tracking_and_keeps_other_params() {
    let store = MemoryStore::new()
        .with_link("https://example.com/a?utm_source=x&ref=1", false)
        .with_link("https://example.com/b", false);

    let updated = clean_links(&store).await.unwrap();

    assert_eq!(updated, 2);
    let a = store.link("https://example.com/a?utm_source=x&ref=1").unwrap();
    assert_eq!(a.clean_url.as_deref(), Some("https://example.com/a?ref=1"));
    let b = store.link("https://example.com/b").unwrap();
    assert_eq!(b.clean_url.as_deref(), Some("https://example.com/b"));

    // Nothing left to clean.
    assert_eq!(clean_links(&store).await.unwrap(), 0);
}

#[tokio::test]
async fn unshorten_follows_short_hops_to_the_final_target() {
    let store = MemoryStore::new().with_link("http://a.co/1", true);
    let web = FakeWeb::new()
        .redirect("http://a.co/1", "http://b.co/2")
        .redirect("http://b.co/2", "https://example.com/articles/final");

    unshorten_links(&store, &web, 1000).await.unwrap();

    let link = store.links().remove(0);
    assert_eq!(link.url, "https://example.com/articles/final");
    assert!(!link.short);
}

#[tokio::test]
async fn unshorten_clears_the_clean_url_of_changed_links() {
    let store = MemoryStore::new().with_link("http://a.co/1", true);
    clean_links(&store).await.unwrap();
    let web = FakeWeb::new().redirect("http://a.co/1", "https://example.com/articles/final");

    unshorten_links(&store, &web, 1000).await.unwrap();

    let link = store.links().remove(0);
    assert_eq!(link.clean_url, None);

    clean_links(&store).await.unwrap();
    let link = store.links().remove(0);
    assert_eq!(link.clean_url.as_deref(), Some("https://example.com/articles/final"));
}

#[tokio::test]
async fn unshorten_skips_redirect_loops() {
    let store = MemoryStore::new().with_link("http://a.co/x", true);
    let web = FakeWeb::new()
        .redirect("http://a.co/x", "http://b.co/y")
        .redirect("http://b.co/y", "http://a.co/x");

    let updated = unshorten_links(&store, &web, 1000).await.unwrap();

    assert_eq!(updated, 0);
    let link = store.links().remove(0);
    assert_eq!(link.url, "http://a.co/x");
    assert!(link.short);
}

#[tokio::test]
async fn unreachable_link_is_left_unchanged() {
    let store = MemoryStore::new()
        .with_link("http://dead.co/1", true)
        .with_link("http://ok.co/1", true);
    let web = FakeWeb::new().ok("http://ok.co/1");

    let updated = unshorten_links(&store, &web, 1000).await.unwrap();

    assert_eq!(updated, 1);
    let dead = store.link("http://dead.co/1").unwrap();
    assert!(dead.short);
    let ok = store.link("http://ok.co/1").unwrap();
    assert!(!ok.short);
}

#[tokio::test]
async fn unshorten_respects_the_batch_limit() {
    let store = MemoryStore::new()
        .with_link("http://a.co/1", true)
        .with_link("http://a.co/2", true);
    let web = FakeWeb::new().ok("http://a.co/1").ok("http://a.co/2");

    assert_eq!(unshorten_links(&store, &web, 1).await.unwrap(), 1);
    assert_eq!(store.links().iter().filter(|l| l.short).count(), 1);
}

#[tokio::test]
async fn hydrate_gives_every_link_a_title() {
    let store = MemoryStore::new()
        .with_link("https://example.com/titled", false)
        .with_link("https://example.com/untitled", false)
        .with_link("https://example.com/missing", false)
        .with_link("https://example.com/slow", false);
    let web = FakeWeb::new()
        .on_page("https://example.com/titled", "<title>Graph  Databases</title>")
        .on_page("https://example.com/untitled", "<p>no title here</p>")
        .on_failure("https://example.com/missing", FetchFailure::Status(404))
        .on_failure("https://example.com/slow", FetchFailure::Timeout("5s".to_string()));

    let processed = hydrate_links(&store, &web, 100).await.unwrap();

    assert_eq!(processed, 4);
    let titles: Vec<(String, Option<String>)> = store
        .links()
        .into_iter()
        .map(|l| (l.url, l.title))
        .collect();
    assert_eq!(
        titles,
        vec![
            ("https://example.com/titled".to_string(), Some("Graph Databases".to_string())),
            ("https://example.com/untitled".to_string(), Some(NO_TITLE.to_string())),
            ("https://example.com/missing".to_string(), Some(NO_TITLE.to_string())),
            ("https://example.com/slow".to_string(), Some(NO_TITLE.to_string())),
        ]
    );
    assert_eq!(hydrate_links(&store, &web, 100).await.unwrap(), 0);
}

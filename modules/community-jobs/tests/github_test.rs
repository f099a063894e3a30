//! GitHub importer paging over scripted GraphQL search pages.

use chrono::{Duration, TimeZone, Utc};

use community_jobs::github::{import_repositories, GithubImportOptions};
use community_jobs::testing::{github_page, repository, MemoryStore, ScriptedGithub};
use community_jobs::JobError;

fn options() -> GithubImportOptions {
    GithubImportOptions {
        search: "neo4j".to_string(),
        lookback_days: 90,
    }
}

fn repositories(first: i64, n: i64) -> Vec<github_client::Repository> {
    (first..first + n).map(|id| repository(id, "alice", 1, 0)).collect()
}

#[tokio::test]
async fn one_merge_per_page_until_the_last() {
    let source = ScriptedGithub::new(vec![
        github_page(repositories(1, 100), Some("c1")),
        github_page(repositories(101, 100), Some("c2")),
        github_page(repositories(201, 50), None),
    ]);
    let store = MemoryStore::new();

    let stats = import_repositories(&source, &store, &options(), Utc::now()).await.unwrap();

    assert_eq!(store.repository_merges(), vec![100, 100, 50]);
    assert_eq!(stats.merges, 3);
    assert_eq!(stats.repositories, 250);
    assert_eq!(
        source.cursors(),
        vec![None, Some("c1".to_string()), Some("c2".to_string())]
    );
}

#[tokio::test]
async fn empty_page_is_not_merged() {
    let source = ScriptedGithub::new(vec![
        github_page(vec![], Some("c1")),
        github_page(repositories(1, 5), None),
    ]);
    let store = MemoryStore::new();

    let stats = import_repositories(&source, &store, &options(), Utc::now()).await.unwrap();

    assert_eq!(stats.pages, 2);
    assert_eq!(store.repository_merges(), vec![5]);
}

#[tokio::test]
async fn missing_cursor_ends_paging() {
    let mut page = github_page(repositories(1, 100), Some("c1"));
    page.search.page_info.end_cursor = None;
    let source = ScriptedGithub::new(vec![page]);
    let store = MemoryStore::new();

    let stats = import_repositories(&source, &store, &options(), Utc::now()).await.unwrap();

    assert_eq!(stats.pages, 1);
}

#[tokio::test]
async fn spent_quota_with_past_reset_keeps_going() {
    let mut first = github_page(repositories(1, 100), Some("c1"));
    first.rate_limit.remaining = 0;
    let source = ScriptedGithub::new(vec![first, github_page(repositories(101, 1), None)]);
    let store = MemoryStore::new();

    let stats = import_repositories(&source, &store, &options(), Utc::now()).await.unwrap();

    assert_eq!(stats.merges, 2);
}

#[tokio::test(start_paused = true)]
async fn spent_quota_waits_until_reset() {
    let mut first = github_page(repositories(1, 100), Some("c1"));
    first.rate_limit.remaining = 0;
    first.rate_limit.reset_at = Utc::now() + Duration::seconds(3);
    let source = ScriptedGithub::new(vec![first, github_page(repositories(101, 1), None)]);
    let store = MemoryStore::new();

    let started = tokio::time::Instant::now();
    let stats = import_repositories(&source, &store, &options(), Utc::now()).await.unwrap();

    assert!(started.elapsed() >= std::time::Duration::from_secs(2));
    assert_eq!(stats.merges, 2);
    assert_eq!(source.cursors().len(), 2);
}

#[tokio::test]
async fn stars_and_forks_land_in_their_own_properties() {
    let source = ScriptedGithub::new(vec![github_page(vec![repository(7, "alice", 40, 2)], None)]);
    let store = MemoryStore::new();

    import_repositories(&source, &store, &options(), Utc::now()).await.unwrap();

    let repo = store.repository(7).unwrap();
    assert_eq!(repo.favorites, 40);
    assert_eq!(repo.forks, 2);
    assert_eq!(repo.full_name, "alice/repo-7");
    assert_eq!(repo.created_at, "2024-01-01T00:00:00Z");
    assert_eq!(repo.created, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp_millis());
    assert_eq!(repo.owner.login, "alice");
    assert_eq!(repo.owner.kind, "User");
    assert_eq!(repo.branch.as_deref(), Some("main"));
    assert_eq!(repo.language, None);
}

#[tokio::test]
async fn upstream_failure_keeps_pages_already_merged() {
    let source = ScriptedGithub::new(vec![github_page(repositories(1, 100), Some("c1"))]);
    let store = MemoryStore::new();

    let err = import_repositories(&source, &store, &options(), Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::Upstream(_)));
    assert_eq!(store.repository_merges(), vec![100]);
}

//! Summary page generation against fixed rows and an in-memory bucket.

use chrono::{Duration, TimeZone, Utc};

use community_graph::{GithubActivity, LinkScore, MeetupListing};
use community_jobs::summary::{generate_summary, SummaryOptions, CONTENT_TYPE};
use community_jobs::testing::{MemoryObjects, StaticSummary};

fn options(dir: &std::path::Path) -> SummaryOptions {
    SummaryOptions {
        bucket: "community-summary".to_string(),
        name: "weekly".to_string(),
        title: "This Week in Graphs".to_string(),
        logo_url: Some("https://example.com/logo.png".to_string()),
        core_team: vec!["neo4j".to_string()],
        own_domain: "neo4j.com".to_string(),
        output_dir: dir.to_path_buf(),
    }
}

#[tokio::test]
async fn page_is_written_and_uploaded() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 5, 8, 12, 0, 0).unwrap();
    let day = Duration::days(1).num_milliseconds();
    let store = StaticSummary::new(
        vec![GithubActivity {
            title: "graph-tool".to_string(),
            url: "https://github.com/alice/graph-tool".to_string(),
            created: now.timestamp_millis() - 30 * day,
            favorites: 40,
            updated: now.timestamp_millis() - 2 * day,
            owner: "alice".to_string(),
            created_at: "2024-04-08T12:00:00Z".to_string(),
            updated_at: "2024-05-06T12:00:00Z".to_string(),
        }],
        vec![LinkScore {
            url: "https://example.com/post".to_string(),
            title: Some("x".repeat(90)),
            score: 5,
            first_shared: now.timestamp_millis() - 3 * day,
            users: vec!["bob".to_string()],
        }],
        vec![MeetupListing {
            event_name: "Graph Night".to_string(),
            event_link: "https://www.meetup.com/graphs-london/events/1/".to_string(),
            time: now.timestamp_millis() + 2 * day,
            venue_name: Some("The Pub".to_string()),
            yes_rsvp_count: 12,
            group_name: "Graphs London".to_string(),
            group_link: "https://www.meetup.com/graphs-london/".to_string(),
        }],
    );
    let objects = MemoryObjects::new();

    let stats = generate_summary(&store, &objects, &options(dir.path()), now)
        .await
        .unwrap();

    assert_eq!(stats.path, dir.path().join("weekly.html"));
    let on_disk = std::fs::read(&stats.path).unwrap();

    let uploaded = objects.objects();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0].bucket, "community-summary");
    assert_eq!(uploaded[0].key, "weekly.html");
    assert_eq!(uploaded[0].content_type, CONTENT_TYPE);
    assert_eq!(uploaded[0].body, on_disk);

    let html = String::from_utf8(on_disk).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("This Week in Graphs"));
    assert!(html.contains("https://example.com/logo.png"));
    assert!(html.contains("graph-tool"));
    assert!(html.contains("2 days ago"));
    assert!(html.contains("in 2 days"));
    assert!(html.contains(&format!("{}..", "x".repeat(75))));
    assert!(!html.contains(&"x".repeat(76)));
    assert!(html.contains("Graph Night"));

    assert_eq!(
        store.filters(),
        Some((vec!["neo4j".to_string()], "neo4j.com".to_string()))
    );
}

#[tokio::test]
async fn empty_week_still_publishes() {
    let dir = tempfile::tempdir().unwrap();
    let store = StaticSummary::new(vec![], vec![], vec![]);
    let objects = MemoryObjects::new();

    let stats = generate_summary(&store, &objects, &options(dir.path()), Utc::now())
        .await
        .unwrap();

    assert_eq!((stats.repositories, stats.links, stats.events), (0, 0, 0));
    assert_eq!(objects.objects().len(), 1);
}

//! Integration tests for importer merges and link maintenance.
//!
//! Requirements: Docker (for Neo4j via testcontainers)
//!
//! Run with: cargo test -p community-graph --features test-utils --test writer_test

#![cfg(feature = "test-utils")]

use community_graph::migrate::migrate;
use community_graph::{
    query, GraphClient, GraphWriter, LinkRef, MeetupEventRecord, MeetupGroupRecord, Mention,
    OwnerRecord, RepositoryRecord, ResolvedLink, TweetRecord, TweetUser,
};

async fn setup() -> (impl std::any::Any, GraphClient) {
    let (container, client) = community_graph::testutil::neo4j_container().await;
    migrate(&client).await.expect("migrate");
    (container, client)
}

async fn count(client: &GraphClient, cypher: &str) -> i64 {
    let mut stream = client.inner().execute(query(cypher)).await.unwrap();
    let row = stream.next().await.unwrap().expect("row");
    row.get("n").unwrap()
}

fn tweet(id: i64, favorites: i64) -> TweetRecord {
    TweetRecord {
        id,
        text: "Modelling supply chains #Neo4j #graphs https://t.co/x".to_string(),
        created_at: "Wed Oct 10 20:19:24 +0000 2018".to_string(),
        created: Some(1_539_202_764),
        favorites,
        user: TweetUser {
            id: 6253282,
            screen_name: "graphfan".to_string(),
            name: Some("Graph Fan".to_string()),
            location: None,
            followers: 120,
            following: 80,
            statuses: 4000,
            profile_image_url: None,
        },
        hashtags: vec!["neo4j".to_string(), "graphs".to_string()],
        links: vec![LinkRef {
            url: "https://bit.ly/2x".to_string(),
            short: true,
        }],
        mentions: vec![Mention {
            id: 22467617,
            screen_name: "neo4j".to_string(),
            name: Some("Neo4j".to_string()),
        }],
        reply_to: None,
        retweet_of: Some(1_050_000_000_000_000_000),
    }
}

#[tokio::test]
async fn merging_the_same_tweet_twice_is_idempotent() {
    let (_container, client) = setup().await;
    let writer = GraphWriter::new(client.clone());

    writer.merge_tweets(&[tweet(1, 3)]).await.unwrap();
    writer.merge_tweets(&[tweet(1, 9)]).await.unwrap();

    assert_eq!(count(&client, "MATCH (t:Tweet:Content) RETURN count(t) AS n").await, 1);
    assert_eq!(count(&client, "MATCH (t:Tweet {id: 1}) RETURN t.favorites AS n").await, 9);
    assert_eq!(count(&client, "MATCH (u:User:Twitter) RETURN count(u) AS n").await, 2);
    assert_eq!(count(&client, "MATCH (t:Tag) RETURN count(t) AS n").await, 2);
    assert_eq!(count(&client, "MATCH (l:Link) RETURN count(l) AS n").await, 1);
    assert_eq!(
        count(&client, "MATCH (:Tweet {id: 1})-[r:LINKED]->() RETURN count(r) AS n").await,
        1
    );
    assert_eq!(
        count(&client, "MATCH (t:Tweet:Retweet)-[:RETWEETED]->(:Tweet) RETURN count(t) AS n").await,
        1
    );
}

#[tokio::test]
async fn watermark_ignores_placeholder_tweets() {
    let (_container, client) = setup().await;
    let writer = GraphWriter::new(client);

    assert_eq!(writer.max_tweet_id().await.unwrap(), None);

    // The retweeted original has a larger id but no payload of its own.
    writer.merge_tweets(&[tweet(42, 0)]).await.unwrap();
    assert_eq!(writer.max_tweet_id().await.unwrap(), Some(42));
}

#[tokio::test]
async fn link_passes_round_trip() {
    let (_container, client) = setup().await;
    let writer = GraphWriter::new(client.clone());
    writer.merge_tweets(&[tweet(1, 0)]).await.unwrap();

    let short = writer.short_links(1000).await.unwrap();
    assert_eq!(short.len(), 1);
    assert_eq!(short[0].url, "https://bit.ly/2x");

    let missing = writer.links_missing_clean_url().await.unwrap();
    assert_eq!(missing.len(), 1);
    writer
        .set_clean_urls(&[(missing[0].id.clone(), "https://bit.ly/2x".to_string())])
        .await
        .unwrap();
    assert!(writer.links_missing_clean_url().await.unwrap().is_empty());

    writer
        .apply_unshortened(&[ResolvedLink {
            id: short[0].id.clone(),
            url: "https://example.com/post?ref=1".to_string(),
            changed: true,
        }])
        .await
        .unwrap();
    assert!(writer.short_links(1000).await.unwrap().is_empty());
    // The stale canonical form was dropped.
    assert_eq!(writer.links_missing_clean_url().await.unwrap().len(), 1);

    let untitled = writer.links_missing_title(100).await.unwrap();
    assert_eq!(untitled[0].url, "https://example.com/post?ref=1");
    writer.set_link_title(&untitled[0].id, "A post").await.unwrap();
    assert!(writer.links_missing_title(100).await.unwrap().is_empty());
}

fn tweet_linking(id: i64, url: &str) -> TweetRecord {
    TweetRecord {
        links: vec![LinkRef {
            url: url.to_string(),
            short: false,
        }],
        retweet_of: None,
        ..tweet(id, 0)
    }
}

#[tokio::test]
async fn untitled_links_come_newest_first_within_the_limit() {
    let (_container, client) = setup().await;
    let writer = GraphWriter::new(client);

    writer
        .merge_tweets(&[tweet_linking(1, "https://example.com/older")])
        .await
        .unwrap();
    // first_seen is millisecond-grained; keep the two merges apart.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    writer
        .merge_tweets(&[tweet_linking(2, "https://example.com/newer")])
        .await
        .unwrap();

    let urls = |rows: Vec<community_graph::LinkRow>| -> Vec<String> {
        rows.into_iter().map(|r| r.url).collect()
    };
    assert_eq!(
        urls(writer.links_missing_title(1).await.unwrap()),
        vec!["https://example.com/newer"]
    );
    assert_eq!(
        urls(writer.links_missing_title(10).await.unwrap()),
        vec!["https://example.com/newer", "https://example.com/older"]
    );
}

fn repository(id: i64, stars: i64) -> RepositoryRecord {
    RepositoryRecord {
        id,
        title: format!("repo-{id}"),
        full_name: format!("alice/repo-{id}"),
        url: format!("https://github.com/alice/repo-{id}"),
        created: 1_672_531_200_000,
        created_at: "2023-01-01T00:00:00Z".to_string(),
        homepage: None,
        favorites: stars,
        forks: 1,
        watchers: 2,
        open_issues: 0,
        updated: 1_714_471_200_000,
        updated_at: "2024-04-30T10:00:00Z".to_string(),
        pushed: Some("2024-04-30T10:00:00Z".to_string()),
        size: Some(512),
        language: Some("Rust".to_string()),
        branch: Some("main".to_string()),
        description: None,
        owner: OwnerRecord {
            id: 7,
            login: "alice".to_string(),
            kind: "User".to_string(),
            full_name: Some("Alice".to_string()),
            location: None,
        },
    }
}

#[tokio::test]
async fn repositories_share_one_owner() {
    let (_container, client) = setup().await;
    let writer = GraphWriter::new(client.clone());

    let merged = writer
        .merge_repositories(&[repository(1, 10), repository(2, 20)])
        .await
        .unwrap();
    assert_eq!(merged, 2);
    writer.merge_repositories(&[repository(1, 11)]).await.unwrap();

    assert_eq!(count(&client, "MATCH (u:User:GitHub) RETURN count(u) AS n").await, 1);
    assert_eq!(
        count(&client, "MATCH (:User:GitHub)-[r:CREATED]->(:Repository) RETURN count(r) AS n").await,
        2
    );
    assert_eq!(count(&client, "MATCH (r:Repository {id: 1}) RETURN r.favorites AS n").await, 11);
}

#[tokio::test]
async fn meetup_group_with_and_without_events() {
    let (_container, client) = setup().await;
    let writer = GraphWriter::new(client.clone());

    let group = MeetupGroupRecord {
        id: 99,
        name: "Graphs London".to_string(),
        urlname: "graphs-ldn".to_string(),
        link: "https://www.meetup.com/graphs-ldn/".to_string(),
        members: 1200,
        city: Some("London".to_string()),
        country: Some("gb".to_string()),
    };
    let event = MeetupEventRecord {
        id: "qgzkltyzmbkc".to_string(),
        name: "Graph night".to_string(),
        time: 1_714_579_200_000,
        link: "https://www.meetup.com/graphs-ldn/events/qgzkltyzmbkc/".to_string(),
        status: Some("upcoming".to_string()),
        yes_rsvp_count: 42,
        venue_name: None,
        venue_city: None,
    };

    assert_eq!(writer.merge_meetup_group(&group, &[]).await.unwrap(), 0);
    assert_eq!(count(&client, "MATCH (g:Group:Meetup) RETURN count(g) AS n").await, 1);

    assert_eq!(writer.merge_meetup_group(&group, &[event.clone()]).await.unwrap(), 1);
    writer.merge_meetup_group(&group, &[event]).await.unwrap();
    assert_eq!(
        count(&client, "MATCH (:Group)-[r:CONTAINED]->(:Event:Meetup) RETURN count(r) AS n").await,
        1
    );
}

//! Meetup importer over scripted groups and events.

use chrono::{TimeZone, Utc};

use community_jobs::meetup::{import_meetups, MeetupImportOptions};
use community_jobs::testing::{event, group, MemoryStore, ScriptedMeetup};

#[tokio::test]
async fn groups_and_events_are_merged_per_group() {
    let now = Utc.with_ymd_and_hms(2024, 5, 8, 12, 0, 0).unwrap();
    let api = ScriptedMeetup::new(vec![group(1, "graphs-london"), group(2, "graphs-paris")])
        .on_events(
            "graphs-london",
            vec![event("e1", 1_715_000_000_000), event("e2", 1_716_000_000_000)],
        );
    let store = MemoryStore::new();
    let opts = MeetupImportOptions {
        topic: "neo4j".to_string(),
        lookback_days: 30,
    };

    let stats = import_meetups(&api, &store, &opts, now).await.unwrap();

    assert_eq!(stats.groups, 2);
    assert_eq!(stats.events, 2);
    assert_eq!(store.group_events(1), vec!["e1", "e2"]);
    assert!(store.group_events(2).is_empty());
    assert_eq!(store.group(2).unwrap().urlname, "graphs-paris");
    assert_eq!(
        api.windows(),
        vec!["2024-04-08T12:00:00".to_string(), "2024-04-08T12:00:00".to_string()]
    );
}

#[tokio::test]
async fn no_groups_means_no_merges() {
    let api = ScriptedMeetup::new(vec![]);
    let store = MemoryStore::new();
    let opts = MeetupImportOptions {
        topic: "neo4j".to_string(),
        lookback_days: 30,
    };

    let stats = import_meetups(&api, &store, &opts, Utc::now()).await.unwrap();

    assert_eq!(stats.groups, 0);
    assert!(api.windows().is_empty());
}

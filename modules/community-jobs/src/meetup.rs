use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use community_graph::{MeetupEventRecord, MeetupGroupRecord};
use meetup_client::{Event, Group, RateLimit};

use crate::error::Result;
use crate::traits::{GraphStore, MeetupApi};

#[derive(Debug, Clone)]
pub struct MeetupImportOptions {
    pub topic: String,
    /// Events starting earlier than this many days ago are not fetched.
    pub lookback_days: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MeetupStats {
    pub groups: u32,
    pub events: u64,
}

/// Merge every group matching the topic along with its recent and upcoming events.
pub async fn import_meetups(
    api: &impl MeetupApi,
    store: &impl GraphStore,
    opts: &MeetupImportOptions,
    now: DateTime<Utc>,
) -> Result<MeetupStats> {
    let no_earlier_than = (now - chrono::Duration::days(opts.lookback_days))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string();

    let groups = api.find_groups(&opts.topic).await?;
    info!(topic = opts.topic.as_str(), groups = groups.items.len(), "Found groups");
    wait_for_quota(&groups.rate_limit).await;

    let mut stats = MeetupStats::default();
    for group in &groups.items {
        let events = api.group_events(&group.urlname, &no_earlier_than).await?;
        let records: Vec<MeetupEventRecord> = events.items.iter().map(event_record).collect();
        stats.events += store.merge_meetup_group(&group_record(group), &records).await?;
        stats.groups += 1;
        wait_for_quota(&events.rate_limit).await;
    }

    Ok(stats)
}

async fn wait_for_quota(rate: &RateLimit) {
    if let Some(seconds) = rate.wait_seconds() {
        info!(seconds, "Meetup quota spent, waiting for reset");
        tokio::time::sleep(Duration::from_secs(seconds)).await;
    }
}

pub fn group_record(group: &Group) -> MeetupGroupRecord {
    MeetupGroupRecord {
        id: group.id,
        name: group.name.clone(),
        urlname: group.urlname.clone(),
        link: group.link.clone(),
        members: group.members,
        city: group.city.clone(),
        country: group.country.clone(),
    }
}

pub fn event_record(event: &Event) -> MeetupEventRecord {
    let venue = event.venue.as_ref();
    MeetupEventRecord {
        id: event.id.clone(),
        name: event.name.clone(),
        time: event.time,
        link: event.link.clone(),
        status: event.status.clone(),
        yes_rsvp_count: event.yes_rsvp_count,
        venue_name: venue.and_then(|v| v.name.clone()),
        venue_city: venue.and_then(|v| v.city.clone()),
    }
}

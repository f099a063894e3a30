// Seams between the jobs and the outside world.
//
// GraphStore covers every graph write, SummaryStore the summary reads,
// and the source traits the three upstream APIs. Web and ObjectStore wrap
// plain HTTP and S3. testing.rs has in-memory versions of each.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use community_graph::{
    GithubActivity, GraphWriter, LinkRow, LinkScore, MeetupEventRecord, MeetupGroupRecord,
    MeetupListing, RepositoryRecord, ResolvedLink, SummaryReader, TweetRecord,
};
use github_client::{GithubClient, SearchData};
use meetup_client::{Event, Group, MeetupClient, Page};
use twitter_client::{SearchParams, SearchResponse, TwitterClient};

use crate::error::{FetchFailure, Result};

// ---------------------------------------------------------------------------
// GraphStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn max_tweet_id(&self) -> Result<Option<i64>>;
    async fn merge_tweets(&self, tweets: &[TweetRecord]) -> Result<u64>;
    async fn merge_repositories(&self, repos: &[RepositoryRecord]) -> Result<u64>;
    async fn merge_meetup_group(
        &self,
        group: &MeetupGroupRecord,
        events: &[MeetupEventRecord],
    ) -> Result<u64>;
    async fn links_missing_clean_url(&self) -> Result<Vec<LinkRow>>;
    async fn set_clean_urls(&self, updates: &[(String, String)]) -> Result<u64>;
    async fn short_links(&self, limit: i64) -> Result<Vec<LinkRow>>;
    async fn apply_unshortened(&self, links: &[ResolvedLink]) -> Result<u64>;
    async fn links_missing_title(&self, limit: i64) -> Result<Vec<LinkRow>>;
    async fn set_link_title(&self, id: &str, title: &str) -> Result<()>;
}

#[async_trait]
impl GraphStore for GraphWriter {
    async fn max_tweet_id(&self) -> Result<Option<i64>> {
        Ok(self.max_tweet_id().await?)
    }

    async fn merge_tweets(&self, tweets: &[TweetRecord]) -> Result<u64> {
        Ok(self.merge_tweets(tweets).await?)
    }

    async fn merge_repositories(&self, repos: &[RepositoryRecord]) -> Result<u64> {
        Ok(self.merge_repositories(repos).await?)
    }

    async fn merge_meetup_group(
        &self,
        group: &MeetupGroupRecord,
        events: &[MeetupEventRecord],
    ) -> Result<u64> {
        Ok(self.merge_meetup_group(group, events).await?)
    }

    async fn links_missing_clean_url(&self) -> Result<Vec<LinkRow>> {
        Ok(self.links_missing_clean_url().await?)
    }

    async fn set_clean_urls(&self, updates: &[(String, String)]) -> Result<u64> {
        Ok(self.set_clean_urls(updates).await?)
    }

    async fn short_links(&self, limit: i64) -> Result<Vec<LinkRow>> {
        Ok(self.short_links(limit).await?)
    }

    async fn apply_unshortened(&self, links: &[ResolvedLink]) -> Result<u64> {
        Ok(self.apply_unshortened(links).await?)
    }

    async fn links_missing_title(&self, limit: i64) -> Result<Vec<LinkRow>> {
        Ok(self.links_missing_title(limit).await?)
    }

    async fn set_link_title(&self, id: &str, title: &str) -> Result<()> {
        Ok(self.set_link_title(id, title).await?)
    }
}

// ---------------------------------------------------------------------------
// SummaryStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn github_activity(
        &self,
        now: DateTime<Utc>,
        core_team: &[String],
    ) -> Result<Vec<GithubActivity>>;
    async fn twitter_links(&self, now: DateTime<Utc>, own_domain: &str) -> Result<Vec<LinkScore>>;
    async fn meetup_events(&self, now: DateTime<Utc>) -> Result<Vec<MeetupListing>>;
}

#[async_trait]
impl SummaryStore for SummaryReader {
    async fn github_activity(
        &self,
        now: DateTime<Utc>,
        core_team: &[String],
    ) -> Result<Vec<GithubActivity>> {
        Ok(self.github_activity(now, core_team).await?)
    }

    async fn twitter_links(&self, now: DateTime<Utc>, own_domain: &str) -> Result<Vec<LinkScore>> {
        Ok(self.twitter_links(now, own_domain).await?)
    }

    async fn meetup_events(&self, now: DateTime<Utc>) -> Result<Vec<MeetupListing>> {
        Ok(self.meetup_events(now).await?)
    }
}

// ---------------------------------------------------------------------------
// Upstream APIs
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TwitterSearch: Send + Sync {
    async fn search(&self, params: &SearchParams<'_>) -> Result<SearchResponse>;
}

#[async_trait]
impl TwitterSearch for TwitterClient {
    async fn search(&self, params: &SearchParams<'_>) -> Result<SearchResponse> {
        Ok(self.search(params).await?)
    }
}

#[async_trait]
pub trait RepositorySearch: Send + Sync {
    async fn search_repositories(&self, search: &str, cursor: Option<&str>) -> Result<SearchData>;
}

#[async_trait]
impl RepositorySearch for GithubClient {
    async fn search_repositories(&self, search: &str, cursor: Option<&str>) -> Result<SearchData> {
        Ok(self.search_repositories(search, cursor).await?)
    }
}

#[async_trait]
pub trait MeetupApi: Send + Sync {
    async fn find_groups(&self, text: &str) -> Result<Page<Group>>;
    async fn group_events(&self, urlname: &str, no_earlier_than: &str) -> Result<Page<Event>>;
}

#[async_trait]
impl MeetupApi for MeetupClient {
    async fn find_groups(&self, text: &str) -> Result<Page<Group>> {
        Ok(self.find_groups(text).await?)
    }

    async fn group_events(&self, urlname: &str, no_earlier_than: &str) -> Result<Page<Event>> {
        Ok(self.group_events(urlname, no_earlier_than).await?)
    }
}

// ---------------------------------------------------------------------------
// Web + object storage
// ---------------------------------------------------------------------------

/// Status and `Location` of a HEAD request made without following redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResponse {
    pub status: u16,
    pub location: Option<String>,
}

#[async_trait]
pub trait Web: Send + Sync {
    async fn head(&self, url: &str) -> std::result::Result<HeadResponse, FetchFailure>;

    /// Body of a successful GET, decoded as text.
    async fn get_text(&self, url: &str) -> std::result::Result<String, FetchFailure>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}

#[async_trait]
impl ObjectStore for aws_client::S3Client {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        Ok(self.put_object(bucket, key, body, content_type).await?)
    }
}

use std::time::Duration;

use chrono::DateTime;
use tracing::info;

use community_graph::{LinkRef, Mention, TweetRecord, TweetUser};
use twitter_client::{SearchParams, Status};

use crate::error::Result;
use crate::traits::{GraphStore, TwitterSearch};

/// Expanded URLs shorter than this are flagged for the unshorten pass.
const SHORT_LINK_LEN: usize = 25;

const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Clone)]
pub struct TwitterImportOptions {
    pub query: String,
    /// Fetch newer tweets than the graph has (`true`) or walk back through
    /// older ones (`false`).
    pub catch_up: bool,
    pub max_pages: u32,
    pub count: u32,
    pub page_pause: Duration,
    /// Added on top of the API's `backoff` hint.
    pub backoff_padding: Duration,
}

impl TwitterImportOptions {
    pub fn new(query: impl Into<String>, catch_up: bool) -> Self {
        Self {
            query: query.into(),
            catch_up,
            max_pages: 100,
            count: 100,
            page_pause: Duration::from_secs(1),
            backoff_padding: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TwitterStats {
    pub requests: u32,
    pub pages_merged: u32,
    pub tweets: u64,
}

/// Where the next request starts.
#[derive(Debug)]
struct PageCursor {
    /// 1-based; only advances when a page carried tweets.
    page: u32,
    since_id: Option<i64>,
    max_id: Option<i64>,
    has_more: bool,
}

impl PageCursor {
    fn start() -> Self {
        Self {
            page: 1,
            since_id: None,
            max_id: None,
            has_more: true,
        }
    }
}

/// Page through search results, merging each non-empty page as it arrives.
pub async fn import_tweets(
    source: &impl TwitterSearch,
    store: &impl GraphStore,
    opts: &TwitterImportOptions,
) -> Result<TwitterStats> {
    let mut cursor = PageCursor::start();
    let mut stats = TwitterStats::default();

    while cursor.has_more && cursor.page <= opts.max_pages {
        if opts.catch_up {
            if let Some(since_id) = store.max_tweet_id().await? {
                cursor.since_id = Some(since_id);
            }
        }

        let params = SearchParams {
            since_id: cursor.since_id,
            max_id: cursor.max_id,
            ..SearchParams::recent(&opts.query, opts.count)
        };
        let response = source.search(&params).await?;
        stats.requests += 1;

        let next_max_id = response.search_metadata.next_max_id();
        if !opts.catch_up {
            cursor.max_id = next_max_id.or(cursor.max_id);
        }

        let tweets: Vec<TweetRecord> = response.statuses.iter().map(to_record).collect();
        if !tweets.is_empty() {
            stats.tweets += store.merge_tweets(&tweets).await?;
            stats.pages_merged += 1;
            cursor.page += 1;
        }

        cursor.has_more = tweets.len() == opts.count as usize;
        // Walking back without a next page would re-read the same one.
        if !opts.catch_up && next_max_id.is_none() {
            cursor.has_more = false;
        }

        info!(
            catch_up = opts.catch_up,
            more = cursor.has_more,
            page = cursor.page,
            since_id = ?cursor.since_id,
            max_id = ?cursor.max_id,
            tweets = tweets.len(),
            "Fetched search page"
        );

        tokio::time::sleep(opts.page_pause).await;
        if let Some(backoff) = response.backoff {
            info!(backoff, "API requested backoff");
            tokio::time::sleep(Duration::from_secs(backoff) + opts.backoff_padding).await;
        }
    }

    Ok(stats)
}

pub fn is_short_link(url: &str) -> bool {
    url.chars().count() < SHORT_LINK_LEN
}

/// Epoch seconds of a Twitter `created_at` value.
pub fn parse_created_at(created_at: &str) -> Option<i64> {
    DateTime::parse_from_str(created_at, CREATED_AT_FORMAT)
        .ok()
        .map(|dt| dt.timestamp())
}

pub fn to_record(status: &Status) -> TweetRecord {
    let u = &status.user;
    let e = &status.entities;
    TweetRecord {
        id: status.id,
        text: status.text.clone(),
        created_at: status.created_at.clone(),
        created: parse_created_at(&status.created_at),
        favorites: status.favorite_count,
        user: TweetUser {
            id: u.id,
            screen_name: u.screen_name.clone(),
            name: u.name.clone(),
            location: u.location.clone(),
            followers: u.followers_count,
            following: u.friends_count,
            statuses: u.statuses_count,
            profile_image_url: u.profile_image_url.clone(),
        },
        hashtags: e.hashtags.iter().map(|h| h.text.to_lowercase()).collect(),
        links: e
            .urls
            .iter()
            .filter_map(|u| u.expanded_url.as_deref())
            .map(|url| LinkRef {
                url: url.to_string(),
                short: is_short_link(url),
            })
            .collect(),
        mentions: e
            .user_mentions
            .iter()
            .map(|m| Mention {
                id: m.id,
                screen_name: m.screen_name.clone(),
                name: m.name.clone(),
            })
            .collect(),
        reply_to: status.in_reply_to_status_id,
        retweet_of: status.retweeted_status.as_ref().map(|r| r.id),
    }
}

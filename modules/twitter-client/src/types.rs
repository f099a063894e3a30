use serde::Deserialize;

/// Response of `GET /1.1/search/tweets.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub statuses: Vec<Status>,
    pub search_metadata: SearchMetadata,
    /// Seconds the API asks clients to wait before the next request.
    #[serde(default)]
    pub backoff: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchMetadata {
    /// Query string for the next (older) page, e.g. `?max_id=123&q=neo4j&include_entities=1`.
    #[serde(default)]
    pub next_results: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
}

impl SearchMetadata {
    /// The `max_id` carried by `next_results`, when there is an older page.
    pub fn next_max_id(&self) -> Option<i64> {
        let next = self.next_results.as_deref()?;
        let parsed = url::Url::parse(&format!("https://api.twitter.com/{next}")).ok()?;
        let max_id = parsed
            .query_pairs()
            .find(|(k, _)| k == "max_id")
            .and_then(|(_, v)| v.parse().ok());
        max_id
    }
}

/// A single tweet, as returned by the v1.1 API.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub id: i64,
    #[serde(default)]
    pub text: String,
    /// e.g. `Wed Aug 27 13:08:45 +0000 2008`.
    pub created_at: String,
    #[serde(default)]
    pub favorite_count: i64,
    pub user: User,
    #[serde(default)]
    pub entities: Entities,
    #[serde(default)]
    pub in_reply_to_status_id: Option<i64>,
    #[serde(default)]
    pub retweeted_status: Option<RetweetedStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub screen_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub friends_count: i64,
    #[serde(default)]
    pub statuses_count: i64,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<Hashtag>,
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
    #[serde(default)]
    pub user_mentions: Vec<UserMention>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hashtag {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlEntity {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub expanded_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserMention {
    pub id: i64,
    pub screen_name: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Only the id of the original tweet is needed to thread the RETWEETED edge.
#[derive(Debug, Clone, Deserialize)]
pub struct RetweetedStatus {
    pub id: i64,
}

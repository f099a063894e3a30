use serde::Deserialize;

/// One entry of `GET /find/groups`.
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub urlname: String,
    pub link: String,
    #[serde(default)]
    pub members: i64,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// One entry of `GET /{urlname}/events`.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Meetup event ids are alphanumeric strings.
    pub id: String,
    pub name: String,
    /// Start time, epoch milliseconds.
    pub time: i64,
    pub link: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub yes_rsvp_count: i64,
    #[serde(default)]
    pub venue: Option<Venue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Quota reported by the `X-RateLimit-*` response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: Option<u64>,
    /// Seconds until the quota window resets.
    pub reset_seconds: Option<u64>,
}

impl RateLimit {
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        };
        Self {
            remaining: read("x-ratelimit-remaining"),
            reset_seconds: read("x-ratelimit-reset"),
        }
    }

    /// Seconds to wait before the next request, when the quota is spent.
    pub fn wait_seconds(&self) -> Option<u64> {
        match self.remaining {
            Some(0) => Some(self.reset_seconds.unwrap_or(0)),
            _ => None,
        }
    }
}

/// A decoded response body plus the quota it left behind.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub rate_limit: RateLimit,
}

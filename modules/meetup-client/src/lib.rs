pub mod error;
pub mod types;

pub use error::{MeetupError, Result};
pub use types::{Event, Group, Page, RateLimit, Venue};

use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://api.meetup.com";

pub struct MeetupClient {
    client: reqwest::Client,
    key: String,
    base_url: String,
}

impl MeetupClient {
    pub fn new(key: &str) -> Result<Self> {
        Self::with_base_url(key, BASE_URL)
    }

    pub fn with_base_url(key: &str, base_url: &str) -> Result<Self> {
        let key = key.trim();
        if key.is_empty() {
            return Err(MeetupError::MissingKey);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            key: key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Groups whose name or description matches `text`.
    pub async fn find_groups(&self, text: &str) -> Result<Page<Group>> {
        let url = self.url("/find/groups", &[("text", text)])?;
        self.get(url).await
    }

    /// Past and upcoming events of a group, starting at `no_earlier_than`
    /// (`YYYY-MM-DDTHH:MM:SS`, group-local time).
    pub async fn group_events(&self, urlname: &str, no_earlier_than: &str) -> Result<Page<Event>> {
        let path = format!("/{}/events", urlname.trim_matches('/'));
        let url = self.url(
            &path,
            &[("status", "past,upcoming"), ("no_earlier_than", no_earlier_than)],
        )?;
        self.get(url).await
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<url::Url> {
        let mut url = url::Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| MeetupError::Parse(e.to_string()))?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("key", &self.key)
            .append_pair("sign", "true");
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: url::Url) -> Result<Page<T>> {
        tracing::debug!(path = url.path(), "Meetup request");
        let resp = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        let rate_limit = RateLimit::from_headers(resp.headers());
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(MeetupError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(Page {
            items: serde_json::from_str(&body)?,
            rate_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(MeetupClient::new(" "), Err(MeetupError::MissingKey)));
    }

    #[test]
    fn events_url_carries_window_and_key() {
        let client = MeetupClient::new("k3y").unwrap();
        let url = client
            .url(
                "/graphs-ldn/events",
                &[("status", "past,upcoming"), ("no_earlier_than", "2024-04-01T00:00:00")],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.meetup.com/graphs-ldn/events?status=past%2Cupcoming&no_earlier_than=2024-04-01T00%3A00%3A00&key=k3y&sign=true"
        );
    }
}

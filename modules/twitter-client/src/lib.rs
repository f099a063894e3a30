pub mod error;
pub mod types;

pub use error::{Result, TwitterError};
pub use types::{
    Entities, Hashtag, RetweetedStatus, SearchMetadata, SearchResponse, Status, UrlEntity, User,
    UserMention,
};

const BASE_URL: &str = "https://api.twitter.com/1.1";

/// Parameters of one search page request.
#[derive(Debug, Clone)]
pub struct SearchParams<'a> {
    pub query: &'a str,
    pub count: u32,
    pub result_type: &'a str,
    pub lang: &'a str,
    pub since_id: Option<i64>,
    pub max_id: Option<i64>,
}

impl<'a> SearchParams<'a> {
    /// Recent English results, the way the importer asks for them.
    pub fn recent(query: &'a str, count: u32) -> Self {
        Self {
            query,
            count,
            result_type: "recent",
            lang: "en",
            since_id: None,
            max_id: None,
        }
    }
}

pub struct TwitterClient {
    client: reqwest::Client,
    bearer_token: String,
    base_url: String,
}

impl TwitterClient {
    /// Fails with [`TwitterError::MissingToken`] for an empty token, so a
    /// misconfigured job stops before touching the network.
    pub fn new(bearer_token: &str) -> Result<Self> {
        Self::with_base_url(bearer_token, BASE_URL)
    }

    pub fn with_base_url(bearer_token: &str, base_url: &str) -> Result<Self> {
        let bearer_token = bearer_token.trim();
        if bearer_token.is_empty() {
            return Err(TwitterError::MissingToken);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            bearer_token: bearer_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the search URL for a page.
    pub fn search_url(&self, params: &SearchParams<'_>) -> Result<url::Url> {
        let mut url = url::Url::parse(&format!("{}/search/tweets.json", self.base_url))
            .map_err(|e| TwitterError::Parse(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", params.query)
                .append_pair("count", &params.count.to_string())
                .append_pair("result_type", params.result_type)
                .append_pair("lang", params.lang);
            if let Some(since_id) = params.since_id {
                pairs.append_pair("since_id", &since_id.to_string());
            }
            if let Some(max_id) = params.max_id {
                pairs.append_pair("max_id", &max_id.to_string());
            }
        }
        Ok(url)
    }

    /// Fetch one page of search results. Any non-200 status is an error.
    pub async fn search(&self, params: &SearchParams<'_>) -> Result<SearchResponse> {
        let url = self.search_url(params)?;
        tracing::debug!(%url, "Searching tweets");

        let resp = self
            .client
            .get(url)
            .header("accept", "application/json")
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if status != reqwest::StatusCode::OK {
            return Err(TwitterError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_rejected() {
        assert!(matches!(TwitterClient::new(""), Err(TwitterError::MissingToken)));
        assert!(matches!(TwitterClient::new("   "), Err(TwitterError::MissingToken)));
    }

    #[test]
    fn search_url_encodes_query_and_cursor() {
        let client = TwitterClient::new("token").unwrap();
        let mut params = SearchParams::recent("neo4j OR cypher", 100);
        params.since_id = Some(42);
        let url = client.search_url(&params).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.twitter.com/1.1/search/tweets.json?q=neo4j+OR+cypher&count=100&result_type=recent&lang=en&since_id=42"
        );
    }

    #[test]
    fn search_url_without_cursor() {
        let client = TwitterClient::with_base_url("token", "http://localhost:8080/").unwrap();
        let url = client.search_url(&SearchParams::recent("#graphs", 10)).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/search/tweets.json?q=%23graphs&count=10&result_type=recent&lang=en"
        );
    }
}

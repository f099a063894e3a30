use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchFailure;
use crate::traits::{HeadResponse, Web};

const USER_AGENT: &str = "Mozilla/5.0";

/// Page fetches give up after this long.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// reqwest-backed [`Web`]: HEAD without following redirects, GET with a
/// browser user agent and a timeout.
pub struct HttpWeb {
    head_client: reqwest::Client,
    page_client: reqwest::Client,
}

impl HttpWeb {
    pub fn new() -> Result<Self, reqwest::Error> {
        let head_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        let page_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(PAGE_TIMEOUT)
            .build()?;
        Ok(Self {
            head_client,
            page_client,
        })
    }
}

#[async_trait]
impl Web for HttpWeb {
    async fn head(&self, url: &str) -> Result<HeadResponse, FetchFailure> {
        let resp = self.head_client.head(url).send().await?;
        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(HeadResponse {
            status: resp.status().as_u16(),
            location,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchFailure> {
        let resp = self.page_client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }
}

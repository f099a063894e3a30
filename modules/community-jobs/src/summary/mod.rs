//! Weekly summary page: three windowed graph reads rendered into one HTML
//! document and uploaded to S3.

mod format;
mod page;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::Result;
use crate::traits::{ObjectStore, SummaryStore};

pub use format::{humanise, shorten};
pub use page::{render_summary, EventView, LinkView, PageHeader, RepositoryView};

pub const CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub bucket: String,
    /// The page is written to `<output_dir>/<name>.html` and uploaded as `<name>.html`.
    pub name: String,
    pub title: String,
    pub logo_url: Option<String>,
    pub core_team: Vec<String>,
    pub own_domain: String,
    pub output_dir: PathBuf,
}

impl SummaryOptions {
    pub fn from_config(config: &community_common::SummaryConfig) -> Self {
        Self {
            bucket: config.bucket.clone(),
            name: config.name.clone(),
            title: config.title.clone(),
            logo_url: config.logo_url.clone(),
            core_team: config.core_team.clone(),
            own_domain: config.own_domain.clone(),
            output_dir: std::env::temp_dir(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}.html", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryStats {
    pub repositories: usize,
    pub links: usize,
    pub events: usize,
    pub path: PathBuf,
}

/// Read, render, write to disk, upload. Any failure aborts the run.
pub async fn generate_summary(
    store: &impl SummaryStore,
    objects: &impl ObjectStore,
    opts: &SummaryOptions,
    now: DateTime<Utc>,
) -> Result<SummaryStats> {
    let github = store.github_activity(now, &opts.core_team).await?;
    let twitter = store.twitter_links(now, &opts.own_domain).await?;
    let meetup = store.meetup_events(now).await?;
    info!(
        repositories = github.len(),
        links = twitter.len(),
        events = meetup.len(),
        "Summary rows read"
    );

    let html = render_summary(
        PageHeader {
            title: opts.title.clone(),
            logo_url: opts.logo_url.clone(),
            generated_at: now.format("%Y-%m-%d %H:%M UTC").to_string(),
        },
        github.iter().map(|r| RepositoryView::new(r, now)).collect(),
        twitter.iter().map(|r| LinkView::new(r, now)).collect(),
        meetup.iter().map(|r| EventView::new(r, now)).collect(),
    );

    let key = opts.key();
    let path = opts.output_dir.join(&key);
    tokio::fs::write(&path, html.as_bytes()).await?;
    let body = tokio::fs::read(&path).await?;

    objects.put(&opts.bucket, &key, body, CONTENT_TYPE).await?;
    info!(bucket = opts.bucket.as_str(), key = key.as_str(), path = %path.display(), "Summary uploaded");

    Ok(SummaryStats {
        repositories: github.len(),
        links: twitter.len(),
        events: meetup.len(),
        path,
    })
}

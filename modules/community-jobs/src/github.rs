use chrono::{DateTime, Duration, Utc};
use tracing::info;

use community_graph::{OwnerRecord, RepositoryRecord};
use github_client::{Repository, SearchNode};

use crate::error::Result;
use crate::traits::{GraphStore, RepositorySearch};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone)]
pub struct GithubImportOptions {
    /// Search qualifier, e.g. `neo4j`.
    pub search: String,
    /// Only repositories pushed within this many days are fetched.
    pub lookback_days: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GithubStats {
    pub pages: u32,
    pub merges: u32,
    pub repositories: u64,
}

/// `<qualifier> pushed:>YYYY-MM-DD` for the lookback window ending at `now`.
pub fn search_term(search: &str, lookback_days: i64, now: DateTime<Utc>) -> String {
    let from = now - Duration::days(lookback_days);
    format!("{search} pushed:>{}", from.format("%Y-%m-%d"))
}

/// Walk every page of the repository search, merging each non-empty page.
/// Sleeps until the rate-limit window resets once the quota is spent.
pub async fn import_repositories(
    source: &impl RepositorySearch,
    store: &impl GraphStore,
    opts: &GithubImportOptions,
    now: DateTime<Utc>,
) -> Result<GithubStats> {
    let term = search_term(&opts.search, opts.lookback_days, now);
    info!(search = term.as_str(), "Processing repositories");

    let mut stats = GithubStats::default();
    let mut cursor: Option<String> = None;

    loop {
        let data = source.search_repositories(&term, cursor.as_deref()).await?;
        stats.pages += 1;

        let records: Vec<RepositoryRecord> = data
            .search
            .nodes
            .iter()
            .filter_map(|node| match node {
                SearchNode::Repository(repo) => Some(to_record(repo)),
                SearchNode::Other => None,
            })
            .collect();

        if !records.is_empty() {
            stats.repositories += store.merge_repositories(&records).await?;
            stats.merges += 1;
        }

        let page_info = &data.search.page_info;
        let rate = &data.rate_limit;
        info!(
            page = stats.pages,
            repositories = records.len(),
            has_more = page_info.has_next_page,
            remaining = rate.remaining,
            reset_at = %rate.reset_at,
            repository_count = data.search.repository_count,
            "Fetched repository page"
        );

        if rate.remaining <= 0 {
            let wait = (rate.reset_at - Utc::now()).to_std().unwrap_or_default();
            info!(seconds = wait.as_secs(), "Rate limit spent, waiting for reset");
            tokio::time::sleep(wait).await;
        }

        match (&page_info.end_cursor, page_info.has_next_page) {
            (Some(next), true) => cursor = Some(next.clone()),
            _ => break,
        }
    }

    Ok(stats)
}

pub fn to_record(repo: &Repository) -> RepositoryRecord {
    RepositoryRecord {
        id: repo.database_id,
        title: repo.name.clone(),
        full_name: repo.full_name(),
        url: repo.url.clone(),
        created: repo.created_at.timestamp_millis(),
        created_at: repo.created_at.format(TIMESTAMP_FORMAT).to_string(),
        homepage: repo.homepage_url.clone(),
        favorites: repo.stargazers.total_count,
        forks: repo.forks.total_count,
        watchers: repo.watchers.total_count,
        open_issues: repo.issues.total_count,
        updated: repo.updated_at.timestamp_millis(),
        updated_at: repo.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        pushed: repo.pushed_at.map(|p| p.format(TIMESTAMP_FORMAT).to_string()),
        size: repo.disk_usage,
        language: repo.primary_language().map(str::to_string),
        branch: repo.default_branch_ref.as_ref().map(|b| b.name.clone()),
        description: repo.description.clone(),
        owner: OwnerRecord {
            id: repo.owner.database_id(),
            login: repo.owner.login().to_string(),
            kind: repo.owner.kind().to_string(),
            full_name: repo.owner.name().map(str::to_string),
            location: repo.owner.location().map(str::to_string),
        },
    }
}

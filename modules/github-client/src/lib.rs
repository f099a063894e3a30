pub mod error;
pub mod types;

pub use error::{GithubError, Result};
pub use types::{
    PageInfo, RateLimit, Repository, RepositoryOwner, SearchConnection, SearchData, SearchNode,
};

use serde_json::json;
use types::GraphQlResponse;

const GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Repositories per search page (GitHub's maximum).
pub const PAGE_SIZE: u32 = 100;

const SEARCH_REPOSITORIES: &str = r#"
query Repositories($searchTerm: String!, $cursor: String, $first: Int!) {
  rateLimit {
    limit
    cost
    remaining
    resetAt
  }
  search(query: $searchTerm, type: REPOSITORY, first: $first, after: $cursor) {
    repositoryCount
    pageInfo {
      hasNextPage
      endCursor
    }
    nodes {
      __typename
      ... on Repository {
        databaseId
        name
        url
        pushedAt
        createdAt
        updatedAt
        diskUsage
        description
        homepageUrl
        issues { totalCount }
        stargazers { totalCount }
        watchers { totalCount }
        forks { totalCount }
        languages(first: 1, orderBy: {field: SIZE, direction: DESC}) {
          nodes { name }
        }
        owner {
          __typename
          login
          ... on User {
            name
            databaseId
            location
          }
          ... on Organization {
            name
            databaseId
          }
        }
        defaultBranchRef { name }
      }
    }
  }
}
"#;

pub struct GithubClient {
    client: reqwest::Client,
    token: String,
    endpoint: String,
}

impl GithubClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_endpoint(token, GRAPHQL_URL)
    }

    pub fn with_endpoint(token: &str, endpoint: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(GithubError::MissingToken);
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("community-graph/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            token: token.to_string(),
            endpoint: endpoint.to_string(),
        })
    }

    /// Fetch one page of repository search results after `cursor`.
    ///
    /// A response whose shape does not match the query (missing fields, null
    /// `data`, GraphQL `errors`) is an error.
    pub async fn search_repositories(
        &self,
        search: &str,
        cursor: Option<&str>,
    ) -> Result<SearchData> {
        let body = json!({
            "query": SEARCH_REPOSITORIES,
            "variables": {
                "searchTerm": search,
                "cursor": cursor,
                "first": PAGE_SIZE,
            },
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/json")
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(GithubError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        parse_search_response(&text)
    }
}

fn parse_search_response(text: &str) -> Result<SearchData> {
    let parsed: GraphQlResponse<SearchData> = serde_json::from_str(text)?;
    match parsed.data {
        Some(data) => {
            if !parsed.errors.is_empty() {
                tracing::warn!(
                    errors = parsed.errors.len(),
                    first = %parsed.errors[0].message,
                    "GraphQL returned partial errors"
                );
            }
            Ok(data)
        }
        None => {
            let message = parsed
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            Err(GithubError::GraphQl(if message.is_empty() {
                "response has no data".to_string()
            } else {
                message
            }))
        }
    }
}

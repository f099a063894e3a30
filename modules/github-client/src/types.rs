use chrono::{DateTime, Utc};
use serde::Deserialize;

/// GraphQL envelope: `data` is absent when the query failed as a whole.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    pub rate_limit: RateLimit,
    pub search: SearchConnection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub limit: i64,
    pub cost: i64,
    pub remaining: i64,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConnection {
    pub repository_count: i64,
    pub page_info: PageInfo,
    pub nodes: Vec<SearchNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// A search hit. Repository searches only return repositories, but the
/// connection is typed as a union.
#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub enum SearchNode {
    Repository(Box<Repository>),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub database_id: i64,
    pub name: String,
    pub url: String,
    pub pushed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub disk_usage: Option<i64>,
    pub description: Option<String>,
    pub homepage_url: Option<String>,
    pub issues: Count,
    pub stargazers: Count,
    pub watchers: Count,
    pub forks: Count,
    pub languages: Languages,
    pub owner: RepositoryOwner,
    pub default_branch_ref: Option<BranchRef>,
}

impl Repository {
    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login(), self.name)
    }

    /// Largest language by size, if GitHub detected any.
    pub fn primary_language(&self) -> Option<&str> {
        self.languages.nodes.first().map(|l| l.name.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Count {
    pub total_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Languages {
    pub nodes: Vec<Language>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Language {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    pub name: String,
}

/// Repository owners are either users or organizations; only users expose a location.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum RepositoryOwner {
    #[serde(rename_all = "camelCase")]
    User {
        login: String,
        name: Option<String>,
        database_id: i64,
        location: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Organization {
        login: String,
        name: Option<String>,
        database_id: i64,
    },
}

impl RepositoryOwner {
    pub fn login(&self) -> &str {
        match self {
            RepositoryOwner::User { login, .. } | RepositoryOwner::Organization { login, .. } => {
                login
            }
        }
    }

    pub fn database_id(&self) -> i64 {
        match self {
            RepositoryOwner::User { database_id, .. }
            | RepositoryOwner::Organization { database_id, .. } => *database_id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            RepositoryOwner::User { name, .. } | RepositoryOwner::Organization { name, .. } => {
                name.as_deref()
            }
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            RepositoryOwner::User { location, .. } => location.as_deref(),
            RepositoryOwner::Organization { .. } => None,
        }
    }

    /// The GraphQL type name, stored as the owner's `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            RepositoryOwner::User { .. } => "User",
            RepositoryOwner::Organization { .. } => "Organization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
      "data": {
        "rateLimit": {"limit": 5000, "cost": 1, "remaining": 4999, "resetAt": "2024-05-01T12:00:00Z"},
        "search": {
          "repositoryCount": 2,
          "pageInfo": {"hasNextPage": false, "endCursor": "Y3Vyc29yOjI="},
          "nodes": [
            {
              "__typename": "Repository",
              "databaseId": 101,
              "name": "graph-tool",
              "url": "https://github.com/alice/graph-tool",
              "pushedAt": "2024-04-30T10:00:00Z",
              "createdAt": "2023-01-01T00:00:00Z",
              "updatedAt": "2024-04-30T10:00:00Z",
              "diskUsage": 512,
              "description": "A tool",
              "homepageUrl": null,
              "issues": {"totalCount": 3},
              "stargazers": {"totalCount": 40},
              "watchers": {"totalCount": 5},
              "forks": {"totalCount": 2},
              "languages": {"nodes": [{"name": "Rust"}]},
              "owner": {"__typename": "User", "login": "alice", "name": "Alice", "databaseId": 7, "location": "Malmö"},
              "defaultBranchRef": {"name": "main"}
            },
            {
              "__typename": "Repository",
              "databaseId": 102,
              "name": "drivers",
              "url": "https://github.com/acme/drivers",
              "pushedAt": null,
              "createdAt": "2022-01-01T00:00:00Z",
              "updatedAt": "2024-04-29T10:00:00Z",
              "diskUsage": null,
              "description": null,
              "homepageUrl": "https://acme.dev",
              "issues": {"totalCount": 0},
              "stargazers": {"totalCount": 900},
              "watchers": {"totalCount": 30},
              "forks": {"totalCount": 100},
              "languages": {"nodes": []},
              "owner": {"__typename": "Organization", "login": "acme", "name": "Acme", "databaseId": 9},
              "defaultBranchRef": null
            }
          ]
        }
      }
    }"#;

    fn repositories(data: &SearchData) -> Vec<&Repository> {
        data.search
            .nodes
            .iter()
            .filter_map(|n| match n {
                SearchNode::Repository(r) => Some(r.as_ref()),
                SearchNode::Other => None,
            })
            .collect()
    }

    #[test]
    fn owner_union_is_discriminated_by_typename() {
        let resp: GraphQlResponse<SearchData> = serde_json::from_str(PAGE).unwrap();
        let data = resp.data.unwrap();
        let repos = repositories(&data);

        assert!(matches!(repos[0].owner, RepositoryOwner::User { .. }));
        assert_eq!(repos[0].owner.location(), Some("Malmö"));
        assert_eq!(repos[0].owner.kind(), "User");

        assert!(matches!(repos[1].owner, RepositoryOwner::Organization { .. }));
        assert_eq!(repos[1].owner.location(), None);
        assert_eq!(repos[1].owner.database_id(), 9);
    }

    #[test]
    fn repository_helpers() {
        let resp: GraphQlResponse<SearchData> = serde_json::from_str(PAGE).unwrap();
        let data = resp.data.unwrap();
        let repos = repositories(&data);
        assert_eq!(repos[0].full_name(), "alice/graph-tool");
        assert_eq!(repos[0].primary_language(), Some("Rust"));
        assert_eq!(repos[1].primary_language(), None);
        assert!(!data.search.page_info.has_next_page);
        assert_eq!(data.rate_limit.remaining, 4999);
    }

    #[test]
    fn missing_field_is_an_error() {
        let broken = PAGE.replace("\"stargazers\": {\"totalCount\": 40},", "");
        assert!(serde_json::from_str::<GraphQlResponse<SearchData>>(&broken).is_err());
    }

    #[test]
    fn errors_without_data() {
        let resp: GraphQlResponse<SearchData> =
            serde_json::from_str(r#"{"data": null, "errors": [{"message": "Bad credentials"}]}"#)
                .unwrap();
        assert!(resp.data.is_none());
        assert_eq!(resp.errors[0].message, "Bad credentials");
    }
}

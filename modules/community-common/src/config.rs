use std::env;

use tracing::info;

use crate::error::{CommunityError, Result};

/// Environment lookup. `from_env` constructors read the process environment;
/// `from_lookup` lets tests feed a map instead.
pub trait Lookup {
    fn get(&self, key: &str) -> Option<String>;
}

impl<F: Fn(&str) -> Option<String>> Lookup for F {
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Neo4j connection settings. The password is the encrypted value from the
/// environment; resolve it with a [`crate::SecretResolver`] before connecting.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub encrypted_password: String,
}

impl GraphConfig {
    /// Read/write credentials (`NEO4J_*`).
    pub fn from_lookup(vars: &impl Lookup) -> Result<Self> {
        Ok(Self {
            uri: required_env(vars, "NEO4J_URI")?,
            user: required_env(vars, "NEO4J_USER")?,
            encrypted_password: required_env(vars, "NEO4J_PASSWORD")?,
        })
    }

    /// Reporting credentials (`READ_ONLY_*`).
    pub fn read_only_from_lookup(vars: &impl Lookup) -> Result<Self> {
        Ok(Self {
            uri: required_env(vars, "READ_ONLY_URI")?,
            user: required_env(vars, "READ_ONLY_USER")?,
            encrypted_password: required_env(vars, "READ_ONLY_PASSWORD")?,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    pub fn read_only_from_env() -> Result<Self> {
        Self::read_only_from_lookup(&process_env)
    }

    pub fn log_redacted(&self) {
        info!(
            uri = self.uri.as_str(),
            user = self.user.as_str(),
            password = %redact(&self.encrypted_password),
            "Graph config"
        );
    }
}

/// Region and optional endpoint override for KMS and S3. Credentials are read
/// separately by `aws_client::AwsCredentials::from_env`.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub region: String,
    pub s3_endpoint_url: Option<String>,
}

impl AwsConfig {
    pub fn from_lookup(vars: &impl Lookup) -> Self {
        Self {
            region: optional_env(vars, "AWS_REGION")
                .unwrap_or_else(|| aws_client::DEFAULT_REGION.to_string()),
            s3_endpoint_url: optional_env(vars, "S3_ENDPOINT_URL"),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(&process_env)
    }
}

#[derive(Debug, Clone)]
pub struct TwitterConfig {
    pub graph: GraphConfig,
    pub encrypted_bearer: String,
    pub search: String,
    /// `true`: fetch tweets newer than the graph's watermark.
    /// `false`: walk back through older results.
    pub catch_up: bool,
}

impl TwitterConfig {
    pub fn from_lookup(vars: &impl Lookup) -> Result<Self> {
        Ok(Self {
            graph: GraphConfig::from_lookup(vars)?,
            encrypted_bearer: required_env(vars, "TWITTER_BEARER")?,
            search: required_env(vars, "TWITTER_SEARCH")?,
            catch_up: flag_env(vars, "TWITTER_CATCH_UP", true)?,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    pub fn log_redacted(&self) {
        self.graph.log_redacted();
        info!(
            search = self.search.as_str(),
            catch_up = self.catch_up,
            bearer = %redact(&self.encrypted_bearer),
            "Twitter config"
        );
    }
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub graph: GraphConfig,
    pub encrypted_token: String,
    /// Search qualifier; the importer appends `pushed:>DATE`.
    pub search: String,
    pub lookback_days: i64,
}

impl GithubConfig {
    pub fn from_lookup(vars: &impl Lookup) -> Result<Self> {
        Ok(Self {
            graph: GraphConfig::from_lookup(vars)?,
            encrypted_token: required_env(vars, "GITHUB_TOKEN")?,
            search: optional_env(vars, "GITHUB_SEARCH").unwrap_or_else(|| "neo4j".to_string()),
            lookback_days: number_env(vars, "GITHUB_LOOKBACK_DAYS", 90)?,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    pub fn log_redacted(&self) {
        self.graph.log_redacted();
        info!(
            search = self.search.as_str(),
            lookback_days = self.lookback_days,
            token = %redact(&self.encrypted_token),
            "GitHub config"
        );
    }
}

#[derive(Debug, Clone)]
pub struct MeetupConfig {
    pub graph: GraphConfig,
    pub encrypted_key: String,
    pub topic: String,
    pub lookback_days: i64,
}

impl MeetupConfig {
    pub fn from_lookup(vars: &impl Lookup) -> Result<Self> {
        Ok(Self {
            graph: GraphConfig::from_lookup(vars)?,
            encrypted_key: required_env(vars, "MEETUP_API_KEY")?,
            topic: required_env(vars, "MEETUP_TOPIC")?,
            lookback_days: number_env(vars, "MEETUP_LOOKBACK_DAYS", 30)?,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    pub fn log_redacted(&self) {
        self.graph.log_redacted();
        info!(
            topic = self.topic.as_str(),
            lookback_days = self.lookback_days,
            key = %redact(&self.encrypted_key),
            "Meetup config"
        );
    }
}

#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub graph: GraphConfig,
    pub aws: AwsConfig,
    pub bucket: String,
    /// Base name of the page; the object key is `<name>.html`.
    pub name: String,
    pub title: String,
    pub logo_url: Option<String>,
    pub core_team: Vec<String>,
    pub own_domain: String,
}

impl SummaryConfig {
    /// `Ok(None)` when `GENERATE_SUMMARY` is off; the remaining variables are
    /// only required when it is on.
    pub fn from_lookup(vars: &impl Lookup) -> Result<Option<Self>> {
        if !flag_env(vars, "GENERATE_SUMMARY", false)? {
            return Ok(None);
        }

        let core_team = optional_env(vars, "CORE_TEAM")
            .unwrap_or_else(|| "neo4j,neo4j-contrib".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Some(Self {
            graph: GraphConfig::read_only_from_lookup(vars)?,
            aws: AwsConfig::from_lookup(vars),
            bucket: required_env(vars, "SUMMARY_BUCKET")?,
            name: required_env(vars, "SUMMARY_NAME")?,
            title: required_env(vars, "TITLE")?,
            logo_url: optional_env(vars, "LOGO_URL"),
            core_team,
            own_domain: optional_env(vars, "OWN_DOMAIN").unwrap_or_else(|| "neo4j.com".to_string()),
        }))
    }

    pub fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(&process_env)
    }

    pub fn log_redacted(&self) {
        self.graph.log_redacted();
        info!(
            bucket = self.bucket.as_str(),
            name = self.name.as_str(),
            title = self.title.as_str(),
            region = self.aws.region.as_str(),
            core_team = ?self.core_team,
            own_domain = self.own_domain.as_str(),
            "Summary config"
        );
    }
}

/// A set, non-blank variable or a configuration error naming it.
pub fn required_env(vars: &impl Lookup, key: &str) -> Result<String> {
    optional_env(vars, key)
        .ok_or_else(|| CommunityError::Config(format!("{key} environment variable is required")))
}

fn optional_env(vars: &impl Lookup, key: &str) -> Option<String> {
    vars.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag_env(vars: &impl Lookup, key: &str, default: bool) -> Result<bool> {
    match optional_env(vars, key) {
        None => Ok(default),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(CommunityError::Config(format!(
                "{key} must be true/false, got {v:?}"
            ))),
        },
    }
}

fn number_env(vars: &impl Lookup, key: &str, default: i64) -> Result<i64> {
    match optional_env(vars, key) {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| CommunityError::Config(format!("{key} must be a number, got {v:?}"))),
    }
}

fn redact(value: &str) -> String {
    format!("<{} chars>", value.len())
}

use chrono::{DateTime, Duration, Utc};
use neo4rs::query;

use crate::GraphClient;

/// Width of every summary window.
pub const SUMMARY_WINDOW_DAYS: i64 = 7;

/// A recently updated repository from outside the core team.
#[derive(Debug, Clone, PartialEq)]
pub struct GithubActivity {
    pub title: String,
    pub url: String,
    /// Epoch millis.
    pub created: i64,
    pub favorites: i64,
    /// Epoch millis.
    pub updated: i64,
    pub owner: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A clean URL shared on Twitter, scored by favorites plus retweets.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkScore {
    pub url: String,
    pub title: Option<String>,
    pub score: i64,
    /// Epoch millis of the first tweet carrying the link.
    pub first_shared: i64,
    pub users: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeetupListing {
    pub event_name: String,
    pub event_link: String,
    /// Epoch millis.
    pub time: i64,
    pub venue_name: Option<String>,
    pub yes_rsvp_count: i64,
    pub group_name: String,
    pub group_link: String,
}

/// Queries behind the summary page. Meant to run on read-only credentials.
pub struct SummaryReader {
    client: GraphClient,
}

impl SummaryReader {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Repositories updated within the window whose creator is not on the core team.
    pub async fn github_activity(
        &self,
        now: DateTime<Utc>,
        core_team: &[String],
    ) -> Result<Vec<GithubActivity>, neo4rs::Error> {
        let since = (now - Duration::days(SUMMARY_WINDOW_DAYS)).timestamp_millis();
        let q = query(
            "MATCH (n:Repository)
             WHERE n.created IS NOT NULL AND n.updated > $since
             MATCH (n)<-[:CREATED]-(user)
             WHERE NOT user.name IN $core_team
             RETURN n.title AS title, n.url AS url, n.created AS created,
                    coalesce(n.favorites, 0) AS favorites, n.updated AS updated,
                    user.name AS owner, n.created_at AS created_at, n.updated_at AS updated_at
             ORDER BY n.updated DESC",
        )
        .param("since", since)
        .param("core_team", core_team.to_vec());

        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            out.push(GithubActivity {
                title: row.get("title").unwrap_or_default(),
                url: row.get("url").unwrap_or_default(),
                created: row.get("created").unwrap_or(0),
                favorites: row.get("favorites").unwrap_or(0),
                updated: row.get("updated").unwrap_or(0),
                owner: row.get("owner").unwrap_or_default(),
                created_at: row.get("created_at").unwrap_or_default(),
                updated_at: row.get("updated_at").unwrap_or_default(),
            });
        }
        Ok(out)
    }

    /// Links first shared within the window by original (non-retweet)
    /// tweets, excluding the product's own site. Highest score first.
    pub async fn twitter_links(
        &self,
        now: DateTime<Utc>,
        own_domain: &str,
    ) -> Result<Vec<LinkScore>, neo4rs::Error> {
        let since = (now - Duration::days(SUMMARY_WINDOW_DAYS)).timestamp();
        let q = query(
            "MATCH (l:Link)<-[:LINKED]-(t:Tweet:Content)
             WHERE NOT t:Retweet AND l.clean_url IS NOT NULL
             WITH l, t,
                  coalesce(t.favorites, 0) + COUNT { (t)<-[:RETWEETED]-() } AS tweet_score,
                  head([(t)<-[:POSTED]-(user) | user.screen_name]) AS poster
             ORDER BY l.clean_url, t.created
             WITH l.clean_url AS url,
                  head(collect(l.title)) AS title,
                  collect(t.created) AS created,
                  sum(tweet_score) AS score,
                  collect(poster) AS users
             WHERE created[0] > $since AND NOT url CONTAINS $own_domain
             RETURN url, title, score, created[0] * 1000 AS first_shared, users
             ORDER BY score DESC",
        )
        .param("since", since)
        .param("own_domain", own_domain);

        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            out.push(LinkScore {
                url: row.get("url").unwrap_or_default(),
                title: row.get::<Option<String>>("title").ok().flatten(),
                score: row.get("score").unwrap_or(0),
                first_shared: row.get("first_shared").unwrap_or(0),
                users: row.get("users").unwrap_or_default(),
            });
        }
        Ok(out)
    }

    /// Events within the window on either side of `now`, soonest first.
    pub async fn meetup_events(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<MeetupListing>, neo4rs::Error> {
        let window = Duration::days(SUMMARY_WINDOW_DAYS);
        let q = query(
            "MATCH (event:Event)<-[:CONTAINED]-(g:Group)
             WHERE $from < event.time < $to
             RETURN event.name AS event_name, event.link AS event_link, event.time AS time,
                    event.venue_name AS venue_name, coalesce(event.yes_rsvp_count, 0) AS yes_rsvp_count,
                    g.name AS group_name, g.link AS group_link
             ORDER BY event.time",
        )
        .param("from", (now - window).timestamp_millis())
        .param("to", (now + window).timestamp_millis());

        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            out.push(MeetupListing {
                event_name: row.get("event_name").unwrap_or_default(),
                event_link: row.get("event_link").unwrap_or_default(),
                time: row.get("time").unwrap_or(0),
                venue_name: row.get::<Option<String>>("venue_name").ok().flatten(),
                yes_rsvp_count: row.get("yes_rsvp_count").unwrap_or(0),
                group_name: row.get("group_name").unwrap_or_default(),
                group_link: row.get("group_link").unwrap_or_default(),
            });
        }
        Ok(out)
    }
}

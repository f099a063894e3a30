use neo4rs::{query, BoltType};
use tracing::{debug, info};

use crate::bolt;
use crate::records::{
    LinkRow, MeetupEventRecord, MeetupGroupRecord, RepositoryRecord, ResolvedLink, TweetRecord,
};
use crate::GraphClient;

const MERGE_TWEETS: &str = "
UNWIND $tweets AS t
WITH t ORDER BY t.id

MERGE (tweet:Tweet:Twitter {id: t.id})
SET tweet:Content,
    tweet.text = t.text,
    tweet.created_at = t.created_at,
    tweet.created = t.created,
    tweet.favorites = t.favorites

MERGE (user:User {screen_name: t.user.screen_name})
SET user:Twitter,
    user.name = t.user.name,
    user.id = t.user.id,
    user.location = t.user.location,
    user.followers = t.user.followers,
    user.following = t.user.following,
    user.statuses = t.user.statuses,
    user.profile_image_url = t.user.profile_image_url

MERGE (user)-[:POSTED]->(tweet)

FOREACH (name IN t.hashtags |
  MERGE (tag:Tag {name: name}) SET tag:Twitter
  MERGE (tweet)-[:TAGGED]->(tag)
)

FOREACH (link IN t.links |
  MERGE (l:Link {url: link.url})
  ON CREATE SET l.short = CASE WHEN link.short THEN true ELSE null END,
                l.first_seen = timestamp()
  SET l:Twitter
  MERGE (tweet)-[:LINKED]->(l)
)

FOREACH (m IN t.mentions |
  MERGE (mentioned:User {screen_name: m.screen_name})
  ON CREATE SET mentioned.name = m.name, mentioned.id = m.id
  SET mentioned:Twitter
  MERGE (tweet)-[:MENTIONED]->(mentioned)
)

FOREACH (r IN CASE WHEN t.reply_to IS NULL THEN [] ELSE [t.reply_to] END |
  MERGE (replied:Tweet:Twitter {id: r})
  MERGE (tweet)-[:REPLIED_TO]->(replied)
  SET tweet:Reply
)

FOREACH (r IN CASE WHEN t.retweet_of IS NULL THEN [] ELSE [t.retweet_of] END |
  MERGE (original:Tweet:Twitter {id: r})
  MERGE (tweet)-[:RETWEETED]->(original)
  SET tweet:Retweet
)

RETURN count(tweet) AS merged
";

const MERGE_REPOSITORIES: &str = "
UNWIND $repos AS r
MERGE (repo:Repository:GitHub {id: r.id})
  ON CREATE SET
    repo.title = r.title,
    repo.full_name = r.full_name,
    repo.url = r.url,
    repo.created = r.created,
    repo.created_at = r.created_at,
    repo.homepage = r.homepage
  SET repo.favorites = r.favorites,
      repo.forks = r.forks,
      repo.watchers = r.watchers,
      repo.open_issues = r.open_issues,
      repo.updated = r.updated,
      repo.updated_at = r.updated_at,
      repo.pushed = r.pushed,
      repo.size = r.size,
      repo.language = r.language,
      repo.branch = r.branch,
      repo.description = r.description
MERGE (owner:User:GitHub {id: r.owner.id})
  SET owner.name = r.owner.login,
      owner.type = r.owner.kind,
      owner.full_name = r.owner.full_name,
      owner.location = r.owner.location
MERGE (owner)-[:CREATED]->(repo)
RETURN count(repo) AS merged
";

const MERGE_MEETUP_GROUP: &str = "
MERGE (g:Group:Meetup {id: $group.id})
SET g.name = $group.name,
    g.urlname = $group.urlname,
    g.link = $group.link,
    g.members = $group.members,
    g.city = $group.city,
    g.country = $group.country
WITH g
UNWIND $events AS e
MERGE (event:Event:Meetup {id: e.id})
SET event.name = e.name,
    event.time = e.time,
    event.link = e.link,
    event.status = e.status,
    event.yes_rsvp_count = e.yes_rsvp_count,
    event.venue_name = e.venue_name,
    event.venue_city = e.venue_city
MERGE (g)-[:CONTAINED]->(event)
RETURN count(event) AS merged
";

/// Write side of the graph: importer merges and link maintenance.
pub struct GraphWriter {
    client: GraphClient,
}

impl GraphWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Highest id among tweets imported with their own payload.
    pub async fn max_tweet_id(&self) -> Result<Option<i64>, neo4rs::Error> {
        let q = query("MATCH (t:Tweet:Content) RETURN max(t.id) AS since_id");
        let mut stream = self.client.graph.execute(q).await?;
        match stream.next().await? {
            Some(row) => Ok(row.get::<Option<i64>>("since_id").ok().flatten()),
            None => Ok(None),
        }
    }

    /// Upsert a page of tweets with their users, tags, links, mentions, and
    /// reply/retweet threads. Returns the number of tweets merged.
    pub async fn merge_tweets(&self, tweets: &[TweetRecord]) -> Result<u64, neo4rs::Error> {
        let rows: Vec<BoltType> = tweets.iter().map(TweetRecord::to_bolt).collect();
        let merged = self
            .count(query(MERGE_TWEETS).param("tweets", rows), "merged")
            .await?;
        info!(merged, "Merged tweets");
        Ok(merged)
    }

    /// Upsert repositories with their owners. Creation-time fields are only
    /// written the first time a repository is seen.
    pub async fn merge_repositories(
        &self,
        repos: &[RepositoryRecord],
    ) -> Result<u64, neo4rs::Error> {
        let rows: Vec<BoltType> = repos.iter().map(RepositoryRecord::to_bolt).collect();
        let merged = self
            .count(query(MERGE_REPOSITORIES).param("repos", rows), "merged")
            .await?;
        info!(merged, "Merged repositories");
        Ok(merged)
    }

    /// Upsert one group and its events. Returns the number of events merged.
    pub async fn merge_meetup_group(
        &self,
        group: &MeetupGroupRecord,
        events: &[MeetupEventRecord],
    ) -> Result<u64, neo4rs::Error> {
        let rows: Vec<BoltType> = events.iter().map(MeetupEventRecord::to_bolt).collect();
        let q = query(MERGE_MEETUP_GROUP)
            .param("group", group.to_bolt())
            .param("events", rows);
        let merged = self.count(q, "merged").await?;
        info!(group = group.urlname.as_str(), events = merged, "Merged meetup group");
        Ok(merged)
    }

    pub async fn links_missing_clean_url(&self) -> Result<Vec<LinkRow>, neo4rs::Error> {
        self.link_rows(query(
            "MATCH (l:Link)
             WHERE l.clean_url IS NULL AND l.url IS NOT NULL
             RETURN elementId(l) AS id, l.url AS url",
        ))
        .await
    }

    /// Store canonical URLs in one batch. `updates` pairs element ids with clean URLs.
    pub async fn set_clean_urls(&self, updates: &[(String, String)]) -> Result<u64, neo4rs::Error> {
        let rows: Vec<BoltType> = updates
            .iter()
            .map(|(id, clean)| {
                bolt::map([("id", bolt::string(id)), ("clean_url", bolt::string(clean))])
            })
            .collect();
        let q = query(
            "UNWIND $updates AS u
             MATCH (l:Link) WHERE elementId(l) = u.id
             SET l.clean_url = u.clean_url
             RETURN count(l) AS updated",
        )
        .param("updates", rows);
        self.count(q, "updated").await
    }

    pub async fn short_links(&self, limit: i64) -> Result<Vec<LinkRow>, neo4rs::Error> {
        self.link_rows(
            query(
                "MATCH (l:Link)
                 WHERE l.short IS NOT NULL
                 RETURN elementId(l) AS id, l.url AS url
                 LIMIT $limit",
            )
            .param("limit", limit),
        )
        .await
    }

    /// Write unshortened URLs and clear the short flag. A changed URL also
    /// drops `clean_url` so the clean pass recomputes it.
    pub async fn apply_unshortened(&self, links: &[ResolvedLink]) -> Result<u64, neo4rs::Error> {
        let rows: Vec<BoltType> = links
            .iter()
            .map(|l| {
                bolt::map([
                    ("id", bolt::string(&l.id)),
                    ("url", bolt::string(&l.url)),
                    ("changed", bolt::boolean(l.changed)),
                ])
            })
            .collect();
        let q = query(
            "UNWIND $links AS r
             MATCH (l:Link) WHERE elementId(l) = r.id
             SET l.url = r.url
             REMOVE l.short
             FOREACH (ignored IN CASE WHEN r.changed THEN [1] ELSE [] END | REMOVE l.clean_url)
             RETURN count(l) AS updated",
        )
        .param("links", rows);
        self.count(q, "updated").await
    }

    /// Links without a title, newest first.
    pub async fn links_missing_title(&self, limit: i64) -> Result<Vec<LinkRow>, neo4rs::Error> {
        self.link_rows(
            query(
                "MATCH (l:Link)
                 WHERE l.title IS NULL AND l.url IS NOT NULL
                 RETURN elementId(l) AS id, l.url AS url
                 ORDER BY coalesce(l.first_seen, 0) DESC
                 LIMIT $limit",
            )
            .param("limit", limit),
        )
        .await
    }

    pub async fn set_link_title(&self, id: &str, title: &str) -> Result<(), neo4rs::Error> {
        let q = query("MATCH (l:Link) WHERE elementId(l) = $id SET l.title = $title")
            .param("id", id)
            .param("title", title);
        self.client.graph.run(q).await?;
        debug!(id, title, "Stored link title");
        Ok(())
    }

    async fn link_rows(&self, q: neo4rs::Query) -> Result<Vec<LinkRow>, neo4rs::Error> {
        let mut stream = self.client.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            let id: String = row.get("id").unwrap_or_default();
            let url: String = row.get("url").unwrap_or_default();
            if !id.is_empty() && !url.is_empty() {
                rows.push(LinkRow { id, url });
            }
        }
        Ok(rows)
    }

    async fn count(&self, q: neo4rs::Query, column: &str) -> Result<u64, neo4rs::Error> {
        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            let n: i64 = row.get(column).unwrap_or(0);
            return Ok(n as u64);
        }
        Ok(0)
    }
}

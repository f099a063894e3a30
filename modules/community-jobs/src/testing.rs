// In-memory stand-ins for the trait seams, used by the job tests.
//
// - MemoryStore (GraphStore): Mutex-guarded graph state, records merge calls
// - ScriptedTwitter / ScriptedGithub / ScriptedMeetup: canned API pages
// - FakeWeb (Web): URL→HEAD response and URL→page body maps
// - MemoryObjects (ObjectStore) and StaticSummary (SummaryStore)
//
// Plus fixture builders for the upstream payload types.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use community_graph::{
    GithubActivity, LinkRow, LinkScore, MeetupEventRecord, MeetupGroupRecord, MeetupListing,
    RepositoryRecord, ResolvedLink, TweetRecord,
};
use github_client::types::{BranchRef, Count, Languages};
use github_client::{PageInfo, RateLimit as GithubRateLimit, Repository, RepositoryOwner};
use github_client::{SearchConnection, SearchData, SearchNode};
use meetup_client::{Event, Group, Page, RateLimit as MeetupRateLimit};
use twitter_client::{Entities, SearchMetadata, SearchParams, SearchResponse, Status, UrlEntity, User};

use crate::error::{FetchFailure, JobError, Result};
use crate::traits::{
    GraphStore, HeadResponse, MeetupApi, ObjectStore, RepositorySearch, SummaryStore,
    TwitterSearch, Web,
};

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryLink {
    pub id: String,
    pub url: String,
    pub short: bool,
    pub clean_url: Option<String>,
    pub title: Option<String>,
}

#[derive(Default)]
struct MemoryState {
    tweets: HashMap<i64, TweetRecord>,
    tweet_merges: Vec<usize>,
    repositories: HashMap<i64, RepositoryRecord>,
    repository_merges: Vec<usize>,
    groups: HashMap<i64, MeetupGroupRecord>,
    events: HashMap<String, (i64, MeetupEventRecord)>,
    links: Vec<MemoryLink>,
}

impl MemoryState {
    fn link_mut(&mut self, id: &str) -> Option<&mut MemoryLink> {
        self.links.iter_mut().find(|l| l.id == id)
    }

    fn add_link(&mut self, url: &str, short: bool) {
        if self.links.iter().any(|l| l.url == url) {
            return;
        }
        let id = format!("link-{}", self.links.len() + 1);
        self.links.push(MemoryLink {
            id,
            url: url.to_string(),
            short,
            clean_url: None,
            title: None,
        });
    }
}

/// Stateful in-memory graph. Links are identified by `link-<n>` in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(self, url: &str, short: bool) -> Self {
        self.state.lock().unwrap().add_link(url, short);
        self
    }

    pub fn with_tweet(self, tweet: TweetRecord) -> Self {
        self.state.lock().unwrap().tweets.insert(tweet.id, tweet);
        self
    }

    pub fn links(&self) -> Vec<MemoryLink> {
        self.state.lock().unwrap().links.clone()
    }

    pub fn link(&self, url: &str) -> Option<MemoryLink> {
        self.links().into_iter().find(|l| l.url == url)
    }

    pub fn tweet(&self, id: i64) -> Option<TweetRecord> {
        self.state.lock().unwrap().tweets.get(&id).cloned()
    }

    pub fn tweet_count(&self) -> usize {
        self.state.lock().unwrap().tweets.len()
    }

    /// Size of each `merge_tweets` batch, in call order.
    pub fn tweet_merges(&self) -> Vec<usize> {
        self.state.lock().unwrap().tweet_merges.clone()
    }

    pub fn repository(&self, id: i64) -> Option<RepositoryRecord> {
        self.state.lock().unwrap().repositories.get(&id).cloned()
    }

    pub fn repository_merges(&self) -> Vec<usize> {
        self.state.lock().unwrap().repository_merges.clone()
    }

    pub fn group(&self, id: i64) -> Option<MeetupGroupRecord> {
        self.state.lock().unwrap().groups.get(&id).cloned()
    }

    /// Event ids contained in a group, sorted.
    pub fn group_events(&self, group_id: i64) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<String> = state
            .events
            .values()
            .filter(|(g, _)| *g == group_id)
            .map(|(_, e)| e.id.clone())
            .collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn max_tweet_id(&self) -> Result<Option<i64>> {
        Ok(self.state.lock().unwrap().tweets.keys().max().copied())
    }

    async fn merge_tweets(&self, tweets: &[TweetRecord]) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.tweet_merges.push(tweets.len());
        for tweet in tweets {
            for link in &tweet.links {
                state.add_link(&link.url, link.short);
            }
            state.tweets.insert(tweet.id, tweet.clone());
        }
        Ok(tweets.len() as u64)
    }

    async fn merge_repositories(&self, repos: &[RepositoryRecord]) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.repository_merges.push(repos.len());
        for repo in repos {
            state.repositories.insert(repo.id, repo.clone());
        }
        Ok(repos.len() as u64)
    }

    async fn merge_meetup_group(
        &self,
        group: &MeetupGroupRecord,
        events: &[MeetupEventRecord],
    ) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.groups.insert(group.id, group.clone());
        for event in events {
            state
                .events
                .insert(event.id.clone(), (group.id, event.clone()));
        }
        Ok(events.len() as u64)
    }

    async fn links_missing_clean_url(&self) -> Result<Vec<LinkRow>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .links
            .iter()
            .filter(|l| l.clean_url.is_none())
            .map(|l| LinkRow {
                id: l.id.clone(),
                url: l.url.clone(),
            })
            .collect())
    }

    async fn set_clean_urls(&self, updates: &[(String, String)]) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let mut updated = 0;
        for (id, clean) in updates {
            if let Some(link) = state.link_mut(id) {
                link.clean_url = Some(clean.clone());
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn short_links(&self, limit: i64) -> Result<Vec<LinkRow>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .links
            .iter()
            .filter(|l| l.short)
            .take(limit.max(0) as usize)
            .map(|l| LinkRow {
                id: l.id.clone(),
                url: l.url.clone(),
            })
            .collect())
    }

    async fn apply_unshortened(&self, links: &[ResolvedLink]) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let mut updated = 0;
        for resolved in links {
            if let Some(link) = state.link_mut(&resolved.id) {
                link.url = resolved.url.clone();
                link.short = false;
                if resolved.changed {
                    link.clean_url = None;
                }
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn links_missing_title(&self, limit: i64) -> Result<Vec<LinkRow>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .links
            .iter()
            .filter(|l| l.title.is_none())
            .take(limit.max(0) as usize)
            .map(|l| LinkRow {
                id: l.id.clone(),
                url: l.url.clone(),
            })
            .collect())
    }

    async fn set_link_title(&self, id: &str, title: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.link_mut(id) {
            Some(link) => {
                link.title = Some(title.to_string());
                Ok(())
            }
            None => Err(JobError::Database(format!("no link {id}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Upstream API mocks
// ---------------------------------------------------------------------------

/// `since_id` / `max_id` of one recorded search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchCall {
    pub since_id: Option<i64>,
    pub max_id: Option<i64>,
}

/// Returns canned pages (or failures) in order, then empty pages.
#[derive(Default)]
pub struct ScriptedTwitter {
    pages: Mutex<VecDeque<Result<SearchResponse>>>,
    calls: Mutex<Vec<SearchCall>>,
}

impl ScriptedTwitter {
    pub fn new(pages: Vec<SearchResponse>) -> Self {
        Self {
            pages: Mutex::new(pages.into_iter().map(Ok).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a failed request after the pages already scripted.
    pub fn then_fail(self, error: JobError) -> Self {
        self.pages.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TwitterSearch for ScriptedTwitter {
    async fn search(&self, params: &SearchParams<'_>) -> Result<SearchResponse> {
        self.calls.lock().unwrap().push(SearchCall {
            since_id: params.since_id,
            max_id: params.max_id,
        });
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(twitter_page(vec![], None)))
    }
}

/// Returns canned search pages in order; running out is an upstream error.
#[derive(Default)]
pub struct ScriptedGithub {
    pages: Mutex<VecDeque<SearchData>>,
    cursors: Mutex<Vec<Option<String>>>,
}

impl ScriptedGithub {
    pub fn new(pages: Vec<SearchData>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            cursors: Mutex::new(Vec::new()),
        }
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositorySearch for ScriptedGithub {
    async fn search_repositories(&self, _search: &str, cursor: Option<&str>) -> Result<SearchData> {
        self.cursors
            .lock()
            .unwrap()
            .push(cursor.map(str::to_string));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| JobError::Upstream("ScriptedGithub: no more pages".to_string()))
    }
}

/// Fixed groups, with events keyed by group urlname.
#[derive(Default)]
pub struct ScriptedMeetup {
    groups: Vec<Group>,
    events: HashMap<String, Vec<Event>>,
    windows: Mutex<Vec<String>>,
}

impl ScriptedMeetup {
    pub fn new(groups: Vec<Group>) -> Self {
        Self {
            groups,
            ..Self::default()
        }
    }

    pub fn on_events(mut self, urlname: &str, events: Vec<Event>) -> Self {
        self.events.insert(urlname.to_string(), events);
        self
    }

    /// `no_earlier_than` of every events request.
    pub fn windows(&self) -> Vec<String> {
        self.windows.lock().unwrap().clone()
    }
}

#[async_trait]
impl MeetupApi for ScriptedMeetup {
    async fn find_groups(&self, _text: &str) -> Result<Page<Group>> {
        Ok(Page {
            items: self.groups.clone(),
            rate_limit: MeetupRateLimit::default(),
        })
    }

    async fn group_events(&self, urlname: &str, no_earlier_than: &str) -> Result<Page<Event>> {
        self.windows
            .lock()
            .unwrap()
            .push(no_earlier_than.to_string());
        Ok(Page {
            items: self.events.get(urlname).cloned().unwrap_or_default(),
            rate_limit: MeetupRateLimit::default(),
        })
    }
}

// ---------------------------------------------------------------------------
// FakeWeb
// ---------------------------------------------------------------------------

/// URL-keyed HEAD responses and page bodies. Unregistered URLs fail to connect.
#[derive(Default)]
pub struct FakeWeb {
    heads: HashMap<String, HeadResponse>,
    pages: HashMap<String, std::result::Result<String, FetchFailure>>,
}

impl FakeWeb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.heads.insert(
            from.to_string(),
            HeadResponse {
                status: 301,
                location: Some(to.to_string()),
            },
        );
        self
    }

    pub fn ok(mut self, url: &str) -> Self {
        self.heads.insert(
            url.to_string(),
            HeadResponse {
                status: 200,
                location: None,
            },
        );
        self
    }

    pub fn on_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(html.to_string()));
        self
    }

    pub fn on_failure(mut self, url: &str, failure: FetchFailure) -> Self {
        self.pages.insert(url.to_string(), Err(failure));
        self
    }
}

#[async_trait]
impl Web for FakeWeb {
    async fn head(&self, url: &str) -> std::result::Result<HeadResponse, FetchFailure> {
        self.heads
            .get(url)
            .cloned()
            .ok_or_else(|| FetchFailure::Connect(format!("FakeWeb: no route to {url}")))
    }

    async fn get_text(&self, url: &str) -> std::result::Result<String, FetchFailure> {
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchFailure::Connect(format!("FakeWeb: no route to {url}"))))
    }
}

// ---------------------------------------------------------------------------
// Summary seams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
pub struct MemoryObjects {
    objects: Mutex<Vec<StoredObject>>,
}

impl MemoryObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjects {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        self.objects.lock().unwrap().push(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
        });
        Ok(())
    }
}

/// Fixed summary rows. Remembers the filters it was asked with.
#[derive(Default)]
pub struct StaticSummary {
    pub github: Vec<GithubActivity>,
    pub links: Vec<LinkScore>,
    pub events: Vec<MeetupListing>,
    filters: Mutex<Option<(Vec<String>, String)>>,
}

impl StaticSummary {
    pub fn new(
        github: Vec<GithubActivity>,
        links: Vec<LinkScore>,
        events: Vec<MeetupListing>,
    ) -> Self {
        Self {
            github,
            links,
            events,
            filters: Mutex::new(None),
        }
    }

    /// Core team and own domain passed by the last run.
    pub fn filters(&self) -> Option<(Vec<String>, String)> {
        self.filters.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummaryStore for StaticSummary {
    async fn github_activity(
        &self,
        _now: DateTime<Utc>,
        core_team: &[String],
    ) -> Result<Vec<GithubActivity>> {
        let mut filters = self.filters.lock().unwrap();
        let domain = filters.take().map(|(_, d)| d).unwrap_or_default();
        *filters = Some((core_team.to_vec(), domain));
        Ok(self.github.clone())
    }

    async fn twitter_links(&self, _now: DateTime<Utc>, own_domain: &str) -> Result<Vec<LinkScore>> {
        let mut filters = self.filters.lock().unwrap();
        let team = filters.take().map(|(t, _)| t).unwrap_or_default();
        *filters = Some((team, own_domain.to_string()));
        Ok(self.links.clone())
    }

    async fn meetup_events(&self, _now: DateTime<Utc>) -> Result<Vec<MeetupListing>> {
        Ok(self.events.clone())
    }
}

// ---------------------------------------------------------------------------
// Fixture builders
// ---------------------------------------------------------------------------

/// A tweet by `screen_name` carrying the given expanded URLs.
pub fn status(id: i64, screen_name: &str, urls: &[&str]) -> Status {
    Status {
        id,
        text: format!("tweet {id}"),
        created_at: "Wed May 08 12:00:00 +0000 2024".to_string(),
        favorite_count: 0,
        user: User {
            id: 1000 + id,
            screen_name: screen_name.to_string(),
            name: None,
            location: None,
            followers_count: 0,
            friends_count: 0,
            statuses_count: 0,
            profile_image_url: None,
        },
        entities: Entities {
            hashtags: vec![],
            urls: urls
                .iter()
                .map(|u| UrlEntity {
                    url: Some("https://t.co/x".to_string()),
                    expanded_url: Some(u.to_string()),
                })
                .collect(),
            user_mentions: vec![],
        },
        in_reply_to_status_id: None,
        retweeted_status: None,
    }
}

/// `n` tweets with ids `first..first + n`.
pub fn statuses(first: i64, n: usize) -> Vec<Status> {
    (0..n as i64).map(|i| status(first + i, "graphfan", &[])).collect()
}

pub fn twitter_page(statuses: Vec<Status>, next_max_id: Option<i64>) -> SearchResponse {
    SearchResponse {
        statuses,
        search_metadata: SearchMetadata {
            next_results: next_max_id.map(|id| format!("?max_id={id}&q=neo4j&include_entities=1")),
            count: Some(100),
        },
        backoff: None,
    }
}

pub fn repository(id: i64, owner: &str, stars: i64, forks: i64) -> Repository {
    let created_at = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .map(|d| d.with_timezone(&Utc))
        .unwrap();
    Repository {
        database_id: id,
        name: format!("repo-{id}"),
        url: format!("https://github.com/{owner}/repo-{id}"),
        pushed_at: Some(created_at),
        created_at,
        updated_at: created_at,
        disk_usage: Some(10),
        description: None,
        homepage_url: None,
        issues: Count { total_count: 0 },
        stargazers: Count { total_count: stars },
        watchers: Count { total_count: 1 },
        forks: Count { total_count: forks },
        languages: Languages { nodes: vec![] },
        owner: RepositoryOwner::User {
            login: owner.to_string(),
            name: None,
            database_id: 1,
            location: None,
        },
        default_branch_ref: Some(BranchRef {
            name: "main".to_string(),
        }),
    }
}

/// One search page. The rate limit is unspent and resets in the past, so no wait.
pub fn github_page(repos: Vec<Repository>, end_cursor: Option<&str>) -> SearchData {
    let reset_at = DateTime::parse_from_rfc3339("2000-01-01T00:00:00Z")
        .map(|d| d.with_timezone(&Utc))
        .unwrap();
    SearchData {
        rate_limit: GithubRateLimit {
            limit: 5000,
            cost: 1,
            remaining: 4000,
            reset_at,
        },
        search: SearchConnection {
            repository_count: repos.len() as i64,
            page_info: PageInfo {
                has_next_page: end_cursor.is_some(),
                end_cursor: end_cursor.map(str::to_string),
            },
            nodes: repos
                .into_iter()
                .map(|r| SearchNode::Repository(Box::new(r)))
                .collect(),
        },
    }
}

pub fn group(id: i64, urlname: &str) -> Group {
    Group {
        id,
        name: format!("{urlname} meetup"),
        urlname: urlname.to_string(),
        link: format!("https://www.meetup.com/{urlname}/"),
        members: 100,
        city: Some("London".to_string()),
        country: Some("gb".to_string()),
    }
}

pub fn event(id: &str, time: i64) -> Event {
    Event {
        id: id.to_string(),
        name: format!("Event {id}"),
        time,
        link: format!("https://www.meetup.com/events/{id}/"),
        status: Some("upcoming".to_string()),
        yes_rsvp_count: 12,
        venue: None,
    }
}

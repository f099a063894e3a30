//! Flat projections written to and read from the graph. Importers build these
//! from API payloads; the writer turns them into UNWIND parameters.

use neo4rs::BoltType;

use crate::bolt;

#[derive(Debug, Clone, PartialEq)]
pub struct TweetRecord {
    pub id: i64,
    pub text: String,
    /// Twitter's own rendering, kept verbatim.
    pub created_at: String,
    /// Epoch seconds parsed from `created_at`.
    pub created: Option<i64>,
    pub favorites: i64,
    pub user: TweetUser,
    /// Lower-cased hashtag names.
    pub hashtags: Vec<String>,
    pub links: Vec<LinkRef>,
    pub mentions: Vec<Mention>,
    pub reply_to: Option<i64>,
    pub retweet_of: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TweetUser {
    pub id: i64,
    pub screen_name: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub followers: i64,
    pub following: i64,
    pub statuses: i64,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkRef {
    pub url: String,
    /// Flag the link for the unshorten pass.
    pub short: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    pub id: i64,
    pub screen_name: String,
    pub name: Option<String>,
}

impl TweetRecord {
    pub(crate) fn to_bolt(&self) -> BoltType {
        let u = &self.user;
        bolt::map([
            ("id", bolt::int(self.id)),
            ("text", bolt::string(&self.text)),
            ("created_at", bolt::string(&self.created_at)),
            ("created", bolt::opt_int(self.created)),
            ("favorites", bolt::int(self.favorites)),
            (
                "user",
                bolt::map([
                    ("id", bolt::int(u.id)),
                    ("screen_name", bolt::string(&u.screen_name)),
                    ("name", bolt::opt_string(u.name.as_deref())),
                    ("location", bolt::opt_string(u.location.as_deref())),
                    ("followers", bolt::int(u.followers)),
                    ("following", bolt::int(u.following)),
                    ("statuses", bolt::int(u.statuses)),
                    ("profile_image_url", bolt::opt_string(u.profile_image_url.as_deref())),
                ]),
            ),
            (
                "hashtags",
                bolt::list(self.hashtags.iter().map(|h| bolt::string(h)).collect()),
            ),
            (
                "links",
                bolt::list(
                    self.links
                        .iter()
                        .map(|l| {
                            bolt::map([
                                ("url", bolt::string(&l.url)),
                                ("short", bolt::boolean(l.short)),
                            ])
                        })
                        .collect(),
                ),
            ),
            (
                "mentions",
                bolt::list(
                    self.mentions
                        .iter()
                        .map(|m| {
                            bolt::map([
                                ("id", bolt::int(m.id)),
                                ("screen_name", bolt::string(&m.screen_name)),
                                ("name", bolt::opt_string(m.name.as_deref())),
                            ])
                        })
                        .collect(),
                ),
            ),
            ("reply_to", bolt::opt_int(self.reply_to)),
            ("retweet_of", bolt::opt_int(self.retweet_of)),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryRecord {
    pub id: i64,
    pub title: String,
    pub full_name: String,
    pub url: String,
    /// Epoch millis.
    pub created: i64,
    pub created_at: String,
    pub homepage: Option<String>,
    /// Stargazer count.
    pub favorites: i64,
    pub forks: i64,
    pub watchers: i64,
    pub open_issues: i64,
    /// Epoch millis.
    pub updated: i64,
    pub updated_at: String,
    pub pushed: Option<String>,
    pub size: Option<i64>,
    pub language: Option<String>,
    pub branch: Option<String>,
    pub description: Option<String>,
    pub owner: OwnerRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnerRecord {
    pub id: i64,
    pub login: String,
    /// `User` or `Organization`.
    pub kind: String,
    pub full_name: Option<String>,
    pub location: Option<String>,
}

impl RepositoryRecord {
    pub(crate) fn to_bolt(&self) -> BoltType {
        let o = &self.owner;
        bolt::map([
            ("id", bolt::int(self.id)),
            ("title", bolt::string(&self.title)),
            ("full_name", bolt::string(&self.full_name)),
            ("url", bolt::string(&self.url)),
            ("created", bolt::int(self.created)),
            ("created_at", bolt::string(&self.created_at)),
            ("homepage", bolt::opt_string(self.homepage.as_deref())),
            ("favorites", bolt::int(self.favorites)),
            ("forks", bolt::int(self.forks)),
            ("watchers", bolt::int(self.watchers)),
            ("open_issues", bolt::int(self.open_issues)),
            ("updated", bolt::int(self.updated)),
            ("updated_at", bolt::string(&self.updated_at)),
            ("pushed", bolt::opt_string(self.pushed.as_deref())),
            ("size", bolt::opt_int(self.size)),
            ("language", bolt::opt_string(self.language.as_deref())),
            ("branch", bolt::opt_string(self.branch.as_deref())),
            ("description", bolt::opt_string(self.description.as_deref())),
            (
                "owner",
                bolt::map([
                    ("id", bolt::int(o.id)),
                    ("login", bolt::string(&o.login)),
                    ("kind", bolt::string(&o.kind)),
                    ("full_name", bolt::opt_string(o.full_name.as_deref())),
                    ("location", bolt::opt_string(o.location.as_deref())),
                ]),
            ),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeetupGroupRecord {
    pub id: i64,
    pub name: String,
    pub urlname: String,
    pub link: String,
    pub members: i64,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl MeetupGroupRecord {
    pub(crate) fn to_bolt(&self) -> BoltType {
        bolt::map([
            ("id", bolt::int(self.id)),
            ("name", bolt::string(&self.name)),
            ("urlname", bolt::string(&self.urlname)),
            ("link", bolt::string(&self.link)),
            ("members", bolt::int(self.members)),
            ("city", bolt::opt_string(self.city.as_deref())),
            ("country", bolt::opt_string(self.country.as_deref())),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeetupEventRecord {
    pub id: String,
    pub name: String,
    /// Epoch millis.
    pub time: i64,
    pub link: String,
    pub status: Option<String>,
    pub yes_rsvp_count: i64,
    pub venue_name: Option<String>,
    pub venue_city: Option<String>,
}

impl MeetupEventRecord {
    pub(crate) fn to_bolt(&self) -> BoltType {
        bolt::map([
            ("id", bolt::string(&self.id)),
            ("name", bolt::string(&self.name)),
            ("time", bolt::int(self.time)),
            ("link", bolt::string(&self.link)),
            ("status", bolt::opt_string(self.status.as_deref())),
            ("yes_rsvp_count", bolt::int(self.yes_rsvp_count)),
            ("venue_name", bolt::opt_string(self.venue_name.as_deref())),
            ("venue_city", bolt::opt_string(self.venue_city.as_deref())),
        ])
    }
}

/// A Link node addressed by its element id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRow {
    pub id: String,
    pub url: String,
}

/// Outcome of unshortening one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub id: String,
    pub url: String,
    /// The resolved URL differs from the stored one, so `clean_url` is stale.
    pub changed: bool,
}

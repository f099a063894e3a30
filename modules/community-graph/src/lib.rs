mod bolt;
pub mod client;
pub mod migrate;
pub mod reader;
pub mod records;
pub mod writer;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use client::GraphClient;
pub use neo4rs::query;
pub use reader::{GithubActivity, LinkScore, MeetupListing, SummaryReader};
pub use records::{
    LinkRef, LinkRow, MeetupEventRecord, MeetupGroupRecord, Mention, OwnerRecord,
    RepositoryRecord, ResolvedLink, TweetRecord, TweetUser,
};
pub use writer::GraphWriter;

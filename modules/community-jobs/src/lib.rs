pub mod error;
pub mod github;
pub mod links;
pub mod meetup;
pub mod summary;
pub mod traits;
pub mod twitter;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{FetchFailure, JobError, Result};

//! Maintenance passes over `:Link` nodes created by the Twitter importer.

pub mod clean;
pub mod hydrate;
pub mod unshorten;
pub mod web;

pub use clean::{clean_links, clean_url};
pub use hydrate::{extract_title, hydrate_links, NO_TITLE};
pub use unshorten::{unshorten_links, unshorten_url};
pub use web::HttpWeb;

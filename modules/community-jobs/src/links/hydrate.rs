use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::error::Result;
use crate::traits::{GraphStore, Web};

/// Links hydrated per run.
pub const HYDRATE_BATCH: i64 = 100;

/// Stored when a page has no usable title.
pub const NO_TITLE: &str = "N/A";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex"));

/// Text of the first `<title>`, entity-decoded with whitespace collapsed.
/// `None` when there is no title or it is blank.
pub fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE_RE.captures(html)?.get(1)?.as_str();
    let decoded = decode_entities(raw);
    let title = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let hex = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"));
            let decoded = if let Some(hex) = hex {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    "ndash" => Some('\u{2013}'),
                    "mdash" => Some('\u{2014}'),
                    "hellip" => Some('\u{2026}'),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Fetch titles for the newest untitled links. Every selected link gets a
/// title, [`NO_TITLE`] when the page could not be fetched or has none.
pub async fn hydrate_links(store: &impl GraphStore, web: &impl Web, limit: i64) -> Result<u64> {
    let links = store.links_missing_title(limit).await?;
    let mut titled = 0u64;

    for link in &links {
        info!(url = link.url.as_str(), "Processing link");
        let title = match web.get_text(&link.url).await {
            Ok(html) => extract_title(&html),
            Err(failure) => {
                warn!(url = link.url.as_str(), error = %failure, "Failed to fetch link");
                None
            }
        };

        match title {
            Some(title) => {
                titled += 1;
                store.set_link_title(&link.id, &title).await?;
            }
            None => store.set_link_title(&link.id, NO_TITLE).await?,
        }
    }

    info!(links = links.len(), titled, "Hydrate pass complete");
    Ok(links.len() as u64)
}

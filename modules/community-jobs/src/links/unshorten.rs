use std::collections::HashSet;

use tracing::{info, warn};

use community_graph::ResolvedLink;

use crate::error::{FetchFailure, Result};
use crate::traits::{GraphStore, Web};

/// Links resolved per run.
pub const UNSHORTEN_BATCH: i64 = 1000;

/// URLs shorter than this are not worth a request.
const MIN_RESOLVABLE_LEN: usize = 11;

/// Redirect targets up to this length are assumed to be further shorteners.
const MAX_SHORT_TARGET_LEN: usize = 22;

/// Follow the redirect chain behind a short URL with HEAD requests.
///
/// A target that is long, or equal to the URL that produced it, ends the
/// chain. Revisiting a URL is a [`FetchFailure::RedirectLoop`].
pub async fn unshorten_url(
    web: &impl Web,
    url: &str,
) -> std::result::Result<String, FetchFailure> {
    let mut current = url.to_string();
    let mut seen = HashSet::from([current.clone()]);

    loop {
        if current.chars().count() < MIN_RESOLVABLE_LEN {
            return Ok(current);
        }

        let head = web.head(&current).await?;
        let location = match head.location {
            Some(location) if (300..400).contains(&head.status) => location,
            _ => return Ok(current),
        };
        let target = resolve_location(&current, &location)?;

        if target == current || target.chars().count() > MAX_SHORT_TARGET_LEN {
            return Ok(target);
        }
        if !seen.insert(target.clone()) {
            return Err(FetchFailure::RedirectLoop(target));
        }
        current = target;
    }
}

fn resolve_location(base: &str, location: &str) -> std::result::Result<String, FetchFailure> {
    let base = url::Url::parse(base).map_err(|e| FetchFailure::Malformed(e.to_string()))?;
    base.join(location)
        .map(|u| u.to_string())
        .map_err(|e| FetchFailure::Malformed(format!("Location {location:?}: {e}")))
}

/// Resolve a batch of short links and write the results in one update.
/// Links that fail to resolve stay flagged for the next run.
pub async fn unshorten_links(store: &impl GraphStore, web: &impl Web, limit: i64) -> Result<u64> {
    let links = store.short_links(limit).await?;
    let mut resolved = Vec::with_capacity(links.len());
    let mut failed = 0usize;

    for link in links {
        match unshorten_url(web, &link.url).await {
            Ok(url) => {
                info!(original = link.url.as_str(), resolved = url.as_str(), "Unshortened link");
                let changed = url != link.url;
                resolved.push(ResolvedLink {
                    id: link.id,
                    url,
                    changed,
                });
            }
            Err(failure) => {
                failed += 1;
                warn!(url = link.url.as_str(), error = %failure, "Failed to resolve link, skipping");
            }
        }
    }

    let changed = resolved.iter().filter(|l| l.changed).count();
    let updated = store.apply_unshortened(&resolved).await?;
    info!(updated, changed, failed, "Unshorten pass complete");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_locations_resolve_against_the_current_url() {
        assert_eq!(
            resolve_location("https://bit.ly/abc", "/landing").unwrap(),
            "https://bit.ly/landing"
        );
        assert_eq!(
            resolve_location("https://bit.ly/abc", "https://example.com/x").unwrap(),
            "https://example.com/x"
        );
    }
}

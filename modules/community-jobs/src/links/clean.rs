use tracing::info;

use crate::error::Result;
use crate::traits::GraphStore;

const TRACKING_PARAMS: &[&str] = &[
    "utm_content",
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
];

/// Strip campaign tracking parameters. The remaining `&`-separated pieces
/// are kept byte for byte and in order; URLs that do not parse, have no
/// query, or carry no tracking parameters come back unchanged.
pub fn clean_url(url: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url) else {
        return url.to_string();
    };
    let Some(query) = parsed.query() else {
        return url.to_string();
    };

    let pieces: Vec<&str> = query.split('&').collect();
    let kept: Vec<&str> = pieces
        .iter()
        .copied()
        .filter(|piece| !is_tracking(piece))
        .collect();

    if kept.len() == pieces.len() {
        return url.to_string();
    }

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        let query = kept.join("&");
        parsed.set_query(Some(&query));
    }

    parsed.to_string()
}

/// Whether a raw `key=value` piece names a tracking parameter, comparing the
/// percent-decoded key.
fn is_tracking(piece: &str) -> bool {
    url::form_urlencoded::parse(piece.as_bytes())
        .next()
        .is_some_and(|(key, _)| TRACKING_PARAMS.contains(&key.as_ref()))
}

/// Give every link without a canonical URL one, in a single batched write.
pub async fn clean_links(store: &impl GraphStore) -> Result<u64> {
    let links = store.links_missing_clean_url().await?;
    let updates: Vec<(String, String)> = links
        .into_iter()
        .map(|link| {
            let clean = clean_url(&link.url);
            (link.id, clean)
        })
        .collect();

    let updated = store.set_clean_urls(&updates).await?;
    info!(candidates = updates.len(), updated, "Cleaned link URLs");
    Ok(updated)
}

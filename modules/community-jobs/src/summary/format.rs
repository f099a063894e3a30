use chrono::{DateTime, Utc};

const TITLE_LIMIT: usize = 75;

const UNITS: &[(i64, &str)] = &[
    (365 * 24 * 3600, "year"),
    (24 * 3600, "day"),
    (3600, "hour"),
    (60, "minute"),
    (1, "second"),
];

/// Relative time in the largest whole unit: `3 days ago`, `in 1 hour`.
pub fn humanise(epoch_millis: i64, now: DateTime<Utc>) -> String {
    let delta = (epoch_millis - now.timestamp_millis()) / 1000;
    let seconds = delta.abs();

    let Some((amount, unit)) = UNITS
        .iter()
        .find(|(size, _)| seconds >= *size)
        .map(|(size, unit)| (seconds / size, *unit))
    else {
        return "just now".to_string();
    };

    let plural = if amount == 1 { "" } else { "s" };
    if delta < 0 {
        format!("{amount} {unit}{plural} ago")
    } else {
        format!("in {amount} {unit}{plural}")
    }
}

/// Cut `text` to 75 characters, marking the cut with `..`.
pub fn shorten(text: &str) -> String {
    if text.chars().count() > TITLE_LIMIT {
        let head: String = text.chars().take(TITLE_LIMIT).collect();
        format!("{head}..")
    } else {
        text.to_string()
    }
}

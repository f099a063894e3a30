//! Builders for UNWIND payloads.

use neo4rs::{BoltBoolean, BoltInteger, BoltMap, BoltNull, BoltString, BoltType};

pub(crate) fn map<const N: usize>(entries: [(&str, BoltType); N]) -> BoltType {
    BoltType::Map(BoltMap::from_iter(
        entries
            .into_iter()
            .map(|(k, v)| (BoltString::from(k), v)),
    ))
}

pub(crate) fn string(value: &str) -> BoltType {
    BoltType::String(BoltString::from(value))
}

pub(crate) fn opt_string(value: Option<&str>) -> BoltType {
    value.map(string).unwrap_or(BoltType::Null(BoltNull))
}

pub(crate) fn int(value: i64) -> BoltType {
    BoltType::Integer(BoltInteger::new(value))
}

pub(crate) fn opt_int(value: Option<i64>) -> BoltType {
    value.map(int).unwrap_or(BoltType::Null(BoltNull))
}

pub(crate) fn boolean(value: bool) -> BoltType {
    BoltType::Boolean(BoltBoolean::new(value))
}

pub(crate) fn list(values: Vec<BoltType>) -> BoltType {
    BoltType::from(values)
}

use std::collections::HashSet;
use std::hash::Hash;

use crate::inventory::element::{ElementCategory, ElementRecord};

/// Default number of element-derived test cases per request.
pub const DEFAULT_BUDGET: usize = 30;

/// Drop later records whose key collides with an earlier one. Order is
/// preserved and the first occurrence always wins.
pub fn dedupe_by<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Everything a rendered test case depends on. Two records with the same key
/// would produce identical test bodies.
pub fn render_key(record: &ElementRecord) -> (ElementCategory, String, Option<String>, Option<String>) {
    (
        record.category,
        record.text.clone(),
        record.name.clone(),
        record.identifier.clone(),
    )
}

/// Dedupe on [`render_key`] and keep the first `budget` records.
///
/// Deduplicating means a page with N visible elements can yield fewer than
/// N cases. The generator therefore calls [`select_with`] with dedup off
/// unless the request asks for it.
pub fn select(records: Vec<ElementRecord>, budget: usize) -> Vec<ElementRecord> {
    select_with(records, budget, true)
}

/// Like [`select`], with deduplication optional.
pub fn select_with(records: Vec<ElementRecord>, budget: usize, dedupe: bool) -> Vec<ElementRecord> {
    let records = if dedupe {
        dedupe_by(records, render_key)
    } else {
        records
    };
    records.into_iter().take(budget).collect()
}

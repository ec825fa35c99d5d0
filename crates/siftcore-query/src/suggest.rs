use std::collections::HashSet;

use siftcore_index::{FilterContext, Record};

use crate::matcher::contains_case_insensitive;

/// Tag names worth offering for the current query. Tags are collected from
/// live (non-trashed) records, deduplicated case-insensitively keeping the
/// first spelling seen, and exclude the tag that is already open.
pub fn tag_suggestions(records: &[Record], ctx: &FilterContext) -> Vec<String> {
    let trimmed = ctx.query.trim();
    let needle = trimmed
        .strip_prefix("tag:")
        .unwrap_or(trimmed)
        .to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let opened = ctx.tag.as_deref().map(str::to_lowercase);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for record in records.iter().filter(|record| !record.content.trashed) {
        for tag in &record.content.tags {
            let lower = tag.to_lowercase();
            if opened.as_deref() == Some(lower.as_str()) {
                continue;
            }
            if !contains_case_insensitive(tag, &needle) {
                continue;
            }
            if seen.insert(lower) {
                out.push(tag.clone());
            }
        }
    }

    out
}

//! Deduplication/sanitization filter for fetched article lists.
//!
//! # Invariants
//! - Output never contains a record without an identifier.
//! - Output never contains two records with the same identifier.
//! - Output never contains two records whose trimmed, lowercased titles are
//!   equal (blank titles excluded).
//! - Survivors keep their first-occurrence order; first occurrence wins.
//! - The filter is a fixed point: applying it to its own output is a no-op.

use crate::model::article::Article;
use crate::model::record::ArticleRecord;
use log::debug;
use std::collections::HashSet;

/// Access to the two keys the filter deduplicates on.
pub trait ListedRecord {
    fn record_id(&self) -> Option<&str>;
    fn record_title(&self) -> Option<&str>;
}

impl ListedRecord for ArticleRecord {
    fn record_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn record_title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl ListedRecord for Article {
    fn record_id(&self) -> Option<&str> {
        Some(self.id.as_str())
    }

    fn record_title(&self) -> Option<&str> {
        Some(self.title.as_str())
    }
}

/// Filters `records` down to unique identifiers and unique titles.
pub fn dedup_records<T: ListedRecord>(records: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen_ids = HashSet::new();
    let mut seen_titles = HashSet::new();
    let mut kept = Vec::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(id) = record
            .record_id()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        else {
            dropped += 1;
            continue;
        };
        if seen_ids.contains(id) {
            dropped += 1;
            continue;
        }

        let title_key = record.record_title().and_then(title_key);
        if let Some(key) = title_key.as_ref() {
            if seen_titles.contains(key) {
                dropped += 1;
                continue;
            }
        }

        seen_ids.insert(id.to_string());
        if let Some(key) = title_key {
            seen_titles.insert(key);
        }
        kept.push(record);
    }

    if dropped > 0 {
        debug!(
            "event=dedup module=filter status=ok kept={} dropped={}",
            kept.len(),
            dropped
        );
    }
    kept
}

fn title_key(title: &str) -> Option<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

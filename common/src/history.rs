//! History views over the record store
//!
//! Listing, sorting, search and summaries. Nothing here keeps its own copy
//! of the data; every listing is derived from the store's keys.

use crate::error::{Error, Result};
use crate::record::Record;
use crate::store::{parse_record_key, KeyValueBackend, RecordStore};
use chrono::{DateTime, Utc};
use log::warn;

/// Characters of the problem description shown in a summary
pub const SUMMARY_LENGTH: usize = 100;
pub const SUMMARY_MARKER: &str = "...";
pub const SUMMARY_PLACEHOLDER: &str = "Tidak ada ringkasan";

/// One stored record with its key and creation time
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub record: Record,
}

impl HistoryEntry {
    pub fn summary(&self) -> String {
        summarize(&self.record)
    }
}

/// Result of a listing: readable entries, newest first, plus unreadable keys
#[derive(Debug, Clone, Default)]
pub struct HistoryListing {
    pub entries: Vec<HistoryEntry>,
    pub skipped: Vec<String>,
}

impl HistoryListing {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decode every record, newest first.
///
/// Entries that fail to decode (or whose key carries no valid timestamp)
/// are skipped and reported in one warning.
pub fn list_summaries<B: KeyValueBackend>(store: &RecordStore<B>) -> Result<HistoryListing> {
    let mut listing = HistoryListing::default();

    for key in store.list_keys()? {
        let Some(created_at) = parse_record_key(&key) else {
            listing.skipped.push(key);
            continue;
        };
        match store.get(&key) {
            Ok(record) => listing.entries.push(HistoryEntry {
                key,
                created_at,
                record,
            }),
            Err(Error::Decode { .. }) | Err(Error::NotFound(_)) => listing.skipped.push(key),
            Err(e) => return Err(e),
        }
    }

    if !listing.skipped.is_empty() {
        warn!(
            "skipped {} unreadable history entries: {}",
            listing.skipped.len(),
            listing.skipped.join(", ")
        );
    }

    listing
        .entries
        .sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.key.cmp(&a.key)));
    Ok(listing)
}

/// Case-insensitive substring match on student name or class.
///
/// An empty query keeps everything; input order is preserved.
pub fn filter<'a>(entries: &'a [HistoryEntry], query: &str) -> Vec<&'a HistoryEntry> {
    let query = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            query.is_empty()
                || entry.record.student_name.to_lowercase().contains(&query)
                || entry.record.class.to_lowercase().contains(&query)
        })
        .collect()
}

/// First [`SUMMARY_LENGTH`] characters of the problem description plus `...`
pub fn summarize(record: &Record) -> String {
    let problem = record.problem.trim();
    if problem.is_empty() {
        return SUMMARY_PLACEHOLDER.to_string();
    }
    let head: String = problem.chars().take(SUMMARY_LENGTH).collect();
    format!("{}{}", head, SUMMARY_MARKER)
}

/// Full record for the detail view
pub fn view<B: KeyValueBackend>(store: &RecordStore<B>, key: &str) -> Result<HistoryEntry> {
    let created_at = parse_record_key(key).ok_or_else(|| Error::NotFound(key.to_string()))?;
    let record = store.get(key)?;
    Ok(HistoryEntry {
        key: key.to_string(),
        created_at,
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use chrono::{Duration, NaiveDate, TimeZone};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    fn record(name: &str, class: &str, problem: &str) -> Record {
        Record {
            student_name: name.to_string(),
            class: class.to_string(),
            session_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            focus_area: "Pribadi".to_string(),
            problem: problem.to_string(),
            goal: "g".to_string(),
            activity: "a".to_string(),
            outcome: "o".to_string(),
            teacher_note: "n".to_string(),
            teacher_name: "Pak Budi".to_string(),
            student_signature: "data:image/png;base64,AAAA".to_string(),
            teacher_signature: "data:image/png;base64,AAAA".to_string(),
        }
    }

    /// Store whose clock advances one minute per save
    fn ticking_store() -> RecordStore<MemoryBackend> {
        let base = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        let minutes = Arc::new(AtomicI64::new(0));
        RecordStore::with_clock(MemoryBackend::new(), move || {
            base + Duration::minutes(minutes.fetch_add(1, Ordering::SeqCst))
        })
    }

    #[test]
    fn test_newest_first() {
        let mut store = ticking_store();
        store.save(&record("Ani", "X-1", "p")).unwrap();
        store.save(&record("Budi", "X-2", "p")).unwrap();
        store.save(&record("Citra", "XI-1", "p")).unwrap();

        let listing = list_summaries(&store).unwrap();
        let names: Vec<&str> = listing
            .entries
            .iter()
            .map(|e| e.record.student_name.as_str())
            .collect();
        assert_eq!(names, vec!["Citra", "Budi", "Ani"]);
        assert!(listing.skipped.is_empty());
    }

    #[test]
    fn test_corrupt_entries_are_skipped_not_fatal() {
        let mut store = ticking_store();
        store.save(&record("Ani", "X-1", "p")).unwrap();
        store
            .backend_mut()
            .set_item("record:2024-02-01T00:00:00.000Z", "{broken")
            .unwrap();
        store.backend_mut().set_item("record:not-a-date", "{}").unwrap();

        let listing = list_summaries(&store).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.skipped.len(), 2);
    }

    #[test]
    fn test_filter_empty_query_keeps_all_in_order() {
        let mut store = ticking_store();
        store.save(&record("Ani", "X-1", "p")).unwrap();
        store.save(&record("Budi", "X-2", "p")).unwrap();
        let listing = list_summaries(&store).unwrap();

        let all = filter(&listing.entries, "");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], &listing.entries[0]);
        assert_eq!(all[1], &listing.entries[1]);
    }

    #[test]
    fn test_filter_matches_name_or_class_case_insensitive() {
        let mut store = ticking_store();
        store.save(&record("Ani Wijaya", "X-1", "p")).unwrap();
        store.save(&record("Budi", "XI-IPA", "p")).unwrap();
        store.save(&record("Citra", "X-2", "p")).unwrap();
        let listing = list_summaries(&store).unwrap();

        let by_name: Vec<&str> = filter(&listing.entries, "WIJ")
            .iter()
            .map(|e| e.record.student_name.as_str())
            .collect();
        assert_eq!(by_name, vec!["Ani Wijaya"]);

        let by_class: Vec<&str> = filter(&listing.entries, "ipa")
            .iter()
            .map(|e| e.record.student_name.as_str())
            .collect();
        assert_eq!(by_class, vec!["Budi"]);

        let by_prefix: Vec<&str> = filter(&listing.entries, "x-")
            .iter()
            .map(|e| e.record.student_name.as_str())
            .collect();
        assert_eq!(by_prefix, vec!["Citra", "Ani Wijaya"]);

        assert!(filter(&listing.entries, "zzz").is_empty());
    }

    #[test]
    fn test_summarize() {
        assert_eq!(summarize(&record("A", "B", "")), SUMMARY_PLACEHOLDER);
        assert_eq!(summarize(&record("A", "B", "Singkat")), "Singkat...");

        let long = "é".repeat(150);
        let summary = summarize(&record("A", "B", &long));
        assert_eq!(summary.chars().count(), SUMMARY_LENGTH + SUMMARY_MARKER.len());
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_view_and_not_found() {
        let mut store = ticking_store();
        let key = store.save(&record("Ani", "X-1", "p")).unwrap();

        let entry = view(&store, &key).unwrap();
        assert_eq!(entry.record.student_name, "Ani");

        store.delete(&key).unwrap();
        assert!(matches!(view(&store, &key), Err(Error::NotFound(_))));
    }
}

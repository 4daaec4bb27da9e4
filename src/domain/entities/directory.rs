//! Directory snapshots and their version metadata.
//!
//! A [`DirectorySnapshot`] is immutable once constructed; a refresh publishes
//! a whole new snapshot, it never mutates entries in place. Staleness is
//! derived from the [`VersionStamp`] timestamp, never stored.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::bang::BangEntry;

/// Version metadata attached to every stored directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionStamp {
    pub timestamp: DateTime<Utc>,
    pub content_hash: String,
}

impl VersionStamp {
    pub fn new(timestamp: DateTime<Utc>, content_hash: String) -> Self {
        Self {
            timestamp,
            content_hash,
        }
    }

    /// Stamps `body` with the current time and its SHA-256 fingerprint.
    pub fn for_content(body: &str) -> Self {
        Self::new(Utc::now(), content_hash(body))
    }
}

/// SHA-256 hex digest used to detect whether upstream content changed.
pub fn content_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

/// The unit stored in the persistent snapshot cache.
///
/// Entries and stamp are one serialized document so a reader can never
/// observe a stamp without its snapshot or vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub entries: Vec<BangEntry>,
    pub stamp: VersionStamp,
}

impl CacheRecord {
    pub fn new(entries: Vec<BangEntry>, stamp: VersionStamp) -> Self {
        Self { entries, stamp }
    }

    /// True while `now - stamp.timestamp < ttl`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.stamp.timestamp < ttl
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.is_fresh_at(Utc::now(), ttl)
    }

    pub fn into_snapshot(self) -> DirectorySnapshot {
        DirectorySnapshot::new(self.entries, self.stamp)
    }
}

/// An immutable, versioned instance of the bang directory.
///
/// Lookup is case-insensitive over a lowercase trigger index built once at
/// construction. Duplicate triggers resolve last-writer-wins, so the order of
/// the source list determines precedence.
#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    entries: Vec<BangEntry>,
    index: HashMap<String, usize>,
    stamp: VersionStamp,
}

impl DirectorySnapshot {
    pub fn new(entries: Vec<BangEntry>, stamp: VersionStamp) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            index.insert(entry.trigger.to_ascii_lowercase(), position);
        }
        Self {
            entries,
            index,
            stamp,
        }
    }

    /// Hard-coded minimal directory, the terminal level of the fallback
    /// chain. Non-empty by construction and always covers the stock default
    /// trigger `g`.
    ///
    /// Stamped at the Unix epoch: the embedded directory is never fresh, so
    /// serving it keeps every later load retrying the real source.
    pub fn embedded() -> Self {
        let entries = vec![
            BangEntry::new("g", "www.google.com", "https://www.google.com/search?q={{{s}}}"),
            BangEntry::new("ddg", "duckduckgo.com", "https://duckduckgo.com/?q={{{s}}}"),
            BangEntry::new("gh", "github.com", "https://github.com/search?q={{{s}}}"),
            BangEntry::new("w", "en.wikipedia.org", "https://en.wikipedia.org/wiki/Special:Search?search={{{s}}}"),
        ];
        let body = serde_json::to_string(&entries).unwrap_or_default();
        Self::new(entries, VersionStamp::new(DateTime::UNIX_EPOCH, content_hash(&body)))
    }

    /// Finds the entry for a trigger, ignoring ASCII case.
    pub fn lookup(&self, trigger: &str) -> Option<&BangEntry> {
        self.index
            .get(&trigger.to_ascii_lowercase())
            .map(|position| &self.entries[*position])
    }

    /// First entry of the source list, the last resort before `ShowDefault`.
    pub fn first(&self) -> Option<&BangEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[BangEntry] {
        &self.entries
    }

    pub fn stamp(&self) -> &VersionStamp {
        &self.stamp
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp() -> VersionStamp {
        VersionStamp::new(Utc::now(), "abc".to_string())
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let snapshot = DirectorySnapshot::new(
            vec![BangEntry::new("gh", "github.com", "https://github.com/search?q={{{s}}}")],
            stamp(),
        );

        assert!(snapshot.lookup("gh").is_some());
        assert!(snapshot.lookup("GH").is_some());
        assert!(snapshot.lookup("yt").is_none());
    }

    #[test]
    fn test_duplicate_triggers_last_writer_wins() {
        let snapshot = DirectorySnapshot::new(
            vec![
                BangEntry::new("g", "old.example.com", "https://old.example.com/?q={{{s}}}"),
                BangEntry::new("g", "new.example.com", "https://new.example.com/?q={{{s}}}"),
            ],
            stamp(),
        );

        assert_eq!(snapshot.lookup("g").unwrap().domain, "new.example.com");
        // The first entry stays the first entry regardless of the index.
        assert_eq!(snapshot.first().unwrap().domain, "old.example.com");
    }

    #[test]
    fn test_embedded_directory_is_never_empty_and_never_fresh() {
        let snapshot = DirectorySnapshot::embedded();

        assert!(!snapshot.is_empty());
        assert!(snapshot.lookup("g").is_some());

        let record = CacheRecord::new(snapshot.entries().to_vec(), snapshot.stamp().clone());
        assert!(!record.is_fresh(Duration::hours(24)));
    }

    #[test]
    fn test_freshness_boundary() {
        let written_at = Utc::now();
        let record = CacheRecord::new(
            vec![BangEntry::new("g", "www.google.com", "https://www.google.com/search?q={{{s}}}")],
            VersionStamp::new(written_at, "abc".to_string()),
        );
        let ttl = Duration::hours(24);

        assert!(record.is_fresh_at(written_at + Duration::hours(23) + Duration::minutes(59), ttl));
        assert!(!record.is_fresh_at(written_at + Duration::hours(24) + Duration::minutes(1), ttl));
        assert!(!record.is_fresh_at(written_at + Duration::hours(24), ttl));
    }

    #[test]
    fn test_content_hash_is_stable_and_content_sensitive() {
        let a = content_hash("[]");
        let b = content_hash("[]");
        let c = content_hash("[{}]");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_cache_record_round_trips_through_serde() {
        let record = CacheRecord::new(
            vec![BangEntry::new("gh", "github.com", "https://github.com/search?q={{{s}}}")],
            VersionStamp::new(Utc::now(), "deadbeef".to_string()),
        );

        let json = serde_json::to_string(&record).unwrap();
        let restored: CacheRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.entries, record.entries);
        assert_eq!(restored.stamp, record.stamp);
    }
}

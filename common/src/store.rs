//! Record store over a flat key-value namespace
//!
//! Key classes:
//! - `record:<ISO-8601>`: one saved session each, the timestamp is the sort key
//! - [`DRAFT_KEY`]: the single auto-saved draft slot
//!
//! Other keys may share the namespace and are left alone.

use crate::error::{Error, Result};
use crate::record::{FormState, Record};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use log::{debug, error, warn};
use std::collections::BTreeMap;

pub const RECORD_PREFIX: &str = "record:";
pub const DRAFT_KEY: &str = "jurnal_autosave";
/// Prefix used by entries written before the `record:` convention
pub const LEGACY_PREFIX: &str = "jurnal_";

/// Minimal storage contract, modelled on the browser's `localStorage`.
pub trait KeyValueBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Fails with [`Error::StorageFull`] when capacity is exceeded.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;

    fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory backend with an optional byte quota
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    /// Bytes used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let replaced = self.entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            if self.used_bytes() - replaced + key.len() + value.len() > quota {
                return Err(Error::StorageFull { key: key.to_string() });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// `2024-01-10T03:04:05.678Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn record_key(at: DateTime<Utc>) -> String {
    format!("{}{}", RECORD_PREFIX, format_timestamp(at))
}

pub fn is_record_key(key: &str) -> bool {
    key.starts_with(RECORD_PREFIX) && key != DRAFT_KEY
}

/// Creation time encoded in a record key
pub fn parse_record_key(key: &str) -> Option<DateTime<Utc>> {
    let suffix = key.strip_prefix(RECORD_PREFIX)?;
    DateTime::parse_from_rfc3339(suffix)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send>;

/// Keyed persistence of records and the draft slot.
pub struct RecordStore<B> {
    backend: B,
    clock: Clock,
}

impl<B: KeyValueBackend> RecordStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, Utc::now)
    }

    /// Store whose record keys come from `clock` instead of the system time.
    pub fn with_clock(backend: B, clock: impl Fn() -> DateTime<Utc> + Send + 'static) -> Self {
        Self {
            backend,
            clock: Box::new(clock),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Persist `record` under a fresh `record:<now>` key and return the key.
    ///
    /// Saves landing in the same millisecond get the next free millisecond.
    pub fn save(&mut self, record: &Record) -> Result<String> {
        let json = serde_json::to_string(record)?;

        let mut at = (self.clock)();
        let mut key = record_key(at);
        while self.backend.get_item(&key)?.is_some() {
            at += Duration::milliseconds(1);
            key = record_key(at);
        }

        if let Err(e) = self.backend.set_item(&key, &json) {
            error!("failed to save {}: {}", key, e);
            return Err(e);
        }
        debug!("saved {} ({} bytes)", key, json.len());
        Ok(key)
    }

    pub fn get(&self, key: &str) -> Result<Record> {
        if !is_record_key(key) {
            return Err(Error::NotFound(key.to_string()));
        }
        let raw = self
            .backend
            .get_item(key)?
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| Error::decode(key, e))
    }

    /// Whether `key` names a stored record
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(is_record_key(key) && self.backend.get_item(key)?.is_some())
    }

    /// All `record:` keys, unordered
    pub fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter(|k| is_record_key(k))
            .collect())
    }

    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.backend.remove_item(key)?;
        debug!("deleted {}", key);
        Ok(())
    }

    /// Remove every `record:` key, best effort.
    ///
    /// Every key is attempted; failures are collected into
    /// [`Error::PartialDelete`]. The draft is never touched.
    pub fn delete_all(&mut self) -> Result<usize> {
        let mut removed = 0;
        let mut failed = Vec::new();

        for key in self.list_keys()? {
            match self.backend.remove_item(&key) {
                Ok(()) => removed += 1,
                Err(e) => {
                    error!("failed to delete {}: {}", key, e);
                    failed.push(key);
                }
            }
        }

        if failed.is_empty() {
            debug!("deleted {} records", removed);
            Ok(removed)
        } else {
            Err(Error::PartialDelete { removed, failed })
        }
    }

    pub fn save_draft(&mut self, form: &FormState) -> Result<()> {
        let json = serde_json::to_string(form)?;
        self.backend.set_item(DRAFT_KEY, &json)?;
        debug!("draft saved ({} bytes)", json.len());
        Ok(())
    }

    pub fn load_draft(&self) -> Result<Option<FormState>> {
        match self.backend.get_item(DRAFT_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| Error::decode(DRAFT_KEY, e)),
            None => Ok(None),
        }
    }

    pub fn clear_draft(&mut self) -> Result<()> {
        self.backend.remove_item(DRAFT_KEY)
    }

    /// Move `jurnal_<timestamp>` entries to `record:<timestamp>`.
    ///
    /// Entries whose suffix is not a timestamp stay where they are.
    pub fn migrate_legacy(&mut self) -> Result<usize> {
        let mut migrated = 0;

        for key in self.backend.keys()? {
            if key == DRAFT_KEY {
                continue;
            }
            let Some(suffix) = key.strip_prefix(LEGACY_PREFIX) else {
                continue;
            };
            let Some(at) = DateTime::parse_from_rfc3339(suffix).ok() else {
                warn!("legacy key {} has no timestamp, left in place", key);
                continue;
            };
            let Some(value) = self.backend.get_item(&key)? else {
                continue;
            };

            let new_key = record_key(at.with_timezone(&Utc));
            if self.backend.get_item(&new_key)?.is_some() {
                warn!("{} already exists, {} left in place", new_key, key);
                continue;
            }
            self.backend.set_item(&new_key, &value)?;
            self.backend.remove_item(&key)?;
            migrated += 1;
        }

        if migrated > 0 {
            debug!("migrated {} legacy entries", migrated);
        }
        Ok(migrated)
    }
}

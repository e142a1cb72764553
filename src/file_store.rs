//! JSON-file key-value namespace
//!
//! The whole namespace lives in one JSON object on disk. Every write goes to
//! a temporary file that is then renamed over the original, so readers never
//! see a half-written file and a failed write leaves memory and disk as they
//! were.

use jurnal_common::error::{Error, Result};
use jurnal_common::store::KeyValueBackend;
use log::debug;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl FileBackend {
    /// Open `path`; a missing file is an empty namespace.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            serde_json::from_reader(reader)
                .map_err(|e| Error::decode(path.display().to_string(), e))?
        } else {
            BTreeMap::new()
        };
        debug!("opened {} ({} keys)", path.display(), entries.len());

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            quota: None,
        })
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn used_bytes(&self) -> usize {
        used_bytes(&self.entries)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let tmp = self.path.with_extension("json.tmp");
            {
                let mut writer = BufWriter::new(File::create(&tmp)?);
                serde_json::to_writer_pretty(&mut writer, entries)?;
                writer.flush()?;
            }
            std::fs::rename(&tmp, &self.path)
        };
        write().map_err(|e| Error::StorageWrite(format!("{}: {}", self.path.display(), e)))
    }

    /// Apply `change` to a copy, persist it, then adopt it.
    fn commit(&mut self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut next = self.entries.clone();
        change(&mut next);
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }
}

fn used_bytes(entries: &BTreeMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

impl KeyValueBackend for FileBackend {
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
        self.commit(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        self.commit(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(&dir.path().join("jurnal.json")).unwrap();
        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("jurnal.json");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.set_item("record:a", "1").unwrap();
        backend.set_item("record:b", "2").unwrap();
        backend.remove_item("record:a").unwrap();
        backend.remove_item("record:missing").unwrap();

        let reopened = FileBackend::open(&path).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["record:b".to_string()]);
        assert_eq!(reopened.get_item("record:b").unwrap().as_deref(), Some("2"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_quota_rejects_without_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jurnal.json");
        let mut backend = FileBackend::open(&path).unwrap().with_quota(8);

        backend.set_item("k", "v").unwrap();
        let err = backend.set_item("big", "0123456789").unwrap_err();
        assert!(matches!(err, Error::StorageFull { .. }));

        let reopened = FileBackend::open(&path).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn test_corrupt_file_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jurnal.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(FileBackend::open(&path), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let dir = tempdir().unwrap();
        // the parent "directory" is a file, so every write fails
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let mut backend = FileBackend::open(&blocker.join("jurnal.json")).unwrap();

        let err = backend.set_item("record:a", "1").unwrap_err();
        assert!(matches!(err, Error::StorageWrite(_)));
        assert!(backend.get_item("record:a").unwrap().is_none());
    }
}

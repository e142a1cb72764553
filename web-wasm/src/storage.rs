//! `window.localStorage` as a key-value backend

use jurnal_common::error::{Error, Result};
use jurnal_common::store::KeyValueBackend;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DomException, Storage};

/// Name browsers give the exception thrown when the origin's quota is used up
const QUOTA_EXCEEDED: &str = "QuotaExceededError";
/// Legacy code for the same condition
const QUOTA_EXCEEDED_CODE: u16 = 22;

pub struct LocalStorageBackend {
    storage: Storage,
}

impl LocalStorageBackend {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The current window's localStorage
    pub fn from_window() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| Error::Config("no window available".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| Error::Config(describe(&e)))?
            .ok_or_else(|| Error::Config("localStorage is disabled".to_string()))?;
        Ok(Self::new(storage))
    }
}

fn describe(value: &JsValue) -> String {
    if let Some(exception) = value.dyn_ref::<DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn is_quota_exceeded(value: &JsValue) -> bool {
    value
        .dyn_ref::<DomException>()
        .is_some_and(|e| e.name() == QUOTA_EXCEEDED || e.code() == QUOTA_EXCEEDED_CODE)
}

impl KeyValueBackend for LocalStorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| Error::Config(describe(&e)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(|e| {
            if is_quota_exceeded(&e) {
                Error::StorageFull { key: key.to_string() }
            } else {
                Error::StorageWrite(describe(&e))
            }
        })
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| Error::StorageWrite(describe(&e)))
    }

    fn keys(&self) -> Result<Vec<String>> {
        let len = self.storage.length().map_err(|e| Error::Config(describe(&e)))?;
        let mut keys = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(key) = self.storage.key(i).map_err(|e| Error::Config(describe(&e)))? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

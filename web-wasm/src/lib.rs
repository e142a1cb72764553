//! Jurnal Bimbingan browser bindings
//!
//! The record store over `window.localStorage`, the form with its signature
//! pads fed from DOM events, and a small JS-facing history API.

pub mod form;
pub mod input;
pub mod storage;

use jurnal_common::history;
use jurnal_common::notify::{messages, Confirm};
use jurnal_common::render::{self, HistoryItemView, RenderMode, SignatureSource};
use jurnal_common::RecordStore;

pub use form::JurnalForm;
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::Serialize;
use storage::LocalStorageBackend;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    if log::set_logger(&CONSOLE_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

/// Forwards `log` records to the browser console
struct ConsoleLogger;

static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let message = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&message),
            Level::Warn => web_sys::console::warn_1(&message),
            Level::Info => web_sys::console::info_1(&message),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&message),
        }
    }

    fn flush(&self) {}
}

/// `window.confirm()`
pub struct WindowConfirm;

impl Confirm for WindowConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(prompt).ok())
            .unwrap_or(false)
    }
}

fn to_js(err: jurnal_common::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[derive(Serialize)]
struct HistoryRow {
    key: String,
    nama: String,
    tanggal: String,
    kelas: String,
    #[serde(rename = "bidangFokus")]
    bidang_fokus: String,
    ringkasan: String,
}

impl From<HistoryItemView> for HistoryRow {
    fn from(view: HistoryItemView) -> Self {
        Self {
            key: view.key,
            nama: view.student_name,
            tanggal: view.date,
            kelas: view.class,
            bidang_fokus: view.focus_area,
            ringkasan: view.summary,
        }
    }
}

#[wasm_bindgen]
pub struct JurnalStore {
    store: RecordStore<LocalStorageBackend>,
}

#[wasm_bindgen]
impl JurnalStore {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<JurnalStore, JsValue> {
        let backend = LocalStorageBackend::from_window().map_err(to_js)?;
        Ok(Self {
            store: RecordStore::new(backend),
        })
    }

    /// History rows as JSON, newest first, filtered by name or class
    pub fn history(&self, query: &str) -> Result<String, JsValue> {
        let listing = history::list_summaries(&self.store).map_err(to_js)?;
        let rows: Vec<HistoryRow> = history::filter(&listing.entries, query)
            .into_iter()
            .map(|entry| HistoryItemView::from_entry(entry).into())
            .collect();
        serde_json::to_string(&rows).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// History detail or print document for one record
    #[wasm_bindgen(js_name = renderHtml)]
    pub fn render_html(&self, key: &str, print: bool) -> Result<String, JsValue> {
        let entry = history::view(&self.store, key).map_err(|e| match e {
            jurnal_common::Error::NotFound(_) => JsValue::from_str(messages::NOT_FOUND),
            other => to_js(other),
        })?;
        let mode = if print { RenderMode::Print } else { RenderMode::HistoryDetail };
        let doc = render::render(&entry.record, mode, SignatureSource::Stored).map_err(to_js)?;
        Ok(doc.to_html())
    }

    /// Delete one record after `window.confirm()`. False when cancelled.
    ///
    /// A key with no stored record is rejected before the prompt.
    pub fn delete(&mut self, key: &str) -> Result<bool, JsValue> {
        if !self.store.contains(key).map_err(to_js)? {
            return Err(JsValue::from_str(messages::NOT_FOUND));
        }
        if !WindowConfirm.confirm(messages::CONFIRM_DELETE) {
            return Ok(false);
        }
        self.store.delete(key).map_err(to_js)?;
        Ok(true)
    }

    /// Delete every record after `window.confirm()`. Returns the count removed.
    #[wasm_bindgen(js_name = deleteAll)]
    pub fn delete_all(&mut self) -> Result<u32, JsValue> {
        if !WindowConfirm.confirm(messages::CONFIRM_DELETE_ALL) {
            return Ok(0);
        }
        self.store.delete_all().map(|n| n as u32).map_err(to_js)
    }

    #[wasm_bindgen(js_name = migrateLegacy)]
    pub fn migrate_legacy(&mut self) -> Result<u32, JsValue> {
        self.store.migrate_legacy().map(|n| n as u32).map_err(to_js)
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_delete_missing_record_is_rejected() {
        let mut store = JurnalStore::new().unwrap();

        let err = store.delete("record:2024-01-10T00:00:00.000Z").unwrap_err();
        assert_eq!(err.as_string().as_deref(), Some(messages::NOT_FOUND));
    }
}

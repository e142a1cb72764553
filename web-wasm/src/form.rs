//! The journal form and its two signature pads, driven from the page

use crate::input;
use crate::storage::LocalStorageBackend;
use crate::{to_js, WindowConfirm};
use chrono::Local;
use jurnal_common::notify::{Severity, Toast};
use jurnal_common::record::{FormField, SignatureRole};
use jurnal_common::{Debouncer, FormSession, RecordStore};
use log::{debug, warn};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event};
use web_time::Instant;

/// `"student"`/`"siswa"` or `"teacher"`/`"guru"`
pub fn parse_role(name: &str) -> Option<SignatureRole> {
    match name {
        "student" | "siswa" => Some(SignatureRole::Student),
        "teacher" | "guru" => Some(SignatureRole::Teacher),
        _ => None,
    }
}

fn role(name: &str) -> Result<SignatureRole, JsValue> {
    parse_role(name).ok_or_else(|| JsValue::from_str(&format!("unknown pad: {}", name)))
}

fn field(key: &str) -> Result<FormField, JsValue> {
    FormField::from_key(key).ok_or_else(|| JsValue::from_str(&format!("unknown field: {}", key)))
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToastRow {
    pub message: String,
    pub severity: &'static str,
    pub duration_ms: u64,
}

impl From<&Toast> for ToastRow {
    fn from(toast: &Toast) -> Self {
        Self {
            message: toast.message.clone(),
            severity: match toast.severity {
                Severity::Info => "info",
                Severity::Error => "error",
            },
            duration_ms: toast.duration().as_millis() as u64,
        }
    }
}

#[wasm_bindgen]
pub struct JurnalForm {
    session: FormSession<LocalStorageBackend>,
    toasts: Vec<Toast>,
}

#[wasm_bindgen]
impl JurnalForm {
    /// Fresh form over localStorage with the previous draft restored.
    #[wasm_bindgen(constructor)]
    pub fn new(pad_width: u32, pad_height: u32) -> Result<JurnalForm, JsValue> {
        let backend = LocalStorageBackend::from_window().map_err(to_js)?;
        let today = Local::now().date_naive();
        let mut session = FormSession::new(RecordStore::new(backend), pad_width, pad_height, today)
            .with_autosave(Debouncer::default());
        match session.restore_draft() {
            Ok(true) => debug!("draft restored"),
            Ok(false) => {}
            Err(e) => warn!("draft not restored: {}", e),
        }
        Ok(Self {
            session,
            toasts: Vec::new(),
        })
    }

    /// Current value of a field by its serialized name, e.g. `nama`
    pub fn field(&self, key: &str) -> Result<String, JsValue> {
        Ok(self.session.form().get(field(key)?).to_string())
    }

    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&mut self, key: &str, value: String) -> Result<(), JsValue> {
        let field = field(key)?;
        self.session.edit_field(field, value, Instant::now());
        Ok(())
    }

    /// Serialized names of the fields the last validation rejected, as JSON
    #[wasm_bindgen(js_name = flaggedFields)]
    pub fn flagged_fields(&self) -> Result<String, JsValue> {
        let keys: Vec<&str> = self.session.flagged_fields().iter().map(|f| f.key()).collect();
        serde_json::to_string(&keys).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = signatureLabel)]
    pub fn signature_label(&self, pad: &str) -> Result<String, JsValue> {
        Ok(self.session.signature_label(role(pad)?))
    }

    /// Feed a mouse or touch event delivered to the `pad` canvas.
    ///
    /// Returns false for events that are not pad input.
    #[wasm_bindgen(js_name = handleEvent)]
    pub fn handle_event(&mut self, pad: &str, event: &Event, canvas: &Element) -> Result<bool, JsValue> {
        let role = role(pad)?;
        let Some(input) = input::translate(event) else {
            return Ok(false);
        };
        let target = self.session.surface(role).id();
        self.session
            .handle_input(target, &input, input::surface_offset(canvas), Instant::now());
        Ok(true)
    }

    #[wasm_bindgen(js_name = clearSignature)]
    pub fn clear_signature(&mut self, pad: &str) -> Result<(), JsValue> {
        self.session.clear_signature(role(pad)?, Instant::now());
        Ok(())
    }

    /// RGBA pixels of a pad, row-major, for `ImageData`
    #[wasm_bindgen(js_name = padPixels)]
    pub fn pad_pixels(&self, pad: &str) -> Result<Vec<u8>, JsValue> {
        Ok(self.session.surface(role(pad)?).bitmap().as_raw().clone())
    }

    /// Call from a timer; writes the draft once the form has been quiet.
    #[wasm_bindgen(js_name = pollAutosave)]
    pub fn poll_autosave(&mut self) -> Result<bool, JsValue> {
        self.session.poll_autosave(Instant::now()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = flushDraft)]
    pub fn flush_draft(&mut self) -> Result<(), JsValue> {
        self.session.flush_draft().map_err(to_js)
    }

    /// Preview HTML with the live pads
    pub fn preview(&mut self) -> Result<String, JsValue> {
        let doc = self.session.preview(&mut self.toasts).map_err(to_js)?;
        Ok(doc.to_html())
    }

    /// Print document HTML; opens the print dialog when loaded.
    #[wasm_bindgen(js_name = printHtml)]
    pub fn print_html(&mut self) -> Result<String, JsValue> {
        let doc = self.session.print(&mut self.toasts).map_err(to_js)?;
        Ok(doc.to_html())
    }

    /// Save the form as a record and start over. Returns the record key.
    pub fn save(&mut self) -> Result<String, JsValue> {
        self.session.save(&mut self.toasts).map_err(to_js)
    }

    /// Reset after `window.confirm()`. False when cancelled.
    pub fn reset(&mut self) -> Result<bool, JsValue> {
        self.session.reset(&mut WindowConfirm, &mut self.toasts).map_err(to_js)
    }

    /// Toasts raised since the last call, as JSON
    #[wasm_bindgen(js_name = takeToasts)]
    pub fn take_toasts(&mut self) -> Result<String, JsValue> {
        let rows: Vec<ToastRow> = self.toasts.drain(..).map(|t| ToastRow::from(&t)).collect();
        serde_json::to_string(&rows).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

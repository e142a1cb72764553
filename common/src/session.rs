//! Form editing session
//!
//! Owns the form state, both signature pads, the store and the autosave
//! deadline. Destructive actions go through a [`Confirm`] prompt and every
//! outcome is reported through a [`Notifier`].

use crate::autosave::Debouncer;
use crate::error::{Error, Result};
use crate::history::{self, HistoryListing};
use crate::input::{InputEvent, SurfaceOffset};
use crate::notify::{messages, Confirm, Notifier, Toast};
use crate::record::{FormField, FormState, Record, SignatureRole};
use crate::render::{self, Document, RenderMode, SignatureSource};
use crate::signature::{DecodedSignature, SignatureSurface, SurfaceId};
use crate::store::{KeyValueBackend, RecordStore};
use chrono::NaiveDate;
use log::{debug, error, warn};
use web_time::Instant;

pub struct FormSession<B> {
    form: FormState,
    student: SignatureSurface,
    teacher: SignatureSurface,
    store: RecordStore<B>,
    autosave: Debouncer,
    /// Set while the session itself rewrites the form (reset, draft restore)
    suppress_autosave: bool,
    /// Fields flagged by the last failed validation
    flagged: Vec<FormField>,
    today: NaiveDate,
}

impl<B: KeyValueBackend> FormSession<B> {
    pub fn new(store: RecordStore<B>, pad_width: u32, pad_height: u32, today: NaiveDate) -> Self {
        Self {
            form: FormState::new(today),
            student: SignatureSurface::new(pad_width, pad_height),
            teacher: SignatureSurface::new(pad_width, pad_height),
            store,
            autosave: Debouncer::default(),
            suppress_autosave: false,
            flagged: Vec::new(),
            today,
        }
    }

    pub fn with_autosave(mut self, debouncer: Debouncer) -> Self {
        self.autosave = debouncer;
        self
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn store(&self) -> &RecordStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore<B> {
        &mut self.store
    }

    pub fn surface(&self, role: SignatureRole) -> &SignatureSurface {
        match role {
            SignatureRole::Student => &self.student,
            SignatureRole::Teacher => &self.teacher,
        }
    }

    pub fn surface_mut(&mut self, role: SignatureRole) -> &mut SignatureSurface {
        match role {
            SignatureRole::Student => &mut self.student,
            SignatureRole::Teacher => &mut self.teacher,
        }
    }

    pub fn flagged_fields(&self) -> &[FormField] {
        &self.flagged
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Label above each pad, following the name fields
    pub fn signature_label(&self, role: SignatureRole) -> String {
        role.label(self.form.get(role.name_field()))
    }

    pub fn edit_field(&mut self, field: FormField, value: impl Into<String>, now: Instant) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.flagged.retain(|f| *f != field);
        }
        self.form.set(field, value);
        self.touch(now);
    }

    /// Route an input event to the pad it was delivered to.
    ///
    /// Finishing a stroke counts as an edit for autosave.
    pub fn handle_input(&mut self, target: SurfaceId, event: &InputEvent, offset: SurfaceOffset, now: Instant) {
        let ended = if target == self.student.id() {
            self.student.handle_input(target, event, offset)
        } else if target == self.teacher.id() {
            self.teacher.handle_input(target, event, offset)
        } else {
            false
        };
        if ended {
            self.touch(now);
        }
    }

    pub fn clear_signature(&mut self, role: SignatureRole, now: Instant) {
        self.surface_mut(role).clear();
        self.touch(now);
    }

    /// Draw an already decoded image onto a pad, scaled to the pad size.
    pub fn draw_signature(&mut self, role: SignatureRole, decoded: &DecodedSignature, now: Instant) {
        let surface = self.surface_mut(role);
        let (w, h) = (surface.width(), surface.height());
        surface.draw_decoded(decoded, w, h);
        self.touch(now);
    }

    fn touch(&mut self, now: Instant) {
        if !self.suppress_autosave {
            self.autosave.restart(now);
        }
    }

    /// Write the draft if the autosave deadline has passed.
    ///
    /// Returns true when a draft was written.
    pub fn poll_autosave(&mut self, now: Instant) -> Result<bool> {
        if self.suppress_autosave || !self.autosave.poll(now) {
            return Ok(false);
        }
        let draft = self.snapshot()?;
        self.store.save_draft(&draft).inspect_err(|e| {
            error!("draft not saved: {}", e);
        })?;
        Ok(true)
    }

    /// Write the draft now and drop any pending autosave.
    pub fn flush_draft(&mut self) -> Result<()> {
        self.autosave.cancel();
        let draft = self.snapshot()?;
        self.store.save_draft(&draft)
    }

    /// Current form including the pads as encoded images (blank pads omitted)
    pub fn snapshot(&self) -> Result<FormState> {
        let mut form = self.form.clone();
        form.student_signature = encode_if_signed(&self.student)?;
        form.teacher_signature = encode_if_signed(&self.teacher)?;
        Ok(form)
    }

    /// Validate the form and both pads, flagging offending fields.
    pub fn validate(&mut self) -> Result<Record> {
        match self.form.validate(&self.student, &self.teacher) {
            Ok(record) => {
                self.flagged.clear();
                Ok(record)
            }
            Err(Error::ValidationFailed(report)) => {
                self.flagged = report.fields.clone();
                Err(Error::ValidationFailed(report))
            }
            Err(e) => Err(e),
        }
    }

    fn validate_or_notify(&mut self, notifier: &mut dyn Notifier) -> Result<Record> {
        self.validate().inspect_err(|e| {
            if let Error::ValidationFailed(report) = e {
                let message = if report.fields.is_empty() {
                    messages::MISSING_SIGNATURES
                } else {
                    messages::INCOMPLETE
                };
                notifier.notify(Toast::error(message));
            }
        })
    }

    pub fn preview(&mut self, notifier: &mut dyn Notifier) -> Result<Document> {
        let record = self.validate_or_notify(notifier)?;
        render::render(&record, RenderMode::Preview, self.live_source())
    }

    pub fn print(&mut self, notifier: &mut dyn Notifier) -> Result<Document> {
        let record = self.validate_or_notify(notifier)?;
        render::render(&record, RenderMode::Print, self.live_source())
    }

    fn live_source(&self) -> SignatureSource<'_> {
        SignatureSource::Live {
            student: &self.student,
            teacher: &self.teacher,
        }
    }

    /// Validate, persist and start a fresh form.
    ///
    /// On a storage failure the form is kept as it is. Once the record is
    /// stored its key is returned even if the draft cannot be cleared.
    pub fn save(&mut self, notifier: &mut dyn Notifier) -> Result<String> {
        let record = self.validate_or_notify(notifier)?;

        let key = match self.store.save(&record) {
            Ok(key) => key,
            Err(e) => {
                notifier.notify(Toast::error(messages::SAVE_FAILED));
                return Err(e);
            }
        };
        notifier.notify(Toast::info(messages::SAVED));
        if let Err(e) = self.reset_form() {
            warn!("saved {} but the draft was not cleared: {}", key, e);
        }
        Ok(key)
    }

    /// Reset after confirmation. Returns false when cancelled.
    pub fn reset(&mut self, confirm: &mut dyn Confirm, notifier: &mut dyn Notifier) -> Result<bool> {
        if !confirm.confirm(messages::CONFIRM_RESET) {
            return Ok(false);
        }
        self.reset_form()?;
        notifier.notify(Toast::info(messages::RESET));
        Ok(true)
    }

    fn reset_form(&mut self) -> Result<()> {
        self.suppress_autosave = true;
        self.form = FormState::new(self.today);
        self.student.clear();
        self.teacher.clear();
        self.flagged.clear();
        self.autosave.cancel();
        let cleared = self.store.clear_draft();
        self.suppress_autosave = false;
        cleared
    }

    /// Load the draft into the form and pads. Returns false when there is none.
    pub fn restore_draft(&mut self) -> Result<bool> {
        let Some(draft) = self.store.load_draft()? else {
            return Ok(false);
        };

        self.suppress_autosave = true;
        self.student.clear();
        self.teacher.clear();
        for (role, data) in [
            (SignatureRole::Student, draft.student_signature.as_deref()),
            (SignatureRole::Teacher, draft.teacher_signature.as_deref()),
        ] {
            if let Some(data) = data {
                let surface = self.surface_mut(role);
                let (w, h) = (surface.width(), surface.height());
                if let Err(e) = surface.import_encoded(data, w, h) {
                    warn!("draft {} signature not restored: {}", role, e);
                }
            }
        }
        self.form = FormState {
            student_signature: None,
            teacher_signature: None,
            ..draft
        };
        self.suppress_autosave = false;
        debug!("draft restored");
        Ok(true)
    }

    pub fn list_history(&self) -> Result<HistoryListing> {
        history::list_summaries(&self.store)
    }

    pub fn view_history(&self, key: &str, notifier: &mut dyn Notifier) -> Result<Document> {
        let entry = history::view(&self.store, key).inspect_err(|e| {
            if matches!(e, Error::NotFound(_)) {
                notifier.notify(Toast::error(messages::NOT_FOUND));
            }
        })?;
        render::render(&entry.record, RenderMode::HistoryDetail, SignatureSource::Stored)
    }

    /// Delete one record after confirmation. Returns false when cancelled.
    ///
    /// A key with no stored record fails with [`Error::NotFound`] before
    /// anything is asked.
    pub fn delete_history(
        &mut self,
        key: &str,
        confirm: &mut dyn Confirm,
        notifier: &mut dyn Notifier,
    ) -> Result<bool> {
        if !self.store.contains(key)? {
            notifier.notify(Toast::error(messages::NOT_FOUND));
            return Err(Error::NotFound(key.to_string()));
        }
        if !confirm.confirm(messages::CONFIRM_DELETE) {
            return Ok(false);
        }
        match self.store.delete(key) {
            Ok(()) => {
                notifier.notify(Toast::info(messages::DELETED));
                Ok(true)
            }
            Err(e) => {
                notifier.notify(Toast::error(messages::DELETE_FAILED));
                Err(e)
            }
        }
    }

    /// Delete every record after confirmation. `None` when cancelled.
    pub fn clear_history(
        &mut self,
        confirm: &mut dyn Confirm,
        notifier: &mut dyn Notifier,
    ) -> Result<Option<usize>> {
        if !confirm.confirm(messages::CONFIRM_DELETE_ALL) {
            return Ok(None);
        }
        match self.store.delete_all() {
            Ok(removed) => {
                notifier.notify(Toast::info(messages::ALL_DELETED));
                Ok(Some(removed))
            }
            Err(e) => {
                notifier.notify(Toast::error(messages::DELETE_FAILED));
                Err(e)
            }
        }
    }
}

fn encode_if_signed(surface: &SignatureSurface) -> Result<Option<String>> {
    if surface.is_empty() {
        Ok(None)
    } else {
        surface.export_encoded().map(Some)
    }
}

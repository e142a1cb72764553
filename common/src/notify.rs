//! User-facing notifications and confirmation prompts

use std::time::Duration;

/// Fixed user messages
pub mod messages {
    pub const SAVED: &str = "Data berhasil disimpan!";
    pub const SAVE_FAILED: &str = "Gagal menyimpan data!";
    pub const INCOMPLETE: &str = "Harap lengkapi semua field yang diperlukan!";
    pub const MISSING_SIGNATURES: &str = "Harap lengkapi tanda tangan siswa dan guru!";
    pub const RESET: &str = "Form berhasil direset!";
    pub const DELETED: &str = "Data berhasil dihapus!";
    pub const ALL_DELETED: &str = "Semua data berhasil dihapus!";
    pub const NOT_FOUND: &str = "Data tidak ditemukan!";
    pub const DELETE_FAILED: &str = "Gagal menghapus data!";

    pub const CONFIRM_RESET: &str = "Apakah Anda yakin ingin mereset semua data?";
    pub const CONFIRM_DELETE: &str = "Apakah Anda yakin ingin menghapus data bimbingan ini?";
    pub const CONFIRM_DELETE_ALL: &str =
        "Apakah Anda yakin ingin menghapus semua data bimbingan? Tindakan ini tidak dapat dibatalkan!";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl Severity {
    /// How long the toast stays visible
    pub fn duration(&self) -> Duration {
        match self {
            Severity::Info => Duration::from_millis(2000),
            Severity::Error => Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn duration(&self) -> Duration {
        self.severity.duration()
    }
}

/// Toast surface
pub trait Notifier {
    fn notify(&mut self, toast: Toast);
}

/// Collects toasts in order
impl Notifier for Vec<Toast> {
    fn notify(&mut self, toast: Toast) {
        self.push(toast);
    }
}

/// Yes/no prompt gating destructive actions
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

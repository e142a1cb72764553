//! Terminal confirmation and notifications

use jurnal_common::notify::{Confirm, Notifier, Severity, Toast};
use log::warn;

/// Yes/no prompt on the terminal; `--yes` answers for the user.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogConfirm {
    assume_yes: bool,
}

impl DialogConfirm {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for DialogConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                warn!("confirmation prompt failed, treating as no: {}", e);
                false
            })
    }
}

/// Toasts printed to the terminal
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    shown: usize,
}

impl ConsoleNotifier {
    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, toast: Toast) {
        self.shown += 1;
        match toast.severity {
            Severity::Info => println!("✔ {}", toast.message),
            Severity::Error => eprintln!("✖ {}", toast.message),
        }
    }
}

//! Debounced draft saving
//!
//! A cancellable single-shot deadline. Every edit pushes the deadline out;
//! the draft is written once the form has been quiet for the whole delay.

use std::time::Duration;
use web_time::Instant;

pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(AUTOSAVE_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending trigger and start a new one from `now`.
    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.restart(start);

        assert!(!debouncer.poll(start + Duration::from_millis(1999)));
        assert!(debouncer.poll(start + Duration::from_millis(2000)));
        assert!(!debouncer.poll(start + Duration::from_millis(5000)));
    }

    #[test]
    fn test_restart_pushes_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.restart(start);
        debouncer.restart(start + Duration::from_millis(1500));

        assert!(!debouncer.poll(start + Duration::from_millis(2000)));
        assert!(debouncer.poll(start + Duration::from_millis(3500)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.restart(start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(start + Duration::from_secs(1)));
    }
}

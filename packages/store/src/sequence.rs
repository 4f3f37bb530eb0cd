//! Hidden-unlock sequence gate.
//!
//! The report form opens only when the second half of a key sequence
//! follows the first within a short window.

use std::time::{Duration, Instant};

/// Default time allowed between starting and completing the sequence.
pub const DEFAULT_UNLOCK_TIMEOUT: Duration = Duration::from_millis(5000);

/// Tracks whether the unlock sequence is armed.
#[derive(Debug, Clone)]
pub struct SequenceGate {
    timeout: Duration,
    armed_at: Option<Instant>,
}

impl Default for SequenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_UNLOCK_TIMEOUT)
    }
}

impl SequenceGate {
    /// Creates a disarmed gate with the given window.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            armed_at: None,
        }
    }

    /// Arms the gate at `now`, restarting the window if already armed.
    pub const fn start(&mut self, now: Instant) {
        self.armed_at = Some(now);
    }

    /// Completes the sequence at `now`.
    ///
    /// Returns `true` only if the gate was armed and the window has not
    /// passed. The gate is disarmed either way.
    pub fn complete(&mut self, now: Instant) -> bool {
        let Some(armed_at) = self.armed_at.take() else {
            return false;
        };
        let open = now.saturating_duration_since(armed_at) <= self.timeout;
        if !open {
            log::debug!("Unlock sequence expired");
        }
        open
    }

    /// Disarms the gate.
    pub const fn clear(&mut self) {
        self.armed_at = None;
    }

    /// Whether the gate is armed and still within its window at `now`.
    #[must_use]
    pub fn is_armed(&self, now: Instant) -> bool {
        self.armed_at
            .is_some_and(|armed_at| now.saturating_duration_since(armed_at) <= self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_within_window() {
        let t0 = Instant::now();
        let mut gate = SequenceGate::default();
        gate.start(t0);
        assert!(gate.is_armed(t0 + Duration::from_secs(1)));
        assert!(gate.complete(t0 + Duration::from_secs(4)));
        assert!(!gate.is_armed(t0 + Duration::from_secs(4)));
    }

    #[test]
    fn expires_after_window() {
        let t0 = Instant::now();
        let mut gate = SequenceGate::default();
        gate.start(t0);
        assert!(!gate.complete(t0 + Duration::from_millis(5001)));
    }

    #[test]
    fn complete_without_start_fails() {
        let mut gate = SequenceGate::default();
        assert!(!gate.complete(Instant::now()));
    }

    #[test]
    fn completes_only_once() {
        let t0 = Instant::now();
        let mut gate = SequenceGate::new(Duration::from_secs(1));
        gate.start(t0);
        assert!(gate.complete(t0));
        assert!(!gate.complete(t0));
    }

    #[test]
    fn clear_disarms() {
        let t0 = Instant::now();
        let mut gate = SequenceGate::default();
        gate.start(t0);
        gate.clear();
        assert!(!gate.complete(t0));
    }

    #[test]
    fn restart_extends_window() {
        let t0 = Instant::now();
        let mut gate = SequenceGate::default();
        gate.start(t0);
        gate.start(t0 + Duration::from_secs(4));
        assert!(gate.complete(t0 + Duration::from_secs(8)));
    }
}

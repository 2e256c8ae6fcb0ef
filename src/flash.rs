use std::time::{Duration, Instant};

/// A single-slot message with an expiry, used for toasts and "copied" badges.
///
/// Showing a new message replaces both the text and the deadline, so an expiry
/// computed for an older message can never clear a newer one.
#[derive(Debug, Clone, Default)]
pub struct TimedFlash {
    current: Option<(String, Instant)>,
}

impl TimedFlash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>, now: Instant, ttl: Duration) {
        self.current = Some((message.into(), now + ttl));
    }

    pub fn message(&self) -> Option<&str> {
        self.current.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drops the message once its deadline has passed. Returns `true` when it did.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.current {
            Some((_, deadline)) if now >= *deadline => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

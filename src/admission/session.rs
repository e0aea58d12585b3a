//! Per-session state handed in by the frontend.

use std::time::{Duration, Instant};

/// Fallback client identity when the frontend cannot produce a better one.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Mutable per-session record, owned by the caller and threaded through
/// successive limiter calls.
///
/// The limiter reads both fields and sets `started_at` on the first
/// successful admission check; it never increments `count`. The caller
/// bumps `count` via [`record_success`] only after a fully successful
/// operation, so failed or downstream-throttled attempts do not exhaust
/// the session's budget.
///
/// [`record_success`]: SessionState::record_success
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Successful operations completed in this session
    pub count: u32,
    /// When the session first passed an admission check
    pub started_at: Option<Instant>,
}

impl SessionState {
    /// Create a fresh session record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Age of the session as of `now`. A session that has not yet passed an
    /// admission check has age zero.
    pub fn age(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started) => now.saturating_duration_since(started),
            None => Duration::ZERO,
        }
    }

    /// Record a fully successful operation. Called by the frontend after the
    /// downstream service confirms success, never by the limiter itself.
    pub fn record_success(&mut self) {
        self.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_has_zero_age() {
        let session = SessionState::new();
        assert_eq!(session.age(Instant::now()), Duration::ZERO);
        assert_eq!(session.count, 0);
    }

    #[test]
    fn test_age_tracks_started_at() {
        let now = Instant::now();
        let session = SessionState {
            count: 0,
            started_at: Some(now),
        };

        assert_eq!(session.age(now + Duration::from_secs(90)), Duration::from_secs(90));
    }

    #[test]
    fn test_record_success_increments() {
        let mut session = SessionState::new();
        session.record_success();
        session.record_success();
        assert_eq!(session.count, 2);
    }
}

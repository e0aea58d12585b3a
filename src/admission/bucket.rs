//! Time-windowed quota buckets and the store that holds them.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Rolling window length for a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    /// Per-hour quotas
    Hour,
    /// Per-day quotas
    Day,
    /// Per-month quotas (fixed 30 days, not a calendar month)
    Month,
}

impl TimeWindow {
    /// Get the duration of this time window.
    pub fn duration(&self) -> Duration {
        match self {
            TimeWindow::Hour => Duration::from_secs(3600),
            TimeWindow::Day => Duration::from_secs(86_400),
            TimeWindow::Month => Duration::from_secs(30 * 86_400),
        }
    }
}

/// Counter state for one (scope, window) pair.
///
/// Not every field is meaningful for every bucket: hourly client buckets use
/// only `count`, the global monthly cost bucket uses only `cost`. Unused
/// fields stay at zero.
#[derive(Debug, Clone)]
pub struct WindowBucket {
    /// Requests admitted in the current window
    pub count: u64,
    /// Active operation time accumulated in the current window
    pub active_secs: f64,
    /// Synthetic cost accumulated in the current window
    pub cost: f64,
    /// When the current window ends and the bucket is replaced
    pub reset_at: Instant,
    window: TimeWindow,
}

impl WindowBucket {
    /// Create a zeroed bucket whose window starts at `now`.
    pub fn fresh(window: TimeWindow, now: Instant) -> Self {
        Self {
            count: 0,
            active_secs: 0.0,
            cost: 0.0,
            reset_at: now + window.duration(),
            window,
        }
    }

    /// Whether the current window has elapsed.
    pub fn expired(&self, now: Instant) -> bool {
        now >= self.reset_at
    }

    /// Replace this bucket in place with a fresh zeroed one if its window
    /// has elapsed. Accumulated values are discarded, never carried over.
    pub fn roll_over(&mut self, now: Instant) {
        if self.expired(now) {
            *self = Self::fresh(self.window, now);
        }
    }

    /// Time remaining until this bucket's window resets.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.reset_at.saturating_duration_since(now)
    }
}

/// All time-windowed counters, keyed by client identity plus the global
/// singletons. Owned exclusively by the limiter and mutated only under its
/// lock; every accessor rolls the bucket over lazily before returning it,
/// so no background cleanup task is needed.
#[derive(Debug)]
pub(crate) struct BucketStore {
    client_hour: HashMap<String, WindowBucket>,
    client_day: HashMap<String, WindowBucket>,
    global_hour: WindowBucket,
    global_day: WindowBucket,
    global_month_requests: WindowBucket,
    global_month_cost: WindowBucket,
}

impl BucketStore {
    pub fn new(now: Instant) -> Self {
        Self {
            client_hour: HashMap::new(),
            client_day: HashMap::new(),
            global_hour: WindowBucket::fresh(TimeWindow::Hour, now),
            global_day: WindowBucket::fresh(TimeWindow::Day, now),
            global_month_requests: WindowBucket::fresh(TimeWindow::Month, now),
            global_month_cost: WindowBucket::fresh(TimeWindow::Month, now),
        }
    }

    pub fn client_hour(&mut self, client_id: &str, now: Instant) -> &mut WindowBucket {
        Self::keyed(&mut self.client_hour, client_id, TimeWindow::Hour, now)
    }

    pub fn client_day(&mut self, client_id: &str, now: Instant) -> &mut WindowBucket {
        Self::keyed(&mut self.client_day, client_id, TimeWindow::Day, now)
    }

    pub fn global_hour(&mut self, now: Instant) -> &mut WindowBucket {
        self.global_hour.roll_over(now);
        &mut self.global_hour
    }

    pub fn global_day(&mut self, now: Instant) -> &mut WindowBucket {
        self.global_day.roll_over(now);
        &mut self.global_day
    }

    pub fn global_month_requests(&mut self, now: Instant) -> &mut WindowBucket {
        self.global_month_requests.roll_over(now);
        &mut self.global_month_requests
    }

    pub fn global_month_cost(&mut self, now: Instant) -> &mut WindowBucket {
        self.global_month_cost.roll_over(now);
        &mut self.global_month_cost
    }

    /// Per-client bucket lookup, created lazily on first reference.
    fn keyed<'a>(
        map: &'a mut HashMap<String, WindowBucket>,
        client_id: &str,
        window: TimeWindow,
        now: Instant,
    ) -> &'a mut WindowBucket {
        let bucket = map
            .entry(client_id.to_string())
            .or_insert_with(|| WindowBucket::fresh(window, now));
        bucket.roll_over(now);
        bucket
    }

    /// Per-client bucket lookup without creating one.
    pub fn peek_client(
        &mut self,
        client_id: &str,
        window: TimeWindow,
        now: Instant,
    ) -> Option<&WindowBucket> {
        let map = match window {
            TimeWindow::Hour => &mut self.client_hour,
            TimeWindow::Day => &mut self.client_day,
            TimeWindow::Month => return None,
        };
        let bucket = map.get_mut(client_id)?;
        bucket.roll_over(now);
        Some(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_duration() {
        assert_eq!(TimeWindow::Hour.duration(), Duration::from_secs(3600));
        assert_eq!(TimeWindow::Day.duration(), Duration::from_secs(86_400));
        assert_eq!(TimeWindow::Month.duration(), Duration::from_secs(2_592_000));
    }

    #[test]
    fn test_fresh_bucket_is_zeroed() {
        let now = Instant::now();
        let bucket = WindowBucket::fresh(TimeWindow::Hour, now);

        assert_eq!(bucket.count, 0);
        assert_eq!(bucket.active_secs, 0.0);
        assert_eq!(bucket.cost, 0.0);
        assert_eq!(bucket.reset_at, now + Duration::from_secs(3600));
    }

    #[test]
    fn test_roll_over_discards_accumulated_state() {
        let now = Instant::now();
        let mut bucket = WindowBucket::fresh(TimeWindow::Hour, now);
        bucket.count = 42;
        bucket.active_secs = 120.0;
        bucket.cost = 0.3;

        let later = now + Duration::from_secs(3601);
        bucket.roll_over(later);

        assert_eq!(bucket.count, 0);
        assert_eq!(bucket.active_secs, 0.0);
        assert_eq!(bucket.cost, 0.0);
        assert_eq!(bucket.reset_at, later + Duration::from_secs(3600));
    }

    #[test]
    fn test_roll_over_is_noop_within_window() {
        let now = Instant::now();
        let mut bucket = WindowBucket::fresh(TimeWindow::Day, now);
        bucket.count = 7;

        bucket.roll_over(now + Duration::from_secs(86_399));

        assert_eq!(bucket.count, 7);
    }

    #[test]
    fn test_store_creates_client_buckets_lazily() {
        let now = Instant::now();
        let mut store = BucketStore::new(now);

        assert!(store.peek_client("1.2.3.4", TimeWindow::Hour, now).is_none());
        store.client_hour("1.2.3.4", now).count += 1;
        assert_eq!(
            store
                .peek_client("1.2.3.4", TimeWindow::Hour, now)
                .map(|b| b.count),
            Some(1)
        );
    }

    #[test]
    fn test_store_separates_clients() {
        let now = Instant::now();
        let mut store = BucketStore::new(now);

        store.client_hour("a", now).count += 5;
        store.client_hour("b", now).count += 3;

        assert_eq!(store.client_hour("a", now).count, 5);
        assert_eq!(store.client_hour("b", now).count, 3);
    }

    #[test]
    fn test_month_buckets_are_independent() {
        let now = Instant::now();
        let mut store = BucketStore::new(now);

        store.global_month_requests(now).count += 1;
        store.global_month_cost(now).cost += 0.5;

        assert_eq!(store.global_month_requests(now).count, 1);
        assert_eq!(store.global_month_requests(now).cost, 0.0);
        assert_eq!(store.global_month_cost(now).count, 0);
        assert_eq!(store.global_month_cost(now).cost, 0.5);
    }
}

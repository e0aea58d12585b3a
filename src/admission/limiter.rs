//! Core admission-control engine.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::config::LimiterConfig;

use super::bucket::{BucketStore, TimeWindow};
use super::decision::{Decision, DenyReason};
use super::session::SessionState;

/// The multi-scope rate limiter.
///
/// One instance is constructed at process start and shared (behind an `Arc`)
/// with every request handler. All counters live behind a single lock; both
/// public operations are short in-memory critical sections and must not be
/// called re-entrantly. State is volatile and resets with the process.
pub struct RateLimiter {
    config: LimiterConfig,
    store: Mutex<BucketStore>,
}

/// Snapshot of the global buckets, taken under the lock after rolling
/// expired windows over.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalUsage {
    pub hourly_requests: u64,
    pub daily_requests: u64,
    pub daily_active_secs: f64,
    pub daily_cost: f64,
    pub monthly_requests: u64,
    pub monthly_cost: f64,
}

/// Snapshot of one client's buckets. `None` fields never existed;
/// a zeroed snapshot means the windows rolled over.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientUsage {
    pub hourly_requests: u64,
    pub daily_requests: u64,
    pub daily_active_secs: f64,
}

impl RateLimiter {
    /// Create a limiter with the given ceilings. Counters start at zero.
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            store: Mutex::new(BucketStore::new(Instant::now())),
            config,
        }
    }

    /// Check every quota ceiling for this client and session, and charge the
    /// request-counting buckets if all of them pass.
    ///
    /// Predicates run in a fixed order (session, then per-client, then
    /// global) and the first failure short-circuits: nothing is incremented
    /// on denial. On admission the five request-counting buckets are charged
    /// in the same critical section as the checks, so concurrent callers can
    /// never both claim the last remaining slot.
    ///
    /// The session's own `count` is deliberately not touched here; the
    /// caller records it after a fully successful operation.
    pub fn pre_check(&self, client_id: &str, session: &mut SessionState) -> Decision {
        self.pre_check_at(client_id, session, Instant::now())
    }

    /// Deterministic variant of [`pre_check`] taking an explicit clock
    /// reading. Primarily useful for testing window rollover.
    ///
    /// [`pre_check`]: RateLimiter::pre_check
    pub fn pre_check_at(
        &self,
        client_id: &str,
        session: &mut SessionState,
        now: Instant,
    ) -> Decision {
        let cfg = &self.config;
        let mut store = self.store.lock();

        // Session checks. No retry hint: sessions never reset on their own,
        // the user has to start a new one.
        let age = session.age(now);
        if age.as_secs_f64() > cfg.session_max_age_seconds as f64 {
            warn!(
                client = client_id,
                age_secs = age.as_secs_f64(),
                "session past its time cap"
            );
            return Decision::deny(DenyReason::SessionExpired, None);
        }
        if session.count >= cfg.session_max_requests {
            warn!(
                client = client_id,
                session_count = session.count,
                "session past its request cap"
            );
            return Decision::deny(
                DenyReason::SessionRequests {
                    cap: cfg.session_max_requests,
                },
                None,
            );
        }

        // Per-client windows.
        {
            let bucket = store.client_hour(client_id, now);
            if bucket.count >= cfg.ip_max_requests_per_hour {
                let wait = bucket.remaining(now);
                return Decision::deny(
                    DenyReason::IpHourlyRequests {
                        cap: cfg.ip_max_requests_per_hour,
                    },
                    Some(wait),
                );
            }
        }
        {
            let bucket = store.client_day(client_id, now);
            if bucket.count >= cfg.ip_max_requests_per_day {
                let wait = bucket.remaining(now);
                return Decision::deny(
                    DenyReason::IpDailyRequests {
                        cap: cfg.ip_max_requests_per_day,
                    },
                    Some(wait),
                );
            }
            if bucket.active_secs >= cfg.ip_max_active_seconds_per_day {
                let wait = bucket.remaining(now);
                return Decision::deny(
                    DenyReason::IpDailyActiveTime {
                        cap_secs: cfg.ip_max_active_seconds_per_day,
                    },
                    Some(wait),
                );
            }
        }

        // Global windows.
        {
            let bucket = store.global_hour(now);
            if bucket.count >= cfg.global_max_requests_per_hour {
                let wait = bucket.remaining(now);
                return Decision::deny(
                    DenyReason::GlobalHourlyRequests {
                        cap: cfg.global_max_requests_per_hour,
                    },
                    Some(wait),
                );
            }
        }
        {
            let bucket = store.global_day(now);
            if bucket.count >= cfg.global_max_requests_per_day {
                let wait = bucket.remaining(now);
                return Decision::deny(
                    DenyReason::GlobalDailyRequests {
                        cap: cfg.global_max_requests_per_day,
                    },
                    Some(wait),
                );
            }
            if bucket.active_secs >= cfg.global_max_active_seconds_per_day {
                let wait = bucket.remaining(now);
                return Decision::deny(
                    DenyReason::GlobalDailyActiveTime {
                        cap_secs: cfg.global_max_active_seconds_per_day,
                    },
                    Some(wait),
                );
            }
            if bucket.cost >= cfg.daily_cost_limit {
                let wait = bucket.remaining(now);
                return Decision::deny(
                    DenyReason::GlobalDailyCost {
                        cap: cfg.daily_cost_limit,
                    },
                    Some(wait),
                );
            }
        }
        {
            let bucket = store.global_month_requests(now);
            if bucket.count >= cfg.global_max_requests_per_month {
                let wait = bucket.remaining(now);
                return Decision::deny(
                    DenyReason::GlobalMonthlyRequests {
                        cap: cfg.global_max_requests_per_month,
                    },
                    Some(wait),
                );
            }
        }
        {
            let bucket = store.global_month_cost(now);
            if bucket.cost >= cfg.monthly_cost_limit {
                let wait = bucket.remaining(now);
                return Decision::deny(
                    DenyReason::GlobalMonthlyCost {
                        cap: cfg.monthly_cost_limit,
                    },
                    Some(wait),
                );
            }
        }

        // All clear: charge every request-counting bucket while the lock is
        // still held. Session count stays caller-gated.
        store.client_hour(client_id, now).count += 1;
        store.client_day(client_id, now).count += 1;
        store.global_hour(now).count += 1;
        store.global_day(now).count += 1;
        store.global_month_requests(now).count += 1;

        if session.started_at.is_none() {
            session.started_at = Some(now);
        }

        debug!(
            client = client_id,
            session_count = session.count,
            "request admitted"
        );
        Decision::Allowed
    }

    /// Charge the time and cost buckets for an attempted operation.
    ///
    /// Called after every attempt - success, downstream throttle, or error -
    /// because attempts consume connection time and compute even when they
    /// fail. Only a pre-check denial skips real consumption; the caller then
    /// passes a zero duration, which is a no-op for time and cost but still
    /// exercises bucket rollover.
    pub fn post_consume(&self, client_id: &str, duration: Duration) {
        self.post_consume_at(client_id, duration, Instant::now())
    }

    /// Deterministic variant of [`post_consume`] taking an explicit clock
    /// reading. Primarily useful for testing window rollover.
    ///
    /// [`post_consume`]: RateLimiter::post_consume
    pub fn post_consume_at(&self, client_id: &str, duration: Duration, now: Instant) {
        let secs = duration.as_secs_f64();
        let cost = secs * self.config.cost_per_second;

        let mut store = self.store.lock();

        store.client_day(client_id, now).active_secs += secs;

        let global_day = store.global_day(now);
        global_day.active_secs += secs;
        global_day.cost += cost;

        store.global_month_cost(now).cost += cost;

        trace!(
            client = client_id,
            active_secs = secs,
            cost = cost,
            "consumption recorded"
        );
    }

    /// Snapshot the global buckets.
    pub fn usage(&self) -> GlobalUsage {
        self.usage_at(Instant::now())
    }

    /// Snapshot the global buckets as of an explicit clock reading, rolling
    /// expired windows over first.
    pub fn usage_at(&self, now: Instant) -> GlobalUsage {
        let mut store = self.store.lock();
        let hour = store.global_hour(now).count;
        let day = store.global_day(now).clone();
        let month_requests = store.global_month_requests(now).count;
        let month_cost = store.global_month_cost(now).cost;

        GlobalUsage {
            hourly_requests: hour,
            daily_requests: day.count,
            daily_active_secs: day.active_secs,
            daily_cost: day.cost,
            monthly_requests: month_requests,
            monthly_cost: month_cost,
        }
    }

    /// Snapshot one client's buckets. Returns `None` for a client the
    /// limiter has never seen.
    pub fn client_usage(&self, client_id: &str) -> Option<ClientUsage> {
        self.client_usage_at(client_id, Instant::now())
    }

    /// Snapshot one client's buckets as of an explicit clock reading.
    pub fn client_usage_at(&self, client_id: &str, now: Instant) -> Option<ClientUsage> {
        let mut store = self.store.lock();
        let hourly = store.peek_client(client_id, TimeWindow::Hour, now).map(|b| b.count);
        let daily = store
            .peek_client(client_id, TimeWindow::Day, now)
            .map(|b| (b.count, b.active_secs));

        if hourly.is_none() && daily.is_none() {
            return None;
        }
        let (daily_requests, daily_active_secs) = daily.unwrap_or((0, 0.0));
        Some(ClientUsage {
            hourly_requests: hourly.unwrap_or(0),
            daily_requests,
            daily_active_secs,
        })
    }

    /// Discard all counters, as a process restart would.
    ///
    /// This is primarily useful for testing.
    pub fn reset(&self) {
        let mut store = self.store.lock();
        *store = BucketStore::new(Instant::now());
    }

    /// The ceilings this limiter was constructed with.
    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }
}

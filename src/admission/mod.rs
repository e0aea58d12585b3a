//! Admission control and quota accounting.
//!
//! The limiter answers one question for every incoming request: may it
//! proceed, given what this session, this client, and the process as a whole
//! have already consumed. [`RateLimiter::pre_check`] is the gate,
//! [`RateLimiter::post_consume`] the reconciliation afterward.

mod bucket;
mod decision;
mod limiter;
mod session;

pub use bucket::{TimeWindow, WindowBucket};
pub use decision::{Decision, Denial, DenyReason};
pub use limiter::{ClientUsage, GlobalUsage, RateLimiter};
pub use session::{SessionState, UNKNOWN_CLIENT};

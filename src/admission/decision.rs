//! Admission decisions and their user-facing presentation.
//!
//! The limiter core stays presentation-agnostic: a denial carries a
//! structured [`DenyReason`] plus the raw time remaining until the relevant
//! bucket resets. Rendering to human text happens only here, in the
//! [`Display`] impls, and the frontend is expected to surface that text
//! verbatim as status output.
//!
//! [`Display`]: std::fmt::Display

use std::fmt;
use std::time::Duration;

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The request may proceed; request-counting buckets were charged.
    Allowed,
    /// The request must not proceed; no counters were touched.
    Denied(Denial),
}

impl Decision {
    pub(crate) fn deny(reason: DenyReason, retry_after: Option<Duration>) -> Self {
        Decision::Denied(Denial { reason, retry_after })
    }

    /// Whether the request was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    /// The denial, if the request was refused.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Decision::Allowed => None,
            Decision::Denied(denial) => Some(denial),
        }
    }
}

/// A quota denial: which ceiling was hit, and how long until the relevant
/// window resets. Session-scope denials carry no `retry_after` because
/// sessions never reset on their own.
#[derive(Debug, Clone, PartialEq)]
pub struct Denial {
    pub reason: DenyReason,
    pub retry_after: Option<Duration>,
}

impl Denial {
    /// The user-facing status line for this denial.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            DenyReason::SessionExpired | DenyReason::SessionRequests { .. } => {
                write!(f, "{}. refresh the tab to start a new session.", self.reason)
            }
            reason => {
                let wait = self.retry_after.unwrap_or(Duration::ZERO);
                write!(f, "{} reached. try again in {}", reason, format_wait(wait))
            }
        }
    }
}

/// Which scope and dimension (session/client/global x count/time/cost) was
/// exhausted. Ceiling values are captured at denial time so the message
/// survives later configuration changes.
#[derive(Debug, Clone, PartialEq)]
pub enum DenyReason {
    SessionExpired,
    SessionRequests { cap: u32 },
    IpHourlyRequests { cap: u64 },
    IpDailyRequests { cap: u64 },
    IpDailyActiveTime { cap_secs: f64 },
    GlobalHourlyRequests { cap: u64 },
    GlobalDailyRequests { cap: u64 },
    GlobalDailyActiveTime { cap_secs: f64 },
    GlobalDailyCost { cap: f64 },
    GlobalMonthlyRequests { cap: u64 },
    GlobalMonthlyCost { cap: f64 },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::SessionExpired => write!(f, "session time cap reached"),
            DenyReason::SessionRequests { cap } => {
                write!(f, "session request cap reached ({})", cap)
            }
            DenyReason::IpHourlyRequests { cap } => write!(f, "ip hourly cap {}", cap),
            DenyReason::IpDailyRequests { cap } => write!(f, "ip daily cap {}", cap),
            DenyReason::IpDailyActiveTime { cap_secs } => {
                write!(f, "ip daily active time cap {} sec", cap_secs)
            }
            DenyReason::GlobalHourlyRequests { cap } => write!(f, "global hourly cap {}", cap),
            DenyReason::GlobalDailyRequests { cap } => write!(f, "global daily cap {}", cap),
            DenyReason::GlobalDailyActiveTime { cap_secs } => {
                write!(f, "global daily active time cap {} sec", cap_secs)
            }
            DenyReason::GlobalDailyCost { cap } => write!(f, "global daily cost cap {}", cap),
            DenyReason::GlobalMonthlyRequests { cap } => write!(f, "global monthly cap {}", cap),
            DenyReason::GlobalMonthlyCost { cap } => write!(f, "global monthly cost cap {}", cap),
        }
    }
}

/// Render a wait duration at three-tier granularity: hours with one decimal
/// above an hour, minutes with one decimal above a minute, whole seconds
/// otherwise.
pub(crate) fn format_wait(wait: Duration) -> String {
    let secs = wait.as_secs_f64();
    if secs >= 3600.0 {
        format!("{:.1} hours", secs / 3600.0)
    } else if secs >= 60.0 {
        format!("{:.1} minutes", secs / 60.0)
    } else {
        format!("{:.0} seconds", secs)
    }
}

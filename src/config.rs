//! Configuration management for quotagate.
//!
//! Every tunable is a ceiling for one (scope, window, dimension) combination
//! or the unit-cost multiplier. Absent values fall back to the documented
//! defaults, which are deliberately tight at global scope (a shared demo
//! budget) and relaxed at per-client scope.

use serde::{Deserialize, Serialize};

/// Quota ceilings and cost tunables for the limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Maximum successful requests per logical session
    #[serde(default = "default_session_max_requests")]
    pub session_max_requests: u32,

    /// Maximum session lifetime in seconds
    #[serde(default = "default_session_max_age_seconds")]
    pub session_max_age_seconds: u64,

    /// Per-client request ceiling over the rolling hour
    #[serde(default = "default_ip_max_requests_per_hour")]
    pub ip_max_requests_per_hour: u64,

    /// Per-client request ceiling over the rolling day
    #[serde(default = "default_ip_max_requests_per_day")]
    pub ip_max_requests_per_day: u64,

    /// Per-client active-time ceiling (seconds) over the rolling day
    #[serde(default = "default_ip_max_active_seconds_per_day")]
    pub ip_max_active_seconds_per_day: f64,

    /// Global request ceiling over the rolling hour
    #[serde(default = "default_global_max_requests_per_hour")]
    pub global_max_requests_per_hour: u64,

    /// Global request ceiling over the rolling day
    #[serde(default = "default_global_max_requests_per_day")]
    pub global_max_requests_per_day: u64,

    /// Global request ceiling over the rolling month
    #[serde(default = "default_global_max_requests_per_month")]
    pub global_max_requests_per_month: u64,

    /// Global active-time ceiling (seconds) over the rolling day
    #[serde(default = "default_global_max_active_seconds_per_day")]
    pub global_max_active_seconds_per_day: f64,

    /// Synthetic monetary cost charged per second of active time
    #[serde(default = "default_cost_per_second")]
    pub cost_per_second: f64,

    /// Global cost ceiling over the rolling day
    #[serde(default = "default_daily_cost_limit")]
    pub daily_cost_limit: f64,

    /// Global cost ceiling over the rolling month
    #[serde(default = "default_monthly_cost_limit")]
    pub monthly_cost_limit: f64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            session_max_requests: default_session_max_requests(),
            session_max_age_seconds: default_session_max_age_seconds(),
            ip_max_requests_per_hour: default_ip_max_requests_per_hour(),
            ip_max_requests_per_day: default_ip_max_requests_per_day(),
            ip_max_active_seconds_per_day: default_ip_max_active_seconds_per_day(),
            global_max_requests_per_hour: default_global_max_requests_per_hour(),
            global_max_requests_per_day: default_global_max_requests_per_day(),
            global_max_requests_per_month: default_global_max_requests_per_month(),
            global_max_active_seconds_per_day: default_global_max_active_seconds_per_day(),
            cost_per_second: default_cost_per_second(),
            daily_cost_limit: default_daily_cost_limit(),
            monthly_cost_limit: default_monthly_cost_limit(),
        }
    }
}

fn default_session_max_requests() -> u32 {
    5
}

fn default_session_max_age_seconds() -> u64 {
    15 * 60
}

fn default_ip_max_requests_per_hour() -> u64 {
    200
}

fn default_ip_max_requests_per_day() -> u64 {
    1000
}

fn default_ip_max_active_seconds_per_day() -> f64 {
    3600.0
}

fn default_global_max_requests_per_hour() -> u64 {
    50
}

fn default_global_max_requests_per_day() -> u64 {
    100
}

fn default_global_max_requests_per_month() -> u64 {
    500
}

fn default_global_max_active_seconds_per_day() -> f64 {
    6.0 * 3600.0
}

fn default_cost_per_second() -> f64 {
    0.0005
}

fn default_daily_cost_limit() -> f64 {
    5.0
}

fn default_monthly_cost_limit() -> f64 {
    10.0
}

impl LimiterConfig {
    /// Load configuration from a YAML file path.
    pub fn from_file(path: &str) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: LimiterConfig = serde_yaml::from_str(&contents)
            .map_err(|e| crate::error::QuotagateError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration from `QUOTAGATE_`-prefixed environment variables,
    /// e.g. `QUOTAGATE_GLOBAL_MAX_REQUESTS_PER_HOUR=50`. Unset variables
    /// fall back to the defaults.
    pub fn from_env() -> crate::error::Result<Self> {
        let source = config::Config::builder()
            .add_source(config::Environment::with_prefix("QUOTAGATE").try_parsing(true))
            .build()
            .map_err(|e| crate::error::QuotagateError::Config(e.to_string()))?;

        source
            .try_deserialize()
            .map_err(|e| crate::error::QuotagateError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LimiterConfig::default();

        assert_eq!(config.session_max_requests, 5);
        assert_eq!(config.session_max_age_seconds, 900);
        assert_eq!(config.ip_max_requests_per_hour, 200);
        assert_eq!(config.ip_max_requests_per_day, 1000);
        assert_eq!(config.global_max_requests_per_hour, 50);
        assert_eq!(config.global_max_requests_per_day, 100);
        assert_eq!(config.global_max_requests_per_month, 500);
        assert_eq!(config.cost_per_second, 0.0005);
        assert_eq!(config.daily_cost_limit, 5.0);
        assert_eq!(config.monthly_cost_limit, 10.0);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "global_max_requests_per_hour: 10\ncost_per_second: 0.001\n";
        let config: LimiterConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.global_max_requests_per_hour, 10);
        assert_eq!(config.cost_per_second, 0.001);
        // untouched fields stay at defaults
        assert_eq!(config.session_max_requests, 5);
        assert_eq!(config.ip_max_requests_per_day, 1000);
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("QUOTAGATE_SESSION_MAX_REQUESTS", "7");
        std::env::set_var("QUOTAGATE_DAILY_COST_LIMIT", "2.5");

        let config = LimiterConfig::from_env().unwrap();

        assert_eq!(config.session_max_requests, 7);
        assert_eq!(config.daily_cost_limit, 2.5);
        assert_eq!(config.global_max_requests_per_hour, 50);

        std::env::remove_var("QUOTAGATE_SESSION_MAX_REQUESTS");
        std::env::remove_var("QUOTAGATE_DAILY_COST_LIMIT");
    }
}

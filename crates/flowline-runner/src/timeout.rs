//! Per-task deadline resolution.
//!
//! Remote tasks are never dispatched without a bounded deadline: the resolver
//! is total, and a misconfigured timeout degrades to the policy defaults
//! instead of failing (or blocking the graph forever).

use std::time::Duration;

use flowline_dag::Timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
}

impl TimeUnit {
    pub fn parse(unit: &str) -> Option<Self> {
        match unit {
            "second" => Some(TimeUnit::Second),
            "minute" => Some(TimeUnit::Minute),
            "hour" => Some(TimeUnit::Hour),
            _ => None,
        }
    }

    fn secs(self) -> u64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3600,
        }
    }
}

/// Immutable default policy, injected into the adapter at construction.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutPolicy {
    pub default_amount: u64,
    pub default_unit: TimeUnit,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            default_amount: 12,
            default_unit: TimeUnit::Hour,
        }
    }
}

impl TimeoutPolicy {
    /// Resolve a declared timeout to a concrete duration.
    ///
    /// A non-positive amount falls back to the default amount, an empty or
    /// unrecognized unit to the default unit; the product saturates.
    pub fn resolve(&self, timeout: &Timeout) -> Duration {
        let amount = match u64::try_from(timeout.amount) {
            Ok(amount) if amount > 0 => amount,
            _ => self.default_amount,
        };
        let unit = TimeUnit::parse(&timeout.unit).unwrap_or(self.default_unit);

        Duration::from_secs(amount.saturating_mul(unit.secs()))
    }
}

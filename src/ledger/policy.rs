//! Update policies deciding when a cached repository must be fetched again.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::GopmError;

const MILLIS_PER_MINUTE: i64 = 60_000;
const MINUTES_PER_DAY: u64 = 24 * 60;

/// How often a cached dependency is refreshed from its remote.
///
/// Parsed from `never`, `always`, `daily` or `interval:<minutes>`. An empty string means
/// `never`.
///
/// ```
/// use gopm::ledger::UpdatePolicy;
///
/// let policy: UpdatePolicy = "interval:30".parse().unwrap();
/// assert_eq!(policy, UpdatePolicy::Interval(30));
/// assert_eq!(policy.to_string(), "interval:30");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UpdatePolicy {
    /// Fetch once, never refresh.
    #[default]
    Never,
    /// Refresh on every resolution.
    Always,
    /// Refresh when the last fetch is older than 24 hours.
    Daily,
    /// Refresh when the last fetch is older than the given number of minutes.
    Interval(u64),
}

impl UpdatePolicy {
    /// Interval in minutes, `None` for `never` and `always`.
    #[must_use]
    pub const fn interval_minutes(&self) -> Option<u64> {
        match self {
            Self::Never | Self::Always => None,
            Self::Daily => Some(MINUTES_PER_DAY),
            Self::Interval(minutes) => Some(*minutes),
        }
    }

    /// Whether a repository last fetched at `last_updated_millis` is due at `now_millis`.
    #[must_use]
    pub fn update_required(&self, last_updated_millis: i64, now_millis: i64) -> bool {
        match self.interval_minutes() {
            None => matches!(self, Self::Always),
            Some(minutes) => {
                let interval = i64::try_from(minutes)
                    .unwrap_or(i64::MAX)
                    .saturating_mul(MILLIS_PER_MINUTE);
                now_millis.saturating_sub(last_updated_millis) > interval
            }
        }
    }
}

impl FromStr for UpdatePolicy {
    type Err = GopmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| GopmError::InvalidUpdatePolicy {
            value: value.to_string(),
            reason: reason.to_string(),
        };
        if value.is_empty() {
            return Ok(Self::Never);
        }
        let (kind, argument) = match value.split_once(':') {
            Some((kind, argument)) => (kind, Some(argument)),
            None => (value, None),
        };
        match (kind, argument) {
            ("never", None) => Ok(Self::Never),
            ("always", None) => Ok(Self::Always),
            ("daily", None) => Ok(Self::Daily),
            ("interval", Some(minutes)) => minutes
                .trim()
                .parse::<u64>()
                .map(Self::Interval)
                .map_err(|_| invalid("interval must be a non-negative number of minutes")),
            ("interval", None) => Err(invalid("interval requires a number of minutes")),
            ("never" | "always" | "daily", Some(_)) => {
                Err(invalid("only interval accepts an argument"))
            }
            _ => Err(invalid("expected never, always, daily or interval:<minutes>")),
        }
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::Always => write!(f, "always"),
            Self::Daily => write!(f, "daily"),
            Self::Interval(minutes) => write!(f, "interval:{minutes}"),
        }
    }
}

impl TryFrom<String> for UpdatePolicy {
    type Error = GopmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UpdatePolicy> for String {
    fn from(policy: UpdatePolicy) -> Self {
        policy.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: i64 = 60_000;

    #[test]
    fn test_parse_variants() {
        assert_eq!("".parse::<UpdatePolicy>().unwrap(), UpdatePolicy::Never);
        assert_eq!("never".parse::<UpdatePolicy>().unwrap(), UpdatePolicy::Never);
        assert_eq!("always".parse::<UpdatePolicy>().unwrap(), UpdatePolicy::Always);
        assert_eq!("daily".parse::<UpdatePolicy>().unwrap(), UpdatePolicy::Daily);
        assert_eq!("interval:15".parse::<UpdatePolicy>().unwrap(), UpdatePolicy::Interval(15));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for value in ["interval", "interval:", "interval:-5", "daily:3", "weekly", "interval:x"] {
            let error = value.parse::<UpdatePolicy>().unwrap_err();
            assert!(
                matches!(error, GopmError::InvalidUpdatePolicy { .. }),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(UpdatePolicy::Daily.to_string(), "daily");
        assert_eq!(UpdatePolicy::Interval(90).to_string(), "interval:90");
        assert_eq!(UpdatePolicy::default().to_string(), "never");
    }

    #[test]
    fn test_never_and_always() {
        assert!(!UpdatePolicy::Never.update_required(0, i64::MAX));
        assert!(UpdatePolicy::Always.update_required(1_000, 1_000));
    }

    #[test]
    fn test_interval_boundaries() {
        let policy = UpdatePolicy::Interval(10);
        let last = 1_000_000;
        assert!(!policy.update_required(last, last + 10 * MINUTE));
        assert!(policy.update_required(last, last + 10 * MINUTE + 1));
    }

    #[test]
    fn test_daily_is_24_hours() {
        let last = 0;
        assert!(!UpdatePolicy::Daily.update_required(last, 24 * 60 * MINUTE));
        assert!(UpdatePolicy::Daily.update_required(last, 24 * 60 * MINUTE + 1));
    }

    #[test]
    fn test_serde_as_string() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            policy: UpdatePolicy,
        }
        let holder: Holder = toml::from_str("policy = \"interval:5\"").unwrap();
        assert_eq!(holder.policy, UpdatePolicy::Interval(5));
        assert!(toml::from_str::<Holder>("policy = \"sometimes\"").is_err());
    }
}

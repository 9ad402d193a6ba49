//! Delivery cadence types

use serde::{Deserialize, Serialize};

/// Unit for custom delivery intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Days,
    Weeks,
    Months,
}

impl std::fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Days => write!(f, "days"),
            Self::Weeks => write!(f, "weeks"),
            Self::Months => write!(f, "months"),
        }
    }
}

impl std::str::FromStr for IntervalUnit {
    type Err = FrequencyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" | "days" => Ok(Self::Days),
            "week" | "weeks" => Ok(Self::Weeks),
            "month" | "months" => Ok(Self::Months),
            _ => Err(FrequencyParseError(s.to_string())),
        }
    }
}

/// How often a subscription delivers
///
/// Persisted and serialized as a string: `weekly`, `biweekly`, `monthly`,
/// or `every-{value}-{unit}` for custom intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Frequency {
    /// Every 7 days
    Weekly,
    /// Every 14 days
    BiWeekly,
    /// Every calendar month, day-of-month preserving with end-of-month clamping
    Monthly,
    /// Every `value` of `unit`
    Custom { value: u32, unit: IntervalUnit },
}

impl Frequency {
    /// Human-readable label, recorded on materialized orders
    pub fn label(&self) -> String {
        match self {
            Self::Weekly => "Weekly".to_string(),
            Self::BiWeekly => "Every 2 weeks".to_string(),
            Self::Monthly => "Monthly".to_string(),
            Self::Custom { value, unit } => format!("Every {value} {unit}"),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weekly => write!(f, "weekly"),
            Self::BiWeekly => write!(f, "biweekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Custom { value, unit } => write!(f, "every-{value}-{unit}"),
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = FrequencyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::BiWeekly),
            "monthly" => Ok(Self::Monthly),
            custom => {
                let mut parts = custom.strip_prefix("every-").unwrap_or("").splitn(2, '-');
                let value: u32 = parts
                    .next()
                    .and_then(|v| v.parse().ok())
                    .filter(|v| *v >= 1)
                    .ok_or_else(|| FrequencyParseError(s.to_string()))?;
                let unit: IntervalUnit = parts
                    .next()
                    .ok_or_else(|| FrequencyParseError(s.to_string()))?
                    .parse()
                    .map_err(|_| FrequencyParseError(s.to_string()))?;
                Ok(Self::Custom { value, unit })
            }
        }
    }
}

impl From<Frequency> for String {
    fn from(f: Frequency) -> Self {
        f.to_string()
    }
}

impl TryFrom<String> for Frequency {
    type Error = FrequencyParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Error parsing a frequency string
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid frequency: {0}")]
pub struct FrequencyParseError(pub String);

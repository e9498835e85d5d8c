//! Period, payroll type and personnel scope.
//!
//! These three values identify what a payroll run covers. A committed run is
//! unique per ([`Period`], [`PayrollType`]).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EngineError;

/// A calendar month in `YYYY-MM` form.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Period;
/// use chrono::NaiveDate;
///
/// let period: Period = "2025-02".parse().unwrap();
/// assert_eq!(period.to_string(), "2025-02");
/// assert_eq!(period.last_day(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
/// assert!("2025-2".parse::<Period>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period, returning `None` for a month outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (1..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month, 1 through 12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Number of calendar days in the month.
    pub fn days(&self) -> u32 {
        self.last_day().day()
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidPeriod {
            value: s.to_string(),
        };
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let digits_ok = bytes[..4]
            .iter()
            .chain(&bytes[5..])
            .all(|b| b.is_ascii_digit());
        if !digits_ok {
            return Err(invalid());
        }
        let year: i32 = s[..4].parse().map_err(|_| invalid())?;
        let month: u32 = s[5..].parse().map_err(|_| invalid())?;
        Period::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Classification of a payroll run.
///
/// Each type scales the worker's basic salary by its own multiplier before
/// any concept is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollType {
    /// The regular monthly payroll.
    Regular,
    /// Annual bonus payroll.
    Bonus,
    /// Statutory gratification payroll.
    Gratification,
    /// Severance accrual deposit.
    SeveranceAccrual,
}

impl PayrollType {
    /// The built-in basic salary multiplier (1.17 for severance accrual, 1 otherwise).
    pub fn default_multiplier(&self) -> Decimal {
        match self {
            PayrollType::SeveranceAccrual => Decimal::new(117, 2),
            _ => Decimal::ONE,
        }
    }

    /// Returns the snake_case label used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayrollType::Regular => "regular",
            PayrollType::Bonus => "bonus",
            PayrollType::Gratification => "gratification",
            PayrollType::SeveranceAccrual => "severance_accrual",
        }
    }
}

impl fmt::Display for PayrollType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of the roster a run covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonnelScope {
    /// Every active worker.
    #[default]
    All,
    /// Active workers of one personnel group.
    Group(String),
}

impl PersonnelScope {
    /// Returns true if a worker in `personnel_group` belongs to this scope.
    pub fn includes(&self, personnel_group: &str) -> bool {
        match self {
            PersonnelScope::All => true,
            PersonnelScope::Group(group) => group == personnel_group,
        }
    }
}

impl fmt::Display for PersonnelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonnelScope::All => f.write_str("all"),
            PersonnelScope::Group(group) => f.write_str(group),
        }
    }
}

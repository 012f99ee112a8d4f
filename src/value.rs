//! Decoded datapoint values.
//!
//! This module defines [`Value`], the decoded form of a datapoint, together
//! with the packed [`TimeOfDay`] and [`Date`] field structures. Values are
//! produced by the codec on receipt and accepted by the write path;
//! structural equality between an old and a new `Value` drives the
//! change-detection flag in the state mirror.
//!
//! # Example
//!
//! ```
//! use wolf_ism8::{Date, TimeOfDay, Value};
//!
//! let setpoint = Value::Decimal(51.8);
//! let program = Value::Mode("Automatikbetrieb");
//! let start = Value::Time(TimeOfDay::new(3, 14, 5, 59));
//! let day = Value::Date(Date::new(21, 6, 2024));
//!
//! assert_ne!(setpoint, Value::Decimal(51.9));
//! assert_eq!(day, Value::Date(Date::new(21, 6, 2024)));
//! ```

/// Time of day with an optional weekday, as carried by 3-byte time
/// datapoints.
///
/// `weekday` follows the KNX convention: 0 = no day, 1 = Monday through
/// 7 = Sunday. Field ranges are enforced by the codec, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    /// Weekday (0 = none, 1 = Monday … 7 = Sunday).
    pub weekday: u8,
    /// Hour (0–23).
    pub hour: u8,
    /// Minute (0–59).
    pub minute: u8,
    /// Second (0–59).
    pub second: u8,
}

impl TimeOfDay {
    /// Creates a new time of day.
    pub fn new(weekday: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            weekday,
            hour,
            minute,
            second,
        }
    }

    /// Creates a time of day without a weekday.
    pub fn at(hour: u8, minute: u8, second: u8) -> Self {
        Self::new(0, hour, minute, second)
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Calendar date as carried by 3-byte date datapoints.
///
/// The wire format stores the year as an offset from 2000, so only the
/// years 2000–2099 are representable. Field ranges are enforced by the
/// codec, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    /// Day of month (1–31).
    pub day: u8,
    /// Month (1–12).
    pub month: u8,
    /// Full year (2000–2099).
    pub year: u16,
}

impl Date {
    /// Creates a new date.
    pub fn new(day: u8, month: u8, year: u16) -> Self {
        Self { day, month, year }
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// A decoded datapoint value.
///
/// Which variant a datapoint produces is determined by its
/// [`DataType`](crate::DataType): booleans decode to [`Value::Bool`],
/// integer types to [`Value::Integer`], floats and flow rates to
/// [`Value::Decimal`], scalings and percentages to [`Value::Percent`],
/// mode enumerations to [`Value::Mode`] with the documented label.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean state (switch, enable, open/close).
    Bool(bool),
    /// Integer reading (counters, energy).
    Integer(i64),
    /// Decimal reading (temperatures, pressures, flow rates).
    Decimal(f64),
    /// Percentage 0–100.
    Percent(f64),
    /// Time of day.
    Time(TimeOfDay),
    /// Calendar date.
    Date(Date),
    /// Operating-mode label from the per-type mode table.
    Mode(&'static str),
}

impl Value {
    /// Returns the boolean if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric reading for `Integer`, `Decimal` and `Percent`
    /// values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Decimal(d) | Value::Percent(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the mode label if this is a `Mode` value.
    pub fn as_mode(&self) -> Option<&'static str> {
        match self {
            Value::Mode(label) => Some(label),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Percent(p) => write!(f, "{p}%"),
            Value::Time(t) => write!(f, "{t}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Mode(label) => write!(f, "{label}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_display() {
        let t = TimeOfDay::new(3, 14, 5, 59);
        assert_eq!(t.to_string(), "14:05:59");
    }

    #[test]
    fn test_date_display() {
        let d = Date::new(4, 6, 2007);
        assert_eq!(d.to_string(), "2007-06-04");
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Value::Decimal(6.1), Value::Decimal(6.1));
        assert_ne!(Value::Decimal(6.1), Value::Decimal(0.1));
        assert_ne!(Value::Decimal(1.0), Value::Percent(1.0));
        assert_eq!(
            Value::Time(TimeOfDay::at(13, 56, 0)),
            Value::Time(TimeOfDay::new(0, 13, 56, 0))
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(42).as_f64(), Some(42.0));
        assert_eq!(Value::Percent(55.0).as_f64(), Some(55.0));
        assert_eq!(Value::Mode("Standby").as_mode(), Some("Standby"));
        assert_eq!(Value::Bool(true).as_f64(), None);
    }
}

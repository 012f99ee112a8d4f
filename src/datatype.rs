//! Data type definitions for ISM8 datapoints.
//!
//! This module defines the [`DataType`] enum which represents the wire
//! encodings used by the ISM8 gateway. Each type has a fixed byte width and
//! its own decode/encode rule (implemented in the [`codec`](crate::codec)
//! module).
//!
//! # Encodings Overview
//!
//! | Type | Width | Encoding |
//! |------|:-----:|----------|
//! | Bool | 1 | bit 0 of a single byte |
//! | Scaling | 1 | 0–255 mapped to 0–100 % |
//! | Percent | 1 | plain 0–100 % |
//! | Uint16 / Int16 | 2 | big-endian integer |
//! | Float16 | 2 | KNX float: 4-bit exponent, 11-bit mantissa, 0.01 steps |
//! | Float32 | 4 | IEEE 754 big-endian |
//! | Int32 | 4 | big-endian signed integer |
//! | FlowRate | 4 | big-endian signed integer × 0.0001 m³/h |
//! | TimeOfDay | 3 | weekday/hour, minute, second |
//! | Date | 3 | day, month, year − 2000 |
//! | mode types | 1 | enumeration code |
//!
//! # Example
//!
//! ```
//! use wolf_ism8::DataType;
//!
//! assert_eq!(DataType::Float16.byte_width(), 2);
//! assert_eq!(DataType::Date.byte_width(), 3);
//! assert_eq!(DataType::HvacMode.mode_label(2), Some("Standby"));
//! ```

/// Heating-circuit program selection modes (Wolf numbering).
const HVAC_MODES: &[(u8, &str)] = &[
    (0, "Automatikbetrieb"),
    (1, "Heizbetrieb"),
    (2, "Standby"),
    (3, "Sparbetrieb"),
    (4, "Automatikbetrieb kühlen"),
];

/// Ventilation (CWL) program selection modes.
const HVAC_MODES_CWL: &[(u8, &str)] = &[
    (0, "Automatikbetrieb"),
    (1, "Nennlüftung"),
    (2, "Standby"),
    (3, "Reduzierte Lüftung"),
    (4, "Feuchteschutz"),
];

/// Domestic hot water program selection modes.
const DHW_MODES: &[(u8, &str)] = &[
    (0, "Automatikbetrieb"),
    (1, "Dauerbetrieb"),
    (2, "Standby"),
    (3, "Sparbetrieb"),
];

/// Reported heating-circuit operating modes. Codes follow the KNX
/// HVACContrMode numbering, labels follow the Wolf documentation.
const HVAC_CONTROL_MODES: &[(u8, &str)] = &[
    (0, "Auto"),
    (1, "Heizbetrieb"),
    (2, "Aufheizung"),
    (3, "Kühlbetrieb"),
    (6, "Standby"),
    (7, "Test"),
    (8, "Emergency Heat"),
    (9, "Fan Only"),
    (11, "Frostschutz"),
];

/// Wire encodings used by ISM8 datapoints.
///
/// The set is closed: every datapoint in the registry references one of
/// these types, and the codec is generic over them. Switch, Bool, Enable
/// and OpenClose datapoints all share the [`DataType::Bool`] rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Single-byte boolean (bit 0).
    Bool,
    /// Single byte 0–255 scaled to 0–100 %.
    Scaling,
    /// Single byte holding a plain 0–100 percentage.
    Percent,
    /// Big-endian unsigned 16-bit integer.
    Uint16,
    /// Big-endian signed 16-bit integer.
    Int16,
    /// KNX 2-byte float (temperatures, pressures, power).
    Float16,
    /// IEEE 754 single precision, big-endian.
    Float32,
    /// Big-endian signed 32-bit integer (energy counters).
    Int32,
    /// Signed 32-bit integer scaled by 0.0001 to m³/h.
    FlowRate,
    /// Packed weekday + time of day.
    TimeOfDay,
    /// Packed day/month/year.
    Date,
    /// Heating-circuit program selection.
    HvacMode,
    /// Ventilation program selection (CWL devices).
    HvacModeCwl,
    /// Domestic hot water program selection.
    DhwMode,
    /// Reported operating mode.
    HvacControlMode,
}

impl DataType {
    /// Returns the number of bytes a value of this type occupies on the wire.
    pub fn byte_width(self) -> usize {
        match self {
            DataType::Bool
            | DataType::Scaling
            | DataType::Percent
            | DataType::HvacMode
            | DataType::HvacModeCwl
            | DataType::DhwMode
            | DataType::HvacControlMode => 1,
            DataType::Uint16 | DataType::Int16 | DataType::Float16 => 2,
            DataType::TimeOfDay | DataType::Date => 3,
            DataType::Float32 | DataType::Int32 | DataType::FlowRate => 4,
        }
    }

    /// Returns the code→label table for mode types, `None` otherwise.
    pub(crate) fn mode_table(self) -> Option<&'static [(u8, &'static str)]> {
        match self {
            DataType::HvacMode => Some(HVAC_MODES),
            DataType::HvacModeCwl => Some(HVAC_MODES_CWL),
            DataType::DhwMode => Some(DHW_MODES),
            DataType::HvacControlMode => Some(HVAC_CONTROL_MODES),
            _ => None,
        }
    }

    /// Returns the label for an enumeration code of a mode type.
    ///
    /// # Example
    ///
    /// ```
    /// use wolf_ism8::DataType;
    ///
    /// assert_eq!(DataType::HvacControlMode.mode_label(11), Some("Frostschutz"));
    /// assert_eq!(DataType::HvacControlMode.mode_label(5), None);
    /// assert_eq!(DataType::Bool.mode_label(0), None);
    /// ```
    pub fn mode_label(self, code: u8) -> Option<&'static str> {
        self.mode_table()?
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    /// Returns the enumeration code for a mode label.
    pub fn mode_code(self, label: &str) -> Option<u8> {
        self.mode_table()?
            .iter()
            .find(|(_, l)| *l == label)
            .map(|(c, _)| *c)
    }

    /// Returns whether this type is a 1-byte enumeration.
    pub fn is_mode(self) -> bool {
        self.mode_table().is_some()
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::Bool => "Bool",
            DataType::Scaling => "Scaling",
            DataType::Percent => "Percent",
            DataType::Uint16 => "Uint16",
            DataType::Int16 => "Int16",
            DataType::Float16 => "Float16",
            DataType::Float32 => "Float32",
            DataType::Int32 => "Int32",
            DataType::FlowRate => "FlowRate",
            DataType::TimeOfDay => "TimeOfDay",
            DataType::Date => "Date",
            DataType::HvacMode => "HVACMode",
            DataType::HvacModeCwl => "HVACMode-CWL",
            DataType::DhwMode => "DHWMode",
            DataType::HvacControlMode => "HVACContrMode",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_widths() {
        assert_eq!(DataType::Bool.byte_width(), 1);
        assert_eq!(DataType::Scaling.byte_width(), 1);
        assert_eq!(DataType::Uint16.byte_width(), 2);
        assert_eq!(DataType::Float16.byte_width(), 2);
        assert_eq!(DataType::TimeOfDay.byte_width(), 3);
        assert_eq!(DataType::Date.byte_width(), 3);
        assert_eq!(DataType::Float32.byte_width(), 4);
        assert_eq!(DataType::FlowRate.byte_width(), 4);
        assert_eq!(DataType::HvacMode.byte_width(), 1);
    }

    #[test]
    fn test_hvac_control_mode_table() {
        // Code/label pairs from the Wolf documentation.
        assert_eq!(DataType::HvacControlMode.mode_label(0), Some("Auto"));
        assert_eq!(DataType::HvacControlMode.mode_label(1), Some("Heizbetrieb"));
        assert_eq!(DataType::HvacControlMode.mode_label(6), Some("Standby"));
        assert_eq!(DataType::HvacControlMode.mode_label(7), Some("Test"));
        assert_eq!(
            DataType::HvacControlMode.mode_label(8),
            Some("Emergency Heat")
        );
        assert_eq!(DataType::HvacControlMode.mode_label(9), Some("Fan Only"));
        assert_eq!(DataType::HvacControlMode.mode_code("Frostschutz"), Some(11));
        assert_eq!(DataType::HvacControlMode.mode_code("GibtsNicht"), None);
    }

    #[test]
    fn test_mode_tables_differ() {
        // "Heizbetrieb" is a heating-circuit program but not a CWL one.
        assert!(DataType::HvacMode.mode_code("Heizbetrieb").is_some());
        assert!(DataType::HvacModeCwl.mode_code("Heizbetrieb").is_none());
        assert!(DataType::HvacModeCwl.mode_code("Feuchteschutz").is_some());
        assert!(DataType::HvacMode.mode_code("Feuchteschutz").is_none());
    }

    #[test]
    fn test_non_mode_types() {
        assert!(!DataType::Float16.is_mode());
        assert_eq!(DataType::Float16.mode_label(0), None);
        assert_eq!(DataType::Float16.mode_code("Auto"), None);
        assert!(DataType::DhwMode.is_mode());
    }

    #[test]
    fn test_display() {
        assert_eq!(DataType::Float16.to_string(), "Float16");
        assert_eq!(DataType::HvacControlMode.to_string(), "HVACContrMode");
    }
}

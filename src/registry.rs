//! Static datapoint registry for the ISM8 gateway.
//!
//! The gateway exposes a fixed, documented set of datapoints; this module
//! holds that table as data. Decode and encode stay generic over
//! [`DataType`] — no per-identifier logic lives anywhere else. Identifiers
//! absent from the table are *not* an error: the gateway firmware exposes
//! more points than the documentation covers, and their raw bytes are kept
//! uninterpreted by the state mirror.
//!
//! Device group abbreviations follow the Wolf documentation: HG = boiler
//! (Heizgerät), BM = control module, DK/DKW = direct heating / hot water
//! circuit, MK = mixer circuit, KM = cascade module, MM = mixer module,
//! SM = solar module, CWL = ventilation unit, BWL = heat pump, SYM =
//! system.
//!
//! # Example
//!
//! ```
//! use wolf_ism8::{registry, DataType};
//!
//! let def = registry::lookup(56).unwrap();
//! assert_eq!(def.name, "Warmwassersolltemperatur");
//! assert_eq!(def.data_type, DataType::Float16);
//! assert!(def.writable);
//!
//! assert!(registry::lookup(10_000).is_none());
//! ```

use crate::datatype::DataType;

/// Immutable description of one gateway datapoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatapointDefinition {
    /// Wire identifier, unique within the registry.
    pub id: u16,
    /// Device group the datapoint belongs to.
    pub device: &'static str,
    /// Documented datapoint name.
    pub name: &'static str,
    /// Wire encoding.
    pub data_type: DataType,
    /// Display unit, if the datapoint carries one.
    pub unit: Option<&'static str>,
    /// Whether values may be written back to the gateway.
    pub writable: bool,
    /// Allowed numeric range for writes, where the documentation narrows
    /// it below the data type's own domain.
    pub write_range: Option<(f64, f64)>,
}

const fn dp(
    id: u16,
    device: &'static str,
    name: &'static str,
    data_type: DataType,
    unit: Option<&'static str>,
    writable: bool,
) -> DatapointDefinition {
    DatapointDefinition {
        id,
        device,
        name,
        data_type,
        unit,
        writable,
        write_range: None,
    }
}

const fn dp_ranged(
    id: u16,
    device: &'static str,
    name: &'static str,
    data_type: DataType,
    unit: Option<&'static str>,
    min: f64,
    max: f64,
) -> DatapointDefinition {
    DatapointDefinition {
        id,
        device,
        name,
        data_type,
        unit,
        writable: true,
        write_range: Some((min, max)),
    }
}

use DataType::*;

/// The full datapoint table, sorted by id.
///
/// Gaps in the id sequence are real: the gateway documentation skips
/// numbers, and undocumented ids show up on the wire regardless.
#[rustfmt::skip]
static DATAPOINTS: &[DatapointDefinition] = &[
    // Boilers HG1-HG4, one identical block of twelve each.
    dp(1,  "HG1", "Störung", Bool, None, false),
    dp(2,  "HG1", "Betriebsart", HvacControlMode, None, false),
    dp(3,  "HG1", "Brennerleistung", Scaling, Some("%"), false),
    dp(4,  "HG1", "Kesseltemperatur", Float16, Some("°C"), false),
    dp(5,  "HG1", "Sammlertemperatur", Float16, Some("°C"), false),
    dp(6,  "HG1", "Rücklauftemperatur", Float16, Some("°C"), false),
    dp(7,  "HG1", "Warmwassertemperatur", Float16, Some("°C"), false),
    dp(8,  "HG1", "Außentemperatur", Float16, Some("°C"), false),
    dp(9,  "HG1", "Status Flamme", Bool, None, false),
    dp(10, "HG1", "Status Heizkreispumpe", Bool, None, false),
    dp(11, "HG1", "Status Speicherladepumpe", Bool, None, false),
    dp(12, "HG1", "Status 3-Wege-Umschaltventil", Bool, None, false),
    dp(13, "HG2", "Störung", Bool, None, false),
    dp(14, "HG2", "Betriebsart", HvacControlMode, None, false),
    dp(15, "HG2", "Brennerleistung", Scaling, Some("%"), false),
    dp(16, "HG2", "Kesseltemperatur", Float16, Some("°C"), false),
    dp(17, "HG2", "Sammlertemperatur", Float16, Some("°C"), false),
    dp(18, "HG2", "Rücklauftemperatur", Float16, Some("°C"), false),
    dp(19, "HG2", "Warmwassertemperatur", Float16, Some("°C"), false),
    dp(20, "HG2", "Außentemperatur", Float16, Some("°C"), false),
    dp(21, "HG2", "Status Flamme", Bool, None, false),
    dp(22, "HG2", "Status Heizkreispumpe", Bool, None, false),
    dp(23, "HG2", "Status Speicherladepumpe", Bool, None, false),
    dp(24, "HG2", "Status 3-Wege-Umschaltventil", Bool, None, false),
    dp(25, "HG3", "Störung", Bool, None, false),
    dp(26, "HG3", "Betriebsart", HvacControlMode, None, false),
    dp(27, "HG3", "Brennerleistung", Scaling, Some("%"), false),
    dp(28, "HG3", "Kesseltemperatur", Float16, Some("°C"), false),
    dp(29, "HG3", "Sammlertemperatur", Float16, Some("°C"), false),
    dp(30, "HG3", "Rücklauftemperatur", Float16, Some("°C"), false),
    dp(31, "HG3", "Warmwassertemperatur", Float16, Some("°C"), false),
    dp(32, "HG3", "Außentemperatur", Float16, Some("°C"), false),
    dp(33, "HG3", "Status Flamme", Bool, None, false),
    dp(34, "HG3", "Status Heizkreispumpe", Bool, None, false),
    dp(35, "HG3", "Status Speicherladepumpe", Bool, None, false),
    dp(36, "HG3", "Status 3-Wege-Umschaltventil", Bool, None, false),
    dp(37, "HG4", "Störung", Bool, None, false),
    dp(38, "HG4", "Betriebsart", HvacControlMode, None, false),
    dp(39, "HG4", "Brennerleistung", Scaling, Some("%"), false),
    dp(40, "HG4", "Kesseltemperatur", Float16, Some("°C"), false),
    dp(41, "HG4", "Sammlertemperatur", Float16, Some("°C"), false),
    dp(42, "HG4", "Rücklauftemperatur", Float16, Some("°C"), false),
    dp(43, "HG4", "Warmwassertemperatur", Float16, Some("°C"), false),
    dp(44, "HG4", "Außentemperatur", Float16, Some("°C"), false),
    dp(45, "HG4", "Status Flamme", Bool, None, false),
    dp(46, "HG4", "Status Heizkreispumpe", Bool, None, false),
    dp(47, "HG4", "Status Speicherladepumpe", Bool, None, false),
    dp(48, "HG4", "Status 3-Wege-Umschaltventil", Bool, None, false),
    // System totals.
    dp(49, "SYM", "Sammelstörung", Bool, None, false),
    dp(50, "SYM", "Außentemperatur gemittelt", Float16, Some("°C"), false),
    // Direct heating and hot water circuit.
    dp(51, "DK",  "Status Heizkreispumpe", Bool, None, false),
    dp(52, "DK",  "Zeitprogramm Heizkreis", Bool, None, true),
    dp(53, "DK",  "Raumtemperatur", Float16, Some("°C"), false),
    dp_ranged(54, "DK", "Raumsolltemperatur", Float16, Some("°C"), 5.0, 30.0),
    dp(55, "DK",  "Vorlauftemperatur", Float16, Some("°C"), false),
    dp_ranged(56, "DKW", "Warmwassersolltemperatur", Float16, Some("°C"), 20.0, 80.0),
    dp(57, "DK",  "Programmwahl Heizkreis", HvacMode, None, true),
    dp(58, "DKW", "Programmwahl Warmwasser", DhwMode, None, true),
    dp(59, "DKW", "Status Speicherladepumpe", Bool, None, false),
    dp(60, "DKW", "Warmwassertemperatur", Float16, Some("°C"), false),
    dp(61, "DK",  "Vorlaufsolltemperatur", Float16, Some("°C"), false),
    dp(62, "DK",  "Status Sparbetrieb", Bool, None, false),
    dp(63, "DK",  "Status Frostschutz", Bool, None, false),
    dp_ranged(64, "DK", "Heizkurvenverschiebung", Float16, Some("K"), -5.0, 5.0),
    // Mixer circuits MK1-MK3, one block of ten each.
    dp(65, "MK1", "Raumtemperatur", Float16, Some("°C"), false),
    dp_ranged(66, "MK1", "Raumsolltemperatur", Float16, Some("°C"), 5.0, 30.0),
    dp(67, "MK1", "Vorlauftemperatur", Float16, Some("°C"), false),
    dp(68, "MK1", "Vorlaufsolltemperatur", Float16, Some("°C"), false),
    dp(69, "MK1", "Status Mischerkreispumpe", Bool, None, false),
    dp(70, "MK1", "Programmwahl Mischer", HvacMode, None, true),
    dp(71, "MK1", "Mischerposition", Scaling, Some("%"), false),
    dp(72, "MK1", "Mischer Zeitprogramm 1", Bool, None, true),
    dp(73, "MK1", "Mischer Zeitprogramm 2", Bool, None, true),
    dp(74, "MK1", "Mischer Zeitprogramm 3", Bool, None, true),
    dp(75, "MK2", "Raumtemperatur", Float16, Some("°C"), false),
    dp_ranged(76, "MK2", "Raumsolltemperatur", Float16, Some("°C"), 5.0, 30.0),
    dp(77, "MK2", "Vorlauftemperatur", Float16, Some("°C"), false),
    dp(78, "MK2", "Vorlaufsolltemperatur", Float16, Some("°C"), false),
    dp(79, "MK2", "Status Mischerkreispumpe", Bool, None, false),
    dp(80, "MK2", "Programmwahl Mischer", HvacMode, None, true),
    dp(81, "MK2", "Mischerposition", Scaling, Some("%"), false),
    dp(82, "MK2", "Mischer Zeitprogramm 1", Bool, None, true),
    dp(83, "MK2", "Mischer Zeitprogramm 2", Bool, None, true),
    dp(84, "MK2", "Mischer Zeitprogramm 3", Bool, None, true),
    dp(85, "MK3", "Raumtemperatur", Float16, Some("°C"), false),
    dp_ranged(86, "MK3", "Raumsolltemperatur", Float16, Some("°C"), 5.0, 30.0),
    dp(87, "MK3", "Vorlauftemperatur", Float16, Some("°C"), false),
    dp(88, "MK3", "Vorlaufsolltemperatur", Float16, Some("°C"), false),
    dp(89, "MK3", "Status Mischerkreispumpe", Bool, None, false),
    dp(90, "MK3", "Programmwahl Mischer", HvacMode, None, true),
    dp(91, "MK3", "Mischerposition", Scaling, Some("%"), false),
    dp(92, "MK3", "Mischer Zeitprogramm 1", Bool, None, true),
    dp(93, "MK3", "Mischer Zeitprogramm 2", Bool, None, true),
    dp(94, "MK3", "Mischer Zeitprogramm 3", Bool, None, true),
    // Cascade module.
    dp(95,  "KM", "Störung", Bool, None, false),
    dp(96,  "KM", "Betriebsart", HvacControlMode, None, false),
    dp(97,  "KM", "Vorlauftemperatur", Float16, Some("°C"), false),
    dp(98,  "KM", "Vorlaufsolltemperatur", Float16, Some("°C"), false),
    dp(99,  "KM", "Gesamtmodulationsgrad", Scaling, Some("%"), false),
    dp(100, "KM", "Sammlertemperatur", Float16, Some("°C"), false),
    dp(101, "KM", "Status Ladepumpe", Bool, None, false),
    dp(102, "KM", "Aktive Stufen", Uint16, None, false),
    // Solar module.
    dp(103, "SM", "Störung", Bool, None, false),
    dp(104, "SM", "Kollektortemperatur", Float16, Some("°C"), false),
    dp(105, "SM", "Speichertemperatur", Float16, Some("°C"), false),
    dp(106, "SM", "Rücklauftemperatur", Float16, Some("°C"), false),
    dp(107, "SM", "Status Solarkreispumpe", Bool, None, false),
    dp(108, "SM", "Durchfluss", FlowRate, Some("m³/h"), false),
    // Air/water heat pump.
    dp(109, "BWL", "Störung", Bool, None, false),
    dp(110, "BWL", "Betriebsart", HvacControlMode, None, false),
    dp(111, "BWL", "Leistungsaufnahme", Float16, Some("kW"), false),
    dp(112, "BWL", "Vorlauftemperatur", Float16, Some("°C"), false),
    dp(113, "BWL", "Rücklauftemperatur", Float16, Some("°C"), false),
    dp(114, "BWL", "Lufteintrittstemperatur", Float16, Some("°C"), false),
    dp(115, "BWL", "Status Verdichter", Bool, None, false),
    dp(116, "BWL", "Status Elektroheizung", Bool, None, false),
    dp(117, "BWL", "Status E-Heizung Stufe 2", Bool, None, false),
    dp(118, "BWL", "Volumenstrom", FlowRate, Some("m³/h"), false),
    dp(119, "BWL", "Heizleistung", Float16, Some("kW"), false),
    dp(120, "BWL", "Relative Leistung", Percent, Some("%"), false),
    dp(121, "BWL", "Regelabweichung", Int16, Some("K"), false),
    // Ventilation unit.
    dp(140, "CWL", "Störung", Bool, None, false),
    dp(141, "CWL", "Zulufttemperatur", Float16, Some("°C"), false),
    dp(142, "CWL", "Ablufttemperatur", Float16, Some("°C"), false),
    dp(143, "CWL", "Volumenstrom Zuluft", Uint16, Some("m³/h"), false),
    dp(144, "CWL", "Volumenstrom Abluft", Uint16, Some("m³/h"), false),
    dp(145, "CWL", "Luftfeuchte", Percent, Some("%"), false),
    dp(146, "CWL", "Filterwarnung", Bool, None, false),
    dp(147, "CWL", "Status Bypass", Bool, None, false),
    dp_ranged(148, "CWL", "Lüftungsstufe", Scaling, Some("%"), 0.0, 100.0),
    dp(149, "CWL", "Programmwahl", HvacModeCwl, None, true),
    dp(150, "CWL", "Zeitprogramm 1", Bool, None, true),
    dp(151, "CWL", "Zeitprogramm 2", Bool, None, true),
    dp(152, "CWL", "Zeitprogramm 3", Bool, None, true),
    dp(153, "CWL", "Stoßlüftung", Bool, None, true),
    // System date and time.
    dp(154, "SYM", "Datum", Date, None, true),
    dp(155, "SYM", "Datum (aktuell)", Date, None, false),
    dp(156, "SYM", "Uhrzeit", TimeOfDay, None, true),
    dp(157, "SYM", "Uhrzeit (aktuell)", TimeOfDay, None, false),
    dp(158, "SYM", "Schaltzeit Warmwasser", TimeOfDay, None, true),
    dp(159, "SYM", "Wartungsdatum", Date, None, false),
    dp(160, "SYM", "Fehlerdatum", Date, None, false),
    dp(161, "SYM", "Schaltzeit Heizkreis", TimeOfDay, None, true),
    // Cascade totals.
    dp(177, "BWL", "Betriebsart Heizkreis", HvacControlMode, None, false),
    dp(178, "KM", "Gesamtvorlauftemperatur", Float16, Some("°C"), false),
    dp(179, "KM", "Sammlerrücklauftemperatur", Float16, Some("°C"), false),
    // Firmware 1.50 additions.
    dp(192, "HG1", "Abgastemperatur", Float16, Some("°C"), false),
    dp(193, "HG2", "Abgastemperatur", Float16, Some("°C"), false),
    dp(194, "HG1", "Anlagendruck", Float16, Some("bar"), false),
    dp(195, "HG1", "Brennerstarts", Int32, None, false),
    dp(196, "HG1", "Betriebsstunden", Int32, Some("h"), false),
    dp(197, "HG1", "Modulation Pumpe", Scaling, Some("%"), false),
    dp(198, "CWL", "Drehzahl Zuluft", Uint16, Some("rpm"), false),
    dp(199, "CWL", "Drehzahl Abluft", Uint16, Some("rpm"), false),
    // Firmware 1.70 additions.
    dp(209, "BWL", "Energieaufnahme gesamt", Int32, Some("kWh"), false),
    dp(210, "BWL", "Wärmemenge Heizung", Int32, Some("kWh"), false),
    dp(211, "BWL", "Wärmemenge Warmwasser", Int32, Some("kWh"), false),
    // Firmware 1.80 additions.
    dp(212, "BM1", "Raumtemperatur", Float16, Some("°C"), false),
    dp(213, "BM1", "Luftfeuchte", Percent, Some("%"), false),
    dp(214, "BM2", "Raumtemperatur", Float16, Some("°C"), false),
    dp(215, "BM2", "Luftfeuchte", Percent, Some("%"), false),
    dp(216, "BM3", "Raumtemperatur", Float16, Some("°C"), false),
    dp(217, "BM3", "Luftfeuchte", Percent, Some("%"), false),
    dp(218, "BM4", "Raumtemperatur", Float16, Some("°C"), false),
    dp(219, "BM4", "Luftfeuchte", Percent, Some("%"), false),
    dp(251, "SM", "Solarertrag gesamt", Int32, Some("kWh"), false),
    // Firmware 1.70 flow and power readings.
    dp(355, "HG1", "Wärmeleistung", Float32, Some("kW"), false),
    dp(356, "HG1", "Durchfluss", FlowRate, Some("m³/h"), false),
    dp(357, "HG2", "Wärmeleistung", Float32, Some("kW"), false),
    dp(358, "HG2", "Durchfluss", FlowRate, Some("m³/h"), false),
    dp(359, "SM", "Leistung", Float32, Some("kW"), false),
    dp(360, "SM", "Tagesertrag", Float32, Some("kWh"), false),
    dp(361, "SM", "Durchfluss", FlowRate, Some("m³/h"), false),
    // Firmware 1.80 heat pump and ventilation extensions.
    dp(364, "BWL", "Leistung aktuell", Float32, Some("kW"), false),
    dp(365, "BWL", "Jahresarbeitszahl", Float32, None, false),
    dp(366, "BWL", "Durchfluss", FlowRate, Some("m³/h"), false),
    dp(367, "CWL", "Feuchte Abluft", Percent, Some("%"), false),
    dp(368, "CWL", "CO2-Konzentration", Uint16, Some("ppm"), false),
    dp(369, "SYM", "Anlagendruck", Float16, Some("bar"), false),
    dp(370, "HG1", "Ionisationsstrom", Float32, Some("µA"), false),
    dp(371, "HG3", "Abgastemperatur", Float16, Some("°C"), false),
    dp(372, "HG4", "Abgastemperatur", Float16, Some("°C"), false),
];

/// Looks up a datapoint definition by identifier.
///
/// Returns `None` for undocumented identifiers; this is not an error
/// condition (see the module docs).
pub fn lookup(id: u16) -> Option<&'static DatapointDefinition> {
    DATAPOINTS
        .binary_search_by_key(&id, |d| d.id)
        .ok()
        .map(|idx| &DATAPOINTS[idx])
}

/// Returns all datapoint definitions in registration (id) order.
pub fn all() -> &'static [DatapointDefinition] {
    DATAPOINTS
}

/// Returns the distinct device groups, sorted.
///
/// # Example
///
/// ```
/// use wolf_ism8::registry;
///
/// let devices = registry::devices();
/// assert!(devices.contains(&"CWL"));
/// assert!(devices.contains(&"HG1"));
/// ```
pub fn devices() -> Vec<&'static str> {
    let mut devices: Vec<&'static str> = DATAPOINTS.iter().map(|d| d.device).collect();
    devices.sort_unstable();
    devices.dedup();
    devices
}

/// Returns the first gateway firmware version that exposed a datapoint.
pub fn first_firmware_version(id: u16) -> &'static str {
    if (192..208).contains(&id) {
        return "1.50";
    }
    if matches!(id, 209 | 210 | 211 | 251) || (355..362).contains(&id) {
        return "1.70";
    }
    if (212..251).contains(&id) || (364..373).contains(&id) {
        return "1.80";
    }
    "1.00"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_ascending() {
        // Binary search in lookup() depends on this.
        for pair in DATAPOINTS.windows(2) {
            assert!(
                pair[0].id < pair[1].id,
                "ids {} and {} out of order",
                pair[0].id,
                pair[1].id
            );
        }
    }

    #[test]
    fn test_lookup_known_anchors() {
        let def = lookup(56).unwrap();
        assert_eq!(def.device, "DKW");
        assert_eq!(def.data_type, DataType::Float16);
        assert!(def.writable);
        assert_eq!(def.write_range, Some((20.0, 80.0)));

        let def = lookup(57).unwrap();
        assert_eq!(def.data_type, DataType::HvacMode);
        assert!(def.writable);

        let def = lookup(72).unwrap();
        assert_eq!(def.device, "MK1");
        assert_eq!(def.name, "Mischer Zeitprogramm 1");
        assert_eq!(def.data_type, DataType::Bool);
        assert!(def.writable);

        let def = lookup(149).unwrap();
        assert_eq!(def.data_type, DataType::HvacModeCwl);

        let def = lookup(177).unwrap();
        assert_eq!(def.data_type, DataType::HvacControlMode);
        assert!(!def.writable);
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(lookup(0).is_none());
        assert!(lookup(500).is_none());
        // Gap inside the table.
        assert!(lookup(130).is_none());
    }

    #[test]
    fn test_all_is_id_ordered() {
        let defs = all();
        assert!(!defs.is_empty());
        assert_eq!(defs[0].id, 1);
    }

    #[test]
    fn test_devices() {
        let devices = devices();
        for expected in ["HG1", "HG4", "DK", "DKW", "MK1", "KM", "SM", "CWL", "BWL", "SYM"] {
            assert!(devices.contains(&expected), "missing {expected}");
        }
        // Sorted and deduplicated.
        let mut sorted = devices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(devices, sorted);
    }

    #[test]
    fn test_firmware_versions() {
        assert_eq!(first_firmware_version(1), "1.00");
        assert_eq!(first_firmware_version(178), "1.00");
        assert_eq!(first_firmware_version(192), "1.50");
        assert_eq!(first_firmware_version(207), "1.50");
        assert_eq!(first_firmware_version(209), "1.70");
        assert_eq!(first_firmware_version(251), "1.70");
        assert_eq!(first_firmware_version(355), "1.70");
        assert_eq!(first_firmware_version(212), "1.80");
        assert_eq!(first_firmware_version(250), "1.80");
        assert_eq!(first_firmware_version(372), "1.80");
    }

    #[test]
    fn test_every_data_type_is_represented() {
        use std::collections::HashSet;
        let used: HashSet<DataType> = DATAPOINTS.iter().map(|d| d.data_type).collect();
        for ty in [
            DataType::Bool,
            DataType::Scaling,
            DataType::Percent,
            DataType::Uint16,
            DataType::Int16,
            DataType::Float16,
            DataType::Float32,
            DataType::Int32,
            DataType::FlowRate,
            DataType::TimeOfDay,
            DataType::Date,
            DataType::HvacMode,
            DataType::HvacModeCwl,
            DataType::DhwMode,
            DataType::HvacControlMode,
        ] {
            assert!(used.contains(&ty), "no datapoint uses {ty}");
        }
    }
}

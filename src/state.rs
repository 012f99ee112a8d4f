//! In-memory mirror of the gateway's datapoint state.
//!
//! The gateway pushes value indications; the mirror keeps the latest raw
//! bytes per datapoint together with the decoded [`Value`] where the
//! registry knows the datapoint. Unknown identifiers and undecodable
//! payloads are stored raw with no decoded value, so nothing the gateway
//! sends is lost.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::codec;
use crate::error::Result;
use crate::registry::{self, DatapointDefinition};
use crate::value::Value;

/// Latest known state of one datapoint.
#[derive(Debug, Clone, PartialEq)]
pub struct DatapointValue {
    /// Datapoint identifier.
    pub id: u16,
    /// Raw value bytes exactly as received.
    pub raw: Vec<u8>,
    /// Decoded value, if the registry knows the datapoint and the bytes
    /// decoded cleanly.
    pub value: Option<Value>,
    /// When the value was last received or written.
    pub received_at: DateTime<Utc>,
}

/// Outcome of applying one received entry to the mirror.
#[derive(Debug, Clone)]
pub(crate) struct DatapointUpdate {
    /// Whether the decoded value differs from the previous state.
    /// Always `false` for undocumented datapoints.
    pub changed: bool,
    /// Registry definition, if the datapoint is documented.
    pub definition: Option<&'static DatapointDefinition>,
    /// The stored state after the update.
    pub value: DatapointValue,
}

/// The mirror itself. Plain storage; locking and callback dispatch are
/// the session's concern.
#[derive(Debug, Default)]
pub(crate) struct StateMirror {
    values: HashMap<u16, DatapointValue>,
}

impl StateMirror {
    pub fn new() -> Self {
        StateMirror::default()
    }

    /// Applies received value bytes for one datapoint.
    ///
    /// Documented datapoints are decoded before anything is stored; a
    /// decode failure leaves the mirror untouched and surfaces the error.
    /// Undocumented datapoints are stored raw and never count as changed.
    /// The timestamp is refreshed even when the value is unchanged, so
    /// `received_at` always reflects the gateway's most recent report.
    pub fn update(&mut self, id: u16, raw: Vec<u8>) -> Result<DatapointUpdate> {
        let definition = registry::lookup(id);
        let value = match definition {
            Some(def) => Some(codec::decode(id, def.data_type, &raw)?),
            None => None,
        };
        let changed = match (&value, self.values.get(&id)) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(new), Some(prev)) => prev.value.as_ref() != Some(new),
        };
        let stored = DatapointValue {
            id,
            raw,
            value,
            received_at: Utc::now(),
        };
        self.values.insert(id, stored.clone());
        Ok(DatapointUpdate {
            changed,
            definition,
            value: stored,
        })
    }

    pub fn get(&self, id: u16) -> Option<&DatapointValue> {
        self.values.get(&id)
    }

    /// All known datapoint states, sorted by identifier.
    pub fn snapshot(&self) -> Vec<DatapointValue> {
        let mut values: Vec<DatapointValue> = self.values.values().cloned().collect();
        values.sort_by_key(|v| v.id);
        values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Date;

    #[test]
    fn test_update_decodes_known_datapoint() {
        let mut mirror = StateMirror::new();
        let update = mirror.update(72, vec![0x01]).unwrap();
        assert!(update.changed);
        assert_eq!(update.definition.unwrap().name, "Mischer Zeitprogramm 1");
        assert_eq!(update.value.value, Some(Value::Bool(true)));
        assert_eq!(mirror.get(72).unwrap().raw, vec![0x01]);
    }

    #[test]
    fn test_repeated_value_is_not_a_change() {
        let mut mirror = StateMirror::new();
        assert!(mirror.update(1, vec![0x00]).unwrap().changed);
        assert!(!mirror.update(1, vec![0x00]).unwrap().changed);
        assert!(mirror.update(1, vec![0x01]).unwrap().changed);
        // Different raw bytes, same decoded value: not a change.
        assert!(!mirror.update(1, vec![0x03]).unwrap().changed);
    }

    #[test]
    fn test_unknown_datapoint_is_kept_raw_and_never_changed() {
        let mut mirror = StateMirror::new();
        let update = mirror.update(999, vec![0xAB, 0xCD]).unwrap();
        assert!(!update.changed);
        assert!(update.definition.is_none());
        assert!(update.value.value.is_none());
        assert_eq!(mirror.get(999).unwrap().raw, vec![0xAB, 0xCD]);
        assert!(!mirror.update(999, vec![0xAB, 0xCE]).unwrap().changed);
    }

    #[test]
    fn test_undecodable_payload_is_not_stored() {
        let mut mirror = StateMirror::new();
        // Datapoint 155 is a date; day 48 is invalid.
        assert!(mirror.update(155, vec![0x30, 0x0C, 0x30]).is_err());
        assert!(mirror.get(155).is_none());
    }

    #[test]
    fn test_decoded_date() {
        let mut mirror = StateMirror::new();
        let update = mirror.update(155, vec![0x04, 0x06, 0x07]).unwrap();
        assert_eq!(
            update.value.value,
            Some(Value::Date(Date::new(4, 6, 2007)))
        );
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let mut mirror = StateMirror::new();
        mirror.update(178, vec![0x02, 0x62]).unwrap();
        mirror.update(1, vec![0x00]).unwrap();
        mirror.update(72, vec![0x01]).unwrap();
        let snapshot = mirror.snapshot();
        assert_eq!(mirror.len(), 3);
        let ids: Vec<u16> = snapshot.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 72, 178]);
    }
}

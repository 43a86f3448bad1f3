//! Vehicle Location Types
//!
//! Canonical representation of a vehicle's current position, shared by the
//! snapshot endpoints and the push-query relay. Field values keep whatever
//! JSON type the upstream delivered (integer ids stay integers on the wire).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single vehicle's current position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleLocation {
    /// Vehicle identifier, as delivered by the upstream store.
    pub veh_id: Value,
    /// Current position, as delivered by the upstream store.
    pub loc: Value,
}

impl VehicleLocation {
    /// Create a location from an id and position.
    pub fn new(veh_id: impl Into<Value>, loc: impl Into<Value>) -> Self {
        Self {
            veh_id: veh_id.into(),
            loc: loc.into(),
        }
    }

    /// Build a location from an ordered row of columns.
    ///
    /// The row layout is `[veh_id, position, ...]`; trailing columns (in
    /// practice a timestamp) are dropped. Returns `None` when fewer than
    /// two columns are present.
    #[must_use]
    pub fn from_columns(columns: &[Value]) -> Option<Self> {
        match columns {
            [veh_id, loc, ..] => Some(Self {
                veh_id: veh_id.clone(),
                loc: loc.clone(),
            }),
            _ => None,
        }
    }

    /// Sort key for snapshot ordering: lexicographic on the id's string form.
    ///
    /// Redis ids are already strings; numeric ids from ksqlDB use their
    /// decimal rendering so mixed id types still have a total order.
    #[must_use]
    pub fn sort_key(&self) -> String {
        match &self.veh_id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Snapshot response body: entry count plus locations sorted by vehicle id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSnapshot {
    /// Number of entries in `data`.
    pub size: usize,
    /// Locations sorted by vehicle id, ascending.
    pub data: Vec<VehicleLocation>,
}

impl LocationSnapshot {
    /// Build a snapshot, sorting the locations by vehicle id ascending.
    #[must_use]
    pub fn new(mut data: Vec<VehicleLocation>) -> Self {
        data.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Self {
            size: data.len(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_columns_takes_first_two() {
        let loc = VehicleLocation::from_columns(&[json!(42), json!("loc-A"), json!(1000)]).unwrap();
        assert_eq!(loc.veh_id, json!(42));
        assert_eq!(loc.loc, json!("loc-A"));
    }

    #[test]
    fn from_columns_exactly_two() {
        let loc = VehicleLocation::from_columns(&[json!("bus-1"), json!("52.1,21.0")]).unwrap();
        assert_eq!(loc.veh_id, json!("bus-1"));
    }

    #[test]
    fn from_columns_rejects_short_rows() {
        assert!(VehicleLocation::from_columns(&[]).is_none());
        assert!(VehicleLocation::from_columns(&[json!(1)]).is_none());
    }

    #[test]
    fn serializes_with_upstream_types_preserved() {
        let loc = VehicleLocation::new(42, "loc-A");
        let json = serde_json::to_string(&loc).unwrap();
        assert_eq!(json, r#"{"veh_id":42,"loc":"loc-A"}"#);
    }

    #[test]
    fn snapshot_sorts_by_vehicle_id() {
        let snapshot = LocationSnapshot::new(vec![
            VehicleLocation::new("bus-3", "c"),
            VehicleLocation::new("bus-1", "a"),
            VehicleLocation::new("bus-2", "b"),
        ]);

        assert_eq!(snapshot.size, 3);
        let ids: Vec<_> = snapshot.data.iter().map(|l| l.veh_id.clone()).collect();
        assert_eq!(ids, vec![json!("bus-1"), json!("bus-2"), json!("bus-3")]);
    }

    #[test]
    fn snapshot_size_matches_data_len() {
        let snapshot = LocationSnapshot::new(vec![
            VehicleLocation::new("a", "1"),
            VehicleLocation::new("b", "2"),
        ]);
        assert_eq!(snapshot.size, snapshot.data.len());
    }

    #[test]
    fn snapshot_of_empty_input() {
        let snapshot = LocationSnapshot::new(vec![]);
        assert_eq!(snapshot.size, 0);
        assert!(snapshot.data.is_empty());
    }

    #[test]
    fn sort_key_for_numeric_ids() {
        assert_eq!(VehicleLocation::new(42, "x").sort_key(), "42");
        assert_eq!(VehicleLocation::new("veh-9", "x").sort_key(), "veh-9");
    }
}

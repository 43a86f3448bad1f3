//! ksqlDB Wire Types
//!
//! Serde types for the two query protocols:
//!
//! - **Push** (`/query-stream`): the first frame is query metadata, every
//!   subsequent frame is a bare JSON array `[veh_id, position, ts]`.
//! - **Pull** (`/query`): a single JSON array whose first element is a
//!   header object and whose remaining elements wrap rows.

use serde::Deserialize;
use serde_json::Value;

/// Metadata frame opening a push query response.
///
/// Observed shape:
/// `{"queryId":"...","columnNames":["VEH_ID","POSITION","TS"],"columnTypes":["INTEGER","STRING","BIGINT"]}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushHeader {
    /// Server-assigned identifier of the continuous query.
    #[serde(default)]
    pub query_id: Option<String>,
    /// Column names, in row order.
    pub column_names: Vec<String>,
    /// Column types, matching `column_names`.
    pub column_types: Vec<String>,
}

/// One element of a pull query response array.
///
/// Header and final-message elements carry no `row` field and are skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct PullElement {
    /// Row payload, absent on header/trailer elements.
    #[serde(default)]
    pub row: Option<PullRow>,
}

/// Row payload of a pull query element: `{"columns": [veh_id, position, ...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRow {
    /// Ordered column values.
    pub columns: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_header_parses_observed_shape() {
        let json = r#"{"queryId":"q1","columnNames":["VEH_ID","POSITION","TS"],"columnTypes":["INTEGER","STRING","BIGINT"]}"#;
        let header: PushHeader = serde_json::from_str(json).unwrap();
        assert_eq!(header.query_id.as_deref(), Some("q1"));
        assert_eq!(header.column_names, vec!["VEH_ID", "POSITION", "TS"]);
        assert_eq!(header.column_types.len(), 3);
    }

    #[test]
    fn push_header_query_id_optional() {
        let json = r#"{"columnNames":["VEH_ID","POSITION"],"columnTypes":["INTEGER","STRING"]}"#;
        let header: PushHeader = serde_json::from_str(json).unwrap();
        assert!(header.query_id.is_none());
    }

    #[test]
    fn push_header_rejects_row_frames() {
        assert!(serde_json::from_str::<PushHeader>(r#"[42,"loc-A",1000]"#).is_err());
        assert!(serde_json::from_str::<PushHeader>(r#"{"row":{"columns":[1,"a"]}}"#).is_err());
    }

    #[test]
    fn pull_element_with_row() {
        let json = r#"{"row":{"columns":[42,"loc-A",1000]}}"#;
        let element: PullElement = serde_json::from_str(json).unwrap();
        let row = element.row.unwrap();
        assert_eq!(row.columns.len(), 3);
    }

    #[test]
    fn pull_header_element_has_no_row() {
        let json = r#"{"header":{"queryId":"q2","schema":"`VEH_ID` INTEGER"}}"#;
        let element: PullElement = serde_json::from_str(json).unwrap();
        assert!(element.row.is_none());
    }
}

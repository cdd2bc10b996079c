use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label/value pair consumed by the host's select controls. Produced by the
/// discovery calls for databases, design documents, views and fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectableOption {
    pub label: String,
    pub value: String,
}

impl SelectableOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// A single panel target as persisted by the host.
///
/// A query is executable only once database, design document and view are all
/// selected; executing an under-specified query yields an empty frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub ref_id: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub design_doc: Option<String>,
    #[serde(default)]
    pub view: Option<String>,
    /// Field columns pre-registered on the result frame.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Raw query-string suffix appended verbatim to the view request.
    #[serde(default)]
    pub path: Option<String>,
}

impl Query {
    pub fn new(ref_id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            ..Default::default()
        }
    }

    /// Selecting a database invalidates the dependent design document and
    /// view selections.
    pub fn with_database(self, database: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            design_doc: None,
            view: None,
            ..self
        }
    }

    /// Selecting a design document invalidates the dependent view selection.
    pub fn with_design_doc(self, design_doc: impl Into<String>) -> Self {
        Self {
            design_doc: Some(design_doc.into()),
            view: None,
            ..self
        }
    }

    pub fn with_view(self, view: impl Into<String>) -> Self {
        Self {
            view: Some(view.into()),
            ..self
        }
    }

    pub fn with_fields(self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn with_path(self, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..self
        }
    }
}

/// Absolute time range supplied by the host at execution time.
///
/// Windowing only consults `from`: the window is always "last N seconds up to
/// now" regardless of the `to` bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// What to do with a failed discovery or connectivity request.
///
/// `Suppress` reduces failures to an empty result plus a diagnostic log line;
/// `Propagate` surfaces them to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPolicy {
    Propagate,
    Suppress,
}

/// Response of `GET /{db}/_design_docs`.
#[derive(Debug, Deserialize)]
pub(crate) struct DesignDocsResponse {
    pub rows: Vec<DesignDocRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DesignDocRow {
    pub id: String,
}

/// Body of a design document; only the view names are of interest.
#[derive(Debug, Deserialize)]
pub(crate) struct DesignDocBody {
    #[serde(default)]
    pub views: std::collections::BTreeMap<String, serde_json::Value>,
}

/// Response of `GET /{db}/{ddoc}/_view/{view}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ViewResponse {
    pub total_rows: u64,
    #[serde(default)]
    pub rows: Vec<ViewRow>,
}

/// One emitted view row: a numeric timestamp key and a field/value mapping.
#[derive(Debug, Deserialize)]
pub(crate) struct ViewRow {
    pub key: i64,
    #[serde(default)]
    pub value: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn database_change_clears_dependent_selections() {
        let query = Query::new("A")
            .with_database("metrics")
            .with_design_doc("_design/stats")
            .with_view("by_time");

        let changed = query.with_database("telemetry");
        assert_eq!(changed.database.as_deref(), Some("telemetry"));
        assert_eq!(changed.design_doc, None);
        assert_eq!(changed.view, None);
    }

    #[test]
    fn design_doc_change_clears_view() {
        let query = Query::new("A")
            .with_database("metrics")
            .with_design_doc("_design/stats")
            .with_view("by_time");

        let changed = query.with_design_doc("_design/other");
        assert_eq!(changed.database.as_deref(), Some("metrics"));
        assert_eq!(changed.design_doc.as_deref(), Some("_design/other"));
        assert_eq!(changed.view, None);
    }

    #[test]
    fn view_change_keeps_parents() {
        let query = Query::new("A")
            .with_database("metrics")
            .with_design_doc("_design/stats")
            .with_view("by_time")
            .with_view("by_host");
        assert_eq!(query.database.as_deref(), Some("metrics"));
        assert_eq!(query.design_doc.as_deref(), Some("_design/stats"));
        assert_eq!(query.view.as_deref(), Some("by_host"));
    }

    #[test]
    fn query_deserializes_from_host_payload() {
        let query: Query = serde_json::from_str(
            r#"{
                "refId": "B",
                "database": "metrics",
                "designDoc": "_design/stats",
                "view": "by_time",
                "fields": ["cpu", "mem"],
                "path": "descending=true"
            }"#,
        )
        .unwrap();
        assert_eq!(query.ref_id, "B");
        assert_eq!(query.fields, vec!["cpu".to_string(), "mem".to_string()]);
        assert_eq!(query.path.as_deref(), Some("descending=true"));
    }

    #[test]
    fn view_row_deserializes() {
        let row: ViewRow =
            serde_json::from_str(r#"{"key": 1700000000000, "value": {"cpu": 0.5}}"#).unwrap();
        assert_eq!(row.key, 1_700_000_000_000);
        assert_eq!(row.value.get("cpu").and_then(|v| v.as_f64()), Some(0.5));
    }
}

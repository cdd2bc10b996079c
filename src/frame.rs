use serde::Serialize;

/// Columnar query result handed to the rendering host: one time column plus
/// one numeric column per field, all of equal length.
///
/// Value columns are created lazily in first-seen order and persist for the
/// frame's lifetime; rows that omit a field leave the corresponding cell
/// unset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Frame {
    pub ref_id: String,
    time: Vec<i64>,
    columns: Vec<Column>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct Column {
    name: String,
    values: Vec<Option<f64>>,
}

impl Frame {
    pub fn new(ref_id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            time: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Registers a value column, backfilling existing rows with unset cells.
    /// Registering a known name is a no-op.
    pub fn register_field(&mut self, name: &str) {
        if self.columns.iter().any(|column| column.name == name) {
            return;
        }
        self.columns.push(Column {
            name: name.to_string(),
            values: vec![None; self.time.len()],
        });
    }

    /// Appends one record: a timestamp with a single field set. Every other
    /// column gets an unset cell for the new row.
    pub fn push(&mut self, time: i64, field: &str, value: f64) {
        self.register_field(field);
        self.time.push(time);
        for column in &mut self.columns {
            let cell = (column.name == field).then_some(value);
            column.values.push(cell);
        }
    }

    pub fn time_values(&self) -> &[i64] {
        &self.time
    }

    /// Value column names in registration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|column| column.name.as_str())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.values.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn columns_register_in_first_seen_order() {
        let mut frame = Frame::new("A");
        frame.push(1, "b", 2.0);
        frame.push(2, "a", 1.0);
        frame.push(3, "b", 4.0);
        assert_eq!(frame.field_names(), vec!["b", "a"]);
    }

    #[test]
    fn registration_is_idempotent() {
        let mut frame = Frame::new("A");
        frame.register_field("a");
        frame.register_field("a");
        assert_eq!(frame.field_names(), vec!["a"]);
    }

    #[test]
    fn push_leaves_other_columns_unset() {
        let mut frame = Frame::new("A");
        frame.push(1, "a", 1.0);
        frame.push(2, "b", 2.0);

        assert_eq!(frame.time_values(), &[1, 2]);
        assert_eq!(frame.column("a").unwrap(), &[Some(1.0), None]);
        assert_eq!(frame.column("b").unwrap(), &[None, Some(2.0)]);
    }

    #[test]
    fn late_registration_backfills_existing_rows() {
        let mut frame = Frame::new("A");
        frame.push(1, "a", 1.0);
        frame.register_field("late");
        assert_eq!(frame.column("late").unwrap(), &[None]);
    }

    #[test]
    fn all_columns_match_time_length() {
        let mut frame = Frame::new("A");
        for field in ["a", "b", "c"] {
            frame.register_field(field);
        }
        frame.push(1, "a", 1.0);
        frame.push(2, "d", 4.0);
        for name in frame.field_names() {
            assert_eq!(frame.column(name).unwrap().len(), frame.len());
        }
    }

    #[test]
    fn empty_frame_keeps_preregistered_fields() {
        let mut frame = Frame::new("A");
        frame.register_field("cpu");
        assert!(frame.is_empty());
        assert_eq!(frame.field_names(), vec!["cpu"]);
    }
}

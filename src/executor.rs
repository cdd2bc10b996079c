use crate::{
    client::Client,
    error::Error,
    frame::Frame,
    types::{Query, SelectableOption, TimeRange, ViewResponse, ViewRow},
};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;

/// Reserved key name: never emitted as a value column.
const TIME_FIELD: &str = "time";

impl Client {
    /// Executes a batch of targets against one time range.
    ///
    /// Targets run concurrently and join all-or-nothing: if any target fails
    /// its row-count probe or page fetch, the whole batch errors and no
    /// frames are returned. A target missing database, design document or
    /// view resolves to an empty frame instead of erroring.
    pub async fn query(&self, targets: &[Query], range: TimeRange) -> Result<Vec<Frame>, Error> {
        self.query_at(targets, range, Utc::now()).await
    }

    /// `now` anchors the window sizing; split out so tests can pin it.
    pub(crate) async fn query_at(
        &self,
        targets: &[Query],
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<Frame>, Error> {
        try_join_all(
            targets
                .iter()
                .map(|target| self.run_target(target, range, now)),
        )
        .await
    }

    async fn run_target(
        &self,
        target: &Query,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Frame, Error> {
        let mut frame = Frame::new(target.ref_id.clone());
        for field in &target.fields {
            frame.register_field(field);
        }
        let (Some(database), Some(design_doc), Some(view)) =
            (&target.database, &target.design_doc, &target.view)
        else {
            return Ok(frame);
        };

        // The window is the last N seconds up to now; the range's `to` bound
        // is not consulted.
        let limit = window_seconds(range.from, now);
        let total_rows = self.view_row_count(database, design_doc, view).await?;
        let skip = total_rows.saturating_sub(limit);

        let mut path = format!("{database}/{design_doc}/_view/{view}?skip={skip}&limit={limit}");
        if let Some(extra) = target.path.as_deref().filter(|extra| !extra.is_empty()) {
            path.push('&');
            path.push_str(extra);
        }
        let response: ViewResponse = self.get_json(&path).await?;

        let fields = reshape(&mut frame, &response.rows);
        self.last_fields.write().insert(target.ref_id.clone(), fields);
        Ok(frame)
    }

    /// Zero-limit request used solely to learn the view's total row count.
    async fn view_row_count(
        &self,
        database: &str,
        design_doc: &str,
        view: &str,
    ) -> Result<u64, Error> {
        let response: ViewResponse = self
            .get_json(&format!("{database}/{design_doc}/_view/{view}?limit=0"))
            .await?;
        Ok(response.total_rows)
    }

    /// Field names seen by the most recent execution of `ref_id`, feeding the
    /// host's field-selector control. Overwritten by every execution of that
    /// target.
    pub fn field_options(&self, ref_id: &str) -> Vec<SelectableOption> {
        self.last_fields
            .read()
            .get(ref_id)
            .cloned()
            .unwrap_or_default()
    }
}

/// Window size in whole seconds between `from` and the execution instant.
/// Ranges starting in the future clamp to an empty window.
pub(crate) fn window_seconds(from: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    ((now - from).num_milliseconds() / 1000).max(0) as u64
}

/// Folds view rows into the frame, processing newest-to-oldest. Each entry
/// whose key is not the reserved `time` name and whose value is numeric emits
/// one record; everything else is skipped. The finished frame ascends by
/// timestamp. Returns the distinct field names in first-seen order.
fn reshape(frame: &mut Frame, rows: &[ViewRow]) -> Vec<SelectableOption> {
    let mut seen: Vec<SelectableOption> = Vec::new();
    let mut records = Vec::new();
    for row in rows.iter().rev() {
        for (name, value) in &row.value {
            if name == TIME_FIELD {
                continue;
            }
            let Some(number) = value.as_f64() else {
                continue;
            };
            if !seen.iter().any(|option| option.value == *name) {
                seen.push(SelectableOption::new(name.clone()));
                frame.register_field(name);
            }
            records.push((row.key, name.as_str(), number));
        }
    }
    for (time, name, number) in records.into_iter().rev() {
        frame.push(time, name, number);
    }
    seen
}

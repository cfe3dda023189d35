//! Template slot catalog.
//!
//! Loads raw rows from a [`TemplateSource`], parses them into
//! [`TemplateRow`]s, and caches the result until explicitly
//! invalidated (dataset replacement). Malformed rows are skipped and
//! logged, never fatal; a dataset yielding zero rows is an
//! [`ScheduleError::EmptyCatalog`].

use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{RawRow, TemplateRow, WEEK_COUNT};
use crate::stores::TemplateSource;

/// Minimum positional cells a raw row must carry: six header fields
/// plus the 18 week markers.
pub const MIN_ROW_CELLS: usize = 6 + WEEK_COUNT;

/// Cached, parsed view of the template dataset.
pub struct TemplateCatalog {
    source: Arc<dyn TemplateSource>,
    cache: Mutex<Option<Arc<Vec<TemplateRow>>>>,
}

impl TemplateCatalog {
    /// Creates a catalog over a template source. Nothing is loaded
    /// until the first `load_all`.
    pub fn new(source: Arc<dyn TemplateSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(None),
        }
    }

    /// All template rows, parsed and cached.
    ///
    /// Only a successful, non-empty parse is cached; an empty dataset
    /// returns `EmptyCatalog` and will be re-read on the next call.
    pub fn load_all(&self) -> ScheduleResult<Arc<Vec<TemplateRow>>> {
        if let Some(rows) = self.cache.lock().clone() {
            return Ok(rows);
        }

        let raw = self.source.load_rows()?;
        let mut rows = Vec::with_capacity(raw.len());
        let mut skipped = 0usize;
        for (index, cells) in raw.iter().enumerate() {
            match parse_template_row(cells) {
                Some(row) => rows.push(row),
                None => {
                    skipped += 1;
                    warn!("skipping malformed template row at index {index}");
                }
            }
        }

        if rows.is_empty() {
            warn!("template dataset yielded no usable rows ({skipped} skipped)");
            return Err(ScheduleError::EmptyCatalog);
        }

        info!(
            "template catalog loaded: {} rows ({} skipped)",
            rows.len(),
            skipped
        );
        let rows = Arc::new(rows);
        // Racing loaders may parse twice; last write wins.
        *self.cache.lock() = Some(rows.clone());
        Ok(rows)
    }

    /// Template rows whose subject total matches `total_periods`.
    pub fn by_total_periods(&self, total_periods: i32) -> ScheduleResult<Vec<TemplateRow>> {
        let rows = self.load_all()?;
        Ok(rows
            .iter()
            .filter(|row| row.total_periods == total_periods)
            .cloned()
            .collect())
    }

    /// Drops the cache; the next `load_all` re-reads the source.
    /// Called when the backing dataset is replaced.
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
        info!("template catalog cache invalidated");
    }
}

/// Parses one raw dataset row.
///
/// Layout: `[total_periods, day_of_week, session_block, start_period,
/// period_length, id, 18 × week marker, ...]`. Extra trailing cells are
/// ignored. Returns `None` when the row is short or a required field is
/// not numeric; header rows carry text there and fail this check.
fn parse_template_row(cells: &RawRow) -> Option<TemplateRow> {
    if cells.len() < MIN_ROW_CELLS {
        return None;
    }

    let total_periods = i32::try_from(cells[0].as_int()?).ok()?;
    let day_of_week = u8::try_from(cells[1].as_int()?).ok()?;
    let session_block = u8::try_from(cells[2].as_int()?).ok()?;
    let start_period = i32::try_from(cells[3].as_int()?).ok()?;
    let period_length = i32::try_from(cells[4].as_int()?).ok()?;
    let id = cells[5].to_text();

    let mut week_occupancy = [false; WEEK_COUNT];
    for (week, cell) in cells[6..6 + WEEK_COUNT].iter().enumerate() {
        week_occupancy[week] = cell.is_marked();
    }

    Some(TemplateRow {
        total_periods,
        day_of_week,
        session_block,
        start_period,
        period_length,
        id,
        week_occupancy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryTemplateSource;
    use serde_json::json;

    fn raw_rows(value: serde_json::Value) -> Vec<RawRow> {
        serde_json::from_value(value).expect("fixture rows parse")
    }

    /// 30-period row: Monday, block 1, start 1, length 3, weeks 1–10.
    fn sample_raw() -> serde_json::Value {
        json!([
            30, 2, 1, 1, 3, "R1", "x", "x", "x", "x", "x", "x", "x", "x", "x", "x", "", "", "",
            "", "", "", "", ""
        ])
    }

    fn catalog_over(rows: Vec<RawRow>) -> TemplateCatalog {
        TemplateCatalog::new(Arc::new(MemoryTemplateSource::new(rows)))
    }

    #[test]
    fn test_load_parses_rows() {
        let catalog = catalog_over(raw_rows(json!([sample_raw()])));
        let rows = catalog.load_all().unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.total_periods, 30);
        assert_eq!(row.day_of_week, 2);
        assert_eq!(row.session_block, 1);
        assert_eq!(row.start_period, 1);
        assert_eq!(row.period_length, 3);
        assert_eq!(row.id, "R1");
        assert_eq!(row.active_weeks(), 10);
        assert_eq!(row.used_periods(), 30);
    }

    #[test]
    fn test_header_and_short_rows_are_skipped() {
        let header = json!([
            "Total", "Day", "Block", "Start", "Length", "Id", "w1", "w2", "w3", "w4", "w5",
            "w6", "w7", "w8", "w9", "w10", "w11", "w12", "w13", "w14", "w15", "w16", "w17",
            "w18"
        ]);
        let short = json!([30, 2, 1]);
        let catalog = catalog_over(raw_rows(json!([header, short, sample_raw()])));

        let rows = catalog.load_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "R1");
    }

    #[test]
    fn test_numeric_text_fields_parse() {
        let textual = json!([
            "45", "3", "2", "4", "3", 17, "X", "x", "", "", "", "", "", "", "", "", "", "",
            "", "", "", "", "", ""
        ]);
        let catalog = catalog_over(raw_rows(json!([textual])));

        let rows = catalog.load_all().unwrap();
        assert_eq!(rows[0].total_periods, 45);
        assert_eq!(rows[0].day_of_week, 3);
        assert_eq!(rows[0].id, "17");
        assert_eq!(rows[0].active_weeks(), 2);
    }

    #[test]
    fn test_empty_dataset_is_empty_catalog() {
        let catalog = catalog_over(Vec::new());
        assert!(matches!(
            catalog.load_all(),
            Err(ScheduleError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_all_rows_malformed_is_empty_catalog() {
        let catalog = catalog_over(raw_rows(json!([[1, 2], ["a", "b", "c"]])));
        assert!(matches!(
            catalog.load_all(),
            Err(ScheduleError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_by_total_periods_filters() {
        let other = json!([
            45, 4, 3, 7, 3, "R2", "x", "", "", "", "", "", "", "", "", "", "", "", "", "",
            "", "", "", ""
        ]);
        let catalog = catalog_over(raw_rows(json!([sample_raw(), other])));

        assert_eq!(catalog.by_total_periods(30).unwrap().len(), 1);
        assert_eq!(catalog.by_total_periods(45).unwrap().len(), 1);
        assert!(catalog.by_total_periods(60).unwrap().is_empty());
    }

    #[test]
    fn test_cache_survives_source_replacement_until_invalidated() {
        let source = Arc::new(MemoryTemplateSource::new(raw_rows(json!([sample_raw()]))));
        let catalog = TemplateCatalog::new(source.clone());
        assert_eq!(catalog.load_all().unwrap().len(), 1);

        let replacement = json!([
            60, 2, 1, 1, 3, "R9", "x", "x", "x", "x", "x", "x", "x", "x", "x", "x", "x",
            "x", "x", "x", "x", "", "", ""
        ]);
        source.replace(raw_rows(json!([sample_raw(), replacement])));

        // Still cached.
        assert_eq!(catalog.load_all().unwrap().len(), 1);

        catalog.invalidate();
        assert_eq!(catalog.load_all().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_result_is_not_cached() {
        let source = Arc::new(MemoryTemplateSource::new(Vec::new()));
        let catalog = TemplateCatalog::new(source.clone());
        assert!(catalog.load_all().is_err());

        source.replace(raw_rows(json!([sample_raw()])));
        // No invalidate needed: the failed load never populated the cache.
        assert_eq!(catalog.load_all().unwrap().len(), 1);
    }
}

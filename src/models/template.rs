//! Template row model and raw dataset cells.
//!
//! A template row is one reusable weekly recurrence pattern: a day, a
//! session-block, a start period, a per-meeting length, and an 18-week
//! activity mask. The catalog parses rows out of positional cell data
//! supplied by the backing dataset.

use serde::{Deserialize, Serialize};

/// Number of teaching weeks covered by a template row.
pub const WEEK_COUNT: usize = 18;

/// One pre-defined weekly recurrence pattern.
///
/// Immutable once loaded; the scheduler only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRow {
    /// Total periods of the subject this row belongs to; rows are pooled
    /// by this value.
    pub total_periods: i32,
    /// Day of week, 2 (Monday) through 7 (Saturday).
    pub day_of_week: u8,
    /// Session block, 1–2 morning, 3–4 afternoon.
    pub session_block: u8,
    /// First period of the meeting within the day.
    pub start_period: i32,
    /// Periods per weekly meeting.
    pub period_length: i32,
    /// Dataset identifier of the row.
    pub id: String,
    /// Which of the 18 weeks the meeting actually takes place.
    pub week_occupancy: [bool; WEEK_COUNT],
}

impl TemplateRow {
    /// Creates a row with no slot, no periods, and no active weeks.
    pub fn new(id: impl Into<String>, total_periods: i32) -> Self {
        Self {
            total_periods,
            day_of_week: 0,
            session_block: 0,
            start_period: 0,
            period_length: 0,
            id: id.into(),
            week_occupancy: [false; WEEK_COUNT],
        }
    }

    /// Sets the weekly slot (day, session-block).
    pub fn with_slot(mut self, day_of_week: u8, session_block: u8) -> Self {
        self.day_of_week = day_of_week;
        self.session_block = session_block;
        self
    }

    /// Sets start period and per-meeting length.
    pub fn with_periods(mut self, start_period: i32, period_length: i32) -> Self {
        self.start_period = start_period;
        self.period_length = period_length;
        self
    }

    /// Marks weeks `first..=last` (1-based) as active.
    pub fn with_week_span(mut self, first: usize, last: usize) -> Self {
        for week in first..=last.min(WEEK_COUNT) {
            if week >= 1 {
                self.week_occupancy[week - 1] = true;
            }
        }
        self
    }

    /// Number of weeks the meeting takes place.
    pub fn active_weeks(&self) -> usize {
        self.week_occupancy.iter().filter(|&&w| w).count()
    }

    /// Periods this row contributes over the whole term:
    /// per-meeting length × active weeks.
    pub fn used_periods(&self) -> i32 {
        self.period_length * self.active_weeks() as i32
    }
}

/// One positional cell of a raw dataset row.
///
/// Spreadsheet-shaped sources deliver numbers, text, and blanks mixed
/// per column, so parsing is lenient: numeric text counts as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Numeric cell.
    Number(f64),
    /// Text cell.
    Text(String),
    /// Blank cell.
    Empty,
}

/// A raw dataset row: positional cells, at least 24 for a valid row.
pub type RawRow = Vec<Cell>;

impl Cell {
    /// Integer value of the cell, accepting numeric text ("30", "30.0").
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Number(n) => Some(*n as i64),
            Cell::Text(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
            Cell::Empty => None,
        }
    }

    /// Text rendering of the cell; blanks become the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Cell::Text(s) => s.clone(),
            Cell::Empty => String::new(),
        }
    }

    /// Whether the cell is a week marker: textual `x` or `X`.
    pub fn is_marked(&self) -> bool {
        match self {
            Cell::Text(s) => s.trim().eq_ignore_ascii_case("x"),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_periods() {
        let row = TemplateRow::new("R1", 30)
            .with_slot(2, 1)
            .with_periods(1, 3)
            .with_week_span(1, 10);

        assert_eq!(row.active_weeks(), 10);
        assert_eq!(row.used_periods(), 30);
    }

    #[test]
    fn test_no_active_weeks_means_zero_periods() {
        let row = TemplateRow::new("R2", 30).with_periods(1, 3);
        assert_eq!(row.used_periods(), 0);
    }

    #[test]
    fn test_week_span_clamps_to_term() {
        let row = TemplateRow::new("R3", 45).with_week_span(15, 25);
        assert_eq!(row.active_weeks(), 4); // weeks 15..=18
    }

    #[test]
    fn test_cell_as_int_accepts_numeric_text() {
        assert_eq!(Cell::from(30).as_int(), Some(30));
        assert_eq!(Cell::from("30").as_int(), Some(30));
        assert_eq!(Cell::from("30.0").as_int(), Some(30));
        assert_eq!(Cell::from(" 7 ").as_int(), Some(7));
        assert_eq!(Cell::from("thu").as_int(), None);
        assert_eq!(Cell::Empty.as_int(), None);
    }

    #[test]
    fn test_cell_week_marker() {
        assert!(Cell::from("x").is_marked());
        assert!(Cell::from("X").is_marked());
        assert!(Cell::from(" x ").is_marked());
        assert!(!Cell::from("").is_marked());
        assert!(!Cell::from(1).is_marked());
        assert!(!Cell::Empty.is_marked());
    }

    #[test]
    fn test_cell_text_of_number_drops_trailing_zero() {
        assert_eq!(Cell::from(12).to_text(), "12");
        assert_eq!(Cell::Number(12.5).to_text(), "12.5");
        assert_eq!(Cell::Empty.to_text(), "");
    }

    #[test]
    fn test_raw_row_from_json() {
        // Mixed-type rows as delivered by spreadsheet-backed sources.
        let raw: RawRow =
            serde_json::from_str(r#"[30, "2", 1, "x", null]"#).expect("raw row parses");
        assert_eq!(raw[0].as_int(), Some(30));
        assert_eq!(raw[1].as_int(), Some(2));
        assert!(raw[3].is_marked());
        assert_eq!(raw[4], Cell::Empty);
    }
}

//! Month day grids with the cuckoo's skips applied.
//!
//! One [`DayGridBuilder`] lives for a whole pass. Its date cursor starts on
//! January 1 and advances exactly one day per filled (or blanked) slot;
//! it is never reset between months, so a month is only built while the
//! cursor is inside it.
//!
//! Rows are 7 cells, Sunday first. Within a row, slot `s` is due when the
//! cursor's weekday index equals `s`. The first due slot of every row asks
//! the [`CuckooSkipPolicy`] whether to blank it. After a month is built,
//! its first row is dropped if it has no visible day, which happens when
//! the month's only first-row day was blanked.

use crate::cuckoo::{CuckooEvent, CuckooSkipPolicy};
use crate::random::RandomStream;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DAYS_PER_WEEK: usize = 7;

/// Column headers, Sunday first.
pub const WEEKDAY_HEADER: [&str; DAYS_PER_WEEK] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Year {0} has no January 1 in the supported date range")]
    InvalidYear(i32),
    #[error("Month {0} is not in 1..=12")]
    InvalidMonth(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    Empty,
    /// Taken by the cuckoo; drawn like an empty cell.
    Blanked,
    Day(u32),
}

impl Cell {
    pub fn is_visible(&self) -> bool {
        matches!(self, Cell::Day(_))
    }

    /// Text drawn in the cell.
    pub fn label(&self) -> String {
        match self {
            Cell::Day(n) => n.to_string(),
            Cell::Empty | Cell::Blanked => String::new(),
        }
    }
}

pub type WeekRow = [Cell; DAYS_PER_WEEK];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub rows: Vec<WeekRow>,
    /// Skips that happened while building this month.
    pub skips: usize,
    /// Render offset after the month.
    pub offset: i64,
}

impl MonthGrid {
    pub fn visible_days(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| cell.is_visible())
            .count()
    }

    pub fn label_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(Cell::label).collect())
            .collect()
    }
}

/// Column of `date`: Sunday → 0, Monday → 1, …, Saturday → 6.
pub fn weekday_index(date: NaiveDate) -> usize {
    (date.weekday().num_days_from_monday() as usize + 1) % DAYS_PER_WEEK
}

#[derive(Debug, Clone)]
pub struct DayGridBuilder {
    year: i32,
    cursor: NaiveDate,
    /// Set when the cursor cannot advance past the last representable day.
    exhausted: bool,
    policy: CuckooSkipPolicy,
}

impl DayGridBuilder {
    pub fn new(year: i32, cuckoo_begin: NaiveDate) -> Result<Self, GridError> {
        let cursor = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(GridError::InvalidYear(year))?;
        Ok(Self {
            year,
            cursor,
            exhausted: false,
            policy: CuckooSkipPolicy::new(cuckoo_begin),
        })
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn offset(&self) -> i64 {
        self.policy.offset()
    }

    pub fn events(&self) -> &[CuckooEvent] {
        self.policy.events()
    }

    pub fn into_events(self) -> Vec<CuckooEvent> {
        self.policy.into_events()
    }

    fn in_month(&self, month: u32) -> bool {
        !self.exhausted && self.cursor.year() == self.year && self.cursor.month() == month
    }

    fn advance(&mut self) {
        match self.cursor.succ_opt() {
            Some(next) => self.cursor = next,
            None => self.exhausted = true,
        }
    }

    /// Build `month` of the builder's year. Yields no rows if the cursor is
    /// not inside that month.
    pub fn build_month(
        &mut self,
        stream: &mut RandomStream,
        month: u32,
    ) -> Result<MonthGrid, GridError> {
        if !(1..=12).contains(&month) {
            return Err(GridError::InvalidMonth(month));
        }

        let mut rows = Vec::new();
        let mut skips = 0;
        while self.in_month(month) {
            let mut row = [Cell::Empty; DAYS_PER_WEEK];
            let mut consulted = false;
            for (slot, cell) in row.iter_mut().enumerate() {
                if !self.in_month(month) || weekday_index(self.cursor) != slot {
                    continue;
                }
                let skip = !consulted && {
                    consulted = true;
                    self.policy.consider(stream, self.cursor)
                };
                *cell = if skip {
                    skips += 1;
                    Cell::Blanked
                } else {
                    match self.policy.displayed(self.cursor) {
                        Some(date) => Cell::Day(date.day()),
                        None => Cell::Empty,
                    }
                };
                self.advance();
            }
            rows.push(row);
        }

        if rows
            .first()
            .is_some_and(|row| !row.iter().any(Cell::is_visible))
        {
            rows.remove(0);
            tracing::debug!(month, "dropped leading row with no visible day");
        }

        tracing::debug!(
            year = self.year,
            month,
            rows = rows.len(),
            skips,
            offset = self.policy.offset(),
            "built month grid"
        );
        Ok(MonthGrid {
            year: self.year,
            month,
            rows,
            skips,
            offset: self.policy.offset(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::days_in_month;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// A begin date the cuckoo never reaches.
    fn never(year: i32) -> NaiveDate {
        d(year + 1, 6, 1)
    }

    // =========================================================================
    // weekday_index
    // =========================================================================

    #[test]
    fn weekday_index_is_sunday_first_bijection() {
        // 2025-01-05 is a Sunday.
        let indices: Vec<usize> = (5..12).map(|day| weekday_index(d(2025, 1, day))).collect();
        assert_eq!(indices, [0, 1, 2, 3, 4, 5, 6]);
    }

    // =========================================================================
    // Without skips
    // =========================================================================

    #[test]
    fn january_2025_without_skips() {
        let mut builder = DayGridBuilder::new(2025, never(2025)).unwrap();
        let mut stream = RandomStream::new(1);
        let grid = builder.build_month(&mut stream, 1).unwrap();

        assert_eq!(grid.rows.len(), 5);
        assert_eq!(grid.rows[0][..3], [Cell::Empty; 3]);
        assert_eq!(grid.rows[0][3], Cell::Day(1));
        assert_eq!(grid.rows[0][6], Cell::Day(4));
        assert_eq!(grid.rows[4][5], Cell::Day(31));
        assert_eq!(grid.rows[4][6], Cell::Empty);
        assert_eq!(grid.visible_days(), 31);
        assert_eq!(builder.cursor(), d(2025, 2, 1));
    }

    #[test]
    fn whole_year_without_skips_counts_days() {
        for year in [2024, 2025, 2028, 2100] {
            let mut builder = DayGridBuilder::new(year, never(year)).unwrap();
            let mut stream = RandomStream::new(0);
            for month in 1..=12 {
                let grid = builder.build_month(&mut stream, month).unwrap();
                assert_eq!(
                    grid.visible_days() as u32,
                    days_in_month(year, month).unwrap(),
                    "{year}-{month}"
                );
                assert!(grid.rows.len() <= 6);
            }
            assert_eq!(builder.cursor(), d(year + 1, 1, 1));
        }
    }

    #[test]
    fn month_outside_cursor_yields_no_rows() {
        let mut builder = DayGridBuilder::new(2025, never(2025)).unwrap();
        let mut stream = RandomStream::new(1);
        let march = builder.build_month(&mut stream, 3).unwrap();
        assert!(march.rows.is_empty());
        assert_eq!(builder.cursor(), d(2025, 1, 1));
    }

    #[test]
    fn invalid_month_is_rejected() {
        let mut builder = DayGridBuilder::new(2025, never(2025)).unwrap();
        let mut stream = RandomStream::new(1);
        assert!(matches!(
            builder.build_month(&mut stream, 13),
            Err(GridError::InvalidMonth(13))
        ));
    }

    // =========================================================================
    // With skips
    // =========================================================================

    #[test]
    fn skips_reduce_visible_days_and_lag_display() {
        let year = 2025;
        let mut builder = DayGridBuilder::new(year, d(year, 1, 1)).unwrap();
        let mut stream = RandomStream::new(42);
        let mut total_skips = 0;
        let mut last_offset = 0;
        for month in 1..=12 {
            let grid = builder.build_month(&mut stream, month).unwrap();
            let days = days_in_month(year, month).unwrap() as usize;
            assert_eq!(grid.visible_days(), days - grid.skips);
            assert!(grid.offset <= last_offset);
            last_offset = grid.offset;
            total_skips += grid.skips;

            for row in &grid.rows {
                let blanked = row.iter().filter(|c| **c == Cell::Blanked).count();
                assert!(blanked <= 1);
            }
        }
        assert_eq!(builder.events().len(), total_skips);
        assert_eq!(builder.offset(), -(total_skips as i64));
        assert!(total_skips > 0);
    }

    #[test]
    fn leading_row_dropped_only_when_invisible() {
        // Scan seeds for a month whose first row lost its only day.
        // 2025-11-01 is a Saturday, the sole slot of November's first row.
        for seed in 0..200 {
            let mut builder = DayGridBuilder::new(2025, d(2025, 11, 1)).unwrap();
            let mut stream = RandomStream::new(seed);
            for month in 1..=10 {
                builder.build_month(&mut stream, month).unwrap();
            }
            let november = builder.build_month(&mut stream, 11).unwrap();
            let dates: Vec<NaiveDate> = builder.events().iter().map(|e| e.date).collect();
            if dates.first() == Some(&d(2025, 11, 1)) {
                // Saturday Nov 1 was blanked: the row is gone and the next
                // row starts on Sunday, showing the lagged day 1 unless the
                // cuckoo struck again.
                let expected = if dates.get(1) == Some(&d(2025, 11, 2)) {
                    Cell::Blanked
                } else {
                    Cell::Day(1)
                };
                assert_eq!(november.rows[0][0], expected);
                assert_eq!(november.rows.len(), 5);
                return;
            }
            assert_eq!(november.rows[0][6], Cell::Day(1));
        }
        panic!("no seed in range blanked November 1");
    }

    #[test]
    fn same_seed_same_grids() {
        let build = || {
            let mut builder = DayGridBuilder::new(2026, d(2026, 3, 15)).unwrap();
            let mut stream = RandomStream::new(9);
            let grids: Vec<MonthGrid> = (1..=12)
                .map(|m| builder.build_month(&mut stream, m).unwrap())
                .collect();
            (grids, builder.into_events())
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn invalid_year_is_rejected() {
        assert!(matches!(
            DayGridBuilder::new(i32::MAX, d(2025, 1, 1)),
            Err(GridError::InvalidYear(_))
        ));
    }

    #[test]
    fn cell_labels() {
        assert_eq!(Cell::Day(17).label(), "17");
        assert_eq!(Cell::Blanked.label(), "");
        assert_eq!(Cell::Empty.label(), "");
        assert!(!Cell::Blanked.is_visible());
    }
}

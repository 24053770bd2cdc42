//! The cuckoo: once its begin date arrives, a week row may lose a day.
//!
//! The policy is consulted at most once per week row, at the row's first
//! due slot. Before `begin` it does nothing and consumes no randomness.
//! From `begin` on it draws once from `{true, false, false}`; on `true` the
//! cell is blanked and every later displayed day number lags the real date
//! by one more day.

use crate::random::RandomStream;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Draw pool for a skip decision: one chance in three.
pub const SKIP_CHOICES: [bool; 3] = [true, false, false];

/// A day the cuckoo took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuckooEvent {
    /// Real calendar date of the blanked cell.
    pub date: NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CuckooSkipPolicy {
    begin: NaiveDate,
    /// Non-positive; number of skips so far, negated.
    offset: i64,
    events: Vec<CuckooEvent>,
}

impl CuckooSkipPolicy {
    pub fn new(begin: NaiveDate) -> Self {
        Self {
            begin,
            offset: 0,
            events: Vec::new(),
        }
    }

    pub fn begin(&self) -> NaiveDate {
        self.begin
    }

    /// Render offset in days, `0` or negative.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn events(&self) -> &[CuckooEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<CuckooEvent> {
        self.events
    }

    /// Decide whether the cell at `cursor` (a row's first due slot) is
    /// skipped, recording the event if so.
    pub fn consider(&mut self, stream: &mut RandomStream, cursor: NaiveDate) -> bool {
        if cursor < self.begin {
            return false;
        }
        let skip = stream.choice(&SKIP_CHOICES).copied().unwrap_or(false);
        if skip {
            self.offset -= 1;
            let lag = self.offset.unsigned_abs();
            let description = format!(
                "Hid {}; displayed days now lag by {} {}",
                cursor.format("%A, %B %-d"),
                lag,
                if lag == 1 { "day" } else { "days" }
            );
            tracing::info!(date = %cursor, lag, "{description}");
            self.events.push(CuckooEvent {
                date: cursor,
                description,
            });
        }
        skip
    }

    /// Date shown in the cell for `cursor`: the real date shifted by the
    /// render offset.
    pub fn displayed(&self, cursor: NaiveDate) -> Option<NaiveDate> {
        cursor.checked_sub_days(Days::new(self.offset.unsigned_abs()))
    }
}

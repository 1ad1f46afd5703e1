//! Date-keyed store of daily health records.
//!
//! Each user owns one `RecordStore`. There is at most one record per
//! calendar date; writing a date again replaces the previous record.
//! Serialized as a JSON object keyed by `YYYY-MM-DD`.

use crate::DailyRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RecordStore {
    records: BTreeMap<NaiveDate, DailyRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `date`
    ///
    /// Returns the record previously stored for that date, if any.
    pub fn upsert(&mut self, date: NaiveDate, record: DailyRecord) -> Option<DailyRecord> {
        let previous = self.records.insert(date, record);
        tracing::debug!(
            "{} record for {}",
            if previous.is_some() { "Replaced" } else { "Added" },
            date
        );
        previous
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.records.get(&date)
    }

    /// The `n` most recent records, newest first
    pub fn recent(&self, n: usize) -> Vec<(NaiveDate, &DailyRecord)> {
        self.records
            .iter()
            .rev()
            .take(n)
            .map(|(date, record)| (*date, record))
            .collect()
    }

    /// Full history keyed by date (iterates oldest first)
    pub fn all(&self) -> &BTreeMap<NaiveDate, DailyRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

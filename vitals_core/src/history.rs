//! Bounded BMI snapshot history.
//!
//! Snapshots are kept oldest first; once the cap is reached, appending a new
//! snapshot evicts the oldest one.

use crate::BmiSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of snapshots kept unless configured otherwise
pub const DEFAULT_BMI_HISTORY_CAP: usize = 10;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct BmiHistory {
    entries: VecDeque<BmiSnapshot>,
}

impl BmiHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `snapshot`, evicting the oldest entries beyond `cap`
    ///
    /// Returns the number of evicted snapshots.
    pub fn push(&mut self, snapshot: BmiSnapshot, cap: usize) -> usize {
        self.entries.push_back(snapshot);
        let mut evicted = 0;
        while self.entries.len() > cap.max(1) {
            self.entries.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            tracing::debug!("Evicted {} old BMI snapshot(s)", evicted);
        }
        evicted
    }

    /// Most recent snapshot
    pub fn latest(&self) -> Option<&BmiSnapshot> {
        self.entries.back()
    }

    /// Snapshots oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &BmiSnapshot> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

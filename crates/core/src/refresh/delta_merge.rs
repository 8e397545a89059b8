//! Key-based merge of a persisted daily series with freshly fetched rows.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::portfolio::positions::{DailyPosition, DailyStockRecord, PriceObservation};

/// A row of a per-security daily series, identified by `(date, security_id)`.
pub trait SeriesRow {
    fn series_key(&self) -> (NaiveDate, &str);
}

impl SeriesRow for PriceObservation {
    fn series_key(&self) -> (NaiveDate, &str) {
        (self.date, self.security_id.as_str())
    }
}

impl SeriesRow for DailyStockRecord {
    fn series_key(&self) -> (NaiveDate, &str) {
        (self.date, self.stock.as_str())
    }
}

impl SeriesRow for DailyPosition {
    fn series_key(&self) -> (NaiveDate, &str) {
        self.key()
    }
}

/// Union of `existing` and `new` with at most one row per key.
///
/// On a key collision the row from `new` wins and takes the place of the
/// row it replaces. Keys keep the order of their first appearance, existing
/// rows first. A key repeated within one input keeps its last row.
pub fn merge<T: SeriesRow>(existing: Vec<T>, new: Vec<T>) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(existing.len() + new.len());
    let mut positions: HashMap<(NaiveDate, String), usize> = HashMap::new();

    for row in existing.into_iter().chain(new) {
        let (date, security_id) = row.series_key();
        let key = (date, security_id.to_string());
        match positions.get(&key) {
            Some(&idx) => merged[idx] = row,
            None => {
                positions.insert(key, merged.len());
                merged.push(row);
            }
        }
    }
    merged
}

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Single,
    Range,
    Many,
}

impl SelectionMode {
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Range => "range",
            Self::Many => "many",
        }
    }

    pub fn keeps_sorted(self) -> bool {
        !matches!(self, Self::Single)
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl FromStr for SelectionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "range" => Ok(Self::Range),
            "many" | "multi" | "multiple" => Ok(Self::Many),
            other => Err(anyhow::anyhow!("unknown selection mode: {other}")),
        }
    }
}

/// Selected dates, unique by day, never longer than `max_count`.
///
/// Adding a new date to a full selection clears it first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    dates: Vec<NaiveDate>,
    max_count: Option<usize>,
    mode: SelectionMode,
}

impl Selection {
    pub fn new(mode: SelectionMode, max_count: Option<usize>) -> Self {
        Self {
            dates: Vec::new(),
            max_count,
            mode,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn max_count(&self) -> Option<usize> {
        self.max_count
    }

    /// Replaces the contents with a deduplicated, truncated, sorted copy.
    pub fn force(&mut self, dates: &[NaiveDate]) {
        let mut next: Vec<NaiveDate> = Vec::with_capacity(dates.len());
        for date in dates {
            if !next.contains(date) {
                next.push(*date);
            }
        }
        if let Some(max) = self.max_count {
            next.truncate(max);
        }
        next.sort();
        trace!(count = next.len(), "forced selection");
        self.dates = next;
    }

    /// Adds `date` unless already present, resetting first when full.
    pub fn add(&mut self, date: NaiveDate) {
        if self.contains(date) {
            return;
        }
        if self.is_full() {
            trace!(%date, "selection full; resetting before add");
            self.dates.clear();
        }
        self.dates.push(date);
        self.sort();
    }

    pub fn remove(&mut self, date: NaiveDate) {
        self.dates.retain(|selected| *selected != date);
    }

    pub fn toggle(&mut self, date: NaiveDate) {
        if self.contains(date) {
            self.remove(date);
        } else {
            self.add(date);
        }
    }

    pub fn clear(&mut self) {
        self.dates.clear();
    }

    /// Sorts ascending unless the mode is `single`.
    pub fn sort(&mut self) {
        if self.mode.keeps_sorted() {
            self.dates.sort();
        }
    }

    /// True when `date` lies strictly between the first and last entries.
    pub fn members_between(&self, date: NaiveDate) -> bool {
        if self.dates.len() < 2 {
            return false;
        }
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => first < date && date < last,
            _ => false,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn is_full(&self) -> bool {
        self.max_count.is_some_and(|max| self.dates.len() >= max)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn as_slice(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn to_vec(&self) -> Vec<NaiveDate> {
        self.dates.clone()
    }
}

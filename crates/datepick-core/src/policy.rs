use chrono::NaiveDate;
use tracing::debug;

use crate::config::DisabledPredicate;
use crate::date_util::days_inclusive;
use crate::selection::{Selection, SelectionMode};

/// Decides what a tap does to a [`Selection`] for the active mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    mode: SelectionMode,
}

impl SelectionPolicy {
    pub fn new(mode: SelectionMode) -> Self {
        Self { mode }
    }

    /// Applies a tap on `date` and returns the resulting selection, ascending.
    ///
    /// Tapping a selected date always removes it. Only additions are checked
    /// against disabled days.
    pub fn on_select_date(
        &self,
        selection: &mut Selection,
        date: NaiveDate,
        disabled: Option<&DisabledPredicate>,
    ) -> Vec<NaiveDate> {
        if self.would_create_invalid_range(selection, date, disabled) {
            debug!(%date, anchor = ?selection.first(), "range crosses a disabled day; starting over");
            selection.clear();
        }

        selection.toggle(date);
        selection.sort();

        let mut snapshot = selection.to_vec();
        snapshot.sort();
        snapshot
    }

    /// True in range mode with a single anchor when any day from the anchor
    /// to `date` (inclusive) is disabled.
    pub fn would_create_invalid_range(
        &self,
        selection: &Selection,
        date: NaiveDate,
        disabled: Option<&DisabledPredicate>,
    ) -> bool {
        if self.mode != SelectionMode::Range || selection.len() != 1 {
            return false;
        }
        let (Some(anchor), Some(is_disabled)) = (selection.first(), disabled) else {
            return false;
        };
        if anchor == date {
            return false;
        }

        days_inclusive(anchor, date).any(|day| is_disabled(day))
    }
}

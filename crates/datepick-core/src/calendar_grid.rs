use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::date_util::{
    add_months, clamp, days_in_month, first_of_month, last_of_month, month_key, same_month,
    weekday_index,
};
use crate::grid_cache::{CacheStats, GridCache};

/// Months kept on either side of the pivot when re-centering.
pub const RECENTER_PADDING: i32 = 3;

/// One slot of a month matrix. `None` pads the first and last week.
pub type GridCell = Option<NaiveDate>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: NaiveDate,
    pub cells: Vec<GridCell>,
}

impl MonthGrid {
    /// Week rows of exactly seven cells.
    pub fn weeks(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(7)
    }

    pub fn week_count(&self) -> usize {
        self.cells.len() / 7
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.cells.iter().flatten().copied()
    }
}

/// Lays out one month so that day 1 falls under its weekday column.
///
/// `first_day_of_week` uses 0 = Sunday.
pub fn build_month_grid(month: NaiveDate, first_day_of_week: u8) -> MonthGrid {
    let first = first_of_month(month);
    let last = last_of_month(month);
    let first_day_of_week = u32::from(first_day_of_week % 7);

    let days_before = (weekday_index(first) + 7 - first_day_of_week) % 7;
    let days_after = (first_day_of_week + 6 + 7 - weekday_index(last)) % 7;
    let day_count = days_in_month(first);

    let mut cells = Vec::with_capacity((days_before + day_count + days_after) as usize);
    cells.extend((0..days_before).map(|_| None));
    cells.extend(first.iter_days().take(day_count as usize).map(Some));
    cells.extend((0..days_after).map(|_| None));

    MonthGrid { month: first, cells }
}

pub fn build_month_grids(month: NaiveDate, first_day_of_week: u8, view_count: u8) -> Vec<MonthGrid> {
    (0..i32::from(view_count.max(1)))
        .map(|offset| build_month_grid(add_months(month, offset), first_day_of_week))
        .collect()
}

/// First-of-month dates from `start`'s month through `end`'s month.
pub fn build_month_list(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let end_key = month_key(end);
    let mut months = Vec::new();
    let mut cursor = first_of_month(start);
    while month_key(cursor) <= end_key {
        months.push(cursor);
        let next = add_months(cursor, 1);
        if next == cursor {
            break;
        }
        cursor = next;
    }
    months
}

/// The materialized run of months the UI pages through.
///
/// Owns its [`GridCache`]; two grids never share one.
#[derive(Debug, Clone, Default)]
pub struct CalendarGrid {
    months: Arc<[NaiveDate]>,
    window: Option<((i32, u32), (i32, u32))>,
    cache: GridCache,
}

impl CalendarGrid {
    pub fn new(cache: GridCache) -> Self {
        Self {
            months: Arc::from(Vec::new()),
            window: None,
            cache,
        }
    }

    /// Regenerates the month list unless the window is unchanged at month
    /// granularity. Returns whether the list was replaced.
    #[instrument(skip(self))]
    pub fn ensure_window(&mut self, start: NaiveDate, end: NaiveDate) -> bool {
        let requested = (month_key(start), month_key(end));
        if self.window == Some(requested) {
            return false;
        }

        self.months = self.cache.month_list(start, end);
        self.window = Some(requested);
        debug!(months = self.months.len(), "materialized month window");
        true
    }

    pub fn recenter_around(&mut self, date: NaiveDate) -> bool {
        self.ensure_window(
            add_months(date, -RECENTER_PADDING),
            add_months(date, RECENTER_PADDING),
        )
    }

    /// Like [`Self::recenter_around`], clamped to `[lower, upper]`.
    pub fn recenter_within(&mut self, date: NaiveDate, lower: NaiveDate, upper: NaiveDate) -> bool {
        let start = clamp(add_months(date, -RECENTER_PADDING), first_of_month(lower), upper);
        let end = clamp(add_months(date, RECENTER_PADDING), lower, upper);
        self.ensure_window(start, end)
    }

    pub fn index_of_month(&self, date: Option<NaiveDate>) -> Option<usize> {
        let date = date?;
        self.months
            .iter()
            .position(|month| same_month(Some(*month), Some(date)))
    }

    pub fn month_at(&self, index: usize) -> Option<NaiveDate> {
        self.months.get(index).copied()
    }

    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// True when `date`'s month is missing or within `margin` months of
    /// either end of the materialized list.
    pub fn near_edge(&self, date: NaiveDate, margin: usize) -> bool {
        match self.index_of_month(Some(date)) {
            Some(index) => index < margin || index + margin >= self.months.len(),
            None => true,
        }
    }

    pub fn cells_for_month(&mut self, date: NaiveDate, first_day_of_week: u8, view_count: u8) -> Arc<[MonthGrid]> {
        self.cache.month_grids(date, first_day_of_week, view_count)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

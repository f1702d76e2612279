use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::calendar_grid::{CalendarGrid, MonthGrid};
use crate::config::{ChangeSource, ConfigFingerprint, DatePickerConfig, DisabledPredicate};
use crate::date_util::{
    YEAR_HORIZON, add_months, clamp, first_of_month, month_key, shift_years, today, with_year,
};
use crate::error::ConfigError;
use crate::grid_cache::{CacheStats, GridCache};
use crate::policy::SelectionPolicy;
use crate::selection::{Selection, SelectionMode};

/// Months between the display month and the materialized edge before the
/// grid is re-centered.
const EDGE_MARGIN: usize = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    #[default]
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Previous,
    Next,
}

/// Flags the UI needs to style one day cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayState {
    pub selected: bool,
    pub range_start: bool,
    pub range_end: bool,
    pub in_range: bool,
    pub disabled: bool,
    pub today: bool,
}

/// Selection, calendar window and display position of one picker.
///
/// Single-threaded: every operation runs to completion and fires at most one
/// change notification before returning.
pub struct DatePickerStore {
    config: DatePickerConfig,
    fingerprint: ConfigFingerprint,
    policy: SelectionPolicy,
    selection: Selection,
    grid: CalendarGrid,
    view: ViewType,
    display_date: NaiveDate,
    today: NaiveDate,
    lower: NaiveDate,
    upper: NaiveDate,
}

impl fmt::Debug for DatePickerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatePickerStore")
            .field("config", &self.config)
            .field("selection", &self.selection)
            .field("view", &self.view)
            .field("display_date", &self.display_date)
            .field("lower", &self.lower)
            .field("upper", &self.upper)
            .finish_non_exhaustive()
    }
}

impl DatePickerStore {
    pub fn new(config: DatePickerConfig) -> Result<Self, ConfigError> {
        Self::with_today(config, today())
    }

    /// Like [`Self::new`] with a fixed notion of today.
    #[instrument(skip(config), fields(mode = %config.mode))]
    pub fn with_today(config: DatePickerConfig, today: NaiveDate) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut store = Self {
            fingerprint: config.fingerprint(),
            policy: SelectionPolicy::new(config.mode),
            selection: Selection::new(config.mode, None),
            grid: CalendarGrid::new(GridCache::default()),
            view: ViewType::Month,
            display_date: today,
            today,
            lower: today,
            upper: today,
            config,
        };
        store.apply_structure();
        Ok(store)
    }

    /// Applies a new configuration.
    ///
    /// Structural changes rebuild selection and display; otherwise only the
    /// predicate and callbacks are swapped so a rebuild of the host does not
    /// reset the user's selection. Returns whether a rebuild happened.
    #[instrument(skip(self, config), fields(mode = %config.mode))]
    pub fn reconfigure(&mut self, config: DatePickerConfig) -> Result<bool, ConfigError> {
        config.validate()?;

        let fingerprint = config.fingerprint();
        if fingerprint == self.fingerprint {
            trace!("fingerprint unchanged; refreshing callbacks only");
            self.config.disabled_date = config.disabled_date;
            self.config.on_value_change = config.on_value_change;
            self.config.on_display_change = config.on_display_change;
            return Ok(false);
        }

        self.config = config;
        self.fingerprint = fingerprint;
        self.policy = SelectionPolicy::new(self.config.mode);
        self.view = ViewType::Month;
        self.apply_structure();
        Ok(true)
    }

    fn apply_structure(&mut self) {
        let limit = self.config.selection_limit();
        self.selection = Selection::new(self.config.mode, Some(limit));
        self.selection.force(&self.config.initial_value);

        let (start, end) = (self.config.start_date, self.config.end_date);
        self.lower = start.unwrap_or_else(|| {
            let anchor = end.map_or(self.today, |end| end.min(self.today));
            shift_years(anchor, -YEAR_HORIZON)
        });
        self.upper = end.unwrap_or_else(|| {
            let anchor = start.map_or(self.today, |start| start.max(self.today));
            shift_years(anchor, YEAR_HORIZON)
        });

        let earliest = [self.selection.first(), self.config.start_date, Some(self.today)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(self.today);
        self.display_date = clamp(earliest, self.lower, self.upper);
        self.grid
            .recenter_within(self.display_date, self.lower, self.upper);

        info!(
            mode = %self.config.mode,
            limit,
            selected = self.selection.len(),
            display = %self.display_date,
            lower = %self.lower,
            upper = %self.upper,
            "initialized date picker"
        );
    }

    /// Handles a tap on `date`. Taps outside the window are ignored unless
    /// they remove an already selected day.
    #[instrument(skip(self))]
    pub fn on_select_date(&mut self, date: NaiveDate) {
        if !self.in_window(date) && !self.selection.contains(date) {
            debug!(%date, "ignoring tap outside the window");
            return;
        }

        let disabled = self.config.disabled_date.as_ref();
        let snapshot = self.policy.on_select_date(&mut self.selection, date, disabled);

        if let Some(first) = self.selection.first()
            && first != self.display_date
        {
            self.display_date = first;
            self.grid
                .recenter_within(self.display_date, self.lower, self.upper);
            self.notify_display(ChangeSource::Tap);
        }

        debug!(selection = ?snapshot, "selection changed");
        if let Some(callback) = &self.config.on_value_change {
            callback(snapshot.as_slice());
        }
    }

    /// Jumps to `year` keeping month and day, and returns to the month view.
    #[instrument(skip(self))]
    pub fn select_year(&mut self, year: i32) {
        self.view = ViewType::Month;
        if year == self.display_date.year() {
            return;
        }

        let target = clamp(with_year(self.display_date, year), self.lower, self.upper);
        if target == self.display_date {
            return;
        }
        self.display_date = target;
        self.grid
            .recenter_within(self.display_date, self.lower, self.upper);
        self.notify_display(ChangeSource::YearSelect);
    }

    pub fn switch_view(&mut self) {
        self.view = match self.view {
            ViewType::Month => ViewType::Year,
            ViewType::Year => ViewType::Month,
        };
        debug!(view = ?self.view, "switched view");
    }

    /// Moves the display by `delta` months, stopping at the bound months.
    /// Returns whether the display moved.
    #[instrument(skip(self))]
    pub fn navigate_months(&mut self, delta: i32) -> bool {
        if delta == 0 {
            return false;
        }

        let target = add_months(self.display_date, delta);
        let target = if month_key(target) < month_key(self.lower) {
            first_of_month(self.lower)
        } else if month_key(target) > month_key(self.upper) {
            first_of_month(self.upper)
        } else {
            target
        };
        if month_key(target) == month_key(self.display_date) {
            return false;
        }

        self.display_date = target;
        if self.grid.near_edge(target, EDGE_MARGIN) {
            self.grid
                .recenter_within(target, self.lower, self.upper);
        }
        self.notify_display(ChangeSource::Navigate);
        true
    }

    pub fn can_navigate(&self, direction: NavDirection) -> bool {
        let current = month_key(self.display_date);
        match direction {
            NavDirection::Previous => current > month_key(self.lower),
            NavDirection::Next => current < month_key(self.upper),
        }
    }

    fn notify_display(&self, source: ChangeSource) {
        debug!(display = %self.display_date, ?source, "display date changed");
        if let Some(callback) = &self.config.on_display_change {
            callback(self.display_date, source);
        }
    }

    pub fn selection(&self) -> &[NaiveDate] {
        self.selection.as_slice()
    }

    pub fn selection_limit(&self) -> Option<usize> {
        self.selection.max_count()
    }

    pub fn mode(&self) -> SelectionMode {
        self.config.mode
    }

    pub fn display_date(&self) -> NaiveDate {
        self.display_date
    }

    pub fn view_type(&self) -> ViewType {
        self.view
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn first_day_of_week(&self) -> u8 {
        self.config.effective_first_day_of_week()
    }

    pub fn view_count(&self) -> u8 {
        self.config.effective_view_count()
    }

    /// Effective `[lower, upper]` bounds; open ends fall back to the year
    /// horizon around today.
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        (self.lower, self.upper)
    }

    /// Years offered by the year view.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.lower.year()..=self.upper.year()
    }

    /// Grids for the display month and the following ones, per view count.
    pub fn month_grids(&mut self) -> Arc<[MonthGrid]> {
        self.cells_for_month(self.display_date)
    }

    pub fn cells_for_month(&mut self, date: NaiveDate) -> Arc<[MonthGrid]> {
        let first_day_of_week = self.first_day_of_week();
        let view_count = self.view_count();
        self.grid
            .cells_for_month(date, first_day_of_week, view_count)
    }

    pub fn months(&self) -> &[NaiveDate] {
        self.grid.months()
    }

    pub fn index_of_month(&self, date: Option<NaiveDate>) -> Option<usize> {
        self.grid.index_of_month(date)
    }

    pub fn month_at(&self, index: usize) -> Option<NaiveDate> {
        self.grid.month_at(index)
    }

    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        !self.in_window(date) || self.predicate_rejects(date)
    }

    fn in_window(&self, date: NaiveDate) -> bool {
        self.lower <= date && date <= self.upper
    }

    fn predicate_rejects(&self, date: NaiveDate) -> bool {
        self.config
            .disabled_date
            .as_ref()
            .is_some_and(|predicate: &DisabledPredicate| predicate(date))
    }

    pub fn day_state(&self, date: NaiveDate) -> DayState {
        let is_range = self.config.mode == SelectionMode::Range && self.selection.len() >= 2;
        DayState {
            selected: self.selection.contains(date),
            range_start: is_range && self.selection.first() == Some(date),
            range_end: is_range && self.selection.last() == Some(date),
            in_range: is_range && self.selection.members_between(date),
            disabled: self.is_disabled(date),
            today: date == self.today,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.grid.cache_stats()
    }

    pub fn clear_cache(&mut self) {
        self.grid.clear_cache();
    }
}

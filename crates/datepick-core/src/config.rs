use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::selection::SelectionMode;

/// Returns true for days that cannot be picked. Called on demand and never
/// cached, so hosts with an expensive check should memoize it themselves.
pub type DisabledPredicate = Arc<dyn Fn(NaiveDate) -> bool + Send + Sync>;

/// Receives the selection, ascending, after each tap.
pub type ValueChangeCallback = Arc<dyn Fn(&[NaiveDate]) + Send + Sync>;

/// Receives the new display date and what moved it.
pub type DisplayChangeCallback = Arc<dyn Fn(NaiveDate, ChangeSource) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeSource {
    Tap,
    YearSelect,
    Navigate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// Everything that, when changed, forces the store to rebuild its selection
/// and grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigFingerprint {
    mode: SelectionMode,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    first_day_of_week: Option<u8>,
    view_count: Option<u8>,
    scroll_direction: ScrollDirection,
    selection_count: Option<usize>,
}

/// Picker configuration as handed over by the host.
///
/// Callbacks run synchronously inside the mutating call and must not call
/// back into the store.
#[derive(Clone, Default)]
pub struct DatePickerConfig {
    pub mode: SelectionMode,
    pub initial_value: Vec<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub first_day_of_week: Option<u8>,
    pub view_count: Option<u8>,
    pub scroll_direction: ScrollDirection,
    pub selection_count: Option<usize>,
    pub disabled_date: Option<DisabledPredicate>,
    pub on_value_change: Option<ValueChangeCallback>,
    pub on_display_change: Option<DisplayChangeCallback>,
}

impl fmt::Debug for DatePickerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatePickerConfig")
            .field("mode", &self.mode)
            .field("initial_value", &self.initial_value)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("first_day_of_week", &self.first_day_of_week)
            .field("view_count", &self.view_count)
            .field("scroll_direction", &self.scroll_direction)
            .field("selection_count", &self.selection_count)
            .field("disabled_date", &self.disabled_date.is_some())
            .field("on_value_change", &self.on_value_change.is_some())
            .field("on_display_change", &self.on_display_change.is_some())
            .finish()
    }
}

impl DatePickerConfig {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn initial_value(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.initial_value = dates.into_iter().collect();
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// 0 = Sunday through 6 = Saturday.
    pub fn first_day_of_week(mut self, day: u8) -> Self {
        self.first_day_of_week = Some(day);
        self
    }

    pub fn view_count(mut self, count: u8) -> Self {
        self.view_count = Some(count);
        self
    }

    pub fn scroll_direction(mut self, direction: ScrollDirection) -> Self {
        self.scroll_direction = direction;
        self
    }

    pub fn selection_count(mut self, count: usize) -> Self {
        self.selection_count = Some(count);
        self
    }

    pub fn disabled_date<F>(mut self, predicate: F) -> Self
    where
        F: Fn(NaiveDate) -> bool + Send + Sync + 'static,
    {
        self.disabled_date = Some(Arc::new(predicate));
        self
    }

    /// Must not re-enter the store.
    pub fn on_value_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&[NaiveDate]) + Send + Sync + 'static,
    {
        self.on_value_change = Some(Arc::new(callback));
        self
    }

    /// Must not re-enter the store.
    pub fn on_display_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(NaiveDate, ChangeSource) + Send + Sync + 'static,
    {
        self.on_display_change = Some(Arc::new(callback));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(ConfigError::InvertedWindow { start, end });
        }
        if let Some(count) = self.view_count
            && !matches!(count, 1 | 2)
        {
            return Err(ConfigError::InvalidViewCount(count));
        }
        if let Some(day) = self.first_day_of_week
            && day > 6
        {
            return Err(ConfigError::InvalidFirstDayOfWeek(day));
        }
        Ok(())
    }

    /// Maximum number of selected dates for the configured mode.
    ///
    /// Mismatches are coerced with a warning, never rejected.
    pub fn selection_limit(&self) -> usize {
        match (self.mode, self.selection_count) {
            (SelectionMode::Single, Some(count)) if count != 1 => {
                warn!(count, "selection count ignored in single mode; using 1");
                1
            }
            (SelectionMode::Single, _) => 1,
            (SelectionMode::Range, Some(0)) | (SelectionMode::Range, None) => {
                if self.selection_count == Some(0) {
                    warn!("selection count 0 is not usable for range mode; using 2");
                }
                2
            }
            (SelectionMode::Range, Some(count)) => {
                if count != 2 {
                    warn!(count, "range mode expects a selection count of 2");
                }
                count
            }
            (SelectionMode::Many, Some(0)) => {
                warn!("selection count 0 is not usable for many mode; using 1");
                1
            }
            (SelectionMode::Many, Some(count)) => count,
            (SelectionMode::Many, None) => 1,
        }
    }

    pub fn effective_first_day_of_week(&self) -> u8 {
        self.first_day_of_week.unwrap_or(0)
    }

    /// 1 unless configured, except vertical scrolling defaults to 2.
    pub fn effective_view_count(&self) -> u8 {
        match (self.view_count, self.scroll_direction) {
            (Some(count), _) => count,
            (None, ScrollDirection::Vertical) => 2,
            (None, ScrollDirection::Horizontal) => 1,
        }
    }

    pub fn fingerprint(&self) -> ConfigFingerprint {
        ConfigFingerprint {
            mode: self.mode,
            start_date: self.start_date,
            end_date: self.end_date,
            first_day_of_week: self.first_day_of_week,
            view_count: self.view_count,
            scroll_direction: self.scroll_direction,
            selection_count: self.selection_count,
        }
    }
}

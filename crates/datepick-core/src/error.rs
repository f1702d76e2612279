use chrono::NaiveDate;
use thiserror::Error;

/// Rejected picker configuration. The store keeps its previous state when one
/// of these comes back from `new` or `reconfigure`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("start date {start} is after end date {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },

    #[error("view count must be 1 or 2, got {0}")]
    InvalidViewCount(u8),

    #[error("first day of week must be in 0..=6 (0 = Sunday), got {0}")]
    InvalidFirstDayOfWeek(u8),
}

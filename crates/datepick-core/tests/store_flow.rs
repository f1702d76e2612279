use std::sync::Arc;

use chrono::NaiveDate;
use datepick_core::date_util::add_months;
use datepick_core::{
    ChangeSource, ConfigError, DatePickerConfig, DatePickerStore, NavDirection, ScrollDirection,
    SelectionMode, ViewType,
};
use parking_lot::Mutex;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn picker(config: DatePickerConfig) -> DatePickerStore {
    DatePickerStore::with_today(config, ymd(2024, 6, 1)).expect("valid config")
}

#[test]
fn single_tap_replaces_previous_date() {
    let mut store = picker(DatePickerConfig::new(SelectionMode::Single));
    store.on_select_date(ymd(2024, 6, 15));
    store.on_select_date(ymd(2024, 6, 20));

    assert_eq!(store.selection(), &[ymd(2024, 6, 20)]);
}

#[test]
fn range_taps_produce_sorted_pair() {
    let mut store = picker(DatePickerConfig::new(SelectionMode::Range));
    store.on_select_date(ymd(2024, 6, 10));
    store.on_select_date(ymd(2024, 6, 15));

    assert_eq!(store.selection(), &[ymd(2024, 6, 10), ymd(2024, 6, 15)]);
}

#[test]
fn many_mode_resets_when_full() {
    let mut store = picker(
        DatePickerConfig::new(SelectionMode::Many)
            .selection_count(2)
            .initial_value([ymd(2024, 1, 1)]),
    );
    store.on_select_date(ymd(2024, 1, 2));
    assert_eq!(store.selection(), &[ymd(2024, 1, 1), ymd(2024, 1, 2)]);

    store.on_select_date(ymd(2024, 1, 3));
    assert_eq!(store.selection(), &[ymd(2024, 1, 3)]);
}

#[test]
fn month_navigation_normalizes_day() {
    assert_eq!(add_months(ymd(2024, 12, 15), 1), ymd(2025, 1, 1));
}

#[test]
fn january_2024_grid_with_monday_start() {
    let mut store = picker(DatePickerConfig::new(SelectionMode::Single).first_day_of_week(1));
    let grids = store.cells_for_month(ymd(2024, 1, 1));
    let january = &grids[0];

    let leading = january.cells.iter().take_while(|cell| cell.is_none()).count();
    let trailing = january.cells.iter().rev().take_while(|cell| cell.is_none()).count();
    assert_eq!(leading, 0);
    assert_eq!(january.days().count(), 31);
    assert_eq!(trailing, 4);
    assert_eq!(january.cells.len(), 35);
}

#[test]
fn range_across_disabled_day_keeps_only_new_tap() {
    let blocked = ymd(2024, 6, 12);
    let mut store = picker(DatePickerConfig::new(SelectionMode::Range).disabled_date(move |date| date == blocked));
    store.on_select_date(ymd(2024, 6, 10));
    store.on_select_date(ymd(2024, 6, 15));

    assert_eq!(store.selection(), &[ymd(2024, 6, 15)]);
}

#[test]
fn limit_and_order_hold_for_tap_sequences() {
    let taps: Vec<NaiveDate> = [9, 3, 27, 3, 14, 1, 30, 14, 9, 22, 5, 5, 18]
        .into_iter()
        .map(|day| ymd(2024, 6, day))
        .collect();

    for (mode, count) in [
        (SelectionMode::Single, None),
        (SelectionMode::Range, None),
        (SelectionMode::Many, Some(3)),
        (SelectionMode::Many, Some(5)),
    ] {
        let mut config = DatePickerConfig::new(mode);
        config.selection_count = count;
        let mut store = picker(config);
        let limit = store.selection_limit().expect("limit set");

        for tap in &taps {
            store.on_select_date(*tap);
            let selected = store.selection();
            assert!(selected.len() <= limit, "{mode} exceeded {limit}");
            assert!(selected.windows(2).all(|pair| pair[0] < pair[1]), "{mode} not strictly ascending");
        }
    }
}

#[test]
fn value_change_fires_once_per_tap_with_sorted_snapshot() {
    let seen: Arc<Mutex<Vec<Vec<NaiveDate>>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let mut store = picker(
        DatePickerConfig::new(SelectionMode::Range)
            .on_value_change(move |dates| sink.lock().push(dates.to_vec())),
    );

    store.on_select_date(ymd(2024, 6, 15));
    store.on_select_date(ymd(2024, 6, 10));
    store.on_select_date(ymd(2024, 6, 10));

    let seen = seen.lock();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[1], vec![ymd(2024, 6, 10), ymd(2024, 6, 15)]);
    assert_eq!(seen[2], vec![ymd(2024, 6, 15)]);
}

#[test]
fn display_follows_first_selected_date() {
    let sources: Arc<Mutex<Vec<ChangeSource>>> = Arc::default();
    let sink = Arc::clone(&sources);
    let mut store = picker(
        DatePickerConfig::new(SelectionMode::Many)
            .selection_count(3)
            .on_display_change(move |_, source| sink.lock().push(source)),
    );

    store.on_select_date(ymd(2024, 9, 20));
    assert_eq!(store.display_date(), ymd(2024, 9, 20));
    store.on_select_date(ymd(2024, 8, 2));
    assert_eq!(store.display_date(), ymd(2024, 8, 2));
    store.select_year(2026);
    assert_eq!(store.display_date(), ymd(2026, 8, 2));
    assert!(store.navigate_months(1));

    assert_eq!(
        *sources.lock(),
        vec![ChangeSource::Tap, ChangeSource::Tap, ChangeSource::YearSelect, ChangeSource::Navigate]
    );
}

#[test]
fn select_year_same_year_only_changes_view() {
    let sources: Arc<Mutex<Vec<ChangeSource>>> = Arc::default();
    let sink = Arc::clone(&sources);
    let mut store = picker(
        DatePickerConfig::new(SelectionMode::Single).on_display_change(move |_, source| sink.lock().push(source)),
    );
    store.switch_view();
    store.select_year(2024);

    assert_eq!(store.view_type(), ViewType::Month);
    assert!(sources.lock().is_empty());
}

#[test]
fn rejected_reconfigure_keeps_previous_state() {
    let mut store = picker(DatePickerConfig::new(SelectionMode::Range));
    store.on_select_date(ymd(2024, 6, 10));

    let bad = DatePickerConfig::new(SelectionMode::Range)
        .start_date(ymd(2024, 7, 1))
        .end_date(ymd(2024, 6, 1));
    assert_eq!(
        store.reconfigure(bad),
        Err(ConfigError::InvertedWindow {
            start: ymd(2024, 7, 1),
            end: ymd(2024, 6, 1),
        })
    );
    assert_eq!(
        store.reconfigure(DatePickerConfig::new(SelectionMode::Range).view_count(5)),
        Err(ConfigError::InvalidViewCount(5))
    );
    assert_eq!(store.selection(), &[ymd(2024, 6, 10)]);
    assert_eq!(store.mode(), SelectionMode::Range);
}

#[test]
fn unchanged_fingerprint_keeps_selection_but_swaps_predicate() {
    let mut store = picker(DatePickerConfig::new(SelectionMode::Range));
    store.on_select_date(ymd(2024, 6, 10));

    let blocked = ymd(2024, 6, 12);
    let rebuilt = store
        .reconfigure(
            DatePickerConfig::new(SelectionMode::Range)
                .initial_value([ymd(2024, 1, 1)])
                .disabled_date(move |date| date == blocked),
        )
        .expect("valid config");
    assert!(!rebuilt);
    assert_eq!(store.selection(), &[ymd(2024, 6, 10)]);
    assert!(store.is_disabled(blocked));

    store.on_select_date(ymd(2024, 6, 14));
    assert_eq!(store.selection(), &[ymd(2024, 6, 14)]);
}

#[test]
fn structural_change_rebuilds_from_initial_value() {
    let mut store = picker(DatePickerConfig::new(SelectionMode::Single));
    store.on_select_date(ymd(2024, 6, 20));
    store.switch_view();

    let rebuilt = store
        .reconfigure(
            DatePickerConfig::new(SelectionMode::Many)
                .selection_count(2)
                .initial_value([ymd(2024, 5, 3), ymd(2024, 5, 1), ymd(2024, 5, 2)]),
        )
        .expect("valid config");
    assert!(rebuilt);
    assert_eq!(store.selection(), &[ymd(2024, 5, 1), ymd(2024, 5, 3)]);
    assert_eq!(store.view_type(), ViewType::Month);
    assert_eq!(store.display_date(), ymd(2024, 5, 1));
}

#[test]
fn vertical_scroll_shows_two_months() {
    let mut store = picker(DatePickerConfig::new(SelectionMode::Single).scroll_direction(ScrollDirection::Vertical));
    let grids = store.month_grids();

    assert_eq!(grids.len(), 2);
    assert_eq!(grids[0].month, ymd(2024, 6, 1));
    assert_eq!(grids[1].month, ymd(2024, 7, 1));
}

#[test]
fn repeated_grid_requests_hit_the_cache() {
    let mut store = picker(DatePickerConfig::new(SelectionMode::Single).view_count(2));
    let first = store.month_grids();
    let inserts = store.cache_stats().inserts;
    let second = store.month_grids();

    assert_eq!(first, second);
    assert_eq!(store.cache_stats().inserts, inserts);

    store.clear_cache();
    store.month_grids();
    assert_eq!(store.cache_stats().inserts, inserts + 1);
}

#[test]
fn bounded_picker_cannot_leave_window() {
    let mut store = picker(
        DatePickerConfig::new(SelectionMode::Single)
            .start_date(ymd(2024, 6, 1))
            .end_date(ymd(2024, 7, 31)),
    );
    assert!(!store.can_navigate(NavDirection::Previous));
    assert!(store.can_navigate(NavDirection::Next));
    assert!(store.navigate_months(1));
    assert!(!store.navigate_months(1));
    assert!(!store.can_navigate(NavDirection::Next));
    assert_eq!(store.months(), &[ymd(2024, 6, 1), ymd(2024, 7, 1)]);
    assert_eq!(store.years(), 2024..=2024);
}

#[test]
fn range_tap_on_disabled_endpoint_starts_over_from_it() {
    let blocked = ymd(2024, 6, 15);
    let mut store = picker(DatePickerConfig::new(SelectionMode::Range).disabled_date(move |date| date == blocked));
    store.on_select_date(ymd(2024, 6, 10));
    store.on_select_date(blocked);

    assert_eq!(store.selection(), &[blocked]);
    assert!(store.day_state(blocked).disabled);
}

#[test]
fn single_tap_on_disabled_date_still_selects_it() {
    let blocked = ymd(2024, 6, 15);
    let seen: Arc<Mutex<Vec<Vec<NaiveDate>>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let mut store = picker(
        DatePickerConfig::new(SelectionMode::Single)
            .disabled_date(move |date| date == blocked)
            .on_value_change(move |dates| sink.lock().push(dates.to_vec())),
    );
    store.on_select_date(blocked);

    assert_eq!(store.selection(), &[blocked]);
    assert_eq!(*seen.lock(), vec![vec![blocked]]);
}

#[test]
fn end_only_window_stays_usable() {
    let mut store = picker(DatePickerConfig::new(SelectionMode::Single).end_date(ymd(1900, 12, 31)));
    let (lower, upper) = store.window();
    assert!(lower < upper);
    assert_eq!(upper, ymd(1900, 12, 31));
    assert!(store.can_navigate(NavDirection::Previous));
    assert!(!store.can_navigate(NavDirection::Next));
    assert!(!store.is_disabled(ymd(1900, 6, 1)));

    store.on_select_date(ymd(1900, 6, 1));
    assert_eq!(store.selection(), &[ymd(1900, 6, 1)]);
    assert_eq!(store.display_date(), ymd(1900, 6, 1));
}

#[test]
fn start_only_window_reaches_past_the_start() {
    let mut store = picker(DatePickerConfig::new(SelectionMode::Single).start_date(ymd(2200, 1, 1)));
    assert_eq!(store.display_date(), ymd(2200, 1, 1));
    assert!(!store.can_navigate(NavDirection::Previous));
    assert!(store.navigate_months(12));
    assert_eq!(store.display_date(), ymd(2201, 1, 1));

    store.on_select_date(ymd(2199, 12, 31));
    assert!(store.selection().is_empty());
}

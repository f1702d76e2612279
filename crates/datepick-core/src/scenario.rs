//! Scripted tap sequences replayed against a store, for checking picker
//! behavior from JSON fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{DatePickerConfig, ScrollDirection};
use crate::selection::SelectionMode;
use crate::store::{DatePickerStore, ViewType};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub config: ScenarioConfig,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub expect: Option<Vec<NaiveDate>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub mode: SelectionMode,
    pub initial_value: Vec<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub first_day_of_week: Option<u8>,
    pub view_count: Option<u8>,
    pub scroll_direction: ScrollDirection,
    pub selection_count: Option<usize>,
    pub disabled_dates: Vec<NaiveDate>,
    pub disabled_weekdays: Vec<u8>,
}

impl ScenarioConfig {
    pub fn to_config(&self) -> DatePickerConfig {
        let mut config = DatePickerConfig::new(self.mode)
            .initial_value(self.initial_value.iter().copied())
            .scroll_direction(self.scroll_direction);
        config.start_date = self.start_date;
        config.end_date = self.end_date;
        config.first_day_of_week = self.first_day_of_week;
        config.view_count = self.view_count;
        config.selection_count = self.selection_count;

        if !self.disabled_dates.is_empty() || !self.disabled_weekdays.is_empty() {
            let dates = self.disabled_dates.clone();
            let weekdays = self.disabled_weekdays.clone();
            config = config.disabled_date(move |date: NaiveDate| {
                let weekday = date.weekday().num_days_from_sunday();
                dates.contains(&date) || weekdays.iter().any(|day| u32::from(*day) == weekday)
            });
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Tap(NaiveDate),
    SelectYear(i32),
    Navigate(i32),
    SwitchView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSnapshot {
    pub scenario: String,
    pub step: usize,
    pub selection: Vec<NaiveDate>,
    pub display: NaiveDate,
    pub view: ViewType,
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub name: String,
    pub snapshots: Vec<StepSnapshot>,
    pub selection: Vec<NaiveDate>,
    pub expected: Option<Vec<NaiveDate>>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.expected
            .as_ref()
            .is_none_or(|expected| *expected == self.selection)
    }
}

pub fn load_scenarios(paths: &[PathBuf]) -> anyhow::Result<Vec<Scenario>> {
    let mut out = Vec::new();

    for path in paths {
        out.push(load_scenario(path)?);
    }

    Ok(out)
}

fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read scenario {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse scenario {}", path.display()))
}

#[tracing::instrument(skip(scenario, fallback_today), fields(scenario = %scenario.name))]
pub fn run_scenario(scenario: &Scenario, fallback_today: NaiveDate) -> anyhow::Result<ScenarioReport> {
    let today = scenario.today.unwrap_or(fallback_today);
    let mut store = DatePickerStore::with_today(scenario.config.to_config(), today)
        .map_err(|err| anyhow!("invalid configuration in scenario {}: {err}", scenario.name))?;

    let mut snapshots = Vec::with_capacity(scenario.steps.len());
    for (idx, step) in scenario.steps.iter().enumerate() {
        debug!(step = idx + 1, ?step, "applying step");
        match step {
            Step::Tap(date) => store.on_select_date(*date),
            Step::SelectYear(year) => store.select_year(*year),
            Step::Navigate(delta) => {
                store.navigate_months(*delta);
            }
            Step::SwitchView => store.switch_view(),
        }
        snapshots.push(StepSnapshot {
            scenario: scenario.name.clone(),
            step: idx + 1,
            selection: store.selection().to_vec(),
            display: store.display_date(),
            view: store.view_type(),
        });
    }

    let report = ScenarioReport {
        name: scenario.name.clone(),
        snapshots,
        selection: store.selection().to_vec(),
        expected: scenario.expect.clone(),
    };
    info!(passed = report.passed(), selected = report.selection.len(), "scenario finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn replays_range_scenario_from_json() {
        let raw = r#"{
            "name": "weekend blocks range",
            "today": "2024-06-01",
            "config": { "mode": "range", "disabled_weekdays": [0, 6] },
            "steps": [
                { "tap": "2024-06-10" },
                { "tap": "2024-06-17" },
                "switch_view",
                { "select_year": 2025 }
            ],
            "expect": ["2024-06-17"]
        }"#;
        let scenario: Scenario = serde_json::from_str(raw).expect("parse scenario");
        let report = run_scenario(&scenario, ymd(2000, 1, 1)).expect("run scenario");

        assert!(report.passed());
        assert_eq!(report.snapshots.len(), 4);
        assert_eq!(report.snapshots[2].view, ViewType::Year);
        assert_eq!(report.snapshots[3].view, ViewType::Month);
        assert_eq!(report.snapshots[3].display, ymd(2025, 6, 17));
    }

    #[test]
    fn mismatched_expectation_fails() {
        let raw = r#"{
            "name": "single",
            "today": "2024-06-01",
            "steps": [{ "tap": "2024-06-15" }, { "tap": "2024-06-20" }],
            "expect": ["2024-06-15"]
        }"#;
        let scenario: Scenario = serde_json::from_str(raw).expect("parse scenario");
        let report = run_scenario(&scenario, ymd(2024, 6, 1)).expect("run scenario");

        assert!(!report.passed());
        assert_eq!(report.selection, vec![ymd(2024, 6, 20)]);
    }

    #[test]
    fn inverted_window_is_reported() {
        let raw = r#"{
            "name": "bad window",
            "config": { "start_date": "2024-06-10", "end_date": "2024-06-01" },
            "steps": []
        }"#;
        let scenario: Scenario = serde_json::from_str(raw).expect("parse scenario");
        assert!(run_scenario(&scenario, ymd(2024, 6, 1)).is_err());
    }
}

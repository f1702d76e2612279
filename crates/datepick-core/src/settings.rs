use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{DatePickerConfig, ScrollDirection};
use crate::selection::SelectionMode;

const SETTINGS_FILE: &str = "datepick.toml";
const SETTINGS_ENV_VAR: &str = "DATEPICK_CONFIG";

/// Front-end defaults read from `datepick.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub mode: SelectionMode,
    pub first_day_of_week: Option<u8>,
    pub view_count: Option<u8>,
    pub selection_count: Option<usize>,
    pub scroll_direction: ScrollDirection,
    pub disabled_weekdays: Vec<u8>,
    pub color: bool,
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Single,
            first_day_of_week: None,
            view_count: None,
            selection_count: None,
            scroll_direction: ScrollDirection::Horizontal,
            disabled_weekdays: vec![],
            color: true,
            loaded_from: None,
        }
    }
}

impl Settings {
    #[tracing::instrument(skip(override_path))]
    pub fn load(override_path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = resolve_settings_path(override_path) else {
            warn!("no settings file found; using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            if override_path.is_some() {
                return Err(anyhow!("settings file does not exist: {}", path.display()));
            }
            info!(file = %path.display(), "settings file not found; using defaults");
            return Ok(Self::default());
        }

        let mut settings = Self::from_file(&path)?;
        settings.loaded_from = Some(path.clone());
        info!(file = %path.display(), mode = %settings.mode, "loaded settings");
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(text)?;
        check_weekdays(&settings.disabled_weekdays)?;
        Ok(settings)
    }

    /// Applies `key=value` overrides from the command line.
    #[tracing::instrument(skip(self, overrides))]
    pub fn apply_overrides<I>(&mut self, overrides: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in overrides {
            debug!(key = %key, value = %value, "applying override");
            let value = value.trim();
            match key.trim() {
                "mode" => self.mode = value.parse()?,
                "first_day_of_week" => self.first_day_of_week = Some(parse_number(&key, value)?),
                "view_count" => self.view_count = Some(parse_number(&key, value)?),
                "selection_count" => self.selection_count = Some(parse_number(&key, value)?),
                "scroll_direction" => {
                    self.scroll_direction = match value.to_ascii_lowercase().as_str() {
                        "horizontal" => ScrollDirection::Horizontal,
                        "vertical" => ScrollDirection::Vertical,
                        other => return Err(anyhow!("invalid scroll direction: {other}")),
                    }
                }
                "disabled_weekdays" => {
                    self.disabled_weekdays = value
                        .split(',')
                        .filter(|part| !part.trim().is_empty())
                        .map(|part| parse_number::<u8>(&key, part.trim()))
                        .collect::<anyhow::Result<_>>()?;
                    check_weekdays(&self.disabled_weekdays)?;
                }
                "color" => self.color = parse_bool(value),
                other => return Err(anyhow!("unknown setting: {other}")),
            }
        }
        Ok(())
    }

    /// Structural picker configuration these settings describe.
    pub fn to_config(&self) -> DatePickerConfig {
        let mut config = DatePickerConfig::new(self.mode).scroll_direction(self.scroll_direction);
        config.first_day_of_week = self.first_day_of_week;
        config.view_count = self.view_count;
        config.selection_count = self.selection_count;

        if !self.disabled_weekdays.is_empty() {
            let weekdays = self.disabled_weekdays.clone();
            config = config.disabled_date(move |date: NaiveDate| {
                let index = date.weekday().num_days_from_sunday();
                weekdays.iter().any(|day| u32::from(*day) == index)
            });
        }
        config
    }
}

fn resolve_settings_path(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.to_path_buf());
    }

    if let Ok(raw) = std::env::var(SETTINGS_ENV_VAR) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    dirs::config_dir().map(|dir| dir.join("datepick").join(SETTINGS_FILE))
}

fn check_weekdays(days: &[u8]) -> anyhow::Result<()> {
    match days.iter().find(|day| **day > 6) {
        Some(day) => Err(anyhow!("disabled_weekdays entries must be in 0..=6, got {day}")),
        None => Ok(()),
    }
}

fn parse_number<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("invalid value for {key}: {value}"))
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "y" | "yes" | "on" | "true")
}

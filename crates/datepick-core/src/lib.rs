pub mod calendar_grid;
pub mod cli;
pub mod config;
pub mod date_expr;
pub mod date_util;
pub mod error;
pub mod grid_cache;
pub mod policy;
pub mod render;
pub mod scenario;
pub mod selection;
pub mod settings;
pub mod store;

use std::ffi::OsString;

use anyhow::{Context, anyhow};
use chrono::{Datelike, NaiveDate, Weekday};
use clap::Parser;
use tracing::{debug, info};

pub use calendar_grid::{CalendarGrid, GridCell, MonthGrid};
pub use config::{ChangeSource, DatePickerConfig, ScrollDirection};
pub use error::ConfigError;
pub use grid_cache::{CacheStats, GridCache};
pub use policy::SelectionPolicy;
pub use selection::{Selection, SelectionMode};
pub use store::{DatePickerStore, DayState, NavDirection, ViewType};

use crate::cli::{Command, MonthArgs, ReplayArgs};
use crate::date_expr::{parse_date_expr, parse_month};
use crate::settings::Settings;

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting datepick");

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_overrides(cli.overrides.into_iter().map(|kv| (kv.key, kv.value)))?;
    debug!(?settings, "resolved settings");

    let today = date_util::today();
    match cli.command.unwrap_or(Command::Month(MonthArgs::default())) {
        Command::Month(args) => run_month(&settings, args, today),
        Command::Replay(args) => run_replay(args, today),
    }
}

fn run_month(settings: &Settings, args: MonthArgs, today: NaiveDate) -> anyhow::Result<()> {
    let parse = |raw: &String| parse_date_expr(raw, today);

    let mut config = settings.to_config();
    if let Some(mode) = &args.mode {
        config.mode = mode.parse()?;
    }
    if let Some(raw) = &args.start {
        config.start_date = Some(parse(raw).context("invalid --start")?);
    }
    if let Some(raw) = &args.end {
        config.end_date = Some(parse(raw).context("invalid --end")?);
    }
    if args.first_day.is_some() {
        config.first_day_of_week = args.first_day;
    }
    if args.view_count.is_some() {
        config.view_count = args.view_count;
    }
    if args.count.is_some() {
        config.selection_count = args.count;
    }
    config.initial_value = args
        .initial
        .iter()
        .map(parse)
        .collect::<anyhow::Result<_>>()
        .context("invalid --initial")?;

    if !args.disabled.is_empty() || args.disable_weekends {
        let extra = args
            .disabled
            .iter()
            .map(parse)
            .collect::<anyhow::Result<Vec<_>>>()
            .context("invalid --disable")?;
        let base = config.disabled_date.take();
        let weekends = args.disable_weekends;
        config = config.disabled_date(move |date| {
            extra.contains(&date)
                || (weekends && matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
                || base.as_ref().is_some_and(|predicate| predicate(date))
        });
    }

    let mut store = DatePickerStore::with_today(config, today).context("invalid picker configuration")?;

    for raw in &args.taps {
        let date = parse(raw).context("invalid --tap")?;
        store.on_select_date(date);
    }

    if let Some(raw) = &args.at {
        let target = parse_month(raw).context("invalid --at")?;
        let current = store.display_date();
        let delta = (target.year() - current.year()) * 12 + target.month() as i32 - current.month() as i32;
        store.navigate_months(delta);
    }
    if let Some(delta) = args.nav {
        store.navigate_months(delta);
    }

    let mut renderer = render::Renderer::new(settings.color);
    renderer.print_store(&mut store)?;

    info!("done");
    Ok(())
}

fn run_replay(args: ReplayArgs, today: NaiveDate) -> anyhow::Result<()> {
    let today = match &args.today {
        Some(raw) => parse_date_expr(raw, today).context("invalid --today")?,
        None => today,
    };

    let scenarios = scenario::load_scenarios(&args.scenarios)?;
    if scenarios.is_empty() {
        return Err(anyhow!("no scenarios loaded"));
    }

    let mut failed = Vec::new();
    for scenario in &scenarios {
        info!(scenario = %scenario.name, "running scenario");
        let report = scenario::run_scenario(scenario, today)?;

        for snapshot in &report.snapshots {
            println!("{}", serde_json::to_string(snapshot)?);
        }
        if !report.passed() {
            failed.push(report.name.clone());
        }
    }

    if !failed.is_empty() {
        return Err(anyhow!("scenarios did not match expectations: {}", failed.join(", ")));
    }
    Ok(())
}

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "datepick",
    version,
    about = "Date picker selection and calendar grid engine",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Settings file (defaults to $DATEPICK_CONFIG or the user config dir).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Overrides a settings key, e.g. `--set mode=range`.
    #[arg(
        long = "set",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub overrides: Vec<KeyVal>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Prints the calendar for the display month with the selection marked.
    Month(MonthArgs),
    /// Replays JSON tap scenarios and prints a snapshot per step.
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct MonthArgs {
    #[arg(long)]
    pub mode: Option<String>,

    #[arg(long)]
    pub start: Option<String>,

    #[arg(long)]
    pub end: Option<String>,

    /// 0 = Sunday through 6 = Saturday.
    #[arg(long = "first-day")]
    pub first_day: Option<u8>,

    #[arg(long = "view-count")]
    pub view_count: Option<u8>,

    /// Selection count for range/many modes.
    #[arg(long = "count")]
    pub count: Option<usize>,

    #[arg(long = "initial", action = ArgAction::Append)]
    pub initial: Vec<String>,

    /// Dates tapped in order after initialization.
    #[arg(long = "tap", action = ArgAction::Append)]
    pub taps: Vec<String>,

    #[arg(long = "disable", action = ArgAction::Append)]
    pub disabled: Vec<String>,

    #[arg(long = "disable-weekends")]
    pub disable_weekends: bool,

    /// Month to show, YYYY-MM. Overrides the position derived from the selection.
    #[arg(long = "at")]
    pub at: Option<String>,

    /// Months to page forward (positive) or back (negative) before printing.
    #[arg(long = "nav", allow_hyphen_values = true)]
    pub nav: Option<i32>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[arg(required = true)]
    pub scenarios: Vec<PathBuf>,

    /// Fixed "today" for scenarios that do not set one.
    #[arg(long)]
    pub today: Option<String>,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_month_subcommand() {
        let cli = GlobalCli::parse_from([
            "datepick",
            "-vv",
            "month",
            "--mode",
            "range",
            "--tap",
            "2024-06-10",
            "--tap",
            "2024-06-15",
            "--nav",
            "-2",
            "--set",
            "first_day_of_week=1",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.overrides.len(), 1);
        assert_eq!(cli.overrides[0].key, "first_day_of_week");

        let Some(Command::Month(args)) = cli.command else {
            panic!("expected month command");
        };
        assert_eq!(args.mode.as_deref(), Some("range"));
        assert_eq!(args.taps, vec!["2024-06-10", "2024-06-15"]);
        assert_eq!(args.nav, Some(-2));
    }

    #[test]
    fn rejects_malformed_override() {
        assert!("mode".parse::<KeyVal>().is_err());
        let kv = " mode = many ".parse::<KeyVal>().expect("key value");
        assert_eq!((kv.key.as_str(), kv.value.as_str()), ("mode", "many"));
    }
}

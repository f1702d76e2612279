use std::io::{self, IsTerminal, Write};

use chrono::{Datelike, NaiveDate, Weekday};
use unicode_width::UnicodeWidthStr;

use crate::calendar_grid::MonthGrid;
use crate::date_util::weekday_order;
use crate::store::{DatePickerStore, DayState};

/// Width of one day column: a two-digit day wrapped in two marker characters.
const CELL_WIDTH: usize = 4;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Prints the grids for the store's display month(s) followed by the
    /// current selection.
    #[tracing::instrument(skip(self, store))]
    pub fn print_store(&mut self, store: &mut DatePickerStore) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let grids = store.month_grids();
        let color = self.color && io::stdout().is_terminal();

        let lines = render_months(store, &grids, color);
        for line in lines {
            writeln!(out, "{line}")?;
        }

        writeln!(out)?;
        writeln!(out, "mode      {}", store.mode())?;
        writeln!(out, "view      {:?}", store.view_type())?;
        writeln!(out, "display   {}", store.display_date())?;
        let selection = store
            .selection()
            .iter()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "selected  {}", if selection.is_empty() { "-" } else { selection.as_str() })?;
        Ok(())
    }
}

/// Renders month grids side by side, one text line per output row.
pub fn render_months(store: &DatePickerStore, grids: &[MonthGrid], color: bool) -> Vec<String> {
    let blocks: Vec<Vec<String>> = grids
        .iter()
        .map(|grid| render_month(store, grid, color))
        .collect();
    let height = blocks.iter().map(Vec::len).max().unwrap_or(0);
    let block_width = CELL_WIDTH * 7;

    (0..height)
        .map(|row| {
            blocks
                .iter()
                .map(|block| {
                    let line = block.get(row).map(String::as_str).unwrap_or("");
                    pad_visible(line, block_width)
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect()
}

fn render_month(store: &DatePickerStore, grid: &MonthGrid, color: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(grid.week_count() + 2);
    lines.push(center(&grid.month.format("%B %Y").to_string(), CELL_WIDTH * 7));
    lines.push(
        weekday_order(store.first_day_of_week())
            .iter()
            .map(|day| format!(" {} ", weekday_label(*day)))
            .collect::<String>(),
    );

    for week in grid.weeks() {
        let line = week
            .iter()
            .map(|cell| match cell {
                Some(date) => day_cell(*date, store.day_state(*date), color),
                None => " ".repeat(CELL_WIDTH),
            })
            .collect::<String>();
        lines.push(line);
    }
    lines
}

fn day_cell(date: NaiveDate, state: DayState, color: bool) -> String {
    let (open, close, code) = if state.selected {
        ('[', ']', "1;32")
    } else if state.in_range {
        ('~', '~', "32")
    } else if state.disabled {
        ('-', '-', "90")
    } else if state.today {
        ('*', '*', "33")
    } else {
        (' ', ' ', "")
    };
    let text = format!("{open}{:>2}{close}", date.day());
    paint(&text, code, color)
}

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mo",
        Weekday::Tue => "Tu",
        Weekday::Wed => "We",
        Weekday::Thu => "Th",
        Weekday::Fri => "Fr",
        Weekday::Sat => "Sa",
        Weekday::Sun => "Su",
    }
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if !color || code.is_empty() {
        return text.to_string();
    }
    format!("\x1b[{code}m{text}\x1b[0m")
}

fn center(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(text);
    let left = width.saturating_sub(visible) / 2;
    format!("{}{text}", " ".repeat(left))
}

fn pad_visible(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(strip_ansi(text).as_str());
    format!("{text}{}", " ".repeat(width.saturating_sub(visible)))
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use ritualist_core::{storage::JsonFileStorage, BoardSnapshot, HabitStore, LoadOutcome};
use tracing::{info, warn};

const DEFAULT_DATA_DIR: &str = ".ritualist";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) data_dir: PathBuf,
    pub(crate) reference_date: Option<NaiveDate>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            reference_date: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("RITUALIST_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(date) = std::env::var("RITUALIST_DATE") {
            match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
                Ok(value) => config.reference_date = Some(value),
                Err(err) => warn!(%err, value = %date, "ignoring RITUALIST_DATE"),
            }
        }
        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

pub fn open_store(config: &AppConfig) -> Result<HabitStore> {
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "unable to prepare data directory `{}`",
            config.data_dir.display()
        )
    })?;
    let storage = JsonFileStorage::in_dir(&config.data_dir);
    info!(path = %storage.path().display(), "opening board");
    let store = HabitStore::builder()
        .with_reference_date(config.reference_date())
        .with_storage(storage)
        .build();
    if store.load_outcome() == LoadOutcome::Fresh {
        store.flush().context("unable to write initial board")?;
    }
    Ok(store)
}

pub fn run(config: AppConfig) -> Result<()> {
    let store = open_store(&config)?;
    print!("{}", render_report(&store.snapshot()));
    Ok(())
}

/// Plain-text rendition of the board summary.
pub fn render_report(snapshot: &BoardSnapshot) -> String {
    let summary = snapshot.summary();
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", snapshot.title, snapshot.current_month_label());
    let _ = writeln!(out, "Consistency: {}%", summary.consistency);
    let _ = writeln!(out);

    let _ = write!(out, "{:<24}{:>9}", "Habit", "Progress");
    for week in &summary.weeks {
        let _ = write!(out, "  {:>10}", week.label);
    }
    let _ = writeln!(out);

    for habit in &summary.habits {
        let _ = write!(out, "{:<24}{:>8}%", habit.name, habit.progress);
        for week in &habit.weekly {
            let cell = format!("{}/{} x{}", week.done, week.total, week.missed);
            let _ = write!(out, "  {cell:>10}");
        }
        let _ = writeln!(out);
    }

    let today = snapshot.calendar.today;
    if let Some(day) = summary.day(today) {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Today ({} {}): {} done, {} not done, {}%",
            snapshot.calendar.weekday_label(today),
            today,
            day.done_count,
            day.not_done_count,
            day.progress
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Quick status");
    for habit in summary.quick_status() {
        let _ = writeln!(out, "  {:<22}{:>3}%", habit.name, habit.progress);
    }
    let overflow = summary.quick_status_overflow();
    if overflow > 0 {
        let _ = writeln!(out, "  ...and {overflow} more");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ritualist_core::habit::ToggleSide;
    use tempfile::tempdir;

    fn october() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn open_store_seeds_board_file() {
        let temp = tempdir().expect("tempdir");
        let config = AppConfig::default()
            .with_data_dir(temp.path().join("data"))
            .with_reference_date(october());

        let store = open_store(&config).expect("open store");
        assert_eq!(store.snapshot().habits.len(), 1);
        assert!(temp.path().join("data").join("board.json").exists());

        let reopened = open_store(&config).expect("reopen store");
        assert_eq!(reopened.load_outcome(), LoadOutcome::Restored);
    }

    #[test]
    fn open_store_keeps_unreadable_file() {
        let temp = tempdir().expect("tempdir");
        let board_file = temp.path().join("board.json");
        std::fs::write(&board_file, "{ broken").expect("write fixture");
        let config = AppConfig::default()
            .with_data_dir(temp.path())
            .with_reference_date(october());

        let store = open_store(&config).expect("open store");
        assert_eq!(store.load_outcome(), LoadOutcome::Recovered);
        assert_eq!(
            std::fs::read_to_string(&board_file).expect("read board file"),
            "{ broken"
        );
    }

    #[test]
    fn report_lists_habits_and_today() {
        let temp = tempdir().expect("tempdir");
        let config = AppConfig::default()
            .with_data_dir(temp.path())
            .with_reference_date(october());
        let mut store = open_store(&config).expect("open store");
        store.update_habit_name(1, "Read").expect("rename");
        let snapshot = store
            .toggle_day(1, 18, ToggleSide::Primary)
            .expect("toggle");

        let report = render_report(&snapshot);
        assert!(report.contains("October 2026"));
        assert!(report.contains("Read"));
        assert!(report.contains("Today (Sun 18): 1 done, 0 not done, 100%"));
        assert!(report.contains("End"));
        assert!(!report.contains("more"));
    }

    #[test]
    fn report_truncates_quick_status() {
        let temp = tempdir().expect("tempdir");
        let config = AppConfig::default()
            .with_data_dir(temp.path())
            .with_reference_date(october());
        let mut store = open_store(&config).expect("open store");
        for _ in 0..6 {
            store.add_habit().expect("add habit");
        }
        let report = render_report(&store.snapshot());
        assert!(report.contains("...and 2 more"));
    }
}

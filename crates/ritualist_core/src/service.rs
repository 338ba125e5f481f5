use chrono::{Local, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    board::Board,
    calendar::MonthCalendar,
    habit::{Habit, HabitId, ToggleSide},
    observer::BoardObserver,
    stats::BoardSummary,
    storage::{BoardStorage, MemoryStorage, StorageError},
};

/// Immutable view of the board for one reference month.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub title: String,
    pub habits: Vec<Habit>,
    pub calendar: MonthCalendar,
}

impl BoardSnapshot {
    pub fn days_in_month(&self) -> u32 {
        self.calendar.days_in_month
    }

    pub fn start_weekday_index(&self) -> u32 {
        self.calendar.start_weekday_index
    }

    pub fn current_month_label(&self) -> &str {
        &self.calendar.label
    }

    pub fn habit(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn summary(&self) -> BoardSummary {
        BoardSummary::build(&self.habits, &self.calendar)
    }
}

/// The in-memory change was applied but the write to storage failed. The
/// snapshot reflects the new state; only durability is at risk.
#[derive(Debug, Error)]
#[error("board updated but could not be saved")]
pub struct SaveError {
    #[source]
    pub source: StorageError,
    pub snapshot: BoardSnapshot,
}

impl SaveError {
    pub fn into_snapshot(self) -> BoardSnapshot {
        self.snapshot
    }
}

pub type StoreResult = Result<BoardSnapshot, SaveError>;

pub struct HabitStore {
    board: Board,
    load_outcome: LoadOutcome,
    calendar: MonthCalendar,
    storage: Box<dyn BoardStorage>,
    observers: Vec<Box<dyn BoardObserver>>,
}

pub struct HabitStoreBuilder {
    reference_date: Option<NaiveDate>,
    storage: Option<Box<dyn BoardStorage>>,
    observers: Vec<Box<dyn BoardObserver>>,
}

impl Default for HabitStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitStoreBuilder {
    pub fn new() -> Self {
        Self {
            reference_date: None,
            storage: None,
            observers: Vec::new(),
        }
    }

    /// Date whose month the board displays. Defaults to local today.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn with_storage(mut self, storage: impl BoardStorage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn BoardObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Loads the last saved board. Missing or unreadable records fall back to
    /// the default board.
    pub fn build(self) -> HabitStore {
        let storage = self
            .storage
            .unwrap_or_else(|| Box::new(MemoryStorage::new()));
        let reference = self
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());
        let (board, load_outcome) = load_board(storage.as_ref());
        HabitStore {
            board,
            load_outcome,
            calendar: MonthCalendar::resolve(reference),
            storage,
            observers: self.observers,
        }
    }
}

/// How the board held by a [`HabitStore`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A saved board was read back.
    Restored,
    /// Storage held nothing; the default board is in use.
    Fresh,
    /// The saved board could not be read or repaired; the default board is in use.
    Recovered,
}

#[instrument(skip(storage))]
fn load_board(storage: &dyn BoardStorage) -> (Board, LoadOutcome) {
    match storage.load() {
        Ok(Some(board)) => match board.sanitize() {
            Some(board) => {
                info!(habits = board.habits.len(), "loaded board");
                (board, LoadOutcome::Restored)
            }
            None => {
                warn!("saved board cannot be repaired; starting with default");
                (Board::default(), LoadOutcome::Recovered)
            }
        },
        Ok(None) => {
            info!("no saved board; starting with default");
            (Board::default(), LoadOutcome::Fresh)
        }
        Err(err) => {
            warn!(%err, "failed to load board; starting with default");
            (Board::default(), LoadOutcome::Recovered)
        }
    }
}

impl HabitStore {
    pub fn builder() -> HabitStoreBuilder {
        HabitStoreBuilder::new()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            title: self.board.title.clone(),
            habits: self.board.habits.clone(),
            calendar: self.calendar.clone(),
        }
    }

    pub fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    /// Writes the current board regardless of whether anything changed.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.storage.save(&self.board)
    }

    pub fn calendar(&self) -> &MonthCalendar {
        &self.calendar
    }

    /// Moves the board to another month. Day marks are kept as they are; days
    /// past the end of the new month simply stop being reachable.
    pub fn set_reference_date(&mut self, date: NaiveDate) -> BoardSnapshot {
        self.calendar = MonthCalendar::resolve(date);
        debug!(month = %self.calendar.label, "reference month changed");
        let snapshot = self.snapshot();
        self.notify(&snapshot);
        snapshot
    }

    pub fn add_habit(&mut self) -> StoreResult {
        let id = self.board.push_new_habit();
        debug!(id, "habit added");
        self.commit(true)
    }

    pub fn delete_habit(&mut self, id: HabitId) -> StoreResult {
        let removed = self.board.remove_habit(id);
        if removed {
            debug!(id, "habit deleted");
        }
        self.commit(removed)
    }

    /// Blank names are ignored; names are stored trimmed.
    pub fn update_habit_name(&mut self, id: HabitId, name: &str) -> StoreResult {
        let name = name.trim();
        let changed = match self.board.habit_mut(id) {
            Some(habit) if !name.is_empty() && habit.name != name => {
                habit.name = name.to_string();
                true
            }
            _ => false,
        };
        self.commit(changed)
    }

    pub fn update_habit_color(&mut self, id: HabitId) -> StoreResult {
        let changed = match self.board.habit_mut(id) {
            Some(habit) => {
                habit.color = crate::palette::next_color(&habit.color).to_string();
                debug!(id, color = %habit.color, "habit recoloured");
                true
            }
            None => false,
        };
        self.commit(changed)
    }

    /// Unknown ids and days outside 1..=31 are ignored.
    pub fn toggle_day(&mut self, id: HabitId, day: u32, side: ToggleSide) -> StoreResult {
        let status = self
            .board
            .habit_mut(id)
            .and_then(|habit| habit.toggle(day, side));
        if let Some(status) = status {
            debug!(id, day, ?side, ?status, "day toggled");
        }
        self.commit(status.is_some())
    }

    pub fn set_title(&mut self, title: &str) -> StoreResult {
        let title = title.trim();
        let changed = !title.is_empty() && self.board.title != title;
        if changed {
            self.board.title = title.to_string();
        }
        self.commit(changed)
    }

    /// Clears every day mark while keeping habits, their order, ids and colours.
    pub fn reset_all_progress(&mut self) -> StoreResult {
        let mut changed = false;
        for habit in &mut self.board.habits {
            changed |= habit.has_progress();
            habit.clear_progress();
        }
        if changed {
            info!(habits = self.board.habits.len(), "progress reset");
        } else {
            debug!("no progress to reset; skipping write");
        }
        self.commit(changed)
    }

    fn commit(&mut self, changed: bool) -> StoreResult {
        let snapshot = self.snapshot();
        if !changed {
            return Ok(snapshot);
        }
        let saved = self.storage.save(&self.board);
        self.notify(&snapshot);
        match saved {
            Ok(()) => Ok(snapshot),
            Err(source) => {
                warn!(err = %source, "board changed but save failed");
                Err(SaveError { source, snapshot })
            }
        }
    }

    fn notify(&self, snapshot: &BoardSnapshot) {
        for observer in &self.observers {
            observer.board_changed(snapshot);
        }
    }
}

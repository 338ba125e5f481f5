use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::habit::{Habit, HabitId};
use crate::palette;

pub const DEFAULT_TITLE: &str = "My Habit Tracker";
pub const NEW_HABIT_NAME: &str = "New Habit";

/// Title plus the ordered habit list; the unit of persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub title: String,
    pub habits: Vec<Habit>,
    /// Next id to hand out. Never decreases, so deleted ids are not reused.
    #[serde(default)]
    pub next_id: HabitId,
}

impl Default for Board {
    fn default() -> Self {
        let mut board = Self {
            title: DEFAULT_TITLE.to_string(),
            habits: Vec::new(),
            next_id: 1,
        };
        board.push_new_habit();
        board
    }
}

impl Board {
    pub fn habit(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn habit_mut(&mut self, id: HabitId) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|habit| habit.id == id)
    }

    /// Appends a placeholder habit coloured by its creation index. Once the
    /// counter is exhausted the lowest free id is used instead.
    pub fn push_new_habit(&mut self) -> HabitId {
        let mut id = self.next_id.max(1);
        if self.habit(id).is_some() {
            let taken: HashSet<HabitId> = self.habits.iter().map(|habit| habit.id).collect();
            id = (1..).find(|candidate| !taken.contains(candidate)).unwrap_or(1);
        }
        let color = palette::initial_color((id - 1) as usize);
        self.habits.push(Habit::new(id, NEW_HABIT_NAME, color));
        self.next_id = self.next_id.max(id.saturating_add(1));
        id
    }

    pub fn remove_habit(&mut self, id: HabitId) -> bool {
        let before = self.habits.len();
        self.habits.retain(|habit| habit.id != id);
        self.habits.len() != before
    }

    /// Repairs a board read back from storage so that the in-memory
    /// invariants hold: non-blank title, unique ids, disjoint day sets and a
    /// `next_id` above every existing id. Returns `None` when no id above the
    /// existing ones can be represented.
    pub fn sanitize(mut self) -> Option<Self> {
        if self.title.trim().is_empty() {
            tracing::warn!("persisted board has a blank title; using default");
            self.title = DEFAULT_TITLE.to_string();
        }

        let mut seen = HashSet::new();
        self.habits.retain(|habit| {
            let fresh = seen.insert(habit.id);
            if !fresh {
                tracing::warn!(id = habit.id, "dropping habit with duplicate id");
            }
            fresh
        });

        for habit in &mut self.habits {
            if !habit.done.is_disjoint(habit.not_done) {
                tracing::warn!(id = habit.id, "day marked both done and missed; keeping done");
                habit.not_done = habit.not_done.difference(habit.done);
            }
        }

        let highest = self.habits.iter().map(|habit| habit.id).max().unwrap_or(0);
        let Some(floor) = highest.checked_add(1) else {
            tracing::warn!(id = highest, "persisted habit id leaves no room for new ids");
            return None;
        };
        self.next_id = self.next_id.max(floor);
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::DaySet;

    #[test]
    fn default_board_has_one_fresh_habit() {
        let board = Board::default();
        assert_eq!(board.title, DEFAULT_TITLE);
        assert_eq!(board.habits.len(), 1);
        assert_eq!(board.habits[0].id, 1);
        assert_eq!(board.habits[0].color, palette::initial_color(0));
        assert!(!board.habits[0].has_progress());
        assert_eq!(board.next_id, 2);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut board = Board::default();
        let second = board.push_new_habit();
        assert!(board.remove_habit(second));
        let third = board.push_new_habit();
        assert!(third > second);
        assert!(!board.remove_habit(99));
    }

    #[test]
    fn sanitize_repairs_loaded_state() {
        let mut first = Habit::new(4, "Run", "#6366f1");
        first.done = [1, 2].into_iter().collect();
        first.not_done = [2, 3].into_iter().collect();
        let duplicate = Habit::new(4, "Walk", "#10b981");
        let board = Board {
            title: "   ".into(),
            habits: vec![first, duplicate],
            next_id: 0,
        }
        .sanitize()
        .expect("repairable board");

        assert_eq!(board.title, DEFAULT_TITLE);
        assert_eq!(board.habits.len(), 1);
        assert_eq!(board.habits[0].name, "Run");
        assert_eq!(board.habits[0].not_done, [3].into_iter().collect::<DaySet>());
        assert_eq!(board.next_id, 5);
    }

    #[test]
    fn missing_next_id_is_recovered_from_habits() {
        let json = r##"{"title":"Ritual","habits":[{"id":7,"name":"Stretch","color":"#ef4444","done":[1],"notDone":[]}]}"##;
        let board: Board = serde_json::from_str(json).unwrap();
        let board = board.sanitize().unwrap();
        assert_eq!(board.next_id, 8);
        assert!(board.habit(7).is_some_and(|habit| habit.done.contains(1)));
    }

    #[test]
    fn sanitize_rejects_exhausted_habit_ids() {
        let board = Board {
            title: "Ritual".into(),
            habits: vec![Habit::new(HabitId::MAX, "Run", "#6366f1")],
            next_id: 0,
        };
        assert!(board.sanitize().is_none());
    }

    #[test]
    fn push_new_habit_survives_saturated_counter() {
        let mut board = Board {
            title: "Ritual".into(),
            habits: Vec::new(),
            next_id: HabitId::MAX,
        };
        assert_eq!(board.push_new_habit(), HabitId::MAX);
        assert_eq!(board.next_id, HabitId::MAX);
        assert_eq!(board.push_new_habit(), 1);
        assert_eq!(board.push_new_habit(), 2);
        assert_eq!(board.habits.len(), 3);
    }
}

//! Derived statistics over a board. Everything here is a pure function of the
//! habit list and the month calendar.

use serde::{Deserialize, Serialize};

use crate::calendar::MonthCalendar;
use crate::habit::{Habit, HabitId};

/// Day count the header consistency bar is measured against, independent of
/// the length of the displayed month.
pub const CONSISTENCY_REFERENCE_DAYS: u32 = 30;

/// Number of habits listed in the quick status panel.
pub const QUICK_STATUS_LIMIT: usize = 5;

const FIXED_WEEKS: [(u32, u32); 4] = [(1, 7), (8, 14), (15, 21), (22, 28)];
const TRAILING_WEEK_START: u32 = 29;

/// `round(part / whole * 100)` with halves rounded up; 0 when `whole` is 0.
pub fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part * 200 + whole) / (whole * 2)) as u32
}

pub fn habit_progress(habit: &Habit, days_in_month: u32) -> u32 {
    percent(u64::from(habit.done.len()), u64::from(days_in_month))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayStats {
    pub day: u32,
    pub done_count: usize,
    /// Habits not marked done on this day, whether untouched or missed.
    pub not_done_count: usize,
    pub progress: u32,
}

pub fn day_stats(habits: &[Habit], day: u32) -> DayStats {
    let done_count = habits
        .iter()
        .filter(|habit| habit.done.contains(day))
        .count();
    DayStats {
        day,
        done_count,
        not_done_count: habits.len() - done_count,
        progress: percent(done_count as u64, habits.len() as u64),
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyStats {
    pub done: u32,
    pub missed: u32,
    pub total: u32,
}

pub fn weekly_stats(habit: &Habit, start_day: u32, end_day: u32, days_in_month: u32) -> WeeklyStats {
    let effective_end = end_day.min(days_in_month);
    if effective_end < start_day {
        return WeeklyStats::default();
    }
    WeeklyStats {
        done: habit.done.count_between(start_day, effective_end),
        missed: habit.not_done.count_between(start_day, effective_end),
        total: effective_end - start_day + 1,
    }
}

pub fn overall_consistency(habits: &[Habit], reference_days_in_month: u32) -> u32 {
    let total_potential = habits.len() as u64 * u64::from(reference_days_in_month);
    let total_completed: u64 = habits.iter().map(|habit| u64::from(habit.done.len())).sum();
    percent(total_completed, total_potential)
}

/// One column of the weekly view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekSpan {
    pub index: u32,
    pub label: String,
    pub range_label: String,
    pub start: u32,
    pub end: u32,
}

/// Weeks 1-7, 8-14, 15-21, 22-28 and, for months longer than 28 days, a
/// trailing partial week running to the end of the month.
pub fn week_spans(days_in_month: u32) -> Vec<WeekSpan> {
    let mut spans: Vec<WeekSpan> = FIXED_WEEKS
        .iter()
        .zip(1..)
        .map(|(&(start, end), index)| WeekSpan {
            index,
            label: format!("Week {index}"),
            range_label: format!("Days {start}-{end}"),
            start,
            end,
        })
        .collect();
    spans.push(WeekSpan {
        index: 5,
        label: "End".to_string(),
        range_label: format!("Days {TRAILING_WEEK_START}-{days_in_month}"),
        start: TRAILING_WEEK_START,
        end: days_in_month,
    });
    spans.retain(|span| span.start <= days_in_month);
    spans
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitSummary {
    pub id: HabitId,
    pub name: String,
    pub color: String,
    pub progress: u32,
    /// One entry per span in [`BoardSummary::weeks`].
    pub weekly: Vec<WeeklyStats>,
}

/// Read-only view model handed to the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardSummary {
    pub weeks: Vec<WeekSpan>,
    pub habits: Vec<HabitSummary>,
    /// Indexed by `day - 1` for every day of the month.
    pub days: Vec<DayStats>,
    pub consistency: u32,
}

impl BoardSummary {
    pub fn build(habits: &[Habit], calendar: &MonthCalendar) -> Self {
        let days_in_month = calendar.days_in_month;
        let weeks = week_spans(days_in_month);
        let habit_summaries = habits
            .iter()
            .map(|habit| HabitSummary {
                id: habit.id,
                name: habit.name.clone(),
                color: habit.color.clone(),
                progress: habit_progress(habit, days_in_month),
                weekly: weeks
                    .iter()
                    .map(|span| weekly_stats(habit, span.start, span.end, days_in_month))
                    .collect(),
            })
            .collect();

        Self {
            weeks,
            habits: habit_summaries,
            days: calendar.days().map(|day| day_stats(habits, day)).collect(),
            consistency: overall_consistency(habits, CONSISTENCY_REFERENCE_DAYS),
        }
    }

    pub fn day(&self, day: u32) -> Option<&DayStats> {
        day.checked_sub(1).and_then(|idx| self.days.get(idx as usize))
    }

    pub fn quick_status(&self) -> &[HabitSummary] {
        &self.habits[..self.habits.len().min(QUICK_STATUS_LIMIT)]
    }

    /// Habits left out of [`Self::quick_status`].
    pub fn quick_status_overflow(&self) -> usize {
        self.habits.len().saturating_sub(QUICK_STATUS_LIMIT)
    }
}

use std::fmt;

use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize, Serializer};

pub type HabitId = u64;

pub const FIRST_DAY: u32 = 1;
pub const LAST_DAY: u32 = 31;

/// Set of days 1..=31 stored as a bitmask; bit `n` marks day `n`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DaySet(u32);

const DAY_BITS: u32 = !1;

impl DaySet {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Bit 0 never names a day and is discarded.
    pub const fn from_mask(mask: u32) -> Self {
        Self(mask & DAY_BITS)
    }

    pub const fn mask(self) -> u32 {
        self.0
    }

    pub fn is_valid_day(day: u32) -> bool {
        (FIRST_DAY..=LAST_DAY).contains(&day)
    }

    pub fn contains(self, day: u32) -> bool {
        Self::is_valid_day(day) && self.0 & (1 << day) != 0
    }

    /// Returns `false` when `day` is outside 1..=31.
    pub fn insert(&mut self, day: u32) -> bool {
        if !Self::is_valid_day(day) {
            return false;
        }
        self.0 |= 1 << day;
        true
    }

    pub fn remove(&mut self, day: u32) {
        if Self::is_valid_day(day) {
            self.0 &= !(1 << day);
        }
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_disjoint(self, other: DaySet) -> bool {
        self.0 & other.0 == 0
    }

    pub fn difference(self, other: DaySet) -> DaySet {
        Self(self.0 & !other.0)
    }

    /// Number of members within `start..=end`.
    pub fn count_between(self, start: u32, end: u32) -> u32 {
        (start.max(FIRST_DAY)..=end.min(LAST_DAY))
            .filter(|day| self.contains(*day))
            .count() as u32
    }

    pub fn iter(self) -> impl Iterator<Item = u32> {
        (FIRST_DAY..=LAST_DAY).filter(move |day| self.contains(*day))
    }
}

impl fmt::Debug for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<u32> for DaySet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = DaySet::new();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl Serialize for DaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DaySetRepr {
    Mask(u32),
    Days(Vec<i64>),
}

impl<'de> Deserialize<'de> for DaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = DaySetRepr::deserialize(deserializer)
            .map_err(|_| D::Error::custom("expected a list of days or a day mask"))?;
        let set = match repr {
            DaySetRepr::Mask(mask) => {
                if mask & 1 != 0 {
                    tracing::warn!(mask, "ignoring bit 0 in persisted day mask");
                }
                DaySet::from_mask(mask)
            }
            DaySetRepr::Days(days) => {
                let mut set = DaySet::new();
                for day in days {
                    let accepted = u32::try_from(day).map(|d| set.insert(d)).unwrap_or(false);
                    if !accepted {
                        tracing::warn!(day, "dropping out-of-range persisted day");
                    }
                }
                set
            }
        };
        Ok(set)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DayStatus {
    Untouched,
    Done,
    Missed,
}

/// Which input toggled a day: the primary click marks done, the secondary
/// (context) click marks missed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToggleSide {
    Primary,
    Secondary,
}

impl DayStatus {
    pub fn after(self, side: ToggleSide) -> DayStatus {
        match (self, side) {
            (DayStatus::Done, ToggleSide::Primary) => DayStatus::Untouched,
            (_, ToggleSide::Primary) => DayStatus::Done,
            (DayStatus::Missed, ToggleSide::Secondary) => DayStatus::Untouched,
            (_, ToggleSide::Secondary) => DayStatus::Missed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub done: DaySet,
    #[serde(default)]
    pub not_done: DaySet,
}

impl Habit {
    pub fn new(id: HabitId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            done: DaySet::new(),
            not_done: DaySet::new(),
        }
    }

    pub fn status(&self, day: u32) -> DayStatus {
        if self.done.contains(day) {
            DayStatus::Done
        } else if self.not_done.contains(day) {
            DayStatus::Missed
        } else {
            DayStatus::Untouched
        }
    }

    /// Applies one toggle input to `day`. Days outside 1..=31 are ignored and
    /// `None` is returned; otherwise the resulting status.
    pub fn toggle(&mut self, day: u32, side: ToggleSide) -> Option<DayStatus> {
        if !DaySet::is_valid_day(day) {
            return None;
        }
        let next = self.status(day).after(side);
        self.set_status(day, next);
        Some(next)
    }

    fn set_status(&mut self, day: u32, status: DayStatus) {
        match status {
            DayStatus::Done => {
                self.not_done.remove(day);
                self.done.insert(day);
            }
            DayStatus::Missed => {
                self.done.remove(day);
                self.not_done.insert(day);
            }
            DayStatus::Untouched => {
                self.done.remove(day);
                self.not_done.remove(day);
            }
        }
    }

    pub fn clear_progress(&mut self) {
        self.done.clear();
        self.not_done.clear();
    }

    pub fn has_progress(&self) -> bool {
        !self.done.is_empty() || !self.not_done.is_empty()
    }
}

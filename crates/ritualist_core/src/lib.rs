pub mod board;
pub mod calendar;
pub mod habit;
pub mod observer;
pub mod palette;
pub mod service;
pub mod stats;
pub mod storage;

pub use crate::service::{
    BoardSnapshot, HabitStore, HabitStoreBuilder, LoadOutcome, SaveError, StoreResult,
};

//! Habit tracking for habitdash
//!
//! Holds the authoritative habit collection, persists it through a
//! `BlobStore` after every mutation and broadcasts snapshots to subscribers.

pub mod habit;
pub mod store;

pub use habit::{Habit, HabitError, HabitId, HabitsState, DEFAULT_CATEGORY};
pub use store::{today, HabitStore, HABITS_STORE_NAME, HABITS_STORE_VERSION};

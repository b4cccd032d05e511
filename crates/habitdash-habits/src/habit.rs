use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category assigned when none is given
pub const DEFAULT_CATEGORY: &str = "General";

/// Habit identifier, unique within a store
pub type HabitId = u64;

/// A user-tracked recurring activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub category: String,
    /// Dates on which the habit was marked done
    #[serde(default)]
    pub completed: BTreeSet<NaiveDate>,
}

impl Habit {
    pub fn new(id: HabitId, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            completed: BTreeSet::new(),
        }
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completed.contains(&date)
    }

    pub fn completion_count(&self) -> usize {
        self.completed.len()
    }

    /// Flip completion for `date`. Returns true if the date is now completed.
    pub fn toggle(&mut self, date: NaiveDate) -> bool {
        if self.completed.remove(&date) {
            false
        } else {
            self.completed.insert(date);
            true
        }
    }
}

/// Persisted and broadcast state of the habit store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitsState {
    pub habits: Vec<Habit>,
}

impl HabitsState {
    pub fn find(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn find_mut(&mut self, id: HabitId) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|h| h.id == id)
    }

    /// Smallest id greater than every id in the collection.
    ///
    /// `None` when the largest id is `HabitId::MAX` and no later id exists.
    pub fn next_id(&self) -> Option<HabitId> {
        match self.habits.iter().map(|h| h.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        }
    }
}

/// Rejected habit mutations. Never surfaced to callers of the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HabitError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Habit not found: {0}")]
    NotFound(HabitId),
}

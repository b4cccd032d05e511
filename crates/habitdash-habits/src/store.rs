//! In-memory habit store with write-through persistence.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use habitdash_store::{load_snapshot, save_snapshot, BlobStore};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::habit::{Habit, HabitError, HabitId, HabitsState, DEFAULT_CATEGORY};

/// Backend key for the persisted habit collection
pub const HABITS_STORE_NAME: &str = "habits-storage";

/// Snapshot version written by this store
pub const HABITS_STORE_VERSION: u32 = 1;

/// Authoritative habit collection.
///
/// Mutations run to completion under the channel's write lock, persist the
/// new state and then wake every subscriber. Rejected mutations (blank name,
/// unknown id) are logged and otherwise ignored.
pub struct HabitStore {
    state: watch::Sender<HabitsState>,
    next_id: AtomicU64,
    default_category: String,
    backend: Arc<dyn BlobStore>,
    last_persist_error: Mutex<Option<String>>,
}

impl HabitStore {
    /// Build the store from whatever the backend holds.
    ///
    /// An absent, corrupt or incompatible blob yields an empty collection.
    pub fn load(backend: Arc<dyn BlobStore>) -> Self {
        let initial = match load_snapshot::<HabitsState>(
            backend.as_ref(),
            HABITS_STORE_NAME,
            HABITS_STORE_VERSION,
        ) {
            Ok(Some(state)) => {
                tracing::info!("Loaded {} habits", state.habits.len());
                dedup_ids(state)
            }
            Ok(None) => HabitsState::default(),
            Err(e) => {
                tracing::warn!("Failed to load habits, starting empty: {}", e);
                HabitsState::default()
            }
        };

        let (initial, next_id) = match initial.next_id() {
            Some(next_id) => (initial, next_id),
            None => {
                tracing::warn!("Saved habits exhaust the id space, starting empty");
                (HabitsState::default(), 1)
            }
        };
        let (state, _) = watch::channel(initial);
        let next_id = AtomicU64::new(next_id);

        Self {
            state,
            next_id,
            default_category: DEFAULT_CATEGORY.to_string(),
            backend,
            last_persist_error: Mutex::new(None),
        }
    }

    /// Use `category` for habits added without one. Blank keeps the current default.
    pub fn with_default_category(mut self, category: &str) -> Self {
        let category = category.trim();
        if !category.is_empty() {
            self.default_category = category.to_string();
        }
        self
    }

    /// Add a habit. Returns the new id, or `None` if `name` is blank or no id is left.
    pub fn add_habit(&self, name: &str, category: &str) -> Option<HabitId> {
        let name = match validate_name(name) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!("Rejected habit: {}", e);
                return None;
            }
        };
        let category = match category.trim() {
            "" => self.default_category.as_str(),
            c => c,
        };

        let Ok(id) = self
            .next_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1))
        else {
            tracing::warn!("Habit id space exhausted, cannot add {}", name);
            return None;
        };
        self.mutate(|state| {
            state.habits.push(Habit::new(id, name, category));
            true
        });

        tracing::debug!("Added habit {} ({})", id, name);
        Some(id)
    }

    /// Flip completion of habit `id` on `date`. Unknown ids are ignored.
    pub fn toggle_habit(&self, id: HabitId, date: NaiveDate) {
        self.mutate(|state| match state.find_mut(id) {
            Some(habit) => {
                let done = habit.toggle(date);
                tracing::debug!("Habit {} on {}: {}", id, date, if done { "done" } else { "undone" });
                true
            }
            None => {
                tracing::debug!("Toggle ignored: {}", HabitError::NotFound(id));
                false
            }
        });
    }

    /// Toggle habit `id` for the current UTC date.
    pub fn toggle_today(&self, id: HabitId) {
        self.toggle_habit(id, today());
    }

    /// Delete habit `id`. Unknown ids are ignored.
    pub fn remove_habit(&self, id: HabitId) {
        self.mutate(|state| {
            let before = state.habits.len();
            state.habits.retain(|h| h.id != id);
            if state.habits.len() == before {
                tracing::debug!("Remove ignored: {}", HabitError::NotFound(id));
                return false;
            }
            true
        });
    }

    /// Receiver that is marked changed after every applied mutation
    pub fn subscribe(&self) -> watch::Receiver<HabitsState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> HabitsState {
        self.state.borrow().clone()
    }

    pub fn habits(&self) -> Vec<Habit> {
        self.state.borrow().habits.clone()
    }

    pub fn get(&self, id: HabitId) -> Option<Habit> {
        self.state.borrow().find(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().habits.is_empty()
    }

    /// Habits marked done on `date`, in collection order
    pub fn completed_on(&self, date: NaiveDate) -> Vec<Habit> {
        self.state
            .borrow()
            .habits
            .iter()
            .filter(|h| h.is_completed_on(date))
            .cloned()
            .collect()
    }

    /// Distinct categories, sorted
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .state
            .borrow()
            .habits
            .iter()
            .map(|h| h.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Habits grouped by category
    pub fn by_category(&self) -> BTreeMap<String, Vec<Habit>> {
        let mut groups: BTreeMap<String, Vec<Habit>> = BTreeMap::new();
        for habit in &self.state.borrow().habits {
            groups
                .entry(habit.category.clone())
                .or_default()
                .push(habit.clone());
        }
        groups
    }

    /// Message of the most recent failed save, cleared by the next successful one
    pub fn last_persist_error(&self) -> Option<String> {
        self.last_persist_error.lock().clone()
    }

    /// Apply `f`; when it reports a change, persist and notify.
    fn mutate(&self, f: impl FnOnce(&mut HabitsState) -> bool) {
        self.state.send_if_modified(|state| {
            if !f(state) {
                return false;
            }
            // Saved under the write lock so backend writes land in mutation order
            self.persist(state);
            true
        });
    }

    fn persist(&self, state: &HabitsState) {
        let result = save_snapshot(
            self.backend.as_ref(),
            HABITS_STORE_NAME,
            HABITS_STORE_VERSION,
            state,
        );
        let mut last_error = self.last_persist_error.lock();
        match result {
            Ok(()) => *last_error = None,
            Err(e) => {
                // In-memory state stays authoritative for this session
                tracing::error!("Failed to persist habits: {}", e);
                *last_error = Some(e.to_string());
            }
        }
    }
}

/// Current calendar date in UTC, the key completions are recorded under
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

fn validate_name(name: &str) -> Result<&str, HabitError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HabitError::Validation("Habit name cannot be empty".to_string()));
    }
    Ok(trimmed)
}

/// Drop habits whose id repeats an earlier one; older blobs could collide.
fn dedup_ids(mut state: HabitsState) -> HabitsState {
    let mut seen = std::collections::HashSet::new();
    let before = state.habits.len();
    state.habits.retain(|h| seen.insert(h.id));
    if state.habits.len() != before {
        tracing::warn!(
            "Dropped {} habits with duplicate ids",
            before - state.habits.len()
        );
    }
    state
}

//! The ordered task collection and its mutation rules.
//!
//! Tasks are addressed by position. Every mutation writes the complete list
//! back to the store; operations that change nothing (blank text, a position
//! past the end) do not touch the store at all.

use crate::error::AppError;
use crate::model::{Filter, Task};
use crate::storage::KeyValueStore;
use crate::storage::json_store;

/// Transient edit-mode state. Never persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditState {
    pub index: Option<usize>,
    pub draft_text: String,
}

impl EditState {
    pub fn is_editing(&self) -> bool {
        self.index.is_some()
    }

    fn clear(&mut self) {
        self.index = None;
        self.draft_text.clear();
    }
}

#[derive(Debug)]
pub struct TaskList<S: KeyValueStore> {
    tasks: Vec<Task>,
    edit: EditState,
    store: S,
}

impl<S: KeyValueStore> TaskList<S> {
    /// Hydrates the list from `store`, starting empty when nothing usable is
    /// stored there.
    pub fn load(store: S) -> Self {
        let tasks = json_store::load_tasks(&store);
        tracing::debug!(count = tasks.len(), "task list loaded");
        Self {
            tasks,
            edit: EditState::default(),
            store,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_editing()
    }

    pub fn filtered(&self, filter: Filter) -> Vec<Task> {
        filter_tasks(&self.tasks, filter)
    }

    pub fn active_count(&self) -> usize {
        active_count(&self.tasks)
    }

    /// Appends a new pending task. Blank text is ignored and yields `Ok(None)`.
    pub fn add(&mut self, text: &str, due_date: &str) -> Result<Option<Task>, AppError> {
        if text.trim().is_empty() {
            tracing::debug!("ignoring add with blank text");
            return Ok(None);
        }

        let task = Task::new(text, due_date);
        self.tasks.push(task.clone());
        tracing::info!(position = self.tasks.len() - 1, "task added");
        self.persist()?;
        Ok(Some(task))
    }

    /// Enters edit mode for `index`, discarding any draft in progress.
    /// Returns `None` and leaves the current edit state alone when `index`
    /// is out of range.
    pub fn begin_edit(&mut self, index: usize) -> Option<&EditState> {
        let text = match self.tasks.get(index) {
            Some(task) => task.text.clone(),
            None => {
                tracing::debug!(index, len = self.tasks.len(), "begin_edit out of range");
                return None;
            }
        };

        self.edit = EditState {
            index: Some(index),
            draft_text: text,
        };
        Some(&self.edit)
    }

    /// Replaces the draft text. Returns `false` when not in edit mode.
    pub fn set_draft(&mut self, text: &str) -> bool {
        if !self.edit.is_editing() {
            return false;
        }
        self.edit.draft_text = text.to_string();
        true
    }

    /// Writes the draft into the task being edited and leaves edit mode.
    ///
    /// The draft is stored verbatim, blank or not.
    pub fn commit_edit(&mut self) -> Result<Option<Task>, AppError> {
        let Some(index) = self.edit.index else {
            return Ok(None);
        };
        let draft = std::mem::take(&mut self.edit.draft_text);
        self.edit.clear();

        let Some(task) = self.tasks.get_mut(index) else {
            tracing::debug!(index, "commit_edit target no longer exists");
            return Ok(None);
        };
        task.text = draft;
        let updated = task.clone();
        tracing::info!(position = index, "task edited");
        self.persist()?;
        Ok(Some(updated))
    }

    pub fn toggle_complete(&mut self, index: usize) -> Result<Option<Task>, AppError> {
        let Some(task) = self.tasks.get_mut(index) else {
            tracing::debug!(index, len = self.tasks.len(), "toggle out of range");
            return Ok(None);
        };
        task.completed = !task.completed;
        let updated = task.clone();
        tracing::info!(position = index, completed = updated.completed, "task toggled");
        self.persist()?;
        Ok(Some(updated))
    }

    /// Removes the task at `index`; every later task moves down one position.
    pub fn remove(&mut self, index: usize) -> Result<Option<Task>, AppError> {
        if index >= self.tasks.len() {
            tracing::debug!(index, len = self.tasks.len(), "remove out of range");
            return Ok(None);
        }

        let removed = self.tasks.remove(index);
        match self.edit.index {
            Some(editing) if editing == index => self.edit.clear(),
            Some(editing) if editing > index => self.edit.index = Some(editing - 1),
            _ => {}
        }
        tracing::info!(position = index, "task removed");
        self.persist()?;
        Ok(Some(removed))
    }

    /// Drops every completed task, keeping the rest in order. Always
    /// persists, even when nothing was removed.
    pub fn clear_completed(&mut self) -> Result<Vec<Task>, AppError> {
        let edited = self.edit.index;
        let mut kept = Vec::with_capacity(self.tasks.len());
        let mut removed = Vec::new();
        let mut remapped = None;

        for (position, task) in std::mem::take(&mut self.tasks).into_iter().enumerate() {
            if task.completed {
                removed.push(task);
            } else {
                if edited == Some(position) {
                    remapped = Some(kept.len());
                }
                kept.push(task);
            }
        }
        self.tasks = kept;

        if edited.is_some() {
            match remapped {
                Some(index) => self.edit.index = Some(index),
                None => self.edit.clear(),
            }
        }

        tracing::info!(removed = removed.len(), remaining = self.tasks.len(), "completed tasks cleared");
        self.persist()?;
        Ok(removed)
    }

    fn persist(&mut self) -> Result<(), AppError> {
        json_store::save_tasks(&mut self.store, &self.tasks).inspect_err(|err| {
            tracing::error!(code = err.code(), error = %err.message(), "failed to persist task list");
        })
    }
}

/// Stable subsequence of `tasks` selected by `filter`.
pub fn filter_tasks(tasks: &[Task], filter: Filter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect()
}

/// Like [`filter_tasks`], keeping each task's position in the full list.
pub fn filter_with_positions(tasks: &[Task], filter: Filter) -> Vec<(usize, &Task)> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| filter.matches(task))
        .collect()
}

pub fn active_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| !task.completed).count()
}

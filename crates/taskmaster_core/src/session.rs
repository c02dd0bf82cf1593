//! Interactive state layered over a [`TaskList`].
//!
//! Everything here besides the task list itself is transient: the add form,
//! the selected filter and the display mode vanish with the process.

use crate::display::DisplayMode;
use crate::error::AppError;
use crate::export::{self, Document};
use crate::model::{Filter, Task};
use crate::storage::KeyValueStore;
use crate::task_list::{EditState, TaskList, filter_with_positions};

/// Pending contents of the add-task inputs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddForm {
    pub text: String,
    pub due_date: String,
}

/// What a submit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Added(Task),
    Edited(Task),
    Ignored,
}

#[derive(Debug)]
pub struct Session<S: KeyValueStore> {
    list: TaskList<S>,
    form: AddForm,
    filter: Filter,
    display_mode: DisplayMode,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(list: TaskList<S>) -> Self {
        Self {
            list,
            form: AddForm::default(),
            filter: Filter::All,
            display_mode: DisplayMode::Light,
        }
    }

    pub fn load(store: S) -> Self {
        Self::new(TaskList::load(store))
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn list(&self) -> &TaskList<S> {
        &self.list
    }

    pub fn tasks(&self) -> &[Task] {
        self.list.tasks()
    }

    pub fn form(&self) -> &AddForm {
        &self.form
    }

    pub fn edit_state(&self) -> &EditState {
        self.list.edit_state()
    }

    pub fn is_editing(&self) -> bool {
        self.list.is_editing()
    }

    /// The shared text input: feeds the edit draft in edit mode, the add
    /// form otherwise.
    pub fn set_input(&mut self, text: &str) {
        if !self.list.set_draft(text) {
            self.form.text = text.to_string();
        }
    }

    pub fn set_due_date(&mut self, due_date: &str) {
        self.form.due_date = due_date.to_string();
    }

    /// Enter on the input: commits the edit in edit mode, otherwise adds the
    /// form contents and clears the form.
    pub fn submit(&mut self) -> Result<Submitted, AppError> {
        if self.list.is_editing() {
            return Ok(match self.list.commit_edit()? {
                Some(task) => Submitted::Edited(task),
                None => Submitted::Ignored,
            });
        }

        let added = self.list.add(&self.form.text, &self.form.due_date)?;
        match added {
            Some(task) => {
                self.form = AddForm::default();
                Ok(Submitted::Added(task))
            }
            None => Ok(Submitted::Ignored),
        }
    }

    /// Fills the form and submits it. Refused while a task is being edited.
    pub fn add(&mut self, text: &str, due_date: &str) -> Result<Option<Task>, AppError> {
        if let Some(index) = self.list.edit_state().index {
            return Err(AppError::invalid_input(format!(
                "task {} is being edited; update it before adding",
                index + 1
            )));
        }

        self.form = AddForm {
            text: text.to_string(),
            due_date: due_date.to_string(),
        };
        match self.submit()? {
            Submitted::Added(task) => Ok(Some(task)),
            _ => Ok(None),
        }
    }

    pub fn begin_edit(&mut self, index: usize) -> Option<&EditState> {
        self.list.begin_edit(index)
    }

    pub fn commit_edit(&mut self) -> Result<Option<Task>, AppError> {
        self.list.commit_edit()
    }

    pub fn toggle_complete(&mut self, index: usize) -> Result<Option<Task>, AppError> {
        self.list.toggle_complete(index)
    }

    pub fn remove(&mut self, index: usize) -> Result<Option<Task>, AppError> {
        self.list.remove(index)
    }

    pub fn clear_completed(&mut self) -> Result<Vec<Task>, AppError> {
        self.list.clear_completed()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// The current filtered view, each task paired with its list position.
    pub fn visible(&self) -> Vec<(usize, &Task)> {
        filter_with_positions(self.list.tasks(), self.filter)
    }

    pub fn active_count(&self) -> usize {
        self.list.active_count()
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.display_mode = self.display_mode.toggled();
        self.display_mode
    }

    /// Document over the currently filtered view.
    pub fn export(&self) -> Document {
        export::export(&self.list.filtered(self.filter))
    }
}

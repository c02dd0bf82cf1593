use serde::{Deserialize, Serialize};

/// A single entry in the task list.
///
/// Tasks carry no identifier; their position in the list is how every
/// mutating operation addresses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// ISO `YYYY-MM-DD` date, or empty when the task has no due date.
    #[serde(rename = "dueDate", default)]
    pub due_date: String,
}

impl Task {
    pub fn new<T: Into<String>, D: Into<String>>(text: T, due_date: D) -> Self {
        Self {
            text: text.into(),
            completed: false,
            due_date: due_date.into(),
        }
    }

    pub fn has_due_date(&self) -> bool {
        !self.due_date.is_empty()
    }
}

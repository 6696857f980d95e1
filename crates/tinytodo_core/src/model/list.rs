//! Task list aggregate.
//!
//! # Responsibility
//! - Define `List`, its owned `Task` sequence and `TaskState`.
//! - Keep task ids equal to their position in the sequence.
//!
//! # Invariants
//! - `tasks[i].id == i` and `tasks[i].uid == Task::"i"` for every task.
//! - `readers`/`editors` name teams that exist for the list's lifetime
//!   (enforced by the store, checked during snapshot construction).

use crate::model::uid::{EntityType, Uid};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Completion state of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskState {
    #[default]
    Unchecked,
    Checked,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unchecked => "Unchecked",
            Self::Checked => "Checked",
        }
    }

    /// Case-insensitive parse of `Unchecked` / `Checked`.
    pub fn parse(value: &str) -> Option<Self> {
        [Self::Unchecked, Self::Checked]
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(value))
    }
}

impl Display for TaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a list. Owned exclusively by its `List`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uid: Uid,
    pub id: usize,
    pub name: String,
    pub state: TaskState,
}

impl Task {
    pub fn new(id: usize, name: impl Into<String>) -> Self {
        Self {
            uid: task_uid(id),
            id,
            name: name.into(),
            state: TaskState::Unchecked,
        }
    }

    fn renumber(&mut self, id: usize) {
        self.id = id;
        self.uid = task_uid(id);
    }
}

fn task_uid(id: usize) -> Uid {
    Uid::new(EntityType::Task, id.to_string())
}

/// Shared task list with owner and role teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub uid: Uid,
    pub name: String,
    pub owner: Uid,
    pub readers: Uid,
    pub editors: Uid,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl List {
    pub fn new(uid: Uid, name: impl Into<String>, owner: Uid, readers: Uid, editors: Uid) -> Self {
        Self {
            uid,
            name: name.into(),
            owner,
            readers,
            editors,
            tasks: Vec::new(),
        }
    }

    /// Appends a new unchecked task and returns its id (the prior task count).
    pub fn insert_task(&mut self, name: impl Into<String>) -> usize {
        let id = self.tasks.len();
        self.tasks.push(Task::new(id, name));
        id
    }

    /// Resolves a caller-supplied task index; negative or past-the-end is `None`.
    pub fn task_position(&self, index: i64) -> Option<usize> {
        usize::try_from(index)
            .ok()
            .filter(|position| *position < self.tasks.len())
    }

    /// Sets the state of the task at `position`.
    ///
    /// Returns `false` when `position` is out of range.
    pub fn set_task_state(&mut self, position: usize, state: TaskState) -> bool {
        match self.tasks.get_mut(position) {
            Some(task) => {
                task.state = state;
                true
            }
            None => false,
        }
    }

    /// Removes the task at `position` and renumbers every later task down by one.
    pub fn delete_task(&mut self, position: usize) -> Option<Task> {
        if position >= self.tasks.len() {
            return None;
        }
        let removed = self.tasks.remove(position);
        for (id, task) in self.tasks.iter_mut().enumerate().skip(position) {
            task.renumber(id);
        }
        Some(removed)
    }

    /// Ensures task ids match positions, e.g. after loading a fixture.
    pub(crate) fn normalize_task_ids(&mut self) {
        for (id, task) in self.tasks.iter_mut().enumerate() {
            task.renumber(id);
        }
    }
}

use crate::card::CardAction;
use crate::form::TaskForm;
use crate::sync::{Outcome, Request, RequestKind};
use crate::task::{sort_by_priority, Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Form,
    List,
}

/// Owns the task list as last fetched from the server, the form, and the
/// selection. It never talks to the server directly: operations return the
/// [`Request`] to dispatch, and results come back through [`TaskBoard::apply`].
#[derive(Debug, Default)]
pub struct TaskBoard {
    pub tasks: Vec<Task>,
    pub form: TaskForm,
    pub focus: Focus,
    pub selected: usize,
    pub sort_by_priority: bool,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks in display order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().collect();
        if self.sort_by_priority {
            sort_by_priority(&mut tasks);
        }
        tasks
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.tasks.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn toggle_priority_sort(&mut self) {
        self.sort_by_priority = !self.sort_by_priority;
        self.selected = 0;
    }

    /// Create or update, depending on whether the form is editing.
    pub fn submit_form(&mut self) -> Option<Request> {
        self.form.submit().map(Request::Save)
    }

    pub fn cancel_edit(&mut self) {
        self.form.cancel_edit();
    }

    /// Makes the task the form's edit target.
    pub fn begin_edit(&mut self, id: TaskId) {
        if let Some(task) = self.tasks.iter().find(|t| t.id == Some(id)) {
            self.form.begin_edit(task.clone());
            self.focus = Focus::Form;
        }
    }

    pub fn delete(&self, id: TaskId) -> Request {
        Request::Delete(id)
    }

    /// Wires a card's action to the matching board operation.
    pub fn on_card_action(&mut self, action: CardAction) -> Option<Request> {
        match action {
            CardAction::StatusChange(updated) => {
                // Echo the new status right away; the re-fetch settles it.
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
                    task.status = updated.status;
                }
                Some(Request::ChangeStatus(updated))
            }
            CardAction::Edit(id) => {
                self.begin_edit(id);
                None
            }
            CardAction::Delete(id) => Some(self.delete(id)),
        }
    }

    /// Folds a server outcome into the board.
    ///
    /// A committed update ends editing of that task, even when the re-fetch
    /// after it failed. Other failures are logged and leave everything as it was.
    pub fn apply(&mut self, outcome: Outcome) {
        if let (true, RequestKind::Save(Some(id))) = (outcome.committed, outcome.kind) {
            self.form.finish_edit(id);
        }
        match outcome.result {
            Ok(tasks) => {
                tracing::debug!(
                    target: "taskboard.board",
                    kind = ?outcome.kind,
                    count = tasks.len(),
                    "task list replaced"
                );
                self.tasks = tasks;
                self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
            }
            Err(err) => {
                tracing::error!(
                    target: "taskboard.board",
                    kind = ?outcome.kind,
                    error = %err,
                    "request failed"
                );
            }
        }
    }
}

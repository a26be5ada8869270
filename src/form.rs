use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::task::{Priority, Status, Task, TaskDraft, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
    Priority,
}

impl FormField {
    /// `None` once focus should leave the form.
    pub fn next(self) -> Option<Self> {
        match self {
            FormField::Title => Some(FormField::Description),
            FormField::Description => Some(FormField::Priority),
            FormField::Priority => None,
        }
    }
}

/// Input collection for creating and editing tasks. Never talks to the server.
#[derive(Debug, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub field: FormField,
    editing: Option<Task>,
}

impl TaskForm {
    pub fn editing(&self) -> Option<&Task> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Seeds the draft from `task`, switching to save semantics.
    pub fn begin_edit(&mut self, task: Task) {
        self.title = task.title.clone();
        self.description = task.description_text().to_string();
        self.priority = task.priority;
        self.field = FormField::Title;
        self.editing = Some(task);
    }

    /// Drops the edit target and returns to create mode.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.clear();
    }

    /// Leaves edit mode once task `id` has been saved. The fields are left
    /// alone; they were cleared on submit and may hold newer input.
    pub fn finish_edit(&mut self, id: TaskId) {
        if self.editing.as_ref().and_then(|t| t.id) == Some(id) {
            self.editing = None;
        }
    }

    fn clear(&mut self) {
        self.title.clear();
        self.description.clear();
        self.priority = Priority::default();
        self.field = FormField::Title;
    }

    /// Returns the draft and resets the fields, or `None` while the title is blank.
    ///
    /// The edit target survives a submit; the board discards it once the save
    /// has gone through.
    pub fn submit(&mut self) -> Option<TaskDraft> {
        if self.title.trim().is_empty() {
            return None;
        }
        let draft = TaskDraft {
            id: self.editing.as_ref().and_then(|t| t.id),
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            status: self.editing.as_ref().map_or(Status::Todo, |t| t.status),
            deadline: self.editing.as_ref().and_then(|t| t.deadline),
        };
        self.clear();
        Some(draft)
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Save"
        } else {
            "Create"
        }
    }

    pub fn input(&mut self, c: char) {
        match self.field {
            FormField::Title => self.title.push(c),
            FormField::Description => self.description.push(c),
            FormField::Priority => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.field {
            FormField::Title => {
                self.title.pop();
            }
            FormField::Description => {
                self.description.pop();
            }
            FormField::Priority => {}
        }
    }

    pub fn step_priority(&mut self, direction: isize) {
        self.priority = self.priority.step(direction);
    }

    pub fn render(&self, f: &mut Frame, area: Rect, focused: bool) {
        let label = |field: FormField, name: &'static str| {
            if focused && self.field == field {
                Span::styled(
                    name,
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(name)
            }
        };

        let mut buttons = vec![Span::styled(
            format!("[Enter] {}", self.submit_label()),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if self.is_editing() {
            buttons.push(Span::raw("   [Esc] Cancel"));
        }

        let lines = vec![
            Line::from(vec![label(FormField::Title, "Title:       "), Span::raw(&self.title)]),
            Line::from(vec![
                label(FormField::Description, "Description: "),
                Span::raw(&self.description),
            ]),
            Line::from(vec![
                label(FormField::Priority, "Priority:    "),
                Span::raw(format!("< {} >", self.priority.label())),
            ]),
            Line::from(buttons),
        ];

        let title = match self.editing().and_then(|t| t.id) {
            Some(id) => format!("Edit task #{id}"),
            None => "New task".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            });
        f.render_widget(Paragraph::new(lines).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};

    fn type_text(form: &mut TaskForm, text: &str) {
        text.chars().for_each(|c| form.input(c));
    }

    fn rendered(form: &TaskForm) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 6)).unwrap();
        terminal
            .draw(|f| form.render(f, f.area(), true))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn editing_task() -> Task {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Edit Task",
            "description": "Edit Desc",
            "priority": "HIGH"
        }))
        .unwrap()
    }

    #[test]
    fn empty_title_submits_nothing() {
        let mut form = TaskForm::default();
        type_text(&mut form, "   ");
        assert_eq!(form.submit(), None);
        assert_eq!(form.title, "   ");
    }

    #[test]
    fn create_submit_emits_defaults_and_clears() {
        let mut form = TaskForm::default();
        type_text(&mut form, "Neue Task");
        form.field = FormField::Description;
        type_text(&mut form, "Desc");

        let draft = form.submit().unwrap();
        assert_eq!(
            draft,
            TaskDraft {
                id: None,
                title: "Neue Task".to_string(),
                description: "Desc".to_string(),
                priority: Priority::Medium,
                status: Status::Todo,
                deadline: None,
            }
        );
        assert!(form.title.is_empty());
        assert!(form.description.is_empty());
        assert_eq!(form.priority, Priority::Medium);
    }

    #[test]
    fn edit_seeds_fields_and_keeps_id_and_status() {
        let mut task = editing_task();
        task.status = Status::InProgress;
        let mut form = TaskForm::default();
        form.begin_edit(task);
        assert_eq!(form.title, "Edit Task");
        assert_eq!(form.description, "Edit Desc");
        assert_eq!(form.priority, Priority::High);

        form.step_priority(-1);
        let draft = form.submit().unwrap();
        assert_eq!(draft.id, Some(1));
        assert_eq!(draft.status, Status::InProgress);
        assert_eq!(draft.priority, Priority::Medium);
        assert!(form.is_editing());
    }

    #[test]
    fn cancel_returns_to_create_mode() {
        let mut form = TaskForm::default();
        form.begin_edit(editing_task());
        form.cancel_edit();
        assert!(!form.is_editing());
        assert!(form.title.is_empty());
        assert_eq!(form.submit_label(), "Create");
    }

    #[test]
    fn finishing_another_task_keeps_current_edit() {
        let mut form = TaskForm::default();
        form.begin_edit(editing_task());
        form.finish_edit(2);
        assert_eq!(form.editing().and_then(|t| t.id), Some(1));
        assert_eq!(form.title, "Edit Task");

        form.finish_edit(1);
        assert!(!form.is_editing());
        assert_eq!(form.title, "Edit Task");
    }

    #[test]
    fn backspace_edits_focused_field_only() {
        let mut form = TaskForm::default();
        type_text(&mut form, "abc");
        form.field = FormField::Priority;
        form.input('x');
        form.backspace();
        assert_eq!(form.title, "abc");
        form.field = FormField::Title;
        form.backspace();
        assert_eq!(form.title, "ab");
    }

    #[test]
    fn create_mode_shows_create_button() {
        let screen = rendered(&TaskForm::default());
        assert!(screen.contains("Create"));
        assert!(!screen.contains("Save"));
        assert!(!screen.contains("Cancel"));
    }

    #[test]
    fn edit_mode_shows_save_and_cancel() {
        let mut form = TaskForm::default();
        form.begin_edit(editing_task());
        let screen = rendered(&form);
        assert!(screen.contains("Save"));
        assert!(screen.contains("Cancel"));
        assert!(!screen.contains("Create"));
    }
}

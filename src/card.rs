use crossterm::event::KeyCode;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::ListItem,
};

use crate::task::{Priority, Task, TaskId};

/// What a card asks of the board. The card performs none of these itself.
#[derive(Debug, Clone, PartialEq)]
pub enum CardAction {
    /// The task with its status replaced, ready to be sent as an update.
    StatusChange(Task),
    Edit(TaskId),
    Delete(TaskId),
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Rgb(0x48, 0xbb, 0x78),
        Priority::Medium => Color::Rgb(0xed, 0x89, 0x36),
        Priority::High => Color::Rgb(0xf5, 0x65, 0x65),
    }
}

/// Maps a key pressed on a selected card to the action it triggers.
///
/// Unsaved tasks have nothing to address on the server, so they yield nothing.
pub fn handle_key(task: &Task, code: KeyCode) -> Option<CardAction> {
    let id = task.id?;
    match code {
        KeyCode::Left | KeyCode::Right => {
            let direction = if code == KeyCode::Left { -1 } else { 1 };
            let status = task.status.step(direction);
            (status != task.status).then(|| CardAction::StatusChange(task.with_status(status)))
        }
        KeyCode::Char('e') => Some(CardAction::Edit(id)),
        KeyCode::Char('d') | KeyCode::Delete => Some(CardAction::Delete(id)),
        _ => None,
    }
}

pub fn card_item(task: &Task) -> ListItem<'_> {
    let badge = Span::styled(
        format!(" {} ", task.priority.as_str()),
        Style::default()
            .fg(Color::Black)
            .bg(priority_color(task.priority)),
    );
    let mut header = vec![
        Span::styled(&task.title, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        badge,
    ];
    if task.is_overdue() {
        header.push(Span::styled(
            "  OVERDUE",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let status = Line::from(vec![
        Span::raw("  Status: "),
        Span::styled(
            format!("< {} >", task.status.label()),
            Style::default().fg(Color::Cyan),
        ),
    ]);

    let mut lines = vec![Line::from(header)];
    if !task.description_text().is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", task.description_text()),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.push(status);
    lines.push(Line::default());
    ListItem::new(Text::from(lines))
}

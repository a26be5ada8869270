use crate::board::{Focus, TaskBoard};
use crate::card;
use crate::client::TaskClient;
use crate::events::InputReader;
use crate::form::FormField;
use crate::sync::{self, Request};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use tokio::sync::mpsc;

#[derive(Debug, PartialEq)]
pub enum Control {
    Continue,
    Quit,
    Dispatch(Request),
}

pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    board: &mut TaskBoard,
    client: &TaskClient,
) -> io::Result<()> {
    let (input, keys) = InputReader::start();
    let result = run_app_with(terminal, board, client, keys).await;
    input.stop();
    result
}

/// Event loop over an arbitrary key source. Loads the task list on entry and
/// returns on quit or once `keys` closes.
pub async fn run_app_with<B: Backend>(
    terminal: &mut Terminal<B>,
    board: &mut TaskBoard,
    client: &TaskClient,
    mut keys: mpsc::UnboundedReceiver<KeyEvent>,
) -> io::Result<()> {
    let (outcome_tx, mut outcomes) = mpsc::unbounded_channel();
    sync::dispatch(client, Request::Load, outcome_tx.clone());

    loop {
        terminal.draw(|f| draw(f, board))?;

        tokio::select! {
            biased;
            Some(outcome) = outcomes.recv() => board.apply(outcome),
            key = keys.recv() => {
                let Some(key) = key else { return Ok(()) };
                match handle_key(board, key) {
                    Control::Continue => {}
                    Control::Quit => return Ok(()),
                    Control::Dispatch(request) => {
                        tracing::info!(target: "taskboard.ui", kind = ?request.kind(), "dispatching");
                        sync::dispatch(client, request, outcome_tx.clone());
                    }
                }
            }
        }
    }
}

pub fn handle_key(board: &mut TaskBoard, key: KeyEvent) -> Control {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Control::Quit;
    }
    match board.focus {
        Focus::Form => handle_form_key(board, key.code),
        Focus::List => handle_list_key(board, key.code),
    }
}

fn handle_form_key(board: &mut TaskBoard, code: KeyCode) -> Control {
    let form = &mut board.form;
    match code {
        KeyCode::Enter => {
            if let Some(request) = board.submit_form() {
                return Control::Dispatch(request);
            }
        }
        KeyCode::Tab => match form.field.next() {
            Some(field) => form.field = field,
            None => {
                form.field = FormField::Title;
                board.focus = Focus::List;
            }
        },
        KeyCode::Esc => {
            if form.is_editing() {
                board.cancel_edit();
            } else {
                board.focus = Focus::List;
            }
        }
        KeyCode::Left if form.field == FormField::Priority => form.step_priority(-1),
        KeyCode::Right if form.field == FormField::Priority => form.step_priority(1),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.input(c),
        _ => {}
    }
    Control::Continue
}

fn handle_list_key(board: &mut TaskBoard, code: KeyCode) -> Control {
    match code {
        KeyCode::Char('q') => return Control::Quit,
        KeyCode::Up | KeyCode::Char('k') => board.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => board.select_next(),
        KeyCode::Char('r') => return Control::Dispatch(Request::Load),
        KeyCode::Char('s') => board.toggle_priority_sort(),
        KeyCode::Char('n') | KeyCode::Tab => {
            board.form.field = FormField::Title;
            board.focus = Focus::Form;
        }
        _ => {
            let action = board
                .selected_task()
                .and_then(|task| card::handle_key(task, code));
            if let Some(request) = action.and_then(|a| board.on_card_action(a)) {
                return Control::Dispatch(request);
            }
        }
    }
    Control::Continue
}

pub fn draw(f: &mut Frame, board: &TaskBoard) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let mut header = vec![Span::styled(
        "Task Management",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    header.push(Span::raw(format!("  ({} tasks)", board.tasks.len())));
    if board.sort_by_priority {
        header.push(Span::raw("  sorted by priority"));
    }
    f.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

    board.form.render(f, chunks[1], board.focus == Focus::Form);

    let list_focused = board.focus == Focus::List;
    let items: Vec<_> = board
        .visible_tasks()
        .into_iter()
        .map(card::card_item)
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title("Tasks")
                .borders(Borders::ALL)
                .border_style(if list_focused {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                }),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if list_focused && !board.tasks.is_empty() {
        state.select(Some(board.selected));
    }
    f.render_stateful_widget(list, chunks[2], &mut state);

    let help = if list_focused {
        "↑/↓ select  ←/→ status  e edit  d delete  s sort  r refresh  n new  q quit"
    } else {
        "Tab next field  ←/→ priority  Esc back  Ctrl-C quit"
    };
    f.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))),
        chunks[3],
    );
}

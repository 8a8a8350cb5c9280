//! Main application logic for the terminal user interface.
//!
//! `App` is a thin view over [`TaskListController`]: it renders the
//! controller's state and turns key presses into controller calls. Async
//! controller calls are driven to completion on the runtime handle before the
//! next key is read.

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Handle;

use crate::cache::LocalCache;
use crate::controller::{Confirmation, EditState, TaskListController};
use crate::error::Error;
use crate::fields::{Filter, Status};
use crate::list::{format_checkbox, format_created_relative, TaskCounts};
use crate::remote::RemoteStore;
use crate::task::TaskId;
use crate::tui::{
    colors::{DARK_GREEN, DARK_PURPLE, DARK_RED, GOLD},
    enums::{AppState, KeyOutcome},
    input::InputField,
    utils::centered_rect,
};

const FILTERS: [Filter; 3] = [Filter::All, Filter::Pending, Filter::Completed];

pub struct App<R, C> {
    rt: Handle,
    controller: TaskListController<R, C>,
    state: AppState,
    table_state: TableState,
    add_input: InputField,
    edit_input: InputField,
    pending_confirm: Option<Confirmation>,
    status_message: String,
    status_is_error: bool,
}

impl<R: RemoteStore, C: LocalCache> App<R, C> {
    pub fn new(rt: Handle, controller: TaskListController<R, C>) -> Self {
        let mut app = App {
            rt,
            controller,
            state: AppState::TaskList,
            table_state: TableState::default(),
            add_input: InputField::new(),
            edit_input: InputField::new(),
            pending_confirm: None,
            status_message: String::new(),
            status_is_error: false,
        };
        app.clamp_selection();
        app
    }

    pub fn controller(&self) -> &TaskListController<R, C> {
        &self.controller
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Load the list once at startup.
    pub fn hydrate(&mut self) {
        let result = self.rt.block_on(self.controller.hydrate());
        match result {
            Ok(source) => self.set_status_message(format!(
                "Loaded {} task(s) from {:?}",
                self.controller.tasks().len(),
                source
            )),
            Err(e) => self.set_error(&e),
        }
        self.clamp_selection();
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
        self.status_is_error = false;
    }

    fn set_error(&mut self, e: &Error) {
        self.status_message = format!("Error ({}): {}", e.kind(), e);
        self.status_is_error = true;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
        self.status_is_error = false;
    }

    fn selected_id(&self) -> Option<TaskId> {
        let idx = self.table_state.selected()?;
        self.controller.visible_tasks().get(idx).map(|t| t.id.clone())
    }

    /// Keep the selection inside the visible list.
    fn clamp_selection(&mut self) {
        let len = self.controller.visible_tasks().len();
        match (len, self.table_state.selected()) {
            (0, _) => self.table_state.select(None),
            (_, None) => self.table_state.select(Some(0)),
            (n, Some(i)) if i >= n => self.table_state.select(Some(n - 1)),
            _ => {}
        }
    }

    fn select_id(&mut self, id: &TaskId) {
        let idx = self.controller.visible_tasks().iter().position(|t| &t.id == id);
        if idx.is_some() {
            self.table_state.select(idx);
        }
        self.clamp_selection();
    }

    fn set_filter(&mut self, filter: Filter) {
        self.controller.set_filter(filter);
        self.table_state.select(None);
        self.clamp_selection();
    }

    // ---- input ----

    /// Handle keyboard input on the task list.
    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> KeyOutcome {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return KeyOutcome::Quit,
            KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(selected) = self.table_state.selected() {
                    self.table_state.select(Some(selected.saturating_sub(1)));
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(selected) = self.table_state.selected() {
                    if selected + 1 < self.controller.visible_tasks().len() {
                        self.table_state.select(Some(selected + 1));
                    }
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    let result = self.rt.block_on(self.controller.toggle(&id));
                    match result {
                        Ok(()) => self.set_status_message(format!("Toggled task {id}")),
                        Err(e) => self.set_error(&e),
                    }
                    self.clamp_selection();
                }
            }
            KeyCode::Char('a') | KeyCode::Char('i') => {
                self.add_input = InputField::with_value(self.controller.draft_name());
                self.state = AppState::AddTask;
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    match self.controller.begin_edit(&id) {
                        Ok(()) => {
                            if let EditState::Editing { draft, .. } = self.controller.edit_state() {
                                self.edit_input = InputField::with_value(draft);
                            }
                            self.state = AppState::EditTask;
                        }
                        Err(e) => self.set_error(&e),
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    match self.controller.request_delete(&id) {
                        Ok(confirmation) => self.ask(confirmation),
                        Err(e) => self.set_error(&e),
                    }
                }
            }
            KeyCode::Char('c') => match self.controller.request_clear_completed() {
                Some(confirmation) => self.ask(confirmation),
                None => self.set_status_message("No completed tasks to clear".to_string()),
            },
            KeyCode::Char('X') => match self.controller.request_clear_all() {
                Some(confirmation) => self.ask(confirmation),
                None => self.set_status_message("No tasks to clear".to_string()),
            },
            KeyCode::Tab | KeyCode::Char('f') => {
                let next = self.controller.filter().next();
                self.set_filter(next);
            }
            KeyCode::Char('1') => self.set_filter(Filter::All),
            KeyCode::Char('2') => self.set_filter(Filter::Pending),
            KeyCode::Char('3') => self.set_filter(Filter::Completed),
            KeyCode::Char('r') => {
                let result = self.rt.block_on(self.controller.refresh());
                match result {
                    Ok(()) => self.set_status_message(format!(
                        "Refreshed: {} task(s)",
                        self.controller.tasks().len()
                    )),
                    Err(e) => self.set_error(&e),
                }
                self.clamp_selection();
            }
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn ask(&mut self, confirmation: Confirmation) {
        self.pending_confirm = Some(confirmation);
        self.state = AppState::Confirm;
    }

    /// Shared line-editing keys; returns true if the key was consumed.
    fn edit_field(field: &mut InputField, key: KeyCode) -> bool {
        match key {
            KeyCode::Char(c) => field.handle_char(c),
            KeyCode::Backspace => field.handle_backspace(),
            KeyCode::Delete => field.handle_delete(),
            KeyCode::Left => field.move_cursor_left(),
            KeyCode::Right => field.move_cursor_right(),
            KeyCode::Home => field.move_home(),
            KeyCode::End => field.move_end(),
            _ => return false,
        }
        true
    }

    fn handle_add_input(&mut self, key: KeyCode) -> KeyOutcome {
        match key {
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Enter => {
                if self.controller.is_submitting() {
                    return KeyOutcome::Continue;
                }
                let result = self.rt.block_on(self.controller.create());
                match result {
                    Ok(task) => {
                        let (id, name) = (task.id.clone(), task.name.clone());
                        self.add_input.clear();
                        self.set_status_message(format!("Added \"{name}\""));
                        self.select_id(&id);
                    }
                    Err(e) => self.set_error(&e),
                }
            }
            other => {
                if Self::edit_field(&mut self.add_input, other) {
                    self.controller.set_draft_name(self.add_input.value.clone());
                }
            }
        }
        KeyOutcome::Continue
    }

    fn handle_edit_input(&mut self, key: KeyCode) -> KeyOutcome {
        match key {
            KeyCode::Esc => {
                self.controller.cancel_edit();
                self.state = AppState::TaskList;
            }
            KeyCode::Enter => {
                let result = self.rt.block_on(self.controller.confirm_edit());
                match result {
                    Ok(()) => {
                        self.set_status_message("Renamed".to_string());
                        self.state = AppState::TaskList;
                    }
                    Err(e) => self.set_error(&e),
                }
                self.clamp_selection();
            }
            other => {
                if Self::edit_field(&mut self.edit_input, other) {
                    self.controller.set_edit_draft(self.edit_input.value.clone());
                }
            }
        }
        KeyOutcome::Continue
    }

    /// Handle keyboard input in the confirmation dialog.
    fn handle_confirm_input(&mut self, key: KeyCode) -> KeyOutcome {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(confirmation) = self.pending_confirm.take() {
                    let prompt = confirmation.prompt();
                    let result = self.rt.block_on(self.controller.confirm(confirmation));
                    match result {
                        Ok(()) => self.set_status_message(format!("Done: {}", prompt.trim_end_matches('?'))),
                        Err(e) => self.set_error(&e),
                    }
                }
                self.state = AppState::TaskList;
                self.clamp_selection();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.pending_confirm = None;
                self.state = AppState::TaskList;
            }
            _ => {}
        }
        KeyOutcome::Continue
    }

    /// Dispatch one key press according to the current screen.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> KeyOutcome {
        match self.state {
            AppState::TaskList => {
                self.clear_status_message();
                self.handle_task_list_input(key, modifiers)
            }
            AppState::AddTask => self.handle_add_input(key),
            AppState::EditTask => self.handle_edit_input(key),
            AppState::Confirm => self.handle_confirm_input(key),
            AppState::Help => {
                self.state = AppState::TaskList;
                KeyOutcome::Continue
            }
        }
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(false);
                }
                return Ok(self.handle_key(key.code, key.modifiers) == KeyOutcome::Quit);
            }
        }
        Ok(false)
    }

    // ---- rendering ----

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let counts = self.controller.counts();
        let header_text = Line::from(vec![
            Span::styled("TASK LIST", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!(
                    "{} pending · {} completed · {} total",
                    counts.pending, counts.completed, counts.total
                ),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]);
        let header = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_filter_tabs(&self, f: &mut Frame, area: Rect, counts: TaskCounts) {
        let titles: Vec<Line> = FILTERS
            .iter()
            .map(|filter| {
                let n = match filter {
                    Filter::All => counts.total,
                    Filter::Pending => counts.pending,
                    Filter::Completed => counts.completed,
                };
                Line::from(format!("{} ({})", filter.label(), n))
            })
            .collect();
        let selected = FILTERS
            .iter()
            .position(|&x| x == self.controller.filter())
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .highlight_style(Style::default().fg(Color::Black).bg(GOLD))
            .divider("|");
        f.render_widget(tabs, area);
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let now = Local::now().naive_local();
        let editing = match self.controller.edit_state() {
            EditState::Editing { task_id, .. } if self.state == AppState::EditTask => Some(task_id.clone()),
            _ => None,
        };

        let rows: Vec<Row> = self
            .controller
            .visible_tasks()
            .into_iter()
            .map(|task| {
                let is_editing = editing.as_ref() == Some(&task.id);
                let name = if is_editing {
                    self.edit_input.value.clone()
                } else {
                    task.name.clone()
                };
                let style = if is_editing {
                    Style::default().bg(DARK_PURPLE).fg(Color::White)
                } else {
                    match task.status {
                        Status::Completed => Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT),
                        Status::Pending => Style::default().fg(Color::White),
                    }
                };
                Row::new(vec![
                    Cell::from(format_checkbox(task.status)),
                    Cell::from(name),
                    Cell::from(format_created_relative(task.created_at, now)),
                ])
                .style(style)
            })
            .collect();

        let header = Row::new(["", "Name", "Created"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(DARK_GREEN).fg(Color::White))
        .height(1);

        let widths = [Constraint::Length(4), Constraint::Min(20), Constraint::Length(10)];
        let empty = rows.is_empty();
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                self.controller.visible_tasks().len(),
                self.controller.tasks().len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        if empty {
            let text = if self.controller.tasks().is_empty() {
                "No tasks yet. Press 'a' to add your first task!"
            } else {
                "No tasks match this filter."
            };
            let msg = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Tasks"));
            f.render_widget(msg, area);
        } else {
            f.render_stateful_widget(table, area, &mut self.table_state);
        }

        if let Some(id) = editing {
            let row = self
                .controller
                .visible_tasks()
                .iter()
                .position(|t| t.id == id)
                .map(|i| i.saturating_sub(self.table_state.offset()));
            if let Some(row) = row {
                // border + header + row, then the highlight symbol and checkbox column
                let x = area.x + 1 + 3 + 5 + self.edit_input.cursor_column();
                let y = area.y + 2 + row as u16;
                f.set_cursor_position(Position::new(x, y));
            }
        }
    }

    fn render_add_form(&self, f: &mut Frame, area: Rect) {
        let active = self.state == AppState::AddTask;
        let submitting = self.controller.is_submitting();
        let border = if submitting {
            Style::default().fg(Color::DarkGray)
        } else if active {
            Style::default().fg(GOLD)
        } else {
            Style::default()
        };
        let text = if self.add_input.value.is_empty() && !active {
            Span::styled("Press 'a' to add a new task...", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(self.add_input.value.clone())
        };
        let title = if active {
            "New task (Enter to add, Esc to leave)"
        } else {
            "New task"
        };
        let paragraph = Paragraph::new(Line::from(text))
            .block(Block::default().borders(Borders::ALL).title(title).border_style(border));
        f.render_widget(paragraph, area);

        if active {
            f.set_cursor_position(Position::new(
                area.x + 1 + self.add_input.cursor_column(),
                area.y + 1,
            ));
        }
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(vec![Span::styled("Task List Help", bold)]),
            Line::from(""),
            Line::from(vec![Span::styled("List:", bold)]),
            Line::from("  ↑/↓, k/j     Move selection"),
            Line::from("  Space/Enter  Toggle completed"),
            Line::from("  a/i          Add a new task"),
            Line::from("  e            Rename selected task"),
            Line::from("  d/Del        Delete selected task"),
            Line::from("  c            Clear completed tasks"),
            Line::from("  X            Clear all tasks"),
            Line::from("  Tab/f        Cycle filter (All → Pending → Completed)"),
            Line::from("  1/2/3        Show all / pending / completed"),
            Line::from("  r            Re-fetch from the server"),
            Line::from("  h/F1         Show this help"),
            Line::from("  q/Esc/Ctrl+C Quit"),
            Line::from(""),
            Line::from(vec![Span::styled("Add / Rename:", bold)]),
            Line::from("  Enter        Save"),
            Line::from("  Esc          Leave (rename draft is discarded)"),
            Line::from(""),
            Line::from(vec![Span::styled("Confirm:", bold)]),
            Line::from("  y/Enter      Go ahead"),
            Line::from("  n/Esc        Cancel"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press any key to return"),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let prompt = self
            .pending_confirm
            .as_ref()
            .map(Confirmation::prompt)
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(prompt, Style::default().add_modifier(Modifier::BOLD))]),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "Filter: {} | Press 'h' for help",
                    self.controller.filter().label()
                ),
                AppState::AddTask => "Add Task".to_string(),
                AppState::EditTask => "Rename Task (Enter to save, Esc to cancel)".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };
        let bg = if self.status_is_error { DARK_RED } else { DARK_GREEN };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(bg).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        if self.state == AppState::Help {
            self.render_help(f, chunks[0]);
            self.render_status_bar(f, chunks[1]);
            return;
        }

        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // header
                Constraint::Length(1), // filter tabs
                Constraint::Min(0),    // list
                Constraint::Length(3), // add form
            ])
            .split(chunks[0]);

        self.render_header(f, body[0]);
        self.render_filter_tabs(f, body[1], self.controller.counts());
        self.render_task_list(f, body[2]);
        self.render_add_form(f, body[3]);
        if self.state == AppState::Confirm {
            self.render_confirm(f, chunks[0]);
        }
        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::remote::{MemoryRemote, RemoteCall};
    use crate::task::Task;
    use ratatui::backend::TestBackend;

    fn task(id: u64, name: &str, status: Status) -> Task {
        Task {
            id: TaskId::from(id),
            name: name.to_string(),
            status,
            created_at: None,
        }
    }

    fn app(rt: &tokio::runtime::Runtime, tasks: Vec<Task>) -> App<MemoryRemote, MemoryCache> {
        let controller = TaskListController::new(MemoryRemote::with_tasks(tasks), MemoryCache::new());
        let mut app = App::new(rt.handle().clone(), controller);
        app.hydrate();
        app
    }

    fn press(app: &mut App<MemoryRemote, MemoryCache>, keys: &[KeyCode]) {
        for &k in keys {
            app.handle_key(k, KeyModifiers::NONE);
        }
    }

    fn type_text(app: &mut App<MemoryRemote, MemoryCache>, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn add_task_through_form() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt, vec![]);
        press(&mut app, &[KeyCode::Char('a')]);
        assert_eq!(app.state(), AppState::AddTask);
        type_text(&mut app, "Buy milk");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.controller().tasks().len(), 1);
        assert_eq!(app.controller().tasks()[0].name, "Buy milk");
        assert_eq!(app.controller().draft_name(), "");
        press(&mut app, &[KeyCode::Esc]);
        assert_eq!(app.state(), AppState::TaskList);
    }

    #[test]
    fn blank_add_shows_validation_error() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt, vec![]);
        press(&mut app, &[KeyCode::Char('a'), KeyCode::Char(' '), KeyCode::Enter]);
        assert!(app.controller().tasks().is_empty());
        assert!(app.status_message().contains("validation"));
    }

    #[test]
    fn space_toggles_selected() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt, vec![task(1, "a", Status::Pending), task(2, "b", Status::Pending)]);
        press(&mut app, &[KeyCode::Down, KeyCode::Char(' ')]);
        assert_eq!(app.controller().tasks()[0].status, Status::Pending);
        assert_eq!(app.controller().tasks()[1].status, Status::Completed);
    }

    #[test]
    fn rename_inline_and_cancel() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt, vec![task(1, "old", Status::Pending)]);
        press(&mut app, &[KeyCode::Char('e'), KeyCode::Backspace, KeyCode::Backspace, KeyCode::Backspace]);
        type_text(&mut app, "new");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.controller().tasks()[0].name, "new");
        assert_eq!(app.state(), AppState::TaskList);

        press(&mut app, &[KeyCode::Char('e')]);
        type_text(&mut app, " ignored");
        press(&mut app, &[KeyCode::Esc]);
        assert_eq!(app.controller().tasks()[0].name, "new");
        assert_eq!(app.controller().edit_state(), &EditState::Viewing);
    }

    #[test]
    fn empty_rename_stays_in_edit_mode() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt, vec![task(1, "ab", Status::Pending)]);
        press(&mut app, &[KeyCode::Char('e'), KeyCode::Backspace, KeyCode::Backspace, KeyCode::Enter]);
        assert_eq!(app.state(), AppState::EditTask);
        assert!(matches!(app.controller().edit_state(), EditState::Editing { .. }));
        assert_eq!(app.controller().tasks()[0].name, "ab");
    }

    #[test]
    fn delete_requires_confirmation() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt, vec![task(1, "a", Status::Pending)]);
        press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('n')]);
        assert_eq!(app.controller().tasks().len(), 1);
        press(&mut app, &[KeyCode::Char('d')]);
        assert_eq!(app.state(), AppState::Confirm);
        press(&mut app, &[KeyCode::Char('y')]);
        assert!(app.controller().tasks().is_empty());
        assert_eq!(app.state(), AppState::TaskList);
    }

    #[test]
    fn clear_completed_without_completed_skips_dialog() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt, vec![task(1, "a", Status::Pending)]);
        press(&mut app, &[KeyCode::Char('c')]);
        assert_eq!(app.state(), AppState::TaskList);
        assert!(!app.controller().remote().calls().contains(&RemoteCall::ClearCompleted));
    }

    #[test]
    fn filter_keys_switch_view() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt, vec![task(1, "a", Status::Pending), task(2, "b", Status::Completed)]);
        press(&mut app, &[KeyCode::Char('3')]);
        assert_eq!(app.controller().filter(), Filter::Completed);
        assert_eq!(app.controller().visible_tasks().len(), 1);
        press(&mut app, &[KeyCode::Tab]);
        assert_eq!(app.controller().filter(), Filter::All);
    }

    #[test]
    fn renders_without_panicking() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&rt, vec![task(1, "a", Status::Pending), task(2, "b", Status::Completed)]);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        press(&mut app, &[KeyCode::Char('d')]);
        terminal.draw(|f| app.render(f)).unwrap();
        press(&mut app, &[KeyCode::Esc, KeyCode::Char('h')]);
        terminal.draw(|f| app.render(f)).unwrap();
    }
}

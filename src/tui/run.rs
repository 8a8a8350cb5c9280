//! Terminal setup and teardown around the task list UI.

use std::io;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tokio::runtime::Handle;

use crate::cache::LocalCache;
use crate::controller::TaskListController;
use crate::remote::RemoteStore;
use crate::tui::app::App;

/// Take over the terminal, load the list and run until the user quits.
///
/// A failed initial load is shown in the status bar; the UI still opens so
/// the user can retry with a refresh.
pub fn run_tui<R: RemoteStore, C: LocalCache>(
    rt: Handle,
    controller: TaskListController<R, C>,
) -> io::Result<()> {
    let mut app = App::new(rt, controller);
    app.hydrate();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

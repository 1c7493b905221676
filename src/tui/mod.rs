mod app;
mod clipboard;
mod ui;

use crate::document::Document;
use crate::search::PointerTarget;
use crate::utils::{AppConfig, UiState};
use anyhow::Result;
use app::{App, Focus, Mode};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Idle poll interval
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll interval while a scroll animation runs
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub fn run(
    path: PathBuf,
    doc: Document,
    config: &AppConfig,
    state: UiState,
    data_dir: Option<PathBuf>,
    initial_query: Option<String>,
    section: Option<String>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Clear the terminal to prevent any artifacts from previous content
    terminal.clear()?;

    let mut app = App::new(path, doc, config, state, data_dir);

    if let Some(id) = section
        && !app.open_anchor(&id)
    {
        app.status_message = format!("No section #{id}");
    }

    if let Some(query) = initial_query {
        app.set_query(&query, Instant::now());
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let size = terminal.size()?;
        let screen = Rect::new(0, 0, size.width, size.height);
        let areas = ui::areas(screen, app);
        app.set_terminal_size(size.width, areas.document_rows());

        app.tick(Instant::now());
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(poll_timeout(app))? {
            continue;
        }

        match event::read()? {
            // Only handle key press events, not release or repeat
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key(app, key) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => {
                // Regions may have changed since the last draw
                let areas = ui::areas(screen, app);
                handle_mouse(app, mouse, &areas);
            }
            _ => {}
        }
    }
}

/// Wake up in time for a due debounce timer or the next animation frame
fn poll_timeout(app: &App) -> Duration {
    if app.viewport.is_animating() {
        return FRAME_INTERVAL;
    }
    match app.session.next_deadline() {
        Some(deadline) => deadline
            .saturating_duration_since(Instant::now())
            .clamp(Duration::from_millis(1), POLL_INTERVAL),
        None => POLL_INTERVAL,
    }
}

/// Returns true when the app should quit
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    let now = Instant::now();

    // Global keybindings
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (KeyModifiers::CONTROL, KeyCode::Char('q')) => {
            return true;
        }
        _ => {}
    }

    if app.mode == Mode::Help {
        // Any key closes help
        app.hide_help();
        return false;
    }

    match (key.modifiers, key.code) {
        (_, KeyCode::F(1)) => {
            app.show_help();
            return false;
        }
        (_, KeyCode::F(2)) | (KeyModifiers::CONTROL, KeyCode::Char('t')) => {
            app.toggle_theme();
            return false;
        }
        (_, KeyCode::F(3)) | (KeyModifiers::CONTROL, KeyCode::Char('o')) => {
            app.toggle_outline();
            return false;
        }
        (_, KeyCode::Tab) => {
            app.cycle_focus(true);
            return false;
        }
        (_, KeyCode::BackTab) => {
            app.cycle_focus(false);
            return false;
        }
        _ => {}
    }

    match app.focus {
        Focus::Search => handle_search_key(app, key, now),
        Focus::Outline => {
            handle_outline_key(app, key);
            false
        }
        Focus::Document => {
            handle_document_key(app, key);
            false
        }
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent, now: Instant) -> bool {
    match (key.modifiers, key.code) {
        // Vim: Ctrl+j/Ctrl+n - select next result
        (KeyModifiers::CONTROL, KeyCode::Char('j')) | (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
            app.select_next_result()
        }
        // Vim: Ctrl+k/Ctrl+p - select previous result
        (KeyModifiers::CONTROL, KeyCode::Char('k')) | (KeyModifiers::CONTROL, KeyCode::Char('p')) => {
            app.select_prev_result()
        }
        // Vim: Ctrl+w - delete word backward
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => app.delete_word(now),
        // Vim: Ctrl+h - backspace (terminal standard)
        (KeyModifiers::CONTROL, KeyCode::Char('h')) => app.pop_char(now),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
            KeyCode::Esc => {
                if app.session.is_panel_visible() {
                    app.session.dismiss();
                } else if !app.query.is_empty() {
                    app.clear_query(now);
                } else {
                    return true;
                }
            }
            KeyCode::Enter => app.open_selected_result(),
            KeyCode::Down => app.select_next_result(),
            KeyCode::Up => app.select_prev_result(),
            KeyCode::PageDown => app.scroll_rows(10),
            KeyCode::PageUp => app.scroll_rows(-10),
            KeyCode::Char(c) => app.push_char(c, now),
            KeyCode::Backspace => app.pop_char(now),
            _ => {}
        },
        _ => {}
    }
    false
}

fn handle_outline_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.outline_view.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.outline_view.select_prev(),
        KeyCode::Enter | KeyCode::Char('l') => app.open_selected_outline_entry(),
        KeyCode::Esc | KeyCode::Char('/') => app.focus = Focus::Search,
        KeyCode::Char('?') => app.show_help(),
        _ => {}
    }
}

fn handle_document_key(app: &mut App, key: KeyEvent) {
    // Handle pending 'g' key for gg command
    if app.pending_key == Some('g') {
        app.clear_pending_key();
        if key.code == KeyCode::Char('g') {
            app.scroll_to_top();
            return;
        }
        // If not 'g', fall through to normal handling
    }

    match (key.modifiers, key.code) {
        // Vim: Ctrl+d - half-page down
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => app.scroll_rows(10),
        // Vim: Ctrl+u - half-page up
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => app.scroll_rows(-10),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
            KeyCode::Down | KeyCode::Char('j') => app.scroll_rows(1),
            KeyCode::Up | KeyCode::Char('k') => app.scroll_rows(-1),
            KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_rows(20),
            KeyCode::PageUp => app.scroll_rows(-20),
            KeyCode::Home | KeyCode::Char('t') => app.scroll_to_top(),
            KeyCode::End | KeyCode::Char('G') => app.scroll_to_bottom(),
            // Start 'gg' sequence for vim-style go to top
            KeyCode::Char('g') => app.pending_key = Some('g'),
            KeyCode::Char('y') | KeyCode::Char('c') => app.copy_code_block(),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('/') => app.focus = Focus::Search,
            KeyCode::Char('?') => app.show_help(),
            _ => {}
        },
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, areas: &ui::Areas) {
    let position = ratatui::layout::Position::new(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_rows(3),
        MouseEventKind::ScrollUp => app.scroll_rows(-3),
        MouseEventKind::Down(MouseButton::Left) => {
            if app.mode == Mode::Help {
                app.hide_help();
                return;
            }

            if areas.input.contains(position) {
                app.pointer(PointerTarget::Input);
                app.focus = Focus::Search;
                return;
            }

            if let Some(results) = areas.results
                && results.contains(position)
            {
                app.pointer(PointerTarget::Panel);
                let selected = app.session.panel().map(|p| p.selected()).unwrap_or(0);
                if let Some(index) = ui::row_to_index(results, mouse.row, selected) {
                    app.open_result(index);
                }
                return;
            }

            // Everything below is outside the input and the panel
            app.pointer(PointerTarget::Elsewhere);

            if let Some(button) = areas.scroll_top
                && button.contains(position)
            {
                app.scroll_to_top();
            } else if let Some(outline) = areas.outline
                && outline.contains(position)
            {
                app.focus = Focus::Outline;
                let selected = app.outline_view.selected();
                if let Some(index) = ui::row_to_index(outline, mouse.row, selected) {
                    app.open_outline_entry(index);
                }
            } else if areas.document.contains(position) {
                app.focus = Focus::Document;
            }
        }
        _ => {}
    }
}

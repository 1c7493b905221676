use super::clipboard::SystemClipboard;
use crate::document::{Document, ElementRef, Navigator};
use crate::outline::{Outline, OutlineContainer, build_outline};
use crate::search::{PointerTarget, SearchOptions, SearchSession};
use crate::theme::Theme;
use crate::utils::{AppConfig, UiState};
use crate::viewport::Viewport;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Terminals narrower than this collapse the outline sidebar
pub const NARROW_WIDTH: u16 = 80;

/// Which pane receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Outline,
    Document,
}

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Help,
}

/// Application state
pub struct App {
    pub doc: Document,
    pub path: PathBuf,
    pub outline: Outline,
    pub outline_view: OutlineContainer,
    pub session: SearchSession,
    pub viewport: Viewport,
    pub query: String,
    pub focus: Focus,
    pub mode: Mode,
    pub theme: Theme,
    /// Sidebar toggled open by the user
    pub outline_open: bool,
    /// Terminal too narrow for a permanent sidebar
    pub narrow: bool,
    /// Pending key for vim multi-key commands (e.g., 'g' for 'gg')
    pub pending_key: Option<char>,
    pub status_message: String,
    /// Source file date for the status bar
    pub last_updated: Option<String>,
    /// Where viewer state is saved; None disables persistence
    data_dir: Option<PathBuf>,
    clipboard: SystemClipboard,
}

impl App {
    pub fn new(
        path: PathBuf,
        mut doc: Document,
        config: &AppConfig,
        state: UiState,
        data_dir: Option<PathBuf>,
    ) -> Self {
        let mut outline_view = OutlineContainer::new();
        let outline = build_outline(&mut doc, Some(&mut outline_view));
        let viewport = Viewport::new(&doc).with_scroll_top_threshold(config.scroll_top_threshold);
        let session = SearchSession::new(SearchOptions::from(config));

        let status_message = format!(
            "{} ({} sections)",
            doc.title
                .clone()
                .unwrap_or_else(|| path.file_name().unwrap_or_default().to_string_lossy().into_owned()),
            outline.len()
        );
        let last_updated = doc.last_updated_label();

        Self {
            doc,
            path,
            outline,
            outline_view,
            session,
            viewport,
            query: String::new(),
            focus: Focus::Search,
            mode: Mode::Browse,
            theme: state.theme,
            outline_open: true,
            narrow: false,
            pending_key: None,
            status_message,
            last_updated,
            data_dir,
            clipboard: SystemClipboard::default(),
        }
    }

    /// Run due timers and animation. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let searched = self.session.poll(now, &self.doc);
        let scrolled = self.viewport.tick();
        searched || scrolled
    }

    /// Whether the sidebar is currently shown
    pub fn outline_visible(&self) -> bool {
        self.outline_open && !self.outline_view.is_empty()
    }

    pub fn set_terminal_size(&mut self, width: u16, doc_rows: u16) {
        let narrow = width < NARROW_WIDTH;
        if narrow && !self.narrow {
            self.outline_open = false;
        }
        self.narrow = narrow;
        self.viewport.set_view_rows(doc_rows);
    }

    // Query editing

    pub fn set_query(&mut self, query: &str, now: Instant) {
        self.query = query.to_string();
        self.session.on_input(&self.query, now);
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        self.query.push(c);
        self.session.on_input(&self.query, now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        self.query.pop();
        self.session.on_input(&self.query, now);
    }

    /// Delete word backward from query (vim Ctrl+w)
    pub fn delete_word(&mut self, now: Instant) {
        // Remove trailing whitespace first
        while self.query.ends_with(' ') {
            self.query.pop();
        }
        // Remove word characters
        while !self.query.is_empty() && !self.query.ends_with(' ') {
            self.query.pop();
        }
        self.session.on_input(&self.query, now);
    }

    pub fn clear_query(&mut self, now: Instant) {
        self.set_query("", now);
    }

    // Result panel

    pub fn select_next_result(&mut self) {
        if let Some(panel) = self.session.panel_mut() {
            panel.select_next();
        }
    }

    pub fn select_prev_result(&mut self) {
        if let Some(panel) = self.session.panel_mut() {
            panel.select_prev();
        }
    }

    pub fn open_selected_result(&mut self) {
        if self.session.select_current(&mut self.viewport) {
            self.focus = Focus::Document;
        }
    }

    pub fn open_result(&mut self, index: usize) {
        if self.session.select(index, &mut self.viewport) {
            self.focus = Focus::Document;
        }
    }

    pub fn pointer(&mut self, target: PointerTarget) {
        self.session.on_pointer(target);
    }

    // Outline

    pub fn open_outline_entry(&mut self, index: usize) {
        let offset = self.session.options().header_offset;
        if self.outline_view.activate(index, &mut self.viewport, offset) && self.narrow {
            // Same as closing a mobile menu after following a link
            self.outline_open = false;
            self.focus = Focus::Document;
        }
    }

    /// Jump to the element with `id`, as when following a `#id` link
    pub fn open_anchor(&mut self, id: &str) -> bool {
        let Some(target) = self.doc.find_by_id(id) else {
            warn!(id, "no element with this id");
            return false;
        };
        self.viewport
            .scroll_to(target, self.session.options().header_offset);
        self.focus = Focus::Document;
        true
    }

    pub fn open_selected_outline_entry(&mut self) {
        self.open_outline_entry(self.outline_view.selected());
    }

    pub fn toggle_outline(&mut self) {
        self.outline_open = !self.outline_open;
        if !self.outline_visible() && self.focus == Focus::Outline {
            self.focus = Focus::Document;
        }
    }

    // Focus and modes

    pub fn cycle_focus(&mut self, forward: bool) {
        let order: &[Focus] = if self.outline_visible() {
            &[Focus::Search, Focus::Outline, Focus::Document]
        } else {
            &[Focus::Search, Focus::Document]
        };
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % order.len()
        } else {
            (pos + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }

    pub fn show_help(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn hide_help(&mut self) {
        self.mode = Mode::Browse;
    }

    /// Clear pending key state
    pub fn clear_pending_key(&mut self) {
        self.pending_key = None;
    }

    // Theme

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        info!(theme = %self.theme, "theme changed");

        let Some(dir) = &self.data_dir else {
            return;
        };
        let state = UiState { theme: self.theme };
        if let Err(e) = state.save_to(dir) {
            warn!(error = %e, "could not save theme");
            self.status_message = format!("Could not save theme: {e}");
        }
    }

    // Document scrolling

    pub fn scroll_rows(&mut self, rows: i32) {
        self.viewport.scroll_rows(rows);
    }

    pub fn scroll_to_top(&mut self) {
        self.viewport.scroll_to_top();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.viewport.scroll_to_bottom();
    }

    // Code blocks

    /// Code block to copy: the first one with a row on screen
    pub fn code_block_target(&self) -> Option<ElementRef> {
        let (start, end) = self.viewport.visible_range();
        self.doc.code_block_in(start, end)
    }

    pub fn copy_code_block(&mut self) {
        let Some(target) = self.code_block_target() else {
            self.status_message = "No code block in view".to_string();
            return;
        };
        let Some(block) = self.doc.get(target) else {
            return;
        };

        match self.clipboard.set_text(&block.text) {
            Ok(()) => {
                info!(element = target.index(), "code block copied");
                self.status_message = "Copied!".to_string();
            }
            Err(e) => {
                warn!("failed to copy code block: {e:#}");
                self.status_message = "Copy failed".to_string();
            }
        }
    }
}

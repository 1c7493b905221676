use crate::document::LineStyle;
use crate::search::{PanelEntry, Segment};
use crate::search::panel::NO_RESULTS_TEXT;
use crate::theme::Theme;
use crate::tui::app::{App, Focus, Mode};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

/// Width of the outline sidebar
const OUTLINE_WIDTH: u16 = 32;

/// Result panel never grows past this many entries
const PANEL_MAX_ROWS: u16 = 10;

const SCROLL_TOP_LABEL: &str = " ↑ Top ";

/// Screen regions, shared by drawing and mouse hit-testing
#[derive(Debug, Clone, Copy)]
pub struct Areas {
    pub input: Rect,
    pub outline: Option<Rect>,
    pub document: Rect,
    pub results: Option<Rect>,
    pub status: Rect,
    pub scroll_top: Option<Rect>,
}

impl Areas {
    /// Rows of document text visible inside the document block
    pub fn document_rows(&self) -> u16 {
        self.document.height.saturating_sub(2)
    }
}

pub fn areas(area: Rect, app: &App) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query input
            Constraint::Min(5),    // Outline / Document
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let (outline, document) = if app.outline_visible() {
        let width = OUTLINE_WIDTH.min(chunks[1].width / 2);
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(width), Constraint::Min(10)])
            .split(chunks[1]);
        (Some(main[0]), main[1])
    } else {
        (None, chunks[1])
    };

    let results = app.session.panel().filter(|p| p.is_visible()).map(|panel| {
        let rows = (panel.entries().len() as u16).min(PANEL_MAX_ROWS);
        Rect {
            x: document.x,
            y: document.y,
            width: document.width,
            height: (rows + 2).min(document.height),
        }
    });

    let status = chunks[2];
    let scroll_top = app.viewport.show_scroll_top().then(|| {
        let width = SCROLL_TOP_LABEL.chars().count() as u16;
        Rect {
            x: status.x + status.width.saturating_sub(width),
            y: status.y,
            width: width.min(status.width),
            height: 1,
        }
    });

    Areas {
        input: chunks[0],
        outline,
        document,
        results,
        status,
        scroll_top,
    }
}

/// First list row shown so that `selected` stays visible
pub fn window_start(selected: usize, rows: usize) -> usize {
    if rows == 0 || selected < rows {
        0
    } else {
        selected + 1 - rows
    }
}

/// Entry index under a click at `row`, given a bordered list in `area`
pub fn row_to_index(area: Rect, row: u16, selected: usize) -> Option<usize> {
    let inner_rows = area.height.saturating_sub(2);
    if row <= area.y || row >= area.y + 1 + inner_rows {
        return None;
    }
    Some(window_start(selected, inner_rows as usize) + (row - area.y - 1) as usize)
}

struct Palette {
    fg: Color,
    bg: Color,
    accent: Color,
    muted: Color,
    code: Color,
    mark: Style,
    selected: Style,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            fg: Color::Black,
            bg: Color::White,
            accent: Color::Blue,
            muted: Color::DarkGray,
            code: Color::Magenta,
            mark: Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::Gray).add_modifier(Modifier::BOLD),
        },
        Theme::Dark => Palette {
            fg: Color::Gray,
            bg: Color::Black,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            code: Color::Green,
            mark: Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
        },
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let p = palette(app.theme);
    let areas = areas(f.area(), app);

    f.render_widget(Block::default().style(Style::default().fg(p.fg).bg(p.bg)), f.area());

    draw_query_input(f, app, &p, areas.input);
    if let Some(area) = areas.outline {
        draw_outline(f, app, &p, area);
    }
    draw_document(f, app, &p, areas.document);
    if let Some(area) = areas.results {
        draw_results(f, app, &p, area);
    }
    draw_status_bar(f, app, &p, &areas);

    if app.mode == Mode::Help {
        draw_help(f, &p, f.area());
    }
}

fn focus_border(app: &App, focus: Focus, p: &Palette) -> Style {
    if app.focus == focus {
        Style::default().fg(p.accent)
    } else {
        Style::default().fg(p.muted)
    }
}

fn draw_query_input(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let input = Paragraph::new(app.query.as_str())
        .style(Style::default().fg(p.fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_border(app, Focus::Search, p))
                .title(" Search (Tab: focus, F2: theme, F3: outline, F1: help) "),
        );

    f.render_widget(input, area);

    // Show cursor
    if app.focus == Focus::Search && app.mode == Mode::Browse {
        let x = area.x + app.query.chars().count() as u16 + 1;
        f.set_cursor_position(Position::new(x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn draw_outline(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let rows = area.height.saturating_sub(2) as usize;
    let selected = app.outline_view.selected();
    let start = window_start(selected, rows);

    let items: Vec<ListItem> = app
        .outline_view
        .entries()
        .iter()
        .enumerate()
        .skip(start)
        .take(rows)
        .map(|(i, entry)| {
            let indent = "  ".repeat(entry.level.saturating_sub(2) as usize);
            let style = if i == selected && app.focus == Focus::Outline {
                p.selected
            } else if entry.level == 2 {
                Style::default().fg(p.accent)
            } else {
                Style::default().fg(p.fg)
            };
            ListItem::new(Line::from(format!("{indent}{}", entry.label))).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(app, Focus::Outline, p))
            .title(" Contents "),
    );

    f.render_widget(list, area);
}

fn draw_document(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let rows = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .doc
        .lines
        .iter()
        .skip(app.viewport.top_row())
        .take(rows)
        .map(|line| {
            let style = match line.style {
                LineStyle::Heading(1) | LineStyle::Heading(2) => {
                    Style::default().fg(p.accent).add_modifier(Modifier::BOLD)
                }
                LineStyle::Heading(_) => Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
                LineStyle::Code => Style::default().fg(p.code),
                LineStyle::Body | LineStyle::ListItem | LineStyle::Blank => Style::default().fg(p.fg),
            };
            Line::from(Span::styled(line.text.as_str(), style))
        })
        .collect();

    let title = match &app.doc.title {
        Some(title) => format!(" {title} "),
        None => format!(" {} ", app.path.display()),
    };

    let document = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(app, Focus::Document, p))
            .title(title),
    );

    f.render_widget(document, area);
}

fn draw_results(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let Some(panel) = app.session.panel() else {
        return;
    };

    let rows = area.height.saturating_sub(2) as usize;
    let start = window_start(panel.selected(), rows);

    let items: Vec<ListItem> = panel
        .entries()
        .iter()
        .enumerate()
        .skip(start)
        .take(rows)
        .map(|(i, entry)| {
            let line = match entry {
                PanelEntry::NoResults => Line::from(Span::styled(
                    NO_RESULTS_TEXT,
                    Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
                )),
                PanelEntry::Match { kind, segments, .. } => {
                    let mut spans = vec![
                        Span::styled(format!("{:<10}", kind.label()), Style::default().fg(p.accent)),
                        Span::raw(" "),
                    ];
                    spans.extend(segment_spans(segments, p));
                    Line::from(spans)
                }
            };
            let style = if i == panel.selected() {
                p.selected
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let count = panel
        .entries()
        .iter()
        .filter(|e| matches!(e, PanelEntry::Match { .. }))
        .count();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent))
            .style(Style::default().fg(p.fg).bg(p.bg))
            .title(format!(" Results ({count}) ")),
    );

    f.render_widget(Clear, area);
    f.render_widget(list, area);
}

/// Highlight marked segments
fn segment_spans<'a>(segments: &'a [Segment], p: &Palette) -> Vec<Span<'a>> {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Plain(text) => Span::raw(text.as_str()),
            Segment::Mark(text) => Span::styled(text.as_str(), p.mark),
        })
        .collect()
}

fn draw_status_bar(f: &mut Frame, app: &App, p: &Palette, areas: &Areas) {
    let mut text = format!(" {}  |  {} (F2)", app.status_message, app.theme.toggle_hint());
    if let Some(date) = &app.last_updated {
        text.push_str(&format!("  |  Last updated {date}"));
    }
    let status = Paragraph::new(text).style(Style::default().fg(p.muted));
    f.render_widget(status, areas.status);

    if let Some(area) = areas.scroll_top {
        let button = Paragraph::new(SCROLL_TOP_LABEL)
            .style(Style::default().fg(p.bg).bg(p.accent).add_modifier(Modifier::BOLD));
        f.render_widget(button, area);
    }
}

fn draw_help(f: &mut Frame, p: &Palette, area: Rect) {
    let help = [
        ("Typing", "search the page (runs after a short pause)"),
        ("Up/Down", "move through results"),
        ("Enter", "jump to selected result / outline entry"),
        ("Esc", "close results, clear query, quit"),
        ("Tab", "cycle focus: search, outline, document"),
        ("j/k", "scroll document / move in outline"),
        ("gg / G", "document top / bottom"),
        ("t, Home", "scroll to top"),
        ("y / c", "copy the code block in view"),
        ("F1, ?", "help (? outside the search box)"),
        ("F2, Ctrl+T", "toggle light/dark theme"),
        ("F3, Ctrl+O", "toggle outline"),
        ("Ctrl+C", "quit"),
    ];

    let lines: Vec<Line> = help
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("{key:<12}"), Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
                Span::raw(*desc),
            ])
        })
        .collect();

    let width = 64.min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(p.fg).bg(p.bg))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Help (any key to close) "));

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

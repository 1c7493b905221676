//! Debounced query lifecycle
//!
//! Keystrokes arm a single timer; only the most recent one can fire. The host
//! drives the session by calling [`SearchSession::poll`] with the current
//! instant, so the whole lifecycle is testable without an event loop.

use super::SearchOptions;
use super::engine::scan;
use super::panel::ResultPanel;
use crate::document::{ContentSource, Navigator};
use crate::utils::text::normalize_query;
use std::time::Instant;
use tracing::debug;

/// Armed debounce timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    /// Increases with every arm; a timer is superseded once a newer one exists
    pub generation: u64,
    pub deadline: Instant,
}

/// Where the session is in the query lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    /// No pending timer, no visible panel
    Idle,
    /// Waiting for the input to settle
    Scheduled { query: String, timer: Timer },
    /// Results for `query` are shown
    Displaying { query: String },
}

/// What a pointer interaction landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Input,
    Panel,
    Elsewhere,
}

/// Search engine state owned by the host
pub struct SearchSession {
    options: SearchOptions,
    state: QueryState,
    panel: Option<ResultPanel>,
    generation: u64,
    scans: u64,
}

impl SearchSession {
    /// Session with a mounted result panel
    pub fn new(options: SearchOptions) -> Self {
        Self::with_panel(options, Some(ResultPanel::new()))
    }

    /// Session whose result panel may be missing. Without a panel, settled
    /// queries are dropped without scanning.
    pub fn with_panel(options: SearchOptions, panel: Option<ResultPanel>) -> Self {
        Self {
            options,
            state: QueryState::Idle,
            panel,
            generation: 0,
            scans: 0,
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn panel(&self) -> Option<&ResultPanel> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut ResultPanel> {
        self.panel.as_mut()
    }

    /// Whether results (or the no-results placeholder) are on screen
    pub fn is_panel_visible(&self) -> bool {
        self.panel.as_ref().is_some_and(ResultPanel::is_visible)
    }

    /// Number of scans run so far
    pub fn scan_count(&self) -> u64 {
        self.scans
    }

    /// Deadline of the pending timer, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            QueryState::Scheduled { timer, .. } => Some(timer.deadline),
            _ => None,
        }
    }

    /// Handle a change of the input's raw value
    pub fn on_input(&mut self, raw: &str, now: Instant) {
        // Any pending timer is superseded from here on
        self.generation += 1;

        let query = normalize_query(raw);
        if query.chars().count() < self.options.min_query_chars {
            self.go_idle();
            return;
        }

        let timer = Timer {
            generation: self.generation,
            deadline: now + self.options.debounce,
        };
        debug!(query = %query, generation = timer.generation, "search scheduled");
        self.state = QueryState::Scheduled { query, timer };
    }

    /// Fire the pending timer if it is due. Returns whether a scan ran.
    pub fn poll<S: ContentSource>(&mut self, now: Instant, source: &S) -> bool {
        let due = match &self.state {
            QueryState::Scheduled { timer, .. } => {
                timer.generation == self.generation && now >= timer.deadline
            }
            _ => false,
        };
        if !due {
            return false;
        }

        let QueryState::Scheduled { query, .. } = std::mem::replace(&mut self.state, QueryState::Idle)
        else {
            return false;
        };

        let Some(panel) = self.panel.as_mut() else {
            debug!("no result panel mounted, dropping query");
            return false;
        };

        let results = scan(source, &query, &self.options);
        self.scans += 1;
        panel.render(&results, &query);
        debug!(query = %query, results = results.len(), "search displayed");

        self.state = QueryState::Displaying { query };
        true
    }

    /// Handle a pointer interaction; anything outside the input and the
    /// panel dismisses the search.
    pub fn on_pointer(&mut self, target: PointerTarget) {
        if target == PointerTarget::Elsewhere {
            self.generation += 1;
            self.go_idle();
        }
    }

    /// Navigate to the result at `index` and close the panel.
    /// Returns false when there is nothing to navigate to.
    pub fn select<N: Navigator>(&mut self, index: usize, navigator: &mut N) -> bool {
        if !self.is_panel_visible() {
            return false;
        }
        let Some(target) = self.panel.as_ref().and_then(|p| p.target(index)) else {
            return false;
        };

        navigator.scroll_to(target, self.options.header_offset);
        debug!(element = target.index(), "navigated to search result");
        self.go_idle();
        true
    }

    /// Navigate to the currently highlighted result
    pub fn select_current<N: Navigator>(&mut self, navigator: &mut N) -> bool {
        let index = self.panel.as_ref().map(ResultPanel::selected).unwrap_or(0);
        self.select(index, navigator)
    }

    /// Cancel any pending timer and hide the panel
    pub fn dismiss(&mut self) {
        self.generation += 1;
        self.go_idle();
    }

    fn go_idle(&mut self) {
        if self.state != QueryState::Idle {
            debug!("search idle");
        }
        self.state = QueryState::Idle;
        if let Some(panel) = self.panel.as_mut() {
            panel.hide();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, ElementRef, load_markdown};
    use crate::search::PanelEntry;
    use std::time::Duration;

    const SCENARIO: &str = "## Getting Started\n\nConnect the drone via USB cable.\n";

    #[derive(Default)]
    struct RecordingNavigator {
        calls: Vec<(ElementRef, u32)>,
    }

    impl Navigator for RecordingNavigator {
        fn scroll_to(&mut self, target: ElementRef, offset: u32) {
            self.calls.push((target, offset));
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn session() -> SearchSession {
        SearchSession::new(SearchOptions::default())
    }

    fn doc() -> Document {
        load_markdown(SCENARIO)
    }

    #[test]
    fn test_scan_after_debounce() {
        let doc = doc();
        let mut session = session();
        let t0 = Instant::now();

        session.on_input("drone", t0);
        assert!(matches!(session.state(), QueryState::Scheduled { .. }));
        assert_eq!(session.next_deadline(), Some(t0 + ms(300)));

        assert!(!session.poll(t0 + ms(299), &doc));
        assert_eq!(session.scan_count(), 0);

        assert!(session.poll(t0 + ms(300), &doc));
        assert_eq!(
            session.state(),
            &QueryState::Displaying {
                query: "drone".to_string()
            }
        );
        assert!(session.is_panel_visible());

        let panel = session.panel().unwrap();
        match &panel.entries()[0] {
            PanelEntry::Match { kind, segments, .. } => {
                assert_eq!(kind.label(), "paragraph");
                assert!(segments.iter().any(|s| s.is_mark() && s.text() == "drone"));
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn test_debounce_keeps_only_last_keystroke() {
        let doc = doc();
        let mut session = session();
        let t0 = Instant::now();

        session.on_input("dr", t0);
        session.on_input("dro", t0 + ms(100));
        session.on_input("drone", t0 + ms(200));

        // First two timers would have been due here
        assert!(!session.poll(t0 + ms(400), &doc));
        assert!(session.poll(t0 + ms(500), &doc));
        assert!(!session.poll(t0 + ms(900), &doc));

        assert_eq!(session.scan_count(), 1);
        assert_eq!(
            session.state(),
            &QueryState::Displaying {
                query: "drone".to_string()
            }
        );
    }

    #[test]
    fn test_each_arm_bumps_generation() {
        let mut session = session();
        let t0 = Instant::now();

        session.on_input("ab", t0);
        let first = match session.state() {
            QueryState::Scheduled { timer, .. } => timer.generation,
            _ => panic!("not scheduled"),
        };
        session.on_input("abc", t0);
        let second = match session.state() {
            QueryState::Scheduled { timer, .. } => timer.generation,
            _ => panic!("not scheduled"),
        };
        assert!(second > first);
    }

    #[test]
    fn test_short_query_goes_idle_and_hides_panel() {
        let doc = doc();
        let mut session = session();
        let t0 = Instant::now();

        session.on_input("drone", t0);
        session.poll(t0 + ms(300), &doc);
        assert!(session.is_panel_visible());

        for raw in ["", " ", "d", "  D  "] {
            session.on_input(raw, t0 + ms(400));
            assert_eq!(session.state(), &QueryState::Idle);
            assert!(!session.is_panel_visible());
            assert_eq!(session.next_deadline(), None);
        }

        assert!(!session.poll(t0 + ms(2000), &doc));
        assert_eq!(session.scan_count(), 1);
    }

    #[test]
    fn test_short_query_cancels_pending_timer() {
        let doc = doc();
        let mut session = session();
        let t0 = Instant::now();

        session.on_input("drone", t0);
        session.on_input("d", t0 + ms(100));

        assert!(!session.poll(t0 + ms(1000), &doc));
        assert_eq!(session.scan_count(), 0);
    }

    #[test]
    fn test_query_is_trimmed_and_lowercased() {
        let doc = doc();
        let mut session = session();
        let t0 = Instant::now();

        session.on_input("  DRONE  ", t0);
        session.poll(t0 + ms(300), &doc);
        assert_eq!(
            session.state(),
            &QueryState::Displaying {
                query: "drone".to_string()
            }
        );
    }

    #[test]
    fn test_no_results_placeholder() {
        let doc = doc();
        let mut session = session();
        let t0 = Instant::now();

        session.on_input("gimbal", t0);
        assert!(session.poll(t0 + ms(300), &doc));
        assert_eq!(session.panel().unwrap().entries(), &[PanelEntry::NoResults]);
        assert!(session.is_panel_visible());
    }

    #[test]
    fn test_pointer_outside_dismisses() {
        let doc = doc();
        let mut session = session();
        let t0 = Instant::now();

        session.on_input("drone", t0);
        session.poll(t0 + ms(300), &doc);

        session.on_pointer(PointerTarget::Panel);
        assert!(session.is_panel_visible());
        session.on_pointer(PointerTarget::Input);
        assert!(session.is_panel_visible());

        session.on_pointer(PointerTarget::Elsewhere);
        assert_eq!(session.state(), &QueryState::Idle);
        assert!(!session.is_panel_visible());
    }

    #[test]
    fn test_pointer_outside_cancels_pending_timer() {
        let doc = doc();
        let mut session = session();
        let t0 = Instant::now();

        session.on_input("drone", t0);
        session.on_pointer(PointerTarget::Elsewhere);
        assert!(!session.poll(t0 + ms(300), &doc));
        assert_eq!(session.scan_count(), 0);
    }

    #[test]
    fn test_select_navigates_with_header_offset() {
        let doc = doc();
        let mut session = session();
        let mut navigator = RecordingNavigator::default();
        let t0 = Instant::now();

        session.on_input("drone", t0);
        session.poll(t0 + ms(300), &doc);

        assert!(session.select(0, &mut navigator));
        assert_eq!(navigator.calls, vec![(ElementRef(1), 80)]);
        assert_eq!(session.state(), &QueryState::Idle);
        assert!(!session.is_panel_visible());

        // Panel is hidden now, nothing left to select
        assert!(!session.select(0, &mut navigator));
        assert_eq!(navigator.calls.len(), 1);
    }

    #[test]
    fn test_select_placeholder_does_nothing() {
        let doc = doc();
        let mut session = session();
        let mut navigator = RecordingNavigator::default();
        let t0 = Instant::now();

        session.on_input("gimbal", t0);
        session.poll(t0 + ms(300), &doc);

        assert!(!session.select_current(&mut navigator));
        assert!(navigator.calls.is_empty());
        assert!(session.is_panel_visible());
    }

    #[test]
    fn test_missing_panel_is_a_noop() {
        let doc = doc();
        let mut session = SearchSession::with_panel(SearchOptions::default(), None);
        let t0 = Instant::now();

        session.on_input("drone", t0);
        assert!(!session.poll(t0 + ms(300), &doc));
        assert_eq!(session.scan_count(), 0);
        assert_eq!(session.state(), &QueryState::Idle);
        assert!(!session.is_panel_visible());
    }

    #[test]
    fn test_custom_debounce() {
        let doc = doc();
        let options = SearchOptions {
            debounce: ms(50),
            ..Default::default()
        };
        let mut session = SearchSession::new(options);
        let t0 = Instant::now();

        session.on_input("drone", t0);
        assert!(session.poll(t0 + ms(50), &doc));
    }
}

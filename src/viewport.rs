//! Scrollable view over a rendered document.
//!
//! [`Viewport`] is the [`Navigator`] the TUI hands to the outline and the
//! search session: navigation sets a target and [`Viewport::tick`] eases the
//! scroll position towards it.

use crate::document::{Document, ElementRef, Navigator, ROW_UNITS};

/// Scroll position past which the scroll-to-top control shows up
pub const SCROLL_TOP_THRESHOLD: u32 = 300;

/// Fraction of the remaining distance covered per animation tick
const EASE_DIVISOR: u32 = 3;

#[derive(Debug, Clone)]
pub struct Viewport {
    /// Element offsets, indexed by element
    offsets: Vec<u32>,
    doc_height: u32,
    view_rows: u16,
    scroll: u32,
    target: u32,
    scroll_top_threshold: u32,
}

impl Viewport {
    pub fn new(doc: &Document) -> Self {
        Self {
            offsets: doc.elements.iter().map(|e| e.offset_top).collect(),
            doc_height: doc.height(),
            view_rows: 0,
            scroll: 0,
            target: 0,
            scroll_top_threshold: SCROLL_TOP_THRESHOLD,
        }
    }

    pub fn with_scroll_top_threshold(mut self, threshold: u32) -> Self {
        self.scroll_top_threshold = threshold;
        self
    }

    /// Update the visible height (in rows)
    pub fn set_view_rows(&mut self, rows: u16) {
        self.view_rows = rows;
        self.scroll = self.scroll.min(self.max_scroll());
        self.target = self.target.min(self.max_scroll());
    }

    pub fn max_scroll(&self) -> u32 {
        self.doc_height
            .saturating_sub(self.view_rows as u32 * ROW_UNITS)
    }

    /// Current scroll position in layout units
    pub fn scroll(&self) -> u32 {
        self.scroll
    }

    /// Where an animation is heading
    pub fn target(&self) -> u32 {
        self.target
    }

    /// First visible row
    pub fn top_row(&self) -> usize {
        (self.scroll / ROW_UNITS) as usize
    }

    /// Visible span `[start, end)` in layout units
    pub fn visible_range(&self) -> (u32, u32) {
        (self.scroll, self.scroll + self.view_rows as u32 * ROW_UNITS)
    }

    pub fn is_animating(&self) -> bool {
        self.scroll != self.target
    }

    /// Advance the smooth scroll by one step. Returns whether it moved.
    pub fn tick(&mut self) -> bool {
        if self.scroll == self.target {
            return false;
        }
        let distance = self.scroll.abs_diff(self.target);
        let step = (distance / EASE_DIVISOR).max(ROW_UNITS).min(distance);
        if self.target > self.scroll {
            self.scroll += step;
        } else {
            self.scroll -= step;
        }
        true
    }

    /// Jump by whole rows without animating
    pub fn scroll_rows(&mut self, rows: i32) {
        let delta = rows.unsigned_abs() * ROW_UNITS;
        let next = if rows >= 0 {
            self.scroll.saturating_add(delta)
        } else {
            self.scroll.saturating_sub(delta)
        };
        self.scroll = next.min(self.max_scroll());
        self.target = self.scroll;
    }

    /// Smoothly scroll to an absolute position
    pub fn scroll_to_position(&mut self, position: u32) {
        self.target = position.min(self.max_scroll());
    }

    /// Smoothly scroll back to the top
    pub fn scroll_to_top(&mut self) {
        self.scroll_to_position(0);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_to_position(self.max_scroll());
    }

    /// Whether the scroll-to-top control should be shown
    pub fn show_scroll_top(&self) -> bool {
        self.scroll > self.scroll_top_threshold
    }
}

impl Navigator for Viewport {
    fn scroll_to(&mut self, target: ElementRef, offset: u32) {
        if let Some(&top) = self.offsets.get(target.index()) {
            self.scroll_to_position(top.saturating_sub(offset));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{HEADER_OFFSET, load_markdown};

    fn long_doc() -> Document {
        let body: String = (0..60)
            .map(|i| format!("## Section {i}\n\nParagraph {i}.\n\n"))
            .collect();
        load_markdown(&body)
    }

    fn settle(viewport: &mut Viewport) -> usize {
        let mut ticks = 0;
        while viewport.tick() {
            ticks += 1;
            assert!(ticks < 100, "animation did not converge");
        }
        ticks
    }

    #[test]
    fn test_scroll_to_applies_header_offset() {
        let doc = long_doc();
        let mut viewport = Viewport::new(&doc);
        viewport.set_view_rows(20);

        let target = ElementRef(20);
        let top = doc.elements[20].offset_top;
        viewport.scroll_to(target, HEADER_OFFSET);

        assert_eq!(viewport.target(), top - HEADER_OFFSET);
        assert!(viewport.is_animating());
        assert!(settle(&mut viewport) > 1);
        assert_eq!(viewport.scroll(), top - HEADER_OFFSET);
    }

    #[test]
    fn test_scroll_to_saturates_at_top() {
        let doc = long_doc();
        let mut viewport = Viewport::new(&doc);
        viewport.set_view_rows(20);

        viewport.scroll_to(ElementRef(0), HEADER_OFFSET);
        assert_eq!(viewport.target(), 0);
        assert!(!viewport.is_animating());
    }

    #[test]
    fn test_scroll_is_clamped_to_document() {
        let doc = long_doc();
        let mut viewport = Viewport::new(&doc);
        viewport.set_view_rows(20);

        let last = ElementRef(doc.elements.len() - 1);
        viewport.scroll_to(last, HEADER_OFFSET);
        assert_eq!(viewport.target(), viewport.max_scroll());
    }

    #[test]
    fn test_unknown_element_is_ignored() {
        let doc = long_doc();
        let mut viewport = Viewport::new(&doc);
        viewport.set_view_rows(20);
        viewport.scroll_to(ElementRef(10_000), HEADER_OFFSET);
        assert!(!viewport.is_animating());
    }

    #[test]
    fn test_scroll_top_control() {
        let doc = long_doc();
        let mut viewport = Viewport::new(&doc);
        viewport.set_view_rows(20);
        assert!(!viewport.show_scroll_top());

        viewport.scroll_rows(30);
        assert_eq!(viewport.scroll(), 30 * ROW_UNITS);
        assert!(viewport.show_scroll_top());

        viewport.scroll_to_top();
        settle(&mut viewport);
        assert_eq!(viewport.scroll(), 0);
        assert!(!viewport.show_scroll_top());
    }

    #[test]
    fn test_scroll_rows_backwards_saturates() {
        let doc = long_doc();
        let mut viewport = Viewport::new(&doc);
        viewport.set_view_rows(20);
        viewport.scroll_rows(-5);
        assert_eq!(viewport.scroll(), 0);
        assert_eq!(viewport.top_row(), 0);
    }

    #[test]
    fn test_visible_range_follows_scroll() {
        let doc = long_doc();
        let mut viewport = Viewport::new(&doc);
        viewport.set_view_rows(10);
        assert_eq!(viewport.visible_range(), (0, 10 * ROW_UNITS));

        viewport.scroll_rows(4);
        assert_eq!(viewport.visible_range(), (4 * ROW_UNITS, 14 * ROW_UNITS));
    }
}

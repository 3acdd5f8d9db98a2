//! Highlight and selection state.
//!
//! The [`IntervalStore`] owns every colored interval laid over the sequence:
//! any number of possibly-overlapping highlights, plus at most one selection.
//! It answers "which style applies at position p" and reports which range a
//! mutation touched, so that the compositor can repaint just that range.

use std::collections::BTreeMap;
use std::fmt;

use ratatui::style::Color;

use crate::model::{Palette, ResidueStyle, SeqRange};

/// Identifier handed out by [`IntervalStore::add_highlight`].
///
/// Ids are assigned monotonically, so ordering by id is insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HighlightId(pub usize);

impl fmt::Display for HighlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A colored interval over the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub id: HighlightId,
    pub range: SeqRange,
    pub style: ResidueStyle,
}

/// Holds highlights and the selection for one viewer.
#[derive(Debug, Clone)]
pub struct IntervalStore {
    palette: Palette,
    /// Sequence length the intervals refer to
    len: usize,
    highlights: BTreeMap<HighlightId, Highlight>,
    next_id: usize,
    selection: Option<SeqRange>,
}

impl IntervalStore {
    pub fn new(palette: Palette, len: usize) -> Self {
        Self {
            palette,
            len,
            highlights: BTreeMap::new(),
            next_id: 0,
            selection: None,
        }
    }

    /// Drops every highlight and the selection, and restarts id assignment.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.highlights.clear();
        self.next_id = 0;
        self.selection = None;
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Length of the sequence this store covers.
    pub fn sequence_len(&self) -> usize {
        self.len
    }

    /// Adds a highlight over `start..=end`.
    ///
    /// Missing colors fall back to the palette's highlight colors. Returns
    /// `None`, leaving the collection untouched, when `start > end`. Bounds are
    /// not checked here.
    pub fn add_highlight(
        &mut self,
        start: usize,
        end: usize,
        foreground: Option<Color>,
        background: Option<Color>,
    ) -> Option<Highlight> {
        if start > end {
            return None;
        }
        let id = HighlightId(self.next_id);
        self.next_id += 1;
        let highlight = Highlight {
            id,
            range: SeqRange { start, end },
            style: ResidueStyle::new(
                foreground.unwrap_or(self.palette.highlight.foreground),
                background.unwrap_or(self.palette.highlight.background),
            ),
        };
        self.highlights.insert(id, highlight);
        Some(highlight)
    }

    /// Removes a highlight, returning the range it covered. Unknown ids are ignored.
    pub fn remove_highlight(&mut self, id: HighlightId) -> Option<SeqRange> {
        self.highlights.remove(&id).map(|h| h.range)
    }

    /// Removes every highlight, returning the whole sequence as repaint scope.
    pub fn clear_highlights(&mut self) -> Option<SeqRange> {
        self.highlights.clear();
        (self.len > 0).then(|| SeqRange::new(1, self.len))
    }

    pub fn highlight(&self, id: HighlightId) -> Option<&Highlight> {
        self.highlights.get(&id)
    }

    /// All highlights, oldest first.
    pub fn highlights(&self) -> impl Iterator<Item = &Highlight> {
        self.highlights.values()
    }

    /// Highlights overlapping `range`, oldest first.
    pub fn highlights_in(&self, range: SeqRange) -> impl Iterator<Item = &Highlight> {
        self.highlights
            .values()
            .filter(move |h| h.range.intersection(range).is_some())
    }

    pub fn highlight_count(&self) -> usize {
        self.highlights.len()
    }

    pub fn selection(&self) -> Option<SeqRange> {
        self.selection
    }

    /// Sets the selection, swapping reversed endpoints.
    ///
    /// Returns whether the normalized range differs from the current one.
    pub fn set_selection(&mut self, start: usize, end: usize) -> bool {
        let range = SeqRange::new(start, end);
        let changed = self.selection != Some(range);
        self.selection = Some(range);
        changed
    }

    /// Resets the selection to empty, returning what was selected.
    pub fn clear_selection(&mut self) -> Option<SeqRange> {
        self.selection.take()
    }

    /// Composite style at `pos`: base, then highlights in insertion order, then selection.
    pub fn resolve_style_at(&self, pos: usize) -> ResidueStyle {
        if self.selection.is_some_and(|s| s.contains(pos)) {
            return self.palette.selection;
        }
        self.highlights
            .values()
            .rev()
            .find(|h| h.range.contains(pos))
            .map_or(self.palette.base, |h| h.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Palette {
        Palette {
            base: ResidueStyle::new(Color::Black, Color::White),
            highlight: ResidueStyle::new(Color::Red, Color::White),
            selection: ResidueStyle::new(Color::Black, Color::Yellow),
        }
    }

    #[test]
    fn test_later_highlight_wins() {
        let mut store = IntervalStore::new(palette(), 100);
        store.add_highlight(10, 20, Some(Color::White), Some(Color::Green));
        store.add_highlight(15, 25, Some(Color::Black), Some(Color::Blue));

        assert_eq!(store.resolve_style_at(17), ResidueStyle::new(Color::Black, Color::Blue));
        assert_eq!(store.resolve_style_at(12), ResidueStyle::new(Color::White, Color::Green));
        assert_eq!(store.resolve_style_at(30), palette().base);
    }

    #[test]
    fn test_selection_over_highlight() {
        let mut store = IntervalStore::new(palette(), 100);
        store.add_highlight(10, 20, None, None);
        store.set_selection(18, 22);

        assert_eq!(store.resolve_style_at(17), palette().highlight);
        assert_eq!(store.resolve_style_at(18), palette().selection);
        assert_eq!(store.resolve_style_at(22), palette().selection);
    }

    #[test]
    fn test_inverted_highlight_is_rejected() {
        let mut store = IntervalStore::new(palette(), 100);
        assert!(store.add_highlight(20, 10, None, None).is_none());
        assert_eq!(store.highlight_count(), 0);

        // A rejected call does not consume an id
        let h = store.add_highlight(30, 42, None, None).unwrap();
        assert_eq!(h.id, HighlightId(0));
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut store = IntervalStore::new(palette(), 100);
        let a = store.add_highlight(1, 2, None, None).unwrap().id;
        store.remove_highlight(a);
        let b = store.add_highlight(1, 2, None, None).unwrap().id;
        assert!(b > a);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = IntervalStore::new(palette(), 100);
        let id = store.add_highlight(30, 42, None, None).unwrap().id;
        assert_eq!(store.remove_highlight(id), Some(SeqRange::new(30, 42)));
        assert_eq!(store.remove_highlight(id), None);
        assert_eq!(store.remove_highlight(HighlightId(99)), None);
        assert_eq!(store.highlight_count(), 0);
    }

    #[test]
    fn test_clear_returns_full_range() {
        let mut store = IntervalStore::new(palette(), 50);
        store.add_highlight(1, 5, None, None);
        store.add_highlight(3, 9, None, None);
        assert_eq!(store.clear_highlights(), Some(SeqRange::new(1, 50)));
        assert_eq!(store.highlight_count(), 0);
    }

    #[test]
    fn test_set_selection_normalizes() {
        let mut store = IntervalStore::new(palette(), 50);
        assert!(store.set_selection(8, 5));
        assert_eq!(store.selection(), Some(SeqRange::new(5, 8)));
        assert!(!store.set_selection(5, 8));
        assert!(store.set_selection(5, 9));
    }

    #[test]
    fn test_highlights_in() {
        let mut store = IntervalStore::new(palette(), 100);
        store.add_highlight(1, 10, None, None);
        store.add_highlight(20, 30, None, None);
        store.add_highlight(5, 25, None, None);
        let ids: Vec<usize> = store
            .highlights_in(SeqRange::new(11, 19))
            .map(|h| h.id.0)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_reset() {
        let mut store = IntervalStore::new(palette(), 100);
        store.add_highlight(1, 10, None, None);
        store.set_selection(3, 4);
        store.reset(20);
        assert_eq!(store.highlight_count(), 0);
        assert_eq!(store.selection(), None);
        assert_eq!(store.sequence_len(), 20);
        assert_eq!(store.add_highlight(1, 1, None, None).unwrap().id, HighlightId(0));
    }
}

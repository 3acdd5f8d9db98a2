//! Incremental repaint of highlights and selection.
//!
//! The compositor turns a change in the [`IntervalStore`] into the smallest
//! set of [`PaintInstruction`]s that brings the rendered residues back in line
//! with the store. Layers, lowest to highest precedence:
//!
//! 1. the base style
//! 2. highlights, in insertion order (later ones cover earlier ones on overlap)
//! 3. the selection
//!
//! Every method reads the store *after* it has been mutated: callers update
//! the store first, then ask the compositor what to repaint.

use crate::layout::SequenceLayout;
use crate::model::{ResidueStyle, SeqRange};
use crate::store::{Highlight, IntervalStore};

/// Paint `range` with `style`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintInstruction {
    pub range: SeqRange,
    pub style: ResidueStyle,
}

impl PaintInstruction {
    pub fn new(range: SeqRange, style: ResidueStyle) -> Self {
        Self { range, style }
    }
}

/// The drawing surface a viewer paints into.
pub trait Renderer {
    /// Whatever the host uses to identify a drawn residue (a DOM node, a cell...)
    type Element;

    /// Rebuilds the drawn elements for a new layout.
    ///
    /// Every residue is repainted right after this call.
    fn redraw(&mut self, layout: &SequenceLayout);

    fn paint(&mut self, range: SeqRange, style: ResidueStyle);

    /// The residue position an element stands for, if any.
    fn position_of_element(&self, element: &Self::Element) -> Option<usize>;
}

/// Computes paint instructions from the current store state.
#[derive(Debug, Clone, Copy)]
pub struct Compositor<'a> {
    store: &'a IntervalStore,
}

impl<'a> Compositor<'a> {
    pub fn new(store: &'a IntervalStore) -> Self {
        Self { store }
    }

    /// Paints a newly added highlight, keeping the selection on top.
    pub fn on_highlight_added(&self, highlight: &Highlight) -> Vec<PaintInstruction> {
        let range = highlight.range;
        let Some(overlap) = self.store.selection().and_then(|s| s.intersection(range)) else {
            return vec![PaintInstruction::new(range, highlight.style)];
        };

        let mut out = Vec::with_capacity(3);
        if overlap.start > range.start {
            out.push(PaintInstruction::new(
                SeqRange::new(range.start, overlap.start - 1),
                highlight.style,
            ));
        }
        out.push(PaintInstruction::new(overlap, self.store.palette().selection));
        if overlap.end < range.end {
            out.push(PaintInstruction::new(
                SeqRange::new(overlap.end + 1, range.end),
                highlight.style,
            ));
        }
        out
    }

    /// Recomputes `range` from scratch after a highlight covering it went away.
    pub fn on_highlight_removed(&self, range: SeqRange) -> Vec<PaintInstruction> {
        self.restore(range)
    }

    /// Repaints only what differs between the old and new selection.
    ///
    /// Growing from a fixed endpoint paints just the added positions and
    /// shrinking restores just the released ones. Anything else restores the
    /// old range and paints the new one.
    pub fn on_selection_changed(
        &self,
        old: Option<SeqRange>,
        new: Option<SeqRange>,
    ) -> Vec<PaintInstruction> {
        match (old, new) {
            _ if old == new => Vec::new(),
            (None, None) => Vec::new(),
            (None, Some(new)) => vec![self.select(new)],
            (Some(old), None) => self.restore(old),
            (Some(old), Some(new)) if old.start == new.start => {
                if new.end > old.end {
                    vec![self.select(SeqRange::new(old.end + 1, new.end))]
                } else {
                    self.restore(SeqRange::new(new.end + 1, old.end))
                }
            }
            (Some(old), Some(new)) if old.end == new.end => {
                if new.start < old.start {
                    vec![self.select(SeqRange::new(new.start, old.start - 1))]
                } else {
                    self.restore(SeqRange::new(old.start, new.start - 1))
                }
            }
            (Some(old), Some(new)) => {
                let mut out = self.restore(old);
                out.push(self.select(new));
                out
            }
        }
    }

    /// Full repaint of the whole sequence.
    pub fn repaint_all(&self) -> Vec<PaintInstruction> {
        match self.store.sequence_len() {
            0 => Vec::new(),
            len => self.restore(SeqRange::new(1, len)),
        }
    }

    /// Re-derives the composite style of every position in `range`.
    pub fn restore(&self, range: SeqRange) -> Vec<PaintInstruction> {
        let palette = self.store.palette();
        let mut styles = vec![palette.base; range.len()];

        for highlight in self.store.highlights_in(range) {
            if let Some(overlap) = highlight.range.intersection(range) {
                styles[overlap.start - range.start..=overlap.end - range.start]
                    .fill(highlight.style);
            }
        }
        if let Some(overlap) = self.store.selection().and_then(|s| s.intersection(range)) {
            styles[overlap.start - range.start..=overlap.end - range.start]
                .fill(palette.selection);
        }

        coalesce(range.start, &styles)
    }

    fn select(&self, range: SeqRange) -> PaintInstruction {
        PaintInstruction::new(range, self.store.palette().selection)
    }
}

/// Merges runs of equal styles starting at position `first` into instructions.
fn coalesce(first: usize, styles: &[ResidueStyle]) -> Vec<PaintInstruction> {
    let mut out: Vec<PaintInstruction> = Vec::new();
    for (offset, &style) in styles.iter().enumerate() {
        let pos = first + offset;
        match out.last_mut() {
            Some(last) if last.style == style => last.range.end = pos,
            _ => out.push(PaintInstruction::new(SeqRange::single(pos), style)),
        }
    }
    out
}

/// A plain per-residue style buffer.
///
/// Useful as the backing store of a real renderer, and as the reference
/// renderer in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleBuffer {
    styles: Vec<ResidueStyle>,
}

impl StyleBuffer {
    pub fn new(len: usize, fill: ResidueStyle) -> Self {
        Self {
            styles: vec![fill; len],
        }
    }

    pub fn resize(&mut self, len: usize, fill: ResidueStyle) {
        self.styles.clear();
        self.styles.resize(len, fill);
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Style at a 1-indexed position.
    pub fn style_at(&self, pos: usize) -> Option<ResidueStyle> {
        pos.checked_sub(1).and_then(|i| self.styles.get(i)).copied()
    }

    /// Applies a paint, ignoring the part of the range past the end of the buffer.
    pub fn apply(&mut self, range: SeqRange, style: ResidueStyle) {
        let start = range.start.saturating_sub(1).min(self.styles.len());
        let end = range.end.min(self.styles.len());
        self.styles[start..end].fill(style);
    }
}

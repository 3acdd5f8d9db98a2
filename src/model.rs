//! Data model for the sequence viewer.
//!
//! This module contains the value types everything else is built on:
//! - The immutable residue sequence
//! - 1-indexed inclusive intervals over it
//! - The resolved per-residue style

use std::fmt;
use std::ops::RangeInclusive;

use ratatui::style::{Color, Style};

/// A single sequence with its identifier and residues.
///
/// Positions are 1-indexed. Only ASCII graphic characters are kept, so the
/// residue at position `p` is byte `p - 1`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    /// The sequence identifier (from FASTA header, without '>')
    pub id: String,
    data: String,
}

impl Sequence {
    /// Creates a new sequence, dropping whitespace and non-ASCII characters.
    pub fn new(id: impl Into<String>, data: impl AsRef<str>) -> Self {
        let data = data
            .as_ref()
            .chars()
            .filter(|c| c.is_ascii_graphic())
            .collect();
        Self { id: id.into(), data }
    }

    /// Returns the number of residues.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets the residue at a 1-indexed position.
    pub fn residue(&self, pos: usize) -> Option<char> {
        if pos == 0 {
            return None;
        }
        self.data.as_bytes().get(pos - 1).map(|&b| b as char)
    }

    /// Returns the residues as a string slice.
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Checks that `range` lies within `1..=len`.
    pub fn contains_range(&self, range: SeqRange) -> bool {
        range.start >= 1 && range.end <= self.len()
    }
}

/// A closed interval `start..=end` of 1-indexed positions, with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeqRange {
    pub start: usize,
    pub end: usize,
}

impl SeqRange {
    /// Creates a range, swapping the endpoints if they come in reverse order.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A range covering a single position.
    pub fn single(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// Number of positions in the range.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; a `SeqRange` covers at least one position.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos <= self.end
    }

    /// The overlap of two ranges, if any.
    pub fn intersection(&self, other: SeqRange) -> Option<SeqRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(SeqRange { start, end })
    }

    pub fn positions(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl fmt::Display for SeqRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// The resolved colors of one residue after compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueStyle {
    pub foreground: Color,
    pub background: Color,
}

impl ResidueStyle {
    pub fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
        }
    }
}

/// The three style layers composited onto every residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Residues with no highlight and no selection
    pub base: ResidueStyle,
    /// Default colors of a highlight that does not name its own
    pub highlight: ResidueStyle,
    pub selection: ResidueStyle,
}

impl From<ResidueStyle> for Style {
    fn from(style: ResidueStyle) -> Self {
        Style::default().fg(style.foreground).bg(style.background)
    }
}

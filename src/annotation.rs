//! Named annotations drawn beneath the residue rows.

use ratatui::style::Color;

use crate::model::SeqRange;

/// One annotated interval; falls back to the annotation color when `color` is unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRegion {
    pub range: SeqRange,
    pub color: Option<Color>,
}

/// A named group of regions, e.g. the domains reported by one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    pub color: Color,
    /// Free text shown when the annotation is hovered
    pub description: Option<String>,
    pub regions: Vec<AnnotationRegion>,
}

impl Annotation {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            description: None,
            regions: Vec::new(),
        }
    }

    /// Adds a region drawn in the annotation's own color.
    pub fn with_region(mut self, start: usize, end: usize) -> Self {
        self.regions.push(AnnotationRegion {
            range: SeqRange::new(start, end),
            color: None,
        });
        self
    }

    pub fn with_colored_region(mut self, start: usize, end: usize, color: Color) -> Self {
        self.regions.push(AnnotationRegion {
            range: SeqRange::new(start, end),
            color: Some(color),
        });
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The region covering `pos` and its effective color. Later regions win.
    pub fn region_at(&self, pos: usize) -> Option<(&AnnotationRegion, Color)> {
        self.regions
            .iter()
            .rev()
            .find(|r| r.range.contains(pos))
            .map(|r| (r, r.color.unwrap_or(self.color)))
    }

    /// True if any region overlaps `range`.
    pub fn touches(&self, range: SeqRange) -> bool {
        self.regions
            .iter()
            .any(|r| r.range.intersection(range).is_some())
    }
}

//! Text layouts of a sequence.
//!
//! A [`SequenceLayout`] is a grid of single-column cells, one line per
//! terminal row. Each cell remembers whether it draws a residue (including the
//! blanks trailing it, so a highlight background covers them), part of an
//! annotation, or plain decoration such as headers and position indices.
//!
//! Supported formats:
//! - FASTA: `>id N bp` header, uppercase, a blank every `spaced_each` residues
//! - CODATA: `ENTRY`/`SEQUENCE` header, top ruler, left indices, blank between residues
//! - RAW: lowercase, no decoration
//! - PRIDE: zero-padded indices on both sides

use ratatui::style::Color;

use crate::annotation::Annotation;
use crate::config::{Columns, SequenceFormat};
use crate::model::{SeqRange, Sequence};
use crate::ui::glyphs::Glyphs;

/// What a cell stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Plain,
    Residue(usize),
    Annotation { index: usize, position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub kind: CellKind,
    /// Fixed color for annotation marks
    pub color: Option<Color>,
}

impl Cell {
    fn plain(ch: char) -> Self {
        Self {
            ch,
            kind: CellKind::Plain,
            color: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutLine {
    pub cells: Vec<Cell>,
}

impl LayoutLine {
    fn push_text(&mut self, text: &str) {
        self.cells.extend(text.chars().map(Cell::plain));
    }

    fn push(&mut self, ch: char, kind: CellKind, color: Option<Color>) {
        self.cells.push(Cell { ch, kind, color });
    }

    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.ch).collect()
    }
}

/// Per-format drawing options.
#[derive(Debug, Clone, Copy, Default)]
struct DrawOptions {
    /// Width and padding of the index left of each row
    num_left: Option<(usize, char)>,
    /// Width and padding of the index right of each full row
    num_right: Option<(usize, char)>,
    /// Ruler above the rows, labelled every n residues
    num_top_each: Option<usize>,
    num_cols: usize,
    space_every: usize,
    space_between: bool,
    uppercase: bool,
}

impl DrawOptions {
    fn for_format(format: SequenceFormat, columns: Columns) -> Self {
        let base = DrawOptions {
            num_cols: columns.size.max(1),
            ..Default::default()
        };
        match format {
            SequenceFormat::Fasta => DrawOptions {
                space_every: columns.spaced_each,
                uppercase: true,
                ..base
            },
            SequenceFormat::Codata => DrawOptions {
                num_left: Some((7, ' ')),
                num_top_each: Some(5),
                space_between: true,
                uppercase: true,
                ..base
            },
            SequenceFormat::Raw => base,
            SequenceFormat::Pride => DrawOptions {
                num_left: Some((5, '0')),
                num_right: Some((5, '0')),
                space_every: columns.spaced_each,
                uppercase: true,
                ..base
            },
        }
    }

    /// Blanks drawn after the residue at column `j` (1-based) of a row.
    fn trailing_blanks(&self, j: usize) -> usize {
        if j == self.num_cols {
            return 0;
        }
        let spaced = self.space_every > 0 && j % self.space_every == 0;
        usize::from(spaced) + usize::from(self.space_between)
    }

    fn left_margin(&self) -> usize {
        self.num_left.map_or(0, |(width, _)| width + 2)
    }
}

/// Pads `value` to `width` on the left, or on the right when `align_left`.
fn format_index(value: &str, width: usize, pad: char, align_left: bool) -> String {
    let filling: String = std::iter::repeat(pad)
        .take(width.saturating_sub(value.len()))
        .collect();
    if align_left {
        format!("{value}{filling}")
    } else {
        format!("{filling}{value}")
    }
}

/// Result of looking up a layout cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Nothing,
    Residue(usize),
    Annotation { index: usize, position: usize },
}

/// A sequence laid out in one of the supported formats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceLayout {
    pub format: SequenceFormat,
    lines: Vec<LayoutLine>,
    /// Line holding each residue, indexed by position - 1
    residue_lines: Vec<usize>,
}

impl SequenceLayout {
    pub fn build(
        sequence: &Sequence,
        format: SequenceFormat,
        columns: Columns,
        annotations: &[Annotation],
        glyphs: &Glyphs,
    ) -> Self {
        let opt = DrawOptions::for_format(format, columns);
        let mut layout = SequenceLayout {
            format,
            lines: Vec::new(),
            residue_lines: Vec::with_capacity(sequence.len()),
        };

        match format {
            SequenceFormat::Fasta => {
                layout.push_text(&format!(">{} {} bp", sequence.id, sequence.len()));
            }
            SequenceFormat::Codata => {
                layout.push_text(&format!("ENTRY           {}", sequence.id));
                layout.push_text("SEQUENCE");
            }
            SequenceFormat::Raw | SequenceFormat::Pride => {}
        }

        let len = sequence.len();
        if let Some(each) = opt.num_top_each {
            layout.push_text(&ruler(&opt, each, len));
        }

        let mut row_start = 1;
        while row_start <= len {
            let row_end = row_start.saturating_add(opt.num_cols - 1).min(len);
            let row = SeqRange::new(row_start, row_end);
            layout.push_residue_row(sequence, row, &opt);
            for (index, annotation) in annotations.iter().enumerate() {
                if annotation.touches(row) {
                    layout.push_annotation_row(index, annotation, row, &opt, glyphs);
                }
            }
            row_start = row_start.saturating_add(opt.num_cols);
        }

        if format == SequenceFormat::Codata {
            layout.push_text("///");
        }

        layout
    }

    pub fn lines(&self) -> &[LayoutLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Widest line, in cells.
    pub fn width(&self) -> usize {
        self.lines.iter().map(|l| l.cells.len()).max().unwrap_or(0)
    }

    pub fn cell(&self, line: usize, col: usize) -> Option<&Cell> {
        self.lines.get(line)?.cells.get(col)
    }

    pub fn hit_test(&self, line: usize, col: usize) -> Hit {
        match self.cell(line, col).map(|c| c.kind) {
            Some(CellKind::Residue(pos)) => Hit::Residue(pos),
            Some(CellKind::Annotation { index, position }) => Hit::Annotation { index, position },
            Some(CellKind::Plain) | None => Hit::Nothing,
        }
    }

    /// Number of residues laid out.
    pub fn residue_count(&self) -> usize {
        self.residue_lines.len()
    }

    /// Line on which the residue at `pos` is drawn.
    pub fn line_of(&self, pos: usize) -> Option<usize> {
        pos.checked_sub(1).and_then(|i| self.residue_lines.get(i)).copied()
    }

    fn push_text(&mut self, text: &str) {
        let mut line = LayoutLine::default();
        line.push_text(text);
        self.lines.push(line);
    }

    fn push_residue_row(&mut self, sequence: &Sequence, row: SeqRange, opt: &DrawOptions) {
        let mut line = LayoutLine::default();
        if let Some((width, pad)) = opt.num_left {
            line.push_text(&format_index(&row.start.to_string(), width, pad, false));
            line.push_text("  ");
        }

        for (j, pos) in row.positions().enumerate() {
            let residue = sequence.residue(pos).unwrap_or(' ');
            let ch = if opt.uppercase {
                residue.to_ascii_uppercase()
            } else {
                residue.to_ascii_lowercase()
            };
            line.push(ch, CellKind::Residue(pos), None);
            for _ in 0..opt.trailing_blanks(j + 1) {
                line.push(' ', CellKind::Residue(pos), None);
            }
            self.residue_lines.push(self.lines.len());
        }

        if let Some((width, pad)) = opt.num_right {
            if row.len() == opt.num_cols {
                line.push_text("  ");
                line.push_text(&format_index(&row.end.to_string(), width, pad, false));
            }
        }
        self.lines.push(line);
    }

    fn push_annotation_row(
        &mut self,
        index: usize,
        annotation: &Annotation,
        row: SeqRange,
        opt: &DrawOptions,
        glyphs: &Glyphs,
    ) {
        let mut line = LayoutLine::default();
        line.push_text(&" ".repeat(opt.left_margin()));

        for (j, pos) in row.positions().enumerate() {
            let blanks = opt.trailing_blanks(j + 1);
            let Some((region, color)) = annotation.region_at(pos) else {
                line.push_text(&" ".repeat(1 + blanks));
                continue;
            };
            let range = region.range;
            let mark = match (pos == range.start, pos == range.end) {
                (true, true) => glyphs.annotation_single,
                (true, false) => glyphs.annotation_start,
                (false, true) => glyphs.annotation_end,
                (false, false) => glyphs.annotation_line,
            };
            let kind = CellKind::Annotation {
                index,
                position: pos,
            };
            line.push(mark, kind, Some(color));
            // Join the blanks to the next mark of the same region
            let fill = if pos < range.end {
                glyphs.annotation_line
            } else {
                ' '
            };
            for _ in 0..blanks {
                line.push(fill, kind, Some(color));
            }
        }
        self.lines.push(line);
    }
}

/// The CODATA ruler: one label every `each` residues, aligned on the residue.
///
/// Labels stop at the end of the first row, or of the sequence if shorter.
fn ruler(opt: &DrawOptions, each: usize, len: usize) -> String {
    let size = if opt.space_between { each * 2 } else { each };
    let mut out = " ".repeat(opt.num_left.map_or(0, |(width, _)| width));
    out.push_str(&" ".repeat(size));
    let mut x = each;
    while x < opt.num_cols.min(len) {
        out.push_str(&format_index(&x.to_string(), size, ' ', true));
        x += each;
    }
    out
}

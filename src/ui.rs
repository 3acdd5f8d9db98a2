//! TUI rendering module.
//!
//! This module handles all visual rendering using ratatui:
//! - The terminal renderer the viewer paints into ([`TerminalCanvas`])
//! - Format selector header
//! - The laid out sequence with highlight, selection and annotation colors
//! - Status bar with hover position, selection and command line
//! - Help overlay

pub mod glyphs;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::compositor::{Renderer, StyleBuffer};
use crate::config::SequenceFormat;
use crate::layout::{CellKind, Hit, LayoutLine, SequenceLayout};
use crate::model::{ResidueStyle, SeqRange};
use crate::state::{AppMode, AppState};

/// Height of the format selector header.
const HEADER_HEIGHT: u16 = 1;
/// Height of the status bar.
const STATUS_BAR_HEIGHT: u16 = 1;
/// Width of the help overlay.
const HELP_WIDTH: u16 = 64;

const HELP_TEXT: &[&str] = &[
    "Mouse: press, drag and release over residues to select. Click an annotation mark to report it.",
    "j/k, arrows, PageUp/PageDown, mouse wheel: scroll",
    ":q  quit",
    ":format fasta|codata|raw|pride  change layout",
    ":cols N  residues per row",
    ":hl START END [FG] [BG]  add a highlight",
    ":unhl ID  remove a highlight, :unhlall  remove all",
    ":sel START END  select a range",
    ":annot NAME START END [COLOR]  add an annotation",
    ":rmannot NAME  remove an annotation",
    ":header  toggle the format selector, :hide / :show",
    ":glyphs ascii|fancy  annotation mark style",
    ":N  scroll to position N",
    "",
    "Press any key to close this help.",
];

/// A terminal cell, in absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenCell {
    pub column: u16,
    pub row: u16,
}

impl ScreenCell {
    pub fn new(column: u16, row: u16) -> Self {
        Self { column, row }
    }
}

/// Renderer drawing the viewer into a region of the terminal.
///
/// Keeps the current layout, the painted style of every residue and the
/// scroll offset, so that screen cells can be mapped back to positions.
#[derive(Debug, Clone, Default)]
pub struct TerminalCanvas {
    layout: SequenceLayout,
    styles: StyleBuffer,
    viewport: Rect,
    first_line: usize,
}

impl TerminalCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self) -> &SequenceLayout {
        &self.layout
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn first_line(&self) -> usize {
        self.first_line
    }

    pub fn style_at(&self, pos: usize) -> Option<ResidueStyle> {
        self.styles.style_at(pos)
    }

    /// Sets the screen region the sequence is drawn in.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.clamp_scroll();
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.first_line = self.first_line.saturating_add_signed(delta);
        self.clamp_scroll();
    }

    pub fn page_height(&self) -> usize {
        self.viewport.height as usize
    }

    /// Scrolls just enough for `line` to be visible.
    pub fn ensure_line_visible(&mut self, line: usize) {
        let height = self.page_height().max(1);
        if line < self.first_line {
            self.first_line = line;
        } else if line >= self.first_line + height {
            self.first_line = line + 1 - height;
        }
        self.clamp_scroll();
    }

    /// What is drawn at a screen cell.
    pub fn hit(&self, cell: &ScreenCell) -> Hit {
        let area = self.viewport;
        let inside = cell.column >= area.x
            && cell.column < area.x + area.width
            && cell.row >= area.y
            && cell.row < area.y + area.height;
        if !inside {
            return Hit::Nothing;
        }
        let line = self.first_line + (cell.row - area.y) as usize;
        let col = (cell.column - area.x) as usize;
        self.layout.hit_test(line, col)
    }

    fn clamp_scroll(&mut self) {
        let max_first = self.layout.line_count().saturating_sub(self.page_height());
        self.first_line = self.first_line.min(max_first);
    }

    /// Builds the visible lines, merging runs of equally styled cells into spans.
    ///
    /// Every mark of the `hovered` annotation is drawn reversed.
    fn visible_lines(&self, hovered: Option<usize>) -> Vec<Line<'static>> {
        let end = (self.first_line + self.page_height()).min(self.layout.line_count());
        self.layout.lines()[self.first_line.min(end)..end]
            .iter()
            .map(|line| self.styled_line(line, hovered))
            .collect()
    }

    fn styled_line(&self, line: &LayoutLine, hovered: Option<usize>) -> Line<'static> {
        let mut spans: Vec<Span> = Vec::new();
        let mut text = String::new();
        let mut current = Style::default();

        for cell in &line.cells {
            let style = match cell.kind {
                CellKind::Residue(pos) => self.styles.style_at(pos).map(Style::from).unwrap_or_default(),
                CellKind::Annotation { index, .. } => {
                    let style = Style::default()
                        .fg(cell.color.unwrap_or(Color::Reset))
                        .add_modifier(Modifier::BOLD);
                    if hovered == Some(index) {
                        style.add_modifier(Modifier::REVERSED)
                    } else {
                        style
                    }
                }
                CellKind::Plain => Style::default(),
            };
            if style != current && !text.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut text), current));
            }
            current = style;
            text.push(cell.ch);
        }
        if !text.is_empty() {
            spans.push(Span::styled(text, current));
        }
        Line::from(spans)
    }
}

impl Renderer for TerminalCanvas {
    type Element = ScreenCell;

    fn redraw(&mut self, layout: &SequenceLayout) {
        self.layout = layout.clone();
        self.styles
            .resize(layout.residue_count(), ResidueStyle::new(Color::Reset, Color::Reset));
        self.clamp_scroll();
    }

    fn paint(&mut self, range: SeqRange, style: ResidueStyle) {
        self.styles.apply(range, style);
    }

    fn position_of_element(&self, element: &ScreenCell) -> Option<usize> {
        match self.hit(element) {
            Hit::Residue(pos) => Some(pos),
            Hit::Annotation { .. } | Hit::Nothing => None,
        }
    }
}

/// Screen regions: format header, sequence panel and status bar.
pub struct ScreenLayout {
    pub header: Rect,
    pub panel: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect, header_visible: bool) -> Self {
        let header_height = if header_visible { HEADER_HEIGHT } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height),
                Constraint::Min(3),
                Constraint::Length(STATUS_BAR_HEIGHT),
            ])
            .split(area);
        Self {
            header: chunks[0],
            panel: chunks[1],
            status: chunks[2],
        }
    }

    /// Region inside the panel borders where residues are drawn.
    pub fn sequence_area(&self) -> Rect {
        Block::default().borders(Borders::ALL).inner(self.panel)
    }
}

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &AppState) {
    let viewer = &state.viewer;
    let screen = ScreenLayout::new(frame.area(), viewer.is_format_selector_visible());

    if viewer.is_format_selector_visible() {
        render_header(frame, state, screen.header);
    }
    if viewer.is_visible() {
        render_sequence_panel(frame, state, screen.panel);
    }
    render_status_bar(frame, state, screen.status);

    if state.show_help {
        render_help(frame);
    }
}

/// Renders the format selector.
fn render_header(frame: &mut Frame, state: &AppState, area: Rect) {
    let current = state.viewer.format();
    let mut spans = vec![Span::raw(" Format: ")];
    for format in SequenceFormat::ALL {
        let style = if format == current {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", format), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        "(:format <name>)",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders the laid out sequence.
fn render_sequence_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let viewer = &state.viewer;
    let canvas = viewer.renderer();
    let config = viewer.config();
    let panel_style = Style::default()
        .fg(config.font_color)
        .bg(config.background_color);

    let last_visible = (canvas.first_line() + canvas.page_height()).min(canvas.layout().line_count());
    let title = format!(
        "{} [{} residues | Lines {}-{}/{}]",
        viewer.sequence().id,
        viewer.sequence().len(),
        canvas.first_line() + 1,
        last_visible,
        canvas.layout().line_count()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(panel_style);

    let hovered = state.hover_annotation.map(|(index, _)| index);
    let paragraph = Paragraph::new(canvas.visible_lines(hovered)).block(block);
    frame.render_widget(paragraph, area);
}

/// Describes the hovered residue, or the selection while dragging.
fn pointer_info(state: &AppState) -> String {
    let viewer = &state.viewer;
    if viewer.is_dragging() {
        if let Some(sel) = viewer.selection() {
            return format!("{} ", sel);
        }
    }
    match state.hover.and_then(|pos| viewer.sequence().residue(pos).map(|r| (pos, r))) {
        Some((pos, residue)) => format!("Pos {} ({}) ", pos, residue),
        None => match viewer.selection() {
            Some(sel) => format!("Sel {} ", sel),
            None => String::new(),
        },
    }
}

/// Renders the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let (mode_str, command_str) = match &state.mode {
        AppMode::Normal => ("NORMAL", String::new()),
        AppMode::Command(cmd) => ("COMMAND", format!(":{}", cmd)),
    };

    let position_info = format!(
        "{}| HL {} ",
        pointer_info(state),
        state.viewer.store().highlight_count()
    );

    let tooltip = state.annotation_tooltip();
    let message = tooltip
        .as_deref()
        .or(state.status_message.as_deref())
        .unwrap_or("");

    let left_content = if command_str.is_empty() {
        format!(" {} | {} ", mode_str, message)
    } else {
        format!(" {} | {} ", mode_str, command_str)
    };

    let left_len = left_content.chars().count();
    let status_line = Line::from(vec![
        Span::styled(
            left_content,
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::styled(
            " ".repeat((area.width as usize).saturating_sub(left_len + position_info.len())),
            Style::default().bg(Color::Cyan),
        ),
        Span::styled(
            position_info,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(status_line), area);
}

/// Wraps the help text to fit inside a popup of `width` columns (borders included).
fn help_lines(width: u16) -> Vec<Line<'static>> {
    let text_width = width.saturating_sub(2).max(10) as usize;
    HELP_TEXT
        .iter()
        .flat_map(|entry| {
            if entry.is_empty() {
                vec![Line::from("")]
            } else {
                textwrap::wrap(entry, text_width)
                    .into_iter()
                    .map(|l| Line::from(l.into_owned()))
                    .collect()
            }
        })
        .collect()
}

/// Renders the help overlay centered on the screen.
fn render_help(frame: &mut Frame) {
    let area = frame.area();
    let width = HELP_WIDTH.min(area.width);
    let lines = help_lines(width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .style(Style::default().fg(Color::White).bg(Color::Black));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

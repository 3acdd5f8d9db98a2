//! Terminal application state.
//!
//! Wraps a [`SequenceViewer`] drawing into a [`TerminalCanvas`] and adds what
//! only the terminal host needs: input mode, command line, status message,
//! hover position and help overlay.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::{anyhow, bail, Context, Result};
use ratatui::layout::Rect;
use ratatui::style::Color;
use tracing::info;

use crate::annotation::Annotation;
use crate::component::SequenceViewer;
use crate::compositor::Renderer;
use crate::config::parse_color;
use crate::layout::Hit;
use crate::model::SeqRange;
use crate::notify::SequenceEvent;
use crate::store::HighlightId;
use crate::ui::{glyphs, ScreenCell, TerminalCanvas};

/// Application modes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Command mode (after pressing ':')
    Command(String),
}

/// Complete application state.
pub struct AppState {
    pub viewer: SequenceViewer<TerminalCanvas>,
    pub mode: AppMode,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub show_help: bool,
    /// Residue under the mouse
    pub hover: Option<usize>,
    /// Annotation mark under the mouse, as (annotation index, position)
    pub hover_annotation: Option<(usize, usize)>,
    events: Rc<RefCell<VecDeque<SequenceEvent>>>,
}

impl AppState {
    pub fn new(mut viewer: SequenceViewer<TerminalCanvas>) -> Self {
        let events = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&events);
        viewer.subscribe(move |event| sink.borrow_mut().push_back(event.clone()));
        let status_message = Some(format!(
            "Loaded {} ({} residues). Press :h for help",
            viewer.sequence().id,
            viewer.sequence().len()
        ));
        Self {
            viewer,
            mode: AppMode::Normal,
            should_quit: false,
            status_message,
            show_help: false,
            hover: None,
            hover_annotation: None,
            events,
        }
    }

    /// Moves pending viewer notifications to the status bar.
    pub fn drain_events(&mut self) {
        let pending: Vec<SequenceEvent> = self.events.borrow_mut().drain(..).collect();
        for event in pending {
            info!(%event, "viewer event");
            self.status_message = Some(event.to_string());
        }
    }

    /// Sets the screen region the sequence is drawn in.
    pub fn set_viewport(&mut self, area: Rect) {
        self.viewer.renderer_mut().set_viewport(area);
    }

    // Scrolling

    pub fn scroll_up(&mut self) {
        self.viewer.renderer_mut().scroll_by(-1);
    }

    pub fn scroll_down(&mut self) {
        self.viewer.renderer_mut().scroll_by(1);
    }

    pub fn page_up(&mut self) {
        let page = self.viewer.renderer().page_height().max(1) as isize;
        self.viewer.renderer_mut().scroll_by(-page);
    }

    pub fn page_down(&mut self) {
        let page = self.viewer.renderer().page_height().max(1) as isize;
        self.viewer.renderer_mut().scroll_by(page);
    }

    /// Scrolls until the residue at `pos` is on screen.
    pub fn goto_position(&mut self, pos: usize) -> Result<()> {
        let line = self
            .viewer
            .layout()
            .line_of(pos)
            .ok_or_else(|| anyhow!("Invalid position: {}", pos))?;
        self.viewer.renderer_mut().ensure_line_visible(line);
        Ok(())
    }

    // Mouse
    //
    // A hidden viewer draws nothing, so it ignores the mouse.

    /// Starts a drag, or reports a click on an annotation mark.
    pub fn pointer_down(&mut self, column: u16, row: u16) {
        if !self.viewer.is_visible() {
            return;
        }
        let cell = ScreenCell::new(column, row);
        match self.viewer.renderer().hit(&cell) {
            Hit::Annotation { index, position } => self.viewer.annotation_clicked(index, position),
            Hit::Residue(_) => self.viewer.pointer_down(&cell),
            Hit::Nothing => {}
        }
        self.drain_events();
    }

    pub fn pointer_drag(&mut self, column: u16, row: u16) {
        if !self.viewer.is_visible() {
            return;
        }
        let cell = ScreenCell::new(column, row);
        self.hover(column, row);
        self.viewer.pointer_over(&cell);
        self.drain_events();
    }

    pub fn pointer_up(&mut self, column: u16, row: u16) {
        if !self.viewer.is_visible() {
            return;
        }
        let cell = ScreenCell::new(column, row);
        self.viewer.pointer_up(Some(&cell));
        self.drain_events();
    }

    /// Tracks the residue or annotation mark under the mouse.
    pub fn hover(&mut self, column: u16, row: u16) {
        let hit = if self.viewer.is_visible() {
            self.viewer.renderer().hit(&ScreenCell::new(column, row))
        } else {
            Hit::Nothing
        };
        (self.hover, self.hover_annotation) = match hit {
            Hit::Residue(pos) => (Some(pos), None),
            Hit::Annotation { index, position } => (None, Some((index, position))),
            Hit::Nothing => (None, None),
        };
    }

    /// Name, position and description of the hovered annotation mark.
    pub fn annotation_tooltip(&self) -> Option<String> {
        let (index, position) = self.hover_annotation?;
        let annotation = self.viewer.annotations().get(index)?;
        Some(match &annotation.description {
            Some(description) => format!("{} at {}: {}", annotation.name, position, description),
            None => format!("{} at {}", annotation.name, position),
        })
    }

    // Help

    pub fn show_help(&mut self) {
        self.show_help = true;
    }

    pub fn dismiss_help(&mut self) {
        self.show_help = false;
    }

    // Command mode

    /// Enters command mode.
    pub fn enter_command_mode(&mut self) {
        self.mode = AppMode::Command(String::new());
    }

    /// Handles a character input in command mode.
    pub fn command_input(&mut self, c: char) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.push(c);
        }
    }

    /// Handles backspace in command mode.
    pub fn command_backspace(&mut self) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.pop();
            if cmd.is_empty() {
                self.mode = AppMode::Normal;
            }
        }
    }

    /// Cancels command mode and returns to normal mode.
    pub fn cancel_command(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Executes the command line and returns to normal mode.
    pub fn execute_command(&mut self) {
        if let AppMode::Command(cmd) = std::mem::take(&mut self.mode) {
            if let Err(e) = self.run_command(cmd.trim()) {
                self.status_message = Some(format!("{:#}", e));
            }
            self.drain_events();
        }
        self.mode = AppMode::Normal;
    }

    fn run_command(&mut self, cmd: &str) -> Result<()> {
        let words: Vec<&str> = cmd.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(());
        };

        match (name, args) {
            ("q" | "quit", []) => self.should_quit = true,
            ("h" | "help", []) => self.show_help(),
            ("format", [format]) => {
                self.viewer.set_format(format);
                self.status_message = Some(format!("Format: {}", self.viewer.format()));
            }
            ("cols", [n]) => {
                let n = parse_number(n)?;
                self.viewer.set_num_cols(n)?;
                self.status_message = Some(format!("{} residues per row", n));
            }
            ("hl", [start, end, colors @ ..]) if colors.len() <= 2 => {
                let fg = colors.first().map(|c| parse_color("foreground", c)).transpose()?;
                let bg = colors.get(1).map(|c| parse_color("background", c)).transpose()?;
                let id = self
                    .viewer
                    .highlight(parse_number(start)?, parse_number(end)?, fg, bg)?;
                self.status_message = Some(format!("Highlight {} added", id));
            }
            ("unhl", [id]) => {
                let id = HighlightId(parse_number(id)?);
                if self.viewer.store().highlight(id).is_none() {
                    bail!("No highlight {}", id);
                }
                self.viewer.un_highlight(id);
                self.status_message = Some(format!("Highlight {} removed", id));
            }
            ("unhlall", []) => {
                self.viewer.un_highlight_all();
                self.status_message = Some("Highlights cleared".to_string());
            }
            ("sel", [start, end]) => {
                self.viewer.set_selection(parse_number(start)?, parse_number(end)?)?;
            }
            ("annot", [annotation, start, end, color @ ..]) if color.len() <= 1 => {
                let color = match color.first() {
                    Some(c) => parse_color("annotation", c)?,
                    None => Color::Magenta,
                };
                let range = SeqRange::new(parse_number(start)?, parse_number(end)?);
                if !self.viewer.sequence().contains_range(range) {
                    bail!("Annotation {} {} is outside the sequence", annotation, range);
                }
                self.viewer.set_annotation(
                    Annotation::new(*annotation, color).with_region(range.start, range.end),
                );
                self.status_message = Some(format!("Annotation {} added", annotation));
            }
            ("rmannot", [annotation]) => {
                self.viewer.remove_annotation(annotation);
                self.status_message = Some(format!("Annotation {} removed", annotation));
            }
            ("header", []) => {
                let visible = !self.viewer.is_format_selector_visible();
                self.viewer.format_selector_visible(visible);
            }
            ("glyphs", [style @ ("ascii" | "fancy")]) => {
                self.viewer.set_glyphs(glyphs::select(*style == "fancy"));
            }
            ("hide", []) => self.viewer.hide(),
            ("show", []) => self.viewer.show(),
            (pos, []) if pos.chars().all(|c| c.is_ascii_digit()) => {
                self.goto_position(parse_number(pos)?)?;
            }
            _ => bail!("Unknown command: {}", cmd),
        }
        Ok(())
    }
}

fn parse_number(s: &str) -> Result<usize> {
    s.parse::<usize>()
        .with_context(|| format!("Invalid number: {}", s))
}

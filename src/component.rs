//! The embeddable sequence viewer.
//!
//! [`SequenceViewer`] ties the pieces together: it owns the sequence, its
//! [`IntervalStore`], the [`SelectionController`] and a [`Renderer`], and it
//! exposes the public operations (highlighting, selection, formats,
//! annotations). Every mutation follows the same path:
//! store update, then compositor diff, then paint instructions to the renderer,
//! then notifications.

use ratatui::style::Color;
use tracing::{debug, info, warn};

use crate::annotation::Annotation;
use crate::compositor::{Compositor, PaintInstruction, Renderer};
use crate::config::{Columns, SequenceConfig, SequenceFormat};
use crate::error::{ConfigError, RangeError};
use crate::layout::SequenceLayout;
use crate::model::{ResidueStyle, SeqRange, Sequence};
use crate::notify::{EventKind, Listeners, SequenceEvent};
use crate::selection::{PointerEvent, SelectionController};
use crate::store::{HighlightId, IntervalStore};
use crate::ui::glyphs::{self, Glyphs};

pub struct SequenceViewer<R: Renderer> {
    config: SequenceConfig,
    sequence: Sequence,
    store: IntervalStore,
    selection: SelectionController,
    annotations: Vec<Annotation>,
    layout: SequenceLayout,
    glyphs: Glyphs,
    renderer: R,
    listeners: Listeners,
    visible: bool,
    format_selector_visible: bool,
}

impl<R: Renderer> SequenceViewer<R> {
    /// Creates a viewer and draws it.
    ///
    /// Highlights and selection listed in `config` are applied after the first
    /// draw; entries that do not fit the sequence are skipped with a warning.
    pub fn new(sequence: Sequence, config: SequenceConfig, renderer: R) -> Result<Self, ConfigError> {
        Self::with_glyphs(sequence, config, renderer, glyphs::ascii())
    }

    pub fn with_glyphs(
        sequence: Sequence,
        config: SequenceConfig,
        renderer: R,
        glyphs: Glyphs,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = IntervalStore::new(config.palette(), sequence.len());
        let mut viewer = Self {
            annotations: config.annotations.clone(),
            config,
            sequence,
            store,
            selection: SelectionController::new(),
            layout: SequenceLayout::default(),
            glyphs,
            renderer,
            listeners: Listeners::new(),
            visible: true,
            format_selector_visible: true,
        };
        viewer.redraw();

        for spec in viewer.config.highlights.clone() {
            if let Err(e) = viewer.highlight(spec.start, spec.end, spec.foreground, spec.background) {
                warn!("Skipping configured highlight: {}", e);
            }
        }
        if let Some(range) = viewer.config.selection {
            if let Err(e) = viewer.set_selection(range.start, range.end) {
                warn!("Skipping configured selection: {}", e);
            }
        }
        Ok(viewer)
    }

    // Listeners

    /// Subscribes to every notification.
    pub fn subscribe(&mut self, listener: impl FnMut(&SequenceEvent) + 'static) {
        self.listeners.subscribe(listener);
    }

    /// Subscribes to one kind of notification.
    pub fn on(&mut self, kind: EventKind, listener: impl FnMut(&SequenceEvent) + 'static) {
        self.listeners.on(kind, listener);
    }

    // Highlights

    /// Highlights `start..=end` (1-indexed, inclusive) and returns its id.
    ///
    /// Colors default to the configured highlight colors. Nothing changes when
    /// the range is inverted or leaves the sequence.
    pub fn highlight(
        &mut self,
        start: usize,
        end: usize,
        foreground: Option<Color>,
        background: Option<Color>,
    ) -> Result<HighlightId, RangeError> {
        if start > end {
            debug!(start, end, "rejected inverted highlight");
            return Err(RangeError::Inverted { start, end });
        }
        self.check_bounds(SeqRange { start, end })?;

        let highlight = self
            .store
            .add_highlight(start, end, foreground, background)
            .ok_or(RangeError::Inverted { start, end })?;
        info!(id = highlight.id.0, start, end, "highlight added");
        let paint = Compositor::new(&self.store).on_highlight_added(&highlight);
        self.paint(paint);
        Ok(highlight.id)
    }

    /// Removes a highlight, uncovering whatever was beneath it. Unknown ids are ignored.
    pub fn un_highlight(&mut self, id: HighlightId) {
        let Some(range) = self.store.remove_highlight(id) else {
            debug!(id = id.0, "no such highlight");
            return;
        };
        info!(id = id.0, %range, "highlight removed");
        let paint = Compositor::new(&self.store).on_highlight_removed(range);
        self.paint(paint);
    }

    pub fn un_highlight_all(&mut self) {
        if let Some(range) = self.store.clear_highlights() {
            info!("all highlights removed");
            let paint = Compositor::new(&self.store).restore(range);
            self.paint(paint);
        }
    }

    // Selection

    /// Selects `start..=end`, swapping reversed endpoints.
    ///
    /// Emits [`SequenceEvent::SelectionChanged`] if the selection actually moved.
    pub fn set_selection(&mut self, start: usize, end: usize) -> Result<(), RangeError> {
        let range = SeqRange::new(start, end);
        self.check_bounds(range)?;

        let old = self.store.selection();
        if self.store.set_selection(range.start, range.end) {
            let paint = Compositor::new(&self.store).on_selection_changed(old, Some(range));
            self.paint(paint);
            self.emit(SequenceEvent::SelectionChanged(range));
        }
        Ok(())
    }

    pub fn selection(&self) -> Option<SeqRange> {
        self.store.selection()
    }

    /// Feeds a pointer event, already resolved to a position, to the drag state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let in_bounds = |pos: usize| pos >= 1 && pos <= self.sequence.len();
        match event {
            PointerEvent::Down(pos) | PointerEvent::Over(pos) if !in_bounds(pos) => return,
            _ => {}
        }

        let transition = self.selection.handle(event, &mut self.store);
        if let Some((old, new)) = transition.repaint {
            let paint = Compositor::new(&self.store).on_selection_changed(old, Some(new));
            self.paint(paint);
        }
        if let Some(event) = transition.notification {
            self.emit(event);
        }
    }

    pub fn pointer_down(&mut self, element: &R::Element) {
        if let Some(pos) = self.renderer.position_of_element(element) {
            self.handle_pointer(PointerEvent::Down(pos));
        }
    }

    /// Pointer moved over an element; ignored when it is not a residue.
    pub fn pointer_over(&mut self, element: &R::Element) {
        if let Some(pos) = self.renderer.position_of_element(element) {
            self.handle_pointer(PointerEvent::Over(pos));
        }
    }

    /// Pointer released, over an element or outside the viewer.
    pub fn pointer_up(&mut self, element: Option<&R::Element>) {
        let pos = element.and_then(|e| self.renderer.position_of_element(e));
        self.handle_pointer(PointerEvent::Up(pos));
    }

    pub fn is_dragging(&self) -> bool {
        self.selection.is_dragging()
    }

    // Sequence

    /// Replaces the sequence, dropping highlights, selection and annotations.
    pub fn set_sequence(&mut self, data: &str, identifier: Option<&str>) {
        self.sequence = Sequence::new(identifier.unwrap_or_default(), data);
        self.store.reset(self.sequence.len());
        self.selection.reset();
        self.annotations.clear();
        info!(id = %self.sequence.id, len = self.sequence.len(), "sequence replaced");
        self.redraw();
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    // Formats and geometry

    /// Switches layout by name. Unknown names fall back to PRIDE.
    pub fn set_format(&mut self, name: &str) {
        self.set_format_kind(SequenceFormat::parse_lenient(name));
    }

    pub fn set_format_kind(&mut self, format: SequenceFormat) {
        if self.config.format != format {
            info!(%format, "format changed");
            self.config.format = format;
            self.redraw();
        }
    }

    pub fn format(&self) -> SequenceFormat {
        self.config.format
    }

    /// Sets the number of residues per row.
    pub fn set_num_cols(&mut self, num_cols: usize) -> Result<(), ConfigError> {
        let columns = Columns {
            size: num_cols,
            ..self.config.columns
        };
        columns.validate("columns")?;
        self.config.columns = columns;
        self.redraw();
        Ok(())
    }

    pub fn set_glyphs(&mut self, glyphs: Glyphs) {
        self.glyphs = glyphs;
        self.redraw();
    }

    // Annotations

    pub fn set_annotation(&mut self, annotation: Annotation) {
        info!(name = %annotation.name, regions = annotation.regions.len(), "annotation added");
        self.annotations.push(annotation);
        self.redraw();
    }

    /// Removes every annotation called `name`.
    pub fn remove_annotation(&mut self, name: &str) {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.name != name);
        if self.annotations.len() != before {
            info!(name, "annotation removed");
            self.redraw();
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Reports a click on the annotation drawn at `index`.
    pub fn annotation_clicked(&mut self, index: usize, position: usize) {
        if let Some(annotation) = self.annotations.get(index) {
            let event = SequenceEvent::AnnotationClicked {
                name: annotation.name.clone(),
                position,
            };
            self.emit(event);
        }
    }

    // Visibility

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn format_selector_visible(&mut self, visible: bool) {
        self.format_selector_visible = visible;
    }

    pub fn show_format_selector(&mut self) {
        self.format_selector_visible(true);
    }

    pub fn hide_format_selector(&mut self) {
        self.format_selector_visible(false);
    }

    pub fn is_format_selector_visible(&self) -> bool {
        self.format_selector_visible
    }

    // Accessors

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    pub fn store(&self) -> &IntervalStore {
        &self.store
    }

    pub fn layout(&self) -> &SequenceLayout {
        &self.layout
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Composite style at `pos` from the current state.
    pub fn resolve_style_at(&self, pos: usize) -> ResidueStyle {
        self.store.resolve_style_at(pos)
    }

    fn check_bounds(&self, range: SeqRange) -> Result<(), RangeError> {
        if self.sequence.contains_range(range) {
            Ok(())
        } else {
            debug!(%range, len = self.sequence.len(), "rejected out of bounds range");
            Err(RangeError::OutOfBounds {
                start: range.start,
                end: range.end,
                len: self.sequence.len(),
            })
        }
    }

    fn redraw(&mut self) {
        self.layout = SequenceLayout::build(
            &self.sequence,
            self.config.format,
            self.config.columns,
            &self.annotations,
            &self.glyphs,
        );
        self.renderer.redraw(&self.layout);
        let paint = Compositor::new(&self.store).repaint_all();
        self.paint(paint);
    }

    fn paint(&mut self, instructions: Vec<PaintInstruction>) {
        for instruction in instructions {
            self.renderer.paint(instruction.range, instruction.style);
        }
    }

    fn emit(&mut self, event: SequenceEvent) {
        debug!(%event, "notify");
        self.listeners.emit(&event);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::compositor::StyleBuffer;

    /// Keeps the painted styles and every instruction received since the last `take`.
    #[derive(Default)]
    struct RecordingRenderer {
        buffer: StyleBuffer,
        log: Vec<PaintInstruction>,
        redraws: usize,
        len: usize,
    }

    impl RecordingRenderer {
        fn take(&mut self) -> Vec<PaintInstruction> {
            std::mem::take(&mut self.log)
        }

        /// Positions that received paint, in order, without duplicates.
        fn painted_positions(&mut self) -> Vec<usize> {
            let mut out: Vec<usize> = self.take().iter().flat_map(|i| i.range.positions()).collect();
            out.sort_unstable();
            out.dedup();
            out
        }
    }

    impl Renderer for RecordingRenderer {
        type Element = usize;

        fn redraw(&mut self, layout: &SequenceLayout) {
            self.redraws += 1;
            self.len = layout.residue_count();
            self.buffer.resize(self.len, ResidueStyle::new(Color::Reset, Color::Reset));
        }

        fn paint(&mut self, range: SeqRange, style: ResidueStyle) {
            self.buffer.apply(range, style);
            self.log.push(PaintInstruction::new(range, style));
        }

        fn position_of_element(&self, element: &usize) -> Option<usize> {
            (*element >= 1 && *element <= self.len).then_some(*element)
        }
    }

    fn viewer(len: usize) -> SequenceViewer<RecordingRenderer> {
        let data: String = "ACGT".chars().cycle().take(len).collect();
        let mut viewer = SequenceViewer::new(
            Sequence::new("test", data),
            SequenceConfig::default(),
            RecordingRenderer::default(),
        )
        .unwrap();
        viewer.renderer_mut().take();
        viewer
    }

    fn events(viewer: &mut SequenceViewer<RecordingRenderer>) -> Rc<RefCell<Vec<SequenceEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        viewer.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        seen
    }

    fn assert_consistent(viewer: &SequenceViewer<RecordingRenderer>) {
        for pos in 1..=viewer.sequence().len() {
            assert_eq!(
                viewer.renderer().buffer.style_at(pos),
                Some(viewer.resolve_style_at(pos)),
                "stale paint at position {pos}"
            );
        }
    }

    #[test]
    fn test_initial_draw_paints_everything() {
        let viewer = viewer(40);
        assert_eq!(viewer.renderer().redraws, 1);
        assert_consistent(&viewer);
    }

    #[test]
    fn test_overlapping_highlights() {
        let mut viewer = viewer(100);
        viewer.highlight(10, 20, Some(Color::White), Some(Color::Green)).unwrap();
        viewer.highlight(15, 25, Some(Color::Black), Some(Color::Blue)).unwrap();

        assert_eq!(viewer.resolve_style_at(17), ResidueStyle::new(Color::Black, Color::Blue));
        assert_eq!(viewer.resolve_style_at(12), ResidueStyle::new(Color::White, Color::Green));
        assert_consistent(&viewer);
    }

    #[test]
    fn test_unhighlight_restores_base() {
        let mut viewer = viewer(100);
        let id = viewer.highlight(30, 42, Some(Color::White), Some(Color::Green)).unwrap();
        assert_eq!(id, HighlightId(0));

        viewer.un_highlight(id);
        let base = viewer.config().base_style();
        for pos in 30..=42 {
            assert_eq!(viewer.renderer().buffer.style_at(pos), Some(base));
        }
        assert_consistent(&viewer);
    }

    #[test]
    fn test_unhighlight_twice_is_a_no_op() {
        let mut viewer = viewer(100);
        let id = viewer.highlight(30, 42, None, None).unwrap();
        viewer.un_highlight(id);
        viewer.renderer_mut().take();

        viewer.un_highlight(id);
        assert!(viewer.renderer_mut().take().is_empty());
        assert_eq!(viewer.store().highlight_count(), 0);
    }

    #[test]
    fn test_rejected_highlights_do_not_mutate() {
        let mut viewer = viewer(50);
        assert_eq!(
            viewer.highlight(20, 10, None, None),
            Err(RangeError::Inverted { start: 20, end: 10 })
        );
        assert_eq!(
            viewer.highlight(45, 51, None, None),
            Err(RangeError::OutOfBounds { start: 45, end: 51, len: 50 })
        );
        assert!(viewer.highlight(0, 3, None, None).is_err());
        assert_eq!(viewer.store().highlight_count(), 0);
        assert!(viewer.renderer_mut().take().is_empty());
    }

    #[test]
    fn test_highlight_under_selection() {
        let mut viewer = viewer(50);
        viewer.set_selection(10, 15).unwrap();
        viewer.highlight(12, 20, None, None).unwrap();
        assert_eq!(viewer.resolve_style_at(13), viewer.config().selection_style());
        assert_eq!(viewer.resolve_style_at(17), viewer.config().highlight_style());
        assert_consistent(&viewer);
    }

    #[test]
    fn test_unhighlight_all() {
        let mut viewer = viewer(50);
        viewer.highlight(1, 10, None, None).unwrap();
        viewer.highlight(5, 30, None, None).unwrap();
        viewer.set_selection(8, 9).unwrap();
        viewer.un_highlight_all();
        assert_eq!(viewer.store().highlight_count(), 0);
        assert_eq!(viewer.resolve_style_at(8), viewer.config().selection_style());
        assert_consistent(&viewer);
    }

    #[test]
    fn test_set_selection_notifies_only_on_change() {
        let mut viewer = viewer(50);
        let seen = events(&mut viewer);

        viewer.set_selection(20, 10).unwrap();
        viewer.set_selection(10, 20).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![SequenceEvent::SelectionChanged(SeqRange::new(10, 20))]
        );
        assert!(viewer.set_selection(40, 51).is_err());
        assert_eq!(viewer.selection(), Some(SeqRange::new(10, 20)));
    }

    #[test]
    fn test_drag_growth_paints_only_new_positions() {
        let mut viewer = viewer(50);
        viewer.set_selection(5, 5).unwrap();
        viewer.renderer_mut().take();

        viewer.set_selection(5, 10).unwrap();
        assert_eq!(viewer.renderer_mut().painted_positions(), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_swapped_shrink_restores_released_positions() {
        let mut viewer = viewer(50);
        viewer.set_selection(8, 20).unwrap();
        viewer.renderer_mut().take();

        viewer.set_selection(8, 5).unwrap();
        assert_eq!(viewer.selection(), Some(SeqRange::new(5, 8)));
        let base = viewer.config().base_style();
        let restored: Vec<usize> = viewer
            .renderer_mut()
            .take()
            .iter()
            .filter(|i| i.style == base)
            .flat_map(|i| i.range.positions())
            .collect();
        assert_eq!(restored, (9..=20).collect::<Vec<_>>());
        assert_consistent(&viewer);
    }

    #[test]
    fn test_pointer_drag() {
        let mut viewer = viewer(50);
        let seen = events(&mut viewer);

        viewer.pointer_down(&10);
        viewer.pointer_over(&12);
        viewer.pointer_over(&99); // outside: ignored
        viewer.pointer_over(&14);
        viewer.pointer_up(None);

        assert_eq!(
            *seen.borrow(),
            vec![
                SequenceEvent::SelectionChanging(SeqRange::new(10, 12)),
                SequenceEvent::SelectionChanging(SeqRange::new(10, 14)),
                SequenceEvent::SelectionChanged(SeqRange::new(10, 14)),
            ]
        );
        assert!(!viewer.is_dragging());
        assert_consistent(&viewer);
    }

    #[test]
    fn test_selection_changing_filter() {
        let mut viewer = viewer(50);
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        viewer.on(EventKind::SelectionChanging, move |_| *sink.borrow_mut() += 1);

        viewer.pointer_down(&3);
        viewer.pointer_over(&4);
        viewer.pointer_over(&5);
        viewer.pointer_up(Some(&5));
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_set_sequence_resets() {
        let mut viewer = viewer(50);
        viewer.highlight(1, 10, None, None).unwrap();
        viewer.set_selection(3, 4).unwrap();
        viewer.set_annotation(Annotation::new("A", Color::Green).with_region(1, 5));
        viewer.pointer_down(&7);

        viewer.set_sequence("MKTAYIAKQR", Some("P12345"));
        assert_eq!(viewer.store().highlight_count(), 0);
        assert_eq!(viewer.selection(), None);
        assert!(viewer.annotations().is_empty());
        assert!(!viewer.is_dragging());
        assert_eq!(viewer.sequence().id, "P12345");
        assert_eq!(viewer.sequence().len(), 10);
        assert_consistent(&viewer);

        // Ids restart after a reset
        assert_eq!(viewer.highlight(1, 2, None, None), Ok(HighlightId(0)));
    }

    #[test]
    fn test_format_change_redraws_and_repaints() {
        let mut viewer = viewer(50);
        viewer.highlight(3, 9, None, None).unwrap();
        let redraws = viewer.renderer().redraws;

        viewer.set_format("fasta");
        assert_eq!(viewer.renderer().redraws, redraws);

        viewer.set_format("codata");
        assert_eq!(viewer.format(), SequenceFormat::Codata);
        assert_eq!(viewer.renderer().redraws, redraws + 1);
        assert_consistent(&viewer);

        viewer.set_format("unknown");
        assert_eq!(viewer.format(), SequenceFormat::Pride);
    }

    #[test]
    fn test_set_num_cols() {
        let mut viewer = viewer(50);
        assert!(viewer.set_num_cols(0).is_err());
        viewer.set_num_cols(10).unwrap();
        assert_eq!(viewer.config().columns.size, 10);
        assert_eq!(viewer.layout().line_of(11), Some(2));

        viewer.renderer_mut().take();
        assert!(matches!(
            viewer.set_num_cols(usize::MAX),
            Err(ConfigError::TooManyColumns { .. })
        ));
        assert_eq!(viewer.config().columns.size, 10);
        assert!(viewer.renderer_mut().take().is_empty());
    }

    #[test]
    fn test_annotations() {
        let mut viewer = viewer(50);
        let seen = events(&mut viewer);
        viewer.set_annotation(Annotation::new("UNIPROT", Color::Green).with_region(5, 12));
        viewer.set_annotation(Annotation::new("PFAM", Color::Red).with_region(20, 30));

        viewer.annotation_clicked(1, 25);
        viewer.annotation_clicked(7, 25);
        assert_eq!(
            *seen.borrow(),
            vec![SequenceEvent::AnnotationClicked {
                name: "PFAM".to_string(),
                position: 25
            }]
        );

        viewer.remove_annotation("UNIPROT");
        assert_eq!(viewer.annotations().len(), 1);
        assert_eq!(viewer.annotations()[0].name, "PFAM");
    }

    #[test]
    fn test_configured_highlights_and_selection() {
        let config = SequenceConfig {
            highlights: vec![
                "2:4:white:green".parse().unwrap(),
                "8:99".parse().unwrap(),
            ],
            selection: Some(SeqRange::new(3, 3)),
            ..SequenceConfig::default()
        };
        let viewer = SequenceViewer::new(
            Sequence::new("s", "ACGTACGTAC"),
            config,
            RecordingRenderer::default(),
        )
        .unwrap();
        assert_eq!(viewer.store().highlight_count(), 1);
        assert_eq!(viewer.selection(), Some(SeqRange::single(3)));
        assert_consistent(&viewer);
    }

    #[test]
    fn test_visibility() {
        let mut viewer = viewer(10);
        viewer.hide();
        assert!(!viewer.is_visible());
        viewer.show();
        assert!(viewer.is_visible());
        viewer.hide_format_selector();
        assert!(!viewer.is_format_selector_visible());
        viewer.show_format_selector();
        assert!(viewer.is_format_selector_visible());
    }
}

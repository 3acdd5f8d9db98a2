//! Mouse-driven selection.
//!
//! A two-state machine fed with pointer events on residues:
//! - `Idle --down(p)--> Dragging`: the selection collapses to `p`, which becomes the anchor
//! - `Dragging --over(p)--> Dragging`: the selection spans anchor and `p`
//! - `Dragging --up--> Idle`: the selection is committed
//!
//! The controller updates the [`IntervalStore`] and reports what changed; the
//! caller repaints and forwards the notification.

use tracing::debug;

use crate::model::SeqRange;
use crate::notify::SequenceEvent;
use crate::store::IntervalStore;

/// A pointer event already resolved to a residue position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down(usize),
    Over(usize),
    /// Release, over a residue or anywhere else
    Up(Option<usize>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        anchor: usize,
        /// Selection before the drag started
        before: Option<SeqRange>,
    },
}

/// Result of feeding one pointer event to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition {
    /// Selection before and after, when the store changed
    pub repaint: Option<(Option<SeqRange>, SeqRange)>,
    pub notification: Option<SequenceEvent>,
}

/// Tracks drag gestures over the sequence.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: DragState,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Drops any drag in progress.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn handle(&mut self, event: PointerEvent, store: &mut IntervalStore) -> Transition {
        match (self.state, event) {
            // A down while dragging means the release was lost: start over
            (_, PointerEvent::Down(pos)) => {
                let before = store.selection();
                let changed = store.set_selection(pos, pos);
                self.state = DragState::Dragging { anchor: pos, before };
                debug!(anchor = pos, "selection drag started");
                Transition {
                    repaint: changed.then_some((before, SeqRange::single(pos))),
                    notification: None,
                }
            }
            (DragState::Dragging { anchor, .. }, PointerEvent::Over(pos)) => {
                let old = store.selection();
                if !store.set_selection(anchor, pos) {
                    return Transition::default();
                }
                let range = SeqRange::new(anchor, pos);
                Transition {
                    repaint: Some((old, range)),
                    notification: Some(SequenceEvent::SelectionChanging(range)),
                }
            }
            (DragState::Dragging { before, .. }, PointerEvent::Up(_)) => {
                self.state = DragState::Idle;
                let current = store.selection();
                debug!(?current, "selection drag committed");
                Transition {
                    repaint: None,
                    notification: current
                        .filter(|&range| Some(range) != before)
                        .map(SequenceEvent::SelectionChanged),
                }
            }
            (DragState::Idle, PointerEvent::Over(_) | PointerEvent::Up(_)) => Transition::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::*;
    use crate::model::{Palette, ResidueStyle};

    fn store() -> IntervalStore {
        let style = ResidueStyle::new(Color::Black, Color::White);
        IntervalStore::new(
            Palette {
                base: style,
                highlight: style,
                selection: style,
            },
            100,
        )
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut store = store();
        let mut ctl = SelectionController::new();

        let t = ctl.handle(PointerEvent::Down(10), &mut store);
        assert_eq!(t.repaint, Some((None, SeqRange::single(10))));
        assert_eq!(t.notification, None);
        assert!(ctl.is_dragging());

        let t = ctl.handle(PointerEvent::Over(14), &mut store);
        assert_eq!(t.repaint, Some((Some(SeqRange::single(10)), SeqRange::new(10, 14))));
        assert_eq!(
            t.notification,
            Some(SequenceEvent::SelectionChanging(SeqRange::new(10, 14)))
        );

        // Dragging back past the anchor flips the range
        let t = ctl.handle(PointerEvent::Over(7), &mut store);
        assert_eq!(t.repaint, Some((Some(SeqRange::new(10, 14)), SeqRange::new(7, 10))));

        let t = ctl.handle(PointerEvent::Up(Some(7)), &mut store);
        assert_eq!(t.repaint, None);
        assert_eq!(t.notification, Some(SequenceEvent::SelectionChanged(SeqRange::new(7, 10))));
        assert_eq!(ctl.state(), DragState::Idle);
        assert_eq!(store.selection(), Some(SeqRange::new(7, 10)));
    }

    #[test]
    fn test_over_same_position_is_silent() {
        let mut store = store();
        let mut ctl = SelectionController::new();
        ctl.handle(PointerEvent::Down(10), &mut store);
        ctl.handle(PointerEvent::Over(12), &mut store);
        assert_eq!(ctl.handle(PointerEvent::Over(12), &mut store), Transition::default());
    }

    #[test]
    fn test_idle_ignores_over_and_up() {
        let mut store = store();
        let mut ctl = SelectionController::new();
        assert_eq!(ctl.handle(PointerEvent::Over(5), &mut store), Transition::default());
        assert_eq!(ctl.handle(PointerEvent::Up(Some(5)), &mut store), Transition::default());
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_release_outside_commits() {
        let mut store = store();
        let mut ctl = SelectionController::new();
        ctl.handle(PointerEvent::Down(3), &mut store);
        ctl.handle(PointerEvent::Over(6), &mut store);
        let t = ctl.handle(PointerEvent::Up(None), &mut store);
        assert_eq!(t.notification, Some(SequenceEvent::SelectionChanged(SeqRange::new(3, 6))));
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn test_click_on_current_selection_is_not_a_change() {
        let mut store = store();
        store.set_selection(4, 4);
        let mut ctl = SelectionController::new();

        let t = ctl.handle(PointerEvent::Down(4), &mut store);
        assert_eq!(t.repaint, None);
        let t = ctl.handle(PointerEvent::Up(Some(4)), &mut store);
        assert_eq!(t.notification, None);
    }

    #[test]
    fn test_down_while_dragging_restarts() {
        let mut store = store();
        let mut ctl = SelectionController::new();
        ctl.handle(PointerEvent::Down(3), &mut store);
        ctl.handle(PointerEvent::Over(9), &mut store);
        ctl.handle(PointerEvent::Down(20), &mut store);
        assert_eq!(
            ctl.state(),
            DragState::Dragging {
                anchor: 20,
                before: Some(SeqRange::new(3, 9))
            }
        );
        assert_eq!(store.selection(), Some(SeqRange::single(20)));
    }
}

//! Notifications sent to whoever embeds the viewer.

use std::fmt;

use crate::model::SeqRange;

/// Something the user (or an API call) did to the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceEvent {
    /// Emitted on every update of an in-progress drag
    SelectionChanging(SeqRange),
    /// Emitted once a selection change is final
    SelectionChanged(SeqRange),
    AnnotationClicked { name: String, position: usize },
}

/// Event type used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SelectionChanging,
    SelectionChanged,
    AnnotationClicked,
}

impl SequenceEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SequenceEvent::SelectionChanging(_) => EventKind::SelectionChanging,
            SequenceEvent::SelectionChanged(_) => EventKind::SelectionChanged,
            SequenceEvent::AnnotationClicked { .. } => EventKind::AnnotationClicked,
        }
    }
}

impl fmt::Display for SequenceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceEvent::SelectionChanging(range) => write!(f, "Selecting {}", range),
            SequenceEvent::SelectionChanged(range) => write!(f, "Selected {}", range),
            SequenceEvent::AnnotationClicked { name, position } => {
                write!(f, "Clicked {} on position {}", name, position)
            }
        }
    }
}

type Listener = Box<dyn FnMut(&SequenceEvent)>;

/// Registered event listeners, called in subscription order.
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<(Option<EventKind>, Listener)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to every event.
    pub fn subscribe(&mut self, listener: impl FnMut(&SequenceEvent) + 'static) {
        self.listeners.push((None, Box::new(listener)));
    }

    /// Subscribes to one kind of event.
    pub fn on(&mut self, kind: EventKind, listener: impl FnMut(&SequenceEvent) + 'static) {
        self.listeners.push((Some(kind), Box::new(listener)));
    }

    pub fn emit(&mut self, event: &SequenceEvent) {
        let kind = event.kind();
        for (filter, listener) in &mut self.listeners {
            if filter.map_or(true, |k| k == kind) {
                listener(event);
            }
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_filtered_subscription() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();

        let sink = Rc::clone(&seen);
        listeners.on(EventKind::SelectionChanged, move |e| sink.borrow_mut().push(e.clone()));

        listeners.emit(&SequenceEvent::SelectionChanging(SeqRange::new(1, 2)));
        listeners.emit(&SequenceEvent::SelectionChanged(SeqRange::new(1, 3)));

        assert_eq!(
            *seen.borrow(),
            vec![SequenceEvent::SelectionChanged(SeqRange::new(1, 3))]
        );
    }

    #[test]
    fn test_subscribe_all() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::new();
        let sink = Rc::clone(&count);
        listeners.subscribe(move |_| *sink.borrow_mut() += 1);

        listeners.emit(&SequenceEvent::SelectionChanging(SeqRange::new(1, 2)));
        listeners.emit(&SequenceEvent::AnnotationClicked {
            name: "UNIPROT".to_string(),
            position: 545,
        });
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_display() {
        let event = SequenceEvent::SelectionChanged(SeqRange::new(100, 150));
        assert_eq!(event.to_string(), "Selected [100, 150]");
    }
}

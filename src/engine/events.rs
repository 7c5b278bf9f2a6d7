//! Change notification for the layout engine.
//!
//! Observers are called synchronously, in subscription order, before the
//! mutating engine call returns. An observer that wants to do slow work
//! should hand the event off, e.g. through an `async_channel::Sender`.

use crate::model::Layout;

/// What changed.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    /// The grid or the element set changed.
    LayoutChanged,
    /// The selection changed; carries the new selected id.
    SelectionChanged(Option<String>),
}

/// A subscriber to layout changes.
pub trait LayoutObserver {
    /// Called after the change has been applied. `layout` is the new state.
    fn on_event(&mut self, event: &LayoutEvent, layout: &Layout);
}

impl<F> LayoutObserver for F
where
    F: FnMut(&LayoutEvent, &Layout),
{
    fn on_event(&mut self, event: &LayoutEvent, layout: &Layout) {
        self(event, layout)
    }
}

/// Forwards events without blocking. A full or closed channel drops them.
impl LayoutObserver for async_channel::Sender<LayoutEvent> {
    fn on_event(&mut self, event: &LayoutEvent, _layout: &Layout) {
        if let Err(e) = self.try_send(event.clone()) {
            log::debug!("dropping layout event {:?}: {}", event, e);
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The engine's subscriber list.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(SubscriptionId, Box<dyn LayoutObserver>)>,
}

impl ObserverRegistry {
    pub(crate) fn subscribe(&mut self, observer: Box<dyn LayoutObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn emit(&mut self, event: LayoutEvent, layout: &Layout) {
        log::debug!("layout event {:?} to {} observer(s)", event, self.observers.len());
        for (_, observer) in self.observers.iter_mut() {
            observer.on_event(&event, layout);
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_all_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ObserverRegistry::default();
        for name in ["a", "b"] {
            let log = Rc::clone(&log);
            registry.subscribe(Box::new(move |e: &LayoutEvent, _: &Layout| {
                log.borrow_mut().push(format!("{}:{:?}", name, e));
            }));
        }
        registry.emit(LayoutEvent::LayoutChanged, &Layout::default());
        assert_eq!(
            *log.borrow(),
            vec!["a:LayoutChanged".to_string(), "b:LayoutChanged".to_string()]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let mut registry = ObserverRegistry::default();
        let id = registry.subscribe(Box::new(|_: &LayoutEvent, _: &Layout| {}));
        assert_eq!(registry.len(), 1);
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_channel_observer_drops_when_full() {
        let (tx, rx) = async_channel::bounded(1);
        let mut registry = ObserverRegistry::default();
        registry.subscribe(Box::new(tx));
        registry.emit(LayoutEvent::LayoutChanged, &Layout::default());
        registry.emit(LayoutEvent::SelectionChanged(None), &Layout::default());
        assert_eq!(rx.try_recv().unwrap(), LayoutEvent::LayoutChanged);
        assert!(rx.try_recv().is_err());
    }
}

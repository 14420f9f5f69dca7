use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, trace};

use crate::events::lifecycle::{AjaxEvent, EventKind};

pub type Listener = Rc<dyn Fn(&mut AjaxEvent<'_>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// What listeners decided about a dispatched event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub handled: bool,
    pub cancelled: bool,
}

struct Subscription {
    id: ListenerId,
    kind: Option<EventKind>,
    listener: Listener,
}

/// Typed observer registry for lifecycle events. Listeners run in subscription
/// order on the dispatching thread.
#[derive(Default)]
pub struct EventBus {
    subscriptions: RefCell<Vec<Subscription>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&mut AjaxEvent<'_>) + 'static,
    {
        self.register(Some(kind), Rc::new(listener))
    }

    pub fn subscribe_all<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&mut AjaxEvent<'_>) + 'static,
    {
        self.register(None, Rc::new(listener))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut subscriptions = self.subscriptions.borrow_mut();
        let before = subscriptions.len();
        subscriptions.retain(|subscription| subscription.id != id);
        let removed = subscriptions.len() != before;
        if removed {
            debug!("Listener {:?} unsubscribed", id);
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    /// Runs every matching listener, then reports the flags they left on the event.
    pub fn dispatch(&self, event: &mut AjaxEvent<'_>) -> DispatchOutcome {
        let kind = event.kind();
        let listeners: Vec<Listener> = self
            .subscriptions
            .borrow()
            .iter()
            .filter(|subscription| subscription.kind.map_or(true, |k| k == kind))
            .map(|subscription| Rc::clone(&subscription.listener))
            .collect();

        trace!(event = %kind, listeners = listeners.len(), "Dispatching lifecycle event");

        for listener in listeners {
            listener(event);
        }

        DispatchOutcome {
            handled: event.is_handled(),
            cancelled: event.default_prevented(),
        }
    }

    fn register(&self, kind: Option<EventKind>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscriptions.borrow_mut().push(Subscription { id, kind, listener });
        debug!("Listener {:?} subscribed to {:?}", id, kind);
        id
    }
}

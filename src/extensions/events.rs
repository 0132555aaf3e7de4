use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::SeriesId;
use crate::error::{ChartError, ChartResult};
use crate::interaction::PointerInfo;

/// Events emitted by a line chart to its host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChartEvent {
    /// The series under the pointer changed (`None` when leaving all series).
    MouseOver {
        id: Option<SeriesId>,
        pointer: PointerInfo,
    },
    Click {
        id: Option<SeriesId>,
        pointer: PointerInfo,
    },
    /// A drag in erase mode crossed a shown series.
    Erase { id: SeriesId },
    /// A drag in include mode crossed an erased series.
    Include { id: SeriesId },
    SeriesLoaded { id: SeriesId, success: bool },
    /// Every fetch of the current load batch has completed.
    LoadFinished { loaded: usize, failed: usize },
}

/// Observer notified synchronously, in registration order, for every event.
pub trait ChartObserver {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &ChartEvent);
}

/// Ordered set of observers with unique ids.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Box<dyn ChartObserver>>,
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|observer| observer.id()))
            .finish()
    }
}

impl ObserverRegistry {
    pub fn register(&mut self, observer: Box<dyn ChartObserver>) -> ChartResult<()> {
        let observer_id = observer.id().to_owned();
        if observer_id.is_empty() {
            return Err(ChartError::InvalidData(
                "observer id must not be empty".to_owned(),
            ));
        }
        if self.contains(&observer_id) {
            return Err(ChartError::InvalidData(format!(
                "observer with id `{observer_id}` is already registered"
            )));
        }
        self.observers.push(observer);
        Ok(())
    }

    /// Removes an observer by id. Returns `true` when removed.
    pub fn unregister(&mut self, observer_id: &str) -> bool {
        if let Some(position) = self
            .observers
            .iter()
            .position(|entry| entry.id() == observer_id)
        {
            self.observers.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn contains(&self, observer_id: &str) -> bool {
        self.observers
            .iter()
            .any(|observer| observer.id() == observer_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn dispatch(&mut self, event: ChartEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}

/// Observer that buffers events for the host to drain after a chart call.
///
/// Clones share the same queue, so one clone can be registered while the
/// host keeps another to read from.
#[derive(Debug, Clone)]
pub struct EventQueue {
    id: String,
    events: Rc<RefCell<VecDeque<ChartEvent>>>,
}

impl EventQueue {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            events: Rc::default(),
        }
    }

    #[must_use]
    pub fn drain(&self) -> Vec<ChartEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl ChartObserver for EventQueue {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_event(&mut self, event: &ChartEvent) {
        self.events.borrow_mut().push_back(*event);
    }
}

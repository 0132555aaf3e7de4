mod events;

pub use events::{ChartEvent, ChartObserver, EventQueue, ObserverRegistry};

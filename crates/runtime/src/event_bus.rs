use crate::revision::Revision;

/// Redraw trace entry.
///
/// `surface` names the view that was touched (`"map"`, `"chart1"`, ...);
/// `message` is free text for debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub revision: Revision,
    pub surface: &'static str,
    pub message: String,
}

/// Bounded, ordered event log.
///
/// Oldest events are dropped once `capacity` is reached so a long session
/// does not grow the log without limit.
#[derive(Debug)]
pub struct EventBus {
    events: Vec<Event>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn emit(&mut self, revision: Revision, surface: &'static str, message: impl Into<String>) {
        if self.events.len() == self.capacity {
            self.events.remove(0);
        }
        self.events.push(Event {
            revision,
            surface,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Surfaces touched at `revision`, in emission order.
    pub fn surfaces_at(&self, revision: Revision) -> Vec<&'static str> {
        self.events
            .iter()
            .filter(|e| e.revision == revision)
            .map(|e| e.surface)
            .collect()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

use booker_core::{DomainEvent, EventSink};

/// Sink that writes every event to the `tracing` subscriber.
///
/// Injuries and title changes log at `info`, everything else at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn dispatch(&mut self, event: &DomainEvent) {
        match event {
            DomainEvent::WrestlerInjured { .. } | DomainEvent::TitleChanged { .. } => {
                tracing::info!(target: "booker::events", %event);
            }
            _ => tracing::debug!(target: "booker::events", %event),
        }
    }
}

/// Forwards each event to several sinks in turn.
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<Box<dyn EventSink>>,
}

impl FanOut {
    /// Create an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl EventSink for FanOut {
    fn dispatch(&mut self, event: &DomainEvent) {
        for sink in &mut self.sinks {
            sink.dispatch(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use booker_core::WrestlerId;

    use super::*;

    struct Counter(std::rc::Rc<std::cell::Cell<usize>>);

    impl EventSink for Counter {
        fn dispatch(&mut self, _event: &DomainEvent) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn fan_out_reaches_every_sink() {
        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut sink = FanOut::new()
            .with(TracingSink)
            .with(Counter(count.clone()))
            .with(Counter(count.clone()));
        sink.dispatch(&DomainEvent::BumpAdded {
            wrestler: WrestlerId::new(),
        });
        assert_eq!(count.get(), 2);
    }
}

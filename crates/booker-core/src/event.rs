use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{RivalryId, TitleId, WrestlerId};

/// A side effect produced by a booking operation.
///
/// Operations return these as values; persisting and dispatching them is
/// up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Fans were gained or lost.
    FanAwarded {
        /// The wrestler whose fan count changes.
        wrestler: WrestlerId,
        /// Signed change in fans.
        amount: i64,
        /// Why the fans changed.
        reason: String,
    },
    /// Heat between two wrestlers changed.
    HeatChanged {
        /// The rivalry ledger the change was written to, once known.
        rivalry: Option<RivalryId>,
        /// The two wrestlers involved.
        wrestlers: [WrestlerId; 2],
        /// Requested change in heat.
        delta: i32,
        /// Why the heat changed.
        reason: String,
        /// Heat total after the change, once applied.
        total: Option<u32>,
    },
    /// A wrestler took a bump.
    BumpAdded {
        /// The wrestler.
        wrestler: WrestlerId,
    },
    /// A wrestler was injured.
    WrestlerInjured {
        /// The wrestler.
        wrestler: WrestlerId,
        /// What caused the injury.
        reason: String,
    },
    /// A championship changed hands.
    TitleChanged {
        /// The title.
        title: TitleId,
        /// The previous champion, if any.
        from: Option<WrestlerId>,
        /// The new champion, if any.
        to: Option<WrestlerId>,
    },
    /// A message for a wrestler's inbox.
    InboxItemCreated {
        /// The recipient, or everyone when absent.
        recipient: Option<WrestlerId>,
        /// The message body.
        message: String,
    },
}

impl DomainEvent {
    /// Check whether a given wrestler is involved in this event.
    pub fn involves(&self, id: WrestlerId) -> bool {
        match self {
            Self::FanAwarded { wrestler, .. }
            | Self::BumpAdded { wrestler }
            | Self::WrestlerInjured { wrestler, .. } => *wrestler == id,
            Self::HeatChanged { wrestlers, .. } => wrestlers.contains(&id),
            Self::TitleChanged { from, to, .. } => *from == Some(id) || *to == Some(id),
            Self::InboxItemCreated { recipient, .. } => *recipient == Some(id),
        }
    }
}

impl fmt::Display for DomainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FanAwarded {
                wrestler,
                amount,
                reason,
            } => write!(f, "{wrestler} fans {amount:+} ({reason})"),
            Self::HeatChanged {
                wrestlers,
                delta,
                reason,
                total,
                ..
            } => match total {
                Some(t) => write!(
                    f,
                    "heat {} vs {} {delta:+} -> {t} ({reason})",
                    wrestlers[0], wrestlers[1]
                ),
                None => write!(
                    f,
                    "heat {} vs {} {delta:+} ({reason})",
                    wrestlers[0], wrestlers[1]
                ),
            },
            Self::BumpAdded { wrestler } => write!(f, "{wrestler} took a bump"),
            Self::WrestlerInjured { wrestler, reason } => {
                write!(f, "{wrestler} injured ({reason})")
            }
            Self::TitleChanged { title, from, to } => {
                let from = from.map_or_else(|| "vacant".to_string(), |w| w.to_string());
                let to = to.map_or_else(|| "vacant".to_string(), |w| w.to_string());
                write!(f, "title {title}: {from} -> {to}")
            }
            Self::InboxItemCreated { message, .. } => write!(f, "inbox: {message}"),
        }
    }
}

/// Receives domain events once an operation has committed.
pub trait EventSink {
    /// Deliver one event. Delivery is fire-and-forget.
    fn dispatch(&mut self, event: &DomainEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn dispatch(&mut self, _event: &DomainEvent) {}
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct EventBuffer {
    events: Vec<DomainEvent>,
}

impl EventBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a slice of all buffered events.
    pub fn events(&self) -> &[DomainEvent] {
        &self.events
    }

    /// Return all events involving the given wrestler.
    pub fn events_for(&self, id: WrestlerId) -> Vec<&DomainEvent> {
        self.events.iter().filter(|e| e.involves(id)).collect()
    }

    /// Remove and return every buffered event.
    pub fn drain(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    /// Return the number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for EventBuffer {
    fn dispatch(&mut self, event: &DomainEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_collects_and_filters() {
        let a = WrestlerId::new();
        let b = WrestlerId::new();
        let mut buf = EventBuffer::new();
        buf.dispatch(&DomainEvent::BumpAdded { wrestler: a });
        buf.dispatch(&DomainEvent::HeatChanged {
            rivalry: None,
            wrestlers: [a, b],
            delta: 3,
            reason: "match".into(),
            total: None,
        });
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.events_for(b).len(), 1);
        assert_eq!(buf.drain().len(), 2);
        assert!(buf.is_empty());
    }

    #[test]
    fn display_fan_award() {
        let w = WrestlerId::new();
        let e = DomainEvent::FanAwarded {
            wrestler: w,
            amount: -2_000,
            reason: "loss".into(),
        };
        assert!(e.to_string().ends_with("fans -2000 (loss)"));
    }

    #[test]
    fn serde_tagged() {
        let e = DomainEvent::InboxItemCreated {
            recipient: None,
            message: "hello".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"type\":\"inbox_item_created\""));
        let back: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }
}

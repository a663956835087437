use serde::{Deserialize, Serialize};

use crate::ids::{NpcId, SegmentId, WrestlerId};
use crate::matches::Stipulation;

/// Highest possible referee awareness.
pub const MAX_AWARENESS: u8 = 100;

/// What the referee has noticed during a segment.
///
/// Awareness only ever rises; once it reaches 100 it stays there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterferenceState {
    awareness: u8,
    ejected: Vec<WrestlerId>,
    disqualified: Option<WrestlerId>,
}

impl InterferenceState {
    /// Start with the referee at the given awareness (clamped to 100).
    pub fn with_awareness(awareness: u8) -> Self {
        Self {
            awareness: awareness.min(MAX_AWARENESS),
            ..Self::default()
        }
    }

    /// Current referee awareness, 0-100.
    pub fn awareness(&self) -> u8 {
        self.awareness
    }

    /// Raise awareness by `amount`, saturating at 100. Returns the new level.
    pub fn raise_awareness(&mut self, amount: u8) -> u8 {
        self.awareness = self.awareness.saturating_add(amount).min(MAX_AWARENESS);
        self.awareness
    }

    /// Interferers thrown out of ringside.
    pub fn ejected(&self) -> &[WrestlerId] {
        &self.ejected
    }

    /// Whether the interferer has been ejected.
    pub fn is_ejected(&self, wrestler: WrestlerId) -> bool {
        self.ejected.contains(&wrestler)
    }

    /// Record an ejection.
    pub fn eject(&mut self, wrestler: WrestlerId) {
        if !self.is_ejected(wrestler) {
            self.ejected.push(wrestler);
        }
    }

    /// Whether the match has been thrown out.
    pub fn is_disqualified(&self) -> bool {
        self.disqualified.is_some()
    }

    /// The wrestler whose side was disqualified, if any.
    pub fn disqualified_side(&self) -> Option<WrestlerId> {
        self.disqualified
    }

    /// Record a disqualification against `offender`'s side.
    pub fn disqualify(&mut self, offender: WrestlerId) {
        if self.disqualified.is_none() {
            self.disqualified = Some(offender);
        }
    }
}

/// A segment on a show, typically a match, with its interference state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique identifier.
    pub id: SegmentId,
    /// Display name.
    pub name: String,
    /// Officiating referee, if any.
    #[serde(default)]
    pub referee: Option<NpcId>,
    /// Stipulation in force.
    #[serde(default)]
    pub stipulation: Option<Stipulation>,
    /// Wrestlers booked in the segment.
    #[serde(default)]
    pub participants: Vec<WrestlerId>,
    /// Referee-awareness state for this segment.
    #[serde(default)]
    pub interference: InterferenceState,
}

impl Segment {
    /// Create a segment with a fresh interference state.
    pub fn new(name: impl Into<String>, participants: Vec<WrestlerId>) -> Self {
        Self {
            id: SegmentId::new(),
            name: name.into(),
            referee: None,
            stipulation: None,
            participants,
            interference: InterferenceState::default(),
        }
    }

    /// Assign a referee.
    pub fn with_referee(mut self, referee: NpcId) -> Self {
        self.referee = Some(referee);
        self
    }

    /// Attach a stipulation.
    pub fn with_stipulation(mut self, stipulation: Stipulation) -> Self {
        self.stipulation = Some(stipulation);
        self
    }

    /// Whether disqualifications are waived for this segment.
    pub fn is_no_dq(&self) -> bool {
        self.stipulation.as_ref().is_some_and(|s| s.no_dq)
    }
}

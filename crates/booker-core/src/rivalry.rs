use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{RivalryId, WrestlerId};

/// Heat at which the rivals must meet on the next show.
pub const MATCH_REQUIRED_HEAT: u32 = 10;
/// Heat at which the rivalry may be resolved.
pub const RESOLUTION_ELIGIBLE_HEAT: u32 = 20;
/// Heat at which the next meeting must carry a stipulation.
pub const STIPULATION_REQUIRED_HEAT: u32 = 30;

/// How hot a rivalry is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RivalryIntensity {
    /// 0 - 9 heat.
    Simmering,
    /// 10 - 19 heat.
    Heated,
    /// 20 - 29 heat.
    Intense,
    /// 30+ heat.
    Explosive,
}

impl RivalryIntensity {
    /// All intensities in ascending order.
    pub fn all() -> &'static [Self] {
        &[Self::Simmering, Self::Heated, Self::Intense, Self::Explosive]
    }

    /// The intensity band for a heat total.
    pub fn from_heat(heat: u32) -> Self {
        match heat {
            h if h >= STIPULATION_REQUIRED_HEAT => Self::Explosive,
            h if h >= RESOLUTION_ELIGIBLE_HEAT => Self::Intense,
            h if h >= MATCH_REQUIRED_HEAT => Self::Heated,
            _ => Self::Simmering,
        }
    }

    /// Inclusive heat range of this band; the top band is open-ended.
    pub const fn heat_range(self) -> (u32, Option<u32>) {
        match self {
            Self::Simmering => (0, Some(MATCH_REQUIRED_HEAT - 1)),
            Self::Heated => (MATCH_REQUIRED_HEAT, Some(RESOLUTION_ELIGIBLE_HEAT - 1)),
            Self::Intense => (RESOLUTION_ELIGIBLE_HEAT, Some(STIPULATION_REQUIRED_HEAT - 1)),
            Self::Explosive => (STIPULATION_REQUIRED_HEAT, None),
        }
    }

    /// Parse an intensity name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "simmering" => Some(Self::Simmering),
            "heated" => Some(Self::Heated),
            "intense" => Some(Self::Intense),
            "explosive" => Some(Self::Explosive),
            _ => None,
        }
    }
}

impl fmt::Display for RivalryIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simmering => write!(f, "Simmering"),
            Self::Heated => write!(f, "Heated"),
            Self::Intense => write!(f, "Intense"),
            Self::Explosive => write!(f, "Explosive"),
        }
    }
}

/// One entry in a rivalry's heat ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatEvent {
    /// The requested change.
    pub delta: i32,
    /// Why the heat changed.
    pub reason: String,
    /// Heat total after the change was applied.
    pub heat_after: u32,
    /// When the change was recorded.
    pub at: DateTime<Utc>,
}

/// A feud between two wrestlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rivalry {
    /// Unique identifier.
    pub id: RivalryId,
    /// First rival.
    pub wrestler_a: WrestlerId,
    /// Second rival.
    pub wrestler_b: WrestlerId,
    /// Optional storyline notes.
    #[serde(default)]
    pub notes: Option<String>,
    heat: u32,
    active: bool,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    history: Vec<HeatEvent>,
}

impl Rivalry {
    /// Start a new, active rivalry with zero heat.
    pub fn new(wrestler_a: WrestlerId, wrestler_b: WrestlerId) -> Self {
        Self {
            id: RivalryId::new(),
            wrestler_a,
            wrestler_b,
            notes: None,
            heat: 0,
            active: true,
            started_at: Utc::now(),
            ended_at: None,
            history: Vec::new(),
        }
    }

    /// Current heat total.
    pub fn heat(&self) -> u32 {
        self.heat
    }

    /// Whether the rivalry is still running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// When the rivalry started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the rivalry ended, if it has.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Heat ledger, oldest first.
    pub fn history(&self) -> &[HeatEvent] {
        &self.history
    }

    /// Intensity band for the current heat.
    pub fn intensity(&self) -> RivalryIntensity {
        RivalryIntensity::from_heat(self.heat)
    }

    /// The rivals must meet on the next show.
    pub fn requires_match(&self) -> bool {
        self.active && self.heat >= MATCH_REQUIRED_HEAT
    }

    /// The rivalry may be resolved.
    pub fn eligible_for_resolution(&self) -> bool {
        self.active && self.heat >= RESOLUTION_ELIGIBLE_HEAT
    }

    /// The next meeting must carry a stipulation.
    pub fn requires_stipulation_match(&self) -> bool {
        self.active && self.heat >= STIPULATION_REQUIRED_HEAT
    }

    /// Whether the wrestler is one of the rivals.
    pub fn involves(&self, wrestler: WrestlerId) -> bool {
        self.wrestler_a == wrestler || self.wrestler_b == wrestler
    }

    /// Whether this rivalry is between exactly these two wrestlers, in
    /// either order.
    pub fn is_between(&self, a: WrestlerId, b: WrestlerId) -> bool {
        (self.wrestler_a == a && self.wrestler_b == b)
            || (self.wrestler_a == b && self.wrestler_b == a)
    }

    /// The other rival, if `wrestler` is part of this rivalry.
    pub fn opponent_of(&self, wrestler: WrestlerId) -> Option<WrestlerId> {
        if self.wrestler_a == wrestler {
            Some(self.wrestler_b)
        } else if self.wrestler_b == wrestler {
            Some(self.wrestler_a)
        } else {
            None
        }
    }

    /// Apply a heat change and append it to the ledger. Heat floors at
    /// zero; the entry records the requested delta.
    pub fn record_heat(
        &mut self,
        delta: i32,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> &HeatEvent {
        let total = i64::from(self.heat) + i64::from(delta);
        self.heat = u32::try_from(total.max(0)).unwrap_or(u32::MAX);
        self.history.push(HeatEvent {
            delta,
            reason: reason.into(),
            heat_after: self.heat,
            at,
        });
        &self.history[self.history.len() - 1]
    }

    /// Mark the rivalry as over.
    pub fn close(&mut self, at: DateTime<Utc>) {
        self.active = false;
        self.ended_at = Some(at);
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{FactionId, WrestlerId};

/// Bumps a wrestler can absorb before the next one causes an injury.
pub const BUMPS_PER_INJURY: u32 = 3;

/// Bound on the alignment score in either direction.
pub const MAX_ALIGNMENT_LEVEL: i8 = 5;

/// A wrestler's rank on the card, derived purely from fan count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrestlerTier {
    /// 0 - 9,999 fans.
    Rookie,
    /// 10,000 - 24,999 fans.
    Riser,
    /// 25,000 - 39,999 fans.
    Contender,
    /// 40,000 - 59,999 fans.
    Midcarder,
    /// 60,000 - 99,999 fans.
    MainEventer,
    /// 100,000+ fans.
    Icon,
}

impl WrestlerTier {
    /// All tiers in ascending order.
    pub fn all() -> &'static [Self] {
        &[
            Self::Rookie,
            Self::Riser,
            Self::Contender,
            Self::Midcarder,
            Self::MainEventer,
            Self::Icon,
        ]
    }

    /// The tier for a fan count. Negative counts are treated as zero.
    pub fn from_fans(fans: i64) -> Self {
        Self::all()
            .iter()
            .rev()
            .copied()
            .find(|tier| fans >= tier.min_fans())
            .unwrap_or(Self::Rookie)
    }

    /// Lowest fan count that belongs to this tier.
    pub const fn min_fans(self) -> i64 {
        match self {
            Self::Rookie => 0,
            Self::Riser => 10_000,
            Self::Contender => 25_000,
            Self::Midcarder => 40_000,
            Self::MainEventer => 60_000,
            Self::Icon => 100_000,
        }
    }

    /// Position of the tier in ascending order, starting at 0.
    pub const fn index(self) -> u32 {
        match self {
            Self::Rookie => 0,
            Self::Riser => 1,
            Self::Contender => 2,
            Self::Midcarder => 3,
            Self::MainEventer => 4,
            Self::Icon => 5,
        }
    }

    /// Bonus added to a wrestler's match weight.
    pub const fn match_bonus(self) -> u32 {
        self.index() * 4
    }

    /// Parse a tier from a name such as `main_eventer` or `Main Eventer`.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "rookie" => Some(Self::Rookie),
            "riser" => Some(Self::Riser),
            "contender" => Some(Self::Contender),
            "midcarder" => Some(Self::Midcarder),
            "maineventer" => Some(Self::MainEventer),
            "icon" => Some(Self::Icon),
            _ => None,
        }
    }
}

impl fmt::Display for WrestlerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rookie => write!(f, "Rookie"),
            Self::Riser => write!(f, "Riser"),
            Self::Contender => write!(f, "Contender"),
            Self::Midcarder => write!(f, "Midcarder"),
            Self::MainEventer => write!(f, "Main Eventer"),
            Self::Icon => write!(f, "Icon"),
        }
    }
}

/// Which side of the crowd a wrestler plays to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// A fan favourite.
    Face,
    /// A villain.
    Heel,
    /// Neither.
    Neutral,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Face => write!(f, "Face"),
            Self::Heel => write!(f, "Heel"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// A wrestler on the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wrestler {
    /// Unique identifier.
    pub id: WrestlerId,
    /// Ring name.
    pub name: String,
    /// Current fan count, never negative.
    pub fans: i64,
    /// Health baseline.
    #[serde(default = "default_baseline")]
    pub health: u32,
    /// Stamina baseline.
    #[serde(default = "default_baseline")]
    pub stamina: u32,
    /// Bumps taken since the last injury.
    #[serde(default)]
    pub bumps: u32,
    /// Injuries that have not healed yet.
    #[serde(default)]
    pub injuries: u32,
    /// Faction membership, if any.
    #[serde(default)]
    pub faction: Option<FactionId>,
    /// Signed alignment score: positive is face, negative is heel.
    #[serde(default)]
    pub alignment_score: i8,
}

fn default_baseline() -> u32 {
    100
}

impl Wrestler {
    /// Create a wrestler with the given fan count and default baselines.
    pub fn new(name: impl Into<String>, fans: i64) -> Self {
        Self {
            id: WrestlerId::new(),
            name: name.into(),
            fans: fans.max(0),
            health: default_baseline(),
            stamina: default_baseline(),
            bumps: 0,
            injuries: 0,
            faction: None,
            alignment_score: 0,
        }
    }

    /// Set the faction.
    pub fn with_faction(mut self, faction: FactionId) -> Self {
        self.faction = Some(faction);
        self
    }

    /// Set the alignment score, clamped to the alignment bounds.
    pub fn with_alignment_score(mut self, score: i8) -> Self {
        self.alignment_score = score.clamp(-MAX_ALIGNMENT_LEVEL, MAX_ALIGNMENT_LEVEL);
        self
    }

    /// The tier implied by the current fan count.
    pub fn tier(&self) -> WrestlerTier {
        WrestlerTier::from_fans(self.fans)
    }

    /// Face, heel, or neutral, derived from the alignment score.
    pub fn alignment(&self) -> Alignment {
        match self.alignment_score {
            s if s > 0 => Alignment::Face,
            s if s < 0 => Alignment::Heel,
            _ => Alignment::Neutral,
        }
    }

    /// Strength of the alignment, 0-5.
    pub fn alignment_level(&self) -> u8 {
        self.alignment_score.unsigned_abs()
    }

    /// Move the alignment score, clamped to the alignment bounds.
    pub fn shift_alignment(&mut self, amount: i8) {
        self.alignment_score = self
            .alignment_score
            .saturating_add(amount)
            .clamp(-MAX_ALIGNMENT_LEVEL, MAX_ALIGNMENT_LEVEL);
    }

    /// Add (or remove) fans. The count floors at zero.
    pub fn add_fans(&mut self, delta: i64) {
        self.fans = self.fans.saturating_add(delta).max(0);
    }

    /// Whether the wrestler has at least `cost` fans.
    pub fn can_afford(&self, cost: i64) -> bool {
        self.fans >= cost
    }

    /// Deduct `cost` fans if affordable. Returns `false` and leaves the
    /// count unchanged otherwise.
    pub fn spend_fans(&mut self, cost: i64) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.fans -= cost;
        true
    }

    /// Record a bump. Returns `true` when the bump causes an injury, in
    /// which case the bump counter resets.
    pub fn add_bump(&mut self) -> bool {
        self.bumps += 1;
        if self.bumps >= BUMPS_PER_INJURY {
            self.bumps = 0;
            self.injuries += 1;
            return true;
        }
        false
    }

    /// Heal one injury, if any.
    pub fn heal_injury(&mut self) {
        self.injuries = self.injuries.saturating_sub(1);
    }

    /// Penalty applied to match weight for accumulated punishment.
    pub fn health_penalty(&self) -> u32 {
        self.bumps + 3 * self.injuries
    }
}

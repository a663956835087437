use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{TitleId, WrestlerId};

/// Fans a challenger pays to enter a title challenge.
pub const CHALLENGE_COST: i64 = 15_000;

/// Championship prestige tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleTier {
    /// Hardcore division title.
    Extreme,
    /// Tag team titles.
    TagTeam,
    /// Secondary singles title.
    Intertemporal,
    /// The top title.
    World,
}

impl TitleTier {
    /// All tiers, least prestigious first.
    pub fn all() -> &'static [Self] {
        &[Self::Extreme, Self::TagTeam, Self::Intertemporal, Self::World]
    }

    /// Fans required to hold or challenge for a title of this tier.
    pub const fn required_fans(self) -> i64 {
        match self {
            Self::Extreme => 25_000,
            Self::TagTeam => 40_000,
            Self::Intertemporal => 60_000,
            Self::World => 100_000,
        }
    }

    /// Fans deducted from a challenger.
    pub const fn challenge_cost(self) -> i64 {
        CHALLENGE_COST
    }

    /// Prestige rank, 0 for the lowest tier.
    pub const fn prestige(self) -> u8 {
        match self {
            Self::Extreme => 0,
            Self::TagTeam => 1,
            Self::Intertemporal => 2,
            Self::World => 3,
        }
    }

    /// Whether a fan count meets the requirement.
    pub fn is_eligible(self, fans: i64) -> bool {
        fans >= self.required_fans()
    }

    /// Every tier a fan count qualifies for, least prestigious first.
    pub fn eligible_for(fans: i64) -> Vec<Self> {
        Self::all()
            .iter()
            .copied()
            .filter(|t| t.is_eligible(fans))
            .collect()
    }

    /// The most prestigious tier a fan count qualifies for.
    pub fn highest_eligible(fans: i64) -> Option<Self> {
        Self::eligible_for(fans).into_iter().last()
    }

    /// Parse a tier name such as `world` or `tag_team`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "extreme" => Some(Self::Extreme),
            "tag_team" | "tag" => Some(Self::TagTeam),
            "intertemporal" => Some(Self::Intertemporal),
            "world" => Some(Self::World),
            _ => None,
        }
    }
}

impl fmt::Display for TitleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extreme => write!(f, "Extreme"),
            Self::TagTeam => write!(f, "Tag Team"),
            Self::Intertemporal => write!(f, "Intertemporal"),
            Self::World => write!(f, "World"),
        }
    }
}

/// One championship reign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleReign {
    /// The champion.
    pub wrestler: WrestlerId,
    /// When the title was won.
    pub started_at: DateTime<Utc>,
    /// When the title was lost or vacated; open while the reign lasts.
    pub ended_at: Option<DateTime<Utc>>,
}

impl TitleReign {
    /// Whole days the reign lasted, or has lasted so far as of `now`.
    pub fn days(&self, now: DateTime<Utc>) -> i64 {
        let end = self.ended_at.unwrap_or(now);
        (end - self.started_at).num_days().max(0)
    }
}

/// A championship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    /// Unique identifier.
    pub id: TitleId,
    /// Display name.
    pub name: String,
    /// Prestige tier.
    pub tier: TitleTier,
    /// Whether the title is defended.
    pub active: bool,
    #[serde(default)]
    champion: Option<WrestlerId>,
    #[serde(default)]
    reigns: Vec<TitleReign>,
    #[serde(default)]
    challengers: Vec<WrestlerId>,
}

impl Title {
    /// Create a vacant, active title.
    pub fn new(name: impl Into<String>, tier: TitleTier) -> Self {
        Self {
            id: TitleId::new(),
            name: name.into(),
            tier,
            active: true,
            champion: None,
            reigns: Vec::new(),
            challengers: Vec::new(),
        }
    }

    /// The current champion.
    pub fn champion(&self) -> Option<WrestlerId> {
        self.champion
    }

    /// Whether nobody holds the title.
    pub fn is_vacant(&self) -> bool {
        self.champion.is_none()
    }

    /// Every reign, oldest first.
    pub fn reigns(&self) -> &[TitleReign] {
        &self.reigns
    }

    /// Wrestlers who have paid to challenge for the title.
    pub fn challengers(&self) -> &[WrestlerId] {
        &self.challengers
    }

    /// The open reign, if any.
    pub fn current_reign(&self) -> Option<&TitleReign> {
        self.reigns.last().filter(|r| r.ended_at.is_none())
    }

    /// Number of reigns in the title's history.
    pub fn total_reigns(&self) -> usize {
        self.reigns.len()
    }

    /// Number of reigns a wrestler has had.
    pub fn reigns_for(&self, wrestler: WrestlerId) -> usize {
        self.reigns.iter().filter(|r| r.wrestler == wrestler).count()
    }

    /// Days the current champion has held the title as of `now`.
    pub fn current_reign_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.current_reign().map(|r| r.days(now))
    }

    /// Close the open reign, if any, leaving the title vacant.
    pub fn end_reign(&mut self, at: DateTime<Utc>) -> Option<WrestlerId> {
        if let Some(reign) = self.reigns.last_mut().filter(|r| r.ended_at.is_none()) {
            reign.ended_at = Some(at);
        }
        self.champion.take()
    }

    /// Close any open reign and open a new one for `wrestler`.
    pub fn begin_reign(&mut self, wrestler: WrestlerId, at: DateTime<Utc>) {
        self.end_reign(at);
        self.champion = Some(wrestler);
        self.challengers.retain(|c| *c != wrestler);
        self.reigns.push(TitleReign {
            wrestler,
            started_at: at,
            ended_at: None,
        });
    }

    /// Record a paid challenger.
    pub fn add_challenger(&mut self, wrestler: WrestlerId) {
        if !self.challengers.contains(&wrestler) {
            self.challengers.push(wrestler);
        }
    }
}

//! Lookups the engines consult for relationship data they do not own.

use std::collections::HashMap;

use booker_core::{FactionId, NpcId, Wrestler, WrestlerId};

/// How closely two wrestlers are allied, 0-100.
pub trait AffinityLookup {
    /// Affinity between two wrestlers, 0-100.
    fn affinity_between(&self, a: WrestlerId, b: WrestlerId) -> u8;
}

/// How sharp a referee or other official is, 0-100.
pub trait AwarenessLookup {
    /// Awareness rating, or `None` when the official is unknown.
    fn awareness(&self, npc: NpcId) -> Option<u8>;
}

/// Affinity derived from faction membership.
///
/// Stablemates share their faction's affinity; a wrestler has full
/// affinity with themselves; everyone else has none.
#[derive(Debug, Clone, Default)]
pub struct FactionAffinity {
    membership: HashMap<WrestlerId, FactionId>,
    affinity: HashMap<FactionId, u8>,
}

impl FactionAffinity {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the membership table from a roster.
    pub fn from_roster<'a>(roster: impl IntoIterator<Item = &'a Wrestler>) -> Self {
        let membership = roster
            .into_iter()
            .filter_map(|w| w.faction.map(|f| (w.id, f)))
            .collect();
        Self {
            membership,
            affinity: HashMap::new(),
        }
    }

    /// Record a wrestler's faction.
    pub fn with_member(mut self, wrestler: WrestlerId, faction: FactionId) -> Self {
        self.membership.insert(wrestler, faction);
        self
    }

    /// Set how tight-knit a faction is (clamped to 100).
    pub fn with_faction_affinity(mut self, faction: FactionId, affinity: u8) -> Self {
        self.affinity.insert(faction, affinity.min(100));
        self
    }
}

impl AffinityLookup for FactionAffinity {
    fn affinity_between(&self, a: WrestlerId, b: WrestlerId) -> u8 {
        if a == b {
            return 100;
        }
        match (self.membership.get(&a), self.membership.get(&b)) {
            (Some(fa), Some(fb)) if fa == fb => self.affinity.get(fa).copied().unwrap_or(100),
            _ => 0,
        }
    }
}

/// Awareness ratings for known officials.
#[derive(Debug, Clone, Default)]
pub struct RefereeRatings {
    ratings: HashMap<NpcId, u8>,
}

impl RefereeRatings {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate an official (clamped to 100).
    pub fn with_rating(mut self, npc: NpcId, awareness: u8) -> Self {
        self.ratings.insert(npc, awareness.min(100));
        self
    }
}

impl AwarenessLookup for RefereeRatings {
    fn awareness(&self, npc: NpcId) -> Option<u8> {
        self.ratings.get(&npc).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stablemates_share_affinity() {
        let faction = FactionId::new();
        let a = Wrestler::new("A", 0).with_faction(faction);
        let b = Wrestler::new("B", 0).with_faction(faction);
        let c = Wrestler::new("C", 0);
        let table = FactionAffinity::from_roster([&a, &b, &c]).with_faction_affinity(faction, 70);
        assert_eq!(table.affinity_between(a.id, b.id), 70);
        assert_eq!(table.affinity_between(a.id, c.id), 0);
        assert_eq!(table.affinity_between(c.id, c.id), 100);
    }

    #[test]
    fn unrated_faction_is_fully_loyal() {
        let faction = FactionId::new();
        let a = WrestlerId::new();
        let b = WrestlerId::new();
        let table = FactionAffinity::new()
            .with_member(a, faction)
            .with_member(b, faction);
        assert_eq!(table.affinity_between(a, b), 100);
    }

    #[test]
    fn referee_ratings() {
        let sharp = NpcId::new();
        let ratings = RefereeRatings::new().with_rating(sharp, 250);
        assert_eq!(ratings.awareness(sharp), Some(100));
        assert_eq!(ratings.awareness(NpcId::new()), None);
    }
}

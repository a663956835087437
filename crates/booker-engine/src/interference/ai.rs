use rand::Rng;
use rand::rngs::StdRng;

use booker_core::{Alignment, Segment, Wrestler};

use super::InterferenceType;
use crate::config::EngineConfig;

/// Awareness at which a heel plays it safe.
pub const CAUTIOUS_AWARENESS: u8 = 60;

/// Decides whether a ringside wrestler takes an interference opportunity.
///
/// The decision only picks an action; resolving it is up to
/// [`InterferenceEngine`](super::InterferenceEngine).
#[derive(Debug, Clone)]
pub struct InterferenceAi {
    heel_chance: f64,
}

impl InterferenceAi {
    /// Create a decision layer from the engine configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            heel_chance: config.heel_interference_chance,
        }
    }

    /// Chance of interfering per opportunity for an alignment.
    pub fn chance_for(&self, alignment: Alignment) -> f64 {
        match alignment {
            Alignment::Heel => self.heel_chance,
            Alignment::Neutral => self.heel_chance / 3.0,
            Alignment::Face => 0.0,
        }
    }

    /// Decide whether `npc` interferes in `segment`, and how.
    ///
    /// Faces never interfere. Wrestlers already ejected, and segments
    /// already thrown out, produce no action.
    pub fn decide(
        &self,
        npc: &Wrestler,
        segment: &Segment,
        rng: &mut StdRng,
    ) -> Option<InterferenceType> {
        if segment.interference.is_disqualified() || segment.interference.is_ejected(npc.id) {
            return None;
        }
        let chance = self.chance_for(npc.alignment()).clamp(0.0, 1.0);
        if !rng.random_bool(chance) {
            return None;
        }
        let kind = choose_action(npc.alignment(), segment.interference.awareness(), rng);
        tracing::debug!(npc = %npc.id, %kind, "interference opportunity taken");
        Some(kind)
    }
}

fn choose_action(alignment: Alignment, awareness: u8, rng: &mut StdRng) -> InterferenceType {
    if alignment != Alignment::Heel || awareness >= CAUTIOUS_AWARENESS {
        return InterferenceType::Distraction;
    }
    match rng.random_range(0..10) {
        0..=3 => InterferenceType::Distraction,
        4..=6 => InterferenceType::LowBlow,
        7..=8 => InterferenceType::WeaponSlide,
        _ => InterferenceType::RunInAttack,
    }
}

//! Ringside interference and the referee-awareness state machine.

/// Decision layer for non-player interference.
pub mod ai;

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use booker_core::{BookerError, BookerResult, Segment, WrestlerId};

use crate::config::EngineConfig;
use crate::lookup::{AffinityLookup, AwarenessLookup};

/// Referee awareness that leaves base risk unscaled.
pub const NEUTRAL_REFEREE_AWARENESS: f64 = 50.0;

/// Something done at ringside to help a wrestler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterferenceType {
    /// Rallying the crowd. Legal.
    Cheer,
    /// Pulling the referee's attention away.
    Distraction,
    /// A cheap shot while the referee is out of position.
    LowBlow,
    /// Sliding a weapon into the ring.
    WeaponSlide,
    /// Hitting the ring to attack the opponent.
    RunInAttack,
}

impl InterferenceType {
    /// All interference types, safest first.
    pub fn all() -> &'static [Self] {
        &[
            Self::Cheer,
            Self::Distraction,
            Self::LowBlow,
            Self::WeaponSlide,
            Self::RunInAttack,
        ]
    }

    /// Awareness the action adds before any reductions.
    pub const fn base_risk(self) -> f64 {
        match self {
            Self::Cheer => 0.0,
            Self::Distraction => 10.0,
            Self::LowBlow => 15.0,
            Self::WeaponSlide => 20.0,
            Self::RunInAttack => 30.0,
        }
    }

    /// Whether the referee can notice the action at all.
    pub const fn raises_awareness(self) -> bool {
        !matches!(self, Self::Cheer)
    }

    /// Whether getting caught throws the match out.
    pub const fn can_cause_dq(self) -> bool {
        matches!(self, Self::LowBlow | Self::WeaponSlide | Self::RunInAttack)
    }

    /// Whether the action is high-risk.
    pub const fn is_high_risk(self) -> bool {
        matches!(self, Self::WeaponSlide | Self::RunInAttack)
    }

    /// Alignment shift for the beneficiary when the action works.
    pub const fn alignment_shift(self) -> i8 {
        match self {
            Self::Cheer => 1,
            _ => -1,
        }
    }

    /// Parse a type name such as `weapon_slide` or `run-in`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "cheer" => Some(Self::Cheer),
            "distraction" => Some(Self::Distraction),
            "low_blow" => Some(Self::LowBlow),
            "weapon_slide" | "weapon" => Some(Self::WeaponSlide),
            "run_in_attack" | "run_in" => Some(Self::RunInAttack),
            _ => None,
        }
    }
}

impl fmt::Display for InterferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cheer => write!(f, "cheer"),
            Self::Distraction => write!(f, "distraction"),
            Self::LowBlow => write!(f, "low blow"),
            Self::WeaponSlide => write!(f, "weapon slide"),
            Self::RunInAttack => write!(f, "run-in attack"),
        }
    }
}

/// Outcome of one interference attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterferenceResult {
    /// What was attempted.
    pub kind: InterferenceType,
    /// Who interfered.
    pub interferer: WrestlerId,
    /// Who it was meant to help.
    pub beneficiary: WrestlerId,
    /// Whether the action achieved its aim.
    pub success: bool,
    /// Awareness added before rounding.
    pub effective_risk: f64,
    /// Referee awareness before the attempt.
    pub awareness_before: u8,
    /// Referee awareness after the attempt.
    pub awareness_after: u8,
    /// The interferer was thrown out of ringside.
    pub ejected: bool,
    /// The match was thrown out against the beneficiary.
    pub disqualified: bool,
    /// What the crowd saw.
    pub message: String,
}

impl InterferenceResult {
    /// Alignment shift the beneficiary earns, if the action worked cleanly.
    pub fn alignment_shift(&self) -> Option<i8> {
        (self.success && !self.disqualified).then_some(self.kind.alignment_shift())
    }
}

/// Risk an action adds to referee awareness.
///
/// Base risk is scaled by the referee's own awareness (50 is neutral) and
/// reduced by up to `max_reduction` at full affinity between interferer
/// and beneficiary.
pub fn effective_risk(
    kind: InterferenceType,
    affinity: u8,
    referee_awareness: u8,
    max_reduction: f64,
) -> f64 {
    let affinity = f64::from(affinity.min(100)) / 100.0;
    let referee_factor = f64::from(referee_awareness.min(100)) / NEUTRAL_REFEREE_AWARENESS;
    kind.base_risk() * referee_factor * (1.0 - affinity * max_reduction)
}

/// Resolves interference attempts against a segment's referee.
pub struct InterferenceEngine<'a> {
    config: &'a EngineConfig,
    affinity: &'a dyn AffinityLookup,
    referees: &'a dyn AwarenessLookup,
}

impl<'a> InterferenceEngine<'a> {
    /// Create an engine over the given lookups.
    pub fn new(
        config: &'a EngineConfig,
        affinity: &'a dyn AffinityLookup,
        referees: &'a dyn AwarenessLookup,
    ) -> Self {
        Self {
            config,
            affinity,
            referees,
        }
    }

    /// Attempt an interference in `segment`, updating its awareness state.
    ///
    /// Fails if the match has already been thrown out or the interferer
    /// was already ejected.
    pub fn attempt_interference(
        &self,
        segment: &mut Segment,
        interferer: WrestlerId,
        beneficiary: WrestlerId,
        kind: InterferenceType,
        rng: &mut StdRng,
    ) -> BookerResult<InterferenceResult> {
        if segment.interference.is_disqualified() {
            return Err(BookerError::InvalidStateTransition(format!(
                "segment {} has already ended in a disqualification",
                segment.id
            )));
        }
        if segment.interference.is_ejected(interferer) {
            return Err(BookerError::InvalidStateTransition(format!(
                "{interferer} has been ejected from ringside"
            )));
        }

        let affinity = self.affinity.affinity_between(interferer, beneficiary);
        let referee_awareness = segment
            .referee
            .and_then(|r| self.referees.awareness(r))
            .unwrap_or(self.config.default_referee_awareness);
        let risk = effective_risk(
            kind,
            affinity,
            referee_awareness,
            self.config.max_affinity_reduction,
        );

        let before = segment.interference.awareness();
        let success = if kind.raises_awareness() {
            let chance = 1.0 - f64::from(before) / 100.0;
            rng.random_bool(chance.clamp(0.0, 1.0))
        } else {
            true
        };
        let after = if kind.raises_awareness() {
            segment
                .interference
                .raise_awareness(risk.round().clamp(0.0, 100.0) as u8)
        } else {
            before
        };

        let ejected = kind.raises_awareness() && after >= self.config.ejection_threshold;
        let disqualified =
            kind.can_cause_dq() && after >= self.config.dq_threshold && !segment.is_no_dq();
        if ejected {
            segment.interference.eject(interferer);
        }
        if disqualified {
            segment.interference.disqualify(beneficiary);
        }

        let message = if disqualified {
            format!("The referee saw the illegal {kind}! DISQUALIFICATION!")
        } else if ejected {
            format!("The {kind} was spotted! The referee is EJECTING the interferer from ringside!")
        } else if success {
            format!("The {kind} was successful!")
        } else {
            format!("The {kind} failed to help as much as intended.")
        };

        tracing::debug!(
            segment = %segment.id,
            %kind,
            affinity,
            risk,
            before,
            after,
            "interference resolved"
        );
        if ejected || disqualified {
            tracing::info!(segment = %segment.id, %interferer, ejected, disqualified, "interferer caught");
        }

        Ok(InterferenceResult {
            kind,
            interferer,
            beneficiary,
            success,
            effective_risk: risk,
            awareness_before: before,
            awareness_after: after,
            ejected,
            disqualified,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use booker_core::{FactionId, InterferenceState, NpcId, Stipulation};
    use rand::SeedableRng;

    use super::*;
    use crate::lookup::{FactionAffinity, RefereeRatings};

    fn segment_at(awareness: u8) -> Segment {
        let mut seg = Segment::new("Main Event", vec![]);
        seg.interference = InterferenceState::with_awareness(awareness);
        seg
    }

    #[test]
    fn full_affinity_cuts_weapon_slide_risk_by_thirty_percent() {
        let base = InterferenceType::WeaponSlide.base_risk();
        let reduced = effective_risk(InterferenceType::WeaponSlide, 100, 50, 0.3);
        assert!((reduced - base * 0.7).abs() < 1e-9);
        assert!((reduced - 14.0).abs() < 1e-9);
        let unreduced = effective_risk(InterferenceType::WeaponSlide, 0, 50, 0.3);
        assert!((unreduced - 20.0).abs() < 1e-9);
    }

    #[test]
    fn sharp_referee_scales_risk() {
        let risk = effective_risk(InterferenceType::Distraction, 0, 100, 0.3);
        assert!((risk - 20.0).abs() < 1e-9);
        assert_eq!(effective_risk(InterferenceType::Cheer, 0, 100, 0.3), 0.0);
    }

    #[test]
    fn high_risk_against_alert_referee_ejects_and_disqualifies() {
        let config = EngineConfig::default();
        let affinity = FactionAffinity::new();
        let refs = RefereeRatings::new();
        let engine = InterferenceEngine::new(&config, &affinity, &refs);
        for kind in [InterferenceType::WeaponSlide, InterferenceType::RunInAttack] {
            for awareness in [90, 95, 100] {
                let mut seg = segment_at(awareness);
                let mut rng = StdRng::seed_from_u64(42);
                let result = engine
                    .attempt_interference(&mut seg, WrestlerId::new(), WrestlerId::new(), kind, &mut rng)
                    .unwrap();
                assert!(result.ejected, "{kind} at {awareness}");
                assert!(result.disqualified, "{kind} at {awareness}");
                assert_eq!(result.awareness_after, 100);
                assert!(result.message.contains("DISQUALIFICATION"));
                assert!(seg.interference.is_disqualified());
            }
        }
    }

    #[test]
    fn no_dq_stipulation_prevents_disqualification() {
        let config = EngineConfig::default();
        let affinity = FactionAffinity::new();
        let refs = RefereeRatings::new();
        let engine = InterferenceEngine::new(&config, &affinity, &refs);
        let mut seg = segment_at(95).with_stipulation(Stipulation::named("No DQ"));
        let mut rng = StdRng::seed_from_u64(1);
        let result = engine
            .attempt_interference(
                &mut seg,
                WrestlerId::new(),
                WrestlerId::new(),
                InterferenceType::WeaponSlide,
                &mut rng,
            )
            .unwrap();
        assert!(result.ejected);
        assert!(!result.disqualified);
        assert!(result.message.contains("EJECTING"));
    }

    #[test]
    fn awareness_rises_by_rounded_risk() {
        let config = EngineConfig::default();
        let faction = FactionId::new();
        let (a, b) = (WrestlerId::new(), WrestlerId::new());
        let affinity = FactionAffinity::new()
            .with_member(a, faction)
            .with_member(b, faction)
            .with_faction_affinity(faction, 100);
        let refs = RefereeRatings::new();
        let engine = InterferenceEngine::new(&config, &affinity, &refs);
        let mut seg = segment_at(10);
        let mut rng = StdRng::seed_from_u64(3);
        let result = engine
            .attempt_interference(&mut seg, a, b, InterferenceType::WeaponSlide, &mut rng)
            .unwrap();
        assert_eq!(result.awareness_after, 24);
        assert!(!result.ejected);
        assert!(!result.disqualified);
        assert_eq!(seg.interference.awareness(), 24);
    }

    #[test]
    fn awareness_never_decreases() {
        let config = EngineConfig::default();
        let affinity = FactionAffinity::new();
        let refs = RefereeRatings::new();
        let engine = InterferenceEngine::new(&config, &affinity, &refs);
        let mut seg = segment_at(0);
        let mut rng = StdRng::seed_from_u64(9);
        let interferer = WrestlerId::new();
        let mut last = 0;
        for kind in InterferenceType::all().iter().copied().cycle().take(12) {
            match engine.attempt_interference(&mut seg, interferer, WrestlerId::new(), kind, &mut rng) {
                Ok(result) => {
                    assert!(result.awareness_after >= last);
                    last = result.awareness_after;
                }
                Err(BookerError::InvalidStateTransition(_)) => break,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert!(seg.interference.awareness() >= last);
    }

    #[test]
    fn cheer_is_always_safe() {
        let config = EngineConfig::default();
        let affinity = FactionAffinity::new();
        let refs = RefereeRatings::new();
        let engine = InterferenceEngine::new(&config, &affinity, &refs);
        let mut seg = segment_at(99);
        let mut rng = StdRng::seed_from_u64(5);
        let result = engine
            .attempt_interference(
                &mut seg,
                WrestlerId::new(),
                WrestlerId::new(),
                InterferenceType::Cheer,
                &mut rng,
            )
            .unwrap();
        assert!(result.success);
        assert!(!result.ejected);
        assert_eq!(result.awareness_after, 99);
        assert_eq!(result.alignment_shift(), Some(1));
    }

    #[test]
    fn ejected_interferer_cannot_return() {
        let config = EngineConfig::default();
        let affinity = FactionAffinity::new();
        let refs = RefereeRatings::new();
        let engine = InterferenceEngine::new(&config, &affinity, &refs);
        let mut seg = segment_at(75).with_stipulation(Stipulation::named("No DQ"));
        let mut rng = StdRng::seed_from_u64(5);
        let interferer = WrestlerId::new();
        let first = engine
            .attempt_interference(
                &mut seg,
                interferer,
                WrestlerId::new(),
                InterferenceType::Distraction,
                &mut rng,
            )
            .unwrap();
        assert!(first.ejected);
        let err = engine
            .attempt_interference(
                &mut seg,
                interferer,
                WrestlerId::new(),
                InterferenceType::Distraction,
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, BookerError::InvalidStateTransition(_)));
    }

    #[test]
    fn referee_rating_comes_from_lookup() {
        let config = EngineConfig::default();
        let affinity = FactionAffinity::new();
        let referee = NpcId::new();
        let refs = RefereeRatings::new().with_rating(referee, 25);
        let engine = InterferenceEngine::new(&config, &affinity, &refs);
        let mut seg = segment_at(0).with_referee(referee);
        let mut rng = StdRng::seed_from_u64(5);
        let result = engine
            .attempt_interference(
                &mut seg,
                WrestlerId::new(),
                WrestlerId::new(),
                InterferenceType::RunInAttack,
                &mut rng,
            )
            .unwrap();
        assert_eq!(result.awareness_after, 15);
    }

    #[test]
    fn parse_types() {
        assert_eq!(InterferenceType::parse("weapon-slide"), Some(InterferenceType::WeaponSlide));
        assert_eq!(InterferenceType::parse("run_in"), Some(InterferenceType::RunInAttack));
        assert_eq!(InterferenceType::parse("moonsault"), None);
        assert!(InterferenceType::WeaponSlide.is_high_risk());
        assert!(!InterferenceType::Distraction.can_cause_dq());
    }
}

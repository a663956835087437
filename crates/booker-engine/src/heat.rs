//! Heat tracking: the rivalry ledger, threshold gating, and read projections.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

use booker_core::rivalry::RESOLUTION_ELIGIBLE_HEAT;
use booker_core::{BookerError, BookerResult, DomainEvent, Rivalry, RivalryIntensity, WrestlerId};

/// A resolution roll must beat this total.
pub const RESOLUTION_TARGET: u32 = 30;

/// Heat every match between rivals generates.
pub const BASE_MATCH_HEAT: i32 = 2;
/// Extra heat when a title is on the line.
pub const TITLE_MATCH_HEAT: i32 = 3;
/// Extra heat when a stipulation is in force.
pub const STIPULATION_HEAT: i32 = 2;
/// Extra heat for a decisive finish.
pub const DECISIVE_FINISH_HEAT: i32 = 1;

/// Heat generated by one match between two wrestlers.
pub fn match_heat(title_match: bool, stipulation: bool, decisive: bool) -> i32 {
    let mut heat = BASE_MATCH_HEAT;
    if title_match {
        heat += TITLE_MATCH_HEAT;
    }
    if stipulation {
        heat += STIPULATION_HEAT;
    }
    if decisive {
        heat += DECISIVE_FINISH_HEAT;
    }
    heat
}

/// Add heat to an active rivalry now.
///
/// Heat floors at zero. Returns the notification for the change.
pub fn add_heat(rivalry: &mut Rivalry, delta: i32, reason: &str) -> BookerResult<DomainEvent> {
    add_heat_at(rivalry, delta, reason, Utc::now())
}

/// Add heat to an active rivalry with an explicit timestamp.
pub fn add_heat_at(
    rivalry: &mut Rivalry,
    delta: i32,
    reason: &str,
    at: DateTime<Utc>,
) -> BookerResult<DomainEvent> {
    if !rivalry.is_active() {
        return Err(BookerError::InvalidStateTransition(format!(
            "rivalry {} has ended",
            rivalry.id
        )));
    }
    let before = rivalry.intensity();
    let total = rivalry.record_heat(delta, reason, at).heat_after;
    tracing::debug!(rivalry = %rivalry.id, delta, total, reason, "heat changed");
    if rivalry.intensity() != before {
        tracing::info!(
            rivalry = %rivalry.id,
            from = %before,
            to = %rivalry.intensity(),
            "rivalry intensity changed"
        );
    }
    Ok(DomainEvent::HeatChanged {
        rivalry: Some(rivalry.id),
        wrestlers: [rivalry.wrestler_a, rivalry.wrestler_b],
        delta,
        reason: reason.to_string(),
        total: Some(total),
    })
}

/// What happened when a rivalry resolution was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Heat is below the resolution threshold; nothing was recorded.
    NotEligible,
    /// The roll fell short; the attempt was logged.
    Failed {
        /// The rolled total.
        total: u32,
    },
    /// The rivalry is over.
    Resolved {
        /// The rolled total.
        total: u32,
    },
}

/// Attempt to settle a rivalry with two d20 rolls.
///
/// Both rolls must be 1-20. Requires heat of at least 20. A total above 30
/// ends the rivalry; a lower total records a zero-heat entry noting the
/// failed attempt.
pub fn attempt_resolution(
    rivalry: &mut Rivalry,
    roll1: u32,
    roll2: u32,
) -> BookerResult<ResolutionOutcome> {
    if let Some(roll) = [roll1, roll2].into_iter().find(|r| !(1..=20).contains(r)) {
        return Err(BookerError::InvalidRoll { roll, sides: 20 });
    }
    if !rivalry.is_active() {
        return Err(BookerError::InvalidStateTransition(format!(
            "rivalry {} has ended",
            rivalry.id
        )));
    }
    if rivalry.heat() < RESOLUTION_ELIGIBLE_HEAT {
        return Ok(ResolutionOutcome::NotEligible);
    }
    let total = roll1 + roll2;
    let now = Utc::now();
    if total > RESOLUTION_TARGET {
        rivalry.record_heat(0, format!("Rivalry resolved by dice roll ({total})"), now);
        end_rivalry(rivalry, "Resolved through dice roll")?;
        Ok(ResolutionOutcome::Resolved { total })
    } else {
        rivalry.record_heat(0, format!("Failed resolution attempt ({total})"), now);
        Ok(ResolutionOutcome::Failed { total })
    }
}

/// Roll two d20 and attempt resolution.
pub fn roll_resolution(rivalry: &mut Rivalry, rng: &mut StdRng) -> BookerResult<ResolutionOutcome> {
    let roll1 = rng.random_range(1..=20);
    let roll2 = rng.random_range(1..=20);
    attempt_resolution(rivalry, roll1, roll2)
}

/// End an active rivalry, recording why.
pub fn end_rivalry(rivalry: &mut Rivalry, reason: &str) -> BookerResult<()> {
    if !rivalry.is_active() {
        return Err(BookerError::InvalidStateTransition(format!(
            "rivalry {} has already ended",
            rivalry.id
        )));
    }
    let now = Utc::now();
    rivalry.record_heat(0, format!("Rivalry ended: {reason}"), now);
    rivalry.close(now);
    tracing::info!(rivalry = %rivalry.id, reason, "rivalry ended");
    Ok(())
}

/// Active rivalries, hottest first, at most `limit` of them.
pub fn hottest(rivalries: &[Rivalry], limit: usize) -> Vec<&Rivalry> {
    let mut active: Vec<&Rivalry> = rivalries.iter().filter(|r| r.is_active()).collect();
    active.sort_by(|a, b| b.heat().cmp(&a.heat()));
    active.truncate(limit);
    active
}

/// Active rivalries with heat at or above `threshold`.
pub fn at_or_above(rivalries: &[Rivalry], threshold: u32) -> Vec<&Rivalry> {
    rivalries
        .iter()
        .filter(|r| r.is_active() && r.heat() >= threshold)
        .collect()
}

/// Active rivalries with heat in `min..=max`.
pub fn in_heat_range(rivalries: &[Rivalry], min: u32, max: u32) -> Vec<&Rivalry> {
    rivalries
        .iter()
        .filter(|r| r.is_active() && (min..=max).contains(&r.heat()))
        .collect()
}

/// Active rivalries in an intensity band.
pub fn with_intensity(rivalries: &[Rivalry], intensity: RivalryIntensity) -> Vec<&Rivalry> {
    rivalries
        .iter()
        .filter(|r| r.is_active() && r.intensity() == intensity)
        .collect()
}

/// Rivalries whose wrestlers must meet on the next show.
pub fn requiring_matches(rivalries: &[Rivalry]) -> Vec<&Rivalry> {
    rivalries.iter().filter(|r| r.requires_match()).collect()
}

/// Rivalries that may be resolved.
pub fn eligible_for_resolution(rivalries: &[Rivalry]) -> Vec<&Rivalry> {
    rivalries
        .iter()
        .filter(|r| r.eligible_for_resolution())
        .collect()
}

/// Rivalries whose next meeting needs a stipulation.
pub fn requiring_stipulation(rivalries: &[Rivalry]) -> Vec<&Rivalry> {
    rivalries
        .iter()
        .filter(|r| r.requires_stipulation_match())
        .collect()
}

/// Every rivalry the wrestler is part of.
pub fn for_wrestler(rivalries: &[Rivalry], wrestler: WrestlerId) -> Vec<&Rivalry> {
    rivalries.iter().filter(|r| r.involves(wrestler)).collect()
}

/// The rivalry between two wrestlers, preferring an active one.
pub fn between(rivalries: &[Rivalry], a: WrestlerId, b: WrestlerId) -> Option<&Rivalry> {
    let mut matching = rivalries.iter().filter(|r| r.is_between(a, b));
    let first = matching.next()?;
    if first.is_active() {
        return Some(first);
    }
    matching.find(|r| r.is_active()).or(Some(first))
}

/// Summary counts across a set of rivalries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RivalryStats {
    /// Every rivalry.
    pub total: usize,
    /// Rivalries still running.
    pub active: usize,
    /// Active rivalries per intensity band, ascending.
    pub by_intensity: [usize; 4],
    /// Mean heat across active rivalries.
    pub average_heat: f64,
}

/// Summarize a set of rivalries.
pub fn stats(rivalries: &[Rivalry]) -> RivalryStats {
    let mut stats = RivalryStats {
        total: rivalries.len(),
        ..RivalryStats::default()
    };
    let mut heat_sum = 0u64;
    for rivalry in rivalries.iter().filter(|r| r.is_active()) {
        stats.active += 1;
        heat_sum += u64::from(rivalry.heat());
        let band = RivalryIntensity::all()
            .iter()
            .position(|i| *i == rivalry.intensity())
            .unwrap_or(0);
        stats.by_intensity[band] += 1;
    }
    if stats.active > 0 {
        stats.average_heat = heat_sum as f64 / stats.active as f64;
    }
    stats
}

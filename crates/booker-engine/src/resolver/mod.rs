//! Match resolution: winner, duration, quality rating, and side effects.

/// Team power ratings and weighted picks.
pub mod power;
/// Fan awards, bumps, and heat from a finished match.
pub mod rewards;

use std::collections::HashSet;

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

use booker_core::{
    BookerError, BookerResult, DomainEvent, Finish, MatchResult, MatchTeam, MatchType,
    Stipulation, TeamSummary, TitleId, WrestlerId,
};

use crate::config::EngineConfig;

/// Base match length in minutes before tier and type adjustments.
pub const BASE_DURATION: f64 = 8.0;
/// Largest duration swing, in minutes.
pub const DURATION_JITTER: i32 = 3;
/// Largest rating swing.
pub const RATING_JITTER: f64 = 0.75;
/// Lowest possible rating.
pub const MIN_RATING: f64 = 1.0;
/// Highest possible rating.
pub const MAX_RATING: f64 = 5.0;

/// Everything needed to resolve one match.
#[derive(Debug, Clone)]
pub struct MatchBooking {
    /// Every side, in booking order.
    pub teams: Vec<MatchTeam>,
    /// Explicit match type; inferred from team sizes when absent.
    pub match_type: Option<MatchType>,
    /// Stipulation in force.
    pub stipulation: Option<Stipulation>,
    /// Title on the line.
    pub title: Option<TitleId>,
    /// Wrestler whose side was disqualified by interference.
    pub disqualified: Option<WrestlerId>,
    /// Rival pairs whose heat the match should feed.
    pub rivals: Vec<[WrestlerId; 2]>,
    /// Multiplier applied to fan awards.
    pub reward_multiplier: f64,
}

impl MatchBooking {
    /// Book a match between the given sides.
    pub fn new(teams: Vec<MatchTeam>) -> Self {
        Self {
            teams,
            match_type: None,
            stipulation: None,
            title: None,
            disqualified: None,
            rivals: Vec::new(),
            reward_multiplier: 1.0,
        }
    }

    /// Book a one-on-one or team-vs-team match.
    pub fn versus(team_a: MatchTeam, team_b: MatchTeam) -> Self {
        Self::new(vec![team_a, team_b])
    }

    /// Set the match type explicitly.
    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    /// Attach a stipulation.
    pub fn with_stipulation(mut self, stipulation: Stipulation) -> Self {
        self.stipulation = Some(stipulation);
        self
    }

    /// Put a title on the line.
    pub fn with_title(mut self, title: TitleId) -> Self {
        self.title = Some(title);
        self
    }

    /// Throw the match out against `offender`'s side.
    pub fn with_disqualification(mut self, offender: WrestlerId) -> Self {
        self.disqualified = Some(offender);
        self
    }

    /// Feed heat between two rivals if they end up on opposite sides.
    pub fn with_rivalry(mut self, a: WrestlerId, b: WrestlerId) -> Self {
        self.rivals.push([a, b]);
        self
    }

    /// Scale fan awards (e.g. by chapter difficulty).
    pub fn with_reward_multiplier(mut self, multiplier: f64) -> Self {
        self.reward_multiplier = multiplier.max(0.0);
        self
    }
}

/// A match result with the side effects the caller should apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// The outcome.
    pub result: MatchResult,
    /// Pre-variance power of each side.
    pub team_power: Vec<f64>,
    /// Fan awards, bumps, injuries, and heat, in that order.
    pub events: Vec<DomainEvent>,
}

/// Turns bookings into results.
#[derive(Debug, Clone, Default)]
pub struct MatchResolver {
    config: EngineConfig,
}

impl MatchResolver {
    /// Create a resolver with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The resolver's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a two-sided match.
    pub fn resolve(
        &self,
        team_a: MatchTeam,
        team_b: MatchTeam,
        match_type: MatchType,
        stipulation: Option<Stipulation>,
        rng: &mut StdRng,
    ) -> BookerResult<Resolution> {
        let mut booking = MatchBooking::versus(team_a, team_b).with_match_type(match_type);
        booking.stipulation = stipulation;
        self.resolve_booking(&booking, rng)
    }

    /// Resolve a match between three or more sides.
    pub fn resolve_multi(
        &self,
        teams: Vec<MatchTeam>,
        stipulation: Option<Stipulation>,
        rng: &mut StdRng,
    ) -> BookerResult<Resolution> {
        if teams.len() < 3 {
            return Err(BookerError::InvalidTeamComposition(format!(
                "a multi-team match needs at least 3 sides, got {}",
                teams.len()
            )));
        }
        let mut booking = MatchBooking::new(teams);
        booking.stipulation = stipulation;
        self.resolve_booking(&booking, rng)
    }

    /// Resolve a fully specified booking.
    pub fn resolve_booking(
        &self,
        booking: &MatchBooking,
        rng: &mut StdRng,
    ) -> BookerResult<Resolution> {
        validate_teams(&booking.teams)?;
        let offending_team = booking
            .disqualified
            .map(|offender| {
                booking
                    .teams
                    .iter()
                    .position(|t| t.members.iter().any(|w| w.id == offender))
                    .ok_or_else(|| {
                        BookerError::InvalidTeamComposition(format!(
                            "disqualified wrestler {offender} is not in the match"
                        ))
                    })
            })
            .transpose()?;

        let team_power: Vec<f64> = booking
            .teams
            .iter()
            .map(|t| power::team_power(t, self.config.member_decay))
            .collect();
        let odds = power::win_probabilities(&team_power);
        let varied: Vec<f64> = team_power
            .iter()
            .map(|p| power::apply_variance(*p, self.config.power_variance, rng))
            .collect();
        let excluded: Vec<usize> = offending_team.into_iter().collect();
        let winning_team = power::pick_weighted(&varied, &excluded, rng).ok_or_else(|| {
            BookerError::InvalidTeamComposition("no side can win this match".into())
        })?;

        let match_type = booking.match_type.unwrap_or_else(|| {
            MatchType::infer(&booking.teams.iter().map(MatchTeam::len).collect::<Vec<_>>())
        });
        let tiers: Vec<u32> = booking
            .teams
            .iter()
            .flat_map(|t| t.members.iter().map(|w| w.tier().index()))
            .collect();
        let duration_minutes = self.roll_duration(&tiers, match_type, rng);
        let rating = roll_rating(&tiers, booking.stipulation.is_some(), rng);

        let result = MatchResult {
            teams: booking.teams.iter().map(TeamSummary::from).collect(),
            winning_team,
            match_type,
            duration_minutes,
            rating,
            stipulation: booking.stipulation.clone(),
            finish: if offending_team.is_some() {
                Finish::Disqualification
            } else {
                Finish::Pinfall
            },
            title: booking.title,
            win_probability: odds.get(winning_team).copied().unwrap_or(0.0),
        };

        let mut events = rewards::fan_awards(&result, booking.reward_multiplier, rng);
        events.extend(rewards::bumps(&result, &booking.teams));
        events.extend(rewards::heat_changes(&result, &booking.rivals));

        tracing::debug!(
            ?team_power,
            winner = winning_team,
            duration_minutes,
            rating,
            "match resolved"
        );

        Ok(Resolution {
            result,
            team_power,
            events,
        })
    }

    fn roll_duration(&self, tiers: &[u32], match_type: MatchType, rng: &mut StdRng) -> u32 {
        let jitter = rng.random_range(-DURATION_JITTER..=DURATION_JITTER);
        let minutes = BASE_DURATION
            + 2.0 * average(tiers)
            + f64::from(match_type.duration_adjustment())
            + f64::from(jitter);
        let (lo, hi) = (self.config.min_duration, self.config.max_duration);
        let clamped = minutes
            .round()
            .clamp(f64::from(lo.min(hi)), f64::from(lo.max(hi)));
        clamped as u32
    }
}

fn roll_rating(tiers: &[u32], stipulation: bool, rng: &mut StdRng) -> f64 {
    let spread = match (tiers.iter().max(), tiers.iter().min()) {
        (Some(max), Some(min)) => f64::from(max - min),
        _ => 0.0,
    };
    let mut rating = 2.0 + 0.35 * average(tiers) - 0.15 * spread;
    if stipulation {
        rating += 0.5;
    }
    rating += rng.random_range(-RATING_JITTER..=RATING_JITTER);
    ((rating * 4.0).round() / 4.0).clamp(MIN_RATING, MAX_RATING)
}

fn average(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64
}

fn validate_teams(teams: &[MatchTeam]) -> BookerResult<()> {
    if teams.len() < 2 {
        return Err(BookerError::InvalidTeamComposition(format!(
            "a match needs at least 2 sides, got {}",
            teams.len()
        )));
    }
    if let Some(empty) = teams.iter().find(|t| t.is_empty()) {
        return Err(BookerError::InvalidTeamComposition(format!(
            "team '{}' has no members",
            empty.label
        )));
    }
    let mut seen = HashSet::new();
    for wrestler in teams.iter().flat_map(|t| t.members.iter()) {
        if !seen.insert(wrestler.id) {
            return Err(BookerError::InvalidTeamComposition(format!(
                "{} is booked more than once",
                wrestler.name
            )));
        }
    }
    Ok(())
}

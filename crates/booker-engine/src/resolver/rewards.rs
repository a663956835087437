//! Side effects of a finished match, expressed as domain events.

use rand::Rng;
use rand::rngs::StdRng;

use booker_core::wrestler::BUMPS_PER_INJURY;
use booker_core::{BumpRule, DomainEvent, Finish, MatchResult, MatchTeam, WrestlerId};

use crate::heat;

/// Fan bonus for the quality of the match.
pub fn quality_bonus(rating: f64) -> i64 {
    match rating {
        r if r >= 4.75 => 10_000,
        r if r >= 4.25 => 5_000,
        r if r >= 3.75 => 3_000,
        r if r >= 3.0 => 1_000,
        _ => 0,
    }
}

/// Fans for one winner: `(2d6 + 3) * 1000` plus the quality bonus.
pub fn winner_fans(rating: f64, rng: &mut StdRng) -> i64 {
    let roll = rng.random_range(1..=6i64) + rng.random_range(1..=6i64);
    (roll + 3) * 1_000 + quality_bonus(rating)
}

/// Fans for one loser: `(1d6 - 4) * 1000` plus the quality bonus. May be
/// negative.
pub fn loser_fans(rating: f64, rng: &mut StdRng) -> i64 {
    let roll = rng.random_range(1..=6i64);
    (roll - 4) * 1_000 + quality_bonus(rating)
}

/// Fan awards for every participant, scaled by `multiplier`.
pub fn fan_awards(result: &MatchResult, multiplier: f64, rng: &mut StdRng) -> Vec<DomainEvent> {
    let mut events = Vec::new();
    for wrestler in result.winners() {
        let amount = scale(winner_fans(result.rating, rng), multiplier);
        events.push(DomainEvent::FanAwarded {
            wrestler,
            amount,
            reason: format!("Won {}", result.stipulation_label()),
        });
    }
    for wrestler in result.losers() {
        let amount = scale(loser_fans(result.rating, rng), multiplier);
        events.push(DomainEvent::FanAwarded {
            wrestler,
            amount,
            reason: format!("Lost {}", result.stipulation_label()),
        });
    }
    events
}

fn scale(amount: i64, multiplier: f64) -> i64 {
    (amount as f64 * multiplier).round() as i64
}

/// Bumps (and resulting injuries) from the stipulation's bump rule.
pub fn bumps(result: &MatchResult, teams: &[MatchTeam]) -> Vec<DomainEvent> {
    let Some(stipulation) = &result.stipulation else {
        return Vec::new();
    };
    let bumped: Vec<WrestlerId> = match stipulation.bump_rule {
        BumpRule::None => return Vec::new(),
        BumpRule::Winners => result.winners(),
        BumpRule::Losers => result.losers(),
        BumpRule::All => result.participants(),
    };
    let mut events = Vec::new();
    for id in bumped {
        events.push(DomainEvent::BumpAdded { wrestler: id });
        let prior = teams
            .iter()
            .flat_map(|t| t.members.iter())
            .find(|w| w.id == id)
            .map_or(0, |w| w.bumps);
        if prior + 1 >= BUMPS_PER_INJURY {
            events.push(DomainEvent::WrestlerInjured {
                wrestler: id,
                reason: format!("Took one bump too many in a {} match", stipulation.name),
            });
        }
    }
    events
}

/// Heat between rivals who faced each other.
pub fn heat_changes(result: &MatchResult, rivals: &[[WrestlerId; 2]]) -> Vec<DomainEvent> {
    let delta = heat::match_heat(
        result.is_title_match(),
        result.stipulation.is_some(),
        result.finish == Finish::Pinfall,
    );
    let team_of = |id: WrestlerId| result.teams.iter().position(|t| t.members.contains(&id));
    rivals
        .iter()
        .filter(|[a, b]| match (team_of(*a), team_of(*b)) {
            (Some(ta), Some(tb)) => ta != tb,
            _ => false,
        })
        .map(|pair| DomainEvent::HeatChanged {
            rivalry: None,
            wrestlers: *pair,
            delta,
            reason: format!("Faced off in a {} ({})", result.match_type, result.stipulation_label()),
            total: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use booker_core::{MatchType, Stipulation, TeamSummary, Wrestler};
    use rand::SeedableRng;

    use super::*;

    fn teams() -> Vec<MatchTeam> {
        let mut veteran = Wrestler::new("Veteran", 50_000);
        veteran.bumps = 2;
        vec![
            MatchTeam::solo(Wrestler::new("Winner", 30_000)),
            MatchTeam::solo(veteran),
        ]
    }

    fn result(teams: &[MatchTeam], stipulation: Option<Stipulation>, rating: f64) -> MatchResult {
        MatchResult {
            teams: teams.iter().map(TeamSummary::from).collect(),
            winning_team: 0,
            match_type: MatchType::Singles,
            duration_minutes: 14,
            rating,
            stipulation,
            finish: Finish::Pinfall,
            title: None,
            win_probability: 0.5,
        }
    }

    #[test]
    fn quality_bonus_steps() {
        assert_eq!(quality_bonus(2.75), 0);
        assert_eq!(quality_bonus(3.0), 1_000);
        assert_eq!(quality_bonus(4.0), 3_000);
        assert_eq!(quality_bonus(4.5), 5_000);
        assert_eq!(quality_bonus(5.0), 10_000);
    }

    #[test]
    fn fan_rolls_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let w = winner_fans(1.0, &mut rng);
            assert!((5_000..=15_000).contains(&w));
            let l = loser_fans(1.0, &mut rng);
            assert!((-3_000..=2_000).contains(&l));
        }
    }

    #[test]
    fn awards_every_participant() {
        let teams = teams();
        let r = result(&teams, None, 3.0);
        let mut rng = StdRng::seed_from_u64(42);
        let events = fan_awards(&r, 1.0, &mut rng);
        assert_eq!(events.len(), 2);
        match &events[0] {
            DomainEvent::FanAwarded { amount, reason, .. } => {
                assert!(*amount >= 6_000);
                assert_eq!(reason, "Won Standard Match");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn multiplier_scales_awards() {
        let teams = teams();
        let r = result(&teams, None, 1.0);
        let base = fan_awards(&r, 1.0, &mut StdRng::seed_from_u64(3));
        let doubled = fan_awards(&r, 2.0, &mut StdRng::seed_from_u64(3));
        for (b, d) in base.iter().zip(&doubled) {
            match (b, d) {
                (
                    DomainEvent::FanAwarded { amount: x, .. },
                    DomainEvent::FanAwarded { amount: y, .. },
                ) => assert_eq!(*y, x * 2),
                other => panic!("unexpected events: {other:?}"),
            }
        }
    }

    #[test]
    fn loser_bump_rule_injures_worn_veteran() {
        let teams = teams();
        let r = result(&teams, Some(Stipulation::named("Steel Cage")), 3.0);
        let events = bumps(&r, &teams);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], DomainEvent::BumpAdded { wrestler } if wrestler == teams[1].members[0].id));
        assert!(matches!(events[1], DomainEvent::WrestlerInjured { .. }));
    }

    #[test]
    fn no_stipulation_no_bumps() {
        let teams = teams();
        assert!(bumps(&result(&teams, None, 3.0), &teams).is_empty());
        let plain = Stipulation::custom("Submission");
        assert!(bumps(&result(&teams, Some(plain), 3.0), &teams).is_empty());
    }

    #[test]
    fn all_bump_rule_hits_everyone() {
        let teams = teams();
        let events = bumps(&result(&teams, Some(Stipulation::named("Hardcore")), 3.0), &teams);
        let bumps = events
            .iter()
            .filter(|e| matches!(e, DomainEvent::BumpAdded { .. }))
            .count();
        assert_eq!(bumps, 2);
    }

    #[test]
    fn heat_only_between_opposing_rivals() {
        let teams = teams();
        let a = teams[0].members[0].id;
        let b = teams[1].members[0].id;
        let r = result(&teams, Some(Stipulation::named("Ladder")), 3.0);
        let events = heat_changes(&r, &[[a, b], [a, WrestlerId::new()], [a, a]]);
        assert_eq!(events.len(), 1);
        match &events[0] {
            DomainEvent::HeatChanged { delta, wrestlers, .. } => {
                assert_eq!(*delta, 2 + 2 + 1);
                assert_eq!(*wrestlers, [a, b]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}

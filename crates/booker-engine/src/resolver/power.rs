//! Team power ratings and weighted picks.

use rand::Rng;
use rand::rngs::StdRng;

use booker_core::{MatchTeam, Wrestler};

/// Weight every wrestler starts from before tier and punishment.
pub const BASE_MEMBER_WEIGHT: i64 = 10;
/// Fans per extra point of weight.
pub const FANS_PER_WEIGHT: i64 = 10_000;

/// A single wrestler's contribution before team decay. Never below 1.
pub fn member_weight(wrestler: &Wrestler) -> f64 {
    let weight = BASE_MEMBER_WEIGHT + i64::from(wrestler.tier().match_bonus())
        + wrestler.fans / FANS_PER_WEIGHT
        - i64::from(wrestler.health_penalty());
    weight.max(1) as f64
}

/// Aggregate power of a team.
///
/// Members are ranked strongest first; the i-th member contributes
/// `weight * decay^i`, so extra bodies help less and less.
pub fn team_power(team: &MatchTeam, decay: f64) -> f64 {
    let mut weights: Vec<f64> = team.members.iter().map(member_weight).collect();
    weights.sort_by(|a, b| b.total_cmp(a));
    weights
        .iter()
        .zip(std::iter::successors(Some(1.0), |f| Some(f * decay)))
        .map(|(w, factor)| w * factor)
        .sum()
}

/// Multiply `power` by a uniform factor in `[1 - variance, 1 + variance]`.
pub fn apply_variance(power: f64, variance: f64, rng: &mut StdRng) -> f64 {
    if variance <= 0.0 {
        return power;
    }
    power * rng.random_range(1.0 - variance..=1.0 + variance)
}

/// Each side's share of the total power.
pub fn win_probabilities(powers: &[f64]) -> Vec<f64> {
    let total: f64 = powers.iter().sum();
    if total <= 0.0 {
        let even = 1.0 / powers.len().max(1) as f64;
        return vec![even; powers.len()];
    }
    powers.iter().map(|p| p / total).collect()
}

/// Pick an index with probability proportional to its weight.
///
/// Indices listed in `excluded` are never picked. Returns `None` when no
/// index is eligible.
pub fn pick_weighted(weights: &[f64], excluded: &[usize], rng: &mut StdRng) -> Option<usize> {
    let eligible: Vec<(usize, f64)> = weights
        .iter()
        .copied()
        .enumerate()
        .filter(|(i, _)| !excluded.contains(i))
        .map(|(i, w)| (i, w.max(0.0)))
        .collect();
    let total: f64 = eligible.iter().map(|(_, w)| w).sum();
    if eligible.is_empty() {
        return None;
    }
    if total <= 0.0 {
        return eligible.get(rng.random_range(0..eligible.len())).map(|(i, _)| *i);
    }
    let mut roll = rng.random_range(0.0..total);
    for (i, w) in &eligible {
        if roll < *w {
            return Some(*i);
        }
        roll -= w;
    }
    eligible.last().map(|(i, _)| *i)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn weight_grows_with_tier_and_fans() {
        let rookie = Wrestler::new("Rookie", 0);
        let icon = Wrestler::new("Icon", 150_000);
        assert_eq!(member_weight(&rookie), 10.0);
        assert_eq!(member_weight(&icon), 10.0 + 20.0 + 15.0);
    }

    #[test]
    fn punishment_lowers_weight_but_not_below_one() {
        let mut w = Wrestler::new("Hurt", 0);
        w.injuries = 10;
        assert_eq!(member_weight(&w), 1.0);
    }

    #[test]
    fn extra_members_have_diminishing_weight() {
        let solo = MatchTeam::solo(Wrestler::new("A", 0));
        let trio = MatchTeam::new(
            "Trio",
            vec![
                Wrestler::new("A", 0),
                Wrestler::new("B", 0),
                Wrestler::new("C", 0),
            ],
        );
        let solo_power = team_power(&solo, 0.6);
        let trio_power = team_power(&trio, 0.6);
        assert!((solo_power - 10.0).abs() < 1e-9);
        assert!((trio_power - (10.0 + 6.0 + 3.6)).abs() < 1e-9);
        assert!(trio_power < 3.0 * solo_power);
    }

    #[test]
    fn strongest_member_counts_fully() {
        let team = MatchTeam::new(
            "Mixed",
            vec![Wrestler::new("Rookie", 0), Wrestler::new("Icon", 100_000)],
        );
        assert!((team_power(&team, 0.5) - (40.0 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn variance_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let p = apply_variance(100.0, 0.1, &mut rng);
            assert!((90.0..=110.0).contains(&p));
        }
        assert_eq!(apply_variance(100.0, 0.0, &mut rng), 100.0);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let probs = win_probabilities(&[30.0, 10.0]);
        assert!((probs[0] - 0.75).abs() < 1e-9);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(win_probabilities(&[0.0, 0.0]), vec![0.5, 0.5]);
    }

    #[test]
    fn weighted_pick_respects_exclusions() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(pick_weighted(&[5.0, 5.0, 5.0], &[0, 2], &mut rng), Some(1));
        }
        assert_eq!(pick_weighted(&[1.0], &[0], &mut rng), None);
    }

    #[test]
    fn weighted_pick_favours_heavier_side() {
        let mut rng = StdRng::seed_from_u64(42);
        let heavy = (0..2000)
            .filter(|_| pick_weighted(&[9.0, 1.0], &[], &mut rng) == Some(0))
            .count();
        assert!((1700..=1900).contains(&heavy), "heavy side won {heavy}");
    }
}

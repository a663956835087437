//! Title ledger: eligibility, challenge economics, and reign transfer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use booker_core::{
    BookerError, BookerResult, DomainEvent, Finish, MatchResult, Title, TitleId, Wrestler,
    WrestlerId,
};

/// Receipt for a paid title challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeReceipt {
    /// The title challenged for.
    pub title: TitleId,
    /// The challenger.
    pub challenger: WrestlerId,
    /// Fans deducted.
    pub cost: i64,
    /// Fans the challenger has left.
    pub fans_remaining: i64,
}

/// Crown `wrestler` champion, closing any open reign.
///
/// The wrestler must meet the title tier's fan requirement.
pub fn award_title(title: &mut Title, wrestler: &Wrestler) -> BookerResult<DomainEvent> {
    award_title_at(title, wrestler, Utc::now())
}

/// [`award_title`] with an explicit timestamp.
pub fn award_title_at(
    title: &mut Title,
    wrestler: &Wrestler,
    at: DateTime<Utc>,
) -> BookerResult<DomainEvent> {
    if !title.active {
        return Err(BookerError::InvalidStateTransition(format!(
            "{} is not active",
            title.name
        )));
    }
    if title.champion() == Some(wrestler.id) {
        return Err(BookerError::IneligibleChallenger(format!(
            "{} already holds {}",
            wrestler.name, title.name
        )));
    }
    if !title.tier.is_eligible(wrestler.fans) {
        return Err(BookerError::IneligibleChallenger(format!(
            "{} needs {} fans for {} (has {})",
            wrestler.name,
            title.tier.required_fans(),
            title.name,
            wrestler.fans
        )));
    }
    Ok(crown(title, wrestler.id, at))
}

/// Vacate the title, closing the current reign.
pub fn vacate_title(title: &mut Title) -> BookerResult<DomainEvent> {
    vacate_title_at(title, Utc::now())
}

/// [`vacate_title`] with an explicit timestamp.
pub fn vacate_title_at(title: &mut Title, at: DateTime<Utc>) -> BookerResult<DomainEvent> {
    let from = title.end_reign(at).ok_or_else(|| {
        BookerError::InvalidStateTransition(format!("{} is already vacant", title.name))
    })?;
    tracing::info!(title = %title.id, champion = %from, "title vacated");
    Ok(DomainEvent::TitleChanged {
        title: title.id,
        from: Some(from),
        to: None,
    })
}

/// Pay to challenge for a title.
///
/// Checks run in order: the title must be active, the challenger must not
/// already hold it, must meet the tier's fan requirement, and must afford
/// the tier's challenge cost. Fans are only deducted once every check has
/// passed.
pub fn challenge_for_title(
    challenger: &mut Wrestler,
    title: &mut Title,
) -> BookerResult<ChallengeReceipt> {
    if !title.active {
        return Err(BookerError::InvalidStateTransition(format!(
            "{} is not active",
            title.name
        )));
    }
    if title.champion() == Some(challenger.id) {
        return Err(BookerError::IneligibleChallenger(format!(
            "{} is already the champion",
            challenger.name
        )));
    }
    if !title.tier.is_eligible(challenger.fans) {
        return Err(BookerError::IneligibleChallenger(format!(
            "{} needs {} fans to challenge for {}",
            challenger.name,
            title.tier.required_fans(),
            title.name
        )));
    }
    let cost = title.tier.challenge_cost();
    if !challenger.can_afford(cost) {
        return Err(BookerError::InsufficientFans {
            needed: cost,
            available: challenger.fans,
        });
    }
    if !challenger.spend_fans(cost) {
        return Err(BookerError::InsufficientFans {
            needed: cost,
            available: challenger.fans,
        });
    }
    title.add_challenger(challenger.id);
    tracing::info!(
        title = %title.id,
        challenger = %challenger.id,
        cost,
        "title challenge accepted"
    );
    Ok(ChallengeReceipt {
        title: title.id,
        challenger: challenger.id,
        cost,
        fans_remaining: challenger.fans,
    })
}

/// Transfer the title according to a title-match result.
///
/// A vacant title goes to the first member of the winning side. A reigning
/// champion keeps the title on a win, and on a loss by disqualification;
/// any other loss starts a new reign for the winning side. Returns the
/// change, if the title moved.
pub fn apply_match_result(
    title: &mut Title,
    result: &MatchResult,
    at: DateTime<Utc>,
) -> BookerResult<Option<DomainEvent>> {
    if result.title != Some(title.id) {
        return Err(BookerError::InvalidStateTransition(format!(
            "{} was not on the line",
            title.name
        )));
    }
    if !title.active {
        return Err(BookerError::InvalidStateTransition(format!(
            "{} is not active",
            title.name
        )));
    }
    let Some(new_champion) = result.winners().first().copied() else {
        return Ok(None);
    };
    match title.champion() {
        Some(champion) if result.is_winner(champion) => Ok(None),
        Some(_) if result.finish == Finish::Disqualification => Ok(None),
        _ => Ok(Some(crown(title, new_champion, at))),
    }
}

/// Titles currently held by a wrestler.
pub fn held_by(titles: &[Title], wrestler: WrestlerId) -> Vec<&Title> {
    titles
        .iter()
        .filter(|t| t.champion() == Some(wrestler))
        .collect()
}

/// Active titles a fan count qualifies for, most prestigious first.
pub fn eligible_titles(titles: &[Title], fans: i64) -> Vec<&Title> {
    let mut eligible: Vec<&Title> = titles
        .iter()
        .filter(|t| t.active && t.tier.is_eligible(fans))
        .collect();
    eligible.sort_by(|a, b| b.tier.cmp(&a.tier));
    eligible
}

fn crown(title: &mut Title, wrestler: WrestlerId, at: DateTime<Utc>) -> DomainEvent {
    let from = title.champion();
    title.begin_reign(wrestler, at);
    tracing::info!(title = %title.id, champion = %wrestler, "new champion");
    DomainEvent::TitleChanged {
        title: title.id,
        from,
        to: Some(wrestler),
    }
}

#[cfg(test)]
mod tests {
    use booker_core::{MatchTeam, MatchType, TeamSummary, TitleTier};

    use super::*;

    fn title_result(title: &Title, winner: &Wrestler, loser: &Wrestler, finish: Finish) -> MatchResult {
        MatchResult {
            teams: vec![
                TeamSummary::from(&MatchTeam::solo(winner.clone())),
                TeamSummary::from(&MatchTeam::solo(loser.clone())),
            ],
            winning_team: 0,
            match_type: MatchType::Singles,
            duration_minutes: 15,
            rating: 3.5,
            stipulation: None,
            finish,
            title: Some(title.id),
            win_probability: 0.5,
        }
    }

    #[test]
    fn award_requires_fans() {
        let mut title = Title::new("World", TitleTier::World);
        let rookie = Wrestler::new("Rookie", 50_000);
        let err = award_title(&mut title, &rookie).unwrap_err();
        assert!(matches!(err, BookerError::IneligibleChallenger(_)));
        assert!(title.is_vacant());

        let icon = Wrestler::new("Icon", 120_000);
        let event = award_title(&mut title, &icon).unwrap();
        assert_eq!(
            event,
            DomainEvent::TitleChanged {
                title: title.id,
                from: None,
                to: Some(icon.id)
            }
        );
        assert_eq!(title.champion(), Some(icon.id));
    }

    #[test]
    fn award_closes_previous_reign() {
        let mut title = Title::new("Extreme", TitleTier::Extreme);
        let a = Wrestler::new("A", 30_000);
        let b = Wrestler::new("B", 30_000);
        award_title(&mut title, &a).unwrap();
        award_title(&mut title, &b).unwrap();
        assert_eq!(title.total_reigns(), 2);
        assert!(title.reigns()[0].ended_at.is_some());
        assert!(award_title(&mut title, &b).is_err());
    }

    #[test]
    fn vacate_requires_champion() {
        let mut title = Title::new("Extreme", TitleTier::Extreme);
        assert!(vacate_title(&mut title).is_err());
        let a = Wrestler::new("A", 30_000);
        award_title(&mut title, &a).unwrap();
        vacate_title(&mut title).unwrap();
        assert!(title.is_vacant());
        assert_eq!(title.total_reigns(), 1);
    }

    #[test]
    fn ineligible_check_precedes_cost() {
        let mut title = Title::new("Intertemporal", TitleTier::Intertemporal);
        let mut broke = Wrestler::new("Broke", 10_000);
        let err = challenge_for_title(&mut broke, &mut title).unwrap_err();
        assert!(matches!(err, BookerError::IneligibleChallenger(_)));
        assert_eq!(broke.fans, 10_000);
        assert!(title.challengers().is_empty());
    }

    #[test]
    fn below_threshold_challenge_rejected() {
        let mut title = Title::new("Intertemporal", TitleTier::Intertemporal);
        let mut mid = Wrestler::new("Mid", 45_000);
        let err = challenge_for_title(&mut mid, &mut title).unwrap_err();
        assert!(matches!(err, BookerError::IneligibleChallenger(_)));
        assert_eq!(mid.fans, 45_000);
    }

    #[test]
    fn inactive_title_rejects_challenges() {
        let mut title = Title::new("Retired Belt", TitleTier::Extreme);
        title.active = false;
        let mut w = Wrestler::new("W", 100_000);
        let err = challenge_for_title(&mut w, &mut title).unwrap_err();
        assert!(matches!(err, BookerError::InvalidStateTransition(_)));
        assert_eq!(w.fans, 100_000);
    }

    #[test]
    fn champion_cannot_challenge() {
        let mut title = Title::new("Extreme", TitleTier::Extreme);
        let mut champ = Wrestler::new("Champ", 50_000);
        award_title(&mut title, &champ).unwrap();
        let err = challenge_for_title(&mut champ, &mut title).unwrap_err();
        assert!(matches!(err, BookerError::IneligibleChallenger(_)));
        assert_eq!(champ.fans, 50_000);
    }

    #[test]
    fn successful_challenge_deducts_cost() {
        let mut title = Title::new("Tag", TitleTier::TagTeam);
        let mut w = Wrestler::new("W", 41_000);
        let receipt = challenge_for_title(&mut w, &mut title).unwrap();
        assert_eq!(receipt.cost, 15_000);
        assert_eq!(receipt.fans_remaining, 26_000);
        assert_eq!(w.fans, 26_000);
        assert_eq!(title.challengers(), &[w.id]);
    }

    #[test]
    fn title_changes_hands_on_clean_loss() {
        let mut title = Title::new("World", TitleTier::World);
        let champ = Wrestler::new("Champ", 150_000);
        let challenger = Wrestler::new("Challenger", 110_000);
        award_title(&mut title, &champ).unwrap();

        let result = title_result(&title, &challenger, &champ, Finish::Pinfall);
        let event = apply_match_result(&mut title, &result, Utc::now()).unwrap();
        assert!(event.is_some());
        assert_eq!(title.champion(), Some(challenger.id));
        assert_eq!(title.total_reigns(), 2);
    }

    #[test]
    fn champion_retains_on_dq_loss_and_win() {
        let mut title = Title::new("World", TitleTier::World);
        let champ = Wrestler::new("Champ", 150_000);
        let challenger = Wrestler::new("Challenger", 110_000);
        award_title(&mut title, &champ).unwrap();

        let dq = title_result(&title, &challenger, &champ, Finish::Disqualification);
        assert!(apply_match_result(&mut title, &dq, Utc::now()).unwrap().is_none());
        let win = title_result(&title, &champ, &challenger, Finish::Pinfall);
        assert!(apply_match_result(&mut title, &win, Utc::now()).unwrap().is_none());
        assert_eq!(title.champion(), Some(champ.id));
        assert_eq!(title.total_reigns(), 1);
    }

    #[test]
    fn vacant_title_goes_to_winner() {
        let mut title = Title::new("Extreme", TitleTier::Extreme);
        let a = Wrestler::new("A", 1_000);
        let b = Wrestler::new("B", 1_000);
        let result = title_result(&title, &a, &b, Finish::Pinfall);
        apply_match_result(&mut title, &result, Utc::now()).unwrap();
        assert_eq!(title.champion(), Some(a.id));
    }

    #[test]
    fn result_for_other_title_rejected() {
        let mut title = Title::new("Extreme", TitleTier::Extreme);
        let other = Title::new("World", TitleTier::World);
        let a = Wrestler::new("A", 1_000);
        let b = Wrestler::new("B", 1_000);
        let result = title_result(&other, &a, &b, Finish::Pinfall);
        assert!(apply_match_result(&mut title, &result, Utc::now()).is_err());
    }

    #[test]
    fn eligible_titles_ordered_by_prestige() {
        let titles = vec![
            Title::new("Extreme", TitleTier::Extreme),
            Title::new("World", TitleTier::World),
            Title::new("Tag", TitleTier::TagTeam),
        ];
        let names: Vec<_> = eligible_titles(&titles, 45_000)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Tag", "Extreme"]);
    }

    #[test]
    fn held_by_lists_current_titles() {
        let mut titles = vec![
            Title::new("Extreme", TitleTier::Extreme),
            Title::new("Tag", TitleTier::TagTeam),
        ];
        let w = Wrestler::new("W", 50_000);
        award_title(&mut titles[1], &w).unwrap();
        assert_eq!(held_by(&titles, w.id).len(), 1);
    }
}

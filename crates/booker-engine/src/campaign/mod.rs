//! Career progression: chapters, tournaments, and upgrades.

pub mod bracket;
pub mod chapter;
pub mod upgrade;

use std::fmt;

use serde::Serialize;

use booker_core::{
    BookerError, BookerResult, Campaign, CampaignStatus, ChapterRecord, DomainEvent,
    TournamentProgress, WrestlerId,
};

pub use bracket::{BracketMatch, Slot, TournamentBracket};
pub use chapter::{Chapter, ChapterTable, Difficulty, EntryCriteria, TournamentRules};
pub use upgrade::{Upgrade, UpgradeCatalog, UpgradeEffect};

/// A change of tournament state caused by one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentTransition {
    /// Reached the finals.
    Qualified,
    /// Qualification became impossible.
    FailedToQualify,
    /// Won the finals.
    WonTournament,
    /// Knocked out of the finals.
    Eliminated,
    /// Entered the narrative finale.
    FinaleReached,
    /// Won the narrative finale.
    WonFinale,
}

impl fmt::Display for TournamentTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualified => write!(f, "Qualified for the finals"),
            Self::FailedToQualify => write!(f, "Failed to qualify"),
            Self::WonTournament => write!(f, "Won the tournament"),
            Self::Eliminated => write!(f, "Eliminated in the finals"),
            Self::FinaleReached => write!(f, "Reached the chapter finale"),
            Self::WonFinale => write!(f, "Won the chapter finale"),
        }
    }
}

/// What one processed result changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignUpdate {
    /// Victory points gained (or lost).
    pub victory_points: i32,
    /// Skill tokens gained.
    pub skill_tokens: u32,
    /// State change, if any.
    pub transition: Option<TournamentTransition>,
    /// Whether the chapter's exit criteria are now met.
    pub chapter_complete: bool,
    /// Inbox messages for the wrestler.
    pub events: Vec<DomainEvent>,
}

/// Drives campaigns through a chapter table.
#[derive(Debug, Clone, Default)]
pub struct CampaignStateMachine {
    chapters: ChapterTable,
    upgrades: UpgradeCatalog,
}

impl CampaignStateMachine {
    /// Create a state machine over the given tables.
    pub fn new(chapters: ChapterTable, upgrades: UpgradeCatalog) -> Self {
        Self { chapters, upgrades }
    }

    /// The chapter table.
    pub fn chapters(&self) -> &ChapterTable {
        &self.chapters
    }

    /// The upgrade catalog.
    pub fn upgrades(&self) -> &UpgradeCatalog {
        &self.upgrades
    }

    /// Start a campaign at the first chapter.
    pub fn start(&self, wrestler: WrestlerId) -> Campaign {
        let campaign = Campaign::new(wrestler, self.chapters.first().id.clone());
        tracing::info!(campaign = %campaign.id, chapter = %campaign.chapter, "campaign started");
        campaign
    }

    /// The chapter the campaign is in.
    pub fn current_chapter(&self, campaign: &Campaign) -> BookerResult<&Chapter> {
        self.chapters.get(&campaign.chapter)
    }

    /// Fan reward multiplier for the current chapter.
    pub fn reward_multiplier(&self, campaign: &Campaign) -> f64 {
        self.current_chapter(campaign)
            .map_or(1.0, |c| c.difficulty.reward_multiplier())
    }

    /// Record a match result for the campaign wrestler.
    ///
    /// Terminal tournament flags never change once set; later results in
    /// the same chapter only add to the record and rewards.
    pub fn process_match_result(
        &self,
        campaign: &mut Campaign,
        won: bool,
    ) -> BookerResult<CampaignUpdate> {
        if !campaign.is_active() {
            return Err(BookerError::InvalidStateTransition(format!(
                "campaign {} is already completed",
                campaign.id
            )));
        }
        let chapter = self.current_chapter(campaign)?;

        campaign.record.played += 1;
        let (victory_points, skill_tokens) = if won {
            campaign.record.wins += 1;
            (chapter.win_points, chapter.win_tokens + campaign.token_bonus)
        } else {
            campaign.record.losses += 1;
            (chapter.loss_points, 0)
        };
        campaign.victory_points += victory_points;
        campaign.skill_tokens += skill_tokens;

        let transition = match &chapter.tournament {
            Some(rules) => advance_tournament(&mut campaign.tournament, rules, won),
            None => advance_finale(campaign, chapter, won),
        };

        let mut events = Vec::new();
        if let Some(t) = transition {
            tracing::info!(campaign = %campaign.id, chapter = %chapter.id, transition = %t, "campaign transition");
            events.push(DomainEvent::InboxItemCreated {
                recipient: Some(campaign.wrestler),
                message: format!("{}: {t}", chapter.title),
            });
        }
        let chapter_complete = self.is_chapter_complete(campaign)?;
        tracing::debug!(
            campaign = %campaign.id,
            won,
            victory_points = campaign.victory_points,
            skill_tokens = campaign.skill_tokens,
            "campaign result recorded"
        );
        Ok(CampaignUpdate {
            victory_points,
            skill_tokens,
            transition,
            chapter_complete,
            events,
        })
    }

    /// Whether the current chapter's exit criteria are met.
    ///
    /// Tournament chapters end on a terminal flag, finale chapters when the
    /// finale is won, others on their match and win minimums.
    pub fn is_chapter_complete(&self, campaign: &Campaign) -> BookerResult<bool> {
        let chapter = self.current_chapter(campaign)?;
        Ok(if chapter.is_tournament() {
            campaign.tournament.is_terminal()
        } else if chapter.finale_trigger_vp.is_some() {
            campaign.won_finale
        } else {
            campaign.record.played >= chapter.min_matches && campaign.record.wins >= chapter.min_wins
        })
    }

    /// Whether the next result counts toward the tournament finals.
    ///
    /// True once the wrestler has qualified and played out the qualifying
    /// schedule, until the finals reach a terminal flag.
    pub fn is_playing_finals(&self, campaign: &Campaign) -> BookerResult<bool> {
        let chapter = self.current_chapter(campaign)?;
        Ok(chapter.tournament.as_ref().is_some_and(|rules| {
            let t = &campaign.tournament;
            t.finals_phase
                && !t.is_terminal()
                && t.qualifying_played() >= rules.qualifying_matches
        }))
    }

    /// Move to the next chapter the campaign qualifies for.
    ///
    /// Returns the new chapter id, or `None` when the campaign has
    /// finished its last chapter.
    pub fn advance_chapter(&self, campaign: &mut Campaign) -> BookerResult<Option<String>> {
        if !campaign.is_active() {
            return Err(BookerError::InvalidStateTransition(format!(
                "campaign {} is already completed",
                campaign.id
            )));
        }
        if !self.is_chapter_complete(campaign)? {
            return Err(BookerError::InvalidStateTransition(format!(
                "chapter '{}' is not complete",
                campaign.chapter
            )));
        }
        let next = self.chapters.next_for(campaign).map(|c| c.id.clone());
        match next {
            Some(id) => {
                enter(campaign, id.clone());
                Ok(Some(id))
            }
            None => {
                finish_chapter(campaign);
                campaign.status = CampaignStatus::Completed;
                tracing::info!(campaign = %campaign.id, "campaign completed");
                Ok(None)
            }
        }
    }

    /// Jump to a specific later chapter.
    ///
    /// The target must exist and sit strictly after the current chapter.
    pub fn advance_to(&self, campaign: &mut Campaign, chapter_id: &str) -> BookerResult<()> {
        if !campaign.is_active() {
            return Err(BookerError::InvalidStateTransition(format!(
                "campaign {} is already completed",
                campaign.id
            )));
        }
        let target = self
            .chapters
            .position(chapter_id)
            .ok_or_else(|| BookerError::not_found("chapter", chapter_id))?;
        let current = self
            .chapters
            .position(&campaign.chapter)
            .ok_or_else(|| BookerError::not_found("chapter", &campaign.chapter))?;
        if target <= current {
            return Err(BookerError::InvalidStateTransition(format!(
                "cannot move from '{}' back to '{chapter_id}'",
                campaign.chapter
            )));
        }
        enter(campaign, chapter_id.to_string());
        Ok(())
    }

    /// Buy an upgrade with skill tokens and apply its effect.
    pub fn purchase_upgrade(&self, campaign: &mut Campaign, upgrade_id: &str) -> BookerResult<Upgrade> {
        let upgrade = self.upgrades.get(upgrade_id)?;
        if campaign.owns_upgrade(upgrade_id) {
            return Err(BookerError::AlreadyOwnedUpgrade(upgrade_id.to_string()));
        }
        if campaign.skill_tokens < upgrade.cost {
            return Err(BookerError::InsufficientSkillTokens {
                needed: upgrade.cost,
                available: campaign.skill_tokens,
            });
        }
        campaign.skill_tokens -= upgrade.cost;
        campaign.upgrades.insert(upgrade.id.clone());
        upgrade.effect.apply(campaign);
        tracing::info!(campaign = %campaign.id, upgrade = %upgrade.id, "upgrade purchased");
        Ok(upgrade.clone())
    }
}

fn advance_tournament(
    progress: &mut TournamentProgress,
    rules: &TournamentRules,
    won: bool,
) -> Option<TournamentTransition> {
    if progress.is_terminal() {
        return None;
    }
    // Every scheduled qualifier is played, even after qualifying early.
    if progress.qualifying_played() < rules.qualifying_matches {
        if won {
            progress.qualifying_wins += 1;
        } else {
            progress.qualifying_losses += 1;
        }
        if progress.finals_phase {
            return None;
        }
        let remaining = rules
            .qualifying_matches
            .saturating_sub(progress.qualifying_played());
        if progress.qualifying_wins >= rules.qualifying_wins {
            progress.finals_phase = true;
            return Some(TournamentTransition::Qualified);
        }
        if progress.qualifying_wins + remaining < rules.qualifying_wins {
            progress.failed_to_qualify = true;
            return Some(TournamentTransition::FailedToQualify);
        }
        return None;
    }
    if !progress.finals_phase {
        return None;
    }

    if won {
        progress.finals_wins += 1;
    } else {
        progress.finals_losses += 1;
    }
    let remaining = rules.finals_matches.saturating_sub(progress.finals_played());
    if progress.finals_wins >= rules.finals_wins {
        progress.tournament_winner = true;
        return Some(TournamentTransition::WonTournament);
    }
    if progress.finals_wins + remaining < rules.finals_wins {
        progress.eliminated = true;
        return Some(TournamentTransition::Eliminated);
    }
    None
}

fn advance_finale(campaign: &mut Campaign, chapter: &Chapter, won: bool) -> Option<TournamentTransition> {
    let trigger = chapter.finale_trigger_vp?;
    if campaign.won_finale {
        return None;
    }
    if campaign.finale_phase {
        if won {
            campaign.won_finale = true;
            campaign.finale_phase = false;
            return Some(TournamentTransition::WonFinale);
        }
        return None;
    }
    if campaign.victory_points >= trigger {
        campaign.finale_phase = true;
        return Some(TournamentTransition::FinaleReached);
    }
    None
}

fn finish_chapter(campaign: &mut Campaign) {
    campaign.completed_chapters.push(campaign.chapter.clone());
}

fn enter(campaign: &mut Campaign, chapter: String) {
    finish_chapter(campaign);
    tracing::info!(campaign = %campaign.id, from = %campaign.chapter, to = %chapter, "chapter advanced");
    campaign.chapter = chapter;
    campaign.record = ChapterRecord::default();
    campaign.tournament = TournamentProgress::default();
    campaign.finale_phase = false;
    campaign.won_finale = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> CampaignStateMachine {
        CampaignStateMachine::default()
    }

    fn in_tournament(m: &CampaignStateMachine) -> Campaign {
        let mut c = m.start(WrestlerId::new());
        m.advance_to(&mut c, "tournament").unwrap();
        c
    }

    fn play(m: &CampaignStateMachine, c: &mut Campaign, results: &[bool]) -> Vec<CampaignUpdate> {
        results
            .iter()
            .map(|won| m.process_match_result(c, *won).unwrap())
            .collect()
    }

    #[test]
    fn starts_at_first_chapter() {
        let m = machine();
        let c = m.start(WrestlerId::new());
        assert_eq!(c.chapter, "debut");
        assert!((m.reward_multiplier(&c) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn losing_every_qualifier_fails_to_qualify() {
        let m = machine();
        let mut c = in_tournament(&m);
        let updates = play(&m, &mut c, &[false, false, false, false]);
        assert!(c.is_failed_to_qualify());
        assert!(!c.is_finals_phase());
        assert_eq!(
            updates[1].transition,
            Some(TournamentTransition::FailedToQualify)
        );
        assert!(updates[2].transition.is_none());
        assert_eq!(c.record.losses, 4);
        assert!(m.is_chapter_complete(&c).unwrap());
    }

    #[test]
    fn winning_qualifiers_then_finals_wins_tournament() {
        let m = machine();
        let mut c = in_tournament(&m);
        let updates = play(&m, &mut c, &[true, true, true, true]);
        assert!(c.is_finals_phase());
        assert!(!c.is_failed_to_qualify());
        assert_eq!(c.tournament.qualifying_wins, 4);
        assert_eq!(c.tournament.finals_played(), 0);
        assert_eq!(updates[2].transition, Some(TournamentTransition::Qualified));
        assert!(updates[3].transition.is_none());
        assert!(m.is_playing_finals(&c).unwrap());

        let update = m.process_match_result(&mut c, true).unwrap();
        assert!(update.transition.is_none());
        assert!(!c.is_tournament_winner());
        assert_eq!(c.tournament.finals_wins, 1);

        let update = m.process_match_result(&mut c, true).unwrap();
        assert_eq!(update.transition, Some(TournamentTransition::WonTournament));
        assert!(c.is_tournament_winner());
        assert!(!c.is_eliminated());
        assert!(!m.is_playing_finals(&c).unwrap());
    }

    #[test]
    fn late_qualifying_loss_stays_in_qualifying() {
        let m = machine();
        let mut c = in_tournament(&m);
        let updates = play(&m, &mut c, &[true, true, true, false]);
        let transitions: Vec<_> = updates.iter().filter_map(|u| u.transition).collect();
        assert_eq!(transitions, vec![TournamentTransition::Qualified]);
        assert_eq!(c.tournament.qualifying_wins, 3);
        assert_eq!(c.tournament.qualifying_losses, 1);
        assert_eq!(c.tournament.finals_played(), 0);
        assert!(!c.is_eliminated());
        assert!(m.is_playing_finals(&c).unwrap());
    }

    #[test]
    fn finals_only_count_after_qualifying_schedule() {
        let m = machine();
        let mut c = in_tournament(&m);
        let updates = play(&m, &mut c, &[true, true, true, true, true]);
        let transitions: Vec<_> = updates.iter().filter_map(|u| u.transition).collect();
        assert_eq!(transitions, vec![TournamentTransition::Qualified]);
        assert_eq!(c.tournament.finals_wins, 1);
        assert!(!c.is_tournament_winner());
    }

    #[test]
    fn qualifies_on_third_win() {
        let m = machine();
        let mut c = in_tournament(&m);
        let updates = play(&m, &mut c, &[true, false, true, true]);
        assert_eq!(updates[3].transition, Some(TournamentTransition::Qualified));
        assert_eq!(c.tournament.qualifying_played(), 4);
        play(&m, &mut c, &[true, true]);
        assert!(c.is_tournament_winner());
    }

    #[test]
    fn finals_loss_eliminates() {
        let m = machine();
        let mut c = in_tournament(&m);
        play(&m, &mut c, &[true, true, true, true]);
        assert!(m.is_playing_finals(&c).unwrap());
        let updates = play(&m, &mut c, &[false]);
        assert_eq!(updates[0].transition, Some(TournamentTransition::Eliminated));
        assert!(c.is_eliminated());
        assert!(!c.is_tournament_winner());
        play(&m, &mut c, &[true, true]);
        assert!(!c.is_tournament_winner());
        assert!(c.is_eliminated());
    }

    #[test]
    fn transitions_send_inbox_items() {
        let m = machine();
        let mut c = in_tournament(&m);
        let updates = play(&m, &mut c, &[true, true, true]);
        assert!(updates[0].events.is_empty());
        match updates[2].events.as_slice() {
            [DomainEvent::InboxItemCreated { recipient, message }] => {
                assert_eq!(*recipient, Some(c.wrestler));
                assert!(message.contains("Qualified"));
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn rewards_follow_chapter_rules() {
        let m = machine();
        let mut c = in_tournament(&m);
        let update = m.process_match_result(&mut c, true).unwrap();
        assert_eq!(update.victory_points, 3);
        assert_eq!(update.skill_tokens, 2);
        c.token_bonus = 1;
        let update = m.process_match_result(&mut c, true).unwrap();
        assert_eq!(update.skill_tokens, 3);
        let update = m.process_match_result(&mut c, false).unwrap();
        assert_eq!(update.skill_tokens, 0);
        assert_eq!(c.skill_tokens, 5);
        assert_eq!(c.victory_points, 6);
    }

    #[test]
    fn debut_completes_on_exit_criteria() {
        let m = machine();
        let mut c = m.start(WrestlerId::new());
        play(&m, &mut c, &[false, false]);
        assert!(matches!(
            m.advance_chapter(&mut c),
            Err(BookerError::InvalidStateTransition(_))
        ));
        let update = m.process_match_result(&mut c, true).unwrap();
        assert!(update.chapter_complete);
        assert_eq!(m.advance_chapter(&mut c).unwrap().as_deref(), Some("proving_ground"));
        assert_eq!(c.record, ChapterRecord::default());
        assert!(c.has_completed("debut"));
    }

    #[test]
    fn finale_retries_until_won() {
        let m = machine();
        let mut c = m.start(WrestlerId::new());
        m.advance_to(&mut c, "proving_ground").unwrap();
        let updates = play(&m, &mut c, &[true, true]);
        assert_eq!(updates[1].transition, Some(TournamentTransition::FinaleReached));
        assert!(c.finale_phase);
        play(&m, &mut c, &[false]);
        assert!(c.finale_phase);
        assert!(!m.is_chapter_complete(&c).unwrap());
        let update = m.process_match_result(&mut c, true).unwrap();
        assert_eq!(update.transition, Some(TournamentTransition::WonFinale));
        assert!(update.chapter_complete);
    }

    #[test]
    fn advance_to_rejects_backward_and_unknown() {
        let m = machine();
        let mut c = in_tournament(&m);
        assert!(matches!(
            m.advance_to(&mut c, "debut"),
            Err(BookerError::InvalidStateTransition(_))
        ));
        assert!(matches!(
            m.advance_to(&mut c, "tournament"),
            Err(BookerError::InvalidStateTransition(_))
        ));
        assert!(matches!(
            m.advance_to(&mut c, "hall_of_fame"),
            Err(BookerError::NotFound { .. })
        ));
        m.advance_to(&mut c, "title_pursuit").unwrap();
        assert_eq!(c.chapter, "title_pursuit");
    }

    #[test]
    fn completes_after_last_chapter() {
        let m = machine();
        let mut c = m.start(WrestlerId::new());
        m.advance_to(&mut c, "title_pursuit").unwrap();
        play(&m, &mut c, &[true, true, true]);
        assert_eq!(m.advance_chapter(&mut c).unwrap(), None);
        assert_eq!(c.status, CampaignStatus::Completed);
        assert!(c.has_completed("title_pursuit"));
        assert!(matches!(
            m.process_match_result(&mut c, true),
            Err(BookerError::InvalidStateTransition(_))
        ));
        assert!(matches!(
            m.advance_chapter(&mut c),
            Err(BookerError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn tournament_flags_reset_on_new_chapter() {
        let m = machine();
        let mut c = in_tournament(&m);
        play(&m, &mut c, &[false, false]);
        assert!(c.is_failed_to_qualify());
        m.advance_chapter(&mut c).unwrap();
        assert_eq!(c.chapter, "title_pursuit");
        assert!(!c.tournament.is_terminal());
    }

    #[test]
    fn purchase_upgrade_checks() {
        let m = machine();
        let mut c = m.start(WrestlerId::new());
        assert!(matches!(
            m.purchase_upgrade(&mut c, "jetpack"),
            Err(BookerError::NotFound { .. })
        ));
        assert_eq!(
            m.purchase_upgrade(&mut c, "cardio"),
            Err(BookerError::InsufficientSkillTokens {
                needed: 2,
                available: 0
            })
        );
        c.skill_tokens = 5;
        let bought = m.purchase_upgrade(&mut c, "cardio").unwrap();
        assert_eq!(bought.id, "cardio");
        assert_eq!(c.skill_tokens, 3);
        assert_eq!(c.stamina_bonus, 15);
        assert_eq!(
            m.purchase_upgrade(&mut c, "cardio"),
            Err(BookerError::AlreadyOwnedUpgrade("cardio".into()))
        );
        assert_eq!(c.skill_tokens, 3);
    }

    #[test]
    fn crowd_work_raises_token_yield() {
        let m = machine();
        let mut c = m.start(WrestlerId::new());
        c.skill_tokens = 3;
        m.purchase_upgrade(&mut c, "crowd_work").unwrap();
        let update = m.process_match_result(&mut c, true).unwrap();
        assert_eq!(update.skill_tokens, 2);
    }
}

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CampaignId, WrestlerId};

/// Whether a campaign is still being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Chapters remain.
    #[default]
    Active,
    /// Every chapter has been played.
    Completed,
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// Progress through the tournament inside a tournament chapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentProgress {
    /// Qualifying matches won.
    pub qualifying_wins: u32,
    /// Qualifying matches lost.
    pub qualifying_losses: u32,
    /// Whether the wrestler reached the finals.
    pub finals_phase: bool,
    /// Finals matches won.
    pub finals_wins: u32,
    /// Finals matches lost.
    pub finals_losses: u32,
    /// Qualification became impossible.
    pub failed_to_qualify: bool,
    /// The wrestler won the tournament.
    pub tournament_winner: bool,
    /// The wrestler was knocked out in the finals.
    pub eliminated: bool,
}

impl TournamentProgress {
    /// Whether the tournament has reached an end state for this wrestler.
    pub fn is_terminal(&self) -> bool {
        self.failed_to_qualify || self.tournament_winner || self.eliminated
    }

    /// Qualifying matches played.
    pub fn qualifying_played(&self) -> u32 {
        self.qualifying_wins + self.qualifying_losses
    }

    /// Finals matches played.
    pub fn finals_played(&self) -> u32 {
        self.finals_wins + self.finals_losses
    }
}

/// Win/loss record within the current chapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    /// Matches played.
    pub played: u32,
    /// Matches won.
    pub wins: u32,
    /// Matches lost.
    pub losses: u32,
}

/// A wrestler's career progression through chapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier.
    pub id: CampaignId,
    /// The wrestler whose career this is.
    pub wrestler: WrestlerId,
    /// Active or completed.
    pub status: CampaignStatus,
    /// Chapter currently being played.
    pub chapter: String,
    /// Chapters already finished, in order.
    pub completed_chapters: Vec<String>,
    /// Tournament sub-state for the current chapter.
    pub tournament: TournamentProgress,
    /// Record in the current chapter.
    pub record: ChapterRecord,
    /// A narrative finale is pending in the current chapter.
    #[serde(default)]
    pub finale_phase: bool,
    /// The current chapter's narrative finale was won.
    #[serde(default)]
    pub won_finale: bool,
    /// Victory points earned across the campaign.
    pub victory_points: i32,
    /// Unspent skill tokens.
    pub skill_tokens: u32,
    /// Purchased upgrade ids.
    pub upgrades: BTreeSet<String>,
    /// Health granted by upgrades.
    pub health_bonus: u32,
    /// Stamina granted by upgrades.
    pub stamina_bonus: u32,
    /// Extra skill tokens granted per win by upgrades.
    pub token_bonus: u32,
    /// When the campaign started.
    pub started_at: DateTime<Utc>,
}

impl Campaign {
    /// Start a campaign for `wrestler` at the given chapter.
    pub fn new(wrestler: WrestlerId, first_chapter: impl Into<String>) -> Self {
        Self {
            id: CampaignId::new(),
            wrestler,
            status: CampaignStatus::Active,
            chapter: first_chapter.into(),
            completed_chapters: Vec::new(),
            tournament: TournamentProgress::default(),
            record: ChapterRecord::default(),
            finale_phase: false,
            won_finale: false,
            victory_points: 0,
            skill_tokens: 0,
            upgrades: BTreeSet::new(),
            health_bonus: 0,
            stamina_bonus: 0,
            token_bonus: 0,
            started_at: Utc::now(),
        }
    }

    /// Whether the campaign still has chapters to play.
    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active
    }

    /// Whether the wrestler reached the tournament finals.
    pub fn is_finals_phase(&self) -> bool {
        self.tournament.finals_phase
    }

    /// Whether the wrestler failed to qualify for the finals.
    pub fn is_failed_to_qualify(&self) -> bool {
        self.tournament.failed_to_qualify
    }

    /// Whether the wrestler won the tournament.
    pub fn is_tournament_winner(&self) -> bool {
        self.tournament.tournament_winner
    }

    /// Whether the wrestler was knocked out of the finals.
    pub fn is_eliminated(&self) -> bool {
        self.tournament.eliminated
    }

    /// Whether the upgrade has been purchased.
    pub fn owns_upgrade(&self, upgrade: &str) -> bool {
        self.upgrades.contains(upgrade)
    }

    /// Whether a chapter has already been finished.
    pub fn has_completed(&self, chapter: &str) -> bool {
        self.completed_chapters.iter().any(|c| c == chapter)
    }
}

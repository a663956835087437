//! Chapter definitions and the table that orders them.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use booker_core::{BookerError, BookerResult, Campaign};

use super::bracket::{MAX_ENTRANTS, MIN_BRACKET_SIZE};

/// How hard a chapter is; scales fan rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Reduced rewards.
    Easy,
    /// Baseline.
    #[default]
    Normal,
    /// Increased rewards.
    Hard,
    /// Double rewards.
    Legendary,
}

impl Difficulty {
    /// All difficulties, easiest first.
    pub fn all() -> &'static [Self] {
        &[Self::Easy, Self::Normal, Self::Hard, Self::Legendary]
    }

    /// Multiplier applied to fan rewards.
    pub const fn reward_multiplier(self) -> f64 {
        match self {
            Self::Easy => 0.8,
            Self::Normal => 1.0,
            Self::Hard => 1.5,
            Self::Legendary => 2.0,
        }
    }

    /// Parse a difficulty from a case-insensitive name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "normal" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            "legendary" => Some(Self::Legendary),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Normal => write!(f, "Normal"),
            Self::Hard => write!(f, "Hard"),
            Self::Legendary => write!(f, "Legendary"),
        }
    }
}

/// Qualifying and finals sizes for a tournament chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentRules {
    /// Qualifying matches scheduled.
    pub qualifying_matches: u32,
    /// Qualifying wins needed to reach the finals.
    pub qualifying_wins: u32,
    /// Finals matches scheduled.
    pub finals_matches: u32,
    /// Finals wins needed to take the tournament.
    pub finals_wins: u32,
    /// Entrants in the finals bracket, including the campaign wrestler.
    pub bracket_size: usize,
}

impl Default for TournamentRules {
    fn default() -> Self {
        Self {
            qualifying_matches: 4,
            qualifying_wins: 3,
            finals_matches: 2,
            finals_wins: 2,
            bracket_size: 4,
        }
    }
}

impl TournamentRules {
    fn validate(&self, chapter: &str) -> BookerResult<()> {
        if self.qualifying_wins == 0 || self.qualifying_wins > self.qualifying_matches {
            return Err(BookerError::InvalidConfig(format!(
                "chapter '{chapter}': qualifying needs 1..={} wins, got {}",
                self.qualifying_matches, self.qualifying_wins
            )));
        }
        if self.finals_wins == 0 || self.finals_wins > self.finals_matches {
            return Err(BookerError::InvalidConfig(format!(
                "chapter '{chapter}': finals need 1..={} wins, got {}",
                self.finals_matches, self.finals_wins
            )));
        }
        // Single elimination: one loss ends the finals.
        if self.finals_wins != self.finals_matches {
            return Err(BookerError::InvalidConfig(format!(
                "chapter '{chapter}': single-elimination finals need {} wins, got {}",
                self.finals_matches, self.finals_wins
            )));
        }
        if !(MIN_BRACKET_SIZE..=MAX_ENTRANTS).contains(&self.bracket_size)
            || !self.bracket_size.is_power_of_two()
        {
            return Err(BookerError::InvalidConfig(format!(
                "chapter '{chapter}': bracket size must be a power of two in \
                 {MIN_BRACKET_SIZE}..={MAX_ENTRANTS}, got {}",
                self.bracket_size
            )));
        }
        if self.bracket_size.trailing_zeros() != self.finals_matches {
            return Err(BookerError::InvalidConfig(format!(
                "chapter '{chapter}': a {}-entrant bracket has {} rounds, not {} finals matches",
                self.bracket_size,
                self.bracket_size.trailing_zeros(),
                self.finals_matches
            )));
        }
        Ok(())
    }
}

/// Conditions a campaign must meet to enter a chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryCriteria {
    /// Victory points required.
    pub min_victory_points: Option<i32>,
    /// Require winning (or not winning) the previous tournament.
    pub tournament_winner: Option<bool>,
    /// Require failing (or not failing) to qualify in the previous tournament.
    pub failed_to_qualify: Option<bool>,
    /// Chapters that must already be completed.
    pub completed: Vec<String>,
}

impl EntryCriteria {
    /// Whether `campaign` may enter.
    pub fn is_met(&self, campaign: &Campaign) -> bool {
        self.min_victory_points
            .is_none_or(|vp| campaign.victory_points >= vp)
            && self
                .tournament_winner
                .is_none_or(|w| campaign.tournament.tournament_winner == w)
            && self
                .failed_to_qualify
                .is_none_or(|f| campaign.tournament.failed_to_qualify == f)
            && self.completed.iter().all(|c| campaign.has_completed(c))
    }
}

/// One chapter of a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Stable identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Flavour text.
    #[serde(default)]
    pub description: String,
    /// Reward scaling.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Victory points per win.
    #[serde(default = "default_win_points")]
    pub win_points: i32,
    /// Victory points per loss (usually zero or negative).
    #[serde(default)]
    pub loss_points: i32,
    /// Skill tokens per win.
    #[serde(default = "default_win_tokens")]
    pub win_tokens: u32,
    /// Present on tournament chapters.
    #[serde(default)]
    pub tournament: Option<TournamentRules>,
    /// Matches to play before the chapter can end.
    #[serde(default)]
    pub min_matches: u32,
    /// Wins needed before the chapter can end.
    #[serde(default)]
    pub min_wins: u32,
    /// Victory points that trigger a narrative finale.
    #[serde(default)]
    pub finale_trigger_vp: Option<i32>,
    /// Who may enter.
    #[serde(default)]
    pub entry: EntryCriteria,
}

fn default_win_points() -> i32 {
    1
}

fn default_win_tokens() -> u32 {
    1
}

impl Chapter {
    /// Create a chapter with default rewards and no exit criteria.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            difficulty: Difficulty::Normal,
            win_points: default_win_points(),
            loss_points: 0,
            win_tokens: default_win_tokens(),
            tournament: None,
            min_matches: 0,
            min_wins: 0,
            finale_trigger_vp: None,
            entry: EntryCriteria::default(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set victory points per win and per loss.
    pub fn with_points(mut self, win: i32, loss: i32) -> Self {
        self.win_points = win;
        self.loss_points = loss;
        self
    }

    /// Set skill tokens per win.
    pub fn with_win_tokens(mut self, tokens: u32) -> Self {
        self.win_tokens = tokens;
        self
    }

    /// Make this a tournament chapter.
    pub fn with_tournament(mut self, rules: TournamentRules) -> Self {
        self.tournament = Some(rules);
        self
    }

    /// Set the exit criteria.
    pub fn with_exit(mut self, min_matches: u32, min_wins: u32) -> Self {
        self.min_matches = min_matches;
        self.min_wins = min_wins;
        self
    }

    /// End the chapter with a finale once victory points reach `vp`.
    pub fn with_finale_at(mut self, vp: i32) -> Self {
        self.finale_trigger_vp = Some(vp);
        self
    }

    /// Set the entry criteria.
    pub fn with_entry(mut self, entry: EntryCriteria) -> Self {
        self.entry = entry;
        self
    }

    /// Whether this chapter runs a tournament.
    pub fn is_tournament(&self) -> bool {
        self.tournament.is_some()
    }
}

/// Ordered set of chapters a campaign moves through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterTable {
    chapters: Vec<Chapter>,
}

impl ChapterTable {
    /// Build a table, rejecting empty tables, duplicate ids, and
    /// impossible tournament rules.
    pub fn new(chapters: Vec<Chapter>) -> BookerResult<Self> {
        if chapters.is_empty() {
            return Err(BookerError::InvalidConfig(
                "a chapter table needs at least one chapter".into(),
            ));
        }
        let mut seen = HashSet::new();
        for chapter in &chapters {
            if !seen.insert(chapter.id.as_str()) {
                return Err(BookerError::InvalidConfig(format!(
                    "duplicate chapter id '{}'",
                    chapter.id
                )));
            }
            if let Some(rules) = &chapter.tournament {
                rules.validate(&chapter.id)?;
            }
        }
        Ok(Self { chapters })
    }

    /// Parse and validate a table from JSON.
    pub fn from_json(json: &str) -> BookerResult<Self> {
        let parsed: TableFile = serde_json::from_str(json)
            .map_err(|e| BookerError::InvalidConfig(format!("chapter table: {e}")))?;
        Self::new(parsed.chapters)
    }

    /// The built-in four chapter career.
    pub fn standard() -> Self {
        Self {
            chapters: vec![
                Chapter::new("debut", "Debut")
                    .with_description("First steps in front of a live crowd.")
                    .with_difficulty(Difficulty::Easy)
                    .with_exit(3, 1),
                Chapter::new("proving_ground", "Proving Ground")
                    .with_description("Earn a spot on the card.")
                    .with_points(2, -1)
                    .with_finale_at(4),
                Chapter::new("tournament", "King of the Ring")
                    .with_description("Qualify, then survive the finals.")
                    .with_difficulty(Difficulty::Hard)
                    .with_points(3, 0)
                    .with_win_tokens(2)
                    .with_tournament(TournamentRules::default()),
                Chapter::new("title_pursuit", "Title Pursuit")
                    .with_description("Cash in the momentum for gold.")
                    .with_difficulty(Difficulty::Legendary)
                    .with_points(3, -1)
                    .with_win_tokens(2)
                    .with_exit(3, 2),
            ],
        }
    }

    /// Look up a chapter by id.
    pub fn get(&self, id: &str) -> BookerResult<&Chapter> {
        self.chapters
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| BookerError::not_found("chapter", id))
    }

    /// The opening chapter.
    pub fn first(&self) -> &Chapter {
        &self.chapters[0]
    }

    /// Position of a chapter in the table.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.chapters.iter().position(|c| c.id == id)
    }

    /// The first later chapter whose entry criteria `campaign` meets.
    pub fn next_for(&self, campaign: &Campaign) -> Option<&Chapter> {
        let current = self.position(&campaign.chapter)?;
        self.chapters[current + 1..]
            .iter()
            .find(|c| c.entry.is_met(campaign))
    }

    /// Chapters in table order.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Number of chapters.
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Always false for a validated table.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

#[derive(Deserialize)]
struct TableFile {
    chapters: Vec<Chapter>,
}

impl Default for ChapterTable {
    fn default() -> Self {
        Self::standard()
    }
}

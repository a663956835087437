//! Match composition and results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{TitleId, WrestlerId};
use crate::wrestler::Wrestler;

/// One side of a match: an ordered, non-empty list of wrestlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchTeam {
    /// Display label for the side.
    pub label: String,
    /// Members in booking order.
    pub members: Vec<Wrestler>,
}

impl MatchTeam {
    /// Create a team from a label and members.
    pub fn new(label: impl Into<String>, members: Vec<Wrestler>) -> Self {
        Self {
            label: label.into(),
            members,
        }
    }

    /// A one-person team labelled with the wrestler's name.
    pub fn solo(wrestler: Wrestler) -> Self {
        Self {
            label: wrestler.name.clone(),
            members: vec![wrestler],
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the team has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member identifiers in booking order.
    pub fn member_ids(&self) -> Vec<WrestlerId> {
        self.members.iter().map(|w| w.id).collect()
    }
}

/// The shape of a match, inferred from team sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// One on one.
    Singles,
    /// Two even teams of two or more.
    TagTeam,
    /// Uneven teams.
    Handicap,
    /// Three sides.
    TripleThreat,
    /// Four sides.
    FatalFourWay,
    /// Five or more sides.
    BattleRoyal,
}

impl MatchType {
    /// Infer the match type from the size of each side.
    pub fn infer(team_sizes: &[usize]) -> Self {
        match team_sizes.len() {
            0..=2 => {
                let largest = team_sizes.iter().copied().max().unwrap_or(1);
                let smallest = team_sizes.iter().copied().min().unwrap_or(1);
                if largest != smallest {
                    Self::Handicap
                } else if largest > 1 {
                    Self::TagTeam
                } else {
                    Self::Singles
                }
            }
            3 => Self::TripleThreat,
            4 => Self::FatalFourWay,
            _ => Self::BattleRoyal,
        }
    }

    /// Minutes added to the base match length.
    pub const fn duration_adjustment(self) -> i32 {
        match self {
            Self::Singles => 0,
            Self::TagTeam => 2,
            Self::Handicap => -1,
            Self::TripleThreat => 1,
            Self::FatalFourWay => 2,
            Self::BattleRoyal => 4,
        }
    }

    /// Parse a match type name such as `tag_team` or `triple-threat`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "singles" => Some(Self::Singles),
            "tag_team" | "tag" => Some(Self::TagTeam),
            "handicap" => Some(Self::Handicap),
            "triple_threat" => Some(Self::TripleThreat),
            "fatal_four_way" => Some(Self::FatalFourWay),
            "battle_royal" => Some(Self::BattleRoyal),
            _ => None,
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singles => write!(f, "Singles"),
            Self::TagTeam => write!(f, "Tag Team"),
            Self::Handicap => write!(f, "Handicap"),
            Self::TripleThreat => write!(f, "Triple Threat"),
            Self::FatalFourWay => write!(f, "Fatal Four-Way"),
            Self::BattleRoyal => write!(f, "Battle Royal"),
        }
    }
}

/// Who takes a bump when a stipulation match ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BumpRule {
    /// Nobody.
    #[default]
    None,
    /// Every member of the winning side.
    Winners,
    /// Every member of the losing sides.
    Losers,
    /// Every participant.
    All,
}

/// A special rule attached to a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stipulation {
    /// Display name.
    pub name: String,
    /// Whether disqualifications are waived.
    #[serde(default)]
    pub no_dq: bool,
    /// Who takes a bump at the end of the match.
    #[serde(default)]
    pub bump_rule: BumpRule,
}

impl Stipulation {
    /// A named stipulation with no special rules.
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            no_dq: false,
            bump_rule: BumpRule::None,
        }
    }

    /// Built-in stipulations.
    pub fn presets() -> Vec<Self> {
        vec![
            Self {
                name: "Steel Cage".into(),
                no_dq: false,
                bump_rule: BumpRule::Losers,
            },
            Self {
                name: "No DQ".into(),
                no_dq: true,
                bump_rule: BumpRule::All,
            },
            Self {
                name: "Hardcore".into(),
                no_dq: true,
                bump_rule: BumpRule::All,
            },
            Self {
                name: "Ladder".into(),
                no_dq: true,
                bump_rule: BumpRule::All,
            },
            Self {
                name: "Last Man Standing".into(),
                no_dq: true,
                bump_rule: BumpRule::Losers,
            },
            Self::custom("Submission"),
        ]
    }

    /// Look up a preset by name (case-insensitive), falling back to a
    /// custom stipulation with no special rules.
    pub fn named(name: &str) -> Self {
        Self::presets()
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
            .unwrap_or_else(|| Self::custom(name.trim()))
    }

    /// Label for an optional stipulation; none means a standard match.
    pub fn label(stipulation: Option<&Self>) -> &str {
        match stipulation {
            Some(s) if !s.name.trim().is_empty() => &s.name,
            _ => "Standard Match",
        }
    }
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    /// A clean finish (pinfall or submission).
    Pinfall,
    /// The losing side was disqualified.
    Disqualification,
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pinfall => write!(f, "Pinfall"),
            Self::Disqualification => write!(f, "Disqualification"),
        }
    }
}

/// Summary of one side in a finished match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    /// The team label.
    pub label: String,
    /// Member identifiers in booking order.
    pub members: Vec<WrestlerId>,
}

impl From<&MatchTeam> for TeamSummary {
    fn from(team: &MatchTeam) -> Self {
        Self {
            label: team.label.clone(),
            members: team.member_ids(),
        }
    }
}

/// The outcome of a resolved match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Every side, in booking order.
    pub teams: Vec<TeamSummary>,
    /// Index into `teams` of the winning side.
    pub winning_team: usize,
    /// The match type.
    pub match_type: MatchType,
    /// Match length in minutes.
    pub duration_minutes: u32,
    /// Quality rating between 1.0 and 5.0 in quarter steps.
    pub rating: f64,
    /// The stipulation, if any.
    pub stipulation: Option<Stipulation>,
    /// How the match ended.
    pub finish: Finish,
    /// The title on the line, if any.
    pub title: Option<TitleId>,
    /// Pre-match probability of the winning side winning.
    pub win_probability: f64,
}

impl MatchResult {
    /// The winning side.
    pub fn winner(&self) -> Option<&TeamSummary> {
        self.teams.get(self.winning_team)
    }

    /// Identifiers of the winning side.
    pub fn winners(&self) -> Vec<WrestlerId> {
        self.winner().map(|t| t.members.clone()).unwrap_or_default()
    }

    /// Identifiers of every losing side.
    pub fn losers(&self) -> Vec<WrestlerId> {
        self.teams
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.winning_team)
            .flat_map(|(_, t)| t.members.iter().copied())
            .collect()
    }

    /// Every participant.
    pub fn participants(&self) -> Vec<WrestlerId> {
        self.teams
            .iter()
            .flat_map(|t| t.members.iter().copied())
            .collect()
    }

    /// Whether the wrestler was on the winning side.
    pub fn is_winner(&self, id: WrestlerId) -> bool {
        self.winner().is_some_and(|t| t.members.contains(&id))
    }

    /// Whether a title was on the line.
    pub fn is_title_match(&self) -> bool {
        self.title.is_some()
    }

    /// Label for the stipulation, `Standard Match` when there is none.
    pub fn stipulation_label(&self) -> &str {
        Stipulation::label(self.stipulation.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> MatchResult {
        let a = Wrestler::new("A", 0);
        let b = Wrestler::new("B", 0);
        let c = Wrestler::new("C", 0);
        MatchResult {
            teams: vec![
                TeamSummary::from(&MatchTeam::solo(a)),
                TeamSummary::from(&MatchTeam::new("B & C", vec![b, c])),
            ],
            winning_team: 1,
            match_type: MatchType::Handicap,
            duration_minutes: 12,
            rating: 3.25,
            stipulation: None,
            finish: Finish::Pinfall,
            title: None,
            win_probability: 0.6,
        }
    }

    #[test]
    fn infer_match_types() {
        assert_eq!(MatchType::infer(&[1, 1]), MatchType::Singles);
        assert_eq!(MatchType::infer(&[2, 2]), MatchType::TagTeam);
        assert_eq!(MatchType::infer(&[1, 2]), MatchType::Handicap);
        assert_eq!(MatchType::infer(&[1, 1, 1]), MatchType::TripleThreat);
        assert_eq!(MatchType::infer(&[1, 1, 1, 1]), MatchType::FatalFourWay);
        assert_eq!(MatchType::infer(&[1; 8]), MatchType::BattleRoyal);
    }

    #[test]
    fn winners_and_losers() {
        let r = result();
        assert_eq!(r.winners().len(), 2);
        assert_eq!(r.losers().len(), 1);
        assert_eq!(r.participants().len(), 3);
        assert!(r.is_winner(r.teams[1].members[0]));
        assert!(!r.is_winner(r.teams[0].members[0]));
    }

    #[test]
    fn stipulation_lookup() {
        let cage = Stipulation::named("steel cage");
        assert_eq!(cage.bump_rule, BumpRule::Losers);
        assert!(!cage.no_dq);
        let odd = Stipulation::named("Pole Match");
        assert_eq!(odd.name, "Pole Match");
        assert_eq!(odd.bump_rule, BumpRule::None);
    }

    #[test]
    fn standard_match_label() {
        assert_eq!(result().stipulation_label(), "Standard Match");
        let blank = Stipulation::custom("  ");
        assert_eq!(Stipulation::label(Some(&blank)), "Standard Match");
    }

    #[test]
    fn parse_match_type() {
        assert_eq!(MatchType::parse("triple-threat"), Some(MatchType::TripleThreat));
        assert_eq!(MatchType::parse("tag"), Some(MatchType::TagTeam));
        assert_eq!(MatchType::parse("cage"), None);
    }

    #[test]
    fn serde_roundtrip() {
        let r = result();
        let json = serde_json::to_string(&r).unwrap();
        let back: MatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}

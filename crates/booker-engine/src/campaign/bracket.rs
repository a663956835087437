//! Single-elimination finals bracket.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use booker_core::{BookerError, BookerResult, MatchTeam, MatchType, Wrestler, WrestlerId};

use crate::resolver::MatchResolver;

/// Most entrants a bracket holds, campaign wrestler included.
pub const MAX_ENTRANTS: usize = 16;
/// Smallest bracket, padded with byes.
pub const MIN_BRACKET_SIZE: usize = 4;

/// One side of a bracket match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Waiting on an earlier match.
    #[default]
    Pending,
    /// Nobody; the other side advances.
    Bye,
    /// A wrestler.
    Wrestler(WrestlerId),
}

impl Slot {
    /// The wrestler in this slot, if any.
    pub fn wrestler(self) -> Option<WrestlerId> {
        match self {
            Self::Wrestler(id) => Some(id),
            Self::Pending | Self::Bye => None,
        }
    }

    /// Whether the slot has been filled.
    pub fn is_filled(self) -> bool {
        self != Self::Pending
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "TBD"),
            Self::Bye => write!(f, "BYE"),
            Self::Wrestler(id) => write!(f, "{id}"),
        }
    }
}

/// A match in the bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketMatch {
    /// `R{round}-M{n}`.
    pub id: String,
    /// Round number, starting at 1.
    pub round: u32,
    /// First side.
    pub first: Slot,
    /// Second side.
    pub second: Slot,
    /// Set once decided. A double bye is won by [`Slot::Bye`].
    pub winner: Option<Slot>,
    /// Where the winner goes; `None` for the final.
    pub next: Option<String>,
}

impl BracketMatch {
    fn new(round: u32, number: usize, next: Option<String>) -> Self {
        Self {
            id: match_id(round, number),
            round,
            first: Slot::Pending,
            second: Slot::Pending,
            winner: None,
            next,
        }
    }

    /// Whether `wrestler` is on either side.
    pub fn involves(&self, wrestler: WrestlerId) -> bool {
        self.first.wrestler() == Some(wrestler) || self.second.wrestler() == Some(wrestler)
    }

    /// Whether the winner has been decided.
    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// Whether both sides are known.
    pub fn is_ready(&self) -> bool {
        self.first.is_filled() && self.second.is_filled()
    }

    /// The other side from `wrestler`.
    pub fn opponent_of(&self, wrestler: WrestlerId) -> Option<Slot> {
        if self.first.wrestler() == Some(wrestler) {
            Some(self.second)
        } else if self.second.wrestler() == Some(wrestler) {
            Some(self.first)
        } else {
            None
        }
    }

    fn bye_winner(&self) -> Option<Slot> {
        match (self.first, self.second) {
            (Slot::Bye, Slot::Bye) => Some(Slot::Bye),
            (Slot::Bye, w @ Slot::Wrestler(_)) | (w @ Slot::Wrestler(_), Slot::Bye) => Some(w),
            _ => None,
        }
    }
}

fn match_id(round: u32, number: usize) -> String {
    format!("R{round}-M{number}")
}

/// Finals bracket around a campaign wrestler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentBracket {
    player: WrestlerId,
    total_rounds: u32,
    current_round: u32,
    matches: Vec<BracketMatch>,
}

impl TournamentBracket {
    /// Seed a bracket for `player` against up to 15 shuffled opponents.
    ///
    /// The size is the next power of two (at least 4); empty slots are
    /// byes, which advance immediately.
    pub fn new(
        player: WrestlerId,
        opponents: &[WrestlerId],
        rng: &mut StdRng,
    ) -> BookerResult<Self> {
        let mut entrants: Vec<WrestlerId> =
            opponents.iter().copied().filter(|id| *id != player).collect();
        if entrants.is_empty() {
            return Err(BookerError::InvalidConfig(
                "a bracket needs at least one opponent".into(),
            ));
        }
        entrants.shuffle(rng);
        entrants.truncate(MAX_ENTRANTS - 1);
        entrants.push(player);
        entrants.shuffle(rng);

        let size = entrants.len().next_power_of_two().max(MIN_BRACKET_SIZE);
        let total_rounds = size.trailing_zeros();
        let mut slots: Vec<Slot> = entrants.into_iter().map(Slot::Wrestler).collect();
        slots.resize(size, Slot::Bye);

        let mut matches = Vec::with_capacity(size - 1);
        let mut in_round = size / 2;
        for round in 1..=total_rounds {
            for i in 0..in_round {
                let next = (round < total_rounds).then(|| match_id(round + 1, i / 2 + 1));
                matches.push(BracketMatch::new(round, i + 1, next));
            }
            in_round /= 2;
        }
        for (m, pair) in matches.iter_mut().zip(slots.chunks(2)) {
            m.first = pair[0];
            m.second = pair[1];
        }

        let mut bracket = Self {
            player,
            total_rounds,
            current_round: 1,
            matches,
        };
        bracket.settle_byes();
        tracing::info!(player = %player, size, total_rounds, "tournament bracket seeded");
        Ok(bracket)
    }

    /// Play the current round.
    ///
    /// The campaign wrestler's match takes `player_won`; other matches are
    /// simulated with `resolver` using wrestlers from `roster`.
    pub fn advance(
        &mut self,
        player_won: bool,
        resolver: &MatchResolver,
        roster: &[Wrestler],
        rng: &mut StdRng,
    ) -> BookerResult<()> {
        if self.is_finished() {
            return Err(BookerError::InvalidStateTransition(
                "the tournament bracket is already finished".into(),
            ));
        }
        let round = self.current_round;
        let mut decisions = Vec::new();
        for (idx, m) in self.matches.iter().enumerate() {
            if m.round != round || m.is_decided() {
                continue;
            }
            let winner = if let Some(bye) = m.bye_winner() {
                bye
            } else if m.involves(self.player) {
                if player_won {
                    Slot::Wrestler(self.player)
                } else {
                    m.opponent_of(self.player).unwrap_or(Slot::Bye)
                }
            } else {
                simulate(m, resolver, roster, rng)?
            };
            tracing::debug!(id = %m.id, %winner, "bracket match decided");
            decisions.push((idx, winner));
        }
        for (idx, winner) in decisions {
            self.record(idx, winner);
        }
        self.current_round += 1;
        self.settle_byes();
        Ok(())
    }

    fn settle_byes(&mut self) {
        let round = self.current_round;
        let byes: Vec<(usize, Slot)> = self
            .matches
            .iter()
            .enumerate()
            .filter(|(_, m)| m.round == round && !m.is_decided() && m.is_ready())
            .filter_map(|(idx, m)| Some((idx, m.bye_winner()?)))
            .collect();
        for (idx, winner) in byes {
            self.record(idx, winner);
        }
    }

    fn record(&mut self, idx: usize, winner: Slot) {
        let Some(m) = self.matches.get_mut(idx) else {
            return;
        };
        m.winner = Some(winner);
        let Some(next) = m.next.clone() else {
            return;
        };
        if let Some(target) = self.matches.iter_mut().find(|m| m.id == next) {
            if !target.first.is_filled() {
                target.first = winner;
            } else if !target.second.is_filled() {
                target.second = winner;
            }
        }
    }

    /// Every match, round by round.
    pub fn matches(&self) -> &[BracketMatch] {
        &self.matches
    }

    /// Matches in one round.
    pub fn round(&self, round: u32) -> Vec<&BracketMatch> {
        self.matches.iter().filter(|m| m.round == round).collect()
    }

    /// Look up a match by id.
    pub fn get(&self, id: &str) -> Option<&BracketMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    /// Number of rounds.
    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    /// Round to be played next.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Whether every round has been played.
    pub fn is_finished(&self) -> bool {
        self.current_round > self.total_rounds
    }

    /// The campaign wrestler's next undecided match.
    pub fn current_player_match(&self) -> Option<&BracketMatch> {
        self.matches
            .iter()
            .find(|m| !m.is_decided() && m.involves(self.player))
    }

    /// Whether the campaign wrestler has not lost yet.
    pub fn player_alive(&self) -> bool {
        !self.matches.iter().any(|m| {
            m.involves(self.player)
                && m.winner.is_some_and(|w| w.wrestler() != Some(self.player))
        })
    }

    /// Winner of the final, once played.
    pub fn champion(&self) -> Option<WrestlerId> {
        self.matches
            .iter()
            .find(|m| m.round == self.total_rounds)
            .and_then(|m| m.winner)
            .and_then(Slot::wrestler)
    }

    /// Whether the campaign wrestler won the bracket.
    pub fn is_player_champion(&self) -> bool {
        self.champion() == Some(self.player)
    }
}

fn simulate(
    m: &BracketMatch,
    resolver: &MatchResolver,
    roster: &[Wrestler],
    rng: &mut StdRng,
) -> BookerResult<Slot> {
    let find = |slot: Slot| -> BookerResult<Wrestler> {
        let id = slot.wrestler().ok_or_else(|| {
            BookerError::InvalidStateTransition(format!("match {} is not ready", m.id))
        })?;
        roster
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| BookerError::not_found("wrestler", id))
    };
    let a = find(m.first)?;
    let b = find(m.second)?;
    let resolution = resolver.resolve(
        MatchTeam::solo(a),
        MatchTeam::solo(b),
        MatchType::Singles,
        None,
        rng,
    )?;
    Ok(if resolution.result.winning_team == 0 {
        m.first
    } else {
        m.second
    })
}

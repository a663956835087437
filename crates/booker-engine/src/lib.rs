//! Booking engines for Booker.
//!
//! Resolves matches from team power, tracks rivalry heat, runs the title
//! ledger, adjudicates ringside interference against referee awareness,
//! and drives campaigns through chapters and tournaments. [`Booker`] ties
//! the engines to a [`booker_core::Store`] as a command surface.

/// The `Booker` command surface over a store.
pub mod booking;
/// Campaign chapters, tournaments, brackets, and upgrades.
pub mod campaign;
/// Engine tunables.
pub mod config;
/// Rivalry heat ledger and booking gates.
pub mod heat;
/// Ringside interference and referee awareness.
pub mod interference;
/// Faction affinity and referee rating lookups.
pub mod lookup;
/// Optional match commentary.
pub mod narration;
/// Match resolution and rewards.
pub mod resolver;
/// Event sinks backed by `tracing`.
pub mod sink;
/// Title eligibility, challenges, and reigns.
pub mod title;

pub use booking::{Booker, MatchReport, MatchRequest};
pub use campaign::{
    CampaignStateMachine, CampaignUpdate, Chapter, ChapterTable, Difficulty, TournamentBracket,
    TournamentRules, TournamentTransition, Upgrade, UpgradeCatalog, UpgradeEffect,
};
pub use config::EngineConfig;
pub use heat::{ResolutionOutcome, RivalryStats};
pub use interference::ai::InterferenceAi;
pub use interference::{InterferenceEngine, InterferenceResult, InterferenceType};
pub use lookup::{AffinityLookup, AwarenessLookup, FactionAffinity, RefereeRatings};
pub use narration::{NarrationError, Narrator};
pub use resolver::{MatchBooking, MatchResolver, Resolution};
pub use sink::{FanOut, TracingSink};
pub use title::ChallengeReceipt;

//! Core types for Booker: wrestlers, matches, rivalries, titles, and campaigns.
//!
//! This crate holds the data model the booking engines operate on, the
//! domain events they emit, and the versioned [`Store`] contract used to
//! load and save aggregates. It contains no outcome logic of its own.

/// Campaign progression state.
pub mod campaign;
/// Error types used throughout the workspace.
pub mod error;
/// Domain events and event sinks.
pub mod event;
/// Identifier newtypes.
pub mod ids;
/// Teams, stipulations, and match results.
pub mod matches;
/// Rivalries and their heat ledger.
pub mod rivalry;
/// Show segments and referee-awareness state.
pub mod segment;
/// Persistence contract and in-memory store.
pub mod store;
/// Championships and reigns.
pub mod title;
/// Wrestlers, tiers, and alignment.
pub mod wrestler;

/// Re-export campaign types.
pub use campaign::{Campaign, CampaignStatus, ChapterRecord, TournamentProgress};
/// Re-export error types.
pub use error::{BookerError, BookerResult};
/// Re-export event types.
pub use event::{DomainEvent, EventBuffer, EventSink, NullSink};
/// Re-export identifier types.
pub use ids::{CampaignId, FactionId, NpcId, RivalryId, SegmentId, TitleId, WrestlerId};
/// Re-export match types.
pub use matches::{BumpRule, Finish, MatchResult, MatchTeam, MatchType, Stipulation, TeamSummary};
/// Re-export rivalry types.
pub use rivalry::{HeatEvent, Rivalry, RivalryIntensity};
/// Re-export segment types.
pub use segment::{InterferenceState, Segment};
/// Re-export store types.
pub use store::{Aggregate, ChangeSet, MemoryStore, Store, Versioned};
/// Re-export title types.
pub use title::{Title, TitleReign, TitleTier};
/// Re-export wrestler types.
pub use wrestler::{Alignment, Wrestler, WrestlerTier};

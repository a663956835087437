/// Alias for `Result<T, BookerError>`.
pub type BookerResult<T> = Result<T, BookerError>;

/// Errors returned by booking operations.
///
/// Every variant is a recoverable, typed outcome. Operations that fail
/// validation leave all aggregates untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookerError {
    /// A team was empty or a wrestler was booked on more than one side.
    #[error("invalid team composition: {0}")]
    InvalidTeamComposition(String),

    /// The requested aggregate does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The aggregate kind (wrestler, title, ...).
        kind: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The wrestler may not hold or challenge for the title.
    #[error("ineligible challenger: {0}")]
    IneligibleChallenger(String),

    /// The wrestler cannot afford a fan-denominated cost.
    #[error("insufficient fans: need {needed}, have {available}")]
    InsufficientFans {
        /// Fans required.
        needed: i64,
        /// Fans currently held.
        available: i64,
    },

    /// The campaign cannot afford a skill-token cost.
    #[error("insufficient skill tokens: need {needed}, have {available}")]
    InsufficientSkillTokens {
        /// Tokens required.
        needed: u32,
        /// Tokens currently held.
        available: u32,
    },

    /// The aggregate is not in a state that permits the operation.
    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// The campaign already owns the requested upgrade.
    #[error("upgrade already owned: {0}")]
    AlreadyOwnedUpgrade(String),

    /// The aggregate was saved by someone else since it was loaded.
    #[error("concurrent modification of {kind} {id}")]
    ConcurrentModification {
        /// The aggregate kind.
        kind: &'static str,
        /// The aggregate identifier.
        id: String,
    },

    /// An aggregate with the same identifier is already stored.
    #[error("{kind} already exists: {id}")]
    AlreadyExists {
        /// The aggregate kind.
        kind: &'static str,
        /// The aggregate identifier.
        id: String,
    },

    /// A die roll fell outside the die's faces.
    #[error("die roll out of range: {roll} (d{sides})")]
    InvalidRoll {
        /// The rejected roll.
        roll: u32,
        /// Faces on the die.
        sides: u32,
    },

    /// A configuration table could not be loaded or is inconsistent.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl BookerError {
    /// Shorthand for a [`BookerError::NotFound`] with a displayable id.
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

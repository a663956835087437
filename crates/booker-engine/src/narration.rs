//! Optional commentary for finished matches.

use std::collections::HashMap;

use booker_core::{MatchResult, WrestlerId};

/// Errors from a narration backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NarrationError {
    /// The backend could not be reached.
    #[error("narration backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with something unusable.
    #[error("narration backend returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Turns a prompt into commentary text.
pub trait Narrator {
    /// Generate text for `prompt`.
    fn generate_text(&self, prompt: &str) -> Result<String, NarrationError>;
}

/// Narrator that echoes a fixed line. Useful offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct CannedNarrator {
    line: Option<String>,
}

impl CannedNarrator {
    /// Always answer with `line`.
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: Some(line.into()),
        }
    }
}

impl Narrator for CannedNarrator {
    fn generate_text(&self, prompt: &str) -> Result<String, NarrationError> {
        Ok(self
            .line
            .clone()
            .unwrap_or_else(|| prompt.lines().next().unwrap_or_default().to_string()))
    }
}

/// Describe a result for a narration backend.
///
/// `names` maps wrestler ids to display names; unknown ids fall back to
/// their short id.
pub fn match_prompt(result: &MatchResult, names: &HashMap<WrestlerId, String>) -> String {
    let name = |id: &WrestlerId| names.get(id).cloned().unwrap_or_else(|| id.to_string());
    let sides: Vec<String> = result
        .teams
        .iter()
        .map(|t| t.members.iter().map(name).collect::<Vec<_>>().join(" & "))
        .collect();
    let winners: Vec<String> = result.winners().iter().map(name).collect();
    let mut prompt = format!(
        "{} ({}): {}\nWinner: {} by {} after {} minutes, rated {:.2} stars.",
        result.match_type,
        result.stipulation_label(),
        sides.join(" vs "),
        winners.join(" & "),
        result.finish,
        result.duration_minutes,
        result.rating,
    );
    if result.is_title_match() {
        prompt.push_str("\nA championship was on the line.");
    }
    prompt
}

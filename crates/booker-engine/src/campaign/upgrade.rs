//! Purchasable campaign upgrades.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use booker_core::{BookerError, BookerResult, Campaign};

/// What an upgrade does once bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum UpgradeEffect {
    /// Extra health.
    HealthBonus(u32),
    /// Extra stamina.
    StaminaBonus(u32),
    /// Extra skill tokens on every win.
    TokenBonus(u32),
}

impl UpgradeEffect {
    /// Apply the effect to a campaign's bonuses.
    pub fn apply(self, campaign: &mut Campaign) {
        match self {
            Self::HealthBonus(n) => campaign.health_bonus += n,
            Self::StaminaBonus(n) => campaign.stamina_bonus += n,
            Self::TokenBonus(n) => campaign.token_bonus += n,
        }
    }
}

impl fmt::Display for UpgradeEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HealthBonus(n) => write!(f, "+{n} health"),
            Self::StaminaBonus(n) => write!(f, "+{n} stamina"),
            Self::TokenBonus(n) => write!(f, "+{n} tokens per win"),
        }
    }
}

/// An upgrade available for skill tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrade {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Flavour text.
    #[serde(default)]
    pub description: String,
    /// Price in skill tokens.
    pub cost: u32,
    /// Effect once bought.
    pub effect: UpgradeEffect,
}

impl Upgrade {
    /// Create an upgrade.
    pub fn new(id: impl Into<String>, name: impl Into<String>, cost: u32, effect: UpgradeEffect) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            cost,
            effect,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Every upgrade a campaign can buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeCatalog {
    upgrades: Vec<Upgrade>,
}

#[derive(Deserialize)]
struct CatalogFile {
    upgrades: Vec<Upgrade>,
}

impl UpgradeCatalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(upgrades: Vec<Upgrade>) -> BookerResult<Self> {
        let mut seen = HashSet::new();
        if let Some(dup) = upgrades.iter().find(|u| !seen.insert(u.id.as_str())) {
            return Err(BookerError::InvalidConfig(format!(
                "duplicate upgrade id '{}'",
                dup.id
            )));
        }
        Ok(Self { upgrades })
    }

    /// Parse and validate a catalog from JSON.
    pub fn from_json(json: &str) -> BookerResult<Self> {
        let parsed: CatalogFile = serde_json::from_str(json)
            .map_err(|e| BookerError::InvalidConfig(format!("upgrade catalog: {e}")))?;
        Self::new(parsed.upgrades)
    }

    /// The built-in catalog.
    pub fn standard() -> Self {
        Self {
            upgrades: vec![
                Upgrade::new("iron_chin", "Iron Chin", 2, UpgradeEffect::HealthBonus(10))
                    .with_description("Shrug off the first big shot."),
                Upgrade::new("cardio", "Cardio", 2, UpgradeEffect::StaminaBonus(15))
                    .with_description("Go the distance in long matches."),
                Upgrade::new("crowd_work", "Crowd Work", 3, UpgradeEffect::TokenBonus(1))
                    .with_description("Every win teaches a little more."),
                Upgrade::new("veteran_savvy", "Veteran Savvy", 5, UpgradeEffect::HealthBonus(25))
                    .with_description("Knows how to take a bump safely."),
            ],
        }
    }

    /// Look up an upgrade by id.
    pub fn get(&self, id: &str) -> BookerResult<&Upgrade> {
        self.upgrades
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| BookerError::not_found("upgrade", id))
    }

    /// Upgrades `campaign` has not bought yet and can afford.
    pub fn affordable<'a>(&'a self, campaign: &'a Campaign) -> impl Iterator<Item = &'a Upgrade> {
        self.upgrades
            .iter()
            .filter(|u| !campaign.owns_upgrade(&u.id) && u.cost <= campaign.skill_tokens)
    }

    /// Every upgrade, in catalog order.
    pub fn upgrades(&self) -> &[Upgrade] {
        &self.upgrades
    }
}

impl Default for UpgradeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

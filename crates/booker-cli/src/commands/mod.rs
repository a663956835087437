pub mod campaign;
pub mod challenge;
pub mod heat;
pub mod interfere;
pub mod resolve;
pub mod rivalries;
pub mod roster;
pub mod tiers;

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use booker_core::{
    DomainEvent, FactionId, MemoryStore, NpcId, Rivalry, Store, Title, TitleId, TitleTier, Wrestler,
    WrestlerId,
};
use booker_engine::{Booker, EngineConfig, FactionAffinity, RefereeRatings, TracingSink, heat as engine_heat};

/// A roster file as written by hand.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RosterFile {
    #[serde(default)]
    pub factions: Vec<FactionEntry>,
    pub wrestlers: Vec<WrestlerEntry>,
    #[serde(default)]
    pub titles: Vec<TitleEntry>,
    #[serde(default)]
    pub rivalries: Vec<RivalryEntry>,
    #[serde(default)]
    pub referees: Vec<RefereeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionEntry {
    pub name: String,
    #[serde(default = "full_affinity")]
    pub affinity: u8,
}

fn full_affinity() -> u8 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrestlerEntry {
    pub name: String,
    pub fans: i64,
    #[serde(default)]
    pub alignment: i8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction: Option<String>,
    #[serde(default)]
    pub bumps: u32,
    #[serde(default)]
    pub injuries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleEntry {
    pub name: String,
    pub tier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub champion: Option<String>,
    #[serde(default = "active")]
    pub active: bool,
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RivalryEntry {
    pub a: String,
    pub b: String,
    #[serde(default)]
    pub heat: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefereeEntry {
    pub name: String,
    pub awareness: u8,
}

/// Name lookups and collaborator tables built from a roster file.
pub struct RosterIndex {
    wrestlers: HashMap<String, WrestlerId>,
    names: HashMap<WrestlerId, String>,
    titles: HashMap<String, TitleId>,
    referees: HashMap<String, NpcId>,
    factions: Vec<(FactionEntry, FactionId)>,
    referee_entries: Vec<RefereeEntry>,
    affinity: FactionAffinity,
    ratings: RefereeRatings,
}

impl RosterIndex {
    pub fn wrestler(&self, name: &str) -> Result<WrestlerId, String> {
        self.wrestlers
            .get(&key(name))
            .copied()
            .ok_or_else(|| format!("unknown wrestler '{name}'"))
    }

    pub fn title(&self, name: &str) -> Result<TitleId, String> {
        self.titles
            .get(&key(name))
            .copied()
            .ok_or_else(|| format!("unknown title '{name}'"))
    }

    pub fn referee(&self, name: &str) -> Result<NpcId, String> {
        self.referees
            .get(&key(name))
            .copied()
            .ok_or_else(|| format!("unknown referee '{name}'"))
    }

    pub fn name_of(&self, id: WrestlerId) -> String {
        self.names.get(&id).cloned().unwrap_or_else(|| id.to_string())
    }

    fn faction_name(&self, id: FactionId) -> Option<String> {
        self.factions
            .iter()
            .find(|(_, fid)| *fid == id)
            .map(|(entry, _)| entry.name.clone())
    }

    /// Build a booker over `store` wired to this roster's tables.
    pub fn booker(&self, store: MemoryStore, seed: u64) -> Booker<MemoryStore> {
        Booker::new(store, EngineConfig::default().with_seed(seed))
            .with_affinity(self.affinity.clone())
            .with_referees(self.ratings.clone())
            .with_sink(TracingSink)
    }

    /// Write the current state of `store` back as a roster file.
    pub fn save(&self, store: &MemoryStore, path: &Path) -> Result<(), String> {
        let wrestlers = store
            .all::<Wrestler>()
            .into_iter()
            .map(|w| WrestlerEntry {
                faction: w.faction.and_then(|f| self.faction_name(f)),
                name: w.name,
                fans: w.fans,
                alignment: w.alignment_score,
                bumps: w.bumps,
                injuries: w.injuries,
            })
            .collect();
        let titles = store
            .all::<Title>()
            .into_iter()
            .map(|t| TitleEntry {
                champion: t.champion().map(|c| self.name_of(c)),
                tier: tier_key(t.tier).to_string(),
                name: t.name,
                active: t.active,
            })
            .collect();
        let rivalries = store
            .all::<Rivalry>()
            .into_iter()
            .filter(Rivalry::is_active)
            .map(|r| RivalryEntry {
                a: self.name_of(r.wrestler_a),
                b: self.name_of(r.wrestler_b),
                heat: r.heat(),
            })
            .collect();
        let file = RosterFile {
            factions: self.factions.iter().map(|(e, _)| e.clone()).collect(),
            wrestlers,
            titles,
            rivalries,
            referees: self.referee_entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| format!("cannot serialize roster: {e}"))?;
        std::fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn tier_key(tier: TitleTier) -> &'static str {
    match tier {
        TitleTier::Extreme => "extreme",
        TitleTier::TagTeam => "tag_team",
        TitleTier::Intertemporal => "intertemporal",
        TitleTier::World => "world",
    }
}

/// Read a roster file into a fresh store.
pub fn load_roster(path: &Path) -> Result<(MemoryStore, RosterIndex), String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let file: RosterFile =
        serde_json::from_str(&text).map_err(|e| format!("invalid roster {}: {e}", path.display()))?;
    build(file)
}

fn build(file: RosterFile) -> Result<(MemoryStore, RosterIndex), String> {
    let mut store = MemoryStore::new();
    let factions: Vec<(FactionEntry, FactionId)> = file
        .factions
        .into_iter()
        .map(|f| (f, FactionId::new()))
        .collect();
    let faction_id = |name: &str| {
        factions
            .iter()
            .find(|(f, _)| key(&f.name) == key(name))
            .map(|(_, id)| *id)
            .ok_or_else(|| format!("unknown faction '{name}'"))
    };

    let mut wrestlers = HashMap::new();
    let mut names = HashMap::new();
    let mut roster = Vec::with_capacity(file.wrestlers.len());
    for entry in file.wrestlers {
        if wrestlers.contains_key(&key(&entry.name)) {
            return Err(format!("duplicate wrestler '{}'", entry.name));
        }
        let mut w = Wrestler::new(entry.name.clone(), entry.fans).with_alignment_score(entry.alignment);
        w.bumps = entry.bumps;
        w.injuries = entry.injuries;
        if let Some(faction) = &entry.faction {
            w = w.with_faction(faction_id(faction)?);
        }
        wrestlers.insert(key(&entry.name), w.id);
        names.insert(w.id, entry.name);
        roster.push(w);
    }
    let mut affinity = FactionAffinity::from_roster(&roster);
    for (entry, id) in &factions {
        affinity = affinity.with_faction_affinity(*id, entry.affinity);
    }
    for w in roster {
        store.insert(w).map_err(|e| e.to_string())?;
    }

    let lookup = |name: &str| {
        wrestlers
            .get(&key(name))
            .copied()
            .ok_or_else(|| format!("unknown wrestler '{name}'"))
    };

    let mut titles = HashMap::new();
    for entry in file.titles {
        let tier = TitleTier::parse(&entry.tier)
            .ok_or_else(|| format!("unknown title tier '{}'", entry.tier))?;
        let mut title = Title::new(entry.name.clone(), tier);
        title.active = entry.active;
        if let Some(champion) = &entry.champion {
            title.begin_reign(lookup(champion)?, Utc::now());
        }
        titles.insert(key(&entry.name), title.id);
        store.insert(title).map_err(|e| e.to_string())?;
    }

    for entry in file.rivalries {
        let mut rivalry = Rivalry::new(lookup(&entry.a)?, lookup(&entry.b)?);
        if entry.heat > 0 {
            let delta = i32::try_from(entry.heat).map_err(|e| e.to_string())?;
            engine_heat::add_heat(&mut rivalry, delta, "Carried over").map_err(|e| e.to_string())?;
        }
        store.insert(rivalry).map_err(|e| e.to_string())?;
    }

    let mut referees = HashMap::new();
    let mut ratings = RefereeRatings::new();
    for entry in &file.referees {
        let id = NpcId::new();
        referees.insert(key(&entry.name), id);
        ratings = ratings.with_rating(id, entry.awareness);
    }

    Ok((
        store,
        RosterIndex {
            wrestlers,
            names,
            titles,
            referees,
            factions,
            referee_entries: file.referees,
            affinity,
            ratings,
        },
    ))
}

/// Render an event with wrestler names instead of ids.
pub fn describe(index: &RosterIndex, event: &DomainEvent) -> String {
    match event {
        DomainEvent::FanAwarded {
            wrestler,
            amount,
            reason,
        } => format!("{} {amount:+} fans ({reason})", index.name_of(*wrestler)),
        DomainEvent::HeatChanged {
            wrestlers: [a, b],
            delta,
            reason,
            total,
            ..
        } => {
            let total = total.map(|t| format!(" -> {t}")).unwrap_or_default();
            format!(
                "{} vs {}: heat {delta:+}{total} ({reason})",
                index.name_of(*a),
                index.name_of(*b)
            )
        }
        DomainEvent::BumpAdded { wrestler } => format!("{} took a bump", index.name_of(*wrestler)),
        DomainEvent::WrestlerInjured { wrestler, reason } => {
            format!("{} is injured ({reason})", index.name_of(*wrestler))
        }
        DomainEvent::TitleChanged { from, to, .. } => {
            let name = |w: &Option<WrestlerId>| w.map_or_else(|| "vacant".to_string(), |w| index.name_of(w));
            format!("title changes hands: {} -> {}", name(from), name(to))
        }
        DomainEvent::InboxItemCreated { message, .. } => message.clone(),
    }
}

/// Parse a comma-separated list of wrestler names.
pub fn parse_side(index: &RosterIndex, side: &str) -> Result<Vec<WrestlerId>, String> {
    side.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| index.wrestler(name))
        .collect()
}

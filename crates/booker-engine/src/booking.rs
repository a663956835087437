//! The command surface: loads aggregates, runs an engine, commits the
//! changes together, then notifies.

use std::collections::HashMap;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use booker_core::{
    BookerError, BookerResult, Campaign, CampaignId, ChangeSet, DomainEvent, EventSink,
    MatchResult, MatchTeam, MatchType, NullSink, Rivalry, RivalryId, Segment, SegmentId,
    Stipulation, Store, Title, TitleId, Versioned, Wrestler, WrestlerId,
};

use crate::campaign::{CampaignStateMachine, CampaignUpdate, Upgrade};
use crate::config::EngineConfig;
use crate::heat::{self, ResolutionOutcome};
use crate::interference::ai::InterferenceAi;
use crate::interference::{InterferenceEngine, InterferenceResult, InterferenceType};
use crate::lookup::{AffinityLookup, AwarenessLookup, FactionAffinity, RefereeRatings};
use crate::narration::{self, Narrator};
use crate::resolver::{MatchBooking, MatchResolver};
use crate::title::{ChallengeReceipt, apply_match_result, challenge_for_title};

/// A match to book between stored wrestlers.
#[derive(Debug, Clone, Default)]
pub struct MatchRequest {
    /// Wrestler ids on each side.
    pub sides: Vec<Vec<WrestlerId>>,
    /// Explicit match type; inferred from side sizes when absent.
    pub match_type: Option<MatchType>,
    /// Special rules.
    pub stipulation: Option<Stipulation>,
    /// Title on the line.
    pub title: Option<TitleId>,
    /// Segment whose interference state applies.
    pub segment: Option<SegmentId>,
    /// Campaign to credit with the result.
    pub campaign: Option<CampaignId>,
}

impl MatchRequest {
    /// Book the given sides.
    pub fn new(sides: Vec<Vec<WrestlerId>>) -> Self {
        Self {
            sides,
            ..Self::default()
        }
    }

    /// One-on-one.
    pub fn singles(a: WrestlerId, b: WrestlerId) -> Self {
        Self::new(vec![vec![a], vec![b]])
    }

    /// Set the match type.
    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    /// Add a stipulation.
    pub fn with_stipulation(mut self, stipulation: Stipulation) -> Self {
        self.stipulation = Some(stipulation);
        self
    }

    /// Put a title on the line.
    pub fn with_title(mut self, title: TitleId) -> Self {
        self.title = Some(title);
        self
    }

    /// Run the match inside a segment.
    pub fn in_segment(mut self, segment: SegmentId) -> Self {
        self.segment = Some(segment);
        self
    }

    /// Credit a campaign with the result.
    pub fn for_campaign(mut self, campaign: CampaignId) -> Self {
        self.campaign = Some(campaign);
        self
    }
}

/// Everything a resolved match changed.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    /// The outcome.
    pub result: MatchResult,
    /// Pre-variance power of each side.
    pub team_power: Vec<f64>,
    /// Events dispatched after the commit.
    pub events: Vec<DomainEvent>,
    /// Campaign progress, when a campaign was credited.
    pub campaign: Option<CampaignUpdate>,
    /// Commentary, when a narrator is attached and answered.
    pub narration: Option<String>,
}

/// Runs booking commands against a store.
pub struct Booker<S: Store> {
    store: S,
    sink: Box<dyn EventSink>,
    affinity: Box<dyn AffinityLookup>,
    referees: Box<dyn AwarenessLookup>,
    narrator: Option<Box<dyn Narrator>>,
    config: EngineConfig,
    resolver: MatchResolver,
    ai: InterferenceAi,
    campaigns: CampaignStateMachine,
    rng: StdRng,
}

impl<S: Store> Booker<S> {
    /// Create a booker over `store`.
    ///
    /// Affinity starts from the factions of the wrestlers already stored;
    /// events go nowhere until a sink is attached.
    pub fn new(store: S, config: EngineConfig) -> Self {
        let affinity = FactionAffinity::from_roster(&store.all::<Wrestler>());
        Self {
            sink: Box::new(NullSink),
            affinity: Box::new(affinity),
            referees: Box::new(RefereeRatings::new()),
            narrator: None,
            resolver: MatchResolver::new(config.clone()),
            ai: InterferenceAi::new(&config),
            campaigns: CampaignStateMachine::default(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            store,
        }
    }

    /// Send events to `sink`.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Use a different affinity source.
    pub fn with_affinity(mut self, affinity: impl AffinityLookup + 'static) -> Self {
        self.affinity = Box::new(affinity);
        self
    }

    /// Use a different referee rating source.
    pub fn with_referees(mut self, referees: impl AwarenessLookup + 'static) -> Self {
        self.referees = Box::new(referees);
        self
    }

    /// Attach a narrator for match commentary.
    pub fn with_narrator(mut self, narrator: impl Narrator + 'static) -> Self {
        self.narrator = Some(Box::new(narrator));
        self
    }

    /// Use custom chapter and upgrade tables.
    pub fn with_campaigns(mut self, campaigns: CampaignStateMachine) -> Self {
        self.campaigns = campaigns;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Give back the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The campaign state machine.
    pub fn campaigns(&self) -> &CampaignStateMachine {
        &self.campaigns
    }

    /// The match resolver.
    pub fn resolver(&self) -> &MatchResolver {
        &self.resolver
    }

    /// The shared random source.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Resolve a match and apply fans, bumps, heat, title changes, and
    /// campaign progress in one commit.
    pub fn resolve_match(&mut self, request: &MatchRequest) -> BookerResult<MatchReport> {
        let mut wrestlers: Vec<Versioned<Wrestler>> = Vec::new();
        let mut teams = Vec::with_capacity(request.sides.len());
        for side in &request.sides {
            let mut members = Vec::with_capacity(side.len());
            for id in side {
                let record = self.store.load::<Wrestler>(*id)?;
                members.push(record.value.clone());
                wrestlers.push(record);
            }
            let label = members
                .iter()
                .map(|w| w.name.as_str())
                .collect::<Vec<_>>()
                .join(" & ");
            teams.push(MatchTeam::new(label, members));
        }

        let mut booking = MatchBooking::new(teams);
        booking.match_type = request.match_type;
        booking.stipulation = request.stipulation.clone();
        booking.title = request.title;

        let mut belt = request
            .title
            .map(|id| self.store.load::<Title>(id))
            .transpose()?;
        if let Some(segment_id) = request.segment {
            let segment = self.store.load::<Segment>(segment_id)?;
            if let Some(offender) = segment.value.interference.disqualified_side() {
                booking.disqualified = Some(offender);
            }
        }

        let side_of = |id: WrestlerId| request.sides.iter().position(|s| s.contains(&id));
        let mut rivalries: Vec<Versioned<Rivalry>> = Vec::new();
        for rivalry in self.store.all::<Rivalry>() {
            if !rivalry.is_active() {
                continue;
            }
            let opposed = match (side_of(rivalry.wrestler_a), side_of(rivalry.wrestler_b)) {
                (Some(a), Some(b)) => a != b,
                _ => false,
            };
            if opposed {
                booking.rivals.push([rivalry.wrestler_a, rivalry.wrestler_b]);
                rivalries.push(self.store.load::<Rivalry>(rivalry.id)?);
            }
        }

        let mut campaign = request
            .campaign
            .map(|id| self.store.load::<Campaign>(id))
            .transpose()?;
        if let Some(c) = &campaign {
            if side_of(c.value.wrestler).is_none() {
                return Err(BookerError::InvalidStateTransition(format!(
                    "campaign {} belongs to a wrestler who is not in this match",
                    c.value.id
                )));
            }
            booking.reward_multiplier = self.campaigns.reward_multiplier(&c.value);
        }

        let resolution = self.resolver.resolve_booking(&booking, &mut self.rng)?;
        let result = resolution.result;

        let mut events = Vec::with_capacity(resolution.events.len());
        for event in resolution.events {
            match event {
                DomainEvent::FanAwarded { wrestler, amount, .. } => {
                    if let Some(w) = wrestlers.iter_mut().find(|w| w.value.id == wrestler) {
                        w.value.add_fans(amount);
                    }
                    events.push(event);
                }
                DomainEvent::BumpAdded { wrestler } => {
                    if let Some(w) = wrestlers.iter_mut().find(|w| w.value.id == wrestler) {
                        w.value.add_bump();
                    }
                    events.push(event);
                }
                DomainEvent::HeatChanged {
                    wrestlers: [a, b],
                    delta,
                    ref reason,
                    ..
                } => match rivalries.iter_mut().find(|r| r.value.is_between(a, b)) {
                    Some(r) => events.push(heat::add_heat(&mut r.value, delta, reason)?),
                    None => events.push(event),
                },
                other => events.push(other),
            }
        }

        if let Some(t) = &mut belt {
            events.extend(apply_match_result(&mut t.value, &result, Utc::now())?);
        }
        let campaign_update = match &mut campaign {
            Some(c) => {
                let won = result.is_winner(c.value.wrestler);
                let update = self.campaigns.process_match_result(&mut c.value, won)?;
                events.extend(update.events.iter().cloned());
                Some(update)
            }
            None => None,
        };

        let mut changes = ChangeSet::new();
        for record in wrestlers {
            changes.wrestler(record);
        }
        for record in rivalries {
            changes.rivalry(record);
        }
        if let Some(record) = belt {
            changes.title(record);
        }
        if let Some(record) = campaign {
            changes.campaign(record);
        }
        self.store.commit(changes)?;
        self.dispatch(&events);

        let narration = self.narrate(&result);
        Ok(MatchReport {
            result,
            team_power: resolution.team_power,
            events,
            campaign: campaign_update,
            narration,
        })
    }

    /// Attempt an interference in a stored segment.
    ///
    /// A clean success shifts the beneficiary's alignment.
    pub fn attempt_interference(
        &mut self,
        segment: SegmentId,
        interferer: WrestlerId,
        beneficiary: WrestlerId,
        kind: InterferenceType,
    ) -> BookerResult<InterferenceResult> {
        let mut segment = self.store.load::<Segment>(segment)?;
        let mut helped = self.store.load::<Wrestler>(beneficiary)?;
        let engine = InterferenceEngine::new(&self.config, &*self.affinity, &*self.referees);
        let outcome = engine.attempt_interference(
            &mut segment.value,
            interferer,
            beneficiary,
            kind,
            &mut self.rng,
        )?;

        let mut changes = ChangeSet::new();
        if let Some(shift) = outcome.alignment_shift() {
            helped.value.shift_alignment(shift);
            changes.wrestler(helped);
        }
        changes.segment(segment);
        self.store.commit(changes)?;

        let notice = DomainEvent::InboxItemCreated {
            recipient: Some(beneficiary),
            message: outcome.message.clone(),
        };
        self.dispatch(std::slice::from_ref(&notice));
        Ok(outcome)
    }

    /// Give a ringside wrestler the chance to interfere on someone's behalf.
    ///
    /// Returns `None` when they pass.
    pub fn ringside_opportunity(
        &mut self,
        segment: SegmentId,
        npc: WrestlerId,
        beneficiary: WrestlerId,
    ) -> BookerResult<Option<InterferenceResult>> {
        let wrestler = self.store.load::<Wrestler>(npc)?.value;
        let current = self.store.load::<Segment>(segment)?.value;
        match self.ai.decide(&wrestler, &current, &mut self.rng) {
            Some(kind) => self
                .attempt_interference(segment, npc, beneficiary, kind)
                .map(Some),
            None => Ok(None),
        }
    }

    /// Add heat between two wrestlers, starting a rivalry if none is active.
    pub fn add_heat(
        &mut self,
        a: WrestlerId,
        b: WrestlerId,
        delta: i32,
        reason: &str,
    ) -> BookerResult<DomainEvent> {
        if a == b {
            return Err(BookerError::InvalidTeamComposition(format!(
                "{a} cannot feud with themselves"
            )));
        }
        self.store.load::<Wrestler>(a)?;
        self.store.load::<Wrestler>(b)?;

        let existing = self
            .store
            .all::<Rivalry>()
            .into_iter()
            .find(|r| r.is_active() && r.is_between(a, b));
        let mut changes = ChangeSet::new();
        let event = match existing {
            Some(r) => {
                let mut record = self.store.load::<Rivalry>(r.id)?;
                let event = heat::add_heat(&mut record.value, delta, reason)?;
                changes.rivalry(record);
                event
            }
            None => {
                let mut rivalry = Rivalry::new(a, b);
                let event = heat::add_heat(&mut rivalry, delta, reason)?;
                tracing::info!(rivalry = %rivalry.id, %a, %b, "rivalry started");
                changes.new_rivalry(rivalry);
                event
            }
        };
        self.store.commit(changes)?;
        self.dispatch(std::slice::from_ref(&event));
        Ok(event)
    }

    /// Roll to settle a rivalry. A successful roll ends it.
    pub fn resolve_rivalry(&mut self, rivalry: RivalryId) -> BookerResult<ResolutionOutcome> {
        let mut record = self.store.load::<Rivalry>(rivalry)?;
        let outcome = heat::roll_resolution(&mut record.value, &mut self.rng)?;
        if outcome != ResolutionOutcome::NotEligible {
            let mut changes = ChangeSet::new();
            changes.rivalry(record);
            self.store.commit(changes)?;
        }
        Ok(outcome)
    }

    /// Pay the challenge cost and join a title's challenger list.
    pub fn challenge_title(
        &mut self,
        wrestler: WrestlerId,
        title: TitleId,
    ) -> BookerResult<ChallengeReceipt> {
        let mut challenger = self.store.load::<Wrestler>(wrestler)?;
        let mut belt = self.store.load::<Title>(title)?;
        let receipt = challenge_for_title(&mut challenger.value, &mut belt.value)?;

        let mut changes = ChangeSet::new();
        changes.wrestler(challenger).title(belt);
        self.store.commit(changes)?;

        let event = DomainEvent::FanAwarded {
            wrestler,
            amount: -receipt.cost,
            reason: "Title challenge".into(),
        };
        self.dispatch(std::slice::from_ref(&event));
        Ok(receipt)
    }

    /// Start a campaign for a stored wrestler.
    pub fn start_campaign(&mut self, wrestler: WrestlerId) -> BookerResult<Campaign> {
        self.store.load::<Wrestler>(wrestler)?;
        let campaign = self.campaigns.start(wrestler);
        self.store.insert(campaign.clone())?;
        Ok(campaign)
    }

    /// Record a result the campaign wrestler earned outside [`Self::resolve_match`].
    pub fn process_match_result(
        &mut self,
        campaign: CampaignId,
        won: bool,
    ) -> BookerResult<CampaignUpdate> {
        let mut record = self.store.load::<Campaign>(campaign)?;
        let update = self.campaigns.process_match_result(&mut record.value, won)?;
        let mut changes = ChangeSet::new();
        changes.campaign(record);
        self.store.commit(changes)?;
        self.dispatch(&update.events);
        Ok(update)
    }

    /// Move a campaign to its next chapter. `None` means it is finished.
    pub fn advance_chapter(&mut self, campaign: CampaignId) -> BookerResult<Option<String>> {
        let mut record = self.store.load::<Campaign>(campaign)?;
        let next = self.campaigns.advance_chapter(&mut record.value)?;
        let wrestler = record.value.wrestler;
        let mut changes = ChangeSet::new();
        changes.campaign(record);
        self.store.commit(changes)?;

        let message = match &next {
            Some(chapter) => format!("A new chapter begins: {chapter}"),
            None => "Your campaign is complete".to_string(),
        };
        self.dispatch(&[DomainEvent::InboxItemCreated {
            recipient: Some(wrestler),
            message,
        }]);
        Ok(next)
    }

    /// Spend skill tokens on an upgrade.
    pub fn purchase_upgrade(
        &mut self,
        campaign: CampaignId,
        upgrade: &str,
    ) -> BookerResult<Upgrade> {
        let mut record = self.store.load::<Campaign>(campaign)?;
        let bought = self.campaigns.purchase_upgrade(&mut record.value, upgrade)?;
        let mut changes = ChangeSet::new();
        changes.campaign(record);
        self.store.commit(changes)?;
        Ok(bought)
    }

    fn dispatch(&mut self, events: &[DomainEvent]) {
        for event in events {
            self.sink.dispatch(event);
        }
    }

    fn narrate(&self, result: &MatchResult) -> Option<String> {
        let narrator = self.narrator.as_ref()?;
        let names: HashMap<WrestlerId, String> = result
            .teams
            .iter()
            .flat_map(|t| t.members.iter())
            .filter_map(|id| self.store.load::<Wrestler>(*id).ok())
            .map(|w| (w.value.id, w.value.name))
            .collect();
        let prompt = narration::match_prompt(result, &names);
        match narrator.generate_text(&prompt) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "match narration failed");
                None
            }
        }
    }
}

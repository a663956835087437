use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rand::Rng;

use booker_core::{Campaign, CampaignId, MemoryStore, Store, Wrestler, WrestlerId};
use booker_engine::{
    Booker, CampaignStateMachine, ChapterTable, MatchRequest, MatchResolver, TournamentBracket,
    UpgradeCatalog,
};

use super::RosterIndex;

struct ChapterSummary {
    title: String,
    difficulty: String,
    wins: u32,
    losses: u32,
    victory_points: i32,
    outcome: String,
}

pub fn run(
    path: &Path,
    wrestler: &str,
    seed: u64,
    max_matches: u32,
    chapters: Option<&Path>,
) -> Result<(), String> {
    let (store, index) = super::load_roster(path)?;
    let player = index.wrestler(wrestler)?;
    let mut booker = index.booker(store, seed);
    if let Some(file) = chapters {
        let json = std::fs::read_to_string(file)
            .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
        let table = ChapterTable::from_json(&json).map_err(|e| e.to_string())?;
        booker = booker.with_campaigns(CampaignStateMachine::new(table, UpgradeCatalog::standard()));
    }
    if booker.store().all::<Wrestler>().len() < 2 {
        return Err("a campaign needs at least one opponent on the roster".into());
    }

    let campaign = booker.start_campaign(player).map_err(|e| e.to_string())?;
    println!("{}", format!("Campaign: {}", index.name_of(player)).bold());
    println!();

    let mut summaries = Vec::new();
    loop {
        let state = load(&booker, campaign.id)?;
        let chapter = booker
            .campaigns()
            .current_chapter(&state)
            .map_err(|e| e.to_string())?
            .clone();
        println!(
            "{} {}",
            chapter.title.bold().underline(),
            format!("({})", chapter.difficulty).dimmed()
        );

        let vp_before = state.victory_points;
        let mut bracket: Option<TournamentBracket> = None;
        loop {
            let state = load(&booker, campaign.id)?;
            let complete = booker
                .campaigns()
                .is_chapter_complete(&state)
                .map_err(|e| e.to_string())?;
            if complete || state.record.played >= max_matches {
                break;
            }
            buy_upgrades(&mut booker, &state);

            let in_finals = booker
                .campaigns()
                .is_playing_finals(&state)
                .map_err(|e| e.to_string())?;
            if in_finals && bracket.is_none() {
                let size = chapter.tournament.as_ref().map_or(4, |r| r.bracket_size);
                let field = opponents(&booker, player, size.saturating_sub(1))?;
                if field.len() + 1 < size {
                    return Err(format!(
                        "the finals bracket needs {size} entrants, the roster has {}",
                        field.len() + 1
                    ));
                }
                bracket = Some(
                    TournamentBracket::new(player, &field, booker.rng())
                        .map_err(|e| e.to_string())?,
                );
                println!("  {}", "Finals bracket seeded".yellow());
            }

            let opponent = match bracket.as_ref().and_then(|b| b.current_player_match()) {
                Some(m) => m
                    .opponent_of(player)
                    .and_then(|s| s.wrestler())
                    .ok_or_else(|| "bracket match has no opponent".to_string())?,
                None => random_opponent(&mut booker, player)?,
            };

            let request = MatchRequest::singles(player, opponent).for_campaign(campaign.id);
            let report = booker.resolve_match(&request).map_err(|e| e.to_string())?;
            let won = report.result.is_winner(player);
            let result = if won {
                "W".green().bold().to_string()
            } else {
                "L".red().to_string()
            };
            print!("  {result} vs {}", index.name_of(opponent));
            if let Some(update) = &report.campaign {
                print!("  {:+} VP, +{} tokens", update.victory_points, update.skill_tokens);
                if let Some(t) = update.transition {
                    print!("  {}", t.to_string().yellow().bold());
                }
            }
            println!();

            if let Some(b) = bracket.as_mut() {
                if !b.is_finished() {
                    let resolver = MatchResolver::new(booker.config().clone());
                    let roster = booker.store().all::<Wrestler>();
                    b.advance(won, &resolver, &roster, booker.rng())
                        .map_err(|e| e.to_string())?;
                }
            }
        }

        let state = load(&booker, campaign.id)?;
        summaries.push(ChapterSummary {
            title: chapter.title.clone(),
            difficulty: chapter.difficulty.to_string(),
            wins: state.record.wins,
            losses: state.record.losses,
            victory_points: state.victory_points - vp_before,
            outcome: outcome(&state, bracket.as_ref(), &index),
        });
        println!();

        let complete = booker
            .campaigns()
            .is_chapter_complete(&state)
            .map_err(|e| e.to_string())?;
        if !complete {
            println!(
                "  {}",
                format!("Chapter not finished after {max_matches} matches").red()
            );
            break;
        }
        let next = booker
            .advance_chapter(campaign.id)
            .map_err(|e| e.to_string())?;
        if next.is_none() {
            break;
        }
    }

    print_summary(&summaries);
    let state = load(&booker, campaign.id)?;
    println!();
    println!(
        "  {}: {} VP, {} skill tokens, upgrades: {}",
        state.status.to_string().bold(),
        state.victory_points,
        state.skill_tokens,
        if state.upgrades.is_empty() {
            "none".to_string()
        } else {
            state.upgrades.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    );
    Ok(())
}

fn load(booker: &Booker<MemoryStore>, id: CampaignId) -> Result<Campaign, String> {
    booker
        .store()
        .load::<Campaign>(id)
        .map(|r| r.value)
        .map_err(|e| e.to_string())
}

fn buy_upgrades(booker: &mut Booker<MemoryStore>, state: &Campaign) {
    let wanted: Vec<String> = booker
        .campaigns()
        .upgrades()
        .affordable(state)
        .map(|u| u.id.clone())
        .collect();
    for id in wanted {
        match booker.purchase_upgrade(state.id, &id) {
            Ok(upgrade) => println!("  {} {}", "bought".cyan(), upgrade.name),
            Err(e) => tracing::debug!(upgrade = %id, error = %e, "upgrade skipped"),
        }
    }
}

fn random_opponent(booker: &mut Booker<MemoryStore>, player: WrestlerId) -> Result<WrestlerId, String> {
    let others = opponents(booker, player, usize::MAX)?;
    let pick = booker.rng().random_range(0..others.len());
    Ok(others[pick])
}

fn opponents(
    booker: &Booker<MemoryStore>,
    player: WrestlerId,
    limit: usize,
) -> Result<Vec<WrestlerId>, String> {
    let mut others: Vec<WrestlerId> = booker
        .store()
        .all::<Wrestler>()
        .into_iter()
        .map(|w| w.id)
        .filter(|id| *id != player)
        .collect();
    if others.is_empty() {
        return Err("no opponents available".into());
    }
    others.sort_by_key(|id| id.0);
    others.truncate(limit);
    Ok(others)
}

fn outcome(state: &Campaign, bracket: Option<&TournamentBracket>, index: &RosterIndex) -> String {
    let t = &state.tournament;
    if t.tournament_winner {
        "Tournament winner".to_string()
    } else if t.eliminated {
        let by = bracket
            .and_then(TournamentBracket::champion)
            .map(|c| format!(" ({} won)", index.name_of(c)))
            .unwrap_or_default();
        format!("Eliminated in the finals{by}")
    } else if t.failed_to_qualify {
        "Failed to qualify".to_string()
    } else if state.won_finale {
        "Won the finale".to_string()
    } else {
        "Complete".to_string()
    }
}

fn print_summary(summaries: &[ChapterSummary]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Chapter", "Difficulty", "Record", "VP", "Outcome"]);
    for s in summaries {
        table.add_row(vec![
            s.title.clone(),
            s.difficulty.clone(),
            format!("{}-{}", s.wins, s.losses),
            format!("{:+}", s.victory_points),
            s.outcome.clone(),
        ]);
    }
    println!("{table}");
}

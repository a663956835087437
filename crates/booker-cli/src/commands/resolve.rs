use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use booker_core::{MatchType, Stipulation};
use booker_engine::{MatchReport, MatchRequest};

use super::RosterIndex;

pub struct Options {
    pub sides: Vec<String>,
    pub stipulation: Option<String>,
    pub title: Option<String>,
    pub match_type: Option<String>,
    pub seed: u64,
    pub json: bool,
    pub save: bool,
}

pub fn run(path: &Path, opts: &Options) -> Result<(), String> {
    let (store, index) = super::load_roster(path)?;

    let sides = opts
        .sides
        .iter()
        .map(|s| super::parse_side(&index, s))
        .collect::<Result<Vec<_>, _>>()?;
    let mut request = MatchRequest::new(sides);
    if let Some(name) = &opts.match_type {
        let match_type =
            MatchType::parse(name).ok_or_else(|| format!("unknown match type '{name}'"))?;
        request = request.with_match_type(match_type);
    }
    if let Some(name) = &opts.stipulation {
        request = request.with_stipulation(Stipulation::named(name));
    }
    if let Some(name) = &opts.title {
        request = request.with_title(index.title(name)?);
    }

    let mut booker = index.booker(store, opts.seed);
    let report = booker.resolve_match(&request).map_err(|e| e.to_string())?;

    if opts.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("cannot serialize report: {e}"))?;
        println!("{json}");
    } else {
        print_report(&index, &report);
    }

    if opts.save {
        index.save(booker.store(), path)?;
    }
    Ok(())
}

pub fn print_report(index: &RosterIndex, report: &MatchReport) {
    let result = &report.result;
    let sides: Vec<String> = result.teams.iter().map(|t| t.label.clone()).collect();
    println!(
        "{} {}",
        format!("{} ({})", result.match_type, result.stipulation_label()).bold(),
        sides.join(" vs ").dimmed()
    );

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Side", "Power", "Result"]);
    for (i, team) in result.teams.iter().enumerate() {
        let power = report
            .team_power
            .get(i)
            .map_or_else(|| "-".to_string(), |p| format!("{p:.1}"));
        let outcome = if i == result.winning_team {
            "WIN".green().bold().to_string()
        } else {
            "loss".dimmed().to_string()
        };
        table.add_row(vec![team.label.clone(), power, outcome]);
    }
    println!("{table}");

    let winner = result.winner().map(|t| t.label.as_str()).unwrap_or("nobody");
    println!(
        "  {} wins by {} after {} minutes, {:.2} stars ({:.0}% favourite)",
        winner.bold(),
        result.finish,
        result.duration_minutes,
        result.rating,
        result.win_probability * 100.0
    );

    if !report.events.is_empty() {
        println!();
        for event in &report.events {
            println!("  {} {}", "-".dimmed(), super::describe(index, event));
        }
    }
    if let Some(text) = &report.narration {
        println!();
        println!("  {}", text.italic());
    }
}

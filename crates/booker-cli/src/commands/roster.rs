use std::path::Path;

use chrono::Utc;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use booker_core::{Store, Title, Wrestler};

pub fn run(path: &Path) -> Result<(), String> {
    let (store, index) = super::load_roster(path)?;

    let mut wrestlers = store.all::<Wrestler>();
    wrestlers.sort_by(|a, b| b.fans.cmp(&a.fans).then_with(|| a.name.cmp(&b.name)));

    if wrestlers.is_empty() {
        println!("  No wrestlers found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Fans", "Tier", "Alignment", "Bumps", "Injuries"]);
    for w in &wrestlers {
        table.add_row(vec![
            w.name.clone(),
            w.fans.to_string(),
            w.tier().to_string(),
            format!("{} ({:+})", w.alignment(), w.alignment_score),
            w.bumps.to_string(),
            w.injuries.to_string(),
        ]);
    }
    println!("{table}");
    println!();
    println!("  {} wrestlers", wrestlers.len());

    let mut titles = store.all::<Title>();
    if titles.is_empty() {
        return Ok(());
    }
    titles.sort_by_key(|t| std::cmp::Reverse(t.tier.prestige()));

    println!();
    println!("{}", "Titles".bold().underline());
    let now = Utc::now();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Title", "Tier", "Champion", "Days", "Challengers"]);
    for t in &titles {
        let champion = match t.champion() {
            Some(id) => index.name_of(id),
            None => "vacant".dimmed().to_string(),
        };
        let days = t
            .current_reign_days(now)
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        let name = if t.active {
            t.name.clone()
        } else {
            format!("{} (retired)", t.name)
        };
        table.add_row(vec![
            name,
            t.tier.to_string(),
            champion,
            days,
            t.challengers().len().to_string(),
        ]);
    }
    println!("{table}");

    Ok(())
}

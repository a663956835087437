use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use booker_core::{RivalryIntensity, TitleTier, WrestlerTier};

pub fn run() -> Result<(), String> {
    println!("{}", "Wrestler tiers".bold().underline());
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Tier", "Min fans", "Match bonus"]);
    for tier in WrestlerTier::all() {
        table.add_row(vec![
            tier.to_string(),
            tier.min_fans().to_string(),
            format!("+{}", tier.match_bonus()),
        ]);
    }
    println!("{table}");
    println!();

    println!("{}", "Titles".bold().underline());
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Title", "Required fans", "Challenge cost", "Prestige"]);
    for tier in TitleTier::all() {
        table.add_row(vec![
            tier.to_string(),
            tier.required_fans().to_string(),
            tier.challenge_cost().to_string(),
            tier.prestige().to_string(),
        ]);
    }
    println!("{table}");
    println!();

    println!("{}", "Rivalry intensity".bold().underline());
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Intensity", "Heat"]);
    for intensity in RivalryIntensity::all() {
        let range = match intensity.heat_range() {
            (low, Some(high)) => format!("{low}-{high}"),
            (low, None) => format!("{low}+"),
        };
        table.add_row(vec![intensity.to_string(), range]);
    }
    println!("{table}");

    Ok(())
}

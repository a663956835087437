use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use booker_core::{Rivalry, RivalryIntensity, Store};
use booker_engine::heat;

pub fn run(path: &Path, min: Option<u32>) -> Result<(), String> {
    let (store, index) = super::load_roster(path)?;
    let all = store.all::<Rivalry>();

    let shown: Vec<&Rivalry> = heat::hottest(&all, all.len())
        .into_iter()
        .filter(|r| min.is_none_or(|m| r.heat() >= m))
        .collect();

    if shown.is_empty() {
        println!("  No rivalries found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Rivalry", "Heat", "Intensity", "Booking"]);
    for r in &shown {
        let intensity = match r.intensity() {
            RivalryIntensity::Explosive => r.intensity().to_string().red().bold().to_string(),
            RivalryIntensity::Intense => r.intensity().to_string().yellow().to_string(),
            other => other.to_string(),
        };
        let booking = if r.requires_stipulation_match() {
            "stipulation match required"
        } else if r.requires_match() {
            "match required"
        } else {
            "-"
        };
        table.add_row(vec![
            format!("{} vs {}", index.name_of(r.wrestler_a), index.name_of(r.wrestler_b)),
            r.heat().to_string(),
            intensity,
            booking.to_string(),
        ]);
    }
    println!("{table}");

    let stats = heat::stats(&all);
    println!();
    println!(
        "  {} active, average heat {:.1}",
        stats.active, stats.average_heat
    );
    Ok(())
}

use std::path::Path;

use colored::Colorize;

use booker_core::{DomainEvent, RivalryIntensity};

pub fn run(
    path: &Path,
    a: &str,
    b: &str,
    delta: i32,
    reason: &str,
    save: bool,
) -> Result<(), String> {
    let (store, index) = super::load_roster(path)?;
    let first = index.wrestler(a)?;
    let second = index.wrestler(b)?;

    let mut booker = index.booker(store, 0);
    let event = booker
        .add_heat(first, second, delta, reason)
        .map_err(|e| e.to_string())?;

    println!("  {}", super::describe(&index, &event));
    if let DomainEvent::HeatChanged {
        total: Some(total), ..
    } = event
    {
        let intensity = RivalryIntensity::from_heat(total);
        println!("  Rivalry is now {}", intensity.to_string().bold());
    }

    if save {
        index.save(booker.store(), path)?;
    }
    Ok(())
}

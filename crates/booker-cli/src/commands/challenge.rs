use std::path::Path;

use colored::Colorize;

pub fn run(path: &Path, wrestler: &str, title: &str, save: bool) -> Result<(), String> {
    let (store, index) = super::load_roster(path)?;
    let challenger = index.wrestler(wrestler)?;
    let belt = index.title(title)?;

    let mut booker = index.booker(store, 0);
    let receipt = booker
        .challenge_title(challenger, belt)
        .map_err(|e| e.to_string())?;

    println!(
        "  {} challenges for the {}",
        index.name_of(receipt.challenger).bold(),
        title
    );
    println!(
        "  Paid {} fans, {} remaining",
        receipt.cost.to_string().yellow(),
        receipt.fans_remaining
    );

    if save {
        index.save(booker.store(), path)?;
    }
    Ok(())
}

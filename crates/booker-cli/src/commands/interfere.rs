use std::path::Path;

use colored::Colorize;

use booker_core::{Segment, Stipulation, Store};
use booker_engine::{InterferenceType, MatchRequest};

pub struct Options {
    pub interferer: String,
    pub beneficiary: String,
    pub opponent: String,
    pub kind: String,
    pub attempts: u32,
    pub referee: Option<String>,
    pub stipulation: Option<String>,
    pub seed: u64,
    pub save: bool,
}

pub fn run(path: &Path, opts: &Options) -> Result<(), String> {
    let (store, index) = super::load_roster(path)?;
    let interferer = index.wrestler(&opts.interferer)?;
    let beneficiary = index.wrestler(&opts.beneficiary)?;
    let opponent = index.wrestler(&opts.opponent)?;
    let kind = InterferenceType::parse(&opts.kind)
        .ok_or_else(|| format!("unknown interference type '{}'", opts.kind))?;

    let stipulation = opts.stipulation.as_deref().map(Stipulation::named);
    let mut segment = Segment::new(
        format!("{} vs {}", opts.beneficiary, opts.opponent),
        vec![beneficiary, opponent],
    );
    if let Some(name) = &opts.referee {
        segment = segment.with_referee(index.referee(name)?);
    }
    if let Some(s) = &stipulation {
        segment = segment.with_stipulation(s.clone());
    }
    let segment_id = segment.id;

    let mut booker = index.booker(store, opts.seed);
    booker
        .store_mut()
        .insert(segment)
        .map_err(|e| e.to_string())?;

    println!("{}", format!("Ringside: {}", opts.interferer).bold());
    for attempt in 1..=opts.attempts {
        let outcome = booker
            .attempt_interference(segment_id, interferer, beneficiary, kind)
            .map_err(|e| e.to_string())?;
        let verdict = if outcome.disqualified {
            "DQ".red().bold().to_string()
        } else if outcome.ejected {
            "ejected".yellow().to_string()
        } else if outcome.success {
            "success".green().to_string()
        } else {
            "failed".dimmed().to_string()
        };
        println!(
            "  #{attempt} {kind}: {verdict}, awareness {} -> {}",
            outcome.awareness_before, outcome.awareness_after
        );
        println!("     {}", outcome.message.dimmed());
        if outcome.ejected || outcome.disqualified {
            break;
        }
    }
    println!();

    let mut request = MatchRequest::singles(beneficiary, opponent).in_segment(segment_id);
    if let Some(s) = stipulation {
        request = request.with_stipulation(s);
    }
    let report = booker.resolve_match(&request).map_err(|e| e.to_string())?;
    super::resolve::print_report(&index, &report);

    if opts.save {
        index.save(booker.store(), path)?;
    }
    Ok(())
}

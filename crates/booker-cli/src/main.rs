//! CLI frontend for the Booker match and career engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(
    name = "booker",
    about = "Booker: book matches, stoke rivalries, and run wrestling careers",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the wrestler, title, and rivalry tier tables
    Tiers,

    /// List the wrestlers and titles in a roster
    Roster {
        /// Roster file
        #[arg(short, long, default_value = "roster.json")]
        roster: PathBuf,
    },

    /// Resolve a match between comma-separated sides
    Resolve {
        /// Sides, each a comma-separated list of names
        #[arg(required = true, num_args = 2..)]
        sides: Vec<String>,

        /// Stipulation name (e.g. "Steel Cage", "No DQ")
        #[arg(long)]
        stipulation: Option<String>,

        /// Title on the line
        #[arg(long)]
        title: Option<String>,

        /// Explicit match type (e.g. handicap, tag_team)
        #[arg(long = "type")]
        match_type: Option<String>,

        /// RNG seed for a deterministic result
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Print the match report as JSON
        #[arg(long)]
        json: bool,

        /// Write the updated roster back to the file
        #[arg(long)]
        save: bool,

        /// Roster file
        #[arg(short, long, default_value = "roster.json")]
        roster: PathBuf,
    },

    /// Interfere in a singles match, then resolve it
    Interfere {
        /// Who interferes
        interferer: String,

        /// Who the interference is meant to help
        beneficiary: String,

        /// The beneficiary's opponent
        opponent: String,

        /// Interference type (cheer, distraction, low_blow, weapon_slide, run_in)
        #[arg(short, long, default_value = "distraction")]
        kind: String,

        /// Number of attempts before the bell
        #[arg(short, long, default_value = "1")]
        attempts: u32,

        /// Officiating referee
        #[arg(long)]
        referee: Option<String>,

        /// Stipulation name
        #[arg(long)]
        stipulation: Option<String>,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Write the updated roster back to the file
        #[arg(long)]
        save: bool,

        /// Roster file
        #[arg(short, long, default_value = "roster.json")]
        roster: PathBuf,
    },

    /// List active rivalries, hottest first
    Rivalries {
        /// Only show rivalries at or above this heat
        #[arg(long)]
        min: Option<u32>,

        /// Roster file
        #[arg(short, long, default_value = "roster.json")]
        roster: PathBuf,
    },

    /// Add heat between two wrestlers
    Heat {
        /// First wrestler
        a: String,

        /// Second wrestler
        b: String,

        /// Heat to add (negative to cool off)
        #[arg(allow_hyphen_values = true)]
        delta: i32,

        /// Why the heat changed
        #[arg(long, default_value = "Promo")]
        reason: String,

        /// Write the updated roster back to the file
        #[arg(long)]
        save: bool,

        /// Roster file
        #[arg(short, long, default_value = "roster.json")]
        roster: PathBuf,
    },

    /// Pay the fan cost to challenge for a title
    Challenge {
        /// Challenger
        wrestler: String,

        /// Title name
        title: String,

        /// Write the updated roster back to the file
        #[arg(long)]
        save: bool,

        /// Roster file
        #[arg(short, long, default_value = "roster.json")]
        roster: PathBuf,
    },

    /// Simulate a full campaign for one wrestler
    Campaign {
        /// Campaign wrestler
        wrestler: String,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Maximum matches per chapter before giving up
        #[arg(long, default_value = "12")]
        max_matches: u32,

        /// Chapter table (JSON); the built-in career when omitted
        #[arg(long)]
        chapters: Option<PathBuf>,

        /// Roster file
        #[arg(short, long, default_value = "roster.json")]
        roster: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Tiers => commands::tiers::run(),
        Commands::Roster { roster } => commands::roster::run(&roster),
        Commands::Resolve {
            sides,
            stipulation,
            title,
            match_type,
            seed,
            json,
            save,
            roster,
        } => commands::resolve::run(
            &roster,
            &commands::resolve::Options {
                sides,
                stipulation,
                title,
                match_type,
                seed,
                json,
                save,
            },
        ),
        Commands::Interfere {
            interferer,
            beneficiary,
            opponent,
            kind,
            attempts,
            referee,
            stipulation,
            seed,
            save,
            roster,
        } => commands::interfere::run(
            &roster,
            &commands::interfere::Options {
                interferer,
                beneficiary,
                opponent,
                kind,
                attempts,
                referee,
                stipulation,
                seed,
                save,
            },
        ),
        Commands::Rivalries { min, roster } => commands::rivalries::run(&roster, min),
        Commands::Heat {
            a,
            b,
            delta,
            reason,
            save,
            roster,
        } => commands::heat::run(&roster, &a, &b, delta, &reason, save),
        Commands::Challenge {
            wrestler,
            title,
            save,
            roster,
        } => commands::challenge::run(&roster, &wrestler, &title, save),
        Commands::Campaign {
            wrestler,
            seed,
            max_matches,
            chapters,
            roster,
        } => commands::campaign::run(&roster, &wrestler, seed, max_matches, chapters.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

//! League CLI
//!
//! Schedules, tables, cup draws and history over a JSON backup file.

#[cfg(feature = "cli")]
use anyhow::{bail, Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use league_cli::{
    init_backup, load_config, make_rng, open_backup, parse_clubs, parse_pair, render_all_time,
    render_champions, render_cup_stats, render_draft, render_schedule, render_standings,
    save_backup, ClubNames, Service,
};
#[cfg(feature = "cli")]
use league_core::{export_all, generate_schedule, CupPhase, MatchResult, Matchday, Season};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "league_cli")]
#[command(about = "League tables, schedules and cup draws", long_about = None)]
struct Cli {
    /// League config (YAML or JSON). Defaults to LEAGUE_CONFIG_PATH, then the
    /// built-in 2025/26 German pyramid.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Preview a round-robin schedule for a list of clubs
    Schedule {
        /// Comma-separated club ids
        #[arg(long)]
        clubs: String,

        /// Add the mirrored second half
        #[arg(long)]
        double: bool,
    },

    /// Print a league table
    Standings {
        #[arg(long)]
        backup: PathBuf,

        /// Competition id, e.g. comp_1bl
        #[arg(long)]
        competition: String,

        /// Season name; the current season when omitted
        #[arg(long)]
        season: Option<String>,
    },

    /// Draw the next cup round of the current season
    Draw {
        #[arg(long)]
        backup: PathBuf,

        /// Cup competition id; the first configured cup when omitted
        #[arg(long)]
        competition: Option<String>,

        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,

        /// Store the drawn round in the backup
        #[arg(long)]
        write: bool,
    },

    /// Record a result and save the backup
    Score {
        #[arg(long)]
        backup: PathBuf,

        #[arg(long = "match")]
        match_id: String,

        /// Final score as HOME:AWAY
        #[arg(long)]
        result: String,

        /// Shootout as HOME:AWAY (knockout matches only)
        #[arg(long)]
        penalties: Option<String>,
    },

    /// Honours list, all-time table and cup records
    History {
        #[arg(long)]
        backup: PathBuf,
    },

    /// Create a new backup with one season built from the config's rosters
    Init {
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value = "2025/26")]
        season: String,
    },

    /// Pretty-print a backup after validating it
    Export {
        #[arg(long)]
        backup: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Schedule { clubs, double } => {
            let schedule = generate_schedule("preview", &parse_clubs(&clubs), double)?;
            let days: Vec<(Matchday, Vec<MatchResult>)> = schedule
                .matchdays
                .iter()
                .map(|md| (md.clone(), schedule.matches_on(&md.id).cloned().collect()))
                .collect();
            print!("{}", render_schedule(&days, &ClubNames::empty()));
        }

        Commands::Standings { backup, competition, season } => {
            let service = open_backup(&backup, config)?;
            let season = pick_season(&service, season.as_deref())?;
            let rows = service.standings(&season.id, &competition)?;
            let names = ClubNames::from_store(service.store());

            println!("{} - {}", competition, season.name);
            let zone = |pos, total| service.zone(&competition, pos, total);
            print!("{}", render_standings(&rows, &names, zone));
        }

        Commands::Draw { backup, competition, seed, write } => {
            let mut service = open_backup(&backup, config)?;
            let season = pick_season(&service, None)?;
            let cup = match competition {
                Some(id) => id,
                None => service
                    .config()
                    .cups()
                    .first()
                    .map(|c| c.id.clone())
                    .context("no cup configured")?,
            };

            let mut rng = make_rng(seed);
            let draft = match service.cup_bracket(&season.id, &cup)?.phase() {
                CupPhase::NoRounds => service.start_cup(&season.id, &cup, &mut rng)?,
                CupPhase::RoundInProgress(_) => service.advance_cup(&season.id, &cup, &mut rng)?,
                CupPhase::FinalDecided(champion) => {
                    bail!("cup already decided, winner: {}", champion)
                }
            };
            print!("{}", render_draft(&draft, &ClubNames::from_store(service.store())));

            if write {
                save_backup(&backup, &service)?;
                println!("Saved to {}", backup.display());
            }
        }

        Commands::Score { backup, match_id, result, penalties } => {
            let mut service = open_backup(&backup, config)?;
            let (home, away) = parse_pair(&result)?;
            let mut m = service.record_score(&match_id, home, away)?;
            if let Some(pens) = penalties {
                let (home_pen, away_pen) = parse_pair(&pens)?;
                m = service.record_penalties(&match_id, home_pen, away_pen)?;
            }
            save_backup(&backup, &service)?;
            let score = m.score().map(|(h, a)| format!("{h}:{a}")).unwrap_or_default();
            println!("{} {} {}", m.home_club_id, score, m.away_club_id);
        }

        Commands::History { backup } => {
            let service = open_backup(&backup, config)?;
            let names = ClubNames::from_store(service.store());

            println!("Meister und Pokalsieger");
            print!("{}", render_champions(&service.champions_list(), &names));

            if let Some(top) = service.config().top_league() {
                println!("\nEwige Tabelle {}", top.name);
                print!("{}", render_all_time(&service.all_time_table(&top.id), &names));
            }
            for cup in service.config().cups() {
                println!("\n{}", cup.name);
                print!("{}", render_cup_stats(&service.cup_statistics(&cup.id), &names));
            }
        }

        Commands::Init { out, season } => {
            if out.exists() {
                bail!("{} already exists", out.display());
            }
            let service = init_backup(config, &season)?;
            save_backup(&out, &service)?;
            println!("Created {} with season {}", out.display(), season);
        }

        Commands::Export { backup } => {
            let service = open_backup(&backup, config)?;
            println!("{}", serde_json::to_string_pretty(&export_all(service.store()))?);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn pick_season(service: &Service, name: Option<&str>) -> Result<Season> {
    match name {
        Some(name) => service
            .season_by_name(name)
            .with_context(|| format!("no season named {name}")),
        None => service.current_season().context("backup has no current season"),
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("league_cli is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}

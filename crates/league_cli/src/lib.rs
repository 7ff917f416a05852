//! League CLI Library
//!
//! Backup file plumbing and plain-text rendering for the `league_cli` binary.

use anyhow::{bail, Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::env;
use std::fmt::Write as _;
use std::path::Path;

use league_core::config::CONFIG_PATH_ENV;
use league_core::{
    export_all, import_all, read_backup, write_backup, AllTimeRow, ChampionEntry, ClubId,
    CupRoundDraft, CupStatRow, LeagueConfig, LeagueService, LeagueStore, MatchResult, Matchday,
    MemoryStore, NewSeason, StandingRow, TableZone,
};

pub type Service = LeagueService<MemoryStore>;

/// `"A, B,C"` → `[A, B, C]`. Empty items are dropped.
pub fn parse_clubs(list: &str) -> Vec<ClubId> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(ClubId::from).collect()
}

/// `"4:3"` → `(4, 3)`.
pub fn parse_pair(text: &str) -> Result<(u32, u32)> {
    let (home, away) = text
        .split_once(':')
        .with_context(|| format!("expected HOME:AWAY, got {text:?}"))?;
    Ok((
        home.trim().parse().with_context(|| format!("bad home count in {text:?}"))?,
        away.trim().parse().with_context(|| format!("bad away count in {text:?}"))?,
    ))
}

pub fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// `--config`, then `LEAGUE_CONFIG_PATH`, then the quick-start pyramid.
pub fn load_config(path: Option<&Path>) -> Result<LeagueConfig> {
    let from_env = env::var_os(CONFIG_PATH_ENV).is_some_and(|v| !v.is_empty());
    let config = match path {
        Some(path) => LeagueConfig::load(path),
        None if from_env => LeagueConfig::from_env(),
        None => LeagueConfig::quick_start(),
    };
    config.context("failed to load league config")
}

/// Open a backup file as a service over an in-memory store.
pub fn open_backup(path: &Path, config: LeagueConfig) -> Result<Service> {
    let data = read_backup(path)
        .with_context(|| format!("failed to read backup {}", path.display()))?;
    let mut store = MemoryStore::new();
    import_all(&mut store, data)
        .with_context(|| format!("failed to import backup {}", path.display()))?;
    Ok(LeagueService::new(store, config))
}

pub fn save_backup(path: &Path, service: &Service) -> Result<()> {
    let data = export_all(service.store());
    write_backup(path, &data)
        .with_context(|| format!("failed to write backup {}", path.display()))?;
    log::info!("Saved backup to {}", path.display());
    Ok(())
}

/// Fresh store with one season built from the config's rosters.
pub fn init_backup(config: LeagueConfig, season_name: &str) -> Result<Service> {
    if config.rosters.is_empty() {
        bail!("config has no rosters; add a `rosters` map of competition id to club ids");
    }
    let mut service = LeagueService::new(MemoryStore::new(), config);
    service.create_season(NewSeason::new(season_name))?;
    Ok(service)
}

/// Club id → short name, falling back to the id for unknown clubs.
pub struct ClubNames(HashMap<ClubId, String>);

impl ClubNames {
    pub fn from_store<S: LeagueStore>(store: &S) -> Self {
        Self(store.clubs().into_iter().map(|c| (c.id, c.short_name)).collect())
    }

    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn get<'a>(&'a self, id: &'a ClubId) -> &'a str {
        self.0.get(id).map(String::as_str).unwrap_or(id.as_str())
    }
}

fn score_text(m: &MatchResult) -> String {
    match (m.score(), m.penalties()) {
        (Some((h, a)), Some((hp, ap))) => format!("{h}:{a} ({hp}:{ap} i.E.)"),
        (Some((h, a)), None) => format!("{h}:{a}"),
        (None, _) => "-:-".to_string(),
    }
}

fn fixture_line(out: &mut String, m: &MatchResult, names: &ClubNames) {
    let _ = writeln!(
        out,
        "  {:<20} {:<20} {:>14}   [{}]",
        names.get(&m.home_club_id),
        names.get(&m.away_club_id),
        score_text(m),
        m.id
    );
}

pub fn render_schedule(schedule: &[(Matchday, Vec<MatchResult>)], names: &ClubNames) -> String {
    let mut out = String::new();
    for (matchday, fixtures) in schedule {
        let _ = writeln!(out, "{}", matchday.name);
        for m in fixtures {
            fixture_line(&mut out, m, names);
        }
    }
    out
}

pub fn render_standings(
    rows: &[StandingRow],
    names: &ClubNames,
    zone: impl Fn(usize, usize) -> Option<TableZone>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>7} {:>4} {:>4}",
        "#", "Club", "Sp", "S", "U", "N", "Tore", "Diff", "Pkt"
    );
    let mut legend: Vec<TableZone> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let position = i + 1;
        let marker = match zone(position, rows.len()) {
            Some(z) => {
                if !legend.contains(&z) {
                    legend.push(z);
                }
                z.marker()
            }
            None => ' ',
        };
        let _ = writeln!(
            out,
            "{} {:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>7} {:>+4} {:>4}",
            marker,
            position,
            names.get(&row.club_id),
            row.played,
            row.wins,
            row.draws,
            row.losses,
            format!("{}:{}", row.goals_for, row.goals_against),
            row.goal_diff,
            row.points
        );
    }

    for z in legend {
        let _ = writeln!(out, "  {} {}", z.marker(), z.label());
    }
    out
}

pub fn render_draft(draft: &CupRoundDraft, names: &ClubNames) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} Spiele)", draft.round.name, draft.matches.len());
    for m in &draft.matches {
        fixture_line(&mut out, m, names);
    }
    out
}

pub fn render_champions(list: &[ChampionEntry], names: &ClubNames) -> String {
    let mut out = String::new();
    for entry in list {
        let _ = writeln!(
            out,
            "  {:<20} Meister {:>2}  Pokal {:>2}  {}",
            names.get(&entry.club_id),
            entry.championships,
            entry.cup_wins,
            entry.championship_seasons.join(", ")
        );
    }
    out
}

pub fn render_all_time(rows: &[AllTimeRow], names: &ClubNames) -> String {
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>3}  {:<20} {:>2} Saisons {:>4} Sp {:>+5} {:>5} Pkt",
            i + 1,
            names.get(&row.club_id),
            row.seasons,
            row.played,
            row.goal_diff,
            row.points
        );
    }
    out
}

pub fn render_cup_stats(rows: &[CupStatRow], names: &ClubNames) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<20} Siege {:>3}  Titel {:>2}  Finals {:>2}  Teilnahmen {:>2}  beste Runde: {}",
            names.get(&row.club_id),
            row.wins,
            row.cup_wins,
            row.finals,
            row.participations,
            row.best_round
        );
    }
    out
}

//! # league_core - League and Cup Competition Engine
//!
//! Standings, round-robin schedules, knockout cups and multi-season history
//! for a football league pyramid.
//!
//! ## Features
//! - Deterministic tables (points, goal difference, goals, club id)
//! - Circle-method schedules with byes and mirrored second halves
//! - Seeded cup draws with optional two-pot seeding
//! - All-time table, honours list and cup records
//! - JSON backup and a string-in/string-out JSON API

pub mod api;
pub mod backup;
pub mod config;
pub mod cup;
pub mod error;
pub mod history;
pub mod models;
pub mod relegation;
pub mod schedule;
pub mod service;
pub mod standings;
pub mod store;

pub use api::{cup_draw_json, schedule_json, standings_json};
pub use error::{LeagueError, Result};

pub use models::{
    new_id, now_millis, Club, ClubId, Competition, CompetitionKind, CupRound, MatchResult,
    Matchday, Pairing, PointsConfig, Season, SeasonCompetition,
};

// Engine
pub use cup::{
    advance_round, create_round, create_round_from_pairings, decide_match, is_round_decided,
    is_round_played, CupBracket, CupPhase, CupRoundDraft, PotRule, Pots, RoundNames, RoundStage,
    SeedingPlan,
};
pub use schedule::{generate_schedule, matchday_name, GeneratedSchedule};
pub use standings::{compute_standings, table_order, StandingRow, TableRow};

// Aggregation
pub use history::{
    compute_all_time, compute_champions_list, compute_cup_statistics, AllTimeRow, ChampionEntry,
    CupSeasonRecord, CupStatRow, SeasonHonours,
};
pub use relegation::{
    compute_promotion_proposal, zone_for, PromotionProposal, PromotionRule, TableZone, ZoneRule,
};

// Persistence and configuration
pub use backup::{export_all, import_all, read_backup, write_backup, BackupData, BackupError};
pub use config::{CupConfig, LeagueConfig};
pub use service::{LeagueService, NewSeason, RosterSource, SeasonSummary};
pub use store::{LeagueStore, MemoryStore};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;

pub mod club;
pub mod fixture;
pub mod season;

pub use club::{Club, ClubId};
pub use fixture::{CupRound, MatchResult, Matchday, Pairing};
pub use season::{Competition, CompetitionKind, PointsConfig, Season, SeasonCompetition};

/// Allocate a fresh record id such as `m_6f1c...`.
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4())
}

/// Current time in unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

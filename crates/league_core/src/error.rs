use thiserror::Error;

use crate::models::ClubId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeagueError {
    #[error("Invalid roster: a competition needs at least one club")]
    InvalidRoster,

    #[error("Invalid participants: cannot pair {count} club(s) into matches")]
    InvalidParticipants { count: usize },

    #[error("Round {round} is not complete: {undecided} match(es) undecided")]
    RoundNotComplete { round: u32, undecided: usize },

    #[error("No cup round has been drawn yet")]
    NoCurrentRound,

    #[error("Cup has already been drawn: {rounds} round(s) exist")]
    CupAlreadyStarted { rounds: usize },

    #[error("Cup already finished, winner: {champion}")]
    CupFinished { champion: ClubId },

    #[error("Unknown participant: {0}")]
    UnknownParticipant(ClubId),

    #[error("Participant appears more than once: {0}")]
    DuplicateParticipant(ClubId),

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LeagueError {
    /// Stable code used by the JSON API error strings.
    pub fn code(&self) -> &'static str {
        match self {
            LeagueError::InvalidRoster => "E_INVALID_ROSTER",
            LeagueError::InvalidParticipants { .. } => "E_INVALID_PARTICIPANTS",
            LeagueError::RoundNotComplete { .. } => "E_ROUND_NOT_COMPLETE",
            LeagueError::NoCurrentRound => "E_NO_CURRENT_ROUND",
            LeagueError::CupAlreadyStarted { .. } => "E_CUP_ALREADY_STARTED",
            LeagueError::CupFinished { .. } => "E_CUP_FINISHED",
            LeagueError::UnknownParticipant(_) => "E_UNKNOWN_PARTICIPANT",
            LeagueError::DuplicateParticipant(_) => "E_DUPLICATE_PARTICIPANT",
            LeagueError::MatchNotFound(_) => "E_MATCH_NOT_FOUND",
            LeagueError::NotFound(_) => "E_NOT_FOUND",
            LeagueError::InvalidScore(_) => "E_INVALID_SCORE",
            LeagueError::Config(_) => "E_CONFIG",
        }
    }
}

pub type Result<T> = std::result::Result<T, LeagueError>;

//! String-in/string-out entry points for embedding hosts.
//!
//! Requests and responses carry `schema_version`. Errors come back as
//! `"CODE: message"`.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::cup::{create_round, Pots, RoundNames};
use crate::error::LeagueError;
use crate::models::{ClubId, CupRound, MatchResult, Matchday, PointsConfig};
use crate::schedule::generate_schedule;
use crate::standings::{compute_standings, StandingRow};
use crate::SCHEMA_VERSION;

const E_INVALID_JSON: &str = "E_INVALID_JSON";
const E_SCHEMA_VERSION: &str = "E_SCHEMA_VERSION";
const E_SERIALIZE: &str = "E_SERIALIZE";

fn err_code(code: &str, message: impl std::fmt::Display) -> String {
    format!("{code}: {message}")
}

fn league_err(e: LeagueError) -> String {
    err_code(e.code(), e)
}

fn check_version(version: u8) -> Result<(), String> {
    if version == SCHEMA_VERSION {
        Ok(())
    } else {
        Err(err_code(
            E_SCHEMA_VERSION,
            format!("unsupported schema version {version}, expected {SCHEMA_VERSION}"),
        ))
    }
}

fn parse<'a, T: Deserialize<'a>>(json: &'a str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| err_code(E_INVALID_JSON, e))
}

fn render<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| err_code(E_SERIALIZE, e))
}

#[derive(Debug, Deserialize)]
pub struct StandingsRequest {
    pub schema_version: u8,
    pub club_ids: Vec<ClubId>,
    #[serde(default)]
    pub matches: Vec<MatchResult>,
    #[serde(default)]
    pub points: Option<PointsConfig>,
}

#[derive(Debug, Serialize)]
pub struct StandingsResponse {
    pub schema_version: u8,
    pub rows: Vec<StandingRow>,
}

pub fn standings_json(request_json: &str) -> Result<String, String> {
    let request: StandingsRequest = parse(request_json)?;
    check_version(request.schema_version)?;

    let points = request.points.unwrap_or_default();
    let rows = compute_standings(&request.club_ids, &request.matches, points);
    render(&StandingsResponse { schema_version: SCHEMA_VERSION, rows })
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub schema_version: u8,
    pub season_competition_id: String,
    pub club_ids: Vec<ClubId>,
    #[serde(default)]
    pub double_round: bool,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub schema_version: u8,
    pub matchdays: Vec<Matchday>,
    pub matches: Vec<MatchResult>,
}

pub fn schedule_json(request_json: &str) -> Result<String, String> {
    let request: ScheduleRequest = parse(request_json)?;
    check_version(request.schema_version)?;

    let schedule = generate_schedule(
        &request.season_competition_id,
        &request.club_ids,
        request.double_round,
    )
    .map_err(league_err)?;
    render(&ScheduleResponse {
        schema_version: SCHEMA_VERSION,
        matchdays: schedule.matchdays,
        matches: schedule.matches,
    })
}

#[derive(Debug, Deserialize)]
pub struct CupDrawRequest {
    pub schema_version: u8,
    pub season_competition_id: String,
    pub round_number: u32,
    /// Defaults to the standard name for `round_number`.
    #[serde(default)]
    pub round_name: Option<String>,
    #[serde(default)]
    pub participants: Vec<ClubId>,
    #[serde(default)]
    pub pots: Option<Pots>,
    pub seed: u64,
}

#[derive(Debug, Serialize)]
pub struct CupDrawResponse {
    pub schema_version: u8,
    pub round: CupRound,
    pub matches: Vec<MatchResult>,
}

/// Seeded draw: the same request always yields the same pairings.
pub fn cup_draw_json(request_json: &str) -> Result<String, String> {
    let request: CupDrawRequest = parse(request_json)?;
    check_version(request.schema_version)?;

    let name = request
        .round_name
        .unwrap_or_else(|| RoundNames::default().name_for(request.round_number));
    let mut rng = ChaCha8Rng::seed_from_u64(request.seed);
    let draft = create_round(
        &request.season_competition_id,
        request.round_number,
        &name,
        &request.participants,
        request.pots.as_ref(),
        &mut rng,
    )
    .map_err(league_err)?;

    render(&CupDrawResponse {
        schema_version: SCHEMA_VERSION,
        round: draft.round,
        matches: draft.matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_standings_json() {
        let request = json!({
            "schema_version": 1,
            "club_ids": ["a", "b"],
            "matches": [{
                "id": "m1",
                "seasonCompetitionId": "sc",
                "homeClubId": "a",
                "awayClubId": "b",
                "homeGoals": 3,
                "awayGoals": 1,
                "isKnockout": false
            }]
        });
        let out: Value =
            serde_json::from_str(&standings_json(&request.to_string()).unwrap()).unwrap();
        assert_eq!(out["schema_version"], 1);
        assert_eq!(out["rows"][0]["clubId"], "a");
        assert_eq!(out["rows"][0]["points"], 3);
        assert_eq!(out["rows"][1]["goalDiff"], -2);
    }

    #[test]
    fn test_schedule_json_errors_carry_codes() {
        let empty = json!({ "schema_version": 1, "season_competition_id": "sc", "club_ids": [] });
        let err = schedule_json(&empty.to_string()).unwrap_err();
        assert!(err.starts_with("E_INVALID_ROSTER: "), "{err}");

        let future = json!({
            "schema_version": 9,
            "season_competition_id": "sc",
            "club_ids": ["a"]
        });
        assert!(schedule_json(&future.to_string()).unwrap_err().starts_with("E_SCHEMA_VERSION"));
        assert!(schedule_json("{").unwrap_err().starts_with("E_INVALID_JSON"));
    }

    #[test]
    fn test_schedule_json_counts() {
        let request = json!({
            "schema_version": 1,
            "season_competition_id": "sc",
            "club_ids": ["a", "b", "c", "d"],
            "double_round": true
        });
        let out: Value =
            serde_json::from_str(&schedule_json(&request.to_string()).unwrap()).unwrap();
        assert_eq!(out["matchdays"].as_array().unwrap().len(), 6);
        assert_eq!(out["matches"].as_array().unwrap().len(), 12);
        assert_eq!(out["matchdays"][0]["name"], "Spieltag 1");
    }

    #[test]
    fn test_cup_draw_json_is_seeded() {
        let request = json!({
            "schema_version": 1,
            "season_competition_id": "sc",
            "round_number": 4,
            "participants": ["a", "b", "c", "d", "e", "f", "g", "h"],
            "seed": 2024
        })
        .to_string();

        let pairs = |json: String| -> Vec<(String, String)> {
            let out: Value = serde_json::from_str(&json).unwrap();
            out["matches"]
                .as_array()
                .unwrap()
                .iter()
                .map(|m| (m["homeClubId"].to_string(), m["awayClubId"].to_string()))
                .collect()
        };
        let first = cup_draw_json(&request).unwrap();
        let out: Value = serde_json::from_str(&first).unwrap();
        assert_eq!(out["round"]["name"], "Viertelfinale");
        assert_eq!(pairs(first), pairs(cup_draw_json(&request).unwrap()));

        let odd = json!({
            "schema_version": 1,
            "season_competition_id": "sc",
            "round_number": 1,
            "participants": ["a", "b", "c"],
            "seed": 1
        });
        assert!(cup_draw_json(&odd.to_string()).unwrap_err().starts_with("E_INVALID_PARTICIPANTS"));
    }
}

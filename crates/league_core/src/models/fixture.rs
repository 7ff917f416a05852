use serde::{Deserialize, Serialize};

use super::club::ClubId;
use crate::error::{LeagueError, Result};

/// A fixture and, once played, its result.
///
/// Lifecycle: created with the pairing only, scored once, optionally
/// cleared back to unscored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub id: String,
    pub season_competition_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matchday_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cup_round_id: Option<String>,
    pub home_club_id: ClubId,
    pub away_club_id: ClubId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_goals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_goals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_pen: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_pen: Option<u32>,
    /// Knockout ties are settled by penalties; league draws stand.
    pub is_knockout: bool,
    /// Unix milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub played_at: Option<i64>,
}

impl MatchResult {
    pub fn fixture(
        id: String,
        season_competition_id: &str,
        home: ClubId,
        away: ClubId,
        is_knockout: bool,
    ) -> Self {
        Self {
            id,
            season_competition_id: season_competition_id.to_string(),
            matchday_id: None,
            cup_round_id: None,
            home_club_id: home,
            away_club_id: away,
            home_goals: None,
            away_goals: None,
            home_pen: None,
            away_pen: None,
            is_knockout,
            played_at: None,
        }
    }

    /// Both goal counts present.
    pub fn is_played(&self) -> bool {
        self.score().is_some()
    }

    pub fn score(&self) -> Option<(u32, u32)> {
        match (self.home_goals, self.away_goals) {
            (Some(h), Some(a)) => Some((h, a)),
            _ => None,
        }
    }

    pub fn penalties(&self) -> Option<(u32, u32)> {
        match (self.home_pen, self.away_pen) {
            (Some(h), Some(a)) => Some((h, a)),
            _ => None,
        }
    }

    pub fn involves(&self, club: &ClubId) -> bool {
        &self.home_club_id == club || &self.away_club_id == club
    }

    /// Set the final score. A shootout recorded earlier is dropped once the
    /// goals no longer tie.
    pub fn record_score(&mut self, home: u32, away: u32, played_at: Option<i64>) {
        self.home_goals = Some(home);
        self.away_goals = Some(away);
        if home != away {
            self.home_pen = None;
            self.away_pen = None;
        }
        self.played_at = played_at;
    }

    pub fn record_penalties(&mut self, home: u32, away: u32) -> Result<()> {
        if !self.is_knockout {
            return Err(LeagueError::InvalidScore(format!(
                "match {} is not a knockout match",
                self.id
            )));
        }
        match self.score() {
            Some((h, a)) if h == a => {
                self.home_pen = Some(home);
                self.away_pen = Some(away);
                Ok(())
            }
            Some(_) => Err(LeagueError::InvalidScore(format!(
                "match {} was decided in regulation",
                self.id
            ))),
            None => Err(LeagueError::InvalidScore(format!("match {} has no score yet", self.id))),
        }
    }

    pub fn clear_score(&mut self) {
        self.home_goals = None;
        self.away_goals = None;
        self.home_pen = None;
        self.away_pen = None;
        self.played_at = None;
    }
}

/// One round of a league schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchday {
    pub id: String,
    pub season_competition_id: String,
    pub number: u32,
    pub name: String,
}

/// One elimination stage of a cup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CupRound {
    pub id: String,
    pub season_competition_id: String,
    pub number: u32,
    pub name: String,
}

/// Home/away pair supplied by hand instead of a random draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pairing {
    pub home_club_id: ClubId,
    pub away_club_id: ClubId,
}

impl Pairing {
    pub fn new(home: impl Into<ClubId>, away: impl Into<ClubId>) -> Self {
        Self { home_club_id: home.into(), away_club_id: away.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knockout() -> MatchResult {
        MatchResult::fixture("m_1".into(), "sc_cup", "a".into(), "b".into(), true)
    }

    #[test]
    fn test_unscored_fixture_omits_optional_fields() {
        let json = serde_json::to_value(knockout()).unwrap();
        assert_eq!(json["homeClubId"], "a");
        assert_eq!(json["isKnockout"], true);
        assert!(json.get("homeGoals").is_none());
        assert!(json.get("cupRoundId").is_none());
    }

    #[test]
    fn test_score_lifecycle() {
        let mut m = knockout();
        assert!(!m.is_played());

        m.record_score(1, 1, Some(1_700_000_000_000));
        assert_eq!(m.score(), Some((1, 1)));
        m.record_penalties(4, 3).unwrap();
        assert_eq!(m.penalties(), Some((4, 3)));

        // Correcting the score to a regulation win drops the shootout.
        m.record_score(2, 1, None);
        assert_eq!(m.penalties(), None);

        m.clear_score();
        assert!(!m.is_played());
        assert_eq!(m.played_at, None);
    }

    #[test]
    fn test_penalties_rejected_for_league_match() {
        let mut m = MatchResult::fixture("m_2".into(), "sc_1bl", "a".into(), "b".into(), false);
        m.record_score(0, 0, None);
        assert!(matches!(m.record_penalties(5, 4), Err(LeagueError::InvalidScore(_))));
    }

    #[test]
    fn test_penalties_rejected_without_tie() {
        let mut m = knockout();
        assert!(m.record_penalties(5, 4).is_err());
        m.record_score(3, 0, None);
        assert!(m.record_penalties(5, 4).is_err());
    }
}

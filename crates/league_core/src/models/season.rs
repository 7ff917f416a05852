use serde::{Deserialize, Serialize};

use super::club::ClubId;

/// Points awarded per result. Owned by the competition, not the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsConfig {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self { win: 3, draw: 1, loss: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionKind {
    League,
    Cup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub id: String,
    pub name: String,
    pub short_name: String,
    #[serde(rename = "type")]
    pub kind: CompetitionKind,
    pub slug: String,
    pub sort_order: u32,
}

impl Competition {
    pub fn is_cup(&self) -> bool {
        self.kind == CompetitionKind::Cup
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: String,
    pub name: String,
    /// Exactly one season is flagged current; the store owns the flag.
    pub is_current: bool,
    /// Unix milliseconds
    pub created_at: i64,
}

/// One competition played in one season, with its roster and scoring rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonCompetition {
    pub id: String,
    pub season_id: String,
    pub competition_id: String,
    /// Roster order is pairing-seed input only, never a ranking.
    pub club_ids: Vec<ClubId>,
    pub points_win: u32,
    pub points_draw: u32,
    pub points_loss: u32,
    pub has_double_round: bool,
    pub created_at: i64,
}

impl SeasonCompetition {
    pub fn points(&self) -> PointsConfig {
        PointsConfig { win: self.points_win, draw: self.points_draw, loss: self.points_loss }
    }

    pub fn set_points(&mut self, points: PointsConfig) {
        self.points_win = points.win;
        self.points_draw = points.draw;
        self.points_loss = points.loss;
    }
}

//! Multi-season aggregation: all-time table, honours list, cup records.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::cup::{decide_match, RoundNames};
use crate::models::{ClubId, CupRound, MatchResult};
use crate::standings::{table_order, StandingRow, TableRow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllTimeRow {
    pub club_id: ClubId,
    pub seasons: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i64,
    pub points: u32,
}

impl AllTimeRow {
    fn from_row(row: &StandingRow) -> Self {
        Self {
            club_id: row.club_id.clone(),
            seasons: 1,
            played: row.played,
            wins: row.wins,
            draws: row.draws,
            losses: row.losses,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_diff: 0,
            points: row.points,
        }
    }

    fn add(&mut self, row: &StandingRow) {
        self.seasons += 1;
        self.played += row.played;
        self.wins += row.wins;
        self.draws += row.draws;
        self.losses += row.losses;
        self.goals_for += row.goals_for;
        self.goals_against += row.goals_against;
        self.points += row.points;
    }
}

impl TableRow for AllTimeRow {
    fn club_id(&self) -> &ClubId {
        &self.club_id
    }
    fn points(&self) -> u32 {
        self.points
    }
    fn goal_diff(&self) -> i64 {
        self.goal_diff
    }
    fn goals_for(&self) -> u32 {
        self.goals_for
    }
}

/// Sum per-season tables into one all-time table.
///
/// A season counts for a club only if it played at least one match there.
/// Goal difference is recomputed from the summed goals.
pub fn compute_all_time(season_tables: &[Vec<StandingRow>]) -> Vec<AllTimeRow> {
    let mut index: HashMap<ClubId, usize> = HashMap::new();
    let mut rows: Vec<AllTimeRow> = Vec::new();

    for row in season_tables.iter().flatten().filter(|r| r.played > 0) {
        match index.get(&row.club_id) {
            Some(&i) => rows[i].add(row),
            None => {
                index.insert(row.club_id.clone(), rows.len());
                rows.push(AllTimeRow::from_row(row));
            }
        }
    }

    for row in rows.iter_mut() {
        row.goal_diff = row.goals_for as i64 - row.goals_against as i64;
    }
    rows.sort_by(table_order);
    rows
}

/// Title winners of one season. Either may be missing (season unplayed,
/// cup unfinished).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonHonours {
    pub season_name: String,
    pub champion: Option<ClubId>,
    pub cup_winner: Option<ClubId>,
}

impl SeasonHonours {
    /// Champion is the leader of the top league table once any match counts.
    pub fn from_results(
        season_name: &str,
        top_league: &[StandingRow],
        cup: Option<&CupSeasonRecord>,
    ) -> Self {
        let champion = if top_league.iter().any(|r| r.played > 0) {
            top_league.first().map(|r| r.club_id.clone())
        } else {
            None
        };
        Self {
            season_name: season_name.to_string(),
            champion,
            cup_winner: cup.and_then(CupSeasonRecord::winner),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionEntry {
    pub club_id: ClubId,
    pub championships: u32,
    pub championship_seasons: Vec<String>,
    pub cup_wins: u32,
    pub cup_win_seasons: Vec<String>,
}

impl ChampionEntry {
    fn new(club_id: ClubId) -> Self {
        Self {
            club_id,
            championships: 0,
            championship_seasons: Vec::new(),
            cup_wins: 0,
            cup_win_seasons: Vec::new(),
        }
    }
}

fn entry_for<'a, T>(
    map: &'a mut HashMap<ClubId, T>,
    club: &ClubId,
    new: impl FnOnce(ClubId) -> T,
) -> &'a mut T {
    map.entry(club.clone()).or_insert_with(|| new(club.clone()))
}

/// Fold per-season title winners into per-club counts, keeping the season
/// names behind every count.
pub fn compute_champions_list(honours: &[SeasonHonours]) -> Vec<ChampionEntry> {
    let mut entries: HashMap<ClubId, ChampionEntry> = HashMap::new();

    for season in honours {
        if let Some(club) = &season.champion {
            let entry = entry_for(&mut entries, club, ChampionEntry::new);
            entry.championships += 1;
            entry.championship_seasons.push(season.season_name.clone());
        }
        if let Some(club) = &season.cup_winner {
            let entry = entry_for(&mut entries, club, ChampionEntry::new);
            entry.cup_wins += 1;
            entry.cup_win_seasons.push(season.season_name.clone());
        }
    }

    let mut list: Vec<ChampionEntry> = entries.into_values().collect();
    list.sort_by(|a, b| {
        b.championships
            .cmp(&a.championships)
            .then_with(|| b.cup_wins.cmp(&a.cup_wins))
            .then_with(|| a.club_id.cmp(&b.club_id))
    });
    list
}

/// One season of a cup: its rounds and all of their matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CupSeasonRecord {
    pub season_name: String,
    pub rounds: Vec<CupRound>,
    pub matches: Vec<MatchResult>,
}

impl CupSeasonRecord {
    /// The last round by number, if it holds exactly one match.
    ///
    /// Round names only label the stage; a cup smaller than the naming table
    /// still ends in a one-match round.
    pub fn final_round(&self) -> Option<&CupRound> {
        let last = self.rounds.iter().max_by_key(|r| r.number)?;
        (self.round_matches(&last.id).count() == 1).then_some(last)
    }

    pub fn winner(&self) -> Option<ClubId> {
        let final_round = self.final_round()?;
        self.round_matches(&final_round.id).next().and_then(decide_match).cloned()
    }

    fn round_matches<'a>(
        &'a self,
        round_id: &'a str,
    ) -> impl Iterator<Item = &'a MatchResult> + 'a {
        self.matches.iter().filter(move |m| m.cup_round_id.as_deref() == Some(round_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CupStatRow {
    pub club_id: ClubId,
    pub participations: u32,
    pub wins: u32,
    pub cup_wins: u32,
    pub cup_win_seasons: Vec<String>,
    pub finals: u32,
    pub best_round: String,
    pub best_round_ordinal: u32,
}

impl CupStatRow {
    fn new(club_id: ClubId) -> Self {
        Self {
            club_id,
            participations: 0,
            wins: 0,
            cup_wins: 0,
            cup_win_seasons: Vec::new(),
            finals: 0,
            best_round: String::new(),
            best_round_ordinal: 0,
        }
    }

    fn reached(&mut self, name: &str, ordinal: u32) {
        if ordinal > self.best_round_ordinal {
            self.best_round_ordinal = ordinal;
            self.best_round = name.to_string();
        }
    }
}

/// All-time cup statistics. Rounds compare by stage ordinal, not by name.
pub fn compute_cup_statistics(
    seasons: &[CupSeasonRecord],
    names: &RoundNames,
) -> Vec<CupStatRow> {
    let mut stats: HashMap<ClubId, CupStatRow> = HashMap::new();

    for season in seasons {
        let rounds: HashMap<&str, &CupRound> =
            season.rounds.iter().map(|r| (r.id.as_str(), r)).collect();
        let final_id = season.final_round().map(|r| r.id.as_str());
        let mut participants: BTreeSet<&ClubId> = BTreeSet::new();

        for m in &season.matches {
            participants.insert(&m.home_club_id);
            participants.insert(&m.away_club_id);

            let Some(round) = m.cup_round_id.as_deref().and_then(|id| rounds.get(id)) else {
                continue;
            };
            let is_final = final_id == Some(round.id.as_str());

            if let Some(winner) = decide_match(m) {
                let row = entry_for(&mut stats, winner, CupStatRow::new);
                row.wins += 1;
                if is_final {
                    row.cup_wins += 1;
                    row.cup_win_seasons.push(season.season_name.clone());
                }
            }

            let ordinal = names.ordinal_of(&round.name, round.number);
            for club in [&m.home_club_id, &m.away_club_id] {
                let row = entry_for(&mut stats, club, CupStatRow::new);
                if is_final {
                    row.finals += 1;
                }
                row.reached(&round.name, ordinal);
            }
        }

        for club in participants {
            entry_for(&mut stats, club, CupStatRow::new).participations += 1;
        }
    }

    let mut rows: Vec<CupStatRow> = stats.into_values().collect();
    rows.sort_by(cup_stat_order);
    rows
}

fn cup_stat_order(a: &CupStatRow, b: &CupStatRow) -> Ordering {
    b.cup_wins
        .cmp(&a.cup_wins)
        .then_with(|| b.finals.cmp(&a.finals))
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| a.club_id.cmp(&b.club_id))
}

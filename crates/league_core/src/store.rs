//! Storage seam for the service layer.
//!
//! The engine functions are pure; `LeagueStore` is where their records end
//! up. `MemoryStore` keeps every collection in insertion order, which is also
//! the order matches and matchdays are listed in.

use crate::models::{
    Club, ClubId, Competition, CupRound, MatchResult, Matchday, Season, SeasonCompetition,
};

pub trait LeagueStore {
    fn clubs(&self) -> Vec<Club>;
    fn club(&self, id: &ClubId) -> Option<Club>;
    fn put_club(&mut self, club: Club);

    fn competitions(&self) -> Vec<Competition>;
    fn put_competition(&mut self, competition: Competition);

    fn seasons(&self) -> Vec<Season>;
    fn season(&self, id: &str) -> Option<Season>;
    fn put_season(&mut self, season: Season);
    fn remove_season(&mut self, id: &str);

    fn season_competitions(&self) -> Vec<SeasonCompetition>;
    fn season_competition(&self, id: &str) -> Option<SeasonCompetition>;
    fn put_season_competition(&mut self, sc: SeasonCompetition);
    fn remove_season_competition(&mut self, id: &str);

    fn matchdays(&self, season_competition_id: &str) -> Vec<Matchday>;
    fn all_matchdays(&self) -> Vec<Matchday>;
    fn put_matchday(&mut self, matchday: Matchday);
    fn remove_matchday(&mut self, id: &str);

    fn matches(&self, season_competition_id: &str) -> Vec<MatchResult>;
    fn all_matches(&self) -> Vec<MatchResult>;
    fn match_by_id(&self, id: &str) -> Option<MatchResult>;
    fn put_match(&mut self, m: MatchResult);
    fn remove_match(&mut self, id: &str);

    fn cup_rounds(&self, season_competition_id: &str) -> Vec<CupRound>;
    fn all_cup_rounds(&self) -> Vec<CupRound>;
    fn put_cup_round(&mut self, round: CupRound);
    fn remove_cup_round(&mut self, id: &str);

    /// Drop every record of every collection.
    fn clear(&mut self);

    /// Seasons of one competition, paired with their season competitions,
    /// oldest season first.
    fn competition_history(&self, competition_id: &str) -> Vec<(Season, SeasonCompetition)> {
        let mut seasons = self.seasons();
        seasons.sort_by_key(|s| s.created_at);
        let scs = self.season_competitions();

        seasons
            .into_iter()
            .filter_map(|season| {
                scs.iter()
                    .find(|sc| sc.season_id == season.id && sc.competition_id == competition_id)
                    .cloned()
                    .map(|sc| (season, sc))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    clubs: Vec<Club>,
    competitions: Vec<Competition>,
    seasons: Vec<Season>,
    season_competitions: Vec<SeasonCompetition>,
    matchdays: Vec<Matchday>,
    matches: Vec<MatchResult>,
    cup_rounds: Vec<CupRound>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Replace the record with the same id, or append.
fn upsert<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> &str) {
    match items.iter().position(|existing| id(existing) == id(&item)) {
        Some(i) => items[i] = item,
        None => items.push(item),
    }
}

impl LeagueStore for MemoryStore {
    fn clubs(&self) -> Vec<Club> {
        self.clubs.clone()
    }

    fn club(&self, id: &ClubId) -> Option<Club> {
        self.clubs.iter().find(|c| &c.id == id).cloned()
    }

    fn put_club(&mut self, club: Club) {
        upsert(&mut self.clubs, club, |c| c.id.as_str());
    }

    fn competitions(&self) -> Vec<Competition> {
        self.competitions.clone()
    }

    fn put_competition(&mut self, competition: Competition) {
        upsert(&mut self.competitions, competition, |c| c.id.as_str());
    }

    fn seasons(&self) -> Vec<Season> {
        self.seasons.clone()
    }

    fn season(&self, id: &str) -> Option<Season> {
        self.seasons.iter().find(|s| s.id == id).cloned()
    }

    fn put_season(&mut self, season: Season) {
        upsert(&mut self.seasons, season, |s| s.id.as_str());
    }

    fn remove_season(&mut self, id: &str) {
        self.seasons.retain(|s| s.id != id);
    }

    fn season_competitions(&self) -> Vec<SeasonCompetition> {
        self.season_competitions.clone()
    }

    fn season_competition(&self, id: &str) -> Option<SeasonCompetition> {
        self.season_competitions.iter().find(|sc| sc.id == id).cloned()
    }

    fn put_season_competition(&mut self, sc: SeasonCompetition) {
        upsert(&mut self.season_competitions, sc, |sc| sc.id.as_str());
    }

    fn remove_season_competition(&mut self, id: &str) {
        self.season_competitions.retain(|sc| sc.id != id);
    }

    fn matchdays(&self, season_competition_id: &str) -> Vec<Matchday> {
        let mut days: Vec<Matchday> = self
            .matchdays
            .iter()
            .filter(|md| md.season_competition_id == season_competition_id)
            .cloned()
            .collect();
        days.sort_by_key(|md| md.number);
        days
    }

    fn all_matchdays(&self) -> Vec<Matchday> {
        self.matchdays.clone()
    }

    fn put_matchday(&mut self, matchday: Matchday) {
        upsert(&mut self.matchdays, matchday, |md| md.id.as_str());
    }

    fn remove_matchday(&mut self, id: &str) {
        self.matchdays.retain(|md| md.id != id);
    }

    fn matches(&self, season_competition_id: &str) -> Vec<MatchResult> {
        self.matches
            .iter()
            .filter(|m| m.season_competition_id == season_competition_id)
            .cloned()
            .collect()
    }

    fn all_matches(&self) -> Vec<MatchResult> {
        self.matches.clone()
    }

    fn match_by_id(&self, id: &str) -> Option<MatchResult> {
        self.matches.iter().find(|m| m.id == id).cloned()
    }

    fn put_match(&mut self, m: MatchResult) {
        upsert(&mut self.matches, m, |m| m.id.as_str());
    }

    fn remove_match(&mut self, id: &str) {
        self.matches.retain(|m| m.id != id);
    }

    fn cup_rounds(&self, season_competition_id: &str) -> Vec<CupRound> {
        let mut rounds: Vec<CupRound> = self
            .cup_rounds
            .iter()
            .filter(|r| r.season_competition_id == season_competition_id)
            .cloned()
            .collect();
        rounds.sort_by_key(|r| r.number);
        rounds
    }

    fn all_cup_rounds(&self) -> Vec<CupRound> {
        self.cup_rounds.clone()
    }

    fn put_cup_round(&mut self, round: CupRound) {
        upsert(&mut self.cup_rounds, round, |r| r.id.as_str());
    }

    fn remove_cup_round(&mut self, id: &str) {
        self.cup_rounds.retain(|r| r.id != id);
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

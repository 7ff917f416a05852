//! Read-modify-write operations over a `LeagueStore`.
//!
//! Each call reads the records it needs, runs one engine function and writes
//! the result back. The service owns its store, so there is a single writer.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::LeagueConfig;
use crate::cup::{CupBracket, CupRoundDraft, SeedingPlan};
use crate::error::{LeagueError, Result};
use crate::history::{
    compute_all_time, compute_champions_list, compute_cup_statistics, AllTimeRow, ChampionEntry,
    CupSeasonRecord, CupStatRow, SeasonHonours,
};
use crate::models::{
    new_id, now_millis, ClubId, Competition, MatchResult, Matchday, Pairing, Season,
    SeasonCompetition,
};
use crate::relegation::{compute_promotion_proposal, zone_for, PromotionProposal, TableZone};
use crate::schedule::{generate_schedule, matchday_name};
use crate::standings::{compute_standings, StandingRow};
use crate::store::LeagueStore;

/// Where a new season takes its rosters from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterSource {
    /// `LeagueConfig::rosters`.
    Config,
    /// Same rosters as an existing season.
    CopyFrom(String),
    /// Competition id → roster.
    Explicit(BTreeMap<String, Vec<ClubId>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSeason {
    pub name: String,
    pub make_current: bool,
    pub rosters: RosterSource,
    /// Create empty matchdays only; fixtures are entered by hand.
    pub manual: bool,
}

impl NewSeason {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            make_current: true,
            rosters: RosterSource::Config,
            manual: false,
        }
    }

    pub fn copy_from(mut self, season_id: &str) -> Self {
        self.rosters = RosterSource::CopyFrom(season_id.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummary {
    pub season: Season,
    pub champion: Option<ClubId>,
    pub cup_winner: Option<ClubId>,
    pub promotion: PromotionProposal,
}

pub struct LeagueService<S: LeagueStore> {
    store: S,
    config: LeagueConfig,
}

impl<S: LeagueStore> LeagueService<S> {
    pub fn new(store: S, config: LeagueConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &LeagueConfig {
        &self.config
    }

    /// Put the configured competitions and club catalogue into the store.
    pub fn install_catalogue(&mut self) {
        for competition in &self.config.competitions {
            self.store.put_competition(competition.clone());
        }
        for club in &self.config.clubs {
            self.store.put_club(club.clone());
        }
    }

    // ---- seasons ----

    /// Create a season with one season competition per configured
    /// competition that has a roster. Leagues get their schedule (or empty
    /// matchdays when `manual`); cups without an explicit roster take the
    /// union of the league rosters.
    pub fn create_season(&mut self, request: NewSeason) -> Result<Season> {
        let rosters = self.resolve_rosters(&request.rosters)?;

        let season = Season {
            id: new_id("s"),
            name: request.name.clone(),
            is_current: request.make_current,
            created_at: now_millis(),
        };

        // Build everything first so a bad roster leaves the store untouched.
        let mut scs = Vec::new();
        let mut matchdays = Vec::new();
        let mut matches = Vec::new();
        let mut league_union: Vec<ClubId> = Vec::new();

        for league in self.config.leagues() {
            let Some(roster) = rosters.get(&league.id) else {
                log::debug!("No roster for {}, skipping", league.name);
                continue;
            };
            let double_round = self.config.double_round;
            let sc = self.new_season_competition(&season, league, roster.clone(), double_round);

            if request.manual {
                matchdays.extend(empty_matchdays(&sc)?);
            } else {
                let schedule = generate_schedule(&sc.id, roster, sc.has_double_round)?;
                matchdays.extend(schedule.matchdays);
                matches.extend(schedule.matches);
            }
            for club in roster {
                if !league_union.contains(club) {
                    league_union.push(club.clone());
                }
            }
            scs.push(sc);
        }

        for cup in self.config.cups() {
            let roster = rosters.get(&cup.id).cloned().unwrap_or_else(|| league_union.clone());
            if roster.is_empty() {
                continue;
            }
            scs.push(self.new_season_competition(&season, cup, roster, false));
        }

        self.install_catalogue();
        if request.make_current {
            for mut other in self.store.seasons().into_iter().filter(|s| s.is_current) {
                other.is_current = false;
                self.store.put_season(other);
            }
        }
        self.store.put_season(season.clone());
        for sc in scs {
            self.store.put_season_competition(sc);
        }
        for md in matchdays {
            self.store.put_matchday(md);
        }
        let match_count = matches.len();
        for m in matches {
            self.store.put_match(m);
        }

        log::info!("Created season {} ({} league matches)", season.name, match_count);
        Ok(season)
    }

    /// Remove a season with all of its competitions, matchdays, rounds and matches.
    pub fn delete_season(&mut self, season_id: &str) -> Result<()> {
        let season = self.store.season(season_id).ok_or_else(|| not_found("season", season_id))?;

        for sc in self.season_competitions_of(season_id) {
            for m in self.store.matches(&sc.id) {
                self.store.remove_match(&m.id);
            }
            for md in self.store.matchdays(&sc.id) {
                self.store.remove_matchday(&md.id);
            }
            for round in self.store.cup_rounds(&sc.id) {
                self.store.remove_cup_round(&round.id);
            }
            self.store.remove_season_competition(&sc.id);
        }
        self.store.remove_season(season_id);

        log::info!("Deleted season {}", season.name);
        Ok(())
    }

    pub fn current_season(&self) -> Option<Season> {
        self.store.seasons().into_iter().find(|s| s.is_current)
    }

    pub fn season_by_name(&self, name: &str) -> Option<Season> {
        self.store.seasons().into_iter().find(|s| s.name == name)
    }

    pub fn season_competition(
        &self,
        season_id: &str,
        competition_id: &str,
    ) -> Result<SeasonCompetition> {
        self.season_competitions_of(season_id)
            .into_iter()
            .find(|sc| sc.competition_id == competition_id)
            .ok_or_else(|| {
                not_found("competition", &format!("{competition_id} in season {season_id}"))
            })
    }

    // ---- leagues ----

    pub fn standings(&self, season_id: &str, competition_id: &str) -> Result<Vec<StandingRow>> {
        let sc = self.season_competition(season_id, competition_id)?;
        Ok(self.table_of(&sc))
    }

    /// Matchdays in order with their fixtures.
    pub fn schedule(
        &self,
        season_id: &str,
        competition_id: &str,
    ) -> Result<Vec<(Matchday, Vec<MatchResult>)>> {
        let sc = self.season_competition(season_id, competition_id)?;
        let matches = self.store.matches(&sc.id);

        Ok(self
            .store
            .matchdays(&sc.id)
            .into_iter()
            .map(|md| {
                let fixtures = matches
                    .iter()
                    .filter(|m| m.matchday_id.as_deref() == Some(md.id.as_str()))
                    .cloned()
                    .collect();
                (md, fixtures)
            })
            .collect())
    }

    /// Table zone of a position, looked up by the competition's slug.
    pub fn zone(&self, competition_id: &str, position: usize, total: usize) -> Option<TableZone> {
        let competition = self.config.competition(competition_id)?;
        zone_for(&self.config.zones, &competition.slug, position, total)
    }

    // ---- cups ----

    pub fn cup_bracket(&self, season_id: &str, competition_id: &str) -> Result<CupBracket> {
        let sc = self.season_competition(season_id, competition_id)?;
        Ok(self.bracket_of(&sc))
    }

    /// Pot rules resolved against this season's league rosters. Rules that
    /// reference a league without a roster this season are dropped.
    pub fn seeding_plan(&self, season_id: &str) -> Result<SeedingPlan> {
        let rosters: HashMap<String, Vec<ClubId>> = self
            .season_competitions_of(season_id)
            .into_iter()
            .map(|sc| (sc.competition_id, sc.club_ids))
            .collect();

        let rules: Vec<_> = self
            .config
            .cup
            .pot_rules
            .iter()
            .filter(|rule| {
                let complete = rule.tiers.iter().all(|t| rosters.contains_key(t));
                if !complete {
                    log::warn!(
                        "Pot rule for round {} skipped: a tier has no roster this season",
                        rule.round
                    );
                }
                complete
            })
            .cloned()
            .collect();

        SeedingPlan::resolve(&rules, &rosters)
    }

    pub fn start_cup<R: Rng + ?Sized>(
        &mut self,
        season_id: &str,
        competition_id: &str,
        rng: &mut R,
    ) -> Result<CupRoundDraft> {
        let sc = self.season_competition(season_id, competition_id)?;
        let plan = self.seeding_plan(season_id)?;
        let draft = self.bracket_of(&sc).start(&sc.club_ids, &plan, rng)?;
        Ok(self.persist(draft))
    }

    pub fn start_cup_with_pairings(
        &mut self,
        season_id: &str,
        competition_id: &str,
        pairings: &[Pairing],
    ) -> Result<CupRoundDraft> {
        let sc = self.season_competition(season_id, competition_id)?;
        ensure_participants(&sc, pairings)?;
        let draft = self.bracket_of(&sc).start_with_pairings(pairings)?;
        Ok(self.persist(draft))
    }

    pub fn advance_cup<R: Rng + ?Sized>(
        &mut self,
        season_id: &str,
        competition_id: &str,
        rng: &mut R,
    ) -> Result<CupRoundDraft> {
        let sc = self.season_competition(season_id, competition_id)?;
        let plan = self.seeding_plan(season_id)?;
        let draft = self.bracket_of(&sc).advance(&plan, rng)?;
        Ok(self.persist(draft))
    }

    pub fn advance_cup_with_pairings(
        &mut self,
        season_id: &str,
        competition_id: &str,
        pairings: &[Pairing],
    ) -> Result<CupRoundDraft> {
        let sc = self.season_competition(season_id, competition_id)?;
        ensure_participants(&sc, pairings)?;
        let draft = self.bracket_of(&sc).advance_with_pairings(pairings)?;
        Ok(self.persist(draft))
    }

    pub fn edit_cup_round(
        &mut self,
        season_id: &str,
        competition_id: &str,
        pairings: &[Pairing],
    ) -> Result<CupRoundDraft> {
        let sc = self.season_competition(season_id, competition_id)?;
        ensure_participants(&sc, pairings)?;
        let draft = self.bracket_of(&sc).edit_current_round(pairings)?;
        Ok(self.persist(draft))
    }

    // ---- scores ----

    /// Record a final score. Cup matches must belong to the current round.
    pub fn record_score(&mut self, match_id: &str, home: u32, away: u32) -> Result<MatchResult> {
        let played_at = Some(now_millis());
        self.update_match(
            match_id,
            |m| {
                m.record_score(home, away, played_at);
                Ok(())
            },
            |bracket| bracket.record_score(match_id, home, away, played_at),
        )
    }

    pub fn record_penalties(
        &mut self,
        match_id: &str,
        home: u32,
        away: u32,
    ) -> Result<MatchResult> {
        self.update_match(
            match_id,
            |m| m.record_penalties(home, away),
            |bracket| bracket.record_penalties(match_id, home, away),
        )
    }

    pub fn clear_score(&mut self, match_id: &str) -> Result<MatchResult> {
        self.update_match(
            match_id,
            |m| {
                m.clear_score();
                Ok(())
            },
            |bracket| bracket.clear_score(match_id),
        )
    }

    // ---- summaries and history ----

    pub fn season_summary(&self, season_id: &str) -> Result<SeasonSummary> {
        let season = self.store.season(season_id).ok_or_else(|| not_found("season", season_id))?;
        let honours = self.honours_of(&season);

        let tables: HashMap<String, Vec<StandingRow>> = self
            .season_competitions_of(season_id)
            .into_iter()
            .filter(|sc| self.config.competition(&sc.competition_id).is_some_and(|c| !c.is_cup()))
            .map(|sc| {
                let table = self.table_of(&sc);
                (sc.competition_id, table)
            })
            .collect();

        Ok(SeasonSummary {
            season,
            champion: honours.champion,
            cup_winner: honours.cup_winner,
            promotion: compute_promotion_proposal(&self.config.promotion, &tables),
        })
    }

    pub fn all_time_table(&self, competition_id: &str) -> Vec<AllTimeRow> {
        let tables: Vec<Vec<StandingRow>> = self
            .store
            .competition_history(competition_id)
            .into_iter()
            .map(|(_, sc)| self.table_of(&sc))
            .collect();
        compute_all_time(&tables)
    }

    pub fn champions_list(&self) -> Vec<ChampionEntry> {
        let mut seasons = self.store.seasons();
        seasons.sort_by_key(|s| s.created_at);
        let honours: Vec<SeasonHonours> = seasons.iter().map(|s| self.honours_of(s)).collect();
        compute_champions_list(&honours)
    }

    pub fn cup_statistics(&self, competition_id: &str) -> Vec<CupStatRow> {
        let records: Vec<CupSeasonRecord> = self
            .store
            .competition_history(competition_id)
            .into_iter()
            .map(|(season, sc)| self.cup_record_of(&season, &sc))
            .collect();
        compute_cup_statistics(&records, &self.config.cup.round_names)
    }

    // ---- internals ----

    fn resolve_rosters(&self, source: &RosterSource) -> Result<BTreeMap<String, Vec<ClubId>>> {
        match source {
            RosterSource::Config => Ok(self.config.rosters.clone()),
            RosterSource::Explicit(rosters) => Ok(rosters.clone()),
            RosterSource::CopyFrom(season_id) => {
                if self.store.season(season_id).is_none() {
                    return Err(not_found("season", season_id));
                }
                Ok(self
                    .season_competitions_of(season_id)
                    .into_iter()
                    .map(|sc| (sc.competition_id, sc.club_ids))
                    .collect())
            }
        }
    }

    fn new_season_competition(
        &self,
        season: &Season,
        competition: &Competition,
        club_ids: Vec<ClubId>,
        has_double_round: bool,
    ) -> SeasonCompetition {
        let points = self.config.default_points;
        SeasonCompetition {
            id: new_id("sc"),
            season_id: season.id.clone(),
            competition_id: competition.id.clone(),
            club_ids,
            points_win: points.win,
            points_draw: points.draw,
            points_loss: points.loss,
            has_double_round,
            created_at: season.created_at,
        }
    }

    fn season_competitions_of(&self, season_id: &str) -> Vec<SeasonCompetition> {
        self.store
            .season_competitions()
            .into_iter()
            .filter(|sc| sc.season_id == season_id)
            .collect()
    }

    fn table_of(&self, sc: &SeasonCompetition) -> Vec<StandingRow> {
        compute_standings(&sc.club_ids, &self.store.matches(&sc.id), sc.points())
    }

    fn bracket_of(&self, sc: &SeasonCompetition) -> CupBracket {
        CupBracket::from_records(&sc.id, self.store.cup_rounds(&sc.id), self.store.matches(&sc.id))
            .with_round_names(self.config.cup.round_names.clone())
    }

    fn cup_record_of(&self, season: &Season, sc: &SeasonCompetition) -> CupSeasonRecord {
        CupSeasonRecord {
            season_name: season.name.clone(),
            rounds: self.store.cup_rounds(&sc.id),
            matches: self
                .store
                .matches(&sc.id)
                .into_iter()
                .filter(|m| m.cup_round_id.is_some())
                .collect(),
        }
    }

    fn honours_of(&self, season: &Season) -> SeasonHonours {
        let top_table = self
            .config
            .top_league()
            .and_then(|league| self.season_competition(&season.id, &league.id).ok())
            .map(|sc| self.table_of(&sc))
            .unwrap_or_default();

        let cup = self
            .config
            .cups()
            .first()
            .and_then(|cup| self.season_competition(&season.id, &cup.id).ok())
            .map(|sc| self.cup_record_of(season, &sc));

        SeasonHonours::from_results(&season.name, &top_table, cup.as_ref())
    }

    fn persist(&mut self, draft: CupRoundDraft) -> CupRoundDraft {
        for id in &draft.removed_match_ids {
            self.store.remove_match(id);
        }
        self.store.put_cup_round(draft.round.clone());
        for m in &draft.matches {
            self.store.put_match(m.clone());
        }
        log::info!("Stored {} with {} match(es)", draft.round.name, draft.matches.len());
        draft
    }

    /// League matches are updated in place; cup matches go through their
    /// bracket so closed rounds stay closed.
    fn update_match(
        &mut self,
        match_id: &str,
        league: impl FnOnce(&mut MatchResult) -> Result<()>,
        cup: impl FnOnce(&mut CupBracket) -> Result<MatchResult>,
    ) -> Result<MatchResult> {
        let mut m = self
            .store
            .match_by_id(match_id)
            .ok_or_else(|| LeagueError::MatchNotFound(match_id.to_string()))?;

        let updated = if m.cup_round_id.is_some() {
            let sc = self
                .store
                .season_competition(&m.season_competition_id)
                .ok_or_else(|| not_found("season competition", &m.season_competition_id))?;
            let mut bracket = self.bracket_of(&sc);
            let updated = cup(&mut bracket)?;
            if let Some(champion) = bracket.champion() {
                log::info!("Cup decided, winner: {}", champion);
            }
            updated
        } else {
            league(&mut m)?;
            m
        };

        self.store.put_match(updated.clone());
        Ok(updated)
    }
}

fn not_found(what: &str, id: &str) -> LeagueError {
    LeagueError::NotFound(format!("{what} {id}"))
}

fn ensure_participants(sc: &SeasonCompetition, pairings: &[Pairing]) -> Result<()> {
    let roster: HashSet<&ClubId> = sc.club_ids.iter().collect();
    match pairings
        .iter()
        .flat_map(|p| [&p.home_club_id, &p.away_club_id])
        .find(|club| !roster.contains(club))
    {
        Some(club) => Err(LeagueError::UnknownParticipant(club.clone())),
        None => Ok(()),
    }
}

fn empty_matchdays(sc: &SeasonCompetition) -> Result<Vec<Matchday>> {
    let n = sc.club_ids.len();
    if n == 0 {
        return Err(LeagueError::InvalidRoster);
    }
    let per_pass = if n % 2 == 0 { n - 1 } else { n };
    let total = if sc.has_double_round { per_pass * 2 } else { per_pass };

    Ok((1..=total as u32)
        .map(|number| Matchday {
            id: new_id("md"),
            season_competition_id: sc.id.clone(),
            number,
            name: matchday_name(number),
        })
        .collect())
}

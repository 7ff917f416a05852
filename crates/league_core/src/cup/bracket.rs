//! Round-to-round state of one cup competition in one season.
//!
//! The bracket is rebuilt from stored records, mutated by one operation and
//! hands back the records to persist. It never touches a store itself.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::decide::{advance_round, decide_match};
use super::draw::{
    create_round, create_round_from_pairings, fixtures_for_pairings, CupRoundDraft,
};
use super::seeding::SeedingPlan;
use super::stage::RoundNames;
use crate::error::{LeagueError, Result};
use crate::models::{ClubId, CupRound, MatchResult, Pairing};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CupPhase {
    NoRounds,
    RoundInProgress(u32),
    FinalDecided(ClubId),
}

#[derive(Debug, Clone)]
pub struct CupBracket {
    season_competition_id: String,
    rounds: Vec<CupRound>,
    matches: Vec<MatchResult>,
    names: RoundNames,
}

impl CupBracket {
    pub fn new(season_competition_id: &str) -> Self {
        Self {
            season_competition_id: season_competition_id.to_string(),
            rounds: Vec::new(),
            matches: Vec::new(),
            names: RoundNames::default(),
        }
    }

    /// Rebuild from stored records. Records of other competitions and
    /// matches outside the known rounds are dropped.
    pub fn from_records(
        season_competition_id: &str,
        rounds: Vec<CupRound>,
        matches: Vec<MatchResult>,
    ) -> Self {
        let mut rounds: Vec<CupRound> = rounds
            .into_iter()
            .filter(|r| r.season_competition_id == season_competition_id)
            .collect();
        rounds.sort_by_key(|r| r.number);

        let matches = matches
            .into_iter()
            .filter(|m| {
                m.cup_round_id.as_ref().is_some_and(|id| rounds.iter().any(|r| &r.id == id))
            })
            .collect();

        Self {
            season_competition_id: season_competition_id.to_string(),
            rounds,
            matches,
            names: RoundNames::default(),
        }
    }

    pub fn with_round_names(mut self, names: RoundNames) -> Self {
        self.names = names;
        self
    }

    pub fn season_competition_id(&self) -> &str {
        &self.season_competition_id
    }

    pub fn rounds(&self) -> &[CupRound] {
        &self.rounds
    }

    pub fn matches(&self) -> &[MatchResult] {
        &self.matches
    }

    /// The latest round by number.
    pub fn current_round(&self) -> Option<&CupRound> {
        self.rounds.last()
    }

    pub fn round_matches(&self, round_id: &str) -> Vec<&MatchResult> {
        self.matches.iter().filter(|m| m.cup_round_id.as_deref() == Some(round_id)).collect()
    }

    pub fn phase(&self) -> CupPhase {
        match self.current_round() {
            None => CupPhase::NoRounds,
            Some(round) => match self.champion() {
                Some(champion) => CupPhase::FinalDecided(champion),
                None => CupPhase::RoundInProgress(round.number),
            },
        }
    }

    /// Winner of a decided single-match current round.
    pub fn champion(&self) -> Option<ClubId> {
        let round = self.current_round()?;
        match self.round_matches(&round.id).as_slice() {
            [final_match] => decide_match(final_match).cloned(),
            _ => None,
        }
    }

    /// Every match of the current round has a winner.
    pub fn is_current_round_decided(&self) -> bool {
        self.current_round().is_some_and(|round| {
            let matches = self.round_matches(&round.id);
            !matches.is_empty() && matches.iter().all(|m| decide_match(m).is_some())
        })
    }

    /// Participants of the next round: the current round's winners.
    pub fn next_participants(&self) -> Result<Vec<ClubId>> {
        let round = self.current_round().ok_or(LeagueError::NoCurrentRound)?;
        if let Some(champion) = self.champion() {
            return Err(LeagueError::CupFinished { champion });
        }
        advance_round(round, &self.matches)
    }

    /// Draw round 1.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        participants: &[ClubId],
        seeding: &SeedingPlan,
        rng: &mut R,
    ) -> Result<CupRoundDraft> {
        self.ensure_not_started()?;
        let pots = seeding.pots_for(1, participants);
        let draft = create_round(
            &self.season_competition_id,
            1,
            &self.names.name_for(1),
            participants,
            pots.as_ref(),
            rng,
        )?;
        Ok(self.push_round(draft))
    }

    /// Round 1 from explicit pairings.
    pub fn start_with_pairings(&mut self, pairings: &[Pairing]) -> Result<CupRoundDraft> {
        self.ensure_not_started()?;
        let draft = create_round_from_pairings(
            &self.season_competition_id,
            1,
            &self.names.name_for(1),
            pairings,
        )?;
        Ok(self.push_round(draft))
    }

    /// Draw the next round from the current round's winners.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        seeding: &SeedingPlan,
        rng: &mut R,
    ) -> Result<CupRoundDraft> {
        let winners = self.next_participants()?;
        let number = self.next_number();
        let pots = seeding.pots_for(number, &winners);
        let draft = create_round(
            &self.season_competition_id,
            number,
            &self.names.name_for(number),
            &winners,
            pots.as_ref(),
            rng,
        )?;
        Ok(self.push_round(draft))
    }

    /// Next round from explicit pairings. The current round must be decided.
    pub fn advance_with_pairings(&mut self, pairings: &[Pairing]) -> Result<CupRoundDraft> {
        self.next_participants()?;
        let number = self.next_number();
        let draft = create_round_from_pairings(
            &self.season_competition_id,
            number,
            &self.names.name_for(number),
            pairings,
        )?;
        Ok(self.push_round(draft))
    }

    /// Replace the current round's pairings. Its recorded results are
    /// discarded; earlier rounds stay untouched.
    pub fn edit_current_round(&mut self, pairings: &[Pairing]) -> Result<CupRoundDraft> {
        let round = self.current_round().cloned().ok_or(LeagueError::NoCurrentRound)?;
        let matches = fixtures_for_pairings(&round, pairings)?;

        let removed_match_ids: Vec<String> = self
            .matches
            .iter()
            .filter(|m| m.cup_round_id.as_deref() == Some(round.id.as_str()))
            .map(|m| m.id.clone())
            .collect();
        self.matches.retain(|m| m.cup_round_id.as_deref() != Some(round.id.as_str()));
        self.matches.extend(matches.iter().cloned());

        log::info!("Re-paired {} ({} match(es) replaced)", round.name, removed_match_ids.len());
        Ok(CupRoundDraft { round, matches, removed_match_ids })
    }

    /// Score a match of the current round. Earlier rounds are closed.
    pub fn record_score(
        &mut self,
        match_id: &str,
        home: u32,
        away: u32,
        played_at: Option<i64>,
    ) -> Result<MatchResult> {
        let m = self.current_match_mut(match_id)?;
        m.record_score(home, away, played_at);
        Ok(m.clone())
    }

    pub fn record_penalties(
        &mut self,
        match_id: &str,
        home: u32,
        away: u32,
    ) -> Result<MatchResult> {
        let m = self.current_match_mut(match_id)?;
        m.record_penalties(home, away)?;
        Ok(m.clone())
    }

    pub fn clear_score(&mut self, match_id: &str) -> Result<MatchResult> {
        let m = self.current_match_mut(match_id)?;
        m.clear_score();
        Ok(m.clone())
    }

    fn current_match_mut(&mut self, match_id: &str) -> Result<&mut MatchResult> {
        let current = self
            .current_round()
            .map(|r| r.id.clone())
            .ok_or(LeagueError::NoCurrentRound)?;
        let m = self
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| LeagueError::MatchNotFound(match_id.to_string()))?;

        if m.cup_round_id.as_deref() != Some(current.as_str()) {
            return Err(LeagueError::InvalidScore(format!(
                "match {} belongs to a closed round",
                match_id
            )));
        }
        Ok(m)
    }

    fn ensure_not_started(&self) -> Result<()> {
        if self.rounds.is_empty() {
            Ok(())
        } else {
            Err(LeagueError::CupAlreadyStarted { rounds: self.rounds.len() })
        }
    }

    fn next_number(&self) -> u32 {
        self.current_round().map_or(1, |r| r.number + 1)
    }

    fn push_round(&mut self, draft: CupRoundDraft) -> CupRoundDraft {
        log::info!(
            "Created cup round {} '{}' with {} match(es)",
            draft.round.number,
            draft.round.name,
            draft.matches.len()
        );
        self.rounds.push(draft.round.clone());
        self.matches.extend(draft.matches.iter().cloned());
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cup::seeding::PotRule;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    fn clubs(n: usize) -> Vec<ClubId> {
        (0..n).map(|i| ClubId::new(format!("club_{i:02}"))).collect()
    }

    /// Home side wins every match of the current round.
    fn play_round(bracket: &mut CupBracket) {
        let round_id = bracket.current_round().unwrap().id.clone();
        let ids: Vec<String> =
            bracket.round_matches(&round_id).iter().map(|m| m.id.clone()).collect();
        for id in ids {
            bracket.record_score(&id, 2, 1, None).unwrap();
        }
    }

    #[test]
    fn test_full_cup_to_champion() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut bracket = CupBracket::new("sc_cup");
        assert_eq!(bracket.phase(), CupPhase::NoRounds);
        assert_eq!(bracket.next_participants(), Err(LeagueError::NoCurrentRound));

        let first = bracket.start(&clubs(16), &SeedingPlan::free(), &mut rng).unwrap();
        assert_eq!(first.round.name, "1. Runde");
        assert_eq!(first.matches.len(), 8);
        assert_eq!(bracket.phase(), CupPhase::RoundInProgress(1));

        let mut expected_sizes = vec![4, 2, 1].into_iter();
        loop {
            play_round(&mut bracket);
            if let CupPhase::FinalDecided(champion) = bracket.phase() {
                let final_round = bracket.current_round().unwrap();
                assert_eq!(final_round.number, 4);
                assert_eq!(final_round.name, "Viertelfinale");
                assert_eq!(bracket.advance(&SeedingPlan::free(), &mut rng).unwrap_err(),
                    LeagueError::CupFinished { champion });
                break;
            }
            let draft = bracket.advance(&SeedingPlan::free(), &mut rng).unwrap();
            assert_eq!(draft.matches.len(), expected_sizes.next().unwrap());
        }
        assert_eq!(bracket.rounds().len(), 4);
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut bracket = CupBracket::new("sc_cup");
        bracket.start(&clubs(4), &SeedingPlan::free(), &mut rng).unwrap();
        assert_eq!(
            bracket.start_with_pairings(&[Pairing::new("a", "b")]).unwrap_err(),
            LeagueError::CupAlreadyStarted { rounds: 1 }
        );
    }

    #[test]
    fn test_advance_requires_decided_round() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut bracket = CupBracket::new("sc_cup");
        let draft = bracket.start(&clubs(4), &SeedingPlan::free(), &mut rng).unwrap();
        let tied = draft.matches[0].id.clone();
        bracket.record_score(&tied, 1, 1, None).unwrap();

        assert!(!bracket.is_current_round_decided());
        assert_eq!(
            bracket.advance(&SeedingPlan::free(), &mut rng).unwrap_err(),
            LeagueError::RoundNotComplete { round: 1, undecided: 2 }
        );

        bracket.record_penalties(&tied, 3, 5).unwrap();
        bracket.record_score(&draft.matches[1].id, 0, 1, None).unwrap();
        assert!(bracket.is_current_round_decided());

        let winners = bracket.next_participants().unwrap();
        assert_eq!(winners[0], draft.matches[0].away_club_id);
        assert_eq!(winners[1], draft.matches[1].away_club_id);
    }

    #[test]
    fn test_second_round_uses_pots() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let pros = clubs(4);
        let amateurs: Vec<ClubId> = (0..4).map(|i| ClubId::new(format!("amateur_{i}"))).collect();
        let rules = vec![PotRule { round: 2, tiers: vec!["pro".into()], limit_last_tier: None }];
        let rosters = HashMap::from([("pro".to_string(), pros.clone())]);
        let plan = SeedingPlan::resolve(&rules, &rosters).unwrap();

        // Round 1: each amateur meets another amateur, each pro a pro.
        let mut bracket = CupBracket::new("sc_cup");
        let pairings = vec![
            Pairing::new(amateurs[0].clone(), amateurs[1].clone()),
            Pairing::new(amateurs[2].clone(), amateurs[3].clone()),
            Pairing::new(pros[0].clone(), pros[1].clone()),
            Pairing::new(pros[2].clone(), pros[3].clone()),
        ];
        bracket.start_with_pairings(&pairings).unwrap();
        play_round(&mut bracket);

        let second = bracket.advance(&plan, &mut rng).unwrap();
        assert_eq!(second.matches.len(), 2);
        for m in &second.matches {
            assert!(m.home_club_id.as_str().starts_with("amateur_"));
            assert!(m.away_club_id.as_str().starts_with("club_"));
        }
    }

    #[test]
    fn test_edit_current_round_discards_results() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut bracket = CupBracket::new("sc_cup");
        let first = bracket.start(&clubs(4), &SeedingPlan::free(), &mut rng).unwrap();
        play_round(&mut bracket);
        let second = bracket.advance(&SeedingPlan::free(), &mut rng).unwrap();
        bracket.record_score(&second.matches[0].id, 3, 0, None).unwrap();

        let swapped = Pairing::new(
            second.matches[0].away_club_id.clone(),
            second.matches[0].home_club_id.clone(),
        );
        let edited = bracket.edit_current_round(&[swapped]).unwrap();

        assert_eq!(edited.round, second.round);
        assert_eq!(edited.removed_match_ids, vec![second.matches[0].id.clone()]);
        assert!(!edited.matches[0].is_played());
        assert_eq!(bracket.phase(), CupPhase::RoundInProgress(2));

        // Round 1 keeps its results and is closed for edits.
        assert_eq!(bracket.round_matches(&first.round.id).len(), 2);
        assert!(bracket.round_matches(&first.round.id).iter().all(|m| m.is_played()));
        assert!(matches!(
            bracket.clear_score(&first.matches[0].id),
            Err(LeagueError::InvalidScore(_))
        ));
    }

    #[test]
    fn test_manual_next_round() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut bracket = CupBracket::new("sc_cup");
        bracket.start(&clubs(4), &SeedingPlan::free(), &mut rng).unwrap();
        assert!(bracket.advance_with_pairings(&[Pairing::new("x", "y")]).is_err());

        play_round(&mut bracket);
        let winners = bracket.next_participants().unwrap();
        let draft = bracket
            .advance_with_pairings(&[Pairing::new(winners[1].clone(), winners[0].clone())])
            .unwrap();
        assert_eq!(draft.round.number, 2);
        assert_eq!(draft.round.name, "2. Runde");

        bracket.record_score(&draft.matches[0].id, 0, 0, None).unwrap();
        assert_eq!(bracket.champion(), None);
        bracket.record_penalties(&draft.matches[0].id, 4, 3).unwrap();
        assert_eq!(bracket.champion(), Some(winners[1].clone()));
    }

    #[test]
    fn test_from_records_filters_foreign_data() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut bracket = CupBracket::new("sc_cup");
        let draft = bracket.start(&clubs(4), &SeedingPlan::free(), &mut rng).unwrap();

        let mut foreign_round = draft.round.clone();
        foreign_round.id = "cr_other".into();
        foreign_round.season_competition_id = "sc_other".into();
        let league_match =
            MatchResult::fixture("m_league".into(), "sc_cup", "a".into(), "b".into(), false);

        let mut matches = draft.matches.clone();
        matches.push(league_match);
        let rounds = vec![foreign_round, draft.round.clone()];
        let rebuilt = CupBracket::from_records("sc_cup", rounds, matches);

        assert_eq!(rebuilt.rounds().len(), 1);
        assert_eq!(rebuilt.matches().len(), 2);
        assert_eq!(rebuilt.phase(), CupPhase::RoundInProgress(1));
    }
}

//! Random and manual cup draws.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{LeagueError, Result};
use crate::models::{new_id, ClubId, CupRound, MatchResult, Pairing};

/// Two disjoint seeding pots. `home` clubs host `away` clubs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pots {
    pub home: Vec<ClubId>,
    pub away: Vec<ClubId>,
}

impl Pots {
    pub fn len(&self) -> usize {
        self.home.len() + self.away.len()
    }

    pub fn is_empty(&self) -> bool {
        self.home.is_empty() && self.away.is_empty()
    }
}

/// New or rewritten round, returned for the caller to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CupRoundDraft {
    pub round: CupRound,
    pub matches: Vec<MatchResult>,
    /// Matches the caller must delete (round edits only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_match_ids: Vec<String>,
}

/// Draw one cup round.
///
/// Without pots all clubs are shuffled and paired 0-1, 2-3, ... and an odd
/// count is rejected. With pots each pot is shuffled, `home[i]` hosts
/// `away[i]`, and whatever is left of the larger pot is reshuffled and paired
/// among itself. An odd pot total leaves one of those clubs without a match.
/// `participants` is ignored when pots are given.
pub fn create_round<R: Rng + ?Sized>(
    season_competition_id: &str,
    number: u32,
    name: &str,
    participants: &[ClubId],
    pots: Option<&Pots>,
    rng: &mut R,
) -> Result<CupRoundDraft> {
    let round = new_round(season_competition_id, number, name);

    let pairs = match pots {
        Some(pots) => {
            ensure_unique(pots.home.iter().chain(pots.away.iter()))?;
            if pots.len() < 2 {
                return Err(LeagueError::InvalidParticipants { count: pots.len() });
            }
            let (pairs, unpaired) = draw_with_pots(pots, rng);
            if let Some(club) = unpaired {
                log::warn!(
                    "{}: odd pot total ({}), {} left without a match",
                    name,
                    pots.len(),
                    club
                );
            }
            pairs
        }
        None => {
            ensure_unique(participants.iter())?;
            if participants.len() < 2 || participants.len() % 2 == 1 {
                return Err(LeagueError::InvalidParticipants { count: participants.len() });
            }
            let mut clubs = participants.to_vec();
            clubs.shuffle(rng);
            pair_consecutive(clubs)
        }
    };

    let matches = pairs
        .into_iter()
        .map(|(home, away)| knockout_fixture(&round, home, away))
        .collect::<Vec<_>>();

    log::debug!(
        "Drew {} ({} matches, pots: {})",
        round.name,
        matches.len(),
        pots.is_some()
    );

    Ok(CupRoundDraft { round, matches, removed_match_ids: Vec::new() })
}

/// Build a round from an explicit pairing list instead of a draw.
pub fn create_round_from_pairings(
    season_competition_id: &str,
    number: u32,
    name: &str,
    pairings: &[Pairing],
) -> Result<CupRoundDraft> {
    let round = new_round(season_competition_id, number, name);
    let matches = fixtures_for_pairings(&round, pairings)?;
    Ok(CupRoundDraft { round, matches, removed_match_ids: Vec::new() })
}

/// Validate `pairings` and turn them into unscored fixtures of `round`.
pub fn fixtures_for_pairings(round: &CupRound, pairings: &[Pairing]) -> Result<Vec<MatchResult>> {
    if pairings.is_empty() {
        return Err(LeagueError::InvalidParticipants { count: 0 });
    }
    ensure_unique(pairings.iter().flat_map(|p| [&p.home_club_id, &p.away_club_id]))?;

    Ok(pairings
        .iter()
        .map(|p| knockout_fixture(round, p.home_club_id.clone(), p.away_club_id.clone()))
        .collect())
}

/// Cross-pot pairs first, then the leftovers among themselves. Returns the
/// club left over when the total is odd.
fn draw_with_pots<R: Rng + ?Sized>(
    pots: &Pots,
    rng: &mut R,
) -> (Vec<(ClubId, ClubId)>, Option<ClubId>) {
    let mut home = pots.home.clone();
    let mut away = pots.away.clone();
    home.shuffle(rng);
    away.shuffle(rng);

    let cross = home.len().min(away.len());
    let mut rest: Vec<ClubId> = home.split_off(cross);
    rest.extend(away.split_off(cross));

    let mut pairs: Vec<(ClubId, ClubId)> = home.into_iter().zip(away).collect();
    rest.shuffle(rng);
    let unpaired = if rest.len() % 2 == 1 { rest.pop() } else { None };
    pairs.extend(pair_consecutive(rest));
    (pairs, unpaired)
}

fn pair_consecutive(clubs: Vec<ClubId>) -> Vec<(ClubId, ClubId)> {
    let mut iter = clubs.into_iter();
    let mut pairs = Vec::new();
    while let (Some(home), Some(away)) = (iter.next(), iter.next()) {
        pairs.push((home, away));
    }
    pairs
}

fn ensure_unique<'a>(clubs: impl Iterator<Item = &'a ClubId>) -> Result<()> {
    let mut seen = HashSet::new();
    for club in clubs {
        if !seen.insert(club) {
            return Err(LeagueError::DuplicateParticipant(club.clone()));
        }
    }
    Ok(())
}

fn new_round(season_competition_id: &str, number: u32, name: &str) -> CupRound {
    CupRound {
        id: new_id("cr"),
        season_competition_id: season_competition_id.to_string(),
        number,
        name: name.to_string(),
    }
}

fn knockout_fixture(round: &CupRound, home: ClubId, away: ClubId) -> MatchResult {
    let mut m = MatchResult::fixture(new_id("m"), &round.season_competition_id, home, away, true);
    m.cup_round_id = Some(round.id.clone());
    m
}

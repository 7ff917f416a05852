use std::cmp::Ordering;

use crate::error::{LeagueError, Result};
use crate::models::{ClubId, CupRound, MatchResult};

/// Winner of a match, or `None` while undecided.
///
/// Regulation goals decide first. A tie is settled only for knockout
/// matches with both penalty counts present; tied penalties stay undecided.
pub fn decide_match(m: &MatchResult) -> Option<&ClubId> {
    let (home, away) = m.score()?;
    match home.cmp(&away) {
        Ordering::Greater => Some(&m.home_club_id),
        Ordering::Less => Some(&m.away_club_id),
        Ordering::Equal => {
            if !m.is_knockout {
                return None;
            }
            let (home_pen, away_pen) = m.penalties()?;
            match home_pen.cmp(&away_pen) {
                Ordering::Greater => Some(&m.home_club_id),
                Ordering::Less => Some(&m.away_club_id),
                Ordering::Equal => None,
            }
        }
    }
}

pub fn is_round_played(matches: &[MatchResult]) -> bool {
    matches.iter().all(MatchResult::is_played)
}

pub fn is_round_decided(matches: &[MatchResult]) -> bool {
    matches.iter().all(|m| decide_match(m).is_some())
}

/// Winners of `round`, in match order, as the next round's participants.
///
/// `matches` may hold other rounds' matches; only those of `round` count.
pub fn advance_round(round: &CupRound, matches: &[MatchResult]) -> Result<Vec<ClubId>> {
    let round_matches: Vec<&MatchResult> =
        matches.iter().filter(|m| m.cup_round_id.as_deref() == Some(round.id.as_str())).collect();

    let undecided = round_matches.iter().filter(|m| decide_match(m).is_none()).count();
    if undecided > 0 || round_matches.is_empty() {
        return Err(LeagueError::RoundNotComplete { round: round.number, undecided });
    }

    Ok(round_matches.into_iter().filter_map(decide_match).cloned().collect())
}

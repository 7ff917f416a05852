//! Round-robin schedule generation (circle method).

use serde::{Deserialize, Serialize};

use crate::error::{LeagueError, Result};
use crate::models::{new_id, ClubId, MatchResult, Matchday};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSchedule {
    pub matchdays: Vec<Matchday>,
    pub matches: Vec<MatchResult>,
}

impl GeneratedSchedule {
    pub fn matches_on(&self, matchday_id: &str) -> impl Iterator<Item = &MatchResult> + '_ {
        let matchday_id = matchday_id.to_string();
        self.matches.iter().filter(move |m| m.matchday_id.as_deref() == Some(matchday_id.as_str()))
    }
}

pub fn matchday_name(number: u32) -> String {
    format!("Spieltag {}", number)
}

/// Generate the full league schedule for `roster`.
///
/// Odd rosters get a bye slot; pairings with the bye are dropped. With
/// `double_round` a second pass over the initial order follows with home
/// and away swapped, numbered after the first pass.
pub fn generate_schedule(
    season_competition_id: &str,
    roster: &[ClubId],
    double_round: bool,
) -> Result<GeneratedSchedule> {
    if roster.is_empty() {
        return Err(LeagueError::InvalidRoster);
    }

    // None is the bye slot.
    let mut slots: Vec<Option<&ClubId>> = roster.iter().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }

    let mut schedule = GeneratedSchedule::default();
    let rounds = (slots.len() - 1) as u32;

    make_pass(season_competition_id, &slots, false, 1, &mut schedule);
    if double_round {
        make_pass(season_competition_id, &slots, true, rounds + 1, &mut schedule);
    }

    log::debug!(
        "Generated {} matchdays / {} matches for {} clubs (double round: {})",
        schedule.matchdays.len(),
        schedule.matches.len(),
        roster.len(),
        double_round
    );

    Ok(schedule)
}

fn make_pass(
    season_competition_id: &str,
    slots: &[Option<&ClubId>],
    reverse: bool,
    start_number: u32,
    schedule: &mut GeneratedSchedule,
) {
    let n = slots.len();
    let mut arr = slots.to_vec();

    for r in 0..n.saturating_sub(1) {
        let number = start_number + r as u32;
        let matchday = Matchday {
            id: new_id("md"),
            season_competition_id: season_competition_id.to_string(),
            number,
            name: matchday_name(number),
        };

        for i in 0..n / 2 {
            let (Some(a), Some(b)) = (arr[i], arr[n - 1 - i]) else {
                continue;
            };

            let (mut home, mut away) = if (r + i) % 2 == 0 { (a, b) } else { (b, a) };
            if reverse {
                std::mem::swap(&mut home, &mut away);
            }

            let mut fixture = MatchResult::fixture(
                new_id("m"),
                season_competition_id,
                home.clone(),
                away.clone(),
                false,
            );
            fixture.matchday_id = Some(matchday.id.clone());
            schedule.matches.push(fixture);
        }

        schedule.matchdays.push(matchday);

        // Keep index 0 fixed, last element moves to index 1.
        if n > 2 {
            arr[1..].rotate_right(1);
        }
    }
}

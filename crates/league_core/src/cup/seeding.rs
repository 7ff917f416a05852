//! Pot construction for the rounds that use a two-pot draw.
//!
//! Which rounds are potted, and which clubs form the away ("professional")
//! pot, is configuration. The default reproduces the German cup: round 1
//! puts the whole first tier plus the top 14 of the second tier in the away
//! pot, round 2 puts every surviving first or second tier club there, and
//! later rounds are free draws.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::draw::Pots;
use crate::error::{LeagueError, Result};
use crate::models::ClubId;

/// Configured pot rule, referencing league competitions by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotRule {
    /// Cup round number the rule applies to.
    pub round: u32,
    /// League competitions whose rosters make up the away pot, in tier order.
    pub tiers: Vec<String>,
    /// Take only the first N clubs of the last tier's roster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_last_tier: Option<usize>,
}

/// Pot rules resolved against one season's league rosters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedingPlan {
    away_pots: BTreeMap<u32, HashSet<ClubId>>,
}

impl SeedingPlan {
    /// No potted rounds: every round is a free draw.
    pub fn free() -> Self {
        Self::default()
    }

    pub fn resolve(rules: &[PotRule], rosters: &HashMap<String, Vec<ClubId>>) -> Result<Self> {
        let mut away_pots = BTreeMap::new();

        for rule in rules {
            let mut pot = HashSet::new();
            for (i, tier) in rule.tiers.iter().enumerate() {
                let roster = rosters.get(tier).ok_or_else(|| {
                    LeagueError::Config(format!(
                        "pot rule for round {} uses unknown tier {}",
                        rule.round, tier
                    ))
                })?;
                let take = match rule.limit_last_tier {
                    Some(limit) if i + 1 == rule.tiers.len() => limit.min(roster.len()),
                    _ => roster.len(),
                };
                pot.extend(roster[..take].iter().cloned());
            }
            away_pots.insert(rule.round, pot);
        }

        Ok(Self { away_pots })
    }

    pub fn is_potted(&self, round: u32) -> bool {
        self.away_pots.contains_key(&round)
    }

    /// Split `participants` into pots for `round`, keeping their order.
    ///
    /// `None` when the round is a free draw or either pot would be empty.
    pub fn pots_for(&self, round: u32, participants: &[ClubId]) -> Option<Pots> {
        let away_pot = self.away_pots.get(&round)?;
        let (away, home): (Vec<ClubId>, Vec<ClubId>) =
            participants.iter().cloned().partition(|club| away_pot.contains(club));

        if home.is_empty() || away.is_empty() {
            return None;
        }
        Some(Pots { home, away })
    }
}

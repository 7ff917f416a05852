//! Promotion/relegation proposals and table colour zones.
//!
//! Nothing here moves clubs between leagues. The proposal is a suggestion the
//! caller applies when building the next season's rosters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::ClubId;
use crate::standings::StandingRow;

/// Movement between two adjacent tiers, referenced by competition id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRule {
    pub upper: String,
    pub lower: String,
    /// Clubs swapping places directly, each way.
    pub direct: usize,
    /// Upper place `len - direct` meets lower place `direct + 1`.
    #[serde(default)]
    pub playoff: bool,
    /// Lower-tier places from this one down are flagged, not moved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_relegation: Option<usize>,
}

impl PromotionRule {
    fn places_needed(&self) -> usize {
        self.direct + usize::from(self.playoff)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub club_id: ClubId,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffSide {
    pub club_id: ClubId,
    pub competition: String,
    /// 1-based table position.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffPairing {
    pub higher: PlayoffSide,
    pub lower: PlayoffSide,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionProposal {
    pub direct_promotions: Vec<Transfer>,
    pub direct_relegations: Vec<Transfer>,
    pub playoffs: Vec<PlayoffPairing>,
    pub marked_relegation: Vec<ClubId>,
}

impl PromotionProposal {
    pub fn is_empty(&self) -> bool {
        self.direct_promotions.is_empty()
            && self.direct_relegations.is_empty()
            && self.playoffs.is_empty()
            && self.marked_relegation.is_empty()
    }
}

/// Build a proposal from final tables keyed by competition id.
///
/// A rule is skipped when either table is missing or too short for it.
pub fn compute_promotion_proposal(
    rules: &[PromotionRule],
    tables: &HashMap<String, Vec<StandingRow>>,
) -> PromotionProposal {
    let mut proposal = PromotionProposal::default();

    for rule in rules {
        let (Some(upper), Some(lower)) = (tables.get(&rule.upper), tables.get(&rule.lower)) else {
            continue;
        };
        let needed = rule.places_needed();
        if needed == 0 || upper.len() < needed || lower.len() < needed {
            log::debug!(
                "Skipping promotion rule {} -> {}: tables too short",
                rule.lower,
                rule.upper
            );
            continue;
        }

        for row in &upper[upper.len() - rule.direct..] {
            proposal.direct_relegations.push(Transfer {
                club_id: row.club_id.clone(),
                from: rule.upper.clone(),
                to: rule.lower.clone(),
            });
        }
        for row in &lower[..rule.direct] {
            proposal.direct_promotions.push(Transfer {
                club_id: row.club_id.clone(),
                from: rule.lower.clone(),
                to: rule.upper.clone(),
            });
        }

        if rule.playoff {
            let higher_pos = upper.len() - rule.direct;
            let lower_pos = rule.direct + 1;
            proposal.playoffs.push(PlayoffPairing {
                higher: PlayoffSide {
                    club_id: upper[higher_pos - 1].club_id.clone(),
                    competition: rule.upper.clone(),
                    position: higher_pos,
                },
                lower: PlayoffSide {
                    club_id: lower[lower_pos - 1].club_id.clone(),
                    competition: rule.lower.clone(),
                    position: lower_pos,
                },
            });
        }

        if let Some(from) = rule.marked_relegation {
            let start = from.saturating_sub(1);
            proposal
                .marked_relegation
                .extend(lower.iter().skip(start).map(|r| r.club_id.clone()));
        }
    }

    proposal
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableZone {
    ChampionsLeague,
    EuropaLeague,
    ConferenceLeague,
    Promotion,
    PromotionPlayoff,
    RelegationPlayoff,
    Relegation,
    MarkedRelegation,
}

impl TableZone {
    pub fn label(self) -> &'static str {
        match self {
            TableZone::ChampionsLeague => "Champions League",
            TableZone::EuropaLeague => "Europa League",
            TableZone::ConferenceLeague => "Conference League",
            TableZone::Promotion => "Aufstieg",
            TableZone::PromotionPlayoff => "Relegation (Aufstieg)",
            TableZone::RelegationPlayoff => "Relegation (Abstieg)",
            TableZone::Relegation => "Abstieg",
            TableZone::MarkedRelegation => "Abstiegsplätze (markiert)",
        }
    }

    /// Single-character marker for plain-text tables.
    pub fn marker(self) -> char {
        match self {
            TableZone::ChampionsLeague
            | TableZone::EuropaLeague
            | TableZone::ConferenceLeague => '*',
            TableZone::Promotion => '+',
            TableZone::PromotionPlayoff | TableZone::RelegationPlayoff => '~',
            TableZone::Relegation => '-',
            TableZone::MarkedRelegation => '.',
        }
    }
}

/// Positions of one competition that share a zone.
///
/// Positions are 1-based from the top; negative values count from the
/// bottom, so `-1` is the last place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRule {
    pub competition: String,
    pub zone: TableZone,
    pub from: i32,
    pub to: i32,
}

impl ZoneRule {
    pub fn new(competition: &str, zone: TableZone, from: i32, to: i32) -> Self {
        Self { competition: competition.to_string(), zone, from, to }
    }

    fn covers(&self, position: usize, total: usize) -> bool {
        let resolve = |p: i32| -> i64 {
            if p < 0 {
                total as i64 + 1 + p as i64
            } else {
                p as i64
            }
        };
        let pos = position as i64;
        resolve(self.from) <= pos && pos <= resolve(self.to)
    }
}

/// Zone of a table position. The first matching rule wins.
pub fn zone_for(
    rules: &[ZoneRule],
    competition: &str,
    position: usize,
    total: usize,
) -> Option<TableZone> {
    if position == 0 || position > total {
        return None;
    }
    rules
        .iter()
        .filter(|r| r.competition == competition)
        .find(|r| r.covers(position, total))
        .map(|r| r.zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(prefix: &str, n: usize) -> Vec<StandingRow> {
        (1..=n).map(|i| StandingRow::empty(ClubId::new(format!("{prefix}{i}")))).collect()
    }

    fn german_rules() -> Vec<PromotionRule> {
        vec![
            PromotionRule {
                upper: "bl1".into(),
                lower: "bl2".into(),
                direct: 2,
                playoff: true,
                marked_relegation: None,
            },
            PromotionRule {
                upper: "bl2".into(),
                lower: "liga3".into(),
                direct: 2,
                playoff: true,
                marked_relegation: Some(17),
            },
        ]
    }

    #[test]
    fn test_full_pyramid_proposal() {
        let tables = HashMap::from([
            ("bl1".to_string(), table("a", 18)),
            ("bl2".to_string(), table("b", 18)),
            ("liga3".to_string(), table("c", 20)),
        ]);
        let p = compute_promotion_proposal(&german_rules(), &tables);

        let down: Vec<&str> = p.direct_relegations.iter().map(|t| t.club_id.as_str()).collect();
        assert_eq!(down, vec!["a17", "a18", "b17", "b18"]);
        let up: Vec<&str> = p.direct_promotions.iter().map(|t| t.club_id.as_str()).collect();
        assert_eq!(up, vec!["b1", "b2", "c1", "c2"]);

        assert_eq!(p.playoffs.len(), 2);
        assert_eq!(p.playoffs[0].higher.club_id, ClubId::from("a16"));
        assert_eq!(p.playoffs[0].higher.position, 16);
        assert_eq!(p.playoffs[0].lower.club_id, ClubId::from("b3"));
        assert_eq!(p.playoffs[1].lower.competition, "liga3");

        let marked: Vec<&str> = p.marked_relegation.iter().map(|c| c.as_str()).collect();
        assert_eq!(marked, vec!["c17", "c18", "c19", "c20"]);
    }

    #[test]
    fn test_short_or_missing_tables_skip_rule() {
        let tables = HashMap::from([
            ("bl1".to_string(), table("a", 18)),
            ("bl2".to_string(), table("b", 2)),
        ]);
        let p = compute_promotion_proposal(&german_rules(), &tables);
        assert!(p.is_empty());
    }

    fn zones() -> Vec<ZoneRule> {
        vec![
            ZoneRule::new("1-bundesliga", TableZone::ChampionsLeague, 1, 4),
            ZoneRule::new("1-bundesliga", TableZone::EuropaLeague, 5, 5),
            ZoneRule::new("1-bundesliga", TableZone::RelegationPlayoff, 16, 16),
            ZoneRule::new("1-bundesliga", TableZone::Relegation, 17, -1),
            ZoneRule::new("3-liga", TableZone::MarkedRelegation, -4, -1),
        ]
    }

    #[test]
    fn test_zone_lookup() {
        let rules = zones();
        assert_eq!(zone_for(&rules, "1-bundesliga", 1, 18), Some(TableZone::ChampionsLeague));
        assert_eq!(zone_for(&rules, "1-bundesliga", 5, 18), Some(TableZone::EuropaLeague));
        assert_eq!(zone_for(&rules, "1-bundesliga", 10, 18), None);
        assert_eq!(zone_for(&rules, "1-bundesliga", 16, 18), Some(TableZone::RelegationPlayoff));
        assert_eq!(zone_for(&rules, "1-bundesliga", 18, 18), Some(TableZone::Relegation));
        assert_eq!(zone_for(&rules, "1-bundesliga", 19, 18), None);

        assert_eq!(zone_for(&rules, "3-liga", 16, 20), None);
        assert_eq!(zone_for(&rules, "3-liga", 17, 20), Some(TableZone::MarkedRelegation));
        assert_eq!(zone_for(&rules, "unknown", 1, 18), None);
    }

    #[test]
    fn test_zone_serde_names() {
        let json = serde_json::to_string(&TableZone::RelegationPlayoff).unwrap();
        assert_eq!(json, "\"relegation-playoff\"");
    }
}

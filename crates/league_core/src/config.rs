//! League configuration.
//!
//! Competitions, scoring, cup naming and seeding, promotion and table zones
//! all live here. The default carries the structure of the German pyramid
//! (three leagues and the DFB-Pokal) without any clubs.
//! [`LeagueConfig::quick_start`] adds the 2025/26 catalogue and rosters.
//!
//! ## Environment Variables
//!
//! - `LEAGUE_CONFIG_PATH`: YAML (`.yaml`/`.yml`) or JSON config file. Unset or
//!   empty selects the defaults.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::Path;

use crate::cup::{PotRule, RoundNames};
use crate::error::{LeagueError, Result};
use crate::models::{Club, ClubId, Competition, CompetitionKind, PointsConfig};
use crate::relegation::{PromotionRule, TableZone, ZoneRule};

pub const CONFIG_PATH_ENV: &str = "LEAGUE_CONFIG_PATH";

const QUICK_START_YAML: &str = include_str!("../data/german_pyramid.yaml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CupConfig {
    pub round_names: RoundNames,
    pub pot_rules: Vec<PotRule>,
}

impl Default for CupConfig {
    fn default() -> Self {
        Self {
            round_names: RoundNames::default(),
            pot_rules: vec![
                PotRule {
                    round: 1,
                    tiers: vec![BL1.to_string(), BL2.to_string()],
                    limit_last_tier: Some(14),
                },
                PotRule {
                    round: 2,
                    tiers: vec![BL1.to_string(), BL2.to_string()],
                    limit_last_tier: None,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    pub competitions: Vec<Competition>,
    pub default_points: PointsConfig,
    /// Leagues play home and away.
    pub double_round: bool,
    pub cup: CupConfig,
    pub promotion: Vec<PromotionRule>,
    pub zones: Vec<ZoneRule>,
    /// Optional club catalogue used when seeding a fresh store.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clubs: Vec<Club>,
    /// Competition id → starting roster.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rosters: BTreeMap<String, Vec<ClubId>>,
}

const BL1: &str = "comp_1bl";
const BL2: &str = "comp_2bl";
const LIGA3: &str = "comp_3bl";
const POKAL: &str = "comp_dfb";

fn competition(
    id: &str,
    name: &str,
    short_name: &str,
    kind: CompetitionKind,
    slug: &str,
    sort_order: u32,
) -> Competition {
    Competition {
        id: id.to_string(),
        name: name.to_string(),
        short_name: short_name.to_string(),
        kind,
        slug: slug.to_string(),
        sort_order,
    }
}

impl Default for LeagueConfig {
    fn default() -> Self {
        use CompetitionKind::{Cup, League};
        use TableZone::*;

        Self {
            competitions: vec![
                competition(BL1, "1. Bundesliga", "1. BL", League, "1-bundesliga", 1),
                competition(BL2, "2. Bundesliga", "2. BL", League, "2-bundesliga", 2),
                competition(LIGA3, "3. Liga", "3. Liga", League, "3-liga", 3),
                competition(POKAL, "DFB-Pokal", "DFB-Pokal", Cup, "dfb-pokal", 4),
            ],
            default_points: PointsConfig::default(),
            double_round: true,
            cup: CupConfig::default(),
            promotion: vec![
                PromotionRule {
                    upper: BL1.to_string(),
                    lower: BL2.to_string(),
                    direct: 2,
                    playoff: true,
                    marked_relegation: None,
                },
                PromotionRule {
                    upper: BL2.to_string(),
                    lower: LIGA3.to_string(),
                    direct: 2,
                    playoff: true,
                    marked_relegation: Some(17),
                },
            ],
            zones: vec![
                ZoneRule::new("1-bundesliga", ChampionsLeague, 1, 4),
                ZoneRule::new("1-bundesliga", EuropaLeague, 5, 5),
                ZoneRule::new("1-bundesliga", ConferenceLeague, 6, 6),
                ZoneRule::new("1-bundesliga", RelegationPlayoff, 16, 16),
                ZoneRule::new("1-bundesliga", Relegation, 17, -1),
                ZoneRule::new("2-bundesliga", Promotion, 1, 2),
                ZoneRule::new("2-bundesliga", PromotionPlayoff, 3, 3),
                ZoneRule::new("2-bundesliga", RelegationPlayoff, 16, 16),
                ZoneRule::new("2-bundesliga", Relegation, 17, -1),
                ZoneRule::new("3-liga", Promotion, 1, 2),
                ZoneRule::new("3-liga", PromotionPlayoff, 3, 3),
                ZoneRule::new("3-liga", MarkedRelegation, -4, -1),
            ],
            clubs: Vec::new(),
            rosters: BTreeMap::new(),
        }
    }
}

impl LeagueConfig {
    /// Load from a YAML or JSON file, picked by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| LeagueError::Config(format!("cannot read {}: {}", path.display(), e)))?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text)?,
            Some("json") => Self::from_json(&text)?,
            other => {
                return Err(LeagueError::Config(format!(
                    "unsupported config extension {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                )))
            }
        };
        log::info!("Loaded league config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| LeagueError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| LeagueError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Default structure plus the 64-club catalogue: 18, 18 and 20 league
    /// clubs and a cup roster that adds 8 amateur sides.
    pub fn quick_start() -> Result<Self> {
        Self::from_yaml(QUICK_START_YAML)
    }

    /// Config named by `LEAGUE_CONFIG_PATH`, or the defaults.
    pub fn from_env() -> Result<Self> {
        match env::var(CONFIG_PATH_ENV).unwrap_or_default().trim() {
            "" => Ok(Self::default()),
            path => Self::load(path),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for c in &self.competitions {
            if !ids.insert(c.id.as_str()) {
                return Err(LeagueError::Config(format!("duplicate competition id {}", c.id)));
            }
        }

        for rule in &self.cup.pot_rules {
            if let Some(tier) = rule.tiers.iter().find(|t| !ids.contains(t.as_str())) {
                return Err(LeagueError::Config(format!(
                    "pot rule for round {} references unknown competition {}",
                    rule.round, tier
                )));
            }
        }

        for rule in &self.promotion {
            for id in [&rule.upper, &rule.lower] {
                if !ids.contains(id.as_str()) {
                    return Err(LeagueError::Config(format!(
                        "promotion rule references unknown competition {}",
                        id
                    )));
                }
            }
        }

        if let Some(id) = self.rosters.keys().find(|id| !ids.contains(id.as_str())) {
            return Err(LeagueError::Config(format!("roster for unknown competition {}", id)));
        }

        Ok(())
    }

    pub fn competition(&self, id: &str) -> Option<&Competition> {
        self.competitions.iter().find(|c| c.id == id)
    }

    /// Leagues in tier order.
    pub fn leagues(&self) -> Vec<&Competition> {
        let mut leagues: Vec<&Competition> =
            self.competitions.iter().filter(|c| !c.is_cup()).collect();
        leagues.sort_by_key(|c| c.sort_order);
        leagues
    }

    pub fn cups(&self) -> Vec<&Competition> {
        let mut cups: Vec<&Competition> = self.competitions.iter().filter(|c| c.is_cup()).collect();
        cups.sort_by_key(|c| c.sort_order);
        cups
    }

    /// Highest league, the one whose leader is the season champion.
    pub fn top_league(&self) -> Option<&Competition> {
        self.leagues().into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid_german_pyramid() {
        let config = LeagueConfig::default();
        config.validate().unwrap();
        assert_eq!(config.leagues().len(), 3);
        assert_eq!(config.cups()[0].slug, "dfb-pokal");
        assert_eq!(config.top_league().map(|c| c.id.as_str()), Some(BL1));
        assert_eq!(config.cup.round_names.name_for(3), "Achtelfinale");
        assert_eq!(config.cup.pot_rules[0].limit_last_tier, Some(14));
    }

    #[test]
    fn test_quick_start_rosters() {
        let config = LeagueConfig::quick_start().unwrap();
        assert_eq!(config.clubs.len(), 64);
        let sizes: Vec<usize> = ["comp_1bl", "comp_2bl", "comp_3bl", "comp_dfb"]
            .iter()
            .map(|id| config.rosters[*id].len())
            .collect();
        assert_eq!(sizes, vec![18, 18, 20, 64]);

        let catalogue: HashSet<&ClubId> = config.clubs.iter().map(|c| &c.id).collect();
        assert!(config.rosters.values().flatten().all(|id| catalogue.contains(id)));
        assert_eq!(config.competitions, LeagueConfig::default().competitions);
        assert_eq!(config.promotion, LeagueConfig::default().promotion);
    }

    #[test]
    fn test_yaml_partial_config_uses_defaults() {
        let yaml = r#"
competitions:
  - id: a
    name: Liga A
    shortName: A
    type: league
    slug: liga-a
    sortOrder: 1
  - id: cup
    name: Pokal
    shortName: P
    type: cup
    slug: pokal
    sortOrder: 2
default_points:
  win: 2
  draw: 1
  loss: 0
cup:
  pot_rules: []
promotion: []
zones: []
rosters:
  a: [x, y, z]
"#;
        let config = LeagueConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.default_points.win, 2);
        assert_eq!(config.cup.round_names, RoundNames::default());
        assert_eq!(config.rosters["a"].len(), 3);
    }

    #[test]
    fn test_demo_config_parses() {
        let yaml = include_str!("../../../demos/mini_league.yaml");
        let config = LeagueConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.leagues().len(), 2);
        assert_eq!(config.clubs.len(), 8);
        assert_eq!(config.cup.round_names.name_for(3), "Finale");
        assert_eq!(config.zones[1].zone, TableZone::Relegation);
    }

    #[test]
    fn test_validate_rejects_bad_references() {
        let mut config = LeagueConfig::default();
        config.competitions.push(config.competitions[0].clone());
        assert!(matches!(config.validate(), Err(LeagueError::Config(_))));

        let mut config = LeagueConfig::default();
        config.cup.pot_rules[0].tiers.push("nope".into());
        assert!(config.validate().is_err());

        let mut config = LeagueConfig::default();
        config.promotion[0].lower = "nope".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = serde_json::to_string(&LeagueConfig::default()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = LeagueConfig::load(file.path()).unwrap();
        assert_eq!(loaded, LeagueConfig::default());
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(LeagueConfig::load(file.path()), Err(LeagueError::Config(_))));
    }
}

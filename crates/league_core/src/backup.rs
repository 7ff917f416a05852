//! Full JSON backup of every collection.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::models::{Club, Competition, CupRound, MatchResult, Matchday, Season, SeasonCompetition};
use crate::store::LeagueStore;

pub const BACKUP_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Dangling reference: {0}")]
    DanglingReference(String),
}

impl BackupError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            BackupError::Io(_) => true,
            BackupError::Json(_) => false,
            BackupError::VersionMismatch { .. } => false,
            BackupError::DanglingReference(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    pub version: u32,
    /// RFC 3339
    pub exported_at: String,
    #[serde(default)]
    pub clubs: Vec<Club>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub competitions: Vec<Competition>,
    #[serde(default)]
    pub season_competitions: Vec<SeasonCompetition>,
    #[serde(default)]
    pub matchdays: Vec<Matchday>,
    #[serde(default)]
    pub matches: Vec<MatchResult>,
    #[serde(default)]
    pub cup_rounds: Vec<CupRound>,
}

impl BackupData {
    /// Every match, matchday and cup round must point at a stored season
    /// competition, and every season competition at a stored season.
    pub fn check_references(&self) -> Result<(), BackupError> {
        let seasons: HashSet<&str> = self.seasons.iter().map(|s| s.id.as_str()).collect();
        let scs: HashSet<&str> = self.season_competitions.iter().map(|sc| sc.id.as_str()).collect();

        if let Some(sc) = self
            .season_competitions
            .iter()
            .find(|sc| !seasons.contains(sc.season_id.as_str()))
        {
            return Err(BackupError::DanglingReference(format!(
                "season competition {} references missing season {}",
                sc.id, sc.season_id
            )));
        }
        if let Some(m) =
            self.matches.iter().find(|m| !scs.contains(m.season_competition_id.as_str()))
        {
            return Err(BackupError::DanglingReference(format!(
                "match {} references missing season competition {}",
                m.id, m.season_competition_id
            )));
        }
        if let Some(md) = self
            .matchdays
            .iter()
            .find(|md| !scs.contains(md.season_competition_id.as_str()))
        {
            return Err(BackupError::DanglingReference(format!(
                "matchday {} references missing season competition {}",
                md.id, md.season_competition_id
            )));
        }
        if let Some(r) =
            self.cup_rounds.iter().find(|r| !scs.contains(r.season_competition_id.as_str()))
        {
            return Err(BackupError::DanglingReference(format!(
                "cup round {} references missing season competition {}",
                r.id, r.season_competition_id
            )));
        }
        Ok(())
    }
}

pub fn export_all<S: LeagueStore + ?Sized>(store: &S) -> BackupData {
    let data = BackupData {
        version: BACKUP_VERSION,
        exported_at: Utc::now().to_rfc3339(),
        clubs: store.clubs(),
        seasons: store.seasons(),
        competitions: store.competitions(),
        season_competitions: store.season_competitions(),
        matchdays: store.all_matchdays(),
        matches: store.all_matches(),
        cup_rounds: store.all_cup_rounds(),
    };
    log::info!(
        "Exported {} season(s), {} match(es)",
        data.seasons.len(),
        data.matches.len()
    );
    data
}

/// Replace the store's contents with `data`. Validation happens before the
/// store is cleared, so a rejected backup leaves it untouched.
pub fn import_all<S: LeagueStore + ?Sized>(
    store: &mut S,
    data: BackupData,
) -> Result<(), BackupError> {
    if data.version != BACKUP_VERSION {
        if data.version > BACKUP_VERSION {
            log::warn!(
                "Backup was written by a newer version ({} > {})",
                data.version,
                BACKUP_VERSION
            );
        }
        return Err(BackupError::VersionMismatch { found: data.version, expected: BACKUP_VERSION });
    }
    data.check_references()?;

    store.clear();
    let (seasons, matches) = (data.seasons.len(), data.matches.len());
    for club in data.clubs {
        store.put_club(club);
    }
    for competition in data.competitions {
        store.put_competition(competition);
    }
    for season in data.seasons {
        store.put_season(season);
    }
    for sc in data.season_competitions {
        store.put_season_competition(sc);
    }
    for md in data.matchdays {
        store.put_matchday(md);
    }
    for round in data.cup_rounds {
        store.put_cup_round(round);
    }
    for m in data.matches {
        store.put_match(m);
    }

    log::info!(
        "Imported backup from {} ({} season(s), {} match(es))",
        data.exported_at,
        seasons,
        matches
    );
    Ok(())
}

/// Pretty-printed JSON, written to a temporary file and renamed into place.
pub fn write_backup(path: impl AsRef<Path>, data: &BackupData) -> Result<(), BackupError> {
    let path = path.as_ref();
    let temp_path = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, data)?;
        writer.flush()?;
    }
    fs::rename(&temp_path, path)?;
    log::debug!("Wrote backup to {}", path.display());
    Ok(())
}

pub fn read_backup(path: impl AsRef<Path>) -> Result<BackupData, BackupError> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeagueConfig;
    use crate::models::ClubId;
    use crate::service::{LeagueService, NewSeason};
    use crate::store::MemoryStore;
    use std::collections::BTreeMap;

    fn populated_store() -> MemoryStore {
        let mut config = LeagueConfig::default();
        config.rosters = BTreeMap::from([(
            "comp_1bl".to_string(),
            vec![ClubId::from("a"), ClubId::from("b"), ClubId::from("c")],
        )]);
        let mut svc = LeagueService::new(MemoryStore::new(), config);
        let season = svc.create_season(NewSeason::new("2025/26")).unwrap();
        let m = svc.schedule(&season.id, "comp_1bl").unwrap()[0].1[0].clone();
        svc.record_score(&m.id, 2, 2).unwrap();
        svc.into_store()
    }

    #[test]
    fn test_file_round_trip() {
        let store = populated_store();
        let data = export_all(&store);
        assert_eq!(data.version, 1);
        assert!(chrono::DateTime::parse_from_rfc3339(&data.exported_at).is_ok());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        write_backup(&path, &data).unwrap();
        let loaded = read_backup(&path).unwrap();
        assert_eq!(loaded, data);

        let mut target = MemoryStore::new();
        import_all(&mut target, loaded).unwrap();
        assert_eq!(target.all_matches(), store.all_matches());
        assert_eq!(target.seasons(), store.seasons());
    }

    #[test]
    fn test_json_uses_camel_case_field_names() {
        let data = export_all(&populated_store());
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("exportedAt").is_some());
        assert!(json.get("seasonCompetitions").is_some());
        let first_match = &json["matches"][0];
        assert!(first_match.get("homeClubId").is_some());
        assert!(first_match.get("isKnockout").is_some());
    }

    #[test]
    fn test_future_version_rejected_without_clearing() {
        let mut store = populated_store();
        let before = store.all_matches().len();
        let mut data = export_all(&store);
        data.version = 2;

        let err = import_all(&mut store, data).unwrap_err();
        assert!(matches!(err, BackupError::VersionMismatch { found: 2, expected: 1 }));
        assert!(!err.is_recoverable());
        assert_eq!(store.all_matches().len(), before);
    }

    #[test]
    fn test_dangling_match_rejected() {
        let mut data = export_all(&populated_store());
        data.matches[0].season_competition_id = "sc_gone".into();
        let mut store = MemoryStore::new();
        assert!(matches!(import_all(&mut store, data), Err(BackupError::DanglingReference(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_backup(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, BackupError::Io(_)));
        assert!(err.is_recoverable());
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cup stage with a fixed ordinal, so "best round reached" compares
/// stages instead of names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoundStage {
    Round1,
    Round2,
    RoundOf16,
    QuarterFinal,
    SemiFinal,
    Final,
}

impl RoundStage {
    pub const ALL: [RoundStage; 6] = [
        RoundStage::Round1,
        RoundStage::Round2,
        RoundStage::RoundOf16,
        RoundStage::QuarterFinal,
        RoundStage::SemiFinal,
        RoundStage::Final,
    ];

    pub fn ordinal(self) -> u32 {
        match self {
            RoundStage::Round1 => 1,
            RoundStage::Round2 => 2,
            RoundStage::RoundOf16 => 3,
            RoundStage::QuarterFinal => 4,
            RoundStage::SemiFinal => 5,
            RoundStage::Final => 6,
        }
    }

    pub fn from_ordinal(n: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.ordinal() == n)
    }

    pub fn label(self) -> &'static str {
        match self {
            RoundStage::Round1 => "Round 1",
            RoundStage::Round2 => "Round 2",
            RoundStage::RoundOf16 => "Round of 16",
            RoundStage::QuarterFinal => "Quarter-final",
            RoundStage::SemiFinal => "Semi-final",
            RoundStage::Final => "Final",
        }
    }

    /// Default (German) display name, as stored on round records.
    pub fn display_name(self) -> &'static str {
        match self {
            RoundStage::Round1 => "1. Runde",
            RoundStage::Round2 => "2. Runde",
            RoundStage::RoundOf16 => "Achtelfinale",
            RoundStage::QuarterFinal => "Viertelfinale",
            RoundStage::SemiFinal => "Halbfinale",
            RoundStage::Final => "Finale",
        }
    }

    /// Accepts both the stored German names and the English labels.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|s| {
            s.display_name().eq_ignore_ascii_case(name) || s.label().eq_ignore_ascii_case(name)
        })
    }
}

/// Round number → display name. Numbers without an entry become "Runde N".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundNames(BTreeMap<u32, String>);

impl Default for RoundNames {
    fn default() -> Self {
        Self(
            RoundStage::ALL
                .into_iter()
                .map(|s| (s.ordinal(), s.display_name().to_string()))
                .collect(),
        )
    }
}

impl RoundNames {
    pub fn new(names: BTreeMap<u32, String>) -> Self {
        Self(names)
    }

    pub fn name_for(&self, number: u32) -> String {
        self.0.get(&number).cloned().unwrap_or_else(|| format!("Runde {}", number))
    }

    /// Ordinal for "best round reached": the stage table first, then the
    /// configured names, then the round number itself.
    pub fn ordinal_of(&self, name: &str, number: u32) -> u32 {
        if let Some(stage) = RoundStage::from_name(name) {
            return stage.ordinal();
        }
        self.0.iter().find(|(_, n)| n.as_str() == name).map(|(k, _)| *k).unwrap_or(number)
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable club identifier, e.g. `"club_fcb"`.
///
/// Ordering is plain string ordering and serves as the last-resort
/// tie-break in every table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClubId(String);

impl ClubId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClubId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClubId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ClubId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ClubId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    pub short_name: String,
    pub slug: String,
    pub primary_color: String,
    pub secondary_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_url: Option<String>,
}

impl Club {
    pub fn new(id: impl Into<ClubId>, name: &str, short_name: &str) -> Self {
        let id = id.into();
        Self {
            slug: id.as_str().trim_start_matches("club_").to_string(),
            id,
            name: name.to_string(),
            short_name: short_name.to_string(),
            primary_color: "#ffffff".to_string(),
            secondary_color: "#000000".to_string(),
            logo_url: None,
            club_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_club_id_is_transparent_in_json() {
        let id = ClubId::from("club_svw");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"club_svw\"");
    }

    #[test]
    fn test_club_round_trips_camel_case() {
        let club = Club::new("club_svw", "SV Werder Bremen", "SVW");
        let json = serde_json::to_value(&club).unwrap();
        assert_eq!(json["shortName"], "SVW");
        assert_eq!(json["slug"], "svw");
        assert!(json.get("logoUrl").is_none());

        let back: Club = serde_json::from_value(json).unwrap();
        assert_eq!(back, club);
    }
}

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamStats {
    pub p: u32,
    pub w: u32,
    pub d: u32,
    pub l: u32,
    pub gs: u32,
    pub gc: u32,
    pub gd: i32,
    pub pts: u32,
    pub form: String,
}

impl TeamStats {
    /// Form letters, most recent first. Empty when no form has been recorded.
    pub fn form_letters(&self) -> Vec<Outcome> {
        self.form
            .split_whitespace()
            .filter_map(|part| part.parse().ok())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionChange {
    Up,
    Down,
    Same,
}

impl PositionChange {
    pub fn symbol(self) -> &'static str {
        match self {
            PositionChange::Up => "▲",
            PositionChange::Down => "▼",
            PositionChange::Same => "=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn from_scores(own: u32, other: u32) -> Self {
        match own.cmp(&other) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::Loss,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Outcome::Win => 'W',
            Outcome::Draw => 'D',
            Outcome::Loss => 'L',
        }
    }

    pub fn points(self) -> u32 {
        match self {
            Outcome::Win => 3,
            Outcome::Draw => 1,
            Outcome::Loss => 0,
        }
    }
}

impl FromStr for Outcome {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "W" | "w" => Ok(Outcome::Win),
            "D" | "d" => Ok(Outcome::Draw),
            "L" | "l" => Ok(Outcome::Loss),
            _ => Err(()),
        }
    }
}

/// One roster entry. `stats` and `position_change` are derived and replaced
/// wholesale by the standings calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default, deserialize_with = "de_team_id")]
    pub id: u32,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub crest_url: Option<String>,
    #[serde(default, deserialize_with = "de_stats")]
    pub stats: TeamStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_change: Option<PositionChange>,
}

impl Team {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            crest_url: None,
            stats: TeamStats::default(),
            position_change: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
    Postponed,
    Cancelled,
    Abandoned,
    Suspended,
    Unknown,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
            MatchStatus::Postponed => "postponed",
            MatchStatus::Cancelled => "cancelled",
            MatchStatus::Abandoned => "abandoned",
            MatchStatus::Suspended => "suspended",
            MatchStatus::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::Live => "LIVE",
            MatchStatus::Finished => "FT",
            MatchStatus::Postponed => "Postponed",
            MatchStatus::Cancelled => "Cancelled",
            MatchStatus::Abandoned => "Abandoned",
            MatchStatus::Suspended => "Suspended",
            MatchStatus::Unknown => "TBC",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MatchStatus::Finished | MatchStatus::Cancelled | MatchStatus::Abandoned
        )
    }
}

impl FromStr for MatchStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s.trim().to_ascii_lowercase().as_str() {
            "" | "scheduled" => MatchStatus::Scheduled,
            "live" => MatchStatus::Live,
            "finished" => MatchStatus::Finished,
            "postponed" => MatchStatus::Postponed,
            "cancelled" | "canceled" => MatchStatus::Cancelled,
            "abandoned" => MatchStatus::Abandoned,
            "suspended" => MatchStatus::Suspended,
            _ => MatchStatus::Unknown,
        };
        Ok(status)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MatchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MatchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

/// A fixture or a result. Both lists of a competition document share this
/// shape; only status and scores tell them apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub team_a: String,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub team_b: String,
    #[serde(default, deserialize_with = "de_opt_u32")]
    pub score_a: Option<u32>,
    #[serde(default, deserialize_with = "de_opt_u32")]
    pub score_b: Option<u32>,
    #[serde(
        default,
        deserialize_with = "de_opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub score_a_pen: Option<u32>,
    #[serde(
        default,
        deserialize_with = "de_opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub score_b_pen: Option<u32>,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub matchday: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub full_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub day: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub live_minute: Option<u32>,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub venue: Option<String>,
}

impl MatchResult {
    pub fn new(team_a: impl Into<String>, team_b: impl Into<String>) -> Self {
        Self {
            team_a: team_a.into(),
            team_b: team_b.into(),
            ..Self::default()
        }
    }

    pub fn with_score(mut self, score_a: u32, score_b: u32) -> Self {
        self.score_a = Some(score_a);
        self.score_b = Some(score_b);
        self
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_date(mut self, full_date: impl Into<String>) -> Self {
        self.full_date = Some(full_date.into());
        self
    }

    pub fn with_matchday(mut self, matchday: impl Into<String>) -> Self {
        self.matchday = Some(matchday.into());
        self
    }

    pub fn scores(&self) -> Option<(u32, u32)> {
        Some((self.score_a?, self.score_b?))
    }

    pub fn has_both_scores(&self) -> bool {
        self.scores().is_some()
    }

    /// Settled outcomes that feed the league table.
    pub fn counts_for_standings(&self) -> bool {
        match self.status {
            MatchStatus::Finished => true,
            MatchStatus::Abandoned => self.has_both_scores(),
            _ => false,
        }
    }

    pub fn is_live_with_score(&self) -> bool {
        self.status == MatchStatus::Live && self.has_both_scores()
    }

    pub fn involves(&self, normalized_name: &str) -> bool {
        crate::normalize::normalize(&self.team_a) == normalized_name
            || crate::normalize::normalize(&self.team_b) == normalized_name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub name: String,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub fixtures: Vec<MatchResult>,
    #[serde(default)]
    pub results: Vec<MatchResult>,
}

/// Cross-competition identity for a team name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntity {
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub crest_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub team_id: Option<u32>,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub competition_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedList {
    pub title: String,
    pub fixtures: Vec<MatchResult>,
}

// Admin-entered documents mix numbers, numeric strings and blanks freely.

pub(crate) fn value_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some((f as i64).to_string())
                } else {
                    Some(f.to_string())
                }
            }
        }
        _ => None,
    }
}

pub(crate) fn value_to_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).ok()
            } else {
                let f = n.as_f64()?;
                if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
                    Some(f as u32)
                } else {
                    None
                }
            }
        }
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.as_ref().and_then(value_to_string))
}

fn de_string_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(de_opt_string(d)?.unwrap_or_default())
}

fn de_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.as_ref().and_then(value_to_u32))
}

fn de_team_id<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(match raw.as_ref().and_then(value_to_u32) {
        Some(id) => id,
        None => {
            debug!("team id {raw:?} is not a number, using 0");
            0
        }
    })
}

fn de_stats<'de, D: Deserializer<'de>>(d: D) -> Result<TeamStats, D::Error> {
    // Stats are recomputed from results, so a garbled stored copy is dropped.
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw
        .and_then(|v| serde_json::from_value::<TeamStats>(v).ok())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_team_id_falls_back_to_zero() {
        let team: Team = serde_json::from_str(r#"{"id":"abc","name":"A"}"#).expect("team");
        assert_eq!(team.id, 0);
        let team: Team = serde_json::from_str(r#"{"id":"7","name":"B"}"#).expect("team");
        assert_eq!(team.id, 7);
    }

    #[test]
    fn scores_accept_numeric_strings_and_blanks() {
        let raw = r#"{"teamA":"A","teamB":"B","scoreA":"2","scoreB":"","status":"Finished"}"#;
        let m: MatchResult = serde_json::from_str(raw).expect("match should parse");
        assert_eq!(m.score_a, Some(2));
        assert_eq!(m.score_b, None);
        assert_eq!(m.status, MatchStatus::Finished);
        assert!(!m.has_both_scores());
    }

    #[test]
    fn matchday_accepts_numbers() {
        let raw = r#"{"teamA":"A","teamB":"B","matchday":3}"#;
        let m: MatchResult = serde_json::from_str(raw).expect("match should parse");
        assert_eq!(m.matchday.as_deref(), Some("3"));
        assert_eq!(m.status, MatchStatus::Scheduled);
    }

    #[test]
    fn unknown_status_is_kept_as_unknown() {
        let raw = r#"{"teamA":"A","teamB":"B","status":"delayed"}"#;
        let m: MatchResult = serde_json::from_str(raw).expect("match should parse");
        assert_eq!(m.status, MatchStatus::Unknown);
        assert!(!m.status.is_terminal());
    }

    #[test]
    fn team_without_stats_gets_empty_form() {
        let raw = r#"{"id":4,"name":"Green Mamba","stats":{"pts":"lots"}}"#;
        let team: Team = serde_json::from_str(raw).expect("team should parse");
        assert_eq!(team.id, 4);
        assert_eq!(team.stats, TeamStats::default());
        assert!(team.stats.form_letters().is_empty());
    }

    #[test]
    fn abandoned_needs_both_scores_to_count() {
        let bare = MatchResult::new("A", "B").with_status(MatchStatus::Abandoned);
        assert!(!bare.counts_for_standings());
        assert!(bare.with_score(1, 0).counts_for_standings());
    }

    #[test]
    fn form_letters_round_trip() {
        let stats = TeamStats {
            form: "W D L".to_string(),
            ..TeamStats::default()
        };
        assert_eq!(
            stats.form_letters(),
            vec![Outcome::Win, Outcome::Draw, Outcome::Loss]
        );
    }
}

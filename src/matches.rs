use crate::error::{Result, ShotDataError, read_json};
use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchId(pub i64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a season's match list.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub match_id: MatchId,
    pub home_team: String,
    pub away_team: String,
    pub match_date: Option<NaiveDate>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub stage: Option<String>,
}

impl Match {
    /// Exact, case-sensitive comparison against both team names.
    pub fn involves(&self, team_name: &str) -> bool {
        self.home_team == team_name || self.away_team == team_name
    }

    /// The side that is not `team`. Any name other than the home team maps
    /// to the home team, including names that play in neither side.
    pub fn opponent_of(&self, team: Option<&str>) -> &str {
        if team == Some(self.home_team.as_str()) {
            &self.away_team
        } else {
            &self.home_team
        }
    }

    fn from_value(value: &Value, path: &Path, index: usize) -> Result<Self> {
        let invalid = |reason: &str| ShotDataError::InvalidMatch {
            path: path.to_path_buf(),
            index,
            reason: reason.to_string(),
        };

        let match_id = value
            .get("match_id")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| invalid("missing integer match_id"))?;
        let home_team = value
            .get("home_team")
            .and_then(|team| team.get("home_team_name"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| invalid("missing home_team.home_team_name"))?
            .to_string();
        let away_team = value
            .get("away_team")
            .and_then(|team| team.get("away_team_name"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| invalid("missing away_team.away_team_name"))?
            .to_string();

        Ok(Self {
            match_id: MatchId(match_id),
            home_team,
            away_team,
            match_date: value
                .get("match_date")
                .and_then(|v| v.as_str())
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
            home_score: value.get("home_score").and_then(|v| v.as_i64()),
            away_score: value.get("away_score").and_then(|v| v.as_i64()),
            stage: value
                .get("competition_stage")
                .and_then(|stage| stage.get("name"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
    }
}

pub fn matches_path(base_dir: &Path, competition_id: i64, season_id: i64) -> PathBuf {
    base_dir
        .join("matches")
        .join(competition_id.to_string())
        .join(format!("{}.json", season_id))
}

/// Reads `<base>/matches/<competition>/<season>.json`. Every call re-reads the file.
pub fn load_matches(base_dir: &Path, competition_id: i64, season_id: i64) -> Result<Vec<Match>> {
    let path = matches_path(base_dir, competition_id, season_id);
    let records: Vec<Value> = read_json(&path)?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| Match::from_value(record, &path, index))
        .collect()
}

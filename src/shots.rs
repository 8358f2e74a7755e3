//! Season-level shot extraction.
//!
//! Loads a season's match list, reads each match's event log, keeps the shot
//! events and turns them into one flat row per shot with geometric features
//! and team labels attached.

use crate::error::{Result, read_json};
use crate::events::{FlatEvent, events_path, flatten_events};
use crate::geometry::{AngleMethod, distance_angle, safe_xy};
use crate::matches::{Match, MatchId, load_matches};
use polars::prelude::*;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_DIR: &str = "data/statsbomb/data";
pub const DEFAULT_COMPETITION_ID: i64 = 11;
pub const DEFAULT_SEASON_ID: i64 = 90;

/// Canonical output column order.
pub const OUTPUT_COLUMNS: [&str; 14] = [
    "match_id",
    "shot_team",
    "opponent_team",
    "player.name",
    "x",
    "y",
    "distance",
    "angle",
    "is_head",
    "goal",
    "shot.type.name",
    "shot.technique.name",
    "minute",
    "second",
];

/// Output columns copied straight from an event path. Each is emitted only if
/// some retained match carried the path on at least one event; rows without
/// it hold null.
pub const OPTIONAL_COLUMNS: [&str; 5] = [
    "player.name",
    "shot.type.name",
    "shot.technique.name",
    "minute",
    "second",
];

const TYPE_NAME: &str = "type.name";
const TEAM_NAME: &str = "team.name";
const SHOT_TYPE: &str = "shot.type.name";
const BODY_PART: &str = "shot.body_part.name";
const OUTCOME: &str = "shot.outcome.name";

#[derive(Debug, Clone, PartialEq)]
pub struct ShotQuery {
    pub base_dir: PathBuf,
    pub competition_id: i64,
    pub season_id: i64,
    pub team_name: Option<String>,
    pub include_penalties: bool,
    pub angle: AngleMethod,
}

impl Default for ShotQuery {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            competition_id: DEFAULT_COMPETITION_ID,
            season_id: DEFAULT_SEASON_ID,
            team_name: None,
            include_penalties: false,
            angle: AngleMethod::default(),
        }
    }
}

impl ShotQuery {
    pub fn new(base_dir: impl Into<PathBuf>, competition_id: i64, season_id: i64) -> Self {
        Self {
            base_dir: base_dir.into(),
            competition_id,
            season_id,
            ..Default::default()
        }
    }

    pub fn team(mut self, team_name: Option<impl Into<String>>) -> Self {
        self.team_name = team_name.map(Into::into);
        self
    }

    pub fn include_penalties(mut self, include: bool) -> Self {
        self.include_penalties = include;
        self
    }

    pub fn angle(mut self, angle: AngleMethod) -> Self {
        self.angle = angle;
        self
    }

    /// Runs the extraction and returns the typed rows.
    pub fn extract(&self) -> Result<ShotTable> {
        let mut matches = load_matches(&self.base_dir, self.competition_id, self.season_id)?;
        let listed = matches.len();

        // An empty name selects nothing in particular, so it does not filter.
        if let Some(team) = self.team_name.as_deref().filter(|t| !t.is_empty()) {
            matches.retain(|m| m.involves(team));
        }

        let mut table = ShotTable::default();
        let mut missing = 0usize;

        for m in &matches {
            let path = events_path(&self.base_dir, m.match_id);
            if !path.exists() {
                log::debug!("No events file for match {}, skipping", m.match_id);
                missing += 1;
                continue;
            }

            let events: Vec<Value> = read_json(&path)?;
            match extract_match_shots(m, &events, self) {
                Some(shots) => table.push(shots),
                None => log::debug!("No shots in match {}, skipping", m.match_id),
            }
        }

        let before = table.rows.len();
        table.rows.retain(|row| !row.x.is_nan() && !row.y.is_nan());

        log::info!(
            "Season {}/{}: {} of {} matches selected, {} without events, {} with shots, {} shots ({} dropped without location)",
            self.competition_id,
            self.season_id,
            matches.len(),
            listed,
            missing,
            table.match_count(),
            table.rows.len(),
            before - table.rows.len()
        );

        Ok(table)
    }

    /// Runs the extraction and assembles the output frame.
    pub fn load(&self) -> Result<DataFrame> {
        Ok(self.extract()?.into_frame()?)
    }
}

/// Builds the season shot table.
///
/// With `team_name` set, only matches where that exact name plays home or away
/// are read. Penalties are dropped unless `include_penalties` is true.
pub fn load_season_shots(
    base_dir: &Path,
    competition_id: i64,
    season_id: i64,
    team_name: Option<&str>,
    include_penalties: bool,
) -> Result<DataFrame> {
    ShotQuery::new(base_dir, competition_id, season_id)
        .team(team_name)
        .include_penalties(include_penalties)
        .load()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShotRow {
    pub match_id: MatchId,
    pub shot_team: Option<String>,
    pub opponent_team: String,
    pub player_name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub distance: f64,
    pub angle: f64,
    pub is_head: i8,
    pub goal: i8,
    pub shot_type: Option<String>,
    pub shot_technique: Option<String>,
    pub minute: Option<i64>,
    pub second: Option<i64>,
}

/// Shots of one match plus the event paths that match exposed.
#[derive(Debug, Clone, Default)]
pub struct MatchShots {
    pub rows: Vec<ShotRow>,
    pub paths: BTreeSet<String>,
}

/// Returns `None` when the match has no events or no shot events at all. A
/// match whose shots were all penalties still yields `Some` with no rows.
pub fn extract_match_shots(m: &Match, events: &[Value], query: &ShotQuery) -> Option<MatchShots> {
    let flat = flatten_events(events);
    if flat.is_empty() {
        return None;
    }

    let paths: BTreeSet<String> = flat
        .iter()
        .flat_map(|event| event.paths().map(str::to_string))
        .collect();

    let shots: Vec<&FlatEvent> = flat.iter().filter(|e| e.is(TYPE_NAME, "Shot")).collect();
    if shots.is_empty() {
        return None;
    }

    let shots: Vec<&FlatEvent> = if query.include_penalties || !paths.contains(SHOT_TYPE) {
        shots
    } else {
        shots
            .into_iter()
            .filter(|e| !e.is(SHOT_TYPE, "Penalty"))
            .collect()
    };

    let (xs, ys): (Vec<f64>, Vec<f64>) = shots.iter().map(|e| safe_xy(e.get("location"))).unzip();
    let (distances, angles) = distance_angle(&xs, &ys);

    let rows = shots
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let shot_team = event.str_at(TEAM_NAME).map(|s| s.to_string());
            if let Some(team) = shot_team.as_deref() {
                if !m.involves(team) {
                    log::debug!(
                        "Shot team {} is neither side of match {} ({} v {})",
                        team,
                        m.match_id,
                        m.home_team,
                        m.away_team
                    );
                }
            }

            let angle = match query.angle {
                AngleMethod::GoalProxy => angles[i],
                other => other.angle(xs[i], ys[i]),
            };

            ShotRow {
                match_id: m.match_id,
                opponent_team: m.opponent_of(shot_team.as_deref()).to_string(),
                shot_team,
                player_name: event.str_at("player.name").map(|s| s.to_string()),
                x: xs[i],
                y: ys[i],
                distance: distances[i],
                angle,
                is_head: event.is(BODY_PART, "Head") as i8,
                goal: event.is(OUTCOME, "Goal") as i8,
                shot_type: event.str_at(SHOT_TYPE).map(|s| s.to_string()),
                shot_technique: event.str_at("shot.technique.name").map(|s| s.to_string()),
                minute: event.i64_at("minute"),
                second: event.i64_at("second"),
            }
        })
        .collect();

    Some(MatchShots { rows, paths })
}

/// Accumulated rows for a season, in match order then event order.
#[derive(Debug, Clone, Default)]
pub struct ShotTable {
    pub rows: Vec<ShotRow>,
    observed: BTreeSet<&'static str>,
    matches: usize,
}

impl ShotTable {
    pub fn push(&mut self, shots: MatchShots) {
        for column in OPTIONAL_COLUMNS {
            if shots.paths.contains(column) {
                self.observed.insert(column);
            }
        }
        self.matches += 1;
        self.rows.extend(shots.rows);
    }

    /// Number of matches that contributed shot events.
    pub fn match_count(&self) -> usize {
        self.matches
    }

    pub fn has_column(&self, name: &str) -> bool {
        if self.matches == 0 {
            return false;
        }
        !OPTIONAL_COLUMNS.iter().any(|c| *c == name) || self.observed.contains(name)
    }

    /// Columns the frame will carry, in canonical order.
    pub fn columns(&self) -> Vec<&'static str> {
        OUTPUT_COLUMNS
            .into_iter()
            .filter(|c| self.has_column(c))
            .collect()
    }

    pub fn into_frame(self) -> PolarsResult<DataFrame> {
        if self.matches == 0 {
            return Ok(DataFrame::empty());
        }

        let columns = self.columns();
        let all = build_series(self.rows);

        DataFrame::new(
            all.into_iter()
                .filter(|s| columns.iter().any(|c| *c == s.name()))
                .collect::<Vec<Series>>(),
        )
    }
}

fn build_series(rows: Vec<ShotRow>) -> Vec<Series> {
    let mut match_id: Vec<i64> = Vec::with_capacity(rows.len());
    let mut shot_team: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut opponent_team: Vec<String> = Vec::with_capacity(rows.len());
    let mut player_name: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut x: Vec<f64> = Vec::with_capacity(rows.len());
    let mut y: Vec<f64> = Vec::with_capacity(rows.len());
    let mut distance: Vec<f64> = Vec::with_capacity(rows.len());
    let mut angle: Vec<f64> = Vec::with_capacity(rows.len());
    let mut is_head: Vec<i8> = Vec::with_capacity(rows.len());
    let mut goal: Vec<i8> = Vec::with_capacity(rows.len());
    let mut shot_type: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut shot_technique: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut minute: Vec<Option<i64>> = Vec::with_capacity(rows.len());
    let mut second: Vec<Option<i64>> = Vec::with_capacity(rows.len());

    for row in rows {
        match_id.push(row.match_id.0);
        shot_team.push(row.shot_team);
        opponent_team.push(row.opponent_team);
        player_name.push(row.player_name);
        x.push(row.x);
        y.push(row.y);
        distance.push(row.distance);
        angle.push(row.angle);
        is_head.push(row.is_head);
        goal.push(row.goal);
        shot_type.push(row.shot_type);
        shot_technique.push(row.shot_technique);
        minute.push(row.minute);
        second.push(row.second);
    }

    vec![
        Series::new("match_id", match_id),
        Series::new("shot_team", shot_team),
        Series::new("opponent_team", opponent_team),
        Series::new("player.name", player_name),
        Series::new("x", x),
        Series::new("y", y),
        Series::new("distance", distance),
        Series::new("angle", angle),
        Series::new("is_head", is_head),
        Series::new("goal", goal),
        Series::new("shot.type.name", shot_type),
        Series::new("shot.technique.name", shot_technique),
        Series::new("minute", minute),
        Series::new("second", second),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn match_ab() -> Match {
        Match {
            match_id: MatchId(1),
            home_team: "A".to_string(),
            away_team: "B".to_string(),
            match_date: None,
            home_score: None,
            away_score: None,
            stage: None,
        }
    }

    fn shot(team: &str, location: Value, shot: Value) -> Value {
        json!({
            "type": {"name": "Shot"},
            "team": {"name": team},
            "player": {"name": "P"},
            "minute": 10,
            "second": 5,
            "location": location,
            "shot": shot
        })
    }

    #[test]
    fn derives_features_for_each_shot() {
        let events = vec![
            json!({"type": {"name": "Pass"}, "team": {"name": "A"}, "location": [50, 40]}),
            shot("A", json!([100, 40]), json!({"body_part": {"name": "Head"}, "outcome": {"name": "Goal"}})),
            shot("B", json!([90, 30]), json!({"body_part": {"name": "Right Foot"}, "outcome": {"name": "Saved"}})),
        ];

        let shots = extract_match_shots(&match_ab(), &events, &ShotQuery::default()).unwrap();
        assert_eq!(shots.rows.len(), 2);

        let first = &shots.rows[0];
        assert_eq!(first.shot_team.as_deref(), Some("A"));
        assert_eq!(first.opponent_team, "B");
        assert_eq!((first.x, first.y), (100.0, 40.0));
        assert!((first.distance - 20.0).abs() < 1e-12);
        assert_eq!((first.is_head, first.goal), (1, 1));
        assert_eq!((first.minute, first.second), (Some(10), Some(5)));

        let second = &shots.rows[1];
        assert_eq!(second.opponent_team, "A");
        assert_eq!((second.is_head, second.goal), (0, 0));
    }

    #[test]
    fn penalties_follow_the_flag() {
        let events = vec![
            shot("A", json!([108, 40]), json!({"type": {"name": "Penalty"}, "outcome": {"name": "Goal"}})),
            shot("A", json!([100, 30]), json!({"type": {"name": "Open Play"}})),
        ];

        let default = extract_match_shots(&match_ab(), &events, &ShotQuery::default()).unwrap();
        assert_eq!(default.rows.len(), 1);
        assert_eq!(default.rows[0].shot_type.as_deref(), Some("Open Play"));

        let query = ShotQuery::default().include_penalties(true);
        let all = extract_match_shots(&match_ab(), &events, &query).unwrap();
        assert_eq!(all.rows.len(), 2);
    }

    #[test]
    fn all_penalty_match_still_counts() {
        let events = vec![shot("A", json!([108, 40]), json!({"type": {"name": "Penalty"}}))];
        let shots = extract_match_shots(&match_ab(), &events, &ShotQuery::default()).unwrap();
        assert!(shots.rows.is_empty());
        assert!(shots.paths.contains("shot.type.name"));
    }

    #[test]
    fn matches_without_shots_are_skipped() {
        let events = vec![json!({"type": {"name": "Pass"}})];
        assert!(extract_match_shots(&match_ab(), &events, &ShotQuery::default()).is_none());
        assert!(extract_match_shots(&match_ab(), &[], &ShotQuery::default()).is_none());
    }

    #[test]
    fn missing_fields_default_instead_of_failing() {
        let events = vec![json!({"type": {"name": "Shot"}})];
        let shots = extract_match_shots(&match_ab(), &events, &ShotQuery::default()).unwrap();
        let row = &shots.rows[0];

        assert!(row.x.is_nan() && row.y.is_nan());
        assert_eq!((row.is_head, row.goal), (0, 0));
        assert_eq!(row.shot_team, None);
        assert_eq!(row.opponent_team, "A");
        assert_eq!(row.player_name, None);
        assert_eq!(row.minute, None);
    }

    #[test]
    fn post_angle_method_replaces_the_proxy() {
        let events = vec![shot("A", json!([100, 40]), json!({}))];
        let query = ShotQuery::default().angle(AngleMethod::PostSubtended);
        let shots = extract_match_shots(&match_ab(), &events, &query).unwrap();
        let expected = 2.0 * crate::geometry::HALF_GOAL_WIDTH.atan2(20.0);
        assert!((shots.rows[0].angle - expected).abs() < 1e-12);
    }

    #[test]
    fn frame_only_carries_observed_optional_columns() {
        let events = vec![json!({"type": {"name": "Shot"}, "team": {"name": "A"}, "location": [100, 40]})];
        let mut table = ShotTable::default();
        table.push(extract_match_shots(&match_ab(), &events, &ShotQuery::default()).unwrap());

        let df = table.into_frame().unwrap();
        assert_eq!(
            df.get_column_names(),
            vec!["match_id", "shot_team", "opponent_team", "x", "y", "distance", "angle", "is_head", "goal"]
        );
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn empty_table_has_no_columns() {
        let df = ShotTable::default().into_frame().unwrap();
        assert_eq!(df.width(), 0);
        assert_eq!(df.height(), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn name() -> impl Strategy<Value = Option<&'static str>> {
            proptest::option::of(prop::sample::select(vec![
                "Head", "Right Foot", "Left Foot", "Other", "Goal", "Saved", "Off T", "Blocked", "",
            ]))
        }

        proptest! {
            #[test]
            fn indicators_are_always_binary(
                parts in proptest::collection::vec((name(), name()), 1..12)
            ) {
                let events: Vec<Value> = parts
                    .iter()
                    .map(|(body_part, outcome)| {
                        let mut shot = serde_json::Map::new();
                        if let Some(body_part) = body_part {
                            shot.insert("body_part".to_string(), json!({"name": body_part}));
                        }
                        if let Some(outcome) = outcome {
                            shot.insert("outcome".to_string(), json!({"name": outcome}));
                        }
                        json!({"type": {"name": "Shot"}, "team": {"name": "A"}, "location": [100, 40], "shot": shot})
                    })
                    .collect();

                let shots = extract_match_shots(&match_ab(), &events, &ShotQuery::default()).unwrap();
                prop_assert_eq!(shots.rows.len(), parts.len());
                for (row, (body_part, outcome)) in shots.rows.iter().zip(&parts) {
                    prop_assert!(row.is_head == 0 || row.is_head == 1);
                    prop_assert!(row.goal == 0 || row.goal == 1);
                    prop_assert_eq!(row.is_head == 1, *body_part == Some("Head"));
                    prop_assert_eq!(row.goal == 1, *outcome == Some("Goal"));
                }
            }
        }
    }
}

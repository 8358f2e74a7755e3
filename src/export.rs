use crate::error::{Result, ShotDataError};
use crate::matches::Match;
use csv::Writer;
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

#[derive(Serialize)]
struct MatchListRow<'a> {
    match_id: i64,
    match_date: String,
    stage: &'a str,
    home_team: &'a str,
    away_team: &'a str,
    home_score: Option<i64>,
    away_score: Option<i64>,
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ShotDataError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

fn is_parquet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("parquet"))
        .unwrap_or(false)
}

/// Writes Parquet for a `.parquet` path and CSV for anything else.
pub fn write_shots(df: &mut DataFrame, out_file: &Path) -> Result<()> {
    create_parent(out_file)?;

    let mut file = File::create(out_file).map_err(|source| ShotDataError::Io {
        path: out_file.to_path_buf(),
        source,
    })?;

    if is_parquet(out_file) {
        ParquetWriter::new(&mut file).finish(df)?;
    } else {
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
    }

    Ok(())
}

pub fn write_match_list(matches: &[Match], out_file: &Path) -> Result<()> {
    create_parent(out_file)?;

    let mut writer = Writer::from_path(out_file)?;

    for m in matches {
        writer.serialize(MatchListRow {
            match_id: m.match_id.0,
            match_date: m
                .match_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            stage: m.stage.as_deref().unwrap_or(""),
            home_team: &m.home_team,
            away_team: &m.away_team,
            home_score: m.home_score,
            away_score: m.away_score,
        })?;
    }

    writer.flush().map_err(|source| ShotDataError::Io {
        path: out_file.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::MatchId;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn match_list_is_written_as_csv() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("matches.csv");
        let matches = vec![Match {
            match_id: MatchId(42),
            home_team: "A".to_string(),
            away_team: "B".to_string(),
            match_date: NaiveDate::from_ymd_opt(2016, 5, 15),
            home_score: Some(2),
            away_score: None,
            stage: None,
        }];

        write_match_list(&matches, &out).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("match_id,match_date,stage,home_team,away_team,home_score,away_score")
        );
        assert_eq!(lines.next(), Some("42,2016-05-15,,A,B,2,"));
    }

    #[test]
    fn shots_round_trip_through_parquet() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("shots.parquet");
        let mut df = DataFrame::new(vec![
            Series::new("shot_team", vec!["A", "B"]),
            Series::new("x", vec![100.0, 90.0]),
        ])
        .unwrap();

        write_shots(&mut df, &out).unwrap();

        let back = ParquetReader::new(File::open(&out).unwrap()).finish().unwrap();
        assert!(back.equals(&df));
    }
}

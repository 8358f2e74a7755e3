use crate::error::Result;
use polars::prelude::*;
use std::path::Path;

fn by_shot_team(lf: LazyFrame) -> LazyFrame {
    lf.group_by_stable([col("shot_team")])
        .agg([
            len().alias("shots"),
            col("goal").cast(DataType::Int64).sum().alias("goals"),
            col("is_head").cast(DataType::Int64).sum().alias("headers"),
            col("distance")
                .cast(DataType::Float64)
                .mean()
                .alias("mean_distance"),
            col("angle").cast(DataType::Float64).mean().alias("mean_angle"),
        ])
        .with_column(
            (col("goals").cast(DataType::Float64) / col("shots").cast(DataType::Float64))
                .alias("conversion"),
        )
}

/// Per-team totals over a shot table, in order of first appearance.
pub fn summarize_shots(shots: DataFrame) -> Result<DataFrame> {
    if shots.height() == 0 {
        return Ok(DataFrame::empty());
    }

    Ok(by_shot_team(shots.lazy()).collect()?)
}

/// Same summary over an exported Parquet file, most shots first.
pub fn summarize_parquet(parquet_path: &Path, max_rows: Option<usize>) -> Result<DataFrame> {
    let mut lf = LazyFrame::scan_parquet(parquet_path, ScanArgsParquet::default())?;
    if let Some(limit) = max_rows {
        lf = lf.limit(limit.try_into().unwrap_or(u32::MAX));
    }

    let df = by_shot_team(lf)
        .sort(
            "shots",
            SortOptions {
                descending: true,
                nulls_last: true,
                maintain_order: true,
                ..Default::default()
            },
        )
        .collect()?;

    Ok(df)
}

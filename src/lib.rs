//! Shot-level feature extraction from StatsBomb-style open data.
//!
//! Reads a season's match list and per-match event logs from a dataset root
//! and produces one row per shot with location, distance and angle to goal,
//! header/goal indicators and team labels.

pub mod error;
pub mod events;
pub mod export;
pub mod geometry;
pub mod matches;
pub mod shots;
pub mod summary;

pub use error::{Result, ShotDataError};
pub use events::{EventStream, FlatEvent, iter_events_for_matches};
pub use geometry::{AngleMethod, distance_angle, post_angle, safe_xy};
pub use matches::{Match, MatchId, load_matches};
pub use shots::{ShotQuery, ShotRow, ShotTable, load_season_shots};
pub use summary::{summarize_parquet, summarize_shots};

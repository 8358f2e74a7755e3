//! Pitch coordinates and shot geometry.
//!
//! Locations use the fixed 120 x 80 unit pitch, with the attacking goal centred
//! at (120, 40).

use serde_json::Value;

pub const PITCH_X: f64 = 120.0;
pub const PITCH_Y: f64 = 80.0;
pub const GOAL_X: f64 = 120.0;
pub const GOAL_Y: f64 = 40.0;
pub const GOAL_WIDTH: f64 = 7.32;
pub const HALF_GOAL_WIDTH: f64 = GOAL_WIDTH / 2.0;
/// Lower bound for the distance fed into the angle proxy.
pub const MIN_DISTANCE: f64 = 1e-6;

/// How the `angle` column is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AngleMethod {
    /// `atan2(half goal width, distance)`: a visibility heuristic, not the
    /// angle between the posts.
    #[default]
    GoalProxy,
    /// Angle subtended at the shot location by the two goalposts.
    PostSubtended,
}

/// Returns the first two elements of `location` as floats, or `(NaN, NaN)`
/// when it is missing or not an array of at least two numbers.
pub fn safe_xy(location: Option<&Value>) -> (f64, f64) {
    let Some(items) = location.and_then(|v| v.as_array()) else {
        return (f64::NAN, f64::NAN);
    };

    if items.len() < 2 {
        return (f64::NAN, f64::NAN);
    }

    match (items[0].as_f64(), items[1].as_f64()) {
        (Some(x), Some(y)) => (x, y),
        _ => (f64::NAN, f64::NAN),
    }
}

/// Distance to the goal centre and the opening-angle proxy for one point.
pub fn point_distance_angle(x: f64, y: f64) -> (f64, f64) {
    let distance = (GOAL_X - x).hypot(GOAL_Y - y);
    let angle = HALF_GOAL_WIDTH.atan2(distance.max(MIN_DISTANCE));
    (distance, angle)
}

/// Element-wise distance and angle proxy over parallel coordinate slices.
///
/// Output order and length follow the inputs; if the slices differ in length
/// the shorter one bounds the result. NaN coordinates yield NaN distances.
pub fn distance_angle(xs: &[f64], ys: &[f64]) -> (Vec<f64>, Vec<f64>) {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| point_distance_angle(x, y))
        .unzip()
}

/// Angle in radians subtended at (x, y) by the posts at (120, 36.34) and
/// (120, 43.66).
pub fn post_angle(x: f64, y: f64) -> f64 {
    let near = (GOAL_X - x, GOAL_Y - HALF_GOAL_WIDTH - y);
    let far = (GOAL_X - x, GOAL_Y + HALF_GOAL_WIDTH - y);
    let cross = near.0 * far.1 - near.1 * far.0;
    let dot = near.0 * far.0 + near.1 * far.1;
    cross.abs().atan2(dot)
}

impl AngleMethod {
    pub fn angle(self, x: f64, y: f64) -> f64 {
        match self {
            AngleMethod::GoalProxy => point_distance_angle(x, y).1,
            AngleMethod::PostSubtended => post_angle(x, y),
        }
    }
}

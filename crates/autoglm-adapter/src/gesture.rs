/*
[INPUT]:  Swipe start/end coordinates from agent actions
[OUTPUT]: Cardinal swipe direction and its display label
[POS]:    Protocol helpers - pure gesture inference (no I/O)
[UPDATE]: When the coordinate layout or direction policy changes
*/

use crate::types::SwipeDirection;

/// Label used when a swipe carries no usable coordinates
pub const GENERIC_SWIPE_LABEL: &str = "swipe gesture";

/// Infer the dominant direction of `[start_x, start_y, end_x, end_y]`.
///
/// Equal horizontal and vertical displacement resolves to the vertical axis.
pub fn resolve_direction(start2end: &[f64]) -> SwipeDirection {
    let [start_x, start_y, end_x, end_y] = start2end else {
        return SwipeDirection::Unknown;
    };

    let dx = end_x - start_x;
    let dy = end_y - start_y;

    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    } else if dy > 0.0 {
        SwipeDirection::Down
    } else {
        SwipeDirection::Up
    }
}

/// Same as [`resolve_direction`] for a JSON `start2end` field.
pub fn resolve_json(start2end: &serde_json::Value) -> SwipeDirection {
    match coordinates(start2end) {
        Some(coords) => resolve_direction(&coords),
        None => SwipeDirection::Unknown,
    }
}

/// Display label attached to swipe actions.
pub fn describe_swipe(start2end: Option<&serde_json::Value>) -> String {
    match start2end.map_or(SwipeDirection::Unknown, resolve_json) {
        SwipeDirection::Unknown => GENERIC_SWIPE_LABEL.to_string(),
        direction => direction.label().to_string(),
    }
}

fn coordinates(value: &serde_json::Value) -> Option<Vec<f64>> {
    value
        .as_array()?
        .iter()
        .map(serde_json::Value::as_f64)
        .collect()
}

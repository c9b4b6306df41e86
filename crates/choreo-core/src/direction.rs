//! Direction resolution and yaw arithmetic.
//!
//! Absolute directions are compass headings on the ground plane: north is
//! +X (yaw 0), east is +Y (yaw 90). Relative directions are resolved against
//! an actor's current yaw.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math::Vec3;

/// Default angular offset of a diagonal from its leading cardinal.
pub const DIAGONAL_OFFSET: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    pub fn is_relative(self) -> bool {
        matches!(
            self,
            Direction::Forward | Direction::Backward | Direction::Left | Direction::Right
        )
    }

    /// Rotation of a relative direction away from the actor's forward vector.
    fn relative_turn(self) -> Option<f64> {
        match self {
            Direction::Forward => Some(0.0),
            Direction::Backward => Some(180.0),
            Direction::Left => Some(-90.0),
            Direction::Right => Some(90.0),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
            Direction::NorthEast => "north_east",
            Direction::NorthWest => "north_west",
            Direction::SouthEast => "south_east",
            Direction::SouthWest => "south_west",
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Absolute yaw of a compass direction.
///
/// Diagonals sit `offset` degrees (default 45) away from their leading
/// cardinal. Relative directions have no absolute angle and return `None`,
/// telling the caller to resolve them against the current yaw.
pub fn cardinal_angle(direction: Direction, offset: Option<f64>) -> Option<f64> {
    let off = offset.unwrap_or(DIAGONAL_OFFSET);
    let angle = match direction {
        Direction::North => 0.0,
        Direction::East => 90.0,
        Direction::South => 180.0,
        Direction::West => -90.0,
        Direction::NorthEast => off,
        Direction::NorthWest => -off,
        Direction::SouthEast => 180.0 - off,
        Direction::SouthWest => 180.0 + off,
        _ => return None,
    };
    Some(angle)
}

/// Minimal signed rotation from `current` to `target`, in (-180, 180].
///
/// `shortest_yaw(350.0, 10.0)` is `20.0`, never `-340.0`.
pub fn shortest_yaw(current: f64, target: f64) -> f64 {
    let delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// The yaw equivalent to `target` that is reached from `current` by the
/// shortest rotation, keeping yaw continuous across the ±180 seam.
pub fn unwrap_yaw(current: f64, target: f64) -> f64 {
    current + shortest_yaw(current, target)
}

/// Heading in degrees for `direction` given the actor's current yaw.
pub fn heading(direction: Direction, yaw: f64, offset: Option<f64>) -> f64 {
    match cardinal_angle(direction, offset) {
        Some(angle) => angle,
        None => yaw + direction.relative_turn().unwrap_or(0.0) + offset.unwrap_or(0.0),
    }
}

/// Unit ground-plane vector for a yaw in degrees.
pub fn yaw_vector(yaw: f64) -> Vec3 {
    let (sin, cos) = yaw.to_radians().sin_cos();
    Vec3::new(cos, sin, 0.0)
}

/// Unit ground-plane vector for `direction`.
pub fn direction_vector(direction: Direction, yaw: f64, offset: Option<f64>) -> Vec3 {
    yaw_vector(heading(direction, yaw, offset))
}

/// World-space displacement of `distance_cm` along `direction`.
pub fn position_delta(
    direction: Direction,
    yaw: f64,
    distance_cm: f64,
    offset: Option<f64>,
) -> Vec3 {
    direction_vector(direction, yaw, offset) * distance_cm
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_cardinals() {
        assert_eq!(cardinal_angle(Direction::North, None), Some(0.0));
        assert_eq!(cardinal_angle(Direction::East, None), Some(90.0));
        assert_eq!(cardinal_angle(Direction::South, None), Some(180.0));
        assert_eq!(cardinal_angle(Direction::West, None), Some(-90.0));
    }

    #[test]
    fn test_diagonals_default_and_override() {
        assert_eq!(cardinal_angle(Direction::NorthEast, None), Some(45.0));
        assert_eq!(cardinal_angle(Direction::SouthWest, None), Some(225.0));
        assert_eq!(cardinal_angle(Direction::NorthWest, Some(30.0)), Some(-30.0));
        assert_eq!(cardinal_angle(Direction::SouthEast, Some(10.0)), Some(170.0));
    }

    #[test]
    fn test_relative_is_unresolved() {
        assert_eq!(cardinal_angle(Direction::Forward, None), None);
        assert_eq!(cardinal_angle(Direction::Left, Some(10.0)), None);
    }

    #[test]
    fn test_shortest_yaw_wraps() {
        assert!((shortest_yaw(350.0, 10.0) - 20.0).abs() < EPS);
        assert!((shortest_yaw(10.0, 350.0) + 20.0).abs() < EPS);
        assert!((shortest_yaw(0.0, 180.0) - 180.0).abs() < EPS);
        assert!((shortest_yaw(-170.0, 170.0) + 20.0).abs() < EPS);
    }

    #[test]
    fn test_unwrap_yaw_stays_continuous() {
        assert!((unwrap_yaw(350.0, 10.0) - 370.0).abs() < EPS);
        assert!((unwrap_yaw(179.0, -179.0) - 181.0).abs() < EPS);
    }

    #[test]
    fn test_absolute_vectors() {
        let north = direction_vector(Direction::North, 123.0, None);
        assert!((north.x - 1.0).abs() < EPS && north.y.abs() < EPS);
        let east = direction_vector(Direction::East, 0.0, None);
        assert!(east.x.abs() < EPS && (east.y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_relative_vectors() {
        // facing east: right is south, left is north
        let right = direction_vector(Direction::Right, 90.0, None);
        assert!((right.x + 1.0).abs() < EPS && right.y.abs() < EPS);
        let left = direction_vector(Direction::Left, 90.0, None);
        assert!((left.x - 1.0).abs() < EPS && left.y.abs() < EPS);
        let back = direction_vector(Direction::Backward, 0.0, None);
        assert!((back.x + 1.0).abs() < EPS);
    }

    #[test]
    fn test_position_delta() {
        let d = position_delta(Direction::North, 0.0, 10_000.0, None);
        assert!((d.x - 10_000.0).abs() < 1e-6);
        assert!(d.y.abs() < 1e-6);
    }
}

use serde::{Deserialize, Serialize};

use choreo_core::{Acceleration, Direction, Distance, Speed, TimeSpan};

/// Tags accepted for actor commands in serialized movies.
pub const ACTOR_COMMAND_TAGS: &[&str] = &["move", "face", "stay", "follow_spline"];

/// Tags accepted for camera commands in serialized movies.
pub const CAMERA_COMMAND_TAGS: &[&str] = &[
    "look_at",
    "auto_focus",
    "auto_zoom",
    "set_focal_length",
    "stop_tracking",
    "hold",
];

/// One step of an actor's choreography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Move(MoveCommand),
    Face(FaceCommand),
    Stay(StayCommand),
    FollowSpline(FollowSplineCommand),
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Move(_) => "move",
            Command::Face(_) => "face",
            Command::Stay(_) => "stay",
            Command::FollowSpline(_) => "follow_spline",
        }
    }

    pub fn animation(&self) -> Option<&AnimationRef> {
        match self {
            Command::Move(c) => c.animation.as_ref(),
            Command::Face(c) => c.animation.as_ref(),
            Command::Stay(c) => c.animation.as_ref(),
            Command::FollowSpline(c) => c.animation.as_ref(),
        }
    }

    pub fn is_till_end(&self) -> bool {
        matches!(
            self,
            Command::Stay(StayCommand {
                duration: StayDuration::TillEnd,
                ..
            })
        )
    }
}

/// The declared subset of motion quantities for a move.
///
/// Any consistent subset may be given; the planner solves for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TimeSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_speed: Option<Speed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_speed: Option<Speed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<Acceleration>,
}

impl MotionSpec {
    pub fn is_empty(&self) -> bool {
        *self == MotionSpec::default()
    }
}

/// Lateral bounds measured along the right-hand perpendicular of a move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub left: Distance,
    pub right: Distance,
}

impl Corridor {
    pub fn new(left: Distance, right: Distance) -> Self {
        Self { left, right }
    }

    pub fn meters(left: f64, right: f64) -> Self {
        Self::new(Distance::meters(left), Distance::meters(right))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationRef {
    pub name: String,
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,
}

impl AnimationRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            speed_multiplier: 1.0,
        }
    }
}

fn default_speed_multiplier() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCommand {
    #[serde(default = "default_move_direction")]
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction_offset: Option<f64>,
    pub motion: MotionSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corridor: Option<Corridor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationRef>,
}

fn default_move_direction() -> Direction {
    Direction::Forward
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FaceTarget {
    Direction {
        direction: Direction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<f64>,
    },
    Yaw {
        degrees: f64,
    },
    Actor {
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceCommand {
    pub target: FaceTarget,
    #[serde(default = "default_turn_duration")]
    pub duration: TimeSpan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationRef>,
}

fn default_turn_duration() -> TimeSpan {
    TimeSpan::seconds(1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StayDuration {
    For(TimeSpan),
    /// Hold until an absolute movie time. Already past it, this is a no-op.
    Until(TimeSpan),
    /// Hold until the last frame of the movie.
    TillEnd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StayCommand {
    pub duration: StayDuration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowSplineCommand {
    pub spline: String,
    #[serde(default)]
    pub motion: MotionSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_start: Option<Distance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_end: Option<Distance>,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationRef>,
}

/// One step of a camera's framing timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraCommand {
    LookAt {
        subject: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height_pct: Option<f64>,
    },
    AutoFocus {
        subject: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height_pct: Option<f64>,
    },
    AutoZoom {
        subject: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        occupancy: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_focal: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_focal: Option<f64>,
    },
    SetFocalLength {
        mm: f64,
    },
    /// Drop look-at, focus and zoom tracking.
    StopTracking,
    Hold {
        duration: TimeSpan,
    },
}

impl CameraCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            CameraCommand::LookAt { .. } => "look_at",
            CameraCommand::AutoFocus { .. } => "auto_focus",
            CameraCommand::AutoZoom { .. } => "auto_zoom",
            CameraCommand::SetFocalLength { .. } => "set_focal_length",
            CameraCommand::StopTracking => "stop_tracking",
            CameraCommand::Hold { .. } => "hold",
        }
    }

    /// Actor this command tracks, if any.
    pub fn subject(&self) -> Option<&str> {
        match self {
            CameraCommand::LookAt { subject, .. }
            | CameraCommand::AutoFocus { subject, .. }
            | CameraCommand::AutoZoom { subject, .. } => Some(subject),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_tags_match_serde() {
        let stay = Command::Stay(StayCommand {
            duration: StayDuration::TillEnd,
            animation: None,
        });
        let json = serde_json::to_value(&stay).unwrap();
        assert_eq!(json["type"], "stay");
        assert_eq!(json["duration"], "till_end");
        assert!(ACTOR_COMMAND_TAGS.contains(&stay.kind()));
    }

    #[test]
    fn test_move_defaults_from_json() {
        let cmd: Command = serde_json::from_str(
            r#"{"type":"move","motion":{
                "distance":{"value":5.0,"unit":"meters"},
                "duration":{"value":2.0,"unit":"seconds"}}}"#,
        )
        .unwrap();
        match cmd {
            Command::Move(m) => {
                assert_eq!(m.direction, Direction::Forward);
                assert!(m.corridor.is_none());
                assert!(m.motion.start_speed.is_none());
            }
            other => panic!("expected move, got {:?}", other),
        }
    }

    #[test]
    fn test_face_default_duration() {
        let cmd: Command = serde_json::from_str(
            r#"{"type":"face","target":{"kind":"direction","direction":"east"}}"#,
        )
        .unwrap();
        let Command::Face(face) = cmd else {
            panic!("expected face");
        };
        assert_eq!(face.duration, TimeSpan::seconds(1.0));
    }

    #[test]
    fn test_camera_unit_variant() {
        let json = serde_json::to_string(&CameraCommand::StopTracking).unwrap();
        assert_eq!(json, r#"{"type":"stop_tracking"}"#);
        assert!(CAMERA_COMMAND_TAGS.contains(&CameraCommand::StopTracking.kind()));
    }

    #[test]
    fn test_till_end_detection() {
        let hold = Command::Stay(StayCommand {
            duration: StayDuration::For(TimeSpan::seconds(2.0)),
            animation: Some(AnimationRef::new("Idle")),
        });
        assert!(!hold.is_till_end());
        assert_eq!(hold.animation().map(|a| a.name.as_str()), Some("Idle"));
    }
}

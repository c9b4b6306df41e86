//! Camera framing: look-at, focus pulls and auto-zoom.

use choreo_core::{Rotator, Transform, Vec3};
use choreo_ir::{Attachment, AutoZoomConfig, Camera};

/// Closest a subject is assumed to be when solving for focal length, in cm.
pub const MIN_SUBJECT_DISTANCE: f64 = 10.0;

/// The point a camera aims at: `height_pct` of the way up the subject.
pub fn tracked_point(subject: Vec3, subject_height: f64, height_pct: f64) -> Vec3 {
    subject + Vec3::UP * (subject_height * height_pct)
}

/// Orientation that points a camera at `target`. Yaw is in (-180, 180].
pub fn look_at_rotation(camera: Vec3, target: Vec3) -> Rotator {
    let delta = target - camera;
    let yaw = delta.y.atan2(delta.x).to_degrees();
    let pitch = delta.z.atan2(delta.horizontal_length()).to_degrees();
    Rotator::new(pitch, yaw, 0.0)
}

pub fn focus_distance(camera: Vec3, target: Vec3) -> f64 {
    camera.distance(&target)
}

/// Focal length (mm) at which a subject `subject_height` cm tall, `distance`
/// cm away, fills `occupancy` of a sensor `sensor_height_mm` tall.
pub fn pinhole_focal_length(
    sensor_height_mm: f64,
    distance: f64,
    subject_height: f64,
    occupancy: f64,
) -> f64 {
    let distance = distance.max(MIN_SUBJECT_DISTANCE);
    let frame_height = subject_height / occupancy;
    sensor_height_mm * distance / frame_height
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomSolution {
    pub focal_length: f64,
    /// Set when the ideal focal length fell outside the configured bounds.
    pub clamped: bool,
}

pub fn solve_zoom(
    config: &AutoZoomConfig,
    sensor_height_mm: f64,
    distance: f64,
    subject_height: f64,
) -> ZoomSolution {
    let ideal = pinhole_focal_length(
        sensor_height_mm,
        distance,
        subject_height,
        config.target_occupancy,
    );
    let focal_length = ideal.clamp(config.min_focal, config.max_focal);
    ZoomSolution {
        focal_length,
        clamped: focal_length != ideal,
    }
}

/// World transform of a camera rigidly attached to a parent.
///
/// `parent_yaw` is the parent's logical heading; the offset turns with it.
pub fn attached_transform(
    parent_location: Vec3,
    parent_yaw: f64,
    attachment: &Attachment,
) -> Transform {
    let location = parent_location + attachment.offset.rotate_yaw(parent_yaw);
    let rotation = Rotator::from_yaw(parent_yaw).compose(&attachment.rotation);
    Transform::new(location, rotation)
}

/// One tracked subject and how high on it to aim.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectTarget {
    pub actor: String,
    pub height_pct: f64,
}

/// The framing behaviour active on a camera at some frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramingState {
    pub look_at: Option<SubjectTarget>,
    pub focus: Option<SubjectTarget>,
    pub zoom: Option<(String, AutoZoomConfig)>,
    pub focal_length: f64,
}

impl FramingState {
    pub fn initial(camera: &Camera) -> Self {
        Self {
            look_at: None,
            focus: None,
            zoom: None,
            focal_length: camera.focal_length,
        }
    }

    pub fn stop_tracking(&mut self) {
        self.look_at = None;
        self.focus = None;
        self.zoom = None;
    }
}

/// Where a subject is at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectPose {
    pub location: Vec3,
    /// Logical heading, without mesh correction.
    pub yaw: f64,
    pub height: f64,
}

/// Result of framing one camera at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramedShot {
    pub transform: Transform,
    pub focal_length: f64,
    pub focus_distance: Option<f64>,
    pub zoom_clamped: bool,
}

/// Frame `camera` given the active state and a subject lookup.
pub fn frame_shot(
    camera: &Camera,
    state: &FramingState,
    subject: impl Fn(&str) -> Option<SubjectPose>,
) -> FramedShot {
    let base = match &camera.attachment {
        Some(attachment) => match subject(&attachment.actor) {
            Some(parent) => attached_transform(parent.location, parent.yaw, attachment),
            None => Transform::new(camera.location, camera.rotation),
        },
        None => Transform::new(camera.location, camera.rotation),
    };
    let position = base.location;

    let rotation = state
        .look_at
        .as_ref()
        .and_then(|target| {
            subject(&target.actor).map(|pose| {
                let point = tracked_point(pose.location, pose.height, target.height_pct);
                look_at_rotation(position, point)
            })
        })
        .unwrap_or(base.rotation);

    let focus = state.focus.as_ref().and_then(|target| {
        subject(&target.actor).map(|pose| {
            focus_distance(position, tracked_point(pose.location, pose.height, target.height_pct))
        })
    });

    let zoom = state.zoom.as_ref().and_then(|(actor, config)| {
        subject(actor).map(|pose| {
            let center = tracked_point(pose.location, pose.height, 0.5);
            solve_zoom(config, camera.sensor_height_mm, position.distance(&center), pose.height)
        })
    });

    FramedShot {
        transform: Transform::new(position, rotation),
        focal_length: zoom.map_or(state.focal_length, |z| z.focal_length),
        focus_distance: focus,
        zoom_clamped: zoom.is_some_and(|z| z.clamped),
    }
}

use std::collections::{HashMap, HashSet};

use choreo_core::ChoreoError;

use crate::command::{CameraCommand, Command, FaceTarget, StayDuration};
use crate::movie::{Block, MovieDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Actor,
    Camera,
    Light,
    Spline,
}

impl EntityKind {
    fn label(self) -> &'static str {
        match self {
            EntityKind::Actor => "actor",
            EntityKind::Camera => "camera",
            EntityKind::Light => "light",
            EntityKind::Spline => "spline",
        }
    }
}

/// Check a movie for structural correctness before any sampling happens.
///
/// Every problem is collected; nothing is sampled if this returns errors.
pub fn validate_movie(movie: &MovieDefinition) -> Result<(), Vec<ChoreoError>> {
    let mut errors = Vec::new();

    if !movie.fps.is_valid() {
        errors.push(ChoreoError::invalid(format!(
            "movie '{}' frame rate must be positive, got {}",
            movie.name,
            movie.fps.fps()
        )));
    }
    if let Some(duration) = movie.duration {
        if duration.to_internal() < 0.0 {
            errors.push(ChoreoError::invalid("movie duration must not be negative"));
        }
    }

    let entities = collect_entities(movie, &mut errors);
    let lookup = |name: &str| entities.get(name).copied();

    for actor in &movie.actors {
        if actor.radius.to_internal() < 0.0 {
            errors.push(ChoreoError::invalid(format!(
                "actor '{}' has a negative radius",
                actor.name
            )));
        }
        if actor.height.to_internal() <= 0.0 {
            errors.push(ChoreoError::invalid(format!(
                "actor '{}' must have a positive height",
                actor.name
            )));
        }
    }

    for camera in &movie.cameras {
        if camera.sensor_height_mm <= 0.0 || camera.focal_length <= 0.0 {
            errors.push(ChoreoError::invalid(format!(
                "camera '{}' needs a positive sensor height and focal length",
                camera.name
            )));
        }
        if let Some(attachment) = &camera.attachment {
            let context = format!("attachment of camera '{}'", camera.name);
            expect_kind(
                &lookup,
                &attachment.actor,
                EntityKind::Actor,
                &context,
                &mut errors,
            );
        }
        if let Some(zoom) = &camera.auto_zoom {
            check_zoom_bounds(
                &camera.name,
                Some(zoom.target_occupancy),
                zoom.min_focal,
                zoom.max_focal,
                &mut errors,
            );
        }
    }

    for spline in &movie.splines {
        if spline.points.len() < 2 {
            errors.push(ChoreoError::invalid(format!(
                "spline '{}' needs at least 2 control points",
                spline.name
            )));
        }
        if spline.tension < 0.0 {
            errors.push(ChoreoError::invalid(format!(
                "spline '{}' tension must not be negative",
                spline.name
            )));
        }
    }

    for (block_index, block) in movie.script.iter().enumerate() {
        match block {
            Block::Simultaneous(group) => {
                let mut members = HashSet::new();
                for member in &group.members {
                    match member.entity() {
                        None => errors.push(ChoreoError::invalid(format!(
                            "script block #{} nests a simultaneous group inside another",
                            block_index
                        ))),
                        Some(name) if !members.insert(name) => {
                            errors.push(ChoreoError::invalid(format!(
                                "script block #{} lists '{}' twice in one simultaneous group",
                                block_index, name
                            )))
                        }
                        Some(_) => {}
                    }
                }
            }
            Block::Actor(_) | Block::Camera(_) => {}
        }
    }

    let mut actor_indices: HashMap<&str, usize> = HashMap::new();
    let mut camera_indices: HashMap<&str, usize> = HashMap::new();
    for block in movie.sequences() {
        match block {
            Block::Actor(seq) => {
                let kind = EntityKind::Actor;
                if !expect_kind(&lookup, &seq.actor, kind, "actor sequence", &mut errors) {
                    continue;
                }
                for command in &seq.commands {
                    let counter = actor_indices.entry(seq.actor.as_str()).or_insert(0);
                    let index = *counter;
                    *counter += 1;
                    let context = format!("command #{} for '{}'", index, seq.actor);
                    match command {
                        Command::Face(face) => {
                            if let FaceTarget::Actor { name } = &face.target {
                                if name == &seq.actor {
                                    errors.push(ChoreoError::command(
                                        &seq.actor,
                                        index,
                                        "an actor cannot face itself",
                                    ));
                                } else {
                                    let kind = EntityKind::Actor;
                                    expect_kind(&lookup, name, kind, &context, &mut errors);
                                }
                            }
                        }
                        Command::FollowSpline(follow) => {
                            let kind = EntityKind::Spline;
                            expect_kind(&lookup, &follow.spline, kind, &context, &mut errors);
                        }
                        Command::Stay(stay) => {
                            if let StayDuration::Until(at) = stay.duration {
                                if at.to_internal() < 0.0 {
                                    errors.push(ChoreoError::command(
                                        &seq.actor,
                                        index,
                                        "cannot wait until a negative time",
                                    ));
                                }
                            }
                        }
                        Command::Move(_) => {}
                    }
                }
            }
            Block::Camera(seq) => {
                let kind = EntityKind::Camera;
                if !expect_kind(&lookup, &seq.camera, kind, "camera sequence", &mut errors) {
                    continue;
                }
                for command in &seq.commands {
                    let counter = camera_indices.entry(seq.camera.as_str()).or_insert(0);
                    let index = *counter;
                    *counter += 1;
                    let context = format!("command #{} for '{}'", index, seq.camera);
                    if let Some(subject) = command.subject() {
                        expect_kind(&lookup, subject, EntityKind::Actor, &context, &mut errors);
                    }
                    match command {
                        CameraCommand::AutoZoom {
                            occupancy,
                            min_focal,
                            max_focal,
                            ..
                        } => {
                            let min = min_focal.unwrap_or(f64::MIN_POSITIVE);
                            let max = max_focal.unwrap_or(f64::MAX);
                            check_zoom_bounds(&seq.camera, *occupancy, min, max, &mut errors);
                        }
                        CameraCommand::SetFocalLength { mm } if *mm <= 0.0 => {
                            errors.push(ChoreoError::command(
                                &seq.camera,
                                index,
                                "focal length must be positive",
                            ));
                        }
                        CameraCommand::Hold { duration } if duration.to_internal() < 0.0 => {
                            errors.push(ChoreoError::command(
                                &seq.camera,
                                index,
                                "hold duration must not be negative",
                            ));
                        }
                        _ => {}
                    }
                }
            }
            Block::Simultaneous(_) => {}
        }
    }

    // An open-ended stay has no end until the whole plan is known, so nothing
    // may be scheduled after it on the same actor.
    for actor in &movie.actors {
        let commands = movie.commands_for(&actor.name);
        if let Some(pos) = commands.iter().position(|c| c.is_till_end()) {
            if pos + 1 < commands.len() {
                errors.push(ChoreoError::command(
                    &actor.name,
                    pos,
                    "a till-end stay must be the actor's last command",
                ));
            }
        }
    }

    for (i, event) in movie.timeline.iter().enumerate() {
        if event.at().to_internal() < 0.0 {
            errors.push(ChoreoError::invalid(format!(
                "timeline event #{} has a negative time",
                i
            )));
        }
        if let crate::movie::TimelineEvent::CameraCut { camera, .. } = event {
            let context = format!("timeline event #{}", i);
            expect_kind(&lookup, camera, EntityKind::Camera, &context, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn collect_entities<'a>(
    movie: &'a MovieDefinition,
    errors: &mut Vec<ChoreoError>,
) -> HashMap<&'a str, EntityKind> {
    let declared = movie
        .actors
        .iter()
        .map(|a| (a.name.as_str(), EntityKind::Actor))
        .chain(movie.cameras.iter().map(|c| (c.name.as_str(), EntityKind::Camera)))
        .chain(movie.lights.iter().map(|l| (l.name.as_str(), EntityKind::Light)))
        .chain(movie.splines.iter().map(|s| (s.name.as_str(), EntityKind::Spline)));

    let mut entities = HashMap::new();
    for (name, kind) in declared {
        if name.trim().is_empty() {
            errors.push(ChoreoError::invalid(format!("a {} has an empty name", kind.label())));
            continue;
        }
        if let Some(previous) = entities.insert(name, kind) {
            errors.push(ChoreoError::invalid(format!(
                "duplicate entity name '{}' ({} and {})",
                name,
                previous.label(),
                kind.label()
            )));
        }
    }
    entities
}

fn expect_kind(
    lookup: &impl Fn(&str) -> Option<EntityKind>,
    name: &str,
    expected: EntityKind,
    context: &str,
    errors: &mut Vec<ChoreoError>,
) -> bool {
    match lookup(name) {
        Some(kind) if kind == expected => true,
        Some(kind) => {
            errors.push(ChoreoError::invalid(format!(
                "{}: '{}' is a {}, expected a {}",
                context,
                name,
                kind.label(),
                expected.label()
            )));
            false
        }
        None => {
            errors.push(ChoreoError::unresolved(expected.label(), name, context));
            false
        }
    }
}

fn check_zoom_bounds(
    camera: &str,
    occupancy: Option<f64>,
    min: f64,
    max: f64,
    errors: &mut Vec<ChoreoError>,
) {
    if let Some(occupancy) = occupancy {
        if !(occupancy > 0.0 && occupancy <= 1.0) {
            errors.push(ChoreoError::invalid(format!(
                "camera '{}' auto-zoom occupancy must be in (0, 1], got {}",
                camera, occupancy
            )));
        }
    }
    if min <= 0.0 || min > max {
        errors.push(ChoreoError::invalid(format!(
            "camera '{}' auto-zoom focal bounds are invalid ({} > {})",
            camera, min, max
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{StayCommand, StayDuration};
    use crate::movie::{
        Actor, ActorSequence, Camera, CameraSequence, SimultaneousGroup, TimelineEvent,
    };
    use choreo_core::TimeSpan;

    fn stay(duration: StayDuration) -> Command {
        Command::Stay(StayCommand {
            duration,
            animation: None,
        })
    }

    fn base() -> MovieDefinition {
        let mut movie = MovieDefinition::new("test", 30.0);
        movie.actors.push(Actor::new("Runner"));
        movie.cameras.push(Camera::new("Cam"));
        movie
    }

    #[test]
    fn test_valid_movie() {
        let mut movie = base();
        movie.script.push(Block::Actor(ActorSequence {
            actor: "Runner".into(),
            commands: vec![stay(StayDuration::For(TimeSpan::seconds(1.0)))],
        }));
        assert!(validate_movie(&movie).is_ok());
    }

    #[test]
    fn test_unresolved_actor() {
        let mut movie = base();
        movie.script.push(Block::Actor(ActorSequence {
            actor: "Ghost".into(),
            commands: vec![],
        }));
        let errors = validate_movie(&movie).unwrap_err();
        assert!(matches!(errors[0], ChoreoError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_sequence_kind_mismatch() {
        let mut movie = base();
        movie.script.push(Block::Camera(CameraSequence {
            camera: "Runner".into(),
            commands: vec![],
        }));
        let errors = validate_movie(&movie).unwrap_err();
        assert!(errors[0].to_string().contains("expected a camera"));
    }

    #[test]
    fn test_collects_every_error() {
        let mut movie = base();
        movie.fps = choreo_core::FrameRate::new(0.0);
        movie.actors.push(Actor::new("Cam"));
        movie.timeline.push(TimelineEvent::CameraCut {
            at: TimeSpan::seconds(1.0),
            camera: "Nope".into(),
        });
        let errors = validate_movie(&movie).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_till_end_must_be_last() {
        let mut movie = base();
        movie.script.push(Block::Actor(ActorSequence {
            actor: "Runner".into(),
            commands: vec![stay(StayDuration::TillEnd)],
        }));
        movie.script.push(Block::Actor(ActorSequence {
            actor: "Runner".into(),
            commands: vec![stay(StayDuration::For(TimeSpan::seconds(1.0)))],
        }));
        let errors = validate_movie(&movie).unwrap_err();
        assert!(errors[0].to_string().contains("till-end"));
    }

    #[test]
    fn test_wait_until_negative_time() {
        let mut movie = base();
        movie.script.push(Block::Actor(ActorSequence {
            actor: "Runner".into(),
            commands: vec![stay(StayDuration::Until(TimeSpan::seconds(-1.0)))],
        }));
        let errors = validate_movie(&movie).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("negative time"));
    }

    #[test]
    fn test_nested_and_duplicate_group_members() {
        let mut movie = base();
        let seq = Block::Actor(ActorSequence {
            actor: "Runner".into(),
            commands: vec![],
        });
        movie.script.push(Block::Simultaneous(SimultaneousGroup {
            members: vec![
                seq.clone(),
                seq,
                Block::Simultaneous(SimultaneousGroup::default()),
            ],
        }));
        let errors = validate_movie(&movie).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_auto_zoom_bounds() {
        let mut movie = base();
        movie.cameras[0] = Camera::new("Cam").with_auto_zoom(1.5, 50.0, 20.0);
        let errors = validate_movie(&movie).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}

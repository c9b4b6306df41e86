//! Fluent constructors for movie definitions.
//!
//! Every builder is consumed by each call and returned refined, so a chain
//! never shares mutable state with anything else. Terminal conversions turn
//! builders into the plain tagged records in [`crate::command`] and
//! [`crate::movie`].

use choreo_core::{Acceleration, Direction, Distance, Speed, TimeSpan};

use crate::command::{
    AnimationRef, CameraCommand, Command, Corridor, FaceCommand, FaceTarget, FollowSplineCommand,
    MotionSpec, MoveCommand, StayCommand, StayDuration,
};
use crate::movie::{
    Actor, ActorSequence, Block, Camera, CameraSequence, Light, MovieDefinition, SimultaneousGroup,
    Spline, TimelineEvent,
};

/// A builder for a whole movie.
pub struct MovieBuilder {
    movie: MovieDefinition,
}

impl MovieBuilder {
    pub fn new(name: impl Into<String>, fps: f64) -> Self {
        Self {
            movie: MovieDefinition::new(name, fps),
        }
    }

    /// Fix the movie's terminal time.
    pub fn duration(mut self, duration: TimeSpan) -> Self {
        self.movie.duration = Some(duration);
        self
    }

    pub fn actor(mut self, actor: Actor) -> Self {
        self.movie.actors.push(actor);
        self
    }

    pub fn camera(mut self, camera: Camera) -> Self {
        self.movie.cameras.push(camera);
        self
    }

    pub fn light(mut self, light: Light) -> Self {
        self.movie.lights.push(light);
        self
    }

    pub fn spline(mut self, spline: Spline) -> Self {
        self.movie.splines.push(spline);
        self
    }

    /// Append an actor or camera script, or a group.
    pub fn script(mut self, block: impl Into<Block>) -> Self {
        self.movie.script.push(block.into());
        self
    }

    pub fn simultaneous(self, group: Group) -> Self {
        self.script(group)
    }

    pub fn camera_cut(mut self, at: TimeSpan, camera: impl Into<String>) -> Self {
        self.movie.timeline.push(TimelineEvent::CameraCut {
            at,
            camera: camera.into(),
        });
        self
    }

    pub fn marker(mut self, at: TimeSpan, label: impl Into<String>) -> Self {
        self.movie.timeline.push(TimelineEvent::Marker {
            at,
            label: label.into(),
        });
        self
    }

    pub fn build(self) -> MovieDefinition {
        self.movie
    }
}

/// Commands for one actor.
#[derive(Debug, Clone)]
pub struct ActorScript {
    sequence: ActorSequence,
}

impl ActorScript {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            sequence: ActorSequence {
                actor: actor.into(),
                commands: Vec::new(),
            },
        }
    }

    /// Append any command.
    pub fn then(mut self, command: impl Into<Command>) -> Self {
        self.sequence.commands.push(command.into());
        self
    }

    pub fn move_straight(self, movement: MoveBuilder) -> Self {
        self.then(movement)
    }

    /// Turn to a direction over the default one second.
    pub fn face(self, direction: Direction) -> Self {
        self.then(FaceBuilder::direction(direction))
    }

    pub fn face_actor(self, actor: impl Into<String>) -> Self {
        self.then(FaceBuilder::actor(actor))
    }

    pub fn stay(self, duration: TimeSpan) -> Self {
        self.then(StayBuilder::for_time(duration))
    }

    pub fn stay_till_end(self) -> Self {
        self.then(StayBuilder::till_end())
    }

    /// Hold until an absolute movie time, to line up with other scripts.
    pub fn wait_until(self, at: TimeSpan) -> Self {
        self.then(StayBuilder::until(at))
    }

    pub fn follow_spline(self, follow: SplineFollowBuilder) -> Self {
        self.then(follow)
    }

    /// Set the animation of the most recently added command.
    pub fn anim(mut self, name: impl Into<String>) -> Self {
        let anim = AnimationRef::new(name);
        if let Some(last) = self.sequence.commands.last_mut() {
            *animation_slot(last) = Some(anim);
        }
        self
    }

    pub fn build(self) -> ActorSequence {
        self.sequence
    }
}

fn animation_slot(command: &mut Command) -> &mut Option<AnimationRef> {
    match command {
        Command::Move(c) => &mut c.animation,
        Command::Face(c) => &mut c.animation,
        Command::Stay(c) => &mut c.animation,
        Command::FollowSpline(c) => &mut c.animation,
    }
}

impl From<ActorScript> for Block {
    fn from(script: ActorScript) -> Self {
        Block::Actor(script.sequence)
    }
}

/// A straight-line move.
#[derive(Debug, Clone)]
pub struct MoveBuilder {
    command: MoveCommand,
}

impl MoveBuilder {
    pub fn toward(direction: Direction) -> Self {
        Self {
            command: MoveCommand {
                direction,
                direction_offset: None,
                motion: MotionSpec::default(),
                corridor: None,
                animation: None,
            },
        }
    }

    pub fn forward() -> Self {
        Self::toward(Direction::Forward)
    }

    /// Override the diagonal or relative angular offset.
    pub fn offset(mut self, degrees: f64) -> Self {
        self.command.direction_offset = Some(degrees);
        self
    }

    pub fn distance(mut self, distance: Distance) -> Self {
        self.command.motion.distance = Some(distance);
        self
    }

    pub fn duration(mut self, duration: TimeSpan) -> Self {
        self.command.motion.duration = Some(duration);
        self
    }

    /// Constant speed.
    pub fn speed(mut self, speed: Speed) -> Self {
        self.command.motion.start_speed = Some(speed);
        self
    }

    /// Ramp from `start` to `end`.
    pub fn ramp(mut self, start: Speed, end: Speed) -> Self {
        self.command.motion.start_speed = Some(start);
        self.command.motion.end_speed = Some(end);
        self
    }

    pub fn end_speed(mut self, speed: Speed) -> Self {
        self.command.motion.end_speed = Some(speed);
        self
    }

    pub fn acceleration(mut self, acceleration: Acceleration) -> Self {
        self.command.motion.acceleration = Some(acceleration);
        self
    }

    pub fn distance_at_speed(self, distance: Distance, speed: Speed) -> Self {
        self.distance(distance).speed(speed)
    }

    pub fn distance_in_time(self, distance: Distance, duration: TimeSpan) -> Self {
        self.distance(distance).duration(duration)
    }

    pub fn time_at_speed(self, duration: TimeSpan, speed: Speed) -> Self {
        self.duration(duration).speed(speed)
    }

    pub fn corridor(mut self, corridor: Corridor) -> Self {
        self.command.corridor = Some(corridor);
        self
    }

    pub fn anim(mut self, name: impl Into<String>) -> Self {
        self.command.animation = Some(AnimationRef::new(name));
        self
    }

    pub fn anim_at(mut self, name: impl Into<String>, speed_multiplier: f64) -> Self {
        self.command.animation = Some(AnimationRef {
            name: name.into(),
            speed_multiplier,
        });
        self
    }
}

impl From<MoveBuilder> for Command {
    fn from(builder: MoveBuilder) -> Self {
        Command::Move(builder.command)
    }
}

/// A turn in place.
#[derive(Debug, Clone)]
pub struct FaceBuilder {
    command: FaceCommand,
}

impl FaceBuilder {
    fn with_target(target: FaceTarget) -> Self {
        Self {
            command: FaceCommand {
                target,
                duration: TimeSpan::seconds(1.0),
                animation: None,
            },
        }
    }

    pub fn direction(direction: Direction) -> Self {
        Self::with_target(FaceTarget::Direction {
            direction,
            offset: None,
        })
    }

    pub fn yaw(degrees: f64) -> Self {
        Self::with_target(FaceTarget::Yaw { degrees })
    }

    pub fn actor(name: impl Into<String>) -> Self {
        Self::with_target(FaceTarget::Actor { name: name.into() })
    }

    /// Angular offset for diagonal or relative direction targets.
    pub fn offset(mut self, degrees: f64) -> Self {
        if let FaceTarget::Direction { offset, .. } = &mut self.command.target {
            *offset = Some(degrees);
        }
        self
    }

    pub fn over(mut self, duration: TimeSpan) -> Self {
        self.command.duration = duration;
        self
    }

    pub fn anim(mut self, name: impl Into<String>) -> Self {
        self.command.animation = Some(AnimationRef::new(name));
        self
    }
}

impl From<FaceBuilder> for Command {
    fn from(builder: FaceBuilder) -> Self {
        Command::Face(builder.command)
    }
}

/// Standing still.
#[derive(Debug, Clone)]
pub struct StayBuilder {
    command: StayCommand,
}

impl StayBuilder {
    pub fn for_time(duration: TimeSpan) -> Self {
        Self {
            command: StayCommand {
                duration: StayDuration::For(duration),
                animation: None,
            },
        }
    }

    /// Hold until `at` on the movie clock.
    pub fn until(at: TimeSpan) -> Self {
        Self {
            command: StayCommand {
                duration: StayDuration::Until(at),
                animation: None,
            },
        }
    }

    pub fn till_end() -> Self {
        Self {
            command: StayCommand {
                duration: StayDuration::TillEnd,
                animation: None,
            },
        }
    }

    pub fn anim(mut self, name: impl Into<String>) -> Self {
        self.command.animation = Some(AnimationRef::new(name));
        self
    }
}

impl From<StayBuilder> for Command {
    fn from(builder: StayBuilder) -> Self {
        Command::Stay(builder.command)
    }
}

/// Travel along a named spline.
#[derive(Debug, Clone)]
pub struct SplineFollowBuilder {
    command: FollowSplineCommand,
}

impl SplineFollowBuilder {
    pub fn along(spline: impl Into<String>) -> Self {
        Self {
            command: FollowSplineCommand {
                spline: spline.into(),
                motion: MotionSpec::default(),
                range_start: None,
                range_end: None,
                reverse: false,
                animation: None,
            },
        }
    }

    pub fn speed(mut self, speed: Speed) -> Self {
        self.command.motion.start_speed = Some(speed);
        self
    }

    pub fn duration(mut self, duration: TimeSpan) -> Self {
        self.command.motion.duration = Some(duration);
        self
    }

    /// Travel further than one pass; wraps on closed splines.
    pub fn distance(mut self, distance: Distance) -> Self {
        self.command.motion.distance = Some(distance);
        self
    }

    pub fn ramp(mut self, start: Speed, end: Speed) -> Self {
        self.command.motion.start_speed = Some(start);
        self.command.motion.end_speed = Some(end);
        self
    }

    /// Only travel the arclength window `[start, end]`.
    pub fn range(mut self, start: Distance, end: Distance) -> Self {
        self.command.range_start = Some(start);
        self.command.range_end = Some(end);
        self
    }

    pub fn reverse(mut self) -> Self {
        self.command.reverse = true;
        self
    }

    pub fn anim(mut self, name: impl Into<String>) -> Self {
        self.command.animation = Some(AnimationRef::new(name));
        self
    }
}

impl From<SplineFollowBuilder> for Command {
    fn from(builder: SplineFollowBuilder) -> Self {
        Command::FollowSpline(builder.command)
    }
}

/// Framing commands for one camera.
#[derive(Debug, Clone)]
pub struct CameraScript {
    sequence: CameraSequence,
}

impl CameraScript {
    pub fn new(camera: impl Into<String>) -> Self {
        Self {
            sequence: CameraSequence {
                camera: camera.into(),
                commands: Vec::new(),
            },
        }
    }

    pub fn then(mut self, command: CameraCommand) -> Self {
        self.sequence.commands.push(command);
        self
    }

    pub fn look_at(self, subject: impl Into<String>) -> Self {
        self.then(CameraCommand::LookAt {
            subject: subject.into(),
            height_pct: None,
        })
    }

    pub fn look_at_height(self, subject: impl Into<String>, height_pct: f64) -> Self {
        self.then(CameraCommand::LookAt {
            subject: subject.into(),
            height_pct: Some(height_pct),
        })
    }

    pub fn auto_focus(self, subject: impl Into<String>) -> Self {
        self.then(CameraCommand::AutoFocus {
            subject: subject.into(),
            height_pct: None,
        })
    }

    pub fn auto_zoom(self, subject: impl Into<String>) -> Self {
        self.then(CameraCommand::AutoZoom {
            subject: subject.into(),
            occupancy: None,
            min_focal: None,
            max_focal: None,
        })
    }

    pub fn auto_zoom_to(
        self,
        subject: impl Into<String>,
        occupancy: f64,
        min_focal: f64,
        max_focal: f64,
    ) -> Self {
        self.then(CameraCommand::AutoZoom {
            subject: subject.into(),
            occupancy: Some(occupancy),
            min_focal: Some(min_focal),
            max_focal: Some(max_focal),
        })
    }

    /// Look at, focus on and zoom to one subject.
    pub fn track(self, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        self.look_at(subject.clone())
            .auto_focus(subject.clone())
            .auto_zoom(subject)
    }

    pub fn focal_length(self, mm: f64) -> Self {
        self.then(CameraCommand::SetFocalLength { mm })
    }

    pub fn stop_tracking(self) -> Self {
        self.then(CameraCommand::StopTracking)
    }

    pub fn hold(self, duration: TimeSpan) -> Self {
        self.then(CameraCommand::Hold { duration })
    }

    pub fn build(self) -> CameraSequence {
        self.sequence
    }
}

impl From<CameraScript> for Block {
    fn from(script: CameraScript) -> Self {
        Block::Camera(script.sequence)
    }
}

/// Scripts that start together.
#[derive(Debug, Clone, Default)]
pub struct Group {
    group: SimultaneousGroup,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, script: impl Into<Block>) -> Self {
        self.group.members.push(script.into());
        self
    }
}

impl From<Group> for Block {
    fn from(group: Group) -> Self {
        Block::Simultaneous(group.group)
    }
}

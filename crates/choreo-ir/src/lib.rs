//! # choreo-ir
//!
//! The data every stage of choreo passes around: movie definitions with their
//! actors, cameras, lights and splines; tagged command records built by the
//! fluent builders; and the compiled per-frame tracks handed to the exporter.

pub mod builder;
pub mod command;
pub mod compiled;
pub mod movie;
pub mod track;
pub mod validate;

pub use builder::{
    ActorScript, CameraScript, FaceBuilder, Group, MoveBuilder, MovieBuilder, SplineFollowBuilder,
    StayBuilder,
};
pub use command::{
    AnimationRef, CameraCommand, Command, Corridor, FaceCommand, FaceTarget, FollowSplineCommand,
    MotionSpec, MoveCommand, StayCommand, StayDuration,
};
pub use compiled::{ActorTracks, CameraTracks, CompiledMovie, ResolvedEvent};
pub use movie::{
    Actor, ActorSequence, Attachment, AutoZoomConfig, Block, Camera, CameraSequence, Light,
    LightKind, MovieDefinition, SimultaneousGroup, Spline, TimelineEvent,
};
pub use track::{
    AnimationSegment, AnimationTrack, CameraSettingsKey, CameraSettingsTrack, FrameKeyed, Track,
    TransformKey, TransformTrack,
};
pub use validate::validate_movie;

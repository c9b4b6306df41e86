use serde::{Deserialize, Serialize};

use choreo_core::hash::ContentHasher;
use choreo_core::{ChoreoResult, ContentHash, Diagnostic, FrameRate};

use crate::movie::{Actor, Camera, Light};
use crate::track::{AnimationTrack, CameraSettingsTrack, TransformTrack};

/// Tracks compiled for one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorTracks {
    pub actor: Actor,
    pub transform: TransformTrack,
    pub animation: AnimationTrack,
}

/// Tracks compiled for one camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraTracks {
    pub camera: Camera,
    pub transform: TransformTrack,
    pub settings: CameraSettingsTrack,
}

/// A timeline event resolved to a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolvedEvent {
    CameraCut { frame: u64, time: f64, camera: String },
    Marker { frame: u64, time: f64, label: String },
}

impl ResolvedEvent {
    pub fn frame(&self) -> u64 {
        match self {
            ResolvedEvent::CameraCut { frame, .. } | ResolvedEvent::Marker { frame, .. } => *frame,
        }
    }
}

/// The output of compiling a movie: pure data, ready to serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledMovie {
    pub name: String,
    pub fps: FrameRate,
    /// Index of the last frame any track reaches.
    pub duration_frames: u64,
    pub actors: Vec<ActorTracks>,
    pub cameras: Vec<CameraTracks>,
    pub lights: Vec<Light>,
    pub timeline: Vec<ResolvedEvent>,
    /// Recoverable findings (clamps, widenings) raised while compiling.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledMovie {
    pub fn actor(&self, name: &str) -> Option<&ActorTracks> {
        self.actors.iter().find(|a| a.actor.name == name)
    }

    pub fn camera(&self, name: &str) -> Option<&CameraTracks> {
        self.cameras.iter().find(|c| c.camera.name == name)
    }

    pub fn actor_names(&self) -> Vec<String> {
        self.actors.iter().map(|a| a.actor.name.clone()).collect()
    }

    pub fn camera_names(&self) -> Vec<String> {
        self.cameras.iter().map(|c| c.camera.name.clone()).collect()
    }

    pub fn light_names(&self) -> Vec<String> {
        self.lights.iter().map(|l| l.name.clone()).collect()
    }

    /// Digest of everything an engine would consume. Diagnostics are excluded.
    pub fn content_hash(&self) -> ChoreoResult<ContentHash> {
        let mut hasher = ContentHasher::new();
        hasher.update_json(&self.name)?;
        hasher.update_json(&self.fps)?;
        hasher.update_json(&self.duration_frames)?;
        hasher.update_json(&self.actors)?;
        hasher.update_json(&self.cameras)?;
        hasher.update_json(&self.lights)?;
        hasher.update_json(&self.timeline)?;
        Ok(hasher.finish())
    }
}

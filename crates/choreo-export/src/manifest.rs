use serde::{Deserialize, Serialize};

use choreo_core::ChoreoResult;
use choreo_ir::{Actor, Attachment, AutoZoomConfig, Camera, CompiledMovie};

/// Top-level index of an exported movie folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub fps: f64,
    pub duration_frames: u64,
    pub actor_list: Vec<String>,
    pub camera_list: Vec<String>,
    pub light_list: Vec<String>,
    /// Hex SHA-256 of the compiled tracks.
    pub content_hash: String,
}

impl Manifest {
    pub fn for_movie(compiled: &CompiledMovie) -> ChoreoResult<Self> {
        Ok(Self {
            name: compiled.name.clone(),
            fps: compiled.fps.fps(),
            duration_frames: compiled.duration_frames,
            actor_list: compiled.actor_names(),
            camera_list: compiled.camera_names(),
            light_list: compiled.light_names(),
            content_hash: compiled.content_hash()?.to_hex(),
        })
    }
}

/// Static actor data an engine needs to spawn the performer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSettings {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,
    pub yaw_offset: f64,
    /// Centimeters.
    pub radius: f64,
    /// Centimeters.
    pub height: f64,
}

impl From<&Actor> for ActorSettings {
    fn from(actor: &Actor) -> Self {
        Self {
            name: actor.name.clone(),
            mesh: actor.mesh.clone(),
            yaw_offset: actor.yaw_offset,
            radius: actor.radius.to_internal(),
            height: actor.height.to_internal(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub name: String,
    pub sensor_height_mm: f64,
    pub focal_length: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_zoom: Option<AutoZoomConfig>,
}

impl From<&Camera> for CameraSettings {
    fn from(camera: &Camera) -> Self {
        Self {
            name: camera.name.clone(),
            sensor_height_mm: camera.sensor_height_mm,
            focal_length: camera.focal_length,
            attachment: camera.attachment.clone(),
            auto_zoom: camera.auto_zoom,
        }
    }
}

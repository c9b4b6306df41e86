use serde::{Deserialize, Serialize};
use serde_json::Value;

use choreo_core::{ChoreoError, ChoreoResult, Distance, FrameRate, Rotator, TimeSpan, Vec3};

use crate::command::{CameraCommand, Command, ACTOR_COMMAND_TAGS, CAMERA_COMMAND_TAGS};

/// The root of a choreography: entities, per-entity scripts and global events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDefinition {
    pub name: String,
    /// The single seconds↔frames conversion for this movie.
    pub fps: FrameRate,
    /// Explicit terminal time. Without it the movie ends with its longest script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TimeSpan>,
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub cameras: Vec<Camera>,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub splines: Vec<Spline>,
    #[serde(default)]
    pub script: Vec<Block>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
}

impl MovieDefinition {
    pub fn new(name: impl Into<String>, fps: f64) -> Self {
        Self {
            name: name.into(),
            fps: FrameRate::new(fps),
            duration: None,
            actors: Vec::new(),
            cameras: Vec::new(),
            lights: Vec::new(),
            splines: Vec::new(),
            script: Vec::new(),
            timeline: Vec::new(),
        }
    }

    pub fn actor(&self, name: &str) -> Option<&Actor> {
        self.actors.iter().find(|a| a.name == name)
    }

    pub fn camera(&self, name: &str) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.name == name)
    }

    pub fn spline(&self, name: &str) -> Option<&Spline> {
        self.splines.iter().find(|s| s.name == name)
    }

    /// Every actor and camera sequence in script order, groups flattened.
    pub fn sequences(&self) -> impl Iterator<Item = &Block> {
        self.script.iter().flat_map(|block| match block {
            Block::Simultaneous(group) => group.members.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
    }

    /// All commands addressed to `actor`, in the order they will run.
    pub fn commands_for(&self, actor: &str) -> Vec<&Command> {
        self.sequences()
            .filter_map(|block| match block {
                Block::Actor(seq) if seq.actor == actor => Some(seq.commands.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Parse a movie from JSON.
    ///
    /// Command tags are checked before typed decoding, so a misspelled
    /// command reports its entity and index instead of a bare serde error.
    pub fn from_json_str(json: &str) -> ChoreoResult<Self> {
        let raw: Value = serde_json::from_str(json)?;
        check_command_tags(&raw)?;
        Ok(serde_json::from_value(raw)?)
    }

    pub fn to_json_string(&self) -> ChoreoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_command_tags(raw: &Value) -> ChoreoResult<()> {
    let Some(script) = raw.get("script").and_then(Value::as_array) else {
        return Ok(());
    };
    let mut counters: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut blocks: Vec<&Value> = Vec::new();
    for block in script {
        match block.get("members").and_then(Value::as_array) {
            Some(members) => blocks.extend(members.iter()),
            None => blocks.push(block),
        }
    }
    for block in blocks {
        let (entity, known) = if let Some(actor) = block.get("actor").and_then(Value::as_str) {
            (actor, ACTOR_COMMAND_TAGS)
        } else if let Some(camera) = block.get("camera").and_then(Value::as_str) {
            (camera, CAMERA_COMMAND_TAGS)
        } else {
            continue;
        };
        let Some(commands) = block.get("commands").and_then(Value::as_array) else {
            continue;
        };
        for command in commands {
            let counter = counters.entry(entity.to_string()).or_insert(0);
            let index = *counter;
            *counter += 1;
            let kind = command.get("type").and_then(Value::as_str).unwrap_or("<missing>");
            if !known.contains(&kind) {
                return Err(ChoreoError::UnknownCommand {
                    entity: entity.to_string(),
                    index,
                    kind: kind.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// A performer whose transform and animation are choreographed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Unique key.
    pub name: String,
    /// Initial location in centimeters.
    pub location: Vec3,
    /// Logical facing at frame 0, in degrees.
    #[serde(default)]
    pub initial_yaw: f64,
    /// Mesh correction added to every emitted yaw.
    #[serde(default)]
    pub yaw_offset: f64,
    #[serde(default = "default_radius")]
    pub radius: Distance,
    #[serde(default = "default_height")]
    pub height: Distance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,
}

fn default_radius() -> Distance {
    Distance::meters(0.35)
}

fn default_height() -> Distance {
    Distance::meters(1.8)
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Vec3::ZERO,
            initial_yaw: 0.0,
            yaw_offset: 0.0,
            radius: default_radius(),
            height: default_height(),
            mesh: None,
        }
    }

    pub fn at(mut self, location: Vec3) -> Self {
        self.location = location;
        self
    }

    pub fn facing(mut self, yaw: f64) -> Self {
        self.initial_yaw = yaw;
        self
    }

    pub fn with_yaw_offset(mut self, offset: f64) -> Self {
        self.yaw_offset = offset;
        self
    }

    pub fn with_radius(mut self, radius: Distance) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_height(mut self, height: Distance) -> Self {
        self.height = height;
        self
    }

    pub fn with_mesh(mut self, mesh: impl Into<String>) -> Self {
        self.mesh = Some(mesh.into());
        self
    }
}

/// Rigid attachment of a camera to an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket: Option<String>,
    /// Offset in the actor's local frame (X forward), centimeters.
    #[serde(default)]
    pub offset: Vec3,
    #[serde(default)]
    pub rotation: Rotator,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoZoomConfig {
    /// Fraction of the frame height the subject should fill.
    pub target_occupancy: f64,
    pub min_focal: f64,
    pub max_focal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub name: String,
    pub location: Vec3,
    #[serde(default)]
    pub rotation: Rotator,
    #[serde(default = "default_focal_length")]
    pub focal_length: f64,
    #[serde(default = "default_sensor_height")]
    pub sensor_height_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_zoom: Option<AutoZoomConfig>,
}

fn default_focal_length() -> f64 {
    35.0
}

fn default_sensor_height() -> f64 {
    24.0
}

impl Camera {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Vec3::ZERO,
            rotation: Rotator::default(),
            focal_length: default_focal_length(),
            sensor_height_mm: default_sensor_height(),
            attachment: None,
            auto_zoom: None,
        }
    }

    pub fn at(mut self, location: Vec3) -> Self {
        self.location = location;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotator) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_focal_length(mut self, mm: f64) -> Self {
        self.focal_length = mm;
        self
    }

    pub fn with_sensor_height(mut self, mm: f64) -> Self {
        self.sensor_height_mm = mm;
        self
    }

    pub fn attached_to(mut self, actor: impl Into<String>, offset: Vec3) -> Self {
        self.attachment = Some(Attachment {
            actor: actor.into(),
            socket: None,
            offset,
            rotation: Rotator::default(),
        });
        self
    }

    pub fn with_auto_zoom(mut self, target_occupancy: f64, min_focal: f64, max_focal: f64) -> Self {
        self.auto_zoom = Some(AutoZoomConfig {
            target_occupancy,
            min_focal,
            max_focal,
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    Point,
    Directional,
    Spot,
    Rect,
    Sky,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    #[serde(default)]
    pub location: Vec3,
    #[serde(default)]
    pub rotation: Rotator,
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    /// Linear RGB, each channel in 0..=1.
    #[serde(default = "default_light_color")]
    pub color: [f64; 3],
}

fn default_intensity() -> f64 {
    5000.0
}

fn default_light_color() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

impl Light {
    pub fn new(name: impl Into<String>, kind: LightKind) -> Self {
        Self {
            name: name.into(),
            kind,
            location: Vec3::ZERO,
            rotation: Rotator::default(),
            intensity: default_intensity(),
            color: default_light_color(),
        }
    }

    pub fn at(mut self, location: Vec3) -> Self {
        self.location = location;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotator) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_color(mut self, r: f64, g: f64, b: f64) -> Self {
        self.color = [r, g, b];
        self
    }
}

/// A path actors can follow by arclength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    pub name: String,
    /// Control points in centimeters.
    pub points: Vec<Vec3>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default = "default_tension")]
    pub tension: f64,
}

fn default_tension() -> f64 {
    0.5
}

impl Spline {
    pub fn new(name: impl Into<String>, points: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            points,
            closed: false,
            tension: default_tension(),
        }
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn with_tension(mut self, tension: f64) -> Self {
        self.tension = tension;
        self
    }
}

/// Commands for one actor, run back to back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSequence {
    pub actor: String,
    pub commands: Vec<Command>,
}

/// Framing commands for one camera, run back to back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSequence {
    pub camera: String,
    pub commands: Vec<CameraCommand>,
}

/// Sequences that all start at the same moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimultaneousGroup {
    pub members: Vec<Block>,
}

/// A top-level unit of the script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    Actor(ActorSequence),
    Camera(CameraSequence),
    Simultaneous(SimultaneousGroup),
}

impl Block {
    /// Name of the entity this block drives, for non-group blocks.
    pub fn entity(&self) -> Option<&str> {
        match self {
            Block::Actor(seq) => Some(&seq.actor),
            Block::Camera(seq) => Some(&seq.camera),
            Block::Simultaneous(_) => None,
        }
    }
}

/// Absolute-time events independent of any entity's script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEvent {
    CameraCut { at: TimeSpan, camera: String },
    Marker { at: TimeSpan, label: String },
}

impl TimelineEvent {
    pub fn at(&self) -> TimeSpan {
        match self {
            TimelineEvent::CameraCut { at, .. } | TimelineEvent::Marker { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{StayCommand, StayDuration};

    fn stay(seconds: f64) -> Command {
        Command::Stay(StayCommand {
            duration: StayDuration::For(TimeSpan::seconds(seconds)),
            animation: None,
        })
    }

    #[test]
    fn test_commands_for_spans_groups() {
        let mut movie = MovieDefinition::new("m", 30.0);
        movie.actors.push(Actor::new("A"));
        movie.script.push(Block::Actor(ActorSequence {
            actor: "A".into(),
            commands: vec![stay(1.0)],
        }));
        movie.script.push(Block::Simultaneous(SimultaneousGroup {
            members: vec![Block::Actor(ActorSequence {
                actor: "A".into(),
                commands: vec![stay(2.0), stay(3.0)],
            })],
        }));
        assert_eq!(movie.commands_for("A").len(), 3);
        assert_eq!(movie.sequences().count(), 2);
    }

    #[test]
    fn test_json_round_trip_keeps_script() {
        let mut movie = MovieDefinition::new("m", 24.0);
        movie.actors.push(Actor::new("A").at(Vec3::new(1.0, 2.0, 3.0)));
        movie.script.push(Block::Actor(ActorSequence {
            actor: "A".into(),
            commands: vec![stay(1.0)],
        }));
        let json = movie.to_json_string().unwrap();
        let back = MovieDefinition::from_json_str(&json).unwrap();
        assert_eq!(back, movie);
    }

    #[test]
    fn test_unknown_command_reports_entity_and_index() {
        let json = r#"{
            "name": "m", "fps": 30.0,
            "actors": [{"name": "Runner", "location": {"x":0,"y":0,"z":0}}],
            "script": [
                {"block": "actor", "actor": "Runner", "commands": [
                    {"type": "stay", "duration": "till_end"}
                ]},
                {"block": "simultaneous", "members": [
                    {"block": "actor", "actor": "Runner", "commands": [
                        {"type": "cartwheel"}
                    ]}
                ]}
            ]
        }"#;
        let err = MovieDefinition::from_json_str(json).unwrap_err();
        match err {
            ChoreoError::UnknownCommand { entity, index, kind } => {
                assert_eq!(entity, "Runner");
                assert_eq!(index, 1);
                assert_eq!(kind, "cartwheel");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_actor_defaults() {
        let actor = Actor::new("Runner");
        assert!((actor.radius.to_internal() - 35.0).abs() < 1e-9);
        assert!((actor.height.to_internal() - 180.0).abs() < 1e-9);
    }
}

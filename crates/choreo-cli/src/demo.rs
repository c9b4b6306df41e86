//! Starter movie written by `choreo init`.

use choreo_core::{ChoreoConfig, Direction, Distance, Speed, TimeSpan, Vec3};
use choreo_ir::{
    Actor, ActorScript, Camera, CameraScript, MoveBuilder, MovieBuilder, MovieDefinition,
};

pub const DEMO_FILE: &str = "demo.json";

/// A runner jogs north, turns toward a coach and waits for the coach's cue.
/// One camera follows the runner for the whole shot.
pub fn demo_movie(config: &ChoreoConfig) -> MovieDefinition {
    let camera = Camera::new("MainCam")
        .at(Vec3::new(800.0, -600.0, 170.0))
        .with_focal_length(config.camera.default_focal_length)
        .with_sensor_height(config.camera.sensor_height_mm);

    MovieBuilder::new("Demo", config.project.default_fps)
        .actor(Actor::new("Runner").with_mesh("/Game/Characters/Runner"))
        .actor(
            Actor::new("Coach")
                .with_mesh("/Game/Characters/Coach")
                .at(Vec3::new(1500.0, 300.0, 0.0))
                .facing(270.0),
        )
        .camera(camera)
        .script(
            ActorScript::new("Runner")
                .move_straight(
                    MoveBuilder::toward(Direction::North)
                        .distance_at_speed(Distance::meters(10.0), Speed::mps(3.0))
                        .anim("Jog"),
                )
                .face_actor("Coach")
                .anim("Walk")
                .stay_till_end()
                .anim("Idle"),
        )
        .script(ActorScript::new("Coach").stay(TimeSpan::seconds(6.0)).anim("Idle"))
        .script(CameraScript::new("MainCam").track("Runner"))
        .camera_cut(TimeSpan::seconds(0.0), "MainCam")
        .marker(TimeSpan::seconds(3.0), "arrival")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_compiles() {
        let movie = demo_movie(&ChoreoConfig::default());
        let compiled = choreo_plan::compile(&movie).unwrap();
        assert_eq!(compiled.duration_frames, 180);
        let runner = compiled.actor("Runner").unwrap();
        assert_eq!(runner.transform.last_frame(), Some(180));
    }

    #[test]
    fn test_demo_uses_config_defaults() {
        let mut config = ChoreoConfig::default();
        config.project.default_fps = 24.0;
        config.camera.default_focal_length = 50.0;
        let movie = demo_movie(&config);
        assert_eq!(movie.fps.fps(), 24.0);
        assert_eq!(movie.cameras[0].focal_length, 50.0);
    }
}

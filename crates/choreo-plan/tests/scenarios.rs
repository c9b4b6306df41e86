use choreo_core::{ChoreoError, DiagnosticSeverity, Direction, Distance, Speed, TimeSpan, Vec3};
use choreo_ir::{
    Actor, ActorScript, Camera, CameraScript, CompiledMovie, Corridor, Group, MoveBuilder,
    MovieBuilder, MovieDefinition, ResolvedEvent, Spline, SplineFollowBuilder, TransformKey,
};
use choreo_plan::{compile, Planner, PlanOptions};

const EPS: f64 = 1e-6;

fn last_key(compiled: &CompiledMovie, actor: &str) -> TransformKey {
    *compiled
        .actor(actor)
        .and_then(|a| a.transform.last())
        .expect("actor track")
}

fn key_at(compiled: &CompiledMovie, actor: &str, frame: u64) -> TransformKey {
    *compiled
        .actor(actor)
        .and_then(|a| a.transform.keys().iter().find(|k| k.frame == frame))
        .expect("key at frame")
}

fn forward(meters: f64, seconds: f64) -> MoveBuilder {
    MoveBuilder::forward().distance_in_time(Distance::meters(meters), TimeSpan::seconds(seconds))
}

fn has_warning(compiled: &CompiledMovie, needle: &str) -> bool {
    compiled
        .diagnostics
        .iter()
        .any(|d| d.severity == DiagnosticSeverity::Warning && d.message.contains(needle))
}

fn assert_all_finite(compiled: &CompiledMovie) {
    for actor in &compiled.actors {
        for k in actor.transform.keys() {
            for v in [k.x, k.y, k.z, k.pitch, k.yaw, k.roll] {
                assert!(v.is_finite(), "'{}' frame {}: {:?}", actor.actor.name, k.frame, k);
            }
        }
    }
    for camera in &compiled.cameras {
        for k in camera.transform.keys() {
            for v in [k.x, k.y, k.z, k.pitch, k.yaw, k.roll] {
                assert!(v.is_finite(), "'{}' frame {}: {:?}", camera.camera.name, k.frame, k);
            }
        }
        for k in camera.settings.keys() {
            assert!(k.focal_length.is_finite(), "'{}' {:?}", camera.camera.name, k);
            let focus_ok = k.focus_distance.map_or(true, f64::is_finite);
            assert!(focus_ok, "'{}' {:?}", camera.camera.name, k);
        }
    }
}

/// A constant-speed move that starts on a frame boundary after a stay.
fn staggered() -> MovieDefinition {
    MovieBuilder::new("staggered", 30.0)
        .actor(Actor::new("Runner"))
        .camera(Camera::new("Cam").at(Vec3::new(0.0, -500.0, 150.0)))
        .script(
            ActorScript::new("Runner").stay(TimeSpan::seconds(1.0)).move_straight(
                MoveBuilder::toward(Direction::North)
                    .distance_at_speed(Distance::meters(10.0), Speed::mps(2.0)),
            ),
        )
        .script(CameraScript::new("Cam").track("Runner"))
        .build()
}

fn sprint() -> MovieDefinition {
    MovieBuilder::new("sprint", 30.0)
        .actor(Actor::new("Runner").facing(0.0))
        .camera(Camera::new("Cam").at(Vec3::new(5000.0, 0.0, 200.0)))
        .script(
            ActorScript::new("Runner").move_straight(
                MoveBuilder::toward(Direction::North)
                    .distance(Distance::meters(100.0))
                    .ramp(Speed::mps(0.0), Speed::mps(10.0))
                    .anim("Sprint"),
            ),
        )
        .script(CameraScript::new("Cam").look_at("Runner"))
        .build()
}

#[test]
fn test_sprint_reaches_finish_line() {
    let compiled = compile(&sprint()).unwrap();
    // 100m from rest to 10 m/s takes 20s
    assert_eq!(compiled.duration_frames, 600);
    let finish = last_key(&compiled, "Runner");
    assert_eq!(finish.frame, 600);
    assert!((finish.x - 10000.0).abs() < EPS);
    assert!(finish.y.abs() < EPS);
    assert!(finish.z.abs() < EPS);

    let halfway = key_at(&compiled, "Runner", 300);
    // a = 50 cm/s^2, so 0.5 * a * 10^2
    assert!((halfway.x - 2500.0).abs() < EPS);
}

#[test]
fn test_sprint_camera_looks_back_until_runner_passes() {
    let compiled = compile(&sprint()).unwrap();
    let cam = compiled.camera("Cam").unwrap();
    let keys = cam.transform.keys();
    assert_eq!(keys.len(), 601);
    for key in &keys[..400] {
        assert!((key.yaw - 180.0).abs() < EPS, "frame {} yaw {}", key.frame, key.yaw);
        assert!(key.pitch < 0.0);
    }
    assert!(keys[600].yaw.abs() < EPS);
}

#[test]
fn test_tracks_are_monotonic_from_zero() {
    for movie in [sprint(), staggered()] {
        let compiled = compile(&movie).unwrap();
        for actor in &compiled.actors {
            assert!(actor.transform.is_monotonic());
            assert_eq!(actor.transform.first_frame(), Some(0));
        }
        for camera in &compiled.cameras {
            assert!(camera.transform.is_monotonic());
            assert!(camera.settings.is_monotonic());
            assert_eq!(camera.settings.first_frame(), Some(0));
        }
        assert_all_finite(&compiled);
    }
}

#[test]
fn test_move_after_stay_starts_in_place() {
    let compiled = compile(&staggered()).unwrap();
    assert_all_finite(&compiled);

    let start = key_at(&compiled, "Runner", 30);
    assert!(start.x.abs() < EPS && start.y.abs() < EPS);
    let next = key_at(&compiled, "Runner", 31);
    assert!((next.x - 200.0 / 30.0).abs() < EPS);
    let end = last_key(&compiled, "Runner");
    assert_eq!(end.frame, 180);
    assert!((end.x - 1000.0).abs() < EPS);

    let cam = compiled.camera("Cam").unwrap();
    let key = cam.transform.keys().iter().find(|k| k.frame == 30).unwrap();
    assert!((key.yaw - 90.0).abs() < EPS);
    let settings = cam.settings.keys().iter().find(|k| k.frame == 30).unwrap();
    assert!(settings.focus_distance.unwrap() > 0.0);
}

#[test]
fn test_compilation_is_deterministic() {
    let a = compile(&sprint()).unwrap();
    let b = compile(&sprint()).unwrap();
    assert_eq!(a.content_hash().unwrap(), b.content_hash().unwrap());
    assert_eq!(a, b);
}

#[test]
fn test_till_end_matches_longest_actor() {
    let movie = MovieBuilder::new("two_pass", 30.0)
        .actor(Actor::new("Mover"))
        .actor(Actor::new("Waiter").at(Vec3::new(0.0, 300.0, 0.0)))
        .script(
            ActorScript::new("Mover").move_straight(
                forward(5.0, 5.0),
            ),
        )
        .script(ActorScript::new("Waiter").stay_till_end().anim("Idle"))
        .build();
    let compiled = compile(&movie).unwrap();
    assert_all_finite(&compiled);
    assert_eq!(last_key(&compiled, "Mover").frame, 150);
    assert_eq!(last_key(&compiled, "Waiter").frame, 150);
    assert_eq!(compiled.actor("Waiter").unwrap().transform.len(), 151);
    let clip = &compiled.actor("Waiter").unwrap().animation.keys()[0];
    assert_eq!((clip.start_frame, clip.end_frame), (0, 150));
}

#[test]
fn test_till_end_without_terminal_time_fails() {
    let movie = MovieBuilder::new("open", 30.0)
        .actor(Actor::new("A"))
        .script(ActorScript::new("A").stay_till_end())
        .build();
    assert!(matches!(compile(&movie), Err(ChoreoError::UnresolvedTillEnd)));

    let bounded = MovieBuilder::new("bounded", 30.0)
        .duration(TimeSpan::seconds(4.0))
        .actor(Actor::new("A"))
        .script(ActorScript::new("A").stay_till_end())
        .build();
    let compiled = compile(&bounded).unwrap();
    assert_eq!(compiled.duration_frames, 120);
    assert_eq!(last_key(&compiled, "A").frame, 120);
}

#[test]
fn test_wait_until_aligns_to_movie_time() {
    let movie = MovieBuilder::new("cue", 30.0)
        .actor(Actor::new("A"))
        .actor(Actor::new("B").at(Vec3::new(0.0, 300.0, 0.0)))
        .script(
            ActorScript::new("A")
                .stay(TimeSpan::seconds(1.0))
                .wait_until(TimeSpan::seconds(3.0))
                .anim("Idle")
                .move_straight(
                    MoveBuilder::toward(Direction::North)
                        .distance_at_speed(Distance::meters(2.0), Speed::mps(1.0)),
                ),
        )
        .script(
            ActorScript::new("B")
                .stay(TimeSpan::seconds(2.0))
                .wait_until(TimeSpan::seconds(1.0))
                .move_straight(
                    MoveBuilder::toward(Direction::North)
                        .distance_at_speed(Distance::meters(1.0), Speed::mps(1.0)),
                ),
        )
        .build();
    let compiled = compile(&movie).unwrap();
    assert_all_finite(&compiled);

    // A holds until 3s, then walks for 2s
    assert!(key_at(&compiled, "A", 90).x.abs() < EPS);
    assert!((key_at(&compiled, "A", 120).x - 100.0).abs() < EPS);
    assert_eq!(last_key(&compiled, "A").frame, 150);
    let idle = compiled.actor("A").unwrap().animation.active_at(60).unwrap();
    assert_eq!(idle.name, "Idle");

    // B is already past 1s, so the wait changes nothing
    assert!(key_at(&compiled, "B", 60).x.abs() < EPS);
    assert_eq!(last_key(&compiled, "B").frame, 90);
}

#[test]
fn test_short_declared_duration_warns() {
    let movie = MovieBuilder::new("short", 30.0)
        .duration(TimeSpan::seconds(1.0))
        .actor(Actor::new("A"))
        .script(ActorScript::new("A").stay(TimeSpan::seconds(2.0)))
        .build();
    let compiled = compile(&movie).unwrap();
    assert_eq!(compiled.duration_frames, 60);
    assert!(has_warning(&compiled, "declared duration"));
}

#[test]
fn test_lane_change_drifts_linearly() {
    let movie = MovieBuilder::new("lanes", 30.0)
        .actor(Actor::new("A"))
        .script(
            ActorScript::new("A")
                .move_straight(
                    MoveBuilder::toward(Direction::North)
                        .distance_in_time(Distance::meters(10.0), TimeSpan::seconds(2.0))
                        .corridor(Corridor::meters(0.0, 1.22)),
                )
                .move_straight(
                    MoveBuilder::toward(Direction::North)
                        .distance_in_time(Distance::meters(10.0), TimeSpan::seconds(2.0))
                        .corridor(Corridor::meters(6.10, 7.32)),
                ),
        )
        .build();
    let compiled = compile(&movie).unwrap();

    // first corridor anchors in place
    assert!(key_at(&compiled, "A", 60).y.abs() < EPS);
    // halfway through the shift the offset sits between the two midpoints
    let mid = key_at(&compiled, "A", 90);
    assert!((mid.x - 1500.0).abs() < EPS);
    assert!((61.0 + mid.y - 366.0).abs() < EPS);
    let end = last_key(&compiled, "A");
    assert!((end.y - 610.0).abs() < EPS);
    assert!((end.x - 2000.0).abs() < EPS);
}

#[test]
fn test_narrow_corridor_is_widened_not_fatal() {
    let movie = MovieBuilder::new("narrow", 30.0)
        .actor(Actor::new("A"))
        .script(
            ActorScript::new("A").move_straight(
                MoveBuilder::forward()
                    .distance_at_speed(Distance::meters(4.0), Speed::mps(2.0))
                    .corridor(Corridor::meters(0.0, 0.5)),
            ),
        )
        .build();
    let compiled = compile(&movie).unwrap();
    assert!(has_warning(&compiled, "widened"));
    assert_eq!(last_key(&compiled, "A").frame, 60);
}

#[test]
fn test_nearest_edge_anchor_keeps_position_inside() {
    let movie = MovieBuilder::new("edge", 10.0)
        .actor(Actor::new("A"))
        .script(
            ActorScript::new("A")
                .move_straight(
                    MoveBuilder::forward()
                        .distance_in_time(Distance::meters(1.0), TimeSpan::seconds(1.0))
                        .corridor(Corridor::meters(0.0, 3.0)),
                )
                .move_straight(
                    MoveBuilder::forward()
                        .distance_in_time(Distance::meters(1.0), TimeSpan::seconds(1.0))
                        .corridor(Corridor::meters(1.0, 4.0)),
                ),
        )
        .build();
    let options =
        PlanOptions::default().with_corridor_anchor(choreo_core::CorridorAnchor::NearestEdge);
    let compiled = Planner::new(options).compile(&movie).unwrap();
    assert!(last_key(&compiled, "A").y.abs() < EPS);

    let midpoint = compile(&movie).unwrap();
    assert!((last_key(&midpoint, "A").y - 100.0).abs() < EPS);
}

fn straight_line() -> Spline {
    Spline::new(
        "path",
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1000.0, 0.0),
            Vec3::new(0.0, 2000.0, 0.0),
        ],
    )
}

#[test]
fn test_follow_spline_heads_along_tangent() {
    let movie = MovieBuilder::new("spline", 30.0)
        .actor(Actor::new("A"))
        .spline(straight_line())
        .script(
            ActorScript::new("A")
                .follow_spline(SplineFollowBuilder::along("path").speed(Speed::mps(5.0))),
        )
        .build();
    let compiled = compile(&movie).unwrap();
    let end = last_key(&compiled, "A");
    assert_eq!(end.frame, 120);
    assert!((end.y - 2000.0).abs() < 1e-3);
    assert!((end.yaw - 90.0).abs() < 1e-3);
}

#[test]
fn test_follow_spline_in_reverse() {
    let movie = MovieBuilder::new("reverse", 30.0)
        .actor(Actor::new("A").at(Vec3::new(0.0, 2000.0, 0.0)))
        .spline(straight_line())
        .script(
            ActorScript::new("A").follow_spline(
                SplineFollowBuilder::along("path")
                    .duration(TimeSpan::seconds(4.0))
                    .reverse(),
            ),
        )
        .build();
    let compiled = compile(&movie).unwrap();
    let end = last_key(&compiled, "A");
    assert!(end.y.abs() < 1e-3);
    assert!((end.yaw + 90.0).abs() < 1e-3);
}

#[test]
fn test_open_spline_overrun_clamps_with_warning() {
    let movie = MovieBuilder::new("overrun", 30.0)
        .actor(Actor::new("A"))
        .spline(straight_line())
        .script(
            ActorScript::new("A").follow_spline(
                SplineFollowBuilder::along("path")
                    .distance(Distance::meters(30.0))
                    .speed(Speed::mps(10.0)),
            ),
        )
        .build();
    let compiled = compile(&movie).unwrap();
    assert!(has_warning(&compiled, "open spline"));
    assert!((last_key(&compiled, "A").y - 2000.0).abs() < 1e-3);
}

#[test]
fn test_closed_spline_lap_returns_to_start() {
    let square = Spline::new(
        "loop",
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1000.0, 0.0, 0.0),
            Vec3::new(1000.0, 1000.0, 0.0),
            Vec3::new(0.0, 1000.0, 0.0),
        ],
    )
    .closed();
    let movie = MovieBuilder::new("lap", 30.0)
        .actor(Actor::new("A"))
        .spline(square)
        .script(
            ActorScript::new("A")
                .follow_spline(SplineFollowBuilder::along("loop").speed(Speed::mps(4.0))),
        )
        .build();
    let compiled = compile(&movie).unwrap();
    let end = last_key(&compiled, "A");
    assert!(Vec3::new(end.x, end.y, end.z).length() < 1e-3);
    assert!(compiled.diagnostics.is_empty());
}

#[test]
fn test_simultaneous_group_shares_start() {
    let movie = MovieBuilder::new("group", 30.0)
        .actor(Actor::new("A"))
        .actor(Actor::new("B").at(Vec3::new(0.0, 500.0, 0.0)))
        .script(ActorScript::new("A").stay(TimeSpan::seconds(2.0)))
        .simultaneous(
            Group::new()
                .with(ActorScript::new("A").move_straight(
                    forward(1.0, 1.0),
                ))
                .with(ActorScript::new("B").move_straight(
                    forward(1.0, 1.0),
                )),
        )
        .build();
    let compiled = compile(&movie).unwrap();

    let b = compiled.actor("B").unwrap();
    let frames: Vec<u64> = b.transform.keys().iter().map(|k| k.frame).collect();
    assert_eq!(frames, (0..=90).collect::<Vec<_>>());
    // B holds until the group starts at frame 60
    assert!(key_at(&compiled, "B", 60).x.abs() < EPS);
    assert!((last_key(&compiled, "B").x - 100.0).abs() < EPS);
    assert_eq!(last_key(&compiled, "A").frame, 90);
    assert!((last_key(&compiled, "A").x - 100.0).abs() < EPS);
}

#[test]
fn test_animation_continues_and_merges() {
    let movie = MovieBuilder::new("anims", 30.0)
        .actor(Actor::new("A"))
        .script(
            ActorScript::new("A")
                .move_straight(
                    MoveBuilder::forward()
                        .distance_in_time(Distance::meters(2.0), TimeSpan::seconds(1.0))
                        .anim("Jog"),
                )
                .move_straight(
                    forward(2.0, 1.0),
                )
                .stay(TimeSpan::seconds(1.0))
                .anim("Idle"),
        )
        .build();
    let compiled = compile(&movie).unwrap();
    let clips = compiled.actor("A").unwrap().animation.keys();
    assert_eq!(clips.len(), 2);
    assert_eq!((clips[0].name.as_str(), clips[0].start_frame, clips[0].end_frame), ("Jog", 0, 60));
    let idle = &clips[1];
    assert_eq!((idle.name.as_str(), idle.start_frame, idle.end_frame), ("Idle", 60, 90));
}

#[test]
fn test_face_actor_turns_toward_target() {
    let movie = MovieBuilder::new("face", 30.0)
        .actor(Actor::new("A"))
        .actor(Actor::new("B").at(Vec3::new(0.0, 500.0, 0.0)))
        .script(ActorScript::new("A").face_actor("B"))
        .build();
    let compiled = compile(&movie).unwrap();
    let end = last_key(&compiled, "A");
    assert_eq!(end.frame, 30);
    assert!((end.yaw - 90.0).abs() < EPS);
}

#[test]
fn test_relative_direction_follows_facing() {
    let movie = MovieBuilder::new("relative", 10.0)
        .actor(Actor::new("A").facing(90.0))
        .script(
            ActorScript::new("A").move_straight(
                MoveBuilder::toward(Direction::Left)
                    .distance_in_time(Distance::meters(1.0), TimeSpan::seconds(1.0)),
            ),
        )
        .build();
    let compiled = compile(&movie).unwrap();
    let end = last_key(&compiled, "A");
    // facing east, left is north
    assert!((end.x - 100.0).abs() < EPS);
    assert!(end.y.abs() < EPS);
    assert!((end.yaw - 90.0).abs() < EPS);
}

#[test]
fn test_infinite_speed_reports_command() {
    let movie = MovieBuilder::new("teleport", 30.0)
        .actor(Actor::new("A"))
        .script(
            ActorScript::new("A")
                .stay(TimeSpan::seconds(1.0))
                .move_straight(
                    forward(5.0, 0.0),
                ),
        )
        .build();
    match compile(&movie) {
        Err(ChoreoError::Command { entity, index, message }) => {
            assert_eq!(entity, "A");
            assert_eq!(index, 1);
            assert!(message.contains("infinite speed"));
        }
        other => panic!("expected command error, got {:?}", other.map(|c| c.name)),
    }
}

#[test]
fn test_unresolved_actor_fails_before_sampling() {
    let movie = MovieBuilder::new("ghost", 30.0)
        .actor(Actor::new("A"))
        .script(ActorScript::new("Ghost").stay(TimeSpan::seconds(1.0)))
        .build();
    match compile(&movie) {
        Err(ChoreoError::Validation(errors)) => {
            assert!(errors.iter().any(|e| matches!(
                e,
                ChoreoError::UnresolvedReference { name, .. } if name == "Ghost"
            )));
        }
        other => panic!("expected validation error, got {:?}", other.map(|c| c.name)),
    }
}

#[test]
fn test_auto_zoom_stays_within_bounds() {
    let movie = MovieBuilder::new("zoom", 30.0)
        .actor(Actor::new("A"))
        .camera(Camera::new("Cam").at(Vec3::new(0.0, 0.0, 100.0)))
        .script(
            ActorScript::new("A").move_straight(
                MoveBuilder::toward(Direction::North)
                    .distance_at_speed(Distance::meters(100.0), Speed::mps(10.0)),
            ),
        )
        .script(CameraScript::new("Cam").auto_focus("A").auto_zoom_to("A", 0.7, 18.0, 85.0))
        .build();
    let compiled = compile(&movie).unwrap();
    let settings = compiled.camera("Cam").unwrap().settings.keys();
    assert_eq!(settings.len(), 301);
    for key in settings {
        assert!(key.focal_length >= 18.0 - EPS && key.focal_length <= 85.0 + EPS);
        assert!(key.focus_distance.is_some());
    }
    // somewhere mid-run the ideal focal length is inside the bounds
    assert!(settings.iter().any(|k| k.focal_length > 18.0 + EPS && k.focal_length < 85.0 - EPS));
    assert!(has_warning(&compiled, "clamped"));
}

#[test]
fn test_attached_camera_rides_with_actor() {
    let movie = MovieBuilder::new("rig", 30.0)
        .actor(Actor::new("A").facing(90.0))
        .camera(Camera::new("Chase").attached_to("A", Vec3::new(-300.0, 0.0, 150.0)))
        .script(
            ActorScript::new("A").move_straight(
                forward(10.0, 2.0),
            ),
        )
        .build();
    let compiled = compile(&movie).unwrap();
    let cam = compiled.camera("Chase").unwrap().transform.last().copied().unwrap();
    // actor ends at (0, 1000); three meters behind it along -Y
    assert!(cam.x.abs() < EPS);
    assert!((cam.y - 700.0).abs() < EPS);
    assert!((cam.z - 150.0).abs() < EPS);
    assert!((cam.yaw - 90.0).abs() < EPS);
}

#[test]
fn test_timeline_resolves_to_frames() {
    let movie = MovieBuilder::new("cuts", 24.0)
        .actor(Actor::new("A"))
        .camera(Camera::new("Wide"))
        .camera(Camera::new("Close"))
        .script(ActorScript::new("A").stay(TimeSpan::seconds(3.0)))
        .camera_cut(TimeSpan::seconds(1.5), "Close")
        .camera_cut(TimeSpan::seconds(0.0), "Wide")
        .marker(TimeSpan::seconds(2.0), "beat")
        .build();
    let compiled = compile(&movie).unwrap();
    let frames: Vec<u64> = compiled.timeline.iter().map(ResolvedEvent::frame).collect();
    assert_eq!(frames, vec![0, 36, 48]);
    assert!(matches!(
        &compiled.timeline[1],
        ResolvedEvent::CameraCut { camera, .. } if camera == "Close"
    ));
}

//! The choreography compiler: scripts in, per-frame tracks out.
//!
//! Compilation walks the script block by block. Each actor keeps a cursor in
//! seconds; every command turns into a closed-form pose over its time span and
//! is sampled once per frame. Open-ended stays are parked during that walk and
//! resolved once the movie's end is known. Cameras are sampled last, against
//! the finished actor tracks.

use std::collections::HashMap;

use choreo_core::direction::{heading, shortest_yaw, unwrap_yaw, yaw_vector};
use choreo_core::{ChoreoError, ChoreoResult, Distance, FrameRate, Rotator, Transform, Vec3};
use choreo_ir::{
    validate_movie, Actor, ActorSequence, ActorTracks, AnimationRef, AnimationSegment,
    AnimationTrack, AutoZoomConfig, Block, Camera, CameraCommand, CameraSequence,
    CameraSettingsKey, CameraSettingsTrack, CameraTracks, Command, CompiledMovie, FaceCommand,
    FaceTarget, FollowSplineCommand, MoveCommand, MovieDefinition, ResolvedEvent, StayCommand,
    StayDuration, TimelineEvent, TransformKey, TransformTrack,
};

use crate::context::{CompileContext, PlanOptions};
use crate::corridor::{fit_to_radius, plan_shift, CorridorBounds, LateralState};
use crate::framing::{frame_shot, FramingState, SubjectPose, SubjectTarget};
use crate::kinematics::resolve;
use crate::spline::{SplinePath, SplineSample};

const EPS: f64 = 1e-9;

/// Compiles movie definitions with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    options: PlanOptions,
}

impl Planner {
    pub fn new(options: PlanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    /// Validate and compile `movie`.
    ///
    /// Validation failures abort before any track is sampled. Recoverable
    /// clamps are returned as diagnostics on the compiled movie.
    pub fn compile(&self, movie: &MovieDefinition) -> ChoreoResult<CompiledMovie> {
        validate_movie(movie).map_err(ChoreoError::Validation)?;
        tracing::info!(
            "compiling '{}' at {} ({} actors, {} cameras)",
            movie.name,
            movie.fps,
            movie.actors.len(),
            movie.cameras.len()
        );

        let mut session = Session::new(movie, self.options.clone());
        for block in &movie.script {
            session.run_block(block)?;
        }
        let end_frame = session.resolve_till_end()?;
        session.finish(end_frame)
    }
}

/// Compile with default options.
pub fn compile(movie: &MovieDefinition) -> ChoreoResult<CompiledMovie> {
    Planner::default().compile(movie)
}

struct Lane {
    heading: f64,
    state: LateralState,
}

struct PendingStay {
    index: usize,
    start: f64,
    animation: Option<AnimationRef>,
}

struct ActorPlan<'m> {
    actor: &'m Actor,
    location: Vec3,
    /// Logical heading, without the mesh offset.
    yaw: f64,
    pitch: f64,
    emitted_yaw: f64,
    speed: f64,
    animation: Option<AnimationRef>,
    cursor: f64,
    lane: Option<Lane>,
    next_index: usize,
    till_end: Option<PendingStay>,
    transform: TransformTrack,
    clips: AnimationTrack,
}

impl<'m> ActorPlan<'m> {
    fn new(actor: &'m Actor) -> Self {
        let mut plan = Self {
            actor,
            location: actor.location,
            yaw: actor.initial_yaw,
            pitch: 0.0,
            emitted_yaw: actor.initial_yaw + actor.yaw_offset,
            speed: 0.0,
            animation: None,
            cursor: 0.0,
            lane: None,
            next_index: 0,
            till_end: None,
            transform: TransformTrack::new(),
            clips: AnimationTrack::new(),
        };
        plan.key(0, actor.location, actor.initial_yaw, 0.0);
        plan
    }

    fn name(&self) -> &'m str {
        let actor: &'m Actor = self.actor;
        &actor.name
    }

    fn key(&mut self, frame: u64, location: Vec3, yaw: f64, pitch: f64) {
        self.emitted_yaw = unwrap_yaw(self.emitted_yaw, yaw + self.actor.yaw_offset);
        let rotation = Rotator::new(pitch, self.emitted_yaw, 0.0);
        self.transform
            .push(TransformKey::new(frame, &Transform::new(location, rotation)));
    }

    /// Sample `pose(local_t)` on every frame from `start` to `start + duration`.
    /// The last frame always sees the exact end of the span.
    fn sample_span(
        &mut self,
        fps: FrameRate,
        start: f64,
        duration: f64,
        pose: impl Fn(f64) -> (Vec3, f64, f64),
    ) -> (u64, u64) {
        let start_frame = fps.frame_at(start);
        let end_frame = fps.frame_at(start + duration);
        for frame in start_frame..=end_frame {
            let local = if frame == end_frame {
                duration
            } else {
                (fps.seconds_at(frame) - start).clamp(0.0, duration)
            };
            let (location, yaw, pitch) = pose(local);
            self.key(frame, location, yaw, pitch);
        }
        (start_frame, end_frame)
    }

    /// Select `animation` (or keep the current one) across a frame range.
    fn play(&mut self, animation: Option<&AnimationRef>, start_frame: u64, end_frame: u64) {
        if let Some(animation) = animation {
            self.animation = Some(animation.clone());
        }
        if let Some(current) = &self.animation {
            self.clips.extend_or_push(AnimationSegment {
                start_frame,
                end_frame,
                name: current.name.clone(),
                speed_multiplier: current.speed_multiplier,
            });
        }
    }

    fn hold(&mut self, fps: FrameRate, duration: f64) -> (u64, u64) {
        let (location, yaw, pitch) = (self.location, self.yaw, self.pitch);
        let start = self.cursor;
        let span = self.sample_span(fps, start, duration, |_| (location, yaw, pitch));
        self.cursor += duration;
        self.speed = 0.0;
        span
    }

    /// Fill the gap up to `time` with hold keys.
    fn hold_until(&mut self, fps: FrameRate, time: f64) {
        if time <= self.cursor + EPS {
            return;
        }
        let (start_frame, end_frame) = self.hold(fps, time - self.cursor);
        self.play(None, start_frame, end_frame);
    }

    fn run_move(
        &mut self,
        ctx: &mut CompileContext,
        index: usize,
        cmd: &MoveCommand,
    ) -> ChoreoResult<()> {
        let name = self.name();
        let motion = resolve(&cmd.motion).map_err(|e| ChoreoError::command(name, index, e))?;
        for warning in motion.warnings {
            ctx.warn(name, Some(index), warning);
        }
        let profile = motion.profile;

        let heading = heading(cmd.direction, self.yaw, cmd.direction_offset);
        let forward = yaw_vector(heading);
        let right = yaw_vector(heading + 90.0);

        let shift = match &cmd.corridor {
            Some(corridor) => {
                let radius = self.actor.radius.to_internal();
                let declared = CorridorBounds::from_corridor(corridor);
                let fit = fit_to_radius(declared, radius);
                if fit.widened {
                    ctx.warn(
                        name,
                        Some(index),
                        format!(
                            "corridor {:.1}cm wide cannot hold radius {:.1}cm, widened to {:.1}cm",
                            declared.width(),
                            radius,
                            fit.bounds.width()
                        ),
                    );
                }
                let previous = self
                    .lane
                    .as_ref()
                    .filter(|lane| shortest_yaw(lane.heading, heading).abs() < 1e-6)
                    .map(|lane| &lane.state);
                let shift = plan_shift(previous, fit.bounds, radius, ctx.options.corridor_anchor);
                self.lane = Some(Lane {
                    heading,
                    state: shift.end_state(fit.bounds),
                });
                Some(shift)
            }
            None => {
                self.lane = None;
                None
            }
        };

        let origin = self.location;
        let yaw = self.yaw;
        let duration = profile.duration();
        let pose = |t: f64| {
            let fraction = if duration > EPS { t / duration } else { 1.0 };
            let lateral = shift.map_or(0.0, |s| s.delta_at(fraction));
            (origin + forward * profile.distance_at(t) + right * lateral, yaw, 0.0)
        };
        let (end_location, _, _) = pose(duration);
        let start = self.cursor;
        let (start_frame, end_frame) = self.sample_span(ctx.fps, start, duration, pose);
        self.play(cmd.animation.as_ref(), start_frame, end_frame);

        tracing::debug!(
            "{} #{}: move {:.1}cm heading {:.1} over {:.3}s from {:.1}cm/s (frames {}..={})",
            name,
            index,
            profile.distance(),
            heading,
            duration,
            self.speed,
            start_frame,
            end_frame
        );
        self.location = end_location;
        self.pitch = 0.0;
        self.speed = profile.end_speed();
        self.cursor += duration;
        Ok(())
    }

    fn run_face(
        &mut self,
        ctx: &mut CompileContext,
        index: usize,
        cmd: &FaceCommand,
        target_yaw: f64,
    ) {
        let from = self.yaw;
        let delta = shortest_yaw(from, target_yaw);
        let duration = cmd.duration.to_internal().max(0.0);
        let location = self.location;
        let pose = |t: f64| {
            let fraction = if duration > EPS { t / duration } else { 1.0 };
            (location, from + delta * fraction, 0.0)
        };
        let start = self.cursor;
        let (start_frame, end_frame) = self.sample_span(ctx.fps, start, duration, pose);
        self.play(cmd.animation.as_ref(), start_frame, end_frame);

        tracing::debug!(
            "{} #{}: turn {:.1} -> {:.1} over {:.3}s",
            self.name(),
            index,
            from,
            from + delta,
            duration
        );
        self.yaw = from + delta;
        self.pitch = 0.0;
        self.speed = 0.0;
        self.cursor += duration;
    }

    fn run_stay(&mut self, ctx: &mut CompileContext, index: usize, cmd: &StayCommand) {
        match cmd.duration {
            StayDuration::For(span) => {
                let (start_frame, end_frame) = self.hold(ctx.fps, span.to_internal().max(0.0));
                self.play(cmd.animation.as_ref(), start_frame, end_frame);
            }
            StayDuration::Until(at) => {
                let at = at.to_internal();
                if at <= self.cursor + EPS {
                    tracing::debug!(
                        "{} #{}: wait until {:.3}s already passed at {:.3}s",
                        self.name(),
                        index,
                        at,
                        self.cursor
                    );
                    return;
                }
                let (start_frame, end_frame) = self.hold(ctx.fps, at - self.cursor);
                self.play(cmd.animation.as_ref(), start_frame, end_frame);
            }
            StayDuration::TillEnd => {
                tracing::debug!("{} #{}: stay until the end, deferred", self.name(), index);
                self.till_end = Some(PendingStay {
                    index,
                    start: self.cursor,
                    animation: cmd.animation.clone(),
                });
            }
        }
    }

    fn run_follow(
        &mut self,
        ctx: &mut CompileContext,
        index: usize,
        cmd: &FollowSplineCommand,
        path: &SplinePath,
    ) -> ChoreoResult<()> {
        let name = self.name();
        let length = path.length();
        let range_start = cmd.range_start.map_or(0.0, |d| d.to_internal()).clamp(0.0, length);
        let range_end = cmd
            .range_end
            .map_or(length, |d| d.to_internal())
            .clamp(0.0, length);

        let mut spec = cmd.motion;
        let timed_speed =
            spec.duration.is_some() && (spec.start_speed.is_some() || spec.end_speed.is_some());
        if spec.distance.is_none() && !timed_speed {
            spec.distance = Some(Distance::centimeters((range_end - range_start).abs()));
        }
        let motion = resolve(&spec).map_err(|e| ChoreoError::command(name, index, e))?;
        for warning in motion.warnings {
            ctx.warn(name, Some(index), warning);
        }
        let profile = motion.profile;

        let (origin, sign) = if cmd.reverse {
            (range_end, -1.0)
        } else {
            (range_start, 1.0)
        };
        let travel_end = origin + sign * profile.distance();
        if !path.is_closed() && (travel_end < -1e-6 || travel_end > length + 1e-6) {
            ctx.warn(
                name,
                Some(index),
                format!(
                    "travel of {:.1}cm overruns open spline '{}' ({:.1}cm long)",
                    profile.distance(),
                    cmd.spline,
                    length
                ),
            );
        }

        let pose = |t: f64| {
            let sample = path.sample_at(path.wrap(origin + sign * profile.distance_at(t)));
            let oriented = SplineSample {
                position: sample.position,
                tangent: sample.tangent * sign,
            };
            (oriented.position, oriented.yaw(), oriented.pitch())
        };
        let duration = profile.duration();
        let (end_location, end_yaw, end_pitch) = pose(duration);
        let start = self.cursor;
        let (start_frame, end_frame) = self.sample_span(ctx.fps, start, duration, pose);
        self.play(cmd.animation.as_ref(), start_frame, end_frame);

        tracing::debug!(
            "{} #{}: follow '{}' for {:.1}cm over {:.3}s",
            name,
            index,
            cmd.spline,
            profile.distance(),
            duration
        );
        self.location = end_location;
        self.yaw = end_yaw;
        self.pitch = end_pitch;
        self.speed = profile.end_speed();
        self.lane = None;
        self.cursor += duration;
        Ok(())
    }

    /// Sample a parked till-end stay up to `end_frame`.
    fn resolve_till_end(&mut self, ctx: &mut CompileContext, stay: PendingStay, end_frame: u64) {
        let fps = ctx.fps;
        let duration = (fps.seconds_at(end_frame) - stay.start).max(0.0);
        if fps.frame_at(stay.start) > end_frame {
            ctx.warn(
                self.name(),
                Some(stay.index),
                "till-end stay starts after the movie ends",
            );
        }
        let (start_frame, last) = self.hold(fps, duration);
        self.play(stay.animation.as_ref(), start_frame, last);
        tracing::debug!(
            "{} #{}: till-end stay resolved to frames {}..={}",
            self.name(),
            stay.index,
            start_frame,
            last
        );
    }

    /// Location at `frame`, from the track when it reaches that far.
    fn location_at(&self, frame: u64) -> Vec3 {
        match self.transform.last_frame() {
            Some(last) if last >= frame => self
                .transform
                .sample(frame)
                .map_or(self.location, |t| t.location),
            _ => self.location,
        }
    }

    fn pose_at(&self, frame: u64) -> Option<SubjectPose> {
        let transform = self.transform.sample(frame)?;
        Some(SubjectPose {
            location: transform.location,
            yaw: transform.rotation.yaw - self.actor.yaw_offset,
            height: self.actor.height.to_internal(),
        })
    }

    fn into_tracks(self) -> ActorTracks {
        ActorTracks {
            actor: self.actor.clone(),
            transform: self.transform,
            animation: self.clips,
        }
    }
}

struct Cue<'m> {
    time: f64,
    index: usize,
    command: &'m CameraCommand,
}

struct CameraPlan<'m> {
    camera: &'m Camera,
    cursor: f64,
    next_index: usize,
    cues: Vec<Cue<'m>>,
}

struct Session<'m> {
    movie: &'m MovieDefinition,
    ctx: CompileContext,
    actors: Vec<ActorPlan<'m>>,
    cameras: Vec<CameraPlan<'m>>,
    splines: HashMap<String, SplinePath>,
}

impl<'m> Session<'m> {
    fn new(movie: &'m MovieDefinition, options: PlanOptions) -> Self {
        Self {
            movie,
            ctx: CompileContext::new(movie.fps, options),
            actors: movie.actors.iter().map(ActorPlan::new).collect(),
            cameras: movie
                .cameras
                .iter()
                .map(|camera| CameraPlan {
                    camera,
                    cursor: 0.0,
                    next_index: 0,
                    cues: Vec::new(),
                })
                .collect(),
            splines: HashMap::new(),
        }
    }

    fn actor_index(&self, name: &str) -> ChoreoResult<usize> {
        self.actors
            .iter()
            .position(|plan| plan.actor.name == name)
            .ok_or_else(|| ChoreoError::unresolved("actor", name, "script"))
    }

    fn camera_index(&self, name: &str) -> ChoreoResult<usize> {
        self.cameras
            .iter()
            .position(|plan| plan.camera.name == name)
            .ok_or_else(|| ChoreoError::unresolved("camera", name, "script"))
    }

    /// Latest time any script has reached.
    fn horizon(&self) -> f64 {
        let actors = self.actors.iter().map(|plan| plan.cursor);
        let cameras = self.cameras.iter().map(|plan| plan.cursor);
        actors.chain(cameras).fold(0.0, f64::max)
    }

    fn run_block(&mut self, block: &'m Block) -> ChoreoResult<()> {
        match block {
            Block::Actor(seq) => self.run_actor_sequence(seq),
            Block::Camera(seq) => self.run_camera_sequence(seq),
            Block::Simultaneous(group) => {
                let start = self.horizon();
                tracing::debug!(
                    "simultaneous group of {} starts at {:.3}s",
                    group.members.len(),
                    start
                );
                for member in &group.members {
                    match member {
                        Block::Actor(seq) => {
                            let i = self.actor_index(&seq.actor)?;
                            self.actors[i].hold_until(self.ctx.fps, start);
                            self.run_actor_sequence(seq)?;
                        }
                        Block::Camera(seq) => {
                            let i = self.camera_index(&seq.camera)?;
                            let plan = &mut self.cameras[i];
                            plan.cursor = plan.cursor.max(start);
                            self.run_camera_sequence(seq)?;
                        }
                        Block::Simultaneous(_) => {
                            return Err(ChoreoError::invalid(
                                "simultaneous groups cannot be nested",
                            ))
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn run_actor_sequence(&mut self, seq: &'m ActorSequence) -> ChoreoResult<()> {
        let i = self.actor_index(&seq.actor)?;
        for command in &seq.commands {
            let plan = &mut self.actors[i];
            let index = plan.next_index;
            plan.next_index += 1;
            if plan.till_end.is_some() {
                return Err(ChoreoError::command(
                    &seq.actor,
                    index,
                    "no command may follow a till-end stay",
                ));
            }
            match command {
                Command::Move(cmd) => self.actors[i].run_move(&mut self.ctx, index, cmd)?,
                Command::Face(cmd) => {
                    let target_yaw = match self.face_yaw(i, &cmd.target)? {
                        Some(yaw) => yaw,
                        None => {
                            self.ctx.warn(
                                &seq.actor,
                                Some(index),
                                "face target coincides with the actor, keeping current yaw",
                            );
                            self.actors[i].yaw
                        }
                    };
                    self.actors[i].run_face(&mut self.ctx, index, cmd, target_yaw);
                }
                Command::Stay(cmd) => self.actors[i].run_stay(&mut self.ctx, index, cmd),
                Command::FollowSpline(cmd) => {
                    self.ensure_spline(&cmd.spline)?;
                    let path = self.splines.get(&cmd.spline).ok_or_else(|| {
                        ChoreoError::unresolved("spline", &cmd.spline, "follow_spline")
                    })?;
                    self.actors[i].run_follow(&mut self.ctx, index, cmd, path)?;
                }
            }
        }
        Ok(())
    }

    /// Absolute yaw a face command turns toward. `None` when the target
    /// actor stands on top of the facing one.
    fn face_yaw(&self, i: usize, target: &FaceTarget) -> ChoreoResult<Option<f64>> {
        let plan = &self.actors[i];
        match target {
            FaceTarget::Direction { direction, offset } => {
                Ok(Some(heading(*direction, plan.yaw, *offset)))
            }
            FaceTarget::Yaw { degrees } => Ok(Some(*degrees)),
            FaceTarget::Actor { name } => {
                let other = &self.actors[self.actor_index(name)?];
                let frame = self.ctx.fps.frame_at(plan.cursor);
                let delta = other.location_at(frame) - plan.location;
                if delta.horizontal_length() < 1e-6 {
                    Ok(None)
                } else {
                    Ok(Some(delta.y.atan2(delta.x).to_degrees()))
                }
            }
        }
    }

    fn ensure_spline(&mut self, name: &str) -> ChoreoResult<()> {
        if self.splines.contains_key(name) {
            return Ok(());
        }
        let spline = self
            .movie
            .spline(name)
            .ok_or_else(|| ChoreoError::unresolved("spline", name, "follow_spline"))?;
        let path = SplinePath::new(spline, self.ctx.options.samples_per_segment)?;
        tracing::debug!("spline '{}' is {:.1}cm long", name, path.length());
        self.splines.insert(name.to_string(), path);
        Ok(())
    }

    fn run_camera_sequence(&mut self, seq: &'m CameraSequence) -> ChoreoResult<()> {
        let i = self.camera_index(&seq.camera)?;
        let plan = &mut self.cameras[i];
        for command in &seq.commands {
            let index = plan.next_index;
            plan.next_index += 1;
            plan.cues.push(Cue {
                time: plan.cursor,
                index,
                command,
            });
            if let CameraCommand::Hold { duration } = command {
                plan.cursor += duration.to_internal().max(0.0);
            }
        }
        Ok(())
    }

    /// Pick the movie's last frame and sample every parked till-end stay to it.
    fn resolve_till_end(&mut self) -> ChoreoResult<u64> {
        let fps = self.ctx.fps;
        let actor_extent = self
            .actors
            .iter()
            .filter_map(|plan| plan.transform.last_frame());
        let camera_extent = self.cameras.iter().map(|plan| fps.frame_at(plan.cursor));
        let extent = actor_extent.chain(camera_extent).max().unwrap_or(0);
        let pending = self.actors.iter().filter(|plan| plan.till_end.is_some()).count();

        let end_frame = match self.movie.duration {
            Some(duration) => {
                let declared = fps.frame_at(duration.to_internal());
                if declared < extent {
                    self.ctx.warn(
                        &self.movie.name,
                        None,
                        format!(
                            "declared duration ends at frame {} but scripts run to frame {}",
                            declared, extent
                        ),
                    );
                }
                declared.max(extent)
            }
            None if pending > 0 && extent == 0 => return Err(ChoreoError::UnresolvedTillEnd),
            None => extent,
        };

        for plan in &mut self.actors {
            if let Some(stay) = plan.till_end.take() {
                plan.resolve_till_end(&mut self.ctx, stay, end_frame);
            }
        }
        if pending > 0 {
            tracing::info!("resolved {} till-end stays to frame {}", pending, end_frame);
        }
        Ok(end_frame)
    }

    fn resolve_timeline(&mut self, end_frame: u64) -> Vec<ResolvedEvent> {
        let fps = self.ctx.fps;
        let mut events: Vec<ResolvedEvent> = Vec::with_capacity(self.movie.timeline.len());
        for event in &self.movie.timeline {
            let time = event.at().to_internal();
            let frame = fps.frame_at(time);
            if frame > end_frame {
                self.ctx.warn(
                    &self.movie.name,
                    None,
                    format!(
                        "timeline event at frame {} falls after the last frame {}",
                        frame, end_frame
                    ),
                );
            }
            events.push(match event {
                TimelineEvent::CameraCut { camera, .. } => ResolvedEvent::CameraCut {
                    frame,
                    time,
                    camera: camera.clone(),
                },
                TimelineEvent::Marker { label, .. } => ResolvedEvent::Marker {
                    frame,
                    time,
                    label: label.clone(),
                },
            });
        }
        events.sort_by_key(ResolvedEvent::frame);
        events
    }

    fn finish(mut self, end_frame: u64) -> ChoreoResult<CompiledMovie> {
        let cameras = self
            .cameras
            .iter()
            .map(|plan| sample_camera(plan, &self.actors, &mut self.ctx, end_frame))
            .collect::<Vec<_>>();
        let timeline = self.resolve_timeline(end_frame);

        let compiled = CompiledMovie {
            name: self.movie.name.clone(),
            fps: self.movie.fps,
            duration_frames: end_frame,
            actors: self.actors.into_iter().map(ActorPlan::into_tracks).collect(),
            cameras,
            lights: self.movie.lights.clone(),
            timeline,
            diagnostics: self.ctx.into_diagnostics(),
        };
        tracing::info!(
            "compiled '{}': {} frames, {} diagnostics",
            compiled.name,
            compiled.duration_frames + 1,
            compiled.diagnostics.len()
        );
        Ok(compiled)
    }
}

/// Emit one warning for every stretch of frames an auto-zoom spent clamped.
fn flush_zoom_clamps(
    ctx: &mut CompileContext,
    camera: &str,
    zoom: &mut Option<(usize, usize)>,
) {
    if let Some((index, frames)) = zoom.take() {
        if frames > 0 {
            ctx.warn(
                camera,
                Some(index),
                format!("auto-zoom focal length clamped on {} frames", frames),
            );
        }
    }
}

fn zoom_config(
    camera: &Camera,
    options: &PlanOptions,
    occupancy: Option<f64>,
    min_focal: Option<f64>,
    max_focal: Option<f64>,
) -> AutoZoomConfig {
    let base = camera.auto_zoom;
    AutoZoomConfig {
        target_occupancy: occupancy
            .or(base.map(|b| b.target_occupancy))
            .unwrap_or(options.default_occupancy),
        min_focal: min_focal
            .or(base.map(|b| b.min_focal))
            .unwrap_or(options.min_focal_length),
        max_focal: max_focal
            .or(base.map(|b| b.max_focal))
            .unwrap_or(options.max_focal_length),
    }
}

fn sample_camera(
    plan: &CameraPlan<'_>,
    actors: &[ActorPlan<'_>],
    ctx: &mut CompileContext,
    end_frame: u64,
) -> CameraTracks {
    let camera = plan.camera;
    let fps = ctx.fps;
    let mut state = FramingState::initial(camera);
    let mut last_focal = camera.focal_length;
    // (command index, clamped frame count) of the active auto-zoom
    let mut zoom: Option<(usize, usize)> = None;
    let mut cues = plan.cues.iter().peekable();
    let mut transform = TransformTrack::new();
    let mut settings = CameraSettingsTrack::new();

    let default_pct = ctx.options.default_height_pct;
    let pose_of = |name: &str, frame: u64| {
        actors
            .iter()
            .find(|a| a.actor.name == name)
            .and_then(|a| a.pose_at(frame))
    };

    for frame in 0..=end_frame {
        while let Some(cue) = cues.next_if(|cue| fps.frame_at(cue.time) <= frame) {
            match cue.command {
                CameraCommand::LookAt { subject, height_pct: pct } => {
                    state.look_at = Some(SubjectTarget {
                        actor: subject.clone(),
                        height_pct: pct.unwrap_or(default_pct),
                    });
                }
                CameraCommand::AutoFocus { subject, height_pct: pct } => {
                    state.focus = Some(SubjectTarget {
                        actor: subject.clone(),
                        height_pct: pct.unwrap_or(default_pct),
                    });
                }
                CameraCommand::AutoZoom {
                    subject,
                    occupancy,
                    min_focal,
                    max_focal,
                } => {
                    let config =
                        zoom_config(camera, &ctx.options, *occupancy, *min_focal, *max_focal);
                    flush_zoom_clamps(ctx, &camera.name, &mut zoom);
                    state.zoom = Some((subject.clone(), config));
                    zoom = Some((cue.index, 0));
                }
                CameraCommand::SetFocalLength { mm } => {
                    flush_zoom_clamps(ctx, &camera.name, &mut zoom);
                    state.zoom = None;
                    state.focal_length = *mm;
                }
                CameraCommand::StopTracking => {
                    flush_zoom_clamps(ctx, &camera.name, &mut zoom);
                    state.stop_tracking();
                    state.focal_length = last_focal;
                }
                CameraCommand::Hold { .. } => {}
            }
        }

        let shot = frame_shot(camera, &state, |name| pose_of(name, frame));
        if shot.zoom_clamped {
            if let Some((_, frames)) = zoom.as_mut() {
                *frames += 1;
            }
        }
        last_focal = shot.focal_length;
        transform.push(TransformKey::new(frame, &shot.transform));
        settings.push(CameraSettingsKey {
            frame,
            focal_length: shot.focal_length,
            focus_distance: shot.focus_distance,
        });
    }
    flush_zoom_clamps(ctx, &camera.name, &mut zoom);

    tracing::debug!("camera '{}' sampled over {} frames", camera.name, end_frame + 1);
    CameraTracks {
        camera: camera.clone(),
        transform,
        settings,
    }
}

//! Resolution of a move's declared quantities into a velocity profile.
//!
//! All arithmetic happens in centimeters and seconds. A resolved profile is
//! a linear speed ramp from `start_speed` to `end_speed` over
//! `ramp_duration`, followed by cruising at `end_speed` until `duration`.

use choreo_ir::MotionSpec;

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MotionError {
    #[error("infinite speed: {distance:.1}cm requested in zero time")]
    InfiniteSpeed { distance: f64 },

    #[error("zero speed can never cover {distance:.1}cm")]
    Stalled { distance: f64 },

    #[error("inconsistent motion: {0}")]
    Inconsistent(String),

    #[error("cannot resolve motion from {0}")]
    Underdetermined(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityProfile {
    start_speed: f64,
    end_speed: f64,
    ramp_duration: f64,
    duration: f64,
    distance: f64,
}

impl VelocityProfile {
    fn build(start_speed: f64, end_speed: f64, ramp_duration: f64, duration: f64) -> Self {
        let duration = duration.max(0.0);
        let ramp_duration = ramp_duration.clamp(0.0, duration);
        let ramp_distance = (start_speed + end_speed) / 2.0 * ramp_duration;
        Self {
            start_speed,
            end_speed,
            ramp_duration,
            duration,
            distance: ramp_distance + end_speed * (duration - ramp_duration),
        }
    }

    pub fn stationary(duration: f64) -> Self {
        Self::build(0.0, 0.0, 0.0, duration)
    }

    pub fn constant(speed: f64, duration: f64) -> Self {
        Self::build(speed, speed, 0.0, duration)
    }

    /// Linear ramp across the whole duration.
    pub fn ramp(start_speed: f64, end_speed: f64, duration: f64) -> Self {
        Self::build(start_speed, end_speed, duration, duration)
    }

    /// Ramp for `ramp_duration`, then hold `end_speed` until `duration`.
    pub fn ramp_then_cruise(
        start_speed: f64,
        end_speed: f64,
        ramp_duration: f64,
        duration: f64,
    ) -> Self {
        Self::build(start_speed, end_speed, ramp_duration, duration)
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn start_speed(&self) -> f64 {
        self.start_speed
    }

    pub fn end_speed(&self) -> f64 {
        self.end_speed
    }

    pub fn is_stationary(&self) -> bool {
        self.distance.abs() <= EPS
    }

    pub fn speed_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, self.duration);
        if t < self.ramp_duration {
            self.start_speed + (self.end_speed - self.start_speed) * t / self.ramp_duration
        } else {
            self.end_speed
        }
    }

    /// Distance covered after `t` seconds.
    pub fn distance_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, self.duration);
        if t >= self.duration {
            return self.distance;
        }
        if t < self.ramp_duration {
            let accel = (self.end_speed - self.start_speed) / self.ramp_duration;
            self.start_speed * t + 0.5 * accel * t * t
        } else {
            let ramp_distance = (self.start_speed + self.end_speed) / 2.0 * self.ramp_duration;
            ramp_distance + self.end_speed * (t - self.ramp_duration)
        }
    }
}

/// A resolved profile plus any clamps applied on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMotion {
    pub profile: VelocityProfile,
    pub warnings: Vec<String>,
}

/// Solve a motion spec for its velocity profile.
pub fn resolve(spec: &MotionSpec) -> Result<ResolvedMotion, MotionError> {
    let mut warnings = Vec::new();

    let d = spec.distance.map(|d| d.to_internal());
    let t = spec.duration.map(|t| t.to_internal());
    let v0 = spec
        .start_speed
        .map(|s| non_negative(s.to_internal(), "start speed", &mut warnings));
    let v1 = spec
        .end_speed
        .map(|s| non_negative(s.to_internal(), "end speed", &mut warnings));
    let a = spec.acceleration.map(|a| a.to_internal());

    if d.is_some_and(|d| d < 0.0) {
        return Err(MotionError::Inconsistent("distance must not be negative".into()));
    }
    if t.is_some_and(|t| t < 0.0) {
        return Err(MotionError::Inconsistent("duration must not be negative".into()));
    }

    let profile = match (d, t, v0, v1, a) {
        (None, Some(t), None, None, None) => VelocityProfile::stationary(t),

        (Some(d), Some(t), None, None, None) => {
            if t <= EPS {
                zero_time(d)?
            } else {
                VelocityProfile::constant(d / t, t)
            }
        }

        (Some(d), None, Some(v), None, None) => constant_over(d, v)?,

        (None, Some(t), Some(v), None, None) => VelocityProfile::constant(v, t),

        (Some(d), None, Some(v0), Some(v1), None) => {
            if d <= EPS {
                VelocityProfile::stationary(0.0)
            } else if v0 + v1 <= EPS {
                return Err(MotionError::Stalled { distance: d });
            } else {
                VelocityProfile::ramp(v0, v1, 2.0 * d / (v0 + v1))
            }
        }

        (None, Some(t), Some(v0), Some(v1), None) => VelocityProfile::ramp(v0, v1, t),

        (Some(d), Some(t), Some(v0), None, None) => {
            if t <= EPS {
                zero_time(d)?
            } else {
                let v1 = 2.0 * d / t - v0;
                if v1 >= 0.0 {
                    VelocityProfile::ramp(v0, v1, t)
                } else {
                    // v1 < 0 implies v0 > 0: brake to rest early, then hold.
                    warnings.push(format!(
                        "end speed solved to {:.1}cm/s, clamped to zero",
                        v1
                    ));
                    VelocityProfile::ramp_then_cruise(v0, 0.0, 2.0 * d / v0, t)
                }
            }
        }

        (Some(d), Some(t), None, Some(v1), None) => {
            if t <= EPS {
                zero_time(d)?
            } else {
                let v0 = 2.0 * d / t - v1;
                if v0 >= 0.0 {
                    VelocityProfile::ramp(v0, v1, t)
                } else {
                    // Starting from rest, the distance and duration cap the end speed.
                    let reachable = 2.0 * d / t;
                    warnings.push(format!(
                        "start speed {:.1}cm/s clamped to zero, end speed {:.1}cm/s",
                        v0, reachable
                    ));
                    VelocityProfile::ramp(0.0, reachable, t)
                }
            }
        }

        (Some(d), Some(t), Some(v0), Some(v1), None) => {
            if t <= EPS {
                zero_time(d)?
            } else {
                let implied = (v0 + v1) / 2.0 * t;
                if (implied - d).abs() > 1e-6 * d.max(1.0) {
                    return Err(MotionError::Inconsistent(format!(
                        "a ramp from {:.1} to {:.1}cm/s over {:.3}s covers {:.1}cm, not {:.1}cm",
                        v0, v1, t, implied, d
                    )));
                }
                VelocityProfile::ramp(v0, v1, t)
            }
        }

        (Some(d), None, v0, None, Some(a)) => {
            let v0 = v0.unwrap_or(0.0);
            if a.abs() <= EPS {
                constant_over(d, v0)?
            } else {
                accelerate_over(d, v0, a, &mut warnings)
            }
        }

        (None, Some(t), v0, None, Some(a)) => {
            let v0 = v0.unwrap_or(0.0);
            let v1 = v0 + a * t;
            if v1 >= 0.0 {
                VelocityProfile::ramp(v0, v1, t)
            } else {
                warnings.push(format!(
                    "deceleration stops the actor after {:.3}s, speed clamped to zero",
                    v0 / -a
                ));
                VelocityProfile::ramp_then_cruise(v0, 0.0, v0 / -a, t)
            }
        }

        (None, None, v0, Some(v1), Some(a)) => {
            let v0 = v0.unwrap_or(0.0);
            VelocityProfile::ramp(v0, v1, ramp_time(v0, v1, a)?)
        }

        (Some(d), None, v0, Some(v1), Some(a)) => {
            let v0 = v0.unwrap_or(0.0);
            let ramp = ramp_time(v0, v1, a)?;
            let ramp_distance = (v0 + v1) / 2.0 * ramp;
            if ramp_distance <= d + EPS {
                let rest = (d - ramp_distance).max(0.0);
                let cruise = if rest <= EPS {
                    0.0
                } else if v1 <= EPS {
                    return Err(MotionError::Stalled { distance: rest });
                } else {
                    rest / v1
                };
                VelocityProfile::ramp_then_cruise(v0, v1, ramp, ramp + cruise)
            } else {
                // The distance runs out before the target speed is reached.
                accelerate_over(d, v0, a, &mut warnings)
            }
        }

        (None, Some(t), v0, Some(v1), Some(a)) => {
            let v0 = v0.unwrap_or(0.0);
            let ramp = ramp_time(v0, v1, a)?;
            if ramp <= t {
                VelocityProfile::ramp_then_cruise(v0, v1, ramp, t)
            } else {
                VelocityProfile::ramp(v0, v0 + a * t, t)
            }
        }

        _ => return Err(MotionError::Underdetermined(describe(spec))),
    };

    Ok(ResolvedMotion { profile, warnings })
}

fn non_negative(speed: f64, label: &str, warnings: &mut Vec<String>) -> f64 {
    if speed < 0.0 {
        warnings.push(format!("negative {} {:.1}cm/s clamped to zero", label, speed));
        0.0
    } else {
        speed
    }
}

fn zero_time(distance: f64) -> Result<VelocityProfile, MotionError> {
    if distance > EPS {
        Err(MotionError::InfiniteSpeed { distance })
    } else {
        Ok(VelocityProfile::stationary(0.0))
    }
}

fn constant_over(distance: f64, speed: f64) -> Result<VelocityProfile, MotionError> {
    if distance <= EPS {
        Ok(VelocityProfile::stationary(0.0))
    } else if speed <= EPS {
        Err(MotionError::Stalled { distance })
    } else {
        Ok(VelocityProfile::constant(speed, distance / speed))
    }
}

fn ramp_time(v0: f64, v1: f64, a: f64) -> Result<f64, MotionError> {
    if a.abs() <= EPS {
        if (v1 - v0).abs() <= EPS {
            return Ok(0.0);
        }
        return Err(MotionError::Inconsistent(
            "zero acceleration cannot change speed".into(),
        ));
    }
    let ramp = (v1 - v0) / a;
    if ramp < 0.0 {
        return Err(MotionError::Inconsistent(format!(
            "acceleration {:.1}cm/s² never takes {:.1}cm/s to {:.1}cm/s",
            a, v0, v1
        )));
    }
    Ok(ramp)
}

/// Constant acceleration from `v0` over `distance`, stopping early if the
/// deceleration brings the actor to rest first.
fn accelerate_over(distance: f64, v0: f64, a: f64, warnings: &mut Vec<String>) -> VelocityProfile {
    let disc = v0 * v0 + 2.0 * a * distance;
    if disc < 0.0 {
        let stop = v0 / -a;
        warnings.push(format!(
            "deceleration stops the actor after {:.1}cm of {:.1}cm, speed clamped to zero",
            v0 * v0 / (2.0 * -a),
            distance
        ));
        return VelocityProfile::ramp(v0, 0.0, stop);
    }
    let time = (-v0 + disc.sqrt()) / a;
    VelocityProfile::ramp(v0, v0 + a * time, time)
}

fn describe(spec: &MotionSpec) -> String {
    let mut given = Vec::new();
    if spec.distance.is_some() {
        given.push("distance");
    }
    if spec.duration.is_some() {
        given.push("duration");
    }
    if spec.start_speed.is_some() {
        given.push("start speed");
    }
    if spec.end_speed.is_some() {
        given.push("end speed");
    }
    if spec.acceleration.is_some() {
        given.push("acceleration");
    }
    if given.is_empty() {
        "no quantities".to_string()
    } else {
        given.join(" + ")
    }
}

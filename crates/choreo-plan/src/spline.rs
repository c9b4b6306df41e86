//! Arclength-parameterized cardinal splines.
//!
//! Curves are cardinal (Catmull-Rom family) splines through every control
//! point. `tension` scales the tangents: 0.5 is classic Catmull-Rom, 0 pulls
//! toward straight segments. Travel is measured in centimeters of arclength
//! using a lookup table built once per spline.

use choreo_core::{ChoreoError, ChoreoResult, Vec3};
use choreo_ir::Spline;

/// Position and heading at one point along a spline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineSample {
    pub position: Vec3,
    /// Unit tangent in the direction of increasing arclength.
    pub tangent: Vec3,
}

impl SplineSample {
    pub fn yaw(&self) -> f64 {
        self.tangent.y.atan2(self.tangent.x).to_degrees()
    }

    pub fn pitch(&self) -> f64 {
        self.tangent.z.atan2(self.tangent.horizontal_length()).to_degrees()
    }
}

#[derive(Debug, Clone)]
pub struct SplinePath {
    padded: Vec<Vec3>,
    segments: usize,
    tension: f64,
    closed: bool,
    /// (global parameter, cumulative arclength), strictly increasing in parameter.
    table: Vec<(f64, f64)>,
    length: f64,
}

impl SplinePath {
    pub fn new(spline: &Spline, samples_per_segment: usize) -> ChoreoResult<Self> {
        let points = &spline.points;
        if points.len() < 2 {
            return Err(ChoreoError::invalid(format!(
                "spline '{}' needs at least 2 control points",
                spline.name
            )));
        }
        let n = points.len();
        let (padded, segments) = if spline.closed {
            let mut padded = Vec::with_capacity(n + 3);
            padded.push(points[n - 1]);
            padded.extend_from_slice(points);
            padded.push(points[0]);
            padded.push(points[1 % n]);
            (padded, n)
        } else {
            let mut padded = Vec::with_capacity(n + 2);
            padded.push(points[0]);
            padded.extend_from_slice(points);
            padded.push(points[n - 1]);
            (padded, n - 1)
        };

        let mut path = Self {
            padded,
            segments,
            tension: spline.tension,
            closed: spline.closed,
            table: Vec::new(),
            length: 0.0,
        };
        path.build_table(samples_per_segment.max(4));
        Ok(path)
    }

    fn build_table(&mut self, samples: usize) {
        let mut table = Vec::with_capacity(self.segments * samples + 1);
        let mut length = 0.0;
        let mut prev = self.point(0, 0.0);
        table.push((0.0, 0.0));
        for seg in 0..self.segments {
            for k in 1..=samples {
                let t = k as f64 / samples as f64;
                let p = self.point(seg, t);
                length += prev.distance(&p);
                prev = p;
                table.push((seg as f64 + t, length));
            }
        }
        self.table = table;
        self.length = length;
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn coefficients(&self, seg: usize) -> [Vec3; 4] {
        let s = self.tension;
        let p0 = self.padded[seg];
        let p1 = self.padded[seg + 1];
        let p2 = self.padded[seg + 2];
        let p3 = self.padded[seg + 3];
        [
            p1,
            (p2 - p0) * s,
            p0 * (2.0 * s) + p1 * (s - 3.0) + p2 * (3.0 - 2.0 * s) + p3 * (-s),
            p0 * (-s) + p1 * (2.0 - s) + p2 * (s - 2.0) + p3 * s,
        ]
    }

    fn point(&self, seg: usize, t: f64) -> Vec3 {
        let [c0, c1, c2, c3] = self.coefficients(seg);
        c0 + c1 * t + c2 * (t * t) + c3 * (t * t * t)
    }

    fn derivative(&self, seg: usize, t: f64) -> Vec3 {
        let [_, c1, c2, c3] = self.coefficients(seg);
        c1 + c2 * (2.0 * t) + c3 * (3.0 * t * t)
    }

    /// Map arclength to (segment, local parameter).
    fn locate(&self, distance: f64) -> (usize, f64) {
        let s = distance.clamp(0.0, self.length);
        let idx = self.table.partition_point(|&(_, len)| len < s);
        let u = if idx == 0 {
            0.0
        } else if idx >= self.table.len() {
            self.segments as f64
        } else {
            let (u0, s0) = self.table[idx - 1];
            let (u1, s1) = self.table[idx];
            if s1 - s0 <= f64::EPSILON {
                u1
            } else {
                u0 + (u1 - u0) * (s - s0) / (s1 - s0)
            }
        };
        let seg = (u.floor() as usize).min(self.segments - 1);
        (seg, u - seg as f64)
    }

    /// Sample at an arclength within `[0, length]`.
    pub fn sample_at(&self, distance: f64) -> SplineSample {
        let (seg, t) = self.locate(distance);
        let position = self.point(seg, t);
        let mut tangent = self.derivative(seg, t).normalized();
        if tangent == Vec3::ZERO {
            // Degenerate (repeated) control points: fall back to the chord.
            tangent = (self.padded[seg + 2] - self.padded[seg + 1]).normalized();
        }
        SplineSample { position, tangent }
    }

    /// Bring an unbounded arclength onto the curve. Closed splines wrap
    /// around; open ones stop at their ends.
    pub fn wrap(&self, distance: f64) -> f64 {
        if self.closed && self.length > 0.0 {
            distance.rem_euclid(self.length)
        } else {
            distance.clamp(0.0, self.length)
        }
    }
}

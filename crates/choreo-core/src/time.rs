use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance (in frames) absorbed before flooring a time to a frame index,
/// so `0.1s * 30fps` lands on frame 3 rather than 2.
const FRAME_EPSILON: f64 = 1e-6;

/// The single seconds-to-frames conversion used by one movie.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRate {
    fps: f64,
}

impl FrameRate {
    pub fn new(fps: f64) -> Self {
        Self { fps }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn is_valid(&self) -> bool {
        self.fps.is_finite() && self.fps > 0.0
    }

    /// Frame index containing the given time.
    pub fn frame_at(&self, seconds: f64) -> u64 {
        let raw = seconds.max(0.0) * self.fps + FRAME_EPSILON;
        raw.floor() as u64
    }

    /// Time at the start of a frame.
    pub fn seconds_at(&self, frame: u64) -> f64 {
        frame as f64 / self.fps
    }

    /// Number of whole frames spanned by a duration.
    pub fn frames_in(&self, seconds: f64) -> u64 {
        self.frame_at(seconds)
    }

    /// Format a frame index as a timecode for logs.
    pub fn timecode(&self, frame: u64) -> Timecode {
        Timecode {
            seconds: self.seconds_at(frame),
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        FrameRate::new(30.0)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}fps", self.fps)
    }
}

/// `hh:mm:ss.mmm` rendering of a movie time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timecode {
    seconds: f64,
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = (self.seconds * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let secs = (total_ms % 60_000) / 1_000;
        let ms = total_ms % 1_000;
        write!(f, "{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
    }
}

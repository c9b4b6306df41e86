//! Frame-stamped keyframes and the tracks that hold them.

use serde::{Deserialize, Serialize};

use choreo_core::{Rotator, Transform, Vec3};

/// A value stamped with a frame index.
pub trait FrameKeyed {
    fn frame(&self) -> u64;
}

/// An ordered, frame-monotonic sequence of keys for one entity channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track<K> {
    keys: Vec<K>,
}

impl<K> Default for Track<K> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<K: FrameKeyed> Track<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, keeping frames sorted. A key at an existing frame
    /// replaces it, so adjacent segments can share their boundary frame.
    pub fn push(&mut self, key: K) {
        let frame = key.frame();
        match self.keys.last() {
            None => self.keys.push(key),
            Some(last) if last.frame() < frame => self.keys.push(key),
            _ => {
                let idx = self.keys.partition_point(|k| k.frame() < frame);
                if idx < self.keys.len() && self.keys[idx].frame() == frame {
                    self.keys[idx] = key;
                } else {
                    self.keys.insert(idx, key);
                }
            }
        }
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn first_frame(&self) -> Option<u64> {
        self.keys.first().map(FrameKeyed::frame)
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.keys.last().map(FrameKeyed::frame)
    }

    pub fn last(&self) -> Option<&K> {
        self.keys.last()
    }

    /// True when frame indices never decrease.
    pub fn is_monotonic(&self) -> bool {
        self.keys.windows(2).all(|w| w[0].frame() <= w[1].frame())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformKey {
    pub frame: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl TransformKey {
    pub fn new(frame: u64, transform: &Transform) -> Self {
        Self {
            frame,
            x: transform.location.x,
            y: transform.location.y,
            z: transform.location.z,
            pitch: transform.rotation.pitch,
            yaw: transform.rotation.yaw,
            roll: transform.rotation.roll,
        }
    }

    pub fn location(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.location(), Rotator::new(self.pitch, self.yaw, self.roll))
    }
}

impl FrameKeyed for TransformKey {
    fn frame(&self) -> u64 {
        self.frame
    }
}

pub type TransformTrack = Track<TransformKey>;

impl Track<TransformKey> {
    /// Transform at `frame`, interpolating between keys and holding the ends.
    pub fn sample(&self, frame: u64) -> Option<Transform> {
        let first = self.keys.first()?;
        if frame <= first.frame {
            return Some(first.transform());
        }
        let idx = self.keys.partition_point(|k| k.frame <= frame);
        if idx >= self.keys.len() {
            return self.keys.last().map(TransformKey::transform);
        }
        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        if a.frame == frame {
            return Some(a.transform());
        }
        let t = (frame - a.frame) as f64 / (b.frame - a.frame) as f64;
        Some(a.transform().lerp(&b.transform(), t))
    }
}

/// One stretch of frames playing a named animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSegment {
    pub start_frame: u64,
    pub end_frame: u64,
    pub name: String,
    pub speed_multiplier: f64,
}

impl FrameKeyed for AnimationSegment {
    fn frame(&self) -> u64 {
        self.start_frame
    }
}

pub type AnimationTrack = Track<AnimationSegment>;

impl Track<AnimationSegment> {
    /// Append a segment, merging it into the previous one when it plays the
    /// same animation at the same rate and touches it.
    pub fn extend_or_push(&mut self, segment: AnimationSegment) {
        if let Some(last) = self.keys.last_mut() {
            let same_clip =
                last.name == segment.name && last.speed_multiplier == segment.speed_multiplier;
            if same_clip && segment.start_frame <= last.end_frame {
                last.end_frame = last.end_frame.max(segment.end_frame);
                return;
            }
        }
        self.push(segment);
    }

    /// Name of the animation playing at `frame`.
    pub fn active_at(&self, frame: u64) -> Option<&AnimationSegment> {
        self.keys
            .iter()
            .rev()
            .find(|s| s.start_frame <= frame && frame <= s.end_frame)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettingsKey {
    pub frame: u64,
    /// Millimeters.
    pub focal_length: f64,
    /// Centimeters, when auto-focus is active.
    pub focus_distance: Option<f64>,
}

impl FrameKeyed for CameraSettingsKey {
    fn frame(&self) -> u64 {
        self.frame
    }
}

pub type CameraSettingsTrack = Track<CameraSettingsKey>;

#[cfg(test)]
mod tests {
    use super::*;

    fn key(frame: u64, x: f64) -> TransformKey {
        TransformKey::new(frame, &Transform::new(Vec3::new(x, 0.0, 0.0), Rotator::default()))
    }

    #[test]
    fn test_push_replaces_shared_frame() {
        let mut track = TransformTrack::new();
        track.push(key(0, 0.0));
        track.push(key(5, 10.0));
        track.push(key(5, 11.0));
        assert_eq!(track.len(), 2);
        assert!((track.keys()[1].x - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_push_out_of_order_stays_sorted() {
        let mut track = TransformTrack::new();
        track.push(key(10, 1.0));
        track.push(key(2, 0.0));
        track.push(key(6, 0.5));
        assert!(track.is_monotonic());
        assert_eq!(track.first_frame(), Some(2));
        assert_eq!(track.last_frame(), Some(10));
    }

    #[test]
    fn test_sample_interpolates_and_holds() {
        let mut track = TransformTrack::new();
        track.push(key(0, 0.0));
        track.push(key(10, 100.0));
        let mid = track.sample(5).unwrap();
        assert!((mid.location.x - 50.0).abs() < 1e-9);
        let after = track.sample(99).unwrap();
        assert!((after.location.x - 100.0).abs() < 1e-9);
        assert!(TransformTrack::new().sample(0).is_none());
    }

    #[test]
    fn test_animation_segments_merge() {
        let mut track = AnimationTrack::new();
        let seg = |s, e, name: &str| AnimationSegment {
            start_frame: s,
            end_frame: e,
            name: name.to_string(),
            speed_multiplier: 1.0,
        };
        track.extend_or_push(seg(0, 30, "Jog"));
        track.extend_or_push(seg(30, 60, "Jog"));
        track.extend_or_push(seg(60, 90, "Idle"));
        assert_eq!(track.len(), 2);
        assert_eq!(track.keys()[0].end_frame, 60);
        assert_eq!(track.active_at(75).map(|s| s.name.as_str()), Some("Idle"));
    }

    #[test]
    fn test_transform_track_serializes_as_array() {
        let mut track = TransformTrack::new();
        track.push(key(0, 1.5));
        let json = serde_json::to_value(&track).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["frame"], 0);
        assert_eq!(json[0]["x"], 1.5);
    }
}

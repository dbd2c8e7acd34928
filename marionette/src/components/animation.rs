use glam::{Mat4, Quat, Vec3};
use itertools::Itertools;

use crate::util::compose_trs;

/// Which part of a node's transform an animation channel drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnimationPath {
    Translation,
    Rotation,
    Scale,
}

impl AnimationPath {
    pub fn from_document(value: &str) -> Option<Self> {
        Some(match value {
            "translation" => AnimationPath::Translation,
            "rotation" => AnimationPath::Rotation,
            "scale" => AnimationPath::Scale,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
}

/// Sampled output values of a channel
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValues {
    Translations(Vec<Vec3>),
    Rotations(Vec<Quat>),
    Scales(Vec<Vec3>),
}

impl ChannelValues {
    pub fn path(&self) -> AnimationPath {
        match self {
            ChannelValues::Translations(_) => AnimationPath::Translation,
            ChannelValues::Rotations(_) => AnimationPath::Rotation,
            ChannelValues::Scales(_) => AnimationPath::Scale,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChannelValues::Translations(v) | ChannelValues::Scales(v) => v.len(),
            ChannelValues::Rotations(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One animated property of one node: a list of times and the value at each time.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationChannel {
    /// Key of the targeted node
    pub target_node: String,
    pub interpolation: Interpolation,
    /// Sample times in seconds, non-decreasing
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

impl AnimationChannel {
    pub fn path(&self) -> AnimationPath {
        self.values.path()
    }

    /// Time of the last sample
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    fn sample_vec3(&self, values: &[Vec3], time: f32) -> Vec3 {
        sample(&self.times, values, time, self.interpolation, |a, b, t| {
            a.lerp(b, t)
        })
    }

    fn sample_quat(&self, values: &[Quat], time: f32) -> Quat {
        sample(&self.times, values, time, self.interpolation, |a, b, t| {
            a.slerp(b, t)
        })
    }
}

/// An animation clip as read from the document. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    pub channels: Vec<AnimationChannel>,
}

impl Animation {
    /// Time of the last sample of any channel
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .map(AnimationChannel::end_time)
            .fold(0.0, f32::max)
    }
}

/// A single sample of a bone's local transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Seconds since the start of the clip
    pub time: f32,
    /// The bone's local transform at `time`
    pub transform: Mat4,
}

/// The keyframes driving one bone.
///
/// A bone can belong to more than one skeleton, so where each skeleton is in the clip lives in
/// that skeleton's [`Playback`] list rather than here.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneAnimation {
    /// Sorted by non-decreasing time
    pub keyframes: Vec<Keyframe>,
    /// Length of the clip. Playback wraps back to zero when it is reached.
    pub duration: f32,
}

impl BoneAnimation {
    pub fn new(keyframes: Vec<Keyframe>, duration: f32) -> Self {
        Self {
            keyframes,
            duration,
        }
    }
}

/// How far through its clip one bone of a skeleton is
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Playback {
    /// Always in `[0, duration)`
    pub current_time: f32,
    /// Index of the keyframe last used
    pub current_keyframe: usize,
}

/// Merge the channels targeting one bone into a single list of keyframes.
///
/// Keyframe times are the union of every channel's times. Properties that no channel animates
/// keep their bind pose value.
pub fn build_keyframes(
    channels: &[&AnimationChannel],
    bind_pose: (Vec3, Quat, Vec3),
) -> Vec<Keyframe> {
    let times = channels
        .iter()
        .map(|c| c.times.iter().copied())
        .kmerge_by(|a, b| a < b)
        .dedup()
        .collect_vec();

    times
        .into_iter()
        .map(|time| {
            let (mut translation, mut rotation, mut scale) = bind_pose;
            for channel in channels {
                match &channel.values {
                    ChannelValues::Translations(v) => translation = channel.sample_vec3(v, time),
                    ChannelValues::Rotations(v) => rotation = channel.sample_quat(v, time),
                    ChannelValues::Scales(v) => scale = channel.sample_vec3(v, time),
                }
            }
            Keyframe {
                time,
                transform: compose_trs(translation, rotation, scale),
            }
        })
        .collect()
}

fn sample<T: Copy>(
    times: &[f32],
    values: &[T],
    time: f32,
    interpolation: Interpolation,
    mix: impl Fn(T, T, f32) -> T,
) -> T {
    // Index of the first sample strictly after `time`.
    let next = times.partition_point(|t| *t <= time);
    if next == 0 {
        return values[0];
    }
    if next >= times.len() {
        return values[values.len() - 1];
    }

    let previous = next - 1;
    match interpolation {
        Interpolation::Step => values[previous],
        Interpolation::Linear => {
            let span = times[next] - times[previous];
            if span <= f32::EPSILON {
                return values[next];
            }
            let t = (time - times[previous]) / span;
            mix(values[previous], values[next], t)
        }
    }
}

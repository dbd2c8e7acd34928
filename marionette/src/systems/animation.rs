use glam::Mat4;
use log::trace;

use crate::components::{BoneAnimation, Playback, Skeleton};

/// Steps longer than this many clip lengths are wrapped with a remainder instead of a loop.
const MAX_WRAP_STEPS: f32 = 8.0;

/// Animation system
/// Walks through each animated bone of the skeleton, advances its clip by `delta_time` seconds and
/// writes the current keyframe into `bone_transforms`. Bones without keyframes are left alone.
pub fn animation_system(skeleton: &mut Skeleton, delta_time: f32) {
    debug_assert!(delta_time.is_finite(), "delta_time must be finite");

    let Skeleton {
        bones,
        bone_transforms,
        playback,
        ..
    } = skeleton;

    for ((bone, local), playback) in bones
        .iter()
        .zip(bone_transforms.iter_mut())
        .zip(playback.iter_mut())
    {
        let bone = bone.borrow();
        if let Some(transform) = bone
            .animation
            .as_ref()
            .and_then(|a| advance(a, playback, delta_time))
        {
            *local = transform;
        }
    }
}

/// Move the clip forward and return the transform of the latest keyframe at or before the new
/// time. Time wraps into `[0, duration)`.
pub(crate) fn advance(
    animation: &BoneAnimation,
    playback: &mut Playback,
    delta_time: f32,
) -> Option<Mat4> {
    let time = wrap_time(playback.current_time + delta_time, animation.duration);
    playback.current_time = time;

    let keyframes = &animation.keyframes;
    if keyframes.is_empty() {
        return None;
    }

    // Only ever scan forwards. If time went backwards (ie. we wrapped) start again from the top.
    if keyframes
        .get(playback.current_keyframe)
        .map_or(true, |k| k.time > time)
    {
        playback.current_keyframe = 0;
    }
    while let Some(next) = keyframes.get(playback.current_keyframe + 1) {
        if next.time > time {
            break;
        }
        playback.current_keyframe += 1;
    }

    trace!(
        "[MARIONETTE_ANIMATION] t = {time:.3}s, keyframe {}",
        playback.current_keyframe
    );
    Some(keyframes[playback.current_keyframe].transform)
}

/// Bring `time` into `[0, duration)`. A clip with no length pins time to zero.
fn wrap_time(mut time: f32, duration: f32) -> f32 {
    if duration.is_nan() || duration <= 0.0 || !time.is_finite() {
        return 0.0;
    }

    if time.abs() < duration * MAX_WRAP_STEPS {
        while time >= duration {
            time -= duration;
        }
        while time < 0.0 {
            time += duration;
        }
    } else {
        time = time.rem_euclid(duration);
    }

    // Rounding can land exactly on the end of the clip, which is the same as its start.
    if time >= duration {
        0.0
    } else {
        time
    }
}

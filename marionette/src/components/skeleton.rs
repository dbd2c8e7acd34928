use std::{cell::RefCell, rc::Rc};

use glam::Mat4;

use super::{BoneRef, Playback};
use crate::{
    systems::{animation_system, skinning_system},
    ContentError, ContentResult,
};

/// Shared handle to a [`Skeleton`]
pub type SkeletonRef = Rc<RefCell<Skeleton>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkeletonState {
    /// No bone has keyframes; the skeleton stays in its bind pose
    #[default]
    Bound,
    /// At least one bone is driven by keyframes
    Playing,
}

/// The bones of one skin, along with the matrices needed to deform a mesh with them.
///
/// All of the per-bone vectors are the same length, and `bones[i]` sits at index `i`. Parents
/// always come before their children.
#[derive(Debug)]
pub struct Skeleton {
    pub name: String,
    pub bind_shape_matrix: Mat4,
    pub inverse_bind_matrices: Vec<Mat4>,
    pub bones: Vec<BoneRef>,
    /// Index of each bone's parent in this skeleton, if the parent is part of it
    pub parents: Vec<Option<usize>>,
    /// Local transform of each bone for the current frame
    pub bone_transforms: Vec<Mat4>,
    pub world_transforms: Vec<Mat4>,
    /// The palette handed to the vertex shader
    pub skin_transforms: Vec<Mat4>,
    /// Where each bone is in its clip. Kept per skeleton, as bones may be shared between skins.
    pub playback: Vec<Playback>,
    pub state: SkeletonState,
}

impl Skeleton {
    /// Build a skeleton from bones in the order the skin declares them.
    ///
    /// Gives each bone not yet claimed by another skin its index. Fails if the bone and matrix
    /// counts differ, if a bone is listed twice, or if a bone is listed before its parent.
    pub fn new(
        name: impl Into<String>,
        bind_shape_matrix: Mat4,
        inverse_bind_matrices: Vec<Mat4>,
        bones: Vec<BoneRef>,
    ) -> ContentResult<Self> {
        let name = name.into();
        if inverse_bind_matrices.len() != bones.len() {
            return Err(ContentError::format(format!(
                "skin {name} has {} joints but {} inverse bind matrices",
                bones.len(),
                inverse_bind_matrices.len()
            )));
        }

        for (i, bone) in bones.iter().enumerate() {
            if bones[..i].iter().any(|b| Rc::ptr_eq(b, bone)) {
                return Err(ContentError::format(format!(
                    "skin {name} lists joint {} more than once",
                    bone.borrow().joint_name
                )));
            }
            bone.borrow_mut().index.get_or_insert(i);
        }

        let mut parents = Vec::with_capacity(bones.len());
        for (i, bone) in bones.iter().enumerate() {
            let bone = bone.borrow();
            let parent = bone
                .parent
                .upgrade()
                .and_then(|p| bones.iter().position(|b| Rc::ptr_eq(b, &p)));
            if let Some(p) = parent {
                if p >= i {
                    return Err(ContentError::format(format!(
                        "skin {name} lists joint {} before its parent {}",
                        bone.joint_name,
                        bones[p].borrow().joint_name
                    )));
                }
            }
            parents.push(parent);
        }

        let bone_transforms = bones.iter().map(|b| b.borrow().bind_transform).collect();
        let bone_count = bones.len();
        let mut skeleton = Skeleton {
            name,
            bind_shape_matrix,
            inverse_bind_matrices,
            bones,
            parents,
            bone_transforms,
            world_transforms: vec![Mat4::IDENTITY; bone_count],
            skin_transforms: vec![Mat4::IDENTITY; bone_count],
            playback: vec![Playback::default(); bone_count],
            state: SkeletonState::Bound,
        };
        skeleton.refresh_state();
        skinning_system(&mut skeleton, Mat4::IDENTITY);

        Ok(skeleton)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn parent_index(&self, bone: usize) -> Option<usize> {
        self.parents.get(bone).copied().flatten()
    }

    /// Position of `bone` in this skeleton
    pub fn index_of(&self, bone: &BoneRef) -> Option<usize> {
        self.bones.iter().position(|b| Rc::ptr_eq(b, bone))
    }

    /// Find a bone's index by its joint name
    pub fn bone_index(&self, joint_name: &str) -> Option<usize> {
        self.bones
            .iter()
            .position(|b| b.borrow().joint_name == joint_name)
    }

    /// Re-evaluate whether any bone is animated
    pub fn refresh_state(&mut self) {
        self.state = if self.bones.iter().any(|b| b.borrow().is_animated()) {
            SkeletonState::Playing
        } else {
            SkeletonState::Bound
        };
    }

    /// Advance the animation by `delta_time` seconds and recompute the skin palette.
    pub fn update(&mut self, delta_time: f32, root_transform: Mat4) {
        animation_system(self, delta_time);
        skinning_system(self, root_transform);
    }
}

use glam::Mat4;

use crate::components::Skeleton;

/// Skinning system
/// Propagates each bone's local transform down the hierarchy, then builds the skin palette that
/// is handed to the vertex shader.
///
/// Relies on parents coming before their children, which [`Skeleton::new`] guarantees.
pub fn skinning_system(skeleton: &mut Skeleton, root_transform: Mat4) {
    let Skeleton {
        bind_shape_matrix,
        inverse_bind_matrices,
        parents,
        bone_transforms,
        world_transforms,
        skin_transforms,
        ..
    } = skeleton;

    for b in 0..bone_transforms.len() {
        let parent_world = match parents[b] {
            Some(p) => {
                debug_assert!(p < b, "bone {b} has parent {p} which comes after it");
                world_transforms[p]
            }
            None => root_transform,
        };
        world_transforms[b] = bone_transforms[b] * parent_world;
    }

    for ((skin, inverse_bind), world) in skin_transforms
        .iter_mut()
        .zip(inverse_bind_matrices.iter())
        .zip(world_transforms.iter())
    {
        *skin = *bind_shape_matrix * *inverse_bind * *world;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{components::Bone, util::compose_trs};
    use approx::assert_relative_eq;
    use glam::{Quat, Vec3};

    fn trs(t: [f32; 3], angle: f32) -> Mat4 {
        compose_trs(Vec3::from(t), Quat::from_rotation_z(angle), Vec3::ONE)
    }

    #[test]
    pub fn test_transform_composition() {
        let l0 = trs([0.0, 1.0, 0.0], 0.3);
        let l1 = trs([0.0, 2.0, 0.0], -0.7);
        let i0 = trs([0.0, -1.0, 0.0], 0.0);
        let i1 = trs([0.0, -3.0, 0.0], 0.1);
        let root = trs([10.0, 0.0, 0.0], 1.0);

        let hip = Bone::new("hip", "hip", l0);
        let knee = Bone::new("knee", "knee", l1);
        Bone::attach_child(&hip, &knee);
        let mut skeleton =
            Skeleton::new("leg", Mat4::IDENTITY, vec![i0, i1], vec![hip, knee]).unwrap();

        skinning_system(&mut skeleton, root);

        let world0 = l0 * root;
        let world1 = l1 * world0;
        assert_relative_eq!(skeleton.world_transforms[0], world0);
        assert_relative_eq!(skeleton.world_transforms[1], world1);
        assert_relative_eq!(skeleton.skin_transforms[0], i0 * world0);
        assert_relative_eq!(skeleton.skin_transforms[1], i1 * world1);
    }

    #[test]
    pub fn test_bind_shape_is_applied_first() {
        let bind_shape = trs([0.0, 0.0, 5.0], 0.0);
        let hip = Bone::new("hip", "hip", Mat4::IDENTITY);
        let mut skeleton =
            Skeleton::new("leg", bind_shape, vec![Mat4::IDENTITY], vec![hip]).unwrap();

        skinning_system(&mut skeleton, Mat4::IDENTITY);
        assert_relative_eq!(skeleton.skin_transforms[0], bind_shape);
    }

    #[test]
    pub fn test_bind_pose_palette_is_identity() {
        let l0 = trs([0.0, 1.0, 0.0], 0.0);
        let l1 = trs([0.0, 0.5, 0.0], 0.0);
        let hip = Bone::new("hip", "hip", l0);
        let knee = Bone::new("knee", "knee", l1);
        Bone::attach_child(&hip, &knee);

        let inverse_binds = vec![l0.inverse(), (l1 * l0).inverse()];
        let skeleton =
            Skeleton::new("leg", Mat4::IDENTITY, inverse_binds, vec![hip, knee]).unwrap();

        // A freshly built skeleton already holds its bind pose palette.
        for skin in &skeleton.skin_transforms {
            assert_relative_eq!(*skin, Mat4::IDENTITY, epsilon = 1e-5);
        }
    }
}

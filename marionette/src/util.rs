use glam::{Mat4, Quat, Vec3};

/// Convert a 16 element matrix from the document into the row-vector form used by this crate.
///
/// The document stores matrices column-major for column vectors; this crate composes
/// transforms left to right (`p * M`), which is the transpose.
#[inline]
pub fn matrix_from_document(m: &[f32; 16]) -> Mat4 {
    Mat4::from_cols_array(m).transpose()
}

/// Compose a translation, rotation and scale into a row-vector matrix (`S * R * T`).
#[inline]
pub fn compose_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation).transpose()
}

/// Inverse of [`compose_trs`]. Returns `(translation, rotation, scale)`.
#[inline]
pub fn decompose_trs(matrix: &Mat4) -> (Vec3, Quat, Vec3) {
    let (scale, rotation, translation) = matrix.transpose().to_scale_rotation_translation();
    (translation, rotation, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    pub fn test_row_vector_composition() {
        let parent = compose_trs(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE);
        let child = compose_trs(
            Vec3::new(0.0, 2.0, 0.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::ONE,
        );

        // Child first, then parent.
        let world = child * parent;
        let origin = world.transpose().transform_point3(Vec3::ZERO);
        assert_relative_eq!(origin, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    pub fn test_decompose_round_trip() {
        let t = Vec3::new(1.0, -2.0, 3.0);
        let r = Quat::from_rotation_y(0.5);
        let s = Vec3::new(2.0, 2.0, 2.0);
        let (t2, r2, s2) = decompose_trs(&compose_trs(t, r, s));
        assert_relative_eq!(t, t2, epsilon = 1e-5);
        assert_relative_eq!(r, r2, epsilon = 1e-5);
        assert_relative_eq!(s, s2, epsilon = 1e-5);
    }

    #[test]
    pub fn test_document_matrix() {
        let column_major = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0)).to_cols_array();
        let m = matrix_from_document(&column_major);
        assert_eq!(m.row(3), glam::Vec4::new(4.0, 5.0, 6.0, 1.0));
    }
}

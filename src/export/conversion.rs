use glam::{Mat4, Vec3};

/// Degrees the world is turned about Z to line up with the rig's axes.
pub const WORLD_ROTATION_DEGREES: f32 = 90.0;

/// Meters to centimeters.
pub const UNIT_SCALE: f32 = 100.0;

/// Fixed transform from scene space (Z up, meters) to MRMC space (centimeters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionMatrix {
    matrix: Mat4,
}

impl ConversionMatrix {
    pub fn mrmc() -> Self {
        let matrix = Mat4::from_rotation_z(WORLD_ROTATION_DEGREES.to_radians())
            * Mat4::from_scale(Vec3::splat(UNIT_SCALE));
        Self { matrix }
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Converts a position as a row vector multiplied on the left of the
    /// matrix, `[x y z 1] · M`, which is `Mᵀ · v`. Rigs are calibrated against
    /// files produced this way, so the order must not be flipped to `M · v`.
    pub fn apply(&self, position: Vec3) -> Vec3 {
        self.matrix.transpose().transform_point3(position)
    }
}

impl Default for ConversionMatrix {
    fn default() -> Self {
        Self::mrmc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected).abs().max_element() < 1e-4,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn x_axis_maps_to_negative_y_centimeters() {
        let conversion = ConversionMatrix::mrmc();
        assert_close(conversion.apply(Vec3::X), Vec3::new(0.0, -100.0, 0.0));
    }

    #[test]
    fn y_axis_maps_to_positive_x_centimeters() {
        let conversion = ConversionMatrix::mrmc();
        assert_close(conversion.apply(Vec3::Y), Vec3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn z_is_only_scaled() {
        let conversion = ConversionMatrix::mrmc();
        assert_close(
            conversion.apply(Vec3::new(0.0, 0.0, -1.2345)),
            Vec3::new(0.0, 0.0, -123.45),
        );
    }

    #[test]
    fn differs_from_column_vector_convention() {
        let conversion = ConversionMatrix::mrmc();
        let column = conversion.matrix().transform_point3(Vec3::X);
        assert_close(column, Vec3::new(0.0, 100.0, 0.0));
        assert_close(conversion.apply(Vec3::X), -column);
    }

    #[test]
    fn conversion_is_deterministic() {
        let conversion = ConversionMatrix::mrmc();
        let position = Vec3::new(3.25, -7.5, 1.125);
        assert_eq!(conversion.apply(position), conversion.apply(position));
        assert_eq!(ConversionMatrix::mrmc(), conversion);
    }
}

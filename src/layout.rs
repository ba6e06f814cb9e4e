use nalgebra::{Matrix6x4, Vector3, Vector6};

/// Distance of each thruster from the longitudinal axis, along body y and z (m)
pub const MOTOR_OFFSET: f64 = 0.069;
/// Ratio between thrust and the reaction torque of the spinning propeller (m)
pub const TORQUE_FACTOR: f64 = 1.0;

/// Number of thrusters on the vehicle
pub const NUM_THRUSTERS: usize = 4;

/// Thruster indices, viewed from behind the vehicle looking forward.
pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOTTOM_RIGHT: usize = 2;
pub const BOTTOM_LEFT: usize = 3;

/// A single thruster mounted on the hull.
///
/// # Fields
///
/// * `position` - Mount point relative to the centre of mass, body frame (m)
/// * `direction` - Unit vector of the thrust line of action, body frame
/// * `spin` - Propeller handedness, `+1.0` or `-1.0`; sign of the reaction torque
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thruster {
    pub position: Vector3<f64>,
    pub direction: Vector3<f64>,
    pub spin: f64,
}

impl Thruster {
    /// Generalized force/torque produced by this thruster at unit thrust.
    ///
    /// The torque part combines the moment of the thrust about the centre of
    /// mass (`p × d`) with the propeller reaction torque about its spin axis.
    pub fn unit_wrench(&self, torque_factor: f64) -> Vector6<f64> {
        let force = self.direction;
        let torque =
            self.position.cross(&self.direction) + self.direction * (self.spin * torque_factor);

        Vector6::new(force.x, force.y, force.z, torque.x, torque.y, torque.z)
    }
}

/// Geometry of the four-thruster square arrangement.
///
/// Body frame is x forward, y left, z up. All thrusters push along +x and sit
/// at the corners of a square in the y-z plane, so each mount point lies on
/// one of the square's diagonals. Diagonally opposite propellers share the
/// same handedness, which lets differential thrust between the two diagonals
/// produce roll.
///
/// ```text
///        TL (+)   TR (-)
///            \     /
///             \   /
///               x        (looking forward, +x into the page)
///             /   \
///            /     \
///        BL (-)   BR (+)
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrusterLayout {
    thrusters: [Thruster; NUM_THRUSTERS],
    torque_factor: f64,
}

impl ThrusterLayout {
    /// Builds a square layout with the given corner offset and torque factor.
    ///
    /// # Arguments
    ///
    /// * `offset` - Distance of each thruster from the x axis along y and z (m)
    /// * `torque_factor` - Reaction torque per unit thrust (m)
    pub fn new(offset: f64, torque_factor: f64) -> Self {
        let thruster = |y: f64, z: f64, spin: f64| Thruster {
            position: Vector3::new(0.0, y, z),
            direction: Vector3::x(),
            spin,
        };

        let mut thrusters = [thruster(0.0, 0.0, 0.0); NUM_THRUSTERS];
        thrusters[TOP_LEFT] = thruster(offset, offset, 1.0);
        thrusters[TOP_RIGHT] = thruster(-offset, offset, -1.0);
        thrusters[BOTTOM_RIGHT] = thruster(-offset, -offset, 1.0);
        thrusters[BOTTOM_LEFT] = thruster(offset, -offset, -1.0);

        Self {
            thrusters,
            torque_factor,
        }
    }

    /// Thrusters indexed by `TOP_LEFT`, `TOP_RIGHT`, `BOTTOM_RIGHT` and `BOTTOM_LEFT`.
    pub fn thrusters(&self) -> &[Thruster; NUM_THRUSTERS] {
        &self.thrusters
    }

    /// Propeller reaction torque per unit thrust (m).
    pub fn torque_factor(&self) -> f64 {
        self.torque_factor
    }

    /// Mixer matrix with every thruster available.
    ///
    /// Column `i` is the wrench `[Fx, Fy, Fz, Mx, My, Mz]` that thruster `i`
    /// produces at unit commanded thrust. The result depends on the layout
    /// only, never on the operating mode.
    pub fn full_mixer_matrix(&self) -> Matrix6x4<f64> {
        let mut matrix = Matrix6x4::zeros();
        for (i, thruster) in self.thrusters.iter().enumerate() {
            matrix.set_column(i, &thruster.unit_wrench(self.torque_factor));
        }
        matrix
    }
}

impl Default for ThrusterLayout {
    fn default() -> Self {
        Self::new(MOTOR_OFFSET, TORQUE_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_layout_constants() {
        let layout = ThrusterLayout::default();
        assert_eq!(layout.torque_factor(), TORQUE_FACTOR);

        for thruster in layout.thrusters() {
            assert_relative_eq!(thruster.position.y.abs(), MOTOR_OFFSET);
            assert_relative_eq!(thruster.position.z.abs(), MOTOR_OFFSET);
            assert_relative_eq!(thruster.direction.norm(), 1.0);
        }
    }

    #[test]
    fn test_full_mixer_matrix_columns() {
        let o = MOTOR_OFFSET;
        let k = TORQUE_FACTOR;
        let matrix = ThrusterLayout::default().full_mixer_matrix();

        // Every thruster pushes forward only
        for i in 0..NUM_THRUSTERS {
            assert_eq!(matrix[(0, i)], 1.0);
            assert_eq!(matrix[(1, i)], 0.0);
            assert_eq!(matrix[(2, i)], 0.0);
        }

        // Top thrusters pitch positive, left thrusters yaw negative
        assert_relative_eq!(matrix[(4, TOP_LEFT)], o);
        assert_relative_eq!(matrix[(4, TOP_RIGHT)], o);
        assert_relative_eq!(matrix[(4, BOTTOM_RIGHT)], -o);
        assert_relative_eq!(matrix[(4, BOTTOM_LEFT)], -o);

        assert_relative_eq!(matrix[(5, TOP_LEFT)], -o);
        assert_relative_eq!(matrix[(5, TOP_RIGHT)], o);
        assert_relative_eq!(matrix[(5, BOTTOM_RIGHT)], o);
        assert_relative_eq!(matrix[(5, BOTTOM_LEFT)], -o);

        // Roll comes only from propeller reaction torque
        assert_relative_eq!(matrix[(3, TOP_LEFT)], k);
        assert_relative_eq!(matrix[(3, TOP_RIGHT)], -k);
        assert_relative_eq!(matrix[(3, BOTTOM_RIGHT)], k);
        assert_relative_eq!(matrix[(3, BOTTOM_LEFT)], -k);
    }

    #[test]
    fn test_full_mixer_matrix_has_full_column_rank() {
        let matrix = ThrusterLayout::default().full_mixer_matrix();
        assert_eq!(matrix.rank(1e-9), NUM_THRUSTERS);
    }

    #[test]
    fn test_torque_factor_scales_roll_row_only() {
        let a = ThrusterLayout::new(0.1, 1.0).full_mixer_matrix();
        let b = ThrusterLayout::new(0.1, 0.5).full_mixer_matrix();

        for i in 0..NUM_THRUSTERS {
            assert_relative_eq!(b[(3, i)], 0.5 * a[(3, i)]);
            assert_eq!(a[(4, i)], b[(4, i)]);
            assert_eq!(a[(5, i)], b[(5, i)]);
        }
    }
}

use nalgebra::{Matrix3x4, Matrix4x6, Matrix6x4, Vector4, Vector6};

use crate::error::{Error, Result};
use crate::layout::{ThrusterLayout, NUM_THRUSTERS};
use crate::mode::Mode;

/// Row indices of the generalized force/torque vector.
pub const SURGE: usize = 0;
pub const SWAY: usize = 1;
pub const HEAVE: usize = 2;
pub const ROLL: usize = 3;
pub const PITCH: usize = 4;
pub const YAW: usize = 5;

/// Axes the setpoint controller actually commands
pub const CONTROLLED_AXES: [usize; 3] = [SURGE, PITCH, YAW];

/// Singular values at or below this are treated as zero
pub const SINGULAR_VALUE_EPSILON: f64 = 1e-9;

/// Mode-specific allocation from a desired wrench to thruster commands.
///
/// The working matrix is the layout's full mixer matrix with the columns of
/// excluded thrusters set to zero. Its Moore-Penrose pseudo-inverse is
/// computed once when the mixer is built, so [`Mixer::allocate_thrust`] is a
/// single fixed-size matrix product.
#[derive(Clone, Debug, PartialEq)]
pub struct Mixer {
    matrix: Matrix6x4<f64>,
    pseudo_inverse: Matrix4x6<f64>,
    excluded: [bool; NUM_THRUSTERS],
    controllability: f64,
}

impl Mixer {
    /// Builds the working mixer for `mode`.
    ///
    /// The result depends only on the layout and the mode, so rebuilding for
    /// the same pair yields an identical mixer.
    ///
    /// # Errors
    ///
    /// `Error::Numeric` if nalgebra refuses the pseudo-inverse. This only
    /// happens for a negative epsilon and is not expected in practice.
    pub fn new(layout: &ThrusterLayout, mode: Mode) -> Result<Self> {
        let excluded = mode.excluded_thrusters();

        let mut matrix = layout.full_mixer_matrix();
        for (i, &ex) in excluded.iter().enumerate() {
            if ex {
                matrix.column_mut(i).fill(0.0);
            }
        }

        let pseudo_inverse = matrix
            .pseudo_inverse(SINGULAR_VALUE_EPSILON)
            .map_err(Error::Numeric)?;

        Ok(Self {
            matrix,
            pseudo_inverse,
            excluded,
            controllability: controllability(&matrix),
        })
    }

    /// Maps a desired wrench `[Fx, Fy, Fz, Mx, My, Mz]` onto four thruster
    /// commands.
    ///
    /// Returns the minimum-norm least-squares solution against the working
    /// matrix. Wrench components outside the span of the active thrusters are
    /// dropped rather than reported. Excluded thrusters are forced to exactly
    /// zero afterwards, independent of how small the solver left them.
    pub fn allocate_thrust(&self, wrench: &Vector6<f64>) -> Vector4<f64> {
        let mut thrust = self.pseudo_inverse * wrench;
        for (i, &excluded) in self.excluded.iter().enumerate() {
            if excluded {
                thrust[i] = 0.0;
            }
        }
        thrust
    }

    /// Working mixer matrix, thrust commands to wrench.
    pub fn matrix(&self) -> &Matrix6x4<f64> {
        &self.matrix
    }

    pub fn pseudo_inverse(&self) -> &Matrix4x6<f64> {
        &self.pseudo_inverse
    }

    pub fn excluded_thrusters(&self) -> [bool; NUM_THRUSTERS] {
        self.excluded
    }

    /// Smallest singular value of the working matrix over the controlled axes.
    pub fn controllability(&self) -> f64 {
        self.controllability
    }

    /// True when at least one controlled axis cannot be actuated.
    pub fn is_degenerate(&self) -> bool {
        self.controllability <= SINGULAR_VALUE_EPSILON
    }
}

/// Conditioning of a mixer matrix restricted to surge, pitch and yaw.
///
/// This is the smallest singular value of the 3×4 block made of those rows.
/// It is zero exactly when some combination of the controlled axes has no
/// thruster authority, and it grows with the weakest direction's leverage.
pub fn controllability(matrix: &Matrix6x4<f64>) -> f64 {
    let controlled = Matrix3x4::from_rows(&CONTROLLED_AXES.map(|row| matrix.row(row).into_owned()));
    let smallest = controlled.singular_values().min();

    if smallest <= SINGULAR_VALUE_EPSILON {
        0.0
    } else {
        smallest
    }
}

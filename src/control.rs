use nalgebra::{Matrix6x4, UnitQuaternion, Vector4, Vector6};

use crate::config::{AxisCoefficients, DynamicsParams};
use crate::error::Result;
use crate::layout::ThrusterLayout;
use crate::mixer::{Mixer, PITCH, SURGE, YAW};
use crate::mode::Mode;

/// Rate controller and fault-tolerant thrust allocator for a four-thruster AUV.
///
/// The controller tracks three body-frame setpoints (pitch rate, yaw rate and
/// surge velocity) and distributes the resulting effort over whichever
/// thrusters the current [`Mode`] still trusts.
///
/// # Control Architecture
///
/// Setpoints ─┐
///            ├→ P feedback + inertia/damping feedforward → Wrench → Mixer → Thrusts
/// Measured ──┘                                                      ↑
///                                                    Mode → excluded thrusters
///
/// Mode changes come from an external failure detector through
/// [`MotorFailureController::set_mode`]; the controller never infers failures
/// itself.
///
/// The type holds no locks. An embedding that tunes parameters or switches
/// modes from another thread must serialize access, e.g. behind a
/// `Mutex<MotorFailureController>`.
#[derive(Clone, Debug)]
pub struct MotorFailureController {
    layout: ThrusterLayout,
    mode: Mode,
    mixer: Mixer,

    // Setpoints
    /// Desired pitch rate (rad/s)
    pitch_rate_target: f64,
    /// Desired yaw rate (rad/s)
    yaw_rate_target: f64,
    /// Desired surge velocity (m/s)
    surge_velocity_target: f64,

    params: DynamicsParams,

    /// Wrench requested by the most recent `update`
    wrench: Vector6<f64>,
}

impl MotorFailureController {
    /// Creates a controller for the given thruster layout.
    ///
    /// The controller starts in [`Mode::Unset`] with default dynamics
    /// parameters and zero setpoints, so it commands no thrust until a mode
    /// is selected.
    pub fn new(layout: ThrusterLayout) -> Result<Self> {
        let mode = Mode::Unset;
        let mixer = Mixer::new(&layout, mode)?;

        Ok(Self {
            layout,
            mode,
            mixer,
            pitch_rate_target: 0.0,
            yaw_rate_target: 0.0,
            surge_velocity_target: 0.0,
            params: DynamicsParams::default(),
            wrench: Vector6::zeros(),
        })
    }

    /// Runs one control step.
    ///
    /// For each controlled axis the effort is
    ///
    /// u = Kp * e + I * e + D * v,   e = target - v
    ///
    /// where the rate error `e` stands in for the required acceleration and
    /// `D * v` cancels the drag the vehicle currently experiences. Sway,
    /// heave and roll are requested as exactly zero.
    ///
    /// # Arguments
    ///
    /// * `pitch_rate` - Measured body pitch rate (rad/s)
    /// * `yaw_rate` - Measured body yaw rate (rad/s)
    /// * `surge_velocity` - Measured body surge velocity (m/s)
    /// * `_orientation` - Current attitude; reserved, the control law is purely
    ///   body-frame
    ///
    /// # Returns
    ///
    /// Thrust commands in newtons, indexed by [`crate::layout::TOP_LEFT`] and
    /// friends. All zero in [`Mode::Unset`] and [`Mode::Idle`].
    pub fn update(
        &mut self,
        pitch_rate: f64,
        yaw_rate: f64,
        surge_velocity: f64,
        _orientation: &UnitQuaternion<f64>,
    ) -> Vector4<f64> {
        let surge_accel = self.surge_velocity_target - surge_velocity;
        let pitch_accel = self.pitch_rate_target - pitch_rate;
        let yaw_accel = self.yaw_rate_target - yaw_rate;

        self.wrench = self.compute_wrench(
            surge_velocity,
            surge_accel,
            pitch_rate,
            pitch_accel,
            yaw_rate,
            yaw_accel,
        );

        if self.mode.is_passive() {
            return Vector4::zeros();
        }

        self.mixer.allocate_thrust(&self.wrench)
    }

    /// Desired generalized force/torque `[Fx, Fy, Fz, Mx, My, Mz]`.
    fn compute_wrench(
        &self,
        surge_velocity: f64,
        surge_accel: f64,
        pitch_velocity: f64,
        pitch_accel: f64,
        yaw_velocity: f64,
        yaw_accel: f64,
    ) -> Vector6<f64> {
        let p = &self.params.p_gains;
        let inertia = &self.params.inertia;
        let damping = &self.params.linear_damping;

        let mut wrench = Vector6::zeros();
        wrench[SURGE] = p.surge * surge_accel
            + inertia.surge * surge_accel
            + damping.surge * surge_velocity;
        wrench[PITCH] = p.pitch * pitch_accel
            + inertia.pitch * pitch_accel
            + damping.pitch * pitch_velocity;
        wrench[YAW] =
            p.yaw * yaw_accel + inertia.yaw * yaw_accel + damping.yaw * yaw_velocity;

        wrench
    }

    /// Maps a desired wrench onto thruster commands with the current mixer.
    ///
    /// Unlike [`MotorFailureController::update`], this does not apply the
    /// passive-mode policy; it reports exactly what the working matrix
    /// allocates.
    pub fn allocate_thrust(&self, wrench: &Vector6<f64>) -> Vector4<f64> {
        self.mixer.allocate_thrust(wrench)
    }

    /// Sets the setpoints tracked by [`MotorFailureController::update`].
    ///
    /// # Arguments
    ///
    /// * `pitch_rate` - Desired pitch rate (rad/s)
    /// * `yaw_rate` - Desired yaw rate (rad/s)
    /// * `surge_velocity` - Desired forward speed (m/s)
    pub fn set_target(&mut self, pitch_rate: f64, yaw_rate: f64, surge_velocity: f64) {
        self.pitch_rate_target = pitch_rate;
        self.yaw_rate_target = yaw_rate;
        self.surge_velocity_target = surge_velocity;
    }

    /// Returns `(pitch_rate, yaw_rate, surge_velocity)` setpoints.
    pub fn target(&self) -> (f64, f64, f64) {
        (
            self.pitch_rate_target,
            self.yaw_rate_target,
            self.surge_velocity_target,
        )
    }

    /// Sets the proportional gains on each axis error, in the same units as
    /// the linear damping (N·s/m for surge, N·m·s/rad for pitch and yaw).
    pub fn set_p_gains(&mut self, surge: f64, pitch: f64, yaw: f64) {
        self.params.p_gains = AxisCoefficients::new(surge, pitch, yaw);
        log::debug!("P gains set to surge={surge}, pitch={pitch}, yaw={yaw}");
    }

    /// Sets the linear damping used as velocity feedforward.
    ///
    /// # Arguments
    ///
    /// * `surge` - Surge damping (N·s/m)
    /// * `pitch` - Pitch damping (N·m·s/rad)
    /// * `yaw` - Yaw damping (N·m·s/rad)
    pub fn set_linear_damping(&mut self, surge: f64, pitch: f64, yaw: f64) {
        self.params.linear_damping = AxisCoefficients::new(surge, pitch, yaw);
        log::debug!("Linear damping set to surge={surge}, pitch={pitch}, yaw={yaw}");
    }

    /// Sets the effective mass and rotational inertia.
    ///
    /// # Arguments
    ///
    /// * `surge` - Mass including added mass (kg)
    /// * `pitch` - Pitch moment of inertia (kg·m²)
    /// * `yaw` - Yaw moment of inertia (kg·m²)
    pub fn set_inertia(&mut self, surge: f64, pitch: f64, yaw: f64) {
        self.params.inertia = AxisCoefficients::new(surge, pitch, yaw);
        log::debug!("Inertia set to surge={surge}, pitch={pitch}, yaw={yaw}");
    }

    /// Replaces gains, damping and inertia in one step.
    pub fn apply_params(&mut self, params: &DynamicsParams) {
        self.params = *params;
        log::debug!("Dynamics parameters replaced: {params:?}");
    }

    /// Gains, damping and inertia currently in use.
    pub fn params(&self) -> &DynamicsParams {
        &self.params
    }

    /// Switches the operating mode and rebuilds the mixer for it.
    ///
    /// The new mixer is built before anything is committed, so on error the
    /// previous mode and matrix stay in effect.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.update_mixer_matrix(mode)?;

        let previous = self.mode;
        self.mode = mode;
        log::info!(
            "Mode {previous} -> {mode}, controllability {:.4}",
            self.mixer.controllability()
        );
        if self.mixer.is_degenerate() && !mode.is_passive() {
            log::warn!("Allocation in mode {mode} cannot actuate every controlled axis");
        }

        Ok(())
    }

    /// Switches mode from its integer wire code.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for an unknown code or failure selector; the
    /// controller is left untouched in that case.
    pub fn set_mode_raw(&mut self, code: i32, selector: i32) -> Result<()> {
        let mode = Mode::from_raw(code, selector)?;
        self.set_mode(mode)
    }

    /// Operating mode the current mixer was built for.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn update_mixer_matrix(&mut self, mode: Mode) -> Result<()> {
        self.mixer = Mixer::new(&self.layout, mode)?;
        Ok(())
    }

    /// Mixer matrix with all thrusters available, independent of mode.
    pub fn full_mixer_matrix(&self) -> Matrix6x4<f64> {
        self.layout.full_mixer_matrix()
    }

    /// Working mixer matrix of the current mode.
    pub fn mixer_matrix(&self) -> &Matrix6x4<f64> {
        self.mixer.matrix()
    }

    /// Diagnostic only; see [`crate::mixer::controllability`].
    pub fn controllability(&self) -> f64 {
        self.mixer.controllability()
    }

    /// True when the current mode leaves surge, pitch or yaw without authority.
    pub fn is_allocation_degenerate(&self) -> bool {
        self.mixer.is_degenerate()
    }

    /// Wrench requested by the most recent [`MotorFailureController::update`].
    pub fn wrench(&self) -> &Vector6<f64> {
        &self.wrench
    }

    /// Thruster geometry the controller was built with.
    pub fn layout(&self) -> &ThrusterLayout {
        &self.layout
    }
}

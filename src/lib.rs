//! # Fault-tolerant thrust allocation
//!
//! Rate control and thrust allocation for an underwater vehicle driven by four
//! longitudinal thrusters arranged on a square. The crate turns pitch-rate,
//! yaw-rate and surge-velocity setpoints into per-thruster force commands and
//! keeps doing so when one thruster, or a diagonal pair, is lost.
//!
//! ## Modules
//! - [`layout`]: thruster geometry and the full mixer matrix
//! - [`mode`]: operating modes and which thrusters each mode excludes
//! - [`mixer`]: pseudo-inverse allocation and the controllability diagnostic
//! - [`control`]: feedback/feedforward rate controller on top of the mixer
//! - [`config`]: YAML-loadable gains, damping and inertia
//!
//! ## Example
//!
//! ```
//! use nalgebra::UnitQuaternion;
//! use thrust_alloc::{Mode, MotorFailureController, SingleFailure, ThrusterLayout};
//!
//! let mut controller = MotorFailureController::new(ThrusterLayout::default())?;
//! controller.set_mode(Mode::Normal)?;
//! controller.set_target(0.2, 0.0, 0.5);
//!
//! let thrust = controller.update(0.0, 0.0, 0.4, &UnitQuaternion::identity());
//! assert!(thrust.iter().all(|t| t.is_finite()));
//!
//! controller.set_mode(Mode::SingleFailureDetected(SingleFailure::TopLeft))?;
//! let thrust = controller.update(0.0, 0.0, 0.4, &UnitQuaternion::identity());
//! assert_eq!(thrust[0], 0.0);
//! # Ok::<(), thrust_alloc::Error>(())
//! ```
pub mod config;
pub mod control;
pub mod error;
pub mod layout;
pub mod mixer;
pub mod mode;

pub use config::{AxisCoefficients, DynamicsParams};
pub use control::MotorFailureController;
pub use error::{Error, Result};
pub use layout::{Thruster, ThrusterLayout};
pub use mixer::Mixer;
pub use mode::{DoubleFailure, Mode, SingleFailure};

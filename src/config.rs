use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One coefficient per controlled axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisCoefficients {
    pub surge: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl AxisCoefficients {
    pub fn new(surge: f64, pitch: f64, yaw: f64) -> Self {
        Self { surge, pitch, yaw }
    }
}

/// Tuning-file view of one coefficient group; absent axes stay `None`.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialAxes {
    surge: Option<f64>,
    pitch: Option<f64>,
    yaw: Option<f64>,
}

impl PartialAxes {
    fn merge_over(self, base: AxisCoefficients) -> AxisCoefficients {
        AxisCoefficients {
            surge: self.surge.unwrap_or(base.surge),
            pitch: self.pitch.unwrap_or(base.pitch),
            yaw: self.yaw.unwrap_or(base.yaw),
        }
    }
}

/// Tuning-file view of [`DynamicsParams`], merged over the defaults.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TuningFile {
    p_gains: PartialAxes,
    linear_damping: PartialAxes,
    inertia: PartialAxes,
}

impl From<TuningFile> for DynamicsParams {
    fn from(file: TuningFile) -> Self {
        let defaults = DynamicsParams::default();
        Self {
            p_gains: file.p_gains.merge_over(defaults.p_gains),
            linear_damping: file.linear_damping.merge_over(defaults.linear_damping),
            inertia: file.inertia.merge_over(defaults.inertia),
        }
    }
}

/// Rigid-body model and feedback gains used by the setpoint controller.
///
/// Values are accepted as-is; keeping them finite is up to whoever tunes
/// them. Any group or single axis missing from a tuning file keeps its
/// default.
///
/// ```yaml
/// p_gains:
///   surge: 1.0
///   pitch: 2.0
///   yaw: 2.0
/// linear_damping:
///   surge: 5.39
///   pitch: 0.007
///   yaw: 0.007
/// inertia:
///   surge: 3.42
///   pitch: 0.027
///   yaw: 0.027
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "TuningFile")]
pub struct DynamicsParams {
    /// Proportional gains on rate/velocity error
    pub p_gains: AxisCoefficients,
    /// Linear damping, N·s/m for surge and N·m·s/rad for pitch/yaw
    pub linear_damping: AxisCoefficients,
    /// Mass (kg) for surge, moment of inertia (kg·m²) for pitch/yaw
    pub inertia: AxisCoefficients,
}

impl Default for DynamicsParams {
    fn default() -> Self {
        Self {
            p_gains: AxisCoefficients::new(1.0, 2.0, 2.0),
            linear_damping: AxisCoefficients::new(5.39, 0.007, 0.007),
            inertia: AxisCoefficients::new(3.42, 0.027, 0.027),
        }
    }
}

impl DynamicsParams {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads a YAML tuning file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let params = DynamicsParams::default();
        assert_eq!(params.p_gains, AxisCoefficients::new(1.0, 2.0, 2.0));
        assert_eq!(params.linear_damping.surge, 5.39);
        assert_eq!(params.inertia.pitch, 0.027);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "p_gains:\n  surge: 4.0\n  pitch: 3.0\n  yaw: 1.5\n";
        let params = DynamicsParams::from_yaml_str(yaml).unwrap();

        assert_eq!(params.p_gains, AxisCoefficients::new(4.0, 3.0, 1.5));
        assert_eq!(params.linear_damping, DynamicsParams::default().linear_damping);
        assert_eq!(params.inertia, DynamicsParams::default().inertia);
    }

    #[test]
    fn test_partial_group_keeps_axis_defaults() {
        let params = DynamicsParams::from_yaml_str("p_gains:\n  pitch: 3.0\n").unwrap();

        assert_eq!(params.p_gains, AxisCoefficients::new(1.0, 3.0, 2.0));
        assert_eq!(params.linear_damping, DynamicsParams::default().linear_damping);
        assert_eq!(params.inertia, DynamicsParams::default().inertia);
    }

    #[test]
    fn test_axes_merge_per_group() {
        let yaml = "linear_damping:\n  yaw: 0.02\ninertia:\n  surge: 4.0\n  pitch: 0.03\n";
        let params = DynamicsParams::from_yaml_str(yaml).unwrap();

        assert_eq!(params.p_gains, DynamicsParams::default().p_gains);
        assert_eq!(params.linear_damping, AxisCoefficients::new(5.39, 0.007, 0.02));
        assert_eq!(params.inertia, AxisCoefficients::new(4.0, 0.03, 0.027));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let params = DynamicsParams::from_yaml_str("{}").unwrap();
        assert_eq!(params, DynamicsParams::default());
    }

    #[test]
    fn test_misspelled_axis_is_config_error() {
        let result = DynamicsParams::from_yaml_str("p_gains:\n  pich: 3.0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_yaml_string_reloads() {
        let mut params = DynamicsParams::default();
        params.inertia.yaw = 0.05;

        let yaml = params.to_yaml_string().unwrap();
        assert_eq!(DynamicsParams::from_yaml_str(&yaml).unwrap(), params);
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let result = DynamicsParams::from_yaml_str("p_gains: [1.0, 2.0");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = DynamicsParams::load("/nonexistent/thrust-alloc/params.yaml");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}

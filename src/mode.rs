use std::fmt;

use crate::error::{Error, Result};
use crate::layout::{BOTTOM_LEFT, BOTTOM_RIGHT, NUM_THRUSTERS, TOP_LEFT, TOP_RIGHT};

/// A single failed thruster, named by its corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SingleFailure {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl SingleFailure {
    pub const ALL: [SingleFailure; 4] = [
        SingleFailure::TopLeft,
        SingleFailure::TopRight,
        SingleFailure::BottomRight,
        SingleFailure::BottomLeft,
    ];

    /// Index of the failed thruster in the mixer matrix.
    pub fn thruster(self) -> usize {
        match self {
            SingleFailure::TopLeft => TOP_LEFT,
            SingleFailure::TopRight => TOP_RIGHT,
            SingleFailure::BottomRight => BOTTOM_RIGHT,
            SingleFailure::BottomLeft => BOTTOM_LEFT,
        }
    }
}

impl TryFrom<i32> for SingleFailure {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(SingleFailure::TopLeft),
            1 => Ok(SingleFailure::TopRight),
            2 => Ok(SingleFailure::BottomRight),
            3 => Ok(SingleFailure::BottomLeft),
            _ => Err(Error::InvalidArgument(format!(
                "single failure selector {value} out of range 0..=3"
            ))),
        }
    }
}

/// Two failed thrusters on the same diagonal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoubleFailure {
    TopLeftToBottomRight,
    TopRightToBottomLeft,
}

impl DoubleFailure {
    pub const ALL: [DoubleFailure; 2] = [
        DoubleFailure::TopLeftToBottomRight,
        DoubleFailure::TopRightToBottomLeft,
    ];

    /// Indices of both failed thrusters in the mixer matrix.
    pub fn thrusters(self) -> [usize; 2] {
        match self {
            DoubleFailure::TopLeftToBottomRight => [TOP_LEFT, BOTTOM_RIGHT],
            DoubleFailure::TopRightToBottomLeft => [TOP_RIGHT, BOTTOM_LEFT],
        }
    }
}

impl TryFrom<i32> for DoubleFailure {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(DoubleFailure::TopLeftToBottomRight),
            1 => Ok(DoubleFailure::TopRightToBottomLeft),
            _ => Err(Error::InvalidArgument(format!(
                "double failure selector {value} out of range 0..=1"
            ))),
        }
    }
}

/// Operating mode of the vehicle, as decided by an external failure detector.
///
/// Only the `*Detected` variants change which thrusters the allocator uses;
/// in the `*Undetected` variants the failure exists but has not been noticed
/// yet, so the full matrix stays in effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Unset,
    Idle,
    Untangling,
    Normal,
    SingleFailureUndetected,
    DoubleFailureUndetected,
    SingleFailureDetected(SingleFailure),
    DoubleFailureDetected(DoubleFailure),
}

impl Mode {
    /// Decodes a mode from its integer wire code.
    ///
    /// `selector` names the failed thruster(s) and is only read for the two
    /// `*Detected` codes. Unknown codes and out-of-range selectors are
    /// rejected instead of defaulting to any mode.
    ///
    /// | code | mode                      |
    /// |------|---------------------------|
    /// | -1   | `Unset`                   |
    /// | 0    | `Idle`                    |
    /// | 1    | `Untangling`              |
    /// | 2    | `Normal`                  |
    /// | 3    | `SingleFailureUndetected` |
    /// | 4    | `DoubleFailureUndetected` |
    /// | 5    | `SingleFailureDetected`   |
    /// | 6    | `DoubleFailureDetected`   |
    pub fn from_raw(code: i32, selector: i32) -> Result<Self> {
        let mode = match code {
            -1 => Mode::Unset,
            0 => Mode::Idle,
            1 => Mode::Untangling,
            2 => Mode::Normal,
            3 => Mode::SingleFailureUndetected,
            4 => Mode::DoubleFailureUndetected,
            5 => Mode::SingleFailureDetected(SingleFailure::try_from(selector)?),
            6 => Mode::DoubleFailureDetected(DoubleFailure::try_from(selector)?),
            _ => {
                return Err(Error::InvalidArgument(format!("unknown mode code {code}")));
            }
        };
        Ok(mode)
    }

    /// Integer wire code of this mode, the inverse of [`Mode::from_raw`].
    pub fn code(self) -> i32 {
        match self {
            Mode::Unset => -1,
            Mode::Idle => 0,
            Mode::Untangling => 1,
            Mode::Normal => 2,
            Mode::SingleFailureUndetected => 3,
            Mode::DoubleFailureUndetected => 4,
            Mode::SingleFailureDetected(_) => 5,
            Mode::DoubleFailureDetected(_) => 6,
        }
    }

    /// True if at least one thruster is known or suspected to have failed.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Mode::SingleFailureUndetected
                | Mode::DoubleFailureUndetected
                | Mode::SingleFailureDetected(_)
                | Mode::DoubleFailureDetected(_)
        )
    }

    pub fn is_detected(self) -> bool {
        matches!(
            self,
            Mode::SingleFailureDetected(_) | Mode::DoubleFailureDetected(_)
        )
    }

    /// True for modes in which no thruster may be driven.
    pub fn is_passive(self) -> bool {
        matches!(self, Mode::Unset | Mode::Idle)
    }

    /// Thrusters removed from allocation in this mode.
    ///
    /// This is the single place that maps modes onto mixer columns. `Unset`
    /// masks everything because no operating mode has been established yet.
    pub fn excluded_thrusters(self) -> [bool; NUM_THRUSTERS] {
        let mut excluded = [false; NUM_THRUSTERS];
        match self {
            Mode::Unset => excluded = [true; NUM_THRUSTERS],
            Mode::SingleFailureDetected(failure) => excluded[failure.thruster()] = true,
            Mode::DoubleFailureDetected(failure) => {
                for i in failure.thrusters() {
                    excluded[i] = true;
                }
            }
            Mode::Idle
            | Mode::Untangling
            | Mode::Normal
            | Mode::SingleFailureUndetected
            | Mode::DoubleFailureUndetected => {}
        }
        excluded
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::SingleFailureDetected(failure) => write!(f, "SingleFailureDetected({failure:?})"),
            Mode::DoubleFailureDetected(failure) => write!(f, "DoubleFailureDetected({failure:?})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_codes() {
        assert_eq!(Mode::from_raw(-1, 0).unwrap(), Mode::Unset);
        assert_eq!(Mode::from_raw(2, 0).unwrap(), Mode::Normal);
        assert_eq!(
            Mode::from_raw(5, 2).unwrap(),
            Mode::SingleFailureDetected(SingleFailure::BottomRight)
        );
        assert_eq!(
            Mode::from_raw(6, 1).unwrap(),
            Mode::DoubleFailureDetected(DoubleFailure::TopRightToBottomLeft)
        );
        // Selector is ignored for modes that do not carry one
        assert_eq!(Mode::from_raw(3, 99).unwrap(), Mode::SingleFailureUndetected);
    }

    #[test]
    fn test_from_raw_rejects_unknown_values() {
        assert!(matches!(Mode::from_raw(7, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(Mode::from_raw(-2, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(Mode::from_raw(5, 4), Err(Error::InvalidArgument(_))));
        assert!(matches!(Mode::from_raw(6, -1), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_code_inverts_from_raw() {
        for code in -1..=6 {
            assert_eq!(Mode::from_raw(code, 0).unwrap().code(), code);
        }
    }

    #[test]
    fn test_excluded_thrusters_table() {
        assert_eq!(Mode::Normal.excluded_thrusters(), [false; 4]);
        assert_eq!(Mode::Idle.excluded_thrusters(), [false; 4]);
        assert_eq!(Mode::Untangling.excluded_thrusters(), [false; 4]);
        assert_eq!(Mode::SingleFailureUndetected.excluded_thrusters(), [false; 4]);
        assert_eq!(Mode::DoubleFailureUndetected.excluded_thrusters(), [false; 4]);
        assert_eq!(Mode::Unset.excluded_thrusters(), [true; 4]);

        assert_eq!(
            Mode::SingleFailureDetected(SingleFailure::TopRight).excluded_thrusters(),
            [false, true, false, false]
        );
        assert_eq!(
            Mode::DoubleFailureDetected(DoubleFailure::TopLeftToBottomRight).excluded_thrusters(),
            [true, false, true, false]
        );
        assert_eq!(
            Mode::DoubleFailureDetected(DoubleFailure::TopRightToBottomLeft).excluded_thrusters(),
            [false, true, false, true]
        );
    }

    #[test]
    fn test_classification() {
        assert!(!Mode::Normal.is_failure());
        assert!(Mode::SingleFailureUndetected.is_failure());
        assert!(!Mode::SingleFailureUndetected.is_detected());
        assert!(Mode::DoubleFailureDetected(DoubleFailure::TopLeftToBottomRight).is_detected());
        assert!(Mode::Idle.is_passive());
        assert!(!Mode::Untangling.is_passive());
        assert_eq!(Mode::default(), Mode::Unset);
    }
}

/// Errors returned by the allocation core.
///
/// Control evaluation itself never fails; these surface only from mode
/// selection at the raw-integer boundary and from loading tuning files.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Unknown mode code or failure selector
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Error reported by nalgebra's SVD-based pseudo-inverse
    #[error("Numeric error: {0}")]
    Numeric(&'static str),
    /// Failed to read a tuning file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse a tuning file
    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

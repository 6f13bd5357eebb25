use thiserror::Error;

/// Error types for spectrum analysis, filtering and line-shape operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectrumError {
    /// Requested coordinate interval lies outside the axis or runs against its direction
    #[error("invalid interval ({lower}, {upper}) on axis {axis}: {reason}")]
    InvalidInterval {
        axis: usize,
        lower: f64,
        upper: f64,
        reason: String,
    },

    /// Operation needs a uniform coordinate step
    #[error("operation requires an evenly spaced spectrum")]
    NotEvenlySpaced,

    /// Savitzky-Golay parameters violate the window/order/derivative constraints
    #[error("invalid filter configuration: {0}")]
    InvalidFilterConfig(String),

    /// Filter window is wider than the data it is applied to
    #[error("window size {window_size} exceeds input length {len}")]
    WindowTooLarge { window_size: usize, len: usize },

    /// Line shape scale must be strictly positive and finite
    #[error("invalid scale {0}: line shape scale must be positive")]
    InvalidScale(f64),

    /// Two sequences that must agree in length do not
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Coordinate domain is empty, non-finite, non-monotonic or has zero step
    #[error("invalid coordinate domain: {0}")]
    InvalidDomain(String),

    /// Operation is only defined for a given number of axes
    #[error("operation supports {expected}-dimensional data, got {found} dimensions")]
    UnsupportedDimensionality { expected: usize, found: usize },

    /// Normalisation by a total intensity of zero
    #[error("cannot normalise by a total intensity of zero")]
    ZeroTotalIntensity,

    /// The external minimizer reported a failure
    #[error("optimizer failed: {0}")]
    Optimizer(String),
}

/// Result type for spectrakit operations
pub type Result<T> = std::result::Result<T, SpectrumError>;

//! # spectrakit
//!
//! Numerical analysis of measured spectra: intensity sampled over an ordered
//! coordinate axis such as wavelength or chemical shift.
//!
//! ## Features
//!
//! - A [`Spectrum`] capability trait with evenly spaced, irregular and 2-D
//!   grid implementations
//! - Borrowed [`View`]s cut out by coordinate interval, with binary and linear
//!   bracket search that always agree
//! - Riemann and trapezoid integration in any number of dimensions, spectral
//!   moments, extrema and central-difference derivatives
//! - Savitzky-Golay smoothing and differentiation with weights derived from
//!   Gram polynomials in exact rational arithmetic and boundary-corrected
//!   edges
//! - Gaussian, Cauchy and raised-cosine line shapes, their sums, and the
//!   least-squares objective handed to an external minimizer
//!
//! ## Example
//!
//! ```rust
//! use spectrakit::{get_view, integrate, EvenSpectrum, IntegrationScheme, SearchMethod};
//!
//! let spectrum = EvenSpectrum::from_fn(0.0, 10.0, 101, |x| (-(x - 5.0).powi(2)).exp()).unwrap();
//! let peak = get_view(&spectrum, &[(1.0, 9.0)], SearchMethod::Binary).unwrap();
//! let area = integrate(&peak, IntegrationScheme::Midpoint).unwrap();
//! assert!((area - std::f64::consts::PI.sqrt()).abs() < 1e-3);
//! ```

mod analysis;
mod coefficients;
mod error;
mod filter;
mod fitting;
mod lineshape;
mod plot;
mod search;
mod spectrum;
mod view;

pub use analysis::{
    central_difference, centroid, derivative, integrate, integrate_grid, integrate_samples,
    moment, nominal_max, nominal_min, normalized_moment, variance, Extremum, IntegrationScheme,
};
pub use coefficients::{
    compute_boundary_coefficients, compute_coefficients, compute_coefficients_at, validate_config,
    CoefficientCache,
};
pub use error::{Result, SpectrumError};
pub use filter::{FilterConfig, SavitzkyGolayFilter};
pub use fitting::{
    FittingProblem, FittingSolution, Loss, Minimizer, Objective, OptimizeResult, OptimizerOutcome,
};
pub use lineshape::{CompositeShape, LineShape, LineShapeKind, PARAMS_PER_SHAPE};
pub use plot::{plot_data, PlotData};
pub use search::{bracket, get_view, SearchMethod};
pub use spectrum::{Direction, EvenGrid, EvenSpectrum, SampledSpectrum, Spectrum};
pub use view::{extract_section, Section, View};

/// Smooths `data` with a 5-point quadratic Savitzky-Golay filter.
///
/// # Example
///
/// ```rust
/// use spectrakit::smooth;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
/// let smoothed = smooth(&data).unwrap();
/// assert_eq!(smoothed.len(), data.len());
/// ```
pub fn smooth(data: &[f64]) -> Result<Vec<f64>> {
    SavitzkyGolayFilter::new(5, 2)?.apply(data)
}

/// Savitzky-Golay first derivative of `data` sampled every `delta`.
///
/// # Arguments
///
/// * `data` - The input signal data
/// * `window_size` - The size of the filter window (odd, greater than 1)
/// * `poly_order` - The order of the polynomial (at most `window_size - 2`, at least 1)
/// * `delta` - Sample spacing
pub fn smooth_derivative(
    data: &[f64],
    window_size: usize,
    poly_order: usize,
    delta: f64,
) -> Result<Vec<f64>> {
    SavitzkyGolayFilter::new(window_size, poly_order)?
        .with_derivative(1)?
        .with_delta(delta)?
        .apply(data)
}

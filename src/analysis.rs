//! Integration, moments, extrema and derivatives of sampled spectra.
//!
//! Everything here except the extrema lookup needs a uniform step and fails
//! with [`SpectrumError::NotEvenlySpaced`] otherwise. Steps are signed, so an
//! integral over a descending axis runs from the first to the last coordinate
//! and comes out negated relative to the ascending layout.

use crate::error::{Result, SpectrumError};
use crate::spectrum::{unravel_index, Spectrum};

/// Discretisation rule used to integrate sampled data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntegrationScheme {
    /// Every sample except the last along each axis, scaled by the step
    LeftRiemann,
    /// Every sample except the first along each axis, scaled by the step
    RightRiemann,
    /// Trapezoid rule: boundary samples carry half weight per boundary axis
    #[default]
    Midpoint,
}

impl IntegrationScheme {
    pub const ALL: [IntegrationScheme; 3] = [
        IntegrationScheme::LeftRiemann,
        IntegrationScheme::RightRiemann,
        IntegrationScheme::Midpoint,
    ];

    /// Weight of sample `index` on an axis of `len` samples.
    fn axis_weight(self, index: usize, len: usize) -> f64 {
        let first = index == 0;
        let last = index + 1 == len;
        match self {
            IntegrationScheme::LeftRiemann => {
                if last {
                    0.0
                } else {
                    1.0
                }
            }
            IntegrationScheme::RightRiemann => {
                if first {
                    0.0
                } else {
                    1.0
                }
            }
            IntegrationScheme::Midpoint => {
                1.0 - if first { 0.5 } else { 0.0 } - if last { 0.5 } else { 0.0 }
            }
        }
    }
}

/// Integrates a one-dimensional sample sequence with uniform `step`.
pub fn integrate_samples(values: &[f64], step: f64, scheme: IntegrationScheme) -> f64 {
    let (first, last) = match (values.first(), values.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return 0.0,
    };
    let n = values.len();
    let sum = match scheme {
        IntegrationScheme::LeftRiemann => values[..n - 1].iter().sum(),
        IntegrationScheme::RightRiemann => values[1..].iter().sum(),
        IntegrationScheme::Midpoint => values.iter().sum::<f64>() - (first + last) / 2.0,
    };
    sum * step
}

/// Integrates a row-major grid of `shape` with per-axis `steps`.
///
/// Each sample is weighted by the product of its per-axis weights; for the
/// trapezoid rule that is `2^-k` where `k` counts the axes on which the
/// sample sits on a boundary index, reducing to endpoint halving in 1-D.
pub fn integrate_grid(
    values: &[f64],
    shape: &[usize],
    steps: &[f64],
    scheme: IntegrationScheme,
) -> Result<f64> {
    if steps.len() != shape.len() {
        return Err(SpectrumError::DimensionMismatch {
            expected: shape.len(),
            found: steps.len(),
        });
    }
    let expected: usize = shape.iter().product();
    if values.len() != expected {
        return Err(SpectrumError::DimensionMismatch {
            expected,
            found: values.len(),
        });
    }

    let mut index = vec![0usize; shape.len()];
    let mut sum = 0.0;
    for (flat, &value) in values.iter().enumerate() {
        unravel_index(flat, shape, &mut index);
        let weight: f64 = index
            .iter()
            .zip(shape)
            .map(|(&i, &len)| scheme.axis_weight(i, len))
            .product();
        sum += weight * value;
    }
    Ok(sum * steps.iter().product::<f64>())
}

/// Integrates an evenly spaced spectrum or view.
///
/// # Example
///
/// ```rust
/// use spectrakit::{integrate, EvenSpectrum, IntegrationScheme};
///
/// let spectrum = EvenSpectrum::new(0.0, 9.0, vec![5.0; 10]).unwrap();
/// let area = integrate(&spectrum, IntegrationScheme::Midpoint).unwrap();
/// assert_eq!(area, 45.0);
/// ```
pub fn integrate<S: Spectrum + ?Sized>(spectrum: &S, scheme: IntegrationScheme) -> Result<f64> {
    let steps = spectrum.steps()?;
    let values = spectrum.intensities();
    if let [step] = steps[..] {
        return Ok(integrate_samples(&values, step, scheme));
    }
    integrate_grid(&values, &spectrum.shape(), &steps, scheme)
}

fn require_1d<S: Spectrum + ?Sized>(spectrum: &S) -> Result<()> {
    match spectrum.ndim() {
        1 => Ok(()),
        found => Err(SpectrumError::UnsupportedDimensionality { expected: 1, found }),
    }
}

/// `∫ intensity(x) · (x - center)^degree dx`, without normalisation.
///
/// Degrees above `i32::MAX` fail with [`SpectrumError::InvalidDomain`].
pub fn moment<S: Spectrum + ?Sized>(
    spectrum: &S,
    degree: u32,
    center: f64,
    scheme: IntegrationScheme,
) -> Result<f64> {
    let steps = spectrum.steps()?;
    require_1d(spectrum)?;
    let exponent = i32::try_from(degree).map_err(|_| {
        SpectrumError::InvalidDomain(format!("moment degree {degree} exceeds {}", i32::MAX))
    })?;
    let coordinates = spectrum.coordinates(0);
    let weighted: Vec<f64> = spectrum
        .intensities()
        .iter()
        .zip(coordinates.iter())
        .map(|(&y, &x)| y * (x - center).powi(exponent))
        .collect();
    Ok(integrate_samples(&weighted, steps[0], scheme))
}

/// [`moment`] divided by the total intensity (the degree-0 integral).
pub fn normalized_moment<S: Spectrum + ?Sized>(
    spectrum: &S,
    degree: u32,
    center: f64,
    scheme: IntegrationScheme,
) -> Result<f64> {
    let total = integrate(spectrum, scheme)?;
    if total == 0.0 {
        return Err(SpectrumError::ZeroTotalIntensity);
    }
    Ok(moment(spectrum, degree, center, scheme)? / total)
}

/// Intensity-weighted mean coordinate.
pub fn centroid<S: Spectrum + ?Sized>(spectrum: &S, scheme: IntegrationScheme) -> Result<f64> {
    normalized_moment(spectrum, 1, 0.0, scheme)
}

/// Intensity-weighted spread about the centroid.
pub fn variance<S: Spectrum + ?Sized>(spectrum: &S, scheme: IntegrationScheme) -> Result<f64> {
    let center = centroid(spectrum, scheme)?;
    normalized_moment(spectrum, 2, center, scheme)
}

/// A located extreme sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Extremum {
    /// Index along each axis
    pub position: Vec<usize>,
    /// Coordinate along each axis
    pub coordinates: Vec<f64>,
    pub intensity: f64,
}

impl Extremum {
    /// Coordinate on the first axis.
    pub fn coordinate(&self) -> f64 {
        self.coordinates[0]
    }
}

fn extremum<S, F>(spectrum: &S, better: F) -> Result<Extremum>
where
    S: Spectrum + ?Sized,
    F: Fn(f64, f64) -> bool,
{
    let values = spectrum.intensities();
    let (mut best, mut best_value) = match values.first() {
        Some(&value) => (0, value),
        None => {
            return Err(SpectrumError::InvalidDomain(
                "spectrum has no samples".to_string(),
            ))
        }
    };
    for (i, &value) in values.iter().enumerate().skip(1) {
        if better(value, best_value) {
            best = i;
            best_value = value;
        }
    }

    let shape = spectrum.shape();
    let mut position = vec![0usize; shape.len()];
    unravel_index(best, &shape, &mut position);
    let coordinates = position
        .iter()
        .enumerate()
        .map(|(axis, &i)| spectrum.coordinates(axis)[i])
        .collect();
    Ok(Extremum {
        position,
        coordinates,
        intensity: best_value,
    })
}

/// Largest sample; the first occurrence wins ties.
pub fn nominal_max<S: Spectrum + ?Sized>(spectrum: &S) -> Result<Extremum> {
    extremum(spectrum, |value, best| value > best)
}

/// Smallest sample; the first occurrence wins ties.
pub fn nominal_min<S: Spectrum + ?Sized>(spectrum: &S) -> Result<Extremum> {
    extremum(spectrum, |value, best| value < best)
}

/// Central-difference first derivative of uniformly spaced samples.
///
/// The first and last entries are set to `0.0`: no derivative is available
/// there, and the zero does not mean a flat slope.
pub fn central_difference(values: &[f64], step: f64) -> Vec<f64> {
    let mut out = vec![0.0; values.len()];
    for j in 1..values.len().saturating_sub(1) {
        out[j] = (values[j + 1] - values[j - 1]) / (2.0 * step);
    }
    out
}

/// Central-difference first derivative of an evenly spaced 1-D spectrum.
pub fn derivative<S: Spectrum + ?Sized>(spectrum: &S) -> Result<Vec<f64>> {
    let steps = spectrum.steps()?;
    require_1d(spectrum)?;
    Ok(central_difference(&spectrum.intensities(), steps[0]))
}

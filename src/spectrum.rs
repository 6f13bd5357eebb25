use std::borrow::Cow;

use nalgebra::DMatrix;

use crate::error::{Result, SpectrumError};

/// Ordering of a coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Coordinates increase with the index
    Ascending,
    /// Coordinates decrease with the index (e.g. wavenumber or ppm axes)
    Descending,
}

impl Direction {
    /// Decides the direction from the first and last coordinate.
    ///
    /// A single-sample axis counts as ascending.
    pub fn of(coordinates: &[f64]) -> Self {
        match (coordinates.first(), coordinates.last()) {
            (Some(first), Some(last)) if last < first => Direction::Descending,
            _ => Direction::Ascending,
        }
    }
}

/// The capability set every spectrum provides.
///
/// A spectrum is an intensity sequence sampled over one ordered coordinate
/// sequence per axis. Intensities are exposed flattened in row-major order
/// (the last axis varies fastest), so `intensities().len()` always equals the
/// product of `shape()`.
///
/// Whether an axis is evenly spaced is a separate capability queried through
/// [`Spectrum::spacing`]; integration and differentiation require it.
pub trait Spectrum {
    /// Number of coordinate axes.
    fn ndim(&self) -> usize {
        1
    }

    /// Number of samples along each axis.
    fn shape(&self) -> Vec<usize>;

    /// Coordinate sequence of `axis` (`axis < ndim()`).
    fn coordinates(&self, axis: usize) -> Cow<'_, [f64]>;

    /// Intensities, flattened row-major.
    fn intensities(&self) -> Cow<'_, [f64]>;

    /// Uniform step of `axis`, or `None` when the axis is irregularly sampled.
    fn spacing(&self, axis: usize) -> Option<f64>;

    /// True when every axis has a uniform step.
    fn is_evenly_spaced(&self) -> bool {
        (0..self.ndim()).all(|axis| self.spacing(axis).is_some())
    }

    /// Total number of samples.
    fn len(&self) -> usize {
        self.shape().iter().product()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First and last coordinate of `axis`.
    fn endpoints(&self, axis: usize) -> (f64, f64) {
        let coords = self.coordinates(axis);
        (coords[0], coords[coords.len() - 1])
    }

    /// Per-axis steps, failing with [`SpectrumError::NotEvenlySpaced`] if any
    /// axis is irregular.
    fn steps(&self) -> Result<Vec<f64>> {
        (0..self.ndim())
            .map(|axis| self.spacing(axis).ok_or(SpectrumError::NotEvenlySpaced))
            .collect()
    }
}

/// Writes the row-major multi-index of `flat` within `shape` into `index`.
pub(crate) fn unravel_index(mut flat: usize, shape: &[usize], index: &mut [usize]) {
    for (slot, &len) in index.iter_mut().zip(shape).rev() {
        *slot = flat % len;
        flat /= len;
    }
}

fn check_endpoints(start: f64, end: f64) -> Result<()> {
    if !start.is_finite() || !end.is_finite() {
        return Err(SpectrumError::InvalidDomain(format!(
            "endpoints must be finite, got ({start}, {end})"
        )));
    }
    if start == end {
        return Err(SpectrumError::InvalidDomain(format!(
            "endpoints must differ, got {start} twice"
        )));
    }
    Ok(())
}

fn linspace(start: f64, end: f64, len: usize) -> Vec<f64> {
    let step = (end - start) / (len - 1) as f64;
    (0..len)
        .map(|i| if i + 1 == len { end } else { start + i as f64 * step })
        .collect()
}

/// A one-dimensional spectrum over an explicit, strictly monotonic coordinate
/// sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledSpectrum {
    coordinates: Vec<f64>,
    intensities: Vec<f64>,
}

impl SampledSpectrum {
    /// Creates a spectrum from matching coordinate and intensity vectors.
    ///
    /// Coordinates must be finite and strictly ascending or strictly
    /// descending.
    pub fn new(coordinates: Vec<f64>, intensities: Vec<f64>) -> Result<Self> {
        if coordinates.len() != intensities.len() {
            return Err(SpectrumError::DimensionMismatch {
                expected: coordinates.len(),
                found: intensities.len(),
            });
        }
        if coordinates.is_empty() {
            return Err(SpectrumError::InvalidDomain(
                "a spectrum needs at least one sample".to_string(),
            ));
        }
        if coordinates.iter().any(|c| !c.is_finite()) {
            return Err(SpectrumError::InvalidDomain(
                "coordinates must be finite".to_string(),
            ));
        }
        let ascending = coordinates.windows(2).all(|w| w[1] > w[0]);
        let descending = coordinates.windows(2).all(|w| w[1] < w[0]);
        if !ascending && !descending {
            return Err(SpectrumError::InvalidDomain(
                "coordinates must be strictly monotonic".to_string(),
            ));
        }
        Ok(Self {
            coordinates,
            intensities,
        })
    }

    /// Splits into `(coordinates, intensities)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.coordinates, self.intensities)
    }
}

impl Spectrum for SampledSpectrum {
    fn shape(&self) -> Vec<usize> {
        vec![self.intensities.len()]
    }

    fn coordinates(&self, axis: usize) -> Cow<'_, [f64]> {
        debug_assert_eq!(axis, 0);
        Cow::Borrowed(&self.coordinates)
    }

    fn intensities(&self) -> Cow<'_, [f64]> {
        Cow::Borrowed(&self.intensities)
    }

    fn spacing(&self, _axis: usize) -> Option<f64> {
        None
    }
}

/// A one-dimensional spectrum whose coordinates form an arithmetic
/// progression from `start` to `end`.
///
/// Only the endpoints are stored; `coordinate[i] = start + i * step` with
/// `step = (end - start) / (len - 1)`. A negative step means a descending
/// axis.
#[derive(Debug, Clone, PartialEq)]
pub struct EvenSpectrum {
    start: f64,
    end: f64,
    intensities: Vec<f64>,
}

impl EvenSpectrum {
    /// Creates an evenly spaced spectrum spanning `start..=end`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use spectrakit::{EvenSpectrum, Spectrum};
    ///
    /// let spectrum = EvenSpectrum::new(0.0, 4.0, vec![1.0, 2.0, 3.0, 2.0, 1.0]).unwrap();
    /// assert_eq!(spectrum.step(), 1.0);
    /// assert_eq!(spectrum.len(), 5);
    /// ```
    pub fn new(start: f64, end: f64, intensities: Vec<f64>) -> Result<Self> {
        if intensities.len() < 2 {
            return Err(SpectrumError::InvalidDomain(format!(
                "an evenly spaced spectrum needs at least two samples, got {}",
                intensities.len()
            )));
        }
        check_endpoints(start, end)?;
        Ok(Self {
            start,
            end,
            intensities,
        })
    }

    /// Creates a spectrum from its first coordinate and step.
    pub fn with_step(start: f64, step: f64, intensities: Vec<f64>) -> Result<Self> {
        let end = start + step * (intensities.len().max(1) - 1) as f64;
        Self::new(start, end, intensities)
    }

    /// Samples `f` at `len` evenly spaced coordinates between `start` and `end`.
    pub fn from_fn<F>(start: f64, end: f64, len: usize, f: F) -> Result<Self>
    where
        F: Fn(f64) -> f64,
    {
        if len < 2 {
            return Err(SpectrumError::InvalidDomain(format!(
                "an evenly spaced spectrum needs at least two samples, got {len}"
            )));
        }
        check_endpoints(start, end)?;
        let intensities = linspace(start, end, len).into_iter().map(f).collect();
        Ok(Self {
            start,
            end,
            intensities,
        })
    }

    /// Signed spacing between neighbouring coordinates.
    pub fn step(&self) -> f64 {
        (self.end - self.start) / (self.intensities.len() - 1) as f64
    }

    /// Coordinate of sample `index`.
    pub fn coordinate(&self, index: usize) -> f64 {
        self.start + index as f64 * self.step()
    }
}

impl Spectrum for EvenSpectrum {
    fn shape(&self) -> Vec<usize> {
        vec![self.intensities.len()]
    }

    fn coordinates(&self, axis: usize) -> Cow<'_, [f64]> {
        debug_assert_eq!(axis, 0);
        Cow::Owned(linspace(self.start, self.end, self.intensities.len()))
    }

    fn intensities(&self) -> Cow<'_, [f64]> {
        Cow::Borrowed(&self.intensities)
    }

    fn spacing(&self, _axis: usize) -> Option<f64> {
        Some(self.step())
    }

    fn endpoints(&self, _axis: usize) -> (f64, f64) {
        (self.start, self.end)
    }
}

/// A two-dimensional, evenly spaced intensity grid.
///
/// Rows of `grid` follow axis 0 and columns follow axis 1.
#[derive(Debug, Clone, PartialEq)]
pub struct EvenGrid {
    rows: (f64, f64),
    cols: (f64, f64),
    grid: DMatrix<f64>,
}

impl EvenGrid {
    /// Creates a grid whose axis 0 spans `rows` and axis 1 spans `cols`.
    pub fn new(rows: (f64, f64), cols: (f64, f64), grid: DMatrix<f64>) -> Result<Self> {
        if grid.nrows() < 2 || grid.ncols() < 2 {
            return Err(SpectrumError::InvalidDomain(format!(
                "a grid needs at least 2x2 samples, got {}x{}",
                grid.nrows(),
                grid.ncols()
            )));
        }
        check_endpoints(rows.0, rows.1)?;
        check_endpoints(cols.0, cols.1)?;
        Ok(Self { rows, cols, grid })
    }

    /// Intensity matrix; rows follow axis 0.
    pub fn grid(&self) -> &DMatrix<f64> {
        &self.grid
    }

    fn axis_span(&self, axis: usize) -> ((f64, f64), usize) {
        match axis {
            0 => (self.rows, self.grid.nrows()),
            _ => (self.cols, self.grid.ncols()),
        }
    }
}

impl Spectrum for EvenGrid {
    fn ndim(&self) -> usize {
        2
    }

    fn shape(&self) -> Vec<usize> {
        vec![self.grid.nrows(), self.grid.ncols()]
    }

    fn coordinates(&self, axis: usize) -> Cow<'_, [f64]> {
        debug_assert!(axis < 2);
        let ((start, end), len) = self.axis_span(axis);
        Cow::Owned(linspace(start, end, len))
    }

    fn intensities(&self) -> Cow<'_, [f64]> {
        // nalgebra stores column-major; the transpose's storage is row-major
        Cow::Owned(self.grid.transpose().as_slice().to_vec())
    }

    fn spacing(&self, axis: usize) -> Option<f64> {
        let ((start, end), len) = self.axis_span(axis);
        Some((end - start) / (len - 1) as f64)
    }

    fn endpoints(&self, axis: usize) -> (f64, f64) {
        self.axis_span(axis).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_even_spectrum_coordinates() {
        let spectrum = EvenSpectrum::new(10.0, 0.0, vec![0.0; 11]).unwrap();
        assert_eq!(spectrum.step(), -1.0);
        assert_eq!(spectrum.len(), 11);

        let coords = spectrum.coordinates(0);
        assert_eq!(coords[0], 10.0);
        assert_eq!(coords[10], 0.0);
        for (i, c) in coords.iter().enumerate() {
            assert_abs_diff_eq!(*c, spectrum.coordinate(i), epsilon = 1e-12);
        }
        assert_eq!(Direction::of(&coords), Direction::Descending);
    }

    #[test]
    fn test_even_spectrum_rejects_zero_step() {
        assert!(matches!(
            EvenSpectrum::new(1.0, 1.0, vec![0.0; 4]),
            Err(SpectrumError::InvalidDomain(_))
        ));
        assert!(matches!(
            EvenSpectrum::new(0.0, 1.0, vec![0.0]),
            Err(SpectrumError::InvalidDomain(_))
        ));
        assert!(EvenSpectrum::with_step(0.0, 0.0, vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_even_spectrum_from_fn() {
        let spectrum = EvenSpectrum::from_fn(0.0, 2.0, 5, |x| x * x).unwrap();
        assert_eq!(spectrum.step(), 0.5);
        assert_abs_diff_eq!(spectrum.intensities()[3], 2.25, epsilon = 1e-12);
    }

    #[test]
    fn test_sampled_spectrum_validation() {
        assert!(matches!(
            SampledSpectrum::new(vec![1.0, 2.0], vec![1.0]),
            Err(SpectrumError::DimensionMismatch { expected: 2, found: 1 })
        ));
        assert!(matches!(
            SampledSpectrum::new(vec![1.0, 3.0, 2.0], vec![0.0; 3]),
            Err(SpectrumError::InvalidDomain(_))
        ));
        assert!(SampledSpectrum::new(vec![], vec![]).is_err());

        let spectrum = SampledSpectrum::new(vec![1.0, 1.5, 4.0], vec![3.0, 2.0, 1.0]).unwrap();
        assert!(!spectrum.is_evenly_spaced());
        assert!(matches!(spectrum.steps(), Err(SpectrumError::NotEvenlySpaced)));
    }

    #[test]
    fn test_grid_intensities_row_major() {
        let grid = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let spectrum = EvenGrid::new((0.0, 1.0), (0.0, 2.0), grid).unwrap();
        assert_eq!(spectrum.shape(), vec![2, 3]);
        assert_eq!(spectrum.intensities().as_ref(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(spectrum.steps().unwrap(), vec![1.0, 1.0]);
        assert_eq!(spectrum.coordinates(1).as_ref(), &[0.0, 1.0, 2.0]);
    }
}

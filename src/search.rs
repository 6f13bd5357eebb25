//! Interval search over monotonic coordinate axes.
//!
//! Given a closed coordinate interval `(lower, upper)` the search returns the
//! smallest index range `[start, stop]` whose coordinates enclose it: `start`
//! is the last index whose coordinate has not passed `lower`, `stop` the first
//! index whose coordinate has reached `upper`. "Passed" and "reached" follow
//! the axis direction, so descending axes take descending intervals.

use crate::error::{Result, SpectrumError};
use crate::spectrum::{Direction, Spectrum};
use crate::view::View;

/// Algorithm used to locate interval brackets.
///
/// Both methods return identical indices for every valid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchMethod {
    /// Partition-point search, `O(log n)` per endpoint
    #[default]
    Binary,
    /// Left-to-right scan, `O(n)` per endpoint
    Linear,
}

/// Restricts `spectrum` to the smallest index range enclosing one coordinate
/// interval per axis.
///
/// # Example
///
/// ```rust
/// use spectrakit::{get_view, EvenSpectrum, SearchMethod, Spectrum};
///
/// let spectrum = EvenSpectrum::new(0.0, 9.0, (0..10).map(f64::from).collect()).unwrap();
/// let view = get_view(&spectrum, &[(2.5, 6.0)], SearchMethod::Binary).unwrap();
/// assert_eq!(view.ranges(), &[(2, 6)]);
/// assert_eq!(view.len(), 5);
/// ```
pub fn get_view<'a, S>(
    spectrum: &'a S,
    intervals: &[(f64, f64)],
    method: SearchMethod,
) -> Result<View<'a, S>>
where
    S: Spectrum + ?Sized,
{
    let ranges = bracket_all(spectrum, intervals, method)?;
    log::debug!("view {ranges:?} for intervals {intervals:?} ({method:?})");
    Ok(View::new(spectrum, ranges))
}

/// Brackets `(lower, upper)` on a single coordinate axis.
pub fn bracket(
    coordinates: &[f64],
    lower: f64,
    upper: f64,
    method: SearchMethod,
) -> Result<(usize, usize)> {
    bracket_axis(0, coordinates, lower, upper, method)
}

pub(crate) fn bracket_all<S>(
    spectrum: &S,
    intervals: &[(f64, f64)],
    method: SearchMethod,
) -> Result<Vec<(usize, usize)>>
where
    S: Spectrum + ?Sized,
{
    let ndim = spectrum.ndim();
    if intervals.len() != ndim {
        // first axis without an interval, or the first surplus interval
        let axis = ndim.min(intervals.len());
        let (lower, upper) = intervals.get(axis).copied().unwrap_or((f64::NAN, f64::NAN));
        return Err(SpectrumError::InvalidInterval {
            axis,
            lower,
            upper,
            reason: format!("expected {ndim} intervals, got {}", intervals.len()),
        });
    }
    intervals
        .iter()
        .enumerate()
        .map(|(axis, &(lower, upper))| {
            bracket_axis(axis, &spectrum.coordinates(axis), lower, upper, method)
        })
        .collect()
}

fn bracket_axis(
    axis: usize,
    coordinates: &[f64],
    lower: f64,
    upper: f64,
    method: SearchMethod,
) -> Result<(usize, usize)> {
    let invalid = |reason: &str| SpectrumError::InvalidInterval {
        axis,
        lower,
        upper,
        reason: reason.to_string(),
    };

    if coordinates.is_empty() {
        return Err(invalid("axis has no coordinates"));
    }
    if !lower.is_finite() || !upper.is_finite() {
        return Err(invalid("interval endpoints must be finite"));
    }

    let direction = Direction::of(coordinates);
    let first = coordinates[0];
    let last = coordinates[coordinates.len() - 1];
    let (lo, hi) = if first <= last { (first, last) } else { (last, first) };

    match direction {
        Direction::Ascending if lower > upper => {
            return Err(invalid("descending interval on an ascending axis"));
        }
        Direction::Descending if lower < upper => {
            return Err(invalid("ascending interval on a descending axis"));
        }
        _ => {}
    }
    if lower < lo || lower > hi || upper < lo || upper > hi {
        return Err(invalid("interval lies outside the coordinate range"));
    }

    let found = match method {
        SearchMethod::Binary => binary_bracket(coordinates, lower, upper, direction),
        SearchMethod::Linear => linear_bracket(coordinates, lower, upper, direction),
    };
    log::trace!("axis {axis}: ({lower}, {upper}) -> {found:?}");
    Ok(found)
}

/// `x` lies on the near side of `target` (or on it).
fn not_past(x: f64, target: f64, direction: Direction) -> bool {
    match direction {
        Direction::Ascending => x <= target,
        Direction::Descending => x >= target,
    }
}

/// `x` lies on the far side of `target` (or on it).
fn reached(x: f64, target: f64, direction: Direction) -> bool {
    match direction {
        Direction::Ascending => x >= target,
        Direction::Descending => x <= target,
    }
}

fn linear_bracket(
    coordinates: &[f64],
    lower: f64,
    upper: f64,
    direction: Direction,
) -> (usize, usize) {
    let mut start = 0;
    for (i, &c) in coordinates.iter().enumerate() {
        if !not_past(c, lower, direction) {
            break;
        }
        start = i;
    }
    let stop = coordinates
        .iter()
        .position(|&c| reached(c, upper, direction))
        .unwrap_or(coordinates.len() - 1);
    (start, stop)
}

fn binary_bracket(
    coordinates: &[f64],
    lower: f64,
    upper: f64,
    direction: Direction,
) -> (usize, usize) {
    let start = coordinates
        .partition_point(|&c| not_past(c, lower, direction))
        .saturating_sub(1);
    let stop = coordinates
        .partition_point(|&c| !reached(c, upper, direction))
        .min(coordinates.len() - 1);
    (start, stop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::{EvenSpectrum, SampledSpectrum};

    fn assert_methods_agree(coordinates: &[f64], lower: f64, upper: f64) -> (usize, usize) {
        let binary = bracket(coordinates, lower, upper, SearchMethod::Binary).unwrap();
        let linear = bracket(coordinates, lower, upper, SearchMethod::Linear).unwrap();
        assert_eq!(binary, linear, "interval ({lower}, {upper})");
        binary
    }

    #[test]
    fn test_bracket_between_samples() {
        let coords: Vec<f64> = (0..10).map(f64::from).collect();
        assert_eq!(assert_methods_agree(&coords, 2.5, 6.5), (2, 7));
        assert_eq!(assert_methods_agree(&coords, 2.0, 6.0), (2, 6));
    }

    #[test]
    fn test_bracket_degenerate_interval() {
        let coords: Vec<f64> = (0..10).map(f64::from).collect();
        assert_eq!(assert_methods_agree(&coords, 4.0, 4.0), (4, 4));
        assert_eq!(assert_methods_agree(&coords, 4.5, 4.5), (4, 5));
    }

    #[test]
    fn test_bracket_full_domain() {
        let coords: Vec<f64> = (0..10).map(f64::from).collect();
        assert_eq!(assert_methods_agree(&coords, 0.0, 9.0), (0, 9));

        let desc: Vec<f64> = coords.iter().rev().copied().collect();
        assert_eq!(assert_methods_agree(&desc, 9.0, 0.0), (0, 9));
    }

    #[test]
    fn test_bracket_descending_axis() {
        let coords = [10.0, 8.0, 6.0, 4.0, 2.0, 0.0];
        assert_eq!(assert_methods_agree(&coords, 7.0, 3.0), (1, 4));
        assert_eq!(assert_methods_agree(&coords, 6.0, 6.0), (2, 2));
    }

    #[test]
    fn test_bracket_invalid_intervals() {
        let coords: Vec<f64> = (0..10).map(f64::from).collect();
        let err = bracket(&coords, 6.0, 2.0, SearchMethod::Binary).unwrap_err();
        assert!(matches!(err, SpectrumError::InvalidInterval { axis: 0, .. }));
        assert!(bracket(&coords, -1.0, 2.0, SearchMethod::Linear).is_err());
        assert!(bracket(&coords, 1.0, 9.5, SearchMethod::Binary).is_err());
        assert!(bracket(&coords, f64::NAN, 2.0, SearchMethod::Binary).is_err());

        let desc: Vec<f64> = coords.iter().rev().copied().collect();
        assert!(bracket(&desc, 2.0, 6.0, SearchMethod::Binary).is_err());
    }

    #[test]
    fn test_binary_matches_linear_exhaustively() {
        let irregular = SampledSpectrum::new(
            vec![0.0, 0.3, 0.35, 1.2, 2.0, 2.1, 3.7, 4.0, 5.5],
            vec![0.0; 9],
        )
        .unwrap();
        let ascending = irregular.coordinates(0).into_owned();
        let descending: Vec<f64> = ascending.iter().map(|c| 10.0 - c).collect();
        let even = EvenSpectrum::new(-3.0, 3.0, vec![0.0; 25]).unwrap();
        let even_coords = even.coordinates(0).into_owned();

        for coords in [&ascending, &descending, &even_coords] {
            let (first, last) = (coords[0], coords[coords.len() - 1]);
            let probes: Vec<f64> = (0..=60)
                .map(|k| first + (last - first) * k as f64 / 60.0)
                .chain(coords.iter().copied())
                .collect();
            for &a in &probes {
                for &b in &probes {
                    let ordered = if first <= last { a <= b } else { a >= b };
                    if ordered {
                        assert_methods_agree(coords, a, b);
                    }
                }
            }
        }
    }

    #[test]
    fn test_get_view_interval_count() {
        let spectrum = EvenSpectrum::new(0.0, 1.0, vec![0.0; 5]).unwrap();
        let err = get_view(&spectrum, &[(0.0, 1.0), (0.5, 0.75)], SearchMethod::Binary).unwrap_err();
        assert_eq!(
            err,
            SpectrumError::InvalidInterval {
                axis: 1,
                lower: 0.5,
                upper: 0.75,
                reason: "expected 1 intervals, got 2".to_string(),
            }
        );

        let err = get_view(&spectrum, &[], SearchMethod::Linear).unwrap_err();
        assert!(matches!(err, SpectrumError::InvalidInterval { axis: 0, .. }));
    }
}

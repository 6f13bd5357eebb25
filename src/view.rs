use std::borrow::Cow;

use crate::error::Result;
use crate::search::{bracket_all, SearchMethod};
use crate::spectrum::Spectrum;

/// A read-only restriction of a spectrum to closed per-axis index ranges.
///
/// Views never own data; they borrow their parent for `'a`. Views are built
/// by [`get_view`](crate::get_view) or [`View::subview`], and a view of a
/// view always refers to the root spectrum with composed indices.
#[derive(Debug)]
pub struct View<'a, S: Spectrum + ?Sized> {
    parent: &'a S,
    ranges: Vec<(usize, usize)>,
}

impl<S: Spectrum + ?Sized> Clone for View<'_, S> {
    fn clone(&self) -> Self {
        Self {
            parent: self.parent,
            ranges: self.ranges.clone(),
        }
    }
}

impl<'a, S: Spectrum + ?Sized> View<'a, S> {
    pub(crate) fn new(parent: &'a S, ranges: Vec<(usize, usize)>) -> Self {
        debug_assert!(ranges
            .iter()
            .zip(parent.shape())
            .all(|(&(start, stop), len)| start <= stop && stop < len));
        Self { parent, ranges }
    }

    /// The root spectrum this view restricts.
    pub fn parent(&self) -> &'a S {
        self.parent
    }

    /// Closed `(start, stop)` index range per axis, in parent indices.
    pub fn ranges(&self) -> &[(usize, usize)] {
        &self.ranges
    }

    /// Narrows this view further; the result is still a view of the root.
    pub fn subview(&self, intervals: &[(f64, f64)], method: SearchMethod) -> Result<View<'a, S>> {
        let local = bracket_all(self, intervals, method)?;
        let ranges = self
            .ranges
            .iter()
            .zip(local)
            .map(|(&(offset, _), (start, stop))| (offset + start, offset + stop))
            .collect();
        Ok(View::new(self.parent, ranges))
    }
}

impl<S: Spectrum + ?Sized> Spectrum for View<'_, S> {
    fn ndim(&self) -> usize {
        self.parent.ndim()
    }

    fn shape(&self) -> Vec<usize> {
        self.ranges
            .iter()
            .map(|&(start, stop)| stop - start + 1)
            .collect()
    }

    fn coordinates(&self, axis: usize) -> Cow<'_, [f64]> {
        let (start, stop) = self.ranges[axis];
        match self.parent.coordinates(axis) {
            Cow::Borrowed(coords) => Cow::Borrowed(&coords[start..=stop]),
            Cow::Owned(coords) => Cow::Owned(coords[start..=stop].to_vec()),
        }
    }

    fn intensities(&self) -> Cow<'_, [f64]> {
        let data = self.parent.intensities();
        if let [(start, stop)] = self.ranges[..] {
            return match data {
                Cow::Borrowed(values) => Cow::Borrowed(&values[start..=stop]),
                Cow::Owned(values) => Cow::Owned(values[start..=stop].to_vec()),
            };
        }
        Cow::Owned(gather(&data, &self.parent.shape(), &self.ranges))
    }

    fn spacing(&self, axis: usize) -> Option<f64> {
        self.parent.spacing(axis)
    }
}

/// Copies the row-major sub-block `ranges` out of `data` laid out as `shape`.
fn gather(data: &[f64], shape: &[usize], ranges: &[(usize, usize)]) -> Vec<f64> {
    let sub_shape: Vec<usize> = ranges.iter().map(|&(a, b)| b - a + 1).collect();
    let total: usize = sub_shape.iter().product();
    let mut index = vec![0usize; shape.len()];
    let mut out = Vec::with_capacity(total);
    for flat in 0..total {
        crate::spectrum::unravel_index(flat, &sub_shape, &mut index);
        let parent_flat = index
            .iter()
            .zip(ranges)
            .zip(shape)
            .fold(0, |acc, ((&i, &(start, _)), &len)| acc * len + start + i);
        out.push(data[parent_flat]);
    }
    out
}

/// A copied-out section of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Coordinates of each axis
    pub coordinates: Vec<Vec<f64>>,
    /// Intensities, flattened row-major
    pub intensities: Vec<f64>,
    pub shape: Vec<usize>,
}

/// Copies the coordinates and intensities covered by `view`.
pub fn extract_section<S: Spectrum + ?Sized>(view: &View<'_, S>) -> Section {
    Section {
        coordinates: (0..view.ndim())
            .map(|axis| view.coordinates(axis).into_owned())
            .collect(),
        intensities: view.intensities().into_owned(),
        shape: view.shape(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::get_view;
    use crate::spectrum::{EvenGrid, EvenSpectrum, SampledSpectrum};
    use nalgebra::DMatrix;

    #[test]
    fn test_view_borrows_parent_slice() {
        let spectrum =
            SampledSpectrum::new(vec![1.0, 2.0, 4.0, 8.0, 16.0], vec![5.0, 4.0, 3.0, 2.0, 1.0]).unwrap();
        let view = get_view(&spectrum, &[(3.0, 9.0)], SearchMethod::Binary).unwrap();
        assert_eq!(view.ranges(), &[(1, 4)]);
        assert!(matches!(view.intensities(), Cow::Borrowed(_)));
        assert_eq!(view.coordinates(0).as_ref(), &[2.0, 4.0, 8.0, 16.0]);
        assert!(!view.is_evenly_spaced());
    }

    #[test]
    fn test_subview_normalizes_to_root() {
        let spectrum = EvenSpectrum::new(0.0, 20.0, (0..21).map(f64::from).collect()).unwrap();
        let outer = get_view(&spectrum, &[(4.0, 16.0)], SearchMethod::Linear).unwrap();
        let inner = outer.subview(&[(6.5, 9.0)], SearchMethod::Binary).unwrap();
        assert_eq!(inner.ranges(), &[(6, 9)]);
        assert!(std::ptr::eq(inner.parent(), &spectrum));
        assert_eq!(inner.spacing(0), Some(1.0));
        assert_eq!(inner.intensities().as_ref(), &[6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_subview_rejects_interval_outside_view() {
        let spectrum = EvenSpectrum::new(0.0, 20.0, vec![0.0; 21]).unwrap();
        let outer = get_view(&spectrum, &[(4.0, 16.0)], SearchMethod::Binary).unwrap();
        assert!(outer.subview(&[(2.0, 6.0)], SearchMethod::Binary).is_err());
    }

    #[test]
    fn test_grid_view_gathers_block() {
        let grid = DMatrix::from_fn(4, 5, |r, c| (10 * r + c) as f64);
        let spectrum = EvenGrid::new((0.0, 3.0), (0.0, 4.0), grid).unwrap();
        let view = get_view(&spectrum, &[(1.0, 2.0), (2.5, 4.0)], SearchMethod::Binary).unwrap();
        assert_eq!(view.ranges(), &[(1, 2), (2, 4)]);

        let section = extract_section(&view);
        assert_eq!(section.shape, vec![2, 3]);
        assert_eq!(section.coordinates[0], vec![1.0, 2.0]);
        assert_eq!(section.coordinates[1], vec![2.0, 3.0, 4.0]);
        assert_eq!(section.intensities, vec![12.0, 13.0, 14.0, 22.0, 23.0, 24.0]);
    }
}

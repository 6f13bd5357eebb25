//! Plain arrays for plotting front ends.

use nalgebra::DMatrix;

use crate::error::{Result, SpectrumError};
use crate::spectrum::Spectrum;

/// Data a plotting adapter needs, and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotData {
    /// A line trace
    Trace { x: Vec<f64>, y: Vec<f64> },
    /// A heat map; rows of `z` follow `x`, columns follow `y`
    Grid {
        x: Vec<f64>,
        y: Vec<f64>,
        z: DMatrix<f64>,
    },
}

impl PlotData {
    /// A trace from matching coordinate and intensity sequences.
    pub fn trace(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(SpectrumError::DimensionMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }
        Ok(PlotData::Trace { x, y })
    }
}

/// Extracts plottable arrays from a 1-D or 2-D spectrum or view.
pub fn plot_data<S: Spectrum + ?Sized>(spectrum: &S) -> Result<PlotData> {
    match spectrum.shape()[..] {
        [_] => PlotData::trace(
            spectrum.coordinates(0).into_owned(),
            spectrum.intensities().into_owned(),
        ),
        [rows, cols] => Ok(PlotData::Grid {
            x: spectrum.coordinates(0).into_owned(),
            y: spectrum.coordinates(1).into_owned(),
            z: DMatrix::from_row_slice(rows, cols, &spectrum.intensities()),
        }),
        _ => Err(SpectrumError::UnsupportedDimensionality {
            expected: 2,
            found: spectrum.ndim(),
        }),
    }
}

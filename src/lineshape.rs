//! Closed-form peak models.
//!
//! Every line shape has three parameters laid out as `[center, scale,
//! height]`. A [`CompositeShape`] sums several shapes of one kind and keeps
//! their parameters as a `3 x shape_count` matrix, one column per shape, which
//! is exactly the flat parameter vector an optimizer works on.

use std::f64::consts::{LN_2, PI};

use nalgebra::DMatrix;

use crate::error::{Result, SpectrumError};

/// Number of parameters of every line shape.
pub const PARAMS_PER_SHAPE: usize = 3;

/// The family of a line shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineShapeKind {
    /// `h/σ · exp(-((x-μ)/σ)²/2)`
    Gaussian,
    /// `h / (γ (1 + ((x-x₀)/γ)²))`
    Cauchy,
    /// `h (1 + cos(π (x-μ)/s))` on `|x-μ| ≤ s`, zero elsewhere
    RaisedCosine,
}

impl LineShapeKind {
    /// Evaluates the closed form without validating `scale`.
    pub fn evaluate(self, center: f64, scale: f64, height: f64, x: f64) -> f64 {
        let u = (x - center) / scale;
        match self {
            LineShapeKind::Gaussian => height / scale * (-0.5 * u * u).exp(),
            LineShapeKind::Cauchy => height / (scale * (1.0 + u * u)),
            LineShapeKind::RaisedCosine => {
                if u.abs() <= 1.0 {
                    height * (1.0 + (PI * u).cos())
                } else {
                    0.0
                }
            }
        }
    }
}

fn check_scale(scale: f64) -> Result<()> {
    if scale > 0.0 && scale.is_finite() {
        Ok(())
    } else {
        Err(SpectrumError::InvalidScale(scale))
    }
}

/// A single validated peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineShape {
    kind: LineShapeKind,
    center: f64,
    scale: f64,
    height: f64,
}

impl LineShape {
    /// Creates a line shape, failing with [`SpectrumError::InvalidScale`]
    /// unless `scale` is positive and finite.
    pub fn new(kind: LineShapeKind, center: f64, scale: f64, height: f64) -> Result<Self> {
        check_scale(scale)?;
        Ok(Self {
            kind,
            center,
            scale,
            height,
        })
    }

    /// Gaussian with standard deviation `sigma`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use spectrakit::LineShape;
    ///
    /// let peak = LineShape::gaussian(0.0, 2.5, 3.0).unwrap();
    /// assert!((peak.evaluate(0.0) - 1.2).abs() < 1e-12);
    /// ```
    pub fn gaussian(center: f64, sigma: f64, height: f64) -> Result<Self> {
        Self::new(LineShapeKind::Gaussian, center, sigma, height)
    }

    /// Cauchy (Lorentzian) with half width at half maximum `gamma`.
    pub fn cauchy(center: f64, gamma: f64, height: f64) -> Result<Self> {
        Self::new(LineShapeKind::Cauchy, center, gamma, height)
    }

    /// Raised cosine supported on `center ± scale`.
    pub fn raised_cosine(center: f64, scale: f64, height: f64) -> Result<Self> {
        Self::new(LineShapeKind::RaisedCosine, center, scale, height)
    }

    /// The family of this shape.
    pub fn kind(&self) -> LineShapeKind {
        self.kind
    }

    /// Position of the peak maximum.
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Width parameter: `σ`, `γ` or the half support.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Amplitude factor `h`.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Parameters as `[center, scale, height]`.
    pub fn params(&self) -> [f64; PARAMS_PER_SHAPE] {
        [self.center, self.scale, self.height]
    }

    /// Value of the shape at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.kind.evaluate(self.center, self.scale, self.height, x)
    }

    /// Values at every coordinate of `xs`.
    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// Full width at half maximum.
    pub fn fwhm(&self) -> f64 {
        match self.kind {
            LineShapeKind::Gaussian => 2.0 * (2.0 * LN_2).sqrt() * self.scale,
            LineShapeKind::Cauchy => 2.0 * self.scale,
            LineShapeKind::RaisedCosine => self.scale,
        }
    }

    /// Integral over the whole real line.
    pub fn area(&self) -> f64 {
        match self.kind {
            LineShapeKind::Gaussian => self.height * (2.0 * PI).sqrt(),
            LineShapeKind::Cauchy => self.height * PI,
            LineShapeKind::RaisedCosine => 2.0 * self.height * self.scale,
        }
    }
}

/// A sum of same-kind line shapes over a shared parameter layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeShape {
    kind: LineShapeKind,
    params: DMatrix<f64>,
}

impl CompositeShape {
    /// Reshapes a flat `[center, scale, height, center, scale, height, ...]`
    /// buffer into a composite.
    ///
    /// The buffer length must be a positive multiple of three and every scale
    /// must be positive.
    pub fn new(kind: LineShapeKind, params: &[f64]) -> Result<Self> {
        if params.is_empty() || params.len() % PARAMS_PER_SHAPE != 0 {
            let expected = params.len().div_ceil(PARAMS_PER_SHAPE).max(1) * PARAMS_PER_SHAPE;
            return Err(SpectrumError::DimensionMismatch {
                expected,
                found: params.len(),
            });
        }
        let params = DMatrix::from_column_slice(
            PARAMS_PER_SHAPE,
            params.len() / PARAMS_PER_SHAPE,
            params,
        );
        for &scale in params.row(1).iter() {
            check_scale(scale)?;
        }
        Ok(Self { kind, params })
    }

    /// Composite made of a single shape.
    pub fn single(shape: LineShape) -> Self {
        Self {
            kind: shape.kind,
            params: DMatrix::from_column_slice(PARAMS_PER_SHAPE, 1, &shape.params()),
        }
    }

    /// The family shared by every constituent.
    pub fn kind(&self) -> LineShapeKind {
        self.kind
    }

    /// Number of constituent shapes.
    pub fn shape_count(&self) -> usize {
        self.params.ncols()
    }

    /// Parameter matrix, one column per shape.
    pub fn params(&self) -> &DMatrix<f64> {
        &self.params
    }

    /// The flat parameter buffer.
    pub fn flat_params(&self) -> &[f64] {
        self.params.as_slice()
    }

    /// The `index`-th constituent shape.
    pub fn shape(&self, index: usize) -> Option<LineShape> {
        (index < self.shape_count()).then(|| {
            let column = self.params.column(index);
            LineShape {
                kind: self.kind,
                center: column[0],
                scale: column[1],
                height: column[2],
            }
        })
    }

    /// Iterates over the constituent shapes.
    pub fn shapes(&self) -> impl Iterator<Item = LineShape> + '_ {
        (0..self.shape_count()).filter_map(|i| self.shape(i))
    }

    /// Sum of every constituent at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.params
            .column_iter()
            .map(|p| self.kind.evaluate(p[0], p[1], p[2], x))
            .sum()
    }

    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{integrate, IntegrationScheme};
    use crate::spectrum::EvenSpectrum;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const KINDS: [LineShapeKind; 3] = [
        LineShapeKind::Gaussian,
        LineShapeKind::Cauchy,
        LineShapeKind::RaisedCosine,
    ];

    #[test]
    fn test_gaussian_peak_value() {
        let peak = LineShape::gaussian(0.0, 2.5, 3.0).unwrap();
        assert_abs_diff_eq!(peak.evaluate(0.0), 1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(peak.evaluate(2.5), 1.2 * (-0.5f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_cauchy_and_raised_cosine_values() {
        let peak = LineShape::cauchy(1.0, 0.5, 2.0).unwrap();
        assert_abs_diff_eq!(peak.evaluate(1.0), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(peak.evaluate(1.5), 2.0, epsilon = 1e-12);

        let peak = LineShape::raised_cosine(0.0, 2.0, 1.5).unwrap();
        assert_abs_diff_eq!(peak.evaluate(0.0), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(peak.evaluate(1.0), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(peak.evaluate(2.0), 0.0, epsilon = 1e-12);
        assert_eq!(peak.evaluate(2.5), 0.0);
    }

    #[test]
    fn test_non_positive_scale_is_rejected() {
        for kind in KINDS {
            for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
                assert!(matches!(
                    LineShape::new(kind, 0.0, scale, 1.0),
                    Err(SpectrumError::InvalidScale(_))
                ));
            }
        }
        assert!(matches!(
            CompositeShape::new(LineShapeKind::Gaussian, &[0.0, 1.0, 1.0, 2.0, -0.5, 1.0]),
            Err(SpectrumError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_single_shape_composite_matches_shape() {
        for kind in KINDS {
            let peak = LineShape::new(kind, 0.0, 2.5, 3.0).unwrap();
            let composite = CompositeShape::new(kind, &peak.params()).unwrap();
            assert_eq!(composite, CompositeShape::single(peak));
            for i in -40..=40 {
                let x = i as f64 * 0.25;
                assert_eq!(composite.evaluate(x), peak.evaluate(x));
            }
        }
        let composite = CompositeShape::new(LineShapeKind::Gaussian, &[0.0, 2.5, 3.0]).unwrap();
        assert_abs_diff_eq!(composite.evaluate(0.0), 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_composite_sums_and_reshapes() {
        let params = [-1.0, 0.5, 1.0, 2.0, 1.5, 4.0];
        let composite = CompositeShape::new(LineShapeKind::Cauchy, &params).unwrap();
        assert_eq!(composite.shape_count(), 2);
        assert_eq!(composite.params()[(1, 1)], 1.5);
        assert_eq!(composite.flat_params(), &params);

        let shapes: Vec<LineShape> = composite.shapes().collect();
        assert_eq!(shapes[1].center(), 2.0);
        assert!(composite.shape(2).is_none());
        for x in [-3.0, -1.0, 0.0, 2.0, 5.0] {
            let expected = shapes[0].evaluate(x) + shapes[1].evaluate(x);
            assert_abs_diff_eq!(composite.evaluate(x), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_composite_buffer_length() {
        assert_eq!(
            CompositeShape::new(LineShapeKind::Gaussian, &[0.0, 1.0, 1.0, 2.0]),
            Err(SpectrumError::DimensionMismatch { expected: 6, found: 4 })
        );
        assert_eq!(
            CompositeShape::new(LineShapeKind::Gaussian, &[]),
            Err(SpectrumError::DimensionMismatch { expected: 3, found: 0 })
        );
    }

    #[test]
    fn test_area_matches_numerical_integral() {
        let shapes = [
            LineShape::gaussian(1.0, 0.8, 2.0).unwrap(),
            LineShape::raised_cosine(1.0, 2.0, 0.7).unwrap(),
        ];
        for peak in shapes {
            let sampled = EvenSpectrum::from_fn(-9.0, 11.0, 4001, |x| peak.evaluate(x)).unwrap();
            let area = integrate(&sampled, IntegrationScheme::Midpoint).unwrap();
            assert_relative_eq!(area, peak.area(), max_relative = 1e-5);
        }
    }

    #[test]
    fn test_fwhm_is_half_maximum_width() {
        for kind in KINDS {
            let peak = LineShape::new(kind, 3.0, 1.7, 2.0).unwrap();
            let half = peak.evaluate(3.0) / 2.0;
            assert_abs_diff_eq!(peak.evaluate(3.0 + peak.fwhm() / 2.0), half, epsilon = 1e-12);
        }
    }
}

use crate::coefficients::{validate_config, CoefficientCache};
use crate::error::{Result, SpectrumError};
use crate::spectrum::Spectrum;

/// Configuration for the Savitzky-Golay filter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    /// Size of the filter window (odd, greater than 1)
    pub window_size: usize,
    /// Degree of the fitted polynomial (at most `window_size - 2`)
    pub poly_order: usize,
    /// Derivative order, 0 for smoothing (at most `poly_order`)
    pub derivative: usize,
    /// Sample spacing used to scale derivatives
    pub delta: f64,
}

impl FilterConfig {
    /// Creates a smoothing configuration with validation.
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self> {
        let config = Self {
            window_size,
            poly_order,
            derivative: 0,
            delta: 1.0,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the derivative order.
    pub fn with_derivative(mut self, derivative: usize) -> Result<Self> {
        self.derivative = derivative;
        self.validate()?;
        Ok(self)
    }

    /// Sets the sample spacing derivatives are expressed in.
    pub fn with_delta(mut self, delta: f64) -> Result<Self> {
        self.delta = delta;
        self.validate()?;
        Ok(self)
    }

    /// Validates the configuration
    ///
    /// # Returns
    ///
    /// `InvalidFilterConfig` when the window, order and derivative do not fit
    /// together or the sample spacing is zero or non-finite.
    pub fn validate(&self) -> Result<()> {
        validate_config(self.window_size, self.poly_order, self.derivative)?;
        if !self.delta.is_finite() || self.delta == 0.0 {
            return Err(SpectrumError::InvalidFilterConfig(format!(
                "sample spacing {} must be finite and non-zero",
                self.delta
            )));
        }
        Ok(())
    }

    /// Samples on either side of the window centre.
    pub fn half_window(&self) -> usize {
        (self.window_size - 1) / 2
    }
}

/// A Savitzky-Golay filter for smoothing and differentiation.
///
/// Interior samples use the symmetric weights of the window centre. The
/// first and last `half_window` samples are computed from the first and last
/// full window with weights evaluated at the sample's own offset, so no
/// padding or reflected samples are involved.
#[derive(Debug, Clone)]
pub struct SavitzkyGolayFilter {
    config: FilterConfig,
    cache: CoefficientCache,
}

impl SavitzkyGolayFilter {
    /// Creates a smoothing filter.
    ///
    /// # Example
    ///
    /// ```rust
    /// use spectrakit::SavitzkyGolayFilter;
    ///
    /// let mut filter = SavitzkyGolayFilter::new(5, 2).expect("Valid parameters");
    /// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
    /// let smoothed = filter.apply(&data).unwrap();
    /// assert_eq!(smoothed.len(), data.len());
    /// ```
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self> {
        Self::with_config(FilterConfig::new(window_size, poly_order)?)
    }

    /// Creates a filter with a custom configuration
    pub fn with_config(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: CoefficientCache::new(),
        })
    }

    /// Switches the filter to the `derivative`-th derivative.
    pub fn with_derivative(self, derivative: usize) -> Result<Self> {
        Self::with_config(self.config.with_derivative(derivative)?)
    }

    /// Sets the sample spacing derivatives are scaled by.
    pub fn with_delta(self, delta: f64) -> Result<Self> {
        Self::with_config(self.config.with_delta(delta)?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Symmetric weights applied to interior samples (unit spacing).
    pub fn coefficients(&mut self) -> Result<Vec<f64>> {
        let FilterConfig {
            window_size,
            poly_order,
            derivative,
            ..
        } = self.config;
        Ok(self.cache.get(window_size, poly_order, derivative, 0)?.to_vec())
    }

    /// Filters `data`, returning a sequence of the same length.
    pub fn apply(&mut self, data: &[f64]) -> Result<Vec<f64>> {
        let delta = self.config.delta;
        self.apply_with_delta(data, delta)
    }

    /// Filters the intensities of an evenly spaced 1-D spectrum, using its
    /// step as the sample spacing.
    pub fn apply_to_spectrum<S: Spectrum + ?Sized>(&mut self, spectrum: &S) -> Result<Vec<f64>> {
        if spectrum.ndim() != 1 {
            return Err(SpectrumError::UnsupportedDimensionality {
                expected: 1,
                found: spectrum.ndim(),
            });
        }
        let step = spectrum.spacing(0).ok_or(SpectrumError::NotEvenlySpaced)?;
        self.apply_with_delta(&spectrum.intensities(), step)
    }

    fn apply_with_delta(&mut self, data: &[f64], delta: f64) -> Result<Vec<f64>> {
        let FilterConfig {
            window_size,
            poly_order,
            derivative,
            ..
        } = self.config;
        let n = data.len();
        if n < window_size {
            return Err(SpectrumError::WindowTooLarge {
                window_size,
                len: n,
            });
        }

        let half_window = self.config.half_window();
        let scale = delta.powi(derivative as i32);
        let dot = |coeffs: &[f64], samples: &[f64]| {
            coeffs.iter().zip(samples).map(|(c, y)| c * y).sum::<f64>() / scale
        };
        log::debug!(
            "applying Savitzky-Golay filter (window={window_size}, order={poly_order}, derivative={derivative}) to {n} samples"
        );

        let mut out = vec![0.0; n];
        let interior = self.cache.get(window_size, poly_order, derivative, 0)?;
        for (i, window) in data.windows(window_size).enumerate() {
            out[i + half_window] = dot(interior, window);
        }

        let head = &data[..window_size];
        let tail = &data[n - window_size..];
        for p in 0..half_window {
            let t = p as i64 - half_window as i64;
            let coeffs = self.cache.get(window_size, poly_order, derivative, t)?;
            out[p] = dot(coeffs, head);

            let coeffs = self.cache.get(window_size, poly_order, derivative, -t)?;
            out[n - 1 - p] = dot(coeffs, tail);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::{EvenSpectrum, SampledSpectrum};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_basic_smoothing() {
        let mut filter = SavitzkyGolayFilter::new(5, 2).unwrap();
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let smoothed = filter.apply(&data).unwrap();

        assert_eq!(smoothed.len(), data.len());
        assert!(smoothed[4] > smoothed[0]);
        assert!(smoothed[4] > smoothed[8]);
    }

    #[test]
    fn test_polynomial_preservation_including_edges() {
        let mut filter = SavitzkyGolayFilter::new(5, 2).unwrap();

        // boundary weights are exact fits too, so every sample is preserved
        let data: Vec<f64> = (0..20).map(|x| (x as f64).powi(2)).collect();
        let smoothed = filter.apply(&data).unwrap();
        for (orig, smooth) in data.iter().zip(&smoothed) {
            assert_abs_diff_eq!(orig, smooth, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_derivative() {
        let mut filter = SavitzkyGolayFilter::new(5, 3).unwrap().with_derivative(1).unwrap();

        let data: Vec<f64> = (0..20).map(|x| (x as f64).powi(3)).collect();
        let derivative = filter.apply(&data).unwrap();
        for (i, d) in derivative.iter().enumerate() {
            let expected = 3.0 * (i as f64).powi(2);
            assert_abs_diff_eq!(*d, expected, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_derivative_scaled_by_delta() {
        let step = 0.1;
        let spectrum = EvenSpectrum::from_fn(0.0, 1.9, 20, |x| x.powi(2)).unwrap();
        let mut filter = SavitzkyGolayFilter::new(7, 2).unwrap().with_derivative(1).unwrap();
        let slope = filter.apply_to_spectrum(&spectrum).unwrap();
        for (i, s) in slope.iter().enumerate() {
            assert_abs_diff_eq!(*s, 2.0 * i as f64 * step, epsilon = 1e-9);
        }

        let mut filter = filter.with_delta(step).unwrap();
        let same = filter.apply(&spectrum.intensities()).unwrap();
        for (a, b) in slope.iter().zip(&same) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_moving_average_preserves_constant() {
        let mut filter = SavitzkyGolayFilter::new(9, 0).unwrap();
        let data = vec![3.25; 12];
        for value in filter.apply(&data).unwrap() {
            assert_abs_diff_eq!(value, 3.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_short_data_is_rejected() {
        let mut filter = SavitzkyGolayFilter::new(5, 2).unwrap();
        assert_eq!(
            filter.apply(&[1.0, 2.0]),
            Err(SpectrumError::WindowTooLarge { window_size: 5, len: 2 })
        );
        // exactly one window is enough
        assert_eq!(filter.apply(&[1.0; 5]).unwrap().len(), 5);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            SavitzkyGolayFilter::new(6, 2),
            Err(SpectrumError::InvalidFilterConfig(_))
        ));
        assert!(SavitzkyGolayFilter::new(5, 4).is_err());
        assert!(SavitzkyGolayFilter::new(5, 2).unwrap().with_derivative(3).is_err());
        assert!(SavitzkyGolayFilter::new(5, 2).unwrap().with_delta(0.0).is_err());
        let config = FilterConfig {
            window_size: 3,
            poly_order: 2,
            derivative: 0,
            delta: 1.0,
        };
        assert!(SavitzkyGolayFilter::with_config(config).is_err());
    }

    #[test]
    fn test_irregular_spectrum_is_rejected() {
        let spectrum = SampledSpectrum::new(vec![0.0, 1.0, 3.0, 4.0, 7.0], vec![1.0; 5]).unwrap();
        let mut filter = SavitzkyGolayFilter::new(5, 2).unwrap();
        assert_eq!(
            filter.apply_to_spectrum(&spectrum),
            Err(SpectrumError::NotEvenlySpaced)
        );
    }
}

use std::collections::hash_map::Entry;

use ahash::AHashMap;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

use crate::error::{Result, SpectrumError};

/// Checks the Savitzky-Golay constraints: odd window wider than one sample,
/// at least two spare degrees of freedom, derivative not above the degree.
pub fn validate_config(window_size: usize, poly_order: usize, derivative: usize) -> Result<()> {
    if window_size % 2 == 0 || window_size <= 1 {
        return Err(SpectrumError::InvalidFilterConfig(format!(
            "window size {window_size} must be odd and greater than 1"
        )));
    }
    if poly_order + 1 >= window_size {
        return Err(SpectrumError::InvalidFilterConfig(format!(
            "polynomial order {poly_order} leaves too few degrees of freedom in a window of {window_size}"
        )));
    }
    if derivative > poly_order {
        return Err(SpectrumError::InvalidFilterConfig(format!(
            "derivative order {derivative} exceeds polynomial order {poly_order}"
        )));
    }
    Ok(())
}

fn integer(value: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(value))
}

/// Generalised factorial `a (a-1) ... (a-b+1)`; `1` when `b == 0`.
fn gen_fact(a: i64, b: i64) -> BigInt {
    ((a - b + 1)..=a).fold(BigInt::one(), |acc, j| acc * j)
}

/// Gram polynomials over the `2m + 1` points `-m..=m`, memoised on
/// `(point, order, derivative)`.
struct GramTable {
    half_window: i64,
    memo: AHashMap<(i64, usize, usize), BigRational>,
}

impl GramTable {
    fn new(half_window: usize) -> Self {
        Self {
            half_window: half_window as i64,
            memo: AHashMap::new(),
        }
    }

    /// `s`-th derivative of the order-`k` Gram polynomial at `point`.
    fn eval(&mut self, point: i64, k: usize, s: usize) -> BigRational {
        if k == 0 {
            return if s == 0 {
                BigRational::one()
            } else {
                BigRational::zero()
            };
        }
        if let Some(value) = self.memo.get(&(point, k, s)) {
            return value.clone();
        }

        let m = self.half_window;
        let kk = k as i64;
        let denom = BigInt::from(kk * (2 * m - kk + 1));

        let mut inner = integer(point) * self.eval(point, k - 1, s);
        if s > 0 {
            inner += integer(s as i64) * self.eval(point, k - 1, s - 1);
        }
        let mut value = BigRational::new(BigInt::from(4 * kk - 2), denom.clone()) * inner;
        if k >= 2 {
            let back = BigRational::new(BigInt::from((kk - 1) * (2 * m + kk)), denom);
            value -= back * self.eval(point, k - 2, s);
        }

        self.memo.insert((point, k, s), value.clone());
        value
    }
}

/// Least common multiple of two positive integers.
fn lcm(a: &BigInt, b: &BigInt) -> BigInt {
    // a / b reduces to (a / g) / (b / g)
    a * BigRational::new(a.clone(), b.clone()).denom()
}

/// Rescales `values` onto their least common denominator, returning the
/// integer numerators and that denominator.
fn common_denominator<'a, I>(values: I) -> (Vec<BigInt>, BigInt)
where
    I: IntoIterator<Item = &'a BigRational> + Clone,
{
    let denom = values
        .clone()
        .into_iter()
        .fold(BigInt::one(), |acc, v| lcm(&acc, v.denom()));
    let numers = values
        .into_iter()
        .map(|v| v.numer() * (&denom / v.denom()))
        .collect();
    (numers, denom)
}

/// Exact convolution weights for a least-squares fit of degree `poly_order`
/// over offsets `-m..=m`, one set per entry of `eval_points`.
///
/// The normalised Gram values at the window offsets do not depend on the
/// evaluation point, so they are built once, brought onto one denominator per
/// order and shared by every set. Each weight is then an integer dot product
/// over a common denominator; the returned ratios are not reduced.
fn exact_weights(
    table: &mut GramTable,
    poly_order: usize,
    derivative: usize,
    eval_points: &[i64],
) -> Vec<Vec<BigRational>> {
    let m = table.half_window;

    // (2k+1) · GenFact(2m, k) / GenFact(2m+k+1, k+1) · P(i, k, m, 0), one column per order
    let (basis, scales): (Vec<Vec<BigInt>>, Vec<BigInt>) = (0..=poly_order)
        .map(|k| {
            let kk = k as i64;
            let norm =
                BigRational::new(gen_fact(2 * m, kk) * (2 * kk + 1), gen_fact(2 * m + kk + 1, kk + 1));
            let column: Vec<BigRational> =
                (-m..=m).map(|offset| &norm * table.eval(offset, k, 0)).collect();
            common_denominator(&column)
        })
        .unzip();

    eval_points
        .iter()
        .map(|&t| {
            let targets: Vec<BigRational> = scales
                .iter()
                .enumerate()
                .map(|(k, scale)| {
                    table.eval(t, k, derivative) / BigRational::from_integer(scale.clone())
                })
                .collect();
            let (factors, denom) = common_denominator(&targets);
            (0..basis[0].len())
                .map(|i| {
                    let numer = basis
                        .iter()
                        .zip(&factors)
                        .fold(BigInt::zero(), |acc, (column, f)| acc + &column[i] * f);
                    BigRational::new_raw(numer, denom.clone())
                })
                .collect()
        })
        .collect()
}

fn to_f64_weights(weights: &[BigRational]) -> Result<Vec<f64>> {
    weights
        .iter()
        .map(|weight| {
            weight.to_f64().ok_or_else(|| {
                SpectrumError::InvalidFilterConfig(format!(
                    "weight {weight} is not representable as f64"
                ))
            })
        })
        .collect()
}

fn outside_window(eval_point: i64, window_size: usize) -> SpectrumError {
    SpectrumError::InvalidFilterConfig(format!(
        "evaluation point {eval_point} lies outside a window of {window_size}"
    ))
}

/// Computes Savitzky-Golay convolution weights evaluated at `eval_point`.
///
/// `eval_point` is the offset from the window centre at which the fitted
/// polynomial (or its `derivative`-th derivative) is evaluated: `0` gives the
/// symmetric interior weights, `-m..0` and `1..=m` give the asymmetric weights
/// used for the first and last `m` samples. The weights are derived from Gram
/// polynomials in exact rational arithmetic and only converted to `f64` at
/// the end. `weights[j]` multiplies the sample at offset `j - m`, and
/// derivative weights assume unit sample spacing.
pub fn compute_coefficients_at(
    window_size: usize,
    poly_order: usize,
    derivative: usize,
    eval_point: i64,
) -> Result<Vec<f64>> {
    validate_config(window_size, poly_order, derivative)?;
    let half_window = (window_size - 1) / 2;
    if eval_point.unsigned_abs() as usize > half_window {
        return Err(outside_window(eval_point, window_size));
    }

    log::trace!(
        "deriving weights: window={window_size} order={poly_order} derivative={derivative} at={eval_point}"
    );
    let mut table = GramTable::new(half_window);
    let weights = exact_weights(&mut table, poly_order, derivative, &[eval_point]);
    to_f64_weights(&weights[0])
}

/// Computes the weights for every evaluation point of the window at once.
///
/// # Returns
///
/// `window_size` weight sets; set `j` is evaluated at offset `j - m`, so the
/// middle set holds the symmetric interior weights and the outer sets serve
/// the first and last `m` samples. All sets share one Gram table.
pub fn compute_boundary_coefficients(
    window_size: usize,
    poly_order: usize,
    derivative: usize,
) -> Result<Vec<Vec<f64>>> {
    validate_config(window_size, poly_order, derivative)?;
    let half_window = (window_size - 1) / 2;
    log::trace!(
        "deriving all weight sets: window={window_size} order={poly_order} derivative={derivative}"
    );

    let m = half_window as i64;
    let points: Vec<i64> = (-m..=m).collect();
    let mut table = GramTable::new(half_window);
    exact_weights(&mut table, poly_order, derivative, &points)
        .iter()
        .map(|weights| to_f64_weights(weights))
        .collect()
}

/// Computes the symmetric Savitzky-Golay weights for the window centre.
///
/// # Example
///
/// ```rust
/// use spectrakit::compute_coefficients;
///
/// let coeffs = compute_coefficients(5, 2, 0).unwrap();
/// assert!((coeffs[2] - 17.0 / 35.0).abs() < 1e-12);
/// ```
pub fn compute_coefficients(
    window_size: usize,
    poly_order: usize,
    derivative: usize,
) -> Result<Vec<f64>> {
    compute_coefficients_at(window_size, poly_order, derivative, 0)
}

/// Memoised weight sets keyed by `(window, order, derivative)`.
///
/// A miss derives the weights for every evaluation point of the window in one
/// pass, so boundary lookups after the first are free.
#[derive(Debug, Default, Clone)]
pub struct CoefficientCache {
    sets: AHashMap<(usize, usize, usize), Vec<Vec<f64>>>,
}

impl CoefficientCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the weights evaluated at `eval_point`, deriving the whole
    /// configuration on a miss.
    pub fn get(
        &mut self,
        window_size: usize,
        poly_order: usize,
        derivative: usize,
        eval_point: i64,
    ) -> Result<&[f64]> {
        let key = (window_size, poly_order, derivative);
        let sets = match self.sets.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                log::debug!("coefficient cache miss for {key:?}");
                entry.insert(compute_boundary_coefficients(
                    window_size,
                    poly_order,
                    derivative,
                )?)
            }
        };
        let half_window = (sets.len() / 2) as i64;
        usize::try_from(eval_point + half_window)
            .ok()
            .and_then(|index| sets.get(index))
            .map(Vec::as_slice)
            .ok_or_else(|| outside_window(eval_point, window_size))
    }

    /// Number of cached configurations.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// True when nothing has been derived yet.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Drops every cached configuration.
    pub fn clear(&mut self) {
        self.sets.clear();
    }
}

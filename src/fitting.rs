//! Least-squares objective for line-shape fitting and the seam to an
//! external minimizer.
//!
//! The crate does not optimise anything itself. [`Objective`] turns a flat
//! parameter vector into a scalar loss, a [`Minimizer`] implementation (an
//! adapter around whatever solver the caller uses) drives it, and
//! [`FittingSolution`] hands the solver's outcome back unchanged.

use crate::error::{Result, SpectrumError};
use crate::lineshape::{CompositeShape, LineShapeKind};
use crate::spectrum::Spectrum;

/// Reduction applied to squared residuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Loss {
    /// Mean of squared residuals
    #[default]
    Mean,
    /// Sum of squared residuals
    Sum,
}

/// Squared-residual objective of a composite line shape against observations.
#[derive(Debug, Clone, Copy)]
pub struct Objective<'a> {
    kind: LineShapeKind,
    x: &'a [f64],
    y: &'a [f64],
    loss: Loss,
}

impl<'a> Objective<'a> {
    /// Borrows observations `(x, y)`, which must be non-empty and of equal length.
    pub fn new(kind: LineShapeKind, x: &'a [f64], y: &'a [f64], loss: Loss) -> Result<Self> {
        check_observations(x, y)?;
        Ok(Self { kind, x, y, loss })
    }

    /// Loss of the composite described by `params`.
    ///
    /// Parameter vectors that do not describe a valid composite (wrong
    /// length, non-positive scale) evaluate to `+∞`.
    pub fn evaluate(&self, params: &[f64]) -> f64 {
        let composite = match CompositeShape::new(self.kind, params) {
            Ok(composite) => composite,
            Err(_) => return f64::INFINITY,
        };
        let total: f64 = self
            .x
            .iter()
            .zip(self.y)
            .map(|(&x, &y)| (composite.evaluate(x) - y).powi(2))
            .sum();
        match self.loss {
            Loss::Mean => total / self.x.len() as f64,
            Loss::Sum => total,
        }
    }

    /// The objective as a plain closure.
    pub fn as_fn(&self) -> impl Fn(&[f64]) -> f64 + '_ {
        move |params: &[f64]| self.evaluate(params)
    }
}

fn check_observations(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(SpectrumError::DimensionMismatch {
            expected: x.len(),
            found: y.len(),
        });
    }
    if x.is_empty() {
        return Err(SpectrumError::InvalidDomain(
            "fitting needs at least one observation".to_string(),
        ));
    }
    Ok(())
}

/// What an external minimizer reports back.
pub trait OptimizerOutcome {
    /// Parameters at the minimum found.
    fn params(&self) -> &[f64];
    /// Objective value at those parameters.
    fn minimum(&self) -> f64;
    fn iterations(&self) -> usize;
    fn converged(&self) -> bool;
}

/// Adapter to an external minimisation routine.
pub trait Minimizer {
    type Outcome: OptimizerOutcome;
    type Error: std::fmt::Display;

    /// Minimises `objective` starting from `initial`.
    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial: &[f64],
    ) -> std::result::Result<Self::Outcome, Self::Error>;
}

/// A plain outcome container for minimizer adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeResult {
    pub params: Vec<f64>,
    pub minimum: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl OptimizerOutcome for OptimizeResult {
    fn params(&self) -> &[f64] {
        &self.params
    }

    fn minimum(&self) -> f64 {
        self.minimum
    }

    fn iterations(&self) -> usize {
        self.iterations
    }

    fn converged(&self) -> bool {
        self.converged
    }
}

/// A line-shape family, starting parameters and the observations to fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FittingProblem {
    kind: LineShapeKind,
    initial: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    loss: Loss,
}

impl FittingProblem {
    /// Packages a fit of `kind` shapes starting from `initial`
    /// (`[center, scale, height]` per shape) against `(x, y)`.
    pub fn new(kind: LineShapeKind, initial: Vec<f64>, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        check_observations(&x, &y)?;
        CompositeShape::new(kind, &initial)?;
        Ok(Self {
            kind,
            initial,
            x,
            y,
            loss: Loss::default(),
        })
    }

    /// Packages a fit against the samples of a 1-D spectrum or view.
    pub fn from_spectrum<S: Spectrum + ?Sized>(
        kind: LineShapeKind,
        initial: Vec<f64>,
        spectrum: &S,
    ) -> Result<Self> {
        if spectrum.ndim() != 1 {
            return Err(SpectrumError::UnsupportedDimensionality {
                expected: 1,
                found: spectrum.ndim(),
            });
        }
        Self::new(
            kind,
            initial,
            spectrum.coordinates(0).into_owned(),
            spectrum.intensities().into_owned(),
        )
    }

    /// Sets the residual reduction.
    pub fn with_loss(mut self, loss: Loss) -> Self {
        self.loss = loss;
        self
    }

    /// Line-shape family being fitted.
    pub fn kind(&self) -> LineShapeKind {
        self.kind
    }

    /// Starting parameters, `[center, scale, height]` per shape.
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    /// Observed coordinates and intensities.
    pub fn observations(&self) -> (&[f64], &[f64]) {
        (&self.x, &self.y)
    }

    /// Residual reduction in use.
    pub fn loss(&self) -> Loss {
        self.loss
    }

    /// The objective over this problem's observations.
    pub fn objective(&self) -> Objective<'_> {
        Objective {
            kind: self.kind,
            x: &self.x,
            y: &self.y,
            loss: self.loss,
        }
    }

    /// Hands the objective to `minimizer` and packages its outcome.
    pub fn solve<M: Minimizer>(self, minimizer: &M) -> Result<FittingSolution<M::Outcome>> {
        let outcome = {
            let objective = self.objective();
            let f = objective.as_fn();
            minimizer
                .minimize(&f, &self.initial)
                .map_err(|e| SpectrumError::Optimizer(e.to_string()))?
        };
        log::debug!(
            "{:?} fit finished after {} iterations (converged: {}, minimum: {})",
            self.kind,
            outcome.iterations(),
            outcome.converged(),
            outcome.minimum()
        );
        Ok(FittingSolution {
            problem: self,
            outcome,
        })
    }
}

/// A fitting problem together with the external minimizer's outcome.
#[derive(Debug, Clone)]
pub struct FittingSolution<R> {
    problem: FittingProblem,
    outcome: R,
}

impl<R: OptimizerOutcome> FittingSolution<R> {
    /// The problem that was solved.
    pub fn problem(&self) -> &FittingProblem {
        &self.problem
    }

    /// The raw outcome reported by the minimizer.
    pub fn outcome(&self) -> &R {
        &self.outcome
    }

    /// Fitted parameters.
    pub fn params(&self) -> &[f64] {
        self.outcome.params()
    }

    /// Objective value at the fitted parameters.
    pub fn minimum(&self) -> f64 {
        self.outcome.minimum()
    }

    /// Iterations the minimizer reported.
    pub fn iterations(&self) -> usize {
        self.outcome.iterations()
    }

    /// Whether the minimizer reported convergence.
    pub fn converged(&self) -> bool {
        self.outcome.converged()
    }

    /// The fitted composite shape.
    pub fn composite(&self) -> Result<CompositeShape> {
        CompositeShape::new(self.problem.kind, self.outcome.params())
    }

    /// Observed minus fitted intensity at every observation.
    pub fn residuals(&self) -> Result<Vec<f64>> {
        let composite = self.composite()?;
        Ok(self
            .problem
            .x
            .iter()
            .zip(&self.problem.y)
            .map(|(&x, &y)| y - composite.evaluate(x))
            .collect())
    }
}

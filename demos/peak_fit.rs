//! Fitting two overlapping Cauchy lines with a small Nelder-Mead adapter.

use spectrakit::{
    get_view, CompositeShape, EvenSpectrum, FittingProblem, LineShapeKind, Minimizer,
    OptimizeResult, SearchMethod,
};

/// Downhill simplex standing in for a solver crate.
struct NelderMead {
    max_iterations: usize,
    tolerance: f64,
}

impl Minimizer for NelderMead {
    type Outcome = OptimizeResult;
    type Error = String;

    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial: &[f64],
    ) -> Result<OptimizeResult, String> {
        let n = initial.len();
        let mut simplex: Vec<(Vec<f64>, f64)> = (0..=n)
            .map(|i| {
                let mut point = initial.to_vec();
                if i > 0 {
                    point[i - 1] += 0.1 * point[i - 1].abs().max(0.1);
                }
                let value = objective(&point);
                (point, value)
            })
            .collect();

        for iteration in 0..self.max_iterations {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
            let (best, worst) = (simplex[0].1, simplex[n].1);
            if (worst - best).abs() <= self.tolerance * best.abs().max(1e-300) {
                return Ok(OptimizeResult {
                    params: simplex[0].0.clone(),
                    minimum: best,
                    iterations: iteration,
                    converged: true,
                });
            }

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|(p, _)| p[j]).sum::<f64>() / n as f64)
                .collect();
            let toward = |scale: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(&simplex[n].0)
                    .map(|(c, w)| c + scale * (w - c))
                    .collect()
            };

            let reflected = toward(-1.0);
            let fr = objective(&reflected);
            if fr < simplex[0].1 {
                let expanded = toward(-2.0);
                let fe = objective(&expanded);
                simplex[n] = if fe < fr { (expanded, fe) } else { (reflected, fr) };
            } else if fr < simplex[n - 1].1 {
                simplex[n] = (reflected, fr);
            } else {
                let contracted = toward(0.5);
                let fc = objective(&contracted);
                if fc < simplex[n].1 {
                    simplex[n] = (contracted, fc);
                } else {
                    let anchor = simplex[0].0.clone();
                    for (point, value) in simplex.iter_mut().skip(1) {
                        for (x, a) in point.iter_mut().zip(&anchor) {
                            *x = a + 0.5 * (*x - a);
                        }
                        *value = objective(point);
                    }
                }
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (params, minimum) = simplex.swap_remove(0);
        Ok(OptimizeResult {
            params,
            minimum,
            iterations: self.max_iterations,
            converged: false,
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let truth = CompositeShape::new(LineShapeKind::Cauchy, &[3.1, 0.05, 1.0, 2.9, 0.08, 0.6])?;
    let spectrum = EvenSpectrum::from_fn(5.0, 1.0, 801, |x| truth.evaluate(x))?;
    let region = get_view(&spectrum, &[(3.5, 2.5)], SearchMethod::Binary)?;

    let initial = vec![3.05, 0.1, 0.8, 2.95, 0.1, 0.8];
    let problem = FittingProblem::from_spectrum(LineShapeKind::Cauchy, initial, &region)?;
    let solution = problem.solve(&NelderMead {
        max_iterations: 5000,
        tolerance: 1e-12,
    })?;

    println!(
        "converged: {} after {} iterations, loss {:.3e}",
        solution.converged(),
        solution.iterations(),
        solution.minimum()
    );
    for (i, shape) in solution.composite()?.shapes().enumerate() {
        println!(
            "  line {i}: center {:.4}, width {:.4}, height {:.4}, area {:.4}",
            shape.center(),
            shape.scale(),
            shape.height(),
            shape.area()
        );
    }
    let worst = solution
        .residuals()?
        .iter()
        .fold(0.0f64, |acc, r| acc.max(r.abs()));
    println!("largest residual {worst:.3e}");

    Ok(())
}

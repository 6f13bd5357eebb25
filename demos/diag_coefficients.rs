use spectrakit::{compute_coefficients, compute_coefficients_at};

fn main() {
    env_logger::init();

    // Diagnostic: derivative weights for window=7, poly_order=4, derivative=1
    let (window, poly, deriv) = (7, 4, 1);
    let coeffs = compute_coefficients(window, poly, deriv).expect("compute coeffs failed");
    println!("coeffs (window={window}, poly={poly}, deriv={deriv}):");
    for (i, c) in coeffs.iter().enumerate() {
        println!("  [{i}] = {c:.12}");
    }

    // f(x) = x^4 sampled at step 0.1, differentiated at an interior index
    let step = 0.1;
    let data: Vec<f64> = (0..20).map(|i| (i as f64 * step).powi(4)).collect();
    let center = 10usize;
    let half = window / 2;
    let conv: f64 = coeffs
        .iter()
        .zip(&data[center - half..=center + half])
        .map(|(c, y)| c * y)
        .sum::<f64>()
        / step;
    let x = center as f64 * step;
    println!("\nAt center index {center}: conv = {conv:.12}");
    println!("expected derivative (4 x^3) = {:.12}", 4.0 * x.powi(3));

    // Edge weights for the first samples of the same window
    println!("\nedge weights (smoothing, window={window}, poly={poly}):");
    for t in -(half as i64)..0 {
        let weights = compute_coefficients_at(window, poly, 0, t).expect("compute coeffs failed");
        let row: Vec<String> = weights.iter().map(|w| format!("{w:9.5}")).collect();
        println!("  t={t:>2}: {}", row.join(" "));
    }
}

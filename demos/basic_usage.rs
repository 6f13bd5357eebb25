//! Smoothing, slicing and integrating a noisy absorption band.

use spectrakit::{
    centroid, get_view, integrate, nominal_max, smooth, variance, EvenSpectrum,
    IntegrationScheme, SavitzkyGolayFilter, SearchMethod, Spectrum,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== spectrakit basics ===\n");

    // A Gaussian band on a descending wavenumber axis with deterministic ripple
    let band = |x: f64| 2.0 * (-0.5 * ((x - 1650.0) / 12.0).powi(2)).exp();
    let clean = EvenSpectrum::from_fn(1800.0, 1500.0, 301, band)?;
    let noisy: Vec<f64> = clean
        .intensities()
        .iter()
        .enumerate()
        .map(|(i, y)| y + 0.05 * ((i as f64 * 2.3).sin() + (i as f64 * 0.7).cos()))
        .collect();
    let spectrum = EvenSpectrum::new(1800.0, 1500.0, noisy)?;
    println!("{} samples, step {}", spectrum.len(), spectrum.step());

    println!("\n1. Default smoothing (window=5, poly_order=2):");
    let smoothed = smooth(&spectrum.intensities())?;
    print_signal(&smoothed[140..160]);

    println!("\n2. Custom smoothing (window=11, poly_order=4):");
    let mut filter = SavitzkyGolayFilter::new(11, 4)?;
    let smoothed = filter.apply_to_spectrum(&spectrum)?;
    print_signal(&smoothed[140..160]);

    println!("\n3. Second derivative scaled by the axis step:");
    let mut second = SavitzkyGolayFilter::new(11, 4)?.with_derivative(2)?;
    let curvature = second.apply_to_spectrum(&spectrum)?;
    print_signal(&curvature[140..160]);

    println!("\n4. Band region 1700..1600:");
    let region = get_view(&spectrum, &[(1700.0, 1600.0)], SearchMethod::Binary)?;
    let peak = nominal_max(&region)?;
    println!("  index range      {:?}", region.ranges());
    println!("  maximum          {:.3} at {}", peak.intensity, peak.coordinate());
    for scheme in IntegrationScheme::ALL {
        println!("  area ({scheme:?}) {:.4}", integrate(&region, scheme)?);
    }
    let scheme = IntegrationScheme::Midpoint;
    println!("  centroid         {:.3}", centroid(&region, scheme)?);
    println!("  width            {:.3}", variance(&region, scheme)?.sqrt());

    Ok(())
}

fn print_signal(signal: &[f64]) {
    for (i, &value) in signal.iter().enumerate() {
        print!("{:8.4}", value);
        if (i + 1) % 8 == 0 {
            println!();
        }
    }
    if signal.len() % 8 != 0 {
        println!();
    }
}

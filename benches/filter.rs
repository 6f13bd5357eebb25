use criterion::{criterion_group, criterion_main, Criterion};
use spectrakit::{
    compute_boundary_coefficients, compute_coefficients, get_view, integrate, EvenSpectrum,
    IntegrationScheme, SavitzkyGolayFilter, SearchMethod,
};

fn signal(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| (i as f64 * 0.001).sin() + 0.1 * (i as f64 * 0.01).cos())
        .collect()
}

// ---------------------------------------------------------------------------
// Savitzky-Golay
// ---------------------------------------------------------------------------

fn coefficients(c: &mut Criterion) {
    let mut g = c.benchmark_group("coefficients");
    for (window, order) in [(5, 2), (21, 4), (51, 6)] {
        g.bench_function(format!("w{window}_p{order}"), |b| {
            b.iter(|| compute_coefficients(std::hint::black_box(window), order, 0))
        });
        g.bench_function(format!("all_points_w{window}_p{order}"), |b| {
            b.iter(|| compute_boundary_coefficients(std::hint::black_box(window), order, 0))
        });
    }
    g.finish();
}

fn smoothing(c: &mut Criterion) {
    let mut g = c.benchmark_group("smoothing");
    for n in [1_000, 10_000, 100_000] {
        let data = signal(n);
        g.bench_function(format!("w11_p3_n{n}"), |b| {
            let mut filter = SavitzkyGolayFilter::new(11, 3).unwrap();
            b.iter(|| filter.apply(std::hint::black_box(&data)))
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------
// Views and integration
// ---------------------------------------------------------------------------

fn view_search(c: &mut Criterion) {
    let spectrum = EvenSpectrum::new(0.0, 1.0, signal(100_000)).unwrap();
    let mut g = c.benchmark_group("view_search");
    for method in [SearchMethod::Binary, SearchMethod::Linear] {
        g.bench_function(format!("{method:?}"), |b| {
            b.iter(|| get_view(&spectrum, std::hint::black_box(&[(0.25, 0.75)]), method))
        });
    }
    g.finish();
}

fn integration(c: &mut Criterion) {
    let spectrum = EvenSpectrum::new(0.0, 1.0, signal(100_000)).unwrap();
    c.bench_function("integrate_midpoint_n100000", |b| {
        b.iter(|| integrate(std::hint::black_box(&spectrum), IntegrationScheme::Midpoint))
    });
}

criterion_group!(benches, coefficients, smoothing, view_search, integration);
criterion_main!(benches);

#![allow(dead_code)]

use laxconv::{Float, Problem, SimulationConfig, Wavelength};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Sine with exactly one period across `[0, length)`.
pub fn one_period_problem(courant: Float, final_time: Float, length: Float) -> Problem {
    Problem::new(
        "sine (λ = L)",
        SimulationConfig::new(1.0, courant, final_time),
        length,
    )
    .with_wavelength(Wavelength::Domain)
}

/// `values` moved `k` cells to the right, periodically.
pub fn shifted(values: &[Float], k: usize) -> Vec<Float> {
    let n = values.len();
    (0..n).map(|i| values[(i + n - k % n) % n]).collect()
}

pub fn max_abs_diff(a: &[Float], b: &[Float]) -> Float {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, Float::max)
}

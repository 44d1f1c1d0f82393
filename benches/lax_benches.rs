use std::sync::OnceLock;

use faer_core::Mat;
use laxconv::{
    faer_add::linspace, initial_state, run, sample, step, Float, Problem, SimulationConfig,
    Wavelength,
};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

static U: OnceLock<Mat<Float>> = OnceLock::new();

fn state() -> &'static Mat<Float> {
    U.get_or_init(|| initial_state(linspace(0.0, 1000, 1e-3).as_ref(), 1.0))
}

fn benchmark_step(c: &mut Criterion) {
    c.bench_function("lax_step_1000", |b| {
        b.iter(|| step(black_box(state().as_ref()), 0.8))
    });
}

fn benchmark_run(c: &mut Criterion) {
    c.bench_function("lax_run_1000x500", |b| {
        b.iter(|| run(500, black_box(state().as_ref()), 0.8, false))
    });
}

fn benchmark_sample(c: &mut Criterion) {
    let problem = Problem::new("bench", SimulationConfig::new(1.0, 0.8, 0.5), 1.0)
        .with_wavelength(Wavelength::Domain);
    c.bench_function("convergence_sample_400", |b| {
        b.iter(|| sample(black_box(&problem), 400))
    });
}

criterion_group!(benches, benchmark_step, benchmark_run, benchmark_sample);
criterion_main!(benches);

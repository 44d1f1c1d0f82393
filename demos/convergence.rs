use laxconv::{report, ConvergenceStudy, Problem, SimulationConfig, Wavelength};

fn main() -> Result<(), laxconv::LaxError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // C = 1.2 sits outside the stability region on purpose
    let problem = Problem::new("lax_convergence", SimulationConfig::new(1.0, 1.2, 3.0), 3.0)
        .with_wavelength(Wavelength::Unit);

    let result = ConvergenceStudy::new(problem, vec![50, 100, 150, 400, 600, 800, 1000])
        .with_parallel(true)
        .run()?;

    println!("{result}");
    report::write_csv_to_path(&result, "lax_convergence.csv")?;

    Ok(())
}

use std::{fs, io};

use laxconv::{Csff1Writer, Driver, Logger, Problem, Simulation, SimulationConfig};

fn main() -> Result<(), laxconv::LaxError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let problem_name = "lax_sine";

    // a = 1, C = 0.5, T = 3 on [0, 3) with u0 = sin(2πx)
    let problem = Problem::new(problem_name, SimulationConfig::new(1.0, 0.5, 3.0), 3.0);
    let sim = Simulation::new(problem, 100)?;
    tracing::info!("{sim}");

    let mut output = io::BufWriter::new(fs::File::create(format!("{problem_name}.csff1"))?);

    Driver::new(&sim)
        .with_observer(Logger)
        .with_observer(Csff1Writer::new(&mut output).with_time_sampling(10))
        .run()?;

    let out = sim.run(false)?;
    println!("L2 error = {:.5e}", out.error);

    Ok(())
}

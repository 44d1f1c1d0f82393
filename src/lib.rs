//! Lax (Lax-Friedrichs) integration of `u_t + a u_x = 0` on a periodic domain,
//! with resolution sweeps estimating the scheme's empirical order of accuracy.

pub mod bc;
pub mod convergence;
pub mod driver;
pub mod error;
pub mod faer_add;
pub mod mesh;
pub mod method;
pub mod methods;
pub mod norm;
pub mod problem;
pub mod report;
pub mod sim;

pub type Float = f64;

pub use convergence::{
    fit_line, fit_loglog, sample, ConvergenceResult, ConvergenceSample, ConvergenceStudy,
    LinearFit, SkippedResolution,
};
pub use driver::{Csff1Writer, Driver, Logger, ObsCtx, Observer, Trajectory};
pub use error::LaxError;
pub use mesh::{Grid, Mesh, TimeGrid};
pub use method::Method;
pub use methods::{step, LaxFriedrichs};
pub use norm::l2_error;
pub use problem::{exact_state, initial_state, Problem, SimulationConfig, Stability, Wavelength};
pub use sim::{run, RunOutput, Simulation};

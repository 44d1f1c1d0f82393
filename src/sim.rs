use std::{convert::Infallible, fmt};

use faer_core::{Mat, MatRef};

use crate::{
    driver::{march, Driver, Trajectory},
    error::LaxError,
    mesh::Mesh,
    method::Method,
    methods::LaxFriedrichs,
    norm::l2_error,
    problem::{Problem, Stability},
    Float,
};

/// Result of one resolution's run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub final_state: Mat<Float>,
    pub trajectory: Option<Trajectory>,
    /// L2 distance to the exact solution at the requested final time.
    pub error: Float,
    pub steps: usize,
    pub stability: Stability,
}

#[derive(Debug, Clone)]
pub struct Simulation<M> {
    pub(crate) problem: Problem,
    pub(crate) mesh: Mesh,
    pub(crate) method: M,
}

impl Simulation<LaxFriedrichs> {
    pub fn new(problem: Problem, nx: usize) -> Result<Self, LaxError> {
        problem.validate()?;
        let mesh = Mesh::from_cfl(problem.grid(nx)?, &problem.config);
        let method = LaxFriedrichs::new(problem.config.courant());

        Ok(Self {
            problem,
            mesh,
            method,
        })
    }
}

impl<M: Method> Simulation<M> {
    pub fn with_method<N: Method>(self, method: N) -> Simulation<N> {
        Simulation {
            problem: self.problem,
            mesh: self.mesh,
            method,
        }
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn method(&self) -> &M {
        &self.method
    }

    pub fn initial_state(&self) -> Mat<Float> {
        self.problem.initial_condition(&self.mesh.space)
    }

    pub fn exact_state(&self) -> Mat<Float> {
        self.problem.exact_solution(&self.mesh.space, self.mesh.time.end)
    }

    /// Applies the method `Nt` times, recording the trajectory when `record` is set.
    pub fn run(&self, record: bool) -> Result<RunOutput, LaxError> {
        self.run_steps(self.mesh.time.steps, record)
    }

    /// Same as [`Simulation::run`] with an explicit step count. The error is
    /// still measured against the exact solution at the configured final time.
    pub fn run_steps(&self, steps: usize, record: bool) -> Result<RunOutput, LaxError> {
        let stability = self.problem.config.stability();
        if let Stability::Unstable { courant } = stability {
            tracing::warn!(
                "problem `{}`: Courant number {} is outside the stability region |C| <= 1",
                self.problem.name,
                courant
            );
        }

        let nx = self.mesh.space.steps;
        let mut trajectory = record.then(|| Trajectory::new(steps, nx));

        let final_state = {
            let mut driver = Driver::new(self);
            if let Some(trajectory) = trajectory.as_mut() {
                driver = driver.with_observer(trajectory);
            }
            driver.run_steps(steps)?
        };

        let exact = self.exact_state();
        let error = l2_error(final_state.as_ref(), exact.as_ref(), self.mesh.space.delta)?;

        Ok(RunOutput {
            final_state,
            trajectory,
            error,
            steps,
            stability,
        })
    }
}

impl<M: Method> fmt::Display for Simulation<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "simulation of `{}` problem:\n\t- `{}` method, C = {}\n\t- Δx = {:e} ({} cells)\n\t- Δt = {:e} ({} steps)",
            self.problem.name,
            self.method.name(),
            self.problem.config.courant(),
            self.mesh.space.delta,
            self.mesh.space.steps,
            self.mesh.time.delta,
            self.mesh.time.steps
        )
    }
}

/// Applies the Lax step `steps` times to `state0` at Courant number `courant`.
///
/// With `record`, row `n` of the returned trajectory is the state entering step `n`.
pub fn run(
    steps: usize,
    state0: MatRef<'_, Float>,
    courant: Float,
    record: bool,
) -> (Mat<Float>, Option<Trajectory>) {
    let method = LaxFriedrichs::new(courant);
    let mut trajectory = record.then(|| Trajectory::new(steps, state0.nrows()));

    let outcome = march(&method, steps, state0, |n, u| -> Result<(), Infallible> {
        if let Some(trajectory) = trajectory.as_mut() {
            trajectory.record(n, u);
        }
        Ok(())
    });

    match outcome {
        Ok(u) => (u, trajectory),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        faer_add::max_abs_diff,
        methods::step,
        problem::{SimulationConfig, Wavelength},
    };

    fn problem(courant: Float, final_time: Float) -> Problem {
        Problem::new(
            "sine",
            SimulationConfig::new(1.0, courant, final_time),
            1.0,
        )
        .with_wavelength(Wavelength::Domain)
    }

    #[test]
    fn run_matches_repeated_steps() {
        let sim = Simulation::new(problem(0.5, 0.1), 40).unwrap();
        let out = sim.run(false).unwrap();
        assert_eq!(out.steps, sim.mesh().time().steps());
        assert!(out.trajectory.is_none());

        let mut u = sim.initial_state();
        for _ in 0..out.steps {
            u = step(u.as_ref(), 0.5);
        }
        assert_eq!(
            max_abs_diff(u.as_ref(), out.final_state.as_ref()),
            Some(0.0)
        );
    }

    #[test]
    fn no_step_run_measures_initial_condition() {
        // dt = 0.0125 > T
        let sim = Simulation::new(problem(0.5, 0.01), 40).unwrap();
        let out = sim.run(true).unwrap();
        assert_eq!(out.steps, 0);
        assert_eq!(out.trajectory.as_ref().map(|t| t.steps()), Some(0));

        let initial = sim.initial_state();
        let expected = l2_error(
            initial.as_ref(),
            sim.exact_state().as_ref(),
            sim.mesh().space().delta(),
        )
        .unwrap();
        assert!(expected > 0.0);
        assert_eq!(out.error, expected);
    }

    #[test]
    fn free_run_is_deterministic() {
        let sim = Simulation::new(problem(0.9, 0.3), 64).unwrap();
        let u0 = sim.initial_state();
        let (a, ta) = run(20, u0.as_ref(), 0.9, true);
        let (b, tb) = run(20, u0.as_ref(), 0.9, true);
        assert_eq!(max_abs_diff(a.as_ref(), b.as_ref()), Some(0.0));
        assert_eq!(
            max_abs_diff(ta.unwrap().as_mat(), tb.unwrap().as_mat()),
            Some(0.0)
        );
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(matches!(
            Simulation::new(problem(0.5, -1.0), 10),
            Err(LaxError::Configuration { parameter: "T", .. })
        ));
        assert!(matches!(
            Simulation::new(problem(0.5, 1.0), 0),
            Err(LaxError::Configuration { parameter: "Nx", .. })
        ));
    }
}

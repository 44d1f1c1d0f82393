use std::io::Write;

use bytemuck::bytes_of;
use faer_core::{Mat, MatRef};
use reborrow::*;

use crate::{
    error::LaxError, mesh::Mesh, method::Method, problem::Problem, sim::Simulation, Float,
};

pub struct ObsCtx<'ctx> {
    // Meta
    problem: &'ctx Problem,
    mesh: &'ctx Mesh,
    method: &'ctx dyn Method,
    steps: usize,

    // Iteration info
    iter: usize,
    time: Float,
    solution: MatRef<'ctx, Float>,
}

impl<'ctx> ObsCtx<'ctx> {
    pub fn problem(&self) -> &Problem {
        self.problem
    }

    pub fn mesh(&self) -> &Mesh {
        self.mesh
    }

    pub fn method(&self) -> &dyn Method {
        self.method
    }

    /// Number of steps this run performs.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn iter(&self) -> usize {
        self.iter
    }

    pub fn time(&self) -> Float {
        self.time
    }

    pub fn solution(&self) -> MatRef<'ctx, Float> {
        self.solution
    }
}

/// Hooks into a run. `before_step` sees the state entering step `n`, for `n` in `0..steps`.
#[allow(unused_variables)]
pub trait Observer {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        Ok(())
    }

    fn before_step(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        Ok(())
    }
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        (**self).at_startup(ctx)
    }

    fn before_step(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        (**self).before_step(ctx)
    }

    fn at_cleanup(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        (**self).at_cleanup(ctx)
    }
}

/// Applies `method` `steps` times to `state0`, calling `before_step(n, u)` with
/// the state entering each step.
pub(crate) fn march<M: Method + ?Sized, E>(
    method: &M,
    steps: usize,
    state0: MatRef<'_, Float>,
    mut before_step: impl FnMut(usize, MatRef<'_, Float>) -> Result<(), E>,
) -> Result<Mat<Float>, E> {
    let mut buffer = Mat::<Float>::zeros(state0.nrows(), 2);
    let [mut u, mut v] = buffer.as_mut().split_at_col(1);

    u.rb_mut().clone_from(state0);

    for n in 0..steps {
        before_step(n, u.rb())?;

        // apply numerical method to u into v
        method.apply(u.rb(), v.rb_mut());

        // exchange u and v
        std::mem::swap(&mut u, &mut v);
    }

    Ok(u.rb().to_owned())
}

pub struct Driver<'s, 'd, M> {
    pub(crate) sim: &'s Simulation<M>,
    pub(crate) observers: Vec<Box<dyn Observer + 'd>>,
}

impl<'s, 'd, M: Method> Driver<'s, 'd, M> {
    pub fn new(sim: &'s Simulation<M>) -> Self {
        Self {
            sim,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: impl Observer + 'd) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Runs the `Nt` steps of the simulation mesh and returns the final state.
    pub fn run(&mut self) -> Result<Mat<Float>, LaxError> {
        let steps = self.sim.mesh.time.steps;
        self.run_steps(steps)
    }

    pub fn run_steps(&mut self, steps: usize) -> Result<Mat<Float>, LaxError> {
        let Simulation {
            problem,
            mesh,
            method,
        } = self.sim;
        let observers = &mut self.observers;

        let state0 = problem.initial_condition(&mesh.space);
        let dt = mesh.time.delta;

        for o in observers.iter_mut() {
            o.at_startup(ObsCtx {
                problem,
                mesh,
                method,
                steps,
                iter: 0,
                time: 0.0,
                solution: state0.as_ref(),
            })?;
        }

        let u = march(method, steps, state0.as_ref(), |n, u| -> Result<(), LaxError> {
            for o in observers.iter_mut() {
                o.before_step(ObsCtx {
                    problem,
                    mesh,
                    method,
                    steps,
                    iter: n,
                    time: dt * n as Float,
                    solution: u,
                })?;
            }
            Ok(())
        })?;

        for o in observers.iter_mut() {
            o.at_cleanup(ObsCtx {
                problem,
                mesh,
                method,
                steps,
                iter: steps,
                time: dt * steps as Float,
                solution: u.as_ref(),
            })?;
        }

        Ok(u)
    }
}

pub struct Logger;

impl Observer for Logger {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        tracing::event!(
            tracing::Level::INFO,
            "start of simulation of problem `{}` (`{}` method, C={}, Δx={:e} ({} cells), Δt={:e} ({} steps))",
            ctx.problem().name(),
            ctx.method().name(),
            ctx.problem().config().courant(),
            ctx.mesh().space.delta,
            ctx.mesh().space.steps,
            ctx.mesh().time.delta,
            ctx.steps(),
        );
        Ok(())
    }

    fn before_step(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        tracing::event!(
            tracing::Level::TRACE,
            "problem `{}`: step {} (t={:e})",
            ctx.problem().name(),
            ctx.iter(),
            ctx.time()
        );
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        tracing::event!(
            tracing::Level::INFO,
            "finished simulation of problem `{}` at t={:e}",
            ctx.problem().name(),
            ctx.time()
        );
        Ok(())
    }
}

/// Every state entering a step, row `n` holding the state before step `n`.
#[derive(Debug, Clone)]
pub struct Trajectory {
    data: Mat<Float>,
}

impl Trajectory {
    pub fn new(steps: usize, size: usize) -> Self {
        Self {
            data: Mat::zeros(steps, size),
        }
    }

    pub fn steps(&self) -> usize {
        self.data.nrows()
    }

    pub fn size(&self) -> usize {
        self.data.ncols()
    }

    /// # Panics
    /// If `n` is not a row of the trajectory or `state` has the wrong size.
    pub fn record(&mut self, n: usize, state: MatRef<'_, Float>) {
        assert!(n < self.steps());
        assert!(state.nrows() == self.size());
        for j in 0..self.size() {
            self.data.write(n, j, state.read(j, 0));
        }
    }

    /// Row `n` as a column vector.
    ///
    /// # Panics
    /// If `n` is not a row of the trajectory.
    pub fn state(&self, n: usize) -> Mat<Float> {
        assert!(n < self.steps());
        Mat::from_fn(self.size(), 1, |i, _| self.data.read(n, i))
    }

    pub fn as_mat(&self) -> MatRef<'_, Float> {
        self.data.as_ref()
    }

    pub fn into_inner(self) -> Mat<Float> {
        self.data
    }
}

impl Observer for Trajectory {
    fn before_step(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        if ctx.iter() >= self.steps() {
            return Err(LaxError::config(
                "Nt",
                format!(
                    "trajectory holds {} rows, cannot record step {}",
                    self.steps(),
                    ctx.iter()
                ),
            ));
        }
        if ctx.solution().nrows() != self.size() {
            return Err(LaxError::ShapeMismatch {
                numerical: ctx.solution().nrows(),
                exact: self.size(),
            });
        }
        self.record(ctx.iter(), ctx.solution());
        Ok(())
    }
}

const CSFF1_HEADER: &[u8] = b"CSFF1";
const CSFF1_MARKER: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Streams the evolution in the CSFF1 binary layout, one state every
/// `time_sampling` steps plus the final state.
pub struct Csff1Writer<W> {
    output: W,
    time_sampling: usize,
}

impl<W: Write> Csff1Writer<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            time_sampling: 1,
        }
    }

    pub fn with_time_sampling(mut self, time_sampling: usize) -> Self {
        self.time_sampling = time_sampling.max(1);
        self
    }

    fn write_state(&mut self, u: MatRef<'_, Float>) -> Result<(), LaxError> {
        let values: Vec<Float> = (0..u.nrows()).map(|i| u.read(i, 0)).collect();
        self.output
            .write_all(bytemuck::cast_slice(&values))
            .map_err(LaxError::from)
    }
}

impl<W: Write> Observer for Csff1Writer<W> {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        let output = &mut self.output;
        // magic bytes
        output.write_all(CSFF1_HEADER)?;
        // write float precision
        output.write_all(bytes_of(&(std::mem::size_of::<Float>() as u8)))?;
        // write dimensions
        output.write_all(bytes_of(&(ctx.mesh.space.steps as u32)))?;
        output.write_all(bytes_of(&(self.time_sampling as u32)))?;
        output.write_all(bytes_of(&(ctx.steps as u32)))?;
        // write bounds
        output.write_all(bytes_of(&ctx.mesh.space.lower))?;
        output.write_all(bytes_of(&ctx.mesh.space.upper))?;
        output.write_all(bytes_of(&(0.0 as Float)))?;
        output.write_all(bytes_of(&(ctx.mesh.time.delta * ctx.steps as Float)))?;
        // write method name
        let name = ctx.method.name().as_bytes();
        output.write_all(bytes_of(&(name.len() as u32)))?;
        output.write_all(name)?;

        output.write_all(&CSFF1_MARKER)?;
        Ok(())
    }

    fn before_step(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        if ctx.iter % self.time_sampling == 0 {
            self.write_state(ctx.solution)?;
        }
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx) -> Result<(), LaxError> {
        self.write_state(ctx.solution)?;
        self.output.write_all(&CSFF1_MARKER)?;
        self.output.flush().map_err(LaxError::from)
    }
}

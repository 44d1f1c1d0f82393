//! Resolution sweeps and empirical order of accuracy.
//!
//! Each resolution runs the full pipeline (grid, `Nt` Lax steps, exact
//! solution, L2 error) on its own data. The slope of `log(error)` against
//! `log(dx)` estimates the spatial order of the scheme, about 1 for
//! Lax-Friedrichs on smooth data with `|C| <= 1`.

use std::fmt;

use serde::Serialize;

use crate::{
    error::LaxError,
    problem::{Problem, Stability},
    sim::Simulation,
    Float,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergenceSample {
    pub nx: usize,
    pub dx: Float,
    pub error: Float,
}

/// A resolution left out of a sweep and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedResolution {
    pub nx: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: Float,
    pub intercept: Float,
}

/// Ordinary least squares fit of `ys = slope * xs + intercept`.
pub fn fit_line(xs: &[Float], ys: &[Float]) -> Result<LinearFit, LaxError> {
    if xs.len() != ys.len() {
        return Err(LaxError::ShapeMismatch {
            numerical: xs.len(),
            exact: ys.len(),
        });
    }
    if xs.len() < 2 {
        return Err(LaxError::DegenerateFit(format!(
            "need at least two points, got {}",
            xs.len()
        )));
    }

    let n = xs.len() as Float;
    let mean_x = xs.iter().sum::<Float>() / n;
    let mean_y = ys.iter().sum::<Float>() / n;

    let (mut sxx, mut sxy) = (0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }

    if sxx == 0.0 || !sxx.is_finite() || !sxy.is_finite() {
        return Err(LaxError::DegenerateFit(
            "abscissae have no spread".to_string(),
        ));
    }

    let slope = sxy / sxx;
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

impl ConvergenceSample {
    /// `(log dx, log error)`, or `None` when either has no finite logarithm
    /// (an unstable run whose error overflowed, or an exact zero error).
    pub fn log_point(&self) -> Option<(Float, Float)> {
        let finite_positive = |v: Float| v.is_finite() && v > 0.0;
        if finite_positive(self.dx) && finite_positive(self.error) {
            Some((self.dx.ln(), self.error.ln()))
        } else {
            None
        }
    }
}

/// Fit of `log(error)` against `log(dx)` over every sample.
pub fn fit_loglog(samples: &[ConvergenceSample]) -> Result<LinearFit, LaxError> {
    let points = samples
        .iter()
        .map(|s| {
            s.log_point().ok_or_else(|| {
                LaxError::DegenerateFit(format!(
                    "sample Nx={} (dx={:e}, error={:e}) has no finite logarithm",
                    s.nx, s.dx, s.error
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let (xs, ys): (Vec<Float>, Vec<Float>) = points.into_iter().unzip();
    fit_line(&xs, &ys)
}

// log-log fit over the samples that have a finite logarithm
fn fit_usable(samples: &[ConvergenceSample]) -> Result<LinearFit, LaxError> {
    let (xs, ys): (Vec<Float>, Vec<Float>) =
        samples.iter().filter_map(ConvergenceSample::log_point).unzip();
    if xs.len() < 2 {
        return Err(LaxError::DegenerateFit(format!(
            "{} of {} samples have a finite logarithm, need at least two",
            xs.len(),
            samples.len()
        )));
    }
    fit_line(&xs, &ys)
}

/// Outcome of a sweep.
///
/// Every measured sample is kept, divergent ones included. The fit only uses
/// samples with a finite logarithm and is absent when fewer than two remain.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceResult {
    samples: Vec<ConvergenceSample>,
    fit: Option<LinearFit>,
    skipped: Vec<SkippedResolution>,
}

impl ConvergenceResult {
    /// Fits an existing `(dx, error)` table.
    ///
    /// Rows without a finite logarithm stay in the table but are left out of
    /// the fit. Fails with `DegenerateFit` when fewer than two rows are usable.
    pub fn from_samples(samples: Vec<ConvergenceSample>) -> Result<Self, LaxError> {
        let fit = fit_usable(&samples)?;
        Ok(Self {
            samples,
            fit: Some(fit),
            skipped: Vec::new(),
        })
    }

    /// Samples in the order the resolutions were given.
    pub fn samples(&self) -> &[ConvergenceSample] {
        &self.samples
    }

    /// Samples that entered the fit.
    pub fn fitted_samples(&self) -> impl Iterator<Item = &ConvergenceSample> + '_ {
        self.samples.iter().filter(|s| s.log_point().is_some())
    }

    /// Samples left out of the fit because their error is not finite and positive.
    pub fn divergent_samples(&self) -> impl Iterator<Item = &ConvergenceSample> + '_ {
        self.samples.iter().filter(|s| s.log_point().is_none())
    }

    /// Empirical order of accuracy.
    pub fn slope(&self) -> Option<Float> {
        self.fit.map(|fit| fit.slope)
    }

    pub fn intercept(&self) -> Option<Float> {
        self.fit.map(|fit| fit.intercept)
    }

    pub fn fit(&self) -> Option<LinearFit> {
        self.fit
    }

    pub fn skipped(&self) -> &[SkippedResolution] {
        &self.skipped
    }

    /// `Δlog(error) / Δlog(dx)` between consecutive samples. Not finite where
    /// either sample diverged.
    pub fn local_slopes(&self) -> Vec<Float> {
        self.samples
            .windows(2)
            .map(|w| (w[1].error.ln() - w[0].error.ln()) / (w[1].dx.ln() - w[0].dx.ln()))
            .collect()
    }
}

impl fmt::Display for ConvergenceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.samples {
            writeln!(f, "Nx = {}, dx = {:.5}, L2 error = {:.5e}", s.nx, s.dx, s.error)?;
        }
        for (i, slope) in self.local_slopes().iter().enumerate() {
            writeln!(f, "slope[{}-{}] = {:.4}", i, i + 1, slope)?;
        }
        for s in &self.skipped {
            writeln!(f, "skipped Nx = {}: {}", s.nx, s.reason)?;
        }
        match self.fit {
            Some(fit) => write!(f, "fitted slope = {:.4}", fit.slope),
            None => write!(f, "fitted slope = n/a (fewer than two finite errors)"),
        }
    }
}

/// Runs one resolution and measures its L2 error at the final time.
pub fn sample(problem: &Problem, nx: usize) -> Result<ConvergenceSample, LaxError> {
    let sim = Simulation::new(problem.clone(), nx)?;
    let out = sim.run(false)?;
    Ok(ConvergenceSample {
        nx,
        dx: sim.mesh().space().delta(),
        error: out.error,
    })
}

#[derive(Debug, Clone)]
pub struct ConvergenceStudy {
    problem: Problem,
    resolutions: Vec<usize>,
    skip_invalid: bool,
    parallel: bool,
}

impl ConvergenceStudy {
    pub fn new(problem: Problem, resolutions: impl Into<Vec<usize>>) -> Self {
        Self {
            problem,
            resolutions: resolutions.into(),
            skip_invalid: false,
            parallel: false,
        }
    }

    /// Report failing resolutions in the result instead of aborting the sweep.
    pub fn with_skip_invalid(mut self, skip_invalid: bool) -> Self {
        self.skip_invalid = skip_invalid;
        self
    }

    /// Run resolutions concurrently. Needs the `parallel` feature, sequential otherwise.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn resolutions(&self) -> &[usize] {
        &self.resolutions
    }

    pub fn validate(&self) -> Result<(), LaxError> {
        self.problem.validate()?;
        if self.resolutions.len() < 2 {
            return Err(LaxError::config(
                "N_values",
                format!(
                    "a slope fit needs at least two resolutions, got {}",
                    self.resolutions.len()
                ),
            ));
        }
        Ok(())
    }

    pub fn run(&self) -> Result<ConvergenceResult, LaxError> {
        self.validate()?;

        if let Stability::Unstable { courant } = self.problem.config().stability() {
            tracing::warn!(
                "convergence study `{}`: Courant number {} is outside the stability region |C| <= 1",
                self.problem.name(),
                courant
            );
        }

        let mut samples = Vec::with_capacity(self.resolutions.len());
        let mut skipped = Vec::new();

        for (&nx, outcome) in self.resolutions.iter().zip(self.sweep()) {
            match outcome {
                Ok(s) => {
                    tracing::info!("Nx = {}, dx = {:.5}, L2 error = {:.5e}", nx, s.dx, s.error);
                    samples.push(s);
                }
                Err(err) if self.skip_invalid => {
                    tracing::warn!("skipping Nx = {}: {}", nx, err);
                    skipped.push(SkippedResolution {
                        nx,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        for s in samples.iter().filter(|s| s.log_point().is_none()) {
            tracing::warn!(
                "Nx = {}: error {:e} has no finite logarithm, left out of the fit",
                s.nx,
                s.error
            );
        }

        let fit = match fit_usable(&samples) {
            Ok(fit) => {
                tracing::info!(
                    "convergence study `{}`: fitted slope = {:.4}",
                    self.problem.name(),
                    fit.slope
                );
                Some(fit)
            }
            Err(err) => {
                tracing::warn!("convergence study `{}`: {}", self.problem.name(), err);
                None
            }
        };

        Ok(ConvergenceResult {
            samples,
            fit,
            skipped,
        })
    }

    // one outcome per resolution, in resolution order
    fn sweep(&self) -> Vec<Result<ConvergenceSample, LaxError>> {
        #[cfg(feature = "parallel")]
        {
            if self.parallel {
                use rayon::prelude::*;

                // collect() keeps the resolution order
                return self
                    .resolutions
                    .par_iter()
                    .map(|&nx| sample(&self.problem, nx))
                    .collect();
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            if self.parallel {
                tracing::debug!("`parallel` feature not compiled in, sweeping sequentially");
            }
        }

        self.resolutions
            .iter()
            .map(|&nx| sample(&self.problem, nx))
            .collect()
    }
}

use core::fmt;
use std::f64::consts::PI;

use faer::Mat;
use faer_core::MatRef;

use crate::{error::LaxError, faer_add::apply_func, mesh::Grid, Float};

// `T / dt` within this relative distance of an integer counts as that integer
const STEP_COUNT_TOLERANCE: Float = 1e-9;

/// Wavelength of the sine initial condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wavelength {
    /// `λ = L`: exactly one period across the domain.
    Domain,
    /// `λ = 1`
    #[default]
    Unit,
}

impl Wavelength {
    pub fn value(self, length: Float) -> Float {
        match self {
            Wavelength::Domain => length,
            Wavelength::Unit => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stability {
    Stable,
    /// `|C| > 1`: the scheme amplifies every non-constant mode.
    Unstable { courant: Float },
}

impl Stability {
    pub fn is_stable(self) -> bool {
        matches!(self, Stability::Stable)
    }
}

/// Parameters of `u_t + a u_x = 0` integrated up to `T` at a fixed Courant number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    speed: Float,
    courant: Float,
    final_time: Float,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(1.0, 0.5, 3.0)
    }
}

impl SimulationConfig {
    pub fn new(speed: Float, courant: Float, final_time: Float) -> Self {
        Self {
            speed,
            courant,
            final_time,
        }
    }

    pub fn with_speed(mut self, speed: Float) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_courant(mut self, courant: Float) -> Self {
        self.courant = courant;
        self
    }

    pub fn with_final_time(mut self, final_time: Float) -> Self {
        self.final_time = final_time;
        self
    }

    pub fn speed(&self) -> Float {
        self.speed
    }

    pub fn courant(&self) -> Float {
        self.courant
    }

    pub fn final_time(&self) -> Float {
        self.final_time
    }

    /// `dt = C dx / a`
    pub fn time_step(&self, dx: Float) -> Float {
        self.courant * dx / self.speed
    }

    /// `Nt = floor(T / dt)`
    ///
    /// A quotient within a relative `1e-9` of an integer counts as that
    /// integer, so `T / dt` landing just below a whole number from rounding
    /// (e.g. `a = 1`, `C = 0.8`, `T = 0.5`, `dx = 1/800`) takes the whole
    /// number of steps rather than one fewer.
    pub fn time_steps(&self, dx: Float) -> usize {
        let ratio = self.final_time / self.time_step(dx);
        if !ratio.is_finite() || ratio <= 0.0 {
            return 0;
        }

        let nearest = ratio.round();
        if (ratio - nearest).abs() <= STEP_COUNT_TOLERANCE * nearest.max(1.0) {
            nearest as usize
        } else {
            ratio.floor() as usize
        }
    }

    pub fn stability(&self) -> Stability {
        if self.courant.abs() > 1.0 {
            Stability::Unstable {
                courant: self.courant,
            }
        } else {
            Stability::Stable
        }
    }

    pub fn validate(&self) -> Result<(), LaxError> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(LaxError::config(
                "a",
                format!("wave speed must be positive and finite, got {}", self.speed),
            ));
        }
        if !self.courant.is_finite() || self.courant <= 0.0 {
            return Err(LaxError::config(
                "C",
                format!(
                    "Courant number must be positive and finite, got {}",
                    self.courant
                ),
            ));
        }
        if !self.final_time.is_finite() || self.final_time < 0.0 {
            return Err(LaxError::config(
                "T",
                format!(
                    "final time must be non-negative and finite, got {}",
                    self.final_time
                ),
            ));
        }
        Ok(())
    }
}

/// `u0(x) = sin(2πx / λ)` sampled at `x`.
pub fn initial_state(x: MatRef<'_, Float>, wavelength: Float) -> Mat<Float> {
    apply_func(x, |x| (2.0 * PI * x / wavelength).sin())
}

/// The initial sine translated by `speed * time`.
pub fn exact_state(
    x: MatRef<'_, Float>,
    speed: Float,
    time: Float,
    wavelength: Float,
) -> Mat<Float> {
    let shift = speed * time;
    apply_func(x, |x| (2.0 * PI * (x - shift) / wavelength).sin())
}

/// Linear advection of a sine wave on the periodic domain `[0, L)`.
#[derive(Clone, PartialEq)]
pub struct Problem {
    pub(crate) name: String,
    pub(crate) config: SimulationConfig,
    pub(crate) length: Float,
    pub(crate) wavelength: Wavelength,
}

impl Problem {
    pub fn new(name: impl AsRef<str>, config: SimulationConfig, length: Float) -> Self {
        Self {
            name: name.as_ref().to_string(),
            config,
            length,
            wavelength: Wavelength::default(),
        }
    }

    pub fn with_wavelength(mut self, wavelength: Wavelength) -> Self {
        self.wavelength = wavelength;
        self
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn length(&self) -> Float {
        self.length
    }

    pub fn wavelength(&self) -> Wavelength {
        self.wavelength
    }

    pub fn validate(&self) -> Result<(), LaxError> {
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(LaxError::config(
                "L",
                format!(
                    "domain length must be positive and finite, got {}",
                    self.length
                ),
            ));
        }
        self.config.validate()
    }

    pub fn grid(&self, nx: usize) -> Result<Grid, LaxError> {
        Grid::periodic(self.length, nx)
    }

    pub fn initial_condition(&self, grid: &Grid) -> Mat<Float> {
        initial_state(grid.points().as_ref(), self.wavelength.value(self.length))
    }

    pub fn exact_solution(&self, grid: &Grid, time: Float) -> Mat<Float> {
        exact_state(
            grid.points().as_ref(),
            self.config.speed,
            time,
            self.wavelength.value(self.length),
        )
    }
}

impl fmt::Debug for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("length", &self.length)
            .field("wavelength", &self.wavelength)
            .finish()
    }
}

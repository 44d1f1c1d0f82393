use faer::Mat;

use crate::{error::LaxError, faer_add::linspace, problem::SimulationConfig, Float};

// grid[0] <-> lower
// grid[i] <-> lower + i * delta forall i < steps
// grid[steps] <-> upper, aliases grid[0] and is never stored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub(crate) lower: Float,
    pub(crate) upper: Float,
    pub(crate) delta: Float,
    pub(crate) steps: usize,
}

impl Grid {
    pub fn from_steps(lower: Float, upper: Float, steps: usize) -> Result<Self, LaxError> {
        if steps == 0 {
            return Err(LaxError::config("Nx", "need at least one grid cell"));
        }
        let length = upper - lower;
        if !length.is_finite() || length <= 0.0 {
            return Err(LaxError::config(
                "L",
                format!("domain length must be positive and finite, got {length}"),
            ));
        }

        Ok(Self {
            lower,
            upper,
            delta: length / steps as Float,
            steps,
        })
    }

    /// `[0, length)` split into `steps` cells.
    pub fn periodic(length: Float, steps: usize) -> Result<Self, LaxError> {
        Self::from_steps(0.0, length, steps)
    }

    pub fn with_steps(self, steps: usize) -> Result<Self, LaxError> {
        Self::from_steps(self.lower, self.upper, steps)
    }

    pub fn lower(&self) -> Float {
        self.lower
    }

    pub fn upper(&self) -> Float {
        self.upper
    }

    pub fn length(&self) -> Float {
        self.upper - self.lower
    }

    pub fn delta(&self) -> Float {
        self.delta
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn iter(self) -> impl Iterator<Item = Float> {
        (0..self.steps).map(move |i| self.lower + self.delta * i as Float)
    }

    pub fn points(&self) -> Mat<Float> {
        linspace(self.lower, self.steps, self.delta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    pub(crate) delta: Float,
    pub(crate) steps: usize,
    pub(crate) end: Float,
}

impl TimeGrid {
    pub fn delta(&self) -> Float {
        self.delta
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Requested final time. The last time level actually reached is `steps * delta`.
    pub fn end(&self) -> Float {
        self.end
    }

    pub fn reached(&self) -> Float {
        self.delta * self.steps as Float
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) time: TimeGrid,
    pub(crate) space: Grid,
}

impl Mesh {
    // Time step chosen such that `speed * dt / dx == courant`.
    pub fn from_cfl(space: Grid, config: &SimulationConfig) -> Self {
        let time = TimeGrid {
            delta: config.time_step(space.delta),
            steps: config.time_steps(space.delta),
            end: config.final_time(),
        };
        Self { time, space }
    }

    pub fn time(&self) -> TimeGrid {
        self.time
    }

    pub fn space(&self) -> Grid {
        self.space
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faer_add::column_to_vec;

    #[test]
    fn periodic_grid_never_stores_upper_bound() {
        let grid = Grid::periodic(3.0, 4).unwrap();
        assert_eq!(grid.delta(), 0.75);
        assert_eq!(
            column_to_vec(grid.points().as_ref()),
            vec![0.0, 0.75, 1.5, 2.25]
        );
        assert_eq!(grid.iter().count(), 4);
    }

    #[test]
    fn rejects_empty_and_inverted_domains() {
        assert!(matches!(
            Grid::periodic(1.0, 0),
            Err(LaxError::Configuration { parameter: "Nx", .. })
        ));
        assert!(matches!(
            Grid::periodic(-1.0, 10),
            Err(LaxError::Configuration { parameter: "L", .. })
        ));
        assert!(matches!(
            Grid::periodic(Float::NAN, 10),
            Err(LaxError::Configuration { parameter: "L", .. })
        ));
    }

    #[test]
    fn cfl_mesh_matches_courant_number() {
        let space = Grid::periodic(1.0, 100).unwrap();
        let config = SimulationConfig::new(2.0, 0.8, 0.5);
        let mesh = Mesh::from_cfl(space, &config);

        let courant = 2.0 * mesh.time().delta() / mesh.space().delta();
        assert!((courant - 0.8).abs() < 1e-12);
        assert!(mesh.time().reached() <= 0.5 + 1e-12);
    }
}

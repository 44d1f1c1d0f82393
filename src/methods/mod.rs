use faer_core::{Mat, MatMut, MatRef};

use crate::{bc::Periodic, method::Method, Float};

/// Lax (Lax-Friedrichs) scheme for `u_t + a u_x = 0` at Courant number `C = a dt / dx`:
///
/// `v[i] = (u[i+1] + u[i-1]) / 2 - C (u[i+1] - u[i-1]) / 2`
///
/// with periodic neighbours. Only stable for `|C| <= 1`; larger values are
/// applied as-is and the solution grows without bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaxFriedrichs {
    courant: Float,
    bc: Periodic,
}

impl LaxFriedrichs {
    pub fn new(courant: Float) -> Self {
        Self {
            courant,
            bc: Periodic,
        }
    }

    pub fn courant(&self) -> Float {
        self.courant
    }
}

impl Method for LaxFriedrichs {
    fn apply(&self, u: MatRef<'_, Float>, mut v: MatMut<'_, Float>) {
        let size = u.nrows();
        assert!(v.nrows() == size);

        // component-wise schema
        let c = self.courant;
        let schema = |um: Float, up: Float| 0.5 * (up + um) - 0.5 * c * (up - um);

        for i in 0..size {
            let um = u.read(self.bc.left(i, size), 0);
            let up = u.read(self.bc.right(i, size), 0);
            v.write(i, 0, schema(um, up));
        }
    }

    fn name(&self) -> &'static str {
        "Lax-Friedrichs"
    }
}

/// One Lax step from `u` into a fresh state.
pub fn step(u: MatRef<'_, Float>, courant: Float) -> Mat<Float> {
    let mut v = Mat::<Float>::zeros(u.nrows(), 1);
    LaxFriedrichs::new(courant).apply(u, v.as_mut());
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faer_add::{column_from_slice, column_to_vec, sum};

    #[test]
    fn averages_neighbours_at_zero_courant() {
        let u = column_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        let v = step(u.as_ref(), 0.0);
        // wraps: v[0] = (u[1] + u[3]) / 2, v[3] = (u[0] + u[2]) / 2
        assert_eq!(column_to_vec(v.as_ref()), vec![3.0, 2.0, 3.0, 2.0]);
    }

    #[test]
    fn unit_courant_shifts_by_one_cell() {
        let u = column_from_slice(&[0.5, -1.0, 2.0, 0.25, 3.0]);
        let v = step(u.as_ref(), 1.0);
        assert_eq!(column_to_vec(v.as_ref()), vec![3.0, 0.5, -1.0, 2.0, 0.25]);
    }

    #[test]
    fn preserves_the_sum() {
        let u = column_from_slice(&[0.3, -1.7, 2.2, 0.9, -0.4, 1.1]);
        let v = step(u.as_ref(), 0.6);
        assert!((sum(v.as_ref()) - sum(u.as_ref())).abs() < 1e-14);
    }

    #[test]
    fn input_is_left_untouched() {
        let u = column_from_slice(&[1.0, 0.0, 0.0]);
        let before = column_to_vec(u.as_ref());
        let _ = step(u.as_ref(), 0.5);
        let _ = step(u.as_ref(), 0.5);
        assert_eq!(column_to_vec(u.as_ref()), before);
    }
}

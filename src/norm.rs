use faer_core::MatRef;

use crate::{error::LaxError, Float};

/// Discrete L2 norm of `u - exact` on a uniform grid of spacing `dx`:
/// `sqrt(dx * sum_i (u[i] - exact[i])^2)`.
pub fn l2_error(
    u: MatRef<'_, Float>,
    exact: MatRef<'_, Float>,
    dx: Float,
) -> Result<Float, LaxError> {
    if u.nrows() != exact.nrows() || u.ncols() != exact.ncols() || u.nrows() == 0 {
        return Err(LaxError::ShapeMismatch {
            numerical: u.nrows(),
            exact: exact.nrows(),
        });
    }

    let mut acc = 0.0;
    for j in 0..u.ncols() {
        for i in 0..u.nrows() {
            let d = u.read(i, j) - exact.read(i, j);
            acc += d * d;
        }
    }

    Ok((dx * acc).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faer_add::column_from_slice;

    #[test]
    fn identical_states_have_zero_error() {
        let u = column_from_slice(&[0.1, -3.0, 7.5, 1e-8]);
        assert_eq!(l2_error(u.as_ref(), u.as_ref(), 0.37).unwrap(), 0.0);
    }

    #[test]
    fn scales_with_grid_spacing() {
        let u = column_from_slice(&[1.0, 1.0, 1.0, 1.0]);
        let v = column_from_slice(&[0.0, 0.0, 0.0, 0.0]);
        // sqrt(0.25 * 4) = 1
        assert_eq!(l2_error(u.as_ref(), v.as_ref(), 0.25).unwrap(), 1.0);
        // sqrt(1.0 * 4) = 2
        assert_eq!(l2_error(u.as_ref(), v.as_ref(), 1.0).unwrap(), 2.0);
    }

    #[test]
    fn mismatched_or_empty_states_fail() {
        let u = column_from_slice(&[1.0, 2.0, 3.0]);
        let v = column_from_slice(&[1.0, 2.0]);
        assert!(matches!(
            l2_error(u.as_ref(), v.as_ref(), 0.1),
            Err(LaxError::ShapeMismatch {
                numerical: 3,
                exact: 2
            })
        ));

        let empty = column_from_slice(&[]);
        assert!(matches!(
            l2_error(empty.as_ref(), empty.as_ref(), 0.1),
            Err(LaxError::ShapeMismatch { .. })
        ));
    }
}

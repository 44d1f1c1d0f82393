use faer_core::{MatMut, MatRef};

use crate::Float;

/// Two-level explicit scheme: `v = S(u)` for column vectors of the same size.
pub trait Method {
    /// `u` and `v` never alias.
    fn apply(&self, u: MatRef<'_, Float>, v: MatMut<'_, Float>);
    fn name(&self) -> &'static str;
}

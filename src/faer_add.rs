use crate::Float;
use faer::Mat;
use faer_core::MatRef;

/// Column vector `[a, a + h, ..., a + (size - 1) * h]`.
pub fn linspace(a: Float, size: usize, h: Float) -> Mat<Float> {
    Mat::<Float>::from_fn(size, 1, |i, _| a + h * i as Float)
}

pub fn apply_func(m: MatRef<'_, Float>, f: impl Fn(Float) -> Float) -> Mat<Float> {
    Mat::from_fn(m.nrows(), m.ncols(), |i, j| f(m.read(i, j)))
}

pub fn column_from_slice(values: &[Float]) -> Mat<Float> {
    Mat::from_fn(values.len(), 1, |i, _| values[i])
}

pub fn column_to_vec(m: MatRef<'_, Float>) -> Vec<Float> {
    (0..m.nrows()).map(|i| m.read(i, 0)).collect()
}

pub fn sum(m: MatRef<'_, Float>) -> Float {
    let mut acc = 0.0;
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            acc += m.read(i, j);
        }
    }
    acc
}

/// Largest entrywise `|a - b|`, or `None` when the shapes differ.
pub fn max_abs_diff(a: MatRef<'_, Float>, b: MatRef<'_, Float>) -> Option<Float> {
    if a.nrows() != b.nrows() || a.ncols() != b.ncols() {
        return None;
    }

    let mut max: Float = 0.0;
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            max = max.max((a.read(i, j) - b.read(i, j)).abs());
        }
    }
    Some(max)
}

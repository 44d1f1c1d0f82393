/// Periodic boundary: index `size` aliases index `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Periodic;

impl Periodic {
    #[inline]
    pub fn left(self, i: usize, size: usize) -> usize {
        (i + size - 1) % size
    }

    #[inline]
    pub fn right(self, i: usize, size: usize) -> usize {
        (i + 1) % size
    }
}

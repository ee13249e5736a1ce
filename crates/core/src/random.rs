//! Uniform random selection, used by the "random character" redirect and the
//! writing-prompt picker.

use rand::Rng;

/// Pick one element uniformly at random. Returns `None` for an empty slice.
pub fn pick_random<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng,
{
    if items.is_empty() {
        return None;
    }
    let index = rng.random_range(0..items.len());
    items.get(index)
}

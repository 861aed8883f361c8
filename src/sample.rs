use rand::seq::SliceRandom;
use rand::Rng;

/// Each call draws afresh. Anything computed from the result is an
/// estimate and must be labelled as one.
pub fn sample_with<T: Clone, R: Rng + ?Sized>(items: &[T], n: usize, rng: &mut R) -> Vec<T> {
    items.choose_multiple(rng, n).cloned().collect()
}

pub fn sample<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    sample_with(items, n, &mut rand::thread_rng())
}

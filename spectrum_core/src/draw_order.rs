//! Processing order for the collision search.
//!
//! The order only decides which marker claims a free row first. It never
//! changes x-coordinates, so tests can pin it with [`FixedOrder`].

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait DrawOrder {
    /// Returns a permutation of `0..len`.
    fn permutation(&mut self, len: usize) -> Vec<usize>;
}

/// Keeps the input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputOrder;

impl DrawOrder for InputOrder {
    fn permutation(&mut self, len: usize) -> Vec<usize> {
        (0..len).collect()
    }
}

/// Replays a caller-supplied permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedOrder(pub Vec<usize>);

impl DrawOrder for FixedOrder {
    fn permutation(&mut self, _len: usize) -> Vec<usize> {
        self.0.clone()
    }
}

/// Shuffles the whole entity set so categories intermix.
pub struct ShuffledOrder {
    rng: Box<dyn RngCore + Send>,
}

impl ShuffledOrder {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Box::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Box::new(SmallRng::from_entropy()),
        }
    }
}

impl std::fmt::Debug for ShuffledOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShuffledOrder").finish_non_exhaustive()
    }
}

impl DrawOrder for ShuffledOrder {
    fn permutation(&mut self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut self.rng);
        order
    }
}

/// True when `order` visits every index of `0..len` exactly once.
pub fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let a = ShuffledOrder::seeded(7).permutation(32);
        let b = ShuffledOrder::seeded(7).permutation(32);
        assert_eq!(a, b);
        assert!(is_permutation(&a, 32));
    }

    #[test]
    fn entropy_shuffle_is_a_permutation() {
        let order = ShuffledOrder::from_entropy().permutation(100);
        assert!(is_permutation(&order, 100));
    }

    #[test]
    fn permutation_check_rejects_bad_orders() {
        assert!(is_permutation(&[], 0));
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1], 3));
        assert!(!is_permutation(&[0, 1, 3], 3));
    }
}

//! Uniform random draws used to initialise layer weights.
//!
//! [`random`] is the one-shot form drawing from the thread-local generator;
//! [`Sampler`] validates a range once and draws repeatedly from any `Rng`,
//! which is how seeded (reproducible) initialisation is done.

use rand::Rng;
use rand::distr::{Distribution, Uniform};

use crate::element::Element;
use crate::error::{TensorError, TensorResult};

/// A validated uniform distribution over the closed range `[min, max]`.
pub struct Sampler<T: Element> {
    dist: Uniform<T>,
}

impl<T: Element> Sampler<T> {
    /// Builds a sampler over `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidRange`] if `min > max`, either bound is
    /// NaN, or a float bound is infinite.
    pub fn new(min: T, max: T) -> TensorResult<Self> {
        // also rejects NaN bounds
        if !(min <= max) {
            return Err(TensorError::InvalidRange);
        }
        let dist = Uniform::new_inclusive(min, max).map_err(|_| TensorError::InvalidRange)?;
        Ok(Self { dist })
    }

    /// Draws one value from `rng`.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.dist.sample(rng)
    }
}

/// Draws one value uniformly from `[min, max]` with the thread-local generator.
///
/// # Errors
///
/// See [`Sampler::new`].
///
/// # Example
///
/// ```
/// let v = curnn::math::random(-1.0f32, 1.0).unwrap();
/// assert!((-1.0..=1.0).contains(&v));
/// ```
pub fn random<T: Element>(min: T, max: T) -> TensorResult<T> {
    Ok(Sampler::new(min, max)?.draw(&mut rand::rng()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn draws_stay_in_closed_range() {
        let sampler = Sampler::new(-0.5f64, 0.25).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = sampler.draw(&mut rng);
            assert!((-0.5..=0.25).contains(&v));
        }
    }

    #[test]
    fn degenerate_range_yields_bound() {
        assert_eq!(random(3i32, 3).unwrap(), 3);
    }

    #[test]
    fn rejects_bad_ranges() {
        assert_eq!(Sampler::new(1.0f32, -1.0).err(), Some(TensorError::InvalidRange));
        assert!(Sampler::new(f32::NAN, 1.0).is_err());
        assert!(Sampler::new(0.0f64, f64::INFINITY).is_err());
    }

    #[test]
    fn seeded_samplers_repeat() {
        let sampler = Sampler::new(0u32, 1000).unwrap();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..16 {
            assert_eq!(sampler.draw(&mut a), sampler.draw(&mut b));
        }
    }
}

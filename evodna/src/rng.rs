//! Seeded randomness and the samplers genomes are built from.
//!
//! Nothing in the genetics crates owns a random source: every
//! operation takes an explicit `&mut impl Rng`, so a host can
//! replay a lineage exactly by reusing a seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use std::f32::consts::PI;

/// The random source used for reproducible runs.
pub type DnaRng = ChaCha8Rng;

/// Returns a random source seeded with `seed`.
///
/// # Examples
/// ```
/// use evodna::rng;
/// use rand::Rng;
///
/// let mut a = rng::seeded(42);
/// let mut b = rng::seeded(42);
/// assert_eq!(a.gen::<u64>(), b.gen::<u64>());
/// ```
pub fn seeded(seed: u64) -> DnaRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Returns `true` with probability `chance`.
pub fn chance<R: Rng>(rng: &mut R, chance: f32) -> bool {
    rng.gen::<f32>() < chance
}

/// A normal distribution, sampled with the Box–Muller
/// transform over the uniform generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normal {
    mean: f32,
    deviation: f32,
}

impl Normal {
    /// The standard normal distribution, `N(0, 1)`.
    pub const STANDARD: Normal = Normal {
        mean: 0.0,
        deviation: 1.0,
    };

    /// Returns a normal distribution with the given
    /// mean and standard deviation.
    ///
    /// # Examples
    /// ```
    /// use evodna::rng::{self, Normal};
    ///
    /// let mut rng = rng::seeded(1);
    /// let weights = Normal::new(0.0, 15.0);
    /// let w = weights.sample(&mut rng);
    /// assert!(w.is_finite());
    /// ```
    pub fn new(mean: f32, deviation: f32) -> Normal {
        Normal { mean, deviation }
    }

    /// Returns the distribution's mean.
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Returns the distribution's standard deviation.
    pub fn deviation(&self) -> f32 {
        self.deviation
    }

    /// Draws one value. Consumes exactly two uniform draws.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        // 1 - u lies in (0, 1], so the logarithm is finite.
        let u: f32 = rng.gen();
        let radius = (-2.0 * (1.0 - u).ln()).sqrt() * self.deviation;
        let phi = 2.0 * PI * rng.gen::<f32>();
        self.mean + radius * phi.cos()
    }
}

/// Draws from the sum of a fair coin (0 or 1) and a standard
/// normal value: a distribution with two humps, centered on 0
/// and on 1.
pub fn bimodal_normal<R: Rng>(rng: &mut R) -> f32 {
    let base = if rng.gen::<bool>() { 0.0 } else { 1.0 };
    base + Normal::STANDARD.sample(rng)
}

/// Blends two values with a bimodal weight `p`, returning
/// `p·lhs + (1 − p)·rhs`.
///
/// The result is usually close to one of the two values,
/// and occasionally an interpolation or extrapolation of both.
///
/// # Examples
/// ```
/// use evodna::rng;
///
/// let mut rng = rng::seeded(3);
/// // Blending a value with itself leaves it (nearly) unchanged.
/// let mixed = rng::bimodal_mix(2.5, 2.5, &mut rng);
/// assert!((mixed - 2.5).abs() < 1e-4);
/// ```
pub fn bimodal_mix<R: Rng>(lhs: f32, rhs: f32, rng: &mut R) -> f32 {
    let p = bimodal_normal(rng);
    p * lhs + (1.0 - p) * rhs
}

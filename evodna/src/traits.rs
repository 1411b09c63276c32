use crate::rng::bimodal_mix;

use rand::Rng;
use serde::{Deserialize, Serialize};

use std::f32::consts::PI;
use std::fmt;
use std::ops::RangeInclusive;

/// Visible, non-topological traits carried by every genome.
///
/// Hues are in degrees, in the range `[0, 360)`.
/// Eye size is an angle in radians.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Traits {
    eye_size: f32,
    color: f32,
    egg_color: f32,
}

impl Traits {
    /// Allowed eye sizes. Mixed eye sizes are clamped into this range.
    pub const EYE_SIZE_RANGE: RangeInclusive<f32> = (0.17 * PI)..=(0.27 * PI);

    /// Returns a new set of traits.
    ///
    /// # Examples
    /// ```
    /// use evodna::Traits;
    ///
    /// let traits = Traits::new(0.2, 120.0, 240.0);
    /// assert_eq!(traits.color(), 120.0);
    /// ```
    pub fn new(eye_size: f32, color: f32, egg_color: f32) -> Traits {
        Traits {
            eye_size,
            color,
            egg_color,
        }
    }

    /// Returns random traits: an eye size in the lower part of
    /// [`EYE_SIZE_RANGE`] and uniformly random whole-degree hues.
    ///
    /// [`EYE_SIZE_RANGE`]: Traits::EYE_SIZE_RANGE
    pub fn random<R: Rng>(rng: &mut R) -> Traits {
        Traits {
            eye_size: (0.17 + 0.1 * rng.gen::<f32>()) * PI,
            color: (rng.gen::<f32>() * 360.0).floor(),
            egg_color: (rng.gen::<f32>() * 360.0).floor(),
        }
    }

    /// Blends two parents' traits. Each trait is mixed
    /// independently with a bimodal mix: hues along the shorter
    /// arc of the color wheel, eye size clamped into
    /// [`EYE_SIZE_RANGE`].
    ///
    /// [`EYE_SIZE_RANGE`]: Traits::EYE_SIZE_RANGE
    pub fn mix<R: Rng>(&self, other: &Traits, rng: &mut R) -> Traits {
        let egg_color = bimodal_hue_mix(self.egg_color, other.egg_color, rng);
        let color = bimodal_hue_mix(self.color, other.color, rng);
        let eye_size = bimodal_mix(self.eye_size, other.eye_size, rng).clamp(
            *Self::EYE_SIZE_RANGE.start(),
            *Self::EYE_SIZE_RANGE.end(),
        );
        Traits {
            eye_size,
            color,
            egg_color,
        }
    }

    /// Returns the eye size.
    pub fn eye_size(&self) -> f32 {
        self.eye_size
    }

    /// Returns the body hue.
    pub fn color(&self) -> f32 {
        self.color
    }

    /// Returns the egg hue.
    pub fn egg_color(&self) -> f32 {
        self.egg_color
    }
}

/// Mixes two hues along the shorter arc between them, and
/// wraps the whole-degree result back into `[0, 360)`.
///
/// # Examples
/// ```
/// use evodna::{bimodal_hue_mix, rng};
///
/// let mut rng = rng::seeded(11);
/// for _ in 0..100 {
///     let hue = bimodal_hue_mix(350.0, 10.0, &mut rng);
///     assert!((0.0..360.0).contains(&hue));
/// }
/// ```
pub fn bimodal_hue_mix<R: Rng>(lhs: f32, rhs: f32, rng: &mut R) -> f32 {
    let (smaller, larger) = if lhs < rhs { (lhs, rhs) } else { (rhs, lhs) };
    let mixed = if larger - smaller < 360.0 + smaller - larger {
        bimodal_mix(smaller, larger, rng)
    } else {
        bimodal_mix(smaller + 360.0, larger, rng)
    };
    (mixed + 360.0).floor().rem_euclid(360.0)
}

impl fmt::Display for Traits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "eye {:.3} rad, hue {:.0}°, egg {:.0}°",
            self.eye_size, self.color, self.egg_color
        )
    }
}

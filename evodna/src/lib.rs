//! Representation-independent genetics for evolving creatures.
//!
//! A creature's DNA decides two things: the shape of the brain that
//! drives it, and a handful of visible traits (eye size, body and egg
//! hues). This crate holds everything that does not depend on how the
//! brain is encoded:
//! - the [`Dna`] and [`Phenotype`] capability traits every genome
//!   representation implements,
//! - seeded randomness and the normal / bimodal samplers used for
//!   weight initialization and mixing (see [`rng`]),
//! - the non-topological [`Traits`] and the way two parents' traits
//!   are blended.
//!
//! The graph-of-nodes (NEAT) representation lives in the
//! `evodna-neat` crate.
//!
//! # Example usage: blending two parents' traits
//! ```
//! use evodna::{rng, Traits};
//!
//! let mut rng = rng::seeded(7);
//! let mother = Traits::random(&mut rng);
//! let father = Traits::random(&mut rng);
//!
//! let child = mother.mix(&father, &mut rng);
//! assert!(Traits::EYE_SIZE_RANGE.contains(&child.eye_size()));
//! assert!((0.0..360.0).contains(&child.color()));
//! ```

mod dna;
pub mod rng;
mod traits;

pub use dna::*;
pub use traits::*;

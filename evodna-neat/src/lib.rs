//! # evodna-neat
//! A topology-evolving graph genome implementing the `evodna` crate's `Dna` trait.
//!
//! Provides a [`NeatDna`] genome, whose connections and hidden nodes grow
//! through mutation and mixing, and the stateless [`Brain`] built from it.
//!
//! [`NeatDna`]: crate::genomics::NeatDna
//! [`Brain`]: crate::networks::Brain
//!
//! # Example usage: one generation
//! ```
//! use evodna::rng;
//! use evodna_neat::genomics::{GeneticConfig, History, NeatDna};
//! use std::collections::HashMap;
//!
//! let config = GeneticConfig::default();
//! let mut rng = rng::seeded(2021);
//! let mut history = History::new(&mut rng);
//!
//! let parents: Vec<NeatDna> = (0..2)
//!     .map(|_| NeatDna::random(&config, &mut rng))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! let child = parents[0]
//!     .mix(&parents[1], &mut history, &config, &mut rng)
//!     .unwrap();
//!
//! let mut inputs = HashMap::new();
//! inputs.insert("energy".to_string(), 0.8);
//! inputs.insert(format!("sight_{}d", child.pixel_id(1)), 0.3);
//!
//! let outputs = child.build_brain().unwrap().think(&inputs).unwrap();
//! for key in ["acceleration_angle", "acceleration_radius", "shooting_trigger", "sexual_desire"] {
//!     assert!((0.0..=1.0).contains(&outputs[key]));
//! }
//! ```
pub mod genomics;
pub mod networks;

/// Node keys. Input and output keys are names chosen by the
/// host; hidden keys are decimal numbers.
pub type NodeKey = String;
/// Opaque gene identities, used to match genes while mixing.
pub type Innovation = String;

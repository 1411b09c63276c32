use crate::Traits;

use rand::Rng;

use std::collections::HashMap;
use std::error::Error;
use std::hash::BuildHasher;

/// The capability interface shared by every genome
/// representation a population can be built from.
///
/// A population picks one representation when it is
/// created and sticks with it: [`mix`] only accepts
/// a partner of the same type, so two representations
/// can never interbreed.
///
/// [`mix`]: Dna::mix
pub trait Dna: Sized {
    type Config;
    type History;
    type Brain: Phenotype;
    type Error: Error;

    /// Builds the runnable brain encoded by the genome.
    fn build_brain(&self) -> Result<Self::Brain, Self::Error>;

    /// Combines two genomes into an offspring genome.
    fn mix<R: Rng>(
        &self,
        other: &Self,
        history: &mut Self::History,
        config: &Self::Config,
        rng: &mut R,
    ) -> Result<Self, Self::Error>;

    /// Returns the input key prefix the host should use
    /// for the sensor slot `sensor_index`.
    fn pixel_id(&self, sensor_index: usize) -> String;

    /// Returns the genome's non-topological traits.
    fn traits(&self) -> &Traits;
}

/// A runnable brain, mapping named inputs to named outputs.
///
/// Phenotypes hold no state between calls.
pub trait Phenotype {
    type Error: Error;

    /// Evaluates the brain once.
    fn think<S: BuildHasher>(
        &self,
        inputs: &HashMap<String, f32, S>,
    ) -> Result<HashMap<String, f32>, Self::Error>;
}

use crate::genomics::{NeatDna, StructuralError};
use crate::networks::Activation;
use crate::NodeKey;

use ahash::RandomState;
use evodna::Phenotype;

use std::collections::HashMap;
use std::hash::BuildHasher;

/// A weighted, enabled connection between two node slots.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Synapse {
    input: usize,
    output: usize,
    weight: f32,
}

/// A stateless, feed-forward brain.
///
/// Node keys are mapped to dense slots when the brain is built;
/// every evaluation then starts from zeroed slots, loads the inputs,
/// and runs the enabled connections once, in the genome's order.
#[derive(Clone, Debug)]
pub struct Brain {
    node_keys: Vec<NodeKey>,
    input_slots: HashMap<NodeKey, usize, RandomState>,
    output_slots: Vec<usize>,
    synapses: Vec<Synapse>,
    activation: Activation,
}

impl TryFrom<&NeatDna> for Brain {
    type Error = StructuralError;

    fn try_from(dna: &NeatDna) -> Result<Self, Self::Error> {
        Brain::new(dna)
    }
}

impl Brain {
    /// Builds the brain encoded by `dna`, using the
    /// [`Logistic`] activation.
    ///
    /// # Errors
    /// Returns an error if a connection references an
    /// unknown node.
    ///
    /// [`Logistic`]: Activation::Logistic
    pub fn new(dna: &NeatDna) -> Result<Brain, StructuralError> {
        let nodes = dna.nodes();
        let node_keys: Vec<NodeKey> = nodes.iter().map(|(key, _)| key.to_string()).collect();
        let slot_of: HashMap<&str, usize, RandomState> = node_keys
            .iter()
            .enumerate()
            .map(|(slot, key)| (key.as_str(), slot))
            .collect();
        let slot = |key: &str, innovation: &str| {
            slot_of
                .get(key)
                .copied()
                .ok_or_else(|| StructuralError::UnknownNode(key.into(), innovation.into()))
        };

        let synapses = dna
            .connections()
            .iter()
            .filter(|gene| gene.enabled())
            .map(|gene| {
                Ok(Synapse {
                    input: slot(gene.input(), gene.innovation())?,
                    output: slot(gene.output(), gene.innovation())?,
                    weight: gene.weight(),
                })
            })
            .collect::<Result<Vec<_>, StructuralError>>()?;

        // Inputs come first in slot order.
        let input_slots = nodes
            .inputs()
            .iter()
            .enumerate()
            .map(|(slot, key)| (key.clone(), slot))
            .collect();
        let output_slots = nodes
            .outputs()
            .iter()
            .filter_map(|key| slot_of.get(key.as_str()).copied())
            .collect();

        Ok(Brain {
            node_keys,
            input_slots,
            output_slots,
            synapses,
            activation: Activation::default(),
        })
    }

    /// Returns the brain with a different activation function.
    ///
    /// # Examples
    /// ```
    /// use evodna::{rng, Traits};
    /// use evodna_neat::genomics::{generate_initial_genome, GeneticConfig};
    /// use evodna_neat::networks::Activation;
    /// use std::collections::HashMap;
    ///
    /// let dna = generate_initial_genome(
    ///     ["a"],
    ///     ["x"],
    ///     Traits::new(0.6, 0.0, 0.0),
    ///     &GeneticConfig::default(),
    ///     &mut rng::seeded(0),
    /// )
    /// .unwrap();
    /// let brain = dna.build_brain().unwrap().with_activation(Activation::LegacyOffset);
    /// let outputs = brain.think(&HashMap::<String, f32>::new()).unwrap();
    /// assert!(outputs["x"] >= 1.0);
    /// ```
    pub fn with_activation(mut self, activation: Activation) -> Brain {
        self.activation = activation;
        self
    }

    /// Returns the brain's activation function.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Returns the number of enabled connections.
    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    /// Evaluates the brain once.
    ///
    /// Input nodes missing from `inputs` read as 0; keys that aren't
    /// input nodes are ignored. Every output node gets a value.
    ///
    /// # Errors
    /// Returns [`StructuralError::ValueConsumed`] if a connection
    /// feeds a node whose value an earlier connection already read.
    /// Brains built from validated genomes never do.
    pub fn think<S: BuildHasher>(
        &self,
        inputs: &HashMap<String, f32, S>,
    ) -> Result<HashMap<String, f32>, StructuralError> {
        let mut values = vec![0.0f32; self.node_keys.len()];
        let mut consumed = vec![false; self.node_keys.len()];
        for (key, &value) in inputs {
            if let Some(&slot) = self.input_slots.get(key) {
                values[slot] = value;
            }
        }

        for synapse in &self.synapses {
            consumed[synapse.input] = true;
            if consumed[synapse.output] {
                return Err(StructuralError::ValueConsumed(
                    self.node_keys[synapse.output].clone(),
                ));
            }
            values[synapse.output] += synapse.weight * self.activation.apply(values[synapse.input]);
        }

        Ok(self
            .output_slots
            .iter()
            .map(|&slot| {
                (
                    self.node_keys[slot].clone(),
                    self.activation.apply(values[slot]),
                )
            })
            .collect())
    }
}

impl Phenotype for Brain {
    type Error = StructuralError;

    fn think<S: BuildHasher>(
        &self,
        inputs: &HashMap<String, f32, S>,
    ) -> Result<HashMap<String, f32>, StructuralError> {
        Brain::think(self, inputs)
    }
}

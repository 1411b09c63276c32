//! Graph genomes and the operations that evolve them.
mod config;
mod crossover;
mod errors;
mod genes;
mod history;
mod mutations;
mod nodes;
mod sensors;
mod topology;

pub use config::*;
pub use errors::*;
pub use genes::*;
pub use history::*;
pub use mutations::Mutation;
pub use nodes::*;
pub use sensors::*;
pub use topology::{check_order, check_structure, sort};

use crate::networks::Brain;
use crate::NodeKey;
use mutations::Candidate;

use evodna::rng::{self, Normal};
use evodna::{Dna, Traits};
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::{Builder, Uuid};

use std::collections::{HashMap, HashSet};
use std::fmt;

/// A feed-forward graph genome.
///
/// Connections are kept in topological order: every connection
/// into a node comes before every connection out of it, so a
/// single pass over them evaluates the network. A `NeatDna` is
/// validated whenever it is created, including when it is
/// deserialized, and is never modified afterwards; every
/// operation returns a new genome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDna")]
pub struct NeatDna {
    id: Uuid,
    nodes: Nodes,
    connections: Vec<Gene>,
    traits: Traits,
    sight_resolution: usize,
}

/// A `NeatDna` as persisted, before validation.
#[derive(Deserialize)]
struct RawDna {
    id: Uuid,
    nodes: Nodes,
    connections: Vec<Gene>,
    traits: Traits,
    sight_resolution: usize,
}

impl TryFrom<RawDna> for NeatDna {
    type Error = StructuralError;

    fn try_from(raw: RawDna) -> Result<Self, Self::Error> {
        NeatDna::new(
            raw.id,
            raw.nodes,
            raw.connections,
            raw.traits,
            raw.sight_resolution,
        )
    }
}

impl NeatDna {
    /// Creates a genome from its parts, putting the connections
    /// in topological order.
    ///
    /// # Errors
    /// Returns an error if a connection references an unknown node or
    /// a node of the wrong role, if endpoints or ids repeat, if a
    /// connection can't be reached from any input, or if the
    /// connections form a cycle.
    ///
    /// # Examples
    /// ```
    /// use evodna::Traits;
    /// use evodna_neat::genomics::{Gene, NeatDna, Nodes, StructuralError};
    /// use uuid::Uuid;
    ///
    /// let nodes = Nodes::new(["a"], ["x"], ["0"]);
    /// let traits = Traits::new(0.6, 0.0, 0.0);
    ///
    /// let dna = NeatDna::new(
    ///     Uuid::nil(),
    ///     nodes.clone(),
    ///     vec![Gene::new("g1", "0", "x", 1.0), Gene::new("g0", "a", "0", 1.0)],
    ///     traits,
    ///     3,
    /// )
    /// .unwrap();
    /// assert_eq!(dna.connections()[0].innovation(), "g0");
    ///
    /// let backwards = NeatDna::new(
    ///     Uuid::nil(),
    ///     nodes,
    ///     vec![Gene::new("g0", "x", "0", 1.0)],
    ///     traits,
    ///     3,
    /// );
    /// assert!(matches!(backwards, Err(StructuralError::InvalidSource(..))));
    /// ```
    pub fn new(
        id: Uuid,
        nodes: Nodes,
        connections: Vec<Gene>,
        traits: Traits,
        sight_resolution: usize,
    ) -> Result<NeatDna, StructuralError> {
        let sorted = topology::check_structure(&nodes, &connections)
            .and_then(|()| topology::sort(&nodes, &connections))
            .and_then(|sorted| topology::check_order(&sorted).map(|()| sorted));
        match sorted {
            Ok(connections) => Ok(NeatDna {
                id,
                nodes,
                connections,
                traits,
                sight_resolution,
            }),
            Err(e) => {
                warn!("rejected genome {}: {}", id, e);
                Err(e)
            }
        }
    }

    /// Returns a genome with the standard creature inputs and outputs
    /// at the default sight resolution, every input connected to every
    /// output, and random traits.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    ///
    /// # Examples
    /// ```
    /// use evodna::rng;
    /// use evodna_neat::genomics::{GeneticConfig, NeatDna};
    ///
    /// let dna = NeatDna::random(&GeneticConfig::default(), &mut rng::seeded(0)).unwrap();
    /// assert_eq!(dna.connections().len(), 16 * 4);
    /// assert_eq!(dna.pixel_id(0), "l1");
    /// ```
    pub fn random<R: Rng>(config: &GeneticConfig, rng: &mut R) -> Result<NeatDna, DnaError> {
        let traits = Traits::random(rng);
        generate_initial_genome(
            input_keys(DEFAULT_SIGHT_RESOLUTION),
            OUTPUT_KEYS,
            traits,
            config,
            rng,
        )
    }

    /// Returns a genome with the standard creature nodes, where only
    /// the lightness and distance inputs are connected, and only to the
    /// acceleration outputs.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn random_reduced<R: Rng>(
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<NeatDna, DnaError> {
        config.validate()?;
        let traits = Traits::random(rng);
        let weights = Normal::new(0.0, config.initial_weight_deviation);
        let connections = fully_connected(
            &reduced_input_keys(DEFAULT_SIGHT_RESOLUTION),
            &REDUCED_OUTPUT_KEYS.map(String::from),
            weights,
            rng,
        );
        let nodes = Nodes::new(
            input_keys(DEFAULT_SIGHT_RESOLUTION),
            OUTPUT_KEYS,
            Vec::<NodeKey>::new(),
        );
        Ok(NeatDna::new(
            random_id(rng),
            nodes,
            connections,
            traits,
            DEFAULT_SIGHT_RESOLUTION,
        )?)
    }

    /// Returns the genome's id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the genome's nodes.
    pub fn nodes(&self) -> &Nodes {
        &self.nodes
    }

    /// Returns the genome's connections, in topological order.
    pub fn connections(&self) -> &[Gene] {
        &self.connections
    }

    /// Returns the genome's non-topological traits.
    pub fn traits(&self) -> &Traits {
        &self.traits
    }

    /// Returns the sight resolution used to name sensor inputs.
    pub fn sight_resolution(&self) -> usize {
        self.sight_resolution
    }

    /// Returns the sensor key prefix for sight pixel `index`.
    pub fn pixel_id(&self, index: usize) -> String {
        pixel_id_for_resolution(index, self.sight_resolution)
    }

    /// Builds the genome's brain.
    ///
    /// # Examples
    /// ```
    /// use evodna::rng;
    /// use evodna_neat::genomics::{GeneticConfig, NeatDna};
    /// use std::collections::HashMap;
    ///
    /// let dna = NeatDna::random(&GeneticConfig::default(), &mut rng::seeded(1)).unwrap();
    /// let brain = dna.build_brain().unwrap();
    /// let outputs = brain.think(&HashMap::from([("energy".to_string(), 1.0)])).unwrap();
    /// assert_eq!(outputs.len(), 4);
    /// ```
    pub fn build_brain(&self) -> Result<Brain, StructuralError> {
        Brain::new(self)
    }

    /// Returns the drawing depth of every node: 0 for inputs, one
    /// more than the deepest source for hidden nodes, and one more
    /// than the deepest hidden node for outputs.
    ///
    /// Hidden nodes without incoming connections are left out.
    pub fn node_levels(&self) -> HashMap<NodeKey, usize> {
        let mut levels: HashMap<NodeKey, usize> = self
            .nodes
            .inputs()
            .iter()
            .map(|key| (key.clone(), 0))
            .collect();
        let hidden: HashSet<&str> =
            self.nodes.hidden().iter().map(String::as_str).collect();

        let mut deepest = 0;
        for gene in &self.connections {
            if !hidden.contains(gene.output()) {
                continue;
            }
            let level = levels.get(gene.input()).copied().unwrap_or(0) + 1;
            let entry = levels.entry(gene.output().to_string()).or_insert(level);
            *entry = (*entry).max(level);
            deepest = deepest.max(*entry);
        }

        for key in self.nodes.outputs() {
            levels.insert(key.clone(), deepest + 1);
        }
        levels
    }

    /// Applies one mutation step, chosen at random with the
    /// configured probabilities.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn mutate<R: Rng>(
        &self,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<NeatDna, DnaError> {
        let mut candidate = self.candidate();
        mutations::evolve(&mut candidate, history, config, rng)?;
        Ok(self.with_candidate(candidate)?)
    }

    /// Splits a random enabled connection with a new hidden node.
    pub fn split_connection<R: Rng>(
        &self,
        history: &mut History,
        rng: &mut R,
    ) -> Result<NeatDna, StructuralError> {
        let mut candidate = self.candidate();
        mutations::split_connection(&mut candidate, history, rng);
        self.with_candidate(candidate)
    }

    /// Splits the connection with the given id. Unknown or disabled
    /// connections leave the genome unchanged.
    ///
    /// # Examples
    /// ```
    /// use evodna::Traits;
    /// use evodna_neat::genomics::{generate_initial_genome, GeneticConfig, History};
    ///
    /// let config = GeneticConfig::default();
    /// let traits = Traits::new(0.6, 0.0, 0.0);
    /// let mut rng = evodna::rng::seeded(0);
    /// let dna = generate_initial_genome(["a"], ["x"], traits, &config, &mut rng).unwrap();
    ///
    /// let mut history = History::with_lineage("L");
    /// let split = dna.split_gene("initial_a_x", &mut history).unwrap();
    /// assert_eq!(split.nodes().hidden(), ["0"]);
    /// assert_eq!(split.connections().len(), 3);
    /// ```
    pub fn split_gene(
        &self,
        innovation: &str,
        history: &mut History,
    ) -> Result<NeatDna, StructuralError> {
        let mut candidate = self.candidate();
        if let Some(index) = self.position(innovation) {
            mutations::split_at(&mut candidate, index, history);
        }
        self.with_candidate(candidate)
    }

    /// Tries to add one random connection. Candidates that would
    /// duplicate a connection or close a cycle are dropped, leaving
    /// the genome unchanged.
    pub fn add_connection<R: Rng>(
        &self,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<NeatDna, StructuralError> {
        let mut candidate = self.candidate();
        mutations::add_connection(&mut candidate, history, config, rng);
        self.with_candidate(candidate)
    }

    /// Disables a random connection.
    pub fn disable_connection<R: Rng>(&self, rng: &mut R) -> Result<NeatDna, StructuralError> {
        let mut candidate = self.candidate();
        mutations::disable_connection(&mut candidate, rng);
        self.with_candidate(candidate)
    }

    /// Disables the connection with the given id, if there is one.
    pub fn disable_gene(&self, innovation: &str) -> Result<NeatDna, StructuralError> {
        let mut candidate = self.candidate();
        if let Some(index) = self.position(innovation) {
            mutations::disable_at(&mut candidate, index);
        }
        self.with_candidate(candidate)
    }

    /// Mixes two genomes into a new one.
    ///
    /// A fair coin picks the primary parent, whose nodes and connection
    /// layout the child inherits; the child then undergoes one mutation
    /// step. Traits are blended from both parents, and the child gets
    /// a new random id.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    ///
    /// # Examples
    /// ```
    /// use evodna::rng;
    /// use evodna_neat::genomics::{GeneticConfig, History, NeatDna};
    ///
    /// let config = GeneticConfig::default();
    /// let mut rng = rng::seeded(5);
    /// let mut history = History::new(&mut rng);
    /// let a = NeatDna::random(&config, &mut rng).unwrap();
    /// let b = NeatDna::random(&config, &mut rng).unwrap();
    ///
    /// let child = a.mix(&b, &mut history, &config, &mut rng).unwrap();
    /// assert_ne!(child.id(), a.id());
    /// ```
    pub fn mix<R: Rng>(
        &self,
        other: &NeatDna,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<NeatDna, DnaError> {
        config.validate()?;
        let (primary, secondary) = if rng::chance(rng, 0.5) {
            (self, other)
        } else {
            (other, self)
        };
        let mut candidate = crossover::crossover(primary, secondary, history, config, rng);
        mutations::evolve(&mut candidate, history, config, rng)?;
        let traits = self.traits.mix(&other.traits, rng);
        Ok(NeatDna::new(
            random_id(rng),
            candidate.nodes,
            candidate.genes,
            traits,
            self.sight_resolution,
        )?)
    }

    fn position(&self, innovation: &str) -> Option<usize> {
        self.connections
            .iter()
            .position(|g| g.innovation() == innovation)
    }

    fn candidate(&self) -> Candidate {
        Candidate {
            nodes: self.nodes.clone(),
            genes: self.connections.clone(),
        }
    }

    fn with_candidate(&self, candidate: Candidate) -> Result<NeatDna, StructuralError> {
        NeatDna::new(
            self.id,
            candidate.nodes,
            candidate.genes,
            self.traits,
            self.sight_resolution,
        )
    }
}

/// Returns a genome with every input connected to every output,
/// no hidden nodes, and weights drawn from the configured
/// initial weight distribution.
///
/// The genome uses the default sight resolution for naming
/// sensor inputs.
///
/// # Errors
/// Returns an error if the configuration is invalid, or if a key
/// is repeated among the inputs and outputs.
///
/// # Examples
/// ```
/// use evodna::{rng, Traits};
/// use evodna_neat::genomics::{generate_initial_genome, GeneticConfig};
///
/// let dna = generate_initial_genome(
///     ["a", "b"],
///     ["x"],
///     Traits::new(0.6, 0.0, 0.0),
///     &GeneticConfig::default(),
///     &mut rng::seeded(0),
/// )
/// .unwrap();
/// let mut ids: Vec<_> = dna.connections().iter().map(|g| g.innovation()).collect();
/// ids.sort_unstable();
/// assert_eq!(ids, ["initial_a_x", "initial_b_x"]);
/// ```
pub fn generate_initial_genome<I, O, R>(
    inputs: I,
    outputs: O,
    traits: Traits,
    config: &GeneticConfig,
    rng: &mut R,
) -> Result<NeatDna, DnaError>
where
    I: IntoIterator,
    I::Item: Into<NodeKey>,
    O: IntoIterator,
    O::Item: Into<NodeKey>,
    R: Rng,
{
    config.validate()?;
    let nodes = Nodes::new(inputs, outputs, Vec::<NodeKey>::new());
    let weights = Normal::new(0.0, config.initial_weight_deviation);
    let connections = fully_connected(nodes.inputs(), nodes.outputs(), weights, rng);
    Ok(NeatDna::new(
        random_id(rng),
        nodes,
        connections,
        traits,
        DEFAULT_SIGHT_RESOLUTION,
    )?)
}

fn fully_connected<R: Rng>(
    inputs: &[NodeKey],
    outputs: &[NodeKey],
    weights: Normal,
    rng: &mut R,
) -> Vec<Gene> {
    inputs
        .iter()
        .flat_map(|input| outputs.iter().map(move |output| (input, output)))
        .map(|(input, output)| {
            Gene::new(
                History::initial_gene_innovation(input, output),
                input.as_str(),
                output.as_str(),
                weights.sample(rng),
            )
        })
        .collect()
}

fn random_id<R: Rng>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

impl Dna for NeatDna {
    type Config = GeneticConfig;
    type History = History;
    type Brain = Brain;
    type Error = DnaError;

    fn build_brain(&self) -> Result<Brain, DnaError> {
        Ok(NeatDna::build_brain(self)?)
    }

    fn mix<R: Rng>(
        &self,
        other: &NeatDna,
        history: &mut History,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<NeatDna, DnaError> {
        NeatDna::mix(self, other, history, config, rng)
    }

    fn pixel_id(&self, sensor_index: usize) -> String {
        NeatDna::pixel_id(self, sensor_index)
    }

    fn traits(&self) -> &Traits {
        NeatDna::traits(self)
    }
}

impl fmt::Display for NeatDna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NeatDna({}) [{}]", self.id, self.traits)?;
        writeln!(f, "\tInputs: {}", self.nodes.inputs().join(", "))?;
        writeln!(f, "\tHidden: {}", self.nodes.hidden().join(", "))?;
        writeln!(f, "\tOutputs: {}", self.nodes.outputs().join(", "))?;
        writeln!(f, "\tConnections:")?;
        for gene in &self.connections {
            writeln!(f, "\t\t{}", gene)?;
        }
        Ok(())
    }
}

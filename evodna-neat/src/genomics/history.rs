use crate::genomics::Nodes;
use crate::{Innovation, NodeKey};

use ahash::RandomState;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Builder;

use std::collections::HashSet;

/// A `History` hands out innovation ids and hidden node keys
/// for one lineage.
///
/// Gene innovations created by mutation or mixing are tagged
/// with the lineage they were created in, so genomes from
/// independent lineages never share an id by accident. Initial
/// genes get the deterministic id `initial_{input}_{output}`,
/// which lets independently founded genomes match their
/// initial genes during mixing.
///
/// Hidden node keys are decimal numbers. A freshly allocated key
/// is greater than every numeric hidden key in the genome it is
/// allocated for, and greater than every key the history already
/// handed out. Numbers already used as input or output keys are
/// skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    lineage: String,
    next_gene_innovation: u64,
    next_node_innovation: u64,
}

impl History {
    /// Creates a new History with a random lineage tag.
    ///
    /// # Examples
    /// ```
    /// use evodna::rng;
    /// use evodna_neat::genomics::History;
    ///
    /// let mut rng = rng::seeded(0);
    /// let a = History::new(&mut rng);
    /// let b = History::new(&mut rng);
    /// assert_ne!(a.lineage(), b.lineage());
    /// ```
    pub fn new<R: Rng>(rng: &mut R) -> History {
        let tag = Builder::from_random_bytes(rng.gen()).into_uuid();
        Self::with_lineage(tag.simple().to_string())
    }

    /// Creates a new History with the given lineage tag.
    ///
    /// Two histories with the same tag will hand out the same ids,
    /// so tags must be unique among lineages that may interbreed.
    pub fn with_lineage(lineage: impl Into<String>) -> History {
        History {
            lineage: lineage.into(),
            next_gene_innovation: 0,
            next_node_innovation: 0,
        }
    }

    /// Returns the lineage tag.
    pub fn lineage(&self) -> &str {
        &self.lineage
    }

    /// Returns the id given to the initial gene between
    /// `input` and `output`.
    ///
    /// The id is only unique while keys avoid `_` at their ends:
    /// `("a", "b_x")` and `("a_b", "x")` share `initial_a_b_x`.
    /// Genomes founded on such keys are rejected with
    /// `StructuralError::DuplicateInnovation`.
    ///
    /// # Examples
    /// ```
    /// use evodna_neat::genomics::History;
    ///
    /// assert_eq!(History::initial_gene_innovation("a", "x"), "initial_a_x");
    /// ```
    pub fn initial_gene_innovation(input: &str, output: &str) -> Innovation {
        format!("initial_{}_{}", input, output)
    }

    /// Returns a never-before-returned gene innovation id.
    pub fn next_gene_innovation(&mut self) -> Innovation {
        let innovation = format!("{}-{}", self.lineage, self.next_gene_innovation);
        self.next_gene_innovation += 1;
        innovation
    }

    /// Returns a new hidden node key for a genome with the given nodes.
    pub fn next_node(&mut self, nodes: &Nodes) -> NodeKey {
        let in_genome = nodes
            .hidden()
            .iter()
            .filter_map(|key| key.parse::<u64>().ok())
            .map(|key| key + 1)
            .max()
            .unwrap_or(0);
        let taken: HashSet<&str, RandomState> = nodes.iter().map(|(key, _)| key).collect();
        let mut key = in_genome.max(self.next_node_innovation);
        while taken.contains(key.to_string().as_str()) {
            key += 1;
        }
        self.next_node_innovation = key + 1;
        key.to_string()
    }
}

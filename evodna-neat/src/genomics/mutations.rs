//! Structural mutation operators.
//!
//! Operators work on an unvalidated [`Candidate`]; the genome
//! built from the candidate afterwards sorts and validates it.

use crate::genomics::{topology, ConfigurationError, Gene, GeneticConfig, History, Nodes};

use evodna::rng::Normal;
use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::fmt;

/// The structural mutation chosen for a mutation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// Replace a connection by a new node and two connections.
    SplitConnection,
    /// Connect two previously unconnected nodes.
    AddConnection,
    /// Disable a connection.
    DisableConnection,
    /// Leave the genome as it is.
    Nothing,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mutation::SplitConnection => "split connection",
            Mutation::AddConnection => "add connection",
            Mutation::DisableConnection => "disable connection",
            Mutation::Nothing => "nothing",
        };
        f.write_str(name)
    }
}

/// Nodes and genes on their way to becoming a genome.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Candidate {
    pub nodes: Nodes,
    pub genes: Vec<Gene>,
}

/// Splits the gene at `index`, if it is enabled: the gene is disabled,
/// and a new hidden node is placed between its endpoints. The gene into
/// the new node has weight 1, the gene out of it the split gene's weight.
///
/// Returns whether the candidate changed.
pub(crate) fn split_at(candidate: &mut Candidate, index: usize, history: &mut History) -> bool {
    let split = match candidate.genes.get_mut(index) {
        Some(gene) if gene.enabled() => gene,
        _ => return false,
    };
    split.disable();
    let (input, output, weight) = (
        split.input().to_string(),
        split.output().to_string(),
        split.weight(),
    );
    let innovation = split.innovation().to_string();

    let node = history.next_node(&candidate.nodes);
    candidate.nodes.push_hidden(node.clone());
    let into = Gene::new(history.next_gene_innovation(), input, node.clone(), 1.0);
    let out_of = Gene::new(history.next_gene_innovation(), node.clone(), output, weight);
    debug!("split {} with node {} ({}, {})", innovation, node, into, out_of);
    candidate.genes.push(into);
    candidate.genes.push(out_of);
    true
}

/// Splits a uniformly chosen enabled gene. Does nothing if
/// every gene is disabled.
pub(crate) fn split_connection<R: Rng>(
    candidate: &mut Candidate,
    history: &mut History,
    rng: &mut R,
) -> bool {
    let enabled: Vec<usize> = (0..candidate.genes.len())
        .filter(|&i| candidate.genes[i].enabled())
        .collect();
    match enabled.choose(rng) {
        Some(&index) => split_at(candidate, index, history),
        None => {
            debug!("no enabled connection to split");
            false
        }
    }
}

/// Proposes one new gene, from a random input or hidden node to a
/// random hidden or output node, and adds it unless it would connect
/// a node to itself, duplicate an existing gene, or close a cycle.
///
/// Returns whether the candidate changed.
pub(crate) fn add_connection<R: Rng>(
    candidate: &mut Candidate,
    history: &mut History,
    config: &GeneticConfig,
    rng: &mut R,
) -> bool {
    let targets: Vec<&str> = candidate.nodes.targets().collect();
    let sources: Vec<&str> = candidate.nodes.sources().collect();
    let (output, input) = match (targets.choose(rng), sources.choose(rng)) {
        (Some(&output), Some(&input)) => (output, input),
        _ => return false,
    };

    if input == output {
        trace!("rejected connection {} -> {}: self connection", input, output);
        return false;
    }
    if candidate
        .genes
        .iter()
        .any(|g| g.input() == input && g.output() == output)
    {
        trace!("rejected connection {} -> {}: already connected", input, output);
        return false;
    }
    let outgoing = topology::outgoing(&candidate.genes);
    if topology::is_reachable(&candidate.genes, &outgoing, output, input) {
        trace!("rejected connection {} -> {}: would close a cycle", input, output);
        return false;
    }

    let weight = Normal::new(0.0, config.new_connection_weight_deviation).sample(rng);
    let gene = Gene::new(history.next_gene_innovation(), input, output, weight);
    debug!("added {}", gene);
    candidate.genes.push(gene);
    true
}

/// Disables the gene at `index`. Disabling a disabled gene
/// changes nothing.
pub(crate) fn disable_at(candidate: &mut Candidate, index: usize) -> bool {
    match candidate.genes.get_mut(index) {
        Some(gene) if gene.enabled() => {
            gene.disable();
            debug!("disabled {}", gene.innovation());
            true
        }
        _ => false,
    }
}

/// Disables a uniformly chosen gene, enabled or not.
pub(crate) fn disable_connection<R: Rng>(candidate: &mut Candidate, rng: &mut R) -> bool {
    if candidate.genes.is_empty() {
        return false;
    }
    let index = rng.gen_range(0..candidate.genes.len());
    disable_at(candidate, index)
}

/// Applies at most one structural mutation, chosen with a single
/// uniform draw against the configured probabilities.
///
/// # Errors
/// Returns an error if the configuration is invalid. The candidate
/// is left untouched in that case.
pub(crate) fn evolve<R: Rng>(
    candidate: &mut Candidate,
    history: &mut History,
    config: &GeneticConfig,
    rng: &mut R,
) -> Result<Mutation, ConfigurationError> {
    config.validate()?;
    let mutation = config.choose_mutation(rng.gen());
    let changed = match mutation {
        Mutation::SplitConnection => split_connection(candidate, history, rng),
        Mutation::AddConnection => add_connection(candidate, history, config, rng),
        Mutation::DisableConnection => disable_connection(candidate, rng),
        Mutation::Nothing => false,
    };
    debug!(
        "mutation step: {}{}",
        mutation,
        if changed { "" } else { " (no change)" }
    );
    Ok(mutation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evodna::rng::seeded;

    fn candidate() -> Candidate {
        Candidate {
            nodes: Nodes::new(["a", "b"], ["x"], Vec::<String>::new()),
            genes: vec![
                Gene::new("initial_a_x", "a", "x", 2.0),
                Gene::new("initial_b_x", "b", "x", -1.0),
            ],
        }
    }

    #[test]
    fn split_adds_node_and_genes() {
        let mut history = History::with_lineage("L");
        let mut c = candidate();
        assert!(split_at(&mut c, 0, &mut history));
        assert_eq!(c.nodes.hidden(), ["0"]);
        assert!(!c.genes[0].enabled());
        assert_eq!(c.genes.len(), 4);

        let into = &c.genes[2];
        assert_eq!((into.input(), into.output(), into.weight()), ("a", "0", 1.0));
        assert_eq!(into.innovation(), "L-0");
        let out_of = &c.genes[3];
        assert_eq!((out_of.input(), out_of.output(), out_of.weight()), ("0", "x", 2.0));
        assert_eq!(out_of.innovation(), "L-1");
    }

    #[test]
    fn split_of_disabled_gene_does_nothing() {
        let mut history = History::with_lineage("L");
        let mut c = candidate();
        c.genes[0].disable();
        let before = c.clone();
        assert!(!split_at(&mut c, 0, &mut history));
        assert!(!split_at(&mut c, 7, &mut history));
        assert_eq!(c, before);
    }

    #[test]
    fn split_connection_without_enabled_genes() {
        let mut rng = seeded(0);
        let mut history = History::with_lineage("L");
        let mut c = candidate();
        c.genes.iter_mut().for_each(Gene::disable);
        assert!(!split_connection(&mut c, &mut history, &mut rng));
    }

    #[test]
    fn add_connection_rejects_cycles() {
        // a -> 0 -> x; the only new gene that would not close a
        // cycle or duplicate one is a -> x or b -> {0, x}.
        let mut c = Candidate {
            nodes: Nodes::new(["a", "b"], ["x"], ["0"]),
            genes: vec![Gene::new("a0", "a", "0", 1.0), Gene::new("0x", "0", "x", 1.0)],
        };
        let mut history = History::with_lineage("L");
        let mut rng = seeded(4);
        let config = GeneticConfig::default();
        for _ in 0..200 {
            add_connection(&mut c, &mut history, &config, &mut rng);
        }
        let mut pairs: Vec<_> = c.genes.iter().map(|g| (g.input(), g.output())).collect();
        pairs.sort_unstable();
        assert_eq!(
            pairs,
            [("0", "x"), ("a", "0"), ("a", "x"), ("b", "0"), ("b", "x")]
        );
    }

    #[test]
    fn disable_is_idempotent() {
        let mut c = candidate();
        assert!(disable_at(&mut c, 1));
        let once = c.clone();
        assert!(!disable_at(&mut c, 1));
        assert_eq!(c, once);
    }

    #[test]
    fn evolve_rejects_invalid_config() {
        let mut rng = seeded(0);
        let mut history = History::with_lineage("L");
        let mut c = candidate();
        let config = GeneticConfig {
            edge_addition_probability: 2.0,
            ..GeneticConfig::zero()
        };
        assert!(evolve(&mut c, &mut history, &config, &mut rng).is_err());
        assert_eq!(c, candidate());
    }

    #[test]
    fn evolve_follows_thresholds() {
        let mut rng = seeded(0);
        let mut history = History::with_lineage("L");
        let config = GeneticConfig {
            node_addition_probability: 1.0,
            ..GeneticConfig::zero()
        };
        let mut c = candidate();
        assert_eq!(
            evolve(&mut c, &mut history, &config, &mut rng),
            Ok(Mutation::SplitConnection)
        );
        assert_eq!(c.nodes.hidden().len(), 1);

        let mut c = candidate();
        assert_eq!(
            evolve(&mut c, &mut history, &GeneticConfig::zero(), &mut rng),
            Ok(Mutation::Nothing)
        );
        assert_eq!(c, candidate());
    }
}

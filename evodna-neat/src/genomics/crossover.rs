use crate::genomics::mutations::Candidate;
use crate::genomics::{GeneticConfig, History, NeatDna};

use ahash::RandomState;
use evodna::rng::{bimodal_mix, Normal};
use rand::Rng;

use std::collections::HashMap;

/// Combines the genes of two parents into a candidate with the
/// primary parent's nodes and gene layout.
///
/// An enabled primary gene matched by id in the secondary parent
/// keeps its id, and gets a bimodal mix of both weights plus a
/// small perturbation. Any other primary gene gets a bimodal mix
/// of its weight and a freshly sampled stand-in, keeps its enabled
/// flag, and is given a new id.
pub(crate) fn crossover<R: Rng>(
    primary: &NeatDna,
    secondary: &NeatDna,
    history: &mut History,
    config: &GeneticConfig,
    rng: &mut R,
) -> Candidate {
    let partner_weights: HashMap<&str, f32, RandomState> = secondary
        .connections()
        .iter()
        .map(|g| (g.innovation(), g.weight()))
        .collect();
    let perturbation = Normal::new(0.0, config.weight_mutation_deviation);
    let stand_in = Normal::new(0.0, config.unpaired_weight_mutation_deviation);

    let genes = primary
        .connections()
        .iter()
        .map(|gene| match partner_weights.get(gene.innovation()) {
            Some(&partner) if gene.enabled() => {
                let weight = bimodal_mix(gene.weight(), partner, rng) + perturbation.sample(rng);
                let mut child = gene.clone();
                child.set_weight(weight);
                child
            }
            _ => {
                let sample = stand_in.sample(rng);
                let weight = bimodal_mix(gene.weight(), sample, rng);
                gene.rebirth(history.next_gene_innovation(), weight)
            }
        })
        .collect();

    Candidate {
        nodes: primary.nodes().clone(),
        genes,
    }
}

use evodna::rng::{seeded, DnaRng};
use evodna::{Dna, Phenotype, Traits};
use evodna_neat::genomics::{
    generate_initial_genome, Gene, GeneticConfig, History, NeatDna, Nodes, StructuralError,
};
use evodna_neat::networks::Activation;
use rand::seq::SliceRandom;
use uuid::Uuid;

use std::collections::{HashMap, HashSet};

fn sigmoid(x: f32) -> f32 {
    Activation::Logistic.apply(x)
}

fn traits() -> Traits {
    Traits::new(0.6, 30.0, 90.0)
}

/// Inputs `{a, b}`, output `{x}`, `a -> x` with weight 2 and
/// `b -> x` with weight -1.
fn scenario() -> NeatDna {
    NeatDna::new(
        Uuid::nil(),
        Nodes::new(["a", "b"], ["x"], Vec::<String>::new()),
        vec![
            Gene::new("initial_a_x", "a", "x", 2.0),
            Gene::new("initial_b_x", "b", "x", -1.0),
        ],
        traits(),
        3,
    )
    .unwrap()
}

fn small_genome(rng: &mut DnaRng) -> NeatDna {
    generate_initial_genome(
        ["a", "b", "c"],
        ["x", "y"],
        Traits::random(rng),
        &GeneticConfig::default(),
        rng,
    )
    .unwrap()
}

fn ones(dna: &NeatDna) -> HashMap<String, f32> {
    dna.nodes()
        .inputs()
        .iter()
        .map(|key| (key.clone(), 1.0))
        .collect()
}

/// Kahn's algorithm over the given genes.
fn is_acyclic<'a>(genes: impl Iterator<Item = &'a Gene> + Clone) -> bool {
    let mut indegree: HashMap<&str, usize> = HashMap::new();
    for gene in genes.clone() {
        indegree.entry(gene.input()).or_insert(0);
        *indegree.entry(gene.output()).or_insert(0) += 1;
    }
    let mut ready: Vec<&str> = indegree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(&k, _)| k)
        .collect();
    let mut removed = 0;
    while let Some(node) = ready.pop() {
        removed += 1;
        for gene in genes.clone().filter(|g| g.input() == node) {
            let d = indegree.get_mut(gene.output()).unwrap();
            *d -= 1;
            if *d == 0 {
                ready.push(gene.output());
            }
        }
    }
    removed == indegree.len()
}

fn reachable(genes: &[Gene], from: &str, to: &str) -> bool {
    let mut seen = HashSet::new();
    let mut pending = vec![from.to_string()];
    while let Some(node) = pending.pop() {
        if node == to {
            return true;
        }
        if seen.insert(node.clone()) {
            pending.extend(
                genes
                    .iter()
                    .filter(|g| g.input() == node)
                    .map(|g| g.output().to_string()),
            );
        }
    }
    false
}

#[test]
fn generations_stay_acyclic() {
    let mut rng = seeded(100);
    let mut history = History::new(&mut rng);
    let config = GeneticConfig {
        node_addition_probability: 0.3,
        edge_addition_probability: 0.5,
        edge_removal_probability: 0.1,
        ..GeneticConfig::default()
    };
    let mut population: Vec<NeatDna> = (0..12).map(|_| small_genome(&mut rng)).collect();

    for _ in 0..60 {
        let mut next = Vec::with_capacity(population.len());
        for _ in 0..population.len() {
            let a = population.choose(&mut rng).unwrap();
            let b = population.choose(&mut rng).unwrap();
            let child = a.mix(b, &mut history, &config, &mut rng).unwrap();
            let child = child.mutate(&mut history, &config, &mut rng).unwrap();
            next.push(child);
        }
        population = next;

        for dna in &population {
            assert!(is_acyclic(dna.connections().iter()));
            assert!(is_acyclic(dna.connections().iter().filter(|g| g.enabled())));
            let outputs = dna.build_brain().unwrap().think(&ones(dna)).unwrap();
            assert!(outputs.values().all(|v| v.is_finite()));
        }
    }
    assert!(population.iter().any(|dna| !dna.nodes().hidden().is_empty()));
}

#[test]
fn add_connection_is_safe_and_complete() {
    let mut rng = seeded(7);
    let mut history = History::with_lineage("L");
    let config = GeneticConfig::default();

    // a -> 0 -> 1 -> x and b -> x, with a -> x and 0 -> x disabled.
    let dna = scenario()
        .split_gene("initial_a_x", &mut history)
        .unwrap();
    let deeper = dna
        .connections()
        .iter()
        .find(|g| g.input() == "0")
        .map(|g| g.innovation().to_string())
        .unwrap();
    let dna = dna.split_gene(&deeper, &mut history).unwrap();
    let genes = dna.connections();

    // Every pair the candidate pools can offer, judged by brute force.
    let sources: Vec<&str> = dna.nodes().sources().collect();
    let targets: Vec<&str> = dna.nodes().targets().collect();
    let allowed: HashSet<(String, String)> = sources
        .iter()
        .flat_map(|&s| targets.iter().map(move |&t| (s, t)))
        .filter(|&(s, t)| s != t)
        .filter(|&(s, t)| !genes.iter().any(|g| g.input() == s && g.output() == t))
        .filter(|&(s, t)| !reachable(genes, t, s))
        .map(|(s, t)| (s.to_string(), t.to_string()))
        .collect();
    assert!(!allowed.is_empty());

    let mut produced = HashSet::new();
    for _ in 0..2000 {
        let grown = dna.add_connection(&mut history, &config, &mut rng).unwrap();
        let new: Vec<&Gene> = grown
            .connections()
            .iter()
            .filter(|g| !genes.iter().any(|old| old.innovation() == g.innovation()))
            .collect();
        assert!(new.len() <= 1);
        for gene in new {
            let pair = (gene.input().to_string(), gene.output().to_string());
            assert!(allowed.contains(&pair), "unsafe connection {:?}", pair);
            produced.insert(pair);
        }
        assert!(is_acyclic(grown.connections().iter()));
    }
    assert_eq!(produced, allowed);
}

#[test]
fn split_preserves_function_up_to_activation() {
    let mut rng = seeded(11);
    let mut history = History::new(&mut rng);
    for _ in 0..20 {
        let dna = small_genome(&mut rng);
        let inputs = ones(&dna);
        for gene in dna.connections() {
            let split = dna.split_gene(gene.innovation(), &mut history).unwrap();
            let outputs = split.build_brain().unwrap().think(&inputs).unwrap();

            // Only the split path changes: its source signal passes
            // through the activation once more at the new node.
            for output in dna.nodes().outputs() {
                let sum: f32 = dna
                    .connections()
                    .iter()
                    .filter(|g| g.output() == output)
                    .map(|g| {
                        let signal = sigmoid(1.0);
                        if g.innovation() == gene.innovation() {
                            g.weight() * sigmoid(signal)
                        } else {
                            g.weight() * signal
                        }
                    })
                    .sum();
                let expected = sigmoid(sum);
                assert!(
                    (outputs[output] - expected).abs() < 1e-5,
                    "{} vs {}",
                    outputs[output],
                    expected
                );
            }
        }
    }
}

#[test]
fn mix_is_deterministic_given_seed() {
    let config = GeneticConfig::default();
    let mut setup = seeded(3);
    let a = small_genome(&mut setup);
    let b = small_genome(&mut setup);
    let history = History::new(&mut setup);

    let run = |seed: u64| {
        let mut history = history.clone();
        let mut rng = seeded(seed);
        let mut child = a.mix(&b, &mut history, &config, &mut rng).unwrap();
        for _ in 0..10 {
            child = child.mix(&a, &mut history, &config, &mut rng).unwrap();
        }
        (child, history)
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn matching_innovations_add_no_nodes() {
    let mut rng = seeded(5);
    let mut history = History::new(&mut rng);
    let quiet = GeneticConfig {
        weight_mutation_deviation: 0.5,
        unpaired_weight_mutation_deviation: 15.0,
        ..GeneticConfig::zero()
    };
    let a = small_genome(&mut rng);
    let same = a.mutate(&mut history, &quiet, &mut rng).unwrap();

    for _ in 0..50 {
        let child = a.mix(&same, &mut history, &quiet, &mut rng).unwrap();
        assert_eq!(child.nodes(), a.nodes());
        let ids: HashSet<&str> = child.connections().iter().map(Gene::innovation).collect();
        let parent_ids: HashSet<&str> = a.connections().iter().map(Gene::innovation).collect();
        assert_eq!(ids, parent_ids);
    }
}

#[test]
fn unmatched_genes_are_reidentified() {
    let mut history = History::with_lineage("L");
    let a = scenario();
    let b = scenario().disable_gene("initial_b_x").unwrap();
    let mut rng = seeded(0);

    let child = loop {
        // Retry until `b` is the primary parent.
        let child = b.mix(&a, &mut history, &GeneticConfig::zero(), &mut rng).unwrap();
        if child.connections().iter().any(|g| !g.enabled()) {
            break child;
        }
    };
    let disabled = child.connections().iter().find(|g| !g.enabled()).unwrap();
    assert_eq!((disabled.input(), disabled.output()), ("b", "x"));
    assert!(disabled.innovation().starts_with("L-"));
    let kept = child.connections().iter().find(|g| g.enabled()).unwrap();
    assert_eq!(kept.innovation(), "initial_a_x");
}

#[test]
fn disabling_twice_changes_nothing() {
    let dna = scenario();
    let once = dna.disable_gene("initial_a_x").unwrap();
    let twice = once.disable_gene("initial_a_x").unwrap();
    assert_eq!(once, twice);

    let inputs = ones(&dna);
    assert_eq!(
        once.build_brain().unwrap().think(&inputs).unwrap(),
        twice.build_brain().unwrap().think(&inputs).unwrap()
    );
}

#[test]
fn scenario_single_layer() {
    let outputs = scenario().build_brain().unwrap().think(&ones(&scenario())).unwrap();
    let expected = sigmoid(2.0 * sigmoid(1.0) + -1.0 * sigmoid(1.0));
    assert!((outputs["x"] - expected).abs() < 1e-6);
}

#[test]
fn scenario_split() {
    let mut history = History::with_lineage("L");
    let dna = scenario().split_gene("initial_a_x", &mut history).unwrap();

    assert_eq!(dna.nodes().hidden(), ["0"]);
    let find = |input: &str, output: &str| {
        dna.connections()
            .iter()
            .find(|g| g.input() == input && g.output() == output)
            .unwrap()
    };
    assert!(!find("a", "x").enabled());
    assert_eq!(find("a", "0").weight(), 1.0);
    assert_eq!(find("0", "x").weight(), 2.0);

    // The new node applies the activation once more on the a path.
    let outputs = dna.build_brain().unwrap().think(&ones(&dna)).unwrap();
    let expected = sigmoid(2.0 * sigmoid(sigmoid(1.0)) - sigmoid(1.0));
    assert!((outputs["x"] - expected).abs() < 1e-6);

    // Under the identity, the split would be exact; the two differ
    // only by how the activation bends the a path.
    let before = scenario().build_brain().unwrap().think(&ones(&dna)).unwrap();
    assert!((outputs["x"] - before["x"]).abs() < 0.1);
}

#[test]
fn scenario_output_to_input_is_never_proposed() {
    let mut rng = seeded(9);
    let mut history = History::with_lineage("L");
    let config = GeneticConfig::default();
    let dna = scenario();
    for _ in 0..500 {
        let grown = dna.add_connection(&mut history, &config, &mut rng).unwrap();
        assert!(grown
            .connections()
            .iter()
            .all(|g| g.input() != "x" && g.output() != "a" && g.output() != "b"));
    }

    let forced = NeatDna::new(
        Uuid::nil(),
        dna.nodes().clone(),
        vec![Gene::new("g", "x", "a", 1.0)],
        traits(),
        3,
    );
    assert!(matches!(forced, Err(StructuralError::InvalidSource(..))));
}

#[test]
fn pixel_ids_follow_resolution() {
    let dna = scenario();
    let ids: Vec<String> = (0..3).map(|i| Dna::pixel_id(&dna, i)).collect();
    assert_eq!(ids, ["l1", "c0", "r1"]);
}

#[test]
fn brains_are_phenotypes() {
    fn evaluate<D: Dna>(dna: &D, inputs: &HashMap<String, f32>) -> HashMap<String, f32> {
        dna.build_brain().ok().and_then(|b| b.think(inputs).ok()).unwrap()
    }
    let dna = scenario();
    assert_eq!(evaluate(&dna, &ones(&dna)).len(), 1);
}

#[test]
fn genomes_survive_serialization() {
    let mut rng = seeded(21);
    let mut history = History::new(&mut rng);
    let config = GeneticConfig::default();
    let mut dna = small_genome(&mut rng);
    for _ in 0..20 {
        dna = dna.mutate(&mut history, &config, &mut rng).unwrap();
    }
    let json = serde_json::to_string(&dna).unwrap();
    let back: NeatDna = serde_json::from_str(&json).unwrap();
    assert_eq!(back, dna);
}

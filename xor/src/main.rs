use evodna::rng::{self, DnaRng};
use evodna::Traits;
use evodna_neat::genomics::{generate_initial_genome, GeneticConfig, History, NeatDna};

use log::{info, warn};
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;
use std::error::Error;
use std::{env, fs};

const ERROR_MARGIN: f32 = 0.3;
const PERFECT_FITNESS: f32 = 16.0;

/// Settings of an XOR experiment, loadable from a RON file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
struct ExperimentConfig {
    genetic: GeneticConfig,
    population_size: usize,
    /// Fraction of each generation, by fitness, allowed to reproduce.
    survival_threshold: f32,
    max_generations: usize,
    runs: usize,
    seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            genetic: GeneticConfig::default(),
            population_size: 150,
            survival_threshold: 0.2,
            max_generations: 300,
            runs: 10,
            seed: 0,
        }
    }
}

impl ExperimentConfig {
    /// Checks that an experiment can be run with these settings.
    fn validate(&self) -> Result<(), Box<dyn Error>> {
        self.genetic.validate()?;
        if self.population_size == 0 {
            return Err("population_size must be positive".into());
        }
        if !(self.survival_threshold > 0.0 && self.survival_threshold <= 1.0) {
            return Err(format!(
                "survival_threshold must be in (0, 1], got {}",
                self.survival_threshold
            )
            .into());
        }
        Ok(())
    }
}

fn evaluate_xor(dna: &NeatDna) -> f32 {
    let brain = match dna.build_brain() {
        Ok(brain) => brain,
        Err(e) => {
            warn!("genome {} has no brain: {}", dna.id(), e);
            return 0.0;
        }
    };

    let values = [([0.0, 0.0], 0.0), ([0.0, 1.0], 1.0), ([1.0, 0.0], 1.0), ([1.0, 1.0], 0.0)];

    let mut errors = [0.0; 4];
    for (i, ([a, b], expected)) in values.iter().enumerate() {
        let inputs = HashMap::from([
            ("bias".to_string(), 1.0),
            ("a".to_string(), *a),
            ("b".to_string(), *b),
        ]);
        errors[i] = match brain.think(&inputs) {
            Ok(outputs) => (outputs["xor"] - expected).abs(),
            Err(_) => 1.0,
        };
        if errors[i] < ERROR_MARGIN {
            errors[i] = 0.0;
        }
    }

    (4.0 - errors.iter().sum::<f32>()).powf(2.0)
}

/// Evolves one population until it solves XOR, returning the
/// generation it did so in, and its champion.
fn run(
    config: &ExperimentConfig,
    rng: &mut DnaRng,
) -> Result<(Option<usize>, NeatDna), Box<dyn Error>> {
    let mut history = History::new(rng);
    let mut population = (0..config.population_size)
        .map(|_| {
            generate_initial_genome(
                ["bias", "a", "b"],
                ["xor"],
                Traits::random(rng),
                &config.genetic,
                rng,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    for generation in 0..config.max_generations {
        let mut scored: Vec<(f32, NeatDna)> = population
            .into_par_iter()
            .map(|dna| (evaluate_xor(&dna), dna))
            .collect();
        scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));

        let (best, champion) = &scored[0];
        let mean = scored.iter().map(|(f, _)| f).sum::<f32>() / scored.len() as f32;
        info!(
            "generation {}: best {:.2}, mean {:.2}, champion has {} hidden nodes",
            generation,
            best,
            mean,
            champion.nodes().hidden().len()
        );
        if (best - PERFECT_FITNESS).abs() < f32::EPSILON {
            return Ok((Some(generation), champion.clone()));
        }

        let survivors = ((scored.len() as f32 * config.survival_threshold).ceil() as usize).max(1);
        let parents: Vec<NeatDna> = scored.into_iter().take(survivors).map(|(_, d)| d).collect();

        // The champion survives unchanged.
        population = Vec::with_capacity(config.population_size);
        population.push(parents[0].clone());
        while population.len() < config.population_size {
            let (Some(a), Some(b)) = (parents.choose(rng), parents.choose(rng)) else {
                break;
            };
            match a.mix(b, &mut history, &config.genetic, rng) {
                Ok(child) => population.push(child),
                Err(e) => {
                    warn!("mixing {} and {} failed: {}", a.id(), b.id(), e);
                    population.push(a.clone());
                }
            }
        }
    }

    let champion = population
        .into_par_iter()
        .map(|dna| (evaluate_xor(&dna), dna))
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, dna)| dna)
        .ok_or("empty population")?;
    Ok((None, champion))
}

fn load_config() -> Result<ExperimentConfig, Box<dyn Error>> {
    match env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)?;
            let config: ExperimentConfig = ron::from_str(&text)?;
            info!("loaded configuration from {}", path);
            Ok(config)
        }
        None => Ok(ExperimentConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    config.validate()?;

    let mut solved = vec![];
    let mut last_champion = None;
    for i in 0..config.runs {
        let mut rng = rng::seeded(config.seed.wrapping_add(i as u64));
        let (generation, champion) = run(&config, &mut rng)?;
        match generation {
            Some(generation) => {
                info!("run {} solved XOR in generation {}", i, generation);
                solved.push(generation);
            }
            None => info!("run {} failed to solve XOR", i),
        }
        last_champion = Some(champion);
    }

    let mean = solved.iter().sum::<usize>() as f32 / solved.len().max(1) as f32;
    println!(
        "Solved in {} of {} runs, mean generation {:.1}",
        solved.len(),
        config.runs,
        mean
    );
    if let Some(champion) = last_champion {
        println!("{}", champion);
        println!("{}", ron::ser::to_string_pretty(&champion, Default::default())?);
    }
    Ok(())
}

use crate::genomics::{ConfigurationError, Mutation};

use serde::{Deserialize, Serialize};

use std::collections::HashMap;
use std::hash::BuildHasher;

/// Configuration data for genome generation
/// and inter-genome operations.
///
/// # Note
/// The three mutation probabilities must each lie in
/// [0.0, 1.0], and must add up to at most 1.0; the
/// remaining probability mass is the chance that a
/// mutation step does nothing. Deviations must be
/// non-negative. Use [`validate`] to check a configuration
/// before long runs; every mutation step checks it too.
///
/// [`validate`]: GeneticConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Chance that a mutation step splits a connection with a new node.
    pub node_addition_probability: f32,
    /// Chance that a mutation step adds a new connection.
    pub edge_addition_probability: f32,
    /// Chance that a mutation step disables a connection.
    pub edge_removal_probability: f32,
    /// Standard deviation of initial genomes' connection weights.
    pub initial_weight_deviation: f32,
    /// Standard deviation of weights of connections
    /// created by mutation.
    pub new_connection_weight_deviation: f32,
    /// Standard deviation of the perturbation applied to
    /// connections matched in both parents during mixing.
    pub weight_mutation_deviation: f32,
    /// Standard deviation of the stand-in partner weight for
    /// connections unmatched (or disabled) during mixing.
    pub unpaired_weight_mutation_deviation: f32,
}

impl GeneticConfig {
    /// Returns a "zero-valued" configuration.
    /// No mutation ever happens, and all weights
    /// are sampled with zero deviation.
    ///
    /// # Note
    /// This value is meant as a way to fill in unused
    /// values during configuration instantiation.
    ///
    /// # Examples
    /// ```
    /// use evodna_neat::genomics::GeneticConfig;
    ///
    /// let config = GeneticConfig {
    ///     edge_addition_probability: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// assert!(config.validate().is_ok());
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            node_addition_probability: 0.0,
            edge_addition_probability: 0.0,
            edge_removal_probability: 0.0,
            initial_weight_deviation: 0.0,
            new_connection_weight_deviation: 0.0,
            weight_mutation_deviation: 0.0,
            unpaired_weight_mutation_deviation: 0.0,
        }
    }

    /// Builds a configuration from a name→value lookup, using
    /// the field names as keys.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::MissingKey`] naming the first
    /// absent key. The values are not range-checked.
    ///
    /// # Examples
    /// ```
    /// use evodna_neat::genomics::{ConfigurationError, GeneticConfig};
    /// use std::collections::HashMap;
    ///
    /// let mut keyed: HashMap<String, f32> = HashMap::new();
    /// keyed.insert("node_addition_probability".into(), 0.1);
    /// assert_eq!(
    ///     GeneticConfig::from_keyed(&keyed),
    ///     Err(ConfigurationError::MissingKey("edge_addition_probability"))
    /// );
    /// ```
    pub fn from_keyed<S: BuildHasher>(
        keyed: &HashMap<String, f32, S>,
    ) -> Result<GeneticConfig, ConfigurationError> {
        let get = |key: &'static str| {
            keyed
                .get(key)
                .copied()
                .ok_or(ConfigurationError::MissingKey(key))
        };
        Ok(GeneticConfig {
            node_addition_probability: get("node_addition_probability")?,
            edge_addition_probability: get("edge_addition_probability")?,
            edge_removal_probability: get("edge_removal_probability")?,
            initial_weight_deviation: get("initial_weight_deviation")?,
            new_connection_weight_deviation: get("new_connection_weight_deviation")?,
            weight_mutation_deviation: get("weight_mutation_deviation")?,
            unpaired_weight_mutation_deviation: get("unpaired_weight_mutation_deviation")?,
        })
    }

    /// Checks that all probabilities and deviations are in range.
    ///
    /// # Errors
    /// Returns the first out-of-range value found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let probabilities = [
            ("node_addition_probability", self.node_addition_probability),
            ("edge_addition_probability", self.edge_addition_probability),
            ("edge_removal_probability", self.edge_removal_probability),
        ];
        for (key, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigurationError::ProbabilityOutOfRange(key, p));
            }
        }
        let sum: f32 = probabilities.iter().map(|(_, p)| p).sum();
        // Tolerate rounding in sums such as 0.7 + 0.2 + 0.1.
        if sum > 1.0 + f32::EPSILON * 4.0 {
            return Err(ConfigurationError::ProbabilitiesExceedOne(sum));
        }

        let deviations = [
            ("initial_weight_deviation", self.initial_weight_deviation),
            (
                "new_connection_weight_deviation",
                self.new_connection_weight_deviation,
            ),
            ("weight_mutation_deviation", self.weight_mutation_deviation),
            (
                "unpaired_weight_mutation_deviation",
                self.unpaired_weight_mutation_deviation,
            ),
        ];
        for (key, deviation) in deviations {
            if !deviation.is_finite() || deviation < 0.0 {
                return Err(ConfigurationError::InvalidDeviation(key, deviation));
            }
        }
        Ok(())
    }

    /// Picks the structural mutation for the uniform draw `p` in `[0, 1)`.
    ///
    /// The probabilities are stacked in the order split, add, disable;
    /// draws above their sum pick [`Mutation::Nothing`].
    ///
    /// # Examples
    /// ```
    /// use evodna_neat::genomics::{GeneticConfig, Mutation};
    ///
    /// let config = GeneticConfig::default();
    /// assert_eq!(config.choose_mutation(0.1), Mutation::SplitConnection);
    /// assert_eq!(config.choose_mutation(0.5), Mutation::AddConnection);
    /// assert_eq!(config.choose_mutation(0.62), Mutation::DisableConnection);
    /// assert_eq!(config.choose_mutation(0.9), Mutation::Nothing);
    /// ```
    pub fn choose_mutation(&self, p: f32) -> Mutation {
        let split = self.node_addition_probability;
        let add = split + self.edge_addition_probability;
        let disable = add + self.edge_removal_probability;
        if p < split {
            Mutation::SplitConnection
        } else if p < add {
            Mutation::AddConnection
        } else if p < disable {
            Mutation::DisableConnection
        } else {
            Mutation::Nothing
        }
    }
}

impl Default for GeneticConfig {
    fn default() -> Self {
        GeneticConfig {
            node_addition_probability: 0.2,
            edge_addition_probability: 0.4,
            edge_removal_probability: 0.05,
            initial_weight_deviation: 15.0,
            new_connection_weight_deviation: 15.0,
            weight_mutation_deviation: 0.5,
            unpaired_weight_mutation_deviation: 15.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(GeneticConfig::default().validate(), Ok(()));
        assert_eq!(GeneticConfig::zero().validate(), Ok(()));
    }

    #[test]
    fn probability_out_of_range() {
        let config = GeneticConfig {
            edge_removal_probability: 1.5,
            ..GeneticConfig::zero()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::ProbabilityOutOfRange(
                "edge_removal_probability",
                1.5
            ))
        );

        let config = GeneticConfig {
            node_addition_probability: f32::NAN,
            ..GeneticConfig::zero()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::ProbabilityOutOfRange(
                "node_addition_probability",
                _
            ))
        ));
    }

    #[test]
    fn probabilities_exceeding_one() {
        let config = GeneticConfig {
            node_addition_probability: 0.5,
            edge_addition_probability: 0.5,
            edge_removal_probability: 0.5,
            ..GeneticConfig::zero()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::ProbabilitiesExceedOne(_))
        ));

        let exactly_one = GeneticConfig {
            node_addition_probability: 0.7,
            edge_addition_probability: 0.2,
            edge_removal_probability: 0.1,
            ..GeneticConfig::zero()
        };
        assert_eq!(exactly_one.validate(), Ok(()));
    }

    #[test]
    fn invalid_deviation() {
        let config = GeneticConfig {
            weight_mutation_deviation: -1.0,
            ..GeneticConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::InvalidDeviation(
                "weight_mutation_deviation",
                -1.0
            ))
        );
    }

    #[test]
    fn keyed_round_trip() {
        let defaults = GeneticConfig::default();
        let keyed: HashMap<String, f32> = [
            ("node_addition_probability", 0.2),
            ("edge_addition_probability", 0.4),
            ("edge_removal_probability", 0.05),
            ("initial_weight_deviation", 15.0),
            ("new_connection_weight_deviation", 15.0),
            ("weight_mutation_deviation", 0.5),
            ("unpaired_weight_mutation_deviation", 15.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        assert_eq!(GeneticConfig::from_keyed(&keyed), Ok(defaults));
    }

    #[test]
    fn serde_round_trip() {
        let config = GeneticConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<GeneticConfig>(&json).unwrap(), config);
    }
}

use crate::{Innovation, NodeKey};

use serde::{Deserialize, Serialize};

use std::fmt;

/// Genes are the principal components of genomes.
/// They are created between two nodes, and become
/// weighted connections in the genome's brain.
///
/// Disabled genes are kept in the genome, so they can
/// still be matched during mixing, but carry no signal.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Gene {
    innovation: Innovation,
    #[serde(rename = "in")]
    input: NodeKey,
    #[serde(rename = "out")]
    output: NodeKey,
    weight: f32,
    enabled: bool,
}

impl Gene {
    /// Returns a new _enabled_ gene with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use evodna_neat::genomics::Gene;
    ///
    /// let gene = Gene::new("initial_a_x", "a", "x", 2.0);
    /// assert!(gene.enabled());
    /// ```
    pub fn new(
        innovation: impl Into<Innovation>,
        input: impl Into<NodeKey>,
        output: impl Into<NodeKey>,
        weight: f32,
    ) -> Gene {
        Gene {
            innovation: innovation.into(),
            input: input.into(),
            output: output.into(),
            weight,
            enabled: true,
        }
    }

    /// Returns the gene's innovation id.
    ///
    /// # Examples
    /// ```
    /// use evodna_neat::genomics::Gene;
    ///
    /// let gene = Gene::new("initial_a_x", "a", "x", 2.0);
    /// assert_eq!(gene.innovation(), "initial_a_x");
    /// ```
    pub fn innovation(&self) -> &str {
        &self.innovation
    }

    /// Returns the key of the gene's source node.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the key of the gene's target node.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Returns the gene's weight.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Returns whether the gene carries signal.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns a copy of the gene with a different id and weight,
    /// keeping endpoints and enabled flag.
    pub(crate) fn rebirth(&self, innovation: Innovation, weight: f32) -> Gene {
        Gene {
            innovation,
            weight,
            ..self.clone()
        }
    }

    pub(crate) fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    pub(crate) fn disable(&mut self) {
        self.enabled = false;
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gene({}, {} -> {}, weight: {:.3}{})",
            self.innovation,
            self.input,
            self.output,
            self.weight,
            if self.enabled { "" } else { ", disabled" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let gene = Gene::new("g", "a", "b", -1.5);
        assert_eq!(gene.innovation(), "g");
        assert_eq!(gene.input(), "a");
        assert_eq!(gene.output(), "b");
        assert_eq!(gene.weight(), -1.5);
        assert!(gene.enabled());
    }

    #[test]
    fn rebirth_keeps_endpoints() {
        let mut gene = Gene::new("g", "a", "b", 1.0);
        gene.disable();
        let reborn = gene.rebirth("h".to_string(), 4.0);
        assert_eq!(reborn.innovation(), "h");
        assert_eq!((reborn.input(), reborn.output()), ("a", "b"));
        assert_eq!(reborn.weight(), 4.0);
        assert!(!reborn.enabled());
    }

    #[test]
    fn display() {
        let mut gene = Gene::new("g", "a", "b", 0.5);
        assert_eq!(gene.to_string(), "Gene(g, a -> b, weight: 0.500)");
        gene.disable();
        assert_eq!(gene.to_string(), "Gene(g, a -> b, weight: 0.500, disabled)");
    }

    #[test]
    fn serde_keys() {
        let gene = Gene::new("g", "a", "b", 0.5);
        let json = serde_json::to_value(&gene).unwrap();
        assert_eq!(json["in"], "a");
        assert_eq!(json["out"], "b");
        assert_eq!(serde_json::from_value::<Gene>(json).unwrap(), gene);
    }
}

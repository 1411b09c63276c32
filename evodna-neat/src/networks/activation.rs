use serde::{Deserialize, Serialize};

/// The function applied to a node's accumulated value
/// before it is passed on, and to the outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activation {
    /// `1 / (1 + exp(-x))`, ranging over (0, 1).
    #[default]
    Logistic,
    /// `1 + exp(-x)`, ranging over (1, ∞).
    ///
    /// Weights evolved under this function live on a different
    /// scale than logistic ones; use it only to evaluate genomes
    /// that were evolved with it. Sources nothing has written to
    /// still read as 0 and so contribute `2 × weight`, which a
    /// `NaN`-to-zero evaluator would not.
    LegacyOffset,
}

impl Activation {
    /// Applies the function to `x`.
    ///
    /// # Examples
    /// ```
    /// use evodna_neat::networks::Activation;
    ///
    /// assert_eq!(Activation::Logistic.apply(0.0), 0.5);
    /// assert_eq!(Activation::LegacyOffset.apply(0.0), 2.0);
    /// ```
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Logistic => 1.0 / (1.0 + (-x).exp()),
            Activation::LegacyOffset => 1.0 + (-x).exp(),
        }
    }
}

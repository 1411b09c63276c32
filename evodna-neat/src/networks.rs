//! Brains built from genomes.
mod activation;
mod brain;

pub use activation::*;
pub use brain::*;

use crate::{Innovation, NodeKey};

use std::error::Error;
use std::fmt;

/// An error type indicating that a genome's graph is,
/// or would become, malformed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructuralError {
    /// A node consumed as a connection source is fed again by a later
    /// connection: the graph contains a cycle.
    Cycle {
        /// The connection closing the cycle.
        innovation: Innovation,
        /// The node whose value was already consumed.
        node: NodeKey,
    },
    /// A connection references a node key absent from the genome.
    UnknownNode(NodeKey, Innovation),
    /// A connection starts at an output node.
    InvalidSource(NodeKey, Innovation),
    /// A connection ends at an input node.
    InvalidTarget(NodeKey, Innovation),
    /// Two connections share the same endpoints.
    DuplicateConnection(NodeKey, NodeKey),
    /// Two connections share the same innovation id.
    DuplicateInnovation(Innovation),
    /// A node key appears in more than one role partition.
    OverlappingRoles(NodeKey),
    /// A connection cannot be reached from any input node,
    /// and so cannot be placed in topological order.
    UnreachableConnection(Innovation),
    /// During evaluation, a connection wrote into a node
    /// whose value had already been read.
    ValueConsumed(NodeKey),
}

/// An error type indicating missing or out-of-range
/// genetic configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigurationError {
    /// A required key was absent from a keyed configuration.
    MissingKey(&'static str),
    /// A probability is outside `[0, 1]` or not a number.
    ProbabilityOutOfRange(&'static str, f32),
    /// The mutation probabilities add up to more than 1.
    ProbabilitiesExceedOne(f32),
    /// A deviation is negative or not finite.
    InvalidDeviation(&'static str, f32),
}

/// Any failure of a genome operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DnaError {
    Structural(StructuralError),
    Configuration(ConfigurationError),
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle { innovation, node } => write!(
                f,
                "connection {} feeds node {} after its value was consumed (cycle)",
                innovation, node
            ),
            Self::UnknownNode(node, innovation) => write!(
                f,
                "connection {} references nonexistant node {}",
                innovation, node
            ),
            Self::InvalidSource(node, innovation) => write!(
                f,
                "connection {} starts at output node {}",
                innovation, node
            ),
            Self::InvalidTarget(node, innovation) => write!(
                f,
                "connection {} ends at input node {}",
                innovation, node
            ),
            Self::DuplicateConnection(input, output) => write!(
                f,
                "duplicate connection between endpoints {} -> {}",
                input, output
            ),
            Self::DuplicateInnovation(innovation) => {
                write!(f, "duplicate connection with id {}", innovation)
            }
            Self::OverlappingRoles(node) => {
                write!(f, "node {} appears in more than one role", node)
            }
            Self::UnreachableConnection(innovation) => write!(
                f,
                "connection {} is unreachable from every input node",
                innovation
            ),
            Self::ValueConsumed(node) => write!(
                f,
                "node {} was written to after its value was consumed",
                node
            ),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey(key) => write!(f, "missing configuration key {}", key),
            Self::ProbabilityOutOfRange(key, value) => {
                write!(f, "probability {} = {} is outside [0, 1]", key, value)
            }
            Self::ProbabilitiesExceedOne(sum) => {
                write!(f, "mutation probabilities add up to {} > 1", sum)
            }
            Self::InvalidDeviation(key, value) => {
                write!(f, "deviation {} = {} is not a non-negative number", key, value)
            }
        }
    }
}

impl fmt::Display for DnaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural(e) => write!(f, "structural error: {}", e),
            Self::Configuration(e) => write!(f, "configuration error: {}", e),
        }
    }
}

impl Error for StructuralError {}
impl Error for ConfigurationError {}

impl Error for DnaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Structural(e) => Some(e),
            Self::Configuration(e) => Some(e),
        }
    }
}

impl From<StructuralError> for DnaError {
    fn from(e: StructuralError) -> DnaError {
        DnaError::Structural(e)
    }
}

impl From<ConfigurationError> for DnaError {
    fn from(e: ConfigurationError) -> DnaError {
        DnaError::Configuration(e)
    }
}

use crate::genomics::StructuralError;
use crate::NodeKey;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

/// A NodeType indicates the role of a node
/// in the genome's brain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Input nodes.
    Sensor,
    /// Hidden nodes.
    Neuron,
    /// Output nodes.
    Actuator,
}

impl NodeType {
    /// Whether a connection may start at a node of this type.
    pub fn is_source(self) -> bool {
        matches!(self, NodeType::Sensor | NodeType::Neuron)
    }

    /// Whether a connection may end at a node of this type.
    pub fn is_target(self) -> bool {
        matches!(self, NodeType::Neuron | NodeType::Actuator)
    }
}

/// The node keys of a genome, partitioned by role.
///
/// Input and output keys are fixed names chosen when a lineage
/// is founded; hidden keys are numeric strings allocated by
/// a [`History`] as connections are split.
///
/// [`History`]: crate::genomics::History
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Nodes {
    #[serde(rename = "in")]
    inputs: Vec<NodeKey>,
    #[serde(rename = "out")]
    outputs: Vec<NodeKey>,
    hidden: Vec<NodeKey>,
}

impl Nodes {
    /// Returns a new node partition.
    ///
    /// # Examples
    /// ```
    /// use evodna_neat::genomics::Nodes;
    ///
    /// let nodes = Nodes::new(["a", "b"], ["x"], Vec::<String>::new());
    /// assert_eq!(nodes.inputs(), ["a", "b"]);
    /// ```
    pub fn new<I, O, H>(inputs: I, outputs: O, hidden: H) -> Nodes
    where
        I: IntoIterator,
        I::Item: Into<NodeKey>,
        O: IntoIterator,
        O::Item: Into<NodeKey>,
        H: IntoIterator,
        H::Item: Into<NodeKey>,
    {
        Nodes {
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
            hidden: hidden.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the input node keys.
    pub fn inputs(&self) -> &[NodeKey] {
        &self.inputs
    }

    /// Returns the output node keys.
    pub fn outputs(&self) -> &[NodeKey] {
        &self.outputs
    }

    /// Returns the hidden node keys, in allocation order.
    pub fn hidden(&self) -> &[NodeKey] {
        &self.hidden
    }

    /// Returns the total number of nodes.
    pub fn len(&self) -> usize {
        self.inputs.len() + self.outputs.len() + self.hidden.len()
    }

    /// Returns `true` if there are no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over every node key with its role:
    /// inputs, then hidden nodes, then outputs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeType)> {
        let inputs = self.inputs.iter().map(|k| (k.as_str(), NodeType::Sensor));
        let hidden = self.hidden.iter().map(|k| (k.as_str(), NodeType::Neuron));
        let outputs = self.outputs.iter().map(|k| (k.as_str(), NodeType::Actuator));
        inputs.chain(hidden).chain(outputs)
    }

    /// Keys a connection may start at: inputs, then hidden nodes.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .chain(self.hidden.iter())
            .map(String::as_str)
    }

    /// Keys a connection may end at: hidden nodes, then outputs.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.hidden
            .iter()
            .chain(self.outputs.iter())
            .map(String::as_str)
    }

    /// Maps every key to its role.
    ///
    /// # Errors
    /// Returns [`StructuralError::OverlappingRoles`] if a key
    /// appears twice, in the same or different partitions.
    pub fn roles(&self) -> Result<HashMap<&str, NodeType, RandomState>, StructuralError> {
        let mut roles = HashMap::with_capacity_and_hasher(self.len(), RandomState::new());
        for (key, node_type) in self.iter() {
            if roles.insert(key, node_type).is_some() {
                return Err(StructuralError::OverlappingRoles(key.to_string()));
            }
        }
        Ok(roles)
    }

    pub(crate) fn push_hidden(&mut self, key: NodeKey) {
        self.hidden.push(key);
    }
}

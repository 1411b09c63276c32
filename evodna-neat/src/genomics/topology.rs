//! Ordering and validation of a genome's connection graph.
//!
//! All walks use explicit stacks, so genome depth is never
//! limited by the call stack.

use crate::genomics::{Gene, Nodes, StructuralError};

use ahash::RandomState;

use std::collections::{HashMap, HashSet};

/// Outgoing gene indices of every source node, in stored order.
pub(crate) type Outgoing<'a> = HashMap<&'a str, Vec<usize>, RandomState>;

pub(crate) fn outgoing(genes: &[Gene]) -> Outgoing<'_> {
    let mut outgoing: Outgoing = HashMap::default();
    for (i, gene) in genes.iter().enumerate() {
        outgoing.entry(gene.input()).or_default().push(i);
    }
    outgoing
}

/// A node whose outgoing genes are being walked.
struct Frame<'a> {
    edges: &'a [usize],
    next: usize,
    /// The gene the node was entered through.
    via: Option<usize>,
}

/// Marks `node` visited and returns its frame, unless it was
/// visited before or has no outgoing genes.
fn enter<'a>(
    outgoing: &'a Outgoing<'a>,
    visited: &mut HashSet<&'a str, RandomState>,
    node: &str,
    via: Option<usize>,
) -> Option<Frame<'a>> {
    let (key, edges) = outgoing.get_key_value(node)?;
    if !visited.insert(*key) {
        return None;
    }
    Some(Frame {
        edges: edges.as_slice(),
        next: 0,
        via,
    })
}

/// Orders genes so that every gene into a node precedes
/// every gene out of it.
///
/// Nodes are walked depth-first from each input in turn. A gene is
/// emitted once the subtree below its target is exhausted, and
/// the emission order is reversed at the end. Nodes already visited,
/// and nodes with no outgoing genes, are not entered again. Disabled
/// genes are walked like any other.
///
/// # Errors
/// Returns [`StructuralError::UnreachableConnection`] for the
/// first gene no input node leads to.
///
/// # Examples
/// ```
/// use evodna_neat::genomics::{sort, Gene, Nodes};
///
/// let nodes = Nodes::new(["a"], ["x"], ["0"]);
/// let genes = vec![Gene::new("g1", "0", "x", 1.0), Gene::new("g0", "a", "0", 1.0)];
/// let sorted = sort(&nodes, &genes).unwrap();
/// assert_eq!(sorted[0].innovation(), "g0");
/// assert_eq!(sorted[1].innovation(), "g1");
/// ```
pub fn sort(nodes: &Nodes, genes: &[Gene]) -> Result<Vec<Gene>, StructuralError> {
    let outgoing = outgoing(genes);
    let mut visited: HashSet<&str, RandomState> = HashSet::default();
    let mut emitted = Vec::with_capacity(genes.len());
    let mut stack: Vec<Frame> = Vec::new();

    for input in nodes.inputs() {
        stack.extend(enter(&outgoing, &mut visited, input, None));
        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.edges.len() {
                let edge = frame.edges[frame.next];
                frame.next += 1;
                match enter(&outgoing, &mut visited, genes[edge].output(), Some(edge)) {
                    Some(child) => stack.push(child),
                    None => emitted.push(edge),
                }
            } else {
                let via = frame.via;
                stack.pop();
                emitted.extend(via);
            }
        }
    }

    if emitted.len() < genes.len() {
        let reached: HashSet<usize, RandomState> = emitted.iter().copied().collect();
        if let Some(gene) = (0..genes.len()).find(|i| !reached.contains(i)) {
            return Err(StructuralError::UnreachableConnection(
                genes[gene].innovation().to_string(),
            ));
        }
    }

    Ok(emitted.into_iter().rev().map(|i| genes[i].clone()).collect())
}

/// Checks that every gene joins two known nodes of the right
/// roles, and that no endpoint pair or innovation id repeats.
pub fn check_structure(nodes: &Nodes, genes: &[Gene]) -> Result<(), StructuralError> {
    let roles = nodes.roles()?;
    let mut pairs: HashSet<(&str, &str), RandomState> = HashSet::default();
    let mut innovations: HashSet<&str, RandomState> = HashSet::default();

    for gene in genes {
        let unknown =
            |key: &str| StructuralError::UnknownNode(key.into(), gene.innovation().into());
        let source = roles.get(gene.input()).ok_or_else(|| unknown(gene.input()))?;
        let target = roles.get(gene.output()).ok_or_else(|| unknown(gene.output()))?;
        if !source.is_source() {
            return Err(StructuralError::InvalidSource(
                gene.input().into(),
                gene.innovation().into(),
            ));
        }
        if !target.is_target() {
            return Err(StructuralError::InvalidTarget(
                gene.output().into(),
                gene.innovation().into(),
            ));
        }
        if !pairs.insert((gene.input(), gene.output())) {
            return Err(StructuralError::DuplicateConnection(
                gene.input().into(),
                gene.output().into(),
            ));
        }
        if !innovations.insert(gene.innovation()) {
            return Err(StructuralError::DuplicateInnovation(
                gene.innovation().into(),
            ));
        }
    }
    Ok(())
}

/// Checks that no node is fed by a gene after its value has
/// been read by an earlier gene.
///
/// For genes in sorted order this holds exactly when the
/// graph is acyclic.
pub fn check_order(genes: &[Gene]) -> Result<(), StructuralError> {
    let mut consumed: HashSet<&str, RandomState> = HashSet::default();
    for gene in genes {
        consumed.insert(gene.input());
        if consumed.contains(gene.output()) {
            return Err(StructuralError::Cycle {
                innovation: gene.innovation().into(),
                node: gene.output().into(),
            });
        }
    }
    Ok(())
}

/// Returns `true` if `to` can be reached from `from` by following
/// genes, enabled or not. Every node reaches itself.
pub(crate) fn is_reachable(genes: &[Gene], outgoing: &Outgoing, from: &str, to: &str) -> bool {
    let mut visited: HashSet<&str, RandomState> = HashSet::default();
    let mut pending = vec![from];
    while let Some(node) = pending.pop() {
        if node == to {
            return true;
        }
        if !visited.insert(node) {
            continue;
        }
        if let Some(edges) = outgoing.get(node) {
            pending.extend(edges.iter().map(|&i| genes[i].output()));
        }
    }
    false
}

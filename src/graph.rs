//! Generic graph traversal utilities.
//!
//! Both functions operate over any node type: the edge relation is supplied
//! as a `neighbors` closure and node identity as an `id_of` closure. Identity
//! must be pointer-like (two structurally equal nodes are still distinct
//! graph nodes), which is what the deduplication sets and in-link counters
//! key on. Nothing here depends on the gradient engine.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Applies `f` to every node reachable from `root`, exactly once per node.
///
/// Visitation order is unspecified (a stack-based depth-first walk); use
/// [`topological_order`] when ordering matters.
pub fn gmap<N, K, FN, FI, F>(root: &N, neighbors: FN, id_of: FI, mut f: F)
where
    N: Clone,
    K: Eq + Hash,
    FN: Fn(&N) -> Vec<N>,
    FI: Fn(&N) -> K,
    F: FnMut(&N),
{
    let mut seen = HashSet::new();
    seen.insert(id_of(root));

    let mut frontier = vec![root.clone()];
    while let Some(node) = frontier.pop() {
        f(&node);

        for neighbor in neighbors(&node) {
            if seen.insert(id_of(&neighbor)) {
                frontier.push(neighbor);
            }
        }
    }
}

/// Constructs a topological order of the graph reachable from `root`.
///
/// The returned sequence starts at `root` and lists a node only after every
/// node that references it as a neighbor has been listed: all of a node's
/// children precede it.
///
/// Following the textbook construction (Kahn's algorithm over the neighbor
/// relation), we first walk the graph counting the in-links of each node,
/// then consume it from a frontier of nodes whose counters have dropped to
/// zero. Duplicate edges (a node listing the same neighbor twice) count
/// twice, so they are also decremented twice.
pub fn topological_order<N, K, FN, FI>(root: &N, neighbors: FN, id_of: FI) -> Vec<N>
where
    N: Clone,
    K: Eq + Hash,
    FN: Fn(&N) -> Vec<N>,
    FI: Fn(&N) -> K,
{
    let mut in_links: HashMap<K, usize> = HashMap::new();

    let mut frontier = vec![root.clone()];
    while let Some(node) = frontier.pop() {
        for neighbor in neighbors(&node) {
            let key = id_of(&neighbor);
            if !in_links.contains_key(&key) {
                frontier.push(neighbor.clone());
            }
            *in_links.entry(key).or_insert(0) += 1;
        }
    }

    let mut order = Vec::new();
    let mut frontier = vec![root.clone()];
    while let Some(node) = frontier.pop() {
        order.push(node.clone());

        for neighbor in neighbors(&node) {
            if let Some(count) = in_links.get_mut(&id_of(&neighbor)) {
                *count -= 1;
                if *count == 0 {
                    frontier.push(neighbor);
                }
            }
        }
    }

    log::trace!("topological_order: {} nodes", order.len());
    order
}

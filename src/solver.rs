// src/solver.rs - Cycle search over the peeled graph
// Tree location: ./src/solver.rs

//! Cycle search.
//!
//! After peeling to the 2-core, live edges are scanned in strictly
//! increasing index order while a spanning forest over the `2N` global node
//! ids is maintained as two flat arrays: `parent` (node id of the parent,
//! or none for a root) and `via` (the edge index linking a node to its
//! parent). An edge whose endpoints already share a root closes a cycle;
//! its length is the number of forest edges on the two root-paths up to
//! their meet point, plus one for the closing edge. The first closure of
//! exactly the target length wins, and the solution is read back from the
//! `via` edges along both paths. All walks are iterative; nothing recurses.
//!
//! # Version History
//! - 0.1.0: Initial forest-scan implementation with path reversal on union

use crate::graph::Graph;
use crate::params::{GraphParams, ParamsError, DEFAULT_MEMORY_CEILING};
use crate::sampler::EdgeSampler;
use thiserror::Error;

/// Sentinel for "no parent" / "no edge" in the forest arrays.
const NONE: u32 = u32::MAX;

/// Errors from a solve attempt.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    /// Parameters failed structural validation
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    /// No cycle of the target length exists in this graph instance.
    /// Expected and recoverable; retry with the next nonce.
    #[error("no cycle of length {diff} found")]
    NoCycleFound {
        /// The target cycle length that was searched for
        diff: u32,
    },

    /// The attempt would exceed the memory ceiling; nothing was allocated
    #[error("working set of {required} bytes exceeds ceiling of {ceiling} bytes")]
    ResourceExhausted {
        /// Estimated working set for the requested exponent
        required: u64,
        /// Configured ceiling
        ceiling: u64,
    },
}

/// Search one `(seed, nonce)` graph instance for a cycle of exactly
/// `params.diff` edges, under the default memory ceiling.
///
/// On success the cycle is returned as edge indices in closed-walk order.
/// `NoCycleFound` is the normal negative outcome; callers loop over nonces.
pub fn solve(seed: &[u8], nonce: u64, params: &GraphParams) -> Result<Vec<u32>, SolveError> {
    solve_with_ceiling(seed, nonce, params, DEFAULT_MEMORY_CEILING)
}

/// [`solve`] with an explicit working-set ceiling in bytes.
pub fn solve_with_ceiling(
    seed: &[u8],
    nonce: u64,
    params: &GraphParams,
    ceiling: u64,
) -> Result<Vec<u32>, SolveError> {
    params.validate()?;

    let required = params.working_set_bytes();
    if required > ceiling {
        return Err(SolveError::ResourceExhausted { required, ceiling });
    }

    let sampler = EdgeSampler::new(seed, nonce, params)?;
    let mut graph = Graph::generate(&sampler);

    // Slowdown knob: redundant full re-derivation passes. The final pass
    // feeds the search, so the work cannot be elided; the outcome is
    // identical for any extra_rounds value.
    for round in 1..params.extra_rounds {
        tracing::trace!(round, "redundant re-derivation pass");
        graph = Graph::generate(&sampler);
    }

    let peeled = graph.peel();
    tracing::debug!(
        nonce,
        n = params.n,
        diff = params.diff,
        peeled,
        "searching 2-core"
    );

    match scan_for_cycle(&graph, params.diff) {
        Some(cycle) => Ok(cycle),
        None => Err(SolveError::NoCycleFound { diff: params.diff }),
    }
}

/// Scan live edges in index order, growing the spanning forest and
/// reporting the first closure of exactly `diff` edges.
fn scan_for_cycle(graph: &Graph, diff: u32) -> Option<Vec<u32>> {
    let slots = graph.node_slots();
    let mut parent = vec![NONE; slots];
    let mut via = vec![NONE; slots];
    let mut path_u: Vec<u32> = Vec::new();
    let mut path_v: Vec<u32> = Vec::new();

    for (idx, _) in graph.live_edges() {
        let (gu, gv) = graph.endpoints(idx);
        root_path(&parent, gu, &mut path_u);
        root_path(&parent, gv, &mut path_v);

        if path_u[path_u.len() - 1] == path_v[path_v.len() - 1] {
            // Same tree: this edge closes a cycle. Align the two root-paths
            // from their tails and advance to the first shared node.
            let du = path_u.len() - 1;
            let dv = path_v.len() - 1;
            let shorter = du.min(dv);
            let mut iu = du - shorter;
            let mut iv = dv - shorter;
            while path_u[iu] != path_v[iv] {
                iu += 1;
                iv += 1;
            }

            let len = iu + iv + 1;
            if len == diff as usize {
                return Some(recover_cycle(&via, &path_u[..=iu], &path_v[..=iv], idx));
            }
            tracing::trace!(edge = idx, len, "off-length cycle closure");
        } else if path_u.len() <= path_v.len() {
            attach(&mut parent, &mut via, &path_u, gv, idx);
        } else {
            attach(&mut parent, &mut via, &path_v, gu, idx);
        }
    }

    None
}

/// Collect the parent chain from `start` to its root into `path`
/// (`path[0] = start`, last element = root).
fn root_path(parent: &[u32], start: u32, path: &mut Vec<u32>) {
    path.clear();
    path.push(start);
    let mut node = start;
    while parent[node as usize] != NONE {
        node = parent[node as usize];
        path.push(node);
    }
}

/// Union step: reverse the parent chain along `path` so its head becomes
/// the tree root, then hang the head under `other` via edge `edge_idx`.
fn attach(parent: &mut [u32], via: &mut [u32], path: &[u32], other: u32, edge_idx: u32) {
    // Descending order so each via slot is read before it is overwritten.
    for k in (0..path.len() - 1).rev() {
        parent[path[k + 1] as usize] = path[k];
        via[path[k + 1] as usize] = via[path[k] as usize];
    }
    parent[path[0] as usize] = other;
    via[path[0] as usize] = edge_idx;
}

/// Read the solution back from the forest: the `via` edges from `u` up to
/// the meet point, then down the other path to `v`, then the closing edge.
fn recover_cycle(via: &[u32], path_u: &[u32], path_v: &[u32], closing: u32) -> Vec<u32> {
    let mut cycle = Vec::with_capacity(path_u.len() + path_v.len() - 1);
    for &node in &path_u[..path_u.len() - 1] {
        cycle.push(via[node as usize]);
    }
    for &node in path_v[..path_v.len() - 1].iter().rev() {
        cycle.push(via[node as usize]);
    }
    cycle.push(closing);
    cycle
}

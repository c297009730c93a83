// src/verify.rs - Independent proof verification

//! Proof verification.
//!
//! Re-derives only the claimed edges (O(diff) work, no graph
//! materialization) and checks that they form one closed alternating walk
//! touching every node exactly twice. Input is attacker-controlled: every
//! rejection is a typed reason and nothing here can panic or allocate
//! beyond O(diff).

use std::collections::HashMap;

use thiserror::Error;

use crate::params::{GraphParams, ParamsError};
use crate::sampler::EdgeSampler;

/// Reasons a claimed proof is rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidProof {
    /// The accompanying parameters are structurally invalid
    #[error("invalid parameters: {0}")]
    BadParams(#[from] ParamsError),

    /// The claimed cycle does not have exactly `diff` edges
    #[error("cycle has {actual} edges, expected {expected}")]
    WrongLength {
        /// Required cycle length (`params.diff`)
        expected: u32,
        /// Number of edge indices submitted
        actual: usize,
    },

    /// An edge index lies outside `[0, N)`
    #[error("edge index {index} out of range (graph has {limit} edges)")]
    IndexOutOfRange {
        /// Offending index
        index: u32,
        /// Number of edges in the graph (`N`)
        limit: u64,
    },

    /// The same edge index appears more than once
    #[error("duplicate edge index {index}")]
    DuplicateIndex {
        /// The repeated index
        index: u32,
    },

    /// A node is touched by a number of cycle edges other than two
    #[error("node {node} touched by {degree} cycle edges, expected 2")]
    BranchingNode {
        /// Global node id
        node: u32,
        /// Number of claimed edges incident to it
        degree: u32,
    },

    /// The edges do not form one closed walk (disjoint sub-cycles)
    #[error("closed walk covers only {visited} of {expected} edges")]
    BrokenWalk {
        /// Edges reachable in one closed traversal
        visited: u32,
        /// Edges claimed
        expected: u32,
    },
}

/// Check a claimed cycle against the graph instance that `(seed, nonce,
/// params)` defines.
///
/// Checks run in a fixed order: parameter sanity, exact length, index range
/// and duplicates, then per-node degree and single-walk closure over the
/// re-derived edges. The cycle may be submitted in any order; closure is
/// established by tracing, not by trusting the submitted sequence.
pub fn verify(
    seed: &[u8],
    nonce: u64,
    params: &GraphParams,
    cycle: &[u32],
) -> Result<(), InvalidProof> {
    params.validate()?;

    if cycle.len() != params.diff as usize {
        return Err(InvalidProof::WrongLength {
            expected: params.diff,
            actual: cycle.len(),
        });
    }

    let limit = params.edge_count();
    for &index in cycle {
        if index as u64 >= limit {
            return Err(InvalidProof::IndexOutOfRange { index, limit });
        }
    }

    let mut sorted = cycle.to_vec();
    sorted.sort_unstable();
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] {
            return Err(InvalidProof::DuplicateIndex { index: pair[0] });
        }
    }

    let sampler = EdgeSampler::new(seed, nonce, params)?;
    let offset = limit as u32;

    // Incidence over the touched nodes only: global node id -> positions in
    // the claimed set, paired with the opposite endpoint.
    let mut incidence: HashMap<u32, Vec<(usize, u32)>> = HashMap::new();
    for (pos, &index) in cycle.iter().enumerate() {
        let (u, v) = sampler.edge(index as u64);
        let gv = offset + v;
        incidence.entry(u).or_default().push((pos, gv));
        incidence.entry(gv).or_default().push((pos, u));
    }

    for (&node, touches) in &incidence {
        if touches.len() != 2 {
            return Err(InvalidProof::BranchingNode {
                node,
                degree: touches.len() as u32,
            });
        }
    }

    // Every node has degree 2, so the edges decompose into disjoint closed
    // walks; accept only if a single traversal consumes all of them.
    let mut used = vec![false; cycle.len()];
    let (start, _) = sampler.edge(cycle[0] as u64);
    let mut current = start;
    let mut visited = 0u32;

    loop {
        let touches = &incidence[&current];
        let Some(&(pos, next)) = touches.iter().find(|&&(pos, _)| !used[pos]) else {
            break;
        };
        used[pos] = true;
        visited += 1;
        current = next;
    }

    if visited != params.diff || current != start {
        return Err(InvalidProof::BrokenWalk {
            visited,
            expected: params.diff,
        });
    }

    Ok(())
}

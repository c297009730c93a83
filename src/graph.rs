// src/graph.rs - Edge storage, adjacency index and 2-core peeling

//! Graph storage for one solve attempt.
//!
//! The graph is an index-addressed edge array plus a flat adjacency index
//! over the `2N` global node ids, rebuilt per attempt. No pointer-linked
//! structure: teardown is dropping the arrays. Edge indices are stable for
//! the lifetime of the attempt because they are what a proof refers to;
//! removal during peeling only flips a per-edge liveness flag.

use crate::sampler::EdgeSampler;

/// Bipartite multigraph of `N` edges over `2N` nodes.
///
/// U nodes occupy global ids `[0, N)` and V nodes `[N, 2N)`. Duplicate
/// edges are valid content, not errors.
pub struct Graph {
    /// Edge endpoints as generated, both in `[0, N)`.
    edges: Box<[(u32, u32)]>,
    /// Per-edge liveness; cleared by peeling, never re-set.
    live: Vec<bool>,
    /// Adjacency offsets per global node id, length `2N + 1`.
    adj_offsets: Vec<usize>,
    /// Edge indices, two entries per edge, grouped by incident node.
    adj_edges: Vec<u32>,
    /// Current degree (live incident edges) per global node id.
    degree: Vec<u32>,
    /// Number of edges (`N`), also the V-partition offset.
    edge_count: u32,
}

impl Graph {
    /// Generate the full `N`-edge graph for the sampler's `(seed, nonce)`.
    pub fn generate(sampler: &EdgeSampler) -> Self {
        let n = sampler.edge_count();
        let mut edges = Vec::with_capacity(n as usize);
        for i in 0..n {
            edges.push(sampler.edge(i));
        }
        Self::from_edges(edges, n as u32)
    }

    /// Build a graph from an explicit edge list.
    ///
    /// `edge_count` is the partition size `N`; every endpoint must lie in
    /// `[0, N)`. Intended for tests and diagnostics; solving always goes
    /// through [`Graph::generate`].
    pub fn from_edges(edges: Vec<(u32, u32)>, edge_count: u32) -> Self {
        let node_slots = 2 * edge_count as usize;
        let mut degree = vec![0u32; node_slots];

        for &(u, v) in &edges {
            debug_assert!(u < edge_count && v < edge_count);
            degree[u as usize] += 1;
            degree[edge_count as usize + v as usize] += 1;
        }

        // CSR build: prefix-sum the counts, then fill with a cursor pass.
        let mut adj_offsets = Vec::with_capacity(node_slots + 1);
        let mut running = 0usize;
        adj_offsets.push(0);
        for &d in &degree {
            running += d as usize;
            adj_offsets.push(running);
        }

        let mut cursor: Vec<usize> = adj_offsets[..node_slots].to_vec();
        let mut adj_edges = vec![0u32; 2 * edges.len()];
        for (idx, &(u, v)) in edges.iter().enumerate() {
            let gu = u as usize;
            let gv = edge_count as usize + v as usize;
            adj_edges[cursor[gu]] = idx as u32;
            cursor[gu] += 1;
            adj_edges[cursor[gv]] = idx as u32;
            cursor[gv] += 1;
        }

        let live = vec![true; edges.len()];
        Self {
            edges: edges.into_boxed_slice(),
            live,
            adj_offsets,
            adj_edges,
            degree,
            edge_count,
        }
    }

    /// Partition size `N`.
    pub fn edge_count(&self) -> u32 {
        self.edge_count
    }

    /// Number of global node ids (`2N`).
    pub fn node_slots(&self) -> usize {
        2 * self.edge_count as usize
    }

    /// Raw endpoints of an edge, both in `[0, N)`.
    pub fn edge(&self, index: u32) -> (u32, u32) {
        self.edges[index as usize]
    }

    /// Endpoints of an edge in the global node-id space: `(u, N + v)`.
    pub fn endpoints(&self, index: u32) -> (u32, u32) {
        let (u, v) = self.edges[index as usize];
        (u, self.edge_count + v)
    }

    /// Whether an edge survived peeling so far.
    pub fn is_live(&self, index: u32) -> bool {
        self.live[index as usize]
    }

    /// Number of live edges.
    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|&&l| l).count()
    }

    /// Current degree of a global node id, counting live edges only.
    pub fn degree(&self, node: u32) -> u32 {
        self.degree[node as usize]
    }

    /// Indices of the live edges incident to a global node id.
    pub fn neighbors(&self, node: u32) -> impl Iterator<Item = u32> + '_ {
        let lo = self.adj_offsets[node as usize];
        let hi = self.adj_offsets[node as usize + 1];
        self.adj_edges[lo..hi]
            .iter()
            .copied()
            .filter(move |&e| self.live[e as usize])
    }

    /// Live edges in increasing index order, with raw endpoints.
    pub fn live_edges(&self) -> impl Iterator<Item = (u32, (u32, u32))> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(move |&(idx, _)| self.live[idx])
            .map(|(idx, &e)| (idx as u32, e))
    }

    /// Peel the graph down to its 2-core.
    ///
    /// Iteratively removes edges incident to a node of degree below 2 until
    /// a fixpoint. No edge on a cycle is ever removed: cycle membership
    /// requires degree 2 at both endpoints throughout peeling. Returns the
    /// number of edges removed.
    pub fn peel(&mut self) -> usize {
        let mut stack: Vec<u32> = (0..self.node_slots())
            .filter(|&node| self.degree[node] == 1)
            .map(|node| node as u32)
            .collect();
        let mut peeled = 0usize;

        while let Some(node) = stack.pop() {
            let lo = self.adj_offsets[node as usize];
            let hi = self.adj_offsets[node as usize + 1];
            for k in lo..hi {
                let e = self.adj_edges[k] as usize;
                if !self.live[e] {
                    continue;
                }
                self.live[e] = false;
                peeled += 1;

                let (u, v) = self.edges[e];
                let gu = u as usize;
                let gv = self.edge_count as usize + v as usize;
                self.degree[gu] -= 1;
                self.degree[gv] -= 1;

                let other = if gu == node as usize { gv } else { gu };
                if self.degree[other] == 1 {
                    stack.push(other as u32);
                }
            }
        }

        tracing::debug!(
            peeled,
            remaining = self.edges.len() - peeled,
            "peeled to 2-core"
        );
        peeled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GraphParams;

    /// 4-cycle u0-v0-u1-v1 plus a two-edge tail hanging off v2.
    fn cycle_with_tail() -> Graph {
        let edges = vec![
            (0, 0), // e0: cycle
            (1, 0), // e1: cycle
            (1, 1), // e2: cycle
            (0, 1), // e3: cycle
            (2, 2), // e4: tail
            (3, 2), // e5: tail
        ];
        Graph::from_edges(edges, 8)
    }

    #[test]
    fn test_adjacency_and_degrees() {
        let graph = cycle_with_tail();
        assert_eq!(graph.degree(0), 2); // u0
        assert_eq!(graph.degree(1), 2); // u1
        assert_eq!(graph.degree(8), 2); // v0
        assert_eq!(graph.degree(10), 2); // v2
        assert_eq!(graph.degree(2), 1); // u2

        let incident: Vec<u32> = graph.neighbors(0).collect();
        assert_eq!(incident, vec![0, 3]);
    }

    #[test]
    fn test_peel_removes_tail_keeps_cycle() {
        let mut graph = cycle_with_tail();
        let peeled = graph.peel();

        assert_eq!(peeled, 2);
        assert_eq!(graph.live_count(), 4);
        for e in 0..4 {
            assert!(graph.is_live(e));
        }
        assert!(!graph.is_live(4));
        assert!(!graph.is_live(5));
        assert_eq!(graph.degree(10), 0);
    }

    #[test]
    fn test_peel_clears_acyclic_graph() {
        // A path u0-v0-u1-v1-u2: no cycle, everything peels away.
        let edges = vec![(0, 0), (1, 0), (1, 1), (2, 1)];
        let mut graph = Graph::from_edges(edges, 4);
        let peeled = graph.peel();
        assert_eq!(peeled, 4);
        assert_eq!(graph.live_count(), 0);
    }

    #[test]
    fn test_peel_keeps_parallel_pair() {
        // Two parallel edges form a 2-cycle; both endpoints have degree 2.
        let edges = vec![(0, 0), (0, 0), (1, 1)];
        let mut graph = Graph::from_edges(edges, 4);
        graph.peel();
        assert!(graph.is_live(0));
        assert!(graph.is_live(1));
        assert!(!graph.is_live(2));
    }

    #[test]
    fn test_live_edges_in_index_order() {
        let mut graph = cycle_with_tail();
        graph.peel();
        let indices: Vec<u32> = graph.live_edges().map(|(idx, _)| idx).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_generate_matches_sampler() {
        let params = GraphParams::new(6, 4);
        let sampler = crate::sampler::EdgeSampler::new(b"gen", 3, &params).unwrap();
        let graph = Graph::generate(&sampler);

        assert_eq!(graph.edge_count() as u64, params.edge_count());
        for i in 0..params.edge_count() {
            assert_eq!(graph.edge(i as u32), sampler.edge(i));
        }
    }
}

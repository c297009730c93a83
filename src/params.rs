// src/params.rs - Difficulty parameters and structural validation

//! Difficulty parameters for graph generation and cycle search.
//!
//! [`GraphParams`] bundles the three knobs a caller can turn: the graph size
//! exponent `n` (the graph has `N = 2^n` edges and `2N` nodes), the target
//! cycle length `diff`, and the optional `extra_rounds` slowdown multiplier.
//! The controller stores and validates the knobs; it does not predict
//! solve probabilities.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest supported graph exponent. A graph needs at least `2^1` edges to
/// ever hold a 2-cycle (two parallel edges).
pub const MIN_GRAPH_EXPONENT: u32 = 1;

/// Largest supported graph exponent. Node ids are `u32` over a global space
/// of `2N` slots, so `N + v` must stay below `2^32`.
pub const MAX_GRAPH_EXPONENT: u32 = 31;

/// Default ceiling on the solver working set, in bytes.
///
/// Solving allocates O(N); requests that would exceed this ceiling fail fast
/// with `ResourceExhausted` before any allocation happens. Verification is
/// O(diff) and is never subject to the ceiling.
pub const DEFAULT_MEMORY_CEILING: u64 = 8 * 1024 * 1024 * 1024;

/// Errors for structurally invalid difficulty parameters.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsError {
    /// Graph exponent below the supported minimum
    #[error("graph exponent {n} below minimum {min}")]
    ExponentTooSmall {
        /// Requested exponent
        n: u32,
        /// Supported minimum
        min: u32,
    },

    /// Graph exponent above the supported maximum
    #[error("graph exponent {n} above maximum {max}")]
    ExponentTooLarge {
        /// Requested exponent
        n: u32,
        /// Supported maximum
        max: u32,
    },

    /// Cycle length is odd; cycles in a bipartite graph have even length
    #[error("cycle length {diff} is odd; bipartite cycles have even length")]
    OddCycleLength {
        /// Requested cycle length
        diff: u32,
    },

    /// Cycle length outside the supported range
    #[error("cycle length {diff} outside [2, {max}]")]
    CycleLengthOutOfRange {
        /// Requested cycle length
        diff: u32,
        /// Largest cycle the graph can hold (`N`)
        max: u64,
    },

    /// Slowdown multiplier must be at least one
    #[error("extra_rounds must be at least 1")]
    ZeroExtraRounds,
}

/// Difficulty parameters for one graph instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphParams {
    /// Graph size exponent: the graph has `2^n` edges and `2 * 2^n` nodes.
    pub n: u32,
    /// Target cycle length. Must be even and in `[2, 2^n]`.
    pub diff: u32,
    /// Slowdown multiplier. Values above 1 repeat the full edge derivation
    /// that many times, inflating wall-clock cost without changing the
    /// outcome or proof validity.
    #[serde(default = "default_extra_rounds")]
    pub extra_rounds: u32,
}

fn default_extra_rounds() -> u32 {
    1
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            n: 20,
            diff: 42,
            extra_rounds: 1,
        }
    }
}

impl GraphParams {
    /// Create parameters with the default single derivation round.
    pub fn new(n: u32, diff: u32) -> Self {
        Self {
            n,
            diff,
            extra_rounds: 1,
        }
    }

    /// Number of edges in the graph (`N = 2^n`).
    pub fn edge_count(&self) -> u64 {
        1u64 << self.n
    }

    /// Number of nodes in the graph (`2N`, split evenly into the U and V
    /// partitions).
    pub fn node_count(&self) -> u64 {
        2 * self.edge_count()
    }

    /// Check the structural bounds on `n`, `diff` and `extra_rounds`.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.n < MIN_GRAPH_EXPONENT {
            return Err(ParamsError::ExponentTooSmall {
                n: self.n,
                min: MIN_GRAPH_EXPONENT,
            });
        }
        if self.n > MAX_GRAPH_EXPONENT {
            return Err(ParamsError::ExponentTooLarge {
                n: self.n,
                max: MAX_GRAPH_EXPONENT,
            });
        }
        if self.diff % 2 != 0 {
            return Err(ParamsError::OddCycleLength { diff: self.diff });
        }
        if self.diff < 2 || self.diff as u64 > self.edge_count() {
            return Err(ParamsError::CycleLengthOutOfRange {
                diff: self.diff,
                max: self.edge_count(),
            });
        }
        if self.extra_rounds == 0 {
            return Err(ParamsError::ZeroExtraRounds);
        }
        Ok(())
    }

    /// Estimated peak working set of one solve attempt, in bytes.
    ///
    /// Covers the edge array, the per-edge liveness mask, the adjacency
    /// index, per-node degrees and the spanning-forest arrays. Scales
    /// linearly with `N`: raising `n` by one doubles the estimate.
    pub fn working_set_bytes(&self) -> u64 {
        let edges = self.edge_count();
        let nodes = self.node_count();
        // edges (8B each) + liveness (1B per edge) + adjacency offsets
        // (8B per node) + adjacency entries (4B, two per edge) + degrees
        // (4B per node) + forest parent/via (4B each per node)
        edges * 8 + edges + nodes * 8 + edges * 2 * 4 + nodes * 4 + nodes * 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_params() {
        assert!(GraphParams::new(10, 30).validate().is_ok());
        assert!(GraphParams::new(1, 2).validate().is_ok());
        assert!(GraphParams::default().validate().is_ok());
    }

    #[test]
    fn test_odd_cycle_rejected() {
        let params = GraphParams::new(10, 31);
        assert_eq!(
            params.validate(),
            Err(ParamsError::OddCycleLength { diff: 31 })
        );
    }

    #[test]
    fn test_cycle_length_bounds() {
        // diff = 0 is below the minimum
        assert!(matches!(
            GraphParams::new(10, 0).validate(),
            Err(ParamsError::CycleLengthOutOfRange { .. })
        ));

        // diff larger than N = 2^4
        assert!(matches!(
            GraphParams::new(4, 18).validate(),
            Err(ParamsError::CycleLengthOutOfRange { .. })
        ));

        // diff = N exactly is allowed
        assert!(GraphParams::new(4, 16).validate().is_ok());
    }

    #[test]
    fn test_exponent_bounds() {
        assert!(matches!(
            GraphParams::new(0, 2).validate(),
            Err(ParamsError::ExponentTooSmall { .. })
        ));
        assert!(matches!(
            GraphParams::new(32, 42).validate(),
            Err(ParamsError::ExponentTooLarge { .. })
        ));
    }

    #[test]
    fn test_zero_extra_rounds_rejected() {
        let params = GraphParams {
            n: 10,
            diff: 30,
            extra_rounds: 0,
        };
        assert_eq!(params.validate(), Err(ParamsError::ZeroExtraRounds));
    }

    #[test]
    fn test_working_set_doubles_with_exponent() {
        for n in MIN_GRAPH_EXPONENT..16 {
            let small = GraphParams::new(n, 2).working_set_bytes();
            let large = GraphParams::new(n + 1, 2).working_set_bytes();
            assert!(large >= 2 * small);
        }
    }

    #[test]
    fn test_serde_round_trip_with_default_rounds() {
        let json = r#"{"n":12,"diff":20}"#;
        let params: GraphParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.n, 12);
        assert_eq!(params.diff, 20);
        assert_eq!(params.extra_rounds, 1);

        let full = GraphParams {
            n: 14,
            diff: 8,
            extra_rounds: 3,
        };
        let encoded = serde_json::to_string(&full).unwrap();
        let decoded: GraphParams = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, full);
    }
}

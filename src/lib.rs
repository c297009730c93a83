// src/lib.rs - Main library file for the bicyclo proof-of-work core

//! bicyclo - bipartite-graph cycle proof-of-work
//!
//! A CPU-favoring proof-of-work primitive: from `(seed, nonce, params)` a
//! sparse bipartite multigraph of `N = 2^n` edges over `2N` nodes is derived
//! deterministically, and the work is finding a cycle of exactly
//! `params.diff` edges in it. Solving is memory/latency-bound over an O(N)
//! working set; verifying re-derives only the `diff` claimed edges and is
//! cheap for any validator.
//!
//! Independent attempts (distinct nonces) share nothing and are
//! embarrassingly parallel; one attempt is a single-threaded synchronous
//! computation with no external side effects, so abandoning it is just
//! dropping it.
//!
//! # Edge derivation
//!
//! Interoperating implementations must agree on the exact edge mapping.
//! This crate keys SipHash-2-4 with the first 16 bytes of
//! `BLAKE2b-256(seed || nonce_le)` and derives the edge at index `i` from a
//! single hash `h = siphash24(i)`: the U endpoint is `h & (N-1)` and the V
//! endpoint is `(h >> 32) & (N-1)`, with V addressed globally as `N + v`.
//!
//! # Example
//!
//! ```
//! use bicyclo::{GraphParams, Miner};
//!
//! let params = GraphParams::new(8, 4);
//! let mut miner = Miner::new(&b"example-header"[..], params)?;
//! let proof = miner.solve_range(0, 2_000)?;
//! assert!(proof.verify().is_ok());
//! # Ok::<(), bicyclo::BicycloError>(())
//! ```

#![warn(missing_docs)]

pub mod graph;
pub mod params;
pub mod proof;
pub mod sampler;
pub mod solver;
pub mod verify;

// Re-export the working surface for convenience
pub use graph::Graph;
pub use params::{
    GraphParams, ParamsError, DEFAULT_MEMORY_CEILING, MAX_GRAPH_EXPONENT, MIN_GRAPH_EXPONENT,
};
pub use proof::{DecodeError, Proof, MAX_SEED_LEN};
pub use sampler::EdgeSampler;
pub use solver::{solve, solve_with_ceiling, SolveError};
pub use verify::{verify, InvalidProof};

use thiserror::Error;

/// Main error type for bicyclo
#[derive(Error, Debug)]
pub enum BicycloError {
    /// Solve attempt failed
    #[error("solve error: {0}")]
    Solve(#[from] SolveError),

    /// A claimed proof was rejected
    #[error("invalid proof: {0}")]
    InvalidProof(#[from] InvalidProof),

    /// A proof byte string failed to decode
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Parameters failed structural validation
    #[error("parameter error: {0}")]
    Params(#[from] ParamsError),

    /// Logging initialization failed
    #[error("logging error: {0}")]
    Logging(String),
}

/// Result type alias for bicyclo operations
pub type Result<T> = std::result::Result<T, BicycloError>;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Application description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialize tracing for the host process.
///
/// Respects `RUST_LOG` via the default env filter. Optional; the library
/// works without it, this just surfaces solver statistics.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .map_err(|e| BicycloError::Logging(e.to_string()))?;

    tracing::info!("{} v{} - {}", NAME, VERSION, DESCRIPTION);
    Ok(())
}

/// Mining context for one seed: sweeps nonces and packages proofs.
#[derive(Debug, Clone)]
pub struct Miner {
    seed: Vec<u8>,
    params: GraphParams,
    nonce: u64,
}

impl Miner {
    /// Create a miner for `seed` under `params`. Validates the parameters
    /// up front so every later attempt can only fail with `NoCycleFound`
    /// or `ResourceExhausted`.
    pub fn new(
        seed: impl Into<Vec<u8>>,
        params: GraphParams,
    ) -> std::result::Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self {
            seed: seed.into(),
            params,
            nonce: 0,
        })
    }

    /// Set the nonce for the next [`Miner::solve`] call.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    /// Current nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The difficulty parameters this miner runs under.
    pub fn params(&self) -> &GraphParams {
        &self.params
    }

    /// The seed this miner works on.
    pub fn seed(&self) -> &[u8] {
        &self.seed
    }

    /// Attempt the current nonce.
    pub fn solve(&self) -> std::result::Result<Vec<u32>, SolveError> {
        solve(&self.seed, self.nonce, &self.params)
    }

    /// Check a claimed cycle against the current nonce.
    pub fn verify(&self, cycle: &[u32]) -> std::result::Result<(), InvalidProof> {
        verify(&self.seed, self.nonce, &self.params, cycle)
    }

    /// Sweep `count` nonces starting at `start_nonce` and return the first
    /// proof found. `NoCycleFound` per nonce is normal and the sweep moves
    /// on; any other failure aborts. On success the miner's nonce is left
    /// at the solving one.
    pub fn solve_range(
        &mut self,
        start_nonce: u64,
        count: u64,
    ) -> std::result::Result<Proof, SolveError> {
        for nonce in start_nonce..start_nonce.saturating_add(count) {
            match solve(&self.seed, nonce, &self.params) {
                Ok(cycle) => {
                    self.nonce = nonce;
                    return Ok(Proof::new(self.seed.clone(), nonce, self.params, cycle));
                }
                Err(SolveError::NoCycleFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(SolveError::NoCycleFound {
            diff: self.params.diff,
        })
    }
}

// src/proof.rs - Self-contained proof artifact and byte codec

//! The proof artifact.
//!
//! A [`Proof`] is the only thing that survives a solve: seed, nonce,
//! parameters and the found cycle, self-contained and independently
//! re-checkable. The byte encoding is fixed-width little-endian and
//! round-trips exactly:
//!
//! ```text
//! seed_len: u32 | seed bytes | nonce: u64 | n: u32 | diff: u32 | cycle: diff x u32
//! ```
//!
//! `extra_rounds` is a solver-side slowdown knob with no bearing on proof
//! validity and is not encoded; decoded proofs carry the default of 1.

use std::fmt;

use thiserror::Error;

use crate::params::{GraphParams, ParamsError};
use crate::verify::{verify, InvalidProof};

/// Largest accepted seed length in bytes. Seeds are expected to be header
/// digests, far below this; the cap keeps hostile length prefixes from
/// driving allocation.
pub const MAX_SEED_LEN: usize = 1024;

/// Errors from decoding a proof byte string.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended before a field was complete
    #[error("truncated proof: needed {needed} more bytes")]
    Truncated {
        /// Bytes missing for the next field
        needed: usize,
    },

    /// The seed length prefix exceeds the accepted cap
    #[error("seed length {len} exceeds maximum {max}")]
    SeedTooLong {
        /// Claimed seed length
        len: usize,
        /// Accepted maximum
        max: usize,
    },

    /// Bytes remained after the final cycle entry
    #[error("{count} trailing bytes after proof")]
    TrailingBytes {
        /// Number of unconsumed bytes
        count: usize,
    },

    /// The embedded parameters are structurally invalid
    #[error("invalid embedded parameters: {0}")]
    BadParams(#[from] ParamsError),

    /// A cycle entry is not a valid edge index for the embedded parameters
    #[error("cycle index {index} out of range (graph has {limit} edges)")]
    CycleIndexOutOfRange {
        /// Offending index
        index: u32,
        /// Number of edges in the graph (`N`)
        limit: u64,
    },
}

/// A completed unit of work: `(seed, nonce, params, cycle)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// Opaque round identifier the graph was derived from
    pub seed: Vec<u8>,
    /// Nonce that produced the solved graph instance
    pub nonce: u64,
    /// Difficulty parameters the cycle is claimed under
    pub params: GraphParams,
    /// Edge indices of the cycle, `params.diff` of them
    pub cycle: Vec<u32>,
}

impl Proof {
    /// Assemble a proof from its parts.
    pub fn new(seed: impl Into<Vec<u8>>, nonce: u64, params: GraphParams, cycle: Vec<u32>) -> Self {
        Self {
            seed: seed.into(),
            nonce,
            params,
            cycle,
        }
    }

    /// Re-check this proof from scratch.
    pub fn verify(&self) -> Result<(), InvalidProof> {
        verify(&self.seed, self.nonce, &self.params, &self.cycle)
    }

    /// Serialize to the fixed-width byte layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(4 + self.seed.len() + 8 + 4 + 4 + 4 * self.cycle.len());
        out.extend_from_slice(&(self.seed.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.seed);
        out.extend_from_slice(&self.nonce.to_le_bytes());
        out.extend_from_slice(&self.params.n.to_le_bytes());
        out.extend_from_slice(&self.params.diff.to_le_bytes());
        for &index in &self.cycle {
            out.extend_from_slice(&index.to_le_bytes());
        }
        out
    }

    /// Parse the fixed-width byte layout back into a proof.
    ///
    /// Strict: truncation, trailing bytes, an oversized seed prefix,
    /// invalid embedded parameters and out-of-range cycle entries are all
    /// rejected. Decoding does not verify the cycle; call
    /// [`Proof::verify`] for that.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut rest = bytes;

        let seed_len = u32::from_le_bytes(take::<4>(&mut rest)?) as usize;
        if seed_len > MAX_SEED_LEN {
            return Err(DecodeError::SeedTooLong {
                len: seed_len,
                max: MAX_SEED_LEN,
            });
        }
        if rest.len() < seed_len {
            return Err(DecodeError::Truncated {
                needed: seed_len - rest.len(),
            });
        }
        let (seed, tail) = rest.split_at(seed_len);
        let seed = seed.to_vec();
        rest = tail;

        let nonce = u64::from_le_bytes(take::<8>(&mut rest)?);
        let n = u32::from_le_bytes(take::<4>(&mut rest)?);
        let diff = u32::from_le_bytes(take::<4>(&mut rest)?);

        let params = GraphParams::new(n, diff);
        params.validate()?;

        let limit = params.edge_count();
        let mut cycle = Vec::with_capacity(diff as usize);
        for _ in 0..diff {
            let index = u32::from_le_bytes(take::<4>(&mut rest)?);
            if index as u64 >= limit {
                return Err(DecodeError::CycleIndexOutOfRange { index, limit });
            }
            cycle.push(index);
        }

        if !rest.is_empty() {
            return Err(DecodeError::TrailingBytes { count: rest.len() });
        }

        Ok(Self {
            seed,
            nonce,
            params,
            cycle,
        })
    }
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "proof {{ seed: {}, nonce: {}, n: {}, diff: {} }}",
            hex::encode(&self.seed),
            self.nonce,
            self.params.n,
            self.params.diff
        )
    }
}

/// Split a fixed-width field off the front of `rest`.
fn take<const W: usize>(rest: &mut &[u8]) -> Result<[u8; W], DecodeError> {
    if rest.len() < W {
        return Err(DecodeError::Truncated {
            needed: W - rest.len(),
        });
    }
    let (head, tail) = rest.split_at(W);
    *rest = tail;
    Ok(head.try_into().expect("split_at returns exactly W bytes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_proof() -> Proof {
        Proof::new(
            b"round-7".to_vec(),
            42,
            GraphParams::new(8, 4),
            vec![3, 17, 120, 255],
        )
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let proof = sample_proof();
        let bytes = proof.encode();
        let decoded = Proof::decode(&bytes).unwrap();
        assert_eq!(decoded, proof);

        // Byte-for-byte: re-encoding reproduces the input exactly.
        assert_eq!(decoded.encode(), bytes);
    }

    #[test]
    fn test_encoded_layout() {
        let proof = sample_proof();
        let bytes = proof.encode();
        // 4 (len) + 7 (seed) + 8 (nonce) + 4 (n) + 4 (diff) + 16 (cycle)
        assert_eq!(bytes.len(), 43);
        assert_eq!(&bytes[0..4], &7u32.to_le_bytes());
        assert_eq!(&bytes[4..11], b"round-7");
    }

    #[test]
    fn test_decode_rejects_truncation() {
        let bytes = sample_proof().encode();
        for cut in 0..bytes.len() {
            assert!(matches!(
                Proof::decode(&bytes[..cut]),
                Err(DecodeError::Truncated { .. })
            ));
        }
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut bytes = sample_proof().encode();
        bytes.push(0);
        assert_eq!(
            Proof::decode(&bytes),
            Err(DecodeError::TrailingBytes { count: 1 })
        );
    }

    #[test]
    fn test_decode_rejects_oversized_seed() {
        let mut bytes = sample_proof().encode();
        bytes[0..4].copy_from_slice(&(MAX_SEED_LEN as u32 + 1).to_le_bytes());
        assert!(matches!(
            Proof::decode(&bytes),
            Err(DecodeError::SeedTooLong { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_bad_embedded_params() {
        let mut proof = sample_proof();
        proof.params.diff = 5;
        proof.cycle = vec![1, 2, 3, 4, 5];
        assert!(matches!(
            Proof::decode(&proof.encode()),
            Err(DecodeError::BadParams(_))
        ));
    }

    #[test]
    fn test_decode_rejects_out_of_range_cycle_index() {
        let mut proof = sample_proof();
        proof.cycle[2] = 256; // N = 2^8
        assert_eq!(
            Proof::decode(&proof.encode()),
            Err(DecodeError::CycleIndexOutOfRange {
                index: 256,
                limit: 256
            })
        );
    }

    #[test]
    fn test_decoded_extra_rounds_defaults_to_one() {
        let slowed = Proof {
            params: GraphParams {
                extra_rounds: 4,
                ..GraphParams::new(8, 4)
            },
            ..sample_proof()
        };
        let decoded = Proof::decode(&slowed.encode()).unwrap();
        assert_eq!(decoded.params.extra_rounds, 1);
    }

    #[test]
    fn test_display_renders_seed_as_hex() {
        let text = sample_proof().to_string();
        assert!(text.contains(&hex::encode(b"round-7")));
        assert!(text.contains("nonce: 42"));
    }
}

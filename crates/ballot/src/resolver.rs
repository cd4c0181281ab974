// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::VoteOption;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("Blob of {len} bytes is shorter than the required {required}")]
    BlobTooShort { len: usize, required: usize },
    #[error("Resolver unavailable: {0}")]
    Unavailable(String),
}

/// Reveals the option inside an opaque ballot.
///
/// A production implementation decrypts inside a trusted execution environment
/// or through a threshold decryption committee. Implementations must be safe to
/// call from worker threads and must not block on async work.
pub trait OptionResolver: Send + Sync {
    fn resolve(&self, blob: &[u8]) -> Result<VoteOption, ResolverError>;
}

/// Deterministic stand-in: the first two bytes read as a big-endian `u16`,
/// reduced modulo 3, map 0/1/2 to Against/InFavor/Abstain.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModuloOptionResolver;

impl OptionResolver for ModuloOptionResolver {
    fn resolve(&self, blob: &[u8]) -> Result<VoteOption, ResolverError> {
        let [hi, lo, ..] = blob else {
            return Err(ResolverError::BlobTooShort {
                len: blob.len(),
                required: 2,
            });
        };
        match u16::from_be_bytes([*hi, *lo]) % 3 {
            0 => Ok(VoteOption::Against),
            1 => Ok(VoteOption::InFavor),
            _ => Ok(VoteOption::Abstain),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsealedBid {
    pub bidder: Option<String>,
    pub amount: u64,
}

/// Opens a sealed bid.
pub trait BidResolver: Send + Sync {
    fn unseal(&self, sealed: &[u8]) -> Result<UnsealedBid, ResolverError>;
}

/// Deterministic stand-in: the first eight bytes are a big-endian `u64` amount,
/// any remaining bytes are the bidder reference (hex encoded with `0x`).
#[derive(Clone, Copy, Debug, Default)]
pub struct PrefixBidResolver;

impl BidResolver for PrefixBidResolver {
    fn unseal(&self, sealed: &[u8]) -> Result<UnsealedBid, ResolverError> {
        if sealed.len() < 8 {
            return Err(ResolverError::BlobTooShort {
                len: sealed.len(),
                required: 8,
            });
        }
        let (amount, rest) = sealed.split_at(8);
        let mut amount_bytes = [0u8; 8];
        amount_bytes.copy_from_slice(amount);
        Ok(UnsealedBid {
            bidder: (!rest.is_empty()).then(|| format!("0x{}", hex::encode(rest))),
            amount: u64::from_be_bytes(amount_bytes),
        })
    }
}

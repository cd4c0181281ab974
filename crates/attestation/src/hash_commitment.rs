// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{AttestationError, AttestationProvider, ProofDigest, Statement};
use sha3::{Digest, Keccak256};

/// Keccak-256 over the canonical statement bytes.
///
/// This is a commitment, not a proof of correct execution: anyone holding the
/// same statement reproduces the digest, but nothing here shows the tally was
/// computed from the declared ballots.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashCommitmentProvider;

impl HashCommitmentProvider {
    pub const NAME: &'static str = "keccak256-commitment";
}

impl AttestationProvider for HashCommitmentProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn attest(&self, statement: &Statement<'_>) -> Result<ProofDigest, AttestationError> {
        let hash = Keccak256::digest(statement.canonical_bytes()?);
        ProofDigest::truncate_from(hash.as_slice())
    }
}

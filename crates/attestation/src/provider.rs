// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{ProofDigest, Statement};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttestationError {
    #[error("Attestation backend unavailable: {0}")]
    Unavailable(String),
    #[error("Digest must be {expected} bytes, got {actual}")]
    DigestLength { expected: usize, actual: usize },
    #[error("Malformed proof: {0}")]
    MalformedProof(String),
    #[error("Statement field of {0} bytes exceeds the u32 length prefix")]
    FieldTooLong(usize),
}

/// Produces the proof that binds a statement to the pipeline run.
///
/// The hash commitment only shows *what* was committed. A backend that runs the
/// aggregation inside an enclave or signs with a threshold key implements this
/// same trait and is chosen when the pipeline is constructed.
pub trait AttestationProvider: Send + Sync {
    /// Stable identifier recorded next to every proof.
    fn name(&self) -> &str;

    fn attest(&self, statement: &Statement<'_>) -> Result<ProofDigest, AttestationError>;

    fn verify(
        &self,
        statement: &Statement<'_>,
        digest: &ProofDigest,
    ) -> Result<bool, AttestationError> {
        Ok(self.attest(statement)? == *digest)
    }
}

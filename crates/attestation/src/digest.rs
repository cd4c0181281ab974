// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::AttestationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const PROOF_LEN: usize = 32;

/// Fixed-length proof bytes. Displays and serializes as `0x`-prefixed hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProofDigest([u8; PROOF_LEN]);

impl ProofDigest {
    pub fn new(bytes: [u8; PROOF_LEN]) -> Self {
        Self(bytes)
    }

    /// Keeps the first `PROOF_LEN` bytes of a longer hash output.
    pub fn truncate_from(bytes: &[u8]) -> Result<Self, AttestationError> {
        let head = bytes
            .get(..PROOF_LEN)
            .ok_or(AttestationError::DigestLength {
                expected: PROOF_LEN,
                actual: bytes.len(),
            })?;
        let mut out = [0u8; PROOF_LEN];
        out.copy_from_slice(head);
        Ok(Self(out))
    }

    pub fn from_hex(s: &str) -> Result<Self, AttestationError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(stripped).map_err(|e| AttestationError::MalformedProof(e.to_string()))?;
        if bytes.len() != PROOF_LEN {
            return Err(AttestationError::DigestLength {
                expected: PROOF_LEN,
                actual: bytes.len(),
            });
        }
        Self::truncate_from(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PROOF_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for ProofDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ProofDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofDigest({})", self.to_hex())
    }
}

impl Serialize for ProofDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ProofDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ProofDigest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

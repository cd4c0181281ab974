// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;
use tally_attestation::{AttestationProvider, HashCommitmentProvider};
use tally_config::AttestationBackend;

pub fn attestation_provider(backend: &AttestationBackend) -> Arc<dyn AttestationProvider> {
    match backend {
        AttestationBackend::HashCommitment => Arc::new(HashCommitmentProvider),
    }
}

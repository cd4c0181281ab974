// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{AttestationError, AttestationProvider, ProofDigest, Statement};
use serde::{Deserialize, Serialize};
use tally_ballot::{AuctionTally, ProjectId, ProposalId, VoteTally};
use tracing::debug;

/// A digest together with the statement it commits to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationProof {
    pub digest: ProofDigest,
    pub proposal_id: ProposalId,
    pub tally: VoteTally,
    pub provider: String,
}

impl AttestationProof {
    pub fn statement(&self) -> Statement<'_> {
        Statement::Tally {
            proposal_id: &self.proposal_id,
            tally: &self.tally,
        }
    }

    /// Checks the digest against an independently constructed provider.
    pub fn verify_with(&self, provider: &dyn AttestationProvider) -> Result<bool, AttestationError> {
        provider.verify(&self.statement(), &self.digest)
    }
}

pub fn attest_tally(
    provider: &dyn AttestationProvider,
    proposal_id: &ProposalId,
    tally: &VoteTally,
) -> Result<AttestationProof, AttestationError> {
    let digest = provider.attest(&Statement::Tally { proposal_id, tally })?;
    debug!(%proposal_id, %digest, provider = provider.name(), "Attested tally");
    Ok(AttestationProof {
        digest,
        proposal_id: proposal_id.clone(),
        tally: *tally,
        provider: provider.name().to_string(),
    })
}

pub fn attest_auction(
    provider: &dyn AttestationProvider,
    project_id: &ProjectId,
    auction: &AuctionTally,
) -> Result<ProofDigest, AttestationError> {
    let digest = provider.attest(&Statement::Auction {
        project_id,
        auction,
    })?;
    debug!(%project_id, %digest, provider = provider.name(), "Attested auction");
    Ok(digest)
}

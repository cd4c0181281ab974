// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{AuctionOutcome, PipelineResult};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use tally_attestation::ProofDigest;
use tally_ballot::{ProjectId, ProposalId};
use tally_data::{DataStore, SharedStore};
use tracing::debug;

/// Where a result was written and the Keccak-256 of its stored encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageReference {
    pub key: String,
    pub content_hash: String,
}

/// Small record stored next to each vote result for cheap lookups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResultMetadata {
    pub content_hash: String,
    pub computed_at: u64,
    pub total_votes: u64,
    pub proof: ProofDigest,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionResultMetadata {
    pub content_hash: String,
    pub computed_at: u64,
    pub winner_reference: Option<String>,
    pub winning_amount: u64,
    pub proof: ProofDigest,
}

pub fn vote_result_key(proposal_id: &ProposalId) -> String {
    format!("_tally:vote:{proposal_id}")
}

pub fn auction_result_key(project_id: &ProjectId) -> String {
    format!("_tally:auction:{project_id}")
}

fn metadata_key(key: &str) -> String {
    format!("{key}:meta")
}

fn content_hash<T: Serialize>(value: &T) -> Result<String> {
    let bytes = bincode::serialize(value)?;
    Ok(format!("0x{}", hex::encode(Keccak256::digest(&bytes))))
}

/// Typed access to stored results on top of any `DataStore`. Metadata is
/// written first so a stored result always has its metadata beside it.
pub struct ResultRepository<S: DataStore> {
    store: SharedStore<S>,
}

impl<S: DataStore> ResultRepository<S> {
    pub fn new(store: SharedStore<S>) -> Self {
        Self { store }
    }

    pub async fn set_vote_result(&mut self, result: &PipelineResult) -> Result<StorageReference> {
        let key = vote_result_key(&result.proposal_id);
        let content_hash = content_hash(result)?;
        let metadata = VoteResultMetadata {
            content_hash: content_hash.clone(),
            computed_at: result.computed_at,
            total_votes: result.tally.total(),
            proof: result.proof.digest,
        };
        let meta_key = metadata_key(&key);
        self.store
            .insert(&meta_key, &metadata)
            .await
            .map_err(|e| anyhow!("Could not store metadata under {meta_key}: {e}"))?;

        self.store
            .insert(&key, result)
            .await
            .map_err(|e| anyhow!("Could not store vote result under {key}: {e}"))?;

        debug!(%key, %content_hash, "Stored vote result");
        Ok(StorageReference { key, content_hash })
    }

    pub async fn get_vote_result(&self, proposal_id: &ProposalId) -> Result<Option<PipelineResult>> {
        let key = vote_result_key(proposal_id);
        self.store
            .get(&key)
            .await
            .map_err(|e| anyhow!("Could not read vote result under {key}: {e}"))
    }

    pub async fn get_vote_metadata(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<Option<VoteResultMetadata>> {
        let key = metadata_key(&vote_result_key(proposal_id));
        self.store
            .get(&key)
            .await
            .map_err(|e| anyhow!("Could not read metadata under {key}: {e}"))
    }

    pub async fn set_auction_result(&mut self, outcome: &AuctionOutcome) -> Result<StorageReference> {
        let key = auction_result_key(&outcome.project_id);
        let content_hash = content_hash(outcome)?;
        let metadata = AuctionResultMetadata {
            content_hash: content_hash.clone(),
            computed_at: outcome.computed_at,
            winner_reference: outcome.winner_reference.clone(),
            winning_amount: outcome.winning_amount,
            proof: outcome.proof,
        };
        let meta_key = metadata_key(&key);
        self.store
            .insert(&meta_key, &metadata)
            .await
            .map_err(|e| anyhow!("Could not store metadata under {meta_key}: {e}"))?;

        self.store
            .insert(&key, outcome)
            .await
            .map_err(|e| anyhow!("Could not store auction result under {key}: {e}"))?;

        debug!(%key, %content_hash, "Stored auction result");
        Ok(StorageReference { key, content_hash })
    }

    pub async fn get_auction_result(&self, project_id: &ProjectId) -> Result<Option<AuctionOutcome>> {
        let key = auction_result_key(project_id);
        self.store
            .get(&key)
            .await
            .map_err(|e| anyhow!("Could not read auction result under {key}: {e}"))
    }

    pub async fn get_auction_metadata(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<AuctionResultMetadata>> {
        let key = metadata_key(&auction_result_key(project_id));
        self.store
            .get(&key)
            .await
            .map_err(|e| anyhow!("Could not read metadata under {key}: {e}"))
    }
}

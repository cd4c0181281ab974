// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tally_ballot::{AuctionTally, ProjectId, ProposalId, RawBid, RawVote, Timeline, VoteTally};

/// Where raw votes come from, typically a voting contract.
#[async_trait]
pub trait VoteSource: Send + Sync {
    async fn fetch(&self, proposal_id: &ProposalId) -> Result<Vec<RawVote>>;
}

#[async_trait]
pub trait BidSource: Send + Sync {
    async fn fetch(&self, project_id: &ProjectId) -> Result<Vec<RawBid>>;
}

/// Handle returned by the insight service. Stored with the result, never interpreted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReference {
    pub summary: String,
    pub confidence: f64,
    pub generated_at: u64,
}

/// Best-effort analysis of a finished tally. Only ever sees aggregates.
#[async_trait]
pub trait InsightService: Send + Sync {
    async fn summarize_votes(
        &self,
        proposal_id: &ProposalId,
        tally: &VoteTally,
        timeline: &Timeline,
    ) -> Result<InsightReference>;

    async fn summarize_auction(
        &self,
        project_id: &ProjectId,
        auction: &AuctionTally,
    ) -> Result<InsightReference>;
}

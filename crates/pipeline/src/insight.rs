// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{InsightReference, InsightService};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tally_ballot::{
    AuctionTally, Clock, ProjectId, ProposalId, SystemClock, Timeline, VoteOption, VoteTally,
};

const VOTE_CONFIDENCE: f64 = 0.92;
const AUCTION_CONFIDENCE: f64 = 0.88;

/// Deterministic summaries built from templates, used where no language model
/// backend is wired in.
#[derive(Clone)]
pub struct TemplateInsightService {
    clock: Arc<dyn Clock>,
}

impl TemplateInsightService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for TemplateInsightService {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl InsightService for TemplateInsightService {
    async fn summarize_votes(
        &self,
        proposal_id: &ProposalId,
        tally: &VoteTally,
        timeline: &Timeline,
    ) -> Result<InsightReference> {
        let in_favor = tally.count(VoteOption::InFavor);
        let against = tally.count(VoteOption::Against);
        let support = if in_favor > against { "strong" } else { "limited" };

        let mut summary = format!(
            "Proposal {proposal_id} received {} votes ({in_favor} in favor, {against} against, {} abstaining). Support appears {support}.",
            tally.total(),
            tally.count(VoteOption::Abstain),
        );
        if let Some((start, count)) = timeline.peak() {
            summary.push_str(&format!(
                " Participation peaked with {count} votes in the window starting at {start}."
            ));
        }

        Ok(InsightReference {
            summary,
            confidence: if tally.is_empty() { 0.0 } else { VOTE_CONFIDENCE },
            generated_at: self.clock.now_millis(),
        })
    }

    async fn summarize_auction(
        &self,
        project_id: &ProjectId,
        auction: &AuctionTally,
    ) -> Result<InsightReference> {
        let (summary, confidence) = match &auction.winner {
            Some(winner) => {
                let reserve = (u128::from(winner.amount) * 4 / 5) as u64;
                (
                    format!(
                        "Project {project_id} received {} bids. The winning bid of {} came from {}. Recommend a reserve price of {reserve} for future rounds.",
                        auction.bid_count, winner.amount, winner.bidder
                    ),
                    AUCTION_CONFIDENCE,
                )
            }
            None => (format!("Project {project_id} received no valid bids."), 0.0),
        };

        Ok(InsightReference {
            summary,
            confidence,
            generated_at: self.clock.now_millis(),
        })
    }
}

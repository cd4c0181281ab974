// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    AuctionOutcome, BidPipeline, BidSource, InsightService, PipelineError, PipelineResult,
    ResultCache, ResultRepository, VotePipeline, VoteSource,
};
use anyhow::Result;
use std::sync::Arc;
use tally_ballot::{ProjectId, ProposalId};
use tally_config::PipelineConfig;
use tally_data::{DataStore, SharedStore};
use tracing::{instrument, warn};

/// Serves results per proposal or project, computing each at most once at a
/// time and reusing it until a refresh is asked for.
pub struct ResultService<S: DataStore> {
    votes: Arc<VotePipeline<S>>,
    bids: Arc<BidPipeline<S>>,
    vote_source: Arc<dyn VoteSource>,
    bid_source: Arc<dyn BidSource>,
    store: SharedStore<S>,
    vote_results: ResultCache<ProposalId, PipelineResult>,
    auction_results: ResultCache<ProjectId, AuctionOutcome>,
}

impl<S: DataStore> ResultService<S> {
    pub fn new(
        votes: Arc<VotePipeline<S>>,
        bids: Arc<BidPipeline<S>>,
        vote_source: Arc<dyn VoteSource>,
        bid_source: Arc<dyn BidSource>,
        store: SharedStore<S>,
        cache_capacity: Option<usize>,
    ) -> Self {
        Self {
            votes,
            bids,
            vote_source,
            bid_source,
            store,
            vote_results: ResultCache::new(cache_capacity),
            auction_results: ResultCache::new(cache_capacity),
        }
    }

    pub fn from_config(
        config: &PipelineConfig,
        store: SharedStore<S>,
        vote_source: Arc<dyn VoteSource>,
        bid_source: Arc<dyn BidSource>,
        insight: Arc<dyn InsightService>,
    ) -> Self {
        let votes = VotePipeline::from_config(config, store.clone(), insight.clone());
        let bids = BidPipeline::from_config(config, store.clone(), insight);
        Self::new(
            Arc::new(votes),
            Arc::new(bids),
            vote_source,
            bid_source,
            store,
            config.cache_capacity(),
        )
    }

    pub fn vote_pipeline(&self) -> &Arc<VotePipeline<S>> {
        &self.votes
    }

    pub fn bid_pipeline(&self) -> &Arc<BidPipeline<S>> {
        &self.bids
    }

    /// A source that cannot be read counts as having no votes.
    #[instrument(skip(self))]
    pub async fn proposal_results(
        &self,
        proposal_id: &ProposalId,
        refresh: bool,
    ) -> Result<Arc<PipelineResult>, PipelineError> {
        self.vote_results
            .get_or_compute(proposal_id.clone(), refresh, move || async move {
                let raw_votes = self
                    .vote_source
                    .fetch(proposal_id)
                    .await
                    .unwrap_or_else(|e| {
                        warn!("Could not fetch votes, treating as none: {e:#}");
                        vec![]
                    });
                self.votes.process(&raw_votes, proposal_id).await
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn auction_results(
        &self,
        project_id: &ProjectId,
        refresh: bool,
    ) -> Result<Arc<AuctionOutcome>, PipelineError> {
        self.auction_results
            .get_or_compute(project_id.clone(), refresh, move || async move {
                let raw_bids = self.bid_source.fetch(project_id).await.unwrap_or_else(|e| {
                    warn!("Could not fetch bids, treating as none: {e:#}");
                    vec![]
                });
                self.bids.process(&raw_bids, project_id).await
            })
            .await
    }

    /// Last persisted result, bypassing the cache.
    pub async fn stored_proposal_results(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<Option<PipelineResult>> {
        ResultRepository::new(self.store.clone())
            .get_vote_result(proposal_id)
            .await
    }

    pub async fn stored_auction_results(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<AuctionOutcome>> {
        ResultRepository::new(self.store.clone())
            .get_auction_result(project_id)
            .await
    }

    /// Recomputes the stored proof and compares it with the one on record.
    pub async fn verify_stored_proposal(&self, proposal_id: &ProposalId) -> Result<Option<bool>> {
        match self.stored_proposal_results(proposal_id).await? {
            Some(result) => Ok(Some(result.proof.verify_with(self.votes.attestor())?)),
            None => Ok(None),
        }
    }

    pub async fn verify_stored_auction(&self, project_id: &ProjectId) -> Result<Option<bool>> {
        match self.stored_auction_results(project_id).await? {
            Some(outcome) => Ok(Some(outcome.verify_with(self.bids.attestor())?)),
            None => Ok(None),
        }
    }
}

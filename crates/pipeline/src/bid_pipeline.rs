// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    attestation_provider, InsightReference, InsightService, PipelineError, PipelineStage,
    PipelineWarning, ResultRepository, StageTracker, StorageReference,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tally_aggregator::select_winner;
use tally_attestation::{
    attest_auction, AttestationError, AttestationProvider, HashCommitmentProvider, ProofDigest,
    Statement,
};
use tally_ballot::{
    AuctionTally, BidDecoder, BidResolver, Clock, PrefixBidResolver, ProjectId, RawBid,
    SystemClock, WinningBid,
};
use tally_config::PipelineConfig;
use tally_data::{DataStore, SharedStore};
use tracing::{error, info, instrument, warn};

/// Everything a bid run produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionOutcome {
    pub project_id: ProjectId,
    pub winner_reference: Option<String>,
    pub winner_index: Option<usize>,
    pub winning_amount: u64,
    pub bid_count: u64,
    pub decode_failures: u64,
    pub proof: ProofDigest,
    pub provider: String,
    pub insight_reference: Option<InsightReference>,
    pub storage_reference: Option<StorageReference>,
    pub warnings: Vec<PipelineWarning>,
    pub computed_at: u64,
}

impl AuctionOutcome {
    pub fn auction(&self) -> AuctionTally {
        AuctionTally {
            winner: self.winner_reference.clone().map(|bidder| WinningBid {
                bidder,
                amount: self.winning_amount,
                index: self.winner_index.unwrap_or_default(),
            }),
            bid_count: self.bid_count,
        }
    }

    pub fn verify_with(&self, provider: &dyn AttestationProvider) -> Result<bool, AttestationError> {
        let auction = self.auction();
        provider.verify(
            &Statement::Auction {
                project_id: &self.project_id,
                auction: &auction,
            },
            &self.proof,
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuctionComputation {
    pub auction: AuctionTally,
    pub proof: ProofDigest,
    pub decode_failures: usize,
}

/// Unseal bids, pick the winner and attest it.
pub struct BidPipeline<S: DataStore> {
    resolver: Arc<dyn BidResolver>,
    clock: Arc<dyn Clock>,
    attestor: Arc<dyn AttestationProvider>,
    insight: Arc<dyn InsightService>,
    store: SharedStore<S>,
}

impl<S: DataStore> BidPipeline<S> {
    pub fn new(store: SharedStore<S>, insight: Arc<dyn InsightService>) -> Self {
        Self {
            resolver: Arc::new(PrefixBidResolver),
            clock: Arc::new(SystemClock),
            attestor: Arc::new(HashCommitmentProvider),
            insight,
            store,
        }
    }

    pub fn from_config(
        config: &PipelineConfig,
        store: SharedStore<S>,
        insight: Arc<dyn InsightService>,
    ) -> Self {
        Self::new(store, insight).with_attestation(attestation_provider(&config.attestation))
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn BidResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_attestation(mut self, attestor: Arc<dyn AttestationProvider>) -> Self {
        self.attestor = attestor;
        self
    }

    pub fn attestor(&self) -> &dyn AttestationProvider {
        self.attestor.as_ref()
    }

    pub fn compute(
        &self,
        project_id: &ProjectId,
        raw_bids: &[RawBid],
    ) -> Result<AuctionComputation, PipelineError> {
        self.compute_tracked(&mut StageTracker::start(), project_id, raw_bids)
    }

    fn compute_tracked(
        &self,
        stages: &mut StageTracker,
        project_id: &ProjectId,
        raw_bids: &[RawBid],
    ) -> Result<AuctionComputation, PipelineError> {
        let report = BidDecoder::new(self.resolver.clone()).decode(raw_bids);
        if report.failure_count() > 0 {
            warn!(
                %project_id,
                failed = report.failure_count(),
                received = raw_bids.len(),
                "Some bids could not be decoded and were excluded"
            );
        }

        stages.advance();
        let auction = select_winner(&report.decoded)?;

        stages.advance();
        let proof = attest_auction(self.attestor.as_ref(), project_id, &auction)?;

        Ok(AuctionComputation {
            auction,
            proof,
            decode_failures: report.failure_count(),
        })
    }

    #[instrument(name = "process_bids", skip_all, fields(%project_id, received = raw_bids.len()))]
    pub async fn process(
        &self,
        raw_bids: &[RawBid],
        project_id: &ProjectId,
    ) -> Result<AuctionOutcome, PipelineError> {
        let mut stages = StageTracker::start();
        let computation = self.compute_tracked(&mut stages, project_id, raw_bids)?;
        let computed_at = self.clock.now_millis();

        stages.advance();
        let mut warnings = vec![];
        let insight_reference = match self
            .insight
            .summarize_auction(project_id, &computation.auction)
            .await
        {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!("Insight enrichment failed: {e:#}");
                warnings.push(PipelineWarning::EnrichmentFailed {
                    reason: format!("{e:#}"),
                });
                None
            }
        };

        let auction = computation.auction;
        let mut outcome = AuctionOutcome {
            project_id: project_id.clone(),
            winner_reference: auction.winner_reference().map(str::to_string),
            winner_index: auction.winner.as_ref().map(|w| w.index),
            winning_amount: auction.winning_amount(),
            bid_count: auction.bid_count,
            decode_failures: computation.decode_failures as u64,
            proof: computation.proof,
            provider: self.attestor.name().to_string(),
            insight_reference,
            storage_reference: None,
            warnings,
            computed_at,
        };

        stages.advance();
        let mut repository = ResultRepository::new(self.store.clone());
        match repository.set_auction_result(&outcome).await {
            Ok(reference) => outcome.storage_reference = Some(reference),
            Err(e) => {
                error!("Persisting auction result failed: {e:#}");
                outcome.warnings.push(PipelineWarning::PersistenceFailed {
                    reason: format!("{e:#}"),
                });
            }
        }

        if stages.advance() == PipelineStage::Done {
            info!(
                bid_count = outcome.bid_count,
                winning_amount = outcome.winning_amount,
                proof = %outcome.proof,
                warnings = outcome.warnings.len(),
                "Processed bids"
            );
        }
        Ok(outcome)
    }
}

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
use tally_aggregator::Aggregator;
use tally_attestation::{
    attest_tally, AttestationProof, AttestationProvider, HashCommitmentProvider,
};
use tally_ballot::{
    Clock, ModuloOptionResolver, OptionResolver, ProposalId, RawVote, SystemClock, Timeline,
    VoteDecoder, VoteTally, DEFAULT_WINDOW_MILLIS,
};
use tally_config::PipelineConfig;
use tally_data::{DataStore, SharedStore};
use tracing::{error, info, instrument, warn};

/// Everything a vote run produced. `tally`, `timeline` and `proof` are fixed
/// before enrichment or persistence start and are never changed by them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub proposal_id: ProposalId,
    pub tally: VoteTally,
    pub timeline: Timeline,
    pub proof: AttestationProof,
    pub decode_failures: u64,
    pub inferred_timestamps: u64,
    pub insight_reference: Option<InsightReference>,
    pub storage_reference: Option<StorageReference>,
    pub warnings: Vec<PipelineWarning>,
    pub computed_at: u64,
}

/// Output of the synchronous part of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct TallyComputation {
    pub tally: VoteTally,
    pub timeline: Timeline,
    pub proof: AttestationProof,
    pub decode_failures: usize,
    pub inferred_timestamps: usize,
}

/// Decode, aggregate, attest, then enrich and persist on a best-effort basis.
pub struct VotePipeline<S: DataStore> {
    resolver: Arc<dyn OptionResolver>,
    clock: Arc<dyn Clock>,
    aggregator: Aggregator,
    window_millis: u64,
    attestor: Arc<dyn AttestationProvider>,
    insight: Arc<dyn InsightService>,
    store: SharedStore<S>,
}

impl<S: DataStore> VotePipeline<S> {
    pub fn new(store: SharedStore<S>, insight: Arc<dyn InsightService>) -> Self {
        Self {
            resolver: Arc::new(ModuloOptionResolver),
            clock: Arc::new(SystemClock),
            aggregator: Aggregator::sequential(),
            window_millis: DEFAULT_WINDOW_MILLIS,
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
        Self::new(store, insight)
            .with_aggregator(Aggregator::new(config.parallel(), Some(config.batch_size())))
            .with_window(config.window_millis())
            .with_attestation(attestation_provider(&config.attestation))
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn OptionResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn with_window(mut self, window_millis: u64) -> Self {
        self.window_millis = window_millis;
        self
    }

    pub fn with_attestation(mut self, attestor: Arc<dyn AttestationProvider>) -> Self {
        self.attestor = attestor;
        self
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn window_millis(&self) -> u64 {
        self.window_millis
    }

    pub fn attestor(&self) -> &dyn AttestationProvider {
        self.attestor.as_ref()
    }

    /// Decodes, aggregates and attests. Touches no collaborator other than the
    /// option resolver and the clock.
    pub fn compute(
        &self,
        proposal_id: &ProposalId,
        raw_votes: &[RawVote],
    ) -> Result<TallyComputation, PipelineError> {
        self.compute_tracked(&mut StageTracker::start(), proposal_id, raw_votes)
    }

    fn compute_tracked(
        &self,
        stages: &mut StageTracker,
        proposal_id: &ProposalId,
        raw_votes: &[RawVote],
    ) -> Result<TallyComputation, PipelineError> {
        let report = VoteDecoder::new(self.resolver.clone(), self.clock.clone()).decode(raw_votes);
        if report.failure_count() > 0 {
            warn!(
                %proposal_id,
                failed = report.failure_count(),
                received = raw_votes.len(),
                "Some votes could not be decoded and were excluded"
            );
        }

        stages.advance();
        let tally = self.aggregator.tally(&report.decoded)?;
        let timeline = self.aggregator.timeline(&report.decoded, self.window_millis)?;

        stages.advance();
        let proof = attest_tally(self.attestor.as_ref(), proposal_id, &tally)?;

        Ok(TallyComputation {
            tally,
            timeline,
            proof,
            decode_failures: report.failure_count(),
            inferred_timestamps: report.inferred_timestamps,
        })
    }

    #[instrument(name = "process_votes", skip_all, fields(%proposal_id, received = raw_votes.len()))]
    pub async fn process(
        &self,
        raw_votes: &[RawVote],
        proposal_id: &ProposalId,
    ) -> Result<PipelineResult, PipelineError> {
        let mut stages = StageTracker::start();
        let computation = self.compute_tracked(&mut stages, proposal_id, raw_votes)?;
        let computed_at = self.clock.now_millis();

        stages.advance();
        let mut warnings = vec![];
        let insight_reference = match self
            .insight
            .summarize_votes(proposal_id, &computation.tally, &computation.timeline)
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

        let mut result = PipelineResult {
            proposal_id: proposal_id.clone(),
            tally: computation.tally,
            timeline: computation.timeline,
            proof: computation.proof,
            decode_failures: computation.decode_failures as u64,
            inferred_timestamps: computation.inferred_timestamps as u64,
            insight_reference,
            storage_reference: None,
            warnings,
            computed_at,
        };

        stages.advance();
        let mut repository = ResultRepository::new(self.store.clone());
        match repository.set_vote_result(&result).await {
            Ok(reference) => result.storage_reference = Some(reference),
            Err(e) => {
                error!("Persisting vote result failed: {e:#}");
                result.warnings.push(PipelineWarning::PersistenceFailed {
                    reason: format!("{e:#}"),
                });
            }
        }

        if stages.advance() == PipelineStage::Done {
            info!(
                total = result.tally.total(),
                decode_failures = result.decode_failures,
                proof = %result.proof.digest,
                warnings = result.warnings.len(),
                "Processed votes"
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TemplateInsightService;
    use anyhow::Result;
    use tally_ballot::{ManualClock, VoteOption};
    use tally_data::InMemoryStore;

    fn pipeline(now: u64) -> VotePipeline<InMemoryStore> {
        let clock = Arc::new(ManualClock::new(now));
        VotePipeline::new(
            SharedStore::new(InMemoryStore::new()),
            Arc::new(TemplateInsightService::new(clock.clone())),
        )
        .with_clock(clock)
    }

    #[test]
    fn compute_counts_decoded_votes() -> Result<()> {
        let votes = vec![
            RawVote::structured("inFavor", Some(1_000)),
            RawVote::structured("against", None),
            RawVote::text("{\"option\":\"maybe\"}"),
        ];
        let out = pipeline(5_000).compute(&ProposalId::from(1), &votes)?;

        assert_eq!(out.tally.count(VoteOption::InFavor), 1);
        assert_eq!(out.tally.count(VoteOption::Against), 1);
        assert_eq!(out.tally.total(), 2);
        assert_eq!(out.decode_failures, 1);
        assert_eq!(out.inferred_timestamps, 1);
        assert_eq!(out.timeline.count_at(0), 2);
        assert!(out.proof.verify_with(&HashCommitmentProvider)?);
        Ok(())
    }

    #[test]
    fn window_applies_to_timeline() -> Result<()> {
        let votes = vec![
            RawVote::structured("abstain", Some(0)),
            RawVote::structured("abstain", Some(60_000)),
        ];
        let out = pipeline(0)
            .with_window(60_000)
            .compute(&ProposalId::from(1), &votes)?;
        assert_eq!(out.timeline.len(), 2);
        Ok(())
    }

    #[test]
    fn zero_window_is_fatal() {
        let err = pipeline(0)
            .with_window(0)
            .compute(&ProposalId::from(1), &[])
            .unwrap_err();
        assert!(matches!(err, PipelineError::Aggregate(_)));
    }

    #[tokio::test]
    async fn process_persists_and_enriches() -> Result<()> {
        let result = pipeline(42)
            .process(&[RawVote::structured("inFavor", Some(1))], &ProposalId::from(9))
            .await?;
        assert!(result.warnings.is_empty());
        assert!(result.insight_reference.is_some());
        assert_eq!(result.computed_at, 42);
        let reference = result.storage_reference.as_ref().unwrap();
        assert_eq!(reference.key, "_tally:vote:9");
        assert!(reference.content_hash.starts_with("0x"));
        Ok(())
    }
}

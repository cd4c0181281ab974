// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use std::sync::Arc;
use tally_attestation::HashCommitmentProvider;
use tally_ballot::{ManualClock, ProjectId, ProposalId, RawVote, VoteOption};
use tally_data::{SharedStore, SledStore};
use tally_pipeline::{
    BidPipeline, PipelineError, PipelineWarning, ResultRepository, TemplateInsightService,
    VotePipeline,
};
use tally_test_helpers::{
    init_tracing, memory_store, mixed_votes, sealed_bid, template_insight, vote, vote_pipeline,
    FailingInsightService, FailingStore, FlakyAttestationProvider, RejectingStore,
};

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(10_000))
}

#[tokio::test]
async fn mixed_votes_produce_expected_tally() -> Result<()> {
    init_tracing();
    let pipeline = vote_pipeline(memory_store(), &clock());
    let result = pipeline
        .process(&mixed_votes(), &ProposalId::from(42))
        .await?;

    assert_eq!(result.tally.count(VoteOption::InFavor), 2);
    assert_eq!(result.tally.count(VoteOption::Against), 1);
    assert_eq!(result.tally.count(VoteOption::Abstain), 1);
    assert_eq!(result.tally.total(), 4);
    assert_eq!(result.decode_failures, 0);
    assert_eq!(result.inferred_timestamps, 0);
    assert_eq!(result.timeline.count_at(0), 4);
    assert!(result.proof.verify_with(&HashCommitmentProvider)?);
    assert!(result.warnings.is_empty());
    Ok(())
}

#[tokio::test]
async fn permutations_share_tally_and_proof() -> Result<()> {
    let pipeline = vote_pipeline(memory_store(), &clock());
    let id = ProposalId::from(7);
    let votes = mixed_votes();
    let baseline = pipeline.compute(&id, &votes)?;

    let mut reversed = votes.clone();
    reversed.reverse();
    let mut rotated = votes.clone();
    rotated.rotate_left(2);

    for permutation in [reversed, rotated] {
        let other = pipeline.compute(&id, &permutation)?;
        assert_eq!(other.tally, baseline.tally);
        assert_eq!(other.proof.digest, baseline.proof.digest);
        assert_eq!(other.timeline, baseline.timeline);
    }
    Ok(())
}

#[tokio::test]
async fn empty_input_completes_with_zero_tally() -> Result<()> {
    let pipeline = vote_pipeline(memory_store(), &clock());
    let id = ProposalId::from(1);
    let first = pipeline.process(&[], &id).await?;
    let second = pipeline.process(&[], &id).await?;

    assert_eq!(first.tally.total(), 0);
    assert!(first.timeline.is_empty());
    assert_eq!(first.proof.digest, second.proof.digest);
    assert!(first.proof.verify_with(&HashCommitmentProvider)?);
    assert!(first.storage_reference.is_some());
    Ok(())
}

#[tokio::test]
async fn malformed_entries_are_excluded_from_total() -> Result<()> {
    let mut votes = mixed_votes();
    votes.push(RawVote::text("not json"));
    votes.push(RawVote::structured("maybe", Some(1)));
    votes.push(RawVote::text("[1,2]"));

    let result = vote_pipeline(memory_store(), &clock())
        .process(&votes, &ProposalId::from(3))
        .await?;
    assert_eq!(result.decode_failures, 3);
    assert_eq!(result.tally.total(), votes.len() as u64 - 3);
    Ok(())
}

#[tokio::test]
async fn timestamps_fall_into_hour_buckets() -> Result<()> {
    let votes = vec![
        vote(VoteOption::InFavor, 0),
        vote(VoteOption::Against, 3_599_999),
        vote(VoteOption::Abstain, 3_600_000),
    ];
    let out = vote_pipeline(memory_store(), &clock()).compute(&ProposalId::from(1), &votes)?;
    assert_eq!(out.timeline.count_at(0), 2);
    assert_eq!(out.timeline.count_at(3_600_000), 1);
    assert_eq!(out.timeline.len(), 2);
    Ok(())
}

#[tokio::test]
async fn missing_timestamps_use_decode_time() -> Result<()> {
    let clock = Arc::new(ManualClock::new(7_200_001));
    let votes = vec![
        RawVote::structured("inFavor", None),
        RawVote::structured("against", Some(-5)),
    ];
    let result = vote_pipeline(memory_store(), &clock)
        .process(&votes, &ProposalId::from(2))
        .await?;
    assert_eq!(result.inferred_timestamps, 2);
    assert_eq!(result.timeline.count_at(7_200_000), 2);
    Ok(())
}

#[tokio::test]
async fn persistence_failure_keeps_tally_and_proof() -> Result<()> {
    let clock = clock();
    let id = ProposalId::from(42);
    let stored = vote_pipeline(memory_store(), &clock)
        .process(&mixed_votes(), &id)
        .await?;

    let failing = VotePipeline::new(
        SharedStore::new(FailingStore),
        Arc::new(TemplateInsightService::new(clock.clone())),
    )
    .with_clock(clock.clone());
    let result = failing.process(&mixed_votes(), &id).await?;

    assert_eq!(result.tally, stored.tally);
    assert_eq!(result.proof, stored.proof);
    assert!(result.storage_reference.is_none());
    assert!(result.insight_reference.is_some());
    assert!(matches!(
        result.warnings.as_slice(),
        [PipelineWarning::PersistenceFailed { .. }]
    ));
    Ok(())
}

#[tokio::test]
async fn failed_metadata_write_stores_no_result() -> Result<()> {
    let clock = clock();
    let store = SharedStore::new(RejectingStore::new(":meta"));
    let vote_id = ProposalId::from(42);
    let project_id = ProjectId::from(43);

    let result = VotePipeline::new(store.clone(), template_insight(&clock))
        .with_clock(clock.clone())
        .process(&mixed_votes(), &vote_id)
        .await?;
    assert!(result.storage_reference.is_none());
    assert!(matches!(
        result.warnings.as_slice(),
        [PipelineWarning::PersistenceFailed { reason }] if reason.contains(":meta")
    ));

    let outcome = BidPipeline::new(store.clone(), template_insight(&clock))
        .with_clock(clock.clone())
        .process(&[sealed_bid(100, b"alice")], &project_id)
        .await?;
    assert!(outcome.storage_reference.is_none());
    assert!(matches!(
        outcome.warnings.as_slice(),
        [PipelineWarning::PersistenceFailed { .. }]
    ));

    let repository = ResultRepository::new(store);
    assert!(repository.get_vote_result(&vote_id).await?.is_none());
    assert!(repository.get_vote_metadata(&vote_id).await?.is_none());
    assert!(repository.get_auction_result(&project_id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn enrichment_failure_is_a_warning() -> Result<()> {
    let store = memory_store();
    let pipeline = VotePipeline::new(store.clone(), Arc::new(FailingInsightService))
        .with_clock(clock());
    let id = ProposalId::from(5);
    let result = pipeline.process(&mixed_votes(), &id).await?;

    assert!(result.insight_reference.is_none());
    assert!(result.storage_reference.is_some());
    assert!(matches!(
        result.warnings.as_slice(),
        [PipelineWarning::EnrichmentFailed { reason }] if reason.contains("offline")
    ));

    let persisted = ResultRepository::new(store).get_vote_result(&id).await?;
    assert_eq!(persisted.map(|r| r.warnings), Some(result.warnings));
    Ok(())
}

#[tokio::test]
async fn attestation_failure_is_fatal() -> Result<()> {
    let pipeline = vote_pipeline(memory_store(), &clock())
        .with_attestation(Arc::new(FlakyAttestationProvider::new(true)));
    let err = pipeline
        .process(&mixed_votes(), &ProposalId::from(1))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Attestation(_)));
    Ok(())
}

#[tokio::test]
async fn stored_result_and_metadata_match() -> Result<()> {
    let store = memory_store();
    let id = ProposalId::from(11);
    let result = vote_pipeline(store.clone(), &clock())
        .process(&mixed_votes(), &id)
        .await?;
    let reference = result.storage_reference.clone().unwrap();

    let repository = ResultRepository::new(store);
    let metadata = repository.get_vote_metadata(&id).await?.unwrap();
    assert_eq!(metadata.content_hash, reference.content_hash);
    assert_eq!(metadata.total_votes, 4);
    assert_eq!(metadata.proof, result.proof.digest);
    assert_eq!(metadata.computed_at, 10_000);

    let persisted = repository.get_vote_result(&id).await?.unwrap();
    assert_eq!(persisted.tally, result.tally);
    assert_eq!(persisted.proof, result.proof);
    Ok(())
}

#[tokio::test]
async fn results_survive_in_sled() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = SharedStore::new(SledStore::open(&dir.path().join("db"))?);
    let id = ProposalId::from(8);
    let result = vote_pipeline(store.clone(), &clock())
        .process(&mixed_votes(), &id)
        .await?;
    assert!(result.warnings.is_empty());

    let persisted = ResultRepository::new(store).get_vote_result(&id).await?;
    assert_eq!(persisted.map(|r| r.proof), Some(result.proof));
    Ok(())
}

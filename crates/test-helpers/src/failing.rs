// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tally_attestation::{
    AttestationError, AttestationProvider, HashCommitmentProvider, ProofDigest, Statement,
};
use tally_ballot::{AuctionTally, ProjectId, ProposalId, Timeline, VoteTally};
use tally_data::{DataStore, InMemoryStore};
use tally_pipeline::{InsightReference, InsightService};

/// A store whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl DataStore for FailingStore {
    type Error = anyhow::Error;

    async fn insert<T: Serialize + Send + Sync>(
        &mut self,
        key: &str,
        _value: &T,
    ) -> Result<(), Self::Error> {
        Err(anyhow!("store rejected write to {key}"))
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, Self::Error> {
        Err(anyhow!("store rejected read of {key}"))
    }
}

/// In-memory store that rejects writes to keys ending with a suffix.
#[derive(Debug)]
pub struct RejectingStore {
    inner: InMemoryStore,
    suffix: String,
}

impl RejectingStore {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            inner: InMemoryStore::new(),
            suffix: suffix.into(),
        }
    }
}

#[async_trait]
impl DataStore for RejectingStore {
    type Error = anyhow::Error;

    async fn insert<T: Serialize + Send + Sync>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), Self::Error> {
        if key.ends_with(&self.suffix) {
            bail!("store rejected write to {key}");
        }
        self.inner.insert(key, value).await
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, Self::Error> {
        self.inner.get(key).await
    }
}

pub struct FailingInsightService;

#[async_trait]
impl InsightService for FailingInsightService {
    async fn summarize_votes(
        &self,
        _proposal_id: &ProposalId,
        _tally: &VoteTally,
        _timeline: &Timeline,
    ) -> Result<InsightReference> {
        bail!("insight backend offline")
    }

    async fn summarize_auction(
        &self,
        _project_id: &ProjectId,
        _auction: &AuctionTally,
    ) -> Result<InsightReference> {
        bail!("insight backend offline")
    }
}

/// Hash commitment that can be switched into a failing state.
#[derive(Default)]
pub struct FlakyAttestationProvider {
    failing: AtomicBool,
}

impl FlakyAttestationProvider {
    pub fn new(failing: bool) -> Self {
        Self {
            failing: AtomicBool::new(failing),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl AttestationProvider for FlakyAttestationProvider {
    fn name(&self) -> &str {
        HashCommitmentProvider::NAME
    }

    fn attest(&self, statement: &Statement) -> Result<ProofDigest, AttestationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AttestationError::Unavailable(
                "enclave not reachable".to_string(),
            ));
        }
        HashCommitmentProvider.attest(statement)
    }
}

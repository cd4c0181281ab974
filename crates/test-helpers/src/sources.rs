// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tally_ballot::{ProjectId, ProposalId, RawBid, RawVote};
use tally_pipeline::{BidSource, VoteSource};

/// In-memory source that counts fetches and can be slowed down or broken.
pub struct StaticSource<T> {
    entries: Mutex<Vec<T>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    failing: AtomicBool,
}

pub type StaticVoteSource = StaticSource<RawVote>;
pub type StaticBidSource = StaticSource<RawBid>;

impl<T: Clone> StaticSource<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self {
            entries: Mutex::new(entries),
            calls: AtomicUsize::new(0),
            delay: None,
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_entries(&self, entries: Vec<T>) {
        *self.entries.lock().unwrap() = entries;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn fetch_entries(&self) -> Result<Vec<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            bail!("source unavailable");
        }
        Ok(self.entries.lock().unwrap().clone())
    }
}

#[async_trait]
impl VoteSource for StaticVoteSource {
    async fn fetch(&self, _proposal_id: &ProposalId) -> Result<Vec<RawVote>> {
        self.fetch_entries().await
    }
}

#[async_trait]
impl BidSource for StaticBidSource {
    async fn fetch(&self, _project_id: &ProjectId) -> Result<Vec<RawBid>> {
        self.fetch_entries().await
    }
}

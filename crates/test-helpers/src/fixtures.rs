// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;
use tally_ballot::{ManualClock, RawBid, RawVote, VoteOption};
use tally_data::{DataStore, InMemoryStore, SharedStore};
use tally_pipeline::{BidPipeline, InsightService, TemplateInsightService, VotePipeline};

pub fn vote(option: VoteOption, timestamp: i64) -> RawVote {
    RawVote::structured(option.as_str(), Some(timestamp))
}

/// InFavor, Against, InFavor, Abstain across three distinct timestamps.
pub fn mixed_votes() -> Vec<RawVote> {
    vec![
        vote(VoteOption::InFavor, 1_000),
        vote(VoteOption::Against, 2_000),
        vote(VoteOption::InFavor, 3_000),
        vote(VoteOption::Abstain, 3_000),
    ]
}

/// Encodes a bid the way `PrefixBidResolver` expects it.
pub fn sealed_bid(amount: u64, bidder: &[u8]) -> RawBid {
    let mut bytes = amount.to_be_bytes().to_vec();
    bytes.extend_from_slice(bidder);
    RawBid::Sealed(bytes)
}

pub fn memory_store() -> SharedStore<InMemoryStore> {
    SharedStore::new(InMemoryStore::new())
}

pub fn template_insight(clock: &Arc<ManualClock>) -> Arc<dyn InsightService> {
    Arc::new(TemplateInsightService::new(clock.clone()))
}

/// Vote pipeline over an in-memory store with a manual clock.
pub fn vote_pipeline<S: DataStore>(
    store: SharedStore<S>,
    clock: &Arc<ManualClock>,
) -> VotePipeline<S> {
    VotePipeline::new(store, template_insight(clock)).with_clock(clock.clone())
}

pub fn bid_pipeline(
    store: SharedStore<InMemoryStore>,
    clock: &Arc<ManualClock>,
) -> BidPipeline<InMemoryStore> {
    BidPipeline::new(store, template_insight(clock)).with_clock(clock.clone())
}

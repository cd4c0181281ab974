// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::AggregateError;
use rayon::prelude::*;
use tally_ballot::{ParsedVote, Timeline, VoteTally};
use tracing::debug;

pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Counts votes per option. The total is the number of votes given.
pub fn aggregate(votes: &[ParsedVote]) -> Result<VoteTally, AggregateError> {
    let mut tally = VoteTally::default();
    for vote in votes {
        tally.record(vote.option())?;
    }
    Ok(tally)
}

/// Groups votes into windows of `window_millis`, keyed by window start.
pub fn bucket(votes: &[ParsedVote], window_millis: u64) -> Result<Timeline, AggregateError> {
    let mut timeline = Timeline::new(window_millis).ok_or(AggregateError::ZeroWindow)?;
    for vote in votes {
        if !timeline.record(vote.timestamp()) {
            return Err(AggregateError::TimelineOverflow);
        }
    }
    Ok(timeline)
}

/// Runs aggregation and bucketing either inline or split into batches on the
/// rayon pool. Both paths produce identical results.
#[derive(Clone, Debug)]
pub struct Aggregator {
    use_parallel: bool,
    batch_size: usize,
}

impl Aggregator {
    pub fn new(use_parallel: bool, batch_size: Option<usize>) -> Self {
        Self {
            use_parallel,
            batch_size: batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1),
        }
    }

    pub fn sequential() -> Self {
        Self::new(false, None)
    }

    pub fn is_parallel(&self) -> bool {
        self.use_parallel
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn tally(&self, votes: &[ParsedVote]) -> Result<VoteTally, AggregateError> {
        if !self.use_parallel || votes.len() <= self.batch_size {
            return aggregate(votes);
        }
        debug!(
            votes = votes.len(),
            batch_size = self.batch_size,
            "Aggregating in parallel"
        );
        votes
            .par_chunks(self.batch_size)
            .map(aggregate)
            .try_reduce(VoteTally::default, |a, b| {
                a.merge(&b).map_err(AggregateError::from)
            })
    }

    pub fn timeline(
        &self,
        votes: &[ParsedVote],
        window_millis: u64,
    ) -> Result<Timeline, AggregateError> {
        if !self.use_parallel || votes.len() <= self.batch_size {
            return bucket(votes, window_millis);
        }
        let empty = Timeline::new(window_millis).ok_or(AggregateError::ZeroWindow)?;
        votes
            .par_chunks(self.batch_size)
            .map(|chunk| bucket(chunk, window_millis))
            .try_reduce(
                || empty.clone(),
                |a, b| a.merge(&b).ok_or(AggregateError::TimelineOverflow),
            )
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::sequential()
    }
}

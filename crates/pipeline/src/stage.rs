// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::Serialize;
use std::fmt;
use tracing::trace;

/// Stages of a single run, in the only order they may happen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PipelineStage {
    Decoding,
    Aggregating,
    Attesting,
    Enriching,
    Persisting,
    Done,
}

impl PipelineStage {
    pub fn next(self) -> Option<PipelineStage> {
        use PipelineStage::*;
        match self {
            Decoding => Some(Aggregating),
            Aggregating => Some(Attesting),
            Attesting => Some(Enriching),
            Enriching => Some(Persisting),
            Persisting => Some(Done),
            Done => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Forward-only cursor over `PipelineStage`.
#[derive(Debug)]
pub struct StageTracker {
    current: PipelineStage,
}

impl StageTracker {
    pub fn start() -> Self {
        trace!(stage = %PipelineStage::Decoding, "Pipeline stage");
        Self {
            current: PipelineStage::Decoding,
        }
    }

    pub fn current(&self) -> PipelineStage {
        self.current
    }

    /// Moves to the next stage. Stays on `Done` once reached.
    pub fn advance(&mut self) -> PipelineStage {
        if let Some(next) = self.current.next() {
            trace!(from = %self.current, to = %next, "Pipeline stage");
            self.current = next;
        }
        self.current
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use tally_ballot::TallyOverflow;
use thiserror::Error;

/// Structural failures. Any of these aborts the whole pipeline run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error(transparent)]
    Overflow(#[from] TallyOverflow),
    #[error("Timeline window must be greater than zero")]
    ZeroWindow,
    #[error("Timeline bucket count overflowed")]
    TimelineOverflow,
    #[error("Bid count overflowed")]
    BidCountOverflow,
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use tally_aggregator::AggregateError;
use tally_attestation::AttestationError;
use thiserror::Error;

/// Terminal failure of a pipeline run. Nothing from the run is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),
    #[error("Attestation failed: {0}")]
    Attestation(#[from] AttestationError),
}

/// Non-fatal problem in a post-proof stage, attached to the returned record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineWarning {
    EnrichmentFailed { reason: String },
    PersistenceFailed { reason: String },
}

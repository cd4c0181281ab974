// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::VoteOption;
use serde::{Deserialize, Serialize};

/// A vote as received from the vote source, before normalization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawVote {
    /// Plain record. Fields are optional because the source may hand us a malformed record.
    Structured(StructuredVote),
    /// JSON text of a structured record.
    TextEncoded(String),
    /// Ballot that still needs an `OptionResolver` to reveal its option.
    OpaqueBlob {
        bytes: Vec<u8>,
        timestamp: Option<u64>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredVote {
    pub option: Option<String>,
    pub timestamp: Option<i64>,
}

impl RawVote {
    pub fn structured(option: impl Into<String>, timestamp: Option<i64>) -> Self {
        RawVote::Structured(StructuredVote {
            option: Some(option.into()),
            timestamp,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        RawVote::TextEncoded(text.into())
    }

    pub fn blob(bytes: impl Into<Vec<u8>>) -> Self {
        RawVote::OpaqueBlob {
            bytes: bytes.into(),
            timestamp: None,
        }
    }

    /// Blob from a hex string, with or without a `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        Ok(RawVote::blob(hex::decode(stripped)?))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    Recorded,
    /// Substituted with the decode-time wall clock. Such votes land in the
    /// bucket of the decode hour rather than the hour they were cast.
    Inferred,
}

/// Canonical vote. Only the decoder builds these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ParsedVote {
    option: VoteOption,
    timestamp: u64,
    timestamp_source: TimestampSource,
}

impl ParsedVote {
    pub(crate) fn new(option: VoteOption, timestamp: u64, timestamp_source: TimestampSource) -> Self {
        Self {
            option,
            timestamp,
            timestamp_source,
        }
    }

    pub fn option(&self) -> VoteOption {
        self.option
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn timestamp_source(&self) -> TimestampSource {
        self.timestamp_source
    }

    pub fn has_inferred_timestamp(&self) -> bool {
        self.timestamp_source == TimestampSource::Inferred
    }
}

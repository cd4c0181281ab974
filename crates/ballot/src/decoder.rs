// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    BidResolver, Clock, ModuloOptionResolver, OptionResolver, ParsedBid, ParsedVote,
    PrefixBidResolver, RawBid, RawVote, ResolverError, SystemClock, TimestampSource, VoteOption,
};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Record has no option")]
    MissingOption,
    #[error("Unrecognized option '{0}'")]
    UnrecognizedOption(String),
    #[error("Text is not valid JSON: {0}")]
    MalformedText(String),
    #[error("Text does not encode a record")]
    NotARecord,
    #[error("Bid has no amount")]
    MissingAmount,
    #[error("Bid amount is not a non-negative integer")]
    InvalidAmount,
    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

/// An entry that was dropped from the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    pub index: usize,
    pub error: DecodeError,
}

#[derive(Debug, Clone)]
pub struct DecodeReport<T> {
    pub decoded: Vec<T>,
    pub failures: Vec<DecodeFailure>,
    /// Entries whose timestamp was substituted with the decode-time clock.
    pub inferred_timestamps: usize,
}

impl<T> DecodeReport<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            decoded: Vec::with_capacity(capacity),
            failures: vec![],
            inferred_timestamps: 0,
        }
    }

    pub fn decoded_count(&self) -> usize {
        self.decoded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    fn fail(&mut self, index: usize, error: DecodeError) {
        // Only the reason is logged, never the ballot content.
        warn!(index, %error, "Entry failed to decode");
        self.failures.push(DecodeFailure { index, error });
    }
}

/// Normalizes raw votes. Failures are recorded per entry and never abort the batch.
#[derive(Clone)]
pub struct VoteDecoder {
    resolver: Arc<dyn OptionResolver>,
    clock: Arc<dyn Clock>,
}

impl VoteDecoder {
    pub fn new(resolver: Arc<dyn OptionResolver>, clock: Arc<dyn Clock>) -> Self {
        Self { resolver, clock }
    }

    pub fn decode(&self, raw_votes: &[RawVote]) -> DecodeReport<ParsedVote> {
        let now = self.clock.now_millis();
        let mut report = DecodeReport::with_capacity(raw_votes.len());

        for (index, raw) in raw_votes.iter().enumerate() {
            match self.decode_one(raw, now) {
                Ok(vote) => {
                    if vote.has_inferred_timestamp() {
                        report.inferred_timestamps += 1;
                    }
                    report.decoded.push(vote);
                }
                Err(error) => report.fail(index, error),
            }
        }

        debug!(
            decoded = report.decoded_count(),
            failed = report.failure_count(),
            inferred_timestamps = report.inferred_timestamps,
            "Decoded vote batch"
        );
        report
    }

    /// `now` stands in for any missing or malformed timestamp.
    pub fn decode_one(&self, raw: &RawVote, now: u64) -> Result<ParsedVote, DecodeError> {
        match raw {
            RawVote::Structured(record) => {
                let option = parse_option(record.option.as_deref())?;
                let timestamp = record.timestamp.and_then(|t| u64::try_from(t).ok());
                Ok(stamp(option, timestamp, now))
            }
            RawVote::TextEncoded(text) => {
                let value: Value = serde_json::from_str(text)
                    .map_err(|e| DecodeError::MalformedText(e.to_string()))?;
                let record = value.as_object().ok_or(DecodeError::NotARecord)?;
                let option = match record.get("option") {
                    None | Some(Value::Null) => return Err(DecodeError::MissingOption),
                    Some(Value::String(s)) => s.parse::<VoteOption>()?,
                    Some(other) => return Err(DecodeError::UnrecognizedOption(other.to_string())),
                };
                let timestamp = record.get("timestamp").and_then(json_u64);
                Ok(stamp(option, timestamp, now))
            }
            RawVote::OpaqueBlob { bytes, timestamp } => {
                let option = self.resolver.resolve(bytes)?;
                Ok(stamp(option, *timestamp, now))
            }
        }
    }
}

impl Default for VoteDecoder {
    fn default() -> Self {
        Self::new(Arc::new(ModuloOptionResolver), Arc::new(SystemClock))
    }
}

fn parse_option(option: Option<&str>) -> Result<VoteOption, DecodeError> {
    option.ok_or(DecodeError::MissingOption)?.parse()
}

fn stamp(option: VoteOption, timestamp: Option<u64>, now: u64) -> ParsedVote {
    match timestamp {
        Some(t) => ParsedVote::new(option, t, TimestampSource::Recorded),
        None => ParsedVote::new(option, now, TimestampSource::Inferred),
    }
}

/// Non-negative integers, either as JSON numbers or numeric strings.
pub(crate) fn json_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Opens sealed bids and normalizes plain ones.
#[derive(Clone)]
pub struct BidDecoder {
    resolver: Arc<dyn BidResolver>,
}

impl BidDecoder {
    pub fn new(resolver: Arc<dyn BidResolver>) -> Self {
        Self { resolver }
    }

    /// Each bid keeps its position in `raw_bids` as its submission index.
    pub fn decode(&self, raw_bids: &[RawBid]) -> DecodeReport<ParsedBid> {
        let mut report = DecodeReport::with_capacity(raw_bids.len());
        for (index, raw) in raw_bids.iter().enumerate() {
            match self.decode_one(index, raw) {
                Ok(bid) => report.decoded.push(bid),
                Err(error) => report.fail(index, error),
            }
        }
        debug!(
            decoded = report.decoded_count(),
            failed = report.failure_count(),
            "Decoded bid batch"
        );
        report
    }

    pub fn decode_one(&self, index: usize, raw: &RawBid) -> Result<ParsedBid, DecodeError> {
        let (bidder, amount) = match raw {
            RawBid::Structured { bidder, amount } => (Some(bidder.clone()), *amount),
            RawBid::TextEncoded(text) => {
                let value: Value = serde_json::from_str(text)
                    .map_err(|e| DecodeError::MalformedText(e.to_string()))?;
                let record = value.as_object().ok_or(DecodeError::NotARecord)?;
                let amount = match record.get("amount") {
                    None | Some(Value::Null) => return Err(DecodeError::MissingAmount),
                    Some(v) => json_u64(v).ok_or(DecodeError::InvalidAmount)?,
                };
                let bidder = record
                    .get("bidder")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                (bidder, amount)
            }
            RawBid::Sealed(bytes) => {
                let unsealed = self.resolver.unseal(bytes)?;
                (unsealed.bidder, unsealed.amount)
            }
        };
        let bidder = bidder
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| format!("bid-{index}"));
        Ok(ParsedBid::new(index, bidder, amount))
    }
}

impl Default for BidDecoder {
    fn default() -> Self {
        Self::new(Arc::new(PrefixBidResolver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;

    const NOW: u64 = 1_700_000_000_000;

    fn decoder() -> VoteDecoder {
        VoteDecoder::new(Arc::new(ModuloOptionResolver), Arc::new(ManualClock::new(NOW)))
    }

    #[test]
    fn decodes_every_encoding() {
        let votes = vec![
            RawVote::structured("InFavor", Some(10)),
            RawVote::text(r#"{"option":"against","timestamp":20}"#),
            RawVote::OpaqueBlob {
                bytes: vec![0x00, 0x02],
                timestamp: Some(30),
            },
        ];
        let report = decoder().decode(&votes);

        let options: Vec<_> = report.decoded.iter().map(|v| v.option()).collect();
        assert_eq!(
            options,
            vec![VoteOption::InFavor, VoteOption::Against, VoteOption::Abstain]
        );
        let stamps: Vec<_> = report.decoded.iter().map(|v| v.timestamp()).collect();
        assert_eq!(stamps, vec![10, 20, 30]);
        assert_eq!(report.failure_count(), 0);
        assert_eq!(report.inferred_timestamps, 0);
    }

    #[test]
    fn missing_timestamp_falls_back_to_clock() {
        let votes = vec![
            RawVote::structured("Abstain", None),
            RawVote::structured("Abstain", Some(-5)),
            RawVote::text(r#"{"option":"inFavor","timestamp":"soon"}"#),
            RawVote::text(r#"{"option":"inFavor","timestamp":"42"}"#),
        ];
        let report = decoder().decode(&votes);

        assert_eq!(report.decoded_count(), 4);
        assert_eq!(report.inferred_timestamps, 3);
        assert_eq!(report.decoded[0].timestamp(), NOW);
        assert!(report.decoded[1].has_inferred_timestamp());
        assert_eq!(report.decoded[3].timestamp(), 42);
        assert_eq!(report.decoded[3].timestamp_source(), TimestampSource::Recorded);
    }

    #[test]
    fn malformed_entries_are_counted_not_fatal() {
        let votes = vec![
            RawVote::structured("InFavor", Some(1)),
            RawVote::Structured(Default::default()),
            RawVote::structured("maybe", Some(1)),
            RawVote::text("{not json"),
            RawVote::text("[1,2,3]"),
            RawVote::text(r#"{"option":7}"#),
            RawVote::blob(vec![0x01]),
            RawVote::structured("Against", Some(2)),
        ];
        let report = decoder().decode(&votes);

        assert_eq!(report.decoded_count(), votes.len() - 6);
        let failed: Vec<_> = report.failures.iter().map(|f| f.index).collect();
        assert_eq!(failed, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(report.failures[0].error, DecodeError::MissingOption);
        assert!(report.failures[2]
            .error
            .to_string()
            .starts_with("Text is not valid JSON"));
        assert_eq!(report.failures[3].error, DecodeError::NotARecord);
        assert_eq!(
            report.failures[4].error,
            DecodeError::UnrecognizedOption("7".to_string())
        );
        assert!(matches!(
            report.failures[5].error,
            DecodeError::Resolver(ResolverError::BlobTooShort { .. })
        ));
    }

    #[test]
    fn empty_batch() {
        let report = decoder().decode(&[]);
        assert_eq!(report.decoded_count(), 0);
        assert_eq!(report.failure_count(), 0);
    }

    #[test]
    fn bids_keep_submission_index() {
        let mut sealed = 300u64.to_be_bytes().to_vec();
        sealed.push(0x99);
        let bids = vec![
            RawBid::structured("0x123", 100),
            RawBid::TextEncoded("nope".to_string()),
            RawBid::TextEncoded(r#"{"amount":"250"}"#.to_string()),
            RawBid::Sealed(sealed),
            RawBid::TextEncoded(r#"{"bidder":"0x456","amount":-1}"#.to_string()),
            RawBid::TextEncoded(r#"{"bidder":"0x456"}"#.to_string()),
        ];
        let report = BidDecoder::default().decode(&bids);

        assert_eq!(report.decoded_count(), 3);
        assert_eq!(report.decoded[0].bidder(), "0x123");
        assert_eq!(report.decoded[1].bidder(), "bid-2");
        assert_eq!(report.decoded[1].amount(), 250);
        assert_eq!(report.decoded[2].index(), 3);
        assert_eq!(report.decoded[2].bidder(), "0x99");
        assert_eq!(report.failures[1].error, DecodeError::InvalidAmount);
        assert_eq!(report.failures[2].error, DecodeError::MissingAmount);
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawBid {
    Structured { bidder: String, amount: u64 },
    /// JSON text `{"bidder": "...", "amount": 123}`.
    TextEncoded(String),
    /// Sealed bid, opened by a `BidResolver`.
    Sealed(Vec<u8>),
}

impl RawBid {
    pub fn structured(bidder: impl Into<String>, amount: u64) -> Self {
        RawBid::Structured {
            bidder: bidder.into(),
            amount,
        }
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        Ok(RawBid::Sealed(hex::decode(stripped)?))
    }
}

/// Opened bid. `index` is the submission position within the batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParsedBid {
    index: usize,
    bidder: String,
    amount: u64,
}

impl ParsedBid {
    pub(crate) fn new(index: usize, bidder: String, amount: u64) -> Self {
        Self {
            index,
            bidder,
            amount,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bidder(&self) -> &str {
        &self.bidder
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningBid {
    pub bidder: String,
    pub amount: u64,
    pub index: usize,
}

/// Result of winner selection over a batch of bids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionTally {
    pub winner: Option<WinningBid>,
    pub bid_count: u64,
}

impl AuctionTally {
    pub fn winner_reference(&self) -> Option<&str> {
        self.winner.as_ref().map(|w| w.bidder.as_str())
    }

    pub fn winning_amount(&self) -> u64 {
        self.winner.as_ref().map_or(0, |w| w.amount)
    }
}

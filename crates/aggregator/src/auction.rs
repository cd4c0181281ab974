// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::AggregateError;
use std::cmp::Ordering;
use tally_ballot::{AuctionTally, ParsedBid, WinningBid};

/// Highest amount wins; among equal amounts the earliest submission wins.
pub fn select_winner(bids: &[ParsedBid]) -> Result<AuctionTally, AggregateError> {
    let bid_count = u64::try_from(bids.len()).map_err(|_| AggregateError::BidCountOverflow)?;
    let winner = bids
        .iter()
        .max_by(|a, b| rank(a, b))
        .map(|bid| WinningBid {
            bidder: bid.bidder().to_string(),
            amount: bid.amount(),
            index: bid.index(),
        });
    Ok(AuctionTally { winner, bid_count })
}

fn rank(a: &ParsedBid, b: &ParsedBid) -> Ordering {
    a.amount()
        .cmp(&b.amount())
        .then_with(|| b.index().cmp(&a.index()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tally_ballot::{BidDecoder, RawBid};

    fn parse(raw: &[RawBid]) -> Vec<ParsedBid> {
        BidDecoder::default().decode(raw).decoded
    }

    #[test]
    fn highest_amount_wins() -> Result<()> {
        let bids = parse(&[
            RawBid::structured("0x123", 100),
            RawBid::structured("0x456", 200),
            RawBid::structured("0x789", 150),
        ]);
        let outcome = select_winner(&bids)?;
        assert_eq!(outcome.winner_reference(), Some("0x456"));
        assert_eq!(outcome.winning_amount(), 200);
        assert_eq!(outcome.bid_count, 3);
        Ok(())
    }

    #[test]
    fn tie_goes_to_earliest_submission() -> Result<()> {
        let bids = parse(&[
            RawBid::structured("0xlow", 10),
            RawBid::structured("0xfirst", 50),
            RawBid::structured("0xsecond", 50),
        ]);
        let reversed: Vec<_> = bids.iter().rev().cloned().collect();

        for batch in [bids, reversed] {
            let outcome = select_winner(&batch)?;
            assert_eq!(outcome.winner_reference(), Some("0xfirst"));
            assert_eq!(outcome.winner.unwrap().index, 1);
        }
        Ok(())
    }

    #[test]
    fn no_bids_no_winner() -> Result<()> {
        let outcome = select_winner(&[])?;
        assert_eq!(outcome.winner, None);
        assert_eq!(outcome.winning_amount(), 0);
        assert_eq!(outcome.bid_count, 0);
        Ok(())
    }
}

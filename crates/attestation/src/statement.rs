// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::AttestationError;
use tally_ballot::{AuctionTally, ProjectId, ProposalId, VoteTally};

const DOMAIN: &[u8] = b"tally-attestation/v1";
const TALLY_TAG: u8 = 0x01;
const AUCTION_TAG: u8 = 0x02;

/// What a proof commits to.
#[derive(Clone, Copy, Debug)]
pub enum Statement<'a> {
    Tally {
        proposal_id: &'a ProposalId,
        tally: &'a VoteTally,
    },
    Auction {
        project_id: &'a ProjectId,
        auction: &'a AuctionTally,
    },
}

impl Statement<'_> {
    /// Byte layout:
    ///
    /// ```text
    /// DOMAIN | tag:u8 | id_len:u32be | id
    /// tally:   in_favor:u64be | against:u64be | abstain:u64be | total:u64be
    /// auction: has_winner:u8 | [winner_len:u32be | winner] | amount:u64be | bid_count:u64be
    /// ```
    ///
    /// Count order is `VoteOption::ALL`, never container iteration order.
    /// Fails for ids or bidder references of 4 GiB or more.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, AttestationError> {
        let mut out = Vec::with_capacity(128);
        out.extend_from_slice(DOMAIN);
        match self {
            Statement::Tally { proposal_id, tally } => {
                out.push(TALLY_TAG);
                put_str(&mut out, proposal_id.as_str())?;
                for (_, count) in tally.iter() {
                    out.extend_from_slice(&count.to_be_bytes());
                }
                out.extend_from_slice(&tally.total().to_be_bytes());
            }
            Statement::Auction {
                project_id,
                auction,
            } => {
                out.push(AUCTION_TAG);
                put_str(&mut out, project_id.as_str())?;
                match auction.winner_reference() {
                    Some(winner) => {
                        out.push(1);
                        put_str(&mut out, winner)?;
                    }
                    None => out.push(0),
                }
                out.extend_from_slice(&auction.winning_amount().to_be_bytes());
                out.extend_from_slice(&auction.bid_count.to_be_bytes());
            }
        }
        Ok(out)
    }
}

fn length_prefix(len: usize) -> Result<[u8; 4], AttestationError> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| AttestationError::FieldTooLong(len))
}

fn put_str(out: &mut Vec<u8>, s: &str) -> Result<(), AttestationError> {
    out.extend_from_slice(&length_prefix(s.len())?);
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_layout_is_fixed() {
        let id = ProposalId::from("7");
        let tally = VoteTally::from_counts(2, 1, 1).unwrap();
        let bytes = Statement::Tally {
            proposal_id: &id,
            tally: &tally,
        }
        .canonical_bytes()
        .unwrap();

        let mut expected = DOMAIN.to_vec();
        expected.push(TALLY_TAG);
        expected.extend_from_slice(&1u32.to_be_bytes());
        expected.push(b'7');
        for n in [2u64, 1, 1, 4] {
            expected.extend_from_slice(&n.to_be_bytes());
        }
        assert_eq!(bytes, expected);
    }

    #[test]
    fn length_prefix_separates_id_from_counts() {
        // "1" + counts vs "" + counts must not collide
        let a = ProposalId::from("1");
        let b = ProposalId::from("");
        let tally = VoteTally::default();
        assert_ne!(
            Statement::Tally { proposal_id: &a, tally: &tally }.canonical_bytes().unwrap(),
            Statement::Tally { proposal_id: &b, tally: &tally }.canonical_bytes().unwrap()
        );
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_fields_are_rejected() {
        let max = u32::MAX as usize;
        assert_eq!(length_prefix(max).unwrap(), u32::MAX.to_be_bytes());
        assert_eq!(
            length_prefix(max + 1),
            Err(AttestationError::FieldTooLong(max + 1))
        );
    }
}

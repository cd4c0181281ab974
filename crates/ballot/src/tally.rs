// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::VoteOption;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TallyOverflow {
    #[error("Vote count for {0} overflowed")]
    Option(VoteOption),
    #[error("Vote total overflowed")]
    Total,
    #[error("Tally total {total} does not match the sum of its counts")]
    Inconsistent { total: u64 },
}

/// Per-option vote counts. `total` always equals the sum of the counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TallyRecord", into = "TallyRecord")]
pub struct VoteTally {
    in_favor: u64,
    against: u64,
    abstain: u64,
    total: u64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TallyRecord {
    in_favor: u64,
    against: u64,
    abstain: u64,
    total: u64,
}

impl VoteTally {
    pub fn from_counts(in_favor: u64, against: u64, abstain: u64) -> Result<Self, TallyOverflow> {
        let total = in_favor
            .checked_add(against)
            .and_then(|t| t.checked_add(abstain))
            .ok_or(TallyOverflow::Total)?;
        Ok(Self {
            in_favor,
            against,
            abstain,
            total,
        })
    }

    pub fn count(&self, option: VoteOption) -> u64 {
        match option {
            VoteOption::InFavor => self.in_favor,
            VoteOption::Against => self.against,
            VoteOption::Abstain => self.abstain,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Counts in canonical option order.
    pub fn iter(&self) -> impl Iterator<Item = (VoteOption, u64)> + '_ {
        VoteOption::ALL.into_iter().map(|o| (o, self.count(o)))
    }

    pub fn record(&mut self, option: VoteOption) -> Result<(), TallyOverflow> {
        let slot = match option {
            VoteOption::InFavor => &mut self.in_favor,
            VoteOption::Against => &mut self.against,
            VoteOption::Abstain => &mut self.abstain,
        };
        *slot = slot.checked_add(1).ok_or(TallyOverflow::Option(option))?;
        self.total = self.total.checked_add(1).ok_or(TallyOverflow::Total)?;
        Ok(())
    }

    /// Per-option addition. Associative and commutative, so partial tallies
    /// from any partition of a batch merge to the same result.
    pub fn merge(&self, other: &VoteTally) -> Result<VoteTally, TallyOverflow> {
        let add = |option: VoteOption| {
            self.count(option)
                .checked_add(other.count(option))
                .ok_or(TallyOverflow::Option(option))
        };
        let merged = VoteTally::from_counts(
            add(VoteOption::InFavor)?,
            add(VoteOption::Against)?,
            add(VoteOption::Abstain)?,
        )?;
        Ok(merged)
    }
}

impl TryFrom<TallyRecord> for VoteTally {
    type Error = TallyOverflow;

    fn try_from(record: TallyRecord) -> Result<Self, Self::Error> {
        let tally = VoteTally::from_counts(record.in_favor, record.against, record.abstain)?;
        if tally.total != record.total {
            return Err(TallyOverflow::Inconsistent {
                total: record.total,
            });
        }
        Ok(tally)
    }
}

impl From<VoteTally> for TallyRecord {
    fn from(tally: VoteTally) -> Self {
        Self {
            in_favor: tally.in_favor,
            against: tally.against,
            abstain: tally.abstain,
            total: tally.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn record_and_merge() -> Result<()> {
        let mut a = VoteTally::default();
        a.record(VoteOption::InFavor)?;
        a.record(VoteOption::Abstain)?;

        let b = VoteTally::from_counts(1, 2, 0)?;
        let merged = a.merge(&b)?;

        assert_eq!(merged, VoteTally::from_counts(2, 2, 1)?);
        assert_eq!(merged.total(), 5);
        assert_eq!(merged, b.merge(&a)?);
        Ok(())
    }

    #[test]
    fn overflow_is_reported() -> Result<()> {
        let mut full = VoteTally::from_counts(u64::MAX, 0, 0)?;
        assert_eq!(
            full.record(VoteOption::InFavor),
            Err(TallyOverflow::Option(VoteOption::InFavor))
        );
        assert_eq!(
            VoteTally::from_counts(u64::MAX, 1, 0),
            Err(TallyOverflow::Total)
        );
        Ok(())
    }

    #[test]
    fn deserialization_rejects_inconsistent_total() {
        let ok: VoteTally =
            serde_json::from_str(r#"{"inFavor":2,"against":1,"abstain":1,"total":4}"#).unwrap();
        assert_eq!(ok.total(), 4);

        let bad = serde_json::from_str::<VoteTally>(
            r#"{"inFavor":2,"against":1,"abstain":1,"total":9}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn bincode_roundtrip_keeps_counts() -> Result<()> {
        let tally = VoteTally::from_counts(7, 3, 1)?;
        let bytes = bincode::serialize(&tally)?;
        let back: VoteTally = bincode::deserialize(&bytes)?;
        assert_eq!(back, tally);
        Ok(())
    }
}

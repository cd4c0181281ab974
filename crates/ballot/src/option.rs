// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::DecodeError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VoteOption {
    InFavor,
    Against,
    Abstain,
}

impl VoteOption {
    /// Canonical order. Commitments serialize counts in exactly this order.
    pub const ALL: [VoteOption; 3] = [VoteOption::InFavor, VoteOption::Against, VoteOption::Abstain];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteOption::InFavor => "InFavor",
            VoteOption::Against => "Against",
            VoteOption::Abstain => "Abstain",
        }
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `InFavor`, `inFavor`, `in_favor`, `IN-FAVOR` and so on.
impl FromStr for VoteOption {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "infavor" => Ok(VoteOption::InFavor),
            "against" => Ok(VoteOption::Against),
            "abstain" => Ok(VoteOption::Abstain),
            _ => Err(DecodeError::UnrecognizedOption(s.to_string())),
        }
    }
}

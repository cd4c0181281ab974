// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod digest;
mod hash_commitment;
mod proof;
mod provider;
mod statement;

pub use digest::*;
pub use hash_commitment::*;
pub use proof::*;
pub use provider::*;
pub use statement::*;

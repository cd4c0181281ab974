// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod failing;
mod fixtures;
mod sources;
mod utils;

pub use failing::*;
pub use fixtures::*;
pub use sources::*;
pub use utils::*;

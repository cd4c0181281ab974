// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod bid;
mod clock;
mod decoder;
mod ids;
mod option;
mod resolver;
mod tally;
mod timeline;
mod vote;
mod wire;

pub use bid::*;
pub use clock::*;
pub use decoder::*;
pub use ids::*;
pub use option::*;
pub use resolver::*;
pub use tally::*;
pub use timeline::*;
pub use vote::*;

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod bid_pipeline;
mod cache;
mod collaborators;
mod error;
mod insight;
mod providers;
mod repository;
mod request;
mod service;
mod stage;
pub mod telemetry;
mod vote_pipeline;

pub use bid_pipeline::*;
pub use cache::*;
pub use collaborators::*;
pub use error::*;
pub use insight::*;
pub use providers::*;
pub use repository::*;
pub use request::*;
pub use service::*;
pub use stage::*;
pub use vote_pipeline::*;

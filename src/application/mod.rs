// Application layer: the ledger service plus the pure reporting functions it exposes.

pub mod error;
pub mod reporting;
mod service;

pub use error::*;
pub use reporting::{Period, RankEntry, RankKey, RevenueReport};
pub use service::*;

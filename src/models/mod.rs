//! Core data models for the draft ledger.

mod attribution;
mod card;
mod event;
mod ids;
mod pairing;
mod pick;
mod stats;

pub use attribution::*;
pub use card::*;
pub use event::*;
pub use ids::*;
pub use pairing::*;
pub use pick::*;
pub use stats::*;

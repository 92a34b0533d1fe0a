mod client;
mod hotel;
mod ledger;
mod money;

pub use client::*;
pub use hotel::*;
pub use ledger::*;
pub use money::*;

//! Domain types and the ports the splitter depends on.

pub mod asset;
pub mod fee;
pub mod ledger;
pub mod payment;
pub mod ports;
pub mod transfer;

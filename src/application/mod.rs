//! Application layer containing the splitter orchestration.
//!
//! `PaymentSplitter` is the entry point for payments and fee withdrawals. It
//! validates requests, drives the transfer service and keeps the fee ledger
//! consistent under concurrent calls through per-asset locks.

pub mod locks;
pub mod splitter;

use crate::domain::asset::Asset;
use crate::domain::ledger::FeeBalance;
use crate::error::Result;
use alloy_primitives::{Address, U256};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct FeeRow {
    asset: String,
    accrued: String,
    pending: String,
    dust: String,
    collected: String,
    withdrawn: String,
}

impl From<&FeeBalance> for FeeRow {
    fn from(balance: &FeeBalance) -> Self {
        Self {
            asset: balance.asset.to_string(),
            accrued: balance.accrued.to_string(),
            pending: balance.pending.to_string(),
            dust: balance.dust.to_string(),
            collected: balance.collected.to_string(),
            withdrawn: balance.withdrawn.to_string(),
        }
    }
}

#[derive(Serialize)]
struct HoldingRow {
    holder: String,
    asset: String,
    balance: String,
}

/// Writes ledger state as CSV, amounts in base units.
///
/// The header is always written, even when there are no rows.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_fee_balances(&mut self, balances: &[FeeBalance]) -> Result<()> {
        self.writer.write_record([
            "asset",
            "accrued",
            "pending",
            "dust",
            "collected",
            "withdrawn",
        ])?;
        for balance in balances {
            self.writer.serialize(FeeRow::from(balance))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_holdings(&mut self, holdings: &[(Address, Asset, U256)]) -> Result<()> {
        self.writer.write_record(["holder", "asset", "balance"])?;
        for (holder, asset, balance) in holdings {
            self.writer.serialize(HoldingRow {
                holder: holder.to_string(),
                asset: asset.to_string(),
                balance: balance.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

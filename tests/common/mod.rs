#![allow(dead_code)]

use alloy_primitives::{Address, U256};
use fee_splitter::application::splitter::PaymentSplitter;
use fee_splitter::config::SplitterConfig;
use fee_splitter::infrastructure::in_memory::{InMemoryFeeLedgerStore, InMemoryPaymentStore};
use fee_splitter::infrastructure::transfer::InMemoryTransferService;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

pub const ADMIN: Address = Address::with_last_byte(0x99);
pub const CUSTODY: Address = Address::with_last_byte(0x42);
pub const PAYER: Address = Address::with_last_byte(0x10);
pub const DEST: Address = Address::with_last_byte(0x88);
pub const TOKEN: Address = Address::with_last_byte(0x77);

/// Recipients `0x..01` through `0x..n`.
pub fn recipients(n: u8) -> Vec<Address> {
    (1..=n).map(Address::with_last_byte).collect()
}

/// `milli / 1000` of a whole 18-decimal unit.
pub fn ether(milli: u64) -> U256 {
    U256::from(milli) * U256::from(1_000_000_000_000_000u64)
}

pub struct Harness {
    pub splitter: Arc<PaymentSplitter>,
    pub transfers: InMemoryTransferService,
}

/// A splitter with the default 10% fee over in-memory stores and books.
pub fn harness() -> Harness {
    let transfers = InMemoryTransferService::new(CUSTODY);
    let splitter = PaymentSplitter::new(
        SplitterConfig::new(ADMIN, CUSTODY),
        Box::new(InMemoryFeeLedgerStore::new()),
        Box::new(InMemoryPaymentStore::new()),
        Box::new(transfers.clone()),
    );
    Harness {
        splitter: Arc::new(splitter),
        transfers,
    }
}

/// Address as written in the CSV files, lowercase hex.
pub fn hex(address: Address) -> String {
    format!("0x{}", alloy_primitives::hex::encode(address))
}

/// Writes `rows` native payments of 1 unit from `PAYER` to three recipients,
/// preceded by a single funding row covering all of them.
pub fn generate_payments_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["type", "caller", "asset", "amount", "value", "to"])?;
    wtr.write_record(["fund", &hex(PAYER), "native", &rows.to_string(), "", ""])?;

    let to = recipients(3)
        .into_iter()
        .map(hex)
        .collect::<Vec<_>>()
        .join(";");
    for _ in 0..rows {
        wtr.write_record(["pay", &hex(PAYER), "native", "1", "1", &to])?;
    }

    wtr.flush()?;
    Ok(())
}

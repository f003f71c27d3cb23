use alloy_primitives::Address;
use clap::Parser;
use fee_splitter::application::splitter::PaymentSplitter;
use fee_splitter::config::SplitterConfig;
use fee_splitter::domain::fee::{DEFAULT_FEE_PERCENT, FeeRate};
use fee_splitter::domain::ports::{FeeLedgerStoreBox, PaymentStoreBox};
use fee_splitter::error::SplitterError;
use fee_splitter::infrastructure::in_memory::{InMemoryFeeLedgerStore, InMemoryPaymentStore};
use fee_splitter::infrastructure::transfer::InMemoryTransferService;
use fee_splitter::interfaces::csv::ledger_writer::LedgerWriter;
use fee_splitter::interfaces::csv::operation_reader::{MAX_DECIMALS, Operation, OperationReader};
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CUSTODY: &str = "0x000000000000000000000000000000000000c0de";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file (type, caller, asset, amount, value, to)
    input: PathBuf,

    /// JSON file with `admin`, `custody` and `fee_rate`. Takes precedence over the flags below.
    #[arg(long, env = "SPLITTER_CONFIG")]
    config: Option<PathBuf>,

    /// Identity allowed to withdraw fees
    #[arg(long, env = "SPLITTER_ADMIN")]
    admin: Option<Address>,

    /// Account the splitter holds funds under
    #[arg(long, env = "SPLITTER_CUSTODY", default_value = DEFAULT_CUSTODY)]
    custody: Address,

    /// Percentage of every payment kept as fee
    #[arg(long, env = "SPLITTER_FEE_PERCENT", default_value_t = DEFAULT_FEE_PERCENT)]
    fee_percent: Decimal,

    /// Decimal places used to turn amount columns into base units
    #[arg(long, default_value_t = MAX_DECIMALS, value_parser = clap::value_parser!(u32).range(0..=MAX_DECIMALS as i64))]
    decimals: u32,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    ///
    /// Only the fee ledger and payment journal persist. Simulated holder
    /// balances start empty on every run, except custody, which is seeded with
    /// the accrued fees and dust of the restored ledger.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Print simulated holder balances instead of the fee ledger
    #[arg(long)]
    balances: bool,
}

impl Cli {
    fn splitter_config(&self) -> Result<SplitterConfig> {
        if let Some(path) = &self.config {
            return SplitterConfig::load(path).into_diagnostic();
        }

        let admin = self
            .admin
            .ok_or_else(|| miette!("either --config or --admin must be provided"))?;
        let fee_rate = FeeRate::from_percent(self.fee_percent).into_diagnostic()?;
        let config = SplitterConfig::new(admin, self.custody).with_fee_rate(fee_rate);
        config.validate().into_diagnostic()?;
        Ok(config)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn in_memory_stores() -> (FeeLedgerStoreBox, PaymentStoreBox) {
    let fee_store: FeeLedgerStoreBox = Box::new(InMemoryFeeLedgerStore::new());
    let payment_store: PaymentStoreBox = Box::new(InMemoryPaymentStore::new());
    (fee_store, payment_store)
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(FeeLedgerStoreBox, PaymentStoreBox)> {
    use fee_splitter::infrastructure::rocksdb::RocksDBStore;

    if let Some(path) = db_path {
        let store = RocksDBStore::open(path).into_diagnostic()?;
        let fee_store: FeeLedgerStoreBox = Box::new(store.clone());
        let payment_store: PaymentStoreBox = Box::new(store);
        return Ok((fee_store, payment_store));
    }
    Ok(in_memory_stores())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(FeeLedgerStoreBox, PaymentStoreBox)> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(in_memory_stores())
}

/// Credits custody with what the restored ledger says it holds.
async fn seed_custody(
    splitter: &PaymentSplitter,
    transfers: &InMemoryTransferService,
) -> fee_splitter::error::Result<()> {
    for balance in splitter.fee_balances().await? {
        let held = balance
            .accrued
            .checked_add(balance.dust)
            .ok_or(SplitterError::Overflow("restored custody balance"))?;
        if !held.is_zero() {
            transfers.fund(transfers.custody(), balance.asset, held).await?;
            info!(asset = %balance.asset, %held, "seeded custody from restored ledger");
        }
    }
    Ok(())
}

async fn apply(
    splitter: &PaymentSplitter,
    transfers: &InMemoryTransferService,
    operation: Operation,
) -> fee_splitter::error::Result<()> {
    match operation {
        Operation::Fund {
            holder,
            asset,
            amount,
        } => transfers.fund(holder, asset, amount).await?,
        Operation::Approve {
            owner,
            token,
            amount,
        } => transfers.approve(token, owner, amount).await,
        Operation::Pay { payer, request } => {
            splitter.send_payment(&payer, request).await?;
        }
        Operation::Withdraw {
            caller,
            asset,
            destination,
        } => {
            splitter.withdraw_fees(&caller, asset, destination).await?;
        }
        Operation::Sweep {
            caller,
            destination,
        } => {
            splitter.withdraw_all_fees(&caller, destination).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = cli.splitter_config()?;
    info!(admin = %config.admin, custody = %config.custody, fee_rate = %config.fee_rate, "starting splitter");

    let transfers = InMemoryTransferService::new(config.custody);
    let (fee_store, payment_store) = open_stores(cli.db_path.clone())?;
    let splitter = PaymentSplitter::new(
        config,
        fee_store,
        payment_store,
        Box::new(transfers.clone()),
    );
    seed_custody(&splitter, &transfers).await.into_diagnostic()?;

    // Process operations
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file, cli.decimals);
    for operation in reader.operations() {
        match operation {
            Ok(operation) => {
                if let Err(e) = apply(&splitter, &transfers, operation).await {
                    error!("Error processing operation: {e}");
                }
            }
            Err(e) => {
                error!("Error reading operation: {e}");
            }
        }
    }

    // Output final state
    let stdout = io::stdout();
    let mut writer = LedgerWriter::new(stdout.lock());
    if cli.balances {
        writer
            .write_holdings(&transfers.balances().await)
            .into_diagnostic()?;
    } else {
        writer
            .write_fee_balances(&splitter.fee_balances().await.into_diagnostic()?)
            .into_diagnostic()?;
    }

    Ok(())
}

use crate::domain::asset::Asset;
use crate::domain::payment::PaymentRequest;
use crate::error::{Result, SplitterError};
use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use std::io::Read;
use std::str::FromStr;

/// Most decimal places an amount column may be scaled by.
pub const MAX_DECIMALS: u32 = 18;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Fund,
    Approve,
    Pay,
    Withdraw,
    Sweep,
}

/// One CSV row as written: `type, caller, asset, amount, value, to`.
#[derive(Debug, Deserialize, Clone)]
pub struct OperationRecord {
    pub r#type: OperationType,
    pub caller: String,
    pub asset: Option<String>,
    pub amount: Option<Decimal>,
    pub value: Option<Decimal>,
    /// Recipients separated by `;` for payments, the destination for withdrawals.
    pub to: Option<String>,
}

/// A parsed row, with amounts in base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Fund {
        holder: Address,
        asset: Asset,
        amount: U256,
    },
    Approve {
        owner: Address,
        token: Address,
        amount: U256,
    },
    Pay {
        payer: Address,
        request: PaymentRequest,
    },
    Withdraw {
        caller: Address,
        asset: Asset,
        destination: Address,
    },
    Sweep {
        caller: Address,
        destination: Address,
    },
}

/// Converts a decimal amount into base units, e.g. `0.5` with 18 decimals into
/// `500000000000000000`. Fails on negative values and on more fractional
/// digits than `decimals` allows.
pub fn to_base_units(value: Decimal, decimals: u32) -> Result<U256> {
    if decimals > MAX_DECIMALS {
        return Err(SplitterError::InvalidOperation(format!(
            "at most {MAX_DECIMALS} decimals are supported"
        )));
    }
    if value.is_sign_negative() && !value.is_zero() {
        return Err(SplitterError::InvalidOperation(format!(
            "amount {value} is negative"
        )));
    }
    let scale = Decimal::from_i128_with_scale(10i128.pow(decimals), 0);
    let scaled = value
        .checked_mul(scale)
        .ok_or_else(|| SplitterError::InvalidOperation(format!("amount {value} is too large")))?;
    if !scaled.fract().is_zero() {
        return Err(SplitterError::InvalidOperation(format!(
            "amount {value} has more than {decimals} decimal places"
        )));
    }
    let units = scaled
        .to_u128()
        .ok_or_else(|| SplitterError::InvalidOperation(format!("amount {value} is out of range")))?;
    Ok(U256::from(units))
}

fn parse_address(field: &str, raw: &str) -> Result<Address> {
    Address::from_str(raw.trim())
        .map_err(|e| SplitterError::InvalidOperation(format!("invalid {field} '{raw}': {e}")))
}

fn required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| SplitterError::InvalidOperation(format!("missing {field}")))
}

impl OperationRecord {
    pub fn into_operation(self, decimals: u32) -> Result<Operation> {
        let caller = parse_address("caller", &self.caller)?;
        let asset = self
            .asset
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(Asset::from_str)
            .transpose()?;
        let amount = self
            .amount
            .map(|amount| to_base_units(amount, decimals))
            .transpose()?;
        let to = self.to.as_deref().map(str::trim).filter(|raw| !raw.is_empty());

        match self.r#type {
            OperationType::Fund => Ok(Operation::Fund {
                holder: caller,
                asset: required("asset", asset)?,
                amount: required("amount", amount)?,
            }),
            OperationType::Approve => match required("asset", asset)? {
                Asset::Token(token) => Ok(Operation::Approve {
                    owner: caller,
                    token,
                    amount: required("amount", amount)?,
                }),
                Asset::Native => Err(SplitterError::InvalidOperation(
                    "approve needs a token asset".to_string(),
                )),
            },
            OperationType::Pay => {
                let recipients = to
                    .map(|list| {
                        list.split(';')
                            .map(str::trim)
                            .filter(|raw| !raw.is_empty())
                            .map(|raw| parse_address("recipient", raw))
                            .collect::<Result<Vec<_>>>()
                    })
                    .transpose()?
                    .unwrap_or_default();
                let attached_value = self
                    .value
                    .map(|value| to_base_units(value, decimals))
                    .transpose()?
                    .unwrap_or(U256::ZERO);
                Ok(Operation::Pay {
                    payer: caller,
                    request: PaymentRequest {
                        recipients,
                        asset: required("asset", asset)?,
                        amount: required("amount", amount)?,
                        attached_value,
                    },
                })
            }
            OperationType::Withdraw => Ok(Operation::Withdraw {
                caller,
                asset: required("asset", asset)?,
                destination: parse_address("destination", required("destination", to)?)?,
            }),
            OperationType::Sweep => Ok(Operation::Sweep {
                caller,
                destination: parse_address("destination", required("destination", to)?)?,
            }),
        }
    }
}

/// Reads operations from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Operation>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
    decimals: u32,
}

impl<R: Read> OperationReader<R> {
    /// Creates a new `OperationReader` from any `Read` source (e.g., File, Stdin).
    ///
    /// Amount columns are scaled by `10^decimals` into base units.
    pub fn new(source: R, decimals: u32) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader, decimals }
    }

    /// Returns an iterator that lazily reads and converts operations.
    pub fn operations(self) -> impl Iterator<Item = Result<Operation>> {
        let decimals = self.decimals;
        self.reader
            .into_deserialize::<OperationRecord>()
            .map(move |result| {
                result
                    .map_err(SplitterError::from)
                    .and_then(|record| record.into_operation(decimals))
            })
    }
}

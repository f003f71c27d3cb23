use crate::error::SplitterError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies what a payment or fee balance is denominated in.
///
/// The native currency is addressed by the zero address, the same sentinel
/// callers use on the wire. Every other address names a fungible token.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Asset {
    #[default]
    Native,
    Token(Address),
}

impl Asset {
    pub fn from_address(address: Address) -> Self {
        if address == Address::ZERO {
            Self::Native
        } else {
            Self::Token(address)
        }
    }

    /// The address form, with the native currency mapped back to zero.
    pub fn address(&self) -> Address {
        match self {
            Self::Native => Address::ZERO,
            Self::Token(token) => *token,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Rejects `Token(Address::ZERO)`, which would alias the native currency.
    pub fn ensure_canonical(&self) -> Result<(), SplitterError> {
        match self {
            Self::Token(token) if *token == Address::ZERO => Err(SplitterError::InvalidAsset(
                "the zero address is the native currency, not a token",
            )),
            _ => Ok(()),
        }
    }
}

impl From<Address> for Asset {
    fn from(address: Address) -> Self {
        Self::from_address(address)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Token(token) => write!(f, "{token}"),
        }
    }
}

impl FromStr for Asset {
    type Err = SplitterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("native") {
            return Ok(Self::Native);
        }
        Address::from_str(s)
            .map(Self::from_address)
            .map_err(|e| SplitterError::InvalidOperation(format!("invalid asset '{s}': {e}")))
    }
}

impl TryFrom<String> for Asset {
    type Error = SplitterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.to_string()
    }
}

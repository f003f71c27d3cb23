use super::asset::Asset;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One asset movement requested by the splitter.
///
/// Instructions without an explicit source move funds out of the custody
/// account, the address the splitter holds balances under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transfer {
    /// Native value attached to a call, moved from the caller into custody.
    Attach { from: Address, amount: U256 },
    /// Native value paid out of custody.
    Native { to: Address, amount: U256 },
    /// Token moved between two holders. A source other than custody spends
    /// its allowance toward custody.
    Token {
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    /// Token pulled from `from` into custody under a prior allowance.
    Pull {
        token: Address,
        from: Address,
        amount: U256,
    },
}

impl Transfer {
    /// Receiving address, `None` when the destination is custody.
    pub fn recipient(&self) -> Option<Address> {
        match self {
            Self::Native { to, .. } | Self::Token { to, .. } => Some(*to),
            Self::Attach { .. } | Self::Pull { .. } => None,
        }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attach { from, amount } => write!(f, "attach {amount} native from {from}"),
            Self::Native { to, amount } => write!(f, "send {amount} native to {to}"),
            Self::Token {
                token,
                from,
                to,
                amount,
            } => write!(f, "move {amount} of {token} from {from} to {to}"),
            Self::Pull {
                token,
                from,
                amount,
            } => write!(f, "pull {amount} of {token} from {from}"),
        }
    }
}

/// Failure reported by a transfer backend. Never produced by the splitter
/// itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("{holder} holds {available} of {asset}, {required} required")]
    InsufficientBalance {
        asset: Asset,
        holder: Address,
        required: U256,
        available: U256,
    },
    #[error("{owner} approved {available} of {token}, {required} required")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        required: U256,
        available: U256,
    },
    #[error("{to} rejected the transfer")]
    Rejected { to: Address },
    #[error("balance of {holder} in {asset} would overflow")]
    BalanceOverflow { asset: Asset, holder: Address },
    #[error("{0}")]
    Backend(String),
}

use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::Serialize;

use crate::utils::format_units;

pub const DEFAULT_DECIMALS: u8 = 18;

/// Token metadata read from the selected contract.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TokenSnapshot {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: u8,
    pub total_supply: String,
    /// Present only when a caller address is known and its balance could be read.
    pub balance: Option<String>,
    /// Recoverable failure of the caller balance read.
    pub balance_error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// What the display layer sees: the last valid snapshot and the last read failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TokenState {
    pub snapshot: Option<TokenSnapshot>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u8,
    pub formatted: String,
}

impl TokenAmount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self {
            raw,
            decimals,
            formatted: format_units(raw, decimals),
        }
    }
}

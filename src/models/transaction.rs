use chrono::{DateTime, Utc};
use ethers::types::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::CustomError,
    models::contract::parse_address,
    utils::parse_units,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WriteKind {
    Transfer,
    TransferFrom,
    Approve,
    Mint,
    MintTo,
    Burn,
}

/// A write operation as entered by the user: addresses and human decimal amounts.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WriteRequest {
    Transfer {
        to: String,
        amount: String,
    },
    TransferFrom {
        from: String,
        to: String,
        amount: String,
    },
    Approve {
        spender: String,
        amount: String,
    },
    Mint {
        amount: String,
    },
    MintTo {
        to: String,
        amount: String,
    },
    Burn {
        amount: String,
    },
}

impl WriteRequest {
    pub fn kind(&self) -> WriteKind {
        match self {
            WriteRequest::Transfer { .. } => WriteKind::Transfer,
            WriteRequest::TransferFrom { .. } => WriteKind::TransferFrom,
            WriteRequest::Approve { .. } => WriteKind::Approve,
            WriteRequest::Mint { .. } => WriteKind::Mint,
            WriteRequest::MintTo { .. } => WriteKind::MintTo,
            WriteRequest::Burn { .. } => WriteKind::Burn,
        }
    }

    pub fn amount(&self) -> &str {
        match self {
            WriteRequest::Transfer { amount, .. }
            | WriteRequest::TransferFrom { amount, .. }
            | WriteRequest::Approve { amount, .. }
            | WriteRequest::Mint { amount }
            | WriteRequest::MintTo { amount, .. }
            | WriteRequest::Burn { amount } => amount,
        }
    }

    /// Resolve addresses and scale the amount into base units.
    pub fn resolve(&self, decimals: u8) -> Result<WriteCall, CustomError> {
        let amount = parse_units(self.amount(), decimals)?;
        let call = match self {
            WriteRequest::Transfer { to, .. } => WriteCall::Transfer {
                to: parse_address(to)?,
                amount,
            },
            WriteRequest::TransferFrom { from, to, .. } => WriteCall::TransferFrom {
                from: parse_address(from)?,
                to: parse_address(to)?,
                amount,
            },
            WriteRequest::Approve { spender, .. } => WriteCall::Approve {
                spender: parse_address(spender)?,
                amount,
            },
            WriteRequest::Mint { .. } => WriteCall::Mint { amount },
            WriteRequest::MintTo { to, .. } => WriteCall::MintTo {
                to: parse_address(to)?,
                amount,
            },
            WriteRequest::Burn { .. } => WriteCall::Burn { amount },
        };
        Ok(call)
    }

    pub fn success_message(&self, symbol: &str) -> String {
        let amount = self.amount();
        match self {
            WriteRequest::Transfer { .. } => format!("Transferred {amount} {symbol}!"),
            WriteRequest::TransferFrom { from, .. } => {
                let prefix: String = from.chars().take(6).collect();
                format!("Transferred {amount} {symbol} from {prefix}...!")
            }
            WriteRequest::Approve { .. } => format!("Approved {amount} {symbol}!"),
            WriteRequest::Mint { .. } => format!("Minted {amount} {symbol} to yourself!"),
            WriteRequest::MintTo { .. } => format!("Minted {amount} {symbol}!"),
            WriteRequest::Burn { .. } => format!("Burned {amount} {symbol}!"),
        }
    }
}

/// A write operation ready for the contract: typed addresses and base-unit amounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteCall {
    Transfer { to: Address, amount: U256 },
    TransferFrom { from: Address, to: Address, amount: U256 },
    Approve { spender: Address, amount: U256 },
    Mint { amount: U256 },
    MintTo { to: Address, amount: U256 },
    Burn { amount: U256 },
}

pub const CONFIRMING: &str = "Confirming...";
pub const WAITING_FOR_CONFIRMATION: &str = "Waiting for confirmation...";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TransactionStatus {
    #[default]
    Idle,
    Pending {
        message: String,
        hash: Option<TxHash>,
    },
    Success {
        message: String,
        hash: Option<TxHash>,
    },
    Error {
        message: String,
        hash: Option<TxHash>,
    },
}

impl TransactionStatus {
    pub fn pending(message: &str, hash: Option<TxHash>) -> Self {
        TransactionStatus::Pending {
            message: message.to_string(),
            hash,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TransactionStatus::Pending { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Success { .. } | TransactionStatus::Error { .. }
        )
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            TransactionStatus::Idle => None,
            TransactionStatus::Pending { message, .. }
            | TransactionStatus::Success { message, .. }
            | TransactionStatus::Error { message, .. } => Some(message),
        }
    }

    pub fn hash(&self) -> Option<TxHash> {
        match self {
            TransactionStatus::Idle => None,
            TransactionStatus::Pending { hash, .. }
            | TransactionStatus::Success { hash, .. }
            | TransactionStatus::Error { hash, .. } => *hash,
        }
    }
}

/// Status plus the attempt it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub status: TransactionStatus,
    pub attempt: Option<Uuid>,
    pub kind: Option<WriteKind>,
    pub explorer_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl StatusReport {
    pub fn idle() -> Self {
        Self {
            status: TransactionStatus::Idle,
            attempt: None,
            kind: None,
            explorer_url: None,
            updated_at: Utc::now(),
        }
    }
}

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::models::api_response::ApiResponse;
use crate::utils::short_message;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomError {
    #[error("Please connect your wallet first")]
    NoWallet,

    #[error("User rejected chain switch")]
    UserRejected,

    #[error("{0}")]
    ChainError(String),

    #[error("Invalid amount: {0}")]
    InvalidAmountError(String),

    #[error("Invalid address: {0}")]
    InvalidAddressError(String),

    #[error("Address is not a contract: {0}")]
    NotAContract(String),

    #[error("No contract address specified")]
    NoContractSelected,

    #[error("Unable to read contract data. The contract may not be deployed on {0}.")]
    ContractUnreadable(String),

    #[error("Contract not found or not deployed on {0}. The contract may only exist on a different network.")]
    ContractNotFound(String),

    #[error("Contract call failed. The contract may not support this function or is not properly deployed on {0}.")]
    ContractCallFailed(String),

    #[error("Transaction reverted: {0}")]
    RevertError(String),

    #[error("Network connection error. Please check your connection and try again.")]
    NetworkError,

    #[error("Transaction failed")]
    TransactionFailedError,

    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChainError(u64),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Error: {0}")]
    Unknown(String),
}

impl CustomError {
    /// Classifies a failed read call into the message shown for the active network.
    pub fn from_read(err: &CallError, network_name: &str) -> Self {
        match err {
            CallError::Decode(_) => CustomError::ContractNotFound(network_name.to_string()),
            CallError::Revert { .. } => CustomError::ContractCallFailed(network_name.to_string()),
            CallError::Network(_) => CustomError::NetworkError,
            CallError::Other(message) => CustomError::Unknown(short_message(message)),
        }
    }

    /// Classifies a failed write, preferring the revert reason, then a short summary of the
    /// underlying message, then the generic failure.
    pub fn from_write(err: &CallError) -> Self {
        match err {
            CallError::Revert {
                reason: Some(reason),
            } => CustomError::RevertError(reason.clone()),
            CallError::Network(_) => CustomError::NetworkError,
            CallError::Revert { reason: None } => CustomError::TransactionFailedError,
            CallError::Decode(message) | CallError::Other(message) => {
                let summary = short_message(message);
                if summary.is_empty() {
                    CustomError::TransactionFailedError
                } else {
                    CustomError::Unknown(summary)
                }
            }
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            CustomError::InvalidAmountError(_)
            | CustomError::InvalidAddressError(_)
            | CustomError::NotAContract(_)
            | CustomError::NoContractSelected
            | CustomError::UnsupportedNetwork(_)
            | CustomError::UnsupportedChainError(_)
            | CustomError::ValidationError(_) => StatusCode::BAD_REQUEST,
            CustomError::NoWallet => StatusCode::UNAUTHORIZED,
            CustomError::UserRejected => StatusCode::FORBIDDEN,
            CustomError::ContractUnreadable(_) | CustomError::ContractNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            CustomError::NetworkError => StatusCode::BAD_GATEWAY,
            CustomError::ChainError(_)
            | CustomError::ContractCallFailed(_)
            | CustomError::RevertError(_)
            | CustomError::TransactionFailedError
            | CustomError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure reported by the contract-call collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("could not decode result data: {0}")]
    Decode(String),

    #[error("execution reverted: {}", reason.as_deref().unwrap_or("unknown reason"))]
    Revert { reason: Option<String> },

    #[error("network error: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

impl CallError {
    /// Best-effort classification of an unstructured error message. Structured errors should be
    /// matched before falling back to this.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();

        if message.contains("BAD_DATA")
            || lower.contains("could not decode result data")
            || lower.contains("invalid data")
        {
            return CallError::Decode(message);
        }
        if let Some(index) = lower.find("execution reverted") {
            let rest = message[index + "execution reverted".len()..].trim_start_matches(':');
            // JSON-RPC errors render as "(code: 3, message: ..., data: None)"
            let end = [", data:", ", code:"]
                .iter()
                .filter_map(|field| rest.find(field))
                .min()
                .unwrap_or(rest.len());
            let mut reason = rest[..end].trim();
            if message.trim_start().starts_with('(') {
                reason = reason.trim_end_matches(')').trim_end();
            }
            let reason = (!reason.is_empty()).then(|| reason.to_string());
            return CallError::Revert { reason };
        }
        if lower.contains("call revert exception") {
            return CallError::Revert { reason: None };
        }
        if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("error sending request")
            || lower.contains("timed out")
        {
            return CallError::Network(message);
        }
        CallError::Other(message)
    }
}

/// Failure reported by the wallet for a chain switch or add request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Unrecognized chain: {0}")]
    UnrecognizedChain(String),

    #[error("{message}")]
    Rpc { code: Option<i64>, message: String },
}

impl WalletError {
    pub const USER_REJECTED_CODE: i64 = 4001;
    pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

    /// Maps an EIP-1193 error payload onto the distinguished wallet conditions.
    pub fn from_rpc(code: i64, message: &str) -> Self {
        if code == Self::UNRECOGNIZED_CHAIN_CODE
            || message.contains("Unrecognized chain")
            || message.contains("wallet_addEthereumChain")
        {
            WalletError::UnrecognizedChain(message.to_string())
        } else if code == Self::USER_REJECTED_CODE {
            WalletError::UserRejected
        } else {
            WalletError::Rpc {
                code: Some(code),
                message: message.to_string(),
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    code: u16,
    message: String,
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.http_status();
        let api_error = ApiError {
            code: code.as_u16(),
            message: self.to_string(),
        };

        HttpResponse::build(code).json(ApiResponse {
            status: "FAILURE".to_string(),
            code: api_error.code,
            result: None::<()>,
            error: Some(api_error),
        })
    }
}

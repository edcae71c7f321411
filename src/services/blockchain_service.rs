use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use ethers::{
    abi::Detokenize,
    contract::{abigen, ContractCall, ContractError},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::Signer,
    types::{Address, Bytes, TxHash, U256, U64},
};
use log::debug;

use crate::{
    errors::CallError,
    models::{contract::ContractTarget, network_config::NetworkConfig, transaction::WriteCall},
    services::wallet_service::TxSigner,
};

abigen!(
    StylusToken,
    r#"[
        function name() view returns (string)
        function symbol() view returns (string)
        function decimals() view returns (uint8)
        function totalSupply() view returns (uint256)
        function balanceOf(address account) view returns (uint256)
        function transfer(address recipient, uint256 amount) returns (bool)
        function allowance(address owner, address spender) view returns (uint256)
        function approve(address spender, uint256 amount) returns (bool)
        function transferFrom(address sender, address recipient, uint256 amount) returns (bool)
        function mint(uint256 value)
        function mintTo(address to, uint256 value)
        function burn(uint256 value)
    ]"#
);

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(300);

/// Read-only calls against the token contract.
#[async_trait]
pub trait TokenReader: Send + Sync {
    async fn name(&self, target: &ContractTarget) -> Result<String, CallError>;

    async fn symbol(&self, target: &ContractTarget) -> Result<String, CallError>;

    async fn decimals(&self, target: &ContractTarget) -> Result<u8, CallError>;

    async fn total_supply(&self, target: &ContractTarget) -> Result<U256, CallError>;

    async fn balance_of(&self, target: &ContractTarget, owner: Address)
        -> Result<U256, CallError>;

    async fn allowance(
        &self,
        target: &ContractTarget,
        owner: Address,
        spender: Address,
    ) -> Result<U256, CallError>;

    /// Deployed bytecode at `address`; empty for externally owned accounts.
    async fn code_at(
        &self,
        network: &'static NetworkConfig,
        address: Address,
    ) -> Result<Bytes, CallError>;
}

/// Signed write calls against the token contract.
#[async_trait]
pub trait TokenWriter: Send + Sync {
    /// Submit the call; resolves once the network accepted it.
    async fn send(
        &self,
        target: &ContractTarget,
        signer: &TxSigner,
        call: &WriteCall,
    ) -> Result<TxHash, CallError>;

    /// Resolves once the transaction is included, or fails if it reverted.
    async fn wait(&self, target: &ContractTarget, hash: TxHash) -> Result<(), CallError>;
}

/// Map an ethers contract error onto the collaborator error conditions.
pub fn classify_contract_error<M: Middleware>(err: ContractError<M>) -> CallError {
    if let Some(reason) = err.decode_revert::<String>() {
        return CallError::Revert {
            reason: Some(reason),
        };
    }
    if err.is_revert() {
        return CallError::Revert { reason: None };
    }
    match err {
        ContractError::DecodingError(e) => CallError::Decode(e.to_string()),
        ContractError::DetokenizationError(e) => CallError::Decode(e.to_string()),
        ContractError::ContractNotDeployed => {
            CallError::Decode("contract not deployed".to_string())
        }
        other => CallError::from_message(other.to_string()),
    }
}

#[derive(Clone, Debug)]
pub struct BlockchainClient {
    provider: Arc<Provider<Http>>,
    config: &'static NetworkConfig,
}

impl BlockchainClient {
    /// Create a new blockchain client for the network's public RPC
    pub fn new(config: &'static NetworkConfig) -> Result<Self, CallError> {
        let provider = Provider::<Http>::try_from(config.rpc_url)
            .map_err(|e| CallError::Network(e.to_string()))?;

        Ok(Self {
            provider: Arc::new(provider),
            config,
        })
    }

    fn token(&self, address: Address) -> StylusToken<Provider<Http>> {
        StylusToken::new(address, self.provider.clone())
    }

    pub async fn get_code(&self, address: Address) -> Result<Bytes, CallError> {
        self.provider
            .get_code(address, None)
            .await
            .map_err(|e| CallError::from_message(e.to_string()))
    }

    /// Poll for the receipt until it shows up or the timeout elapses.
    pub async fn wait_for_receipt(&self, hash: TxHash) -> Result<(), CallError> {
        let deadline = tokio::time::Instant::now() + RECEIPT_TIMEOUT;
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(hash)
                .await
                .map_err(|e| CallError::from_message(e.to_string()))?;

            if let Some(receipt) = receipt {
                debug!(
                    "Receipt for {hash:#x} on {} in block {:?}",
                    self.config.name, receipt.block_number
                );
                if receipt.status == Some(U64::zero()) {
                    return Err(CallError::Revert { reason: None });
                }
                return Ok(());
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(CallError::Other(format!(
                    "Timed out waiting for {hash:#x} to be mined"
                )));
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

async fn submit<M, D>(call: ContractCall<M, D>, from: Option<Address>) -> Result<TxHash, CallError>
where
    M: Middleware + 'static,
    D: Detokenize + Send + Sync,
{
    let call = match from {
        Some(from) => call.from(from),
        None => call,
    };
    let pending = call.send().await.map_err(classify_contract_error)?;
    Ok(pending.tx_hash())
}

async fn dispatch<M: Middleware + 'static>(
    token: StylusToken<M>,
    call: &WriteCall,
    from: Option<Address>,
) -> Result<TxHash, CallError> {
    match *call {
        WriteCall::Transfer { to, amount } => submit(token.transfer(to, amount), from).await,
        WriteCall::TransferFrom { from: owner, to, amount } => {
            submit(token.transfer_from(owner, to, amount), from).await
        }
        WriteCall::Approve { spender, amount } => {
            submit(token.approve(spender, amount), from).await
        }
        WriteCall::Mint { amount } => submit(token.mint(amount), from).await,
        WriteCall::MintTo { to, amount } => submit(token.mint_to(to, amount), from).await,
        WriteCall::Burn { amount } => submit(token.burn(amount), from).await,
    }
}

/// Contract calls over ethers. A fresh provider is built per call, so nothing is cached.
#[derive(Clone, Debug, Default)]
pub struct EthersGateway;

impl EthersGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TokenReader for EthersGateway {
    async fn name(&self, target: &ContractTarget) -> Result<String, CallError> {
        let client = BlockchainClient::new(target.network)?;
        client
            .token(target.address)
            .name()
            .call()
            .await
            .map_err(classify_contract_error)
    }

    async fn symbol(&self, target: &ContractTarget) -> Result<String, CallError> {
        let client = BlockchainClient::new(target.network)?;
        client
            .token(target.address)
            .symbol()
            .call()
            .await
            .map_err(classify_contract_error)
    }

    async fn decimals(&self, target: &ContractTarget) -> Result<u8, CallError> {
        let client = BlockchainClient::new(target.network)?;
        client
            .token(target.address)
            .decimals()
            .call()
            .await
            .map_err(classify_contract_error)
    }

    async fn total_supply(&self, target: &ContractTarget) -> Result<U256, CallError> {
        let client = BlockchainClient::new(target.network)?;
        client
            .token(target.address)
            .total_supply()
            .call()
            .await
            .map_err(classify_contract_error)
    }

    async fn balance_of(
        &self,
        target: &ContractTarget,
        owner: Address,
    ) -> Result<U256, CallError> {
        let client = BlockchainClient::new(target.network)?;
        client
            .token(target.address)
            .balance_of(owner)
            .call()
            .await
            .map_err(classify_contract_error)
    }

    async fn allowance(
        &self,
        target: &ContractTarget,
        owner: Address,
        spender: Address,
    ) -> Result<U256, CallError> {
        let client = BlockchainClient::new(target.network)?;
        client
            .token(target.address)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(classify_contract_error)
    }

    async fn code_at(
        &self,
        network: &'static NetworkConfig,
        address: Address,
    ) -> Result<Bytes, CallError> {
        BlockchainClient::new(network)?.get_code(address).await
    }
}

#[async_trait]
impl TokenWriter for EthersGateway {
    async fn send(
        &self,
        target: &ContractTarget,
        signer: &TxSigner,
        call: &WriteCall,
    ) -> Result<TxHash, CallError> {
        match signer {
            TxSigner::Local(wallet) => {
                let client = BlockchainClient::new(target.network)?;
                let wallet = wallet.clone().with_chain_id(target.network.chain_id);
                let middleware = Arc::new(SignerMiddleware::new(client.provider.clone(), wallet));
                dispatch(StylusToken::new(target.address, middleware), call, None).await
            }
            TxSigner::Remote { url, from } => {
                let provider = Provider::<Http>::try_from(url.as_str())
                    .map_err(|e| CallError::Network(e.to_string()))?;
                dispatch(
                    StylusToken::new(target.address, Arc::new(provider)),
                    call,
                    Some(*from),
                )
                .await
            }
        }
    }

    async fn wait(&self, target: &ContractTarget, hash: TxHash) -> Result<(), CallError> {
        BlockchainClient::new(target.network)?
            .wait_for_receipt(hash)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::network_config::NetworkId;
    use crate::services::network_config::get_network_config;

    #[test]
    fn clients_build_for_every_network() {
        for id in NetworkId::ALL {
            assert!(BlockchainClient::new(get_network_config(id)).is_ok());
        }
    }

    #[test]
    fn revert_data_carries_reason() {
        // Error(string) with "ERC20: insufficient balance"
        let data: Bytes = "0x08c379a0\
            0000000000000000000000000000000000000000000000000000000000000020\
            000000000000000000000000000000000000000000000000000000000000001b\
            45524332303a20696e73756666696369656e742062616c616e63650000000000"
            .parse()
            .unwrap();
        let err: ContractError<Provider<Http>> = ContractError::Revert(data);
        assert_eq!(
            classify_contract_error(err),
            CallError::Revert {
                reason: Some("ERC20: insufficient balance".to_string())
            }
        );
    }

    #[test]
    fn bare_revert_has_no_reason() {
        let err: ContractError<Provider<Http>> = ContractError::Revert(Bytes::default());
        assert_eq!(
            classify_contract_error(err),
            CallError::Revert { reason: None }
        );
    }

    #[test]
    fn missing_contract_is_a_decode_failure() {
        let err: ContractError<Provider<Http>> = ContractError::ContractNotDeployed;
        assert!(matches!(classify_contract_error(err), CallError::Decode(_)));
    }
}

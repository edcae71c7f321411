use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use log::{info, warn};
use serde::Serialize;

use crate::{
    errors::CustomError,
    models::{
        contract::{parse_address, ContractSelection, ContractTarget},
        network_config::{NetworkConfig, NetworkId},
        token::{TokenAmount, TokenSnapshot, TokenState},
        transaction::{StatusReport, WriteRequest},
        wallet::WalletInfo,
    },
    services::{
        blockchain_service::{TokenReader, TokenWriter},
        network_config::all_networks,
        token_service::TokenService,
        transaction_service::TransactionService,
        wallet_service::WalletSession,
    },
};

#[derive(Debug, Serialize)]
pub struct SelectionView {
    #[serde(flatten)]
    pub selection: ContractSelection,
    pub network_name: &'static str,
    pub chain_id: u64,
    pub explorer_url: Option<String>,
}

/// Everything the interaction panel needs: the selected contract, token state and writes.
pub struct PanelService {
    selection: RwLock<ContractSelection>,
    wallet: Arc<dyn WalletSession>,
    reader: Arc<dyn TokenReader>,
    tokens: Arc<TokenService>,
    transactions: TransactionService,
}

impl PanelService {
    pub fn new(
        selection: ContractSelection,
        wallet: Arc<dyn WalletSession>,
        reader: Arc<dyn TokenReader>,
        writer: Arc<dyn TokenWriter>,
        status_display: Duration,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(reader.clone()));
        let transactions =
            TransactionService::new(wallet.clone(), writer, tokens.clone(), status_display);
        Self {
            selection: RwLock::new(selection),
            wallet,
            reader,
            tokens,
            transactions,
        }
    }

    pub fn networks(&self) -> &'static [NetworkConfig] {
        all_networks()
    }

    pub fn selection(&self) -> SelectionView {
        let selection = self.current();
        let network = selection.network_config();
        SelectionView {
            network_name: network.name,
            chain_id: network.chain_id,
            explorer_url: selection
                .address
                .map(|address| network.address_url(&format!("{address:#x}"))),
            selection,
        }
    }

    pub fn wallet_info(&self) -> WalletInfo {
        self.wallet.info()
    }

    pub fn token_state(&self) -> TokenState {
        self.tokens.state()
    }

    pub fn status(&self) -> StatusReport {
        self.transactions.status()
    }

    fn current(&self) -> ContractSelection {
        self.selection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, change: impl FnOnce(&mut ContractSelection)) -> ContractSelection {
        let mut selection = self.selection.write().unwrap_or_else(PoisonError::into_inner);
        change(&mut selection);
        selection.clone()
    }

    fn target(&self) -> Result<ContractTarget, CustomError> {
        self.current().target()
    }

    pub async fn refresh_token(&self) -> Result<TokenSnapshot, CustomError> {
        let target = self.target()?;
        self.tokens.refresh(&target, self.wallet.address()).await
    }

    /// Token info is cleared and, if an address is selected, re-read.
    async fn reload(&self) {
        self.tokens.reset();
        match self.refresh_token().await {
            Ok(_) | Err(CustomError::NoContractSelected) => {}
            Err(e) => warn!("Reloading token info failed: {e}"),
        }
    }

    pub async fn select_network(&self, network: NetworkId) -> SelectionView {
        let selection = self.update(|selection| selection.switch_network(network));
        info!("Selected network {network}, contract {:?}", selection.address);
        self.reload().await;
        self.selection()
    }

    /// Point the panel at a user-supplied address after checking it holds code.
    pub async fn use_custom_contract(&self, address: &str) -> Result<SelectionView, CustomError> {
        let address = parse_address(address)?;
        let network = self.current().network_config();
        let code = self
            .reader
            .code_at(network, address)
            .await
            .map_err(|e| CustomError::from_read(&e, network.name))?;
        if code.is_empty() {
            return Err(CustomError::NotAContract(format!("{address:#x}")));
        }

        self.update(|selection| selection.use_custom(address));
        info!("Using custom contract {address:#x} on {}", network.name);
        self.reload().await;
        Ok(self.selection())
    }

    pub async fn use_default_contract(&self) -> SelectionView {
        self.update(ContractSelection::use_default);
        self.reload().await;
        self.selection()
    }

    pub async fn check_balance(&self, owner: &str) -> Result<TokenAmount, CustomError> {
        let owner = parse_address(owner)?;
        self.tokens.balance_of(&self.target()?, owner).await
    }

    pub async fn check_allowance(
        &self,
        owner: &str,
        spender: &str,
    ) -> Result<TokenAmount, CustomError> {
        let owner = parse_address(owner)?;
        let spender = parse_address(spender)?;
        self.tokens.allowance(&self.target()?, owner, spender).await
    }

    /// Run a write against the current selection and return once it settled.
    pub async fn submit(&self, request: WriteRequest) {
        match self.target() {
            Ok(target) => self.transactions.submit(&target, request).await,
            Err(e) => self.transactions.reject(request.kind(), e),
        }
    }
}

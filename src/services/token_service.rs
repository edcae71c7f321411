use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use ethers::types::Address;
use log::{debug, warn};
use tokio::sync::watch;

use crate::{
    errors::{CallError, CustomError},
    models::{
        contract::ContractTarget,
        token::{TokenAmount, TokenSnapshot, TokenState, DEFAULT_DECIMALS},
    },
    services::blockchain_service::TokenReader,
    utils::format_units,
};

/// Reads token metadata and owns the last snapshot shown to the user.
pub struct TokenService {
    reader: Arc<dyn TokenReader>,
    state: watch::Sender<TokenState>,
    /// Bumped on every reset; reads started under an older value are not stored.
    generation: AtomicU64,
}

fn absorb<T>(field: &str, result: Result<T, CallError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Reading {field} failed: {e}");
            None
        }
    }
}

impl TokenService {
    pub fn new(reader: Arc<dyn TokenReader>) -> Self {
        let (state, _) = watch::channel(TokenState::default());
        Self {
            reader,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> TokenState {
        self.state.borrow().clone()
    }

    /// Decimals of the current snapshot, or the ERC-20 default before the first read.
    pub fn decimals(&self) -> u8 {
        self.state
            .borrow()
            .snapshot
            .as_ref()
            .map_or(DEFAULT_DECIMALS, |snapshot| snapshot.decimals)
    }

    pub fn symbol(&self) -> Option<String> {
        self.state
            .borrow()
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.symbol.clone())
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Forget everything read so far; used when the selected contract changes.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(TokenState::default());
    }

    /// Re-query the contract. On failure the previous snapshot is kept and the error recorded
    /// next to it.
    pub async fn refresh(
        &self,
        target: &ContractTarget,
        caller: Option<Address>,
    ) -> Result<TokenSnapshot, CustomError> {
        self.refresh_as_of(self.generation(), target, caller).await
    }

    /// Like `refresh`, for a target chosen at `generation`. The outcome is returned but not
    /// stored if the state was reset since.
    pub async fn refresh_as_of(
        &self,
        generation: u64,
        target: &ContractTarget,
        caller: Option<Address>,
    ) -> Result<TokenSnapshot, CustomError> {
        let outcome = self.read(target, caller).await;
        let stored = self.state.send_if_modified(|state| {
            if self.generation() != generation {
                return false;
            }
            match &outcome {
                Ok(snapshot) => {
                    state.snapshot = Some(snapshot.clone());
                    state.error = None;
                }
                Err(e) => state.error = Some(e.to_string()),
            }
            true
        });

        if !stored {
            debug!(
                "Discarding token read for {:#x}, selection changed",
                target.address
            );
        } else if let Err(e) = &outcome {
            warn!(
                "Token read for {:#x} on {} failed: {e}",
                target.address, target.network.name
            );
        }
        outcome
    }

    async fn read(
        &self,
        target: &ContractTarget,
        caller: Option<Address>,
    ) -> Result<TokenSnapshot, CustomError> {
        let network = target.network;
        let (name, symbol, decimals, total_supply) = tokio::join!(
            self.reader.name(target),
            self.reader.symbol(target),
            self.reader.decimals(target),
            self.reader.total_supply(target),
        );

        let name = absorb("name", name);
        let symbol = absorb("symbol", symbol);
        if name.is_none() && symbol.is_none() {
            return Err(CustomError::ContractUnreadable(network.name.to_string()));
        }
        let decimals = absorb("decimals", decimals).unwrap_or(DEFAULT_DECIMALS);
        let total_supply = absorb("totalSupply", total_supply).unwrap_or_default();

        let (balance, balance_error) = match caller {
            Some(owner) => match self.reader.balance_of(target, owner).await {
                Ok(balance) => (Some(format_units(balance, decimals)), None),
                Err(e) => {
                    warn!("Error fetching balance for {owner:#x}: {e}");
                    (None, Some(CustomError::from_read(&e, network.name).to_string()))
                }
            },
            None => (None, None),
        };

        Ok(TokenSnapshot {
            name,
            symbol,
            decimals,
            total_supply: format_units(total_supply, decimals),
            balance,
            balance_error,
            fetched_at: Utc::now(),
        })
    }

    pub async fn balance_of(
        &self,
        target: &ContractTarget,
        owner: Address,
    ) -> Result<TokenAmount, CustomError> {
        let balance = self
            .reader
            .balance_of(target, owner)
            .await
            .map_err(|e| CustomError::from_read(&e, target.network.name))?;
        Ok(TokenAmount::new(balance, self.decimals()))
    }

    pub async fn allowance(
        &self,
        target: &ContractTarget,
        owner: Address,
        spender: Address,
    ) -> Result<TokenAmount, CustomError> {
        let allowance = self
            .reader
            .allowance(target, owner, spender)
            .await
            .map_err(|e| CustomError::from_read(&e, target.network.name))?;
        Ok(TokenAmount::new(allowance, self.decimals()))
    }
}

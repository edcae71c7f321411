//! Hand-written collaborators for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers::types::{Address, Bytes, TxHash, U256};
use tokio::sync::{watch, Notify};

use crate::{
    errors::{CallError, WalletError},
    models::{
        contract::ContractTarget,
        network_config::NetworkConfig,
        transaction::{StatusReport, TransactionStatus, WriteCall},
        wallet::AddChainParams,
    },
    services::{
        blockchain_service::{TokenReader, TokenWriter},
        wallet_service::{TxSigner, WalletSession},
    },
};

pub fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub struct MockWallet {
    connected: bool,
    chain_id: Mutex<u64>,
    switch_error: Option<WalletError>,
    add_error: Option<WalletError>,
    switches: Mutex<Vec<String>>,
    adds: Mutex<Vec<AddChainParams>>,
}

impl MockWallet {
    pub fn connected(chain_id: u64) -> Self {
        Self {
            connected: true,
            chain_id: Mutex::new(chain_id),
            switch_error: None,
            add_error: None,
            switches: Mutex::new(Vec::new()),
            adds: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::connected(0)
        }
    }

    pub fn with_switch_error(mut self, err: WalletError) -> Self {
        self.switch_error = Some(err);
        self
    }

    pub fn with_add_error(mut self, err: WalletError) -> Self {
        self.add_error = Some(err);
        self
    }

    pub fn switch_requests(&self) -> Vec<String> {
        self.switches.lock().unwrap().clone()
    }

    pub fn add_requests(&self) -> Vec<AddChainParams> {
        self.adds.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletSession for MockWallet {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn address(&self) -> Option<Address> {
        self.connected.then(|| address(0xaa))
    }

    fn chain_id(&self) -> Option<u64> {
        self.connected.then(|| *self.chain_id.lock().unwrap())
    }

    fn signer(&self) -> Option<TxSigner> {
        self.address().map(|from| TxSigner::Remote {
            url: "http://127.0.0.1:1248".to_string(),
            from,
        })
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<(), WalletError> {
        self.switches.lock().unwrap().push(chain_id.to_string());
        if let Some(err) = &self.switch_error {
            return Err(err.clone());
        }
        *self.chain_id.lock().unwrap() =
            u64::from_str_radix(chain_id.trim_start_matches("0x"), 16).unwrap();
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError> {
        self.adds.lock().unwrap().push(params.clone());
        match &self.add_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

pub struct MockToken {
    name: Result<String, CallError>,
    symbol: Result<String, CallError>,
    decimals: Result<u8, CallError>,
    total_supply: Result<U256, CallError>,
    balance: Result<U256, CallError>,
    allowance: Result<U256, CallError>,
    code: Result<Bytes, CallError>,
    send_result: Result<TxHash, CallError>,
    wait_result: Result<(), CallError>,
    confirmation_gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<&'static str>>,
    sent: Mutex<Vec<WriteCall>>,
    observer: Mutex<Option<watch::Receiver<StatusReport>>>,
    observed: Mutex<Vec<TransactionStatus>>,
    submitted: Notify,
}

impl MockToken {
    pub fn erc20(name: &str, symbol: &str, decimals: u8, total_supply: U256) -> Self {
        Self {
            name: Ok(name.to_string()),
            symbol: Ok(symbol.to_string()),
            decimals: Ok(decimals),
            total_supply: Ok(total_supply),
            balance: Ok(U256::zero()),
            allowance: Ok(U256::zero()),
            code: Ok(Bytes::from(vec![0x60, 0x80, 0x60, 0x40])),
            send_result: Ok(TxHash::repeat_byte(0x42)),
            wait_result: Ok(()),
            confirmation_gate: None,
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            observer: Mutex::new(None),
            observed: Mutex::new(Vec::new()),
            submitted: Notify::new(),
        }
    }

    pub fn with_name(mut self, name: Result<String, CallError>) -> Self {
        self.name = name;
        self
    }

    pub fn with_symbol(mut self, symbol: Result<String, CallError>) -> Self {
        self.symbol = symbol;
        self
    }

    pub fn with_decimals(mut self, decimals: Result<u8, CallError>) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_total_supply(mut self, total_supply: Result<U256, CallError>) -> Self {
        self.total_supply = total_supply;
        self
    }

    pub fn with_balance(mut self, balance: Result<U256, CallError>) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_allowance(mut self, allowance: Result<U256, CallError>) -> Self {
        self.allowance = allowance;
        self
    }

    pub fn with_code(mut self, code: Result<Bytes, CallError>) -> Self {
        self.code = code;
        self
    }

    pub fn with_send_result(mut self, result: Result<TxHash, CallError>) -> Self {
        self.send_result = result;
        self
    }

    pub fn with_wait_result(mut self, result: Result<(), CallError>) -> Self {
        self.wait_result = result;
        self
    }

    /// Make `wait` block until the returned handle is notified.
    pub fn hold_confirmation(&mut self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.confirmation_gate = Some(gate.clone());
        gate
    }

    /// Record the status visible to the collaborator on every `send` and `wait`.
    pub fn observe(&self, status: watch::Receiver<StatusReport>) {
        *self.observer.lock().unwrap() = Some(status);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn sent(&self) -> Vec<WriteCall> {
        self.sent.lock().unwrap().clone()
    }

    pub fn observed(&self) -> Vec<TransactionStatus> {
        self.observed.lock().unwrap().clone()
    }

    /// Resolves once a write has been handed to `send`.
    pub async fn submitted(&self) {
        self.submitted.notified().await
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
        if let Some(status) = self.observer.lock().unwrap().as_ref() {
            let current = status.borrow().status.clone();
            self.observed.lock().unwrap().push(current);
        }
    }
}

#[async_trait]
impl TokenReader for MockToken {
    async fn name(&self, _target: &ContractTarget) -> Result<String, CallError> {
        self.calls.lock().unwrap().push("name");
        self.name.clone()
    }

    async fn symbol(&self, _target: &ContractTarget) -> Result<String, CallError> {
        self.calls.lock().unwrap().push("symbol");
        self.symbol.clone()
    }

    async fn decimals(&self, _target: &ContractTarget) -> Result<u8, CallError> {
        self.calls.lock().unwrap().push("decimals");
        self.decimals.clone()
    }

    async fn total_supply(&self, _target: &ContractTarget) -> Result<U256, CallError> {
        self.calls.lock().unwrap().push("totalSupply");
        self.total_supply.clone()
    }

    async fn balance_of(
        &self,
        _target: &ContractTarget,
        _owner: Address,
    ) -> Result<U256, CallError> {
        self.calls.lock().unwrap().push("balanceOf");
        self.balance.clone()
    }

    async fn allowance(
        &self,
        _target: &ContractTarget,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, CallError> {
        self.calls.lock().unwrap().push("allowance");
        self.allowance.clone()
    }

    async fn code_at(
        &self,
        _network: &'static NetworkConfig,
        _address: Address,
    ) -> Result<Bytes, CallError> {
        self.calls.lock().unwrap().push("getCode");
        self.code.clone()
    }
}

#[async_trait]
impl TokenWriter for MockToken {
    async fn send(
        &self,
        _target: &ContractTarget,
        _signer: &TxSigner,
        call: &WriteCall,
    ) -> Result<TxHash, CallError> {
        self.record("send");
        self.sent.lock().unwrap().push(call.clone());
        self.submitted.notify_one();
        self.send_result.clone()
    }

    async fn wait(&self, _target: &ContractTarget, _hash: TxHash) -> Result<(), CallError> {
        self.record("wait");
        if let Some(gate) = self.confirmation_gate.clone() {
            gate.notified().await;
        }
        self.wait_result.clone()
    }
}

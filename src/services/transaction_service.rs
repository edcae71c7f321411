use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use ethers::types::TxHash;
use log::{debug, info, warn};
use tokio::{sync::watch, task::JoinHandle};
use uuid::Uuid;

use crate::{
    errors::CustomError,
    models::{
        contract::ContractTarget,
        transaction::{
            StatusReport, TransactionStatus, WriteKind, WriteRequest, CONFIRMING,
            WAITING_FOR_CONFIRMATION,
        },
    },
    services::{
        blockchain_service::TokenWriter, chain_service::ChainNegotiator,
        token_service::TokenService, wallet_service::WalletSession,
    },
};

pub const DEFAULT_STATUS_DISPLAY: Duration = Duration::from_secs(5);

/// Runs one write at a time and tracks it through `idle -> pending -> success | error -> idle`.
#[derive(Clone)]
pub struct TransactionService {
    inner: Arc<Inner>,
}

struct Inner {
    wallet: Arc<dyn WalletSession>,
    negotiator: ChainNegotiator,
    writer: Arc<dyn TokenWriter>,
    tokens: Arc<TokenService>,
    status: watch::Sender<StatusReport>,
    revert_timer: Mutex<Option<JoinHandle<()>>>,
    display_timeout: Duration,
}

enum Admission {
    Busy,
    Rejected(Uuid, CustomError),
    Accepted(Uuid),
}

impl TransactionService {
    pub fn new(
        wallet: Arc<dyn WalletSession>,
        writer: Arc<dyn TokenWriter>,
        tokens: Arc<TokenService>,
        display_timeout: Duration,
    ) -> Self {
        let (status, _) = watch::channel(StatusReport::idle());
        Self {
            inner: Arc::new(Inner {
                negotiator: ChainNegotiator::new(wallet.clone()),
                wallet,
                writer,
                tokens,
                status,
                revert_timer: Mutex::new(None),
                display_timeout,
            }),
        }
    }

    pub fn status(&self) -> StatusReport {
        self.inner.status.borrow().clone()
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<StatusReport> {
        self.inner.status.subscribe()
    }

    /// Run a write against `target`. Dropped without effect while another write is pending.
    pub async fn submit(&self, target: &ContractTarget, request: WriteRequest) {
        let kind = request.kind();
        let attempt = match self.admit(kind, None) {
            Admission::Busy => {
                debug!("Transaction already pending, skipping {kind:?}");
                return;
            }
            Admission::Rejected(attempt, reason) => {
                warn!("{kind:?} not attempted: {reason}");
                self.schedule_revert(attempt);
                return;
            }
            Admission::Accepted(attempt) => attempt,
        };
        // token state reset after this point belongs to another selection
        let generation = self.inner.tokens.generation();
        info!(
            "Accepted {kind:?} on {} for {:#x} ({attempt})",
            target.network.name, target.address
        );

        let mut hash = None;
        match self.execute(attempt, target, &request, &mut hash).await {
            Ok(()) => {
                let symbol = self.inner.tokens.symbol();
                let message = request.success_message(symbol.as_deref().unwrap_or("tokens"));
                info!("{kind:?} confirmed: {message}");
                self.publish(attempt, target, TransactionStatus::Success { message, hash });
                self.schedule_revert(attempt);

                if self.inner.tokens.generation() != generation {
                    debug!("Selection changed during {kind:?}, skipping refresh");
                } else if let Err(e) = self
                    .inner
                    .tokens
                    .refresh_as_of(generation, target, self.inner.wallet.address())
                    .await
                {
                    warn!("Refresh after {kind:?} failed: {e}");
                }
            }
            Err(err) => {
                warn!("{kind:?} failed: {err}");
                self.publish(
                    attempt,
                    target,
                    TransactionStatus::Error {
                        message: err.to_string(),
                        hash,
                    },
                );
                self.schedule_revert(attempt);
            }
        }
    }

    /// Surface a failure that happened before a write could be attempted, e.g. no contract
    /// selected. Subject to the same pending guard as `submit`.
    pub fn reject(&self, kind: WriteKind, reason: CustomError) {
        if let Admission::Rejected(attempt, reason) = self.admit(kind, Some(reason)) {
            warn!("{kind:?} not attempted: {reason}");
            self.schedule_revert(attempt);
        }
    }

    fn admit(&self, kind: WriteKind, rejection: Option<CustomError>) -> Admission {
        let rejection = match rejection {
            Some(reason) => Some(reason),
            None if !self.inner.wallet.is_connected() => Some(CustomError::NoWallet),
            None => None,
        };

        let mut admission = Admission::Busy;
        self.inner.status.send_if_modified(|report| {
            if report.status.is_pending() {
                return false;
            }
            let attempt = Uuid::new_v4();
            let status = match rejection {
                Some(reason) => {
                    let status = TransactionStatus::Error {
                        message: reason.to_string(),
                        hash: None,
                    };
                    admission = Admission::Rejected(attempt, reason);
                    status
                }
                None => {
                    admission = Admission::Accepted(attempt);
                    TransactionStatus::pending(CONFIRMING, None)
                }
            };
            *report = StatusReport {
                status,
                attempt: Some(attempt),
                kind: Some(kind),
                explorer_url: None,
                updated_at: Utc::now(),
            };
            true
        });

        if !matches!(admission, Admission::Busy) {
            self.cancel_revert();
        }
        admission
    }

    async fn execute(
        &self,
        attempt: Uuid,
        target: &ContractTarget,
        request: &WriteRequest,
        hash: &mut Option<TxHash>,
    ) -> Result<(), CustomError> {
        self.inner.negotiator.ensure_chain(target.network).await?;

        let call = request.resolve(self.inner.tokens.decimals())?;
        let signer = self.inner.wallet.signer().ok_or(CustomError::NoWallet)?;

        let submitted = self
            .inner
            .writer
            .send(target, &signer, &call)
            .await
            .map_err(|e| CustomError::from_write(&e))?;
        *hash = Some(submitted);
        info!("Transaction submitted: {submitted:#x}");
        self.publish(
            attempt,
            target,
            TransactionStatus::pending(WAITING_FOR_CONFIRMATION, Some(submitted)),
        );

        self.inner
            .writer
            .wait(target, submitted)
            .await
            .map_err(|e| CustomError::from_write(&e))
    }

    fn publish(&self, attempt: Uuid, target: &ContractTarget, status: TransactionStatus) {
        debug!("Attempt {attempt}: {}", status.message().unwrap_or("idle"));
        self.inner.status.send_if_modified(|report| {
            if report.attempt != Some(attempt) {
                return false;
            }
            report.explorer_url = status
                .hash()
                .map(|hash| target.network.tx_url(&format!("{hash:#x}")));
            report.status = status;
            report.updated_at = Utc::now();
            true
        });
    }

    fn cancel_revert(&self) {
        let mut timer = self
            .inner
            .revert_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timer.take() {
            previous.abort();
        }
    }

    /// Return to idle after the display timeout, unless a newer attempt took over.
    fn schedule_revert(&self, attempt: Uuid) {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let timeout = self.inner.display_timeout;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = inner.upgrade() {
                inner.status.send_if_modified(|report| {
                    if report.attempt != Some(attempt) || !report.status.is_terminal() {
                        return false;
                    }
                    *report = StatusReport::idle();
                    true
                });
            }
        });

        let mut timer = self
            .inner
            .revert_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timer.replace(handle) {
            previous.abort();
        }
    }
}

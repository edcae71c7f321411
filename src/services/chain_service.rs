use std::sync::Arc;

use log::{info, warn};

use crate::{
    errors::{CustomError, WalletError},
    models::{network_config::NetworkConfig, wallet::AddChainParams},
    services::wallet_service::WalletSession,
};

/// Gets the wallet onto the network a write is about to target.
///
/// When the wallet does not know the chain, an add-chain request is issued and negotiation ends
/// once the wallet accepts it. Whether the wallet also switches after adding is the wallet's
/// business; the switch is not requested again here.
#[derive(Clone)]
pub struct ChainNegotiator {
    wallet: Arc<dyn WalletSession>,
}

impl ChainNegotiator {
    pub fn new(wallet: Arc<dyn WalletSession>) -> Self {
        Self { wallet }
    }

    pub async fn ensure_chain(&self, target: &NetworkConfig) -> Result<(), CustomError> {
        if !self.wallet.is_connected() {
            return Err(CustomError::NoWallet);
        }
        if self.wallet.chain_id() == Some(target.chain_id) {
            return Ok(());
        }

        let chain_id = target.chain_id_hex();
        info!(
            "Switching wallet from chain {:?} to {} ({chain_id})",
            self.wallet.chain_id(),
            target.name
        );

        match self.wallet.switch_chain(&chain_id).await {
            Ok(()) => Ok(()),
            Err(WalletError::UnrecognizedChain(_)) => {
                info!("{} unknown to wallet, requesting add", target.name);
                self.wallet
                    .add_chain(&AddChainParams::from(target))
                    .await
                    .map_err(|e| {
                        warn!("Adding {} failed: {e}", target.name);
                        CustomError::ChainError(format!(
                            "Failed to add {} to wallet: {e}",
                            target.name
                        ))
                    })
            }
            Err(WalletError::UserRejected) => Err(CustomError::UserRejected),
            Err(e) => {
                warn!("Switching to {} failed: {e}", target.name);
                Err(CustomError::ChainError(e.to_string()))
            }
        }
    }
}

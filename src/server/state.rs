//! Shared server state
//!
//! Everything a session task needs from the rest of the server, handed to
//! each task explicitly at spawn time.

use std::sync::Arc;

use crate::auth::CredentialStore;
use crate::client::SessionRegistry;
use crate::config::ServerConfig;
use crate::transfer::{FileTransfer, TransferLedger};

#[derive(Clone)]
pub struct SharedState {
    pub registry: Arc<SessionRegistry>,
    pub credentials: Arc<CredentialStore>,
    pub transfer: Arc<dyn FileTransfer>,
    pub config: Arc<ServerConfig>,
}

impl SharedState {
    /// Fresh state with empty stores and the in-memory transfer ledger.
    pub fn new(config: ServerConfig) -> Self {
        let ledger = Arc::new(TransferLedger::new(config.max_filename_length));
        Self::with_transfer(config, ledger)
    }

    pub fn with_transfer(config: ServerConfig, transfer: Arc<dyn FileTransfer>) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            credentials: Arc::new(CredentialStore::new()),
            transfer,
            config: Arc::new(config),
        }
    }
}

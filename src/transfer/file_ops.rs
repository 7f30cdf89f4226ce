//! Module `file_ops`
//!
//! The `/file` side effect. The session layer only sees the `FileTransfer`
//! trait; the bundled `TransferLedger` accepts a request, derives the name
//! shown to other users, and keeps an in-memory record of it. No file
//! contents move anywhere.

use chrono::Local;
use log::info;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::error::TransferError;
use crate::transfer::results::{TransferReceipt, TransferRequest};

/// Collaborator invoked by the `/file` command.
pub trait FileTransfer: Send + Sync {
    fn transfer(&self, username: &str, path: &str) -> Result<TransferReceipt, TransferError>;
}

/// In-memory record of every accepted transfer request.
pub struct TransferLedger {
    max_filename_length: usize,
    requests: Mutex<Vec<TransferRequest>>,
}

impl TransferLedger {
    pub fn new(max_filename_length: usize) -> Self {
        Self {
            max_filename_length,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the requests accepted so far, oldest first.
    pub fn requests(&self) -> Vec<TransferRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Derives the name other users see: the final component of the path.
fn display_name(path: &str) -> Result<String, TransferError> {
    if path.trim().is_empty() || path.contains('\0') {
        return Err(TransferError::InvalidPath(path.to_string()));
    }

    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| TransferError::InvalidPath(path.to_string()))
}

impl FileTransfer for TransferLedger {
    fn transfer(&self, username: &str, path: &str) -> Result<TransferReceipt, TransferError> {
        let display_name = display_name(path)?;
        if display_name.len() > self.max_filename_length {
            return Err(TransferError::NameTooLong(self.max_filename_length));
        }

        let request = TransferRequest {
            username: username.to_string(),
            path: path.to_string(),
            display_name: display_name.clone(),
            requested_at: Local::now(),
        };
        info!(
            "[{}] Transfer requested by {}: {} ({})",
            request.requested_at.format("%H:%M:%S"),
            username,
            display_name,
            path
        );

        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        Ok(TransferReceipt { display_name })
    }
}

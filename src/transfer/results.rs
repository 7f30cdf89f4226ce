//! Transfer result types
//!
//! Defines result structures returned by transfer operations.

use chrono::{DateTime, Local};

/// Result of an accepted transfer request
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub display_name: String,
}

/// A transfer request as recorded by the ledger
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub username: String,
    pub path: String,
    pub display_name: String,
    pub requested_at: DateTime<Local>,
}

//! Transfer module for the chat server
//!
//! Handles the side effect behind the `/file` command.

pub mod file_ops;
pub mod results;

// Re-export key types
pub use file_ops::{FileTransfer, TransferLedger};
pub use results::{TransferReceipt, TransferRequest};

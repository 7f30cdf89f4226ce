//! Server core functionality
//!
//! This module contains the listener and accept loop, and the state shared
//! by every session task.

pub mod core;
pub mod state;

pub use self::core::Server;
pub use state::SharedState;

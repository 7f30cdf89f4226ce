//! Client management system
//!
//! Handles client connections, the session registry, and session lifecycle.

pub mod handler;
pub mod registry;
pub mod session;
pub mod state;

pub use handler::handle_connection;
pub use registry::{BroadcastReport, SessionRegistry};
pub use session::{SessionHandle, SessionId};
pub use state::{Session, SessionState};

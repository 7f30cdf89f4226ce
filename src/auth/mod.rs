//! Authentication system
//!
//! Handles the login/register handshake, credential storage, and input validation.

pub mod credentials;
pub mod handshake;
pub mod results;
pub mod validator;

pub use credentials::CredentialStore;
pub use handshake::authenticate;
pub use results::{AuthMethod, AuthSuccess};

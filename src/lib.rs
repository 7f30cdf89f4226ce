pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod transfer;
pub mod utils;

pub use server::Server;

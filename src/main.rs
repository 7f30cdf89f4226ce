//! RAX Chat Server - Entry Point
//!
//! A multi-client line-oriented chat server with login/registration,
//! broadcast messaging, and slash commands.

use log::info;

use rax_chat_server::Server;
use rax_chat_server::config::ServerConfig;
use rax_chat_server::error::ChatServerError;
use rax_chat_server::error::handlers::handle_error;
use rax_chat_server::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    setup_logging();

    info!("Launching chat server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            handle_error(&ChatServerError::from(e));
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            handle_error(&e);
            std::process::exit(1);
        }
    };

    server.start().await;
}

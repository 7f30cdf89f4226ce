use log::{error, info};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::client::handle_connection;
use crate::config::ServerConfig;
use crate::error::ChatServerError;
use crate::server::state::SharedState;

pub struct Server {
    listener: TcpListener,
    state: SharedState,
}

impl Server {
    /// Binds the listener described by `config`.
    pub async fn bind(config: ServerConfig) -> Result<Self, ChatServerError> {
        let socket = config.listen_socket();

        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e.into());
            }
        };

        Ok(Self {
            listener,
            state: SharedState::new(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Accepts connections forever, one task per connection.
    pub async fn start(self) {
        info!("Starting Rax chat server, waiting for clients...");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = self.state.clone();

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        handle_connection(stream, addr.to_string(), state).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::files::Dispatcher;
use crate::http::connection::Connection;

/// Accepts connections forever, serving each one on its own task.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let dispatcher = Arc::new(Dispatcher::from_config(&cfg.static_files)?);
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!(
        "Listening on {}, serving {}",
        cfg.server.listen_addr,
        dispatcher.root().display()
    );

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let conn = Connection::new(socket, dispatcher.clone(), &cfg.server);
        tokio::spawn(async move {
            if let Err(e) = conn.run().await {
                error!("Connection error from {}: {:#}", peer, e);
            }
        });
    }
}

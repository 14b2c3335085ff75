use doh_relay_domain::config::ServerConfig;
use doh_relay_infrastructure::dns::RelayHandler;
use hickory_server::ServerFuture;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tracing::{error, info};

const TCP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the enabled listeners until they stop on their own or a shutdown
/// signal arrives; on signal, stop accepting and let in-flight queries
/// finish.
pub async fn start_dns_server(config: &ServerConfig, handler: RelayHandler) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = format!("{}:{}", config.bind_address, config.port).parse()?;

    let mut server = ServerFuture::new(handler);

    if config.udp {
        let socket = UdpSocket::bind(socket_addr).await?;
        info!(bind_address = %socket_addr, "starting UDP listener");
        server.register_socket(socket);
    }

    if config.tcp {
        let listener = TcpListener::bind(socket_addr).await?;
        info!(bind_address = %socket_addr, "starting TCP listener");
        server.register_listener(listener, TCP_REQUEST_TIMEOUT);
    }

    let stopped_by_signal = tokio::select! {
        result = server.block_until_done() => {
            result?;
            false
        }
        _ = shutdown_signal() => true,
    };

    if stopped_by_signal {
        info!("shutdown signal received, draining in-flight queries");
        if let Err(e) = server.shutdown_gracefully().await {
            error!(error = %e, "error during graceful shutdown");
        }
    }

    info!("listeners stopped");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

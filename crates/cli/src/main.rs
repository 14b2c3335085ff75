use clap::Parser;
use doh_relay_domain::CliOverrides;
use doh_relay_infrastructure::dns::RelayHandler;
use doh_relay_infrastructure::doh::DohClient;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod bootstrap;
mod server;

#[derive(Parser)]
#[command(name = "doh-relay")]
#[command(version)]
#[command(about = "A DNS-protocol proxy for DNS-over-HTTPS resolution services")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Serve address (ip:port or :port)
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// DNS-over-HTTPS endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// IPs of the endpoint; if provided, endpoint lookup is skipped
    #[arg(long = "endpoint-ips", value_delimiter = ',')]
    endpoint_ips: Vec<IpAddr>,

    /// DNS servers used to look up the endpoint; system default if absent
    #[arg(short = 'd', long = "dns-servers", value_delimiter = ',')]
    dns_servers: Vec<String>,

    /// SOCKS5 (or HTTP) proxy server for the upstream exchange
    #[arg(short = 'p', long)]
    proxy: Option<String>,

    /// EDNS client subnet sent with every upstream request
    #[arg(short = 'e', long)]
    edns: Option<String>,

    /// Disable padding of upstream requests to identical length buckets
    #[arg(short = 'N', long = "no-pad")]
    no_pad: bool,

    /// Disable TLS certificate verification
    #[arg(short = 'I', long)]
    insecure: bool,

    /// Listen on UDP
    #[arg(short = 'U', long)]
    udp: bool,

    /// Listen on TCP
    #[arg(short = 'T', long)]
    tcp: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        listen: cli.listen,
        endpoint: cli.endpoint,
        endpoint_ips: cli.endpoint_ips,
        dns_servers: cli.dns_servers,
        proxy: cli.proxy,
        edns_client_subnet: cli.edns,
        no_pad: cli.no_pad,
        insecure: cli.insecure,
        udp: cli.udp,
        tcp: cli.tcp,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting doh-relay v{}", env!("CARGO_PKG_VERSION"));
    info!(endpoint = %config.upstream.endpoint, "using DoH endpoint");

    let upstream = Arc::new(config.upstream.clone());
    let deadline = Duration::from_millis(upstream.deadline_ms);

    // The endpoint URL is the only thing that can stop the engine from
    // starting; resolution and every upstream exchange are per-query.
    let provider = Arc::new(DohClient::new(upstream)?);
    let handler = RelayHandler::new(provider, deadline);

    server::start_dns_server(&config.server, handler).await?;

    info!("server shutdown complete");
    Ok(())
}

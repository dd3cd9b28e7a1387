use clap::Parser;
use mdns_relay_application::use_cases::ReloadMappingsUseCase;
use mdns_relay_domain::{CliOverrides, Config};
use mdns_relay_infrastructure::dns::ResolutionCache;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

mod bootstrap;
mod di;
mod server;

const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "mdns-relay")]
#[command(version)]
#[command(about = "DNS forwarder that answers configured domains from multicast DNS")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream resolver (host:port, or an IP for port 53)
    #[arg(short = 'u', long)]
    upstream: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        upstream: cli.upstream.clone(),
        log_level: cli.log_level.clone(),
    };

    let config_path = cli.config.clone().or_else(Config::get_config_path);
    let config = bootstrap::load_config(config_path.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);
    bootstrap::log_config_summary(&config, config_path.as_deref());

    info!("Starting mdns-relay v{}", env!("CARGO_PKG_VERSION"));

    let services = di::DnsServices::new(&config)?;

    let listen_addr: SocketAddr = config.server.listen_address().parse()?;
    let socket = server::bind_udp_socket(listen_addr).map_err(|e| {
        error!(bind_address = %listen_addr, error = %e, "Failed to bind DNS socket");
        e
    })?;

    if let Some(cache) = services.cache.clone() {
        spawn_cache_sweeper(cache);
    }
    spawn_reload_on_sighup(services.reload.clone(), config_path);

    tokio::select! {
        result = server::run_udp_server(socket, services.handler.clone(), config.server.max_concurrent_queries) => {
            result?;
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

fn spawn_cache_sweeper(cache: Arc<ResolutionCache>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = cache.evict_expired();
            if removed > 0 {
                tracing::debug!(removed, "Expired cache entries evicted");
            }
        }
    });
}

#[cfg(unix)]
fn spawn_reload_on_sighup(reload: Arc<ReloadMappingsUseCase>, config_path: Option<String>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "SIGHUP handler unavailable, reload disabled");
            return;
        }
    };

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            let Some(path) = config_path.as_deref() else {
                warn!("SIGHUP received but no configuration file is in use");
                continue;
            };
            match bootstrap::reload_special_domains(reload.clone(), path.to_string()).await {
                Ok(count) => info!(config_file = path, special_domains = count, "Configuration reloaded"),
                Err(e) => error!(config_file = path, error = %e, "Reload failed, keeping previous special domains"),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_on_sighup(_reload: Arc<ReloadMappingsUseCase>, _config_path: Option<String>) {}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

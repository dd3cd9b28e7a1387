use mdns_relay_application::use_cases::ReloadMappingsUseCase;
use mdns_relay_domain::{CliOverrides, Config};
use std::sync::Arc;
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}

/// Needs the subscriber from `init_logging` to be installed.
pub fn log_config_summary(config: &Config, config_path: Option<&str>) {
    info!(
        config_file = config_path.unwrap_or("default"),
        dns_port = config.server.dns_port,
        bind = %config.server.bind_address,
        upstream = %config.upstream.server,
        special_domains = config.special_domains.len(),
        "Configuration loaded"
    );
}

/// Re-reads the special domains off the async workers.
pub async fn reload_special_domains(
    reload: Arc<ReloadMappingsUseCase>,
    config_path: String,
) -> anyhow::Result<usize> {
    let count = tokio::task::spawn_blocking(move || reload.execute(&config_path)).await??;
    Ok(count)
}

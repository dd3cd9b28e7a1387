use mdns_relay_application::ports::{MdnsResolver, ResolutionCachePort, UpstreamForwarder};
use mdns_relay_application::services::{DomainMatcher, MappingTable};
use mdns_relay_application::use_cases::{HandleDnsQueryUseCase, ReloadMappingsUseCase};
use mdns_relay_domain::Config;
use mdns_relay_infrastructure::dns::{DnsServerHandler, MdnsClient, ResolutionCache, UdpTransport};
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub handler: Arc<DnsServerHandler>,
    pub reload: Arc<ReloadMappingsUseCase>,
    pub cache: Option<Arc<ResolutionCache>>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let table = MappingTable::from_config(config)?;
        info!(special_domains = table.len(), "Special domain table built");
        let matcher = Arc::new(DomainMatcher::new(table));

        let mdns: Arc<dyn MdnsResolver> = Arc::new(MdnsClient::from_config(&config.mdns)?);
        let upstream: Arc<dyn UpstreamForwarder> =
            Arc::new(UdpTransport::from_config(&config.upstream)?);
        info!(
            upstream = %upstream.server(),
            mdns_group = %config.mdns.group,
            mdns_timeout_ms = config.mdns.timeout_ms,
            "Resolvers initialized"
        );

        let cache = config
            .mdns
            .cache_enabled
            .then(|| Arc::new(ResolutionCache::new()));

        let mut use_case = HandleDnsQueryUseCase::new(matcher.clone(), mdns, upstream)
            .with_static_ttl(config.mdns.static_ttl);
        let mut reload = ReloadMappingsUseCase::new(matcher);

        if let Some(cache) = &cache {
            let port: Arc<dyn ResolutionCachePort> = cache.clone();
            use_case = use_case.with_cache(port.clone());
            reload = reload.with_cache(port);
        }

        Ok(Self {
            handler: Arc::new(DnsServerHandler::new(Arc::new(use_case))),
            reload: Arc::new(reload),
            cache,
        })
    }
}

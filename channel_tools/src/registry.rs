use std::sync::Arc;

use log::info;
use stock_sync_engine::{db_types::ChannelId, registry::ChannelRegistry};

use crate::{
    AllegroApi,
    AllegroConfig,
    ConnectorError,
    EmpikApi,
    EmpikConfig,
    ErliApi,
    ErliConfig,
    StorefrontApi,
    StorefrontConfig,
    ALLEGRO_BRAND,
    ALLEGRO_MAIN,
    ALLEGRO_OUTLET,
};

/// Builds the standard six-channel registry from the environment: three Allegro accounts sharing one developer
/// application, Erli, Empik, and the storefront.
pub fn standard_registry_from_env() -> Result<ChannelRegistry, ConnectorError> {
    let allegro = AllegroConfig::from_env_or_default();
    let mut registry = ChannelRegistry::new();
    for account in [ALLEGRO_MAIN, ALLEGRO_OUTLET, ALLEGRO_BRAND] {
        registry.register(Arc::new(AllegroApi::new(ChannelId::from(account), allegro.clone())?));
    }
    registry.register(Arc::new(ErliApi::new(ErliConfig::from_env_or_default())?));
    registry.register(Arc::new(EmpikApi::new(EmpikConfig::from_env_or_default())?));
    registry.register(Arc::new(StorefrontApi::new(StorefrontConfig::from_env_or_default())?));
    info!(
        "🛒️ Channel registry ready: {}",
        registry.channels().iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
    );
    Ok(registry)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn standard_registry_contains_all_six_channels() {
        let registry = standard_registry_from_env().unwrap();
        assert_eq!(registry.len(), 6);
        for channel in [ALLEGRO_MAIN, ALLEGRO_OUTLET, ALLEGRO_BRAND, crate::ERLI, crate::EMPIK, crate::STOREFRONT] {
            assert!(registry.get(&ChannelId::from(channel)).is_some(), "missing {channel}");
        }
    }
}

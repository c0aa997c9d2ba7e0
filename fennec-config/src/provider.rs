use crate::loader::ConfigLoad;
use crate::models::ClientConfig;
use fennec_core::PagingOptions;
use fennec_player::CoordinatorOptions;

/// Read access to client configuration for the layers that need it.
pub trait ConfigProvider: Send + Sync {
    fn client_config(&self) -> &ClientConfig;

    fn paging_options(&self) -> PagingOptions {
        self.client_config().paging.clone().into()
    }

    fn coordinator_options(&self) -> CoordinatorOptions {
        self.client_config().player.clone().into()
    }
}

/// A fixed configuration, e.g. the result of one load.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: ClientConfig,
}

impl StaticConfigProvider {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn client_config(&self) -> &ClientConfig {
        &self.config
    }
}

impl ConfigProvider for ConfigLoad {
    fn client_config(&self) -> &ClientConfig {
        &self.config
    }
}

use serde::Deserialize;

use crate::config::fetcher::FetcherConfig;
use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub fetcher: FetcherConfig,
}

//! Settings baked in at build time
//!
//! `build.rs` forwards these from the environment or a `.env` file.

use stalink_core::config::ConfigError;
use stalink_core::credentials::CredentialsError;
use stalink_core::report::HOSTNAME_MAX_LEN;
use stalink_core::{AuthMode, LinkConfig, StationCredentials};

const DEFAULT_HOSTNAME: &str = "stalink";

pub fn credentials() -> Result<StationCredentials, CredentialsError> {
    let ssid = option_env!("WIFI_SSID").unwrap_or("");
    let passphrase = option_env!("WIFI_PASSWORD").unwrap_or("");
    let min_auth_mode = if passphrase.is_empty() {
        AuthMode::Open
    } else {
        AuthMode::default()
    };

    StationCredentials::new(ssid, passphrase, min_auth_mode)
}

pub fn link_config() -> Result<LinkConfig, ConfigError> {
    LinkConfig::from_env_strs(
        option_env!("WIFI_MAX_RETRY"),
        option_env!("WIFI_CONNECT_TIMEOUT_MS"),
    )
}

/// DHCP hostname, falling back to the default when unset or too long
pub fn hostname() -> &'static str {
    match option_env!("STA_HOSTNAME") {
        Some(name) if !name.is_empty() && name.len() <= HOSTNAME_MAX_LEN => name,
        _ => DEFAULT_HOSTNAME,
    }
}

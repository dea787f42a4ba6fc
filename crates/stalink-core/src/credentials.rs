//! Station credentials
//!
//! The network name and pre-shared key the station associates with, plus the
//! weakest authentication mode it will accept from the access point.

use core::fmt;

use heapless::String;
use thiserror_no_std::Error;

/// Longest network name the 802.11 SSID element can carry
pub const SSID_MAX_LEN: usize = 32;

/// Longest WPA passphrase (63 ASCII characters or a 64 digit hex key)
pub const PASSPHRASE_MAX_LEN: usize = 64;

/// Minimum authentication mode the station accepts from an access point
///
/// Access points advertising a weaker mode are skipped during association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    Open,
    Wep,
    Wpa,
    #[default]
    Wpa2Personal,
    WpaWpa2Personal,
    Wpa3Personal,
    Wpa2Wpa3Personal,
}

impl AuthMode {
    /// Whether this mode needs a passphrase
    pub const fn requires_passphrase(self) -> bool {
        !matches!(self, Self::Open)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("network name is empty")]
    EmptySsid,
    #[error("network name is {0} bytes, the limit is 32")]
    SsidTooLong(usize),
    #[error("passphrase is {0} bytes, the limit is 64")]
    PassphraseTooLong(usize),
    #[error("auth mode {0:?} requires a passphrase")]
    MissingPassphrase(AuthMode),
}

/// Immutable credentials for a single network
///
/// Validated on construction; there are no setters.
#[derive(Clone, PartialEq, Eq)]
pub struct StationCredentials {
    ssid: String<SSID_MAX_LEN>,
    passphrase: String<PASSPHRASE_MAX_LEN>,
    min_auth_mode: AuthMode,
}

impl StationCredentials {
    pub fn new(
        ssid: &str,
        passphrase: &str,
        min_auth_mode: AuthMode,
    ) -> Result<Self, CredentialsError> {
        if ssid.is_empty() {
            return Err(CredentialsError::EmptySsid);
        }
        if passphrase.is_empty() && min_auth_mode.requires_passphrase() {
            return Err(CredentialsError::MissingPassphrase(min_auth_mode));
        }

        let ssid: String<SSID_MAX_LEN> =
            String::try_from(ssid).map_err(|_| CredentialsError::SsidTooLong(ssid.len()))?;
        let passphrase: String<PASSPHRASE_MAX_LEN> = String::try_from(passphrase)
            .map_err(|_| CredentialsError::PassphraseTooLong(passphrase.len()))?;

        Ok(Self {
            ssid,
            passphrase,
            min_auth_mode,
        })
    }

    /// Credentials for a WPA2-Personal network, the common home router setup
    pub fn wpa2(ssid: &str, passphrase: &str) -> Result<Self, CredentialsError> {
        Self::new(ssid, passphrase, AuthMode::Wpa2Personal)
    }

    pub fn ssid(&self) -> &str {
        self.ssid.as_str()
    }

    pub fn passphrase(&self) -> &str {
        self.passphrase.as_str()
    }

    pub fn min_auth_mode(&self) -> AuthMode {
        self.min_auth_mode
    }
}

// Keeps the passphrase out of logs.
impl fmt::Debug for StationCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StationCredentials")
            .field("ssid", &self.ssid.as_str())
            .field("passphrase", &"<redacted>")
            .field("min_auth_mode", &self.min_auth_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::format;

    #[test]
    fn test_accepts_limits() {
        let ssid = "s".repeat(SSID_MAX_LEN);
        let passphrase = "p".repeat(PASSPHRASE_MAX_LEN);

        let credentials = StationCredentials::wpa2(&ssid, &passphrase).unwrap();

        assert_eq!(credentials.ssid().len(), SSID_MAX_LEN);
        assert_eq!(credentials.passphrase().len(), PASSPHRASE_MAX_LEN);
        assert_eq!(credentials.min_auth_mode(), AuthMode::Wpa2Personal);
    }

    #[test]
    fn test_rejects_oversized_fields() {
        let long_ssid = "s".repeat(SSID_MAX_LEN + 1);
        let long_passphrase = "p".repeat(PASSPHRASE_MAX_LEN + 1);

        assert_eq!(
            StationCredentials::wpa2(&long_ssid, "secret123"),
            Err(CredentialsError::SsidTooLong(33))
        );
        assert_eq!(
            StationCredentials::wpa2("home", &long_passphrase),
            Err(CredentialsError::PassphraseTooLong(65))
        );
    }

    #[test]
    fn test_rejects_empty_ssid() {
        assert_eq!(
            StationCredentials::wpa2("", "secret123"),
            Err(CredentialsError::EmptySsid)
        );
    }

    #[test]
    fn test_passphrase_required_unless_open() {
        assert_eq!(
            StationCredentials::wpa2("home", ""),
            Err(CredentialsError::MissingPassphrase(AuthMode::Wpa2Personal))
        );

        let open = StationCredentials::new("cafe", "", AuthMode::Open).unwrap();
        assert_eq!(open.passphrase(), "");
    }

    #[test]
    fn test_debug_redacts_passphrase() {
        let credentials = StationCredentials::wpa2("home", "hunter2hunter2").unwrap();
        let rendered = format!("{:?}", credentials);

        assert!(rendered.contains("home"));
        assert!(!rendered.contains("hunter2"));
    }
}

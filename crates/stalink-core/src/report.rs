//! One-shot status report after the first successful association
//!
//! Every query can fail on its own because the network stack may not have the
//! value yet. Missing values are left out of the report; they never abort it.

use core::fmt;
use core::net::Ipv4Addr;

use heapless::String;
use log::{debug, info};

use crate::credentials::SSID_MAX_LEN;
use crate::error::LinkError;

pub const HOSTNAME_MAX_LEN: usize = 32;

/// Addressing bound to the station interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpInfo {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Option<Ipv4Addr>,
}

/// Station hardware address, printed as `AA:BB:CC:DD:EE:FF`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddress(pub [u8; 6]);

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Queries against the live network stack
pub trait NetworkInfo {
    /// Name of the network the station is associated with
    fn ssid(&self) -> Option<String<SSID_MAX_LEN>>;

    /// Primary radio channel of the access point
    fn channel(&self) -> Option<u8>;

    /// Signal strength in dBm
    fn rssi(&self) -> Option<i8>;

    fn ip_info(&self) -> Option<IpInfo>;

    fn mac_address(&self) -> Option<MacAddress>;

    /// Hostname announced over DHCP
    fn hostname(&self) -> Option<String<HOSTNAME_MAX_LEN>>;

    /// Free bytes on the dynamic heap
    fn free_heap(&self) -> Option<usize>;
}

/// Point-in-time read of the link metadata
///
/// Captured fresh every time; nothing here is cached between reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionSnapshot {
    pub ssid: Option<String<SSID_MAX_LEN>>,
    pub channel: Option<u8>,
    pub rssi: Option<i8>,
    pub ip: Option<IpInfo>,
    pub mac: Option<MacAddress>,
    pub hostname: Option<String<HOSTNAME_MAX_LEN>>,
    pub free_heap: Option<usize>,
}

impl ConnectionSnapshot {
    pub fn capture(info: &impl NetworkInfo) -> Self {
        Self {
            ssid: info.ssid(),
            channel: info.channel(),
            rssi: info.rssi(),
            ip: info.ip_info(),
            mac: info.mac_address(),
            hostname: info.hostname(),
            free_heap: info.free_heap(),
        }
    }

    /// Names of the fields the stack could not provide
    pub fn missing(&self) -> impl Iterator<Item = &'static str> + '_ {
        [
            ("ssid", self.ssid.is_none()),
            ("channel", self.channel.is_none()),
            ("rssi", self.rssi.is_none()),
            ("ip info", self.ip.is_none()),
            ("mac address", self.mac.is_none()),
            ("hostname", self.hostname.is_none()),
            ("free heap", self.free_heap.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
    }

    /// Report lines for the fields that are present
    pub fn lines(&self) -> impl Iterator<Item = ReportLine<'_>> + '_ {
        let radio = match (self.channel, self.rssi) {
            (None, None) => None,
            (channel, rssi) => Some(ReportLine::Radio { channel, rssi }),
        };

        [
            self.ssid.as_ref().map(|ssid| ReportLine::Ssid(ssid.as_str())),
            radio,
            self.ip.map(ReportLine::Addressing),
            self.mac.map(ReportLine::Mac),
            self.hostname
                .as_ref()
                .map(|hostname| ReportLine::Hostname(hostname.as_str())),
            self.free_heap.map(ReportLine::FreeHeap),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLine<'a> {
    Ssid(&'a str),
    Radio {
        channel: Option<u8>,
        rssi: Option<i8>,
    },
    Addressing(IpInfo),
    Mac(MacAddress),
    Hostname(&'a str),
    FreeHeap(usize),
}

impl fmt::Display for ReportLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssid(ssid) => write!(f, "Connected SSID: {}", ssid),
            Self::Radio { channel, rssi } => {
                if let Some(channel) = channel {
                    write!(f, "Channel: {}", channel)?;
                }
                if channel.is_some() && rssi.is_some() {
                    f.write_str("  ")?;
                }
                if let Some(rssi) = rssi {
                    write!(f, "RSSI: {} dBm", rssi)?;
                }
                Ok(())
            }
            Self::Addressing(ip) => {
                write!(f, "IP: {}", ip.address)?;
                if let Some(gateway) = ip.gateway {
                    write!(f, "  GW: {}", gateway)?;
                }
                write!(f, "  MASK: {}", ip.netmask)
            }
            Self::Mac(mac) => write!(f, "MAC: {}", mac),
            Self::Hostname(hostname) => write!(f, "Hostname: {}", hostname),
            Self::FreeHeap(bytes) => write!(f, "Free heap: {} bytes", bytes),
        }
    }
}

pub struct StatusReporter;

impl StatusReporter {
    /// Query the stack and log whatever it can provide
    pub fn report(info: &impl NetworkInfo) {
        let snapshot = ConnectionSnapshot::capture(info);

        for line in snapshot.lines() {
            info!("{}", line);
        }
        for field in snapshot.missing() {
            debug!("{}", LinkError::MetadataUnavailable(field));
        }
    }
}

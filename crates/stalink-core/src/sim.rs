//! Scripted stand-in for a radio driver
//!
//! Replays a fixed list of association replies so the orchestrator can be
//! exercised on a host: in unit tests and in the desktop simulator.

use alloc::collections::VecDeque;
use core::cell::Cell;
use core::net::Ipv4Addr;

use heapless::String;
use thiserror_no_std::Error;

use crate::credentials::{SSID_MAX_LEN, StationCredentials};
use crate::event::{EventQueue, StationEvent};
use crate::report::{HOSTNAME_MAX_LEN, IpInfo, MacAddress, NetworkInfo};
use crate::station::Station;

/// How the simulated access point answers one association request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationReply {
    /// The attempt fails with a disconnect reason code
    Reject { reason: u8 },
    /// The station associates on `channel` and DHCP binds `address`
    Accept { channel: u8, address: Ipv4Addr },
    /// Nothing ever comes back
    Silent,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    #[error("simulated driver refused to start")]
    StartRefused,
    #[error("station has not been configured")]
    NotConfigured,
}

/// What the simulated stack answers to status queries; `None` fields are unavailable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedNetwork {
    pub ssid: Option<String<SSID_MAX_LEN>>,
    pub channel: Option<u8>,
    pub rssi: Option<i8>,
    pub ip: Option<IpInfo>,
    pub mac: Option<MacAddress>,
    pub hostname: Option<String<HOSTNAME_MAX_LEN>>,
    pub free_heap: Option<usize>,
}

impl Default for SimulatedNetwork {
    fn default() -> Self {
        Self {
            ssid: String::try_from("stalink-lab").ok(),
            channel: Some(6),
            rssi: Some(-58),
            ip: Some(IpInfo {
                address: Ipv4Addr::new(192, 168, 4, 23),
                netmask: Ipv4Addr::new(255, 255, 255, 0),
                gateway: Some(Ipv4Addr::new(192, 168, 4, 1)),
            }),
            mac: Some(MacAddress([0x34, 0x85, 0x18, 0x6a, 0x11, 0x02])),
            hostname: String::try_from("stalink").ok(),
            free_heap: Some(192_512),
        }
    }
}

impl SimulatedNetwork {
    pub fn without_hostname(mut self) -> Self {
        self.hostname = None;
        self
    }
}

pub struct ScriptedStation {
    events: Option<&'static EventQueue>,
    replies: VecDeque<AssociationReply>,
    network: SimulatedNetwork,
    emits_start: bool,
    refuses_start: bool,
    configured: Option<StationCredentials>,
    association_requests: usize,
    ssid_queries: Cell<usize>,
}

impl ScriptedStation {
    pub fn new(network: SimulatedNetwork) -> Self {
        Self {
            events: None,
            replies: VecDeque::new(),
            network,
            emits_start: true,
            refuses_start: false,
            configured: None,
            association_requests: 0,
            ssid_queries: Cell::new(0),
        }
    }

    /// Queue replies for the next association requests, in order
    ///
    /// Requests beyond the script get no reply.
    pub fn with_replies(mut self, replies: impl IntoIterator<Item = AssociationReply>) -> Self {
        self.replies.extend(replies);
        self
    }

    /// Never post the `Started` event
    pub fn without_start_event(mut self) -> Self {
        self.emits_start = false;
        self
    }

    /// Fail `start()` outright
    pub fn refusing_start(mut self) -> Self {
        self.refuses_start = true;
        self
    }

    /// Post an event as if the driver raised it unprompted
    pub fn inject(&self, event: StationEvent) -> bool {
        self.events.is_some_and(|events| events.post(event))
    }

    pub fn association_requests(&self) -> usize {
        self.association_requests
    }

    /// How many status reports queried this station
    pub fn ssid_queries(&self) -> usize {
        self.ssid_queries.get()
    }

    pub fn configured(&self) -> Option<&StationCredentials> {
        self.configured.as_ref()
    }
}

impl Station for ScriptedStation {
    type Error = SimError;

    fn subscribe(&mut self, events: &'static EventQueue) {
        self.events = Some(events);
    }

    fn configure(&mut self, credentials: &StationCredentials) -> Result<(), SimError> {
        self.configured = Some(credentials.clone());
        Ok(())
    }

    async fn start(&mut self) -> Result<(), SimError> {
        if self.refuses_start {
            return Err(SimError::StartRefused);
        }
        if self.configured.is_none() {
            return Err(SimError::NotConfigured);
        }
        if self.emits_start {
            self.inject(StationEvent::Started);
        }
        Ok(())
    }

    fn request_association(&mut self) -> Result<(), SimError> {
        self.association_requests += 1;

        match self.replies.pop_front().unwrap_or(AssociationReply::Silent) {
            AssociationReply::Reject { reason } => {
                self.inject(StationEvent::Disconnected { reason });
            }
            AssociationReply::Accept { channel, address } => {
                self.inject(StationEvent::Associated { channel });
                self.inject(StationEvent::AddressAcquired(address));
            }
            AssociationReply::Silent => {}
        }
        Ok(())
    }
}

impl NetworkInfo for ScriptedStation {
    fn ssid(&self) -> Option<String<SSID_MAX_LEN>> {
        self.ssid_queries.set(self.ssid_queries.get() + 1);
        self.network.ssid.clone()
    }

    fn channel(&self) -> Option<u8> {
        self.network.channel
    }

    fn rssi(&self) -> Option<i8> {
        self.network.rssi
    }

    fn ip_info(&self) -> Option<IpInfo> {
        self.network.ip
    }

    fn mac_address(&self) -> Option<MacAddress> {
        self.network.mac
    }

    fn hostname(&self) -> Option<String<HOSTNAME_MAX_LEN>> {
        self.network.hostname.clone()
    }

    fn free_heap(&self) -> Option<usize> {
        self.network.free_heap
    }
}

//! [`Station`] and [`NetworkInfo`] on top of esp-radio and embassy-net

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_net::Stack;
use esp_radio::wifi::event::{self, EventExt};
use esp_radio::wifi::{AuthMethod, ClientConfig, ModeConfig, WifiController, WifiError};
use heapless::String;
use log::trace;

use stalink_core::credentials::SSID_MAX_LEN;
use stalink_core::report::{HOSTNAME_MAX_LEN, IpInfo, MacAddress};
use stalink_core::{AuthMode, EventQueue, NetworkInfo, Station, StationCredentials, StationEvent};

/// The access point the station is currently associated with
#[derive(Debug, Clone)]
struct Association {
    ssid: String<SSID_MAX_LEN>,
    channel: u8,
}

static ASSOCIATION: Mutex<RefCell<Option<Association>>> = Mutex::new(RefCell::new(None));

fn set_association(association: Option<Association>) {
    critical_section::with(|cs| *ASSOCIATION.borrow_ref_mut(cs) = association);
}

fn association() -> Option<Association> {
    critical_section::with(|cs| ASSOCIATION.borrow_ref(cs).clone())
}

fn auth_method(mode: AuthMode) -> AuthMethod {
    match mode {
        AuthMode::Open => AuthMethod::None,
        AuthMode::Wep => AuthMethod::Wep,
        AuthMode::Wpa => AuthMethod::Wpa,
        AuthMode::Wpa2Personal => AuthMethod::Wpa2Personal,
        AuthMode::WpaWpa2Personal => AuthMethod::WpaWpa2Personal,
        AuthMode::Wpa3Personal => AuthMethod::Wpa3Personal,
        AuthMode::Wpa2Wpa3Personal => AuthMethod::Wpa2Wpa3Personal,
    }
}

pub struct EspStation {
    controller: WifiController<'static>,
    stack: Stack<'static>,
    mac: MacAddress,
    hostname: Option<String<HOSTNAME_MAX_LEN>>,
}

impl EspStation {
    pub fn new(
        controller: WifiController<'static>,
        stack: Stack<'static>,
        mac: MacAddress,
        hostname: &str,
    ) -> Self {
        Self {
            controller,
            stack,
            mac,
            hostname: String::try_from(hostname).ok(),
        }
    }
}

impl Station for EspStation {
    type Error = WifiError;

    fn subscribe(&mut self, events: &'static EventQueue) {
        event::StaStart::update_handler(move |_| {
            events.post(StationEvent::Started);
        });

        event::StaConnected::update_handler(move |event| {
            let ssid_len = (event.ssid_len() as usize).min(event.ssid().len());
            let ssid = core::str::from_utf8(&event.ssid()[..ssid_len])
                .ok()
                .and_then(|ssid| String::try_from(ssid).ok())
                .unwrap_or_default();
            set_association(Some(Association {
                ssid,
                channel: event.channel(),
            }));
            events.post(StationEvent::Associated {
                channel: event.channel(),
            });
        });

        event::StaDisconnected::update_handler(move |event| {
            trace!("sta_disconnected rssi={}", event.rssi());
            set_association(None);
            events.post(StationEvent::Disconnected {
                reason: event.reason(),
            });
        });

        event::StaStop::update_handler(move |_| {
            set_association(None);
            events.post(StationEvent::Stopped);
        });
    }

    fn configure(&mut self, credentials: &StationCredentials) -> Result<(), WifiError> {
        let client = ClientConfig::default()
            .with_ssid(credentials.ssid().into())
            .with_password(credentials.passphrase().into())
            .with_auth_method(auth_method(credentials.min_auth_mode()));

        self.controller.set_config(&ModeConfig::Client(client))
    }

    async fn start(&mut self) -> Result<(), WifiError> {
        self.controller.start_async().await
    }

    fn request_association(&mut self) -> Result<(), WifiError> {
        self.controller.connect()
    }
}

impl NetworkInfo for EspStation {
    fn ssid(&self) -> Option<String<SSID_MAX_LEN>> {
        association()
            .map(|association| association.ssid)
            .filter(|ssid| !ssid.is_empty())
    }

    fn channel(&self) -> Option<u8> {
        association().map(|association| association.channel)
    }

    fn rssi(&self) -> Option<i8> {
        self.controller
            .rssi()
            .ok()
            .and_then(|rssi| i8::try_from(rssi).ok())
    }

    fn ip_info(&self) -> Option<IpInfo> {
        self.stack.config_v4().map(|config| IpInfo {
            address: config.address.address(),
            netmask: config.address.netmask(),
            gateway: config.gateway,
        })
    }

    fn mac_address(&self) -> Option<MacAddress> {
        Some(self.mac)
    }

    fn hostname(&self) -> Option<String<HOSTNAME_MAX_LEN>> {
        self.hostname.clone()
    }

    fn free_heap(&self) -> Option<usize> {
        Some(esp_alloc::HEAP.free())
    }
}

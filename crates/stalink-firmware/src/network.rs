//! Radio and IP stack bring-up, plus the tasks that keep them running

use embassy_net::{Config, DhcpConfig, Runner, Stack, StackResources};
use esp_hal::peripherals::WIFI;
use esp_hal::rng::Rng;
use esp_radio::wifi::{WifiController, WifiDevice};
use log::debug;
use static_cell::StaticCell;

use stalink_core::report::MacAddress;
use stalink_core::{EventQueue, LinkError, StationEvent};

pub struct Radio {
    pub controller: WifiController<'static>,
    pub runner: Runner<'static, WifiDevice<'static>>,
    pub stack: Stack<'static>,
    pub mac: MacAddress,
}

/// Initialise the radio and an embassy-net stack on its station interface
///
/// Must only be called once.
pub fn setup(wifi: WIFI<'static>, hostname: &str) -> Result<Radio, LinkError> {
    static RADIO_CTRL: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
    static STACK_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

    let radio_ctrl = RADIO_CTRL.init(esp_radio::init().map_err(LinkError::driver)?);
    let (controller, interfaces) =
        esp_radio::wifi::new(radio_ctrl, wifi, Default::default()).map_err(LinkError::driver)?;
    let mac = MacAddress(interfaces.sta.mac_address());

    let mut dhcp = DhcpConfig::default();
    dhcp.hostname = hostname.try_into().ok();

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        Config::dhcpv4(dhcp),
        STACK_RESOURCES.init(StackResources::<3>::new()),
        seed,
    );

    Ok(Radio {
        controller,
        runner,
        stack,
        mac,
    })
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Turn DHCP leases into `AddressAcquired` events
#[embassy_executor::task]
pub async fn address_watch_task(stack: Stack<'static>, events: &'static EventQueue) {
    loop {
        stack.wait_config_up().await;
        if let Some(config) = stack.config_v4() {
            events.post(StationEvent::AddressAcquired(config.address.address()));
        }

        stack.wait_config_down().await;
        debug!("DHCP lease lost");
    }
}

#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_time::Duration;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info, warn};

use stalink_core::{ConnectionOrchestrator, LinkConfig, LinkResources, Outcome};
use stalink_firmware::blink::blink;
use stalink_firmware::network::{self, address_watch_task, net_task};
use stalink_firmware::settings;
use stalink_firmware::station::EspStation;

const BLINK_PERIOD: Duration = Duration::from_millis(500);

static LINK: LinkResources = LinkResources::new();

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 66320);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    info!("Embassy initialized!");

    let led = Output::new(peripherals.GPIO8, Level::Low, OutputConfig::default());

    let credentials = match settings::credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            error!("WiFi credentials unusable, staying offline: {}", err);
            blink(led, BLINK_PERIOD).await
        }
    };

    let link_config = settings::link_config().unwrap_or_else(|err| {
        warn!("Ignoring WiFi tuning from the build environment: {}", err);
        LinkConfig::default()
    });

    let hostname = settings::hostname();
    let radio = match network::setup(peripherals.WIFI, hostname) {
        Ok(radio) => radio,
        Err(err) => {
            error!("Failed to connect to SSID: {}: {}", credentials.ssid(), err);
            blink(led, BLINK_PERIOD).await
        }
    };

    spawner.must_spawn(net_task(radio.runner));
    spawner.must_spawn(address_watch_task(radio.stack, &LINK.events));

    let station = EspStation::new(radio.controller, radio.stack, radio.mac, hostname);
    let mut orchestrator = ConnectionOrchestrator::new(station, &LINK);

    let outcome = orchestrator
        .connect(
            &credentials,
            link_config.retry_limit,
            link_config.connect_timeout,
        )
        .await;
    if outcome != Outcome::Connected {
        warn!("Continuing without network: {:?}", outcome);
    }

    match select(blink(led, BLINK_PERIOD), orchestrator.supervise()).await {
        Either::First(never) | Either::Second(never) => never,
    }
}

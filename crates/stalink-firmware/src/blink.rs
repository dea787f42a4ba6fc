use embassy_time::{Duration, Timer};
use embedded_hal::digital::StatefulOutputPin;
use log::warn;

/// Toggle `led` every `period`, forever
pub async fn blink<P: StatefulOutputPin>(mut led: P, period: Duration) -> ! {
    loop {
        if let Err(err) = led.toggle() {
            warn!("LED toggle failed: {:?}", err);
        }
        Timer::after(period).await;
    }
}

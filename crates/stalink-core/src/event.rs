//! Station events and the queue that carries them
//!
//! Radio drivers call back from their own context. Those callbacks only post
//! a [`StationEvent`] into an [`EventQueue`]; the orchestrator is the single
//! consumer and the only place connection state changes.

use core::cell::Cell;
use core::net::Ipv4Addr;

use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

/// Queue depth; one association round trip posts at most two events
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Events delivered by the network stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationEvent {
    /// The station role is up and may associate
    Started,
    /// Layer 2 association succeeded; an address has not been assigned yet
    Associated { channel: u8 },
    /// Association failed or an established link dropped
    Disconnected { reason: u8 },
    /// DHCP bound an address to the station interface
    AddressAcquired(Ipv4Addr),
    /// The station role was stopped
    Stopped,
}

/// Human readable label for an 802.11 / driver disconnect reason code
pub fn disconnect_reason_label(reason: u8) -> &'static str {
    match reason {
        1 => "unspecified",
        2 => "auth_expire",
        3 => "auth_leave",
        4 => "assoc_expire",
        8 => "assoc_leave",
        15 => "4way_handshake_timeout",
        200 => "beacon_timeout",
        201 => "no_ap_found",
        202 => "auth_fail",
        203 => "assoc_fail",
        204 => "handshake_timeout",
        205 => "connection_fail",
        210 => "no_ap_found_compatible_security",
        211 => "no_ap_found_authmode_threshold",
        212 => "no_ap_found_rssi_threshold",
        _ => "other",
    }
}

/// Bounded handoff from the driver's callback context to the orchestrator
pub struct EventQueue {
    channel: Channel<CriticalSectionRawMutex, StationEvent, EVENT_QUEUE_DEPTH>,
    dropped: BlockingMutex<CriticalSectionRawMutex, Cell<u32>>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: BlockingMutex::new(Cell::new(0)),
        }
    }

    /// Post an event without blocking
    ///
    /// Safe to call from driver callbacks. Returns `false` and counts the
    /// event as dropped when the queue is full.
    pub fn post(&self, event: StationEvent) -> bool {
        match self.channel.try_send(event) {
            Ok(()) => true,
            Err(_) => {
                let dropped = self.dropped.lock(|count| {
                    count.set(count.get().saturating_add(1));
                    count.get()
                });
                warn!("Station event queue full, dropped {:?} ({} total)", event, dropped);
                false
            }
        }
    }

    /// Wait for the next event
    pub async fn next(&self) -> StationEvent {
        self.channel.receive().await
    }

    /// Discard every queued event, returning how many were removed
    pub fn drain(&self) -> usize {
        let mut drained = 0;
        while self.channel.try_receive().is_ok() {
            drained += 1;
        }
        drained
    }

    /// Number of events lost to a full queue since boot
    pub fn dropped(&self) -> u32 {
        self.dropped.lock(|count| count.get())
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_and_drain() {
        let queue = EventQueue::new();

        assert!(queue.post(StationEvent::Started));
        assert!(queue.post(StationEvent::Disconnected { reason: 201 }));

        assert_eq!(queue.drain(), 2);
        assert_eq!(queue.drain(), 0);
    }

    #[test]
    fn test_full_queue_counts_drops() {
        let queue = EventQueue::new();

        for _ in 0..EVENT_QUEUE_DEPTH {
            assert!(queue.post(StationEvent::Started));
        }
        assert!(!queue.post(StationEvent::Stopped));
        assert!(!queue.post(StationEvent::Stopped));

        assert_eq!(queue.dropped(), 2);
        assert_eq!(queue.drain(), EVENT_QUEUE_DEPTH);
    }

    #[test]
    fn test_events_keep_order() {
        let queue = EventQueue::new();
        let address = Ipv4Addr::new(192, 168, 1, 42);

        queue.post(StationEvent::Started);
        queue.post(StationEvent::AddressAcquired(address));

        embassy_futures::block_on(async {
            assert_eq!(queue.next().await, StationEvent::Started);
            assert_eq!(queue.next().await, StationEvent::AddressAcquired(address));
        });
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(disconnect_reason_label(201), "no_ap_found");
        assert_eq!(disconnect_reason_label(202), "auth_fail");
        assert_eq!(disconnect_reason_label(99), "other");
    }
}

//! Terminal outcome signal
//!
//! Two mutually exclusive flags, CONNECTED and FAILED. Once one is raised the
//! other is refused until the flag is observed or the signal is reset, so a
//! waiter sees exactly one terminal value per attempt. Observing a flag
//! clears it.

use core::cell::Cell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::waitqueue::AtomicWaker;

const CONNECTED_BIT: u8 = 1 << 0;
const FAILED_BIT: u8 = 1 << 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFlag {
    Connected,
    Failed,
}

impl LinkFlag {
    const fn bit(self) -> u8 {
        match self {
            Self::Connected => CONNECTED_BIT,
            Self::Failed => FAILED_BIT,
        }
    }

    const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            CONNECTED_BIT => Some(Self::Connected),
            FAILED_BIT => Some(Self::Failed),
            _ => None,
        }
    }
}

pub struct LinkSignal {
    bits: BlockingMutex<CriticalSectionRawMutex, Cell<u8>>,
    waker: AtomicWaker,
}

impl LinkSignal {
    pub const fn new() -> Self {
        Self {
            bits: BlockingMutex::new(Cell::new(0)),
            waker: AtomicWaker::new(),
        }
    }

    /// Raise a flag
    ///
    /// Returns `false` without changing anything if a flag is already raised.
    pub fn raise(&self, flag: LinkFlag) -> bool {
        let raised = self.bits.lock(|bits| {
            if bits.get() != 0 {
                return false;
            }
            bits.set(flag.bit());
            true
        });
        if raised {
            self.waker.wake();
        }
        raised
    }

    /// The raised flag, if any, without clearing it
    pub fn peek(&self) -> Option<LinkFlag> {
        LinkFlag::from_bits(self.bits.lock(|bits| bits.get()))
    }

    /// Observe and clear the raised flag
    pub fn take(&self) -> Option<LinkFlag> {
        LinkFlag::from_bits(self.bits.lock(|bits| bits.replace(0)))
    }

    /// Clear any raised flag
    pub fn reset(&self) {
        self.bits.lock(|bits| bits.set(0));
    }

    /// Raw flag bits, for checking the exclusivity invariant
    pub fn bits(&self) -> u8 {
        self.bits.lock(|bits| bits.get())
    }

    /// Wait until a flag is raised, then observe and clear it
    pub async fn wait(&self) -> LinkFlag {
        poll_fn(|cx| {
            self.waker.register(cx.waker());
            match self.take() {
                Some(flag) => Poll::Ready(flag),
                None => Poll::Pending,
            }
        })
        .await
    }
}

impl Default for LinkSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_flag_wins() {
        let signal = LinkSignal::new();

        assert!(signal.raise(LinkFlag::Connected));
        assert!(!signal.raise(LinkFlag::Failed));
        assert_eq!(signal.bits(), CONNECTED_BIT);
        assert_eq!(signal.peek(), Some(LinkFlag::Connected));
    }

    #[test]
    fn test_take_clears() {
        let signal = LinkSignal::new();
        signal.raise(LinkFlag::Failed);

        assert_eq!(signal.take(), Some(LinkFlag::Failed));
        assert_eq!(signal.take(), None);
        assert!(signal.raise(LinkFlag::Connected));
    }

    #[test]
    fn test_reset_discards_stale_flag() {
        let signal = LinkSignal::new();
        signal.raise(LinkFlag::Failed);
        signal.reset();

        assert_eq!(signal.peek(), None);
        assert_eq!(signal.bits(), 0);
    }

    #[test]
    fn test_interleaved_raises_never_set_both() {
        let signal = LinkSignal::new();
        let pattern = [
            LinkFlag::Failed,
            LinkFlag::Connected,
            LinkFlag::Connected,
            LinkFlag::Failed,
            LinkFlag::Failed,
            LinkFlag::Connected,
        ];

        for round in 0..pattern.len() {
            let first = pattern[round];
            for flag in pattern.iter().cycle().skip(round).take(pattern.len()) {
                signal.raise(*flag);
                assert_ne!(signal.bits(), CONNECTED_BIT | FAILED_BIT);
            }
            assert_eq!(signal.take(), Some(first));
        }
    }

    #[test]
    fn test_wait_observes_once() {
        let signal = LinkSignal::new();
        signal.raise(LinkFlag::Connected);

        let flag = embassy_futures::block_on(signal.wait());

        assert_eq!(flag, LinkFlag::Connected);
        assert_eq!(signal.peek(), None);
    }
}

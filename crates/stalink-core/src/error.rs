//! Error taxonomy for the connection link
//!
//! None of these halt the program. Terminal outcomes are logged and handed to
//! the caller as an [`Outcome`](crate::orchestrator::Outcome); this type gives
//! the log lines a consistent shape.

use core::fmt::{self, Write};

use thiserror_no_std::Error;

/// Capacity of driver error messages
pub const ERROR_MESSAGE_LEN: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("station driver error: {0}")]
    Driver(heapless::String<ERROR_MESSAGE_LEN>),
    #[error("disconnected from the access point, reason {0}")]
    TransientDisconnect(u8),
    #[error("retry budget of {0} exhausted")]
    RetryBudgetExhausted(u8),
    #[error("no terminal outcome within {0} ms")]
    WaitTimeout(u64),
    #[error("{0} not available from the network stack")]
    MetadataUnavailable(&'static str),
}

impl LinkError {
    /// Wrap a driver error, truncating its `Debug` rendering to fit
    pub fn driver(error: impl fmt::Debug) -> Self {
        let mut message = heapless::String::new();
        let _ = write!(Truncating(&mut message), "{:?}", error);
        Self::Driver(message)
    }
}

/// Writer that keeps as much as fits and drops the rest
struct Truncating<'a, const N: usize>(&'a mut heapless::String<N>);

impl<const N: usize> Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

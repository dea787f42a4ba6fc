//! Hardware-independent core library for stalink
//!
//! This crate contains the platform-agnostic logic of the Wi-Fi station link:
//! credentials, the bounded-retry connection state machine, the terminal
//! outcome signal, the connection orchestrator and the one-shot status report.
//! Radio drivers plug in through the [`Station`] and [`NetworkInfo`] traits.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-C3) and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod config;
pub mod credentials;
pub mod error;
pub mod event;
pub mod orchestrator;
pub mod report;
pub mod signal;
pub mod sim;
pub mod state;
pub mod station;

#[cfg(test)]
mod test_log;

pub use config::LinkConfig;
pub use credentials::{AuthMode, StationCredentials};
pub use error::LinkError;
pub use event::{EventQueue, StationEvent};
pub use orchestrator::{ConnectionOrchestrator, LinkResources, Outcome};
pub use report::{ConnectionSnapshot, NetworkInfo, StatusReporter};
pub use signal::{LinkFlag, LinkSignal};
pub use state::{ConnectionState, LinkPhase};
pub use station::Station;

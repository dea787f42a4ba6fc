//! Connection orchestration
//!
//! [`ConnectionOrchestrator::connect`] starts the station, drives the
//! bounded-retry association protocol from the events the driver posts and
//! waits for the first terminal flag or the timeout, whichever comes first.
//!
//! The orchestrator owns its [`ConnectionState`]; driver callbacks only post
//! into the [`EventQueue`], so every state change happens here, in the task
//! that polls the orchestrator.

use embassy_time::{Duration, with_timeout};
use log::{debug, error, info, trace, warn};

use crate::credentials::StationCredentials;
use crate::error::LinkError;
use crate::event::{EventQueue, StationEvent, disconnect_reason_label};
use crate::report::{NetworkInfo, StatusReporter};
use crate::signal::{LinkFlag, LinkSignal};
use crate::state::{AttemptStatus, ConnectionState, Transition};
use crate::station::Station;

/// Terminal result of a `connect()` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Connected,
    Failed,
    TimedOut,
}

impl Outcome {
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl From<LinkFlag> for Outcome {
    fn from(flag: LinkFlag) -> Self {
        match flag {
            LinkFlag::Connected => Self::Connected,
            LinkFlag::Failed => Self::Failed,
        }
    }
}

/// Synchronisation shared between the driver's callbacks and the orchestrator
///
/// ```rust,ignore
/// static LINK: LinkResources = LinkResources::new();
///
/// let mut orchestrator = ConnectionOrchestrator::new(station, &LINK);
/// ```
pub struct LinkResources {
    pub events: EventQueue,
    pub signal: LinkSignal,
}

impl LinkResources {
    pub const fn new() -> Self {
        Self {
            events: EventQueue::new(),
            signal: LinkSignal::new(),
        }
    }
}

impl Default for LinkResources {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ConnectionOrchestrator<S> {
    station: S,
    link: &'static LinkResources,
    state: ConnectionState,
    subscribed: bool,
}

impl<S> ConnectionOrchestrator<S>
where
    S: Station + NetworkInfo,
{
    pub fn new(station: S, link: &'static LinkResources) -> Self {
        Self {
            station,
            link,
            state: ConnectionState::new(crate::config::DEFAULT_RETRY_LIMIT),
            subscribed: false,
        }
    }

    /// Associate with the network, retrying up to `retry_limit` times
    ///
    /// Waits at most `timeout` for a terminal outcome. On success the status
    /// report is logged once before returning. Failure and timeout are logged
    /// and returned; they are not errors.
    pub async fn connect(
        &mut self,
        credentials: &StationCredentials,
        retry_limit: u8,
        timeout: Duration,
    ) -> Outcome {
        self.state = ConnectionState::new(retry_limit);
        self.state.begin();

        let stale = self.link.events.drain();
        if stale > 0 {
            debug!("Discarded {} stale station events", stale);
        }
        self.link.signal.reset();

        if !self.subscribed {
            let link = self.link;
            self.station.subscribe(&link.events);
            self.subscribed = true;
        }

        if let Err(err) = self.bring_up(credentials).await {
            self.state.abort();
            error!("Failed to connect to SSID: {}: {}", credentials.ssid(), err);
            return Outcome::Failed;
        }

        info!("WiFi start STA, connecting to: {}", credentials.ssid());

        let outcome = match with_timeout(timeout, self.await_terminal()).await {
            Ok(flag) => Outcome::from(flag),
            Err(_) => Outcome::TimedOut,
        };

        match outcome {
            Outcome::Connected => {
                info!("WiFi connected");
                StatusReporter::report(&self.station);
            }
            Outcome::Failed => error!(
                "Failed to connect to SSID: {}: {}",
                credentials.ssid(),
                LinkError::RetryBudgetExhausted(retry_limit)
            ),
            Outcome::TimedOut => error!(
                "WiFi connect timeout: {}",
                LinkError::WaitTimeout(timeout.as_millis())
            ),
        }

        outcome
    }

    /// Keep handling station events after `connect()` returned
    ///
    /// A link lost after success starts a new cycle with a fresh retry
    /// budget. Never returns; run it next to the rest of the application.
    pub async fn supervise(&mut self) -> ! {
        loop {
            let event = self.link.events.next().await;
            let before = self.state.status();
            self.handle(event);

            match (before, self.state.status()) {
                (AttemptStatus::Failed, AttemptStatus::Failed) => {}
                (_, AttemptStatus::Failed) => error!(
                    "Reconnect to the AP failed: {}",
                    LinkError::RetryBudgetExhausted(self.state.retry_limit())
                ),
                (AttemptStatus::Connected, AttemptStatus::Connected) => {}
                (_, AttemptStatus::Connected) => info!("WiFi reconnected"),
                _ => {}
            }
        }
    }

    async fn bring_up(&mut self, credentials: &StationCredentials) -> Result<(), LinkError> {
        self.station
            .configure(credentials)
            .map_err(LinkError::driver)?;
        self.station.start().await.map_err(LinkError::driver)
    }

    /// Handle events until a terminal flag is raised, then observe it
    async fn await_terminal(&mut self) -> LinkFlag {
        while self.link.signal.peek().is_none() {
            let event = self.link.events.next().await;
            self.handle(event);
        }
        self.link.signal.wait().await
    }

    fn handle(&mut self, event: StationEvent) {
        let cycle = self.state.cycle();
        let transition = self.state.apply(event);

        if self.state.cycle() != cycle {
            self.link.signal.reset();
            info!("Link state changed after a terminal outcome, starting a new cycle");
        }

        match transition {
            Transition::Ignored => {
                trace!("{:?} ignored in phase {:?}", event, self.state.phase());
                if let StationEvent::Associated { channel } = event {
                    debug!("Associated with the AP on channel {}, waiting for an address", channel);
                }
            }
            Transition::Associate => {
                debug!("Station started, requesting association");
                self.request_association();
            }
            Transition::Retry {
                attempt,
                limit,
                reason,
            } => {
                self.request_association();
                warn!(
                    "Retry to connect to the AP ({}/{}), last reason {} ({})",
                    attempt,
                    limit,
                    reason,
                    disconnect_reason_label(reason)
                );
            }
            Transition::Exhausted { limit, reason } => {
                debug!(
                    "{} after {} retries",
                    LinkError::TransientDisconnect(reason),
                    limit
                );
                self.link.signal.raise(LinkFlag::Failed);
            }
            Transition::Established(address) => {
                info!("Got IP: {}", address);
                self.link.signal.raise(LinkFlag::Connected);
            }
        }
    }

    fn request_association(&mut self) {
        if let Err(err) = self.station.request_association() {
            warn!("Association request rejected: {}", LinkError::driver(err));
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn station(&self) -> &S {
        &self.station
    }

    pub fn station_mut(&mut self) -> &mut S {
        &mut self.station
    }

    pub fn link(&self) -> &'static LinkResources {
        self.link
    }
}

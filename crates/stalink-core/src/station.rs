use core::fmt::Debug;

use crate::credentials::StationCredentials;
use crate::event::EventQueue;

/// The station role of a radio driver
///
/// Requests are fire-and-forget. Their results arrive later as
/// [`StationEvent`](crate::event::StationEvent)s on the queue handed to
/// [`subscribe`](Station::subscribe).
pub trait Station {
    type Error: Debug;

    /// Route the driver's station lifecycle and address events into `events`
    ///
    /// Called once per orchestrator; handlers stay installed afterwards.
    fn subscribe(&mut self, events: &'static EventQueue);

    /// Apply network name, passphrase and auth threshold
    fn configure(&mut self, credentials: &StationCredentials) -> Result<(), Self::Error>;

    /// Bring the station role up; the driver posts `Started` when it is ready
    fn start(&mut self) -> impl Future<Output = Result<(), Self::Error>>;

    /// Ask the driver to associate; the outcome arrives as an event
    fn request_association(&mut self) -> Result<(), Self::Error>;
}

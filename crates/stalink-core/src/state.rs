//! Connection state machine
//!
//! Pure bookkeeping for one association cycle: which phase the station is
//! in, how much of the retry budget is spent and whether the cycle reached a
//! terminal status. Side effects (association requests, signalling, logging)
//! are left to the caller, which acts on the returned [`Transition`].
//!
//! ```text
//! Idle -> Starting -> Associating -> Connected
//!                         |  ^
//!                         v  |
//!                       Retrying -> Failed   (budget exhausted)
//! ```

use core::net::Ipv4Addr;

use crate::event::StationEvent;

/// Where the station is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPhase {
    Idle,
    Starting,
    Associating,
    Retrying,
    Connected,
    Failed,
}

/// Status of the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    Pending,
    Connected,
    Failed,
}

/// What the caller has to do after an event was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed
    Ignored,
    /// The station started; issue the first association request
    Associate,
    /// Association dropped with budget left; re-issue the request
    Retry { attempt: u8, limit: u8, reason: u8 },
    /// Association dropped with no budget left; the cycle failed
    Exhausted { limit: u8, reason: u8 },
    /// An address was bound; the cycle succeeded
    Established(Ipv4Addr),
}

#[derive(Debug, Clone)]
pub struct ConnectionState {
    phase: LinkPhase,
    status: AttemptStatus,
    retry_count: u8,
    retry_limit: u8,
    /// Bumped each time a terminal cycle is reopened by a later event
    cycle: u32,
}

impl ConnectionState {
    pub const fn new(retry_limit: u8) -> Self {
        Self {
            phase: LinkPhase::Idle,
            status: AttemptStatus::Pending,
            retry_count: 0,
            retry_limit,
            cycle: 0,
        }
    }

    /// Open a fresh cycle for a `connect()` call
    pub fn begin(&mut self) {
        self.phase = LinkPhase::Starting;
        self.status = AttemptStatus::Pending;
        self.retry_count = 0;
    }

    /// Mark the cycle failed without any event, e.g. when the driver refused to start
    pub fn abort(&mut self) {
        self.phase = LinkPhase::Failed;
        self.status = AttemptStatus::Failed;
    }

    /// Apply one event and report what the caller has to do
    pub fn apply(&mut self, event: StationEvent) -> Transition {
        if self.phase == LinkPhase::Idle {
            return Transition::Ignored;
        }

        match event {
            StationEvent::Started if self.phase == LinkPhase::Starting => {
                self.phase = LinkPhase::Associating;
                Transition::Associate
            }
            StationEvent::Disconnected { reason } => match self.status {
                AttemptStatus::Pending => self.retry_or_fail(reason),
                AttemptStatus::Connected => {
                    // Link lost after success: a new cycle with a fresh budget.
                    self.cycle += 1;
                    self.status = AttemptStatus::Pending;
                    self.retry_or_fail(reason)
                }
                AttemptStatus::Failed => Transition::Ignored,
            },
            StationEvent::AddressAcquired(address) => match self.status {
                AttemptStatus::Pending => self.establish(address),
                AttemptStatus::Failed => {
                    self.cycle += 1;
                    self.establish(address)
                }
                AttemptStatus::Connected => Transition::Ignored,
            },
            StationEvent::Started | StationEvent::Associated { .. } | StationEvent::Stopped => {
                Transition::Ignored
            }
        }
    }

    fn retry_or_fail(&mut self, reason: u8) -> Transition {
        if self.retry_count < self.retry_limit {
            self.retry_count += 1;
            self.phase = LinkPhase::Retrying;
            Transition::Retry {
                attempt: self.retry_count,
                limit: self.retry_limit,
                reason,
            }
        } else {
            self.phase = LinkPhase::Failed;
            self.status = AttemptStatus::Failed;
            Transition::Exhausted {
                limit: self.retry_limit,
                reason,
            }
        }
    }

    fn establish(&mut self, address: Ipv4Addr) -> Transition {
        self.retry_count = 0;
        self.phase = LinkPhase::Connected;
        self.status = AttemptStatus::Connected;
        Transition::Established(address)
    }

    pub fn phase(&self) -> LinkPhase {
        self.phase
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }

    pub fn retry_limit(&self) -> u8 {
        self.retry_limit
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 7);

    fn started(limit: u8) -> ConnectionState {
        let mut state = ConnectionState::new(limit);
        state.begin();
        assert_eq!(state.apply(StationEvent::Started), Transition::Associate);
        state
    }

    #[test]
    fn test_events_ignored_before_begin() {
        let mut state = ConnectionState::new(5);

        assert_eq!(state.apply(StationEvent::Started), Transition::Ignored);
        assert_eq!(
            state.apply(StationEvent::Disconnected { reason: 201 }),
            Transition::Ignored
        );
        assert_eq!(state.phase(), LinkPhase::Idle);
        assert_eq!(state.retry_count(), 0);
    }

    #[test]
    fn test_nth_plus_one_disconnect_fails() {
        for limit in 0..=8u8 {
            let mut state = started(limit);

            for attempt in 1..=limit {
                assert_eq!(
                    state.apply(StationEvent::Disconnected { reason: 202 }),
                    Transition::Retry {
                        attempt,
                        limit,
                        reason: 202
                    }
                );
                assert_eq!(state.status(), AttemptStatus::Pending);
            }

            assert_eq!(
                state.apply(StationEvent::Disconnected { reason: 202 }),
                Transition::Exhausted { limit, reason: 202 }
            );
            assert_eq!(state.status(), AttemptStatus::Failed);
            assert_eq!(state.phase(), LinkPhase::Failed);
            assert_eq!(state.retry_count(), limit);
        }
    }

    #[test]
    fn test_success_resets_retry_count() {
        for retries in 0..5u8 {
            let mut state = started(5);
            for _ in 0..retries {
                state.apply(StationEvent::Disconnected { reason: 201 });
            }

            assert_eq!(
                state.apply(StationEvent::AddressAcquired(ADDRESS)),
                Transition::Established(ADDRESS)
            );
            assert_eq!(state.retry_count(), 0);
            assert_eq!(state.status(), AttemptStatus::Connected);
        }
    }

    #[test]
    fn test_failed_cycle_ignores_further_disconnects() {
        let mut state = started(0);

        state.apply(StationEvent::Disconnected { reason: 201 });
        assert_eq!(
            state.apply(StationEvent::Disconnected { reason: 201 }),
            Transition::Ignored
        );
        assert_eq!(state.cycle(), 0);
    }

    #[test]
    fn test_link_loss_opens_new_cycle_with_fresh_budget() {
        let mut state = started(2);
        state.apply(StationEvent::Disconnected { reason: 201 });
        state.apply(StationEvent::AddressAcquired(ADDRESS));

        assert_eq!(
            state.apply(StationEvent::Disconnected { reason: 200 }),
            Transition::Retry {
                attempt: 1,
                limit: 2,
                reason: 200
            }
        );
        assert_eq!(state.cycle(), 1);
        assert_eq!(state.status(), AttemptStatus::Pending);
    }

    #[test]
    fn test_late_address_after_failure_opens_new_cycle() {
        let mut state = started(0);
        state.apply(StationEvent::Disconnected { reason: 201 });

        assert_eq!(
            state.apply(StationEvent::AddressAcquired(ADDRESS)),
            Transition::Established(ADDRESS)
        );
        assert_eq!(state.cycle(), 1);
        assert_eq!(state.status(), AttemptStatus::Connected);
    }

    #[test]
    fn test_duplicate_start_and_address_ignored() {
        let mut state = started(5);

        assert_eq!(state.apply(StationEvent::Started), Transition::Ignored);
        state.apply(StationEvent::AddressAcquired(ADDRESS));
        assert_eq!(
            state.apply(StationEvent::AddressAcquired(ADDRESS)),
            Transition::Ignored
        );
        assert_eq!(
            state.apply(StationEvent::Associated { channel: 6 }),
            Transition::Ignored
        );
    }

    #[test]
    fn test_abort_marks_failed() {
        let mut state = ConnectionState::new(5);
        state.begin();
        state.abort();

        assert_eq!(state.status(), AttemptStatus::Failed);
        assert_eq!(state.phase(), LinkPhase::Failed);
    }
}

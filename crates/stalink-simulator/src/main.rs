//! Desktop simulator for the stalink connection orchestrator.
//!
//! Runs one or more named scenarios against a scripted station and logs what
//! the firmware would print over RTT.
//!
//! # Scenarios
//!
//! | Name           | Access point behaviour                          |
//! |----------------|-------------------------------------------------|
//! | `immediate`    | Accepts the first association                   |
//! | `flaky`        | Rejects twice, then accepts                     |
//! | `exhausted`    | Rejects every association                       |
//! | `silent`       | Driver never reports the station as started     |
//! | `partial-info` | Accepts, but the stack has no hostname to report |
//!
//! Run everything with `cargo run -p stalink-simulator`, or pick scenarios by
//! name: `cargo run -p stalink-simulator -- flaky silent`.
//!
//! `WIFI_MAX_RETRY` and `WIFI_CONNECT_TIMEOUT_MS` tune the run like they tune
//! the firmware build; `RUST_LOG` controls verbosity (default `info`).

use std::net::Ipv4Addr;
use std::process::ExitCode;

use embassy_futures::block_on;
use embassy_time::{Duration, Instant};
use log::{error, info};

use stalink_core::sim::{AssociationReply, ScriptedStation, SimulatedNetwork};
use stalink_core::{ConnectionOrchestrator, LinkConfig, LinkResources, Outcome, StationCredentials};

const SIM_SSID: &str = "stalink-lab";
const SIM_PASSPHRASE: &str = "correct horse battery";

/// Timeout used for the `silent` scenario unless overridden
const SILENT_TIMEOUT: Duration = Duration::from_secs(2);

const ACCEPT: AssociationReply = AssociationReply::Accept {
    channel: 6,
    address: Ipv4Addr::new(192, 168, 4, 23),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    Immediate,
    Flaky,
    Exhausted,
    Silent,
    PartialInfo,
}

impl Scenario {
    const ALL: [Scenario; 5] = [
        Scenario::Immediate,
        Scenario::Flaky,
        Scenario::Exhausted,
        Scenario::Silent,
        Scenario::PartialInfo,
    ];

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scenario| scenario.name() == name)
    }

    fn name(self) -> &'static str {
        match self {
            Scenario::Immediate => "immediate",
            Scenario::Flaky => "flaky",
            Scenario::Exhausted => "exhausted",
            Scenario::Silent => "silent",
            Scenario::PartialInfo => "partial-info",
        }
    }

    fn expected(self) -> Outcome {
        match self {
            Scenario::Immediate | Scenario::Flaky | Scenario::PartialInfo => Outcome::Connected,
            Scenario::Exhausted => Outcome::Failed,
            Scenario::Silent => Outcome::TimedOut,
        }
    }

    fn station(self, config: &LinkConfig) -> ScriptedStation {
        let network = SimulatedNetwork::default();
        let reject = AssociationReply::Reject { reason: 202 };

        match self {
            Scenario::Immediate => ScriptedStation::new(network).with_replies([ACCEPT]),
            Scenario::Flaky => ScriptedStation::new(network).with_replies([reject, reject, ACCEPT]),
            Scenario::Exhausted => {
                let attempts = usize::from(config.retry_limit) + 1;
                ScriptedStation::new(network).with_replies(std::iter::repeat_n(reject, attempts))
            }
            Scenario::Silent => ScriptedStation::new(network).without_start_event(),
            Scenario::PartialInfo => {
                ScriptedStation::new(network.without_hostname()).with_replies([ACCEPT])
            }
        }
    }
}

fn link_config() -> LinkConfig {
    let retry_limit = std::env::var("WIFI_MAX_RETRY").ok();
    let timeout = std::env::var("WIFI_CONNECT_TIMEOUT_MS").ok();

    LinkConfig::from_env_strs(retry_limit.as_deref(), timeout.as_deref()).unwrap_or_else(|err| {
        error!("Ignoring WiFi tuning from the environment: {}", err);
        LinkConfig::default()
    })
}

fn run(scenario: Scenario, credentials: &StationCredentials, config: &LinkConfig) -> Outcome {
    let link: &'static LinkResources = Box::leak(Box::new(LinkResources::new()));
    let mut orchestrator = ConnectionOrchestrator::new(scenario.station(config), link);

    // Keep the silent run short unless a timeout was asked for explicitly.
    let timeout = match scenario {
        Scenario::Silent if std::env::var_os("WIFI_CONNECT_TIMEOUT_MS").is_none() => SILENT_TIMEOUT,
        _ => config.connect_timeout,
    };

    info!("--- scenario '{}' ---", scenario.name());
    let started = Instant::now();
    let outcome = block_on(orchestrator.connect(credentials, config.retry_limit, timeout));

    info!(
        "scenario '{}' finished with {:?} after {} association request(s) in {} ms",
        scenario.name(),
        outcome,
        orchestrator.station().association_requests(),
        started.elapsed().as_millis()
    );
    outcome
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut scenarios = Vec::new();
    for name in std::env::args().skip(1) {
        match Scenario::from_name(&name) {
            Some(scenario) => scenarios.push(scenario),
            None => {
                error!("Unknown scenario '{}'", name);
                return ExitCode::FAILURE;
            }
        }
    }
    if scenarios.is_empty() {
        scenarios.extend(Scenario::ALL);
    }

    let credentials = match StationCredentials::wpa2(SIM_SSID, SIM_PASSPHRASE) {
        Ok(credentials) => credentials,
        Err(err) => {
            error!("Simulator credentials rejected: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let config = link_config();

    let mut unexpected = 0;
    for scenario in scenarios {
        let outcome = run(scenario, &credentials, &config);
        if outcome != scenario.expected() {
            error!(
                "scenario '{}' expected {:?}, got {:?}",
                scenario.name(),
                scenario.expected(),
                outcome
            );
            unexpected += 1;
        }
    }

    if unexpected == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

mod bringup;
mod config;
mod constants;
mod daemon;
mod device;
mod discovery;
mod errors;
mod namespace;
mod object;
mod scheduler;
mod snmp;
mod trap;

pub mod metrics;
pub mod utils;

pub use bringup::*;
pub use config::*;
pub use daemon::*;
pub use device::*;
pub use discovery::*;
pub use errors::*;
pub use namespace::*;
pub use object::*;
pub use scheduler::*;
pub use snmp::*;
pub use trap::*;

//-----------------------------------------------------------
// Autometrics
/// autometrics: https://docs.autometrics.dev/rust/adding-alerts-and-slos
use autometrics::objectives::Objective;
use autometrics::objectives::ObjectiveLatency;
use autometrics::objectives::ObjectivePercentile;
const API_SLO: Objective = Objective::new("device_requests")
    .success_rate(ObjectivePercentile::P99_9)
    .latency(ObjectiveLatency::Ms100, ObjectivePercentile::P99);

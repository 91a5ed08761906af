//! Multi-server call centre, simulated minute by minute
//!
//! Customers arrive according to a discrete inter-arrival distribution, take
//! the lowest-numbered idle server or join a single FIFO queue, and are served
//! for a duration drawn from a discrete service-time distribution. The run
//! produces per-minute snapshots, per-server utilization and aggregate
//! waiting/service/queue metrics.
//!
//! Key pieces:
//! - `CallCentre`: owns the schedule, servers, queue and generator for one run
//! - `SimulationConfig`: validated run parameters, loadable from TOML
//! - `output::SimulationOutput`: CSV/JSON export of a finished run
//! - `replications`: many seeds of one configuration in parallel

pub mod arrivals;
pub mod config;
pub mod output;
pub mod population;
pub mod replications;
pub mod sampler;
pub mod simulation;
pub mod stats;
pub mod trace;

pub use config::{ConfigError, ExperimentConfig, OutputSettings, SimulationConfig};
pub use population::{Customer, Server};
pub use sampler::{DiscreteDistribution, DistributionError};
pub use simulation::{CallCentre, Event, SimulationResult};
pub use stats::{MinuteRecord, RunSummary, ServerSummary};
pub use trace::{TraceEntry, TraceKind};

//! Run configuration and validation
//!
//! Everything the engine consumes is checked here, before the first minute is
//! simulated. A run that starts never fails part-way through.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sampler::{DiscreteDistribution, DistributionError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("server count must be at least 1")]
    NoServers,
    #[error("simulation horizon must be at least 1 minute")]
    ZeroHorizon,
    #[error("maximum customer count must be at least 1")]
    NoCustomers,
    #[error("service distribution contains a zero-minute service time")]
    ZeroServiceTime,
    #[error("horizon {horizon} plus a {longest}-minute {name} overflows the clock")]
    ClockOverflow {
        horizon: usize,
        longest: usize,
        name: &'static str,
    },
    #[error("{name} distribution: {source}")]
    Distribution {
        name: &'static str,
        #[source]
        source: DistributionError,
    },
    #[error("arrival at minute {arrival} precedes arrival at minute {previous}")]
    UnsortedArrivals { previous: usize, arrival: usize },
    #[error("arrival at minute {arrival} is beyond the {horizon}-minute horizon")]
    ArrivalBeyondHorizon { arrival: usize, horizon: usize },
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

const BASELINE_INTER_ARRIVAL: ([usize; 5], [f64; 5]) =
    ([2, 3, 4, 5, 6], [0.15, 0.25, 0.30, 0.20, 0.10]);
const BASELINE_SERVICE: ([usize; 6], [f64; 6]) =
    ([3, 4, 5, 6, 7, 8], [0.10, 0.20, 0.30, 0.25, 0.10, 0.05]);

/// Parameters of a single simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub servers: usize,
    /// Last simulated minute; the run covers `[0, horizon]`
    pub horizon: usize,
    /// Cap on pre-generated arrivals
    pub max_customers: usize,
    pub inter_arrival: DiscreteDistribution,
    pub service: DiscreteDistribution,
    /// Seed for the run's generator, drawn from entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Stop at the first minute with nothing pending, queued or in service
    #[serde(default)]
    pub stop_when_idle: bool,
    #[serde(default)]
    pub record_trace: bool,
}

impl SimulationConfig {
    /// Three-server call centre open for ten hours
    pub fn baseline() -> Self {
        SimulationConfig {
            servers: 3,
            horizon: 600,
            max_customers: 1000,
            inter_arrival: DiscreteDistribution::from_trusted(
                BASELINE_INTER_ARRIVAL.0.to_vec(),
                BASELINE_INTER_ARRIVAL.1.to_vec(),
            ),
            service: DiscreteDistribution::from_trusted(
                BASELINE_SERVICE.0.to_vec(),
                BASELINE_SERVICE.1.to_vec(),
            ),
            seed: None,
            stop_when_idle: false,
            record_trace: true,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_inter_arrival(
        mut self,
        values: Vec<usize>,
        probabilities: Vec<f64>,
    ) -> Result<Self, ConfigError> {
        self.inter_arrival = DiscreteDistribution::new(values, probabilities).map_err(|source| {
            ConfigError::Distribution {
                name: "inter-arrival",
                source,
            }
        })?;
        Ok(self)
    }

    pub fn with_service(
        mut self,
        values: Vec<usize>,
        probabilities: Vec<f64>,
    ) -> Result<Self, ConfigError> {
        self.service = DiscreteDistribution::new(values, probabilities).map_err(|source| {
            ConfigError::Distribution {
                name: "service",
                source,
            }
        })?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers == 0 {
            return Err(ConfigError::NoServers);
        }
        if self.horizon == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.max_customers == 0 {
            return Err(ConfigError::NoCustomers);
        }
        // zero-weight values are still drawn at fraction 0.0, so check every value
        if self.service.min_value() == 0 {
            return Err(ConfigError::ZeroServiceTime);
        }
        for (name, longest) in [
            ("service time", self.service.max_value()),
            ("inter-arrival gap", self.inter_arrival.max_value()),
            ("minute", 1),
        ] {
            if self.horizon.checked_add(longest).is_none() {
                return Err(ConfigError::ClockOverflow {
                    horizon: self.horizon,
                    longest,
                    name,
                });
            }
        }
        Ok(())
    }

    /// Check an explicit arrival stream against this configuration
    pub fn validate_arrivals(&self, arrivals: &[usize]) -> Result<(), ConfigError> {
        for pair in arrivals.windows(2) {
            if pair[1] < pair[0] {
                return Err(ConfigError::UnsortedArrivals {
                    previous: pair[0],
                    arrival: pair[1],
                });
            }
        }
        match arrivals.last() {
            Some(&arrival) if arrival > self.horizon => Err(ConfigError::ArrivalBeyondHorizon {
                arrival,
                horizon: self.horizon,
            }),
            _ => Ok(()),
        }
    }

    /// Number of minutes statistics are averaged over
    pub fn minutes(&self) -> usize {
        self.horizon + 1
    }
}

/// Where and how much to write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_replications")]
    pub replications: usize,
    #[serde(default = "default_true")]
    pub write_trace: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_replications() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            dir: default_output_dir(),
            replications: default_replications(),
            write_trace: true,
        }
    }
}

/// Top-level TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub output: OutputSettings,
}

impl ExperimentConfig {
    pub fn baseline() -> Self {
        ExperimentConfig {
            simulation: SimulationConfig::baseline(),
            output: OutputSettings::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: ExperimentConfig = toml::from_str(s)?;
        config.simulation.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

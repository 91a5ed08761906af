//! Independent replications of one configuration across consecutive seeds

use des::parallel::{ParallelRunner, ScenarioResult, simple_progress_reporter};
use log::warn;
use serde::Serialize;

use crate::config::{ConfigError, SimulationConfig};
use crate::simulation::CallCentre;
use crate::stats::RunSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationRun {
    pub seed: u64,
    pub summary: RunSummary,
    pub utilization: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl MeanStd {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return MeanStd {
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        MeanStd {
            mean,
            std: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationSummary {
    pub runs: usize,
    pub successful_runs: usize,
    pub avg_wait: MeanStd,
    pub avg_service: MeanStd,
    pub avg_queue_length: MeanStd,
    pub throughput: MeanStd,
    pub mean_utilization: MeanStd,
}

impl ReplicationSummary {
    pub fn from_runs(results: &[ScenarioResult<ReplicationRun>]) -> Self {
        let ok: Vec<&ReplicationRun> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let metric = |f: fn(&ReplicationRun) -> f64| {
            MeanStd::from_values(&ok.iter().map(|&run| f(run)).collect::<Vec<f64>>())
        };

        ReplicationSummary {
            runs: results.len(),
            successful_runs: ok.len(),
            avg_wait: metric(|r| r.summary.avg_wait),
            avg_service: metric(|r| r.summary.avg_service),
            avg_queue_length: metric(|r| r.summary.avg_queue_length),
            throughput: metric(|r| r.summary.throughput),
            mean_utilization: metric(|r| {
                if r.utilization.is_empty() {
                    0.0
                } else {
                    r.utilization.iter().sum::<f64>() / r.utilization.len() as f64
                }
            }),
        }
    }
}

/// Run `runs` copies of `config` with seeds `base_seed`, `base_seed + 1`, ...
///
/// Seeds wrap around at `u64::MAX`.
///
/// Results are in seed order. A run that fails carries the error text in its
/// slot; the configuration is validated once up front so this only happens
/// on a panic.
pub fn run_replications(
    config: &SimulationConfig,
    base_seed: u64,
    runs: usize,
) -> Result<Vec<ScenarioResult<ReplicationRun>>, ConfigError> {
    config.validate()?;

    let results = ParallelRunner::new(runs, |scenario_id| {
        let seed = base_seed.wrapping_add(scenario_id as u64);
        let mut run_config = config.clone().with_seed(seed);
        run_config.record_trace = false;
        CallCentre::seeded(run_config)
            .map(CallCentre::run)
            .map(|result| ReplicationRun {
                seed,
                utilization: result.servers.iter().map(|s| s.utilization).collect(),
                summary: result.summary,
            })
            .map_err(|e| e.to_string())
    })
    .progress(simple_progress_reporter(runs.div_ceil(10).max(1)))
    .run();

    // ParallelRunner reports panics, CallCentre reports config errors
    Ok(results
        .into_iter()
        .map(|r| r.and_then(|inner| inner))
        .inspect(|r| {
            if let Err(e) = r {
                warn!("Replication failed: {}", e);
            }
        })
        .collect())
}

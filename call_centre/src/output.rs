//! CSV and JSON export of simulation results
//!
//! Files written by `write_all`:
//! - `minute_stats.csv`: one row per simulated minute
//! - `server_summary.csv`: busy minutes and utilization per server
//! - `run_summary.csv`: `metric,value` pairs
//! - `event_trace.csv`: the per-event log, when the run recorded one
//! - `summary.json`: metadata and every summary above

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::config::SimulationConfig;
use crate::simulation::SimulationResult;
use crate::stats::{MinuteRecord, RunSummary, ServerSummary};
use crate::trace::TraceEntry;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationMetadata {
    pub config: SimulationConfig,
    pub seed: Option<u64>,
    pub timestamp: String,
    pub arrivals_generated: usize,
    pub in_queue_at_end: usize,
    pub in_service_at_end: usize,
}

/// Everything written to disk for one run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutput {
    pub metadata: SimulationMetadata,
    pub summary: RunSummary,
    pub servers: Vec<ServerSummary>,
    #[serde(skip)]
    pub minutes: Vec<MinuteRecord>,
    #[serde(skip)]
    pub trace: Vec<TraceEntry>,
}

impl SimulationOutput {
    pub fn from_result(config: &SimulationConfig, result: SimulationResult) -> Self {
        SimulationOutput {
            metadata: SimulationMetadata {
                config: config.clone(),
                seed: result.seed,
                timestamp: chrono::Utc::now().to_rfc3339(),
                arrivals_generated: result.arrivals_generated,
                in_queue_at_end: result.in_queue_at_end,
                in_service_at_end: result.in_service_at_end,
            },
            summary: result.summary,
            servers: result.servers,
            minutes: result.minutes,
            trace: result.trace,
        }
    }

    pub fn write_minutes_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record([
            "minute",
            "queue_length",
            "arrivals",
            "departures",
            "servers_busy",
            "total_in_system",
        ])?;

        for record in &self.minutes {
            wtr.write_record(&[
                record.minute.to_string(),
                record.queue_length.to_string(),
                record.arrivals.to_string(),
                record.departures.to_string(),
                record.servers_busy.to_string(),
                record.total_in_system.to_string(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn write_servers_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_path(path)?;
        // header comes from the field names
        for server in &self.servers {
            wtr.serialize(server)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_run_summary_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_path(path)?;
        let s = &self.summary;

        wtr.write_record(["metric", "value"])?;
        for (metric, value) in [
            ("total_served", s.total_served.to_string()),
            ("avg_wait", s.avg_wait.to_string()),
            ("avg_service", s.avg_service.to_string()),
            ("avg_queue_length", s.avg_queue_length.to_string()),
            ("throughput", s.throughput.to_string()),
            ("max_queue_length", s.max_queue_length.to_string()),
            ("max_wait", s.max_wait.to_string()),
        ] {
            wtr.write_record([metric, value.as_str()])?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn write_trace_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record([
            "minute",
            "event",
            "customer_id",
            "server",
            "service_time",
            "details",
        ])?;

        let or_dash = |v: Option<usize>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        for entry in &self.trace {
            wtr.write_record(&[
                entry.minute.to_string(),
                entry.kind.label().to_string(),
                entry.customer_id.to_string(),
                or_dash(entry.kind.server()),
                or_dash(entry.kind.service_time()),
                entry.kind.details(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn write_summary_json<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write every output file into `dir`, creating it if needed
    pub fn write_all<P: AsRef<Path>>(
        &self,
        dir: P,
        include_trace: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        self.write_minutes_csv(dir.join("minute_stats.csv"))?;
        self.write_servers_csv(dir.join("server_summary.csv"))?;
        self.write_run_summary_csv(dir.join("run_summary.csv"))?;
        if include_trace && !self.trace.is_empty() {
            self.write_trace_csv(dir.join("event_trace.csv"))?;
        }
        self.write_summary_json(dir.join("summary.json"))?;

        Ok(())
    }
}

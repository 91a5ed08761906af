//! Minute-stepped dispatch loop for N identical servers sharing one FIFO queue
//!
//! Each minute `t` is processed in four phases:
//!
//! 1. every departure due at `t` frees its server
//! 2. freed servers, in index order, take customers from the queue front
//! 3. every arrival due at `t` takes the lowest-index idle server or queues
//! 4. the minute is snapshotted and busy servers accrue a busy minute
//!
//! Departures sort ahead of arrivals inside the schedule (see `Event::phase`)
//! and are drained in a separate pass, so a server freed at `t` is always
//! available to a customer arriving at `t`.

use std::collections::VecDeque;

use des::{Phase, Schedule};
use log::{debug, info, trace};
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::arrivals::generate_arrivals;
use crate::config::{ConfigError, SimulationConfig};
use crate::population::{Customer, Server};
use crate::stats::{Accumulator, MinuteRecord, RunSummary, ServerSummary};
use crate::trace::{TraceEntry, TraceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Arrival { customer_id: usize },
    Departure { customer_id: usize, server_id: usize },
}

impl Event {
    fn is_departure(&self) -> bool {
        matches!(self, Event::Departure { .. })
    }

    fn is_arrival(&self) -> bool {
        matches!(self, Event::Arrival { .. })
    }
}

impl Phase for Event {
    fn phase(&self) -> usize {
        match self {
            Event::Departure { .. } => 0,
            Event::Arrival { .. } => 1,
        }
    }
}

/// Everything a finished run hands to the reporting layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub seed: Option<u64>,
    pub minutes: Vec<MinuteRecord>,
    pub servers: Vec<ServerSummary>,
    pub summary: RunSummary,
    pub customers: Vec<Customer>,
    pub trace: Vec<TraceEntry>,
    pub arrivals_generated: usize,
    pub in_queue_at_end: usize,
    pub in_service_at_end: usize,
}

pub struct CallCentre<R: Rng = StdRng> {
    config: SimulationConfig,
    rng: R,
    seed: Option<u64>,
    schedule: Schedule<Event>,
    customers: Vec<Customer>,
    servers: Vec<Server>,
    wait_queue: VecDeque<usize>,
    stats: Accumulator,
    minutes: Vec<MinuteRecord>,
    trace: Vec<TraceEntry>,
    current_t: usize,
    finished: bool,
}

impl CallCentre<StdRng> {
    /// Engine driven by a `StdRng` seeded from the config, or from entropy
    pub fn seeded(config: SimulationConfig) -> Result<Self, ConfigError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        info!("Seeding run with {}", seed);
        let mut engine = CallCentre::new(config, StdRng::seed_from_u64(seed))?;
        engine.seed = Some(seed);
        Ok(engine)
    }
}

impl<R: Rng> CallCentre<R> {
    /// Validate `config` and pre-generate the arrival stream from `rng`
    pub fn new(config: SimulationConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let arrivals = generate_arrivals(&config, &mut rng);
        Ok(CallCentre::from_parts(config, arrivals, rng))
    }

    /// Use a fixed arrival stream instead of sampling one
    ///
    /// The customer cap does not apply. `rng` is still used for service times.
    pub fn with_arrivals(
        config: SimulationConfig,
        arrivals: Vec<usize>,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        config.validate_arrivals(&arrivals)?;
        Ok(CallCentre::from_parts(config, arrivals, rng))
    }

    fn from_parts(config: SimulationConfig, arrivals: Vec<usize>, rng: R) -> Self {
        let customers: Vec<Customer> = arrivals
            .iter()
            .enumerate()
            .map(|(id, &t)| Customer::new(id, t))
            .collect();
        let schedule = customers
            .iter()
            .map(|c| (c.arrival_t, Event::Arrival { customer_id: c.id }))
            .collect();
        let servers = (0..config.servers).map(Server::new).collect();

        CallCentre {
            config,
            rng,
            seed: None,
            schedule,
            customers,
            servers,
            wait_queue: VecDeque::new(),
            stats: Accumulator::new(),
            minutes: Vec::new(),
            trace: Vec::new(),
            current_t: 0,
            finished: false,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn queue_length(&self) -> usize {
        self.wait_queue.len()
    }

    pub fn servers_busy(&self) -> usize {
        self.servers.iter().filter(|s| s.is_busy()).count()
    }

    pub fn pending_events(&self) -> usize {
        self.schedule.len()
    }

    /// Minute the next `step` will process
    pub fn current_t(&self) -> usize {
        self.current_t
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Nothing pending, nobody waiting, every server idle
    pub fn is_quiescent(&self) -> bool {
        self.schedule.is_empty() && self.wait_queue.is_empty() && self.servers_busy() == 0
    }

    /// Process one minute and return its snapshot, or `None` once the run is over
    pub fn step(&mut self) -> Option<MinuteRecord> {
        if self.finished {
            return None;
        }
        let t = self.current_t;
        debug_assert!(
            self.schedule.peek_time().is_none_or(|next| next >= t),
            "event left behind before minute {}",
            t
        );

        let departures = self.process_departures(t);
        self.assign_from_queue(t);
        let arrivals = self.process_arrivals(t);
        let record = self.snapshot(t, arrivals, departures);

        self.current_t += 1;
        if self.current_t > self.config.horizon {
            self.finished = true;
        } else if self.config.stop_when_idle && self.is_quiescent() {
            info!("Quiescent after minute {}, stopping early", t);
            self.finished = true;
        }
        Some(record)
    }

    pub fn run(mut self) -> SimulationResult {
        info!(
            "Simulating {} minutes with {} servers and {} arrivals",
            self.config.minutes(),
            self.config.servers,
            self.customers.len()
        );
        while self.step().is_some() {}
        let result = self.finish();
        info!(
            "Served {} customers, average wait {:.2} minutes",
            result.summary.total_served, result.summary.avg_wait
        );
        result
    }

    fn finish(self) -> SimulationResult {
        let minutes = self.config.minutes();
        let in_service_at_end = self.servers_busy();
        SimulationResult {
            seed: self.seed,
            summary: self.stats.summary(minutes),
            servers: Accumulator::server_summaries(&self.servers, minutes),
            arrivals_generated: self.customers.len(),
            in_queue_at_end: self.wait_queue.len(),
            in_service_at_end,
            minutes: self.minutes,
            customers: self.customers,
            trace: self.trace,
        }
    }

    fn process_departures(&mut self, t: usize) -> usize {
        let mut count = 0;
        while let Some(event) = self.schedule.pop_due(t, Event::is_departure) {
            let Event::Departure {
                customer_id,
                server_id,
            } = event
            else {
                continue;
            };
            let server = &mut self.servers[server_id];
            debug_assert_eq!(server.service_end_t, Some(t));
            let released = server.release();
            debug_assert_eq!(released, Some(customer_id));

            let customer = &self.customers[customer_id];
            let wait = customer.wait().unwrap_or(0);
            let service_time = customer.service_time.unwrap_or(0);
            self.stats.record_departure(wait, service_time);
            self.record(
                t,
                customer_id,
                TraceKind::Departure {
                    server: server_id,
                    service_time,
                    wait,
                },
            );
            count += 1;
        }
        count
    }

    fn assign_from_queue(&mut self, t: usize) {
        for server_id in 0..self.servers.len() {
            if self.servers[server_id].is_busy() {
                continue;
            }
            match self.wait_queue.pop_front() {
                Some(customer_id) => self.assign(server_id, customer_id, t),
                None => break,
            }
        }
    }

    fn process_arrivals(&mut self, t: usize) -> usize {
        let mut count = 0;
        while let Some(event) = self.schedule.pop_due(t, Event::is_arrival) {
            let Event::Arrival { customer_id } = event else {
                continue;
            };
            count += 1;
            self.record(t, customer_id, TraceKind::Arrival);

            match self.servers.iter().position(|s| !s.is_busy()) {
                Some(server_id) => self.assign(server_id, customer_id, t),
                None => {
                    self.wait_queue.push_back(customer_id);
                    let position = self.wait_queue.len();
                    self.record(t, customer_id, TraceKind::Queued { position });
                }
            }
        }
        count
    }

    fn assign(&mut self, server_id: usize, customer_id: usize, t: usize) {
        let service_time = self.config.service.sample(&mut self.rng);
        let end = self.servers[server_id].assign(&mut self.customers[customer_id], t, service_time);
        self.schedule.push(
            end,
            Event::Departure {
                customer_id,
                server_id,
            },
        );
        self.record(
            t,
            customer_id,
            TraceKind::Assigned {
                server: server_id,
                service_time,
                end,
            },
        );
    }

    fn snapshot(&mut self, t: usize, arrivals: usize, departures: usize) -> MinuteRecord {
        let mut servers_busy = 0;
        for server in self.servers.iter_mut().filter(|s| s.is_busy()) {
            server.busy_minutes += 1;
            servers_busy += 1;
        }
        let queue_length = self.wait_queue.len();
        self.stats.record_minute(queue_length);

        let record = MinuteRecord {
            minute: t,
            queue_length,
            arrivals,
            departures,
            servers_busy,
            total_in_system: queue_length + servers_busy,
        };
        debug!("{:?}", record);
        self.minutes.push(record);
        record
    }

    fn record(&mut self, minute: usize, customer_id: usize, kind: TraceKind) {
        trace!("[{}] {} customer {}", minute, kind.label(), customer_id);
        if self.config.record_trace {
            self.trace.push(TraceEntry {
                minute,
                customer_id,
                kind,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_server(horizon: usize, service: usize) -> SimulationConfig {
        let mut config = SimulationConfig::baseline()
            .with_service(vec![service], vec![1.0])
            .unwrap();
        config.servers = 1;
        config.horizon = horizon;
        config
    }

    #[test]
    fn departure_frees_server_for_same_minute_arrival() {
        // First customer leaves at 4, second arrives at 4
        let config = single_server(10, 4);
        let engine =
            CallCentre::with_arrivals(config, vec![0, 4], StdRng::seed_from_u64(1)).unwrap();
        let result = engine.run();

        assert_eq!(result.customers[1].service_start_t, Some(4));
        assert_eq!(result.customers[1].wait(), Some(0));
        assert_eq!(result.minutes[4].departures, 1);
        assert_eq!(result.minutes[4].arrivals, 1);
        assert_eq!(result.minutes[4].queue_length, 0);
    }

    #[test]
    fn queued_customer_takes_freed_server_before_new_arrival() {
        // c0 in service 0..3, c1 queues at 1, c2 arrives at 3 when c0 leaves
        let config = single_server(20, 3);
        let engine =
            CallCentre::with_arrivals(config, vec![0, 1, 3], StdRng::seed_from_u64(1)).unwrap();
        let result = engine.run();

        assert_eq!(result.customers[1].service_start_t, Some(3));
        assert_eq!(result.customers[2].service_start_t, Some(6));
        assert_eq!(result.minutes[3].queue_length, 1);
    }

    #[test]
    fn arrivals_take_lowest_index_idle_server() {
        let mut config = single_server(10, 5);
        config.servers = 3;
        let engine = CallCentre::with_arrivals(config, vec![0, 0, 1], StdRng::seed_from_u64(1))
            .unwrap();
        let result = engine.run();

        let servers: Vec<usize> = result
            .trace
            .iter()
            .filter_map(|e| match e.kind {
                TraceKind::Assigned { server, .. } => Some(server),
                _ => None,
            })
            .collect();
        assert_eq!(servers, vec![0, 1, 2]);
    }

    #[test]
    fn step_reports_none_after_horizon() {
        let config = single_server(2, 1);
        let mut engine =
            CallCentre::with_arrivals(config, vec![], StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(engine.step().map(|r| r.minute), Some(0));
        assert_eq!(engine.step().map(|r| r.minute), Some(1));
        assert_eq!(engine.step().map(|r| r.minute), Some(2));
        assert!(engine.is_finished());
        assert_eq!(engine.step(), None);
    }

    #[test]
    fn stop_when_idle_cuts_records_short_but_keeps_denominator() {
        let mut config = single_server(100, 3);
        config.stop_when_idle = true;
        let engine =
            CallCentre::with_arrivals(config, vec![2], StdRng::seed_from_u64(1)).unwrap();
        let result = engine.run();

        // served 2..5, quiescent at minute 5
        assert_eq!(result.minutes.len(), 6);
        assert_eq!(result.summary.total_served, 1);
        assert!((result.servers[0].utilization - 3.0 / 101.0).abs() < 1e-12);
    }

    #[test]
    fn trace_follows_processing_order() {
        let config = single_server(10, 2);
        let engine =
            CallCentre::with_arrivals(config, vec![1, 1], StdRng::seed_from_u64(1)).unwrap();
        let result = engine.run();

        let labels: Vec<(usize, &str)> = result
            .trace
            .iter()
            .map(|e| (e.minute, e.kind.label()))
            .collect();
        assert_eq!(
            labels,
            vec![
                (1, "ARRIVAL"),
                (1, "ASSIGNED"),
                (1, "ARRIVAL"),
                (1, "QUEUED"),
                (3, "DEPARTURE"),
                (3, "ASSIGNED"),
                (5, "DEPARTURE"),
            ]
        );
    }

    #[test]
    fn trace_is_empty_when_disabled() {
        let mut config = single_server(10, 2);
        config.record_trace = false;
        let engine =
            CallCentre::with_arrivals(config, vec![1, 1], StdRng::seed_from_u64(1)).unwrap();
        assert!(engine.run().trace.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected_before_running() {
        let mut config = SimulationConfig::baseline();
        config.servers = 0;
        assert!(matches!(
            CallCentre::new(config, StdRng::seed_from_u64(1)),
            Err(ConfigError::NoServers)
        ));
    }

    #[test]
    fn seeded_engine_remembers_its_seed() {
        let engine = CallCentre::seeded(SimulationConfig::baseline().with_seed(99)).unwrap();
        assert_eq!(engine.run().seed, Some(99));
    }
}

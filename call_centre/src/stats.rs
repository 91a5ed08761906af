//! Running sums collected by the dispatch loop and the metrics derived from them

use serde::{Deserialize, Serialize};

use crate::population::Server;

/// Snapshot of the system at the end of one simulated minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteRecord {
    pub minute: usize,
    pub queue_length: usize,
    pub arrivals: usize,
    pub departures: usize,
    pub servers_busy: usize,
    pub total_in_system: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSummary {
    pub server_id: usize,
    pub busy_minutes: usize,
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_served: usize,
    pub avg_wait: f64,
    pub avg_service: f64,
    pub avg_queue_length: f64,
    pub throughput: f64,
    pub max_queue_length: usize,
    pub max_wait: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    pub total_wait: usize,
    pub total_service: usize,
    pub total_served: usize,
    pub queue_length_integral: usize,
    pub max_queue_length: usize,
    pub max_wait: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator::default()
    }

    pub fn record_departure(&mut self, wait: usize, service_time: usize) {
        self.total_wait += wait;
        self.total_service += service_time;
        self.total_served += 1;
        self.max_wait = self.max_wait.max(wait);
    }

    pub fn record_minute(&mut self, queue_length: usize) {
        self.queue_length_integral += queue_length;
        self.max_queue_length = self.max_queue_length.max(queue_length);
    }

    /// Averages over `minutes` simulated minutes (`horizon + 1`)
    pub fn summary(&self, minutes: usize) -> RunSummary {
        RunSummary {
            total_served: self.total_served,
            avg_wait: ratio(self.total_wait, self.total_served),
            avg_service: ratio(self.total_service, self.total_served),
            avg_queue_length: ratio(self.queue_length_integral, minutes),
            throughput: ratio(self.total_served, minutes),
            max_queue_length: self.max_queue_length,
            max_wait: self.max_wait,
        }
    }

    pub fn server_summaries(servers: &[Server], minutes: usize) -> Vec<ServerSummary> {
        servers
            .iter()
            .map(|server| ServerSummary {
                server_id: server.index,
                busy_minutes: server.busy_minutes,
                utilization: ratio(server.busy_minutes, minutes),
            })
            .collect()
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_accumulator_summarises_to_zero() {
        let summary = Accumulator::new().summary(11);
        assert_eq!(summary.total_served, 0);
        assert_eq!(summary.avg_wait, 0.0);
        assert_eq!(summary.avg_service, 0.0);
        assert_eq!(summary.avg_queue_length, 0.0);
        assert_eq!(summary.throughput, 0.0);
    }

    #[test]
    fn averages_use_served_count_and_minute_count() {
        let mut acc = Accumulator::new();
        acc.record_departure(0, 3);
        acc.record_departure(4, 5);
        for q in [0, 1, 1, 2, 0] {
            acc.record_minute(q);
        }

        let summary = acc.summary(5);
        assert_eq!(summary.total_served, 2);
        assert_eq!(summary.avg_wait, 2.0);
        assert_eq!(summary.avg_service, 4.0);
        assert_eq!(summary.avg_queue_length, 0.8);
        assert_eq!(summary.throughput, 0.4);
        assert_eq!(summary.max_queue_length, 2);
        assert_eq!(summary.max_wait, 4);
    }

    #[test]
    fn utilization_is_busy_share_of_minutes() {
        let mut busy = Server::new(0);
        busy.busy_minutes = 3;
        let idle = Server::new(1);

        let summaries = Accumulator::server_summaries(&[busy, idle], 11);
        assert_eq!(summaries[0].server_id, 0);
        assert_eq!(summaries[0].busy_minutes, 3);
        assert!((summaries[0].utilization - 3.0 / 11.0).abs() < 1e-12);
        assert_eq!(summaries[1].utilization, 0.0);
    }
}

// Hand-checkable scenarios with fixed arrival streams and constant service times

use approx::assert_relative_eq;
use call_centre::{CallCentre, ConfigError, SimulationConfig, SimulationResult, TraceKind};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn config(servers: usize, horizon: usize, service: usize) -> SimulationConfig {
    let mut config = SimulationConfig::baseline()
        .with_service(vec![service], vec![1.0])
        .unwrap();
    config.servers = servers;
    config.horizon = horizon;
    config
}

fn run_with_arrivals(config: SimulationConfig, arrivals: Vec<usize>) -> SimulationResult {
    CallCentre::with_arrivals(config, arrivals, StdRng::seed_from_u64(42))
        .unwrap()
        .run()
}

#[test]
fn given_single_customer_when_served_then_departs_after_service_time() {
    // GIVEN: one server, horizon 10, one customer arriving at minute 2, service 3
    let result = run_with_arrivals(config(1, 10, 3), vec![2]);

    // THEN: departs at minute 5 with no wait
    let customer = &result.customers[0];
    assert_eq!(customer.service_start_t, Some(2));
    assert_eq!(customer.departure_t(), Some(5));
    assert_eq!(customer.wait(), Some(0));
    assert_eq!(result.minutes[5].departures, 1);

    // THEN: busy for minutes 2, 3, 4 out of 11
    assert_eq!(result.servers[0].busy_minutes, 3);
    assert_relative_eq!(result.servers[0].utilization, 3.0 / 11.0);
    assert_eq!(result.summary.total_served, 1);
    assert_eq!(result.summary.avg_wait, 0.0);
    assert_eq!(result.summary.avg_service, 3.0);
    assert_relative_eq!(result.summary.throughput, 1.0 / 11.0);
    assert_eq!(result.minutes.len(), 11);
}

#[test]
fn given_busy_server_when_second_customer_arrives_then_waits_for_departure() {
    // GIVEN: one server, customers at minutes 0 and 1, service 5
    let result = run_with_arrivals(config(1, 20, 5), vec![0, 1]);

    // THEN: second customer starts when the first leaves at minute 5
    let second = &result.customers[1];
    assert_eq!(second.service_start_t, Some(5));
    assert_eq!(second.wait(), Some(4));

    // THEN: queue holds one customer for minutes 1..=4
    let queue: Vec<usize> = result.minutes[..7].iter().map(|m| m.queue_length).collect();
    assert_eq!(queue, vec![0, 1, 1, 1, 1, 0, 0]);

    assert_eq!(result.summary.total_served, 2);
    assert_eq!(result.summary.avg_wait, 2.0);
    assert_eq!(result.summary.max_wait, 4);
    assert_relative_eq!(result.summary.avg_queue_length, 4.0 / 21.0);
}

#[test]
fn given_no_arrivals_when_run_then_everything_is_zero() {
    // GIVEN: first inter-arrival gap already past the horizon
    let mut config = config(3, 10, 4)
        .with_inter_arrival(vec![50], vec![1.0])
        .unwrap();
    config.max_customers = 100;

    let result = CallCentre::new(config, StdRng::seed_from_u64(1))
        .unwrap()
        .run();

    assert_eq!(result.arrivals_generated, 0);
    assert_eq!(result.summary.total_served, 0);
    assert_eq!(result.summary.avg_wait, 0.0);
    assert_eq!(result.summary.avg_service, 0.0);
    assert!(result.servers.iter().all(|s| s.utilization == 0.0));
    assert_eq!(result.minutes.len(), 11);
    assert!(result.minutes.iter().all(|m| m.total_in_system == 0));
}

#[test]
fn given_simultaneous_departure_and_arrival_then_no_spurious_wait() {
    // GIVEN: two servers both finishing at minute 4, two arrivals at minute 4
    let result = run_with_arrivals(config(2, 10, 4), vec![0, 0, 4, 4]);

    // THEN: both new arrivals start immediately on the freed servers
    assert_eq!(result.customers[2].wait(), Some(0));
    assert_eq!(result.customers[3].wait(), Some(0));
    assert_eq!(result.minutes[4].departures, 2);
    assert_eq!(result.minutes[4].arrivals, 2);
    assert_eq!(result.minutes[4].servers_busy, 2);
    assert_eq!(result.minutes[4].queue_length, 0);
}

#[test]
fn given_queue_when_servers_free_then_customers_served_in_arrival_order() {
    // GIVEN: one server, five customers arriving together
    let result = run_with_arrivals(config(1, 30, 2), vec![1, 1, 1, 1, 1]);

    // THEN: service starts are strictly increasing with id
    let starts: Vec<usize> = result
        .customers
        .iter()
        .map(|c| c.service_start_t.unwrap())
        .collect();
    assert_eq!(starts, vec![1, 3, 5, 7, 9]);

    // THEN: queue positions recorded as customers join
    let positions: Vec<usize> = result
        .trace
        .iter()
        .filter_map(|e| match e.kind {
            TraceKind::Queued { position } => Some(position),
            _ => None,
        })
        .collect();
    assert_eq!(positions, vec![1, 2, 3, 4]);
}

#[test]
fn given_service_past_horizon_then_customer_counted_in_service_at_end() {
    // GIVEN: service ends at minute 13 but the run stops after minute 10
    let result = run_with_arrivals(config(1, 10, 5), vec![8, 9]);

    assert_eq!(result.summary.total_served, 0);
    assert_eq!(result.in_service_at_end, 1);
    assert_eq!(result.in_queue_at_end, 1);
    assert_eq!(result.servers[0].busy_minutes, 3);
    assert_eq!(result.customers[1].service_start_t, None);
}

#[test]
fn given_service_time_past_the_clock_range_then_engine_refuses_to_start() {
    // GIVEN: one server, horizon 10, a service time that cannot be added to any minute
    let config = config(1, 10, usize::MAX);

    // WHEN: the engine is built for one arrival at minute 2
    let engine = CallCentre::with_arrivals(config, vec![2], StdRng::seed_from_u64(42));

    // THEN: rejected up front instead of failing mid-run
    assert!(matches!(engine, Err(ConfigError::ClockOverflow { .. })));
}

//! Call centre simulation runner
//!
//! Usage:
//!   cargo run --release --bin call_centre                       # baseline
//!   cargo run --release --bin call_centre -- experiments/x.toml
//!
//! Set `RUST_LOG=debug` for per-minute snapshots, `RUST_LOG=trace` for events.

use std::env;
use std::process;

use call_centre::output::SimulationOutput;
use call_centre::replications::{ReplicationSummary, run_replications};
use call_centre::{CallCentre, ExperimentConfig, SimulationResult};
use log::info;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [experiment_config.toml]", args[0]);
        process::exit(1);
    }

    let config = match args.get(1) {
        Some(path) => {
            info!("Loading experiment config: {}", path);
            ExperimentConfig::load(path).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                process::exit(1);
            })
        }
        None => ExperimentConfig::baseline(),
    };

    println!("=== Call Centre Simulation ===\n");
    println!("Configuration:");
    println!("  Servers: {}", config.simulation.servers);
    println!("  Horizon: {} minutes", config.simulation.horizon);
    println!("  Max customers: {}", config.simulation.max_customers);
    println!(
        "  Mean inter-arrival: {:.2} minutes",
        config.simulation.inter_arrival.mean()
    );
    println!(
        "  Mean service: {:.2} minutes\n",
        config.simulation.service.mean()
    );

    let engine = CallCentre::seeded(config.simulation.clone()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    let result = engine.run();
    print_summary(&result);

    let output = SimulationOutput::from_result(&config.simulation, result);
    if let Err(e) = output.write_all(&config.output.dir, config.output.write_trace) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
    println!("\nResults written to {}", config.output.dir.display());

    if config.output.replications > 1 {
        run_batch(&config, output.metadata.seed.unwrap_or(0));
    }
}

fn print_summary(result: &SimulationResult) {
    let s = &result.summary;
    if let Some(seed) = result.seed {
        println!("Seed: {}", seed);
    }
    println!("Arrivals generated:     {:>10}", result.arrivals_generated);
    println!("Total served:           {:>10}", s.total_served);
    println!("Average waiting time:   {:>10.2} minutes", s.avg_wait);
    println!("Average service time:   {:>10.2} minutes", s.avg_service);
    println!("Average queue length:   {:>10.2}", s.avg_queue_length);
    println!("Throughput:             {:>10.4} per minute", s.throughput);
    println!("Longest queue:          {:>10}", s.max_queue_length);
    println!("Longest wait:           {:>10} minutes", s.max_wait);
    println!(
        "Still queued / in service at close: {} / {}",
        result.in_queue_at_end, result.in_service_at_end
    );
    println!();
    for server in &result.servers {
        println!(
            "Server {} busy {} minutes, utilization {:.3}",
            server.server_id, server.busy_minutes, server.utilization
        );
    }
}

fn run_batch(config: &ExperimentConfig, base_seed: u64) {
    let runs = config.output.replications;
    println!("\n=== {} Replications ===\n", runs);

    let results = match run_replications(&config.simulation, base_seed, runs) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let aggregate = ReplicationSummary::from_runs(&results);

    println!(
        "Successful runs: {}/{}",
        aggregate.successful_runs, aggregate.runs
    );
    for (label, m) in [
        ("Average wait", &aggregate.avg_wait),
        ("Average service", &aggregate.avg_service),
        ("Average queue length", &aggregate.avg_queue_length),
        ("Throughput", &aggregate.throughput),
        ("Mean utilization", &aggregate.mean_utilization),
    ] {
        println!(
            "  {:<22} mean {:>8.3}  std {:>7.3}  range [{:.3}, {:.3}]",
            label, m.mean, m.std, m.min, m.max
        );
    }

    let path = config.output.dir.join("replications.json");
    match serde_json::to_string_pretty(&aggregate)
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()))
    {
        Ok(()) => println!("\nReplication summary written to {}", path.display()),
        Err(e) => eprintln!("Error writing {}: {}", path.display(), e),
    }
}

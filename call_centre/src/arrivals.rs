//! Up-front generation of the arrival stream

use log::debug;
use rand::Rng;
use rand::distr::Distribution;

use crate::config::SimulationConfig;

/// Arrival minutes for a whole run, in non-decreasing order
///
/// A cursor starts at minute 0 and advances by one inter-arrival gap per
/// customer. Generation stops at the first cursor beyond the horizon, which is
/// not emitted, or once `max_customers` arrivals exist.
pub fn generate_arrivals<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Vec<usize> {
    let mut arrivals = Vec::new();
    let mut cursor = 0;
    while arrivals.len() < config.max_customers {
        cursor += config.inter_arrival.sample(rng);
        if cursor > config.horizon {
            break;
        }
        arrivals.push(cursor);
    }
    debug!(
        "Generated {} arrivals over {} minutes",
        arrivals.len(),
        config.minutes()
    );
    arrivals
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(horizon: usize, max_customers: usize, gap: usize) -> SimulationConfig {
        let mut config = SimulationConfig::baseline()
            .with_inter_arrival(vec![gap], vec![1.0])
            .unwrap();
        config.horizon = horizon;
        config.max_customers = max_customers;
        config
    }

    #[test]
    fn constant_gap_fills_horizon_without_overshoot() {
        let mut rng = StdRng::seed_from_u64(0);
        let arrivals = generate_arrivals(&config(10, 100, 3), &mut rng);
        assert_eq!(arrivals, vec![3, 6, 9]);
    }

    #[test]
    fn arrival_on_the_horizon_is_kept() {
        let mut rng = StdRng::seed_from_u64(0);
        let arrivals = generate_arrivals(&config(10, 100, 5), &mut rng);
        assert_eq!(arrivals, vec![5, 10]);
    }

    #[test]
    fn cap_limits_arrivals() {
        let mut rng = StdRng::seed_from_u64(0);
        let arrivals = generate_arrivals(&config(1000, 4, 1), &mut rng);
        assert_eq!(arrivals, vec![1, 2, 3, 4]);
    }

    #[test]
    fn first_gap_beyond_horizon_gives_no_arrivals() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate_arrivals(&config(10, 100, 20), &mut rng).is_empty());
    }

    #[test]
    fn random_gaps_are_sorted_and_bounded() {
        let config = SimulationConfig::baseline();
        let mut rng = StdRng::seed_from_u64(11);
        let arrivals = generate_arrivals(&config, &mut rng);

        assert!(!arrivals.is_empty());
        assert!(arrivals.windows(2).all(|w| w[1] - w[0] >= 2 && w[1] - w[0] <= 6));
        assert!(*arrivals.last().unwrap() <= config.horizon);
        assert!(arrivals[0] >= 2);
    }
}

//! Parallel execution of independent simulation scenarios
//!
//! Each scenario is built and run by a closure that receives its
//! `scenario_id`, so a caller can derive a distinct seed per scenario and keep
//! every run reproducible regardless of completion order.
//!
//! ```rust
//! use des::parallel::{ParallelRunner, simple_progress_reporter};
//!
//! let results = ParallelRunner::new(20, |scenario_id| scenario_id * 2)
//!     .progress(simple_progress_reporter(10))
//!     .run();
//!
//! assert_eq!(results.len(), 20);
//! assert_eq!(results[3], Ok(6));
//! ```
//!
//! # Error Handling
//!
//! A panic inside one scenario is caught and returned as `Err(String)` in that
//! scenario's slot. The remaining scenarios still run.

use rayon::prelude::*;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub type ScenarioResult<R> = Result<R, String>;

/// Executes independent scenarios on the global rayon pool
///
/// Results come back in `scenario_id` order.
pub struct ParallelRunner<R, F>
where
    F: Fn(usize) -> R + Send + Sync,
    R: Send,
{
    num_scenarios: usize,
    scenario: F,
    progress_callback: Option<Arc<dyn Fn(usize, usize) + Send + Sync>>,
    _result: PhantomData<fn() -> R>,
}

impl<R, F> ParallelRunner<R, F>
where
    F: Fn(usize) -> R + Send + Sync,
    R: Send,
{
    pub fn new(num_scenarios: usize, scenario: F) -> Self {
        ParallelRunner {
            num_scenarios,
            scenario,
            progress_callback: None,
            _result: PhantomData,
        }
    }

    /// Set progress callback, called with `(completed, total)` after each scenario
    pub fn progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Execute all scenarios and return results in scenario order
    pub fn run(self) -> Vec<ScenarioResult<R>> {
        let progress_counter = AtomicUsize::new(0);

        (0..self.num_scenarios)
            .into_par_iter()
            .map(|scenario_id| {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    (self.scenario)(scenario_id)
                }));

                let completed = progress_counter.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(ref callback) = self.progress_callback {
                    callback(completed, self.num_scenarios);
                }

                result.map_err(|panic| {
                    if let Some(s) = panic.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    }
                })
            })
            .collect()
    }
}

/// Run scenarios in parallel on the global pool
pub fn run_parallel<R, F>(num_scenarios: usize, scenario: F) -> Vec<ScenarioResult<R>>
where
    F: Fn(usize) -> R + Send + Sync,
    R: Send,
{
    ParallelRunner::new(num_scenarios, scenario).run()
}

/// Progress callback that logs every `interval` completed scenarios
pub fn simple_progress_reporter(interval: usize) -> impl Fn(usize, usize) + Send + Sync {
    let interval = interval.max(1);
    move |completed, total| {
        if completed % interval == 0 || completed == total {
            log::info!("Completed {}/{} scenarios", completed, total);
        }
    }
}

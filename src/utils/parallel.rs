//! Bounded worker pool for ordered parallel maps.
//!
//! Tasks are pure functions of shared read-only inputs. Results come back in
//! input order and the first failing task aborts the whole map.

use crate::error::{Result, TsmlError};
use rayon::prelude::*;

/// A fixed-size pool of workers.
///
/// A pool with one worker runs every task in the calling thread.
#[derive(Debug)]
pub struct WorkerPool {
    n_jobs: usize,
    pool: Option<rayon::ThreadPool>,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::sequential()
    }
}

impl WorkerPool {
    /// Create a pool from an `n_jobs` setting.
    ///
    /// * `1` - sequential execution (default)
    /// * `-1` - one worker per available execution unit
    /// * `n > 1` - exactly `n` workers
    ///
    /// Any other value is rejected.
    pub fn new(n_jobs: isize) -> Result<Self> {
        let n_jobs = resolve_n_jobs(n_jobs)?;
        if n_jobs == 1 {
            return Ok(Self::sequential());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_jobs)
            .build()
            .map_err(|e| TsmlError::ComputationError(format!("failed to build worker pool: {e}")))?;

        Ok(Self {
            n_jobs,
            pool: Some(pool),
        })
    }

    /// A pool that runs every task in the calling thread.
    pub fn sequential() -> Self {
        Self {
            n_jobs: 1,
            pool: None,
        }
    }

    /// Number of workers.
    pub fn n_jobs(&self) -> usize {
        self.n_jobs
    }

    /// Apply `task` to every item, returning results in input order.
    pub fn map<T, R, F>(&self, items: &[T], task: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Result<R> + Sync + Send,
    {
        match &self.pool {
            None => items.iter().map(&task).collect(),
            Some(pool) => pool.install(|| items.par_iter().map(&task).collect()),
        }
    }
}

fn resolve_n_jobs(n_jobs: isize) -> Result<usize> {
    match n_jobs {
        -1 => Ok(std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)),
        n if n >= 1 => Ok(n as usize),
        n => Err(TsmlError::InvalidParameter(format!(
            "n_jobs must be -1 or a positive integer, got {}",
            n
        ))),
    }
}

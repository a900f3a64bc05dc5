//! Explicit fork-join executor threaded through every parallel tree operation.
//!
//! The core never reaches for a process-wide pool on its own: callers pick an
//! [`Executor`] and pass it down. A sequential executor makes every operation
//! deterministic, which is what the unit tests use.
//!
//! ### Modes
//! | Constructor | Work runs on | Notes |
//! |-------------|--------------|-------|
//! | [`Executor::sequential`] | calling thread | forks run left then right |
//! | [`Executor::global`] | rayon global pool | default |
//! | [`Executor::with_threads`] | dedicated rayon pool | entry points `install` into it |

#[cfg(feature = "parallel")]
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use tracing::debug;

use crate::config::{ExecutorConfig, DEFAULT_GRAIN};
#[cfg(feature = "parallel")]
use crate::error::GraphError;
use crate::error::Result;

#[derive(Clone)]
enum Mode {
    Sequential,
    #[cfg(feature = "parallel")]
    Global,
    #[cfg(feature = "parallel")]
    Pool(Arc<rayon::ThreadPool>),
}

/// A fork-join context: either the calling thread or a work-stealing pool.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct Executor {
    mode: Mode,
    grain: usize,
}

impl Executor {
    /// Runs everything on the calling thread.
    pub fn sequential() -> Self {
        Self {
            mode: Mode::Sequential,
            grain: DEFAULT_GRAIN,
        }
    }

    /// Shares rayon's global pool (sequential without the `parallel` feature).
    pub fn global() -> Self {
        #[cfg(feature = "parallel")]
        {
            Self {
                mode: Mode::Global,
                grain: DEFAULT_GRAIN,
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            Self::sequential()
        }
    }

    /// Builds a dedicated pool with `threads` workers.
    ///
    /// `0` lets rayon pick (one worker per core); `1` yields a sequential
    /// executor without spawning anything.
    pub fn with_threads(threads: usize) -> Result<Self> {
        if threads == 1 {
            return Ok(Self::sequential());
        }
        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("arbor-worker-{i}"))
                .build()
                .map_err(|e| GraphError::Executor(e.to_string()))?;
            debug!(workers = pool.current_num_threads(), "created worker pool");
            Ok(Self {
                mode: Mode::Pool(Arc::new(pool)),
                grain: DEFAULT_GRAIN,
            })
        }
        #[cfg(not(feature = "parallel"))]
        {
            Ok(Self::sequential())
        }
    }

    /// Builds an executor from configuration.
    pub fn from_config(config: &ExecutorConfig) -> Result<Self> {
        let exec = match config.threads {
            None => Self::global(),
            Some(threads) => Self::with_threads(threads)?,
        };
        Ok(exec.with_grain(config.grain))
    }

    /// Sets the minimum work size worth forking for.
    #[must_use]
    pub fn with_grain(mut self, grain: usize) -> Self {
        self.grain = grain.max(1);
        self
    }

    /// Minimum work size worth forking for.
    pub fn grain(&self) -> usize {
        self.grain
    }

    /// Returns `true` unless this executor runs everything inline.
    pub fn is_parallel(&self) -> bool {
        !matches!(self.mode, Mode::Sequential)
    }

    /// Number of worker threads available to forked work.
    pub fn num_workers(&self) -> usize {
        match &self.mode {
            Mode::Sequential => 1,
            #[cfg(feature = "parallel")]
            Mode::Global => rayon::current_num_threads(),
            #[cfg(feature = "parallel")]
            Mode::Pool(pool) => pool.current_num_threads(),
        }
    }

    /// Runs `op` inside this executor's pool and waits for it.
    pub fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.mode {
            #[cfg(feature = "parallel")]
            Mode::Pool(pool) => pool.install(op),
            _ => op(),
        }
    }

    /// Runs `a` and `b`, potentially in parallel, and returns both results.
    ///
    /// `work` is the amount of work (tree entries) the two halves cover; below
    /// the grain size both run inline, `a` first.
    #[inline]
    pub fn fork<A, B, RA, RB>(&self, work: usize, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        #[cfg(feature = "parallel")]
        if self.is_parallel() && work >= self.grain {
            return rayon::join(a, b);
        }
        #[cfg(not(feature = "parallel"))]
        let _ = work;
        (a(), b())
    }

    /// Maps `f` over `items`, preserving order in the output.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        if self.is_parallel() && items.len() > 1 {
            return self.install(|| items.par_iter().map(|item| f(item)).collect());
        }
        items.iter().map(f).collect()
    }

    /// Maps every item to a sequence and concatenates them in item order.
    pub fn flat_map<T, R, I, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        I: IntoIterator<Item = R>,
        F: Fn(&T) -> I + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        if self.is_parallel() && items.len() > 1 {
            return self.install(|| items.par_iter().flat_map_iter(|item| f(item)).collect());
        }
        items.iter().flat_map(f).collect()
    }

    /// Stable sort by key.
    pub fn sort_by_key<T, K, F>(&self, items: &mut [T], key: F)
    where
        T: Send,
        K: Ord,
        F: Fn(&T) -> K + Sync,
    {
        #[cfg(feature = "parallel")]
        if self.is_parallel() && items.len() >= self.grain {
            let key = &key;
            self.install(|| items.par_sort_by_key(key));
            return;
        }
        items.sort_by_key(key);
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::global()
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match &self.mode {
            Mode::Sequential => "sequential",
            #[cfg(feature = "parallel")]
            Mode::Global => "global",
            #[cfg(feature = "parallel")]
            Mode::Pool(_) => "pool",
        };
        f.debug_struct("Executor")
            .field("mode", &mode)
            .field("workers", &self.num_workers())
            .field("grain", &self.grain)
            .finish()
    }
}

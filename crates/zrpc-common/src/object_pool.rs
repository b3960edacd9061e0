//! Thread-safe generic object pool.
//!
//! A performance aid for hot paths that would otherwise allocate per
//! request (the provider pools request payload buffers). Objects are
//! acquired as RAII guards and returned automatically on drop, after a
//! user-supplied reset. The pool tracks hit/miss statistics so operators
//! can tell whether it is sized sensibly.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Object pool sizing.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Objects created up front.
    pub initial_size: usize,
    /// Upper bound on idle objects; returns beyond it are dropped.
    pub max_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: 10,
            max_size: 100,
        }
    }
}

/// Snapshot of a pool's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub created: u64,
    pub acquired: u64,
    pub returned: u64,
    pub dropped: u64,
    pub hits: u64,
    pub misses: u64,
}

impl PoolStats {
    /// Fraction of acquisitions served from the pool, in `0.0..=1.0`.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    created: AtomicU64,
    acquired: AtomicU64,
    returned: AtomicU64,
    dropped: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Thread-safe pool of reusable objects.
pub struct ObjectPool<T> {
    factory: Box<dyn Fn() -> T + Send + Sync>,
    reset: Box<dyn Fn(&mut T) + Send + Sync>,
    idle: Mutex<Vec<T>>,
    config: PoolConfig,
    counters: Counters,
}

impl<T> ObjectPool<T> {
    /// A pool whose objects need no reset between uses.
    pub fn new<F>(config: PoolConfig, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::with_reset(config, factory, |_| {})
    }

    /// A pool that runs `reset` on every object as it is returned.
    pub fn with_reset<F, R>(config: PoolConfig, factory: F, reset: R) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        R: Fn(&mut T) + Send + Sync + 'static,
    {
        let counters = Counters::default();
        let mut idle = Vec::with_capacity(config.initial_size);
        for _ in 0..config.initial_size {
            idle.push(factory());
        }
        counters.created.store(idle.len() as u64, Ordering::Relaxed);
        Self {
            factory: Box::new(factory),
            reset: Box::new(reset),
            idle: Mutex::new(idle),
            config,
            counters,
        }
    }

    /// Takes an object from the pool, creating one when none is idle.
    pub fn acquire(&self) -> Pooled<'_, T> {
        self.counters.acquired.fetch_add(1, Ordering::Relaxed);
        let recycled = self.idle.lock().unwrap().pop();
        let object = match recycled {
            Some(object) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                object
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                self.counters.created.fetch_add(1, Ordering::Relaxed);
                (self.factory)()
            }
        };
        Pooled {
            object: Some(object),
            pool: self,
        }
    }

    /// Idle objects currently held.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap().len()
    }

    /// Snapshot of the pool's counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.counters.created.load(Ordering::Relaxed),
            acquired: self.counters.acquired.load(Ordering::Relaxed),
            returned: self.counters.returned.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
        }
    }

    fn give_back(&self, mut object: T) {
        (self.reset)(&mut object);
        let mut idle = self.idle.lock().unwrap();
        if idle.len() < self.config.max_size {
            idle.push(object);
            self.counters.returned.fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// RAII guard for a pooled object; returns it to the pool on drop.
pub struct Pooled<'a, T> {
    object: Option<T>,
    pool: &'a ObjectPool<T>,
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.object.as_ref().expect("pooled object already returned")
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.object.as_mut().expect("pooled object already returned")
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(object) = self.object.take() {
            self.pool.give_back(object);
        }
    }
}

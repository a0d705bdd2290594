//! Observers for resolution events.
//!
//! Observers hook the injector's construction path for structured logging and
//! metrics. They see cache misses only: a resolution served from an already
//! constructed slot makes no observer calls, so a hot injector pays nothing
//! for an attached observer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::DiError;
use crate::key::Key;

/// Observes construction attempts on an injector.
///
/// All methods default to no-ops, so an implementation overrides only the
/// events it cares about. Calls are made synchronously during resolution;
/// keep implementations lightweight.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use wirebox::{ComponentBuilder, Injector, Key, Observer};
///
/// struct Tracing;
///
/// impl Observer for Tracing {
///     fn resolved(&self, key: &Key, duration: Duration) {
///         println!("built {} in {:?}", key.display_name(), duration);
///     }
/// }
///
/// let component = ComponentBuilder::new()
///     .bind_instance(Arc::new(1u32))
///     .add_observer(Arc::new(Tracing))
///     .finalize()
///     .unwrap();
/// let injector = Injector::new(&component).unwrap();
/// injector.get::<u32>().unwrap();
/// ```
pub trait Observer: Send + Sync {
    /// Called before a binding's constructor runs.
    fn resolving(&self, key: &Key) {
        let _ = key;
    }

    /// Called after a binding constructed successfully.
    ///
    /// `duration` spans dependency resolution plus the constructor itself.
    fn resolved(&self, key: &Key, duration: Duration) {
        let _ = (key, duration);
    }

    /// Called when construction failed. The error still propagates to the
    /// caller after this.
    fn resolution_failed(&self, key: &Key, error: &DiError) {
        let _ = (key, error);
    }
}

/// Built-in observer that logs events to stdout and stderr.
///
/// Useful during development; production systems usually implement
/// [`Observer`] against their own logging stack instead.
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "[wirebox]".to_string(),
        }
    }

    /// Logging observer with a custom line prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for LoggingObserver {
    fn resolving(&self, key: &Key) {
        println!("{} Resolving: {}", self.prefix, key.display_name());
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        println!(
            "{} Resolved: {} in {:?}",
            self.prefix,
            key.display_name(),
            duration
        );
    }

    fn resolution_failed(&self, key: &Key, error: &DiError) {
        eprintln!(
            "{} FAILED {}: {}",
            self.prefix,
            key.display_name(),
            error
        );
    }
}

/// Observer that accumulates resolution counts and timings.
///
/// Share it with `Arc` and read the metrics after the workload:
///
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{ComponentBuilder, Injector, MetricsObserver};
///
/// let metrics = Arc::new(MetricsObserver::new());
/// let component = ComponentBuilder::new()
///     .bind_instance(Arc::new(1u32))
///     .add_observer(metrics.clone())
///     .finalize()
///     .unwrap();
///
/// let injector = Injector::new(&component).unwrap();
/// injector.get::<u32>().unwrap();
/// injector.get::<u32>().unwrap(); // cached, not counted
/// assert_eq!(metrics.resolution_count(), 1);
/// ```
pub struct MetricsObserver {
    pub resolution_count: AtomicU64,
    pub total_resolution_time: AtomicU64,
    pub failure_count: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self {
            resolution_count: AtomicU64::new(0),
            total_resolution_time: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
        }
    }

    /// Successful constructions observed.
    pub fn resolution_count(&self) -> u64 {
        self.resolution_count.load(Ordering::Relaxed)
    }

    /// Failed constructions observed.
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Total time spent constructing.
    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_resolution_time.load(Ordering::Relaxed))
    }

    /// Mean construction time, when anything has been constructed.
    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            return None;
        }
        let total = self.total_resolution_time.load(Ordering::Relaxed);
        Some(Duration::from_nanos(total / count))
    }

    /// Zeroes all counters.
    pub fn reset(&self) {
        self.resolution_count.store(0, Ordering::Relaxed);
        self.total_resolution_time.store(0, Ordering::Relaxed);
        self.failure_count.store(0, Ordering::Relaxed);
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn resolved(&self, _key: &Key, duration: Duration) {
        self.resolution_count.fetch_add(1, Ordering::Relaxed);
        self.total_resolution_time
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn resolution_failed(&self, _key: &Key, _error: &DiError) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ComponentBuilder;
    use crate::injector::Injector;
    use std::sync::Arc;

    #[test]
    fn metrics_accumulate_and_reset() {
        let metrics = MetricsObserver::new();
        let key = Key::of::<String>();

        assert_eq!(metrics.resolution_count(), 0);
        assert!(metrics.average_resolution_time().is_none());

        metrics.resolved(&key, Duration::from_millis(10));
        metrics.resolved(&key, Duration::from_millis(20));
        assert_eq!(metrics.resolution_count(), 2);
        assert!(metrics.total_resolution_time() >= Duration::from_millis(30));

        metrics.resolution_failed(&key, &DiError::NullProvider("x"));
        assert_eq!(metrics.failure_count(), 1);

        metrics.reset();
        assert_eq!(metrics.resolution_count(), 0);
        assert_eq!(metrics.failure_count(), 0);
    }

    #[test]
    fn cached_hits_are_not_observed() {
        let metrics = Arc::new(MetricsObserver::new());
        let component = ComponentBuilder::new()
            .register_provider(|| Some(41u64))
            .add_observer(metrics.clone())
            .finalize()
            .unwrap();
        let injector = Injector::new(&component).unwrap();

        injector.get::<u64>().unwrap();
        injector.get::<u64>().unwrap();
        assert_eq!(metrics.resolution_count(), 1);
    }

    #[test]
    fn failures_reach_observers() {
        let metrics = Arc::new(MetricsObserver::new());
        let component = ComponentBuilder::new()
            .register_provider(|| None::<u64>)
            .add_observer(metrics.clone())
            .finalize()
            .unwrap();
        let injector = Injector::new(&component).unwrap();

        assert!(injector.get::<u64>().is_err());
        assert_eq!(metrics.failure_count(), 1);
    }
}

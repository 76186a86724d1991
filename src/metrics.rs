//! Daily metrics bookkeeping
//!
//! Cumulative compartments (I, R, D totals) are turned into per-step
//! increments by differencing successive snapshots:
//!
//! ```text
//! new_infections[k] = ΣI(k) − ΣI(k−1)
//! new_deaths[k]     = ΣD(k) − ΣD(k−1)
//! new_recoveries[k] = ΣR(k) − ΣR(k−1)
//! ```
//!
//! "New infections" is the net change in the infectious compartment, not
//! incidence; it goes negative once recoveries and deaths outpace
//! progression from E.
//!
//! Each entry also carries the model time of the snapshot that closes it,
//! so exporters can place entries on the calendar even when the recorded
//! times are not whole days apart.
//!
//! The accumulator keeps an owned copy of the previous totals, so the state
//! it was taken from can be overwritten in place without aliasing the
//! snapshot.

use crate::physics::{Compartment, CompartmentState, CompartmentTotals};
use serde::{Deserialize, Serialize};

/// Per-step increments, one entry per recorded step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    /// Model time at which each entry was recorded
    pub time: Vec<f64>,
    /// Change of the infected total
    pub new_infections: Vec<f64>,
    /// Change of the deceased total
    pub new_deaths: Vec<f64>,
    /// Change of the recovered total
    pub new_recoveries: Vec<f64>,
}

impl DailyMetrics {
    /// Number of recorded steps
    pub fn len(&self) -> usize {
        self.new_infections.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.new_infections.is_empty()
    }

    /// Index and value of the largest daily increase in infections
    ///
    /// The time of the peak is `time[index]`.
    pub fn peak_infections(&self) -> Option<(usize, f64)> {
        self.new_infections
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (index, value)| match best {
                Some((_, top)) if top >= value => best,
                _ => Some((index, value)),
            })
    }

    /// Sum of all daily deaths
    pub fn total_deaths(&self) -> f64 {
        self.new_deaths.iter().sum()
    }

    /// Sum of all daily recoveries
    pub fn total_recoveries(&self) -> f64 {
        self.new_recoveries.iter().sum()
    }
}

/// Running differencer over successive states
///
/// # Example
///
/// ```
/// use seird_rs::metrics::MetricsAccumulator;
/// use seird_rs::physics::CompartmentVector;
///
/// let before = CompartmentVector::new(989.0, 10.0, 1.0, 0.0, 0.0);
/// let after = CompartmentVector::new(985.0, 12.0, 2.5, 0.4, 0.1);
///
/// let mut accumulator = MetricsAccumulator::new(&before);
/// accumulator.record(1.0, &after);
///
/// let metrics = accumulator.finish();
/// assert_eq!(metrics.time, vec![1.0]);
/// assert!((metrics.new_infections[0] - 1.5).abs() < 1e-12);
/// assert!((metrics.new_deaths[0] - 0.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct MetricsAccumulator {
    previous: CompartmentTotals,
    metrics: DailyMetrics,
}

impl MetricsAccumulator {
    /// Start from the totals of the initial state
    pub fn new<S: CompartmentState>(initial: &S) -> Self {
        Self::with_capacity(initial, 0)
    }

    /// Same as [`new`](Self::new) with room for `capacity` steps
    pub fn with_capacity<S: CompartmentState>(initial: &S, capacity: usize) -> Self {
        Self {
            previous: initial.totals(),
            metrics: DailyMetrics {
                time: Vec::with_capacity(capacity),
                new_infections: Vec::with_capacity(capacity),
                new_deaths: Vec::with_capacity(capacity),
                new_recoveries: Vec::with_capacity(capacity),
            },
        }
    }

    /// Append the increments from the last snapshot to `state`, taken at `time`, then keep `state`'s totals
    pub fn record<S: CompartmentState>(&mut self, time: f64, state: &S) {
        let current = state.totals();
        let delta = |compartment| current.get(compartment) - self.previous.get(compartment);

        self.metrics.time.push(time);
        self.metrics.new_infections.push(delta(Compartment::Infected));
        self.metrics.new_deaths.push(delta(Compartment::Deceased));
        self.metrics.new_recoveries.push(delta(Compartment::Recovered));

        self.previous = current;
    }

    /// Metrics recorded so far
    pub fn metrics(&self) -> &DailyMetrics {
        &self.metrics
    }

    /// Consume the accumulator
    pub fn finish(self) -> DailyMetrics {
        self.metrics
    }
}

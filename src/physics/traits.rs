//! Epidemic model traits and types
//!
//! This module defines the core API shared by both SEIRD variants:
//! - `Compartment`: type-safe compartment identifiers
//! - `CompartmentTotals`: aggregate population per compartment
//! - `CompartmentState`: the arithmetic a solver needs from a state
//! - `EpidemicModel`: trait for all epidemic models (the right-hand side)

use crate::error::Result;
use std::fmt;

// =================================================================================================
// Compartments (Type-safe Identifiers)
// =================================================================================================

/// SEIRD compartments
///
/// Used to address one compartment in either state type instead of
/// positional indices or strings.
///
/// # Example
/// ```
/// use seird_rs::physics::Compartment;
///
/// assert_eq!(Compartment::Infected.symbol(), "I");
/// assert!(!Compartment::Deceased.is_living());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Compartment {
    /// Susceptible (S)
    Susceptible,

    /// Exposed, infected but not yet infectious (E)
    Exposed,

    /// Infected and infectious (I)
    Infected,

    /// Recovered (R)
    Recovered,

    /// Deceased (D)
    Deceased,
}

impl Compartment {
    /// Number of compartments
    pub const COUNT: usize = 5;

    /// All compartments in storage order
    pub const ALL: [Compartment; Compartment::COUNT] = [
        Compartment::Susceptible,
        Compartment::Exposed,
        Compartment::Infected,
        Compartment::Recovered,
        Compartment::Deceased,
    ];

    /// Storage index (S=0 … D=4)
    pub fn index(self) -> usize {
        self as usize
    }

    /// One letter symbol
    pub fn symbol(self) -> &'static str {
        match self {
            Compartment::Susceptible => "S",
            Compartment::Exposed => "E",
            Compartment::Infected => "I",
            Compartment::Recovered => "R",
            Compartment::Deceased => "D",
        }
    }

    /// Whether the compartment counts towards the living population N
    pub fn is_living(self) -> bool {
        !matches!(self, Compartment::Deceased)
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compartment::Susceptible => "Susceptible",
            Compartment::Exposed => "Exposed",
            Compartment::Infected => "Infected",
            Compartment::Recovered => "Recovered",
            Compartment::Deceased => "Deceased",
        };
        write!(f, "{}", name)
    }
}

// =================================================================================================
// Compartment Totals
// =================================================================================================

/// Aggregate population of each compartment
///
/// For a grid state this is the sum over every cell, for a scalar state the
/// value itself. Totals are plain values: holding one never aliases the state
/// it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompartmentTotals {
    values: [f64; Compartment::COUNT],
}

impl CompartmentTotals {
    /// Create from values in storage order
    pub fn new(values: [f64; Compartment::COUNT]) -> Self {
        Self { values }
    }

    /// Total of one compartment
    pub fn get(&self, compartment: Compartment) -> f64 {
        self.values[compartment.index()]
    }

    /// Living population N = S + E + I + R
    pub fn living(&self) -> f64 {
        Compartment::ALL
            .iter()
            .filter(|c| c.is_living())
            .map(|c| self.get(*c))
            .sum()
    }

    /// Whole population including the deceased
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Values in storage order
    pub fn as_array(&self) -> [f64; Compartment::COUNT] {
        self.values
    }
}

// =================================================================================================
// Compartment State
// =================================================================================================

/// Operations a solver needs from a compartment state
///
/// Implemented by the lumped [`CompartmentVector`](crate::physics::CompartmentVector)
/// and the spatial [`CompartmentField`](crate::physics::CompartmentField), so that
/// both time integrators are written once and shared invariants can be tested
/// against either.
pub trait CompartmentState: Clone + Send + Sync {
    /// Aggregate population of each compartment
    fn totals(&self) -> CompartmentTotals;

    /// `factor · self`
    fn scale(&self, factor: f64) -> Self;

    /// `self + Σ cᵢ · xᵢ`
    ///
    /// Every term must have the same shape as `self`.
    fn linear_combination(&self, terms: &[(f64, &Self)]) -> Self;

    /// Set every negative value to zero and return how many were changed
    fn clamp_non_negative(&mut self) -> usize;

    /// First compartment holding a NaN or an infinity, if any
    fn first_non_finite(&self) -> Option<Compartment>;

    /// Weighted RMS norm of `self` taken as a local error estimate
    ///
    /// Each component is scaled by `atol + rtol · max(|previous|, |next|)`.
    fn error_norm(&self, previous: &Self, next: &Self, atol: f64, rtol: f64) -> f64;
}

// =================================================================================================
// Epidemic Model Trait
// =================================================================================================

/// Trait for epidemic models
///
/// # Responsibility
/// Computes the rate of change of every compartment at a given state.
/// Does NOT advance it in time (that's the Solver's job).
///
/// The dynamics are autonomous: rates depend on the state only, never on
/// the time, so the solvers do not pass a clock.
pub trait EpidemicModel: Send + Sync {
    /// State type the model works on
    type State: CompartmentState;

    /// Right-hand side `dy/dt = f(y)`
    ///
    /// # Errors
    /// Models may refuse states where the dynamics are undefined (e.g. a
    /// collapsed living population when the incidence is normalised).
    fn rates(&self, state: &Self::State) -> Result<Self::State>;

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (option)
    fn description(&self) -> Option<&str> {
        None
    }

    /// Largest step an explicit integrator can take without diffusive instability
    ///
    /// `None` when the model has no such limit (no spatial coupling).
    fn stability_limit(&self) -> Option<f64> {
        None
    }
}

// =================================================================================================
// Tests
// =================================================================================================

//! Epidemiological parameters
//!
//! Per-capita rates shared by the spatial and the lumped model. Rates are
//! per unit of time (days in the reference configuration). For the explicit
//! grid stepper they must also be small enough that `rate · Δt` keeps every
//! compartment within `[0, population]`; this is a documented stability
//! precondition, not something the code enforces.

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};

/// Immutable set of SEIRD rates
///
/// `Default` is the reference configuration.
///
/// # Example
///
/// ```
/// use seird_rs::physics::ParameterSet;
///
/// let parameters = ParameterSet::default();
/// assert!(parameters.validate().is_ok());
/// assert_eq!(parameters.natural_death_rate, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterSet {
    /// Birth rate α (spatial model only)
    pub birth_rate: f64,
    /// Natural death rate μ
    pub natural_death_rate: f64,
    /// Transmission rate from exposed contacts βE
    pub transmission_exposed: f64,
    /// Transmission rate from infected contacts βI
    pub transmission_infected: f64,
    /// Progression rate E → I, σ
    pub progression_rate: f64,
    /// Recovery rate E → R, φE
    pub recovery_rate_exposed: f64,
    /// Recovery rate I → R, φR
    pub recovery_rate_infected: f64,
    /// Death rate I → D, φD
    pub death_rate: f64,
    /// Diffusion coefficient ν (spatial model only)
    pub diffusion: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            birth_rate: 0.0,
            natural_death_rate: 0.0,
            transmission_exposed: 0.0003,
            transmission_infected: 0.0003,
            progression_rate: 1.0 / 7.0,
            recovery_rate_exposed: 1.0 / 6.0,
            recovery_rate_infected: 1.0 / 24.0,
            death_rate: 1.0 / 160.0,
            diffusion: 1e-4,
        }
    }
}

impl ParameterSet {
    /// Named view of every rate, in declaration order
    pub fn named_rates(&self) -> [(&'static str, f64); 9] {
        [
            ("birth_rate", self.birth_rate),
            ("natural_death_rate", self.natural_death_rate),
            ("transmission_exposed", self.transmission_exposed),
            ("transmission_infected", self.transmission_infected),
            ("progression_rate", self.progression_rate),
            ("recovery_rate_exposed", self.recovery_rate_exposed),
            ("recovery_rate_infected", self.recovery_rate_infected),
            ("death_rate", self.death_rate),
            ("diffusion", self.diffusion),
        ]
    }

    /// Check every rate is finite and non-negative
    ///
    /// # Errors
    /// [`SimulationError::InvalidParameter`] naming the first offending rate.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.named_rates() {
            if !value.is_finite() {
                return Err(SimulationError::invalid(name, format!("must be finite, got {}", value)));
            }
            if value < 0.0 {
                return Err(SimulationError::invalid(
                    name,
                    format!("must be non-negative, got {}", value),
                ));
            }
        }
        Ok(())
    }

    /// Total exit rate of the exposed compartment σ + φE + μ
    pub fn exposed_exit_rate(&self) -> f64 {
        self.progression_rate + self.recovery_rate_exposed + self.natural_death_rate
    }

    /// Total exit rate of the infected compartment φR + φD + μ
    pub fn infected_exit_rate(&self) -> f64 {
        self.recovery_rate_infected + self.death_rate + self.natural_death_rate
    }

    /// Basic reproduction number of the lumped (standard incidence) model
    ///
    /// ```text
    /// R₀ = βE / (σ + φE + μ) + σ / (σ + φE + μ) · βI / (φR + φD + μ)
    /// ```
    ///
    /// Returns infinity when an exit rate is zero.
    pub fn basic_reproduction_number(&self) -> f64 {
        let exposed_exit = self.exposed_exit_rate();
        let infected_exit = self.infected_exit_rate();

        if exposed_exit == 0.0 || infected_exit == 0.0 {
            return f64::INFINITY;
        }

        self.transmission_exposed / exposed_exit
            + (self.progression_rate / exposed_exit) * (self.transmission_infected / infected_exit)
    }
}

// =================================================================================================
// Incidence
// =================================================================================================

/// Form of the force of infection
///
/// The grid model of the reference uses mass-action incidence while the
/// lumped model divides by the living population. Both stay available so
/// the divergence is explicit instead of silently reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Incidence {
    /// `(βE·E + βI·I)·S`
    #[default]
    MassAction,

    /// `(βE·E + βI·I)·S / N`, N = S + E + I + R
    Standard,
}

impl Incidence {
    /// New exposures per unit time
    ///
    /// For [`Incidence::Standard`] a non-positive `living` gives zero; callers
    /// that must reject a collapsed population check it beforehand.
    #[inline]
    pub fn force_of_infection(
        self,
        parameters: &ParameterSet,
        susceptible: f64,
        exposed: f64,
        infected: f64,
        living: f64,
    ) -> f64 {
        let contacts = parameters.transmission_exposed * exposed
            + parameters.transmission_infected * infected;

        match self {
            Incidence::MassAction => contacts * susceptible,
            Incidence::Standard => {
                if living > 0.0 {
                    contacts * susceptible / living
                } else {
                    0.0
                }
            }
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================

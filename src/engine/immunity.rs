//! Vaccine-derived protection with waning.
//!
//! At day 0 the vaccinated fraction has full transmission protection
//! `coverage * vax_transmission_eff`. Primary-series efficacy then decays
//! exponentially toward the residual floor with half-life `waning_days / 2`.
//! The boosted subset holds `vax_transmission_eff` for the whole horizon.
//!
//! The half-life is a calibration assumption, not a fitted value.

use serde::{Deserialize, Serialize};

/// Vaccination inputs, all fractions except `waning_days`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VaccineProtection {
    /// Fraction vaccinated (primary series).
    pub coverage: f64,
    /// Fraction boosted (subset of `coverage`).
    pub booster_coverage: f64,
    /// Relative reduction in transmission when fresh.
    pub transmission_eff: f64,
    /// Relative reduction in mortality.
    pub severity_eff: f64,
    /// Days over which protection wanes.
    pub waning_days: u32,
    /// Efficacy that waning decays toward.
    pub residual_floor: f64,
}

impl VaccineProtection {
    /// No vaccination at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            coverage: 0.0,
            booster_coverage: 0.0,
            transmission_eff: 0.0,
            severity_eff: 0.0,
            waning_days: 0,
            residual_floor: 0.0,
        }
    }

    /// Half-life of primary-series efficacy in days.
    #[must_use]
    pub fn half_life_days(&self) -> f64 {
        f64::from(self.waning_days) / 2.0
    }

    /// Primary-series transmission efficacy on `day`.
    #[must_use]
    pub fn efficacy(&self, day: u32) -> f64 {
        let half_life = self.half_life_days();
        if half_life <= 0.0 {
            return self.residual_floor;
        }
        let remaining = 0.5_f64.powf(f64::from(day) / half_life);
        self.residual_floor + (self.transmission_eff - self.residual_floor) * remaining
    }

    /// Population-level fraction of transmission blocked on `day`.
    #[must_use]
    pub fn protection(&self, day: u32) -> f64 {
        let boosted = self.booster_coverage.min(self.coverage);
        let primary_only = self.coverage - boosted;
        (primary_only * self.efficacy(day) + boosted * self.transmission_eff).clamp(0.0, 1.0)
    }

    /// Susceptibility multiplier `v(t)` applied to the force of infection.
    #[must_use]
    pub fn transmission_multiplier(&self, day: u32) -> f64 {
        1.0 - self.protection(day)
    }

    /// Multiplier applied to the mortality flow.
    #[must_use]
    pub fn severity_multiplier(&self) -> f64 {
        (1.0 - self.coverage * self.severity_eff).clamp(0.0, 1.0)
    }
}

impl Default for VaccineProtection {
    fn default() -> Self {
        Self::none()
    }
}

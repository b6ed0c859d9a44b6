//! Seasonal transmission forcing for the compartmental simulator.
//!
//! `season(t) = 1 + (seasonal_factor - 1) * envelope(t)` where the envelope
//! is 1 inside the peak weeks, 0 outside, and crosses each peak-window
//! boundary along a half-sine ramp spanning half a week on either side.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::engine::calendar::{EpiWeek, SeasonCalendar, WEEKS_PER_YEAR};

/// Peak-week membership plus the multiplier applied at full peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakSeason {
    /// Membership by zero-based week index.
    peak: Vec<bool>,
    /// Transmission multiplier at full peak.
    amplitude: f64,
}

impl PeakSeason {
    /// Build from a set of peak weeks and a peak multiplier.
    #[must_use]
    pub fn new(peak_weeks: &[EpiWeek], amplitude: f64) -> Self {
        let mut peak = vec![false; WEEKS_PER_YEAR as usize];
        for week in peak_weeks {
            peak[(week.get() - 1) as usize] = true;
        }
        Self { peak, amplitude }
    }

    /// No seasonal forcing.
    #[must_use]
    pub fn flat() -> Self {
        Self::new(&[], 1.0)
    }

    /// Whether `week` is a peak week.
    #[must_use]
    pub fn is_peak(&self, week: EpiWeek) -> bool {
        self.peak[(week.get() - 1) as usize]
    }

    /// Peak-window membership in `[0, 1]` at a continuous week coordinate.
    #[must_use]
    pub fn envelope(&self, coordinate: f64) -> f64 {
        let index = coordinate.floor() as u32 % WEEKS_PER_YEAR;
        let within = coordinate - coordinate.floor();
        let here = EpiWeek::new(index + 1).map_or(false, |w| self.is_peak(w));
        let level = f64::from(u8::from(here));

        // Blend with the neighbour on the near side of the week.
        let (neighbour, distance) = if within < 0.5 {
            (index.checked_sub(1).unwrap_or(WEEKS_PER_YEAR - 1), within)
        } else {
            ((index + 1) % WEEKS_PER_YEAR, 1.0 - within)
        };
        let other = f64::from(u8::from(self.peak[neighbour as usize]));
        if (other - level).abs() < f64::EPSILON {
            return level;
        }

        // distance 0 -> halfway, distance 0.5 -> fully this week's level
        let toward_here = 0.5 + 0.5 * (PI * distance).sin();
        other + (level - other) * toward_here
    }

    /// Transmission multiplier on `day`.
    #[must_use]
    pub fn multiplier(&self, calendar: &SeasonCalendar, day: u32) -> f64 {
        let envelope = self.envelope(calendar.week_coordinate(day));
        1.0 + (self.amplitude - 1.0) * envelope
    }

    /// Peak multiplier.
    #[must_use]
    pub const fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

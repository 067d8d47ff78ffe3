//! Time allocation heuristics.
//!
//! Two pure functions size a task's time budget:
//!
//! - [`allocate`]: power-law sizing. Larger estimates get a larger exponent,
//!   so long tasks receive disproportionately longer uninterrupted blocks.
//! - [`cone_of_slippage`]: a confidence band around an estimate, widened by
//!   poor historical accuracy. Overruns are allowed more room than
//!   underruns.
//!
//! Neither function errors. Out-of-domain inputs are clamped to the nearest
//! defined value.

use serde::{Deserialize, Serialize};

/// Smallest estimate fed to the logarithm; keeps `log10` finite.
const MIN_ESTIMATE_MINUTES: f64 = 1.0;

/// Estimate (minutes) at which the exponent is exactly 1.0.
const REFERENCE_MINUTES: f64 = 10.0;

const MIN_EXPONENT: f64 = 0.5;
const MAX_EXPONENT: f64 = 2.5;

/// Growth base applied per unit of exponent above 1.0.
const GROWTH_BASE: f64 = 1.2;

const MIN_FACTOR: f64 = 0.6;
const MAX_FACTOR: f64 = 1.5;

/// Downside coefficient of the cone.
const UNDERRUN_COEFFICIENT: f64 = 0.3;
/// Upside coefficient of the cone.
const OVERRUN_COEFFICIENT: f64 = 0.5;

const MIN_CONFIDENCE: f64 = 0.5;
const MAX_CONFIDENCE: f64 = 0.95;

/// Result of power-law sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Recommended budget in minutes
    pub optimal: u32,
    pub min: u32,
    pub max: u32,
    /// Always within 0.5-2.5
    pub exponent: f64,
}

/// Confidence band around an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeOfSlippage {
    pub lower: u32,
    pub upper: u32,
    /// Always within 0.5-0.95
    pub confidence: f64,
}

impl ConeOfSlippage {
    /// Width of the band in minutes.
    pub fn width(&self) -> u32 {
        self.upper.saturating_sub(self.lower)
    }

    pub fn contains(&self, minutes: u32) -> bool {
        (self.lower..=self.upper).contains(&minutes)
    }
}

/// Size a task with the power-law heuristic.
///
/// `task_count` does not influence the result. It is accepted so callers
/// that pass the current backlog size keep working.
///
/// Estimates below one minute are treated as one minute.
pub fn allocate(estimated_minutes: u32, task_count: usize) -> Allocation {
    let _ = task_count;
    let estimated = (estimated_minutes as f64).max(MIN_ESTIMATE_MINUTES);
    let exponent = power_law_exponent(estimated);

    let optimal = estimated * GROWTH_BASE.powf(exponent - 1.0);
    let optimal = round_minutes(optimal);

    Allocation {
        optimal,
        min: round_minutes(optimal as f64 * MIN_FACTOR),
        max: round_minutes(optimal as f64 * MAX_FACTOR),
        exponent,
    }
}

/// Exponent for an estimate: `clamp(1 + log10(estimate / 10), 0.5, 2.5)`.
pub fn power_law_exponent(estimated_minutes: f64) -> f64 {
    let estimated = estimated_minutes.max(MIN_ESTIMATE_MINUTES);
    let complexity = (estimated / REFERENCE_MINUTES).log10();
    (1.0 + complexity).clamp(MIN_EXPONENT, MAX_EXPONENT)
}

/// Confidence band for an estimate given historical accuracy (0.0-1.0).
///
/// Accuracy outside 0.0-1.0 is clamped before use.
pub fn cone_of_slippage(estimated_minutes: u32, historical_accuracy: f64) -> ConeOfSlippage {
    let accuracy = if historical_accuracy.is_nan() {
        0.0
    } else {
        historical_accuracy.clamp(0.0, 1.0)
    };
    let variance = 1.0 - accuracy;
    let estimated = estimated_minutes as f64;

    ConeOfSlippage {
        lower: round_minutes(estimated * (1.0 - variance * UNDERRUN_COEFFICIENT)),
        upper: round_minutes(estimated * (1.0 + variance * OVERRUN_COEFFICIENT)),
        confidence: accuracy.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE),
    }
}

fn round_minutes(minutes: f64) -> u32 {
    let rounded = minutes.round();
    if rounded <= 0.0 {
        0
    } else if rounded >= u32::MAX as f64 {
        u32::MAX
    } else {
        rounded as u32
    }
}

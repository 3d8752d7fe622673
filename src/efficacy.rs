// Copyright 2026 Hypermesh Foundation. All rights reserved.
// PrEP Impact Simulator - Efficacy Resolver
//
// Maps an adherence level to the realized prophylactic efficacy of a
// modality using fixed, descending adherence tiers.

use serde::Serialize;

use crate::types::{check_fraction, Modality, ParameterError};

// ---------------------------------------------------------------------------
// Tier tables
// ---------------------------------------------------------------------------

/// One row of a tier table: adherence at or above `min_adherence` yields
/// `efficacy`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficacyTier {
    pub min_adherence: f64,
    pub efficacy: f64,
}

const fn tier(min_adherence: f64, efficacy: f64) -> EfficacyTier {
    EfficacyTier { min_adherence, efficacy }
}

/// Daily oral PrEP, highest tier first. The last row is the floor.
pub const ORAL_TIERS: [EfficacyTier; 5] = [
    tier(0.90, 0.99),
    tier(0.70, 0.90),
    tier(0.50, 0.70),
    tier(0.30, 0.50),
    tier(0.0, 0.30),
];

/// Long-acting injectable, highest tier first. The last row is the floor.
pub const INJECTABLE_TIERS: [EfficacyTier; 4] = [
    tier(0.95, 0.98),
    tier(0.80, 0.95),
    tier(0.60, 0.90),
    tier(0.0, 0.85),
];

/// Tier table for a modality.
pub fn tiers(modality: Modality) -> &'static [EfficacyTier] {
    match modality {
        Modality::Oral => &ORAL_TIERS,
        Modality::Injectable => &INJECTABLE_TIERS,
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Realized efficacy for `adherence` under `modality`.
///
/// Lower bounds are inclusive: oral adherence of exactly 0.90 resolves to
/// 0.99.
///
/// # Errors
/// `InvalidParameter` when `adherence` is NaN or outside `[0, 1]`. Values are
/// rejected rather than clamped.
pub fn resolve_efficacy(modality: Modality, adherence: f64) -> Result<f64, ParameterError> {
    let adherence = check_fraction("adherence", adherence)?;
    let efficacy = tiers(modality)
        .iter()
        .find(|t| adherence >= t.min_adherence)
        .map(|t| t.efficacy)
        .unwrap_or(0.0);
    Ok(efficacy)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

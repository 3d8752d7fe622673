// Copyright 2026 Hypermesh Foundation. All rights reserved.
// PrEP Impact Simulator - Trajectory Audit
//
// Re-checks a produced trajectory against the compartment invariants:
//
//   0 <= S[t] <= S[t-1]
//   new_infections[t] <= S[t-1]
//   I[t] = I[t-1] + new[t]                        (cumulative)
//   I[t] = max(0, I[t-1] + new[t] - gamma*I[t-1]) (active)
//   S[t] + I[t] <= N
//
// A violation means the engine produced an unphysical series; exporters
// refuse to publish such a series.

use serde::{Deserialize, Serialize};

use crate::types::{DayRecord, InfectionMode, SimulationParameters, SimulationResults};

/// Absolute error allowed per person of population, absorbing float rounding.
const TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("series has {actual} records, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("record {index} is labelled day {day}")]
    DayIndex { index: usize, day: u32 },

    #[error("day {day}: susceptible count {value} outside [0, {population}]")]
    SusceptibleOutOfRange { day: u32, value: f64, population: u64 },

    #[error("day {day}: susceptibles increased from {previous} to {current}")]
    SusceptibleIncreased { day: u32, previous: f64, current: f64 },

    #[error("day {day}: {new_infections} new infections exceed {susceptible} susceptibles")]
    OverDepletion { day: u32, new_infections: f64, susceptible: f64 },

    #[error("day {day}: negative count {value}")]
    NegativeCount { day: u32, value: f64 },

    #[error("day {day}: infected update expected {expected}, got {actual}")]
    InfectedUpdate { day: u32, expected: f64, actual: f64 },

    #[error("day {day}: S + I = {total} exceeds population {population}")]
    PopulationExceeded { day: u32, total: f64, population: u64 },
}

/// A violation tagged with the scenario that produced it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("scenario '{scenario}': {violation}")]
pub struct AuditFailure {
    pub scenario: String,
    #[source]
    pub violation: InvariantViolation,
}

// ---------------------------------------------------------------------------
// Audit result
// ---------------------------------------------------------------------------

/// Outcome of a passing audit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuditReport {
    pub days_checked: usize,
    /// Largest `|N - (S + I)|` seen; the cumulative model keeps this at
    /// rounding level, the active model reports the removed pool.
    pub max_population_gap: f64,
}

/// Population not accounted for by S and I on one day.
pub fn population_gap(population: u64, record: &DayRecord) -> f64 {
    (population as f64 - (record.susceptible + record.infected)).abs()
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// Verify one trajectory against the invariants of its parameters.
pub fn audit_series(
    params: &SimulationParameters,
    series: &[DayRecord],
) -> Result<AuditReport, InvariantViolation> {
    let expected = params.horizon_days() as usize;
    if series.len() != expected {
        return Err(InvariantViolation::LengthMismatch { expected, actual: series.len() });
    }

    let population = params.population_size();
    let n = population as f64;
    let tol = TOLERANCE * n.max(1.0);
    let mut max_population_gap: f64 = 0.0;

    for (index, record) in series.iter().enumerate() {
        let day = record.day;
        if day as usize != index {
            return Err(InvariantViolation::DayIndex { index, day });
        }
        if record.susceptible < 0.0 || record.susceptible > n + tol {
            return Err(InvariantViolation::SusceptibleOutOfRange {
                day,
                value: record.susceptible,
                population,
            });
        }
        for value in [record.infected, record.new_infections, record.cumulative_infections] {
            if value < 0.0 {
                return Err(InvariantViolation::NegativeCount { day, value });
            }
        }
        let total = record.susceptible + record.infected;
        if total > n + tol {
            return Err(InvariantViolation::PopulationExceeded { day, total, population });
        }
        max_population_gap = max_population_gap.max(population_gap(population, record));

        if index == 0 {
            continue;
        }
        let prev = &series[index - 1];
        if record.susceptible > prev.susceptible {
            return Err(InvariantViolation::SusceptibleIncreased {
                day,
                previous: prev.susceptible,
                current: record.susceptible,
            });
        }
        if record.new_infections > prev.susceptible + tol {
            return Err(InvariantViolation::OverDepletion {
                day,
                new_infections: record.new_infections,
                susceptible: prev.susceptible,
            });
        }
        let expected_infected = match params.mode() {
            InfectionMode::Cumulative => prev.infected + record.new_infections,
            InfectionMode::ActiveWithRecovery => (prev.infected + record.new_infections
                - params.recovery_rate() * prev.infected)
                .max(0.0),
        };
        if (expected_infected - record.infected).abs() > tol {
            return Err(InvariantViolation::InfectedUpdate {
                day,
                expected: expected_infected,
                actual: record.infected,
            });
        }
    }

    Ok(AuditReport { days_checked: series.len(), max_population_gap })
}

/// Audit every scenario of a run; the first failure wins.
pub fn audit_results(
    params: &SimulationParameters,
    results: &SimulationResults,
) -> Result<Vec<AuditReport>, AuditFailure> {
    results
        .iter()
        .map(|s| {
            audit_series(params, &s.series).map_err(|violation| AuditFailure {
                scenario: s.name.clone(),
                violation,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
